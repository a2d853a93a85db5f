//! Native `.bstr` storage format.
//!
//! A fixed 32-byte header followed by a Postcard-encoded payload. All
//! integers are little-endian.
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     Magic ("BFIT")
//! 4       1     Version major
//! 5       1     Version minor
//! 6       1     Model type
//! 7       1     (zero)
//! 8       2     Flags
//! 10      2     (zero)
//! 12      4     Payload length
//! 16      4     CRC32 of the payload
//! 20      4     Feature count
//! 24      4     Tree count
//! 28      4     (zero)
//! ```

use thiserror::Error;

/// Magic bytes identifying a boostfit model file.
pub const MAGIC: &[u8; 4] = b"BFIT";

pub const CURRENT_VERSION_MAJOR: u8 = 1;
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the format header in bytes.
pub const HEADER_SIZE: usize = 32;

mod offset {
    pub const VERSION_MAJOR: usize = 4;
    pub const VERSION_MINOR: usize = 5;
    pub const MODEL_TYPE: usize = 6;
    pub const FLAGS: usize = 8;
    pub const PAYLOAD_LEN: usize = 12;
    pub const CHECKSUM: usize = 16;
    pub const N_FEATURES: usize = 20;
    pub const N_TREES: usize = 24;
}

/// Kind of model stored in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ModelType {
    /// Gradient-boosted decision tree ensemble.
    Gbdt = 0,
}

impl ModelType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Gbdt),
            _ => None,
        }
    }
}

/// Header flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatFlags(u16);

impl FormatFlags {
    /// Some tree splits on a categorical feature.
    pub const HAS_CATEGORICAL: u16 = 1 << 1;
    /// The forest was cut back to its best validation round.
    pub const BEST_MODEL: u16 = 1 << 2;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    pub fn set(&mut self, flag: u16) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u16) {
        self.0 &= !flag;
    }
}

/// Decoded file header.
///
/// `payload_size` and `checksum` are filled in by [`NativeCodec::serialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub model_type: ModelType,
    pub flags: FormatFlags,
    pub payload_size: u32,
    pub checksum: u32,
    pub num_features: u32,
    pub num_trees: u32,
}

impl FormatHeader {
    /// Header at the current format version with no flags set.
    pub fn new(model_type: ModelType, num_features: u32, num_trees: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            model_type,
            flags: FormatFlags::empty(),
            payload_size: 0,
            checksum: 0,
            num_features,
            num_trees,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        let mut put_u32 = |at: usize, value: u32| buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
        put_u32(offset::PAYLOAD_LEN, self.payload_size);
        put_u32(offset::CHECKSUM, self.checksum);
        put_u32(offset::N_FEATURES, self.num_features);
        put_u32(offset::N_TREES, self.num_trees);

        buf[..MAGIC.len()].copy_from_slice(MAGIC);
        buf[offset::VERSION_MAJOR] = self.version_major;
        buf[offset::VERSION_MINOR] = self.version_minor;
        buf[offset::MODEL_TYPE] = self.model_type as u8;
        buf[offset::FLAGS..offset::FLAGS + 2].copy_from_slice(&self.flags.bits().to_le_bytes());
        buf
    }

    /// Parse a header, rejecting foreign files and newer major versions.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DeserializeError> {
        if buf[..MAGIC.len()] != MAGIC[..] {
            return Err(DeserializeError::NotAModel);
        }

        let version_major = buf[offset::VERSION_MAJOR];
        let version_minor = buf[offset::VERSION_MINOR];
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DeserializeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let raw_type = buf[offset::MODEL_TYPE];
        let model_type = ModelType::from_u8(raw_type)
            .ok_or_else(|| DeserializeError::CorruptPayload(format!("unknown model type {raw_type}")))?;

        let u32_at = |at: usize| u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
        Ok(Self {
            version_major,
            version_minor,
            model_type,
            flags: FormatFlags::from_bits(u16::from_le_bytes([buf[offset::FLAGS], buf[offset::FLAGS + 1]])),
            payload_size: u32_at(offset::PAYLOAD_LEN),
            checksum: u32_at(offset::CHECKSUM),
            num_features: u32_at(offset::N_FEATURES),
            num_trees: u32_at(offset::N_TREES),
        })
    }
}

/// Failure to encode or write a model.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    #[error("payload of {0} bytes exceeds the format limit")]
    PayloadTooLarge(usize),
}

/// Failure to read or decode a model.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a boostfit model file")]
    NotAModel,

    #[error("model requires format version {major}.{minor}, which is newer than this build")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// Decoded model violates a structural invariant.
    #[error("invalid model: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),

    #[error("model type mismatch: expected {expected:?}, got {actual:?}")]
    TypeMismatch { expected: ModelType, actual: ModelType },
}

/// CRC32 of `data`.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Frames Postcard payloads with a [`FormatHeader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl NativeCodec {
    pub fn new() -> Self {
        Self
    }

    /// Prefix `payload` with `header`, filling in its length and checksum.
    pub fn frame(&self, mut header: FormatHeader, payload: &[u8]) -> Result<Vec<u8>, SerializeError> {
        header.payload_size =
            u32::try_from(payload.len()).map_err(|_| SerializeError::PayloadTooLarge(payload.len()))?;
        header.checksum = compute_checksum(payload);

        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(payload);
        Ok(out)
    }

    /// Split `bytes` into header and payload after checking length and checksum.
    ///
    /// Bytes past the declared payload length are ignored.
    pub fn unframe<'a>(&self, bytes: &'a [u8]) -> Result<(FormatHeader, &'a [u8]), DeserializeError> {
        let Some((head, rest)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
            return Err(DeserializeError::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        };
        let header = FormatHeader::from_bytes(head)?;

        let len = header.payload_size as usize;
        let Some(payload) = rest.get(..len) else {
            return Err(DeserializeError::Truncated {
                expected: len,
                actual: rest.len(),
            });
        };

        let actual = compute_checksum(payload);
        if actual != header.checksum {
            return Err(DeserializeError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }
        Ok((header, payload))
    }

    /// Encode `payload` with Postcard and frame it.
    pub fn serialize<T: serde::Serialize>(&self, header: FormatHeader, payload: &T) -> Result<Vec<u8>, SerializeError> {
        let encoded = postcard::to_allocvec(payload)?;
        self.frame(header, &encoded)
    }

    /// Unframe `bytes` and decode the Postcard payload.
    pub fn deserialize<T: for<'de> serde::Deserialize<'de>>(
        &self,
        bytes: &[u8],
    ) -> Result<(FormatHeader, T), DeserializeError> {
        let (header, payload) = self.unframe(bytes)?;
        Ok((header, postcard::from_bytes(payload)?))
    }
}
