//! Model persistence in the native `.bstr` format.
//!
//! ```no_run
//! # use boostfit::model::GBDTModel;
//! # fn demo(model: &GBDTModel) -> Result<(), Box<dyn std::error::Error>> {
//! model.save("model.bstr")?;
//! let loaded = GBDTModel::load("model.bstr")?;
//! assert_eq!(loaded.forest().n_trees(), model.forest().n_trees());
//! # Ok(())
//! # }
//! ```

mod convert;
pub mod native;
pub mod payload;

use std::path::Path;

pub use native::{
    CURRENT_VERSION_MAJOR, CURRENT_VERSION_MINOR, DeserializeError, FormatFlags, FormatHeader, HEADER_SIZE, MAGIC,
    ModelType, NativeCodec, SerializeError,
};
pub use payload::{Payload, PayloadV1};

use crate::model::GBDTModel;

impl GBDTModel {
    /// Header describing this model.
    fn format_header(&self) -> FormatHeader {
        let mut header = FormatHeader::new(
            ModelType::Gbdt,
            self.meta().n_features() as u32,
            self.forest().n_trees() as u32,
        );
        if self.forest().trees().any(|t| t.has_categorical()) {
            header.flags.set(FormatFlags::HAS_CATEGORICAL);
        }
        if self.meta().best_iteration.is_some() && self.config().use_best_model {
            header.flags.set(FormatFlags::BEST_MODEL);
        }
        header
    }

    /// Serialize to the native binary format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        let payload = Payload::V1(PayloadV1::from(self));
        NativeCodec::new().serialize(self.format_header(), &payload)
    }

    /// Deserialize from the native binary format.
    ///
    /// Checks magic, version, length and checksum, then validates the
    /// decoded trees against the recorded feature count.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializeError> {
        let (header, payload): (FormatHeader, Payload) = NativeCodec::new().deserialize(bytes)?;
        if header.model_type != ModelType::Gbdt {
            return Err(DeserializeError::TypeMismatch {
                expected: ModelType::Gbdt,
                actual: header.model_type,
            });
        }

        let model = match payload {
            Payload::V1(v1) => GBDTModel::try_from(v1)?,
        };

        if model.meta().n_features() != header.num_features as usize
            || model.forest().n_trees() != header.num_trees as usize
        {
            return Err(DeserializeError::CorruptPayload(
                "header counts do not match the payload".into(),
            ));
        }
        Ok(model)
    }

    /// Write the model to `path`, replacing any existing file.
    ///
    /// The model is encoded fully before the file is touched.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a model written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
