//! GBDT model and configuration.
//!
//! This module provides the high-level [`GBDTModel`] wrapper and nested
//! parameter structs for configuration.
//!
//! # Parameter Groups
//!
//! Configuration is organized into semantic groups:
//! - [`TreeParams`]: Tree structure (growth strategy, max depth/leaves)
//! - [`RegularizationParams`]: L1/L2 regularization and split constraints
//!
//! Both are composed by the high-level [`GBDTConfig`], which converts to the
//! mid-level trainer parameters.

mod config;
mod model;
mod params;

pub use config::{ConfigError, GBDTConfig, GBDTConfigBuilder};
pub use model::{GBDTModel, VALID_SET_NAME};
pub use params::{MAX_TREE_DEPTH, ParamValidationError, RegularizationParams, TreeParams};
