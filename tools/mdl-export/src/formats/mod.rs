//! Binary format definitions for MDL model files
//!
//! Re-exports from mdl-common for writing model files.

pub use mdl_common::formats::*;
pub use mdl_common::{MAX_VERTICES, MDL_EXT};
