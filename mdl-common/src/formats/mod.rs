//! MDL binary model format
//!
//! POD format for engine-ready meshes: string tables, fixed-layout material
//! and draw-range records, a 16-bit index buffer and an interleaved vertex
//! buffer. No magic bytes - the material record layout is agreed on by
//! reader and writer (see [`MaterialLayout`]).

mod model;
mod records;

pub use model::*;
pub use records::*;
