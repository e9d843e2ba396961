//! Conversion errors
//!
//! Every error is fatal to the conversion; nothing is written when one is
//! returned. Parse errors carry the source location so they can be acted on.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Position of a record in a source file (1-based line)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: Option<PathBuf>,
    pub line: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file.display(), self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// Which vertex attribute stream a face index points into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    Texcoord,
    Normal,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Position => f.write_str("position"),
            AttributeKind::Texcoord => f.write_str("texcoord"),
            AttributeKind::Normal => f.write_str("normal"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Source file missing or unreadable
    #[error("could not open {}{}", .path.display(), referrer(.referenced_by))]
    InputNotFound {
        path: PathBuf,
        referenced_by: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// Face record before any `usemtl`
    #[error("{location}: object '{}' has a face with no material assigned", display_object(.object))]
    MissingMaterialBinding { object: String, location: Location },

    /// Face index token of exactly zero
    #[error("{location}: face index cannot be zero ({kind} in '{token}')")]
    ZeroIndex {
        kind: AttributeKind,
        token: String,
        location: Location,
    },

    /// Face index outside the attribute stream parsed so far
    #[error("{location}: {kind} index {index} out of range ({size} defined so far)")]
    IndexOutOfRange {
        kind: AttributeKind,
        index: i64,
        size: usize,
        location: Location,
    },

    /// Face with fewer than three corners
    #[error("{location}: face has {vertices} vertices, need at least 3")]
    DegenerateFace { vertices: usize, location: Location },

    /// Unparseable numeric token
    #[error("{location}: malformed record '{record}'")]
    MalformedRecord { record: String, location: Location },

    /// Submesh bound to a material that the material file never declares
    #[error("material not found: {name}")]
    MaterialNotFound { name: String },

    /// Vertex buffer no longer addressable with u16 indices
    #[error(
        "model needs {vertices} unique vertices, exceeds maximum {} for u16 indices. \
         Split the mesh into smaller parts.",
        mdl_common::MAX_VERTICES
    )]
    IndexOverflow { vertices: usize },

    /// Read or write failure on an already opened file
    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn referrer(referenced_by: &Option<PathBuf>) -> String {
    referenced_by
        .as_ref()
        .map(|p| format!(" (referenced by {})", p.display()))
        .unwrap_or_default()
}

fn display_object(name: &str) -> &str {
    if name.is_empty() { "<unnamed>" } else { name }
}

impl ConvertError {
    pub(crate) fn malformed(record: impl Into<String>) -> Self {
        ConvertError::MalformedRecord {
            record: record.into(),
            location: Location::default(),
        }
    }

    fn location_mut(&mut self) -> Option<&mut Location> {
        match self {
            ConvertError::MissingMaterialBinding { location, .. }
            | ConvertError::ZeroIndex { location, .. }
            | ConvertError::IndexOutOfRange { location, .. }
            | ConvertError::DegenerateFace { location, .. }
            | ConvertError::MalformedRecord { location, .. } => Some(location),
            ConvertError::InputNotFound { .. }
            | ConvertError::MaterialNotFound { .. }
            | ConvertError::IndexOverflow { .. }
            | ConvertError::Io { .. } => None,
        }
    }

    /// Source location of a parse error, if it has one
    pub fn location(&self) -> Option<&Location> {
        match self {
            ConvertError::MissingMaterialBinding { location, .. }
            | ConvertError::ZeroIndex { location, .. }
            | ConvertError::IndexOutOfRange { location, .. }
            | ConvertError::DegenerateFace { location, .. }
            | ConvertError::MalformedRecord { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Attach the line a parse error came from.
    ///
    /// Malformed records report the whole raw line rather than the token.
    pub(crate) fn at_line(mut self, line: usize, raw: &str) -> Self {
        if let ConvertError::MalformedRecord { record, .. } = &mut self {
            *record = raw.to_owned();
        }
        if let Some(location) = self.location_mut() {
            location.line = line;
        }
        self
    }

    /// Attach the source file to a parse error
    pub fn in_file(mut self, path: &Path) -> Self {
        if let Some(location) = self.location_mut() {
            location.file = Some(path.to_path_buf());
        }
        self
    }
}
