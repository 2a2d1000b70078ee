//! The sectioned version-3 source map returned for a payload.
//!
//! Each section pairs a module's own map with the line at which that module's
//! body starts in the payload, so no per-module mapping is re-encoded.

use modserver_store::SourceMap;
use serde::{Deserialize, Serialize};

/// Position in the payload at which a section's map applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub line: usize,
    pub column: usize,
}

/// One module's map placed at its offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub offset: Offset,
    pub map: SourceMap,
}

/// A version-3 source map made of offset-tagged per-module maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionedSourceMap {
    pub version: u32,
    pub file: String,
    pub sections: Vec<Section>,
}

impl SectionedSourceMap {
    pub fn new(file: impl Into<String>) -> Self {
        SectionedSourceMap {
            version: 3,
            file: file.into(),
            sections: Vec::new(),
        }
    }
}
