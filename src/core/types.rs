use serde::{Deserialize, Serialize};

/// Dense document identifier. Assigned in source order starting at 0 and
/// never reused; both the in-memory index and the disk format rely on
/// `DocId`s being contiguous so document metadata can live in a flat array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub fn new(id: u32) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

/// Zero-based token offset within a document's token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position(pub u32);

impl Position {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Position {
    fn from(p: u32) -> Self {
        Position(p)
    }
}
