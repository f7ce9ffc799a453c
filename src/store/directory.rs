use std::fs;
use std::path::Path;

use fst::{Map, MapBuilder, Streamer};

use crate::core::error::{Error, Result};

/// Component F's `term_positions` table: a bijection between the vocabulary
/// and byte offsets into the postings file (§3 invariants). Built with an
/// `fst::MapBuilder`, which requires keys in strictly increasing order —
/// exactly the order the SPIMI merge (§4.E step 4) already emits terms in,
/// so no extra sort is needed here.
pub struct DirectoryBuilder {
    builder: MapBuilder<Vec<u8>>,
}

impl DirectoryBuilder {
    pub fn new() -> Self {
        DirectoryBuilder { builder: MapBuilder::memory() }
    }

    pub fn insert(&mut self, term: &str, offset: u64) -> Result<()> {
        self.builder
            .insert(term, offset)
            .map_err(|e| Error::protocol(format!("directory terms out of order: {e}")))
    }

    pub fn write_to(self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.builder.into_inner().map_err(Error::from)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for DirectoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Loaded wholesale into memory on `Open` (§4.G) — fine at the vocabulary
/// sizes this core targets; a disk-backed variant for million-term
/// vocabularies is explicitly not required by spec.
pub struct TermDirectory {
    map: Map<Vec<u8>>,
}

impl TermDirectory {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        let map = Map::new(bytes).map_err(Error::from)?;
        Ok(TermDirectory { map })
    }

    pub fn offset(&self, term: &str) -> Option<u64> {
        self.map.get(term)
    }

    /// Terms in lexicographic order — the fst's natural iteration order.
    pub fn vocabulary(&self) -> Vec<String> {
        let mut stream = self.map.stream();
        let mut terms = Vec::new();
        while let Some((term, _offset)) = stream.next() {
            terms.push(String::from_utf8_lossy(term).into_owned());
        }
        terms
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_term_offsets() {
        let mut builder = DirectoryBuilder::new();
        builder.insert("brown", 0).unwrap();
        builder.insert("fox", 42).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.fst");
        builder.write_to(&path).unwrap();

        let directory = TermDirectory::load(&path).unwrap();
        assert_eq!(directory.offset("brown"), Some(0));
        assert_eq!(directory.offset("fox"), Some(42));
        assert_eq!(directory.offset("cat"), None);
        assert_eq!(directory.vocabulary(), vec!["brown", "fox"]);
    }

    #[test]
    fn out_of_order_insert_is_rejected() {
        let mut builder = DirectoryBuilder::new();
        builder.insert("fox", 0).unwrap();
        assert!(builder.insert("brown", 1).is_err());
    }
}
