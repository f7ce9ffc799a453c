use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::DocId;

/// One row of `document_metadata` (§4.F). DocIds are dense from 0, so the
/// whole table is a `Vec` indexed directly by `DocId` rather than a real
/// B-tree/hash file — the point-lookup contract ("O(log N) or better") is
/// satisfied in O(1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetaRecord {
    pub title: String,
    pub doc_length: u32,
}

/// `corpus_stats` (§4.F): `{ totalTokens }`, enough to derive average
/// document length on demand.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_tokens: u64,
}

/// The whole metadata store, bulk-written once at commit time (§4.E step 6)
/// and opened read-only by the disk reader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataStore {
    pub documents: Vec<DocumentMetaRecord>,
    pub stats: CorpusStats,
}

impl MetadataStore {
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let store: MetadataStore = bincode::deserialize_from(reader)?;
        Ok(store)
    }

    pub fn total_documents(&self) -> u32 {
        self.documents.len() as u32
    }

    pub fn document_title(&self, doc_id: DocId) -> Option<&str> {
        self.documents.get(doc_id.as_usize()).map(|d| d.title.as_str())
    }

    pub fn document_length(&self, doc_id: DocId) -> Option<u32> {
        self.documents.get(doc_id.as_usize()).map(|d| d.doc_length)
    }

    pub fn average_document_length(&self) -> f64 {
        let n = self.total_documents();
        if n == 0 {
            0.0
        } else {
            self.stats.total_tokens as f64 / n as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bincode() {
        let store = MetadataStore {
            documents: vec![
                DocumentMetaRecord { title: "d0".into(), doc_length: 4 },
                DocumentMetaRecord { title: "d1".into(), doc_length: 3 },
            ],
            stats: CorpusStats { total_tokens: 7 },
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.bin");
        store.write_to(&path).unwrap();
        let loaded = MetadataStore::load_from(&path).unwrap();
        assert_eq!(loaded.total_documents(), 2);
        assert_eq!(loaded.average_document_length(), 3.5);
    }
}
