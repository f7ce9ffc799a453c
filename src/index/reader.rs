use std::fs::File;
use std::io::{Seek, SeekFrom};

use memmap2::Mmap;

use crate::builder::spimi::is_committed;
use crate::codec::postings;
use crate::core::config::IndexConfig;
use crate::core::error::{Error, Result};
use crate::core::types::DocId;
use crate::index::posting::Posting;
use crate::store::directory::TermDirectory;
use crate::store::metadata::MetadataStore;
use crate::store::weights;

/// Component G. Opens the three committed files (directory, postings,
/// weights, metadata) and serves random-access postings lookups. Immutable
/// after `open` and safe for concurrent use from multiple query threads
/// (§5 Query phase): each call seeks its own `File` handle rather than
/// sharing mutable cursor state.
pub struct DiskIndexReader {
    directory: TermDirectory,
    metadata: MetadataStore,
    weights: Vec<f64>,
    postings_path: std::path::PathBuf,
}

impl DiskIndexReader {
    /// Refuses to open an index that never committed (§3 Lifecycle: readers
    /// MUST NOT open until the build signals completion).
    pub fn open(config: &IndexConfig) -> Result<Self> {
        if !is_committed(config) {
            return Err(Error::protocol(format!(
                "index at {} has no commit marker; build may be incomplete",
                config.index_dir.display()
            )));
        }

        let directory = TermDirectory::load(&config.directory_path)?;
        let metadata = MetadataStore::load_from(&config.metadata_path)?;
        let doc_weights = weights::read_weights(&config.weights_path)?;

        if doc_weights.len() != metadata.total_documents() as usize {
            return Err(Error::corruption(format!(
                "document-weights file has {} records, expected {}",
                doc_weights.len(),
                metadata.total_documents()
            )));
        }

        Ok(DiskIndexReader {
            directory,
            metadata,
            weights: doc_weights,
            postings_path: config.postings_path.clone(),
        })
    }

    fn open_postings_file(&self) -> Result<File> {
        Ok(File::open(&self.postings_path)?)
    }

    /// §4.G `postings(term, needPositions)`. An unknown term is an empty
    /// result, never an error; a self-description mismatch or truncated
    /// record is always a fatal `IndexCorruption`.
    pub fn postings(&self, term: &str, need_positions: bool) -> Result<Vec<Posting>> {
        let offset = match self.directory.offset(term) {
            Some(offset) => offset,
            None => return Ok(Vec::new()),
        };

        let mut file = self.open_postings_file()?;
        file.seek(SeekFrom::Start(offset))?;

        let (read_term, df) = postings::read_term_prefix(&mut file)?;
        if read_term != term {
            return Err(Error::corruption(format!(
                "directory offset for '{term}' points at record for '{read_term}'"
            )));
        }

        if need_positions {
            postings::decode_postings_full(&mut file, df)
        } else {
            postings::decode_postings_skip(&mut file, df)
        }
    }

    /// Terms in lexicographic order, sourced from the directory.
    pub fn vocabulary(&self) -> Vec<String> {
        self.directory.vocabulary()
    }

    /// Scans the skip-decoded postings list for `term` until `docId` is
    /// found, returning its term frequency or 0 (§4.G).
    pub fn term_frequency(&self, term: &str, doc_id: DocId) -> Result<u32> {
        let postings = self.postings(term, false)?;
        Ok(postings
            .iter()
            .find(|p| p.doc_id == doc_id)
            .map(|p| p.term_freq)
            .unwrap_or(0))
    }

    pub fn document_length(&self, doc_id: DocId) -> Option<u32> {
        self.metadata.document_length(doc_id)
    }

    pub fn document_title(&self, doc_id: DocId) -> Option<&str> {
        self.metadata.document_title(doc_id)
    }

    pub fn total_documents(&self) -> u32 {
        self.metadata.total_documents()
    }

    pub fn total_tokens(&self) -> u64 {
        self.metadata.stats.total_tokens
    }

    pub fn average_document_length(&self) -> f64 {
        self.metadata.average_document_length()
    }

    pub fn document_weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn document_frequency(&self, term: &str) -> Result<u32> {
        Ok(self.postings(term, false)?.len() as u32)
    }

    /// Memory-maps the postings file for callers that want direct access
    /// rather than per-term `File` opens (e.g. a future bulk scan). Kept
    /// separate from `postings()` so the common term-at-a-time path never
    /// pays for a mapping it doesn't need.
    pub fn map_postings_file(&self) -> Result<Mmap> {
        let file = self.open_postings_file()?;
        // Safety: the postings file is never mutated after commit (§3
        // invariants), so the mapping cannot observe a concurrent write.
        unsafe { Mmap::map(&file).map_err(Error::from) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::source::DocumentRecord;
    use crate::analysis::tokenizer::StandardTokenizer;
    use crate::builder::spimi::{build_index, NeverCancelled};
    use crate::analysis::source::DocumentSource;
    use crate::core::types::Position;

    struct FixedSource(Vec<DocumentRecord>);
    impl DocumentSource for FixedSource {
        fn documents(&self) -> Result<Vec<DocumentRecord>> {
            Ok(self.0.clone())
        }
    }

    fn build_tiny_corpus() -> (tempfile::TempDir, IndexConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::new(dir.path());
        let source = FixedSource(vec![
            DocumentRecord { doc_id: DocId::new(0), title: "d0".into(), content: "the quick brown fox".into() },
            DocumentRecord { doc_id: DocId::new(1), title: "d1".into(), content: "the brown dog".into() },
        ]);
        let tokenizer = StandardTokenizer::default();
        build_index(&config, &source, &tokenizer, &NeverCancelled).unwrap();
        (dir, config)
    }

    #[test]
    fn s1_tiny_corpus_term_lookup() {
        let (_dir, config) = build_tiny_corpus();
        let reader = DiskIndexReader::open(&config).unwrap();

        let brown = reader.postings("brown", true).unwrap();
        assert_eq!(brown.len(), 2);
        assert_eq!(brown[0].doc_id, DocId::new(0));
        assert_eq!(brown[0].positions.as_ref().unwrap(), &[Position(3)]);
        assert_eq!(brown[1].doc_id, DocId::new(1));
        assert_eq!(brown[1].positions.as_ref().unwrap(), &[Position(2)]);

        let fox = reader.postings("fox", true).unwrap();
        assert_eq!(fox.len(), 1);
        assert_eq!(fox[0].positions.as_ref().unwrap(), &[Position(4)]);

        assert!(reader.postings("cat", true).unwrap().is_empty());
    }

    #[test]
    fn refuses_to_open_uncommitted_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::new(dir.path());
        std::fs::create_dir_all(&config.index_dir).unwrap();
        let err = DiskIndexReader::open(&config).unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::ProtocolError);
    }

    #[test]
    fn skip_and_full_decode_agree_on_term_frequency() {
        let (_dir, config) = build_tiny_corpus();
        let reader = DiskIndexReader::open(&config).unwrap();
        assert_eq!(reader.term_frequency("brown", DocId::new(0)).unwrap(), 1);
        assert_eq!(reader.term_frequency("brown", DocId::new(5)).unwrap(), 0);
    }
}
