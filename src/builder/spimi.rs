use std::collections::{BinaryHeap, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};

use log::{debug, info, warn};

use crate::analysis::source::DocumentSource;
use crate::analysis::tokenizer::Tokenizer;
use crate::codec::postings;
use crate::core::config::{ensure_layout, IndexConfig};
use crate::core::error::{Error, Result};
use crate::core::types::{DocId, Position};
use crate::index::memory_index::MemoryIndex;
use crate::index::posting::Posting;
use crate::storage::bucket::{self, BucketReader, BucketWriter};
use crate::storage::layout::bucket_path;
use crate::store::directory::DirectoryBuilder;
use crate::store::metadata::{CorpusStats, DocumentMetaRecord, MetadataStore};
use crate::store::weights;

/// Rough constant-per-token cost used to estimate `bytesAccumulated`
/// against `memoryLimitBytes` (§4.E step 2 allows "a fixed per-token
/// constant"): one `Posting`/position entry costs roughly a `DocId` plus a
/// growable `Vec<Position>` slot, so 24 bytes is a conservative stand-in
/// for the real heap cost of `MemoryIndex::add`.
const BYTES_PER_TOKEN_ESTIMATE: usize = 24;

/// Cooperative cancellation (§5): checked between documents and at spill
/// boundaries. The default `NeverCancelled` never interrupts a build.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

pub struct NeverCancelled;

impl Cancellation for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BuildReport {
    pub total_documents: u32,
    pub total_tokens: u64,
    pub bucket_count: usize,
}

struct HeapEntry {
    term: String,
    bucket_index: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed: `BinaryHeap` is a max-heap, the merge needs the
        // lexicographically smallest term on top.
        other.term.cmp(&self.term)
    }
}

/// Component E. Drives the tokenizer → `MemoryIndex` → bucket-spill →
/// k-way-merge pipeline and commits a fresh term directory, postings file,
/// and document-weights file. Leaves no commit marker on any failure path
/// (§4.E "Failure semantics").
pub fn build_index(
    config: &IndexConfig,
    source: &dyn DocumentSource,
    tokenizer: &dyn Tokenizer,
    cancellation: &dyn Cancellation,
) -> Result<BuildReport> {
    ensure_layout(config)?;

    let documents = source.documents()?;
    info!("starting build over {} documents", documents.len());

    let mut memory_index = MemoryIndex::new();
    let mut bytes_accumulated: usize = 0;
    let mut bucket_paths = Vec::new();
    let mut doc_records = Vec::with_capacity(documents.len());
    let mut doc_weights = Vec::with_capacity(documents.len());
    let mut total_tokens: u64 = 0;

    for document in &documents {
        if cancellation.is_cancelled() {
            return Err(Error::cancelled("build cancelled at document boundary"));
        }

        let tokens = tokenizer.tokenize(&document.content);
        let mut term_counts: HashMap<String, u32> = HashMap::new();
        let mut doc_length: u32 = 0;

        for token in tokens {
            if token.text.is_empty() {
                warn!("skipping empty token emitted by tokenizer for doc {}", document.doc_id.value());
                continue;
            }
            doc_length += 1;
            let position = Position(doc_length);
            memory_index.add(&token.text, document.doc_id, position);
            *term_counts.entry(token.text).or_insert(0) += 1;
            bytes_accumulated += BYTES_PER_TOKEN_ESTIMATE;
        }

        total_tokens += doc_length as u64;
        doc_records.push(DocumentMetaRecord {
            title: document.title.clone(),
            doc_length,
        });
        doc_weights.push(document_weight(&term_counts));

        if bytes_accumulated >= config.memory_limit_bytes {
            spill(config, &mut memory_index, &mut bucket_paths)?;
            bytes_accumulated = 0;
        }
    }

    if !memory_index.is_empty() {
        spill(config, &mut memory_index, &mut bucket_paths)?;
    }

    if cancellation.is_cancelled() {
        bucket::remove_bucket_files(&bucket_paths)?;
        return Err(Error::cancelled("build cancelled before merge"));
    }

    merge_buckets(config, &bucket_paths)?;

    let metadata = MetadataStore {
        documents: doc_records,
        stats: CorpusStats { total_tokens },
    };
    metadata.write_to(&config.metadata_path)?;
    weights::write_weights(&config.weights_path, &doc_weights)?;

    bucket::remove_bucket_files(&bucket_paths)?;
    write_manifest(config, metadata.total_documents(), total_tokens)?;

    info!(
        "build complete: {} documents, {} tokens, {} buckets",
        metadata.total_documents(),
        total_tokens,
        bucket_paths.len()
    );

    Ok(BuildReport {
        total_documents: metadata.total_documents(),
        total_tokens,
        bucket_count: bucket_paths.len(),
    })
}

/// `L_d = sqrt(Σ_t (1 + ln tf_{t,d})^2)` (§3, invariant 6 — squared form).
fn document_weight(term_counts: &HashMap<String, u32>) -> f64 {
    if term_counts.is_empty() {
        return 0.0;
    }
    term_counts
        .values()
        .map(|&tf| {
            let w = 1.0 + (tf as f64).ln();
            w * w
        })
        .sum::<f64>()
        .sqrt()
}

fn spill(
    config: &IndexConfig,
    memory_index: &mut MemoryIndex,
    bucket_paths: &mut Vec<std::path::PathBuf>,
) -> Result<()> {
    let path = bucket_path(config, bucket_paths.len());
    debug!("spilling {} terms to {}", memory_index.vocabulary().count(), path.display());
    let written_path = BucketWriter::create(&path)?.spill(memory_index)?;
    bucket_paths.push(written_path);
    memory_index.clear();
    Ok(())
}

/// §4.E step 4: k-way merge of every bucket file into the final postings
/// file, recording each term's starting offset in the directory.
fn merge_buckets(config: &IndexConfig, bucket_paths: &[std::path::PathBuf]) -> Result<()> {
    let mut readers: Vec<BucketReader> = bucket_paths
        .iter()
        .map(BucketReader::open)
        .collect::<Result<_>>()?;

    let mut current: Vec<Option<(String, Vec<Posting>)>> = vec![None; readers.len()];
    let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::new();

    for (index, reader) in readers.iter_mut().enumerate() {
        if let Some(record) = reader.next_record()? {
            heap.push(HeapEntry { term: record.0.clone(), bucket_index: index });
            current[index] = Some(record);
        }
    }

    let postings_file = File::create(&config.postings_path)?;
    let mut postings_writer = BufWriter::new(postings_file);
    let mut directory = DirectoryBuilder::new();
    let mut offset: u64 = 0;

    while let Some(top) = heap.pop() {
        let term = top.term;
        let mut matching_indices = vec![top.bucket_index];

        while let Some(next) = heap.peek() {
            if next.term == term {
                matching_indices.push(heap.pop().unwrap().bucket_index);
            } else {
                break;
            }
        }

        let mut lists = Vec::with_capacity(matching_indices.len());
        for &index in &matching_indices {
            if let Some((_, postings)) = current[index].take() {
                lists.push(postings);
            }
        }
        let merged = union_postings(lists);
        if merged.is_empty() {
            // §4.E tie-breaks: never emit an empty postings list.
            continue;
        }

        directory.insert(&term, offset)?;
        let bytes_written = postings::encode_record(&mut postings_writer, &term, &merged)?;
        offset += bytes_written;

        for &index in &matching_indices {
            if let Some(record) = readers[index].next_record()? {
                heap.push(HeapEntry { term: record.0.clone(), bucket_index: index });
                current[index] = Some(record);
            }
        }
    }

    postings_writer.flush()?;
    directory.write_to(&config.directory_path)?;
    Ok(())
}

/// Unions postings lists for the same term from multiple buckets, merging
/// position lists where two buckets happen to carry the same DocId
/// (§4.E step 4).
fn union_postings(lists: Vec<Vec<Posting>>) -> Vec<Posting> {
    use std::collections::BTreeMap;

    let mut merged: BTreeMap<DocId, Vec<Position>> = BTreeMap::new();
    for list in lists {
        for posting in list {
            let entry = merged.entry(posting.doc_id).or_insert_with(Vec::new);
            for position in posting.positions.unwrap_or_default() {
                if let Err(insert_at) = entry.binary_search(&position) {
                    entry.insert(insert_at, position);
                }
            }
        }
    }
    merged
        .into_iter()
        .map(|(doc_id, positions)| Posting::positional(doc_id, positions))
        .collect()
}

fn write_manifest(config: &IndexConfig, total_documents: u32, total_tokens: u64) -> Result<()> {
    let postings_bytes = std::fs::read(&config.postings_path)?;
    let checksum = crc32fast::hash(&postings_bytes);

    let mut file = File::create(&config.manifest_path)?;
    writeln!(file, "total_documents={total_documents}")?;
    writeln!(file, "total_tokens={total_tokens}")?;
    writeln!(file, "postings_checksum={checksum:08x}")?;
    file.flush()?;
    Ok(())
}

/// Returns whether a prior build at `config` committed successfully.
/// Readers must not open an index without checking this first (§3
/// Lifecycle, §5 Shared resource policy).
pub fn is_committed(config: &IndexConfig) -> bool {
    config.manifest_path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::source::DocumentRecord;
    use crate::analysis::tokenizer::StandardTokenizer;

    struct FixedSource(Vec<DocumentRecord>);

    impl DocumentSource for FixedSource {
        fn documents(&self) -> Result<Vec<DocumentRecord>> {
            Ok(self.0.clone())
        }
    }

    fn doc(id: u32, title: &str, content: &str) -> DocumentRecord {
        DocumentRecord { doc_id: DocId::new(id), title: title.to_string(), content: content.to_string() }
    }

    #[test]
    fn builds_a_committed_index_with_expected_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::new(dir.path());
        let source = FixedSource(vec![
            doc(0, "d0", "the quick brown fox"),
            doc(1, "d1", "the brown dog"),
        ]);
        let tokenizer = StandardTokenizer::default();

        let report = build_index(&config, &source, &tokenizer, &NeverCancelled).unwrap();
        assert_eq!(report.total_documents, 2);
        assert_eq!(report.total_tokens, 7);
        assert!(is_committed(&config));

        let directory = crate::store::directory::TermDirectory::load(&config.directory_path).unwrap();
        assert_eq!(directory.vocabulary(), vec!["brown", "dog", "fox", "quick", "the"]);
        assert!(!config.bucket_dir.join("bucket_0.bin").exists());
    }

    #[test]
    fn cancellation_leaves_no_manifest() {
        struct AlwaysCancelled;
        impl Cancellation for AlwaysCancelled {
            fn is_cancelled(&self) -> bool {
                true
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::new(dir.path());
        let source = FixedSource(vec![doc(0, "d0", "a b c")]);
        let tokenizer = StandardTokenizer::default();

        let err = build_index(&config, &source, &tokenizer, &AlwaysCancelled).unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::Cancelled);
        assert!(!is_committed(&config));
    }
}
