use std::path::{Path, PathBuf};

/// BM25 tuning parameters (spec.md §4.I). `k3` is carried for parity with
/// the two-constant family BM25 belongs to even though the single-occurrence
/// query weighting in §4.I never uses it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
    pub k3: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75, k3: 8.0 }
    }
}

/// Paths and limits that used to be module-level globals in the reference
/// implementation (`examples/original_source/config.py`'s `POSTINGS_DIR`,
/// `WEIGHTS_DIR`, `BUCKET_DIR`, ...). Threaded explicitly into the builder
/// and the reader instead.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub index_dir: PathBuf,
    pub postings_path: PathBuf,
    pub directory_path: PathBuf,
    pub weights_path: PathBuf,
    pub metadata_path: PathBuf,
    pub bucket_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub memory_limit_bytes: usize,
    pub bm25_params: Bm25Params,
}

impl IndexConfig {
    /// Derives the full on-disk layout from a single index directory, the
    /// way `storage::layout` lays out segment files for one base path.
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        let index_dir = index_dir.into();
        IndexConfig {
            postings_path: index_dir.join("postings.bin"),
            directory_path: index_dir.join("directory.fst"),
            weights_path: index_dir.join("weights.bin"),
            metadata_path: index_dir.join("metadata.bin"),
            bucket_dir: index_dir.join("buckets"),
            manifest_path: index_dir.join("MANIFEST"),
            index_dir,
            memory_limit_bytes: 12 * 1024 * 1024,
            bm25_params: Bm25Params::default(),
        }
    }

    pub fn with_memory_limit_bytes(mut self, bytes: usize) -> Self {
        self.memory_limit_bytes = bytes;
        self
    }

    pub fn with_bm25_params(mut self, params: Bm25Params) -> Self {
        self.bm25_params = params;
        self
    }
}

/// Tokenizer choice, independent of the positional-index semantics: the
/// core never cares which concrete `Tokenizer` produced its tokens, but the
/// CLI/builder need a name to select one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerKind {
    Standard,
}

/// Builder-facing configuration: the `IndexConfig` layout plus the corpus
/// source and tokenizer choice (mirrors the teacher's top-level `Config`,
/// generalized beyond a single `storage_path`/`memory_limit` pair).
#[derive(Debug, Clone)]
pub struct Config {
    pub corpus_dir: PathBuf,
    pub index: IndexConfig,
    pub tokenizer: TokenizerKind,
}

impl Config {
    pub fn new(corpus_dir: impl Into<PathBuf>, index_dir: impl Into<PathBuf>) -> Self {
        Config {
            corpus_dir: corpus_dir.into(),
            index: IndexConfig::new(index_dir),
            tokenizer: TokenizerKind::Standard,
        }
    }
}

pub fn ensure_layout(config: &IndexConfig) -> std::io::Result<()> {
    std::fs::create_dir_all(&config.index_dir)?;
    std::fs::create_dir_all(&config.bucket_dir)?;
    Ok(())
}

pub fn index_dir_exists(path: &Path) -> bool {
    path.is_dir()
}
