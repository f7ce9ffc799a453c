use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::codec::postings;
use crate::core::error::Result;
use crate::index::memory_index::MemoryIndex;
use crate::index::posting::Posting;

/// Component D: one sorted spill file written during a SPIMI spill and
/// deleted after the merge commits (§3 Lifecycle, §5 Shared resource
/// policy). Exclusively owned by the builder for its entire lifetime.
pub struct BucketWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl BucketWriter {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(BucketWriter { path, writer: BufWriter::new(file) })
    }

    /// Writes every term in `index`'s vocabulary, in lexicographic order, as
    /// one postings record each (§4.E step 2's spill action). A term with
    /// no postings can never occur here since `MemoryIndex` only ever holds
    /// terms it has seen at least one posting for.
    pub fn spill(mut self, index: &MemoryIndex) -> Result<PathBuf> {
        for term in index.vocabulary().map(|t| t.to_string()).collect::<Vec<_>>() {
            let term_postings = index.postings(&term);
            postings::encode_record(&mut self.writer, &term, term_postings)?;
        }
        self.writer.flush()?;
        Ok(self.path)
    }
}

/// Sequential reader over one bucket file, used by the k-way merge (§4.E
/// step 4). Reads records in the order they were written — lexicographic,
/// since the writer emitted the whole sorted vocabulary.
pub struct BucketReader {
    reader: BufReader<File>,
}

impl BucketReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(BucketReader { reader: BufReader::new(file) })
    }

    /// Returns the next `(term, postings)` record, or `None` at a clean
    /// EOF between records. An EOF partway through a record is a fatal
    /// `IndexCorruption` (surfaced by `codec::postings::decode_record_full`
    /// via its own `UnexpectedEof` mapping, not swallowed here).
    pub fn next_record(&mut self) -> Result<Option<(String, Vec<Posting>)>> {
        use std::io::Read;
        let mut probe = [0u8; 1];
        match self.reader.read(&mut probe)? {
            0 => return Ok(None),
            _ => {
                let mut chain = (&probe[..]).chain(&mut self.reader);
                let (term, postings) = postings::decode_record_full(&mut chain)?;
                Ok(Some((term, postings)))
            }
        }
    }
}

pub fn remove_bucket_files(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
    }
    Ok(())
}
