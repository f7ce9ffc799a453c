use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{Error, Result};
use crate::core::types::DocId;

/// One input document before tokenization: a title for display and the raw
/// content to run through a `Tokenizer`.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub doc_id: DocId,
    pub title: String,
    pub content: String,
}

/// External collaborator (§6): yields a finite sequence of documents. The
/// core assigns `DocId`s in iteration order when the source doesn't.
pub trait DocumentSource {
    /// Errors reading one document are fatal build errors by default (§6);
    /// a `DocumentSource` that wants skip-on-error semantics filters its
    /// own iterator before this trait sees it.
    fn documents(&self) -> Result<Vec<DocumentRecord>>;
}

/// Walks a directory one level deep and treats every regular file as one
/// document: the file name (without extension) is the title, the file's
/// UTF-8 contents are the body. Files are visited in sorted path order so
/// that `DocId` assignment is deterministic between runs (invariant 7).
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySource { root: root.into() }
    }
}

impl DocumentSource for DirectorySource {
    fn documents(&self) -> Result<Vec<DocumentRecord>> {
        if !self.root.is_dir() {
            return Err(Error::input(format!(
                "corpus directory does not exist: {}",
                self.root.display()
            )));
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for (index, path) in paths.into_iter().enumerate() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::input(format!("reading {}: {}", path.display(), e)))?;
            let title = title_from_path(&path);
            records.push(DocumentRecord {
                doc_id: DocId::new(index as u32),
                title,
                content,
            });
        }
        Ok(records)
    }
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
