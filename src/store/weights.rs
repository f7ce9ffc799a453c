use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::core::error::{Error, Result};

/// The document-weights file (§3, §6): a dense array of 8-byte IEEE-754
/// little-endian doubles indexed directly by `DocId`, no framing of any
/// kind — `documentWeights()` is a straight sequential read.
pub fn write_weights(path: impl AsRef<Path>, weights: &[f64]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for weight in weights {
        writer.write_all(&weight.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_weights(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.len() % 8 != 0 {
        return Err(Error::corruption("document-weights file length is not a multiple of 8"));
    }
    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| f64::from_le_bytes(chunk.try_into().unwrap()))
        .collect())
}
