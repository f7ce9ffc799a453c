use std::path::PathBuf;

use crate::core::config::IndexConfig;

/// Bucket file naming for component D. One file per spill, numbered in
/// emission order so the merge step (component E step 4) can open them all
/// and know nothing about how many there will be ahead of time.
pub fn bucket_path(config: &IndexConfig, bucket_index: usize) -> PathBuf {
    config.bucket_dir.join(format!("bucket_{bucket_index}.bin"))
}
