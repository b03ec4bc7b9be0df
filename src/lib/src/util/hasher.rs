use std::path::Path;

use xxhash_rust::xxh3::xxh3_128;

use crate::error::DropError;

/// 32 char lowercase hex digest of a buffer
pub fn hash_buffer(buffer: &[u8]) -> String {
    format!("{:032x}", xxh3_128(buffer))
}

pub fn hash_file_contents(path: &Path) -> Result<String, DropError> {
    let contents = std::fs::read(path)?;
    Ok(hash_buffer(&contents))
}
