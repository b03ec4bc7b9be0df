use std::fmt;
use std::path::Path;

use crate::error::DropError;

/// First line of every datadrop pointer file.
pub const POINTER_VERSION_LINE: &str = "version https://datadrop.dev/spec/v1";

/// Hash algorithm identifier used in pointer files.
pub const HASH_ALGO: &str = "xxh3";

/// Pointer files should never exceed this size in bytes.
pub const MAX_POINTER_SIZE: usize = 200;

/// A small stand-in that lives in the working tree and references content
/// kept in the version store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerFile {
    /// 32-char lowercase hex hash (no algorithm prefix).
    pub oid: String,
    /// Size in bytes of the original content.
    pub size: u64,
}

/// What a file in the working tree turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerRead {
    /// Regular file, not managed by the content store
    NotPointer,
    /// Starts like a pointer but does not parse as one
    Malformed,
    Pointer(PointerFile),
}

impl PointerFile {
    pub fn new(hash: &str, size: u64) -> Self {
        Self {
            oid: hash.to_string(),
            size,
        }
    }

    /// Returns `None` when the data is not a valid pointer.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() > MAX_POINTER_SIZE {
            return None;
        }

        let text = std::str::from_utf8(data).ok()?;
        let mut lines = text.lines();

        if lines.next()? != POINTER_VERSION_LINE {
            return None;
        }

        let hash = lines
            .next()?
            .strip_prefix("oid ")?
            .strip_prefix(&format!("{HASH_ALGO}:"))?;
        if hash.len() != 32 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let size: u64 = lines.next()?.strip_prefix("size ")?.parse().ok()?;

        if lines.next().is_some() {
            return None;
        }

        Some(Self {
            oid: hash.to_lowercase(),
            size,
        })
    }

    /// Cheap check on the first bytes only, does not validate the rest
    pub fn has_pointer_header(data: &[u8]) -> bool {
        data.starts_with(POINTER_VERSION_LINE.as_bytes())
    }

    /// Classify the file at `path` without reading more than a pointer's worth
    pub fn read(path: &Path) -> Result<PointerRead, DropError> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Ok(PointerRead::NotPointer);
        }

        let header_len = POINTER_VERSION_LINE.len() as u64;
        if metadata.len() < header_len {
            return Ok(PointerRead::NotPointer);
        }

        let data = if metadata.len() as usize > MAX_POINTER_SIZE {
            let mut header = vec![0u8; header_len as usize];
            let mut file = std::fs::File::open(path)?;
            std::io::Read::read_exact(&mut file, &mut header)?;
            header
        } else {
            std::fs::read(path)?
        };

        if !Self::has_pointer_header(&data) {
            return Ok(PointerRead::NotPointer);
        }

        match Self::decode(&data) {
            Some(pointer) => Ok(PointerRead::Pointer(pointer)),
            None => Ok(PointerRead::Malformed),
        }
    }
}

impl fmt::Display for PointerFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\noid {}:{}\nsize {}\n",
            POINTER_VERSION_LINE, HASH_ALGO, self.oid, self.size,
        )
    }
}
