//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//! Files are read through a fixed-size buffer (4096 bytes by default), so
//! memory use stays bounded no matter how large the file is. Only one file
//! handle and one buffer are live at a time.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::HashError;

/// Default read buffer size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Streaming content hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hasher {
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a custom read buffer size (clamped to at least one byte).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Configured read buffer size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compute the digest of the whole file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails
    /// mid-stream. Callers treat the file as un-hashable and move on.
    pub fn digest(&self, path: &Path) -> Result<Hash, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buffer[..read]);
        }

        log::trace!("Hashed {}", path.display());
        Ok(*hasher.finalize().as_bytes())
    }
}

/// Digest a file with the given chunk size.
///
/// # Errors
///
/// See [`Hasher::digest`].
pub fn digest(path: &Path, chunk_size: usize) -> Result<Hash, HashError> {
    Hasher::new().with_chunk_size(chunk_size).digest(path)
}

/// Render a digest as lowercase hex (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Parse a 64-character hex string back into a digest.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}
