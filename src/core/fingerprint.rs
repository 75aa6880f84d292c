//! Content fingerprinting used for cache-key derivation.
//!
//! Fragments must be stable across processes and time for identical content,
//! so directory walks are sorted before hashing.

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },
}

impl From<FingerprintError> for AppError {
    fn from(err: FingerprintError) -> Self {
        let message = err.to_string();
        AppError::with_source(ErrorCategory::FingerprintError, message, Box::new(err))
    }
}

pub fn compute_sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Fingerprint a single file's content.
pub fn fingerprint_file(path: &Path) -> Result<String, FingerprintError> {
    let bytes = fs::read(path).map_err(|source| FingerprintError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(compute_sha256_hex(&bytes))
}

/// Fingerprint a directory tree: relative paths and file contents, walked in
/// sorted order. Same content always yields the same fingerprint.
pub fn fingerprint_dir(root: &Path) -> Result<String, FingerprintError> {
    if !root.is_dir() {
        return Err(FingerprintError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    let mut hasher = Sha256::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| FingerprintError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path());
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        let bytes = fs::read(entry.path()).map_err(|source| FingerprintError::Unreadable {
            path: entry.path().to_path_buf(),
            source,
        })?;
        hasher.update(&bytes);
        hasher.update([0u8]);
    }
    Ok(hex::encode(hasher.finalize()))
}
