//! Streaming content fingerprints.
//!
//! # Overview
//! [`Fingerprinter`] reads a file in fixed [`CHUNK_SIZE`] chunks and folds
//! them into the configured digest. MD5 is the default; SHA-256 and BLAKE3
//! are available since the algorithm is part of the observable output.
//!
//! Read failures come back as [`HashError`] values so the caller can record
//! the file as failed and carry on with its siblings.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use clap::ValueEnum;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::HashError;

/// Size of each read when streaming a file into the digest.
pub const CHUNK_SIZE: usize = 4096;

/// Digest algorithm used for content fingerprints.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// MD5 (32 hex characters)
    #[default]
    Md5,
    /// SHA-256 (64 hex characters)
    Sha256,
    /// BLAKE3 (64 hex characters)
    Blake3,
}

impl DigestAlgorithm {
    /// Lower-case algorithm name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }

    /// Length of a fingerprint in hex characters.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 | Self::Blake3 => 64,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lower-case hex digest of a file's full contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Borrow the hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the hex string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-progress digest for one of the supported algorithms.
enum DigestState {
    Md5(Md5),
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Self::Md5(Md5::new()),
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Md5(h) => h.update(chunk),
            Self::Sha256(h) => h.update(chunk),
            Self::Blake3(h) => {
                h.update(chunk);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Md5(h) => format!("{:x}", h.finalize()),
            Self::Sha256(h) => format!("{:x}", h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Computes content fingerprints with a fixed digest algorithm.
///
/// `Fingerprinter` holds no open handles and is `Send + Sync`, so one
/// instance can be shared across a worker pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fingerprinter {
    algorithm: DigestAlgorithm,
}

impl Fingerprinter {
    /// Create a fingerprinter for the given algorithm.
    #[must_use]
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The configured digest algorithm.
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Fingerprint the file at `path`.
    ///
    /// The file is opened once and closed before returning, on success and
    /// on failure alike.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read. Reading a
    /// directory is reported as [`HashError::Io`].
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let fingerprint = self
            .fingerprint_reader(file)
            .map_err(|e| HashError::from_io(path, e))?;
        log::trace!("{} {}: {}", self.algorithm, fingerprint, path.display());
        Ok(fingerprint)
    }

    /// Fingerprint everything readable from `reader`, in [`CHUNK_SIZE`] reads.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than [`io::ErrorKind::Interrupted`].
    pub fn fingerprint_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let mut state = DigestState::new(self.algorithm);
        let mut buffer = [0u8; CHUNK_SIZE];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => state.update(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(Fingerprint(state.finalize_hex()))
    }
}
