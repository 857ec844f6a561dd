//! File hashing utilities

use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::utils::config::HashingConsts;
use crate::{Sha1Digest, UnitFailure, WorkUnit};

/// SHA-1 accumulator plus read buffer, owned by one digest worker and reused for every file it hashes.
pub struct FileDigester {
    hasher: Sha1,
    buffer: Vec<u8>,
}

impl Default for FileDigester {
    fn default() -> Self {
        Self::new()
    }
}

impl FileDigester {
    pub fn new() -> Self {
        Self {
            hasher: Sha1::new(),
            buffer: vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE],
        }
    }

    /// Open `path` and hash its full content. The handle is closed on every return path.
    pub fn digest_file(&mut self, path: &Path) -> Result<Sha1Digest, UnitFailure> {
        let file = File::open(path).map_err(UnitFailure::Open)?;
        self.digest_reader(file)
    }

    /// Stream `reader` through the accumulator. Resets first, so a previous failed read leaves no trace.
    pub fn digest_reader<R: Read>(&mut self, mut reader: R) -> Result<Sha1Digest, UnitFailure> {
        self.hasher.reset();
        loop {
            match reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => self.hasher.update(&self.buffer[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(UnitFailure::Read(e)),
            }
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.hasher.finalize_reset());
        Ok(out)
    }

    /// Fill in `unit.digest` or `unit.failure`.
    pub fn process(&mut self, unit: &mut WorkUnit) {
        match self.digest_file(&unit.path) {
            Ok(digest) => unit.digest = Some(digest),
            Err(failure) => unit.failure = Some(failure),
        }
    }
}

/// Hash one file with a fresh accumulator.
pub fn hash_file(path: &Path) -> Result<Sha1Digest, UnitFailure> {
    FileDigester::new().digest_file(path)
}

/// Lowercase hex rendering of digest bytes.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
