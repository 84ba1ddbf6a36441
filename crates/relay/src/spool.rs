//! Transient storage for attachment bytes.

use {
    std::path::Path,
    tempfile::{NamedTempFile, TempPath},
};

use crate::policy;

/// Attachment bytes spooled to a uniquely named temporary file.
///
/// Exactly one exists per in-flight relay operation and it never outlives
/// the `relay()` call that created it: the pipeline calls [`discard`] on
/// every exit path past a successful fetch, and the `TempPath` drop guard
/// removes the file even if the operation unwinds.
///
/// [`discard`]: MaterializedFile::discard
#[derive(Debug)]
pub struct MaterializedFile {
    path: TempPath,
    byte_len: u64,
    declared_name: String,
}

impl MaterializedFile {
    /// Spool `bytes` to a fresh temp file, preserving the declared name's
    /// extension so downstream tooling can sniff the type from the path.
    ///
    /// Each call gets its own file; concurrent operations with identical
    /// declared names never collide.
    pub fn write(declared_name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let temp = match policy::extension_of(declared_name) {
            Some(ext) => NamedTempFile::with_suffix(format!(".{ext}"))?,
            None => NamedTempFile::new()?,
        };
        std::fs::write(temp.path(), bytes)?;

        Ok(Self {
            path: temp.into_temp_path(),
            byte_len: bytes.len() as u64,
            declared_name: declared_name.to_owned(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// The name the sender declared, not the spool path's file name.
    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    /// Remove the backing file now and report failures, so the caller can
    /// log them instead of losing them in a silent drop.
    pub fn discard(self) -> std::io::Result<()> {
        self.path.close()
    }
}
