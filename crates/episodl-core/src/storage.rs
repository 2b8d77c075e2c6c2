//! Disk I/O and file lifecycle for episode media.
//!
//! Bytes are streamed into `<final>.part` and renamed to the final path only
//! once the transfer succeeded, so a finished name never holds a partial file.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `ep.mp4` → `ep.mp4.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for an in-progress download.
pub struct PartFile {
    file: File,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Creates (truncating) `<final_path>.part`, creating parent directories as needed.
    pub fn create(final_path: &Path) -> Result<Self> {
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        Ok(PartFile {
            file,
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    /// Appends `data`.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .write_all(data)
            .with_context(|| format!("write {}", self.temp_path.display()))?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Syncs and renames the temp file onto the final path. Returns bytes written.
    pub fn finalize(self) -> Result<u64> {
        self.file.sync_all().context("storage sync failed")?;
        let PartFile {
            file,
            temp_path,
            final_path,
            written,
        } = self;
        drop(file);
        fs::rename(&temp_path, &final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;
        Ok(written)
    }

    /// Drops the partial file. Downloads are not resumable, so nothing is kept.
    pub fn discard(self) {
        let PartFile { file, temp_path, .. } = self;
        drop(file);
        if let Err(e) = fs::remove_file(&temp_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %temp_path.display(), "remove partial file: {}", e);
            }
        }
    }
}
