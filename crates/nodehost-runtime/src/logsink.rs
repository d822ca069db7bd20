//! Combined stdout/stderr capture for one launch.
//!
//! Each launch starts a fresh log: a previous file at the same path is
//! deleted first (best-effort) and the new one is opened in append mode.
//! Chunks from either stream are written whole under one lock, so the two
//! streams never interleave inside a chunk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// The most recent chunk of output, trimmed of its trailing line break.
///
/// Only the latest chunk matters; it is read once the child has exited to
/// explain why.
#[derive(Debug, Clone, Default)]
pub struct LogTail {
    last: Arc<Mutex<String>>,
}

impl LogTail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the last line with `chunk`, returning the stored text.
    ///
    /// Chunks that are empty after trimming leave the previous value.
    pub fn record(&self, chunk: &[u8]) -> String {
        let text = String::from_utf8_lossy(chunk);
        let trimmed = text.trim_end_matches(['\r', '\n']);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if !trimmed.is_empty() {
            trimmed.clone_into(&mut *last);
        }
        last.clone()
    }

    pub fn last_line(&self) -> String {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Writer for the node log file, shared by the stdout and stderr pumps.
///
/// Clones share the same file; it is closed when the last clone drops.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
    file: Arc<tokio::sync::Mutex<File>>,
    tail: LogTail,
}

impl LogSink {
    /// Rotate any existing log at `path` and open a fresh one for appending.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();

        match fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "Removed previous log file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Could not remove previous log file");
            }
        }

        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Arc::new(tokio::sync::Mutex::new(file)),
            tail: LogTail::new(),
        })
    }

    /// Append one chunk and update the tail.
    ///
    /// The tail is updated even if the write fails.
    pub async fn write_chunk(&self, chunk: &[u8]) -> io::Result<()> {
        self.tail.record(chunk);
        let mut file = self.file.lock().await;
        file.write_all(chunk).await?;
        file.flush().await
    }

    pub fn tail(&self) -> &LogTail {
        &self.tail
    }

    pub fn last_line(&self) -> String {
        self.tail.last_line()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
