use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only text sink, one line per record.
///
/// Writers in this process are serialized by the mutex. Each line goes out in
/// a single `write_all` on a file opened with `O_APPEND`, so other worker
/// processes appending to the same file cannot interleave with it.
pub struct AppendLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AppendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `line` plus a newline and syncs it to disk.
    ///
    /// Embedded newlines are replaced with spaces so one call always yields
    /// exactly one line.
    pub async fn append_line(&self, line: &str) -> io::Result<()> {
        let mut buf = line.replace(['\r', '\n'], " ");
        buf.push('\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.sync_data().await?;
        Ok(())
    }
}
