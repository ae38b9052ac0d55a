use async_trait::async_trait;
use nr_core::{FeedbackEntry, FeedbackStore, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

struct CsvState {
    entries: Vec<FeedbackEntry>,
    writer: csv::Writer<File>,
}

/// Append-only feedback file with a `user_id,article_id,feedback` header.
///
/// Existing rows are loaded on open. Every append is written and flushed
/// while the lock is held; dropping the store flushes once more.
pub struct CsvFeedbackStore {
    path: PathBuf,
    state: Mutex<CsvState>,
}

impl std::fmt::Debug for CsvFeedbackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvFeedbackStore")
            .field("path", &self.path)
            .finish()
    }
}

impl CsvFeedbackStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let exists = path.exists() && std::fs::metadata(&path)?.len() > 0;
        let entries = if exists { read_entries(&path)? } else { Vec::new() };
        debug!("Loaded {} feedback rows from {}", entries.len(), path.display());

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let writer = csv::WriterBuilder::new().has_headers(!exists).from_writer(file);

        Ok(Self {
            path,
            state: Mutex::new(CsvState { entries, writer }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_entries(path: &Path) -> Result<Vec<FeedbackEntry>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut entries = Vec::new();
    for row in reader.deserialize::<FeedbackEntry>() {
        entries.push(row?);
    }
    Ok(entries)
}

#[async_trait]
impl FeedbackStore for CsvFeedbackStore {
    async fn append(&self, entry: FeedbackEntry) -> Result<()> {
        let mut state = self.state.lock().await;
        state.writer.serialize(&entry)?;
        state.writer.flush()?;
        state.entries.push(entry);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<FeedbackEntry>> {
        Ok(self.state.lock().await.entries.clone())
    }

    async fn flush(&self) -> Result<()> {
        self.state.lock().await.writer.flush()?;
        Ok(())
    }
}

impl Drop for CsvFeedbackStore {
    fn drop(&mut self) {
        if let Err(e) = self.state.get_mut().writer.flush() {
            warn!("Failed to flush feedback file {}: {}", self.path.display(), e);
        }
    }
}
