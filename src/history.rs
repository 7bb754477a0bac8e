use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::{error::Result, models::HistoryEntry};

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self) -> Result<Vec<HistoryEntry>>;
    async fn save(&self, entries: &[HistoryEntry]) -> Result<()>;
}

/// Pretty-printed JSON array on disk, most recent first.
pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistory {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        log::debug!("Saved {} history entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.clone())
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = entries.to_vec();
        Ok(())
    }
}

/// In-memory list backed by a store. New entries go to the front.
pub struct History {
    store: Box<dyn HistoryStore>,
    entries: Vec<HistoryEntry>,
}

impl History {
    pub async fn open(store: Box<dyn HistoryStore>) -> Result<Self> {
        let entries = store.load().await?;
        log::info!("📚 Loaded {} history entries", entries.len());
        Ok(Self { store, entries })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryHistory::default()),
            entries: Vec::new(),
        }
    }

    /// Persists first; the in-memory list only changes once the store accepted it.
    pub async fn record(&mut self, entry: HistoryEntry) -> Result<()> {
        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(entry);
        next.extend(self.entries.iter().cloned());

        self.store.save(&next).await?;
        self.entries = next;
        Ok(())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
