//! Bounded, most-recent-first list of searched city names.

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the JSON-encoded history array.
pub const HISTORY_KEY: &str = "weatherHistory";

pub const MAX_HISTORY: usize = 10;

/// Move `city` to the front of `history`, dropping any entry that matches it
/// case-insensitively, and cap the list at `cap` entries.
pub fn push_recent(mut history: Vec<String>, city: &str, cap: usize) -> Vec<String> {
    let needle = city.to_lowercase();
    history.retain(|existing| existing.to_lowercase() != needle);
    history.insert(0, city.to_string());
    history.truncate(cap);
    history
}

#[derive(Debug)]
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Saved cities, most recent first. Absent or unreadable values count as empty.
    pub fn load(&self) -> Result<Vec<String>, StorageError> {
        let Some(raw) = self.store.get_item(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(history) => Ok(history),
            Err(e) => {
                tracing::warn!("Ignoring unreadable search history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Record a search and return the rewritten list.
    pub fn save_city(&mut self, city: &str) -> Result<Vec<String>, StorageError> {
        let history = push_recent(self.load()?, city, MAX_HISTORY);

        let encoded = serde_json::to_string(&history).map_err(StorageError::Encode)?;
        self.store.set_item(HISTORY_KEY, encoded)?;

        Ok(history)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove_item(HISTORY_KEY)
    }
}
