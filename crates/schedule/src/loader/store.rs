//! In-memory item map plus the file each item came from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::schema::ScheduledItem;

#[derive(Debug, Default)]
pub(super) struct ItemStore {
    items: HashMap<String, ScheduledItem>,
    sources: HashMap<String, PathBuf>,
}

impl ItemStore {
    /// Insert an item read from `path`.
    ///
    /// Fails with the other file's path when a different file that still
    /// exists already holds the same id.
    pub(super) fn insert(&mut self, item: ScheduledItem, path: &Path) -> Result<(), PathBuf> {
        if let Some(existing) = self.sources.get(&item.id) {
            if existing != path && existing.exists() {
                return Err(existing.clone());
            }
        }
        // A file whose id changed no longer backs its old id.
        if let Some(old_id) = self.id_at(path) {
            if old_id != item.id {
                self.remove(&old_id);
            }
        }
        self.sources.insert(item.id.clone(), path.to_path_buf());
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    /// Insert or replace an item, making `path` its source.
    pub(super) fn put(&mut self, item: ScheduledItem, path: &Path) {
        self.remove(&item.id);
        self.sources.insert(item.id.clone(), path.to_path_buf());
        self.items.insert(item.id.clone(), item);
    }

    pub(super) fn get(&self, id: &str) -> Option<&ScheduledItem> {
        self.items.get(id)
    }

    pub(super) fn source(&self, id: &str) -> Option<&Path> {
        self.sources.get(id).map(PathBuf::as_path)
    }

    pub(super) fn items(&self) -> impl Iterator<Item = &ScheduledItem> {
        self.items.values()
    }

    pub(super) fn remove(&mut self, id: &str) -> Option<ScheduledItem> {
        self.sources.remove(id);
        self.items.remove(id)
    }

    /// Remove whichever item was loaded from `path`.
    pub(super) fn remove_path(&mut self, path: &Path) -> Option<ScheduledItem> {
        let id = self.id_at(path)?;
        self.remove(&id)
    }

    fn id_at(&self, path: &Path) -> Option<String> {
        self.sources
            .iter()
            .find(|(_, p)| p.as_path() == path)
            .map(|(id, _)| id.clone())
    }
}
