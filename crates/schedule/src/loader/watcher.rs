//! Filesystem event handler for the notify watcher (hot-reload).

use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tracing::{info, warn};

use crate::schema::ScheduledItem;

use super::core::{is_yaml, parse_item};
use super::store::ItemStore;

/// Handle a single filesystem event from the notify watcher.
pub(super) fn handle_fs_event(event: &Event, items: &Arc<RwLock<ItemStore>>) {
    for path in &event.paths {
        if !is_yaml(path) {
            continue;
        }

        // Skip dotfiles (including our .tmp files)
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                continue;
            }
        }

        match &event.kind {
            EventKind::Create(CreateKind::File)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_)) => {
                if !path.exists() {
                    // Rename away from this path.
                    remove_item_by_path(items, path);
                    continue;
                }
                match fs::read_to_string(path) {
                    Ok(contents) => match parse_item(&contents, path) {
                        Ok(item) => {
                            let item_id = item.id.clone();
                            let kind = item.kind;
                            let inserted = items.write().expect("items lock poisoned").insert(item, path);
                            match inserted {
                                Ok(()) => {
                                    info!(item_id = %item_id, kind = %kind, path = %path.display(), "hot-reloaded schedule item");
                                }
                                Err(existing) => {
                                    warn!(
                                        item_id = %item_id,
                                        path = %path.display(),
                                        existing = %existing.display(),
                                        "duplicate item id during hot-reload, keeping the existing file"
                                    );
                                }
                            }
                        }
                        Err(e) => {
                            warn!(
                                path = %path.display(),
                                error = %e,
                                "failed to parse item during hot-reload, keeping previous version"
                            );
                        }
                    },
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to read file during hot-reload");
                    }
                }
            }
            EventKind::Remove(RemoveKind::File) => {
                remove_item_by_path(items, path);
            }
            _ => {}
        }
    }
}

/// Remove the item that was loaded from `path`.
fn remove_item_by_path(items: &Arc<RwLock<ItemStore>>, path: &Path) -> Option<ScheduledItem> {
    let removed = items.write().expect("items lock poisoned").remove_path(path);
    if let Some(item) = &removed {
        info!(item_id = %item.id, path = %path.display(), "removed schedule item after file deletion");
    }
    removed
}

#[cfg(test)]
mod tests {
    use notify::event::RenameMode;
    use tempfile::TempDir;

    use super::*;

    const ITEM_YAML: &str = r#"
id: deep-clean
kind: task
title: Limpeza pesada
recurrence:
  kind: daily
"#;

    fn event(kind: EventKind, path: &Path) -> Event {
        Event::new(kind).add_path(path.to_path_buf())
    }

    #[test]
    fn create_then_remove_nested_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cozinha").join("limpeza.yml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, ITEM_YAML).unwrap();
        let items = Arc::new(RwLock::new(ItemStore::default()));

        handle_fs_event(&event(EventKind::Create(CreateKind::File), &path), &items);
        assert!(items.read().unwrap().get("deep-clean").is_some());

        fs::remove_file(&path).unwrap();
        handle_fs_event(&event(EventKind::Remove(RemoveKind::File), &path), &items);
        assert!(items.read().unwrap().get("deep-clean").is_none());
    }

    #[test]
    fn duplicate_id_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("deep-clean.yml");
        let second = dir.path().join("copia.yml");
        fs::write(&first, ITEM_YAML).unwrap();
        fs::write(&second, ITEM_YAML.replace("Limpeza pesada", "Cópia")).unwrap();
        let items = Arc::new(RwLock::new(ItemStore::default()));

        handle_fs_event(&event(EventKind::Create(CreateKind::File), &first), &items);
        handle_fs_event(&event(EventKind::Create(CreateKind::File), &second), &items);

        let store = items.read().unwrap();
        assert_eq!(store.get("deep-clean").unwrap().title, "Limpeza pesada");
        assert_eq!(store.source("deep-clean"), Some(first.as_path()));
    }

    #[test]
    fn rename_away_unloads_item() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep-clean.yml");
        fs::write(&path, ITEM_YAML).unwrap();
        let items = Arc::new(RwLock::new(ItemStore::default()));
        handle_fs_event(&event(EventKind::Create(CreateKind::File), &path), &items);

        fs::rename(&path, dir.path().join("deep-clean.bak")).unwrap();
        handle_fs_event(
            &event(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &path),
            &items,
        );
        assert!(items.read().unwrap().get("deep-clean").is_none());
    }
}
