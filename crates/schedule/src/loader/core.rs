//! Core [`ScheduleLoader`] struct: filesystem-backed item loading with optional hot-reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::error::{Result, ScheduleError};
use crate::schema::ScheduledItem;
use crate::validation::validate_item;

use super::error::{LoadResult, LoadStatus};
use super::store::ItemStore;
use super::watcher::handle_fs_event;

pub(super) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}

/// Parse and validate one item document.
///
/// Validation errors reject the item; warnings are logged and the item is kept.
pub(super) fn parse_item(contents: &str, path: &Path) -> Result<ScheduledItem> {
    let item = ScheduledItem::from_yaml(contents)?;

    let checked = validate_item(&item);
    if !checked.valid {
        return Err(ScheduleError::Validation(format!(
            "item '{}': {}",
            item.id,
            checked.error_summary()
        )));
    }
    for w in &checked.warnings {
        warn!(item_id = %item.id, path = %w.path, file = %path.display(), "{}", w.message);
    }

    Ok(item)
}

/// Filesystem-backed schedule loader with optional hot-reload.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files and keeps an
/// in-memory map of [`ScheduledItem`]s keyed by item id, remembering which
/// file each item came from. Two files may not share an id.
pub struct ScheduleLoader {
    /// Root directory containing item YAML files.
    schedules_dir: PathBuf,
    /// In-memory store of all items keyed by `id`.
    items: Arc<RwLock<ItemStore>>,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl ScheduleLoader {
    /// Create a new loader for the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist. The path is
    /// canonicalized so item sources match the paths watcher events carry.
    pub fn new(schedules_dir: PathBuf) -> Self {
        if !schedules_dir.exists() {
            if let Err(e) = fs::create_dir_all(&schedules_dir) {
                warn!(path = %schedules_dir.display(), error = %e, "failed to create schedules directory");
            }
        }
        let schedules_dir = fs::canonicalize(&schedules_dir).unwrap_or(schedules_dir);
        Self {
            schedules_dir,
            items: Arc::new(RwLock::new(ItemStore::default())),
            _watcher: None,
        }
    }

    /// Recursively scan the schedules directory and load all YAML files.
    ///
    /// Dotfiles and non-YAML files are skipped. Parse and validation errors
    /// are reported per file but do not abort the scan.
    pub fn load_all(&self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        self.scan_dir_recursive(&self.schedules_dir, &mut results)?;
        Ok(results)
    }

    fn scan_dir_recursive(&self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            if !is_yaml(&path) {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            let loaded = self.load_file(&path).and_then(|item| {
                let item_id = item.id.clone();
                let kind = item.kind;
                let inserted = self
                    .items
                    .write()
                    .expect("items lock poisoned")
                    .insert(item, &path);
                match inserted {
                    Ok(()) => {
                        info!(item_id = %item_id, kind = %kind, path = %path.display(), "loaded schedule item");
                        Ok(item_id)
                    }
                    Err(existing) => Err(ScheduleError::Validation(format!(
                        "duplicate id '{}' (already loaded from {})",
                        item_id,
                        existing.display()
                    ))),
                }
            });

            match loaded {
                Ok(item_id) => {
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded { item_id },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load schedule file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(())
    }

    /// Parse and validate a single item file without inserting it.
    pub fn load_file(&self, path: &Path) -> Result<ScheduledItem> {
        let contents = fs::read_to_string(path)?;
        parse_item(&contents, path)
    }

    /// Start a filesystem watcher with 500ms debounce.
    ///
    /// On file create/modify the item is re-parsed and upserted.
    /// On file delete the item is removed from the in-memory map.
    /// Parse errors are logged as warnings; the previous version is kept.
    pub fn watch(&mut self) -> Result<()> {
        let items = Arc::clone(&self.items);

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => handle_fs_event(&event, &items),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        watcher.watch(&self.schedules_dir, RecursiveMode::Recursive)?;

        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %self.schedules_dir.display(), "watching schedules directory for changes (recursive)");
        self._watcher = Some(watcher);
        Ok(())
    }

    /// Get the schedules directory path.
    pub fn schedules_dir(&self) -> &Path {
        &self.schedules_dir
    }

    /// Snapshot of all loaded items, sorted by id.
    pub fn items(&self) -> Vec<ScheduledItem> {
        let mut items: Vec<ScheduledItem> = self
            .items
            .read()
            .expect("items lock poisoned")
            .items()
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// Look up a single item by id.
    pub fn get(&self, id: &str) -> Option<ScheduledItem> {
        self.items
            .read()
            .expect("items lock poisoned")
            .get(id)
            .cloned()
    }

    /// File an item was loaded from or last written to.
    pub fn source_path(&self, id: &str) -> Option<PathBuf> {
        self.items
            .read()
            .expect("items lock poisoned")
            .source(id)
            .map(Path::to_path_buf)
    }

    /// Atomically write an item.
    ///
    /// A known item is rewritten in place, wherever it lives under the
    /// schedules directory; a new one goes to `<id>.yml` at the root.
    /// Writes to a dot-prefixed `.tmp` file first, then renames to the final
    /// path to avoid partial writes on crash. Invalid items are rejected.
    pub fn write_item(&self, item: &ScheduledItem) -> Result<PathBuf> {
        let checked = validate_item(item);
        if !checked.valid {
            return Err(ScheduleError::Validation(format!(
                "item '{}': {}",
                item.id,
                checked.error_summary()
            )));
        }

        let final_path = self
            .source_path(&item.id)
            .unwrap_or_else(|| self.schedules_dir.join(format!("{}.yml", item.id)));
        let tmp_path = final_path.with_file_name(format!(".{}.tmp", item.id));

        let yaml = item.to_yaml()?;
        fs::write(&tmp_path, yaml)?;
        fs::rename(&tmp_path, &final_path)?;

        info!(item_id = %item.id, kind = %item.kind, path = %final_path.display(), "wrote schedule item");

        self.items
            .write()
            .expect("items lock poisoned")
            .put(item.clone(), &final_path);
        Ok(final_path)
    }

    /// Delete an item by id, removing both its file and the in-memory entry.
    pub fn delete_item(&self, id: &str) -> Result<()> {
        let path = self.source_path(id).ok_or_else(|| {
            ScheduleError::Validation(format!("no schedule file found for id '{}'", id))
        })?;

        if path.exists() {
            fs::remove_file(&path)?;
        }
        self.items.write().expect("items lock poisoned").remove(id);

        info!(item_id = %id, path = %path.display(), "deleted schedule item");
        Ok(())
    }
}
