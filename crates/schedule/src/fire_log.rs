//! Persistent log of item fires.
//!
//! Every fire is appended as one JSON line to a file, so `last_fired_at`
//! survives a worker restart. An in-memory per-item history capped at a
//! configurable maximum (default 500, FIFO eviction) serves queries.
//! Opening the log rewrites the file down to that history when it holds
//! more.

use std::collections::{HashMap, VecDeque};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::schema::ItemKind;

/// Default per-item history cap.
pub const DEFAULT_MAX_ENTRIES_PER_ITEM: usize = 500;

/// One fire of one item, with the delivery outcome per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireRecord {
    pub id: Uuid,
    pub item_id: String,
    pub item_kind: ItemKind,
    pub fired_at: DateTime<Utc>,
    #[serde(default)]
    pub channels_ok: Vec<String>,
    #[serde(default)]
    pub channels_failed: Vec<String>,
}

impl FireRecord {
    pub fn new(item_id: impl Into<String>, item_kind: ItemKind, fired_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id: item_id.into(),
            item_kind,
            fired_at,
            channels_ok: Vec::new(),
            channels_failed: Vec::new(),
        }
    }

    /// True when at least one channel was attempted and none succeeded.
    pub fn all_failed(&self) -> bool {
        self.channels_ok.is_empty() && !self.channels_failed.is_empty()
    }
}

/// Query parameters for [`FireLog::query`].
#[derive(Debug, Default, Deserialize)]
pub struct FireQuery {
    /// Only return fires at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of records to return (default 100).
    pub limit: Option<u32>,
}

/// Append-only fire log backed by a JSON-lines file.
pub struct FireLog {
    path: Option<PathBuf>,
    entries: Arc<RwLock<HashMap<String, VecDeque<FireRecord>>>>,
    max_entries_per_item: usize,
}

impl FireLog {
    /// Open (or create) a fire log at `path`, replaying existing lines.
    ///
    /// Malformed lines are skipped with a warning.
    pub fn open(path: impl Into<PathBuf>, max_entries_per_item: usize) -> Result<Self> {
        let path = path.into();
        let log = Self {
            path: Some(path.clone()),
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries_per_item: max_entries_per_item.max(1),
        };

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let mut lines = 0usize;
            for (n, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                lines += 1;
                match serde_json::from_str::<FireRecord>(&line) {
                    Ok(record) => log.remember(record),
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            line = n + 1,
                            error = %e,
                            "skipping malformed fire log line"
                        );
                    }
                }
            }

            let kept = log.len();
            info!(path = %path.display(), lines, kept, "replayed fire log");
            if kept < lines {
                log.compact(&path)?;
            }
        } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        Ok(log)
    }

    /// Rewrite the file with only the retained records, oldest first.
    fn compact(&self, path: &Path) -> Result<()> {
        let mut records: Vec<FireRecord> = {
            let guard = self.entries.read().expect("fire_log lock poisoned");
            guard.values().flatten().cloned().collect()
        };
        records.sort_by_key(|r| r.fired_at);

        let mut contents = String::new();
        for record in &records {
            contents.push_str(&serde_json::to_string(record)?);
            contents.push('\n');
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, path)?;

        info!(path = %path.display(), records = records.len(), "compacted fire log");
        Ok(())
    }

    /// Number of retained records across all items.
    pub fn len(&self) -> usize {
        let guard = self.entries.read().expect("fire_log lock poisoned");
        guard.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A fire log that is never written to disk.
    pub fn in_memory(max_entries_per_item: usize) -> Self {
        Self {
            path: None,
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries_per_item: max_entries_per_item.max(1),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append a record to the file and the in-memory history.
    pub fn append(&self, record: FireRecord) -> Result<()> {
        if let Some(path) = &self.path {
            let mut line = serde_json::to_string(&record)?;
            line.push('\n');
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(line.as_bytes())?;
        }
        self.remember(record);
        Ok(())
    }

    fn remember(&self, record: FireRecord) {
        let mut guard = self.entries.write().expect("fire_log lock poisoned");
        let deque = guard.entry(record.item_id.clone()).or_default();
        deque.push_back(record);
        while deque.len() > self.max_entries_per_item {
            deque.pop_front();
        }
    }

    /// Latest `fired_at` per item id.
    pub fn last_fired(&self) -> HashMap<String, DateTime<Utc>> {
        let guard = self.entries.read().expect("fire_log lock poisoned");
        guard
            .iter()
            .filter_map(|(id, deque)| {
                deque
                    .iter()
                    .map(|r| r.fired_at)
                    .max()
                    .map(|at| (id.clone(), at))
            })
            .collect()
    }

    /// Fires of one item, newest first.
    pub fn query(&self, item_id: &str, params: &FireQuery) -> Vec<FireRecord> {
        let guard = self.entries.read().expect("fire_log lock poisoned");
        let Some(deque) = guard.get(item_id) else {
            return Vec::new();
        };

        let limit = params.limit.unwrap_or(100) as usize;

        deque
            .iter()
            .rev()
            .filter(|r| params.since.map_or(true, |s| r.fired_at >= s))
            .take(limit)
            .cloned()
            .collect()
    }
}
