use crate::error::StateError;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistent table of per-log-file read offsets
///
/// Maps each watched log file's absolute path to the byte offset through
/// which it has already been scanned, so successive runs only examine newly
/// appended data. The table is stored as a JSON object and survives process
/// restarts.
///
/// Load failures yield an empty table and save failures are reported to the
/// caller to log; neither aborts a run. Losing the table only means the next
/// run rescans files from the beginning, which is a tolerable cost for a
/// best-effort operational tool.
#[derive(Debug)]
pub struct OffsetStore {
    /// Path of the persisted JSON file
    path: PathBuf,
    /// In-memory offset table
    table: HashMap<String, u64>,
}

impl OffsetStore {
    /// Load the offset table from the given path
    ///
    /// A missing or unparsable file produces an empty table; the failure is
    /// logged but never propagated.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let table = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, u64>>(&contents) {
                Ok(table) => {
                    debug!(
                        "Loaded {} offsets from {}",
                        table.len(),
                        path.display()
                    );
                    table
                }
                Err(e) => {
                    warn!(
                        "Unparsable offset table at {}, starting empty: {}",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(e) => {
                debug!(
                    "No offset table at {} ({}), starting empty",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        };

        Self { path, table }
    }

    /// Last committed offset for a file, 0 if the file is new to the table
    pub fn offset(&self, file: &str) -> u64 {
        self.table.get(file).copied().unwrap_or(0)
    }

    /// Record a new offset for a file in memory
    ///
    /// Call [`save`](Self::save) afterwards to persist; the scanner commits
    /// after each file so a crash mid-run loses at most the in-flight file's
    /// progress.
    pub fn commit(&mut self, file: &str, offset: u64) {
        self.table.insert(file.to_string(), offset);
    }

    /// Persist the table to disk
    ///
    /// Writes to a sibling `.tmp` file and renames it over the target, so a
    /// concurrent reader never observes a partially written table.
    ///
    /// # Errors
    ///
    /// Returns `StateError` on serialization or I/O failure. Callers log and
    /// continue; unsaved progress is simply retried next run.
    pub fn save(&self) -> Result<(), StateError> {
        let tmp = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(&self.table)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(
            "Saved {} offsets to {}",
            self.table.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Path of the persisted table
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of tracked files
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
