//! Snapshot index construction and diffing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::WatcherConfig;
use crate::error::Result;
use crate::event::{FsEvent, PathMetadata};

/// The tree as last observed: absolute path to metadata.
///
/// Entries whose metadata cannot be read are skipped during construction;
/// an entry without metadata cannot be diffed meaningfully.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotIndex {
    entries: HashMap<PathBuf, PathMetadata>,
}

impl SnapshotIndex {
    /// Scan the subtree rooted at `root` (root inclusive) into a fresh index.
    ///
    /// Per-entry walk or metadata failures are skipped. A failure on the
    /// root itself (vanished, permission denied) is fatal.
    pub fn build(root: &Path, config: &WatcherConfig) -> Result<Self> {
        let mut entries = HashMap::new();

        let walker = WalkDir::new(root)
            .follow_links(config.follow_symlinks)
            .max_depth(config.max_depth.unwrap_or(usize::MAX));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // Depth zero is the root: nothing to index.
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    debug!("skipping unreadable entry: {err}");
                    continue;
                }
            };

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    debug!("skipping {}: {err}", entry.path().display());
                    continue;
                }
            };

            match PathMetadata::try_from(&metadata) {
                Ok(recorded) => {
                    entries.insert(entry.path().to_path_buf(), recorded);
                }
                Err(err) => debug!("skipping {}: {err}", entry.path().display()),
            }
        }

        Ok(Self { entries })
    }

    /// Diff the retained index against a freshly scanned candidate.
    ///
    /// Runs three passes in fixed order (delete, create, modify), mutating
    /// the index entry by entry until it matches the candidate. The returned
    /// events preserve pass order; order within one pass follows map
    /// iteration order and is unspecified.
    pub fn diff(&mut self, candidate: &SnapshotIndex) -> Vec<FsEvent> {
        let mut events = Vec::new();

        // Delete pass: indexed paths absent from the candidate.
        let deleted: Vec<PathBuf> = self
            .entries
            .keys()
            .filter(|path| !candidate.entries.contains_key(*path))
            .cloned()
            .collect();
        for path in deleted {
            if let Some(previous) = self.entries.remove(&path) {
                events.push(FsEvent::Deleted { path, previous });
            }
        }

        // Create pass: candidate paths absent from the index.
        for (path, metadata) in &candidate.entries {
            if !self.entries.contains_key(path) {
                self.entries.insert(path.clone(), *metadata);
                events.push(FsEvent::Created {
                    path: path.clone(),
                    metadata: *metadata,
                });
            }
        }

        // Modify pass: paths present in both with differing metadata.
        // Entries inserted by the create pass already match the candidate.
        for (path, metadata) in &candidate.entries {
            if let Some(recorded) = self.entries.get_mut(path) {
                if recorded != metadata {
                    let previous = *recorded;
                    *recorded = *metadata;
                    events.push(FsEvent::Modified {
                        path: path.clone(),
                        metadata: *metadata,
                        previous,
                    });
                }
            }
        }

        events
    }

    /// Metadata recorded for `path`, if indexed.
    pub fn get(&self, path: &Path) -> Option<&PathMetadata> {
        self.entries.get(path)
    }

    /// Whether `path` is indexed.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// All indexed paths.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
