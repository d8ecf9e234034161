//! Filesystem events and per-entry metadata.

use std::fmt;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata observed for one filesystem entry at scan time.
///
/// Immutable once recorded; equality is exact, field by field. A filesystem
/// that bumps the modification time without changing the size still compares
/// unequal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMetadata {
    /// Whether the entry is a directory.
    pub is_dir: bool,

    /// Last modification time.
    pub modified: DateTime<Utc>,

    /// Platform permission bits.
    pub permissions: u32,

    /// Size in bytes.
    pub len: u64,
}

impl PathMetadata {
    /// Read metadata for `path`, following symlinks.
    pub fn for_path(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::try_from(&std::fs::metadata(path)?)
    }
}

impl TryFrom<&Metadata> for PathMetadata {
    type Error = io::Error;

    /// Fails when the platform cannot report a modification time.
    fn try_from(metadata: &Metadata) -> io::Result<Self> {
        Ok(Self {
            is_dir: metadata.is_dir(),
            modified: DateTime::<Utc>::from(metadata.modified()?),
            permissions: permission_bits(metadata),
            len: metadata.len(),
        })
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    u32::from(metadata.permissions().readonly())
}

/// A single filesystem change observed between two polls.
///
/// Relative order is carried by channel delivery order; events hold no
/// sequence numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FsEvent {
    /// The path was absent from the previous snapshot and is present now.
    Created {
        /// Affected path.
        path: PathBuf,
        /// Metadata from the current scan.
        metadata: PathMetadata,
    },

    /// The path was present in the previous snapshot and is absent now.
    Deleted {
        /// Affected path.
        path: PathBuf,
        /// Last metadata recorded before the entry disappeared.
        previous: PathMetadata,
    },

    /// The path is present in both snapshots with differing metadata.
    Modified {
        /// Affected path.
        path: PathBuf,
        /// Metadata from the current scan.
        metadata: PathMetadata,
        /// Metadata recorded by the previous scan.
        previous: PathMetadata,
    },
}

impl FsEvent {
    /// The path this event refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Created { path, .. } | Self::Deleted { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }

    /// The kind of change.
    pub fn kind(&self) -> FsEventKind {
        match self {
            Self::Created { .. } => FsEventKind::Created,
            Self::Deleted { .. } => FsEventKind::Deleted,
            Self::Modified { .. } => FsEventKind::Modified,
        }
    }
}

/// Kind of filesystem event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsEventKind {
    /// Entry appeared.
    Created,

    /// Entry disappeared.
    Deleted,

    /// Entry metadata changed.
    Modified,
}

impl fmt::Display for FsEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Deleted => "deleted",
            Self::Modified => "modified",
        })
    }
}
