//! # pollwatch
//!
//! Polling-based filesystem change detection. Given a root path, a
//! [`Watcher`] periodically re-scans the tree, diffs each scan against the
//! previously retained snapshot, and delivers [`FsEvent`]s (created,
//! deleted, modified) on a bounded channel.
//!
//! No OS-native event APIs are involved, which makes this usable on
//! containerized and networked filesystems where inotify and friends are
//! unreliable or unavailable.
//!
//! ## Architecture
//!
//! ```text
//! WatcherConfig ──► Watcher ──► poll loop (spawned task)
//!                                  │  scan ──► SnapshotIndex::diff
//!                                  ▼
//!                          mpsc::Receiver<FsEvent>
//! ```
//!
//! Within one poll iteration, delete events precede create events precede
//! modify events; order across paths within a pass is unspecified. Delivery
//! backpressures: a slow consumer stalls the loop until it catches up.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use pollwatch::Watcher;
//!
//! # async fn run() -> pollwatch::Result<()> {
//! let (watcher, mut events) = Watcher::new("/some/tree", Duration::from_millis(200))?;
//! while let Some(event) = events.recv().await {
//!     println!("{} {}", event.path().display(), event.kind());
//! }
//! watcher.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod snapshot;
pub mod watcher;

pub use config::{DEFAULT_CHANNEL_CAPACITY, WatcherConfig};
pub use error::{Result, WatcherError};
pub use event::{FsEvent, FsEventKind, PathMetadata};
pub use snapshot::SnapshotIndex;
pub use watcher::{Watcher, WatcherState};
