//! Polling watcher: lifecycle, poll loop, event delivery.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc, watch};
use tracing::{debug, error, info};

use crate::config::WatcherConfig;
use crate::error::{Result, WatcherError};
use crate::event::FsEvent;
use crate::snapshot::SnapshotIndex;

/// Lifecycle states of a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// The poll loop is running.
    Active,

    /// `stop()` was called; the loop exits at its next check.
    Stopping,

    /// The loop has exited and the event stream is closed.
    Stopped,
}

/// Polling filesystem watcher.
///
/// Owns the root path and lifecycle; the retained snapshot index lives on
/// the spawned loop task, which is its sole reader and writer. Events are
/// delivered on the bounded channel handed out at construction; the stream
/// closing signals termination.
///
/// Dropping the watcher handle also shuts the loop down.
pub struct Watcher {
    root: PathBuf,
    config: WatcherConfig,
    state: Arc<RwLock<WatcherState>>,
    stop_tx: watch::Sender<bool>,
    scan_failure: Arc<RwLock<Option<WatcherError>>>,
}

impl Watcher {
    /// Create a watcher polling `path` every `interval`.
    ///
    /// Validates the interval before any filesystem access, canonicalizes
    /// the root, performs the initial scan, then spawns the poll loop
    /// (fire-and-forget; this does not wait for the first iteration).
    /// Must be called within a tokio runtime.
    pub fn new(
        path: impl AsRef<Path>,
        interval: Duration,
    ) -> Result<(Self, mpsc::Receiver<FsEvent>)> {
        Self::with_config(path, WatcherConfig::new(interval))
    }

    /// Create a watcher with an explicit configuration.
    pub fn with_config(
        path: impl AsRef<Path>,
        config: WatcherConfig,
    ) -> Result<(Self, mpsc::Receiver<FsEvent>)> {
        config.validate()?;

        let path = path.as_ref();
        let root = std::fs::canonicalize(path).map_err(|source| WatcherError::PathResolution {
            path: path.to_path_buf(),
            source,
        })?;

        let index = SnapshotIndex::build(&root, &config)?;
        info!(
            "watching {} ({} entries, every {:?})",
            root.display(),
            index.len(),
            config.interval
        );

        let (event_tx, event_rx) = mpsc::channel(config.channel_capacity);
        let (stop_tx, stop_rx) = watch::channel(false);
        let state = Arc::new(RwLock::new(WatcherState::Active));
        let scan_failure = Arc::new(RwLock::new(None));

        tokio::spawn(
            PollLoop {
                root: root.clone(),
                config: config.clone(),
                index,
                event_tx,
                stop_rx,
                state: state.clone(),
                scan_failure: scan_failure.clone(),
            }
            .run(),
        );

        Ok((
            Self {
                root,
                config,
                state,
                stop_tx,
                scan_failure,
            },
            event_rx,
        ))
    }

    /// Request shutdown. Idempotent and callable from any task.
    ///
    /// The loop observes the signal at its next send or sleep, exits, and
    /// closes the event stream. Events already produced by the current diff
    /// may still be delivered before the signal is seen.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write().await;
            if *state != WatcherState::Active {
                return;
            }
            *state = WatcherState::Stopping;
        }

        // The loop may already have exited on its own.
        let _ = self.stop_tx.send(true);
        debug!("stop requested for {}", self.root.display());
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> WatcherState {
        *self.state.read().await
    }

    /// Whether the poll loop is still running.
    pub async fn is_active(&self) -> bool {
        self.state().await == WatcherState::Active
    }

    /// The canonicalized root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configured poll interval.
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// The fatal re-scan error that terminated the loop, if any.
    ///
    /// A fatal scan failure closes the event stream; this retrieves the
    /// cause, at most once.
    pub async fn scan_failure(&self) -> Option<WatcherError> {
        self.scan_failure.write().await.take()
    }
}

/// State moved onto the spawned loop task.
struct PollLoop {
    root: PathBuf,
    config: WatcherConfig,
    index: SnapshotIndex,
    event_tx: mpsc::Sender<FsEvent>,
    stop_rx: watch::Receiver<bool>,
    state: Arc<RwLock<WatcherState>>,
    scan_failure: Arc<RwLock<Option<WatcherError>>>,
}

impl PollLoop {
    async fn run(mut self) {
        loop {
            if *self.state.read().await != WatcherState::Active {
                break;
            }

            let candidate = match SnapshotIndex::build(&self.root, &self.config) {
                Ok(candidate) => candidate,
                Err(err) => {
                    error!(
                        "scan of {} failed, terminating watcher: {err}",
                        self.root.display()
                    );
                    *self.scan_failure.write().await = Some(err);
                    break;
                }
            };

            let events = self.index.diff(&candidate);
            if !events.is_empty() {
                debug!("{} change(s) under {}", events.len(), self.root.display());
            }

            for event in events {
                // Delivery backpressures on the bounded channel; the stop
                // signal is consulted alongside every send so shutdown never
                // waits behind a stalled consumer.
                tokio::select! {
                    biased;
                    _ = self.stop_rx.changed() => {
                        self.finish().await;
                        return;
                    }
                    sent = self.event_tx.send(event) => {
                        if sent.is_err() {
                            debug!("event receiver dropped, terminating watcher");
                            self.finish().await;
                            return;
                        }
                    }
                }
            }

            tokio::select! {
                biased;
                _ = self.stop_rx.changed() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        self.finish().await;
    }

    /// Marks the watcher stopped and, by dropping the sender, closes the
    /// event stream exactly once.
    async fn finish(self) {
        *self.state.write().await = WatcherState::Stopped;
        info!("watcher for {} stopped", self.root.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_zero_interval_rejected_before_path_access() {
        // The path does not exist; validation must fail first.
        let result = Watcher::new("/nonexistent/path/12345", Duration::ZERO);
        assert!(matches!(result, Err(WatcherError::InvalidInterval)));
    }

    #[tokio::test]
    async fn test_unresolvable_path_rejected() {
        let result = Watcher::new("/nonexistent/path/12345", Duration::from_millis(50));
        assert!(matches!(result, Err(WatcherError::PathResolution { .. })));
    }

    #[tokio::test]
    async fn test_root_is_canonicalized() {
        let temp_dir = TempDir::new().unwrap();
        let (watcher, _events) =
            Watcher::new(temp_dir.path(), Duration::from_millis(50)).unwrap();

        assert_eq!(watcher.root(), temp_dir.path().canonicalize().unwrap());
        assert_eq!(watcher.interval(), Duration::from_millis(50));
        watcher.stop().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_root_resolves_to_target() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("tree");
        fs::create_dir(&target).unwrap();
        let alias = temp_dir.path().join("alias");
        symlink(&target, &alias).unwrap();

        let (watcher, _events) = Watcher::new(&alias, Duration::from_millis(50)).unwrap();

        assert_eq!(watcher.root(), target.canonicalize().unwrap());
        watcher.stop().await;
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let (watcher, mut events) =
            Watcher::new(temp_dir.path(), Duration::from_millis(10)).unwrap();
        assert!(watcher.is_active().await);

        watcher.stop().await;
        watcher.stop().await;

        // Stream closes once the loop observes the signal.
        let closed = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap();
        assert!(closed.is_none());
        assert_eq!(watcher.state().await, WatcherState::Stopped);

        watcher.stop().await;
    }

    #[tokio::test]
    async fn test_vanished_root_terminates_watcher() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("tree");
        fs::create_dir(&root).unwrap();

        let (watcher, mut events) = Watcher::new(&root, Duration::from_millis(10)).unwrap();

        fs::remove_dir_all(&root).unwrap();

        // Deletion events for the tree may precede termination.
        let deadline = tokio::time::timeout(Duration::from_secs(5), async {
            while events.recv().await.is_some() {}
        });
        deadline.await.unwrap();

        assert_eq!(watcher.state().await, WatcherState::Stopped);
        assert!(watcher.scan_failure().await.is_some());
    }
}
