//! Raw event ingestion
//!
//! Wires a `notify` watcher to the candidate-path channel. The notify
//! callback runs on notify's own thread and hands events over with
//! `blocking_send`; the async ingestion loop flattens them, applies the
//! partial-download filter and forwards candidates downstream. Errors
//! delivered on the running stream are logged and the loop keeps going;
//! only attaching to the root can fail.

use std::path::{Path, PathBuf};

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::filter;
use crate::{WatchError, WatchEvent};

/// Buffer between the notify callback thread and the ingestion loop
const WATCH_CHANNEL_CAPACITY: usize = 64;

enum WatchMessage {
    Event(Event),
    Error(String),
}

/// Handle to a running watch. Dropping it stops the notify stream and
/// detaches the ingestion loop.
pub struct WatchHandle {
    // Held only to keep the notify stream alive.
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Wait for the ingestion loop to finish (after cancellation or
    /// downstream close).
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

/// Attach a non-recursive watch to `root` and start forwarding candidate
/// paths on `candidates`.
///
/// # Errors
///
/// Fails if the watcher cannot be created or the root cannot be attached;
/// both are setup failures the caller should treat as fatal.
pub fn spawn_watch(
    root: &Path,
    candidates: mpsc::Sender<PathBuf>,
    token: CancellationToken,
) -> Result<WatchHandle, WatchError> {
    let (tx, rx) = mpsc::channel::<WatchMessage>(WATCH_CHANNEL_CAPACITY);

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                let _ = tx.blocking_send(WatchMessage::Event(event));
            }
            Err(err) => {
                let _ = tx.blocking_send(WatchMessage::Error(err.to_string()));
            }
        },
        NotifyConfig::default(),
    )
    .map_err(|source| WatchError::Create {
        path: root.to_path_buf(),
        source,
    })?;

    watcher
        .watch(root, RecursiveMode::NonRecursive)
        .map_err(|source| WatchError::Attach {
            path: root.to_path_buf(),
            source,
        })?;

    let task = tokio::spawn(ingest_loop(rx, candidates, token));

    Ok(WatchHandle {
        _watcher: watcher,
        task,
    })
}

async fn ingest_loop(
    mut rx: mpsc::Receiver<WatchMessage>,
    candidates: mpsc::Sender<PathBuf>,
    token: CancellationToken,
) {
    loop {
        let msg = tokio::select! {
            _ = token.cancelled() => break,
            msg = rx.recv() => msg,
        };
        let Some(msg) = msg else { break };

        match msg {
            WatchMessage::Event(event) => {
                for raw in WatchEvent::from_notify(&event) {
                    let Some(path) = filter::candidate_path(raw) else {
                        continue;
                    };
                    if candidates.send(path).await.is_err() {
                        return;
                    }
                }
            }
            WatchMessage::Error(error) => {
                warn!(%error, "watch stream error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    const EVENT_WAIT: Duration = Duration::from_secs(5);

    async fn next_matching(
        rx: &mut mpsc::Receiver<PathBuf>,
        wanted: &Path,
    ) -> Option<PathBuf> {
        // Platform watchers may report the directory or intermediate
        // paths too; scan until the wanted file shows up.
        loop {
            match timeout(EVENT_WAIT, rx.recv()).await {
                Ok(Some(path)) if path == wanted => return Some(path),
                Ok(Some(_)) => continue,
                _ => return None,
            }
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_file_write_produces_candidate() {
        let tmp = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(16);

        let handle = spawn_watch(tmp.path(), tx, token.clone()).unwrap();

        let file = tmp.path().join("landed.bin");
        std::fs::write(&file, b"payload").unwrap();

        assert_eq!(next_matching(&mut rx, &file).await, Some(file));
        token.cancel();
        handle.join().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_partial_download_never_surfaces() {
        let tmp = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(16);

        let handle = spawn_watch(tmp.path(), tx, token.clone()).unwrap();

        let partial = tmp.path().join("big.iso.crdownload");
        std::fs::write(&partial, b"half").unwrap();

        // Give the watcher ample time; the marker path must not appear.
        let got = timeout(Duration::from_secs(2), async {
            loop {
                match rx.recv().await {
                    Some(path) if path == partial => return path,
                    Some(_) => continue,
                    None => std::future::pending::<()>().await,
                }
            }
        })
        .await;
        assert!(got.is_err());

        token.cancel();
        handle.join().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_root_is_setup_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let token = CancellationToken::new();
        let (tx, _rx) = mpsc::channel(16);

        let result = spawn_watch(&missing, tx, token);
        assert!(matches!(result, Err(WatchError::Attach { .. })));
    }
}
