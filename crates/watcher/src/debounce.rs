//! Single-slot debouncing of candidate paths
//!
//! Converts a bursty stream of candidate paths into isolated "settled"
//! emissions: a path is forwarded only once no event has been seen for a
//! full debounce window.
//!
//! The pending slot is shared across all paths rather than keyed per path.
//! When a second, different path arrives while one is pending, the pending
//! path is flushed immediately and the new one takes the slot — even if the
//! flushed file is still being written. Downstream consumers must tolerate
//! reads racing the writer; this trade keeps the debouncer a single slot
//! with a single timer.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Quiet period required before a path is considered settled
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

/// Single-slot path debouncer
pub struct Debouncer {
    window: Duration,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

impl Debouncer {
    /// Create a debouncer with a custom quiet window (tests shrink this;
    /// production uses [`DEFAULT_DEBOUNCE_WINDOW`])
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Spawn the debounce loop, consuming candidate paths from `input` and
    /// emitting settled paths on `output` until cancelled or `input` closes.
    pub fn spawn(
        self,
        input: mpsc::Receiver<PathBuf>,
        output: mpsc::Sender<PathBuf>,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(input, output, token))
    }

    /// Debounce loop. The pending slot is owned exclusively here; at most
    /// one settled path is emitted per iteration, in trigger order.
    async fn run(
        self,
        mut input: mpsc::Receiver<PathBuf>,
        output: mpsc::Sender<PathBuf>,
        token: CancellationToken,
    ) {
        let mut pending: Option<PathBuf> = None;

        loop {
            // Armed fresh each iteration, so the quiet window restarts on
            // every arrival and after every emission.
            let wait = tokio::time::sleep(self.window);
            tokio::pin!(wait);

            tokio::select! {
                _ = token.cancelled() => break,
                item = input.recv() => {
                    let Some(item) = item else {
                        // Producer is gone; flush whatever is pending.
                        if let Some(path) = pending.take() {
                            let _ = output.send(path).await;
                        }
                        break;
                    };
                    match pending.take() {
                        // Different path: the previous one is flushed
                        // immediately, the new one takes the slot.
                        Some(prev) if prev != item => {
                            debug!(flushed = %prev.display(), "cross-path flush");
                            pending = Some(item);
                            if output.send(prev).await.is_err() {
                                break;
                            }
                        }
                        // Same path again: coalesce, keep waiting.
                        Some(prev) => pending = Some(prev),
                        None => pending = Some(item),
                    }
                }
                _ = &mut wait => {
                    if let Some(path) = pending.take() {
                        debug!(settled = %path.display(), "quiet window elapsed");
                        if output.send(path).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
}
