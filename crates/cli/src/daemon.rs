//! Pipeline wiring
//!
//! Runs the three persistent loops — watch ingestion + filter, debounce,
//! digest + report — as independent tasks joined by capacity-one channels.
//! Each handoff holds at most one in-flight item, so a slow digest stage
//! applies backpressure all the way up to event ingestion. No stage owns
//! retry logic; failures are either fatal (watch setup) or logged and
//! skipped (everything downstream).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dropsum_watcher::{spawn_watch, Debouncer, DEFAULT_DEBOUNCE_WINDOW};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::notifier::Notifier;
use crate::report;

/// Run the pipeline against `root` until `token` is cancelled.
///
/// # Errors
///
/// Fails only if the watch cannot be attached to `root`; everything after
/// setup is logged-and-continue.
pub async fn run(root: &Path, notifier: Arc<dyn Notifier>, token: CancellationToken) -> Result<()> {
    run_with_window(root, DEFAULT_DEBOUNCE_WINDOW, notifier, token).await
}

/// Same as [`run`] with an explicit debounce window (integration tests
/// shrink it; there is no user-facing knob for it).
pub async fn run_with_window(
    root: &Path,
    window: Duration,
    notifier: Arc<dyn Notifier>,
    token: CancellationToken,
) -> Result<()> {
    let (candidates_tx, candidates_rx) = mpsc::channel::<PathBuf>(1);
    let (settled_tx, settled_rx) = mpsc::channel::<PathBuf>(1);

    let watch = spawn_watch(root, candidates_tx, token.clone())?;
    info!(root = %root.display(), "watching for settled downloads");

    let debounce = Debouncer::new(window).spawn(candidates_rx, settled_tx, token.clone());
    let reporter = tokio::spawn(report::run_reporter(settled_rx, notifier, token.clone()));

    token.cancelled().await;

    watch.join().await;
    let _ = debounce.await;
    let _ = reporter.await;
    Ok(())
}
