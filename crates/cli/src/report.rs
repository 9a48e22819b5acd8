//! Digest computation and reporting
//!
//! Terminal stage of the pipeline: each settled path is read once, its
//! SHA-256 digest logged and pushed to the notifier. A path that cannot be
//! read (deleted between settling and the read, or a remove event that
//! debounced through) is logged as a failure and the loop moves on; no
//! notification is sent for it and nothing is retried.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use dropsum_core::ContentDigest;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::notifier::{Notification, Notifier, Urgency};

/// Notification summary line for every settled download
pub const NOTIFY_SUMMARY: &str = "Download checksums";

/// Outcome of digesting one settled path
pub struct DigestReport {
    pub path: PathBuf,
    pub outcome: Result<ContentDigest>,
}

/// Digest the file at `path` on the blocking pool.
pub async fn digest_path(path: PathBuf) -> DigestReport {
    let read_path = path.clone();
    let outcome = match tokio::task::spawn_blocking(move || {
        dropsum_core::digest_file(&read_path)
    })
    .await
    {
        Ok(outcome) => outcome,
        Err(join_err) => Err(anyhow::anyhow!("digest task failed: {join_err}")),
    };

    DigestReport { path, outcome }
}

fn notification_for(report: &DigestReport, digest: &ContentDigest) -> Notification {
    Notification {
        summary: NOTIFY_SUMMARY.to_string(),
        body: format!("{}\nsha256: {}", report.path.display(), digest),
        icon: None,
        urgency: Urgency::Normal,
    }
}

/// Consume settled paths until cancellation or channel close, reporting a
/// digest (or a logged failure) for each.
pub async fn run_reporter(
    mut settled: mpsc::Receiver<PathBuf>,
    notifier: Arc<dyn Notifier>,
    token: CancellationToken,
) {
    loop {
        let path = tokio::select! {
            _ = token.cancelled() => break,
            path = settled.recv() => path,
        };
        let Some(path) = path else { break };

        let report = digest_path(path).await;
        match &report.outcome {
            Ok(digest) => {
                info!(path = %report.path.display(), sha256 = %digest, "download settled");
                notifier.notify(&notification_for(&report, digest)).await;
            }
            Err(error) => {
                warn!(path = %report.path.display(), error = %error, "digest failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropsum_core::digest_bytes;

    #[tokio::test]
    async fn test_digest_path_matches_content() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("done.bin");
        std::fs::write(&file, b"finished download").unwrap();

        let report = digest_path(file.clone()).await;
        assert_eq!(report.path, file);
        assert_eq!(report.outcome.unwrap(), digest_bytes(b"finished download"));
    }

    #[tokio::test]
    async fn test_digest_path_missing_file_is_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("vanished.bin");

        let report = digest_path(missing.clone()).await;
        assert!(report.outcome.is_err());
    }

    #[test]
    fn test_notification_body_shape() {
        let report = DigestReport {
            path: PathBuf::from("/dl/a.txt"),
            outcome: Ok(digest_bytes(b"abc")),
        };
        let digest = report.outcome.as_ref().unwrap();
        let note = notification_for(&report, digest);

        assert_eq!(note.summary, NOTIFY_SUMMARY);
        assert_eq!(note.urgency, Urgency::Normal);
        assert!(note.body.starts_with("/dl/a.txt\nsha256: "));
        assert!(note.body.ends_with(&digest.to_hex()));
    }
}
