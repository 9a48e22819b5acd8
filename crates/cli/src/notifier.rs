//! Desktop notification capability
//!
//! The pipeline only needs one operation: show the user a message. It is
//! modeled as a trait so the reporter can be exercised with a fake; the
//! production implementation shells out to `notify-send`, which is what
//! desktop notification libraries do on Linux anyway. Delivery is
//! fire-and-forget: the pipeline never looks at the result.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

/// Notification urgency, mapped to `notify-send --urgency`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

impl Urgency {
    fn as_arg(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

/// A user-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub summary: String,
    pub body: String,
    pub icon: Option<PathBuf>,
    pub urgency: Urgency,
}

/// Capability interface for displaying notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Display a notification. Failures are swallowed by implementations;
    /// the caller has nothing useful to do with them.
    async fn notify(&self, note: &Notification);
}

/// Shells out to `notify-send` for real desktop notifications
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, note: &Notification) {
        let mut cmd = tokio::process::Command::new("notify-send");
        cmd.arg("--app-name")
            .arg(&self.app_name)
            .arg("--urgency")
            .arg(note.urgency.as_arg());
        if let Some(icon) = &note.icon {
            cmd.arg("--icon").arg(icon);
        }
        cmd.arg(&note.summary).arg(&note.body);

        match cmd.spawn() {
            Ok(mut child) => {
                // Reap the child off to the side; the outcome is ignored.
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            Err(err) => {
                debug!(%err, "notify-send unavailable, skipping notification");
            }
        }
    }
}

/// Inert notifier for headless runs and tests
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _note: &Notification) {}
}
