//! dropsum - checksum notifications for settled downloads

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use dropsum_cli::daemon;
use dropsum_cli::notifier::{DesktopNotifier, NoopNotifier, Notifier};

/// Watch a downloads folder and report each file's checksum once it has
/// settled (no filesystem activity for one second).
#[derive(Parser)]
#[command(name = "dropsum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to watch (default: ~/Downloads)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Log checksums only, skip desktop notifications
    #[arg(long)]
    no_notify: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let root = match cli.root {
        Some(root) => root,
        None => default_root()?,
    };

    let notifier: Arc<dyn Notifier> = if cli.no_notify {
        Arc::new(NoopNotifier)
    } else {
        Arc::new(DesktopNotifier::new("dropsum"))
    };

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    daemon::run(&root, notifier, token).await
}

/// Watched root: home directory plus the fixed Downloads subfolder
fn default_root() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to resolve home directory")?;
    Ok(home.join("Downloads"))
}
