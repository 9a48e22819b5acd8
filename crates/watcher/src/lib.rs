//! Filesystem watching for dropsum
//!
//! This crate turns raw `notify` events for a single watched directory into
//! a low-rate stream of "settled" paths:
//! - in-progress downloads are filtered out by marker suffix
//! - rapid event bursts are coalesced through a single-slot debouncer
//!
//! The debouncer deliberately tracks one pending path system-wide, not one
//! per path; see [`debounce`] for the exact flush semantics.

pub mod debounce;
pub mod filter;
pub mod watch;

use std::path::PathBuf;

use notify::event::ModifyKind;
use thiserror::Error;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE_WINDOW};
pub use watch::{spawn_watch, WatchHandle};

/// Raw file system event, one per affected path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Path that changed
    pub path: PathBuf,
    /// Type of change
    pub kind: EventKind,
}

/// Type of file system event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// File created
    Create,
    /// File contents or metadata modified
    Modify,
    /// File renamed
    Rename,
    /// File deleted
    Remove,
    /// Anything notify could not classify further
    Other,
}

impl WatchEvent {
    /// Flatten a `notify` event into one `WatchEvent` per affected path.
    pub fn from_notify(event: &notify::Event) -> Vec<WatchEvent> {
        let kind = classify_kind(&event.kind);
        event
            .paths
            .iter()
            .map(|path| WatchEvent {
                path: path.clone(),
                kind,
            })
            .collect()
    }
}

fn classify_kind(kind: &notify::EventKind) -> EventKind {
    use notify::EventKind as NK;
    match kind {
        NK::Create(_) => EventKind::Create,
        NK::Modify(ModifyKind::Name(_)) => EventKind::Rename,
        NK::Modify(_) => EventKind::Modify,
        NK::Remove(_) => EventKind::Remove,
        _ => EventKind::Other,
    }
}

/// Errors raised while attaching to the watched directory.
///
/// These are setup failures: the process has nothing to watch and treats
/// them as fatal. Errors delivered later on the running stream are logged
/// and recovered instead.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create watcher for {path}: {source}")]
    Create {
        path: PathBuf,
        source: notify::Error,
    },
    #[error("failed to watch {path}: {source}")]
    Attach {
        path: PathBuf,
        source: notify::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};

    #[test]
    fn test_from_notify_one_event_per_path() {
        let event = notify::Event::new(notify::EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/watch/a.txt"))
            .add_path(PathBuf::from("/watch/b.txt"));

        let events = WatchEvent::from_notify(&event);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].path, PathBuf::from("/watch/a.txt"));
        assert_eq!(events[0].kind, EventKind::Create);
        assert_eq!(events[1].path, PathBuf::from("/watch/b.txt"));
    }

    #[test]
    fn test_classify_remove() {
        let event = notify::Event::new(notify::EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/watch/gone.txt"));
        let events = WatchEvent::from_notify(&event);
        assert_eq!(events[0].kind, EventKind::Remove);
    }
}
