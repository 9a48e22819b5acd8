//! In-progress download filtering
//!
//! Browsers land downloads under a marker name (Chrome appends
//! `.crdownload`) and rename the file once the transfer completes. Events
//! for marker paths are dropped here so the debouncer never sees them; the
//! rename to the final name arrives as its own event and passes through.

use std::path::{Path, PathBuf};

use crate::WatchEvent;

/// Filename suffix marking a download that is still in progress
pub const PARTIAL_DOWNLOAD_SUFFIX: &str = ".crdownload";

/// Check whether a path carries the partial-download marker
pub fn is_partial_download(path: &Path) -> bool {
    match path.file_name() {
        Some(name) => name.to_string_lossy().ends_with(PARTIAL_DOWNLOAD_SUFFIX),
        None => false,
    }
}

/// Produce the candidate path for a raw event, or `None` if the event is
/// for an in-progress download. The event kind is not inspected: creates,
/// writes, renames and removes are all forwarded alike.
pub fn candidate_path(event: WatchEvent) -> Option<PathBuf> {
    if is_partial_download(&event.path) {
        None
    } else {
        Some(event.path)
    }
}
