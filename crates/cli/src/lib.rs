//! Dropsum daemon library
//!
//! Wires the watch → filter → debounce → digest pipeline and exposes the
//! notifier seam so integration tests can observe reports without a
//! desktop session.

pub mod daemon;
pub mod notifier;
pub mod report;
