//! Core digest primitives for dropsum

pub mod hash;

pub use hash::{digest_bytes, digest_file, ContentDigest};
