//! Content identity: a SHA-1 fingerprint of raw PDF bytes.
//!
//! The digest doubles as a change detector. A transformation that really
//! touched the document always yields a new `sha1`, so tests and callers can
//! compare digests instead of bytes.

use sha1::{Digest, Sha1};

/// Length of a hex-encoded SHA-1 digest.
pub const DIGEST_HEX_LEN: usize = 40;

/// Hex-encoded (lowercase) SHA-1 digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha1::digest(bytes))
}
