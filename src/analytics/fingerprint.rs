//! Anonymous visitor fingerprints
//!
//! A fingerprint is the first 16 hex characters of
//! `SHA-256("{ip}:{user_agent}")`. It identifies a returning visitor
//! without retaining the IP address itself.

use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Length of a fingerprint in hex characters
pub const FINGERPRINT_LEN: usize = 16;

pub fn create_fingerprint(ip: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(b":");
    hasher.update(user_agent.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        // Writing into a String cannot fail
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
