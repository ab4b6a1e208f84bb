//! Content digests.

use md5::Md5;
use sha2::{Digest, Sha256};
use wiki_sync_config::HashAlgorithm;

/// Upper-case hex digest of `content`.
pub fn content_hash(algorithm: HashAlgorithm, content: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Md5 => hex::encode_upper(Md5::digest(content)),
        HashAlgorithm::Sha256 => hex::encode_upper(Sha256::digest(content)),
    }
}

/// Compare two hex digests ignoring surrounding whitespace and ASCII case.
pub fn hashes_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
