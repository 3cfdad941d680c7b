//! Strong ETags for rendered question-paper documents.
//!
//! The tag is the SHA-256 of the exact document bytes, so two renderings of
//! unchanged data always agree.

use sha2::{Digest, Sha256};

/// Quoted hex SHA-256 of `body`.
pub fn compute_etag(body: &str) -> String {
  let hash = Sha256::digest(body.as_bytes());
  format!("\"{}\"", hex::encode(hash))
}

fn strip_etag_quotes(s: &str) -> &str {
  s.trim().trim_start_matches("W/").trim_matches('"')
}

/// Whether an `If-None-Match` header value names `etag` (or is `*`).
pub fn if_none_match_hits(header: &str, etag: &str) -> bool {
  let etag = strip_etag_quotes(etag);
  header
    .split(',')
    .map(str::trim)
    .any(|candidate| candidate == "*" || strip_etag_quotes(candidate) == etag)
}
