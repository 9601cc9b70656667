/*!
 * Deterministic cache key derivation.
 *
 * Search keys use the first 16 characters of the base64-encoded query, so
 * two queries sharing that prefix share a cache entry (e.g. any two queries
 * with the same first 12 bytes). `KeyBuilder::fingerprinted` switches to a
 * full SHA-256 hex digest instead.
 */

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::models::{CaptionFormat, LanguageCode, VideoId};

/// TTL tiers in seconds, supplied per operation by the orchestration layer
pub mod ttl {
    /// 1 hour
    pub const VIDEO_INFO: u64 = 3600;
    /// 24 hours
    pub const CAPTIONS_LIST: u64 = 86_400;
    /// 24 hours
    pub const CAPTIONS_DATA: u64 = 86_400;
    /// 30 minutes
    pub const SEARCH_RESULTS: u64 = 1800;
}

const SEARCH_PREFIX_LEN: usize = 16;

/// Join a prefix and parts with `:`
pub fn generate_key(prefix: &str, parts: &[&str]) -> String {
    let mut key = String::from(prefix);
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

/// Builds namespaced keys for each tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyBuilder {
    fingerprint_search: bool,
}

impl KeyBuilder {
    /// Keys exactly as `search:{base64(query)[0:16]}:{lang|all}`
    pub fn new() -> Self {
        Self { fingerprint_search: false }
    }

    /// Search keys carry a full SHA-256 of the query
    pub fn fingerprinted() -> Self {
        Self { fingerprint_search: true }
    }

    pub fn from_config(config: &crate::app_config::CacheConfig) -> Self {
        Self { fingerprint_search: config.fingerprint_search_keys }
    }

    pub fn video_info(&self, video_id: &VideoId) -> String {
        generate_key("video_info", &[video_id.as_str()])
    }

    pub fn captions_list(&self, video_id: &VideoId) -> String {
        generate_key("captions_list", &[video_id.as_str()])
    }

    pub fn captions_data(&self, video_id: &VideoId, lang: &LanguageCode, format: CaptionFormat) -> String {
        generate_key("captions", &[video_id.as_str(), lang.as_str(), format.as_str()])
    }

    pub fn search(&self, query: &str, lang: Option<&LanguageCode>) -> String {
        let digest = if self.fingerprint_search {
            query_fingerprint(query)
        } else {
            query_prefix(query)
        };
        generate_key("search", &[&digest, lang.map(LanguageCode::as_str).unwrap_or("all")])
    }
}

fn query_prefix(query: &str) -> String {
    STANDARD.encode(query.as_bytes()).chars().take(SEARCH_PREFIX_LEN).collect()
}

fn query_fingerprint(query: &str) -> String {
    let digest = Sha256::digest(query.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
