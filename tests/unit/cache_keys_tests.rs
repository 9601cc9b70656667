/*!
 * Tests for cache key derivation
 */

use captionkit::app_config::CacheConfig;
use captionkit::cache::{KeyBuilder, generate_key, ttl};
use captionkit::models::{CaptionFormat, LanguageCode};

use crate::common::{TEST_VIDEO_ID, video_id};

#[test]
fn test_generateKey_shouldJoinWithColons() {
    assert_eq!(generate_key("captions", &["abc", "en", "srt"]), "captions:abc:en:srt");
    assert_eq!(generate_key("empty", &[]), "empty");
}

#[test]
fn test_keyBuilder_perTool_shouldNamespaceKeys() {
    let keys = KeyBuilder::new();
    let id = video_id(TEST_VIDEO_ID);
    let lang = LanguageCode::parse("ja").unwrap();

    assert_eq!(keys.video_info(&id), "video_info:dQw4w9WgXcQ");
    assert_eq!(keys.captions_list(&id), "captions_list:dQw4w9WgXcQ");
    assert_eq!(keys.captions_data(&id, &lang, CaptionFormat::Vtt), "captions:dQw4w9WgXcQ:ja:vtt");
}

#[test]
fn test_keyBuilder_captionsData_withDifferentFormats_shouldDiffer() {
    let keys = KeyBuilder::new();
    let id = video_id(TEST_VIDEO_ID);
    let lang = LanguageCode::parse("en").unwrap();
    assert_ne!(
        keys.captions_data(&id, &lang, CaptionFormat::Raw),
        keys.captions_data(&id, &lang, CaptionFormat::Srt)
    );
}

#[test]
fn test_keyBuilder_search_shouldUseBase64PrefixAndLanguage() {
    let keys = KeyBuilder::new();
    let lang = LanguageCode::parse("en").unwrap();

    // base64("rust") = "cnVzdA=="
    assert_eq!(keys.search("rust", None), "search:cnVzdA==:all");
    assert_eq!(keys.search("rust", Some(&lang)), "search:cnVzdA==:en");
}

#[test]
fn test_keyBuilder_search_withLongQuery_shouldTruncateToSixteenChars() {
    let key = KeyBuilder::new().search("a fairly long search query", None);
    let digest = key.trim_start_matches("search:").trim_end_matches(":all");
    assert_eq!(digest.len(), 16);
}

#[test]
fn test_keyBuilder_fromConfig_shouldHonorFingerprintFlag() {
    let config = CacheConfig {
        fingerprint_search_keys: true,
        ..CacheConfig::default()
    };
    assert_eq!(KeyBuilder::from_config(&config), KeyBuilder::fingerprinted());
    assert_eq!(KeyBuilder::from_config(&CacheConfig::default()), KeyBuilder::new());
}

#[test]
fn test_ttlTiers_shouldMatchOperationLifetimes() {
    assert_eq!(ttl::VIDEO_INFO, 3600);
    assert_eq!(ttl::CAPTIONS_LIST, 86_400);
    assert_eq!(ttl::CAPTIONS_DATA, 86_400);
    assert_eq!(ttl::SEARCH_RESULTS, 1800);
}
