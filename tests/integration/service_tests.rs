/*!
 * End-to-end tests of tool orchestration over the mock client
 */

use std::sync::Arc;

use serde_json::json;

use captionkit::app_config::CacheConfig;
use captionkit::cache::{CacheStore, KeyBuilder};
use captionkit::client::MockClient;
use captionkit::errors::{ClientError, ErrorKind};
use captionkit::service::{CaptionService, ToolName};

use crate::common::{self, SILENT_VIDEO_ID, TEST_VIDEO_ID};

#[tokio::test]
async fn test_getVideoInfo_calledTwice_shouldHitCacheOnSecondCall() {
    common::init_logging();
    let client = common::populated_mock_client();
    let service = common::service_with(client.clone());

    let args = json!({ "video_id": "https://youtu.be/dQw4w9WgXcQ" });
    let first = service.get_video_info(&args).await.unwrap();
    let second = service.get_video_info(&json!({ "video_id": TEST_VIDEO_ID })).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first["id"], TEST_VIDEO_ID);
    assert_eq!(first["viewCount"], 1_500_000);
    assert_eq!(client.call_count(), 1);

    let stats = service.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_getVideoInfo_withInvalidInput_shouldFailBeforeCallingClient() {
    let client = common::populated_mock_client();
    let service = common::service_with(client.clone());

    let error = service.get_video_info(&json!({ "video_id": "nope" })).await.unwrap_err();
    assert_eq!(error.kind, ErrorKind::Validation);
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_getCaptionsList_withUncaptionedVideo_shouldPassErrorThrough() {
    let service = common::service_with(common::populated_mock_client());

    let error = service
        .get_captions_list(&json!({ "video_id": SILENT_VIDEO_ID }))
        .await
        .unwrap_err();
    assert_eq!(error.kind, ErrorKind::CaptionsNotAvailable);
    assert_eq!(error.details["videoId"], SILENT_VIDEO_ID);
}

#[tokio::test]
async fn test_failedCall_shouldNotBeCached() {
    let client = MockClient::failing(ClientError::Network("connection reset".to_string()));
    let service = common::service_with(client.clone());
    let args = json!({ "video_id": TEST_VIDEO_ID });

    for _ in 0..2 {
        let error = service.get_video_info(&args).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Network);
    }
    assert_eq!(client.call_count(), 2);
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_downloadCaptions_withSrt_shouldReturnFormattedContent() {
    let service = common::service_with(common::populated_mock_client());

    let result = service
        .download_captions(&json!({ "video_id": TEST_VIDEO_ID, "lang": "en", "format": "srt" }))
        .await
        .unwrap();

    assert_eq!(result["videoId"], TEST_VIDEO_ID);
    assert_eq!(result["format"], "srt");
    assert_eq!(result["segments"].as_array().unwrap().len(), 3);
    let content = result["formattedContent"].as_str().unwrap();
    assert!(content.starts_with("1\n00:00:00,000 --> 00:00:02,000\nHello and welcome\n"));
}

#[tokio::test]
async fn test_downloadCaptions_withRaw_shouldOmitFormattedContent() {
    let service = common::service_with(common::populated_mock_client());

    let result = service
        .download_captions(&json!({ "video_id": TEST_VIDEO_ID, "lang": "en" }))
        .await
        .unwrap();

    assert_eq!(result["format"], "raw");
    assert!(result.get("formattedContent").is_none());
}

#[tokio::test]
async fn test_downloadCaptions_withoutLang_shouldUseDefaultLanguage() {
    let service = common::service_with(common::populated_mock_client());

    let result = service.download_captions(&json!({ "video_id": TEST_VIDEO_ID })).await.unwrap();
    assert_eq!(result["language"], "en");

    let result = service
        .download_captions(&json!({ "video_id": TEST_VIDEO_ID, "lang": null }))
        .await
        .unwrap();
    assert_eq!(result["language"], "en");
}

#[tokio::test]
async fn test_downloadCaptions_withDifferentFormats_shouldCacheSeparately() {
    let client = common::populated_mock_client();
    let service = common::service_with(client.clone());

    for format in ["raw", "srt", "vtt", "srt"] {
        service
            .download_captions(&json!({ "video_id": TEST_VIDEO_ID, "lang": "en", "format": format }))
            .await
            .unwrap();
    }

    assert_eq!(client.call_count(), 3);
    assert_eq!(service.cache().len(), 3);
}

#[tokio::test]
async fn test_downloadCaptions_withMissingLanguage_shouldReturnCaptionsNotAvailable() {
    let service = common::service_with(common::populated_mock_client());

    let error = service
        .download_captions(&json!({ "video_id": TEST_VIDEO_ID, "lang": "ja" }))
        .await
        .unwrap_err();
    assert_eq!(error.kind, ErrorKind::CaptionsNotAvailable);
    assert_eq!(error.details["language"], "ja");
}

#[tokio::test]
async fn test_searchVideos_shouldClampLimitAndCache() {
    let client = common::populated_mock_client();
    let service = common::service_with(client.clone());

    let results = service
        .search_videos_with_captions(&json!({ "query": "rust", "limit": 3 }))
        .await
        .unwrap();
    assert_eq!(results.as_array().unwrap().len(), 3);

    service
        .search_videos_with_captions(&json!({ "query": "  rust " , "limit": 3 }))
        .await
        .unwrap();
    assert_eq!(client.call_count(), 1);
}

/// Service calls also work from synchronous code driving its own runtime
#[test]
fn test_callTool_fromSyncContext_shouldReturnVideoInfo() {
    let client = common::populated_mock_client();
    let service = common::service_with(client.clone());

    let result = tokio_test::block_on(async {
        service
            .call(ToolName::GetVideoInfo, &json!({ "video_id": TEST_VIDEO_ID }))
            .await
    });

    assert_eq!(result.unwrap()["id"], TEST_VIDEO_ID);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_disabledCache_shouldAlwaysCallClient() {
    let client = common::populated_mock_client();
    let service = CaptionService::new(
        Arc::new(client.clone()),
        CacheStore::new(CacheConfig {
            enabled: false,
            ..common::test_cache_config()
        }),
        KeyBuilder::new(),
        "en",
    );

    let args = json!({ "video_id": TEST_VIDEO_ID });
    service.get_video_info(&args).await.unwrap();
    service.get_video_info(&args).await.unwrap();
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_fullCache_shouldStillReturnFreshResults() {
    let client = common::populated_mock_client();
    let service = CaptionService::new(
        Arc::new(client.clone()),
        CacheStore::new(CacheConfig {
            max_keys: 1,
            ..common::test_cache_config()
        }),
        KeyBuilder::new(),
        "en",
    );

    service.get_video_info(&json!({ "video_id": TEST_VIDEO_ID })).await.unwrap();
    let info = service.get_video_info(&json!({ "video_id": SILENT_VIDEO_ID })).await.unwrap();
    assert_eq!(info["id"], SILENT_VIDEO_ID);
    assert_eq!(service.cache().len(), 1);
}

#[tokio::test]
async fn test_call_shouldDispatchByToolName() {
    let service = common::service_with(common::populated_mock_client());

    let result = service
        .call(ToolName::GetCaptionsList, &json!({ "video_id": TEST_VIDEO_ID }))
        .await
        .unwrap();
    assert_eq!(result[0]["language"], "en");

    assert_eq!(ToolName::from_name("download_captions"), Some(ToolName::DownloadCaptions));
    assert_eq!(ToolName::from_name("translate"), None);
}

#[tokio::test]
async fn test_fromConfig_shouldUseConfiguredDefaultLanguage() {
    let client = MockClient::working().with_captions(&common::video_id(TEST_VIDEO_ID), "ja", common::sample_segments());
    let mut config = common::test_config();
    config.default_language = "ja".to_string();
    let service = CaptionService::from_config(Arc::new(client), &config);

    let result = service.download_captions(&json!({ "video_id": TEST_VIDEO_ID })).await.unwrap();
    assert_eq!(result["language"], "ja");
}
