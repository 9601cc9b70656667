/*!
 * Tool orchestration.
 *
 * Each handler follows the same flow: validate the raw arguments, derive the
 * cache key, answer from the cache when possible, otherwise call the platform
 * client, transform, store with the operation's TTL tier and return.
 */

use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::app_config::Config;
use crate::cache::{CacheStats, CacheStore, KeyBuilder, ttl};
use crate::captions::CaptionTransformer;
use crate::client::VideoPlatformClient;
use crate::errors::ToolError;
use crate::validators;

/// The four tools exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    GetVideoInfo,
    GetCaptionsList,
    DownloadCaptions,
    SearchVideosWithCaptions,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::GetVideoInfo,
        ToolName::GetCaptionsList,
        ToolName::DownloadCaptions,
        ToolName::SearchVideosWithCaptions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetVideoInfo => "get_video_info",
            Self::GetCaptionsList => "get_captions_list",
            Self::DownloadCaptions => "download_captions",
            Self::SearchVideosWithCaptions => "search_videos_with_captions",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates, caches and fetches tool results
#[derive(Clone)]
pub struct CaptionService {
    client: Arc<dyn VideoPlatformClient>,
    cache: CacheStore<Value>,
    keys: KeyBuilder,
    default_language: String,
}

impl CaptionService {
    pub fn new(
        client: Arc<dyn VideoPlatformClient>,
        cache: CacheStore<Value>,
        keys: KeyBuilder,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            client,
            cache,
            keys,
            default_language: default_language.into(),
        }
    }

    /// Build the service and its cache from configuration
    pub fn from_config(client: Arc<dyn VideoPlatformClient>, config: &Config) -> Self {
        Self::new(
            client,
            CacheStore::new(config.cache.clone()),
            KeyBuilder::from_config(&config.cache),
            config.default_language.clone(),
        )
    }

    pub fn cache(&self) -> &CacheStore<Value> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Run one tool with raw JSON arguments
    pub async fn call(&self, tool: ToolName, args: &Value) -> Result<Value, ToolError> {
        match tool {
            ToolName::GetVideoInfo => self.get_video_info(args).await,
            ToolName::GetCaptionsList => self.get_captions_list(args).await,
            ToolName::DownloadCaptions => self.download_captions(args).await,
            ToolName::SearchVideosWithCaptions => self.search_videos_with_captions(args).await,
        }
    }

    pub async fn get_video_info(&self, args: &Value) -> Result<Value, ToolError> {
        let request = validators::validate_get_video_info(args)?;
        let key = self.keys.video_info(&request.video_id);

        self.cached(&key, ttl::VIDEO_INFO, async {
            self.client.get_video_info(&request.video_id).await.map_err(ToolError::from)
        })
        .await
    }

    pub async fn get_captions_list(&self, args: &Value) -> Result<Value, ToolError> {
        let request = validators::validate_get_captions_list(args)?;
        let key = self.keys.captions_list(&request.video_id);

        self.cached(&key, ttl::CAPTIONS_LIST, async {
            self.client.get_captions_list(&request.video_id).await.map_err(ToolError::from)
        })
        .await
    }

    /// `lang` falls back to the configured default language when omitted
    pub async fn download_captions(&self, args: &Value) -> Result<Value, ToolError> {
        let args = self.with_default_language(args);
        let request = validators::validate_download_captions(&args)?;
        let key = self.keys.captions_data(&request.video_id, &request.lang, request.format);

        self.cached(&key, ttl::CAPTIONS_DATA, async {
            self.client
                .download_captions(&request.video_id, &request.lang, request.format)
                .await
                .map(|data| CaptionTransformer::format_captions(&data))
                .map_err(ToolError::from)
        })
        .await
    }

    pub async fn search_videos_with_captions(&self, args: &Value) -> Result<Value, ToolError> {
        let request = validators::validate_search_videos(args)?;
        let key = self.keys.search(&request.query, request.lang.as_ref());

        self.cached(&key, ttl::SEARCH_RESULTS, async {
            self.client
                .search_videos_with_captions(&request.query, request.lang.as_ref(), request.limit)
                .await
                .map_err(ToolError::from)
        })
        .await
    }

    fn with_default_language(&self, args: &Value) -> Value {
        let mut args = if args.is_null() { Value::Object(Map::new()) } else { args.clone() };
        if let Some(object) = args.as_object_mut() {
            let missing = object.get("lang").is_none_or(Value::is_null);
            if missing {
                object.insert("lang".to_string(), Value::from(self.default_language.clone()));
            }
        }
        args
    }

    /// Answer from the cache or run `fetch` and store its result
    async fn cached<T, F>(&self, key: &str, ttl_secs: u64, fetch: F) -> Result<Value, ToolError>
    where
        T: Serialize,
        F: Future<Output = Result<T, ToolError>>,
    {
        if let Some(hit) = self.cache.get(key) {
            return Ok(hit);
        }

        let result = fetch.await?;
        let value = serde_json::to_value(&result)
            .map_err(|e| ToolError::cache(format!("Failed to save to cache: {}", key), key)
                .with_detail("error", e.to_string()))?;

        if self.cache.is_enabled() && !self.cache.set(key, value.clone(), ttl_secs) {
            warn!("Result for {} was not cached", key);
        } else {
            debug!("Fetched {} (TTL: {}s)", key, ttl_secs);
        }
        Ok(value)
    }
}
