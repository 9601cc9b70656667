use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::app_config::ClientConfig;
use crate::captions::CaptionTransformer;
use crate::captions::formatters::decode_html_entities;
use crate::client::VideoPlatformClient;
use crate::errors::ClientError;
use crate::language_utils;
use crate::models::{CaptionFormat, CaptionSegment, CaptionTrack, CaptionsData, LanguageCode, SearchResult, VideoId, VideoInfo};

static TRACK_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<track\s+([^>]*?)/?>").unwrap()
});

static XML_ATTRIBUTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\w+)="([^"]*)""#).unwrap()
});

/// Client for the YouTube Data API v3 and the public timed-text endpoint
#[derive(Debug)]
pub struct YouTubeClient {
    /// HTTP client for API requests
    client: Client,
    /// Data API key
    api_key: String,
    /// Data API base URL
    endpoint: String,
    /// Timed-text base URL
    timedtext_endpoint: String,
}

/// Data API list envelope
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Snippet {
    fn thumbnail_url(&self) -> Option<String> {
        let thumbnails = self.thumbnails.as_ref()?;
        thumbnails.high.as_ref().or(thumbnails.default.as_ref()).map(|t| t.url.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    content_details: Option<ContentDetails>,
    #[serde(default)]
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: Option<String>,
    /// "true" or "false"
    #[serde(default)]
    caption: Option<String>,
}

/// Counts arrive as decimal strings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    #[serde(default)]
    view_count: Option<String>,
    #[serde(default)]
    like_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

/// Timed-text `fmt=json3` document
#[derive(Debug, Deserialize)]
struct TimedTextDocument {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Option<Vec<TimedTextSeg>>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

impl YouTubeClient {
    /// Create a new client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timedtext_endpoint: config.timedtext_endpoint.clone(),
        }
    }

    fn api_url(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, ClientError> {
        if self.api_key.is_empty() {
            return Err(ClientError::Configuration("YouTube Data API key is not configured".to_string()));
        }

        let mut all_params = params.to_vec();
        all_params.push(("key", self.api_key.as_str()));
        Url::parse_with_params(&format!("{}/{}", self.endpoint, resource), &all_params)
            .map_err(|e| ClientError::Configuration(format!("Invalid API endpoint: {}", e)))
    }

    fn timedtext_url(&self, params: &[(&str, &str)]) -> Result<Url, ClientError> {
        Url::parse_with_params(&self.timedtext_endpoint, params)
            .map_err(|e| ClientError::Configuration(format!("Invalid timed-text endpoint: {}", e)))
    }

    /// GET a URL and return the body, mapping failure statuses to client errors
    async fn fetch(&self, url: Url, video_id: Option<&VideoId>) -> Result<String, ClientError> {
        debug!("GET {}", redact_key(&url));

        let response = self.client.get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("Failed to reach the video platform: {}", e)))?;

        let status = response.status();
        let body = response.text().await
            .map_err(|e| ClientError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            error!("Video platform error ({}): {}", status, body);
            return Err(map_status(status, &body, video_id));
        }

        Ok(body)
    }
}

#[async_trait]
impl VideoPlatformClient for YouTubeClient {
    async fn get_video_info(&self, video_id: &VideoId) -> Result<VideoInfo, ClientError> {
        let url = self.api_url("videos", &[
            ("part", "snippet,contentDetails,statistics"),
            ("id", video_id.as_str()),
        ])?;
        let body = self.fetch(url, Some(video_id)).await?;
        parse_video_info(&body, video_id)
    }

    async fn get_captions_list(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>, ClientError> {
        let url = self.timedtext_url(&[("type", "list"), ("v", video_id.as_str())])?;
        let body = self.fetch(url, Some(video_id)).await?;
        let tracks = parse_track_list(&body);

        if tracks.is_empty() {
            return Err(ClientError::CaptionsNotAvailable {
                video_id: video_id.to_string(),
                language: None,
                message: None,
            });
        }
        Ok(tracks)
    }

    async fn download_captions(
        &self,
        video_id: &VideoId,
        lang: &LanguageCode,
        format: CaptionFormat,
    ) -> Result<CaptionsData, ClientError> {
        let url = self.timedtext_url(&[("v", video_id.as_str()), ("lang", lang.as_str()), ("fmt", "json3")])?;
        let body = self.fetch(url, Some(video_id)).await?;

        let not_available = || ClientError::CaptionsNotAvailable {
            video_id: video_id.to_string(),
            language: Some(lang.to_string()),
            message: None,
        };

        // The endpoint answers 200 with an empty body for missing tracks
        if body.trim().is_empty() {
            return Err(not_available());
        }

        let segments = parse_json3_segments(&body)?;
        if segments.is_empty() {
            return Err(not_available());
        }

        Ok(CaptionsData {
            video_id: video_id.clone(),
            language: lang.clone(),
            format,
            segments,
            formatted_content: None,
        })
    }

    async fn search_videos_with_captions(
        &self,
        query: &str,
        lang: Option<&LanguageCode>,
        limit: u32,
    ) -> Result<Vec<SearchResult>, ClientError> {
        let limit = limit.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("type", "video"),
            ("videoCaption", "closedCaption"),
            ("q", query),
            ("maxResults", limit.as_str()),
        ];
        if let Some(lang) = lang {
            params.push(("relevanceLanguage", lang.primary()));
        }

        let url = self.api_url("search", &params)?;
        let body = self.fetch(url, None).await?;
        parse_search_results(&body)
    }
}

fn map_status(status: StatusCode, body: &str, video_id: Option<&VideoId>) -> ClientError {
    let id = video_id.map(ToString::to_string).unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => ClientError::VideoNotFound { video_id: id },
        StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimitExceeded,
        // Quota exhaustion is reported as 403 by the Data API
        StatusCode::FORBIDDEN if body.contains("quotaExceeded") || body.contains("rateLimitExceeded") => {
            ClientError::RateLimitExceeded
        }
        StatusCode::FORBIDDEN => ClientError::AccessDenied { video_id: id },
        _ => ClientError::Network(format!("Video platform responded with HTTP {}", status)),
    }
}

fn redact_key(url: &Url) -> String {
    let pairs: Vec<String> = url.query_pairs()
        .map(|(k, v)| if k == "key" { format!("{}=***", k) } else { format!("{}={}", k, v) })
        .collect();
    format!("{}?{}", url.path(), pairs.join("&"))
}

fn parse_count(value: Option<&String>) -> Option<u64> {
    value.and_then(|v| v.parse().ok())
}

pub(crate) fn parse_video_info(body: &str, video_id: &VideoId) -> Result<VideoInfo, ClientError> {
    let response: ListResponse<VideoItem> = serde_json::from_str(body)
        .map_err(|e| ClientError::Parse(e.to_string()))?;

    let item = response.items.into_iter().next()
        .ok_or_else(|| ClientError::VideoNotFound { video_id: video_id.to_string() })?;

    let id = VideoId::parse(&item.id).unwrap_or_else(|_| video_id.clone());
    let thumbnail_url = item.snippet.thumbnail_url();
    let statistics = item.statistics.as_ref();
    let content_details = item.content_details.as_ref();

    Ok(VideoInfo {
        id,
        title: item.snippet.title,
        description: item.snippet.description,
        channel_title: item.snippet.channel_title,
        published_at: item.snippet.published_at,
        duration: content_details.and_then(|c| c.duration.clone()),
        view_count: parse_count(statistics.and_then(|s| s.view_count.as_ref())),
        like_count: parse_count(statistics.and_then(|s| s.like_count.as_ref())),
        thumbnail_url,
        has_captions: content_details.and_then(|c| c.caption.as_deref()) == Some("true"),
    })
}

pub(crate) fn parse_track_list(body: &str) -> Vec<CaptionTrack> {
    TRACK_TAG_REGEX
        .captures_iter(body)
        .filter_map(|tag| {
            let attributes: Vec<(String, String)> = XML_ATTRIBUTE_REGEX
                .captures_iter(&tag[1])
                .map(|a| (a[1].to_string(), decode_html_entities(&a[2])))
                .collect();
            let attribute = |name: &str| {
                attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
            };

            let language = attribute("lang_code")?;
            let language_name = attribute("lang_translated")
                .or_else(|| attribute("lang_original"))
                .or_else(|| language_utils::get_language_name(&language));

            Some(CaptionTrack {
                name: attribute("name").unwrap_or_default(),
                is_auto_generated: attribute("kind").as_deref() == Some("asr"),
                is_default: attribute("lang_default").as_deref() == Some("true"),
                language_name,
                language,
            })
        })
        .collect()
}

pub(crate) fn parse_json3_segments(body: &str) -> Result<Vec<CaptionSegment>, ClientError> {
    let document: TimedTextDocument = serde_json::from_str(body)
        .map_err(|e| ClientError::Parse(e.to_string()))?;

    let segments = document.events
        .into_iter()
        .filter(|event| event.d_duration_ms > 0)
        .filter_map(|event| {
            let raw: String = event.segs?.into_iter().map(|s| s.utf8).collect();
            let text = CaptionTransformer::normalize_text(&decode_html_entities(&raw));
            if text.is_empty() {
                return None;
            }
            Some(CaptionSegment::new(
                event.t_start_ms as f64 / 1000.0,
                event.d_duration_ms as f64 / 1000.0,
                text,
            ))
        })
        .collect();

    Ok(segments)
}

pub(crate) fn parse_search_results(body: &str) -> Result<Vec<SearchResult>, ClientError> {
    let response: ListResponse<SearchItem> = serde_json::from_str(body)
        .map_err(|e| ClientError::Parse(e.to_string()))?;

    Ok(response.items
        .into_iter()
        .filter_map(|item| {
            let video_id = VideoId::parse(item.id.video_id.as_deref()?).ok()?;
            let thumbnail_url = item.snippet.thumbnail_url();
            Some(SearchResult {
                video_id,
                title: decode_html_entities(&item.snippet.title),
                description: decode_html_entities(&item.snippet.description),
                channel_title: item.snippet.channel_title,
                published_at: item.snippet.published_at,
                thumbnail_url,
            })
        })
        .collect())
}
