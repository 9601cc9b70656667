/*!
 * Mock client implementation for testing.
 *
 * Serves fixtures registered up front and simulates different behaviors:
 * - `MockClient::working()` - answers from fixtures
 * - `MockClient::failing(error)` - every call fails with `error`
 * - `MockClient::slow(delay_ms)` - answers from fixtures after a delay
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::client::VideoPlatformClient;
use crate::errors::ClientError;
use crate::language_utils;
use crate::models::{CaptionFormat, CaptionSegment, CaptionTrack, CaptionsData, LanguageCode, SearchResult, VideoId, VideoInfo};

/// Behavior mode for the mock client
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Answer from fixtures
    Working,
    /// Always fail with this error
    Failing(ClientError),
    /// Answer from fixtures after sleeping
    Slow { delay_ms: u64 },
}

#[derive(Debug, Default)]
struct Fixtures {
    videos: HashMap<String, VideoInfo>,
    tracks: HashMap<String, Vec<CaptionTrack>>,
    captions: HashMap<(String, String), Vec<CaptionSegment>>,
    search_results: Vec<SearchResult>,
}

/// In-memory video platform client
#[derive(Debug, Clone)]
pub struct MockClient {
    behavior: MockBehavior,
    fixtures: Arc<RwLock<Fixtures>>,
    /// Number of calls served, across all methods
    call_count: Arc<AtomicUsize>,
}

impl MockClient {
    /// Create a new mock client with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            fixtures: Arc::new(RwLock::new(Fixtures::default())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing(error: ClientError) -> Self {
        Self::new(MockBehavior::Failing(error))
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Register metadata for a video
    pub fn with_video(self, info: VideoInfo) -> Self {
        self.fixtures.write().videos.insert(info.id.to_string(), info);
        self
    }

    /// Register caption segments for a video and language
    ///
    /// Also registers a caption track for that language.
    pub fn with_captions(self, video_id: &VideoId, lang: &str, segments: Vec<CaptionSegment>) -> Self {
        {
            let mut fixtures = self.fixtures.write();
            fixtures.tracks.entry(video_id.to_string()).or_default().push(CaptionTrack {
                language: lang.to_string(),
                name: String::new(),
                language_name: language_utils::get_language_name(lang),
                is_auto_generated: false,
                is_default: false,
            });
            fixtures.captions.insert((video_id.to_string(), lang.to_string()), segments);
        }
        self
    }

    /// Register the results returned for every search
    pub fn with_search_results(self, results: Vec<SearchResult>) -> Self {
        self.fixtures.write().search_results = results;
        self
    }

    /// Total calls made to this client (shared across clones)
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    async fn begin_call(&self) -> Result<(), ClientError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Working => Ok(()),
            MockBehavior::Failing(error) => Err(error.clone()),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                Ok(())
            }
        }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::working()
    }
}

#[async_trait]
impl VideoPlatformClient for MockClient {
    async fn get_video_info(&self, video_id: &VideoId) -> Result<VideoInfo, ClientError> {
        self.begin_call().await?;
        self.fixtures.read().videos.get(video_id.as_str()).cloned()
            .ok_or_else(|| ClientError::VideoNotFound { video_id: video_id.to_string() })
    }

    async fn get_captions_list(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>, ClientError> {
        self.begin_call().await?;
        let fixtures = self.fixtures.read();
        match fixtures.tracks.get(video_id.as_str()) {
            Some(tracks) if !tracks.is_empty() => Ok(tracks.clone()),
            _ if fixtures.videos.contains_key(video_id.as_str()) => Err(ClientError::CaptionsNotAvailable {
                video_id: video_id.to_string(),
                language: None,
                message: None,
            }),
            _ => Err(ClientError::VideoNotFound { video_id: video_id.to_string() }),
        }
    }

    async fn download_captions(
        &self,
        video_id: &VideoId,
        lang: &LanguageCode,
        format: CaptionFormat,
    ) -> Result<CaptionsData, ClientError> {
        self.begin_call().await?;
        let fixtures = self.fixtures.read();
        let segments = fixtures.captions.get(&(video_id.to_string(), lang.to_string())).cloned()
            .ok_or_else(|| ClientError::CaptionsNotAvailable {
                video_id: video_id.to_string(),
                language: Some(lang.to_string()),
                message: None,
            })?;

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
        _query: &str,
        _lang: Option<&LanguageCode>,
        limit: u32,
    ) -> Result<Vec<SearchResult>, ClientError> {
        self.begin_call().await?;
        Ok(self.fixtures.read().search_results.iter().take(limit as usize).cloned().collect())
    }
}
