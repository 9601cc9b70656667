/*!
 * Video platform clients.
 *
 * The tool pipeline only depends on the `VideoPlatformClient` contract:
 * - `youtube`: HTTP client for the Data API and the timed-text endpoint
 * - `mock`: in-memory client with scripted behaviors, for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ClientError;
use crate::models::{CaptionFormat, CaptionTrack, CaptionsData, LanguageCode, SearchResult, VideoId, VideoInfo};

/// Retrieval contract for video metadata and captions
///
/// Ids and language codes passed in are already validated and normalized.
/// Implementations own network concerns (timeouts, authentication,
/// throttling) and report failures as `ClientError`.
#[async_trait]
pub trait VideoPlatformClient: Send + Sync + Debug {
    /// Fetch basic metadata for one video
    async fn get_video_info(&self, video_id: &VideoId) -> Result<VideoInfo, ClientError>;

    /// List the caption tracks available for a video
    async fn get_captions_list(&self, video_id: &VideoId) -> Result<Vec<CaptionTrack>, ClientError>;

    /// Download caption segments in one language
    ///
    /// The returned `CaptionsData` carries `format` but no formatted content;
    /// serialization happens in the caption transformer.
    async fn download_captions(
        &self,
        video_id: &VideoId,
        lang: &LanguageCode,
        format: CaptionFormat,
    ) -> Result<CaptionsData, ClientError>;

    /// Search for videos that have captions
    async fn search_videos_with_captions(
        &self,
        query: &str,
        lang: Option<&LanguageCode>,
        limit: u32,
    ) -> Result<Vec<SearchResult>, ClientError>;
}

pub mod mock;
pub mod youtube;

pub use self::mock::{MockBehavior, MockClient};
pub use self::youtube::YouTubeClient;
