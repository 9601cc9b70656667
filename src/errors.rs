/*!
 * Error types for the captionkit tool server.
 *
 * Every failure surfaced to a tool caller is a `ToolError`: a machine-readable
 * `ErrorKind` tag plus a message, structured details and an optional
 * remediation hint. Errors raised by the video platform client are modelled
 * separately as `ClientError` and convert into `ToolError` with their kind
 * preserved.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed or missing input fields
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// The requested video does not exist
    #[serde(rename = "VIDEO_NOT_FOUND")]
    VideoNotFound,
    /// The video has no captions for the requested language
    #[serde(rename = "CAPTIONS_NOT_AVAILABLE")]
    CaptionsNotAvailable,
    /// The video is private or removed
    #[serde(rename = "ACCESS_DENIED")]
    AccessDenied,
    /// The platform refused the request because of quota
    #[serde(rename = "RATE_LIMIT_EXCEEDED")]
    RateLimit,
    /// Transport-level failure talking to the platform
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    /// A cache operation failed
    #[serde(rename = "CACHE_ERROR")]
    Cache,
    /// Anything not classified above
    #[serde(rename = "SYSTEM_ERROR")]
    System,
}

impl ErrorKind {
    /// Wire code used in serialized error payloads
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::VideoNotFound => "VIDEO_NOT_FOUND",
            Self::CaptionsNotAvailable => "CAPTIONS_NOT_AVAILABLE",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::RateLimit => "RATE_LIMIT_EXCEEDED",
            Self::Network => "NETWORK_ERROR",
            Self::Cache => "CACHE_ERROR",
            Self::System => "SYSTEM_ERROR",
        }
    }

    /// Default remediation hint for this kind
    pub fn default_suggestion(&self) -> &'static str {
        match self {
            Self::Validation => "Check the input parameters",
            Self::VideoNotFound => "Check the video ID or URL",
            Self::CaptionsNotAvailable => "Check whether captions are available in another language",
            Self::AccessDenied => "Check that the video is public",
            Self::RateLimit => "Wait a while and try again",
            Self::Network => "Check the network connection",
            Self::Cache => "Clear the cache and try again",
            Self::System => "Wait a while and try again",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single violated constraint on one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field
    pub path: String,
    /// Human-readable description
    pub message: String,
    /// Name of the violated rule (e.g. `required`, `pattern`, `type`)
    #[serde(rename = "code")]
    pub rule: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            rule: rule.into(),
        }
    }
}

/// Tagged error returned by every tool operation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ToolError {
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Structured context (offending key, video id, field errors, ...)
    pub details: Map<String, Value>,
    /// Optional corrective hint
    pub suggestion: Option<String>,
}

impl ToolError {
    /// Create an error of the given kind with that kind's default suggestion
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: Map::new(),
            suggestion: Some(kind.default_suggestion().to_string()),
        }
    }

    /// Attach one detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Replace the suggestion
    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Validation failure aggregating every field-level violation
    pub fn invalid_fields(errors: &[FieldError]) -> Self {
        let errors: Vec<Value> = errors
            .iter()
            .map(|e| json!({ "path": e.path, "message": e.message, "code": e.rule }))
            .collect();
        Self::validation("Invalid input parameters").with_detail("errors", errors)
    }

    pub fn video_not_found(video_id: &str) -> Self {
        Self::new(ErrorKind::VideoNotFound, "The requested video was not found")
            .with_detail("videoId", video_id)
    }

    pub fn captions_not_available(video_id: &str, language: Option<&str>, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| "The requested video has no captions".to_string());
        Self::new(ErrorKind::CaptionsNotAvailable, message)
            .with_detail("videoId", video_id)
            .with_detail("language", language.map(Value::from).unwrap_or(Value::Null))
    }

    pub fn access_denied(video_id: &str) -> Self {
        Self::new(ErrorKind::AccessDenied, "The video cannot be accessed (private or removed)")
            .with_detail("videoId", video_id)
    }

    pub fn rate_limited() -> Self {
        Self::new(ErrorKind::RateLimit, "The request limit has been reached")
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Cache operation failure on a specific key
    pub fn cache(message: impl Into<String>, key: &str) -> Self {
        Self::new(ErrorKind::Cache, message).with_detail("key", key)
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::System, message)
    }

    /// Serialize as `{type, message, details?, suggestion?}`
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("type".to_string(), Value::from(self.kind.code()));
        body.insert("message".to_string(), Value::from(self.message.clone()));
        if !self.details.is_empty() {
            body.insert("details".to_string(), Value::Object(self.details.clone()));
        }
        if let Some(suggestion) = &self.suggestion {
            body.insert("suggestion".to_string(), Value::from(suggestion.clone()));
        }
        Value::Object(body)
    }
}

/// Errors raised by a video platform client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The video id does not resolve to a video
    #[error("Video not found: {video_id}")]
    VideoNotFound { video_id: String },

    /// No caption track matches the request
    #[error("Captions not available for video {video_id}")]
    CaptionsNotAvailable {
        video_id: String,
        language: Option<String>,
        message: Option<String>,
    },

    /// The video exists but cannot be read
    #[error("Access denied for video {video_id}")]
    AccessDenied { video_id: String },

    /// The platform throttled the request
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The platform answered with something we cannot interpret
    #[error("Failed to parse platform response: {0}")]
    Parse(String),

    /// The client is missing required settings
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

impl From<ClientError> for ToolError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::VideoNotFound { video_id } => ToolError::video_not_found(&video_id),
            ClientError::CaptionsNotAvailable { video_id, language, message } => {
                ToolError::captions_not_available(&video_id, language.as_deref(), message)
            }
            ClientError::AccessDenied { video_id } => ToolError::access_denied(&video_id),
            ClientError::RateLimitExceeded => ToolError::rate_limited(),
            ClientError::Network(message) => ToolError::network(message),
            ClientError::Parse(message) => {
                ToolError::system("Unexpected response from the video platform").with_detail("error", message)
            }
            ClientError::Configuration(message) => ToolError::system(message)
                .with_suggestion(Some("Check the client section of the configuration file".to_string())),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(error: serde_json::Error) -> Self {
        ToolError::system("Failed to serialize response").with_detail("error", error.to_string())
    }
}
