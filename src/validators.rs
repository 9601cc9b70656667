/*!
 * Request validation for the four tool operations.
 *
 * Raw call arguments arrive as an untyped JSON object. Each `validate_*`
 * function turns them into a typed request or fails with a single
 * `ToolError` of kind `Validation` that lists every violated field.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

use crate::errors::{FieldError, ToolError};
use crate::language_utils::normalize_language_code;
use crate::models::{CaptionFormat, LanguageCode, VideoId};

/// Default number of search results
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
/// Smallest accepted search limit
pub const MIN_SEARCH_LIMIT: u32 = 1;
/// Largest accepted search limit
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// URL shapes that carry a video id (watch, short link, embed, legacy /v/, shorts)
static VIDEO_URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([A-Za-z0-9_-]{11})").unwrap(),
        Regex::new(r"youtube\.com/v/([A-Za-z0-9_-]{11})").unwrap(),
        Regex::new(r"youtube\.com/shorts/([A-Za-z0-9_-]{11})").unwrap(),
        Regex::new(r"youtube\.com/watch\?.*v=([A-Za-z0-9_-]{11})").unwrap(),
    ]
});

static CONTROL_CHARS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x1f\x7f]").unwrap()
});

#[derive(Debug, Clone, PartialEq)]
pub struct GetVideoInfoRequest {
    pub video_id: VideoId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetCaptionsListRequest {
    pub video_id: VideoId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadCaptionsRequest {
    pub video_id: VideoId,
    pub lang: LanguageCode,
    pub format: CaptionFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchVideosRequest {
    pub query: String,
    pub lang: Option<LanguageCode>,
    pub limit: u32,
}

/// Extract the canonical video id from a bare id or a recognized URL
pub fn extract_video_id(input: &str) -> Result<VideoId, ToolError> {
    let input = input.trim();

    if VideoId::is_canonical(input) {
        return VideoId::parse(input);
    }

    for pattern in VIDEO_URL_PATTERNS.iter() {
        if let Some(id) = pattern.captures(input).and_then(|c| c.get(1)) {
            return VideoId::parse(id.as_str());
        }
    }

    Err(ToolError::validation("Please provide a valid YouTube URL or video ID")
        .with_detail("input", input)
        .with_detail(
            "examples",
            json!([
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                "https://youtu.be/dQw4w9WgXcQ",
                "dQw4w9WgXcQ"
            ]),
        ))
}

/// Strip angle brackets and control characters, then trim
pub fn sanitize_string(input: &str) -> String {
    let without_tags: String = input.chars().filter(|c| *c != '<' && *c != '>').collect();
    CONTROL_CHARS_REGEX.replace_all(&without_tags, "").trim().to_string()
}

/// Reject a number outside `[min, max]`
pub fn validate_range(value: f64, min: f64, max: f64, name: &str) -> Result<f64, ToolError> {
    if value < min || value > max {
        return Err(ToolError::validation(format!("{} must be between {} and {}", name, min, max))
            .with_detail("value", value)
            .with_detail("min", min)
            .with_detail("max", max));
    }
    Ok(value)
}

pub fn validate_get_video_info(args: &Value) -> Result<GetVideoInfoRequest, ToolError> {
    let mut errors = FieldErrors::new(args);
    let video_id = errors.video_id("video_id");
    errors.finish()?;
    Ok(GetVideoInfoRequest { video_id: required(video_id)? })
}

pub fn validate_get_captions_list(args: &Value) -> Result<GetCaptionsListRequest, ToolError> {
    let mut errors = FieldErrors::new(args);
    let video_id = errors.video_id("video_id");
    errors.finish()?;
    Ok(GetCaptionsListRequest { video_id: required(video_id)? })
}

pub fn validate_download_captions(args: &Value) -> Result<DownloadCaptionsRequest, ToolError> {
    let mut errors = FieldErrors::new(args);
    let video_id = errors.video_id("video_id");
    let lang = errors.language("lang", true);
    let format = errors.format("format");
    errors.finish()?;

    Ok(DownloadCaptionsRequest {
        video_id: required(video_id)?,
        lang: required(lang)?,
        format: format.unwrap_or_default(),
    })
}

pub fn validate_search_videos(args: &Value) -> Result<SearchVideosRequest, ToolError> {
    let mut errors = FieldErrors::new(args);
    let query = errors.query("query");
    let lang = errors.language("lang", false);
    let limit = errors.limit("limit");
    errors.finish()?;

    Ok(SearchVideosRequest {
        query: required(query)?,
        lang,
        limit: limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
    })
}

// Only reachable if a field check returned None without recording an error
fn required<T>(value: Option<T>) -> Result<T, ToolError> {
    value.ok_or_else(|| ToolError::system("Validated request is missing a field"))
}

/// Collects field errors across one request
struct FieldErrors<'a> {
    args: &'a Value,
    errors: Vec<FieldError>,
}

impl<'a> FieldErrors<'a> {
    fn new(args: &'a Value) -> Self {
        let mut errors = Vec::new();
        if !args.is_object() && !args.is_null() {
            errors.push(FieldError::new("", "Expected an object of arguments", "invalid_type"));
        }
        Self { args, errors }
    }

    fn field(&self, name: &str) -> Option<&'a Value> {
        self.args.get(name).filter(|v| !v.is_null())
    }

    fn push(&mut self, path: &str, message: &str, rule: &str) {
        self.errors.push(FieldError::new(path, message, rule));
    }

    fn string(&mut self, name: &str, required: bool) -> Option<&'a str> {
        match self.field(name) {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                self.push(name, "Expected string", "invalid_type");
                None
            }
            None => {
                if required {
                    self.push(name, "Required", "required");
                }
                None
            }
        }
    }

    fn video_id(&mut self, name: &str) -> Option<VideoId> {
        let raw = self.string(name, true)?;
        match extract_video_id(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                self.push(name, &e.message, "invalid_video_id");
                None
            }
        }
    }

    fn language(&mut self, name: &str, required: bool) -> Option<LanguageCode> {
        let raw = self.string(name, required)?;
        match LanguageCode::parse(&normalize_language_code(raw)) {
            Ok(code) => Some(code),
            Err(e) => {
                self.push(name, &e.message, "invalid_string");
                None
            }
        }
    }

    fn format(&mut self, name: &str) -> Option<CaptionFormat> {
        let raw = self.string(name, false)?;
        match raw.trim().to_lowercase().parse::<CaptionFormat>() {
            Ok(format) => Some(format),
            Err(e) => {
                self.push(name, &e.message, "invalid_enum_value");
                None
            }
        }
    }

    fn query(&mut self, name: &str) -> Option<String> {
        let raw = self.string(name, true)?;
        let query = raw.trim();
        if query.is_empty() {
            self.push(name, "Please enter a search query", "too_small");
            return None;
        }
        Some(query.to_string())
    }

    /// Integer limit, clamped into range
    fn limit(&mut self, name: &str) -> Option<u32> {
        let value = self.field(name)?;
        let Some(number) = value.as_f64() else {
            self.push(name, "Expected number", "invalid_type");
            return None;
        };
        if number.fract() != 0.0 || !number.is_finite() {
            self.push(name, "Expected integer, received float", "invalid_type");
            return None;
        }
        let clamped = number.clamp(MIN_SEARCH_LIMIT as f64, MAX_SEARCH_LIMIT as f64);
        Some(clamped as u32)
    }

    fn finish(self) -> Result<(), ToolError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ToolError::invalid_fields(&self.errors))
        }
    }
}
