/*!
 * Pure transformations over caption segment sequences.
 *
 * None of these functions mutate their input; every operation returns a new
 * sequence or value.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::captions::formatters::{format_to_srt, format_to_vtt};
use crate::models::{CaptionFormat, CaptionSegment, CaptionsData};

/// Default gap (seconds) under which adjacent segments are merged
pub const DEFAULT_MERGE_GAP: f64 = 1.0;

/// Default minimum duration (seconds) kept by `filter_segments`
pub const DEFAULT_MIN_DURATION: f64 = 0.5;

static WHITESPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap()
});

/// Aggregate figures over a segment sequence
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStatistics {
    pub total_segments: usize,
    pub total_duration: f64,
    pub total_words: usize,
    pub average_segment_duration: f64,
    pub average_words_per_segment: f64,
}

/// Outcome of `validate_captions`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

/// A segment matching a text search, with its position in the input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    #[serde(flatten)]
    pub segment: CaptionSegment,
    /// Zero-based index of the segment in the searched sequence
    pub match_index: usize,
}

/// Caption segment transformer
pub struct CaptionTransformer;

impl CaptionTransformer {
    /// Populate `formatted_content` according to `data.format`
    pub fn format_captions(data: &CaptionsData) -> CaptionsData {
        let formatted_content = match data.format {
            CaptionFormat::Srt => Some(format_to_srt(&data.segments)),
            CaptionFormat::Vtt => Some(format_to_vtt(&data.segments)),
            CaptionFormat::Raw => None,
        };

        CaptionsData {
            formatted_content,
            ..data.clone()
        }
    }

    /// Coalesce segments separated by at most `max_gap` seconds
    ///
    /// A merged segment spans from the first start to the last end, with
    /// texts joined by a single space.
    pub fn merge_segments(segments: &[CaptionSegment], max_gap: f64) -> Vec<CaptionSegment> {
        let Some((first, rest)) = segments.split_first() else {
            return Vec::new();
        };

        let mut merged = Vec::with_capacity(segments.len());
        let mut current = first.clone();

        for next in rest {
            let gap = next.start - current.end();
            if gap <= max_gap {
                current.duration = next.end() - current.start;
                current.text.push(' ');
                current.text.push_str(&next.text);
            } else {
                merged.push(std::mem::replace(&mut current, next.clone()));
            }
        }
        merged.push(current);

        debug!("Merged {} segments into {}", segments.len(), merged.len());
        merged
    }

    /// Keep segments lasting at least `min_duration` with non-blank text
    pub fn filter_segments(segments: &[CaptionSegment], min_duration: f64) -> Vec<CaptionSegment> {
        segments
            .iter()
            .filter(|segment| segment.duration >= min_duration && !segment.text.trim().is_empty())
            .cloned()
            .collect()
    }

    /// Collapse whitespace runs; a run containing a newline becomes one newline
    ///
    /// Line breaks survive on purpose: unlike a flat `\s+` to space collapse,
    /// multi-line caption text keeps one break per original line group.
    pub fn normalize_text(text: &str) -> String {
        WHITESPACE_RUN_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                if caps[0].contains('\n') { "\n" } else { " " }
            })
            .trim()
            .to_string()
    }

    /// Shift every start by `offset`, never below 0
    pub fn adjust_timing(segments: &[CaptionSegment], offset: f64) -> Vec<CaptionSegment> {
        segments
            .iter()
            .map(|segment| CaptionSegment {
                start: (segment.start + offset).max(0.0),
                ..segment.clone()
            })
            .collect()
    }

    pub fn get_statistics(segments: &[CaptionSegment]) -> CaptionStatistics {
        if segments.is_empty() {
            return CaptionStatistics::default();
        }

        let total_segments = segments.len();
        let total_duration: f64 = segments.iter().map(|s| s.duration).sum();
        let total_words: usize = segments.iter().map(|s| s.text.split_whitespace().count()).sum();

        CaptionStatistics {
            total_segments,
            total_duration,
            total_words,
            average_segment_duration: total_duration / total_segments as f64,
            average_words_per_segment: total_words as f64 / total_segments as f64,
        }
    }

    /// Segments overlapping `[start_time, end_time)`, clipped and re-based to `start_time`
    ///
    /// Segments lying entirely inside the window keep their duration as is.
    pub fn extract_time_range(segments: &[CaptionSegment], start_time: f64, end_time: f64) -> Vec<CaptionSegment> {
        segments
            .iter()
            .filter(|segment| segment.start < end_time && segment.end() > start_time)
            .map(|segment| {
                let segment_end = segment.end();
                let new_start = segment.start.max(start_time);
                let duration = if segment.start >= start_time && segment_end <= end_time {
                    segment.duration
                } else {
                    segment_end.min(end_time) - new_start
                };

                CaptionSegment {
                    start: new_start - start_time,
                    duration,
                    text: segment.text.clone(),
                }
            })
            .collect()
    }

    /// Segments whose text contains `query`
    pub fn search_text(segments: &[CaptionSegment], query: &str, case_sensitive: bool) -> Vec<SearchMatch> {
        let needle = if case_sensitive { query.to_string() } else { query.to_lowercase() };

        segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| {
                if case_sensitive {
                    segment.text.contains(&needle)
                } else {
                    segment.text.to_lowercase().contains(&needle)
                }
            })
            .map(|(index, segment)| SearchMatch {
                segment: segment.clone(),
                match_index: index,
            })
            .collect()
    }

    /// Report quality issues without altering the sequence
    pub fn validate_captions(segments: &[CaptionSegment]) -> ValidationReport {
        let mut issues = Vec::new();

        if segments.is_empty() {
            issues.push("No caption segments exist".to_string());
        }

        for (i, segment) in segments.iter().enumerate() {
            let position = i + 1;

            if segment.start < 0.0 {
                issues.push(format!("Segment {}: Start time is negative", position));
            }
            if segment.duration <= 0.0 {
                issues.push(format!("Segment {}: Duration is zero or negative", position));
            }
            if segment.text.trim().is_empty() {
                issues.push(format!("Segment {}: Text is empty", position));
            }
            if i > 0 && segment.start < segments[i - 1].end() {
                issues.push(format!("Segment {}: Overlaps with previous segment", position));
            }
        }

        ValidationReport {
            is_valid: issues.is_empty(),
            issues,
        }
    }
}
