/*!
 * Subtitle serialization and text display helpers.
 */

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::CaptionSegment;

static HTML_ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&[#\w]+;").unwrap()
});

static BRACKET_ANNOTATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[.*?\]").unwrap()
});

static PAREN_ANNOTATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(.*?\)").unwrap()
});

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap()
});

static FILENAME_INVALID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[<>:"/\\|?*]"#).unwrap()
});

static UNDERSCORE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"_{2,}").unwrap()
});

/// Seconds to whole milliseconds, rounded, floored at 0
fn to_millis(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}

fn format_timestamp(seconds: f64, millis_separator: char) -> String {
    let ms = to_millis(seconds);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, millis_separator, millis)
}

/// `HH:MM:SS,mmm`
pub fn format_srt_time(seconds: f64) -> String {
    format_timestamp(seconds, ',')
}

/// `HH:MM:SS.mmm`
pub fn format_vtt_time(seconds: f64) -> String {
    format_timestamp(seconds, '.')
}

/// Serialize segments as SubRip
pub fn format_to_srt(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                index + 1,
                format_srt_time(segment.start),
                format_srt_time(segment.end()),
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize segments as WebVTT
pub fn format_to_vtt(segments: &[CaptionSegment]) -> String {
    let content = segments
        .iter()
        .map(|segment| {
            format!(
                "{} --> {}\n{}\n",
                format_vtt_time(segment.start),
                format_vtt_time(segment.end()),
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("WEBVTT\n\n{}", content)
}

/// Playback length as `H:MM:SS`, or `M:SS` under an hour
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Compact count such as `1.2K` or `3.4M`
pub fn format_number(num: u64) -> String {
    let value = num as f64;
    if num >= 1_000_000_000 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if num >= 1_000_000 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        num.to_string()
    }
}

/// RFC 3339 timestamp as `Month D, YYYY`; anything else is returned unchanged
pub fn format_date(date: &str) -> String {
    match DateTime::parse_from_rfc3339(date) {
        Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Truncate to `max_length` characters, ending with `...` when cut
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let keep = max_length.saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// Decode the handful of entities the caption endpoints emit
pub fn decode_html_entities(text: &str) -> String {
    HTML_ENTITY_REGEX
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[0];
            match entity {
                "&amp;" => "&".to_string(),
                "&lt;" => "<".to_string(),
                "&gt;" => ">".to_string(),
                "&quot;" => "\"".to_string(),
                "&#39;" | "&apos;" => "'".to_string(),
                other => other.to_string(),
            }
        })
        .into_owned()
}

/// Decode entities, drop `[Music]`/`(laughs)` style annotations, collapse whitespace
pub fn clean_caption_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    let without_brackets = BRACKET_ANNOTATION_REGEX.replace_all(&decoded, "");
    let without_parens = PAREN_ANNOTATION_REGEX.replace_all(&without_brackets, "");
    WHITESPACE_REGEX.replace_all(&without_parens, " ").trim().to_string()
}

/// Make a string safe to use as a file name (max 100 characters)
pub fn sanitize_filename(filename: &str) -> String {
    let replaced = FILENAME_INVALID_REGEX.replace_all(filename, "_");
    let replaced = WHITESPACE_REGEX.replace_all(&replaced, "_");
    let collapsed = UNDERSCORE_RUN_REGEX.replace_all(&replaced, "_");
    collapsed.trim_matches('_').chars().take(100).collect()
}

/// Byte count as `1.5 KB`, `2 MB`, ...
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // Two decimals, trailing zeros dropped
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
