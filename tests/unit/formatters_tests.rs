/*!
 * Tests for SRT/VTT serialization and display helpers
 */

use captionkit::captions::formatters::{
    clean_caption_text, decode_html_entities, format_bytes, format_date, format_duration, format_number,
    format_srt_time, format_to_srt, format_to_vtt, format_vtt_time, sanitize_filename, truncate_text,
};

use crate::common::segment;

#[test]
fn test_formatSrtTime_shouldUseCommaSeparator() {
    assert_eq!(format_srt_time(0.0), "00:00:00,000");
    assert_eq!(format_srt_time(3661.25), "01:01:01,250");
    assert_eq!(format_srt_time(59.9999), "00:01:00,000");
}

#[test]
fn test_formatVttTime_shouldUseDotSeparator() {
    assert_eq!(format_vtt_time(75.5), "00:01:15.500");
}

#[test]
fn test_formatTime_withNegativeInput_shouldClampToZero() {
    assert_eq!(format_srt_time(-3.0), "00:00:00,000");
}

#[test]
fn test_formatToSrt_shouldNumberBlocksFromOne() {
    let srt = format_to_srt(&[segment(0.0, 1.5, "one"), segment(2.0, 1.0, "two")]);
    assert_eq!(
        srt,
        "1\n00:00:00,000 --> 00:00:01,500\none\n\n2\n00:00:02,000 --> 00:00:03,000\ntwo\n"
    );
}

#[test]
fn test_formatToSrt_withNoSegments_shouldBeEmpty() {
    assert_eq!(format_to_srt(&[]), "");
}

#[test]
fn test_formatToVtt_shouldStartWithHeader() {
    let vtt = format_to_vtt(&[segment(1.0, 1.0, "hi")]);
    assert_eq!(vtt, "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nhi\n");
    assert_eq!(format_to_vtt(&[]), "WEBVTT\n\n");
}

#[test]
fn test_formatDuration_shouldOmitZeroHours() {
    assert_eq!(format_duration(213.0), "3:33");
    assert_eq!(format_duration(3725.9), "1:02:05");
    assert_eq!(format_duration(0.0), "0:00");
}

#[test]
fn test_formatNumber_shouldAbbreviate() {
    assert_eq!(format_number(999), "999");
    assert_eq!(format_number(1_500), "1.5K");
    assert_eq!(format_number(2_340_000), "2.3M");
    assert_eq!(format_number(1_000_000_000), "1.0B");
}

#[test]
fn test_formatDate_withRfc3339_shouldFormatLongDate() {
    assert_eq!(format_date("2024-01-05T10:00:00Z"), "January 5, 2024");
    assert_eq!(format_date("yesterday"), "yesterday");
}

#[test]
fn test_truncateText_shouldCountCharacters() {
    assert_eq!(truncate_text("short", 10), "short");
    assert_eq!(truncate_text("abcdefghij", 6), "abc...");
    assert_eq!(truncate_text("日本語のテキスト", 5), "日本...");
}

#[test]
fn test_decodeHtmlEntities_shouldDecodeKnownEntities() {
    assert_eq!(decode_html_entities("Tom &amp; Jerry&#39;s &lt;show&gt;"), "Tom & Jerry's <show>");
    assert_eq!(decode_html_entities("&unknown;"), "&unknown;");
}

#[test]
fn test_cleanCaptionText_shouldDropAnnotations() {
    assert_eq!(clean_caption_text("[Music]  Hello (laughs)   there"), "Hello there");
}

#[test]
fn test_sanitizeFilename_shouldReplaceInvalidCharacters() {
    assert_eq!(sanitize_filename("My: Video / Part 1?"), "My_Video_Part_1");
    assert_eq!(sanitize_filename(&"x".repeat(150)).len(), 100);
}

#[test]
fn test_formatBytes_shouldPickUnit() {
    assert_eq!(format_bytes(0), "0 Bytes");
    assert_eq!(format_bytes(512), "512 Bytes");
    assert_eq!(format_bytes(1536), "1.5 KB");
    assert_eq!(format_bytes(2 * 1024 * 1024), "2 MB");
}
