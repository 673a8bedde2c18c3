use eyre::Result;

use crate::{RawSnippet, TranscriptEntry, TranscriptResult};

/// Normalized transcript lines plus their plain-text rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub entries: Vec<TranscriptEntry>,
    pub plain_text: String,
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` from one hour up.
/// Fractional seconds are truncated.
pub fn format_timestamp(seconds: f64) -> String {
    // saturating cast: negative and NaN become 0
    let total = seconds as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Decode entities, stamp each snippet and build the `[timestamp] text` rendering
pub fn normalize(snippets: &[RawSnippet]) -> Normalized {
    let entries: Vec<TranscriptEntry> = snippets
        .iter()
        .map(|s| TranscriptEntry {
            time: s.start,
            timestamp: format_timestamp(s.start),
            text: html_escape::decode_html_entities(&s.text).into_owned(),
        })
        .collect();

    let plain_text = entries.iter().map(TranscriptEntry::plain_line).collect::<Vec<_>>().join("\n");

    Normalized { entries, plain_text }
}

/// Render transcript as plain text (one timestamped line per entry)
pub fn render_text(result: &TranscriptResult) -> String {
    result.plain_text.clone()
}

pub fn render_json(result: &TranscriptResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// `{"error": message}`
pub fn render_error_json(message: &str) -> Result<String> {
    Ok(serde_json::to_string_pretty(&serde_json::json!({ "error": message }))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Metadata, TranscriptType};

    fn snippet(start: f64, text: &str) -> RawSnippet {
        RawSnippet {
            start,
            duration: 1.0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(5.0), "00:05");
        assert_eq!(format_timestamp(65.0), "01:05");
        assert_eq!(format_timestamp(3599.99), "59:59");
        assert_eq!(format_timestamp(3600.0), "01:00:00");
        assert_eq!(format_timestamp(3661.0), "01:01:01");
    }

    #[test]
    fn test_format_timestamp_truncates() {
        assert_eq!(format_timestamp(59.9), "00:59");
    }

    #[test]
    fn test_format_timestamp_long_video() {
        assert_eq!(format_timestamp(36_000.0 + 125.0), "10:02:05");
    }

    #[test]
    fn test_normalize_single() {
        let n = normalize(&[snippet(0.0, "Hi")]);
        assert_eq!(n.plain_text, "[00:00] Hi");
        assert_eq!(n.entries.len(), 1);
        assert_eq!(n.entries[0].timestamp, "00:00");
    }

    #[test]
    fn test_normalize_preserves_order() {
        let n = normalize(&[snippet(1.5, "first"), snippet(62.2, "second")]);
        assert_eq!(n.plain_text, "[00:01] first\n[01:02] second");
        assert_eq!(n.entries.len(), n.plain_text.lines().count());
        assert!((n.entries[1].time - 62.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_decodes_entities() {
        let n = normalize(&[snippet(0.0, "it&#39;s &quot;fine&quot; &amp; done")]);
        assert_eq!(n.entries[0].text, "it's \"fine\" & done");
    }

    #[test]
    fn test_normalize_requires_entity_semicolon() {
        let n = normalize(&[snippet(0.0, "a &amp b &amp; c")]);
        assert_eq!(n.entries[0].text, "a &amp b & c");
    }

    #[test]
    fn test_normalize_empty() {
        let n = normalize(&[]);
        assert!(n.entries.is_empty());
        assert_eq!(n.plain_text, "");
    }

    #[test]
    fn test_render_error_json() {
        let rendered = render_error_json("No transcript available for this video.").unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, serde_json::json!({"error": "No transcript available for this video."}));
    }

    #[test]
    fn test_render_text_and_json() {
        let n = normalize(&[snippet(0.0, "Hello world"), snippet(1.5, "This is a test")]);
        let result = TranscriptResult {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: String::new(),
            entries: n.entries,
            plain_text: n.plain_text,
            chapters: vec![],
            metadata: Metadata::bare(TranscriptType::Manual),
        };
        assert_eq!(render_text(&result), "[00:00] Hello world\n[00:01] This is a test");

        let value: serde_json::Value = serde_json::from_str(&render_json(&result).unwrap()).unwrap();
        assert_eq!(value["video_id"], "dQw4w9WgXcQ");
        assert_eq!(value["entries"][1]["timestamp"], "00:01");
        assert_eq!(value["entries"][1]["text"], "This is a test");
        assert_eq!(value["metadata"], serde_json::json!({"transcript_type": "manual"}));
        assert_eq!(value["chapters"], serde_json::json!([]));
    }
}
