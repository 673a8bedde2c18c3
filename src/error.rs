use std::sync::LazyLock;

use regex::Regex;

pub const NO_TRANSCRIPT_MESSAGE: &str = "No transcript available for this video.";

/// Failures surfaced by `get_transcript`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptError {
    #[error("Could not extract video ID from URL")]
    InvalidInput,

    #[error("{0}")]
    Fetch(String),
}

impl TranscriptError {
    pub fn exit_code(&self) -> i32 {
        match self {
            TranscriptError::InvalidInput => 2,
            TranscriptError::Fetch(_) => 1,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, TranscriptError::InvalidInput)
    }
}

static UNPLAYABLE_REASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)for the following reason:\s*(.+?)(?:\n|If you are sure)").expect("valid regex")
});

/// Best-effort rewrite of a fetch error into something readable.
///
/// This matches on free text produced by the transcript service, so it is
/// not a reliable classification; unrecognized text is returned unchanged.
pub fn clean_fetch_error(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("unplayable") {
        return match UNPLAYABLE_REASON.captures(raw) {
            Some(caps) => format!("Video is not accessible: {}", caps[1].trim()),
            None => raw.to_string(),
        };
    }
    if lower.contains("no transcripts") || lower.contains("could not retrieve") {
        return NO_TRANSCRIPT_MESSAGE.to_string();
    }
    raw.to_string()
}
