pub mod config;
pub mod error;
pub mod metadata;
pub mod output;
pub mod select;
pub mod transcript;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use error::TranscriptError;
pub use transcript::get_transcript;

/// How a caption track was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrackKind {
    AutoGenerated,
    Manual,
}

/// A transcript option exposed by the listing service
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub name: String,
    pub kind: TrackKind,
    pub base_url: String,
}

impl TranscriptTrack {
    pub fn is_english(&self) -> bool {
        self.language_code.starts_with("en")
    }
}

/// A fetched caption line before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnippet {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

/// One normalized transcript line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub time: f64,
    pub timestamp: String,
    pub text: String,
}

impl TranscriptEntry {
    /// `[timestamp] text`
    pub fn plain_line(&self) -> String {
        format!("[{}] {}", self.timestamp, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    pub title: String,
    pub start_time: f64,
    pub end_time: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapPoint {
    pub start_time: f64,
    pub end_time: f64,
    pub value: f64,
}

/// Provenance of the transcript that was returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TranscriptType {
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "auto-generated")]
    AutoGenerated,
    #[serde(rename = "unknown")]
    Unknown,
}

impl From<TrackKind> for TranscriptType {
    fn from(kind: TrackKind) -> Self {
        match kind {
            TrackKind::Manual => TranscriptType::Manual,
            TrackKind::AutoGenerated => TranscriptType::AutoGenerated,
        }
    }
}

impl std::fmt::Display for TranscriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptType::Manual => write!(f, "manual"),
            TranscriptType::AutoGenerated => write!(f, "auto-generated"),
            TranscriptType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Video details supplied by the metadata lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoDetails {
    pub channel: String,
    pub channel_subscribers: u64,
    pub upload_date: String,
    pub duration: f64,
    pub view_count: u64,
    pub like_count: u64,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub description: String,
    pub playlist_title: String,
    pub playlist_index: Option<u64>,
    pub playlist_count: Option<u64>,
    pub heatmap: Vec<HeatmapPoint>,
}

/// Metadata record; only `transcript_type` is present when enrichment failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(flatten)]
    pub details: Option<VideoDetails>,
    pub transcript_type: TranscriptType,
}

impl Metadata {
    pub fn bare(transcript_type: TranscriptType) -> Self {
        Self {
            details: None,
            transcript_type,
        }
    }
}

/// Complete result for one video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptResult {
    pub video_id: String,
    pub title: String,
    pub entries: Vec<TranscriptEntry>,
    pub plain_text: String,
    pub chapters: Vec<Chapter>,
    pub metadata: Metadata,
}

static ID_AFTER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:v=|/v/|youtu\.be/)([a-zA-Z0-9_-]{11})").expect("valid regex"));

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([a-zA-Z0-9_-]{11})\n?\z").expect("valid regex"));

/// Extract the 11-character video ID from a URL or bare ID.
///
/// Patterns are tried in order and the first match wins: an ID following
/// `v=`, `/v/` or `youtu.be/` anywhere in the input, then the whole input
/// being an ID on its own.
pub fn extract_video_id(input: &str) -> Option<String> {
    [&*ID_AFTER_PREFIX, &*BARE_ID]
        .iter()
        .find_map(|re| re.captures(input))
        .map(|caps| caps[1].to_string())
}
