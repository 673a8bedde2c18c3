use std::sync::LazyLock;

use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::{RawSnippet, TrackKind, TranscriptTrack};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player?prettyPrint=false";

static FORMATTING_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Language used when fetching without a selected track
pub const DEFAULT_LANGUAGE: &str = "en";

/// Source of caption tracks for a video
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// All tracks available for the video, in listing order
    async fn list(&self, video_id: &str) -> Result<Vec<TranscriptTrack>>;

    /// Snippets of one listed track
    async fn fetch(&self, track: &TranscriptTrack) -> Result<Vec<RawSnippet>>;

    /// Snippets of the default track, without any scoring
    async fn fetch_default(&self, video_id: &str) -> Result<Vec<RawSnippet>>;
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    kind: Option<String>,
    name: Option<TrackName>,
}

#[derive(Debug, Deserialize)]
struct TrackName {
    #[serde(rename = "simpleText")]
    simple_text: Option<String>,
    runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TrackName {
    fn text(&self) -> String {
        if let Some(ref s) = self.simple_text {
            return s.clone();
        }
        self.runs
            .as_ref()
            .map(|runs| runs.iter().map(|r| r.text.as_str()).collect())
            .unwrap_or_default()
    }
}

impl From<CaptionTrack> for TranscriptTrack {
    fn from(track: CaptionTrack) -> Self {
        let kind = match track.kind.as_deref() {
            Some("asr") => TrackKind::AutoGenerated,
            _ => TrackKind::Manual,
        };
        TranscriptTrack {
            name: track.name.as_ref().map(TrackName::text).unwrap_or_default(),
            language_code: track.language_code,
            kind,
            base_url: track.base_url.replace("&fmt=srv3", ""),
        }
    }
}

/// Transcript service backed by YouTube's InnerTube player endpoint
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: reqwest::Client,
}

impl YouTubeClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptService for YouTubeClient {
    async fn list(&self, video_id: &str) -> Result<Vec<TranscriptTrack>> {
        debug!("Requesting player response for {video_id}");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": "20.10.38"
                }
            },
            "videoId": video_id
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(PLAYER_URL)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tracks = tracks_from_player_response(video_id, resp)?;
        debug!("Found {} caption tracks for {video_id}", tracks.len());
        Ok(tracks)
    }

    async fn fetch(&self, track: &TranscriptTrack) -> Result<Vec<RawSnippet>> {
        debug!("Fetching caption track: lang={} kind={:?}", track.language_code, track.kind);

        let caption_xml = self
            .client
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_caption_xml(&caption_xml)
    }

    async fn fetch_default(&self, video_id: &str) -> Result<Vec<RawSnippet>> {
        let tracks = self.list(video_id).await?;
        let track = default_track(&tracks, DEFAULT_LANGUAGE)?;
        self.fetch(track).await
    }
}

fn tracks_from_player_response(video_id: &str, resp: InnerTubePlayerResponse) -> Result<Vec<TranscriptTrack>> {
    if let Some(status) = resp.playability_status {
        let state = status.status.unwrap_or_default();
        if !state.is_empty() && state != "OK" {
            let reason = status.reason.unwrap_or_else(|| state.clone());
            bail!(
                "Could not retrieve a transcript for video {video_id}: the video is unplayable for the following reason: {reason}\n"
            );
        }
    }

    let tracks: Vec<TranscriptTrack> = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .map(TranscriptTrack::from)
        .collect();

    if tracks.is_empty() {
        bail!("no transcripts are available for video {video_id}");
    }

    Ok(tracks)
}

/// Manual track in exactly `lang`, else the generated one
fn default_track<'a>(tracks: &'a [TranscriptTrack], lang: &str) -> Result<&'a TranscriptTrack> {
    [TrackKind::Manual, TrackKind::AutoGenerated]
        .iter()
        .find_map(|kind| tracks.iter().find(|t| t.kind == *kind && t.language_code == lang))
        .ok_or_else(|| eyre::eyre!("no transcripts were found for any of the requested language codes: [{lang}]"))
}

fn parse_caption_xml(xml: &str) -> Result<Vec<RawSnippet>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut snippets = Vec::new();
    let mut current: Option<(f64, f64)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = 0.0;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().unwrap_or(0.0);
                        }
                        _ => {}
                    }
                }
                current = start.map(|s| (s, dur));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                current = None;
            }
            Ok(Event::Text(ref e)) => {
                if let Some((start, duration)) = current.take() {
                    // XML escaping and markup only; HTML entities are resolved by output::normalize
                    let unescaped = e.unescape().unwrap_or_default();
                    let text = FORMATTING_TAG.replace_all(&unescaped, "").into_owned();
                    if !text.is_empty() {
                        snippets.push(RawSnippet { start, duration, text });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(snippets)
}
