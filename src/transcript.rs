use log::{debug, error, info, warn};

use crate::error::{TranscriptError, clean_fetch_error};
use crate::metadata::{MetadataSource, VideoInfo};
use crate::output::normalize;
use crate::select::{rank, select_track};
use crate::youtube::TranscriptService;
use crate::{Metadata, TranscriptResult, TranscriptType, extract_video_id};

/// Fetch and normalize the transcript for a URL or video ID.
///
/// Listing failures fall back to the service's default fetch and leave the
/// provenance as `unknown`. Metadata failures (or `metadata == None`) leave
/// the title empty and the chapters and metadata bare. Only an
/// unrecognizable input or a failed transcript fetch produces an error.
pub async fn get_transcript(
    input: &str,
    service: &dyn TranscriptService,
    metadata: Option<&dyn MetadataSource>,
) -> Result<TranscriptResult, TranscriptError> {
    let video_id = extract_video_id(input).ok_or(TranscriptError::InvalidInput)?;
    info!("Fetching transcript for {video_id}");

    let tracks = match service.list(&video_id).await {
        Ok(tracks) => tracks,
        Err(e) => {
            warn!("Could not list transcripts for {video_id}: {e:#}");
            Vec::new()
        }
    };

    let (fetched, transcript_type) = match select_track(&tracks) {
        Some(track) => {
            debug!(
                "Selected track lang={} kind={:?} score={}",
                track.language_code,
                track.kind,
                rank(track).score()
            );
            (service.fetch(track).await, TranscriptType::from(track.kind))
        }
        None => {
            debug!("No track selected for {video_id}, using default fetch");
            (service.fetch_default(&video_id).await, TranscriptType::Unknown)
        }
    };

    let snippets = fetched.map_err(|e| {
        let raw = format!("{e:#}");
        error!("Transcript fetch failed for {video_id}: {raw}");
        TranscriptError::Fetch(clean_fetch_error(&raw))
    })?;

    let normalized = normalize(&snippets);
    debug!("Normalized {} entries ({transcript_type})", normalized.entries.len());

    let info = match metadata {
        Some(source) => match source.lookup(&video_id).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Could not fetch metadata for {video_id}: {e:#}");
                None
            }
        },
        None => None,
    };

    let (title, chapters, metadata) = match info {
        Some(VideoInfo { title, chapters, details }) => (
            title,
            chapters,
            Metadata {
                details: Some(details),
                transcript_type,
            },
        ),
        None => (String::new(), Vec::new(), Metadata::bare(transcript_type)),
    };

    Ok(TranscriptResult {
        video_id,
        title,
        entries: normalized.entries,
        plain_text: normalized.plain_text,
        chapters,
        metadata,
    })
}
