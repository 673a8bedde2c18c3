use std::cmp::Reverse;

use crate::{TrackKind, TranscriptTrack};

/// Whether a track's language code is English-prefixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LanguageMatch {
    Other,
    English,
}

/// Preference of a track. Ordered by language first, then origin, so
/// English manual > English auto > other manual > other auto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrackRank {
    pub language: LanguageMatch,
    pub kind: TrackKind,
}

impl TrackRank {
    /// Scalar form of the rank, 0 through 3
    pub fn score(&self) -> u8 {
        let language = match self.language {
            LanguageMatch::English => 2,
            LanguageMatch::Other => 0,
        };
        let origin = match self.kind {
            TrackKind::Manual => 1,
            TrackKind::AutoGenerated => 0,
        };
        language + origin
    }
}

pub fn rank(track: &TranscriptTrack) -> TrackRank {
    TrackRank {
        language: if track.is_english() {
            LanguageMatch::English
        } else {
            LanguageMatch::Other
        },
        kind: track.kind,
    }
}

/// Tracks ordered best first; equal ranks keep listing order
pub fn rank_tracks(tracks: &[TranscriptTrack]) -> Vec<&TranscriptTrack> {
    let mut ranked: Vec<&TranscriptTrack> = tracks.iter().collect();
    ranked.sort_by_key(|t| Reverse(rank(t)));
    ranked
}

/// Best track, or `None` when nothing is listed. The first of several
/// equally ranked tracks wins.
pub fn select_track(tracks: &[TranscriptTrack]) -> Option<&TranscriptTrack> {
    rank_tracks(tracks).into_iter().next()
}
