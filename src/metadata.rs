use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use crate::output::format_timestamp;
use crate::{Chapter, HeatmapPoint, VideoDetails};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Everything the metadata lookup contributes to a result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInfo {
    pub title: String,
    pub chapters: Vec<Chapter>,
    pub details: VideoDetails,
}

/// Secondary lookup for title, chapters and statistics
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn lookup(&self, video_id: &str) -> Result<VideoInfo>;
}

/// Metadata lookup via `yt-dlp --dump-json`
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
    timeout: Duration,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp", DEFAULT_TIMEOUT)
    }
}

impl YtDlp {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MetadataSource for YtDlp {
    async fn lookup(&self, video_id: &str) -> Result<VideoInfo> {
        let url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Looking up metadata via {}: {url}", self.binary);

        let mut cmd = Command::new(&self.binary);
        cmd.args(["--dump-json", "--no-warnings", "--no-download", url.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                bail!(
                    "{} not found. Install it to enable metadata enrichment:\n  \
                     pip install yt-dlp\n  \
                     or: brew install yt-dlp",
                    self.binary
                );
            }
            Ok(Err(e)) => bail!("failed to run {}: {e}", self.binary),
            Err(_) => bail!("{} timed out after {}s", self.binary, self.timeout.as_secs()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} exited with status {}: {}", self.binary, output.status, stderr.trim());
        }

        parse_info(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YtDlpInfo {
    title: Option<String>,
    channel: Option<String>,
    channel_follower_count: Option<u64>,
    upload_date: Option<String>,
    duration: Option<f64>,
    view_count: Option<u64>,
    like_count: Option<u64>,
    tags: Option<Vec<String>>,
    categories: Option<Vec<String>>,
    description: Option<String>,
    playlist_title: Option<String>,
    playlist_index: Option<u64>,
    n_entries: Option<u64>,
    heatmap: Option<Vec<YtDlpHeatmapPoint>>,
    chapters: Option<Vec<YtDlpChapter>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YtDlpChapter {
    title: Option<String>,
    start_time: Option<f64>,
    end_time: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YtDlpHeatmapPoint {
    start_time: Option<f64>,
    end_time: Option<f64>,
    value: Option<f64>,
}

impl From<YtDlpChapter> for Chapter {
    fn from(ch: YtDlpChapter) -> Self {
        let start_time = ch.start_time.unwrap_or(0.0);
        Chapter {
            title: ch.title.unwrap_or_default(),
            start_time,
            end_time: ch.end_time.unwrap_or(0.0),
            timestamp: format_timestamp(start_time),
        }
    }
}

/// Parse the JSON document printed by `yt-dlp --dump-json`
pub fn parse_info(json: &str) -> Result<VideoInfo> {
    let json = json.trim();
    if json.is_empty() {
        bail!("metadata lookup produced no output");
    }
    let info: YtDlpInfo = serde_json::from_str(json)?;

    let chapters = info
        .chapters
        .unwrap_or_default()
        .into_iter()
        .map(Chapter::from)
        .collect();

    let heatmap = info
        .heatmap
        .unwrap_or_default()
        .into_iter()
        .map(|p| HeatmapPoint {
            start_time: p.start_time.unwrap_or(0.0),
            end_time: p.end_time.unwrap_or(0.0),
            value: p.value.unwrap_or(0.0),
        })
        .collect();

    Ok(VideoInfo {
        title: info.title.unwrap_or_default(),
        chapters,
        details: VideoDetails {
            channel: info.channel.unwrap_or_default(),
            channel_subscribers: info.channel_follower_count.unwrap_or(0),
            upload_date: info.upload_date.unwrap_or_default(),
            duration: info.duration.unwrap_or(0.0),
            view_count: info.view_count.unwrap_or(0),
            like_count: info.like_count.unwrap_or(0),
            tags: info.tags.unwrap_or_default(),
            categories: info.categories.unwrap_or_default(),
            description: info.description.unwrap_or_default(),
            playlist_title: info.playlist_title.unwrap_or_default(),
            playlist_index: info.playlist_index,
            playlist_count: info.n_entries,
            heatmap,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_full() {
        let json = serde_json::json!({
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "channel": "Rick Astley",
            "channel_follower_count": 4_000_000,
            "upload_date": "20091025",
            "duration": 212,
            "view_count": 1_500_000_000u64,
            "like_count": 17_000_000,
            "tags": ["rick", "astley"],
            "categories": ["Music"],
            "description": "The official video",
            "playlist_title": "Hits",
            "playlist_index": 3,
            "n_entries": 10,
            "heatmap": [{"start_time": 0.0, "end_time": 2.12, "value": 1.0}],
            "chapters": [
                {"start_time": 0.0, "end_time": 60.0, "title": "Intro"},
                {"start_time": 3725.5, "end_time": 3800.0, "title": "Late"}
            ]
        })
        .to_string();

        let info = parse_info(&json).unwrap();
        assert_eq!(info.title, "Never Gonna Give You Up");
        assert_eq!(info.details.channel, "Rick Astley");
        assert_eq!(info.details.channel_subscribers, 4_000_000);
        assert_eq!(info.details.duration, 212.0);
        assert_eq!(info.details.tags, vec!["rick", "astley"]);
        assert_eq!(info.details.playlist_index, Some(3));
        assert_eq!(info.details.playlist_count, Some(10));
        assert_eq!(info.details.heatmap.len(), 1);

        assert_eq!(info.chapters.len(), 2);
        assert_eq!(info.chapters[0].title, "Intro");
        assert_eq!(info.chapters[0].timestamp, "00:00");
        assert_eq!(info.chapters[1].timestamp, "01:02:05");
        assert_eq!(info.chapters[1].end_time, 3800.0);
    }

    #[test]
    fn test_parse_info_nulls_and_missing() {
        let json = r#"{"title": null, "chapters": null, "tags": null, "like_count": null}"#;
        let info = parse_info(json).unwrap();
        assert_eq!(info.title, "");
        assert!(info.chapters.is_empty());
        assert!(info.details.tags.is_empty());
        assert_eq!(info.details.like_count, 0);
        assert_eq!(info.details.playlist_index, None);
        assert_eq!(info.details.playlist_count, None);
    }

    #[test]
    fn test_parse_chapter_missing_title() {
        let json = r#"{"chapters": [{"start_time": 61.9, "end_time": 120.0}]}"#;
        let info = parse_info(json).unwrap();
        assert_eq!(info.chapters[0].title, "");
        assert_eq!(info.chapters[0].timestamp, "01:01");
    }

    #[test]
    fn test_parse_info_empty_output() {
        assert!(parse_info("  \n").is_err());
    }

    #[test]
    fn test_parse_info_malformed() {
        assert!(parse_info("ERROR: [youtube] abc: Video unavailable").is_err());
    }

    #[tokio::test]
    async fn test_lookup_missing_binary_fails() {
        let ytdlp = YtDlp::new("vidtutor-no-such-binary", Duration::from_secs(5));
        let err = ytdlp.lookup("dQw4w9WgXcQ").await.unwrap_err().to_string();
        assert!(err.contains("not found"));
    }

    /// Write an executable stand-in for yt-dlp
    #[cfg(unix)]
    fn fake_ytdlp(name: &str, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = std::env::temp_dir().join(format!("vidtutor-{}-{name}.sh", std::process::id()));
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lookup_times_out() {
        let script = fake_ytdlp("slow", "sleep 10");
        let ytdlp = YtDlp::new(script.to_string_lossy(), Duration::from_secs(1));

        let started = std::time::Instant::now();
        let err = ytdlp.lookup("dQw4w9WgXcQ").await.unwrap_err().to_string();
        let elapsed = started.elapsed();
        let _ = std::fs::remove_file(&script);

        assert!(err.contains("timed out after 1s"), "{err}");
        assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lookup_nonzero_exit_fails_despite_output() {
        let script = fake_ytdlp("fail", r#"echo '{"title":"x"}'; exit 3"#);
        let ytdlp = YtDlp::new(script.to_string_lossy(), Duration::from_secs(10));

        let result = ytdlp.lookup("dQw4w9WgXcQ").await;
        let _ = std::fs::remove_file(&script);

        let err = result.unwrap_err().to_string();
        assert!(err.contains("exited with status"), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lookup_parses_script_output() {
        let script = fake_ytdlp("ok", r#"echo '{"title":"x","chapters":[{"title":"a","start_time":5,"end_time":9}]}'"#);
        let ytdlp = YtDlp::new(script.to_string_lossy(), Duration::from_secs(10));

        let result = ytdlp.lookup("dQw4w9WgXcQ").await;
        let _ = std::fs::remove_file(&script);

        let info = result.unwrap();
        assert_eq!(info.title, "x");
        assert_eq!(info.chapters[0].timestamp, "00:05");
    }
}
