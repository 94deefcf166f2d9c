/*!
 * Media acquisition and processing.
 *
 * This module wraps the external tools of the pipeline:
 *
 * - `video`: Local file intake and YouTube download
 * - `audio`: Audio extraction to a transcription-ready WAV
 * - `transcribe`: Speech-to-text into an SRT document
 * - `mux`: Burning subtitles back into the video
 */

use anyhow::{Result, anyhow};
use log::error;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

use crate::subtitle_processor::SubtitleCollection;

pub mod audio;
pub mod mux;
pub mod transcribe;
pub mod video;

pub use self::audio::extract_audio;
pub use self::mux::{TimeWindow, burn_subtitles};
pub use self::transcribe::transcribe_audio;
pub use self::video::acquire_video;

/// A video file staged in the working directory
#[derive(Debug, Clone)]
pub struct VideoSource {
    /// Location of the staged video file
    pub path: PathBuf,
    /// Source URL, empty for local files
    pub url: String,
    /// Display title, also the output file stem
    pub title: String,
}

/// An extracted audio track
#[derive(Debug, Clone)]
pub struct AudioTrack {
    /// Location of the WAV file
    pub path: PathBuf,
    /// Title inherited from the video
    pub title: String,
}

/// An SRT document together with its on-disk location
#[derive(Debug, Clone)]
pub struct SubtitleFile {
    /// Location of the SRT file
    pub path: PathBuf,
    /// Parsed entries
    pub collection: SubtitleCollection,
    /// Title inherited from the video
    pub title: String,
}

/// Run ffmpeg with a timeout, failing with filtered stderr on error
pub(crate) async fn run_ffmpeg(args: &[&str], timeout: Duration) -> Result<()> {
    let ffmpeg_future = Command::new("ffmpeg").args(args).output();

    let result = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| anyhow!("Failed to execute ffmpeg command: {}", e))?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(anyhow!("ffmpeg timed out after {:?}", timeout));
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("ffmpeg failed: {}", filtered);
        return Err(anyhow!("ffmpeg failed: {}", filtered));
    }

    Ok(())
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub(crate) fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Chapter",
        "    Chapter",
        "  Stream #",
        "      Metadata:",
        "        title",
        "        BPS",
        "        DURATION",
        "        NUMBER_OF",
        "        _STATISTICS",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            if line.trim().is_empty() {
                return false;
            }
            !dominated_prefixes.iter().any(|p| line.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filterFfmpegStderr_shouldDropBannerNoise() {
        let stderr = "\
ffmpeg version 6.0\n  built with gcc\n  configuration: --enable-gpl\nInput #0, matroska\n  Duration: 00:01:00\nNo such file or directory\n";
        let filtered = filter_ffmpeg_stderr(stderr);
        assert_eq!(filtered, "No such file or directory");
    }

    #[test]
    fn test_filterFfmpegStderr_withOnlyNoise_shouldReportUnknown() {
        let filtered = filter_ffmpeg_stderr("ffmpeg version 6.0\n");
        assert!(filtered.contains("unknown ffmpeg error"));
    }
}
