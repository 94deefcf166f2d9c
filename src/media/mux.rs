/*!
 * Subtitle burn-in. The subtitles video filter resolves its file argument
 * relative to ffmpeg's working directory and chokes on exotic characters in
 * paths, so the SRT is first copied to a throwaway name next to the video
 * and the command runs from that directory.
 */

use anyhow::{Result, anyhow};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use uuid::Uuid;

use crate::file_utils::FileManager;

use super::filter_ffmpeg_stderr;

/// Timeout for the re-encode pass
const MUX_TIMEOUT: Duration = Duration::from_secs(3_600);

/// Subtitle rendering style passed to the filter
const SUBTITLE_STYLE: &str =
    "BorderStyle=3,PrimaryColour=&H00FFFFFF,BackColour=&HFF000000,FontSize=26";

/// Time range to cut from the video, both ends optional
#[derive(Debug, Clone, Default)]
pub struct TimeWindow {
    /// Start timestamp (HH:MM:SS), from the beginning when absent
    pub start: Option<String>,
    /// End timestamp (HH:MM:SS), to the end when absent
    pub end: Option<String>,
}

impl TimeWindow {
    /// Resolve the window into concrete `-ss`/`-to` arguments.
    ///
    /// A half-open window is completed with the matching extreme; a fully
    /// open window adds no cut arguments at all.
    fn to_args(&self) -> Vec<String> {
        match (&self.start, &self.end) {
            (None, None) => Vec::new(),
            (start, end) => {
                let start = start.clone().unwrap_or_else(|| "00:00:00".to_string());
                let end = end.clone().unwrap_or_else(|| "99:00:00".to_string());
                vec!["-ss".to_string(), start, "-to".to_string(), end]
            }
        }
    }
}

/// Burn an SRT file into a video, producing `<stem>_with_subtitles.<ext>`.
///
/// Returns the output path.
pub async fn burn_subtitles(
    video_path: &Path,
    subtitle_path: &Path,
    window: &TimeWindow,
    output_path: Option<PathBuf>,
) -> Result<PathBuf> {
    let video_dir = video_path
        .parent()
        .ok_or_else(|| anyhow!("Video path has no parent directory"))?;
    let stem = video_path
        .file_stem()
        .ok_or_else(|| anyhow!("Video path has no file name"))?
        .to_string_lossy();
    let extension = video_path
        .extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .unwrap_or_else(|| "mp4".to_string());

    let output_path = output_path
        .unwrap_or_else(|| video_dir.join(format!("{stem}_with_subtitles.{extension}")));

    // Throwaway copy with a name the filter can digest
    let temp_name = format!("{}.srt", Uuid::new_v4());
    let temp_srt = video_dir.join(&temp_name);
    FileManager::copy_file(subtitle_path, &temp_srt)?;

    info!(
        "Burning {} into {} -> {}",
        subtitle_path.display(),
        video_path.display(),
        output_path.display()
    );

    let mut args: Vec<String> = vec!["-y".to_string()];
    args.extend(window.to_args());
    args.extend([
        "-i".to_string(),
        video_path.to_string_lossy().to_string(),
        "-vf".to_string(),
        format!("subtitles={temp_name}:force_style='{SUBTITLE_STYLE}'"),
        output_path.to_string_lossy().to_string(),
    ]);

    let ffmpeg_future = Command::new("ffmpeg")
        .args(&args)
        .current_dir(video_dir)
        .output();

    let result = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| anyhow!("Failed to execute ffmpeg command: {}", e))
        },
        _ = tokio::time::sleep(MUX_TIMEOUT) => {
            Err(anyhow!("ffmpeg timed out after {:?}", MUX_TIMEOUT))
        }
    };

    // The temp copy goes away no matter how the command ended
    let _ = std::fs::remove_file(&temp_srt);

    let output = result?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("ffmpeg burn-in failed: {}", filter_ffmpeg_stderr(&stderr)));
    }

    Ok(output_path)
}
