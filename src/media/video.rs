/*!
 * Video intake: local files are copied into the working directory, URLs are
 * downloaded with yt-dlp. Either way the result is a staged file with a
 * filesystem-safe title that later stages derive their output names from.
 */

use anyhow::{Context, Result, anyhow};
use log::info;
use std::path::Path;
use tokio::process::Command;
use url::Url;

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;

use super::VideoSource;

/// Whether the input names a remote video rather than a local file
pub fn is_url(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Stage a video for processing.
///
/// URLs are downloaded into `output_dir`; local files are copied there so
/// later stages can write siblings next to the video without touching the
/// original location.
pub async fn acquire_video(input: &str, output_dir: &Path) -> Result<VideoSource> {
    FileManager::ensure_dir(output_dir)?;

    if is_url(input) {
        download_video(input, output_dir).await
    } else {
        stage_local_video(input, output_dir)
    }
}

/// Copy a local video into the working directory under a unique name
fn stage_local_video(input: &str, output_dir: &Path) -> Result<VideoSource> {
    let source = Path::new(input);
    if !source.exists() {
        return Err(SubtitleError::FileNotFound(input.to_string()).into());
    }

    let title = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Input path has no file name: {}", input))?;

    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("{title}.mp4"));
    let staged = FileManager::unique_path(output_dir.join(file_name));
    FileManager::copy_file(source, &staged)?;

    info!("Staged local video {} as {}", input, staged.display());
    Ok(VideoSource {
        path: staged,
        url: String::new(),
        title,
    })
}

/// Download a remote video as MP4 using yt-dlp
async fn download_video(url: &str, output_dir: &Path) -> Result<VideoSource> {
    let title = FileManager::safe_file_name(&fetch_video_title(url).await?);
    let target = FileManager::unique_path(output_dir.join(format!("{title}.mp4")));

    info!("Downloading {} to {}", url, target.display());
    let output = Command::new("yt-dlp")
        .args([
            "--no-playlist",
            "-f",
            "bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]/b",
            "--merge-output-format",
            "mp4",
            "-o",
        ])
        .arg(&target)
        .arg(url)
        .output()
        .await
        .context("Failed to execute yt-dlp, is it installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("yt-dlp download failed: {}", stderr.trim()));
    }

    Ok(VideoSource {
        path: target,
        url: url.to_string(),
        title,
    })
}

/// Query the video title without downloading anything
async fn fetch_video_title(url: &str) -> Result<String> {
    let output = Command::new("yt-dlp")
        .args(["--no-playlist", "--print", "title", "--skip-download"])
        .arg(url)
        .output()
        .await
        .context("Failed to execute yt-dlp, is it installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("yt-dlp could not resolve the video: {}", stderr.trim()));
    }

    let title = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if title.is_empty() {
        return Err(anyhow!("yt-dlp returned an empty title for {}", url));
    }
    Ok(title)
}
