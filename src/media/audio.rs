/*!
 * Audio extraction. Speech recognition wants 16 kHz mono PCM, so the video's
 * audio track is decoded straight to that format in one ffmpeg pass.
 */

use anyhow::Result;
use log::info;
use std::time::Duration;

use super::{AudioTrack, VideoSource, run_ffmpeg};

/// Timeout for the extraction pass
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(600);

/// Extract the audio track of a video into a 16 kHz mono WAV file next to it
pub async fn extract_audio(video: &VideoSource) -> Result<AudioTrack> {
    let wav_path = video.path.with_extension("wav");

    info!("Extracting audio to {}", wav_path.display());
    run_ffmpeg(
        &[
            "-y",
            "-i",
            video.path.to_str().unwrap_or_default(),
            "-vn",
            "-ac",
            "1",
            "-ar",
            "16000",
            wav_path.to_str().unwrap_or_default(),
        ],
        EXTRACT_TIMEOUT,
    )
    .await?;

    Ok(AudioTrack {
        path: wav_path,
        title: video.title.clone(),
    })
}
