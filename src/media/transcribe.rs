/*!
 * Speech-to-text through the whisper CLI. The raw transcript comes back as
 * many short segments; these are merged into naturally paced captions before
 * anything downstream sees them.
 */

use anyhow::{Context, Result, anyhow};
use log::info;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::{MergeConfig, TranscriptionConfig};
use crate::subtitle_processor::SubtitleCollection;

use super::{AudioTrack, SubtitleFile};

/// Timeout for a whisper run
const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(3_600);

/// Transcribe an audio track into a merged SRT document.
///
/// Whisper writes `<stem>.srt` next to the audio file; that file is parsed,
/// close segments are merged, and the merged document is written back over it.
pub async fn transcribe_audio(
    audio: &AudioTrack,
    language: &str,
    transcription: &TranscriptionConfig,
    merge: &MergeConfig,
) -> Result<SubtitleFile> {
    let output_dir = audio
        .path
        .parent()
        .ok_or_else(|| anyhow!("Audio path has no parent directory"))?;
    let srt_path = audio.path.with_extension("srt");

    info!(
        "Transcribing {} with {} (model {})",
        audio.path.display(),
        transcription.whisper_command,
        transcription.whisper_model
    );

    let whisper_future = Command::new(&transcription.whisper_command)
        .arg(&audio.path)
        .args(["--model", &transcription.whisper_model])
        .args(["--language", language])
        .args(["--output_format", "srt"])
        .arg("--output_dir")
        .arg(output_dir)
        .output();

    let output = tokio::select! {
        result = whisper_future => {
            result.with_context(|| {
                format!("Failed to execute {}, is it installed?", transcription.whisper_command)
            })?
        },
        _ = tokio::time::sleep(TRANSCRIBE_TIMEOUT) => {
            return Err(anyhow!("Transcription timed out after {:?}", TRANSCRIBE_TIMEOUT));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("Transcription failed: {}", stderr.trim()));
    }

    let raw = SubtitleCollection::from_srt_file(&srt_path)?;
    let merged = raw.merge_close_entries(merge.threshold_ms, merge.max_length);
    info!(
        "Transcription produced {} segments, {} after merging",
        raw.len(),
        merged.len()
    );
    merged.write_to_srt(&srt_path, false)?;

    Ok(SubtitleFile {
        path: srt_path,
        collection: merged,
        title: audio.title.clone(),
    })
}
