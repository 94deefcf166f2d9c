use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::media::{self, SubtitleFile, TimeWindow};
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::{BatchTranslator, JsonFileStore, PromptCache, TranslationService, parse_key_pool};

// @module: Application controller for the transcription/translation pipeline

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

/// Paths produced by one translation step
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    /// Target-language subtitle file
    pub translated_path: PathBuf,
    /// Bilingual subtitle file, when enabled
    pub bilingual_path: Option<PathBuf>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    /// Run the full pipeline: stage the video, extract audio, transcribe,
    /// translate, and optionally burn the translation back into the video.
    pub async fn run(
        &self,
        input: &str,
        output_dir: &Path,
        window: &TimeWindow,
        burn: bool,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();

        let video = media::acquire_video(input, output_dir).await?;
        let audio = media::extract_audio(&video).await?;
        let transcript = media::transcribe_audio(
            &audio,
            &self.config.source_language,
            &self.config.transcription,
            &self.config.merge,
        )
        .await?;

        let output = self.translate_subtitle_file(&transcript).await?;

        if burn {
            let muxed = media::burn_subtitles(
                &video.path,
                &output.translated_path,
                window,
                None,
            )
            .await?;
            info!("Wrote subtitled video to {}", muxed.display());
        }

        info!(
            "Pipeline finished in {}",
            Self::format_duration(start_time.elapsed())
        );
        Ok(())
    }

    /// Translate an existing SRT file, writing the output next to it
    pub async fn translate_srt(&self, srt_path: &Path) -> Result<TranslationOutput> {
        let collection = SubtitleCollection::from_srt_file(srt_path)?;
        let title = srt_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "subtitles".to_string());

        let subtitle_file = SubtitleFile {
            path: srt_path.to_path_buf(),
            collection,
            title,
        };
        self.translate_subtitle_file(&subtitle_file).await
    }

    /// Translate a parsed subtitle document and write the output files.
    ///
    /// The translated file lands next to the source as `<stem>-<target>.srt`;
    /// with the bilingual flag a `<stem>-<source>-<target>.srt` rendering is
    /// written as well, from the same translation pass.
    async fn translate_subtitle_file(&self, subtitle_file: &SubtitleFile) -> Result<TranslationOutput> {
        let source = &self.config.source_language;
        let target = &self.config.target_language;
        let directory = subtitle_file
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let translated_path = directory.join(format!("{}-{}.srt", subtitle_file.title, target));
        let bilingual_path = self
            .config
            .translation
            .bilingual
            .then(|| directory.join(format!("{}-{}-{}.srt", subtitle_file.title, source, target)));

        if subtitle_file.collection.is_empty() {
            warn!("No subtitle entries to translate, writing empty output");
            subtitle_file.collection.write_to_srt(&translated_path, false)?;
            return Ok(TranslationOutput {
                translated_path,
                bilingual_path: None,
            });
        }

        let service = self.build_translation_service()?;
        info!(
            "Translating {} -> {} via {} ({})",
            source,
            target,
            service.backend_name(),
            self.config.translation.model
        );

        let translated = self
            .translate_with_progress(&service, &subtitle_file.collection, source, target)
            .await?;

        translated.write_to_srt(&translated_path, false)?;
        info!("Wrote translation to {}", translated_path.display());

        if let Some(bilingual_path) = &bilingual_path {
            translated.write_to_srt(bilingual_path, true)?;
            info!("Wrote bilingual rendering to {}", bilingual_path.display());
        }

        Ok(TranslationOutput {
            translated_path,
            bilingual_path,
        })
    }

    /// Run the batch translator under a progress bar
    async fn translate_with_progress(
        &self,
        service: &TranslationService,
        collection: &SubtitleCollection,
        source: &str,
        target: &str,
    ) -> Result<SubtitleCollection> {
        let multi_progress = MultiProgress::new();
        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let translator = BatchTranslator::new(
            service.clone(),
            self.config.translation.max_batch_size,
            self.config.translation.margin,
        );

        let pb = progress_bar.clone();
        let result = translator
            .translate_collection(
                collection,
                source,
                target,
                self.config.translation.bilingual,
                move |completed, total| {
                    pb.set_length(total as u64);
                    pb.set_position(completed as u64);
                },
            )
            .await;

        progress_bar.finish_and_clear();
        result
    }

    /// Build the translation service from the configured credentials,
    /// attaching the prompt cache for the selected backend family.
    fn build_translation_service(&self) -> Result<TranslationService> {
        let translation = &self.config.translation;

        let backend_name = if !parse_key_pool(&translation.openai_api_key).is_empty() {
            "openai"
        } else if !parse_key_pool(&translation.deepseek_api_key).is_empty() {
            "deepseek"
        } else {
            "passthrough"
        };

        let cache = if backend_name == "passthrough" {
            // Nothing remote to memoize
            PromptCache::in_memory()
        } else {
            let cache_path = match &translation.cache_dir {
                Some(dir) => dir.join(format!("prompts-{backend_name}.json")),
                None => JsonFileStore::default_path(backend_name),
            };
            PromptCache::new(Box::new(JsonFileStore::new(cache_path)))
                .context("Failed to initialize the prompt cache")?
        };

        Ok(TranslationService::from_credentials(
            &translation.openai_api_key,
            &translation.deepseek_api_key,
            translation.model.clone(),
            Arc::new(cache),
        ))
    }

    /// Format a duration as a compact human-readable string
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
