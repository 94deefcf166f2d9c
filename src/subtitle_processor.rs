use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use anyhow::{Context, Result, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: SRT document handling - parsing, serialization and segment merging

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

/// Separator line between original and translated text in a bilingual block
pub const DUAL_TEXT_SEPARATOR: &str = "----";

// @struct: Single subtitle entry
#[derive(Debug, Clone)]
pub struct SubtitleEntry {
    // @field: Sequence number (dense, reassigned on save - not a stable identity)
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, normalized to a single line
    pub text: String,

    // @field: Pre-translation text when the document carries a bilingual rendering
    pub original_text: Option<String>,
}

impl SubtitleEntry {
    /// Create a new entry, normalizing the text to a single line
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: normalize_text(&text),
            original_text: None,
        }
    }

    /// Create a bilingual entry carrying both the source and the translated text
    pub fn new_bilingual(
        seq_num: usize,
        start_time_ms: u64,
        end_time_ms: u64,
        original_text: String,
        text: String,
    ) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: normalize_text(&text),
            original_text: Some(normalize_text(&original_text)),
        }
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.split(&[':', ','][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].trim().parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Timing line for this entry
    pub fn format_timing(&self) -> String {
        format!(
            "{} --> {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms)
        )
    }
}

/// Rejoin internal line breaks into a single line.
///
/// Fragments are joined with ", " unless the preceding fragment already ends
/// in a period or comma, in which case a single space is enough.
pub fn normalize_text(text: &str) -> String {
    let lines: Vec<&str> = text
        .split(['\n', '\r'])
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    let mut result = String::new();
    for (i, line) in lines.iter().enumerate() {
        result.push_str(line);
        if i < lines.len() - 1 {
            if line.ends_with('.') || line.ends_with(',') {
                result.push(' ');
            } else {
                result.push_str(", ");
            }
        }
    }
    result
}

/// An ordered SRT document. Insertion order is playback order; every
/// whole-document operation keeps entries sorted ascending by start time.
#[derive(Debug, Clone, Default)]
pub struct SubtitleCollection {
    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        SubtitleCollection { entries: Vec::new() }
    }

    /// Parse an SRT file into a collection
    pub fn from_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SubtitleError::FileNotFound(path.display().to_string()).into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        Self::parse_srt_string(&content)
    }

    /// Parse SRT format text into a collection.
    ///
    /// Blocks with an unparseable index or timing line are skipped with a
    /// warning; a timing line that matches the SRT shape but carries invalid
    /// time components fails the whole parse.
    pub fn parse_srt_string(content: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (block_idx, block) in split_blocks(content).into_iter().enumerate() {
            let lines: Vec<&str> = block.lines().collect();
            if lines.len() < 3 {
                warn!("Skipping truncated subtitle block {}", block_idx + 1);
                continue;
            }

            let seq_num: usize = match lines[0].trim().parse() {
                Ok(num) => num,
                Err(_) => {
                    warn!("Skipping block {} with unparseable index: {}", block_idx + 1, lines[0]);
                    continue;
                }
            };

            let timing = lines[1].trim();
            let Some(caps) = TIMESTAMP_REGEX.captures(timing) else {
                warn!("Skipping block {} with unparseable timing: {}", block_idx + 1, timing);
                continue;
            };
            let (start_ms, end_ms) = parse_timing_captures(&caps, block_idx + 1, timing)?;

            let text_lines = &lines[2..];
            let entry = if text_lines.len() >= 3
                && !text_lines[0].trim().is_empty()
                && text_lines[1].trim() == DUAL_TEXT_SEPARATOR
            {
                SubtitleEntry::new_bilingual(
                    seq_num,
                    start_ms,
                    end_ms,
                    text_lines[0].to_string(),
                    text_lines[2..].join("\n"),
                )
            } else {
                SubtitleEntry::new(seq_num, start_ms, end_ms, text_lines.join("\n"))
            };

            if entry.text.is_empty() {
                warn!("Skipping empty subtitle block {}", block_idx + 1);
                continue;
            }
            entries.push(entry);
        }

        if entries.is_empty() {
            return Err(SubtitleError::Empty.into());
        }

        // Sort by start time and renumber so downstream passes can rely on order
        entries.sort_by_key(|entry| entry.start_time_ms);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }

        Ok(SubtitleCollection { entries })
    }

    /// Serialize the collection to SRT text.
    ///
    /// When `with_original` is set, entries that carry an original text are
    /// written in the dual-text form with the `----` separator line.
    pub fn to_srt_string(&self, with_original: bool) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!("{}\n", i + 1));
            out.push_str(&format!("{}\n", entry.format_timing()));
            if with_original {
                if let Some(original) = &entry.original_text {
                    out.push_str(original);
                    out.push('\n');
                    out.push_str(DUAL_TEXT_SEPARATOR);
                    out.push('\n');
                }
            }
            out.push_str(&entry.text);
            out.push_str("\n\n");
        }
        out
    }

    /// Write the collection to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P, with_original: bool) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
        file.write_all(self.to_srt_string(with_original).as_bytes())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }

    /// Merge entries separated by short gaps into longer, more naturally
    /// paced captions.
    ///
    /// A single forward fold over the entries sorted by start time: the next
    /// entry is folded into the current one when the gap between them is at
    /// most `merge_threshold_ms` and the combined text stays within
    /// `max_length` characters. The merged entry keeps the first start time
    /// and takes the last end time. Indices are reassigned 1..N. Re-applying
    /// with the same thresholds is a no-op once no pair remains eligible.
    pub fn merge_close_entries(&self, merge_threshold_ms: u64, max_length: usize) -> SubtitleCollection {
        if self.entries.is_empty() {
            return SubtitleCollection::new();
        }

        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|entry| entry.start_time_ms);

        let mut merged: Vec<SubtitleEntry> = Vec::new();
        let mut current = sorted[0].clone();

        for next in sorted.into_iter().skip(1) {
            let gap = next.start_time_ms.saturating_sub(current.end_time_ms);
            if gap <= merge_threshold_ms
                && current.text.chars().count() + next.text.chars().count() <= max_length
            {
                current.text = format!("{} {}", current.text.trim(), next.text.trim());
                current.end_time_ms = next.end_time_ms;
            } else {
                merged.push(current);
                current = next;
            }
        }
        merged.push(current);

        for (i, entry) in merged.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }

        SubtitleCollection { entries: merged }
    }

    /// Number of entries in the collection
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle collection with {} entries", self.entries.len())
    }
}

/// Split SRT content into blocks on blank-line boundaries
fn split_blocks(content: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            current.clear();
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    if !current.trim().is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Extract start/end milliseconds from a matched timing line
fn parse_timing_captures(caps: &regex::Captures, block: usize, timing: &str) -> Result<(u64, u64)> {
    let component = |idx: usize| -> u64 {
        caps.get(idx).map_or(0, |m| m.as_str().parse().unwrap_or(0))
    };

    // The regex guarantees digit groups; range checks are what can still fail
    for base in [1, 5] {
        if component(base + 1) >= 60 || component(base + 2) >= 60 || component(base + 3) >= 1000 {
            return Err(SubtitleError::InvalidTimestamp {
                block,
                text: timing.to_string(),
            }
            .into());
        }
    }

    let to_ms = |base: usize| -> u64 {
        (component(base) * 3600 + component(base + 1) * 60 + component(base + 2)) * 1000
            + component(base + 3)
    };

    Ok((to_ms(1), to_ms(5)))
}
