/*!
 * Unit tests for SRT file handling
 */

use anyhow::Result;
use vidscribe::subtitle_processor::SubtitleCollection;

use crate::common;

#[test]
fn test_fromSrtFile_withValidFile_shouldParseAllEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt_path = common::create_test_subtitle(temp_dir.path(), "test.srt")?;

    let collection = SubtitleCollection::from_srt_file(&srt_path)?;
    assert_eq!(collection.len(), 3);
    assert_eq!(collection.entries[0].text, "This is a test subtitle.");
    assert_eq!(collection.entries[0].start_time_ms, 1_000);
    assert_eq!(collection.entries[2].end_time_ms, 14_000);
    Ok(())
}

#[test]
fn test_fromSrtFile_withMissingFile_shouldFail() {
    let result = SubtitleCollection::from_srt_file("/nonexistent/test.srt");
    assert!(result.is_err());
}

#[test]
fn test_writeToSrt_thenReload_shouldPreserveEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt_path = common::create_test_subtitle(temp_dir.path(), "test.srt")?;
    let out_path = temp_dir.path().join("out.srt");

    let collection = SubtitleCollection::from_srt_file(&srt_path)?;
    collection.write_to_srt(&out_path, false)?;

    let reloaded = SubtitleCollection::from_srt_file(&out_path)?;
    assert_eq!(reloaded.len(), collection.len());
    for (a, b) in collection.entries.iter().zip(reloaded.entries.iter()) {
        assert_eq!(a.text, b.text);
        assert_eq!(a.start_time_ms, b.start_time_ms);
        assert_eq!(a.end_time_ms, b.end_time_ms);
    }
    Ok(())
}

#[test]
fn test_mergeCloseEntries_onFileContent_shouldCollapseShortGaps() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt_path = common::create_test_subtitle(temp_dir.path(), "test.srt")?;

    // Gaps in the fixture are 1 second; the transcription defaults (7s) merge
    // everything that fits the length budget.
    let collection = SubtitleCollection::from_srt_file(&srt_path)?;
    let merged = collection.merge_close_entries(7_000, 100);

    assert!(merged.len() < collection.len());
    assert_eq!(merged.entries[0].start_time_ms, 1_000);
    assert_eq!(merged.entries.last().unwrap().end_time_ms, 14_000);
    Ok(())
}

#[test]
fn test_parse_withCrlfLineEndings_shouldParse() {
    let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n";
    let collection = SubtitleCollection::parse_srt_string(content).unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.entries[0].text, "Hello");
}

#[test]
fn test_parse_withOutOfOrderBlocks_shouldSortByStartTime() {
    let content = "\
2\n00:00:05,000 --> 00:00:06,000\nSecond\n\n\
1\n00:00:01,000 --> 00:00:02,000\nFirst\n\n";
    let collection = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(collection.entries[0].text, "First");
    assert_eq!(collection.entries[0].seq_num, 1);
    assert_eq!(collection.entries[1].text, "Second");
    assert_eq!(collection.entries[1].seq_num, 2);
}
