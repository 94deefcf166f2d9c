/*!
 * Line compression around a remote translation call.
 *
 * Transcripts often contain exact consecutive repeats (a word repeated for
 * emphasis, a mis-segmented loop). Sending each copy wastes tokens and gives
 * the backend more chances to drift off the one-line-per-subtitle contract,
 * so consecutive duplicates are collapsed to a single line with a repeat
 * count before transmission and restored afterwards.
 */

use crate::errors::TranslationError;

/// Sentinel the backend must emit immediately after each translated line
pub const LINE_DELIMITER: &str = "<<<END_OF_LINE>>>";

/// One transmitted line standing in for one or more consecutive identical
/// input lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedLine {
    /// Line text (trimmed)
    pub text: String,

    /// How many consecutive input lines this record covers (>= 1)
    pub repeat_count: usize,
}

/// Compress/decode state for one batch request
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Compressed lines in input order
    lines: Vec<CompressedLine>,
}

impl LineCodec {
    /// Compress a sequence of raw lines.
    ///
    /// Only strictly consecutive runs of trim-equal lines are collapsed; two
    /// equal lines with anything between them stay separate records.
    pub fn encode<S: AsRef<str>>(raw_lines: &[S]) -> Self {
        let mut lines: Vec<CompressedLine> = Vec::new();

        for raw in raw_lines {
            let text = raw.as_ref().trim();
            match lines.last_mut() {
                Some(last) if last.text == text => last.repeat_count += 1,
                _ => lines.push(CompressedLine {
                    text: text.to_string(),
                    repeat_count: 1,
                }),
            }
        }

        LineCodec { lines }
    }

    /// Number of compressed lines, after dropping trailing empties.
    ///
    /// This is the line count the backend is asked to echo.
    pub fn transmitted_len(&self) -> usize {
        self.trimmed_line_count()
    }

    /// Build the outbound request text: compressed lines joined with the
    /// sentinel delimiter, trailing empty lines dropped first.
    pub fn to_request_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines[..self.trimmed_line_count()] {
            out.push_str(&line.text);
            out.push_str(LINE_DELIMITER);
        }
        out
    }

    /// Assign translated text from a raw backend response.
    ///
    /// The response is split on the delimiter, each fragment trimmed, and
    /// trailing empty fragments stripped; the remaining count must equal the
    /// transmitted compressed line count exactly. A mismatch is a hard
    /// contract violation, not a retryable condition. Repeat counts are
    /// untouched.
    pub fn apply_response(&mut self, response: &str) -> Result<(), TranslationError> {
        let mut fragments: Vec<String> = response
            .split(LINE_DELIMITER)
            .map(|fragment| fragment.trim().to_string())
            .collect();
        while fragments.last().is_some_and(|f| f.is_empty()) {
            fragments.pop();
        }

        let expected = self.trimmed_line_count();
        if fragments.len() != expected {
            return Err(TranslationError::LineCountMismatch {
                expected,
                received: fragments.len(),
            });
        }

        self.lines.truncate(expected);
        for (line, translated) in self.lines.iter_mut().zip(fragments) {
            line.text = translated;
        }

        Ok(())
    }

    /// Expand back to per-input-line granularity by repeating each record's
    /// text `repeat_count` times.
    pub fn expand(&self) -> Vec<String> {
        self.lines
            .iter()
            .flat_map(|line| std::iter::repeat_n(line.text.clone(), line.repeat_count))
            .collect()
    }

    /// Access the compressed records
    pub fn lines(&self) -> &[CompressedLine] {
        &self.lines
    }

    /// Compressed line count with trailing empty records excluded
    fn trimmed_line_count(&self) -> usize {
        let mut len = self.lines.len();
        while len > 0 && self.lines[len - 1].text.is_empty() {
            len -= 1;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_withConsecutiveDuplicates_shouldCollapseRun() {
        let codec = LineCodec::encode(&["Hi", "Hi", "Hi", "there"]);

        assert_eq!(codec.lines().len(), 2);
        assert_eq!(codec.lines()[0], CompressedLine { text: "Hi".to_string(), repeat_count: 3 });
        assert_eq!(codec.lines()[1], CompressedLine { text: "there".to_string(), repeat_count: 1 });
    }

    #[test]
    fn test_encode_withNonAdjacentDuplicates_shouldKeepSeparateRecords() {
        let codec = LineCodec::encode(&["Hi", "there", "Hi"]);
        assert_eq!(codec.lines().len(), 3);
    }

    #[test]
    fn test_encode_shouldCompareAfterTrimming() {
        let codec = LineCodec::encode(&["Hi ", " Hi"]);
        assert_eq!(codec.lines().len(), 1);
        assert_eq!(codec.lines()[0].repeat_count, 2);
    }

    #[test]
    fn test_requestText_shouldJoinWithDelimiter() {
        let codec = LineCodec::encode(&["one", "two"]);
        assert_eq!(
            codec.to_request_text(),
            format!("one{}two{}", LINE_DELIMITER, LINE_DELIMITER)
        );
    }

    #[test]
    fn test_requestText_withTrailingEmptyLines_shouldDropThem() {
        let codec = LineCodec::encode(&["one", "", ""]);
        assert_eq!(codec.transmitted_len(), 1);
        assert_eq!(codec.to_request_text(), format!("one{}", LINE_DELIMITER));
    }

    #[test]
    fn test_applyResponse_withIdentityEcho_shouldRoundTripLineCount() {
        let raw = ["Hi", "Hi", "there", "there", "there", "done"];
        let mut codec = LineCodec::encode(&raw);
        let echo = codec.to_request_text();

        codec.apply_response(&echo).unwrap();
        let expanded = codec.expand();

        assert_eq!(expanded.len(), raw.len());
        assert_eq!(expanded, raw.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn test_applyResponse_withTooFewLines_shouldReportMismatch() {
        let mut codec = LineCodec::encode(&["one", "two", "three"]);
        let err = codec.apply_response(&format!("uno{}", LINE_DELIMITER)).unwrap_err();

        match err {
            TranslationError::LineCountMismatch { expected, received } => {
                assert_eq!(expected, 3);
                assert_eq!(received, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_applyResponse_withExtraLines_shouldReportMismatch() {
        let mut codec = LineCodec::encode(&["one"]);
        let response = format!("uno{}dos{}", LINE_DELIMITER, LINE_DELIMITER);
        assert!(codec.apply_response(&response).is_err());
    }

    #[test]
    fn test_applyResponse_shouldPreserveRepeatCounts() {
        let mut codec = LineCodec::encode(&["Hi", "Hi", "bye"]);
        let response = format!("Salut{}au revoir{}", LINE_DELIMITER, LINE_DELIMITER);
        codec.apply_response(&response).unwrap();

        assert_eq!(codec.expand(), vec!["Salut", "Salut", "au revoir"]);
    }

    #[test]
    fn test_applyResponse_withTrailingDelimiterNoise_shouldStillMatch() {
        let mut codec = LineCodec::encode(&["one", "two"]);
        let response = format!("uno{}dos{}\n\n", LINE_DELIMITER, LINE_DELIMITER);
        codec.apply_response(&response).unwrap();
        assert_eq!(codec.expand(), vec!["uno", "dos"]);
    }
}
