// Recorded sensor frames, one per line. Readings are separated by commas and/or
// whitespace; blank lines and lines starting with `#` are skipped.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::core_modules::quantizer::quantizer::Reading;
use crate::error::{GmgError, Result};

/// Parses one line. `Ok(None)` means the line carries no frame.
pub fn parse_frame(line: &str, line_number: usize) -> Result<Option<Vec<Reading>>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<Reading>().map_err(|e| GmgError::Parse {
                line: line_number,
                message: format!("{token:?}: {e}"),
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Streams frames out of any async line source.
pub struct FrameReader<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// The next frame, or `None` at end of input.
    pub async fn next_frame(&mut self) -> Result<Option<Vec<Reading>>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;
            if let Some(frame) = parse_frame(&line, self.line_number)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Line number of the most recently read line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_separators() {
        let frame = parse_frame(" 21.5, 22.0 23.25,\t24 ", 1).unwrap().unwrap();
        assert_eq!(frame, vec![21.5, 22.0, 23.25, 24.0]);
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert!(parse_frame("", 1).unwrap().is_none());
        assert!(parse_frame("   ", 2).unwrap().is_none());
        assert!(parse_frame("# recorded 2024-03-01", 3).unwrap().is_none());
    }

    #[test]
    fn reports_the_offending_line() {
        let err = parse_frame("21.0, warm, 22.0", 7).unwrap_err();
        assert!(matches!(err, GmgError::Parse { line: 7, .. }));
    }

    #[tokio::test]
    async fn reader_yields_frames_in_order() {
        let input: &[u8] = b"# header\n1,2\n\n3 4\n";
        let mut reader = FrameReader::new(input);

        assert_eq!(reader.next_frame().await.unwrap(), Some(vec![1.0, 2.0]));
        assert_eq!(reader.next_frame().await.unwrap(), Some(vec![3.0, 4.0]));
        assert_eq!(reader.line_number(), 4);
        assert_eq!(reader.next_frame().await.unwrap(), None);
    }
}
