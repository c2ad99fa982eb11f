//! Session record parsing
//!
//! Reads a `.dtx` session record into an ordered list of labeled intervals.
//!
//! Record layout:
//! - line 0 is a header and is ignored
//! - each data line is `category,start,end[,...]`
//! - a line starting with `*` ends the data; anything after it is ignored

use crate::error::ScoreError;
use crate::types::{DiscontinuityAnomaly, IntervalRecord, SessionRecording};
use std::fs;
use std::path::Path;

/// First character of the end-of-data line
pub const END_OF_DATA: char = '*';

/// Parser for interval session records
pub struct IntervalParser;

impl IntervalParser {
    /// Read and parse a session record from disk
    pub fn parse_file(path: &Path) -> Result<SessionRecording, ScoreError> {
        let text = fs::read_to_string(path)?;
        Self::parse_str(&text)
    }

    /// Parse the text of a session record
    pub fn parse_str(text: &str) -> Result<SessionRecording, ScoreError> {
        let mut recording = SessionRecording::default();
        let mut prev_end: Option<u64> = None;

        for (line_num, line) in text.lines().enumerate() {
            if line_num == 0 {
                continue;
            }
            if line.starts_with(END_OF_DATA) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let record = parse_line(line_num, line)?;

            match prev_end {
                None if record.start != 0 => {
                    return Err(ScoreError::malformed(
                        line_num,
                        format!("first interval starts at {}, expected 0", record.start),
                    ));
                }
                Some(expected) if record.start != expected => {
                    log::warn!(
                        "missing time stamp on line {}: interval starts at {} but previous ended at {}",
                        line_num,
                        record.start,
                        expected
                    );
                    recording.anomalies.push(DiscontinuityAnomaly {
                        line: line_num,
                        expected_start: expected,
                        actual_start: record.start,
                    });
                }
                _ => {}
            }

            prev_end = Some(record.end);
            recording.total_duration = recording
                .total_duration
                .checked_add(record.duration())
                .ok_or_else(|| ScoreError::malformed(line_num, "total duration overflows"))?;
            recording.intervals.push(record);
        }

        Ok(recording)
    }
}

/// Parse one data line into an interval, checking `end >= start`
fn parse_line(line_num: usize, line: &str) -> Result<IntervalRecord, ScoreError> {
    // Only the first three of at most four fields carry data
    let mut fields = line.splitn(4, ',');

    let category: u32 = parse_field(line_num, fields.next(), "category")?;
    let start: u64 = parse_field(line_num, fields.next(), "start")?;
    let end: u64 = parse_field(line_num, fields.next(), "end")?;

    if category == 0 {
        return Err(ScoreError::malformed(line_num, "category must be at least 1"));
    }
    if end < start {
        return Err(ScoreError::malformed(
            line_num,
            format!("interval ends at {} before it starts at {}", end, start),
        ));
    }

    Ok(IntervalRecord {
        category,
        start,
        end,
    })
}

fn parse_field<T: std::str::FromStr>(
    line_num: usize,
    field: Option<&str>,
    name: &str,
) -> Result<T, ScoreError> {
    let raw = field
        .map(str::trim)
        .ok_or_else(|| ScoreError::malformed(line_num, format!("missing {} field", name)))?;

    raw.parse::<T>()
        .map_err(|_| ScoreError::malformed(line_num, format!("invalid {} '{}'", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_contiguous_record() {
        let text = "cat,beg,end,note\n1,0,10,a\n1,10,20\n2,20,30,x,y,z\n";
        let recording = IntervalParser::parse_str(text).unwrap();

        assert_eq!(
            recording.intervals,
            vec![
                IntervalRecord { category: 1, start: 0, end: 10 },
                IntervalRecord { category: 1, start: 10, end: 20 },
                IntervalRecord { category: 2, start: 20, end: 30 },
            ]
        );
        assert_eq!(recording.total_duration, 30);
        assert!(recording.is_contiguous());
        assert!(!recording.is_canonical_length());
    }

    #[test]
    fn test_sentinel_stops_parsing() {
        let text = "header\n3,0,200\n4,200,360\n*end\n9,0,x\ngarbage\n";
        let recording = IntervalParser::parse_str(text).unwrap();

        assert_eq!(recording.intervals.len(), 2);
        assert_eq!(recording.total_duration, 360);
        assert!(recording.is_canonical_length());
    }

    #[test]
    fn test_header_only_is_empty() {
        let recording = IntervalParser::parse_str("header\n").unwrap();
        assert!(recording.is_empty());
        assert_eq!(recording.total_duration, 0);

        let recording = IntervalParser::parse_str("").unwrap();
        assert!(recording.is_empty());
    }

    #[test]
    fn test_header_is_never_data() {
        // A header starting with '*' is still just a header
        let recording = IntervalParser::parse_str("*header\n1,0,5\n").unwrap();
        assert_eq!(recording.intervals.len(), 1);
    }

    #[test]
    fn test_end_before_start_is_malformed() {
        let err = IntervalParser::parse_str("h\n1,0,10\n2,10,5\n").unwrap_err();
        assert!(matches!(err, ScoreError::MalformedInterval { line: 2, .. }));
    }

    #[test]
    fn test_first_interval_must_start_at_zero() {
        let err = IntervalParser::parse_str("h\n1,5,10\n").unwrap_err();
        assert!(matches!(err, ScoreError::MalformedInterval { line: 1, .. }));
    }

    #[test]
    fn test_discontinuity_is_recorded_not_fatal() {
        let text = "h\n1,0,10\n2,12,20\n3,18,30\n";
        let recording = IntervalParser::parse_str(text).unwrap();

        assert_eq!(recording.intervals.len(), 3);
        // Literal durations are kept: 10 + 8 + 12
        assert_eq!(recording.total_duration, 30);
        assert_eq!(
            recording.anomalies,
            vec![
                DiscontinuityAnomaly { line: 2, expected_start: 10, actual_start: 12 },
                DiscontinuityAnomaly { line: 3, expected_start: 20, actual_start: 18 },
            ]
        );
    }

    #[test]
    fn test_non_numeric_fields_are_malformed() {
        assert!(matches!(
            IntervalParser::parse_str("h\nx,0,10\n"),
            Err(ScoreError::MalformedInterval { line: 1, .. })
        ));
        assert!(matches!(
            IntervalParser::parse_str("h\n1,0\n"),
            Err(ScoreError::MalformedInterval { line: 1, .. })
        ));
        assert!(matches!(
            IntervalParser::parse_str("h\n0,0,10\n"),
            Err(ScoreError::MalformedInterval { line: 1, .. })
        ));
    }

    #[test]
    fn test_total_duration_overflow_is_malformed() {
        let err = IntervalParser::parse_str("h\n1,0,18446744073709551615\n1,0,5\n").unwrap_err();
        assert!(matches!(err, ScoreError::MalformedInterval { line: 2, .. }));
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "header\r\n1,0,180\r\n5,180,360\r\n*\r\n").unwrap();

        let recording = IntervalParser::parse_file(file.path()).unwrap();
        assert_eq!(recording.intervals.len(), 2);
        assert_eq!(recording.total_duration, 360);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = IntervalParser::parse_file(Path::new("/nonexistent/session.dtx")).unwrap_err();
        assert!(matches!(err, ScoreError::Io(_)));
    }
}
