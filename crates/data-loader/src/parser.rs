//! Parser for delimited interaction files.
//!
//! Each line holds one record:
//! - `user_id<delim>item_id<delim>weight` for aggregated purchase counts
//! - `user_id<delim>item_id` for binary like events (weight 1.0)
//!
//! Blank lines and lines starting with `#` are skipped. The first data line
//! is treated as a header row only when none of its fields is numeric, so a
//! corrupt first record is reported rather than dropped.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ',';

/// Read and parse an interaction file from disk
pub fn parse_interactions(path: &Path, delimiter: char) -> Result<Vec<InteractionRecord>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_interactions_str(&content, &file_name, delimiter)
}

/// Parse interaction records from in-memory text.
///
/// `file_name` is only used to give parse errors some context.
pub fn parse_interactions_str(
    content: &str,
    file_name: &str,
    delimiter: char,
) -> Result<Vec<InteractionRecord>> {
    let mut records = Vec::new();
    let mut seen_data_line = false;

    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() || line_trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line_trimmed.split(delimiter).map(str::trim).collect();

        if !seen_data_line {
            seen_data_line = true;
            if is_header(&parts) {
                // e.g. "user_id,item_id,purchase_count"
                continue;
            }
        }

        records.push(parse_record(&parts, file_name, line_no)?);
    }

    Ok(records)
}

fn is_header(parts: &[&str]) -> bool {
    parts.iter().all(|field| field.parse::<f64>().is_err())
}

fn parse_record(parts: &[&str], file_name: &str, line_no: usize) -> Result<InteractionRecord> {
    if parts.len() < 2 || parts.len() > 3 {
        return Err(DataLoadError::FieldCountMismatch {
            expected: "2 or 3".to_string(),
            found: parts.len(),
            line: line_no,
        });
    }

    let parse_error = |reason: String| DataLoadError::ParseError {
        file: file_name.to_string(),
        line: line_no,
        reason,
    };

    let user_id: UserId = parts[0]
        .parse()
        .map_err(|e| parse_error(format!("Invalid user_id: {}", e)))?;
    let item_id: ItemId = parts[1]
        .parse()
        .map_err(|e| parse_error(format!("Invalid item_id: {}", e)))?;
    let weight: f32 = match parts.get(2) {
        Some(raw) => raw
            .parse()
            .map_err(|e| parse_error(format!("Invalid weight: {}", e)))?,
        None => 1.0,
    };

    // Range checks (negative, NaN) belong to the matrix builder, which owns
    // the InvalidWeight policy.
    Ok(InteractionRecord::new(user_id, item_id, weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weighted_rows() {
        let content = "0,101,1\n1,101,1\n1,102,2\n";
        let records = parse_interactions_str(content, "orders.csv", ',').unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[2], InteractionRecord::new(1, 102, 2.0));
    }

    #[test]
    fn test_missing_weight_defaults_to_like() {
        let records = parse_interactions_str("7,300\n", "likes.csv", ',').unwrap();
        assert_eq!(records, vec![InteractionRecord::like(7, 300)]);
    }

    #[test]
    fn test_header_comments_and_blank_lines_skipped() {
        let content = "# exported likes\nuser_id,item_id,weight\n\n3,104,1\n";
        let records = parse_interactions_str(content, "likes.csv", ',').unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item_id, 104);
    }

    #[test]
    fn test_corrupt_first_row_is_reported() {
        let err = parse_interactions_str("1x,101,1\n2,102,1\n", "orders.csv", ',').unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_byte_order_mark_ignored() {
        let records = parse_interactions_str("\u{feff}1,101,1\n2,102,1\n", "orders.csv", ',').unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], InteractionRecord::new(1, 101, 1.0));

        let records = parse_interactions_str("\u{feff}userId,itemId\n2,102\n", "likes.csv", ',').unwrap();
        assert_eq!(records, vec![InteractionRecord::like(2, 102)]);
    }

    #[test]
    fn test_custom_delimiter() {
        let records = parse_interactions_str("1::2::3.5\n", "ratings.dat", ':');
        // "::" splits into an empty middle field, so the row is malformed
        assert!(records.is_err());

        let records = parse_interactions_str("1\t2\t3.5\n", "plays.tsv", '\t').unwrap();
        assert_eq!(records[0].weight, 3.5);
    }

    #[test]
    fn test_bad_field_reports_line() {
        let err = parse_interactions_str("1,2,1\n1,abc,1\n", "orders.csv", ',').unwrap_err();
        match err {
            DataLoadError::ParseError { file, line, .. } => {
                assert_eq!(file, "orders.csv");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_field_count_mismatch() {
        let err = parse_interactions_str("1,2,3,4\n", "orders.csv", ',').unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::FieldCountMismatch { found: 4, line: 1, .. }
        ));
    }

    #[test]
    fn test_non_numeric_later_line_is_an_error() {
        let err = parse_interactions_str("1,2\nuser,item\n", "likes.csv", ',');
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = parse_interactions(Path::new("does/not/exist.csv"), ',').unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
