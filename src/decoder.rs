//! Measurement file decoding.
//!
//! Files are plain text, one reading per line: `type,value,timestamp`, e.g.
//! `PM2.5,12.3,Sun Nov 6 07:49:04 2022 `. The uploader always leaves an empty
//! last line.

use tracing::{debug, warn};

use crate::dates::DateConfig;
use crate::models::MeasurementRecord;

const FIELDS_PER_ROW: usize = 3;

/// Decode a downloaded measurement file, keeping file order.
///
/// Rows without exactly three fields are skipped. A value that is not a
/// number reads as `0.0`. A row whose timestamp does not parse is logged and
/// dropped on its own.
pub fn decode(content: &[u8], dates: &DateConfig) -> Vec<MeasurementRecord> {
    // ---
    let text = String::from_utf8_lossy(content);
    let mut records = Vec::new();

    for (line_no, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() != FIELDS_PER_ROW {
            if !line.is_empty() {
                debug!("Skipping line {} with {} fields", line_no + 1, fields.len());
            }
            continue;
        }

        let timestamp = match dates.parse(fields[2]) {
            Ok(ts) => ts,
            Err(e) => {
                warn!("Skipping line {}: {}", line_no + 1, e);
                continue;
            }
        };

        records.push(MeasurementRecord {
            timestamp,
            kind: fields[0].to_string(),
            value: parse_value(fields[1]),
        });
    }

    records
}

/// Numeric value of a row, `0.0` when it is not a finite number.
///
/// `NaN` and `inf` parse as `f64` but have no JSON representation.
fn parse_value(field: &str) -> f64 {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::DateTime;

    const SAMPLE: &str =
        "pm25,12.3,Sun Nov 6 07:49:04 2022 \npm10,8.1,Sun Nov 6 08:00:00 2022 \n";

    #[test]
    fn test_decodes_rows_in_file_order() {
        // ---
        let records = decode(SAMPLE.as_bytes(), &DateConfig::default());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, "pm25");
        assert_eq!(records[0].value, 12.3);
        assert_eq!(
            records[0].timestamp,
            DateTime::parse_from_rfc3339("2022-11-06T07:49:04-07:00").unwrap()
        );
        assert_eq!(records[1].kind, "pm10");
        assert_eq!(records[1].value, 8.1);
    }

    #[test]
    fn test_extra_trailing_blank_line() {
        // ---
        let content = format!("{SAMPLE}\n");
        assert_eq!(decode(content.as_bytes(), &DateConfig::default()).len(), 2);
    }

    #[test]
    fn test_not_resorted() {
        // ---
        let content = "PM10,1,Sun Nov 6 09:00:00 2022 \nPM10,2,Sun Nov 6 08:00:00 2022 \n";
        let records = decode(content.as_bytes(), &DateConfig::default());

        let values: Vec<_> = records.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_wrong_field_count_skipped() {
        // ---
        let content = "PM2.5,1.0\nPM2.5,1.0,Sun Nov 6 07:49:04 2022,extra\nPM2.5,3.5,Sun Nov 6 07:49:04 2022 \n";
        let records = decode(content.as_bytes(), &DateConfig::default());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 3.5);
    }

    #[test]
    fn test_bad_value_defaults_to_zero() {
        // ---
        let content = "PM2.5,n/a,Sun Nov 6 07:49:04 2022 \nPM10,,Sun Nov 6 07:49:04 2022 \n";
        let records = decode(content.as_bytes(), &DateConfig::default());

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.value == 0.0));
    }

    #[test]
    fn test_non_finite_values_default_to_zero() {
        // ---
        let content = "PM10,NaN,Sun Nov 6 07:49:04 2022 \nPM10,inf,Sun Nov 6 07:49:04 2022 \nPM2.5,-inf,Sun Nov 6 07:49:04 2022 \n";
        let records = decode(content.as_bytes(), &DateConfig::default());

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.value == 0.0));

        let json = serde_json::to_value(&records).unwrap();
        for row in json.as_array().unwrap() {
            assert_eq!(row["value"], 0.0);
        }
    }

    #[test]
    fn test_bad_timestamp_drops_only_that_row() {
        // ---
        let content = "PM2.5,1.0,yesterday\nPM10,2.0,Sun Nov 6 07:49:04 2022 \n";
        let records = decode(content.as_bytes(), &DateConfig::default());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, "PM10");
    }

    #[test]
    fn test_crlf_lines() {
        // ---
        let content = "PM2.5,1.5,Sun Nov 6 07:49:04 2022\r\n\r\n";
        let records = decode(content.as_bytes(), &DateConfig::default());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 1.5);
    }

    #[test]
    fn test_empty_content() {
        // ---
        assert!(decode(b"", &DateConfig::default()).is_empty());
    }
}
