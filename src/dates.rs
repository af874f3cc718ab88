//! Timestamp derivation for measurement file names.
//!
//! Measurement files are named after the moment the sensor started writing
//! them, in asctime form: `Sun Nov 6 07:49:04 2022.csv`. Non-hourly objects
//! carry their interval as a path prefix (`daily/...`). Parsing always uses an
//! explicit [`DateConfig`]; there is no process-wide timezone or locale.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use crate::models::{IntervalBucket, RemoteObject};
use crate::{Error, Result};

/// `day-of-week month day hour:minute:second year`, English names only.
pub const DEFAULT_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Length of the file extension stripped before parsing (`.csv`).
pub const EXTENSION_LEN: usize = 4;

/// Mountain Standard Time, UTC-07:00 all year.
pub const MST_OFFSET_HOURS: i32 = -7;

const LABEL_FORMAT: &str = "%b %-d, %Y at %-I:%M %p";

// ---

/// Format and timezone used to interpret dates found in object names.
#[derive(Debug, Clone)]
pub struct DateConfig {
    format: String,
    offset: FixedOffset,
}

impl Default for DateConfig {
    fn default() -> Self {
        DateConfig::mountain_standard()
    }
}

impl DateConfig {
    // ---
    pub fn new(format: impl Into<String>, offset: FixedOffset) -> Self {
        DateConfig {
            format: format.into(),
            offset,
        }
    }

    pub fn mountain_standard() -> Self {
        // ---
        // -7h is always within FixedOffset's +/-24h range.
        let offset = FixedOffset::east_opt(MST_OFFSET_HOURS * 3600).unwrap_or(Utc.fix());
        DateConfig::new(DEFAULT_FORMAT, offset)
    }

    /// Default format with a whole-hour UTC offset, e.g. `-7` for MST.
    pub fn with_offset_hours(hours: i32) -> Result<Self> {
        // ---
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| Error::Config(format!("timezone offset {hours}h is out of range")))?;

        Ok(DateConfig::new(DEFAULT_FORMAT, offset))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parse a date string in the configured format and timezone.
    ///
    /// Whitespace runs are collapsed first, so the padded asctime form
    /// (`Sun Nov  6 ...`) and the trailing space written after each
    /// measurement row both parse.
    pub fn parse(&self, raw: &str) -> Result<DateTime<FixedOffset>> {
        // ---
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");

        let naive = NaiveDateTime::parse_from_str(&normalized, &self.format).map_err(|source| {
            Error::DateParse {
                input: raw.to_string(),
                source,
            }
        })?;

        self.offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| Error::AmbiguousDate(raw.to_string()))
    }

    /// Parse the part of `raw` left after dropping `offset` leading and
    /// `suffix` trailing characters.
    pub fn parse_window(
        &self,
        raw: &str,
        offset: usize,
        suffix: usize,
    ) -> Result<DateTime<FixedOffset>> {
        // ---
        let window = char_window(raw, offset, suffix).ok_or_else(|| Error::PathTooShort {
            path: raw.to_string(),
            offset,
            suffix,
        })?;

        self.parse(window)
    }

    /// Calendar day of `now` in the configured timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Readable label, e.g. `Nov 6, 2022 at 7:49 AM`.
    pub fn label(&self, timestamp: &DateTime<FixedOffset>) -> String {
        timestamp
            .with_timezone(&self.offset)
            .format(LABEL_FORMAT)
            .to_string()
    }
}

/// Derive the timestamp of `object` using `bucket`'s prefix rule.
pub fn derive_timestamp(
    dates: &DateConfig,
    bucket: IntervalBucket,
    object: &RemoteObject,
) -> Result<DateTime<FixedOffset>> {
    // ---
    dates.parse_window(
        bucket.date_source(object),
        bucket.path_offset(),
        EXTENSION_LEN,
    )
}

/// Slice by character count rather than bytes so multi-byte names never
/// split a code point.
fn char_window(raw: &str, offset: usize, suffix: usize) -> Option<&str> {
    // ---
    let len = raw.chars().count();
    if len < offset + suffix {
        return None;
    }

    let byte_at = |n: usize| raw.char_indices().nth(n).map_or(raw.len(), |(i, _)| i);
    raw.get(byte_at(offset)..byte_at(len - suffix))
}
