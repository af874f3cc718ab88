//! Data models for the measurement catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::Error;

// ---

/// Measurement interval, named after the top-level storage prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalBucket {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl IntervalBucket {
    // ---
    pub const ALL: [IntervalBucket; 4] = [
        IntervalBucket::Hourly,
        IntervalBucket::Daily,
        IntervalBucket::Weekly,
        IntervalBucket::Monthly,
    ];

    /// Route a storage prefix to its bucket. Exact, case-sensitive match only.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        // ---
        match prefix {
            "hourly" => Some(IntervalBucket::Hourly),
            "daily" => Some(IntervalBucket::Daily),
            "weekly" => Some(IntervalBucket::Weekly),
            "monthly" => Some(IntervalBucket::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalBucket::Hourly => "hourly",
            IntervalBucket::Daily => "daily",
            IntervalBucket::Weekly => "weekly",
            IntervalBucket::Monthly => "monthly",
        }
    }

    /// Characters stripped from the front of the date source.
    ///
    /// Hourly timestamps come from the bare filename, so nothing is stripped.
    /// The other buckets read the full path and drop `"<bucket>/"`.
    pub fn path_offset(&self) -> usize {
        match self {
            IntervalBucket::Hourly => 0,
            other => other.as_str().len() + 1,
        }
    }

    /// The string a bucket derives its timestamps from.
    pub fn date_source<'a>(&self, object: &'a RemoteObject) -> &'a str {
        match self {
            IntervalBucket::Hourly => &object.name,
            _ => &object.full_path,
        }
    }
}

impl fmt::Display for IntervalBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalBucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntervalBucket::from_prefix(s).ok_or_else(|| Error::Config(format!("unknown interval '{s}'")))
    }
}

/// Handle to an object held by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteObject {
    // ---
    /// Path within the store, e.g. `daily/Sun Nov 6 07:49:04 2022.csv`.
    pub full_path: String,

    /// Basename only.
    pub name: String,
}

impl RemoteObject {
    // ---
    pub fn from_full_path(full_path: impl Into<String>) -> Self {
        // ---
        let full_path = full_path.into();
        let name = full_path
            .rsplit('/')
            .next()
            .unwrap_or(full_path.as_str())
            .to_string();

        RemoteObject { full_path, name }
    }
}

/// A remote object together with the timestamp derived from its name.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub object: RemoteObject,
    pub timestamp: DateTime<FixedOffset>,
}

/// Catalog entry as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedObject {
    // ---
    pub interval: IntervalBucket,
    pub full_path: String,
    pub name: String,
    pub timestamp: DateTime<FixedOffset>,
    /// Readable form of `timestamp`, e.g. `Nov 6, 2022 at 7:49 AM`.
    pub label: String,
}

/// One row of a measurement file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    // ---
    pub timestamp: DateTime<FixedOffset>,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
}

/// Verdict returned by the alert decision endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertVerdict {
    // ---
    pub alert: bool,
    pub pollutant: String,
    /// Human readable, passed through untouched.
    pub time: String,
    pub value: f64,
}

/// Text shown to the user when a verdict raises an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotice {
    pub title: String,
    pub message: String,
}

pub const ALERT_TITLE: &str = "Air Quality has exceeded WHO guidelines";

impl AlertVerdict {
    // ---
    pub fn to_notice(&self) -> Option<AlertNotice> {
        // ---
        if !self.alert {
            return None;
        }

        Some(AlertNotice {
            title: ALERT_TITLE.to_string(),
            message: format!(
                "On {} {} concentration was measured at {} mcg/L",
                self.time,
                self.pollutant,
                format_concentration(self.value)
            ),
        })
    }
}

/// Whole numbers keep one decimal place, so `42.0` reads as `42.0`.
fn format_concentration(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn create_test_verdict(alert: bool) -> AlertVerdict {
        // ---
        AlertVerdict {
            alert,
            pollutant: "PM2.5".to_string(),
            time: "Nov 6".to_string(),
            value: 42.5,
        }
    }

    #[test]
    fn test_prefix_routing_exact_match() {
        // ---
        for bucket in IntervalBucket::ALL {
            assert_eq!(IntervalBucket::from_prefix(bucket.as_str()), Some(bucket));
        }

        assert_eq!(IntervalBucket::from_prefix("Hourly"), None);
        assert_eq!(IntervalBucket::from_prefix("yearly"), None);
        assert_eq!(IntervalBucket::from_prefix("daily/"), None);
        assert_eq!(IntervalBucket::from_prefix(""), None);
    }

    #[test]
    fn test_path_offsets() {
        // ---
        assert_eq!(IntervalBucket::Hourly.path_offset(), 0);
        assert_eq!(IntervalBucket::Daily.path_offset(), 6);
        assert_eq!(IntervalBucket::Weekly.path_offset(), 7);
        assert_eq!(IntervalBucket::Monthly.path_offset(), 8);
    }

    #[test]
    fn test_date_source_per_bucket() {
        // ---
        let obj = RemoteObject::from_full_path("hourly/Sun Nov 6 07:49:04 2022.csv");
        assert_eq!(
            IntervalBucket::Hourly.date_source(&obj),
            "Sun Nov 6 07:49:04 2022.csv"
        );
        assert_eq!(
            IntervalBucket::Daily.date_source(&obj),
            "hourly/Sun Nov 6 07:49:04 2022.csv"
        );
    }

    #[test]
    fn test_remote_object_name() {
        // ---
        let obj = RemoteObject::from_full_path("weekly/Sun Nov 6 07:49:04 2022.csv");
        assert_eq!(obj.name, "Sun Nov 6 07:49:04 2022.csv");

        let bare = RemoteObject::from_full_path("loose.csv");
        assert_eq!(bare.name, "loose.csv");
    }

    #[test]
    fn test_interval_from_str() {
        // ---
        assert_eq!("monthly".parse::<IntervalBucket>().unwrap(), IntervalBucket::Monthly);
        assert!("MONTHLY".parse::<IntervalBucket>().is_err());
    }

    #[test]
    fn test_alert_notice() {
        // ---
        let notice = create_test_verdict(true).to_notice().unwrap();
        assert_eq!(notice.title, ALERT_TITLE);
        assert_eq!(
            notice.message,
            "On Nov 6 PM2.5 concentration was measured at 42.5 mcg/L"
        );

        assert!(create_test_verdict(false).to_notice().is_none());
    }

    #[test]
    fn test_alert_notice_whole_number_keeps_decimal() {
        // ---
        let verdict = AlertVerdict {
            value: 42.0,
            ..create_test_verdict(true)
        };
        assert_eq!(
            verdict.to_notice().unwrap().message,
            "On Nov 6 PM2.5 concentration was measured at 42.0 mcg/L"
        );

        let verdict = AlertVerdict {
            value: 0.125,
            ..create_test_verdict(true)
        };
        assert!(verdict.to_notice().unwrap().message.contains("at 0.125 mcg/L"));
    }

    #[test]
    fn test_record_serializes_type_field() {
        // ---
        let record = MeasurementRecord {
            timestamp: DateTime::parse_from_rfc3339("2022-11-06T07:49:04-07:00").unwrap(),
            kind: "PM10".to_string(),
            value: 8.1,
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "PM10");
        assert_eq!(json["timestamp"], "2022-11-06T07:49:04-07:00");
    }
}
