//! Chronological projection for the daily, weekly and monthly buckets.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::dates::{derive_timestamp, DateConfig};
use crate::models::{CatalogEntry, IntervalBucket, RemoteObject};

/// Derive a timestamp for every object, keep the last object seen for each
/// timestamp and return the survivors oldest first.
///
/// Rebuilds the whole sequence from `items`; nothing is carried over from
/// earlier listings.
pub fn project(
    bucket: IntervalBucket,
    items: Vec<RemoteObject>,
    dates: &DateConfig,
) -> Vec<CatalogEntry> {
    // ---
    let entries: Vec<CatalogEntry> = items
        .into_iter()
        .filter_map(|object| match derive_timestamp(dates, bucket, &object) {
            Ok(timestamp) => Some(CatalogEntry { object, timestamp }),
            Err(e) => {
                warn!("Dropping {} object '{}': {}", bucket, object.full_path, e);
                None
            }
        })
        .collect();

    dedup_last_wins(entries)
}

/// Collapse entries sharing a timestamp down to the last one processed,
/// returned oldest first.
fn dedup_last_wins(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    // ---
    let mut kept: BTreeMap<DateTime<FixedOffset>, CatalogEntry> = BTreeMap::new();

    for entry in entries {
        let timestamp = entry.timestamp;
        let path = entry.object.full_path.clone();
        if let Some(replaced) = kept.insert(timestamp, entry) {
            debug!(
                "'{}' replaces '{}' at {}",
                path, replaced.object.full_path, timestamp
            );
        }
    }

    kept.into_values().collect()
}
