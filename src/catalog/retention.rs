//! Same-day retention for the hourly bucket.
//!
//! Hourly files pile up around the clock; only the ones recorded on the
//! current calendar day are listed. Everything older is handed back for
//! deletion, since the daily/weekly/monthly files already cover past days.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::dates::{derive_timestamp, DateConfig};
use crate::models::{CatalogEntry, IntervalBucket, RemoteObject};

/// Outcome of applying the retention rule to one hourly listing.
#[derive(Debug, Default)]
pub struct RetentionPlan {
    /// Same-day objects, in listing order.
    pub retained: Vec<CatalogEntry>,
    /// Objects from any other day; each must be deleted exactly once.
    pub expired: Vec<RemoteObject>,
}

/// Split an hourly listing into retained and expired objects.
///
/// Objects whose name does not parse are in neither list: they are logged
/// and left alone in the store.
pub fn plan(items: Vec<RemoteObject>, dates: &DateConfig, today: NaiveDate) -> RetentionPlan {
    // ---
    let mut plan = RetentionPlan::default();

    for object in items {
        let timestamp = match derive_timestamp(dates, IntervalBucket::Hourly, &object) {
            Ok(ts) => ts,
            Err(e) => {
                warn!("Dropping hourly object '{}': {}", object.full_path, e);
                continue;
            }
        };

        // Compare day/month/year only, both sides in the configured offset.
        if timestamp.with_timezone(&dates.offset()).date_naive() == today {
            plan.retained.push(CatalogEntry { object, timestamp });
        } else {
            debug!("Hourly object '{}' expired ({})", object.full_path, timestamp);
            plan.expired.push(object);
        }
    }

    plan
}
