//! Measurement catalog: one pass over the object store that sorts every
//! object into its interval bucket.
//!
//! The root listing fans out into one listing task per recognised prefix.
//! Tasks finish in any order and report back through a single completion
//! queue ([`JoinSet`]); only the loop in [`build_catalog`] touches the bucket
//! containers, so there is no shared mutable state. Hourly listings go
//! through [`retention`], which may spawn delete tasks into the same queue;
//! the other buckets go through [`projector`].
//!
//! Nothing here fails the pass as a whole. A listing, parse or delete error
//! drops the affected item (or prefix) and is logged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::dates::DateConfig;
use crate::models::{CatalogEntry, IntervalBucket, ProjectedObject, RemoteObject};
use crate::store::ObjectStore;
use crate::Result;

pub mod projector;
pub mod retention;

// ---

/// Retained objects of every bucket.
///
/// Daily, weekly and monthly are oldest first. Hourly keeps listing order.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    pub hourly: Vec<CatalogEntry>,
    pub daily: Vec<CatalogEntry>,
    pub weekly: Vec<CatalogEntry>,
    pub monthly: Vec<CatalogEntry>,
}

impl Catalog {
    // ---
    pub fn bucket(&self, bucket: IntervalBucket) -> &[CatalogEntry] {
        match bucket {
            IntervalBucket::Hourly => &self.hourly,
            IntervalBucket::Daily => &self.daily,
            IntervalBucket::Weekly => &self.weekly,
            IntervalBucket::Monthly => &self.monthly,
        }
    }

    fn bucket_mut(&mut self, bucket: IntervalBucket) -> &mut Vec<CatalogEntry> {
        match bucket {
            IntervalBucket::Hourly => &mut self.hourly,
            IntervalBucket::Daily => &mut self.daily,
            IntervalBucket::Weekly => &mut self.weekly,
            IntervalBucket::Monthly => &mut self.monthly,
        }
    }

    /// Client-facing view of one bucket, with readable labels.
    pub fn project(&self, bucket: IntervalBucket, dates: &DateConfig) -> Vec<ProjectedObject> {
        // ---
        self.bucket(bucket)
            .iter()
            .map(|entry| ProjectedObject {
                interval: bucket,
                full_path: entry.object.full_path.clone(),
                name: entry.object.name.clone(),
                timestamp: entry.timestamp,
                label: dates.label(&entry.timestamp),
            })
            .collect()
    }
}

/// Completion messages fed back to the catalog loop.
enum CatalogEvent {
    Listed {
        bucket: IntervalBucket,
        result: Result<Vec<RemoteObject>>,
    },
    Deleted {
        object: RemoteObject,
        result: Result<()>,
    },
}

/// List the store, classify by prefix, prune stale hourly objects and
/// order the rest.
///
/// `now` fixes "today" for hourly retention. Returns once every listing and
/// every delete it started has settled.
pub async fn build_catalog(
    store: Arc<dyn ObjectStore>,
    dates: &DateConfig,
    now: DateTime<Utc>,
) -> Catalog {
    // ---
    let mut catalog = Catalog::default();

    let prefixes = match store.list_prefixes().await {
        Ok(prefixes) => prefixes,
        Err(e) => {
            error!("Failed to list storage root: {}", e);
            return catalog;
        }
    };

    let mut tasks: JoinSet<CatalogEvent> = JoinSet::new();

    for prefix in prefixes {
        let Some(bucket) = IntervalBucket::from_prefix(&prefix) else {
            warn!("Prefix of type '{}' was not added", prefix);
            continue;
        };

        let store = store.clone();
        tasks.spawn(async move {
            let result = store.list_items(&prefix).await;
            CatalogEvent::Listed { bucket, result }
        });
    }

    let today = dates.today(now);

    while let Some(joined) = tasks.join_next().await {
        let event = match joined {
            Ok(event) => event,
            Err(e) => {
                error!("Catalog task did not complete: {}", e);
                continue;
            }
        };

        match event {
            CatalogEvent::Listed { bucket, result: Err(e) } => {
                error!("Failed to list '{}': {}", bucket, e);
            }
            CatalogEvent::Listed {
                bucket: IntervalBucket::Hourly,
                result: Ok(items),
            } => {
                let plan = retention::plan(items, dates, today);
                debug!(
                    "Hourly listing: {} retained, {} expired",
                    plan.retained.len(),
                    plan.expired.len()
                );

                catalog.hourly.extend(plan.retained);

                for object in plan.expired {
                    let store = store.clone();
                    tasks.spawn(async move {
                        let result = store.delete(&object).await;
                        CatalogEvent::Deleted { object, result }
                    });
                }
            }
            CatalogEvent::Listed {
                bucket,
                result: Ok(items),
            } => {
                *catalog.bucket_mut(bucket) = projector::project(bucket, items, dates);
            }
            CatalogEvent::Deleted { object, result } => match result {
                Ok(()) => info!("Deleted expired hourly measurement '{}'", object.full_path),
                Err(e) => warn!(
                    "Could not delete expired hourly measurement '{}': {}",
                    object.full_path, e
                ),
            },
        }
    }

    info!(
        "Catalog built: hourly={} daily={} weekly={} monthly={}",
        catalog.hourly.len(),
        catalog.daily.len(),
        catalog.weekly.len(),
        catalog.monthly.len()
    );
    catalog
}
