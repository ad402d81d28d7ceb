//! Pull-based ingestion of photo records from the metadata source.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::foundation::core::LocalBoxFuture;
use crate::foundation::error::{ShowcaseError, ShowcaseResult};
use crate::photo::metadata::PhotoMetadata;

/// Source of the current photo set. Each fetch returns the full snapshot.
pub trait MetadataFeed {
    fn fetch(&mut self) -> LocalBoxFuture<'_, ShowcaseResult<Vec<PhotoMetadata>>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arrival {
    /// Part of the bulk load, or a late record older than the watermark: placed quietly.
    Initial,
    /// Newer than anything seen before: gets the spawn animation.
    Incremental,
}

/// Difference between the previous snapshot and the current one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestBatch {
    pub arrivals: Vec<(Arrival, PhotoMetadata)>,
    pub updated: Vec<PhotoMetadata>,
    pub removed: Vec<String>,
}

impl IngestBatch {
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    pub fn by_arrival(&self, kind: Arrival) -> Vec<PhotoMetadata> {
        self.arrivals
            .iter()
            .filter(|(a, _)| *a == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

/// Dedupes snapshots by id and tracks the `created_at` watermark.
#[derive(Debug, Default)]
pub struct IngestTracker {
    known: HashMap<String, PhotoMetadata>,
    watermark: Option<String>,
    primed: bool,
}

impl IngestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watermark(&self) -> Option<&str> {
        self.watermark.as_deref()
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    pub fn ingest(&mut self, records: Vec<PhotoMetadata>) -> IngestBatch {
        let mut batch = IngestBatch::default();
        let mut current: HashSet<String> = HashSet::new();
        let mut newest = self.watermark.clone();

        for record in records {
            if record.id.is_empty() {
                tracing::warn!("skipping photo record without id");
                continue;
            }
            if !current.insert(record.id.clone()) {
                continue;
            }
            if newest
                .as_deref()
                .is_none_or(|w| record.created_at.as_str() > w)
            {
                newest = Some(record.created_at.clone());
            }
            match self.known.get(&record.id) {
                Some(prev) if *prev == record => {}
                Some(_) => {
                    batch.updated.push(record.clone());
                    self.known.insert(record.id.clone(), record);
                }
                None => {
                    let newer = self
                        .watermark
                        .as_deref()
                        .is_none_or(|w| record.created_at.as_str() > w);
                    let arrival = if self.primed && newer {
                        Arrival::Incremental
                    } else {
                        Arrival::Initial
                    };
                    batch.arrivals.push((arrival, record.clone()));
                    self.known.insert(record.id.clone(), record);
                }
            }
        }

        let mut removed: Vec<String> = self
            .known
            .keys()
            .filter(|id| !current.contains(*id))
            .cloned()
            .collect();
        removed.sort();
        for id in &removed {
            self.known.remove(id);
        }
        batch.removed = removed;

        self.watermark = newest;
        self.primed = true;
        batch
    }

    #[tracing::instrument(skip(self, feed))]
    pub async fn poll<F: MetadataFeed + ?Sized>(&mut self, feed: &mut F) -> ShowcaseResult<IngestBatch> {
        let records = feed.fetch().await?;
        let batch = self.ingest(records);
        if !batch.is_empty() {
            tracing::info!(
                arrived = batch.arrivals.len(),
                updated = batch.updated.len(),
                removed = batch.removed.len(),
                watermark = self.watermark.as_deref().unwrap_or(""),
                "feed ingested"
            );
        }
        Ok(batch)
    }
}

/// Patch that turns a stored record into `record`, clearing fields it no longer has.
pub fn replacement_patch(record: &PhotoMetadata) -> ShowcaseResult<Map<String, Value>> {
    const CLEARABLE: [&str; 7] = [
        "author_id",
        "plausibility",
        "favorable_future",
        "transition_bar_position",
        "layout_x",
        "layout_y",
        "moderation_status",
    ];
    let mut map = match serde_json::to_value(record)? {
        Value::Object(m) => m,
        _ => return Err(ShowcaseError::serde("photo metadata is not an object")),
    };
    for key in CLEARABLE {
        map.entry(key).or_insert(Value::Null);
    }
    Ok(map)
}

#[cfg(test)]
#[path = "../tests/unit/feed.rs"]
mod tests;
