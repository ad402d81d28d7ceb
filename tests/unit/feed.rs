use super::*;

fn rec(id: &str, created_at: &str) -> PhotoMetadata {
    let mut m = PhotoMetadata::new(id);
    m.created_at = created_at.to_string();
    m
}

#[test]
fn first_snapshot_is_initial() {
    let mut t = IngestTracker::new();
    let b = t.ingest(vec![rec("a", "2024-01-01"), rec("b", "2024-01-02")]);
    assert_eq!(b.by_arrival(Arrival::Initial).len(), 2);
    assert!(b.by_arrival(Arrival::Incremental).is_empty());
    assert_eq!(t.watermark(), Some("2024-01-02"));
}

#[test]
fn newer_records_are_incremental_and_late_ones_quiet() {
    let mut t = IngestTracker::new();
    t.ingest(vec![rec("a", "2024-01-02")]);
    let b = t.ingest(vec![
        rec("a", "2024-01-02"),
        rec("new", "2024-01-03"),
        rec("late", "2024-01-01"),
    ]);
    assert_eq!(b.arrivals.len(), 2);
    assert!(b.arrivals.contains(&(Arrival::Incremental, rec("new", "2024-01-03"))));
    assert!(b.arrivals.contains(&(Arrival::Initial, rec("late", "2024-01-01"))));
    assert_eq!(t.watermark(), Some("2024-01-03"));
}

#[test]
fn duplicates_updates_and_removals() {
    let mut t = IngestTracker::new();
    t.ingest(vec![rec("a", "1"), rec("b", "1"), rec("c", "1")]);

    let mut changed = rec("b", "1");
    changed.plausibility = Some(50.0);
    let b = t.ingest(vec![rec("a", "1"), rec("a", "1"), changed.clone()]);
    assert!(b.arrivals.is_empty());
    assert_eq!(b.updated, vec![changed]);
    assert_eq!(b.removed, vec!["c".to_string()]);
    assert_eq!(t.known_count(), 2);

    assert!(t.ingest(vec![rec("a", "1"), {
        let mut m = rec("b", "1");
        m.plausibility = Some(50.0);
        m
    }])
    .is_empty());
}

#[test]
fn records_without_id_are_skipped() {
    let mut t = IngestTracker::new();
    let b = t.ingest(vec![rec("", "1")]);
    assert!(b.is_empty());
}

#[test]
fn replacement_patch_clears_missing_fields() {
    let mut m = rec("a", "1");
    m.plausibility = Some(25.0);
    let patch = replacement_patch(&m).unwrap();
    assert_eq!(patch["plausibility"], serde_json::json!(25.0));
    assert!(patch["favorable_future"].is_null());
    assert!(patch["layout_x"].is_null());

    let mut stored = rec("a", "1");
    stored.favorable_future = Some("prefer".into());
    stored.apply_patch(&patch).unwrap();
    assert_eq!(stored.favorable_future, None);
    assert_eq!(stored.plausibility, Some(25.0));
}

struct OnceFeed(Option<Vec<PhotoMetadata>>);

impl MetadataFeed for OnceFeed {
    fn fetch(&mut self) -> LocalBoxFuture<'_, ShowcaseResult<Vec<PhotoMetadata>>> {
        let out = self.0.take().unwrap_or_default();
        Box::pin(async move { Ok(out) })
    }
}

#[tokio::test]
async fn poll_reads_the_feed() {
    let mut feed = OnceFeed(Some(vec![rec("a", "1")]));
    let mut t = IngestTracker::new();
    let b = t.poll(&mut feed).await.unwrap();
    assert_eq!(b.arrivals.len(), 1);
    let b = t.poll(&mut feed).await.unwrap();
    assert_eq!(b.removed, vec!["a".to_string()]);
}
