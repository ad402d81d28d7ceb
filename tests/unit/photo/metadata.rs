use super::*;
use serde_json::json;

fn evaluated(p: f64, ff: &str) -> PhotoMetadata {
    PhotoMetadata {
        plausibility: Some(p),
        favorable_future: Some(ff.to_string()),
        ..PhotoMetadata::new("p1")
    }
}

#[test]
fn favorable_text_folds_into_families() {
    assert_eq!(FavorableFuture::normalize("preferred"), FavorableFuture::Prefer);
    assert_eq!(FavorableFuture::normalize("yes"), FavorableFuture::Prefer);
    assert_eq!(FavorableFuture::normalize("Mostly Prefer"), FavorableFuture::Prefer);
    assert_eq!(FavorableFuture::normalize("no"), FavorableFuture::Prevent);
    assert_eq!(FavorableFuture::normalize("prevent"), FavorableFuture::Prevent);
    assert_eq!(FavorableFuture::normalize("uncertain"), FavorableFuture::Uncertain);
    assert_eq!(FavorableFuture::normalize(""), FavorableFuture::Unset);
}

#[test]
fn transition_bar_normalizes() {
    assert_eq!(TransitionBar::normalize("Before"), Some(TransitionBar::Before));
    assert_eq!(TransitionBar::normalize("after"), Some(TransitionBar::After));
    assert_eq!(TransitionBar::normalize("sideways"), Some(TransitionBar::Unclear));
    assert_eq!(TransitionBar::normalize("  "), None);
}

#[test]
fn plausibility_snaps_to_quarters() {
    assert_eq!(normalize_plausibility(0.0), Some(0));
    assert_eq!(normalize_plausibility(37.0), Some(25));
    assert_eq!(normalize_plausibility(63.0), Some(75));
    assert_eq!(normalize_plausibility(140.0), Some(100));
    assert_eq!(normalize_plausibility(-3.0), Some(0));
    assert_eq!(normalize_plausibility(f64::NAN), None);
}

#[test]
fn rotation_follows_evaluation() {
    assert_eq!(evaluated(100.0, "prevent").evaluation_rotation_deg(), Some(0.0));
    assert_eq!(evaluated(100.0, "prefer").evaluation_rotation_deg(), Some(0.0));
    assert_eq!(evaluated(100.0, "uncertain").evaluation_rotation_deg(), Some(0.0));
    assert_eq!(evaluated(0.0, "prevent").evaluation_rotation_deg(), Some(-32.0));
    assert_eq!(evaluated(0.0, "prefer").evaluation_rotation_deg(), Some(32.0));
    assert_eq!(evaluated(50.0, "prefer").evaluation_rotation_deg(), Some(16.0));
}

#[test]
fn missing_fields_fall_back_without_error() {
    let m = PhotoMetadata::new("abc");
    assert_eq!(m.evaluation_score(), 0.0);
    assert_eq!(m.evaluation_rotation_deg(), None);

    let r = m.fallback_rotation_deg();
    assert!(r.abs() <= FALLBACK_ROTATION_DEG);
    assert_eq!(r, PhotoMetadata::new("abc").fallback_rotation_deg());
}

#[test]
fn wire_format_accepts_aliases_and_keeps_extras() {
    let m: PhotoMetadata = serde_json::from_value(json!({
        "id": "x1",
        "url": "https://img/x1.jpg",
        "createdAt": "2025-01-01T00:00:00Z",
        "author_id": 42,
        "favorableFuture": "prefer",
        "layout_x": 0.5,
        "layout_y": -0.25,
        "moderation_status": 0,
        "screenshot_url": "https://img/x1-s.jpg"
    }))
    .unwrap();
    assert_eq!(m.author_id.as_deref(), Some("42"));
    assert_eq!(m.favorable(), FavorableFuture::Prefer);
    assert_eq!(m.layout_override(), Some((0.5, -0.25)));
    assert!(m.is_rejected());
    assert_eq!(m.extra["screenshot_url"], json!("https://img/x1-s.jpg"));
}

#[test]
fn numeric_fields_accept_strings_and_drop_garbage() {
    let m: PhotoMetadata =
        serde_json::from_str(r#"{"id":"a","plausibility":"50","moderation_status":"0"}"#).unwrap();
    assert_eq!(m.plausibility, Some(50.0));
    assert_eq!(m.plausibility_bucket(), Some(50));
    assert_eq!(m.moderation_status, Some(0));
    assert!(m.is_rejected());

    let m: PhotoMetadata =
        serde_json::from_str(r#"{"id":"b","plausibility":75,"moderationStatus":2}"#).unwrap();
    assert_eq!(m.plausibility, Some(75.0));
    assert_eq!(m.moderation_status, Some(2));

    let m: PhotoMetadata = serde_json::from_str(
        r#"{"id":"c","plausibility":"very","moderation_status":{"state":"ok"}}"#,
    )
    .unwrap();
    assert_eq!(m.plausibility, None);
    assert_eq!(m.moderation_status, None);
    assert!(!m.is_rejected());

    let m: PhotoMetadata =
        serde_json::from_str(r#"{"id":"d","plausibility":null,"moderation_status":" 1 "}"#).unwrap();
    assert_eq!(m.plausibility, None);
    assert_eq!(m.moderation_status, Some(1));
}

#[test]
fn patch_merges_and_clears() {
    let mut m = evaluated(50.0, "prefer");
    m.author_id = Some("a".into());
    let patch = json!({ "authorId": "b", "plausibility": null, "mood": "sunny" });
    m.apply_patch(patch.as_object().unwrap()).unwrap();
    assert_eq!(m.author_id.as_deref(), Some("b"));
    assert_eq!(m.plausibility, None);
    assert_eq!(m.favorable(), FavorableFuture::Prefer);
    assert_eq!(m.extra["mood"], json!("sunny"));
}

#[test]
fn patch_cannot_change_id() {
    let mut m = PhotoMetadata::new("keep");
    let patch = json!({ "id": "other" });
    assert!(m.apply_patch(patch.as_object().unwrap()).is_err());
    assert_eq!(m.id, "keep");
}
