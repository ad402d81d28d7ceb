use super::*;
use crate::photo::metadata::PhotoMetadata;

fn photo(id: &str, author: Option<&str>, eval: Option<(f64, &str)>) -> PhotoData {
    let mut m = PhotoMetadata::new(id);
    m.author_id = author.map(str::to_string);
    if let Some((p, ff)) = eval {
        m.plausibility = Some(p);
        m.favorable_future = Some(ff.to_string());
    }
    PhotoData::new(m)
}

fn layout_all(
    layout: &mut CirclePackingLayout,
    photos: &[PhotoData],
) -> Vec<Option<LayoutPosition>> {
    let refs: Vec<&PhotoData> = photos.iter().collect();
    layout.calculate_all_positions(&refs).unwrap()
}

#[test]
fn group_circles_never_violate_buffer() {
    let mut photos = Vec::new();
    for a in 0..6 {
        for i in 0..=a {
            photos.push(photo(&format!("a{a}-{i}"), Some(&format!("author{a}")), None));
        }
    }
    let mut layout = CirclePackingLayout::default();
    layout_all(&mut layout, &photos);

    let circles: Vec<&Circle> = layout.group_circles().collect();
    assert_eq!(circles.len(), 6);
    for (i, a) in circles.iter().enumerate() {
        for b in &circles[i + 1..] {
            let d = a.center.distance(b.center);
            assert!(d + 1e-6 >= a.radius + b.radius + layout.group_buffer());
        }
    }
}

#[test]
fn largest_group_is_packed_at_origin() {
    let photos = vec![
        photo("s", Some("solo"), None),
        photo("b1", Some("big"), None),
        photo("b2", Some("big"), None),
    ];
    let mut layout = CirclePackingLayout::default();
    layout_all(&mut layout, &photos);
    let big = layout
        .group_circles()
        .find(|c| c.id == "author:big")
        .unwrap();
    assert_eq!(big.center, Point::ORIGIN);
}

#[test]
fn members_sorted_by_evaluation_score_descending() {
    let photos = vec![
        photo("prevent0", Some("a"), Some((0.0, "prevent"))),
        photo("prefer0", Some("a"), Some((0.0, "prefer"))),
        photo("neutral", Some("a"), Some((100.0, "prefer"))),
    ];
    let mut layout = CirclePackingLayout::default();
    let out = layout_all(&mut layout, &photos);

    assert_eq!(
        layout.group_members("author:a").unwrap(),
        ["prefer0", "neutral", "prevent0"]
    );
    let x = |i: usize| out[i].as_ref().unwrap().x;
    assert!(x(1) < x(2) && x(2) < x(0), "prefer is leftmost");
}

#[test]
fn fan_geometry_for_evaluated_members() {
    let photos = vec![
        photo("prefer0", Some("a"), Some((0.0, "prefer"))),
        photo("prevent0", Some("a"), Some((0.0, "prevent"))),
    ];
    let mut layout = CirclePackingLayout::default();
    let out = layout_all(&mut layout, &photos);
    let left = out[0].as_ref().unwrap();
    let right = out[1].as_ref().unwrap();

    assert_eq!(left.annotations.cluster_rotation_deg, Some(32.0));
    assert_eq!(right.annotations.cluster_rotation_deg, Some(-32.0));
    // Full rotation dips by the whole arc depth; the group sits at the origin.
    assert!((left.y + 200.0).abs() < 1e-9);
    assert!((right.x - left.x - 0.65 * 530.0).abs() < 1e-9);
    assert!((left.x + right.x).abs() < 1e-9);
    // Negative rotation stacks on top.
    assert!(right.annotations.render_order > left.annotations.render_order);
    assert_eq!(left.annotations.render_order, Some(0.0));
    assert_eq!(right.annotations.render_order, Some(64.0 * 1.5625 + 0.001));
}

#[test]
fn unevaluated_members_spread_by_index() {
    let photos: Vec<PhotoData> = (0..10)
        .map(|i| photo(&format!("p{i}"), Some("a"), None))
        .collect();
    let mut layout = CirclePackingLayout::default();
    let out = layout_all(&mut layout, &photos);
    let rot = |i: usize| out[i].as_ref().unwrap().annotations.cluster_rotation_deg.unwrap();
    assert!((rot(0) - 32.0).abs() < 1e-9);
    assert!((rot(9) + 32.0).abs() < 1e-9);
    assert!((fan_range_deg(1) - 10.4).abs() < 1e-9);
    assert_eq!(fan_range_deg(25), 32.0);
}

#[test]
fn singleton_without_evaluation_uses_stable_fallback_rotation() {
    let photos = vec![photo("lonely", None, None)];
    let mut layout = CirclePackingLayout::default();
    let a = layout_all(&mut layout, &photos);
    let b = layout_all(&mut layout, &photos);
    assert_eq!(a, b);
    let rot = a[0].as_ref().unwrap().annotations.cluster_rotation_deg.unwrap();
    assert!(rot.abs() <= 4.0);
}

#[test]
fn regrouping_reports_both_old_and_new_group() {
    let mut photos = vec![
        photo("a1", Some("a"), None),
        photo("a2", Some("a"), None),
        photo("b1", Some("b"), None),
    ];
    let mut layout = CirclePackingLayout::default();
    layout_all(&mut layout, &photos);

    photos[1].metadata_mut().author_id = Some("b".into());
    let refs: Vec<&PhotoData> = photos.iter().collect();
    let mut affected = layout.on_metadata_changed(&photos[1], &refs);
    affected.sort();
    assert_eq!(affected, ["a1", "a2", "b1"]);
    assert_eq!(layout.group_members("author:b").unwrap().len(), 2);
}

#[test]
fn removal_shrinks_group() {
    let photos = vec![photo("a1", Some("a"), None), photo("a2", Some("a"), None)];
    let mut layout = CirclePackingLayout::default();
    layout_all(&mut layout, &photos);
    layout.remove_photo("a1");
    assert_eq!(layout.group_members("author:a").unwrap(), ["a2"]);
    layout.remove_photo("a2");
    assert!(layout.group_members("author:a").is_none());
    assert!(layout.requires_full_recalculation());
}
