use super::*;
use crate::layout::region::document::PolygonRegions;

fn square(cx: f64, cy: f64, side: f64) -> Rect {
    Rect::new(cx - side / 2.0, cy - side / 2.0, cx + side / 2.0, cy + side / 2.0)
}

#[test]
fn overlap_percent_boundaries() {
    let a = square(0.0, 0.0, 120.0);
    assert_eq!(overlap_percent(a, square(500.0, 0.0, 120.0)), 0.0);
    assert!((overlap_percent(a, a) - 100.0).abs() < 1e-9);
    assert!((overlap_percent(a, square(60.0, 0.0, 120.0)) - 50.0).abs() < 1e-9);
    // touching edges do not overlap
    assert_eq!(overlap_percent(a, square(120.0, 0.0, 120.0)), 0.0);
}

#[test]
fn overlap_is_relative_to_the_new_rect() {
    let small = square(0.0, 0.0, 10.0);
    let big = square(0.0, 0.0, 100.0);
    assert!((overlap_percent(small, big) - 100.0).abs() < 1e-9);
    assert!((overlap_percent(big, small) - 1.0).abs() < 1e-9);
    assert!((max_overlap(small, &[square(500.0, 0.0, 1.0), big]) - 100.0).abs() < 1e-9);
}

#[test]
fn slots_stay_inside_the_shape_and_are_stable() {
    let tri = RegionShape::polygon("p=50", &[(0.0, 0.0), (300.0, 0.0), (0.0, 300.0)]);
    let a = generate_slots(&tri, 15.0);
    let b = generate_slots(&tri, 15.0);
    assert!(!a.is_empty());
    assert_eq!(a, b);
    assert!(a.iter().all(|p| tri.contains(*p)));

    let mut sorted = a.clone();
    sorted.sort_by(|p, q| p.y.total_cmp(&q.y).then(p.x.total_cmp(&q.x)));
    assert_ne!(a, sorted, "order should not be grid-like");
}

#[test]
fn alternate_rows_are_staggered() {
    let rect = RegionShape::polygon("r=1", &[(0.0, 0.0), (60.0, 0.0), (60.0, 30.0), (0.0, 30.0)]);
    let slots = generate_slots(&rect, 15.0);
    let row0: Vec<f64> = slots.iter().filter(|p| p.y < 15.0).map(|p| p.x).collect();
    let row1: Vec<f64> = slots.iter().filter(|p| p.y > 15.0).map(|p| p.x).collect();
    assert!(row0.iter().any(|x| (x - 7.5).abs() < 1e-9));
    assert!(row1.iter().all(|x| ((x - 15.0) / 15.0).fract().abs() < 1e-9));
}

#[test]
fn slot_cache_generates_once_per_region() {
    let shape = RegionShape::polygon("p=0", &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
    let mut cache = SlotCache::new(15.0);
    let first = cache.slots(&shape).to_vec();
    assert_eq!(cache.slots(&shape), first.as_slice());
    assert_eq!(cache.len(), 1);
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn ring_search_finds_clear_spot_inside_region() {
    let doc = PolygonRegions::new(Rect::new(0.0, 0.0, 400.0, 400.0)).with_polygon(
        "p=25",
        &[(0.0, 0.0), (400.0, 0.0), (400.0, 400.0), (0.0, 400.0)],
    );
    let placed = [square(200.0, 200.0, 20.0)];
    let search = RingSearch {
        step: 5.0,
        directions: 16,
        max_radius: 100.0,
    };
    let found = ring_search(&doc, "p=25", Point::new(200.0, 200.0), (20.0, 20.0), &placed, search)
        .unwrap();
    assert_eq!(found.overlap, 0.0);
    assert!(found.displacement >= 20.0 && found.displacement <= 30.0);
    assert!(doc.contains_point("p=25", found.point));
}

#[test]
fn ring_search_respects_headers_and_region() {
    let doc = PolygonRegions::new(Rect::new(0.0, 0.0, 100.0, 100.0))
        .with_polygon("p=75", &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)])
        .with_header(Rect::new(0.0, 0.0, 100.0, 40.0));
    let search = RingSearch {
        step: 10.0,
        directions: 16,
        max_radius: 60.0,
    };
    let placed = [square(50.0, 60.0, 10.0)];
    let found = ring_search(&doc, "p=75", Point::new(50.0, 60.0), (10.0, 10.0), &placed, search)
        .unwrap();
    assert!(!hits_header(&doc, (10.0, 10.0), found.point));
    assert!(found.point.y > 45.0);

    assert!(ring_search(&doc, "missing", Point::new(50.0, 60.0), (10.0, 10.0), &placed, search).is_none());
}
