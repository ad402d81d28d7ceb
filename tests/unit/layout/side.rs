use super::*;
use crate::photo::metadata::PhotoMetadata;

fn evaluated(id: &str, ff: &str) -> PhotoData {
    let mut m = PhotoMetadata::new(id);
    m.author_id = Some(id.to_string());
    m.plausibility = Some(0.0);
    m.favorable_future = Some(ff.to_string());
    PhotoData::new(m)
}

#[test]
fn clusters_are_pushed_to_the_side_matching_their_rotation() {
    let photos = vec![evaluated("left", "prefer"), evaluated("right", "prevent")];
    let refs: Vec<&PhotoData> = photos.iter().collect();

    let mut inner = CirclePackingLayout::new(SideOpts::default().packing);
    let base = inner.calculate_all_positions(&refs).unwrap();

    let mut side = SideLayout::default();
    let out = side.calculate_all_positions(&refs).unwrap();

    let max_abs_x = base
        .iter()
        .flatten()
        .map(|p| p.x.abs())
        .fold(0.0, f64::max);
    let gap = 20000.0 + max_abs_x + 2000.0;
    assert!((side.current_gap() - gap).abs() < 1e-9);

    let l = out[0].as_ref().unwrap();
    let r = out[1].as_ref().unwrap();
    assert!((l.x - (base[0].as_ref().unwrap().x - gap)).abs() < 1e-9);
    assert!((r.x - (base[1].as_ref().unwrap().x + gap)).abs() < 1e-9);
    assert_eq!(l.annotations.render_order, base[0].as_ref().unwrap().annotations.render_order);
}

#[test]
fn incremental_placement_uses_fallback_gap_before_any_recompute() {
    let p = evaluated("solo", "prevent");
    let mut side = SideLayout::default();
    assert_eq!(side.current_gap(), 30000.0);
    let pos = side.position_for_photo(&p, &[]).unwrap().unwrap();
    assert!(pos.x > 29000.0);
    side.dispose();
    side.dispose();
}
