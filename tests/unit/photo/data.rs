use super::*;
use crate::layout::{LayoutAnnotations, LayoutPosition};

#[test]
fn retarget_bumps_generation() {
    let mut p = PhotoData::new(PhotoMetadata::new("a"));
    let g0 = p.generation();
    let g1 = p.set_target(Position3D::on_plane(10.0, 0.0));
    assert_eq!(g1, g0 + 1);
    assert_eq!(p.current_position(), Position3D::ORIGIN);
    assert!(!p.is_at_target(0.1));
}

#[test]
fn layout_result_is_copied_onto_photo() {
    let mut p = PhotoData::new(PhotoMetadata::new("a"));
    let pos = LayoutPosition {
        x: 5.0,
        y: -3.0,
        grid_key: Some("1,0".into()),
        annotations: LayoutAnnotations {
            render_order: Some(12.5),
            cluster_rotation_deg: Some(-8.0),
            ..LayoutAnnotations::default()
        },
    };
    p.apply_layout(&pos);
    assert_eq!(p.target_position(), Position3D::on_plane(5.0, -3.0));
    assert_eq!(p.grid_key(), Some("1,0"));
    assert_eq!(p.annotations().render_order, Some(12.5));

    p.apply_hidden();
    assert_eq!(p.target_position(), Position3D::ORIGIN);
    assert_eq!(p.grid_key(), None);
}

#[test]
fn dispose_clears_properties() {
    let mut p = PhotoData::new(PhotoMetadata::new("a"));
    p.set_property(GROUP_ID_PROPERTY, serde_json::json!("xyz"));
    p.set_visual(Some(VisualHandle(3)));
    p.dispose();
    assert!(p.property(GROUP_ID_PROPERTY).is_none());
    assert!(p.visual().is_none());
}
