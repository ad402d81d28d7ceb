use super::*;

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1000" height="500" viewBox="0 0 1000 500">
  <rect id="header-title" x="0" y="0" width="1000" height="50" fill="black"/>
  <rect id="p=25,ff=prefer" x="100" y="100" width="200" height="200" fill="red"/>
  <g id="p=75,ff=prevent">
    <rect x="600" y="100" width="100" height="100" fill="blue"/>
    <rect x="800" y="300" width="100" height="100" fill="blue"/>
  </g>
  <g id="decoration">
    <path id="tb=after" d="M 400 400 L 500 400 L 500 480 L 400 480 Z" fill="green"/>
  </g>
  <circle id="unrelated" cx="50" cy="450" r="20"/>
</svg>"#;

#[test]
fn polygon_contains_uses_outline_not_bbox() {
    let tri = RegionShape::polygon("t", &[(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
    assert!(tri.is_precise());
    assert!(tri.contains(Point::new(10.0, 10.0)));
    // inside the bbox, outside the triangle
    assert!(!tri.contains(Point::new(90.0, 90.0)));
    assert!(!tri.contains(Point::new(-1.0, 5.0)));
}

#[test]
fn bbox_shape_falls_back_to_rect_containment() {
    let s = RegionShape::from_bbox("b", Rect::new(0.0, 0.0, 10.0, 10.0));
    assert!(!s.is_precise());
    assert!(s.contains(Point::new(9.0, 9.0)));
    assert!(!s.contains(Point::new(11.0, 9.0)));
}

#[test]
fn even_odd_rule_leaves_holes() {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((100.0, 0.0));
    path.line_to((100.0, 100.0));
    path.line_to((0.0, 100.0));
    path.close_path();
    path.move_to((25.0, 25.0));
    path.line_to((75.0, 25.0));
    path.line_to((75.0, 75.0));
    path.line_to((25.0, 75.0));
    path.close_path();

    let eo = RegionShape::from_outline("eo", path.clone(), FillRule::EvenOdd);
    let nz = RegionShape::from_outline("nz", path, FillRule::NonZero);
    let hole = Point::new(50.0, 50.0);
    assert!(!eo.contains(hole));
    assert!(nz.contains(hole));
    assert!(eo.contains(Point::new(10.0, 10.0)));
}

#[test]
fn polygon_regions_answer_trait_queries() {
    let doc = PolygonRegions::new(Rect::new(0.0, 0.0, 100.0, 100.0))
        .with_polygon("p=25", &[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0), (0.0, 50.0)])
        .with_header(Rect::new(0.0, 90.0, 100.0, 100.0));
    assert_eq!(doc.shapes().len(), 1);
    assert!(doc.contains_point("p=25", Point::new(25.0, 25.0)));
    assert!(!doc.contains_point("missing", Point::new(25.0, 25.0)));
    assert_eq!(doc.bounding_box("p=25"), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
    assert_eq!(doc.header_zones().len(), 1);
}

#[test]
fn svg_document_discovers_regions_and_headers() {
    let doc = SvgRegionDocument::from_data(SVG.as_bytes()).unwrap();
    assert_eq!(doc.view_box(), Rect::new(0.0, 0.0, 1000.0, 500.0));

    let ids: Vec<&str> = doc.shapes().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["p=25,ff=prefer", "p=75,ff=prevent", "tb=after"]);
    assert_eq!(doc.header_zones().len(), 1);

    assert!(doc.contains_point("p=25,ff=prefer", Point::new(150.0, 150.0)));
    assert!(!doc.contains_point("p=25,ff=prefer", Point::new(350.0, 150.0)));

    // group region is the union of its two squares, not their bbox
    assert!(doc.contains_point("p=75,ff=prevent", Point::new(650.0, 150.0)));
    assert!(doc.contains_point("p=75,ff=prevent", Point::new(850.0, 350.0)));
    assert!(!doc.contains_point("p=75,ff=prevent", Point::new(750.0, 250.0)));
}

#[test]
fn svg_without_regions_is_a_geometry_error() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect id="plain" width="5" height="5"/></svg>"#;
    let err = SvgRegionDocument::from_data(svg.as_bytes()).unwrap_err();
    assert!(matches!(err, ShowcaseError::Geometry(_)));
}

#[test]
fn malformed_svg_is_reported() {
    assert!(SvgRegionDocument::from_data(b"not svg").is_err());
}
