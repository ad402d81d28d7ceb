use std::path::Path;

use anyhow::Context as _;
use kurbo::Shape as _;

use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::{ShowcaseError, ShowcaseResult};
use crate::layout::region::descriptor::RegionDescriptor;

/// Prefix of element ids that mark protected header zones.
pub const HEADER_ID_PREFIX: &str = "header";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// Hit-test geometry of one region, in document units.
#[derive(Clone, Debug)]
pub struct RegionShape {
    pub id: String,
    pub bbox: Rect,
    outline: Option<BezPath>,
    fill_rule: FillRule,
}

impl RegionShape {
    /// Precise shape. An outline without segments degrades to its bounding box.
    pub fn from_outline(id: impl Into<String>, outline: BezPath, fill_rule: FillRule) -> Self {
        let id = id.into();
        if outline.elements().is_empty() {
            tracing::warn!(region = %id, "region outline is empty; hit-testing disabled");
            return Self::from_bbox(id, Rect::ZERO);
        }
        let bbox = outline.bounding_box();
        Self {
            id,
            bbox,
            outline: Some(outline),
            fill_rule,
        }
    }

    /// Bounding-box-only shape, used when no outline geometry is available.
    pub fn from_bbox(id: impl Into<String>, bbox: Rect) -> Self {
        Self {
            id: id.into(),
            bbox,
            outline: None,
            fill_rule: FillRule::NonZero,
        }
    }

    pub fn polygon(id: impl Into<String>, points: &[(f64, f64)]) -> Self {
        let mut path = BezPath::new();
        for (i, &(x, y)) in points.iter().enumerate() {
            if i == 0 {
                path.move_to((x, y));
            } else {
                path.line_to((x, y));
            }
        }
        path.close_path();
        Self::from_outline(id, path, FillRule::NonZero)
    }

    pub fn is_precise(&self) -> bool {
        self.outline.is_some()
    }

    /// Point-in-fill, or bounding-box containment for imprecise shapes.
    pub fn contains(&self, p: Point) -> bool {
        if !self.bbox.contains(p) {
            return false;
        }
        match &self.outline {
            Some(path) => {
                let w = path.winding(p);
                match self.fill_rule {
                    FillRule::NonZero => w != 0,
                    FillRule::EvenOdd => w % 2 != 0,
                }
            }
            None => true,
        }
    }
}

/// Geometry queries the region strategy needs from a vector illustration.
pub trait RegionGeometry {
    /// Document-space extent of the illustration.
    fn view_box(&self) -> Rect;

    /// Candidate regions in document (paint) order.
    fn shapes(&self) -> &[RegionShape];

    /// Zones photos must not cover, such as titles.
    fn header_zones(&self) -> &[Rect] {
        &[]
    }

    fn contains_point(&self, shape_id: &str, p: Point) -> bool {
        self.shapes()
            .iter()
            .find(|s| s.id == shape_id)
            .is_some_and(|s| s.contains(p))
    }

    fn bounding_box(&self, shape_id: &str) -> Option<Rect> {
        self.shapes().iter().find(|s| s.id == shape_id).map(|s| s.bbox)
    }
}

/// Programmatic regions; useful when no illustration file is involved.
#[derive(Clone, Debug)]
pub struct PolygonRegions {
    view_box: Rect,
    shapes: Vec<RegionShape>,
    headers: Vec<Rect>,
}

impl PolygonRegions {
    pub fn new(view_box: Rect) -> Self {
        Self {
            view_box,
            shapes: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn with_shape(mut self, shape: RegionShape) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn with_polygon(self, id: &str, points: &[(f64, f64)]) -> Self {
        self.with_shape(RegionShape::polygon(id, points))
    }

    pub fn with_header(mut self, zone: Rect) -> Self {
        self.headers.push(zone);
        self
    }
}

impl RegionGeometry for PolygonRegions {
    fn view_box(&self) -> Rect {
        self.view_box
    }

    fn shapes(&self) -> &[RegionShape] {
        &self.shapes
    }

    fn header_zones(&self) -> &[Rect] {
        &self.headers
    }
}

/// Regions discovered in an SVG illustration parsed with `usvg`.
///
/// Every path or group whose id parses as a [`RegionDescriptor`] becomes a
/// region; groups contribute the union of their descendant paths.
#[derive(Clone, Debug)]
pub struct SvgRegionDocument {
    view_box: Rect,
    shapes: Vec<RegionShape>,
    headers: Vec<Rect>,
}

impl SvgRegionDocument {
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_data(bytes: &[u8]) -> ShowcaseResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
        let size = tree.size();
        let view_box = Rect::new(0.0, 0.0, f64::from(size.width()), f64::from(size.height()));

        let mut doc = Self {
            view_box,
            shapes: Vec::new(),
            headers: Vec::new(),
        };
        doc.collect(tree.root());
        if doc.shapes.is_empty() {
            return Err(ShowcaseError::geometry(
                "illustration has no element ids of the form key=value",
            ));
        }
        tracing::info!(regions = doc.shapes.len(), headers = doc.headers.len(), "illustration loaded");
        Ok(doc)
    }

    pub fn from_path(path: &Path) -> ShowcaseResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read illustration '{}'", path.display()))?;
        Self::from_data(&bytes)
    }

    fn collect(&mut self, group: &usvg::Group) {
        for child in group.children() {
            match child {
                usvg::Node::Group(g) => {
                    if RegionDescriptor::parse(g.id()).is_some() {
                        let mut outline = BezPath::new();
                        let mut rule = FillRule::NonZero;
                        append_group_paths(g, &mut outline, &mut rule);
                        if outline.elements().is_empty() {
                            tracing::warn!(region = g.id(), "group region has no paths; using bounding box");
                            self.shapes
                                .push(RegionShape::from_bbox(g.id(), to_rect(g.abs_bounding_box())));
                        } else {
                            self.shapes.push(RegionShape::from_outline(g.id(), outline, rule));
                        }
                    } else if g.id().starts_with(HEADER_ID_PREFIX) {
                        self.headers.push(to_rect(g.abs_bounding_box()));
                    } else {
                        self.collect(g);
                    }
                }
                usvg::Node::Path(p) => {
                    if RegionDescriptor::parse(p.id()).is_some() {
                        let (outline, rule) = path_outline(p);
                        if outline.elements().is_empty() {
                            tracing::warn!(region = p.id(), "path region is empty; using bounding box");
                            self.shapes
                                .push(RegionShape::from_bbox(p.id(), to_rect(p.abs_bounding_box())));
                        } else {
                            self.shapes.push(RegionShape::from_outline(p.id(), outline, rule));
                        }
                    } else if p.id().starts_with(HEADER_ID_PREFIX) {
                        self.headers.push(to_rect(p.abs_bounding_box()));
                    }
                }
                _ => {}
            }
        }
    }
}

impl RegionGeometry for SvgRegionDocument {
    fn view_box(&self) -> Rect {
        self.view_box
    }

    fn shapes(&self) -> &[RegionShape] {
        &self.shapes
    }

    fn header_zones(&self) -> &[Rect] {
        &self.headers
    }
}

fn to_rect(r: usvg::Rect) -> Rect {
    Rect::new(
        f64::from(r.left()),
        f64::from(r.top()),
        f64::from(r.right()),
        f64::from(r.bottom()),
    )
}

fn append_group_paths(group: &usvg::Group, out: &mut BezPath, rule: &mut FillRule) {
    for child in group.children() {
        match child {
            usvg::Node::Group(g) => append_group_paths(g, out, rule),
            usvg::Node::Path(p) => {
                let (outline, r) = path_outline(p);
                *rule = r;
                for el in outline.elements() {
                    out.push(*el);
                }
            }
            _ => {}
        }
    }
}

/// Convert a usvg path into document space with its absolute transform applied.
fn path_outline(p: &usvg::Path) -> (BezPath, FillRule) {
    use usvg::tiny_skia_path::PathSegment;

    let pt = |q: usvg::tiny_skia_path::Point| Point::new(f64::from(q.x), f64::from(q.y));
    let mut path = BezPath::new();
    for seg in p.data().segments() {
        match seg {
            PathSegment::MoveTo(a) => path.move_to(pt(a)),
            PathSegment::LineTo(a) => path.line_to(pt(a)),
            PathSegment::QuadTo(a, b) => path.quad_to(pt(a), pt(b)),
            PathSegment::CubicTo(a, b, c) => path.curve_to(pt(a), pt(b), pt(c)),
            PathSegment::Close => path.close_path(),
        }
    }

    let ts = p.abs_transform();
    let affine = Affine::new([
        f64::from(ts.sx),
        f64::from(ts.ky),
        f64::from(ts.kx),
        f64::from(ts.sy),
        f64::from(ts.tx),
        f64::from(ts.ty),
    ]);
    path.apply_affine(affine);

    let rule = match p.fill().map(usvg::Fill::rule) {
        Some(usvg::FillRule::EvenOdd) => FillRule::EvenOdd,
        _ => FillRule::NonZero,
    };
    (path, rule)
}

#[cfg(test)]
#[path = "../../../tests/unit/layout/region/document.rs"]
mod tests;
