use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::foundation::core::{Point, Rect};
use crate::foundation::math::seeded_shuffle;
use crate::layout::region::document::{RegionGeometry, RegionShape};

/// Axis-aligned overlap of `new` with `existing`, as a percentage of `new`'s area.
pub fn overlap_percent(new: Rect, existing: Rect) -> f64 {
    let area = new.area();
    if area <= 0.0 {
        return 0.0;
    }
    let w = new.x1.min(existing.x1) - new.x0.max(existing.x0);
    let h = new.y1.min(existing.y1) - new.y0.max(existing.y0);
    if w <= 0.0 || h <= 0.0 {
        return 0.0;
    }
    (w * h / area * 100.0).clamp(0.0, 100.0)
}

/// Worst overlap of `rect` against every rect in `placed`.
pub fn max_overlap<'a, I>(rect: Rect, placed: I) -> f64
where
    I: IntoIterator<Item = &'a Rect>,
{
    placed
        .into_iter()
        .map(|p| overlap_percent(rect, *p))
        .fold(0.0, f64::max)
}

/// Candidate points inside `shape`, on a staggered grid, in a stable shuffled order.
pub fn generate_slots(shape: &RegionShape, step: f64) -> Vec<Point> {
    let bbox = shape.bbox;
    if step <= 0.0 || bbox.width() <= 0.0 || bbox.height() <= 0.0 {
        return Vec::new();
    }
    let mut slots = Vec::new();
    let mut row = 0usize;
    let mut y = bbox.y0 + step / 2.0;
    while y < bbox.y1 {
        let stagger = if row % 2 == 1 { step / 2.0 } else { 0.0 };
        let mut x = bbox.x0 + step / 2.0 + stagger;
        while x < bbox.x1 {
            let p = Point::new(x, y);
            if shape.contains(p) {
                slots.push(p);
            }
            x += step;
        }
        y += step;
        row += 1;
    }
    seeded_shuffle(&mut slots, &shape.id);
    slots
}

/// Shuffled slot lists, generated lazily and kept per region id.
#[derive(Clone, Debug, Default)]
pub struct SlotCache {
    step: f64,
    by_region: HashMap<String, Vec<Point>>,
}

impl SlotCache {
    pub fn new(step: f64) -> Self {
        Self {
            step,
            by_region: HashMap::new(),
        }
    }

    pub fn slots(&mut self, shape: &RegionShape) -> &[Point] {
        let step = self.step;
        self.by_region
            .entry(shape.id.clone())
            .or_insert_with(|| {
                let slots = generate_slots(shape, step);
                tracing::debug!(region = %shape.id, slots = slots.len(), "generated region slots");
                slots
            })
            .as_slice()
    }

    pub fn len(&self) -> usize {
        self.by_region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_region.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_region.clear();
    }
}

/// Bounds of the outward search used to resolve overlaps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingSearch {
    pub step: f64,
    pub directions: usize,
    pub max_radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingCandidate {
    pub point: Point,
    pub overlap: f64,
    pub displacement: f64,
    pub spacing: f64,
}

impl RingCandidate {
    fn better_than(&self, other: &Self) -> bool {
        const EPS: f64 = 1e-9;
        if (self.overlap - other.overlap).abs() > EPS {
            return self.overlap < other.overlap;
        }
        if (self.displacement - other.displacement).abs() > EPS {
            return self.displacement < other.displacement;
        }
        self.spacing > other.spacing
    }
}

fn spacing(p: Point, placed: &[Rect]) -> f64 {
    placed
        .iter()
        .map(|r| r.center().distance(p))
        .fold(f64::INFINITY, f64::min)
}

/// Whether a footprint centered at `p` covers any protected zone.
pub fn hits_header(geometry: &dyn RegionGeometry, footprint: (f64, f64), p: Point) -> bool {
    let rect = footprint_at(footprint, p);
    geometry
        .header_zones()
        .iter()
        .any(|h| h.intersect(rect).area() > 0.0)
}

pub fn footprint_at((w, h): (f64, f64), p: Point) -> Rect {
    Rect::new(p.x - w / 2.0, p.y - h / 2.0, p.x + w / 2.0, p.y + h / 2.0)
}

/// Search concentric rings around `origin` for the least-overlapping point still
/// inside `region_id`. Stops after the first ring that yields a clear spot.
pub fn ring_search(
    geometry: &dyn RegionGeometry,
    region_id: &str,
    origin: Point,
    footprint: (f64, f64),
    placed: &[Rect],
    search: RingSearch,
) -> Option<RingCandidate> {
    if search.step <= 0.0 || search.directions == 0 {
        return None;
    }
    let mut best: Option<RingCandidate> = None;
    let mut radius = search.step;
    while radius <= search.max_radius {
        for d in 0..search.directions {
            let angle = TAU * d as f64 / search.directions as f64;
            let p = Point::new(origin.x + radius * angle.cos(), origin.y + radius * angle.sin());
            if !geometry.contains_point(region_id, p) || hits_header(geometry, footprint, p) {
                continue;
            }
            let cand = RingCandidate {
                point: p,
                overlap: max_overlap(footprint_at(footprint, p), placed),
                displacement: radius,
                spacing: spacing(p, placed),
            };
            if best.is_none_or(|b| cand.better_than(&b)) {
                best = Some(cand);
            }
        }
        if best.is_some_and(|b| b.overlap <= 0.0) {
            break;
        }
        radius += search.step;
    }
    best
}

#[cfg(test)]
#[path = "../../../tests/unit/layout/region/slots.rs"]
mod tests;
