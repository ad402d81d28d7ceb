use std::f64::consts::{PI, TAU};

use crate::foundation::core::Point;

/// Probe angles around a placed circle, as multiples of π/7.
///
/// The interleaved order decides ties between equally distant probes.
const PROBE_STEPS: [u8; 14] = [0, 5, 10, 1, 6, 11, 2, 7, 12, 3, 8, 13, 4, 9];

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub id: String,
    pub radius: f64,
    pub center: Point,
}

impl Circle {
    pub fn new(id: impl Into<String>, radius: f64) -> Self {
        Self {
            id: id.into(),
            radius,
            center: Point::ORIGIN,
        }
    }
}

/// Radius that holds `count` photo circles of `photo_radius`.
pub fn group_radius(count: usize, photo_radius: f64, buffer: f64) -> f64 {
    if count <= 1 {
        return photo_radius + buffer;
    }
    let n = count as f64;
    let area = n * PI * photo_radius * photo_radius;
    let estimate = (area / PI).sqrt() + photo_radius + buffer;
    estimate.max(2.0 * photo_radius)
}

/// Greedy nearest-to-center packing.
///
/// The first circle sits at the origin. Each following circle tries the 14 probe
/// angles around every placed circle at tangent distance plus `buffer`, drops
/// probes that would violate the buffer against any placed circle, and keeps
/// the surviving probe closest to the origin.
pub fn pack_circles(circles: &[Circle], buffer: f64) -> Vec<Circle> {
    let mut packed: Vec<Circle> = Vec::with_capacity(circles.len());
    for c in circles {
        let center = if packed.is_empty() {
            Point::ORIGIN
        } else {
            best_probe(c.radius, &packed, buffer)
        };
        packed.push(Circle {
            center,
            ..c.clone()
        });
    }
    packed
}

fn best_probe(radius: f64, packed: &[Circle], buffer: f64) -> Point {
    let mut best: Option<(f64, Point)> = None;
    for existing in packed {
        let dist = existing.radius + radius + buffer;
        for step in PROBE_STEPS {
            let angle = f64::from(step) * PI / 7.0;
            let p = Point::new(
                existing.center.x + angle.cos() * dist,
                existing.center.y + angle.sin() * dist,
            );
            if conflicts(p, radius, packed, buffer) {
                continue;
            }
            let from_origin = p.to_vec2().hypot();
            if best.is_none_or(|(d, _)| from_origin < d) {
                best = Some((from_origin, p));
            }
        }
    }
    // Some hull probe is always free; stack past the farthest circle otherwise.
    best.map(|(_, p)| p).unwrap_or_else(|| {
        let far = packed
            .iter()
            .map(|c| c.center.to_vec2().hypot() + c.radius)
            .fold(0.0, f64::max);
        Point::new(far + radius + buffer, 0.0)
    })
}

fn conflicts(p: Point, radius: f64, packed: &[Circle], buffer: f64) -> bool {
    // Probes are tangent by construction, so allow rounding noise at the boundary.
    const EPS: f64 = 1e-6;
    packed
        .iter()
        .any(|o| p.distance(o.center) < radius + o.radius + buffer - EPS)
}

/// One angular slice of the surrounding ring.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupSlice {
    pub group_id: String,
    pub start_angle: f64,
    pub sweep: f64,
}

impl GroupSlice {
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    /// Angle of member `index` of `count`, spread evenly inside the slice.
    pub fn member_angle(&self, index: usize, count: usize) -> f64 {
        let count = count.max(1) as f64;
        self.start_angle + self.sweep * ((index as f64 + 0.5) / count)
    }
}

/// Partition the full circle into slices proportional to group sizes.
///
/// Slices are contiguous, in input order, and sum to exactly 2π.
pub fn calculate_group_slices(groups: &[(String, usize)]) -> Vec<GroupSlice> {
    let total: usize = groups.iter().map(|(_, n)| *n).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut slices = Vec::with_capacity(groups.len());
    let mut start = 0.0;
    for (i, (id, n)) in groups.iter().enumerate() {
        let sweep = if i + 1 == groups.len() {
            TAU - start
        } else {
            TAU * (*n as f64) / (total as f64)
        };
        slices.push(GroupSlice {
            group_id: id.clone(),
            start_angle: start,
            sweep,
        });
        start += sweep;
    }
    slices
}

#[cfg(test)]
#[path = "../../tests/unit/layout/packing.rs"]
mod tests;
