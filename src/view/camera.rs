use crate::config::CameraOpts;
use crate::foundation::core::{Point, Position3D, SceneBounds};

/// Inflation applied to every fitted distance.
pub const FIT_SAFETY_FACTOR: f64 = 1.1;

/// Camera distance along the view axis that frames `bounds` plus `margin` on each side.
///
/// Width and height are fitted independently (width through the horizontal FOV
/// derived from `aspect`) and the larger distance wins.
pub fn compute_fit_distance(
    bounds: SceneBounds,
    vertical_fov_deg: f64,
    aspect: f64,
    margin: f64,
) -> f64 {
    let half_w = (bounds.width().max(0.0) + 2.0 * margin) / 2.0;
    let half_h = (bounds.height().max(0.0) + 2.0 * margin) / 2.0;

    let half_v = (vertical_fov_deg.to_radians() / 2.0).tan();
    let half_hfov = (2.0 * (half_v * aspect).atan() / 2.0).tan();

    let by_width = half_w / half_hfov;
    let by_height = half_h / half_v;
    by_width.max(by_height) * FIT_SAFETY_FACTOR
}

/// Where the camera looks and how far back it sits.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraState {
    pub target: Point,
    pub distance: f64,
}

impl CameraState {
    pub fn new(distance: f64) -> Self {
        Self {
            target: Point::ZERO,
            distance,
        }
    }

    pub fn fit(bounds: SceneBounds, opts: &CameraOpts) -> Self {
        Self {
            target: bounds.center(),
            distance: compute_fit_distance(bounds, opts.fov_deg, opts.aspect, opts.margin),
        }
    }

    pub fn position(&self) -> Position3D {
        Position3D::new(self.target.x, self.target.y, self.distance)
    }

    /// Point on the view axis, `offset` units in front of the camera.
    pub fn point_in_front(&self, offset: f64) -> Position3D {
        Position3D::new(self.target.x, self.target.y, self.distance - offset)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/camera.rs"]
mod tests;
