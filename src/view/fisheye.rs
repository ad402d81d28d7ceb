use std::collections::HashSet;

use crate::config::FisheyeConfig;
use crate::foundation::core::{Point, Vec2};

/// One visible photo as the lens sees it.
#[derive(Clone, Copy, Debug)]
pub struct LensItem<'a> {
    pub id: &'a str,
    /// Logical (unmagnified) center in world space.
    pub center: Point,
    /// Logical height in world units.
    pub height: f64,
    pub dragging: bool,
}

/// Presentation adjustment for one photo. The identity effect resets it.
#[derive(Clone, Debug, PartialEq)]
pub struct LensEffect {
    pub id: String,
    pub scale: f64,
    pub offset: Vec2,
    pub render_order: Option<i32>,
    pub shadow: bool,
}

impl LensEffect {
    pub fn identity(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scale: 1.0,
            offset: Vec2::ZERO,
            render_order: None,
            shadow: false,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == Vec2::ZERO && self.render_order.is_none() && !self.shadow
    }
}

/// `1 - (d/r)^3`, zero at and beyond the radius.
pub fn falloff(distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    1.0 - (distance / radius).powi(3)
}

/// Radial magnification around a focus point.
///
/// Tracks which photos it touched so that photos leaving the radius get an
/// explicit identity effect instead of keeping stale scale or offset.
#[derive(Clone, Debug)]
pub struct FisheyeLens {
    config: FisheyeConfig,
    affected: HashSet<String>,
}

impl FisheyeLens {
    pub fn new(config: FisheyeConfig) -> Self {
        Self {
            config,
            affected: HashSet::new(),
        }
    }

    pub fn config(&self) -> &FisheyeConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn affected_count(&self) -> usize {
        self.affected.len()
    }

    /// Scale at the focus point that gives a photo of `item_height` the configured
    /// on-screen height, whatever the current camera distance. Never below 1.
    pub fn target_scale(&self, item_height: f64, camera_distance: f64, fov_deg: f64) -> f64 {
        if item_height <= 0.0 || self.config.viewport_height_px <= 0.0 {
            return 1.0;
        }
        let visible_height = 2.0 * camera_distance * (fov_deg.to_radians() / 2.0).tan();
        let wanted = self.config.max_screen_height_px / self.config.viewport_height_px * visible_height;
        (wanted / item_height).max(1.0)
    }

    /// Effects for this frame. Only changed photos are reported: those inside the
    /// radius, dragged ones, and those that just left the radius.
    pub fn apply(
        &mut self,
        focus: Option<Point>,
        items: &[LensItem<'_>],
        camera_distance: f64,
        fov_deg: f64,
    ) -> Vec<LensEffect> {
        let radius = self.config.radius;
        let active = self.config.enabled;
        let mut out = Vec::new();
        let mut touched = HashSet::new();

        for item in items {
            if item.dragging {
                touched.insert(item.id.to_string());
                out.push(LensEffect {
                    shadow: true,
                    render_order: Some(i32::MAX),
                    ..LensEffect::identity(item.id)
                });
                continue;
            }
            let Some(focus) = focus.filter(|_| active) else {
                continue;
            };
            let d = item.center.distance(focus);
            if d > radius {
                continue;
            }
            let f = falloff(d, radius);
            let target = self.target_scale(item.height, camera_distance, fov_deg);
            let scale = 1.0 + (target - 1.0) * f;
            let offset = (item.center - focus) * (self.config.distortion * f);
            touched.insert(item.id.to_string());
            out.push(LensEffect {
                id: item.id.to_string(),
                scale,
                offset,
                render_order: Some((f * 1000.0).floor() as i32),
                shadow: false,
            });
        }

        let mut left: Vec<&String> = self.affected.difference(&touched).collect();
        left.sort();
        out.extend(left.into_iter().map(LensEffect::identity));
        self.affected = touched;
        out
    }

    /// Identity effects for everything currently magnified.
    pub fn reset(&mut self) -> Vec<LensEffect> {
        let mut ids: Vec<String> = self.affected.drain().collect();
        ids.sort();
        ids.into_iter().map(LensEffect::identity).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/fisheye.rs"]
mod tests;
