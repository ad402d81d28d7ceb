use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::animation::ease::Ease;
use crate::foundation::error::{ShowcaseError, ShowcaseResult};
use crate::layout::circle_packing::CirclePackingOpts;
use crate::layout::embedding::EmbeddingOpts;
use crate::layout::grid::GridOpts;
use crate::layout::region::RegionOpts;
use crate::layout::side::SideOpts;

/// World-space photo card size and grid spacing.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhotoDims {
    pub width: f64,
    pub height: f64,
    pub spacing_x: f64,
    pub spacing_y: f64,
}

impl Default for PhotoDims {
    fn default() -> Self {
        Self {
            width: 530.0,
            height: 1000.0,
            spacing_x: 250.0,
            spacing_y: 30.0,
        }
    }
}

/// Durations of every animation the repository runs, in milliseconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationTimings {
    pub layout_transition_ms: u64,
    pub new_photo_float_ms: u64,
    pub spawn_delay_ms: u64,
    pub showcase_forward_ms: u64,
    pub showcase_return_ms: u64,
    /// Defaults to `min(spawn_delay_ms, 2000)`.
    pub showcase_pause_ms: Option<u64>,
    pub showcase_interval_ms: u64,
    pub bounds_debounce_ms: u64,
    pub invisible_transition_ms: u64,
    pub frame_interval_ms: u64,
    pub ease: Ease,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            layout_transition_ms: 5000,
            new_photo_float_ms: 800,
            spawn_delay_ms: 3000,
            showcase_forward_ms: 600,
            showcase_return_ms: 600,
            showcase_pause_ms: None,
            showcase_interval_ms: 5000,
            bounds_debounce_ms: 100,
            invisible_transition_ms: 600,
            frame_interval_ms: 16,
            ease: Ease::OutCubic,
        }
    }
}

impl AnimationTimings {
    pub fn layout_transition(&self) -> Duration {
        Duration::from_millis(self.layout_transition_ms)
    }

    pub fn new_photo_float(&self) -> Duration {
        Duration::from_millis(self.new_photo_float_ms)
    }

    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }

    pub fn showcase_forward(&self) -> Duration {
        Duration::from_millis(self.showcase_forward_ms)
    }

    pub fn showcase_return(&self) -> Duration {
        Duration::from_millis(self.showcase_return_ms)
    }

    pub fn showcase_pause(&self) -> Duration {
        Duration::from_millis(
            self.showcase_pause_ms
                .unwrap_or_else(|| self.spawn_delay_ms.min(2000)),
        )
    }

    pub fn showcase_interval(&self) -> Duration {
        Duration::from_millis(self.showcase_interval_ms)
    }

    pub fn bounds_debounce(&self) -> Duration {
        Duration::from_millis(self.bounds_debounce_ms)
    }

    pub fn invisible_transition(&self) -> Duration {
        Duration::from_millis(self.invisible_transition_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraOpts {
    /// Vertical field of view in degrees.
    pub fov_deg: f64,
    pub aspect: f64,
    /// World-space padding added on every side of the framed bounds.
    pub margin: f64,
    /// Distance in front of the camera where new photos appear.
    pub spawn_offset: f64,
    /// Distance in front of the camera a showcased photo travels to.
    pub showcase_offset: f64,
    /// Camera distance used before any bounds are known.
    pub initial_distance: f64,
}

impl Default for CameraOpts {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            aspect: 1.78,
            margin: 120.0,
            spawn_offset: 700.0,
            showcase_offset: 1500.0,
            initial_distance: 5000.0,
        }
    }
}

/// Hover magnification settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FisheyeConfig {
    pub enabled: bool,
    /// World-space radius of the effect around the focus point.
    pub radius: f64,
    /// On-screen height a photo at the focus point grows to, in pixels.
    pub max_screen_height_px: f64,
    pub viewport_height_px: f64,
    /// Radial push-out as a fraction of the distance to the focus.
    pub distortion: f64,
}

impl Default for FisheyeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 800.0,
            max_screen_height_px: 420.0,
            viewport_height_px: 1080.0,
            distortion: 0.3,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RepositoryOpts {
    pub enable_random_showcase: bool,
    pub showcase_seed: u64,
}

/// Everything the engine can be tuned with. Every field is optional in JSON.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub photo: PhotoDims,
    pub timings: AnimationTimings,
    pub camera: CameraOpts,
    pub fisheye: FisheyeConfig,
    pub repository: RepositoryOpts,
    pub grid: GridOpts,
    pub circle_packing: CirclePackingOpts,
    pub side: SideOpts,
    pub region: RegionOpts,
    pub embedding: EmbeddingOpts,
}

impl ShowcaseConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> ShowcaseResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| ShowcaseError::validation(format!("parse showcase config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ShowcaseResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ShowcaseError::validation(format!("open showcase config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> ShowcaseResult<()> {
        let p = &self.photo;
        for (name, v) in [("photo.width", p.width), ("photo.height", p.height)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ShowcaseError::validation(format!("{name} must be positive, got {v}")));
            }
        }
        for (name, v) in [
            ("photo.spacing_x", p.spacing_x),
            ("photo.spacing_y", p.spacing_y),
            ("camera.margin", self.camera.margin),
            ("camera.spawn_offset", self.camera.spawn_offset),
            ("fisheye.distortion", self.fisheye.distortion),
        ] {
            if !v.is_finite() {
                return Err(ShowcaseError::validation(format!("{name} must be finite")));
            }
        }
        let fov = self.camera.fov_deg;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ShowcaseError::validation(format!(
                "camera.fov_deg must be in (0, 180), got {fov}"
            )));
        }
        if !(self.camera.aspect.is_finite() && self.camera.aspect > 0.0) {
            return Err(ShowcaseError::validation("camera.aspect must be positive"));
        }
        if !(self.fisheye.radius.is_finite() && self.fisheye.radius > 0.0) {
            return Err(ShowcaseError::validation("fisheye.radius must be positive"));
        }
        if !(self.fisheye.viewport_height_px > 0.0) {
            return Err(ShowcaseError::validation(
                "fisheye.viewport_height_px must be positive",
            ));
        }
        Ok(())
    }

    /// Grid options with the shared photo dimensions applied.
    pub fn grid_opts(&self) -> GridOpts {
        GridOpts {
            photo_width: self.photo.width,
            photo_height: self.photo.height,
            spacing_x: self.photo.spacing_x,
            spacing_y: self.photo.spacing_y,
            ..self.grid.clone()
        }
    }

    pub fn circle_packing_opts(&self) -> CirclePackingOpts {
        CirclePackingOpts {
            photo_width: self.photo.width,
            photo_height: self.photo.height,
            ..self.circle_packing.clone()
        }
    }

    pub fn side_opts(&self) -> SideOpts {
        let mut side = self.side.clone();
        side.packing.photo_width = self.photo.width;
        side.packing.photo_height = self.photo.height;
        side
    }

    pub fn region_opts(&self) -> RegionOpts {
        RegionOpts {
            photo_width: self.photo.width,
            photo_height: self.photo.height,
            ..self.region.clone()
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
