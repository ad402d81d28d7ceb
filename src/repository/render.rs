use crate::foundation::core::{Position3D, SceneBounds};
use crate::photo::data::{PhotoData, VisualHandle};
use crate::view::camera::CameraState;
use crate::view::fisheye::LensEffect;

/// Presentation layer the repository drives.
///
/// Implementations own the real visual primitives (meshes, sprites, DOM nodes);
/// the repository only keeps the opaque [`VisualHandle`] they hand out.
pub trait RenderAdapter {
    fn create_visual(&mut self, photo: &PhotoData) -> VisualHandle;

    fn update_visual(&mut self, handle: VisualHandle, position: Position3D, opacity: f64);

    fn remove_visual(&mut self, handle: VisualHandle);

    /// Strategy stacking hint copied from the layout annotations.
    fn set_render_order(&mut self, _handle: VisualHandle, _order: Option<f64>) {}

    fn apply_lens(&mut self, _handle: VisualHandle, _effect: &LensEffect) {}

    /// Swap between thumbnail and full-resolution texture.
    fn set_detail(&mut self, _handle: VisualHandle, _high_res: bool) {}

    fn on_bounds_changed(&mut self, _bounds: SceneBounds, _camera: CameraState) {}
}

/// Adapter that renders nothing; used for offline layout runs.
#[derive(Debug, Default)]
pub struct HeadlessAdapter {
    next: u64,
    live: usize,
}

impl HeadlessAdapter {
    pub fn live_visuals(&self) -> usize {
        self.live
    }
}

impl RenderAdapter for HeadlessAdapter {
    fn create_visual(&mut self, _photo: &PhotoData) -> VisualHandle {
        self.next += 1;
        self.live += 1;
        VisualHandle(self.next)
    }

    fn update_visual(&mut self, _handle: VisualHandle, _position: Position3D, _opacity: f64) {}

    fn remove_visual(&mut self, _handle: VisualHandle) {
        self.live = self.live.saturating_sub(1);
    }
}
