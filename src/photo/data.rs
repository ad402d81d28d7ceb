use std::collections::BTreeMap;

use serde_json::Value;
use tokio::time::Instant;

use crate::foundation::core::Position3D;
use crate::layout::{LayoutAnnotations, LayoutPosition};
use crate::photo::metadata::PhotoMetadata;

/// Property under which a strategy caches a photo's random group id.
pub const GROUP_ID_PROPERTY: &str = "_circle_pack_group_id";

/// Property set once a user has dragged the photo to a free position.
pub const DRAGGED_PROPERTY: &str = "dragged";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    Spawning,
    FloatingBack,
    Positioned,
    FloatingForward,
    Hidden,
}

/// Opaque handle to the visual primitive a render adapter created for a photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u64);

/// Positional and animation state for one photo.
///
/// `current` only moves through animation steps or drag gestures; layout
/// strategies write `target`. Every retarget bumps `generation`, which in-flight
/// animation stages compare against before committing.
#[derive(Debug)]
pub struct PhotoData {
    metadata: PhotoMetadata,
    current: Position3D,
    target: Position3D,
    state: AnimationState,
    state_since: Instant,
    opacity: f64,
    generation: u64,
    properties: BTreeMap<String, Value>,
    annotations: LayoutAnnotations,
    grid_key: Option<String>,
    visual: Option<VisualHandle>,
    dragging: bool,
}

impl PhotoData {
    pub fn new(metadata: PhotoMetadata) -> Self {
        Self::with_position(metadata, Position3D::ORIGIN)
    }

    pub fn with_position(metadata: PhotoMetadata, initial: Position3D) -> Self {
        Self {
            metadata,
            current: initial,
            target: initial,
            state: AnimationState::Spawning,
            state_since: Instant::now(),
            opacity: 1.0,
            generation: 0,
            properties: BTreeMap::new(),
            annotations: LayoutAnnotations::default(),
            grid_key: None,
            visual: None,
            dragging: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn url(&self) -> &str {
        &self.metadata.url
    }

    pub fn metadata(&self) -> &PhotoMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut PhotoMetadata {
        &mut self.metadata
    }

    pub fn current_position(&self) -> Position3D {
        self.current
    }

    pub fn target_position(&self) -> Position3D {
        self.target
    }

    pub fn animation_state(&self) -> AnimationState {
        self.state
    }

    pub fn animation_start(&self) -> Instant {
        self.state_since
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn annotations(&self) -> &LayoutAnnotations {
        &self.annotations
    }

    pub fn grid_key(&self) -> Option<&str> {
        self.grid_key.as_deref()
    }

    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Point the photo at a new target; supersedes any animation planned earlier.
    pub fn set_target(&mut self, target: Position3D) -> u64 {
        self.target = target;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Store a strategy result: target, annotations and grid key, visible.
    pub fn apply_layout(&mut self, pos: &LayoutPosition) -> u64 {
        self.annotations = pos.annotations.clone();
        self.grid_key = pos.grid_key.clone();
        self.set_target(Position3D::on_plane(pos.x, pos.y))
    }

    /// Mark the photo hidden: neutral target at the origin, opacity target 0.
    pub fn apply_hidden(&mut self) -> u64 {
        self.annotations = LayoutAnnotations::default();
        self.grid_key = None;
        self.set_target(Position3D::ORIGIN)
    }

    /// Animation step. Only the animator and drag handling call this.
    pub(crate) fn place_at(&mut self, pos: Position3D) {
        self.current = pos;
    }

    pub(crate) fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_animation_state(&mut self, state: AnimationState) {
        self.state = state;
        self.state_since = Instant::now();
    }

    pub(crate) fn set_visual(&mut self, visual: Option<VisualHandle>) {
        self.visual = visual;
    }

    pub(crate) fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: Value) {
        self.properties.insert(key.into(), value);
    }

    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    pub fn is_at_target(&self, tolerance: f64) -> bool {
        self.current.distance(self.target) <= tolerance
    }

    pub fn lerp_to_target(&self, t: f64) -> Position3D {
        self.current.lerp(self.target, t)
    }

    pub fn distance_to(&self, other: &PhotoData) -> f64 {
        self.current.distance(other.current)
    }

    /// Drop the visual reference and every strategy annotation.
    pub fn dispose(&mut self) {
        self.visual = None;
        self.properties.clear();
        self.annotations = LayoutAnnotations::default();
        self.grid_key = None;
    }
}

impl std::fmt::Display for PhotoData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PhotoData(id: {}, pos: ({:.1}, {:.1}, {:.1}), state: {:?})",
            self.id(),
            self.current.x,
            self.current.y,
            self.current.z,
            self.state
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/photo/data.rs"]
mod tests;
