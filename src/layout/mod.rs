//! Layout strategies: functions from a photo set to plane positions.
//!
//! Every strategy implements [`LayoutStrategy`]. The repository asks for one
//! position on incremental adds and for the whole set on strategy switches;
//! a `None` position means "hide this photo".

pub mod circle_packing;
pub mod embedding;
pub mod grid;
pub mod packing;
pub mod region;
pub mod side;

use crate::foundation::core::{LocalBoxFuture, Point, Position3D, SceneBounds};
use crate::foundation::error::ShowcaseResult;
use crate::foundation::math::{Rng64, hash_str};
use crate::photo::data::{GROUP_ID_PROPERTY, PhotoData};

/// How a position was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementSource {
    Grid,
    Cluster,
    Embedding,
    Region,
    Ring,
    Override,
    Dragged,
}

/// Strategy-specific annotations the repository copies onto the photo.
///
/// Later stages (fan rotation, magnification, stacking) read these.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PlacementSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_rotation_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    /// Normalized `[-1, 1]` placement inside the illustration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_xy: Option<(f64, f64)>,
}

/// Strategy output for one photo.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutPosition {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_key: Option<String>,
    #[serde(default)]
    pub annotations: LayoutAnnotations,
}

impl LayoutPosition {
    pub fn at(x: f64, y: f64, source: PlacementSource) -> Self {
        Self {
            x,
            y,
            grid_key: None,
            annotations: LayoutAnnotations {
                source: Some(source),
                ..LayoutAnnotations::default()
            },
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// What a drag gesture ended up doing to the photo.
#[derive(Clone, Debug, PartialEq)]
pub enum DragOutcome {
    /// The strategy does not handle drops.
    Ignored,
    /// Dropped inside a region; the region's attributes were written to the metadata.
    Region { region_id: String, layout: (f64, f64) },
    /// Dropped outside every region; evaluation metadata was cleared.
    Free { layout: (f64, f64) },
}

impl DragOutcome {
    /// Whether the photo metadata changed and should be saved upstream.
    pub fn metadata_changed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Pluggable placement algorithm.
///
/// Methods that only matter to some strategies have no-op defaults. Missing
/// evaluation data never produces an error; errors are reserved for remote
/// fetch failures and lifecycle misuse.
pub trait LayoutStrategy {
    fn name(&self) -> &'static str;

    /// Load whatever the strategy needs before the first placement.
    fn initialize(&mut self) -> LocalBoxFuture<'_, ShowcaseResult<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Register a photo. Strategies may cache private properties on it here.
    fn add_photo(&mut self, _photo: &mut PhotoData) {}

    fn remove_photo(&mut self, _id: &str) {}

    fn position_for_photo(
        &mut self,
        photo: &PhotoData,
        existing: &[&PhotoData],
    ) -> ShowcaseResult<Option<LayoutPosition>>;

    /// Positions for the whole set, in input order.
    fn calculate_all_positions(
        &mut self,
        photos: &[&PhotoData],
    ) -> ShowcaseResult<Vec<Option<LayoutPosition>>>;

    /// When true, adding or removing one photo may move every other photo.
    fn requires_full_recalculation(&self) -> bool {
        false
    }

    /// Ids whose positions must be recomputed after `photo`'s metadata changed.
    fn on_metadata_changed(&mut self, photo: &PhotoData, _all: &[&PhotoData]) -> Vec<String> {
        vec![photo.id().to_string()]
    }

    /// Placed photos whose slots depend on who else is in the set. The
    /// repository retargets them after an incremental add or remove of `changed`.
    fn membership_dependents(&self, _changed: &[&str], _all: &[&PhotoData]) -> Vec<String> {
        Vec::new()
    }

    /// Returning `false` vetoes the drag.
    fn on_photo_drag_start(&mut self, _photo: &PhotoData, _at: Position3D) -> bool {
        false
    }

    fn on_photo_drag_move(&mut self, _photo: &PhotoData, _at: Position3D) {}

    fn on_photo_drag_end(&mut self, _photo: &mut PhotoData, _at: Position3D) -> DragOutcome {
        DragOutcome::Ignored
    }

    /// Convert a persisted normalized override into world units, if supported.
    fn normalized_to_world(&self, _nx: f64, _ny: f64) -> Option<Point> {
        None
    }

    /// Extent of any background artwork the camera should also frame.
    fn scene_extent(&self) -> Option<SceneBounds> {
        None
    }

    /// Release strategy-private state. Must be safe to call more than once.
    fn dispose(&mut self) {}
}

/// Cluster key for a photo: its author, or a random id cached on the photo.
pub fn group_id_for(photo: &PhotoData) -> String {
    if let Some(author) = photo.metadata().author_id.as_deref() {
        return format!("author:{author}");
    }
    match photo.property_str(GROUP_ID_PROPERTY) {
        Some(token) => format!("random:{token}"),
        // Not registered yet; derive a token that is at least stable for this id.
        None => format!("random:{}", Rng64::new(hash_str(photo.id())).next_token()),
    }
}

/// Assign a random group token to an author-less photo unless it already has one.
pub fn ensure_group_token(photo: &mut PhotoData, rng: &mut Rng64) {
    if photo.metadata().author_id.is_some() || photo.property_str(GROUP_ID_PROPERTY).is_some() {
        return;
    }
    photo.set_property(GROUP_ID_PROPERTY, serde_json::Value::String(rng.next_token()));
}

/// Bounding box of the non-hidden positions, padded by half a photo.
pub fn layout_bounds(
    positions: &[Option<LayoutPosition>],
    half_width: f64,
    half_height: f64,
) -> SceneBounds {
    SceneBounds::around_centers(
        positions.iter().flatten().map(LayoutPosition::point),
        half_width,
        half_height,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/layout/mod.rs"]
mod tests;
