//! Photo lifecycle and layout orchestration.
//!
//! [`PhotoDataRepository`] owns every [`PhotoData`], drives the active
//! [`LayoutStrategy`], and turns strategy output into animation tracks for the
//! render adapter. All mutation happens through `&mut self`; async methods
//! return only after the animations they started have finished.

pub mod animator;
pub mod render;

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::animation::tween::{Stage, Track};
use crate::config::{AnimationTimings, ShowcaseConfig};
use crate::foundation::core::{Point, Position3D, SceneBounds};
use crate::foundation::error::{ShowcaseError, ShowcaseResult};
use crate::foundation::math::Rng64;
use crate::layout::grid::GridLayout;
use crate::layout::{DragOutcome, LayoutPosition, LayoutStrategy};
use crate::photo::data::{AnimationState, PhotoData};
use crate::photo::metadata::PhotoMetadata;
use crate::repository::animator::Animator;
use crate::repository::render::RenderAdapter;
use crate::view::camera::CameraState;
use crate::view::fisheye::{FisheyeLens, LensItem};

const EVENT_CAPACITY: usize = 256;

/// Notifications for observers outside the render adapter.
#[derive(Clone, Debug, PartialEq)]
pub enum RepositoryEvent {
    PhotoAdded { id: String, visible: bool },
    PhotoRemoved { id: String },
    LayoutChanged { strategy: &'static str },
    BoundsChanged { bounds: SceneBounds, distance: f64 },
}

#[derive(Debug)]
struct DragState {
    photo_id: String,
    lens_was_enabled: bool,
}

pub struct PhotoDataRepository<A: RenderAdapter> {
    photos: IndexMap<String, PhotoData>,
    strategy: Box<dyn LayoutStrategy>,
    adapter: A,
    config: ShowcaseConfig,
    animator: Animator,
    camera: CameraState,
    lens: FisheyeLens,
    focus: Option<Point>,
    bounds: SceneBounds,
    bounds_due: Option<Instant>,
    showcase_queue: VecDeque<String>,
    showcasing: bool,
    random_showcase: bool,
    rng: Rng64,
    drag: Option<DragState>,
    events: broadcast::Sender<RepositoryEvent>,
}

impl<A: RenderAdapter> std::fmt::Debug for PhotoDataRepository<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoDataRepository")
            .field("photos", &self.photos.len())
            .field("strategy", &self.strategy.name())
            .field("bounds", &self.bounds)
            .field("showcasing", &self.showcasing)
            .finish_non_exhaustive()
    }
}

/// Track that takes an already registered photo to its new layout result.
///
/// Returns `None` when the photo is visible and already resting at the target.
fn plan_move(
    timings: &AnimationTimings,
    photo: &mut PhotoData,
    pos: Option<LayoutPosition>,
    duration: std::time::Duration,
) -> Option<Track> {
    let was_visible = photo.is_visible() && photo.animation_state() != AnimationState::Hidden;
    match pos {
        None => {
            if !was_visible && photo.animation_state() == AnimationState::Hidden {
                return None;
            }
            let from = photo.current_position();
            let generation = photo.apply_hidden();
            Some(
                Track::new(photo.id(), generation)
                    .then(Stage::MoveTo {
                        to: from,
                        to_opacity: Some(0.0),
                        duration: timings.invisible_transition(),
                    })
                    .then(Stage::Place {
                        at: Position3D::ORIGIN,
                        opacity: 0.0,
                    })
                    .then(Stage::State(AnimationState::Hidden)),
            )
        }
        Some(p) => {
            let target = Position3D::on_plane(p.x, p.y);
            if was_visible
                && photo.target_position() == target
                && photo.annotations() == &p.annotations
                && photo.is_at_target(1e-6)
            {
                return None;
            }
            let generation = photo.apply_layout(&p);
            let track = Track::new(photo.id(), generation);
            let track = if was_visible {
                track.then(Stage::MoveTo {
                    to: target,
                    to_opacity: Some(1.0),
                    duration,
                })
            } else {
                track
                    .then(Stage::Place {
                        at: target,
                        opacity: 0.0,
                    })
                    .then(Stage::MoveTo {
                        to: target,
                        to_opacity: Some(1.0),
                        duration: timings.invisible_transition(),
                    })
            };
            Some(track.then(Stage::State(AnimationState::Positioned)))
        }
    }
}

impl<A: RenderAdapter> PhotoDataRepository<A> {
    /// Repository with a grid strategy; call [`Self::initialize`] to pick another.
    pub fn new(adapter: A, config: ShowcaseConfig) -> Self {
        let strategy: Box<dyn LayoutStrategy> = Box::new(GridLayout::new(config.grid_opts()));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            photos: IndexMap::new(),
            strategy,
            animator: Animator {
                frame: config.timings.frame_interval(),
                ease: config.timings.ease,
            },
            camera: CameraState::new(config.camera.initial_distance),
            lens: FisheyeLens::new(config.fisheye.clone()),
            focus: None,
            bounds: SceneBounds::EMPTY,
            bounds_due: None,
            showcase_queue: VecDeque::new(),
            showcasing: false,
            random_showcase: config.repository.enable_random_showcase,
            rng: Rng64::new(config.repository.showcase_seed),
            drag: None,
            events,
            adapter,
            config,
        }
    }

    /// Install the first strategy. Fails if the strategy cannot load its data.
    pub async fn initialize(&mut self, mut strategy: Box<dyn LayoutStrategy>) -> ShowcaseResult<()> {
        if !self.photos.is_empty() {
            return self.set_layout_strategy(strategy).await;
        }
        strategy.initialize().await?;
        let mut old = std::mem::replace(&mut self.strategy, strategy);
        old.dispose();
        tracing::info!(strategy = self.strategy.name(), "repository initialized");
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RepositoryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: RepositoryEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn photo(&self, id: &str) -> Option<&PhotoData> {
        self.photos.get(id)
    }

    /// Photos in insertion order.
    pub fn photos(&self) -> impl Iterator<Item = &PhotoData> {
        self.photos.values()
    }

    pub fn visible_photos(&self) -> impl Iterator<Item = &PhotoData> {
        self.photos.values().filter(|p| p.is_visible())
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn layout_strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn scene_bounds(&self) -> SceneBounds {
        self.bounds
    }

    pub fn camera(&self) -> CameraState {
        self.camera
    }

    pub fn lens(&self) -> &FisheyeLens {
        &self.lens
    }

    pub fn is_showcasing(&self) -> bool {
        self.showcasing
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn set_random_showcase_enabled(&mut self, enabled: bool) {
        self.random_showcase = enabled;
    }

    pub fn set_fisheye_enabled(&mut self, enabled: bool) {
        match &mut self.drag {
            // Applied when the drag ends.
            Some(drag) => drag.lens_was_enabled = enabled,
            None => {
                self.lens.set_enabled(enabled);
                self.refresh_lens();
            }
        }
    }

    async fn animate(&mut self, tracks: Vec<Track>) {
        let animator = self.animator;
        animator.run(&mut self.photos, &mut self.adapter, tracks).await;
    }

    fn position_for(&mut self, id: &str) -> ShowcaseResult<Option<LayoutPosition>> {
        let Some(photo) = self.photos.get(id) else {
            return Ok(None);
        };
        let refs: Vec<&PhotoData> = self.photos.values().collect();
        self.strategy.position_for_photo(photo, &refs)
    }

    fn calculate_all(&mut self) -> ShowcaseResult<Vec<Option<LayoutPosition>>> {
        let refs: Vec<&PhotoData> = self.photos.values().collect();
        self.strategy.calculate_all_positions(&refs)
    }

    fn sync_render_order(&mut self, id: &str) {
        if let Some(p) = self.photos.get(id)
            && let Some(h) = p.visual()
        {
            self.adapter.set_render_order(h, p.annotations().render_order);
        }
    }

    /// Apply a whole-set result in one pass and plan the moves.
    fn retarget_all(
        &mut self,
        positions: Vec<Option<LayoutPosition>>,
        duration: std::time::Duration,
    ) -> Vec<Track> {
        let timings = &self.config.timings;
        let mut tracks = Vec::new();
        for (photo, pos) in self.photos.values_mut().zip(positions) {
            if let Some(t) = plan_move(timings, photo, pos, duration) {
                if let Some(h) = photo.visual() {
                    self.adapter.set_render_order(h, photo.annotations().render_order);
                }
                tracks.push(t);
            }
        }
        tracks
    }

    /// Move the photos whose slots shifted because `changed` joined or left the set.
    fn retarget_dependents(&mut self, changed: &[&str]) -> ShowcaseResult<Vec<Track>> {
        let dependents = {
            let refs: Vec<&PhotoData> = self.photos.values().collect();
            self.strategy.membership_dependents(changed, &refs)
        };
        let duration = self.config.timings.new_photo_float();
        let mut tracks = Vec::new();
        for id in &dependents {
            let pos = self.position_for(id)?;
            if let Some(photo) = self.photos.get_mut(id)
                && let Some(t) = plan_move(&self.config.timings, photo, pos, duration)
            {
                tracks.push(t);
            }
            self.sync_render_order(id);
        }
        Ok(tracks)
    }

    /// Entry track for a photo that is not in the map yet.
    fn plan_entry(&self, photo: &mut PhotoData, pos: Option<LayoutPosition>, animate: bool) -> Track {
        let timings = &self.config.timings;
        let Some(p) = pos else {
            let generation = photo.apply_hidden();
            return Track::new(photo.id(), generation)
                .then(Stage::Place {
                    at: Position3D::ORIGIN,
                    opacity: 0.0,
                })
                .then(Stage::State(AnimationState::Hidden));
        };
        let generation = photo.apply_layout(&p);
        let target = photo.target_position();
        let track = Track::new(photo.id(), generation);
        if animate {
            track
                .then(Stage::Place {
                    at: self.camera.point_in_front(self.config.camera.spawn_offset),
                    opacity: 1.0,
                })
                .then(Stage::State(AnimationState::Spawning))
                .then(Stage::Delay(timings.spawn_delay()))
                .then(Stage::State(AnimationState::FloatingBack))
                .then(Stage::MoveTo {
                    to: target,
                    to_opacity: Some(1.0),
                    duration: timings.new_photo_float(),
                })
                .then(Stage::State(AnimationState::Positioned))
        } else {
            track
                .then(Stage::Place {
                    at: target,
                    opacity: 1.0,
                })
                .then(Stage::State(AnimationState::Positioned))
        }
    }

    pub async fn add_photo(&mut self, metadata: PhotoMetadata, animate: bool) -> ShowcaseResult<bool> {
        Ok(!self.add_photos(vec![metadata], animate).await?.is_empty())
    }

    /// Add a batch; ids already present are skipped. Returns the ids actually added.
    ///
    /// With `animate`, visible photos spawn in front of the camera, float back
    /// after the spawn delay, and join the showcase queue.
    #[tracing::instrument(skip(self, batch), fields(count = batch.len()))]
    pub async fn add_photos(
        &mut self,
        batch: Vec<PhotoMetadata>,
        animate: bool,
    ) -> ShowcaseResult<Vec<String>> {
        let mut fresh: Vec<PhotoData> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for meta in batch {
            if self.photos.contains_key(&meta.id) || !seen.insert(meta.id.clone()) {
                tracing::debug!(photo = %meta.id, "photo already present");
                continue;
            }
            let mut photo = PhotoData::new(meta);
            self.strategy.add_photo(&mut photo);
            fresh.push(photo);
        }
        if fresh.is_empty() {
            return Ok(Vec::new());
        }

        let full = self.strategy.requires_full_recalculation();
        let computed = {
            let mut refs: Vec<&PhotoData> = self.photos.values().collect();
            if full {
                refs.extend(fresh.iter());
                self.strategy.calculate_all_positions(&refs)
            } else {
                refs.extend(fresh.iter());
                let mut out = Vec::with_capacity(fresh.len());
                let mut res = Ok(());
                for photo in &fresh {
                    match self.strategy.position_for_photo(photo, &refs) {
                        Ok(p) => out.push(p),
                        Err(e) => {
                            res = Err(e);
                            break;
                        }
                    }
                }
                res.map(|()| out)
            }
        };
        let mut positions = match computed {
            Ok(p) => p,
            Err(e) => {
                for photo in &fresh {
                    self.strategy.remove_photo(photo.id());
                }
                return Err(e);
            }
        };

        let mut tracks = Vec::new();
        if full {
            let existing = self.photos.len();
            let fresh_positions = positions.split_off(existing);
            let duration = self.config.timings.new_photo_float();
            tracks = self.retarget_all(positions, duration);
            positions = fresh_positions;
        }

        let mut added = Vec::with_capacity(fresh.len());
        for (mut photo, pos) in fresh.into_iter().zip(positions) {
            let visible = pos.is_some();
            tracks.push(self.plan_entry(&mut photo, pos, animate));
            let handle = self.adapter.create_visual(&photo);
            photo.set_visual(Some(handle));
            self.adapter
                .set_render_order(handle, photo.annotations().render_order);
            let id = photo.id().to_string();
            tracing::debug!(photo = %id, visible, "photo added");
            if animate && visible {
                self.showcase_queue.push_back(id.clone());
            }
            self.photos.insert(id.clone(), photo);
            self.emit(RepositoryEvent::PhotoAdded {
                id: id.clone(),
                visible,
            });
            added.push(id);
        }
        if !full {
            let changed: Vec<&str> = added.iter().map(String::as_str).collect();
            tracks.extend(self.retarget_dependents(&changed)?);
        }

        self.schedule_bounds();
        self.animate(tracks).await;
        Ok(added)
    }

    /// Detach and dispose a photo. Returns `false` for unknown ids.
    pub async fn remove_photo(&mut self, id: &str) -> ShowcaseResult<bool> {
        let Some(mut photo) = self.photos.shift_remove(id) else {
            return Ok(false);
        };
        if let Some(h) = photo.visual() {
            self.adapter.remove_visual(h);
        }
        photo.dispose();
        self.strategy.remove_photo(id);
        self.showcase_queue.retain(|q| q != id);
        if self.drag.as_ref().is_some_and(|d| d.photo_id == id) {
            if let Some(drag) = self.drag.take() {
                self.lens.set_enabled(drag.lens_was_enabled);
            }
        }
        tracing::debug!(photo = id, "photo removed");
        self.emit(RepositoryEvent::PhotoRemoved { id: id.to_string() });

        if self.strategy.requires_full_recalculation() && !self.photos.is_empty() {
            let positions = self.calculate_all()?;
            let tracks = self.retarget_all(positions, self.config.timings.new_photo_float());
            self.schedule_bounds();
            self.animate(tracks).await;
        } else {
            let tracks = self.retarget_dependents(&[id])?;
            self.schedule_bounds();
            self.animate(tracks).await;
        }
        Ok(true)
    }

    /// Switch strategies. Positions for the whole set are computed before any
    /// photo is retargeted; on error the previous strategy stays active.
    #[tracing::instrument(skip(self, strategy), fields(strategy = strategy.name()))]
    pub async fn set_layout_strategy(
        &mut self,
        mut strategy: Box<dyn LayoutStrategy>,
    ) -> ShowcaseResult<()> {
        strategy.initialize().await?;
        for photo in self.photos.values_mut() {
            strategy.add_photo(photo);
        }
        let computed = {
            let refs: Vec<&PhotoData> = self.photos.values().collect();
            strategy.calculate_all_positions(&refs)
        };
        let positions = match computed {
            Ok(p) => p,
            Err(e) => {
                strategy.dispose();
                return Err(e);
            }
        };

        let mut old = std::mem::replace(&mut self.strategy, strategy);
        old.dispose();
        tracing::info!(
            from = old.name(),
            to = self.strategy.name(),
            photos = self.photos.len(),
            "layout strategy switched"
        );

        let tracks = self.retarget_all(positions, self.config.timings.layout_transition());
        self.emit(RepositoryEvent::LayoutChanged {
            strategy: self.strategy.name(),
        });
        self.schedule_bounds();
        self.animate(tracks).await;
        Ok(())
    }

    /// Recompute every position with the active strategy.
    pub async fn refresh_layout(&mut self) -> ShowcaseResult<()> {
        let positions = self.calculate_all()?;
        let tracks = self.retarget_all(positions, self.config.timings.layout_transition());
        self.emit(RepositoryEvent::LayoutChanged {
            strategy: self.strategy.name(),
        });
        self.schedule_bounds();
        self.animate(tracks).await;
        Ok(())
    }

    /// Merge a metadata patch and move every photo the strategy says is affected.
    pub async fn update_metadata(
        &mut self,
        id: &str,
        patch: &Map<String, Value>,
    ) -> ShowcaseResult<Vec<String>> {
        let photo = self
            .photos
            .get_mut(id)
            .ok_or_else(|| ShowcaseError::validation(format!("unknown photo '{id}'")))?;
        photo.metadata_mut().apply_patch(patch)?;

        let affected = {
            let refs: Vec<&PhotoData> = self.photos.values().collect();
            match self.photos.get(id) {
                Some(photo) => self.strategy.on_metadata_changed(photo, &refs),
                None => Vec::new(),
            }
        };

        let duration = self.config.timings.new_photo_float();
        let mut tracks = Vec::new();
        if self.strategy.requires_full_recalculation() {
            let positions = self.calculate_all()?;
            tracks = self.retarget_all(positions, duration);
        } else {
            for aid in &affected {
                let pos = self.position_for(aid)?;
                let timings = &self.config.timings;
                if let Some(photo) = self.photos.get_mut(aid)
                    && let Some(t) = plan_move(timings, photo, pos, duration)
                {
                    tracks.push(t);
                }
                self.sync_render_order(aid);
            }
        }
        tracing::debug!(photo = id, affected = affected.len(), "metadata updated");
        self.schedule_bounds();
        self.animate(tracks).await;
        Ok(affected)
    }

    fn next_showcase_candidate(&mut self) -> Option<String> {
        while let Some(id) = self.showcase_queue.pop_front() {
            if self
                .photos
                .get(&id)
                .is_some_and(|p| p.is_visible() && !p.is_dragging())
            {
                return Some(id);
            }
        }
        if !self.random_showcase {
            return None;
        }
        let candidates: Vec<&String> = self
            .photos
            .iter()
            .filter(|(_, p)| p.is_visible() && !p.is_dragging())
            .map(|(k, _)| k)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let i = self.rng.next_index(candidates.len());
        Some(candidates[i].clone())
    }

    /// One showcase-loop iteration: queued photos first, then a random visible one.
    pub async fn showcase_tick(&mut self) -> bool {
        if self.showcasing {
            return false;
        }
        match self.next_showcase_candidate() {
            Some(id) => self.showcase_photo(&id).await,
            None => false,
        }
    }

    /// Bring a photo toward the camera, pause, and return it to its target.
    pub async fn showcase_photo(&mut self, id: &str) -> bool {
        if self.showcasing {
            tracing::debug!(photo = id, "showcase already running");
            return false;
        }
        let Some(photo) = self.photos.get(id) else {
            return false;
        };
        if !photo.is_visible() || photo.is_dragging() {
            return false;
        }
        let t = &self.config.timings;
        let front = self.camera.point_in_front(self.config.camera.showcase_offset);
        let track = Track::new(id, photo.generation())
            .then(Stage::State(AnimationState::FloatingForward))
            .then(Stage::Detail { high_res: true })
            .then(Stage::MoveTo {
                to: front,
                to_opacity: None,
                duration: t.showcase_forward(),
            })
            .then(Stage::Delay(t.showcase_pause()))
            .then(Stage::MoveTo {
                to: photo.target_position(),
                to_opacity: None,
                duration: t.showcase_return(),
            })
            .then(Stage::Detail { high_res: false })
            .then(Stage::State(AnimationState::Positioned));

        tracing::debug!(photo = id, "showcase");
        self.showcasing = true;
        self.animate(vec![track]).await;
        self.showcasing = false;
        true
    }

    /// Start dragging. The strategy may veto; the fisheye is suspended meanwhile.
    pub fn begin_drag(&mut self, id: &str, at: Position3D) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(photo) = self.photos.get(id) else {
            return false;
        };
        if !photo.is_visible() || !self.strategy.on_photo_drag_start(photo, at) {
            tracing::debug!(photo = id, "drag refused");
            return false;
        }
        if let Some(photo) = self.photos.get_mut(id) {
            photo.set_dragging(true);
        }
        let lens_was_enabled = self.lens.is_enabled();
        self.lens.set_enabled(false);
        self.showcase_queue.retain(|q| q != id);
        self.drag = Some(DragState {
            photo_id: id.to_string(),
            lens_was_enabled,
        });
        self.refresh_lens();
        true
    }

    pub fn drag_to(&mut self, at: Position3D) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };
        let Some(photo) = self.photos.get_mut(&drag.photo_id) else {
            return false;
        };
        photo.place_at(at);
        if let Some(h) = photo.visual() {
            self.adapter.update_visual(h, at, photo.opacity());
        }
        self.strategy.on_photo_drag_move(photo, at);
        true
    }

    /// Drop the dragged photo, let the strategy react, and settle it at its new target.
    pub async fn end_drag(&mut self, at: Position3D) -> ShowcaseResult<DragOutcome> {
        let Some(drag) = self.drag.take() else {
            return Ok(DragOutcome::Ignored);
        };
        self.lens.set_enabled(drag.lens_was_enabled);
        let id = drag.photo_id;
        let Some(photo) = self.photos.get_mut(&id) else {
            return Ok(DragOutcome::Ignored);
        };
        photo.place_at(at);
        photo.set_dragging(false);
        let outcome = self.strategy.on_photo_drag_end(photo, at);
        tracing::debug!(photo = %id, ?outcome, "drag ended");

        let pos = self.position_for(&id)?;
        let duration = self.config.timings.new_photo_float();
        let timings = &self.config.timings;
        let track = self
            .photos
            .get_mut(&id)
            .and_then(|p| plan_move(timings, p, pos, duration));
        self.sync_render_order(&id);
        self.refresh_lens();
        self.schedule_bounds();
        self.animate(track.into_iter().collect()).await;
        Ok(outcome)
    }

    /// Move the fisheye focus (`None` when the pointer leaves). Returns the
    /// number of lens updates sent to the adapter.
    pub fn hover(&mut self, focus: Option<Point>) -> usize {
        self.focus = focus;
        self.refresh_lens()
    }

    fn refresh_lens(&mut self) -> usize {
        let height = self.config.photo.height;
        let items: Vec<LensItem<'_>> = self
            .photos
            .values()
            .filter(|p| p.is_visible())
            .map(|p| LensItem {
                id: p.id(),
                center: p.current_position().xy(),
                height,
                dragging: p.is_dragging(),
            })
            .collect();
        let effects = self.lens.apply(
            self.focus,
            &items,
            self.camera.distance,
            self.config.camera.fov_deg,
        );
        for e in &effects {
            if let Some(h) = self.photos.get(&e.id).and_then(PhotoData::visual) {
                self.adapter.apply_lens(h, e);
            }
        }
        effects.len()
    }

    /// (Re)start the bounds debounce timer.
    fn schedule_bounds(&mut self) {
        self.bounds_due = Some(Instant::now() + self.config.timings.bounds_debounce());
    }

    pub fn bounds_deadline(&self) -> Option<Instant> {
        self.bounds_due
    }

    /// Run the debounced recompute if it is due.
    pub fn flush_bounds(&mut self) -> Option<SceneBounds> {
        let due = self.bounds_due?;
        if Instant::now() < due {
            return None;
        }
        self.bounds_due = None;
        Some(self.recompute_bounds())
    }

    /// Wait for the pending debounce, if any, and run it.
    pub async fn settle_bounds(&mut self) -> Option<SceneBounds> {
        let due = self.bounds_due?;
        tokio::time::sleep_until(due).await;
        self.flush_bounds()
    }

    /// Bounds of visible targets plus the strategy's artwork, then refit the camera.
    pub fn recompute_bounds(&mut self) -> SceneBounds {
        let (hw, hh) = (self.config.photo.width / 2.0, self.config.photo.height / 2.0);
        let visible: Vec<Point> = self
            .photos
            .values()
            .filter(|p| p.is_visible())
            .map(|p| p.target_position().xy())
            .collect();
        let mut bounds = SceneBounds::around_centers(visible.iter().copied(), hw, hh);
        if let Some(extent) = self.strategy.scene_extent() {
            bounds = if visible.is_empty() {
                extent
            } else {
                bounds.union(extent)
            };
        }
        self.bounds = bounds;
        self.camera = CameraState::fit(bounds, &self.config.camera);
        self.adapter.on_bounds_changed(bounds, self.camera);
        tracing::debug!(?bounds, distance = self.camera.distance, "bounds recomputed");
        self.emit(RepositoryEvent::BoundsChanged {
            bounds,
            distance: self.camera.distance,
        });
        bounds
    }

    /// Release every photo and the strategy. Safe to call more than once.
    pub fn dispose(&mut self) {
        for e in self.lens.reset() {
            if let Some(h) = self.photos.get(&e.id).and_then(PhotoData::visual) {
                self.adapter.apply_lens(h, &e);
            }
        }
        for (_, mut photo) in self.photos.drain(..) {
            if let Some(h) = photo.visual() {
                self.adapter.remove_visual(h);
            }
            photo.dispose();
        }
        self.strategy.dispose();
        self.showcase_queue.clear();
        self.bounds_due = None;
        self.drag = None;
        self.focus = None;
    }
}
