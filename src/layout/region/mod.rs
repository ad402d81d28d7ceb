//! Placement inside hand-authored regions of a vector illustration.
//!
//! Regions are matched to photos through the evaluation attributes encoded in
//! their ids. Matched photos take shuffled slots inside the region, spreading
//! out along concentric rings when they would overlap; everything else sits on
//! a ring around the illustration, one angular slice per author.

pub mod descriptor;
pub mod document;
pub mod slots;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde_json::json;

use crate::foundation::core::{Point, Position3D, Rect, SceneBounds};
use crate::foundation::error::ShowcaseResult;
use crate::foundation::math::{Rng64, hash_str};
use crate::layout::packing::calculate_group_slices;
use crate::layout::region::descriptor::{RegionDescriptor, best_match};
use crate::layout::region::document::{RegionGeometry, SvgRegionDocument};
use crate::layout::region::slots::{
    RingSearch, SlotCache, footprint_at, hits_header, max_overlap, ring_search,
};
use crate::layout::{
    DragOutcome, LayoutAnnotations, LayoutPosition, LayoutStrategy, PlacementSource,
    ensure_group_token, group_id_for,
};
use crate::photo::data::{DRAGGED_PROPERTY, PhotoData};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RegionOpts {
    pub photo_width: f64,
    pub photo_height: f64,
    /// Half of the illustration's longer side, in world units.
    pub svg_radius: f64,
    /// Slot grid step, in document units.
    pub slot_step: f64,
    /// Candidates closer than this to a used one are skipped (document units).
    pub used_threshold: f64,
    pub ring_step: f64,
    pub ring_directions: usize,
    pub max_search_radius: f64,
    /// Radius of the ring holding photos without a matching region (world units).
    pub ring_radius: f64,
    /// Per-photo radial jitter on that ring.
    pub ring_variation: f64,
    pub seed: u64,
}

impl Default for RegionOpts {
    fn default() -> Self {
        Self {
            photo_width: 530.0,
            photo_height: 1000.0,
            svg_radius: 20000.0,
            slot_step: 15.0,
            used_threshold: 4.0,
            ring_step: 8.0,
            ring_directions: 16,
            max_search_radius: 160.0,
            ring_radius: 24000.0,
            ring_variation: 2000.0,
            seed: 0x7265_6769,
        }
    }
}

#[derive(Clone, Debug)]
struct Region {
    shape_index: usize,
    descriptor: RegionDescriptor,
}

/// Per-region placement state for the current batch.
#[derive(Clone, Debug, Default)]
struct RegionBatch {
    used: Vec<Point>,
    placed: Vec<(String, Rect)>,
    cursor: usize,
    reuse: usize,
}

enum Placement {
    Hidden,
    Override(f64, f64),
    Dragged(Point),
    Region(usize),
    Ring,
}

pub struct RegionLayout {
    opts: RegionOpts,
    geometry: Box<dyn RegionGeometry>,
    regions: Vec<Region>,
    slots: SlotCache,
    batches: HashMap<String, RegionBatch>,
    /// photo id -> (region id, document point)
    assigned: HashMap<String, (String, Point)>,
    rng: Rng64,
}

impl std::fmt::Debug for RegionLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionLayout")
            .field("regions", &self.regions.len())
            .field("view_box", &self.geometry.view_box())
            .field("assigned", &self.assigned.len())
            .finish_non_exhaustive()
    }
}

impl RegionLayout {
    pub fn new(opts: RegionOpts, geometry: impl RegionGeometry + 'static) -> Self {
        let regions: Vec<Region> = geometry
            .shapes()
            .iter()
            .enumerate()
            .filter_map(|(shape_index, s)| {
                RegionDescriptor::parse(&s.id).map(|descriptor| Region {
                    shape_index,
                    descriptor,
                })
            })
            .collect();
        if regions.is_empty() {
            tracing::warn!("illustration defines no regions; every photo goes to the ring");
        }
        let slots = SlotCache::new(opts.slot_step);
        let rng = Rng64::new(opts.seed);
        Self {
            opts,
            geometry: Box::new(geometry),
            regions,
            slots,
            batches: HashMap::new(),
            assigned: HashMap::new(),
            rng,
        }
    }

    pub fn from_svg(opts: RegionOpts, path: &Path) -> ShowcaseResult<Self> {
        Ok(Self::new(opts, SvgRegionDocument::from_path(path)?))
    }

    pub fn geometry(&self) -> &dyn RegionGeometry {
        self.geometry.as_ref()
    }

    pub fn region_ids(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.descriptor.raw.as_str())
    }

    /// World units per document unit.
    fn world_scale(&self) -> f64 {
        let vb = self.geometry.view_box();
        let longest = vb.width().max(vb.height());
        if longest > 0.0 {
            2.0 * self.opts.svg_radius / longest
        } else {
            1.0
        }
    }

    fn footprint(&self) -> (f64, f64) {
        let s = self.world_scale();
        (self.opts.photo_width / s, self.opts.photo_height / s)
    }

    pub fn document_to_normalized(&self, p: Point) -> (f64, f64) {
        let vb = self.geometry.view_box();
        let n = |v: f64, lo: f64, len: f64| if len > 0.0 { (v - lo) / len * 2.0 - 1.0 } else { 0.0 };
        (n(p.x, vb.x0, vb.width()), n(p.y, vb.y0, vb.height()))
    }

    pub fn normalized_to_document(&self, nx: f64, ny: f64) -> Point {
        let vb = self.geometry.view_box();
        Point::new(
            vb.x0 + (nx + 1.0) / 2.0 * vb.width(),
            vb.y0 + (ny + 1.0) / 2.0 * vb.height(),
        )
    }

    /// Document y grows downward, world y upward.
    pub fn world_to_document(&self, p: Point) -> Point {
        let s = self.world_scale();
        let c = self.geometry.view_box().center();
        Point::new(c.x + p.x / s, c.y - p.y / s)
    }

    pub fn document_to_world(&self, p: Point) -> Point {
        let s = self.world_scale();
        let c = self.geometry.view_box().center();
        Point::new((p.x - c.x) * s, (c.y - p.y) * s)
    }

    /// The illustration's extent in world units.
    pub fn document_bounds(&self) -> SceneBounds {
        let s = self.world_scale();
        let vb = self.geometry.view_box();
        let (hw, hh) = (vb.width() * s / 2.0, vb.height() * s / 2.0);
        SceneBounds::new(-hw, hw, -hh, hh)
    }

    fn matched_region(&self, photo: &PhotoData) -> Option<usize> {
        best_match(self.regions.iter().map(|r| &r.descriptor), photo.metadata())
    }

    /// Topmost region containing a document point.
    fn region_at(&self, p: Point) -> Option<usize> {
        let shapes = self.geometry.shapes();
        self.regions
            .iter()
            .rposition(|r| shapes[r.shape_index].contains(p))
    }

    fn classify(&self, photo: &PhotoData) -> Placement {
        let meta = photo.metadata();
        if meta.is_rejected() {
            return Placement::Hidden;
        }
        if let Some((nx, ny)) = meta.layout_override() {
            return Placement::Override(nx, ny);
        }
        if let Some(p) = dragged_point(photo) {
            return Placement::Dragged(p);
        }
        match self.matched_region(photo) {
            Some(i) => Placement::Region(i),
            None => Placement::Ring,
        }
    }

    fn place_in_region(&mut self, photo_id: &str, region: usize) -> Point {
        let footprint = self.footprint();
        let search = RingSearch {
            step: self.opts.ring_step,
            directions: self.opts.ring_directions,
            max_radius: self.opts.max_search_radius,
        };
        let threshold = self.opts.used_threshold;
        let Self {
            geometry,
            regions,
            slots,
            batches,
            ..
        } = self;
        let geometry = geometry.as_ref();
        let shape = &geometry.shapes()[regions[region].shape_index];
        let candidates = slots.slots(shape);
        let batch = batches.entry(shape.id.clone()).or_default();

        if candidates.is_empty() {
            tracing::warn!(region = %shape.id, "region too small for slots; using its center");
            let p = shape.bbox.center();
            batch.placed.push((photo_id.to_string(), footprint_at(footprint, p)));
            return p;
        }

        let placed: Vec<Rect> = batch.placed.iter().map(|(_, r)| *r).collect();
        while batch.cursor < candidates.len() {
            let c = candidates[batch.cursor];
            batch.cursor += 1;
            if batch.used.iter().any(|u| u.distance(c) < threshold)
                || hits_header(geometry, footprint, c)
            {
                continue;
            }
            let mut chosen = c;
            let overlap = max_overlap(footprint_at(footprint, c), &placed);
            if overlap > 0.0
                && let Some(found) = ring_search(geometry, &shape.id, c, footprint, &placed, search)
                && found.overlap < overlap
            {
                chosen = found.point;
            }
            batch.used.push(c);
            if chosen != c {
                batch.used.push(chosen);
            }
            batch.placed.push((photo_id.to_string(), footprint_at(footprint, chosen)));
            return chosen;
        }

        let p = candidates[batch.reuse % candidates.len()];
        batch.reuse += 1;
        tracing::warn!(region = %shape.id, reused = batch.reuse, "region slots exhausted; reusing");
        batch.placed.push((photo_id.to_string(), footprint_at(footprint, p)));
        p
    }

    /// Document point for a matched photo, stable across incremental calls.
    fn region_point(&mut self, photo_id: &str, region: usize) -> Point {
        let region_id = self.regions[region].descriptor.raw.clone();
        if let Some((rid, p)) = self.assigned.get(photo_id)
            && *rid == region_id
        {
            return *p;
        }
        self.forget(photo_id);
        let p = self.place_in_region(photo_id, region);
        self.assigned.insert(photo_id.to_string(), (region_id, p));
        p
    }

    fn forget(&mut self, photo_id: &str) {
        if let Some((rid, _)) = self.assigned.remove(photo_id)
            && let Some(batch) = self.batches.get_mut(&rid)
        {
            batch.placed.retain(|(id, _)| id != photo_id);
        }
    }

    fn region_position(&mut self, photo: &PhotoData, region: usize) -> LayoutPosition {
        let doc = self.region_point(photo.id(), region);
        let world = self.document_to_world(doc);
        let meta = photo.metadata();
        let rotation = meta
            .evaluation_rotation_deg()
            .unwrap_or_else(|| meta.fallback_rotation_deg());
        let mut pos = LayoutPosition::at(world.x, world.y, PlacementSource::Region);
        pos.annotations.region_id = Some(self.regions[region].descriptor.raw.clone());
        pos.annotations.auto_xy = Some(self.document_to_normalized(doc));
        pos.annotations.cluster_rotation_deg = Some(rotation);
        pos.annotations.group_id = Some(group_id_for(photo));
        pos
    }

    fn override_position(&self, nx: f64, ny: f64) -> LayoutPosition {
        let doc = self.normalized_to_document(nx, ny);
        let world = self.document_to_world(doc);
        let mut pos = LayoutPosition::at(world.x, world.y, PlacementSource::Override);
        pos.annotations.auto_xy = Some((nx, ny));
        pos.annotations.region_id = self
            .region_at(doc)
            .map(|i| self.regions[i].descriptor.raw.clone());
        pos
    }

    /// Ring positions for every photo without a region, keyed by id.
    fn ring_positions(&self, photos: &[&PhotoData]) -> HashMap<String, LayoutPosition> {
        let mut groups: BTreeMap<String, Vec<&PhotoData>> = BTreeMap::new();
        for p in photos {
            groups.entry(group_id_for(p)).or_default().push(*p);
        }
        for members in groups.values_mut() {
            members.sort_by(|a, b| a.id().cmp(b.id()));
        }
        let mut order: Vec<(String, usize)> =
            groups.iter().map(|(k, v)| (k.clone(), v.len())).collect();
        order.sort_by(|(ia, na), (ib, nb)| nb.cmp(na).then_with(|| ia.cmp(ib)));

        let mut out = HashMap::new();
        for slice in calculate_group_slices(&order) {
            let Some(members) = groups.get(&slice.group_id) else {
                continue;
            };
            for (i, p) in members.iter().enumerate() {
                let angle = slice.member_angle(i, members.len());
                let jitter = Rng64::new(hash_str(p.id())).next_f64_01() * 2.0 - 1.0;
                let r = self.opts.ring_radius + jitter * self.opts.ring_variation;
                let mut pos = LayoutPosition::at(r * angle.cos(), r * angle.sin(), PlacementSource::Ring);
                pos.annotations = LayoutAnnotations {
                    source: Some(PlacementSource::Ring),
                    cluster_rotation_deg: Some(p.metadata().fallback_rotation_deg()),
                    group_id: Some(slice.group_id.clone()),
                    group_size: Some(members.len()),
                    photo_index: Some(i),
                    ..LayoutAnnotations::default()
                };
                out.insert(p.id().to_string(), pos);
            }
        }
        out
    }

    fn is_ring_photo(&self, photo: &PhotoData) -> bool {
        matches!(self.classify(photo), Placement::Ring)
    }
}

fn dragged_point(photo: &PhotoData) -> Option<Point> {
    let v = photo.property(DRAGGED_PROPERTY)?;
    Some(Point::new(v.get("x")?.as_f64()?, v.get("y")?.as_f64()?))
}

/// Drop any user placement so automatic layout applies again.
pub fn clear_user_placement(photo: &mut PhotoData) {
    photo.remove_property(DRAGGED_PROPERTY);
    photo.metadata_mut().clear_layout();
}

impl LayoutStrategy for RegionLayout {
    fn name(&self) -> &'static str {
        "region"
    }

    fn add_photo(&mut self, photo: &mut PhotoData) {
        ensure_group_token(photo, &mut self.rng);
    }

    fn remove_photo(&mut self, id: &str) {
        self.forget(id);
    }

    fn position_for_photo(
        &mut self,
        photo: &PhotoData,
        existing: &[&PhotoData],
    ) -> ShowcaseResult<Option<LayoutPosition>> {
        Ok(match self.classify(photo) {
            Placement::Hidden => {
                self.forget(photo.id());
                None
            }
            Placement::Override(nx, ny) => Some(self.override_position(nx, ny)),
            Placement::Dragged(p) => Some(LayoutPosition::at(p.x, p.y, PlacementSource::Dragged)),
            Placement::Region(i) => Some(self.region_position(photo, i)),
            Placement::Ring => {
                let mut ring: Vec<&PhotoData> = existing
                    .iter()
                    .copied()
                    .filter(|p| p.id() != photo.id() && self.is_ring_photo(p))
                    .collect();
                ring.push(photo);
                self.ring_positions(&ring).remove(photo.id())
            }
        })
    }

    /// Ring slices are shared out by group, so every ring photo can shift when
    /// the membership changes.
    fn membership_dependents(&self, changed: &[&str], all: &[&PhotoData]) -> Vec<String> {
        all.iter()
            .filter(|p| !changed.contains(&p.id()) && self.is_ring_photo(p))
            .map(|p| p.id().to_string())
            .collect()
    }

    #[tracing::instrument(skip(self, photos), fields(count = photos.len()))]
    fn calculate_all_positions(
        &mut self,
        photos: &[&PhotoData],
    ) -> ShowcaseResult<Vec<Option<LayoutPosition>>> {
        self.batches.clear();
        self.assigned.clear();

        let ring: Vec<&PhotoData> = photos
            .iter()
            .copied()
            .filter(|p| self.is_ring_photo(p))
            .collect();
        let mut ring_positions = self.ring_positions(&ring);

        let mut out = Vec::with_capacity(photos.len());
        for photo in photos {
            let pos = match self.classify(photo) {
                Placement::Hidden => None,
                Placement::Override(nx, ny) => Some(self.override_position(nx, ny)),
                Placement::Dragged(p) => {
                    Some(LayoutPosition::at(p.x, p.y, PlacementSource::Dragged))
                }
                Placement::Region(i) => Some(self.region_position(photo, i)),
                Placement::Ring => ring_positions.remove(photo.id()),
            };
            out.push(pos);
        }
        tracing::debug!(
            placed = self.assigned.len(),
            ring = ring.len(),
            "region layout computed"
        );
        Ok(out)
    }

    fn on_metadata_changed(&mut self, photo: &PhotoData, all: &[&PhotoData]) -> Vec<String> {
        // Annotations still describe the placement made before the patch.
        let was_ring = photo.annotations().source == Some(PlacementSource::Ring);
        if let Some((rid, _)) = self.assigned.get(photo.id()) {
            let still_matches = self
                .matched_region(photo)
                .is_some_and(|i| self.regions[i].descriptor.raw == *rid);
            if !still_matches {
                self.forget(photo.id());
            }
        }
        let mut ids: Vec<String> = vec![photo.id().to_string()];
        if was_ring || self.is_ring_photo(photo) {
            let mut seen: HashSet<&str> = HashSet::from([photo.id()]);
            for p in all {
                if self.is_ring_photo(p) && seen.insert(p.id()) {
                    ids.push(p.id().to_string());
                }
            }
        }
        ids
    }

    fn on_photo_drag_start(&mut self, photo: &PhotoData, _at: Position3D) -> bool {
        tracing::debug!(photo = photo.id(), "region drag start");
        true
    }

    fn on_photo_drag_end(&mut self, photo: &mut PhotoData, at: Position3D) -> DragOutcome {
        let doc = self.world_to_document(at.xy());
        let (nx, ny) = self.document_to_normalized(doc);
        self.forget(photo.id());
        photo.set_property(DRAGGED_PROPERTY, json!({ "x": at.x, "y": at.y }));

        match self.region_at(doc) {
            Some(i) => {
                let region = &self.regions[i].descriptor;
                let meta = photo.metadata_mut();
                region.apply_to(meta);
                meta.set_layout(nx, ny);
                tracing::info!(photo = %meta.id, region = %region.raw, "photo dropped into region");
                DragOutcome::Region {
                    region_id: region.raw.clone(),
                    layout: (nx, ny),
                }
            }
            None => {
                let meta = photo.metadata_mut();
                meta.clear_evaluation();
                meta.set_layout(nx, ny);
                tracing::info!(photo = %meta.id, "photo dropped outside regions; evaluation cleared");
                DragOutcome::Free { layout: (nx, ny) }
            }
        }
    }

    fn normalized_to_world(&self, nx: f64, ny: f64) -> Option<Point> {
        Some(self.document_to_world(self.normalized_to_document(nx, ny)))
    }

    fn scene_extent(&self) -> Option<SceneBounds> {
        Some(self.document_bounds())
    }

    fn dispose(&mut self) {
        self.slots.clear();
        self.batches.clear();
        self.assigned.clear();
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/layout/region/mod.rs"]
mod tests;
