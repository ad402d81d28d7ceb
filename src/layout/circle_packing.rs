use std::collections::{BTreeMap, HashMap};

use crate::foundation::core::{PhotoSize, Point};
use crate::foundation::error::ShowcaseResult;
use crate::foundation::math::Rng64;
use crate::layout::packing::{Circle, group_radius, pack_circles};
use crate::layout::{
    LayoutAnnotations, LayoutPosition, LayoutStrategy, PlacementSource, ensure_group_token,
    group_id_for,
};
use crate::photo::data::PhotoData;
use crate::photo::metadata::MAX_EVALUATION_ROTATION_DEG;

const MIN_FAN_DEG: f64 = 8.0;
const MAX_FAN_DEG: f64 = 32.0;
const SIZE_FOR_MAX_FAN: f64 = 10.0;
/// Cards overlap by 35% of their width.
const CARD_SPREAD: f64 = 0.65;
/// Vertical dip of a member at full rotation.
const ARC_DEPTH: f64 = 200.0;
const RENDER_ORDER_SCALE: f64 = 1.5625;
const RENDER_ORDER_TIEBREAK: f64 = 0.001;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CirclePackingOpts {
    pub photo_width: f64,
    pub photo_height: f64,
    /// Gap between packed group circles.
    pub group_buffer: f64,
    /// Padding around each photo's circumcircle.
    pub photo_buffer: f64,
    pub seed: u64,
}

impl Default for CirclePackingOpts {
    fn default() -> Self {
        Self {
            photo_width: 530.0,
            photo_height: 1000.0,
            group_buffer: 2000.0,
            photo_buffer: 50.0,
            seed: 0x7061_636b,
        }
    }
}

#[derive(Clone, Debug)]
struct Group {
    circle: Circle,
    members: Vec<String>,
}

/// Author clusters packed as circles, each cluster fanned out like a hand of cards.
#[derive(Debug)]
pub struct CirclePackingLayout {
    opts: CirclePackingOpts,
    photo_radius: f64,
    groups: BTreeMap<String, Group>,
    group_of: HashMap<String, String>,
    rng: Rng64,
}

impl CirclePackingLayout {
    pub fn new(opts: CirclePackingOpts) -> Self {
        let size = PhotoSize::new(opts.photo_width, opts.photo_height);
        let photo_radius = size.circumradius() + opts.photo_buffer;
        let rng = Rng64::new(opts.seed);
        Self {
            opts,
            photo_radius,
            groups: BTreeMap::new(),
            group_of: HashMap::new(),
            rng,
        }
    }

    pub fn photo_radius(&self) -> f64 {
        self.photo_radius
    }

    pub fn group_buffer(&self) -> f64 {
        self.opts.group_buffer
    }

    /// Packed group circles, keyed by group id.
    pub fn group_circles(&self) -> impl Iterator<Item = &Circle> {
        self.groups.values().map(|g| &g.circle)
    }

    pub fn group_members(&self, group_id: &str) -> Option<&[String]> {
        self.groups.get(group_id).map(|g| g.members.as_slice())
    }

    /// Regroup, sort and pack the whole set.
    fn regroup(&mut self, photos: &[&PhotoData]) {
        let mut buckets: BTreeMap<String, Vec<&PhotoData>> = BTreeMap::new();
        for p in photos {
            buckets.entry(group_id_for(p)).or_default().push(*p);
        }

        for members in buckets.values_mut() {
            members.sort_by(|a, b| {
                let sa = a.metadata().evaluation_score();
                let sb = b.metadata().evaluation_score();
                sb.total_cmp(&sa).then_with(|| a.id().cmp(b.id()))
            });
        }

        let mut order: Vec<(&String, usize)> = buckets.iter().map(|(k, v)| (k, v.len())).collect();
        order.sort_by(|(ia, na), (ib, nb)| nb.cmp(na).then_with(|| ia.cmp(ib)));

        let circles: Vec<Circle> = order
            .iter()
            .map(|(id, n)| {
                Circle::new(
                    (*id).clone(),
                    group_radius(*n, self.photo_radius, self.opts.photo_buffer),
                )
            })
            .collect();
        let packed = pack_circles(&circles, self.opts.group_buffer);

        self.groups.clear();
        self.group_of.clear();
        for circle in packed {
            let members: Vec<String> = buckets
                .get(&circle.id)
                .map(|v| v.iter().map(|p| p.id().to_string()).collect())
                .unwrap_or_default();
            for m in &members {
                self.group_of.insert(m.clone(), circle.id.clone());
            }
            self.groups
                .insert(circle.id.clone(), Group { circle, members });
        }
        tracing::debug!(groups = self.groups.len(), photos = photos.len(), "packed clusters");
    }

    fn fan_position(&self, photo: &PhotoData) -> Option<LayoutPosition> {
        let group_id = self.group_of.get(photo.id())?;
        let group = self.groups.get(group_id)?;
        let index = group.members.iter().position(|m| m == photo.id())?;
        let n = group.members.len();

        let rotation = fan_rotation(photo, index, n);
        let spacing = self.opts.photo_width * CARD_SPREAD;
        let total_width = (n.saturating_sub(1)) as f64 * spacing;
        let Point { x: gx, y: gy } = group.circle.center;
        let x = gx - total_width / 2.0 + index as f64 * spacing;
        let dip = (rotation.abs() / MAX_EVALUATION_ROTATION_DEG).powi(2) * ARC_DEPTH;
        let y = gy - dip;

        Some(LayoutPosition {
            x,
            y,
            grid_key: None,
            annotations: LayoutAnnotations {
                source: Some(PlacementSource::Cluster),
                render_order: Some(fan_render_order(rotation, index)),
                cluster_rotation_deg: Some(rotation),
                group_id: Some(group_id.clone()),
                group_size: Some(n),
                photo_index: Some(index),
                ..LayoutAnnotations::default()
            },
        })
    }
}

impl Default for CirclePackingLayout {
    fn default() -> Self {
        Self::new(CirclePackingOpts::default())
    }
}

/// Rotation magnitude available to a cluster of `n` members.
pub fn fan_range_deg(n: usize) -> f64 {
    let factor = (n as f64 / SIZE_FOR_MAX_FAN).min(1.0);
    MIN_FAN_DEG + (MAX_FAN_DEG - MIN_FAN_DEG) * factor
}

/// Evaluated photos rotate by their evaluation; the rest spread by index.
pub fn fan_rotation(photo: &PhotoData, index: usize, n: usize) -> f64 {
    let meta = photo.metadata();
    if let Some(deg) = meta.evaluation_rotation_deg() {
        return deg;
    }
    if n > 1 {
        let t = index as f64 / (n - 1) as f64;
        return -((t - 0.5) * 2.0 * fan_range_deg(n));
    }
    meta.fallback_rotation_deg()
}

/// Stacking key: more negative rotation renders on top.
pub fn fan_render_order(rotation_deg: f64, index: usize) -> f64 {
    (MAX_EVALUATION_ROTATION_DEG - rotation_deg) * RENDER_ORDER_SCALE
        + index as f64 * RENDER_ORDER_TIEBREAK
}

impl LayoutStrategy for CirclePackingLayout {
    fn name(&self) -> &'static str {
        "circle-packing"
    }

    fn add_photo(&mut self, photo: &mut PhotoData) {
        ensure_group_token(photo, &mut self.rng);
    }

    fn remove_photo(&mut self, id: &str) {
        if let Some(gid) = self.group_of.remove(id)
            && let Some(group) = self.groups.get_mut(&gid)
        {
            group.members.retain(|m| m != id);
            if group.members.is_empty() {
                self.groups.remove(&gid);
            }
        }
    }

    fn position_for_photo(
        &mut self,
        photo: &PhotoData,
        existing: &[&PhotoData],
    ) -> ShowcaseResult<Option<LayoutPosition>> {
        let mut all: Vec<&PhotoData> = existing.to_vec();
        if !all.iter().any(|p| p.id() == photo.id()) {
            all.push(photo);
        }
        self.regroup(&all);
        Ok(self.fan_position(photo))
    }

    fn calculate_all_positions(
        &mut self,
        photos: &[&PhotoData],
    ) -> ShowcaseResult<Vec<Option<LayoutPosition>>> {
        self.regroup(photos);
        Ok(photos.iter().map(|p| self.fan_position(p)).collect())
    }

    fn requires_full_recalculation(&self) -> bool {
        true
    }

    fn on_metadata_changed(&mut self, photo: &PhotoData, all: &[&PhotoData]) -> Vec<String> {
        let old_group = self.group_of.get(photo.id()).cloned();
        let new_group = group_id_for(photo);

        let mut affected: Vec<String> = old_group
            .as_deref()
            .and_then(|g| self.group_members(g))
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        for p in all {
            if group_id_for(p) == new_group && !affected.iter().any(|a| a == p.id()) {
                affected.push(p.id().to_string());
            }
        }
        if !affected.iter().any(|a| a == photo.id()) {
            affected.push(photo.id().to_string());
        }

        self.regroup(all);
        affected
    }

    fn dispose(&mut self) {
        self.groups.clear();
        self.group_of.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/circle_packing.rs"]
mod tests;
