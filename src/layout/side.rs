use crate::foundation::error::ShowcaseResult;
use crate::layout::circle_packing::{CirclePackingLayout, CirclePackingOpts};
use crate::layout::{LayoutPosition, LayoutStrategy};
use crate::photo::data::PhotoData;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SideOpts {
    pub packing: CirclePackingOpts,
    /// Radius of the illustration kept clear in the middle.
    pub svg_radius: f64,
    pub center_gap_margin: f64,
    /// Extra gap used before any position has been computed.
    pub sparse_padding: f64,
}

impl Default for SideOpts {
    fn default() -> Self {
        Self {
            packing: CirclePackingOpts {
                group_buffer: 1500.0,
                photo_buffer: 0.0,
                ..CirclePackingOpts::default()
            },
            svg_radius: 20000.0,
            center_gap_margin: 2000.0,
            sparse_padding: 8000.0,
        }
    }
}

/// Circle packing pushed out to the left and right of a central illustration.
///
/// Positive fan rotations go left, negative ones go right.
#[derive(Debug)]
pub struct SideLayout {
    inner: CirclePackingLayout,
    svg_radius: f64,
    margin: f64,
    sparse_padding: f64,
    last_gap: Option<f64>,
}

impl SideLayout {
    pub fn new(opts: SideOpts) -> Self {
        Self {
            inner: CirclePackingLayout::new(opts.packing),
            svg_radius: opts.svg_radius,
            margin: opts.center_gap_margin,
            sparse_padding: opts.sparse_padding,
            last_gap: None,
        }
    }

    fn fallback_gap(&self) -> f64 {
        self.svg_radius + self.margin + self.sparse_padding
    }

    pub fn current_gap(&self) -> f64 {
        self.last_gap.unwrap_or_else(|| self.fallback_gap())
    }

    fn compute_gap(&mut self, base: &[Option<LayoutPosition>]) -> f64 {
        let max_abs_x = base.iter().flatten().map(|p| p.x.abs()).fold(0.0, f64::max);
        let gap = self.svg_radius + max_abs_x + self.margin;
        let gap = if gap.is_finite() && gap > 0.0 {
            gap
        } else {
            self.fallback_gap()
        };
        self.last_gap = Some(gap);
        gap
    }
}

impl Default for SideLayout {
    fn default() -> Self {
        Self::new(SideOpts::default())
    }
}

fn shift(mut pos: LayoutPosition, gap: f64, fallback_side: f64) -> LayoutPosition {
    let side = match pos.annotations.cluster_rotation_deg {
        Some(r) if r >= 0.0 => -1.0,
        Some(_) => 1.0,
        None => fallback_side,
    };
    pos.x += gap * side;
    pos
}

impl LayoutStrategy for SideLayout {
    fn name(&self) -> &'static str {
        "side"
    }

    fn add_photo(&mut self, photo: &mut PhotoData) {
        self.inner.add_photo(photo);
    }

    fn remove_photo(&mut self, id: &str) {
        self.inner.remove_photo(id);
    }

    fn position_for_photo(
        &mut self,
        photo: &PhotoData,
        existing: &[&PhotoData],
    ) -> ShowcaseResult<Option<LayoutPosition>> {
        let gap = self.current_gap();
        Ok(self
            .inner
            .position_for_photo(photo, existing)?
            .map(|p| shift(p, gap, 1.0)))
    }

    fn calculate_all_positions(
        &mut self,
        photos: &[&PhotoData],
    ) -> ShowcaseResult<Vec<Option<LayoutPosition>>> {
        let base = self.inner.calculate_all_positions(photos)?;
        let gap = self.compute_gap(&base);
        Ok(base
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let fallback = if i % 2 == 0 { -1.0 } else { 1.0 };
                p.map(|p| shift(p, gap, fallback))
            })
            .collect())
    }

    fn requires_full_recalculation(&self) -> bool {
        self.inner.requires_full_recalculation()
    }

    fn on_metadata_changed(&mut self, photo: &PhotoData, all: &[&PhotoData]) -> Vec<String> {
        self.inner.on_metadata_changed(photo, all)
    }

    fn membership_dependents(&self, changed: &[&str], all: &[&PhotoData]) -> Vec<String> {
        self.inner.membership_dependents(changed, all)
    }

    fn dispose(&mut self) {
        self.inner.dispose();
        self.last_gap = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/side.rs"]
mod tests;
