use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use crate::foundation::error::ShowcaseResult;
use crate::foundation::math::Rng64;
use crate::layout::{LayoutAnnotations, LayoutPosition, LayoutStrategy, PlacementSource};
use crate::photo::data::PhotoData;

/// Width-to-height ratio of a grid cell used when sampling random cells.
const CELL_ASPECT: f64 = 0.53;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridOpts {
    pub photo_width: f64,
    pub photo_height: f64,
    pub spacing_x: f64,
    pub spacing_y: f64,
    /// Weighted random sampling instead of a pure spiral scan.
    pub random: bool,
    /// Shift even rows right and odd rows left by a quarter cell.
    pub hexagonal_offset: bool,
    pub initial_radius: u32,
    pub max_attempts: u32,
    pub seed: u64,
}

impl Default for GridOpts {
    fn default() -> Self {
        Self {
            photo_width: 530.0,
            photo_height: 1000.0,
            spacing_x: 250.0,
            spacing_y: 30.0,
            random: true,
            hexagonal_offset: true,
            initial_radius: 1,
            max_attempts: 100,
            seed: 0x6772_6964,
        }
    }
}

/// Cell-grid placement with per-cell occupancy keyed by `"x,y"`.
#[derive(Debug)]
pub struct GridLayout {
    opts: GridOpts,
    occupied: HashSet<(i64, i64)>,
    by_photo: HashMap<String, (i64, i64)>,
    ring: i64,
    rng: Rng64,
}

impl GridLayout {
    pub fn new(opts: GridOpts) -> Self {
        let rng = Rng64::new(opts.seed);
        Self {
            opts,
            occupied: HashSet::new(),
            by_photo: HashMap::new(),
            ring: 0,
            rng,
        }
    }

    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.opts.photo_width + self.opts.spacing_x,
            self.opts.photo_height + self.opts.spacing_y,
        )
    }

    pub fn is_occupied(&self, x: i64, y: i64) -> bool {
        self.occupied.contains(&(x, y))
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    fn reset(&mut self) {
        self.occupied.clear();
        self.by_photo.clear();
        self.ring = 0;
        self.rng = Rng64::new(self.opts.seed);
    }

    /// Next free cell on the square spiral around the origin.
    fn next_spiral_cell(&mut self) -> (i64, i64) {
        loop {
            let m = self.ring;
            for k in 0..=m {
                for cell in [
                    (k, m),
                    (k, -m),
                    (-k, m),
                    (-k, -m),
                    (m, k),
                    (m, -k),
                    (-m, k),
                    (-m, -k),
                ] {
                    if self.occupied.insert(cell) {
                        return cell;
                    }
                }
            }
            self.ring += 1;
        }
    }

    /// Random cell biased toward the center, falling back to the spiral.
    fn next_random_cell(&mut self) -> (i64, i64) {
        let occupied = self.occupied.len().max(1) as f64;
        let radius = f64::from(self.opts.initial_radius)
            .max((2.0 * CELL_ASPECT * occupied / PI).sqrt().ceil() + 1.0);

        for _ in 0..self.opts.max_attempts {
            let x = self.sample_axis(radius / CELL_ASPECT);
            let y = self.sample_axis(radius);
            if self.occupied.insert((x, y)) {
                return (x, y);
            }
        }
        self.next_spiral_cell()
    }

    fn sample_axis(&mut self, extent: f64) -> i64 {
        let magnitude = ((1.0 - self.rng.next_f64_01().sqrt()) * extent).round() as i64;
        if self.rng.next_f64_01() < 0.5 {
            -magnitude
        } else {
            magnitude
        }
    }

    fn place(&mut self, photo_id: &str) -> LayoutPosition {
        if let Some(&cell) = self.by_photo.get(photo_id) {
            return self.cell_position(cell);
        }
        let cell = if self.opts.random {
            self.next_random_cell()
        } else {
            self.next_spiral_cell()
        };
        self.by_photo.insert(photo_id.to_string(), cell);
        self.cell_position(cell)
    }

    fn cell_position(&self, (cx, cy): (i64, i64)) -> LayoutPosition {
        let offset = match (self.opts.hexagonal_offset, cy.rem_euclid(2) == 0) {
            (false, _) => 0.0,
            (true, true) => 0.25,
            (true, false) => -0.25,
        };
        let (cell_w, cell_h) = self.cell_size();
        LayoutPosition {
            x: (cx as f64 + offset) * cell_w,
            y: cy as f64 * cell_h,
            grid_key: Some(format!("{cx},{cy}")),
            annotations: LayoutAnnotations {
                source: Some(PlacementSource::Grid),
                ..LayoutAnnotations::default()
            },
        }
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(GridOpts::default())
    }
}

impl LayoutStrategy for GridLayout {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn initialize(&mut self) -> crate::foundation::core::LocalBoxFuture<'_, ShowcaseResult<()>> {
        self.reset();
        Box::pin(async { Ok(()) })
    }

    fn remove_photo(&mut self, id: &str) {
        if let Some(cell) = self.by_photo.remove(id) {
            self.occupied.remove(&cell);
        }
    }

    fn position_for_photo(
        &mut self,
        photo: &PhotoData,
        _existing: &[&PhotoData],
    ) -> ShowcaseResult<Option<LayoutPosition>> {
        let pos = self.place(photo.id());
        tracing::debug!(photo = photo.id(), key = ?pos.grid_key, "grid cell assigned");
        Ok(Some(pos))
    }

    fn calculate_all_positions(
        &mut self,
        photos: &[&PhotoData],
    ) -> ShowcaseResult<Vec<Option<LayoutPosition>>> {
        self.reset();
        Ok(photos.iter().map(|p| Some(self.place(p.id()))).collect())
    }

    fn dispose(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
