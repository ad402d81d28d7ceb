use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::foundation::core::LocalBoxFuture;
use crate::foundation::error::{ShowcaseError, ShowcaseResult};
use crate::layout::{LayoutAnnotations, LayoutPosition, LayoutStrategy, PlacementSource};
use crate::photo::data::PhotoData;

/// Workspace-scoped pointer to the current embedding data set.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkspaceConfig {
    pub set_id: i64,
    /// Changes whenever the grid data behind `set_id` changes.
    pub state_hash: String,
}

/// Remote service that owns the id → grid-cell mapping.
pub trait EmbeddingSource {
    fn workspace_config(&self) -> LocalBoxFuture<'_, ShowcaseResult<WorkspaceConfig>>;

    /// Raw grid document for a data set; validated by the strategy.
    fn grid(&self, set_id: i64) -> LocalBoxFuture<'_, ShowcaseResult<Value>>;
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EmbeddingOpts {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Default for EmbeddingOpts {
    fn default() -> Self {
        Self {
            cell_width: 780.0,
            cell_height: 1030.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddingGrid {
    pub dim: (u32, u32),
    pub cells: HashMap<String, (f64, f64)>,
    pub padding_ratio: f64,
    pub conversion_ratio: Option<f64>,
    pub cell_ratios: Option<(f64, f64)>,
}

/// Grid document as the embedding service sends it.
#[derive(Debug, serde::Deserialize)]
struct GridDocument {
    dim: [u64; 2],
    grid: Vec<GridCell>,
    #[serde(default)]
    padding_ratio: Option<f64>,
    #[serde(default)]
    conversion_ratio: Option<f64>,
    #[serde(default)]
    cell_ratios: Option<[f64; 2]>,
}

#[derive(Debug, serde::Deserialize)]
struct GridCell {
    id: String,
    pos: [f64; 2],
}

/// Check the shape of a grid document and index it by photo id.
pub fn validate_embedding(doc: &Value) -> ShowcaseResult<EmbeddingGrid> {
    let doc = GridDocument::deserialize(doc)
        .map_err(|e| ShowcaseError::validation(format!("embedding grid: {e}")))?;

    let checked = |v: u64, axis: &str| -> ShowcaseResult<u32> {
        match u32::try_from(v) {
            Ok(d) if d >= 1 => Ok(d),
            _ => Err(ShowcaseError::validation(format!(
                "dim {axis} must be in 1..={}, got {v}",
                u32::MAX
            ))),
        }
    };
    let dim = (checked(doc.dim[0], "x")?, checked(doc.dim[1], "y")?);

    let cells = doc
        .grid
        .into_iter()
        .map(|c| (c.id, (c.pos[0], c.pos[1])))
        .collect();

    Ok(EmbeddingGrid {
        dim,
        cells,
        padding_ratio: doc.padding_ratio.unwrap_or(0.5),
        conversion_ratio: doc.conversion_ratio,
        cell_ratios: doc.cell_ratios.map(|[a, b]| (a, b)),
    })
}

#[derive(Debug)]
struct Loaded {
    config: WorkspaceConfig,
    grid: EmbeddingGrid,
}

/// Positions photos at the grid cells of a remotely computed 2-D embedding.
///
/// `initialize` always re-reads the workspace config; grid data is only fetched
/// again when the state hash (or set id) differs from the cached one.
pub struct EmbeddingLayout {
    source: Box<dyn EmbeddingSource>,
    opts: EmbeddingOpts,
    loaded: Option<Loaded>,
}

impl std::fmt::Debug for EmbeddingLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingLayout")
            .field("opts", &self.opts)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl EmbeddingLayout {
    pub fn new(source: Box<dyn EmbeddingSource>, opts: EmbeddingOpts) -> Self {
        Self {
            source,
            opts,
            loaded: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn state_hash(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.config.state_hash.as_str())
    }

    /// Drop cached data; the next load fetches everything.
    pub fn invalidate(&mut self) {
        self.loaded = None;
    }

    /// Point the strategy at another workspace. Cached data is dropped.
    pub fn set_workspace(&mut self, source: Box<dyn EmbeddingSource>) {
        self.source = source;
        self.invalidate();
    }

    pub async fn refresh(&mut self) -> ShowcaseResult<()> {
        self.invalidate();
        self.load().await
    }

    async fn load(&mut self) -> ShowcaseResult<()> {
        let config = self.source.workspace_config().await?;
        if let Some(l) = &self.loaded
            && l.config == config
        {
            tracing::debug!(hash = %config.state_hash, "embedding cache still valid");
            return Ok(());
        }

        let doc = self.source.grid(config.set_id).await?;
        let grid = validate_embedding(&doc)
            .map_err(|e| ShowcaseError::fetch(format!("embedding set {}: {e}", config.set_id)))?;
        tracing::info!(
            set_id = config.set_id,
            hash = %config.state_hash,
            cells = grid.cells.len(),
            "embedding grid loaded"
        );
        self.loaded = Some(Loaded { config, grid });
        Ok(())
    }

    fn world_position(&self, grid: &EmbeddingGrid, (gx, gy): (f64, f64)) -> (f64, f64) {
        let (w, h) = (self.opts.cell_width, self.opts.cell_height);
        let (dx, dy) = (f64::from(grid.dim.0), f64::from(grid.dim.1));
        (gx * w - (dx - 1.0) * w / 2.0, (dy - 1.0) * h / 2.0 - gy * h)
    }

    fn lookup(&self, id: &str) -> ShowcaseResult<Option<LayoutPosition>> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| ShowcaseError::strategy("embedding data not loaded; call initialize"))?;
        Ok(loaded.grid.cells.get(id).map(|&cell| {
            let (x, y) = self.world_position(&loaded.grid, cell);
            LayoutPosition {
                x,
                y,
                grid_key: Some(format!("{},{}", cell.0, cell.1)),
                annotations: LayoutAnnotations {
                    source: Some(PlacementSource::Embedding),
                    ..LayoutAnnotations::default()
                },
            }
        }))
    }
}

impl LayoutStrategy for EmbeddingLayout {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn initialize(&mut self) -> LocalBoxFuture<'_, ShowcaseResult<()>> {
        Box::pin(self.load())
    }

    fn position_for_photo(
        &mut self,
        photo: &PhotoData,
        _existing: &[&PhotoData],
    ) -> ShowcaseResult<Option<LayoutPosition>> {
        self.lookup(photo.id())
    }

    fn calculate_all_positions(
        &mut self,
        photos: &[&PhotoData],
    ) -> ShowcaseResult<Vec<Option<LayoutPosition>>> {
        photos.iter().map(|p| self.lookup(p.id())).collect()
    }

    fn dispose(&mut self) {
        self.loaded = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/embedding.rs"]
mod tests;
