use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::json;

use super::*;
use crate::photo::metadata::PhotoMetadata;

#[derive(Clone, Default)]
struct FakeSource {
    hash: Rc<RefCell<String>>,
    grid_fetches: Rc<Cell<usize>>,
    fail: Rc<Cell<bool>>,
}

impl EmbeddingSource for FakeSource {
    fn workspace_config(&self) -> LocalBoxFuture<'_, ShowcaseResult<WorkspaceConfig>> {
        Box::pin(async move {
            if self.fail.get() {
                return Err(ShowcaseError::fetch("service unavailable"));
            }
            Ok(WorkspaceConfig {
                set_id: 7,
                state_hash: self.hash.borrow().clone(),
            })
        })
    }

    fn grid(&self, _set_id: i64) -> LocalBoxFuture<'_, ShowcaseResult<Value>> {
        Box::pin(async move {
            self.grid_fetches.set(self.grid_fetches.get() + 1);
            Ok(json!({
                "dim": [3, 3],
                "grid": [
                    { "pos": [0, 0], "id": "a" },
                    { "pos": [1, 1], "id": "b" },
                    { "pos": [2, 0], "id": "c", "metadata": { "k": 1 } }
                ]
            }))
        })
    }
}

fn photo(id: &str) -> PhotoData {
    PhotoData::new(PhotoMetadata::new(id))
}

#[tokio::test]
async fn cache_is_reused_until_hash_changes() {
    let src = FakeSource::default();
    *src.hash.borrow_mut() = "h1".into();
    let mut layout = EmbeddingLayout::new(Box::new(src.clone()), EmbeddingOpts::default());

    layout.initialize().await.unwrap();
    layout.initialize().await.unwrap();
    assert_eq!(src.grid_fetches.get(), 1);

    *src.hash.borrow_mut() = "h2".into();
    layout.initialize().await.unwrap();
    assert_eq!(src.grid_fetches.get(), 2);
    assert_eq!(layout.state_hash(), Some("h2"));

    layout.refresh().await.unwrap();
    assert_eq!(src.grid_fetches.get(), 3);
}

#[tokio::test]
async fn grid_cells_map_to_centered_world_coordinates() {
    let src = FakeSource::default();
    let mut layout = EmbeddingLayout::new(Box::new(src), EmbeddingOpts::default());
    layout.initialize().await.unwrap();

    let (a, b, missing) = (photo("a"), photo("b"), photo("zzz"));
    let out = layout.calculate_all_positions(&[&a, &b, &missing]).unwrap();
    let a = out[0].as_ref().unwrap();
    assert_eq!((a.x, a.y), (-780.0, 1030.0));
    let b = out[1].as_ref().unwrap();
    assert_eq!((b.x, b.y), (0.0, 0.0));
    assert!(out[2].is_none());
}

#[tokio::test]
async fn fetch_failures_propagate() {
    let src = FakeSource::default();
    src.fail.set(true);
    let mut layout = EmbeddingLayout::new(Box::new(src), EmbeddingOpts::default());
    let err = layout.initialize().await.unwrap_err();
    assert!(matches!(err, ShowcaseError::Fetch(_)));
}

#[test]
fn positions_before_load_are_a_strategy_error() {
    let mut layout = EmbeddingLayout::new(Box::new(FakeSource::default()), EmbeddingOpts::default());
    let p = photo("a");
    assert!(matches!(
        layout.position_for_photo(&p, &[]),
        Err(ShowcaseError::Strategy(_))
    ));
}

#[test]
fn validation_rejects_bad_shapes() {
    assert!(validate_embedding(&json!({ "dim": [2], "grid": [] })).is_err());
    assert!(validate_embedding(&json!({ "dim": [2, 2], "grid": [{ "pos": [0, 0] }] })).is_err());
    assert!(validate_embedding(&json!({ "dim": [2, 2], "grid": [{ "pos": [0], "id": "x" }] })).is_err());
    assert!(validate_embedding(&json!({ "dim": [0, 2], "grid": [] })).is_err());
    assert!(validate_embedding(&json!({ "dim": [2.5, 2], "grid": [] })).is_err());
    let oversize = validate_embedding(&json!({ "dim": [5_000_000_000u64, 2], "grid": [] }));
    assert!(matches!(oversize, Err(ShowcaseError::Validation(ref m)) if m.contains("dim x")));

    let ok = validate_embedding(&json!({
        "dim": [2, 2],
        "grid": [{ "pos": [1, 0], "id": "x" }],
        "cell_ratios": [1.0, 1.5]
    }))
    .unwrap();
    assert_eq!(ok.padding_ratio, 0.5);
    assert_eq!(ok.cell_ratios, Some((1.0, 1.5)));
    assert_eq!(ok.cells["x"], (1.0, 0.0));
}

#[tokio::test]
async fn switching_workspace_drops_the_cache() {
    let src = FakeSource::default();
    let mut layout = EmbeddingLayout::new(Box::new(src.clone()), EmbeddingOpts::default());
    layout.initialize().await.unwrap();
    assert!(layout.is_loaded());

    let other = FakeSource::default();
    layout.set_workspace(Box::new(other.clone()));
    assert!(!layout.is_loaded());
    layout.initialize().await.unwrap();
    assert_eq!(other.grid_fetches.get(), 1);
    assert_eq!(src.grid_fetches.get(), 1);
}
