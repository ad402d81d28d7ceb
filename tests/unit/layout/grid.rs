use super::*;
use crate::photo::metadata::PhotoMetadata;

fn photos(n: usize) -> Vec<PhotoData> {
    (0..n)
        .map(|i| PhotoData::new(PhotoMetadata::new(format!("p{i}"))))
        .collect()
}

fn spiral() -> GridLayout {
    GridLayout::new(GridOpts {
        random: false,
        hexagonal_offset: false,
        ..GridOpts::default()
    })
}

#[test]
fn spiral_starts_at_origin_then_fills_first_ring() {
    let owned = photos(9);
    let refs: Vec<&PhotoData> = owned.iter().collect();
    let mut grid = spiral();
    let out = grid.calculate_all_positions(&refs).unwrap();

    let keys: Vec<String> = out
        .iter()
        .map(|p| p.as_ref().unwrap().grid_key.clone().unwrap())
        .collect();
    assert_eq!(keys[0], "0,0");
    let mut unique = keys.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 9, "cells must not repeat: {keys:?}");
    for k in &keys {
        let (x, y) = k.split_once(',').unwrap();
        let (x, y): (i64, i64) = (x.parse().unwrap(), y.parse().unwrap());
        assert!(x.abs() <= 1 && y.abs() <= 1);
    }
}

#[test]
fn world_coordinates_use_cell_size() {
    let owned = photos(2);
    let refs: Vec<&PhotoData> = owned.iter().collect();
    let mut grid = spiral();
    let out = grid.calculate_all_positions(&refs).unwrap();
    let second = out[1].as_ref().unwrap();
    // (0,1) is the first free cell on ring one.
    assert_eq!(second.grid_key.as_deref(), Some("0,1"));
    assert_eq!(second.x, 0.0);
    assert_eq!(second.y, 1030.0);
}

#[test]
fn hex_offset_shifts_rows_by_a_quarter_cell() {
    let owned = photos(2);
    let refs: Vec<&PhotoData> = owned.iter().collect();
    let mut grid = GridLayout::new(GridOpts {
        random: false,
        ..GridOpts::default()
    });
    let out = grid.calculate_all_positions(&refs).unwrap();
    assert_eq!(out[0].as_ref().unwrap().x, 0.25 * 780.0);
    assert_eq!(out[1].as_ref().unwrap().x, -0.25 * 780.0);
}

#[test]
fn full_recalculation_rebuilds_occupancy() {
    let owned = photos(20);
    let refs: Vec<&PhotoData> = owned.iter().collect();
    let mut grid = GridLayout::default();
    let a = grid.calculate_all_positions(&refs).unwrap();
    assert_eq!(grid.occupied_count(), 20);
    let b = grid.calculate_all_positions(&refs).unwrap();
    assert_eq!(grid.occupied_count(), 20);
    assert_eq!(a, b);
}

#[test]
fn incremental_add_reuses_assigned_cell_and_remove_frees_it() {
    let owned = photos(1);
    let mut grid = spiral();
    let first = grid.position_for_photo(&owned[0], &[]).unwrap().unwrap();
    let again = grid.position_for_photo(&owned[0], &[]).unwrap().unwrap();
    assert_eq!(first, again);
    assert!(grid.is_occupied(0, 0));

    grid.remove_photo("p0");
    assert!(!grid.is_occupied(0, 0));
}
