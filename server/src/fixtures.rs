//! Map fixtures served to the viewer during development.

use std::path::{Path, PathBuf};

use storemap_shared::{
    FurnitureInfo, GridPoint, LocatedCell, MapPayload, MapSnapshot, ObjectKind, ProductRef,
    ReplenishmentPoint, RouteOverlay, RouteStop,
};

pub const DEMO_MAP_ID: &str = "demo";

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse one fixture file. A blank `map.id` is replaced with the file stem.
pub fn load_file(path: &Path) -> Result<MapSnapshot, FixtureError> {
    let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut snapshot = MapSnapshot::from_json(&raw).map_err(|source| FixtureError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    if snapshot.map.id.trim().is_empty() {
        snapshot.map.id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(DEMO_MAP_ID)
            .to_string();
    }
    Ok(snapshot)
}

/// Load every `*.json` fixture in `dir`, sorted by file name.
///
/// A file that fails to parse is logged and skipped; only an unreadable
/// directory is an error.
pub fn load_dir(dir: &Path) -> Result<Vec<MapSnapshot>, FixtureError> {
    let entries = std::fs::read_dir(dir).map_err(|source| FixtureError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut snapshots = Vec::with_capacity(paths.len());
    for path in paths {
        match load_file(&path) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => tracing::warn!(error = %e, "skipping map fixture"),
        }
    }
    Ok(snapshots)
}

/// Load fixtures from `dir`, falling back to the built-in demo store when the
/// directory is missing or holds no usable maps.
pub fn load_or_demo(dir: &Path) -> Vec<MapSnapshot> {
    match load_dir(dir) {
        Ok(snapshots) if !snapshots.is_empty() => snapshots,
        Ok(_) => {
            tracing::info!(dir = %dir.display(), "no map fixtures found, serving demo map");
            vec![demo_map()]
        }
        Err(e) => {
            tracing::warn!(error = %e, "fixture directory unavailable, serving demo map");
            vec![demo_map()]
        }
    }
}

/// A small 12×8 store: three gondola aisles, a checkout lane, an entrance and
/// an exit, with a three-stop replenishment route.
pub fn demo_map() -> MapSnapshot {
    let mut cells = Vec::new();
    for (x, name) in [(2, "Aisle 1"), (5, "Aisle 2"), (8, "Aisle 3")] {
        for y in 1..=5 {
            cells.push(placed(x, y, name, ObjectKind::Furniture, 4, 2));
        }
    }
    for y in 3..=4 {
        cells.push(placed(10, y, "Checkout", ObjectKind::Checkout, 0, 0));
    }
    cells.push(placed(0, 7, "Entrance", ObjectKind::Entrance, 0, 0));
    cells.push(placed(11, 7, "Exit", ObjectKind::Exit, 0, 0));

    let stocked = [(2, 2, 101, "Rice"), (5, 4, 102, "Pasta"), (8, 1, 103, "Coffee")];
    for (x, y, id, name) in stocked {
        if let Some(cell) = cells.iter_mut().find(|cell| cell.x == x && cell.y == y) {
            cell.replenishment_point = Some(ReplenishmentPoint {
                id: Some(id),
                product: Some(product(id, name)),
            });
        }
    }

    let path = [
        (0, 7),
        (0, 6),
        (1, 6),
        (1, 5),
        (1, 4),
        (1, 3),
        (1, 2),
        (1, 3),
        (1, 4),
        (1, 5),
        (1, 6),
        (2, 6),
        (3, 6),
        (4, 6),
        (5, 6),
        (6, 6),
        (6, 5),
        (6, 4),
        (6, 3),
        (6, 2),
        (6, 1),
        (6, 0),
        (7, 0),
        (8, 0),
        (9, 0),
        (9, 1),
        (9, 2),
        (9, 3),
        (9, 4),
        (9, 5),
        (9, 6),
        (9, 7),
        (10, 7),
        (11, 7),
    ];
    let stops = [
        (1, 2, 1, (2, 2), 101, "Rice"),
        (6, 4, 2, (5, 4), 102, "Pasta"),
        (9, 1, 3, (8, 1), 103, "Coffee"),
    ]
    .into_iter()
    .map(|(access_x, access_y, visit_order, (px, py), id, name)| RouteStop {
        access_x,
        access_y,
        visit_order,
        point_x: Some(px),
        point_y: Some(py),
        product: Some(product(id, name)),
    })
    .collect();

    MapSnapshot {
        map: MapPayload {
            id: DEMO_MAP_ID.to_string(),
            name: "Demo Store".to_string(),
            width: 12,
            height: 8,
        },
        cells,
        route: Some(RouteOverlay {
            waypoints: path.iter().map(|&(x, y)| GridPoint::new(x, y)).collect(),
            stops,
        }),
    }
}

fn placed(x: i32, y: i32, name: &str, kind: ObjectKind, rows: u32, columns: u32) -> LocatedCell {
    LocatedCell {
        x,
        y,
        furniture: Some(FurnitureInfo {
            name: name.to_string(),
            rows,
            columns,
            walkable: matches!(kind, ObjectKind::Entrance | ObjectKind::Exit),
            kind,
        }),
        replenishment_point: None,
    }
}

fn product(id: u64, name: &str) -> ProductRef {
    ProductRef {
        id: Some(id),
        name: name.to_string(),
        sku: Some(format!("SKU-{id}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storemap_shared::{entries_from_cells, unify_furniture};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "storemap-fixtures-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn demo_map_cells_are_inside_the_grid() {
        let snapshot = demo_map();
        let (_, dropped) = snapshot.clone().sanitized();
        assert_eq!(dropped, 0);
        let route = snapshot.route.expect("demo route");
        let grid = snapshot.map.grid();
        assert!(route.waypoints.iter().all(|p| grid.contains(p.x, p.y)));
        assert!(route.stops.iter().all(|s| grid.contains(s.access_x, s.access_y)));
    }

    #[test]
    fn demo_aisles_unify_into_one_unit_each() {
        let snapshot = demo_map();
        let entries = entries_from_cells(&snapshot.cells);
        let clusters = unify_furniture(&entries);
        let aisle_one = clusters
            .iter()
            .find(|cluster| cluster.name == "Aisle 1")
            .expect("aisle cluster");
        assert_eq!(aisle_one.cells.len(), 5);
        assert_eq!(aisle_one.height(), 5);
    }

    #[test]
    fn load_dir_skips_broken_files_and_fills_missing_ids() {
        let dir = scratch_dir("mixed");
        std::fs::write(
            dir.join("corner-shop.json"),
            r#"{"map": {"name": "Corner", "width": 3, "height": 2}, "cells": []}"#,
        )
        .expect("write fixture");
        std::fs::write(dir.join("broken.json"), "{ not json").expect("write broken");
        std::fs::write(dir.join("notes.txt"), "ignored").expect("write txt");

        let snapshots = load_dir(&dir).expect("dir is readable");
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].map.id, "corner-shop");
        assert_eq!(snapshots[0].map.name, "Corner");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_file_reports_parse_errors() {
        let dir = scratch_dir("parse");
        let path = dir.join("bad.json");
        std::fs::write(&path, r#"{"map": {"width": "wide"}}"#).expect("write fixture");
        assert!(matches!(load_file(&path), Err(FixtureError::Parse { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_falls_back_to_demo() {
        let missing = std::env::temp_dir().join("storemap-fixtures-does-not-exist");
        assert!(matches!(load_dir(&missing), Err(FixtureError::Io { .. })));
        let snapshots = load_or_demo(&missing);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].map.id, DEMO_MAP_ID);
    }
}
