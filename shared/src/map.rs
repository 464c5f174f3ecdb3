use serde::{Deserialize, Serialize};

/// Grid dimensions and display metadata of one store map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPayload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl MapPayload {
    pub const fn grid(&self) -> MapGrid {
        MapGrid {
            cols: self.width,
            rows: self.height,
        }
    }
}

/// The addressable `cols × rows` space. Immutable once a map is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapGrid {
    pub cols: u32,
    pub rows: u32,
}

impl MapGrid {
    pub const fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.cols && (y as u32) < self.rows
    }

    pub const fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Drop cells whose coordinates fall outside the grid.
    /// Returns the kept cells and the number dropped.
    pub fn retain_in_bounds(&self, cells: Vec<LocatedCell>) -> (Vec<LocatedCell>, usize) {
        let total = cells.len();
        let kept: Vec<LocatedCell> = cells
            .into_iter()
            .filter(|cell| self.contains(cell.x, cell.y))
            .collect();
        let dropped = total - kept.len();
        (kept, dropped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// What a placed object is. Only `Furniture` takes part in cluster merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    #[default]
    Furniture,
    Wall,
    Exit,
    Entrance,
    Checkout,
}

impl ObjectKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Furniture => "Furniture",
            Self::Wall => "Wall",
            Self::Exit => "Exit",
            Self::Entrance => "Entrance",
            Self::Checkout => "Checkout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureInfo {
    pub name: String,
    /// Shelf subdivision used for product slotting.
    #[serde(default)]
    pub rows: u32,
    #[serde(default)]
    pub columns: u32,
    #[serde(default)]
    pub walkable: bool,
    #[serde(default)]
    pub kind: ObjectKind,
}

impl FurnitureInfo {
    /// "rows×columns", or `None` when the furniture has no subdivision.
    pub fn subdivision_label(&self) -> Option<String> {
        if self.rows == 0 || self.columns == 0 {
            return None;
        }
        Some(format!("{}\u{00D7}{}", self.rows, self.columns))
    }

    pub const fn slot_count(&self) -> u32 {
        self.rows * self.columns
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplenishmentPoint {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub product: Option<ProductRef>,
}

impl ReplenishmentPoint {
    pub const fn is_occupied(&self) -> bool {
        self.product.is_some()
    }
}

/// Occupancy record for one grid coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedCell {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub furniture: Option<FurnitureInfo>,
    #[serde(default, alias = "point")]
    pub replenishment_point: Option<ReplenishmentPoint>,
}

impl LocatedCell {
    pub const fn floor(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            furniture: None,
            replenishment_point: None,
        }
    }

    pub const fn position(&self) -> GridPoint {
        GridPoint::new(self.x, self.y)
    }

    pub fn has_occupied_point(&self) -> bool {
        self.replenishment_point
            .as_ref()
            .is_some_and(ReplenishmentPoint::is_occupied)
    }

    /// Neither furniture nor a stocked point: drawn on the canvas layer.
    pub fn is_open_floor(&self) -> bool {
        self.furniture.is_none() && !self.has_occupied_point()
    }

    pub fn product(&self) -> Option<&ProductRef> {
        self.replenishment_point.as_ref()?.product.as_ref()
    }

    /// Furniture name, falling back to the stocked product name.
    pub fn display_name(&self) -> Option<&str> {
        if let Some(furniture) = &self.furniture {
            return Some(furniture.name.as_str());
        }
        self.product().map(|product| product.name.as_str())
    }
}

/// One replenishment stop on the optimized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    /// Cell the route walks to in order to service the point.
    pub access_x: i32,
    pub access_y: i32,
    pub visit_order: u32,
    /// Logical location of the replenishment point (usually a shelf cell).
    #[serde(default)]
    pub point_x: Option<i32>,
    #[serde(default)]
    pub point_y: Option<i32>,
    #[serde(default)]
    pub product: Option<ProductRef>,
}

impl RouteStop {
    pub const fn access(&self) -> GridPoint {
        GridPoint::new(self.access_x, self.access_y)
    }

    pub fn point(&self) -> Option<GridPoint> {
        Some(GridPoint::new(self.point_x?, self.point_y?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOverlay {
    #[serde(default)]
    pub waypoints: Vec<GridPoint>,
    #[serde(default)]
    pub stops: Vec<RouteStop>,
}

impl RouteOverlay {
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty() && self.stops.is_empty()
    }

    /// Stops sorted by visit order.
    pub fn ordered_stops(&self) -> Vec<&RouteStop> {
        let mut stops: Vec<&RouteStop> = self.stops.iter().collect();
        stops.sort_by_key(|stop| stop.visit_order);
        stops
    }
}

/// Everything the renderer needs for one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    pub map: MapPayload,
    #[serde(default)]
    pub cells: Vec<LocatedCell>,
    #[serde(default)]
    pub route: Option<RouteOverlay>,
}

impl MapSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub const fn grid(&self) -> MapGrid {
        self.map.grid()
    }

    /// Same snapshot with out-of-grid cells removed. Returns the dropped count.
    pub fn sanitized(mut self) -> (Self, usize) {
        let cells = std::mem::take(&mut self.cells);
        let (cells, dropped) = self.grid().retain_in_bounds(cells);
        self.cells = cells;
        (self, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str) -> ProductRef {
        ProductRef {
            id: None,
            name: name.to_string(),
            sku: None,
        }
    }

    #[test]
    fn grid_contains_respects_bounds() {
        let grid = MapGrid::new(4, 3);
        assert!(grid.contains(0, 0));
        assert!(grid.contains(3, 2));
        assert!(!grid.contains(4, 0));
        assert!(!grid.contains(0, 3));
        assert!(!grid.contains(-1, 1));
    }

    #[test]
    fn retain_in_bounds_reports_dropped_cells() {
        let grid = MapGrid::new(2, 2);
        let cells = vec![
            LocatedCell::floor(0, 0),
            LocatedCell::floor(2, 0),
            LocatedCell::floor(1, 1),
            LocatedCell::floor(0, -1),
        ];
        let (kept, dropped) = grid.retain_in_bounds(cells);
        assert_eq!(dropped, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].position(), GridPoint::new(1, 1));
    }

    #[test]
    fn point_without_product_is_open_floor() {
        let mut cell = LocatedCell::floor(1, 1);
        cell.replenishment_point = Some(ReplenishmentPoint::default());
        assert!(cell.is_open_floor());
        assert!(!cell.has_occupied_point());

        cell.replenishment_point = Some(ReplenishmentPoint {
            id: Some(7),
            product: Some(product("Milk")),
        });
        assert!(!cell.is_open_floor());
        assert_eq!(cell.display_name(), Some("Milk"));
    }

    #[test]
    fn furniture_name_wins_over_product_name() {
        let cell = LocatedCell {
            x: 0,
            y: 0,
            furniture: Some(FurnitureInfo {
                name: "Dairy".to_string(),
                rows: 2,
                columns: 3,
                walkable: false,
                kind: ObjectKind::Furniture,
            }),
            replenishment_point: Some(ReplenishmentPoint {
                id: None,
                product: Some(product("Yogurt")),
            }),
        };
        assert_eq!(cell.display_name(), Some("Dairy"));
    }

    #[test]
    fn subdivision_label_needs_both_counts() {
        let mut info = FurnitureInfo {
            name: "Shelf".to_string(),
            rows: 3,
            columns: 4,
            walkable: false,
            kind: ObjectKind::Furniture,
        };
        assert_eq!(info.subdivision_label().as_deref(), Some("3\u{00D7}4"));
        assert_eq!(info.slot_count(), 12);
        info.columns = 0;
        assert_eq!(info.subdivision_label(), None);
    }

    #[test]
    fn parses_backend_payload_with_point_alias() {
        let json = r#"{
            "map": {"id": "m1", "name": "Store", "width": 5, "height": 4},
            "cells": [
                {"x": 0, "y": 0, "furniture": {"name": "Gondola", "rows": 2, "columns": 4, "walkable": false}},
                {"x": 1, "y": 0, "point": {"product": {"name": "Rice"}}},
                {"x": 2, "y": 0, "furniture": {"name": "North wall", "kind": "wall"}}
            ],
            "route": {
                "waypoints": [{"x": 0, "y": 1}, {"x": 1, "y": 1}],
                "stops": [{"accessX": 1, "accessY": 1, "visitOrder": 1, "pointX": 1, "pointY": 0}]
            }
        }"#;
        let snapshot = MapSnapshot::from_json(json).expect("payload should parse");
        assert_eq!(snapshot.grid(), MapGrid::new(5, 4));
        assert_eq!(snapshot.cells.len(), 3);
        assert_eq!(snapshot.cells[1].display_name(), Some("Rice"));
        assert_eq!(
            snapshot.cells[2].furniture.as_ref().map(|f| f.kind),
            Some(ObjectKind::Wall)
        );
        let route = snapshot.route.expect("route should parse");
        assert_eq!(route.stops[0].access(), GridPoint::new(1, 1));
        assert_eq!(route.stops[0].point(), Some(GridPoint::new(1, 0)));
    }

    #[test]
    fn ordered_stops_sorts_by_visit_order() {
        let stop = |order: u32| RouteStop {
            access_x: order as i32,
            access_y: 0,
            visit_order: order,
            point_x: None,
            point_y: None,
            product: None,
        };
        let route = RouteOverlay {
            waypoints: Vec::new(),
            stops: vec![stop(3), stop(1), stop(2)],
        };
        let orders: Vec<u32> = route.ordered_stops().iter().map(|s| s.visit_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn sanitized_snapshot_drops_out_of_range_cells() {
        let snapshot = MapSnapshot {
            map: MapPayload {
                id: String::new(),
                name: String::new(),
                width: 3,
                height: 3,
            },
            cells: vec![LocatedCell::floor(3, 0), LocatedCell::floor(2, 2)],
            route: None,
        };
        let (clean, dropped) = snapshot.sanitized();
        assert_eq!(dropped, 1);
        assert_eq!(clean.cells, vec![LocatedCell::floor(2, 2)]);
    }
}
