//! Pure render plans for the map viewer.
//!
//! The canvas layer draws open floor and the route; the overlay layer hosts
//! everything interactive. Both plans are computed from the same
//! [`GridGeometry`] so the layers stay aligned.

use std::collections::HashSet;

use crate::colors::furniture_color;
use crate::geometry::{CellBox, GridGeometry};
use crate::map::{GridPoint, LocatedCell, MapSnapshot, ObjectKind, RouteOverlay};
use crate::unify::FurnitureCluster;

/// What the pointer is over: the highlighted name and the cell the tooltip
/// describes. The two are cleared together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverState {
    name: Option<String>,
    cell: Option<GridPoint>,
}

impl HoverState {
    pub fn enter(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Replace both the highlighted name and the pointed cell.
    pub fn focus(&mut self, name: Option<String>, cell: Option<GridPoint>) {
        self.name = name;
        self.cell = cell;
    }

    pub fn leave(&mut self) {
        self.name = None;
        self.cell = None;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn cell(&self) -> Option<GridPoint> {
        self.cell
    }

    pub fn is_idle(&self) -> bool {
        self.name.is_none() && self.cell.is_none()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Furniture,
    Product,
    Wall,
    Exit,
    Entrance,
    Checkout,
}

impl From<ObjectKind> for OverlayKind {
    fn from(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Furniture => Self::Furniture,
            ObjectKind::Wall => Self::Wall,
            ObjectKind::Exit => Self::Exit,
            ObjectKind::Entrance => Self::Entrance,
            ObjectKind::Checkout => Self::Checkout,
        }
    }
}

/// One absolutely positioned overlay element.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDescriptor {
    pub cell: LocatedCell,
    pub cell_box: CellBox,
    pub kind: OverlayKind,
    pub name: String,
    /// Product stocked at this cell, drawn as a marker inside the box.
    pub product: Option<String>,
    pub highlighted: bool,
    pub color: Option<(u8, u8, u8)>,
}

impl OverlayDescriptor {
    pub const fn position(&self) -> GridPoint {
        self.cell.position()
    }
}

/// Unified outline drawn over all cells of one furniture cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOverlay {
    pub name: String,
    pub cell_box: CellBox,
    pub cell_count: usize,
    pub highlighted: bool,
    pub color: (u8, u8, u8),
}

fn cell_matches_hover(cell: &LocatedCell, hover: &HoverState) -> bool {
    let furniture_hit = cell
        .furniture
        .as_ref()
        .is_some_and(|furniture| hover.matches(&furniture.name));
    furniture_hit || cell.product().is_some_and(|product| hover.matches(&product.name))
}

/// Descriptors for every in-bounds cell holding furniture or a stocked point.
pub fn overlay_descriptors(
    cells: &[LocatedCell],
    hover: &HoverState,
    geometry: &GridGeometry,
) -> Vec<OverlayDescriptor> {
    cells
        .iter()
        .filter(|cell| geometry.grid.contains(cell.x, cell.y) && !cell.is_open_floor())
        .filter_map(|cell| {
            let name = cell.display_name()?.to_string();
            let (kind, color) = match &cell.furniture {
                Some(furniture) => {
                    let kind = OverlayKind::from(furniture.kind);
                    let color = (kind == OverlayKind::Furniture).then(|| furniture_color(&name));
                    (kind, color)
                }
                None => (OverlayKind::Product, None),
            };
            Some(OverlayDescriptor {
                cell: cell.clone(),
                cell_box: geometry.cell_box(cell.x, cell.y),
                kind,
                product: cell.product().map(|product| product.name.clone()),
                highlighted: cell_matches_hover(cell, hover),
                color,
                name,
            })
        })
        .collect()
}

/// One spanning box per cluster whose extent lies inside the grid.
pub fn cluster_overlays(
    clusters: &[FurnitureCluster],
    hover: &HoverState,
    geometry: &GridGeometry,
) -> Vec<ClusterOverlay> {
    clusters
        .iter()
        .filter(|cluster| {
            let bounds = &cluster.bounding_box;
            geometry.grid.contains(bounds.min_x, bounds.min_y)
                && geometry.grid.contains(bounds.max_x, bounds.max_y)
        })
        .map(|cluster| ClusterOverlay {
            name: cluster.name.clone(),
            cell_box: geometry.union_box(&cluster.bounding_box),
            cell_count: cluster.cells.len(),
            highlighted: hover.matches(&cluster.name),
            color: furniture_color(&cluster.name),
        })
        .collect()
}

/// Boxes of every open-floor cell, row-major.
pub fn background_plan(cells: &[LocatedCell], geometry: &GridGeometry) -> Vec<CellBox> {
    let occupied: HashSet<(i32, i32)> = cells
        .iter()
        .filter(|cell| !cell.is_open_floor())
        .map(|cell| (cell.x, cell.y))
        .collect();

    let mut boxes = Vec::with_capacity(geometry.grid.cell_count().saturating_sub(occupied.len()));
    for y in 0..geometry.grid.rows as i32 {
        for x in 0..geometry.grid.cols as i32 {
            if !occupied.contains(&(x, y)) {
                boxes.push(geometry.cell_box(x, y));
            }
        }
    }
    boxes
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopMarker {
    /// Cell the marker is anchored to (the access coordinate).
    pub cell: GridPoint,
    pub center: (f64, f64),
    /// 1-based position in the visit sequence.
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutePlan {
    /// Waypoint cell centers, in route order. A waypoint outside the grid
    /// ends the current run, so the stroke never bridges it.
    pub segments: Vec<Vec<(f64, f64)>>,
    pub start: Option<(f64, f64)>,
    pub end: Option<(f64, f64)>,
    pub stops: Vec<StopMarker>,
}

impl RoutePlan {
    pub fn has_line(&self) -> bool {
        self.segments.iter().any(|run| run.len() > 1)
    }
}

pub fn route_plan(route: &RouteOverlay, geometry: &GridGeometry) -> RoutePlan {
    let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut run: Vec<(f64, f64)> = Vec::new();
    let mut drawn = 0usize;
    for point in &route.waypoints {
        if geometry.grid.contains(point.x, point.y) {
            run.push(geometry.cell_center(point.x, point.y));
            drawn += 1;
        } else if !run.is_empty() {
            segments.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        segments.push(run);
    }

    let start = segments.first().and_then(|run| run.first()).copied();
    let end = if drawn > 1 {
        segments.last().and_then(|run| run.last()).copied()
    } else {
        None
    };

    // Labels follow the full visit sequence; a dropped stop leaves a gap.
    let stops = route
        .ordered_stops()
        .into_iter()
        .enumerate()
        .filter(|(_, stop)| geometry.grid.contains(stop.access_x, stop.access_y))
        .map(|(idx, stop)| StopMarker {
            cell: stop.access(),
            center: geometry.cell_center(stop.access_x, stop.access_y),
            label: (idx + 1).to_string(),
        })
        .collect();

    RoutePlan {
        segments,
        start,
        end,
        stops,
    }
}

/// Everything drawn on the raster canvas for one container snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasPlan {
    pub geometry: GridGeometry,
    pub background: Vec<CellBox>,
    pub route: Option<RoutePlan>,
}

impl CanvasPlan {
    /// `None` when the geometry has no drawable area.
    pub fn build(snapshot: &MapSnapshot, geometry: GridGeometry, show_route: bool) -> Option<Self> {
        if !geometry.is_drawable() {
            return None;
        }
        let route = snapshot
            .route
            .as_ref()
            .filter(|route| show_route && !route.is_empty())
            .map(|route| route_plan(route, &geometry));
        Some(Self {
            geometry,
            background: background_plan(&snapshot.cells, &geometry),
            route,
        })
    }
}

/// Everything hosted in the DOM overlay layer for one container snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayPlan {
    pub cells: Vec<OverlayDescriptor>,
    pub clusters: Vec<ClusterOverlay>,
}

impl OverlayPlan {
    pub fn build(
        cells: &[LocatedCell],
        clusters: &[FurnitureCluster],
        hover: &HoverState,
        geometry: &GridGeometry,
    ) -> Self {
        if !geometry.is_drawable() {
            return Self::default();
        }
        Self {
            cells: overlay_descriptors(cells, hover, geometry),
            clusters: cluster_overlays(clusters, hover, geometry),
        }
    }
}

/// Hover card content for one occupied cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipInfo {
    pub name: String,
    pub kind: &'static str,
    pub subdivision: Option<String>,
    pub walkable: Option<bool>,
    pub product: Option<String>,
    pub position: GridPoint,
}

impl TooltipInfo {
    pub fn for_cell(cell: &LocatedCell) -> Option<Self> {
        if cell.is_open_floor() {
            return None;
        }
        let product = cell.product().map(|product| product.name.clone());
        let info = match &cell.furniture {
            Some(furniture) => Self {
                name: furniture.name.clone(),
                kind: furniture.kind.label(),
                subdivision: furniture.subdivision_label(),
                walkable: Some(furniture.walkable),
                product,
                position: cell.position(),
            },
            None => Self {
                name: product.clone().unwrap_or_default(),
                kind: "Product",
                subdivision: None,
                walkable: None,
                product,
                position: cell.position(),
            },
        };
        Some(info)
    }
}

/// Counts shown in the info readout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStats {
    pub furniture_cells: usize,
    pub furniture_units: usize,
    pub products: usize,
    pub objects: usize,
}

impl MapStats {
    pub fn collect(cells: &[LocatedCell], clusters: &[FurnitureCluster]) -> Self {
        let furniture_cells = cells.iter().filter(|cell| cell.furniture.is_some()).count();
        let products = cells.iter().filter(|cell| cell.has_occupied_point()).count();
        let objects = cells.iter().filter(|cell| !cell.is_open_floor()).count();
        Self {
            furniture_cells,
            furniture_units: clusters.len(),
            products,
            objects,
        }
    }
}
