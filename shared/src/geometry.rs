//! Grid-to-pixel geometry shared by the canvas layer and the overlay layer.
//!
//! Both layers must call [`compute_cell_box`] (directly or through
//! [`GridGeometry`]) so a grid cell lands on exactly the same pixels in each.

use crate::map::{GridPoint, MapGrid};

/// Inset subtracted from every cell box so neighbours never touch.
pub const CELL_GAP_PX: f64 = 4.0;
/// Corner radius of a rendered cell.
pub const CELL_RADIUS_PX: f64 = 10.0;

/// Container pixel dimensions captured at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Pixel box of one rendered cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CellBox {
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Corner radius clamped to half of the shorter side.
    pub fn corner_radius(&self) -> f64 {
        CELL_RADIUS_PX.min(self.width.min(self.height) / 2.0).max(0.0)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.left
            && px <= self.left + self.width
            && py >= self.top
            && py <= self.top + self.height
    }
}

/// Inclusive grid-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    pub const fn cell(x: i32, y: i32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub const fn width(&self) -> i32 {
        self.max_x.saturating_sub(self.min_x).saturating_add(1)
    }

    pub const fn height(&self) -> i32 {
        self.max_y.saturating_sub(self.min_y).saturating_add(1)
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn include(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// The single cell-box formula. `cellW = W / cols`, `cellH = H / rows`, no
/// snapping; the gap is split evenly on both sides of the cell.
pub fn compute_cell_box(
    x: i32,
    y: i32,
    cols: u32,
    rows: u32,
    container_w: f64,
    container_h: f64,
) -> CellBox {
    let cell_w = container_w / cols.max(1) as f64;
    let cell_h = container_h / rows.max(1) as f64;
    let inset = CELL_GAP_PX / 2.0;
    CellBox {
        left: x as f64 * cell_w + inset,
        top: y as f64 * cell_h + inset,
        width: (cell_w - CELL_GAP_PX).max(0.0),
        height: (cell_h - CELL_GAP_PX).max(0.0),
    }
}

/// A grid bound to one container snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub grid: MapGrid,
    pub container: ContainerSize,
}

impl GridGeometry {
    pub const fn new(grid: MapGrid, container: ContainerSize) -> Self {
        Self { grid, container }
    }

    pub fn is_drawable(&self) -> bool {
        self.grid.cols > 0 && self.grid.rows > 0 && !self.container.is_empty()
    }

    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.container.width / self.grid.cols.max(1) as f64,
            self.container.height / self.grid.rows.max(1) as f64,
        )
    }

    pub fn cell_box(&self, x: i32, y: i32) -> CellBox {
        compute_cell_box(
            x,
            y,
            self.grid.cols,
            self.grid.rows,
            self.container.width,
            self.container.height,
        )
    }

    pub fn cell_center(&self, x: i32, y: i32) -> (f64, f64) {
        self.cell_box(x, y).center()
    }

    /// Box covering a whole rectangle of cells, inset on its outer edges only.
    pub fn union_box(&self, bounds: &BoundingBox) -> CellBox {
        let first = self.cell_box(bounds.min_x, bounds.min_y);
        let last = self.cell_box(bounds.max_x, bounds.max_y);
        CellBox {
            left: first.left,
            top: first.top,
            width: (last.left + last.width - first.left).max(0.0),
            height: (last.top + last.height - first.top).max(0.0),
        }
    }

    /// Map a container-relative pixel back to the grid cell under it.
    pub fn cell_at(&self, px: f64, py: f64) -> Option<GridPoint> {
        if !self.is_drawable() || px < 0.0 || py < 0.0 {
            return None;
        }
        let (cell_w, cell_h) = self.cell_size();
        let x = (px / cell_w).floor() as i32;
        let y = (py / cell_h).floor() as i32;
        self.grid.contains(x, y).then_some(GridPoint::new(x, y))
    }
}
