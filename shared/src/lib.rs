pub mod colors;
pub mod geometry;
pub mod map;
pub mod render;
pub mod unify;

pub use colors::furniture_color;
pub use geometry::{
    BoundingBox, CELL_GAP_PX, CELL_RADIUS_PX, CellBox, ContainerSize, GridGeometry,
    compute_cell_box,
};
pub use map::*;
pub use render::{
    CanvasPlan, ClusterOverlay, HoverState, MapStats, OverlayDescriptor, OverlayKind,
    OverlayPlan, RoutePlan, StopMarker, TooltipInfo,
};
pub use unify::{
    FurnitureCluster, FurnitureEntry, entries_from_cells, find_cluster_containing, unify_furniture,
};
