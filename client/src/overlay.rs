//! Inline styles for the DOM overlay layer.
//!
//! Every position comes straight from a descriptor's `CellBox`, so overlay
//! elements land on the same pixels the canvas would use for that cell.

use storemap_shared::{CellBox, ClusterOverlay, OverlayDescriptor, OverlayKind};
use storemap_shared::colors::highlight_color;

use crate::colors::{
    CHECKOUT_FILL, ENTRANCE_FILL, EXIT_FILL, PRODUCT_FILL, WALL_FILL, rgba_css,
};

fn box_css(cell_box: &CellBox) -> String {
    format!(
        "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;border-radius:{}px;",
        cell_box.left,
        cell_box.top,
        cell_box.width,
        cell_box.height,
        cell_box.corner_radius(),
    )
}

pub fn kind_fill(kind: OverlayKind, color: Option<(u8, u8, u8)>) -> (u8, u8, u8) {
    match kind {
        OverlayKind::Furniture => color.unwrap_or(WALL_FILL),
        OverlayKind::Product => PRODUCT_FILL,
        OverlayKind::Wall => WALL_FILL,
        OverlayKind::Exit => EXIT_FILL,
        OverlayKind::Entrance => ENTRANCE_FILL,
        OverlayKind::Checkout => CHECKOUT_FILL,
    }
}

/// Style for one occupied cell.
pub fn cell_style(descriptor: &OverlayDescriptor) -> String {
    let (r, g, b) = kind_fill(descriptor.kind, descriptor.color);
    let (fill, border) = if descriptor.highlighted {
        let (hr, hg, hb) = highlight_color(r, g, b);
        (rgba_css(hr, hg, hb, 0.95), "rgba(255,255,255,0.85)".to_string())
    } else {
        (rgba_css(r, g, b, 0.85), rgba_css(r, g, b, 1.0))
    };
    let cursor = if descriptor.kind == OverlayKind::Wall {
        "default"
    } else {
        "pointer"
    };
    format!(
        "{}box-sizing:border-box;background:{fill};border:1px solid {border};cursor:{cursor};",
        box_css(&descriptor.cell_box),
    )
}

/// Style for the small product dot inside a stocked furniture cell.
pub fn product_marker_style(descriptor: &OverlayDescriptor) -> String {
    let size = (descriptor.cell_box.width.min(descriptor.cell_box.height) * 0.3).clamp(4.0, 12.0);
    let (r, g, b) = PRODUCT_FILL;
    format!(
        "position:absolute;left:50%;top:50%;width:{size}px;height:{size}px;margin:-{half}px 0 0 -{half}px;border-radius:50%;background:{};pointer-events:none;",
        rgba_css(r, g, b, 1.0),
        half = size / 2.0,
    )
}

/// Outline spanning a whole furniture unit. Never intercepts pointer events.
pub fn cluster_style(cluster: &ClusterOverlay) -> String {
    let (r, g, b) = if cluster.highlighted {
        let (r, g, b) = cluster.color;
        highlight_color(r, g, b)
    } else {
        cluster.color
    };
    let width = if cluster.highlighted { 2.5 } else { 1.5 };
    format!(
        "{}box-sizing:border-box;border:{width}px solid {};pointer-events:none;",
        box_css(&cluster.cell_box),
        rgba_css(r, g, b, 1.0),
    )
}
