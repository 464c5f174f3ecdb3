//! Canvas 2D executor for the raster layer.
//!
//! All geometry comes from a [`CanvasPlan`]; nothing here computes a cell box.

use storemap_shared::{CanvasPlan, CellBox, ContainerSize, RoutePlan, StopMarker};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::colors::{
    FLOOR_FILL, FLOOR_STROKE, ROUTE_END, ROUTE_LINE, ROUTE_START, ROUTE_STOP, rgba_css,
};

const ROUTE_LINE_ALPHA: f64 = 0.55;
const ENDPOINT_RADIUS_PX: f64 = 7.0;
const STOP_RADIUS_PX: f64 = 9.0;

/// Size the backing store to the container and return a context whose user
/// space is in CSS pixels. `None` when no 2D context is available.
pub fn prepare_canvas(
    canvas: &HtmlCanvasElement,
    size: ContainerSize,
    dpr: f64,
) -> Option<CanvasRenderingContext2d> {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let width = (size.width * dpr).round().max(1.0) as u32;
    let height = (size.height * dpr).round().max(1.0) as u32;
    if canvas.width() != width || canvas.height() != height {
        canvas.set_width(width);
        canvas.set_height(height);
    }

    let ctx = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())?;
    // Resizing resets the transform; set it unconditionally.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
    Some(ctx)
}

/// Run every canvas pass of `plan`. Returns `false` if the pass was skipped.
pub fn draw(canvas: &HtmlCanvasElement, plan: &CanvasPlan, dpr: f64) -> bool {
    let Some(ctx) = prepare_canvas(canvas, plan.geometry.container, dpr) else {
        web_sys::console::warn_1(&"2D canvas context unavailable; skipping map draw".into());
        return false;
    };
    draw_background(&ctx, plan);
    if let Some(route) = &plan.route {
        draw_route(&ctx, route);
    }
    true
}

/// Clear the surface and paint every open-floor cell.
pub fn draw_background(ctx: &CanvasRenderingContext2d, plan: &CanvasPlan) {
    let container = plan.geometry.container;
    ctx.clear_rect(0.0, 0.0, container.width, container.height);

    let (fr, fg, fb) = FLOOR_FILL;
    let (sr, sg, sb) = FLOOR_STROKE;
    ctx.set_fill_style_str(&rgba_css(fr, fg, fb, 1.0));
    ctx.set_stroke_style_str(&rgba_css(sr, sg, sb, 1.0));
    ctx.set_line_width(1.0);
    for cell_box in &plan.background {
        if cell_box.width <= 0.0 || cell_box.height <= 0.0 {
            continue;
        }
        rounded_rect_path(ctx, cell_box);
        ctx.fill();
        ctx.stroke();
    }
}

/// Polyline runs through waypoint centers, endpoint markers, then numbered stops.
pub fn draw_route(ctx: &CanvasRenderingContext2d, route: &RoutePlan) {
    ctx.save();
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    if route.has_line() {
        let (r, g, b) = ROUTE_LINE;
        ctx.set_stroke_style_str(&rgba_css(r, g, b, ROUTE_LINE_ALPHA));
        ctx.set_line_width(6.0);
        ctx.begin_path();
        for run in route.segments.iter().filter(|run| run.len() > 1) {
            for (idx, &(x, y)) in run.iter().enumerate() {
                if idx == 0 {
                    ctx.move_to(x, y);
                } else {
                    ctx.line_to(x, y);
                }
            }
        }
        ctx.stroke();
    }

    if let Some((x, y)) = route.start {
        draw_disc(ctx, x, y, ENDPOINT_RADIUS_PX, ROUTE_START);
    }
    if let Some((x, y)) = route.end {
        draw_square(ctx, x, y, ENDPOINT_RADIUS_PX, ROUTE_END);
    }
    for stop in &route.stops {
        draw_stop(ctx, stop);
    }

    ctx.restore();
}

fn draw_stop(ctx: &CanvasRenderingContext2d, stop: &StopMarker) {
    let (x, y) = stop.center;
    draw_disc(ctx, x, y, STOP_RADIUS_PX, ROUTE_STOP);

    ctx.set_fill_style_str("#11141c");
    ctx.set_font("bold 11px 'JetBrains Mono', monospace");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(&stop.label, x, y + 0.5).ok();
}

fn draw_disc(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, color: (u8, u8, u8)) {
    let (r, g, b) = color;
    ctx.begin_path();
    ctx.arc(x, y, radius, 0.0, std::f64::consts::TAU).ok();
    ctx.set_fill_style_str(&rgba_css(r, g, b, 1.0));
    ctx.fill();
    ctx.set_stroke_style_str("rgba(12,14,20,0.9)");
    ctx.set_line_width(2.0);
    ctx.stroke();
}

fn draw_square(ctx: &CanvasRenderingContext2d, x: f64, y: f64, half: f64, color: (u8, u8, u8)) {
    let (r, g, b) = color;
    ctx.set_fill_style_str(&rgba_css(r, g, b, 1.0));
    ctx.fill_rect(x - half, y - half, half * 2.0, half * 2.0);
    ctx.set_stroke_style_str("rgba(12,14,20,0.9)");
    ctx.set_line_width(2.0);
    ctx.stroke_rect(x - half, y - half, half * 2.0, half * 2.0);
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, cell_box: &CellBox) {
    let CellBox {
        left,
        top,
        width,
        height,
    } = *cell_box;
    let radius = cell_box.corner_radius();
    let right = left + width;
    let bottom = top + height;

    ctx.begin_path();
    ctx.move_to(left + radius, top);
    ctx.arc_to(right, top, right, bottom, radius).ok();
    ctx.arc_to(right, bottom, left, bottom, radius).ok();
    ctx.arc_to(left, bottom, left, top, radius).ok();
    ctx.arc_to(left, top, right, top, radius).ok();
    ctx.close_path();
}
