//! Two-layer store map: a canvas for open floor and the route, and an
//! absolutely positioned DOM layer for everything interactive.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use storemap_shared::{
    CanvasPlan, ContainerSize, FurnitureCluster, GridGeometry, HoverState, LocatedCell,
    MapSnapshot, MapStats, OverlayDescriptor, OverlayKind, OverlayPlan, TooltipInfo,
    entries_from_cells, find_cluster_containing, unify_furniture,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, PointerEvent};

use crate::colors::{PANEL_BACKGROUND, PANEL_BORDER, TEXT_MUTED, TEXT_PRIMARY};
use crate::overlay::{cell_style, cluster_style, product_marker_style};
use crate::render_loop::RedrawScheduler;
use crate::renderer;
use crate::tooltip::Tooltip;

struct ResizeBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn remove_resize_binding() {
    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.window.remove_event_listener_with_callback(
                "resize",
                old.handler.as_ref().unchecked_ref(),
            );
        }
    });
}

/// Name whose cells should highlight when the pointer is over `cell`.
///
/// Furniture resolves to its unit so the whole merged group lights up; a
/// stocked point on open floor resolves to its product.
pub fn hover_target<'a>(
    cell: &'a LocatedCell,
    clusters: &'a [FurnitureCluster],
) -> Option<&'a str> {
    if cell.is_open_floor() {
        return None;
    }
    if let Some(cluster) = find_cluster_containing(cell.x, cell.y, clusters) {
        return Some(cluster.name.as_str());
    }
    cell.display_name()
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
}

#[component]
pub fn MapViewer(
    #[prop(into)] snapshot: Signal<Arc<MapSnapshot>>,
    #[prop(into)] show_route: Signal<bool>,
    #[prop(into)] show_units: Signal<bool>,
    #[prop(into)] show_info: Signal<bool>,
    hover: RwSignal<HoverState>,
    #[prop(into)] on_cell_click: Callback<LocatedCell>,
) -> impl IntoView {
    let container_ref = NodeRef::<leptos::html::Div>::new();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let container: RwSignal<ContainerSize> = RwSignal::new(ContainerSize::default());
    let pointer: RwSignal<(f64, f64)> = RwSignal::new((0.0, 0.0));

    let clusters = Memo::new(move |_| {
        snapshot.with(|s| Arc::new(unify_furniture(&entries_from_cells(&s.cells))))
    });

    // One geometry value per container snapshot; both plans read it.
    let geometry =
        Memo::new(move |_| GridGeometry::new(snapshot.with(|s| s.grid()), container.get()));

    let canvas_plan = Memo::new(move |_| {
        let geometry = geometry.get();
        let show_route = show_route.get();
        snapshot.with(|s| CanvasPlan::build(s, geometry, show_route))
    });

    let overlay_plan = Memo::new(move |_| {
        let geometry = geometry.get();
        let clusters = clusters.get();
        hover.with(|hover| {
            snapshot.with(|s| OverlayPlan::build(&s.cells, &clusters, hover, &geometry))
        })
    });

    let stats = Memo::new(move |_| {
        let clusters = clusters.get();
        snapshot.with(|s| MapStats::collect(&s.cells, &clusters))
    });

    let last_drawn: Rc<RefCell<Option<(CanvasPlan, f64)>>> = Rc::new(RefCell::new(None));
    let scheduler = Rc::new(RedrawScheduler::new(move || {
        let Some(el) = container_ref.get_untracked() else {
            return;
        };
        // Always read the live box; cached sizes may predate layout.
        let size = ContainerSize::new(el.client_width() as f64, el.client_height() as f64);
        if container.get_untracked() != size {
            container.set(size);
        }

        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(plan) = canvas_plan.get_untracked() else {
            return;
        };
        let dpr = device_pixel_ratio();
        let frame = (plan, dpr);
        if last_drawn.borrow().as_ref() == Some(&frame) {
            return;
        }
        if renderer::draw(canvas, &frame.0, dpr) {
            *last_drawn.borrow_mut() = Some(frame);
        }
    }));

    // Redraw whenever the canvas plan changes.
    let sched_plan = scheduler.clone();
    Effect::new(move || {
        canvas_plan.track();
        sched_plan.request();
    });

    // Post-mount measurement: the first frame after mount sees final layout.
    let sched_mount = scheduler.clone();
    Effect::new(move || {
        if container_ref.get().is_some() {
            sched_mount.request();
        }
    });

    let sched_resize = scheduler.clone();
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        remove_resize_binding();
        let sched = sched_resize.clone();
        let handler = Closure::<dyn Fn()>::new(move || sched.request());
        if window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            RESIZE_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(ResizeBinding {
                    window: window.clone(),
                    handler,
                });
            });
        }
    });
    on_cleanup(remove_resize_binding);

    let on_mouse_move = move |e: MouseEvent| {
        pointer.set((e.client_x() as f64, e.client_y() as f64));
        let Some(el) = container_ref.get_untracked() else {
            return;
        };
        let rect = el.get_bounding_client_rect();
        let local_x = e.client_x() as f64 - rect.left();
        let local_y = e.client_y() as f64 - rect.top();

        let hit = geometry.get_untracked().cell_at(local_x, local_y).and_then(|point| {
            snapshot.with_untracked(|s| {
                s.cells
                    .iter()
                    .find(|cell| cell.position() == point && !cell.is_open_floor())
                    .cloned()
            })
        });
        let target = hit.as_ref().and_then(|cell| {
            clusters.with_untracked(|clusters| hover_target(cell, clusters).map(str::to_string))
        });

        let point = hit.as_ref().map(LocatedCell::position);
        let changed =
            hover.with_untracked(|h| h.name() != target.as_deref() || h.cell() != point);
        if changed {
            hover.update(|h| h.focus(target, point));
        }
    };

    let on_pointer_leave = move |_: PointerEvent| {
        if !hover.with_untracked(HoverState::is_idle) {
            hover.update(HoverState::leave);
        }
    };

    let tooltip = Signal::derive(move || {
        let point = hover.with(HoverState::cell)?;
        snapshot.with(|s| {
            s.cells
                .iter()
                .find(|cell| cell.position() == point)
                .and_then(TooltipInfo::for_cell)
        })
    });

    view! {
        <div
            node_ref=container_ref
            style="position: relative; width: 100%; height: 100%; overflow: hidden;"
            on:mousemove=on_mouse_move
            on:pointerleave=on_pointer_leave
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%;"
            />
            <div style="position: absolute; inset: 0;">
                {move || {
                    overlay_plan
                        .get()
                        .cells
                        .into_iter()
                        .map(|descriptor| overlay_cell(descriptor, on_cell_click))
                        .collect_view()
                }}
                {move || {
                    show_units
                        .get()
                        .then(|| {
                            overlay_plan
                                .get()
                                .clusters
                                .iter()
                                .filter(|cluster| cluster.cell_count > 1)
                                .map(|cluster| view! { <div style=cluster_style(cluster)></div> })
                                .collect_view()
                        })
                }}
            </div>
            {move || {
                show_info
                    .get()
                    .then(|| {
                        view! {
                            <InfoReadout
                                snapshot=snapshot
                                stats=stats
                                container=container
                            />
                        }
                    })
            }}
        </div>
        <Tooltip info=tooltip pointer=pointer />
    }
}

fn overlay_cell(
    descriptor: OverlayDescriptor,
    on_cell_click: Callback<LocatedCell>,
) -> impl IntoView {
    let style = cell_style(&descriptor);
    let marker_style = (descriptor.kind == OverlayKind::Furniture && descriptor.product.is_some())
        .then(|| product_marker_style(&descriptor));
    let key = format!("{},{}", descriptor.cell.x, descriptor.cell.y);
    let label = descriptor.name;
    let cell = descriptor.cell;
    view! {
        <div
            style=style
            data-cell=key
            aria-label=label
            on:click=move |_| on_cell_click.run(cell.clone())
        >
            {marker_style.map(|style| view! { <span style=style></span> })}
        </div>
    }
}

/// Map name, grid size and counts.
#[component]
fn InfoReadout(
    snapshot: Signal<Arc<MapSnapshot>>,
    stats: Memo<MapStats>,
    container: RwSignal<ContainerSize>,
) -> impl IntoView {
    let body = move || {
        let stats = stats.get();
        let size = container.get();
        let (title, cols, rows) =
            snapshot.with(|s| (s.map.name.clone(), s.map.width, s.map.height));
        let lines = vec![
            ("Grid", format!("{cols} \u{00D7} {rows}")),
            ("Furniture cells", stats.furniture_cells.to_string()),
            ("Furniture units", stats.furniture_units.to_string()),
            ("Stocked points", stats.products.to_string()),
            ("Objects", stats.objects.to_string()),
            ("Viewport", format!("{:.0} \u{00D7} {:.0}px", size.width, size.height)),
        ];
        view! {
            <div style=format!("color: {TEXT_PRIMARY}; font-weight: 600; margin-bottom: 4px;")>
                {title}
            </div>
            {lines
                .into_iter()
                .map(|(label, value)| {
                    view! {
                        <div style="display: flex; justify-content: space-between; gap: 16px;">
                            <span style=format!("color: {TEXT_MUTED};")>{label}</span>
                            <span>{value}</span>
                        </div>
                    }
                })
                .collect_view()}
        }
    };

    view! {
        <div style=format!(
            "position: absolute; top: 12px; left: 12px; z-index: 20; pointer-events: none; padding: 8px 10px; min-width: 190px; background: {PANEL_BACKGROUND}; border: 1px solid {PANEL_BORDER}; border-radius: 6px; color: {TEXT_PRIMARY}; font-family: 'JetBrains Mono', monospace; font-size: 0.72rem;"
        )>
            {body}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::hover_target;
    use storemap_shared::{
        FurnitureInfo, LocatedCell, ObjectKind, ProductRef, ReplenishmentPoint,
        entries_from_cells, unify_furniture,
    };

    fn placed(x: i32, y: i32, name: &str, kind: ObjectKind) -> LocatedCell {
        LocatedCell {
            x,
            y,
            furniture: Some(FurnitureInfo {
                name: name.to_string(),
                rows: 0,
                columns: 0,
                walkable: false,
                kind,
            }),
            replenishment_point: None,
        }
    }

    #[test]
    fn furniture_resolves_to_its_unit() {
        let cells = vec![
            placed(0, 0, "Gondola", ObjectKind::Furniture),
            placed(1, 0, "Gondola", ObjectKind::Furniture),
        ];
        let clusters = unify_furniture(&entries_from_cells(&cells));
        assert_eq!(hover_target(&cells[1], &clusters), Some("Gondola"));
    }

    #[test]
    fn non_furniture_and_products_use_display_name() {
        let exit = placed(3, 3, "Exit", ObjectKind::Exit);
        let mut stocked = LocatedCell::floor(2, 2);
        stocked.replenishment_point = Some(ReplenishmentPoint {
            id: None,
            product: Some(ProductRef {
                id: None,
                name: "Bread".to_string(),
                sku: None,
            }),
        });
        assert_eq!(hover_target(&exit, &[]), Some("Exit"));
        assert_eq!(hover_target(&stocked, &[]), Some("Bread"));
        assert_eq!(hover_target(&LocatedCell::floor(0, 0), &[]), None);
    }
}
