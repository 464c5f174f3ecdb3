use leptos::prelude::*;
use storemap_shared::TooltipInfo;

use crate::colors::{ACCENT, PANEL_BACKGROUND, PANEL_BORDER, TEXT_MUTED, TEXT_PRIMARY};

const TOOLTIP_OFFSET_PX: f64 = 14.0;

/// Label/value rows shown under the tooltip title.
pub fn tooltip_rows(info: &TooltipInfo) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Type", info.kind.to_string())];
    if let Some(subdivision) = &info.subdivision {
        rows.push(("Slots", subdivision.clone()));
    }
    if let Some(walkable) = info.walkable {
        rows.push(("Walkable", if walkable { "yes" } else { "no" }.to_string()));
    }
    if let Some(product) = &info.product
        && *product != info.name
    {
        rows.push(("Product", product.clone()));
    }
    rows.push((
        "Cell",
        format!("{}, {}", info.position.x, info.position.y),
    ));
    rows
}

/// Hover card that follows the pointer.
#[component]
pub fn Tooltip(
    #[prop(into)] info: Signal<Option<TooltipInfo>>,
    #[prop(into)] pointer: Signal<(f64, f64)>,
) -> impl IntoView {
    move || {
        let info = info.get()?;
        let (x, y) = pointer.get();
        let rows = tooltip_rows(&info)
            .into_iter()
            .map(|(label, value)| {
                view! {
                    <div style="display: flex; justify-content: space-between; gap: 12px;">
                        <span style=format!("color: {TEXT_MUTED};")>{label}</span>
                        <span>{value}</span>
                    </div>
                }
            })
            .collect_view();
        Some(view! {
            <div style=format!(
                "position: fixed; left: {}px; top: {}px; z-index: 30; pointer-events: none; min-width: 160px; padding: 8px 10px; background: {PANEL_BACKGROUND}; border: 1px solid {PANEL_BORDER}; border-radius: 6px; color: {TEXT_PRIMARY}; font-family: 'JetBrains Mono', monospace; font-size: 0.72rem; box-shadow: 0 6px 18px rgba(0,0,0,0.45);",
                x + TOOLTIP_OFFSET_PX,
                y + TOOLTIP_OFFSET_PX,
            )>
                <div style=format!("color: {ACCENT}; font-weight: 600; margin-bottom: 4px;")>
                    {info.name.clone()}
                </div>
                {rows}
            </div>
        })
    }
}
