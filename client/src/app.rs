use std::cell::RefCell;
use std::sync::Arc;

use gloo_storage::Storage;
use leptos::prelude::*;
use storemap_shared::{HoverState, LocatedCell, MapSnapshot};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::colors::{
    ACCENT, PAGE_BACKGROUND, PANEL_BACKGROUND, PANEL_BORDER, TEXT_MUTED, TEXT_PRIMARY,
};
use crate::map_viewer::MapViewer;
use crate::toast::Toast;

const SETTINGS_KEY: &str = "storemap_settings";
pub(crate) const DEFAULT_MAP_ID: &str = "demo";
pub(crate) const DEFAULT_API_BASE: &str = "/api";
const MAX_MAP_ID_LEN: usize = 64;

struct KeydownBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// UI toggles persisted across reloads.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    show_route: bool,
    show_units: bool,
    show_info: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_route: true,
            show_units: true,
            show_info: false,
        }
    }
}

/// Which map to show and where to fetch it, taken from the page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ViewerConfig {
    pub map_id: String,
    pub api_base: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            map_id: DEFAULT_MAP_ID.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

fn is_valid_map_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_MAP_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl ViewerConfig {
    /// Parse `?map=<id>&api=<path>`. Unknown keys and invalid values are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "map" if is_valid_map_id(value) => config.map_id = value.to_string(),
                "api" if value.starts_with('/') && value.len() > 1 => {
                    config.api_base = value.trim_end_matches('/').to_string();
                }
                _ => {}
            }
        }
        config
    }

    fn from_location() -> Self {
        web_sys::window()
            .and_then(|window| window.location().search().ok())
            .map(|query| Self::from_query(&query))
            .unwrap_or_default()
    }
}

/// Loading and error are exclusive with drawing: the viewer only mounts on `Ready`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LoadState {
    Loading,
    Ready(Arc<MapSnapshot>),
    Failed(String),
}

fn set_document_title(title: &str) {
    if let Some(document) = web_sys::window().and_then(|window| window.document()) {
        document.set_title(title);
    }
}

/// Root application component. Owns page configuration and passes it down
/// as explicit props.
#[component]
pub fn App() -> impl IntoView {
    let config = ViewerConfig::from_location();
    let saved: Settings = gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default();
    let show_route: RwSignal<bool> = RwSignal::new(saved.show_route);
    let show_units: RwSignal<bool> = RwSignal::new(saved.show_units);
    let show_info: RwSignal<bool> = RwSignal::new(saved.show_info);
    let hover: RwSignal<HoverState> = RwSignal::new(HoverState::default());
    let selected: RwSignal<Option<LocatedCell>> = RwSignal::new(None);
    let load_state: RwSignal<LoadState> = RwSignal::new(LoadState::Loading);
    let toast: RwSignal<Option<String>> = RwSignal::new(None);

    // Persist settings to localStorage on any change
    Effect::new(move || {
        let settings = Settings {
            show_route: show_route.get(),
            show_units: show_units.get(),
            show_info: show_info.get(),
        };
        let _ = gloo_storage::LocalStorage::set(SETTINGS_KEY, &settings);
    });

    // Single fetch on mount; failures are reported once and not retried.
    {
        let config = config.clone();
        spawn_local(async move {
            match api::fetch_snapshot(&config.api_base, &config.map_id).await {
                Ok(snapshot) => {
                    let (snapshot, dropped) = snapshot.sanitized();
                    if dropped > 0 {
                        web_sys::console::info_1(
                            &format!("ignored {dropped} located cells outside the grid").into(),
                        );
                    }
                    if !snapshot.map.name.is_empty() {
                        set_document_title(&format!("{} \u{00B7} Store Map", snapshot.map.name));
                    }
                    load_state.set(LoadState::Ready(Arc::new(snapshot)));
                }
                Err(e) => {
                    web_sys::console::warn_1(
                        &format!("map load failed for {}: {e}", config.map_id).into(),
                    );
                    toast.set(Some(e.user_message()));
                    load_state.set(LoadState::Failed(e.to_string()));
                }
            }
        });
    }

    // Global keyboard shortcuts
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old.handler.as_ref().unchecked_ref(),
                );
            }
        });
        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                if e.ctrl_key() || e.meta_key() || e.alt_key() {
                    return;
                }
                match e.key().as_str() {
                    "Escape" => {
                        hover.update(HoverState::leave);
                        selected.set(None);
                    }
                    "r" => show_route.update(|v| *v = !*v),
                    "u" => show_units.update(|v| *v = !*v),
                    "i" => show_info.update(|v| *v = !*v),
                    _ => {}
                }
            });
        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    handler,
                });
            });
        }
    });

    let on_cell_click = Callback::new(move |cell: LocatedCell| {
        selected.set(Some(cell));
    });

    view! {
        <div style=format!("width: 100%; height: 100%; display: flex; flex-direction: column; background: {PAGE_BACKGROUND}; color: {TEXT_PRIMARY}; font-family: 'JetBrains Mono', monospace;")>
            <Toolbar show_route=show_route show_units=show_units show_info=show_info />
            <div style="flex: 1; position: relative; min-height: 0; padding: 12px;">
                {move || match load_state.get() {
                    LoadState::Loading => placeholder("Loading store map\u{2026}".to_string()).into_any(),
                    LoadState::Failed(reason) => {
                        placeholder(format!("Store map unavailable ({reason}).")).into_any()
                    }
                    LoadState::Ready(snapshot) => {
                        view! {
                            <MapViewer
                                snapshot=Signal::derive(move || snapshot.clone())
                                show_route=show_route
                                show_units=show_units
                                show_info=show_info
                                hover=hover
                                on_cell_click=on_cell_click
                            />
                        }
                            .into_any()
                    }
                }}
            </div>
            <SelectionBar selected=selected />
        </div>
        <Toast message=toast />
    }
}

fn placeholder(text: String) -> impl IntoView {
    view! {
        <div style=format!("position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; color: {TEXT_MUTED}; font-size: 0.85rem;")>
            {text}
        </div>
    }
}

#[component]
fn Toolbar(
    show_route: RwSignal<bool>,
    show_units: RwSignal<bool>,
    show_info: RwSignal<bool>,
) -> impl IntoView {
    let toggle = move |label: &'static str, key: &'static str, signal: RwSignal<bool>| {
        view! {
            <button
                title=format!("Toggle {} ({key})", label.to_lowercase())
                style=move || {
                    let (color, border) = if signal.get() {
                        (ACCENT, "rgba(242,185,75,0.5)")
                    } else {
                        (TEXT_MUTED, PANEL_BORDER)
                    };
                    format!("background: {PANEL_BACKGROUND}; border: 1px solid {border}; border-radius: 6px; color: {color}; padding: 4px 10px; font-family: inherit; font-size: 0.75rem; cursor: pointer;")
                }
                on:click=move |_| signal.update(|v| *v = !*v)
            >
                {label}
            </button>
        }
    };

    view! {
        <div style=format!("display: flex; gap: 8px; align-items: center; padding: 10px 12px; border-bottom: 1px solid {PANEL_BORDER};")>
            <span style=format!("color: {ACCENT}; font-weight: 600; margin-right: 8px;")>"Store Map"</span>
            {toggle("Route", "r", show_route)}
            {toggle("Units", "u", show_units)}
            {toggle("Info", "i", show_info)}
        </div>
    }
}

/// Shows the last clicked cell.
#[component]
fn SelectionBar(selected: RwSignal<Option<LocatedCell>>) -> impl IntoView {
    move || {
        let cell = selected.get()?;
        let name = cell.display_name().unwrap_or("Open floor").to_string();
        let product = cell
            .product()
            .map(|product| match &product.sku {
                Some(sku) => format!(" \u{00B7} {} ({sku})", product.name),
                None => format!(" \u{00B7} {}", product.name),
            })
            .unwrap_or_default();
        Some(view! {
            <div style=format!("padding: 8px 12px; border-top: 1px solid {PANEL_BORDER}; font-size: 0.75rem;")>
                <span style=format!("color: {TEXT_MUTED};")>{format!("({}, {}) ", cell.x, cell.y)}</span>
                {name}
                {product}
            </div>
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_selects_map_and_api_base() {
        let config = ViewerConfig::from_query("?map=corner-market&api=/backend/api/");
        assert_eq!(config.map_id, "corner-market");
        assert_eq!(config.api_base, "/backend/api");
    }

    #[test]
    fn invalid_query_values_keep_defaults() {
        let config = ViewerConfig::from_query("?map=../etc&api=http://elsewhere&zoom=2");
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(ViewerConfig::from_query(""), ViewerConfig::default());
        assert_eq!(ViewerConfig::from_query("?map"), ViewerConfig::default());
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"show_info": true}"#).expect("partial settings parse");
        assert!(settings.show_route);
        assert!(settings.show_units);
        assert!(settings.show_info);
    }
}
