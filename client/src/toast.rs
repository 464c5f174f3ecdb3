use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use crate::colors::{PANEL_BACKGROUND, TEXT_PRIMARY};

const TOAST_DURATION_MS: u32 = 5_000;

/// One-shot notification. Setting `message` shows it; it clears itself after
/// a few seconds or when clicked.
#[component]
pub fn Toast(message: RwSignal<Option<String>>) -> impl IntoView {
    Effect::new(move || {
        let Some(shown) = message.get() else {
            return;
        };
        let timeout = Timeout::new(TOAST_DURATION_MS, move || {
            if message.get_untracked().as_deref() == Some(shown.as_str()) {
                message.set(None);
            }
        });
        timeout.forget();
    });

    move || {
        let text = message.get()?;
        Some(view! {
            <div
                role="alert"
                style=format!(
                    "position: fixed; left: 50%; bottom: 24px; transform: translateX(-50%); z-index: 40; padding: 10px 16px; background: {PANEL_BACKGROUND}; border: 1px solid rgba(235,87,87,0.6); border-radius: 6px; color: {TEXT_PRIMARY}; font-family: 'JetBrains Mono', monospace; font-size: 0.78rem; cursor: pointer;"
                )
                on:click=move |_| message.set(None)
            >
                {text}
            </div>
        })
    }
}
