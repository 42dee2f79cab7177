/// nano-dashboard - options dashboard for a content-blocking browser extension
/// Built with Rust + WASM + Yew

pub mod config;
pub mod controller;
pub mod error;
pub mod messaging;
pub mod settings;
pub mod tabs;
pub mod ui;

pub use error::{DashboardError, Result};

use wasm_bindgen::prelude::*;

use crate::config::DashboardConfig;
use crate::ui::dashboard::{Dashboard, DashboardProps};

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the dashboard with the default configuration
#[wasm_bindgen]
pub fn start_dashboard() {
    yew::Renderer::<Dashboard>::new().render();
}

// Start the dashboard with overrides from the page, e.g. `{ loadTimeoutMs: 5000 }`
#[wasm_bindgen]
pub fn start_dashboard_with(config: JsValue) {
    let config = if config.is_undefined() || config.is_null() {
        DashboardConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed dashboard config: {:?}", e);
            DashboardConfig::default()
        })
    };

    yew::Renderer::<Dashboard>::with_props(DashboardProps { config }).render();
}
