// SPDX-License-Identifier: MIT OR Apache-2.0
//! Planwright - visual editor for planning domains
//!
//! Types, objects, predicates and actions are edited as nodes on a canvas:
//! - Palette to drag new nodes onto the canvas
//! - Canvas with validated connections and animated flow edges
//! - Properties panel with draft editing and object pickers
//! - Log with tracing output and notification history
//! - Snapshot of the committed graph as RON
//!
//! ## Architecture
//!
//! All planning semantics live in `planwright_editor_graph`; this binary
//! hosts its surface in an egui window with `egui_dock` panels.

mod app;
mod panel_types;
mod panels;
mod settings;
mod toasts;

use app::EditorApp;
use panels::console::TracingBridge;
use settings::EditorSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Directives applied on top of `RUST_LOG`
const LOG_DIRECTIVES: [&str; 4] = [
    "planwright_editor_app=debug",
    "planwright_editor_graph=debug",
    "wgpu=warn",
    "naga=warn",
];

fn main() {
    // Create the log panel tracing bridge (channel pair)
    let (bridge_layer, tracing_rx) = TracingBridge::new();

    let env_filter = LOG_DIRECTIVES
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::from_default_env(), EnvFilter::add_directive);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(bridge_layer)
        .init();

    tracing::info!("Starting Planwright v{}", env!("CARGO_PKG_VERSION"));

    let settings = EditorSettings::load_or_default();

    if let Err(e) = EditorApp::run(settings, Some(tracing_rx)) {
        tracing::error!("Editor crashed: {e}");
        std::process::exit(1);
    }
}
