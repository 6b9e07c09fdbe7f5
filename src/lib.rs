//! # Automation Editor
//!
//! The visual workflow editor of a CRM's automation builder. Users place trigger,
//! condition and action nodes on an infinite, pannable and zoomable canvas and wire them
//! together by dragging connectors between handles.
//!
//! The editing core is headless and fully testable without a window:
//! - [`graph`]: node/edge storage that refuses self-loops, duplicates and illegal topology
//! - [`transform`] and [`view`]: screen ↔ canvas mapping and pan/zoom state
//! - [`engine`]: the pointer state machine for panning, node drags and connector drags
//! - [`migration`]: one-way upgrade of single trigger/action records to graph form
//! - [`templates`]: the palette's node catalogue
//!
//! A thin egui/eframe shell (see [`run_app`]) drives the core.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod engine;
pub mod graph;
pub mod migration;
pub mod session;
pub mod templates;
pub mod transform;
pub mod types;
pub mod view;
mod ui;

// Re-export the types most callers need
pub use engine::{DragOutcome, HitTarget, Interaction};
pub use graph::{Graph, GraphError};
pub use migration::{materialize, WorkflowRecord};
pub use session::EditorSession;
pub use templates::NodeTemplate;
pub use types::*;
pub use view::ViewState;
use ui::{AutomationEditorApp, APP_STATE_KEY};

/// Runs the editor with default window settings.
///
/// UI preferences saved by a previous run are restored from eframe storage; the editor
/// always starts with an empty automation.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// use automation_editor::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Automation Editor"),
        ..Default::default()
    };
    eframe::run_native(
        "Automation Editor",
        options,
        Box::new(|cc| {
            let app = cc
                .storage
                .and_then(|storage| storage.get_string(APP_STATE_KEY))
                .and_then(|json| match AutomationEditorApp::from_json(&json) {
                    Ok(app) => Some(app),
                    Err(err) => {
                        log::warn!("ignoring unreadable saved preferences: {err}");
                        None
                    }
                })
                .unwrap_or_default();
            Ok(Box::new(app))
        }),
    )
}
