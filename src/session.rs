//! The editing session: one graph together with its view and interaction state.
//!
//! A session owns everything the editor mutates while a workflow is open. The rendering
//! layer receives it by reference; nothing here is global, so the whole editor can be
//! driven headlessly.

use crate::engine::Interaction;
use crate::graph::Graph;
use crate::migration::{materialize, GraphRecord, WorkflowRecord};
use crate::transform::{self, Viewport};
use crate::types::Position;
use crate::view::ViewState;
use eframe::egui;

/// An open automation in the editor.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    /// The automation being edited
    pub graph: Graph,
    /// Pan/zoom of the canvas
    pub view: ViewState,
    /// Where the canvas sits on screen
    pub viewport: Viewport,
    /// Current pointer interaction; at most one drag is open at a time
    pub(crate) interaction: Interaction,
}

impl EditorSession {
    /// Starts a brand-new, empty automation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a stored workflow, upgrading legacy records to graph form.
    pub fn from_record(record: &WorkflowRecord) -> Self {
        let GraphRecord { nodes, edges } = materialize(record);
        Self {
            graph: Graph::from_parts(nodes, edges),
            ..Self::default()
        }
    }

    /// The record handed to persistence on save. View and interaction state are dropped.
    pub fn to_record(&self) -> WorkflowRecord {
        let (nodes, edges) = self.graph.clone().into_parts();
        WorkflowRecord::from_graph(GraphRecord { nodes, edges })
    }

    /// Current interaction state.
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Updates the canvas placement, typically once per frame.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Maps a screen point to canvas space under the current view.
    pub fn to_canvas(&self, screen: egui::Pos2) -> Position {
        transform::to_canvas(screen, &self.viewport, &self.view)
    }

    /// Maps a canvas point to screen space under the current view.
    pub fn to_screen(&self, canvas: Position) -> egui::Pos2 {
        transform::to_screen(canvas, &self.viewport, &self.view)
    }
}
