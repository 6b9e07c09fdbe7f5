//! Canvas input handling.
//!
//! Feeds raw egui pointer input into the session's interaction engine and reacts to its
//! outcomes. All hit-testing and coordinate math happens in the engine.

use super::state::{AutomationEditorApp, PaletteItem};
use crate::engine::{DragOutcome, HitTarget};
use crate::transform::Viewport;
use eframe::egui;

impl AutomationEditorApp {
    /// Allocates the canvas, processes this frame's pointer input and paints the graph.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI the canvas fills
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        self.session.set_viewport(Viewport::from_rect(response.rect));

        self.handle_pointer_input(ui, &response);
        self.handle_palette_drop(ui, &response);

        self.render_graph(&painter, response.rect);
    }

    /// Translates press / move / release / leave into engine calls.
    ///
    /// Leaving the canvas rect (onto a side panel, or out of the window) closes any open
    /// gesture.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_pointer_input(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let (pressed, down, released, pointer_gone, latest) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.events.iter().any(|e| matches!(e, egui::Event::PointerGone)),
                i.pointer.latest_pos(),
            )
        });

        if pressed {
            let origin = ui.input(|i| i.pointer.press_origin()).or(latest);
            if let Some(pos) = origin.filter(|pos| response.rect.contains(*pos)) {
                match self.session.pointer_down(pos) {
                    Some(HitTarget::NodeBody(id)) => self.select_node(Some(id)),
                    Some(HitTarget::SourceHandle { node, .. }) => self.select_node(Some(node)),
                    Some(HitTarget::Background) => self.select_node(None),
                    Some(HitTarget::TargetHandle(_)) | None => {}
                }
            }
        }

        if self.session.interaction().is_idle() {
            return;
        }

        let left_canvas = latest.is_some_and(|pos| !response.rect.contains(pos));
        if pointer_gone || left_canvas {
            let outcome = self.session.pointer_leave();
            self.note_outcome(outcome);
            return;
        }

        if let Some(pos) = latest {
            if down {
                self.session.pointer_move(pos);
            } else if released {
                let outcome = self.session.pointer_up(pos);
                self.note_outcome(outcome);
            }
        }
    }

    /// Creates a node when a palette item is released over the canvas.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_palette_drop(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let Some(item) = response.dnd_release_payload::<PaletteItem>() else {
            return;
        };
        let Some(pos) = ui.input(|i| i.pointer.latest_pos()) else {
            return;
        };
        if let Some(id) = self.session.drop_template(item.0, pos) {
            self.file.has_unsaved_changes = true;
            self.select_node(Some(id));
        }
    }

    fn note_outcome(&mut self, outcome: DragOutcome) {
        match outcome {
            DragOutcome::NodeMoved(_) | DragOutcome::EdgeAdded(_) => {
                self.file.has_unsaved_changes = true;
            }
            DragOutcome::None | DragOutcome::Panned | DragOutcome::Abandoned => {}
        }
    }
}
