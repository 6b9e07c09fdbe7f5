//! Desktop shell for the automation editor.
//!
//! Lays out the toolbar, node palette, canvas and properties panel around one
//! [`EditorSession`](crate::session::EditorSession). The shell holds no editing rules of
//! its own; it forwards input to the session and draws what the session contains.
//!
//! # Module Organization
//!
//! - `state` - The app struct, file operation state and the data editor buffer
//! - `file_ops` - Open/save through native file dialogs
//! - `canvas` - Pointer input routing into the interaction engine
//! - `rendering` - Drawing the grid, edges, nodes and handles

mod canvas;
mod file_ops;
mod rendering;
mod state;

pub use state::AutomationEditorApp;

use self::state::PaletteItem;
use crate::templates;
use crate::types::*;
use eframe::egui;

/// Key under which UI preferences are kept in eframe storage.
pub const APP_STATE_KEY: &str = "app_state";

impl eframe::App for AutomationEditorApp {
    /// Persist UI preferences between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => storage.set_string(APP_STATE_KEY, json),
            Err(err) => log::error!("Failed to serialize app state: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `_frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_file_shortcuts(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        egui::SidePanel::left("node_palette")
            .resizable(true)
            .default_width(self.palette_panel_width)
            .show(ctx, |ui| {
                self.palette_panel_width = ui.available_width().max(120.0);
                self.draw_palette(ui);
            });

        egui::SidePanel::right("properties_panel")
            .resizable(true)
            .default_width(self.properties_panel_width)
            .show(ctx, |ui| {
                self.properties_panel_width = ui.available_width().max(180.0);
                self.draw_properties_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });
    }
}

impl AutomationEditorApp {
    /// Cmd/Ctrl+N, O, S and Shift+S.
    fn handle_file_shortcuts(&mut self, ctx: &egui::Context) {
        let (new, open, save, save_as) = ctx.input(|i| {
            let command = i.modifiers.command;
            (
                command && i.key_pressed(egui::Key::N),
                command && i.key_pressed(egui::Key::O),
                command && !i.modifiers.shift && i.key_pressed(egui::Key::S),
                command && i.modifiers.shift && i.key_pressed(egui::Key::S),
            )
        });
        if new {
            self.new_automation();
        }
        if open {
            self.load_automation();
        }
        if save {
            self.save_automation();
        }
        if save_as {
            self.save_as_automation();
        }
    }

    /// Renders the toolbar with file and zoom controls.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                self.new_automation();
            }
            if ui.button("Open").clicked() {
                self.load_automation();
            }
            if ui.button("Save").clicked() {
                self.save_automation();
            }
            if ui.button("Save As").clicked() {
                self.save_as_automation();
            }

            ui.separator();

            if ui.button("−").on_hover_text("Zoom out").clicked() {
                self.session.view.zoom_out();
            }
            if ui
                .button(format!("{:.0}%", self.session.view.zoom() * 100.0))
                .on_hover_text("Reset zoom")
                .clicked()
            {
                self.session.view.zoom_reset();
            }
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.session.view.zoom_in();
            }

            ui.separator();

            ui.checkbox(&mut self.show_grid, "Grid");
            ui.checkbox(&mut self.dark_mode, "Dark mode");
        });
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let name = self.file.current_path.as_deref().unwrap_or("Untitled");
            let dirty = if self.file.has_unsaved_changes { " •" } else { "" };
            ui.label(format!("{name}{dirty}"));
            ui.separator();
            ui.label(format!(
                "{} nodes, {} edges",
                self.session.graph.nodes().len(),
                self.session.graph.edges().len()
            ));
            if let Some(error) = &self.file.last_error {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(255, 80, 80), error);
            }
        });
    }

    /// One draggable entry per template, grouped by kind.
    fn draw_palette(&mut self, ui: &mut egui::Ui) {
        ui.heading("Nodes");
        ui.label("Drag onto the canvas");
        egui::ScrollArea::vertical().show(ui, |ui| {
            for kind in NodeKind::ALL {
                ui.add_space(6.0);
                ui.strong(kind.label());
                for template in templates::for_kind(kind) {
                    let id = egui::Id::new(("palette", template.subtype));
                    ui.dnd_drag_source(id, PaletteItem(template), |ui| {
                        let text = egui::RichText::new(template.label)
                            .color(egui::Color32::BLACK);
                        egui::Frame::new()
                            .fill(rendering::kind_color(kind))
                            .corner_radius(4.0)
                            .inner_margin(egui::Margin::symmetric(8, 4))
                            .show(ui, |ui| {
                                ui.label(text);
                            });
                    });
                }
            }
        });
    }

    /// Shows the selected node's kind, subtype and an editor for its data bag.
    fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Properties");
        ui.separator();

        let Some(node) = self
            .selected_node
            .as_deref()
            .and_then(|id| self.session.graph.node(id))
            .cloned()
        else {
            ui.label("No node selected");
            ui.label("Select a node on the canvas to edit its configuration.");
            return;
        };

        if self.data_editor.node_id.as_deref() != Some(node.id.as_str()) {
            self.reload_data_editor();
        }

        egui::Grid::new("node_summary").num_columns(2).show(ui, |ui| {
            ui.label("Kind:");
            ui.label(node.kind.label());
            ui.end_row();
            ui.label("Type:");
            ui.label(templates::label_for(&node));
            ui.end_row();
            ui.label("Subtype:");
            ui.monospace(&node.subtype);
            ui.end_row();
            ui.label("Position:");
            ui.label(format!("({:.0}, {:.0})", node.position.x, node.position.y));
            ui.end_row();
        });

        ui.separator();
        ui.label("Configuration (JSON):");
        ui.add(
            egui::TextEdit::multiline(&mut self.data_editor.text)
                .code_editor()
                .desired_rows(10)
                .desired_width(f32::INFINITY),
        );
        if let Some(error) = &self.data_editor.error {
            ui.colored_label(egui::Color32::from_rgb(255, 80, 80), error);
        }
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                self.apply_data_editor();
            }
            if ui.button("Revert").clicked() {
                self.reload_data_editor();
            }
        });

        let outgoing = self
            .session
            .graph
            .edges()
            .iter()
            .filter(|edge| edge.source == node.id)
            .count();
        ui.separator();
        ui.label(format!("Outgoing connections: {outgoing}"));
    }
}
