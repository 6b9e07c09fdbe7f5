//! Canvas rendering for the grid, edges, nodes and handles.
//!
//! Everything is drawn from canvas coordinates through the session's `to_screen`, so the
//! picture always matches what the engine hit-tests against.

use super::state::AutomationEditorApp;
use crate::constants::{
    DOT_RADIUS, GRID_SIZE, HANDLE_DRAW_RADIUS, NODE_CORNER_RADIUS, NODE_HEIGHT, NODE_WIDTH,
};
use crate::templates;
use crate::types::*;
use eframe::egui;
use eframe::epaint::{CubicBezierShape, StrokeKind};

const HANDLE_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 120, 130);
const VALID_TARGET_COLOR: egui::Color32 = egui::Color32::from_rgb(80, 200, 120);
const INVALID_TARGET_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 80, 80);

/// Fill color for a node of the given kind.
pub fn kind_color(kind: NodeKind) -> egui::Color32 {
    match kind {
        NodeKind::Trigger => egui::Color32::from_rgb(255, 196, 92),
        NodeKind::Condition => egui::Color32::from_rgb(150, 190, 255),
        NodeKind::Action => egui::Color32::from_rgb(140, 220, 160),
    }
}

fn edge_color(handle: Option<Branch>) -> egui::Color32 {
    match handle {
        None => egui::Color32::GRAY,
        Some(Branch::True) => egui::Color32::from_rgb(60, 170, 90),
        Some(Branch::False) => egui::Color32::from_rgb(210, 80, 80),
    }
}

/// Number of grid steps across `span` canvas units, capped by what fits on screen.
///
/// Far from the origin `f32` loses the precision to step by `GRID_SIZE`, so the count is
/// derived once instead of accumulated.
fn grid_steps(span: f32, on_screen: f32) -> u32 {
    let cap = on_screen.ceil().max(0.0) + 1.0;
    let steps = (span / GRID_SIZE).floor();
    if steps.is_finite() {
        steps.clamp(0.0, cap) as u32
    } else {
        0
    }
}

impl AutomationEditorApp {
    /// Renders the whole graph on the canvas.
    ///
    /// Layers, back to front: grid, edges, connector preview, nodes with their handles.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `canvas_rect` - The screen-space rectangle of the canvas area
    pub fn render_graph(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.show_grid {
            self.draw_grid(painter, canvas_rect);
        }

        for edge in self.session.graph.edges() {
            self.draw_edge(painter, edge);
        }

        if let Some((from, to)) = self.session.connector_preview() {
            let color = match self.session.connector_hover() {
                Some((_, true)) => VALID_TARGET_COLOR,
                Some((_, false)) => INVALID_TARGET_COLOR,
                None => egui::Color32::from_rgb(100, 150, 255),
            };
            let to_screen = self.session.to_screen(to);
            self.draw_curve(painter, self.session.to_screen(from), to_screen, color);
            painter.circle_filled(to_screen, 4.0, color);
        }

        for node in self.session.graph.nodes() {
            self.draw_node(painter, node);
        }
    }

    /// Draws a dot grid every `GRID_SIZE` canvas units.
    ///
    /// Skipped when the dots would be too dense to read.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let zoom = self.session.view.zoom();
        if GRID_SIZE * zoom < 6.0 {
            return;
        }
        let color = egui::Color32::from_rgba_unmultiplied(128, 128, 128, 60);

        let top_left = self.session.to_canvas(canvas_rect.min);
        let bottom_right = self.session.to_canvas(canvas_rect.max);
        let start_x = (top_left.x / GRID_SIZE).floor() * GRID_SIZE;
        let start_y = (top_left.y / GRID_SIZE).floor() * GRID_SIZE;

        let spacing = GRID_SIZE * zoom;
        let columns = grid_steps(bottom_right.x - start_x, canvas_rect.width() / spacing);
        let rows = grid_steps(bottom_right.y - start_y, canvas_rect.height() / spacing);
        for col in 0..=columns {
            let x = start_x + col as f32 * GRID_SIZE;
            for row in 0..=rows {
                let y = start_y + row as f32 * GRID_SIZE;
                let dot = self.session.to_screen(Position::new(x, y));
                painter.circle_filled(dot, DOT_RADIUS, color);
            }
        }
    }

    /// Draws one edge as a horizontal S-curve from source handle to target handle.
    pub fn draw_edge(&self, painter: &egui::Painter, edge: &Edge) {
        let graph = &self.session.graph;
        let from = graph
            .node(&edge.source)
            .and_then(|node| node.source_anchor(edge.source_handle));
        let to = graph.node(&edge.target).and_then(Node::target_anchor);
        if let (Some(from), Some(to)) = (from, to) {
            self.draw_curve(
                painter,
                self.session.to_screen(from),
                self.session.to_screen(to),
                edge_color(edge.source_handle),
            );
        }
    }

    fn draw_curve(
        &self,
        painter: &egui::Painter,
        from: egui::Pos2,
        to: egui::Pos2,
        color: egui::Color32,
    ) {
        let bend = ((to.x - from.x).abs() * 0.5).max(40.0 * self.session.view.zoom());
        let curve = CubicBezierShape::from_points_stroke(
            [
                from,
                from + egui::vec2(bend, 0.0),
                to - egui::vec2(bend, 0.0),
                to,
            ],
            false,
            egui::Color32::TRANSPARENT,
            egui::Stroke::new(2.0, color),
        );
        painter.add(curve);
    }

    /// Renders a node: colored body, labels, and the handles its kind offers.
    ///
    /// Selected nodes get a yellow border and the node being dragged an orange one.
    pub fn draw_node(&self, painter: &egui::Painter, node: &Node) {
        let zoom = self.session.view.zoom();
        let min = self.session.to_screen(node.position);
        let rect = egui::Rect::from_min_size(min, egui::vec2(NODE_WIDTH, NODE_HEIGHT) * zoom);
        let corner = NODE_CORNER_RADIUS * zoom;

        painter.rect_filled(rect, corner, kind_color(node.kind));

        let (stroke_color, stroke_width) = if self.session.dragged_node() == Some(node.id.as_str()) {
            (egui::Color32::from_rgb(255, 165, 0), 3.0)
        } else if self.selected_node.as_deref() == Some(node.id.as_str()) {
            (egui::Color32::YELLOW, 3.0)
        } else {
            (egui::Color32::from_gray(40), 1.0)
        };
        painter.rect_stroke(
            rect,
            corner,
            egui::Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );

        let padding = 10.0 * zoom;
        let kind_font = egui::FontId::proportional((10.0 * zoom).clamp(6.0, 30.0));
        let label_font = egui::FontId::proportional((14.0 * zoom).clamp(7.0, 42.0));
        painter.text(
            egui::pos2(rect.min.x + padding, rect.min.y + padding * 0.6),
            egui::Align2::LEFT_TOP,
            node.kind.label().to_uppercase(),
            kind_font,
            egui::Color32::from_gray(60),
        );
        painter.text(
            egui::pos2(rect.min.x + padding, rect.max.y - padding * 0.6),
            egui::Align2::LEFT_BOTTOM,
            templates::label_for(node),
            label_font,
            egui::Color32::BLACK,
        );

        self.draw_handles(painter, node);
    }

    fn draw_handles(&self, painter: &egui::Painter, node: &Node) {
        let zoom = self.session.view.zoom();
        let radius = HANDLE_DRAW_RADIUS * zoom.max(0.6);
        let outline = egui::Stroke::new(1.0, egui::Color32::from_gray(30));

        if let Some(anchor) = node.target_anchor() {
            let fill = match self.session.connector_hover() {
                Some((target, true)) if target == node.id => VALID_TARGET_COLOR,
                Some((target, false)) if target == node.id => INVALID_TARGET_COLOR,
                _ => HANDLE_COLOR,
            };
            painter.circle(self.session.to_screen(anchor), radius, fill, outline);
        }

        for &handle in node.kind.source_handles() {
            if let Some(anchor) = node.source_anchor(handle) {
                let center = self.session.to_screen(anchor);
                painter.circle(center, radius, edge_color(handle), outline);
                if let Some(branch) = handle {
                    painter.text(
                        center + egui::vec2(radius + 3.0, 0.0),
                        egui::Align2::LEFT_CENTER,
                        branch.as_str(),
                        egui::FontId::proportional((10.0 * zoom).clamp(6.0, 24.0)),
                        edge_color(handle),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_steps_stay_bounded() {
        assert_eq!(grid_steps(120.0, 10.0), 5);
        assert_eq!(grid_steps(1.0e30, 40.0), 41);
        assert_eq!(grid_steps(-5.0, 40.0), 0);
        assert_eq!(grid_steps(f32::NAN, 40.0), 0);
        assert_eq!(grid_steps(f32::INFINITY, 40.0), 0);
    }

    #[test]
    fn grid_draws_at_extreme_pan() {
        let mut app = AutomationEditorApp::default();
        app.session.view.pan_by(-1.0e10, 3.0e10);
        let ctx = egui::Context::default();
        let mut raw = egui::RawInput::default();
        raw.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(800.0, 600.0),
        ));
        let _ = ctx.run(raw, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                app.draw_canvas(ui);
            });
        });
        assert!(app.session.interaction().is_idle());
    }

    #[test]
    fn kinds_are_visually_distinct() {
        let colors: Vec<_> = NodeKind::ALL.iter().map(|kind| kind_color(*kind)).collect();
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert_ne!(colors[0], colors[2]);
    }
}
