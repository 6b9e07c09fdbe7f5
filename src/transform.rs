//! Screen ↔ canvas coordinate mapping.
//!
//! Every pointer position that places or targets a node goes through [`to_canvas`]; the
//! renderer goes the other way through [`to_screen`]. The formula lives nowhere else.

use crate::types::Position;
use crate::view::ViewState;
use eframe::egui;

/// On-screen placement of the canvas element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen position of the canvas element's top-left corner
    pub origin: egui::Pos2,
    /// Size of the canvas element in screen pixels
    pub size: egui::Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: egui::Pos2::ZERO,
            size: egui::vec2(f32::INFINITY, f32::INFINITY),
        }
    }
}

impl Viewport {
    /// Creates a viewport from the canvas rect allocated by the UI.
    pub fn from_rect(rect: egui::Rect) -> Self {
        Self {
            origin: rect.min,
            size: rect.size(),
        }
    }

    /// Whether a screen point falls on the canvas element.
    pub fn contains(&self, screen: egui::Pos2) -> bool {
        let local = screen - self.origin;
        local.x >= 0.0 && local.y >= 0.0 && local.x <= self.size.x && local.y <= self.size.y
    }
}

/// Converts a screen point to canvas space.
///
/// `canvas = (screen - origin - pan) / zoom`
pub fn to_canvas(screen: egui::Pos2, viewport: &Viewport, view: &ViewState) -> Position {
    let local = screen - viewport.origin - view.pan;
    Position::new(local.x / view.zoom(), local.y / view.zoom())
}

/// Converts a canvas point to screen space. Inverse of [`to_canvas`].
pub fn to_screen(canvas: Position, viewport: &Viewport, view: &ViewState) -> egui::Pos2 {
    viewport.origin + view.pan + egui::vec2(canvas.x, canvas.y) * view.zoom()
}
