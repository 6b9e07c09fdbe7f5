//! Pan/zoom state of the canvas.
//!
//! The view is session-local: it is never persisted with the graph and is discarded when a
//! workflow is saved.

use crate::constants::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use eframe::egui;

/// Current zoom factor and pan offset of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Scale from canvas units to screen pixels, clamped to `[MIN_ZOOM, MAX_ZOOM]`
    zoom: f32,
    /// Screen-space offset of the canvas origin from the viewport origin
    pub pan: egui::Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
        }
    }
}

impl ViewState {
    /// Creates a view at the given zoom and pan. The zoom is clamped.
    pub fn new(zoom: f32, pan: egui::Vec2) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pan,
        }
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Zooms in by one step.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Zooms out by one step.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Restores zoom to 1.0. The pan offset is left as it is.
    pub fn zoom_reset(&mut self) {
        self.zoom = 1.0;
    }

    /// Shifts the canvas by a screen-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan += egui::vec2(dx, dy);
    }
}
