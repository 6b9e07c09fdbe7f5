//! Shared editor-wide constants.
//! Centralizes tweakable values used by the graph engine and the canvas renderer.

// Node footprint
/// Node width in canvas units. Every node shares the same footprint.
pub const NODE_WIDTH: f32 = 240.0;
/// Node height in canvas units.
pub const NODE_HEIGHT: f32 = 48.0;

// Handle anchors, relative to the node's top-left corner
/// Vertical offset of the target handle and of the unnamed source handle.
pub const HANDLE_CENTER_Y: f32 = NODE_HEIGHT / 2.0;
/// Vertical offset of a condition's `true` handle.
pub const HANDLE_TRUE_Y: f32 = 12.0;
/// Vertical offset of a condition's `false` handle.
pub const HANDLE_FALSE_Y: f32 = 36.0;
/// Hit radius of a handle in screen pixels; divided by zoom before testing in canvas space.
pub const HANDLE_HIT_RADIUS: f32 = 8.0;
/// Drawn radius of a handle in screen pixels at zoom 1.0.
pub const HANDLE_DRAW_RADIUS: f32 = 5.0;

// View
/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f32 = 0.2;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f32 = 3.0;
/// Multiplicative step applied by zoom in / zoom out.
pub const ZOOM_STEP: f32 = 1.2;

// Grid/drawing
/// Spacing between grid dots in canvas units.
pub const GRID_SIZE: f32 = 24.0;
/// Radius of grid dots in screen pixels.
pub const DOT_RADIUS: f32 = 1.2;
/// Corner radius of node rectangles at zoom 1.0.
pub const NODE_CORNER_RADIUS: f32 = 6.0;

// Legacy migration
/// Canvas position given to the trigger node synthesized from a legacy record.
pub const LEGACY_TRIGGER_POSITION: (f32, f32) = (50.0, 150.0);
/// Canvas position given to the action node synthesized from a legacy record.
pub const LEGACY_ACTION_POSITION: (f32, f32) = (400.0, 150.0);
