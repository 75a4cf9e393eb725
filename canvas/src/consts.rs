//! Shared numeric constants for the canvas crate.

// ── Transform ───────────────────────────────────────────────────

/// Smallest zoom factor reachable through interactive zoom.
pub const MIN_SCALE: f64 = 0.05;

/// Largest zoom factor reachable through interactive zoom.
pub const MAX_SCALE: f64 = 50.0;

/// Positive scales below this are treated as identity during conversion.
pub const DEGENERATE_SCALE: f64 = f64::EPSILON;

/// Per-notch zoom multiplier for wheel input.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Pixel padding kept around the page when fitting it to the viewport.
pub const FIT_MARGIN_PX: f64 = 24.0;

// ── Overlay ─────────────────────────────────────────────────────

/// Transforms closer than this are considered identical by the overlay sync.
pub const SYNC_TOLERANCE: f64 = 1e-6;

// ── Bubbles ─────────────────────────────────────────────────────

pub const MIN_BUBBLE_WIDTH: f64 = 60.0;
pub const MIN_BUBBLE_HEIGHT: f64 = 40.0;
pub const MAX_BUBBLE_WIDTH: f64 = 400.0;
pub const MAX_BUBBLE_HEIGHT: f64 = 300.0;

/// Line height as a multiple of font size.
pub const LINE_HEIGHT_RATIO: f64 = 1.2;

/// Safety margin applied to the recommended font size (9/10).
pub const FONT_SHRINK_MARGIN: f64 = 0.9;

/// Default inner padding of a bubble, in canvas units.
pub const DEFAULT_BUBBLE_PADDING: f64 = 10.0;

/// Tail angle used when a bubble carries no tail information at all.
pub const DEFAULT_TAIL_ANGLE_DEG: f64 = 225.0;

/// Number of teeth along a jagged tail.
pub const JAGGED_TEETH: usize = 3;
