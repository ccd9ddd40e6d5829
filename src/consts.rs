//! Shared numeric constants for the stage crate.

// ── Transform ───────────────────────────────────────────────────

/// Perspective distance in pixels for layers without X/Y rotation.
pub const PERSPECTIVE_FLAT_PX: f64 = 1500.0;

/// Perspective distance in pixels once X or Y rotation is present (wider field).
pub const PERSPECTIVE_3D_PX: f64 = 2000.0;

/// Depth translation applied to the selected layer ("lift" cue).
pub const LIFT_SELECTED_PX: f64 = 20.0;

/// Depth translation applied to idle layers.
pub const LIFT_IDLE_PX: f64 = 0.0;

/// Brightness boost applied to the selected image layer.
pub const SELECTED_BRIGHTNESS: f64 = 1.03;

/// Transform transition duration while idle, in milliseconds.
pub const TRANSITION_IDLE_MS: u32 = 100;

// ── Crop ────────────────────────────────────────────────────────

/// Minimum share of the layer, in percent, left visible on each axis.
pub const CROP_MIN_VISIBLE_PCT: f64 = 10.0;

/// Maximum combined crop of an opposing pair (top+bottom, left+right).
pub const CROP_MAX_PAIR_PCT: f64 = 100.0 - CROP_MIN_VISIBLE_PCT;

// ── Style limits ────────────────────────────────────────────────

/// Neutral (unscaled) value of `ImageStyle::scale`.
pub const SCALE_NEUTRAL: f64 = 100.0;

/// Default upper bound for `ImageStyle::scale`.
pub const DEFAULT_MAX_SCALE: f64 = 400.0;

/// Smallest font size accepted for text layers.
pub const FONT_SIZE_MIN: f64 = 12.0;

/// Largest font size accepted for text layers.
pub const FONT_SIZE_MAX: f64 = 72.0;

/// Line height multiplier for text layers.
pub const TEXT_LINE_HEIGHT: f64 = 1.2;

// ── Hit-testing ─────────────────────────────────────────────────

/// Thickness of a crop handle strip in screen pixels.
pub const CROP_HANDLE_PX: f64 = 6.0;
