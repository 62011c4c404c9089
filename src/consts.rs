//! Shared numeric constants for the layout engine.

// ── Components ──────────────────────────────────────────────────

/// Width of a component created without an explicit size.
pub const DEFAULT_COMPONENT_WIDTH: f64 = 96.0;

/// Height of a component created without an explicit size.
pub const DEFAULT_COMPONENT_HEIGHT: f64 = 40.0;

// ── Interaction ─────────────────────────────────────────────────

/// Distance in pixels within which a dragged edge snaps to a sibling edge.
pub const SNAP_THRESHOLD_PX: f64 = 4.0;

/// Hit slop in pixels around each resize handle.
pub const HANDLE_TOLERANCE_PX: f64 = 6.0;

/// Canvas extent used until the host reports its real size.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1280.0;

/// See [`DEFAULT_CANVAS_WIDTH`].
pub const DEFAULT_CANVAS_HEIGHT: f64 = 800.0;
