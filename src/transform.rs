//! Pure transform math for one pointer-move step.
//!
//! A [`TransformRequest`] is an immutable snapshot: the gesture kind, the
//! start and current geometry of every affected component, the pointer
//! positions, the canvas extent and (for drags) the snapping candidates.
//! [`compute`] turns it into a [`TransformResponse`] without touching the
//! store, so the same function serves the inline path and the worker.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::doc::ComponentId;
use crate::geometry::{Bounds, Handle, Point, Size, point_in_bounds, resize_from_handle};
use crate::snap::snap_translation;

/// Start and current geometry of one component taking part in a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: ComponentId,
    pub start: Bounds,
    pub current: Bounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformKind {
    /// Sizing a freshly drawn component out from `anchor`.
    Draw { anchor: Point },
    /// Dragging one of the selection box handles.
    Resize { handle: Handle, from_center: bool },
    /// Moving the selection; `others` are the snapping candidates.
    Drag { start_box: Bounds, others: Vec<Bounds> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    /// Identifies the gesture so late answers can be discarded.
    pub gesture: u64,
    pub kind: TransformKind,
    pub subjects: Vec<Subject>,
    pub start_pointer: Point,
    pub pointer: Point,
    pub canvas: Size,
    pub snap_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsUpdate {
    pub id: ComponentId,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResponse {
    pub gesture: u64,
    pub updates: Vec<BoundsUpdate>,
}

/// Compute the new bounds for every subject of `request`.
#[must_use]
pub fn compute(request: &TransformRequest) -> TransformResponse {
    let updates = match &request.kind {
        TransformKind::Draw { anchor } => draw(request, *anchor),
        TransformKind::Resize { handle, from_center } => resize(request, *handle, *from_center),
        TransformKind::Drag { start_box, others } => drag(request, start_box, others),
    };
    TransformResponse { gesture: request.gesture, updates }
}

/// Corner-to-pointer rectangle; an axis whose pointer coordinate left the
/// canvas keeps its previous extent.
fn draw(request: &TransformRequest, anchor: Point) -> Vec<BoundsUpdate> {
    let inside = point_in_bounds(request.pointer, request.canvas);
    request
        .subjects
        .iter()
        .map(|s| {
            let next = Bounds::from_corners(anchor, request.pointer);
            let (left, right) = if inside.x { (next.left, next.right) } else { (s.current.left, s.current.right) };
            let (top, bottom) = if inside.y { (next.top, next.bottom) } else { (s.current.top, s.current.bottom) };
            BoundsUpdate { id: s.id, bounds: Bounds { left, top, right, bottom } }
        })
        .collect()
}

/// Every subject resized from its own start geometry by the shared delta.
/// An axis that would leave the canvas reverts to the current geometry.
fn resize(request: &TransformRequest, handle: Handle, from_center: bool) -> Vec<BoundsUpdate> {
    let delta = request.pointer.delta_from(request.start_pointer);
    let canvas = request.canvas;
    request
        .subjects
        .iter()
        .map(|s| {
            let next = resize_from_handle(s.start.size(), s.start.position(), delta, handle, from_center).bounds();
            let x_fits = next.left >= 0.0 && next.right <= canvas.width;
            let y_fits = next.top >= 0.0 && next.bottom <= canvas.height;
            let (left, right) = if x_fits { (next.left, next.right) } else { (s.current.left, s.current.right) };
            let (top, bottom) = if y_fits { (next.top, next.bottom) } else { (s.current.top, s.current.bottom) };
            BoundsUpdate { id: s.id, bounds: Bounds { left, top, right, bottom } }
        })
        .collect()
}

/// Largest translation no greater than `delta` that keeps `[near, far]` inside `[0, extent]`.
fn clamp_axis(delta: f64, near: f64, far: f64, extent: f64) -> f64 {
    delta.min(extent - far).max(-near)
}

/// Translate the selection by the pointer delta, kept inside the canvas, then
/// snapped to the nearest sibling edge within the threshold.
fn drag(request: &TransformRequest, start_box: &Bounds, others: &[Bounds]) -> Vec<BoundsUpdate> {
    let delta = request.pointer.delta_from(request.start_pointer);
    let canvas = request.canvas;
    let mut dx = clamp_axis(delta.x, start_box.left, start_box.right, canvas.width);
    let mut dy = clamp_axis(delta.y, start_box.top, start_box.bottom, canvas.height);

    let (sx, sy) = snap_translation(&start_box.translate(dx, dy), others, request.snap_threshold);
    dx = clamp_axis(dx + sx, start_box.left, start_box.right, canvas.width);
    dy = clamp_axis(dy + sy, start_box.top, start_box.bottom, canvas.height);

    request
        .subjects
        .iter()
        .map(|s| BoundsUpdate { id: s.id, bounds: s.start.translate(dx, dy) })
        .collect()
}
