//! Edge-alignment snapping.
//!
//! For a moving rectangle and a set of sibling rectangles, find per axis the
//! smallest translation that would line up one of the moving rectangle's edges
//! with one of a sibling's edges. The controller only applies that translation
//! when it is a near miss (within the snap threshold), so a drag never jumps a
//! large distance to reach an alignment.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use crate::geometry::{Bounds, closest_to_zero};

/// Sentinel offset meaning "no alignment candidate on this axis".
pub const NO_SNAP: f64 = f64::MAX;

/// Per-axis translation that would align the moving rectangle with its best sibling edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignOffsets {
    pub x_align: f64,
    pub y_align: f64,
}

impl Default for AlignOffsets {
    fn default() -> Self {
        Self { x_align: NO_SNAP, y_align: NO_SNAP }
    }
}

impl AlignOffsets {
    /// The translation to apply, zeroing any axis whose offset exceeds `threshold`.
    #[must_use]
    pub fn within(&self, threshold: f64) -> (f64, f64) {
        let pick = |offset: f64| if offset.abs() <= threshold { offset } else { 0.0 };
        (pick(self.x_align), pick(self.y_align))
    }

    #[must_use]
    pub fn has_x(&self) -> bool {
        self.x_align != NO_SNAP
    }

    #[must_use]
    pub fn has_y(&self) -> bool {
        self.y_align != NO_SNAP
    }
}

/// Edge-pair offsets on one axis: near-near, far-far, near-far, far-near.
fn axis_candidates(moving_near: f64, moving_far: f64, other_near: f64, other_far: f64) -> [f64; 4] {
    [
        other_near - moving_near,
        other_far - moving_far,
        other_far - moving_near,
        other_near - moving_far,
    ]
}

/// Compute the best alignment offset on each axis against every rect in `others`.
#[must_use]
pub fn alignment_offsets<'a, I>(moving: &Bounds, others: I) -> AlignOffsets
where
    I: IntoIterator<Item = &'a Bounds>,
{
    let mut best = AlignOffsets::default();
    for other in others {
        let x = closest_to_zero(&axis_candidates(moving.left, moving.right, other.left, other.right));
        let y = closest_to_zero(&axis_candidates(moving.top, moving.bottom, other.top, other.bottom));
        if let Some(x) = x {
            if x.abs() < best.x_align.abs() {
                best.x_align = x;
            }
        }
        if let Some(y) = y {
            if y.abs() < best.y_align.abs() {
                best.y_align = y;
            }
        }
    }
    best
}

/// Snap translation for `moving` (already at its predicted position).
///
/// Returns `(dx, dy)` to add to the predicted position; an axis is zero unless
/// an alignment lies within `threshold` pixels.
#[must_use]
pub fn snap_translation<'a, I>(moving: &Bounds, others: I, threshold: f64) -> (f64, f64)
where
    I: IntoIterator<Item = &'a Bounds>,
{
    alignment_offsets(moving, others).within(threshold)
}
