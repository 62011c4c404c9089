//! Pointer hit-testing against selection handles and component bodies.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{ComponentId, ComponentStore};
use crate::geometry::{Bounds, Handle, Point};

/// What lies under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A resize handle of the current selection box.
    Handle(Handle),
    /// The body of a component.
    Component(ComponentId),
}

/// The handle of `selection` within `tolerance` of `point` on both axes.
///
/// Corners are tested before edge midpoints so a small box still resizes
/// diagonally.
#[must_use]
pub fn handle_at(point: Point, selection: &Bounds, tolerance: f64) -> Option<Handle> {
    let corners = Handle::ALL.into_iter().filter(|h| h.is_corner());
    let edges = Handle::ALL.into_iter().filter(|h| !h.is_corner());
    corners.chain(edges).find(|h| {
        let p = selection.handle_point(*h);
        (point.x - p.x).abs() <= tolerance && (point.y - p.y).abs() <= tolerance
    })
}

/// Topmost component (highest layer) whose bounds contain `point`.
#[must_use]
pub fn component_at(point: Point, store: &ComponentStore) -> Option<ComponentId> {
    store
        .components_by_layer()
        .into_iter()
        .rev()
        .find(|c| c.bounds.contains_point(point))
        .map(|c| c.id)
}

/// Handles of the current selection take priority over component bodies.
#[must_use]
pub fn hit_test(point: Point, store: &ComponentStore, tolerance: f64) -> Option<Hit> {
    if let Some(handle) = store.selected_bounds().and_then(|b| handle_at(point, &b, tolerance)) {
        return Some(Hit::Handle(handle));
    }
    component_at(point, store).map(Hit::Component)
}
