//! Component store: the authoritative map of component geometry and
//! presentation attributes, the z-order, and the current selection.
//!
//! Every successful mutation emits exactly one [`StoreEvent`] to the
//! registered subscribers; no-op updates emit nothing. The containment
//! hierarchy lives in [`crate::tree::ContainmentTree`]; the `parent` field on
//! [`Component`] is only a mirror the engine refreshes after each commit.
//!
//! Layers are kept as a dense total order `0..len` with no ties. Every layer
//! operation shifts the smallest possible run of neighbours to keep it so.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::consts::{DEFAULT_COMPONENT_HEIGHT, DEFAULT_COMPONENT_WIDTH};
use crate::geometry::{Bounds, Point, Size, common_bounds};

/// Unique identifier for a component.
pub type ComponentId = Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// One rectangular design element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Stable identifier, generated on creation.
    pub id: ComponentId,
    /// User-editable display label.
    pub name: String,
    /// Canonical, normalized rectangle in canvas coordinates.
    pub bounds: Bounds,
    /// Always equal to `bounds.size()`.
    pub size: Size,
    /// Z-order; higher draws on top.
    pub layer: i64,
    /// Fill color as a CSS color string. Opaque to the engine.
    pub color: String,
    /// Free-form style bag. Opaque to the engine.
    pub css: serde_json::Value,
    /// Mirror of the containment tree parent.
    pub parent: Option<ComponentId>,
}

impl Component {
    #[must_use]
    pub fn position(&self) -> Point {
        self.bounds.position()
    }
}

/// Creation request for [`ComponentStore::create`]. Absent fields take defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Point,
    /// Defaults to 96×40.
    #[serde(default)]
    pub size: Option<Size>,
    /// Defaults to one above the current top layer.
    #[serde(default)]
    pub layer: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub css: Option<serde_json::Value>,
}

/// Change notification emitted after each successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Created { id: ComponentId },
    Moved { id: ComponentId, bounds: Bounds },
    Resized { id: ComponentId, bounds: Bounds },
    Relayered { id: ComponentId, layer: i64 },
    Renamed { id: ComponentId, name: String },
    Restyled { id: ComponentId },
    ParentChanged { id: ComponentId, parent: Option<ComponentId> },
    Deleted { id: ComponentId },
    SelectionChanged,
}

/// Handle returned by [`ComponentStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("component not found: {0}")]
    NotFound(ComponentId),
    #[error("non-finite geometry for component {0}")]
    NonFinite(ComponentId),
}

// =============================================================================
// STORE
// =============================================================================

/// In-memory store of components plus the current selection.
pub struct ComponentStore {
    components: HashMap<ComponentId, Component>,
    selection: HashSet<ComponentId>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    created_count: u64,
}

impl std::fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentStore")
            .field("components", &self.components.len())
            .field("selection", &self.selection)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
            selection: HashSet::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            created_count: 0,
        }
    }

    // --- Notification ---

    /// Register a callback invoked with every subsequent [`StoreEvent`].
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn emit(&mut self, event: &StoreEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    fn get_mut(&mut self, id: &ComponentId) -> Result<&mut Component, StoreError> {
        self.components.get_mut(id).ok_or_else(|| {
            debug!(%id, "component not found");
            StoreError::NotFound(*id)
        })
    }

    #[allow(clippy::cast_possible_wrap)]
    fn layer_count(&self) -> i64 {
        self.components.len() as i64
    }

    // --- Lifecycle ---

    /// Insert a new component built from `spec` and return a copy of it.
    ///
    /// A caller-specified layer is clamped to `0..=len` and inserted at that
    /// position; components at or above it move up by one.
    pub fn create(&mut self, spec: ComponentSpec) -> Component {
        let count = self.layer_count();
        let layer = spec.layer.map_or(count, |l| l.clamp(0, count));
        if layer < count {
            for c in self.components.values_mut() {
                if c.layer >= layer {
                    c.layer += 1;
                }
            }
        }

        self.created_count += 1;
        let size = spec
            .size
            .unwrap_or(Size::new(DEFAULT_COMPONENT_WIDTH, DEFAULT_COMPONENT_HEIGHT))
            .abs();
        let bounds = Bounds::from_position_size(spec.position, size);
        let component = Component {
            id: Uuid::new_v4(),
            name: spec.name.unwrap_or_else(|| format!("Component {}", self.created_count)),
            bounds,
            size: bounds.size(),
            layer,
            color: spec.color.unwrap_or_else(|| "#D94B4B".to_owned()),
            css: spec.css.unwrap_or_else(|| serde_json::json!({})),
            parent: None,
        };
        let id = component.id;
        self.components.insert(id, component.clone());
        debug!(%id, layer, "component created");
        self.emit(&StoreEvent::Created { id });
        component
    }

    /// Remove a component, drop it from the selection and compact the layers.
    ///
    /// The containment tree is not touched; callers pair this with
    /// [`crate::tree::ContainmentTree::remove_leaf`].
    pub fn delete(&mut self, id: &ComponentId) -> Result<Component, StoreError> {
        let removed = self.components.remove(id).ok_or_else(|| {
            debug!(%id, "delete of unknown component");
            StoreError::NotFound(*id)
        })?;
        for c in self.components.values_mut() {
            if c.layer > removed.layer {
                c.layer -= 1;
            }
        }
        let was_selected = self.selection.remove(id);
        self.emit(&StoreEvent::Deleted { id: *id });
        if was_selected {
            self.emit(&StoreEvent::SelectionChanged);
        }
        Ok(removed)
    }

    // --- Geometry ---

    /// Move a component so its top-left corner is at `position`. Size is kept.
    pub fn update_position(&mut self, id: &ComponentId, position: Point) -> Result<bool, StoreError> {
        self.update_position_with(id, |_| position)
    }

    /// Move a component using a function of its current position.
    pub fn update_position_with<F>(&mut self, id: &ComponentId, update: F) -> Result<bool, StoreError>
    where
        F: FnOnce(Point) -> Point,
    {
        let c = self.get_mut(id)?;
        let position = update(c.bounds.position());
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(StoreError::NonFinite(*id));
        }
        let bounds = Bounds::from_position_size(position, c.size);
        if bounds == c.bounds {
            return Ok(false);
        }
        c.bounds = bounds;
        self.emit(&StoreEvent::Moved { id: *id, bounds });
        Ok(true)
    }

    /// Resize a component keeping its top-left corner. The size is committed
    /// as absolute values.
    pub fn update_size(&mut self, id: &ComponentId, size: Size) -> Result<bool, StoreError> {
        self.update_size_with(id, |_| size)
    }

    /// Resize a component using a function of its current size.
    pub fn update_size_with<F>(&mut self, id: &ComponentId, update: F) -> Result<bool, StoreError>
    where
        F: FnOnce(Size) -> Size,
    {
        let c = self.get_mut(id)?;
        let size = update(c.size).abs();
        if !size.width.is_finite() || !size.height.is_finite() {
            return Err(StoreError::NonFinite(*id));
        }
        let bounds = Bounds::from_position_size(c.bounds.position(), size);
        if bounds == c.bounds {
            return Ok(false);
        }
        c.bounds = bounds;
        c.size = bounds.size();
        self.emit(&StoreEvent::Resized { id: *id, bounds });
        Ok(true)
    }

    /// Replace a component's bounds outright (normalized first).
    pub fn set_bounds(&mut self, id: &ComponentId, bounds: Bounds) -> Result<bool, StoreError> {
        let c = self.get_mut(id)?;
        let bounds = bounds.normalized();
        if ![bounds.left, bounds.top, bounds.right, bounds.bottom]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(StoreError::NonFinite(*id));
        }
        if bounds == c.bounds {
            return Ok(false);
        }
        let resized = bounds.size() != c.size;
        c.bounds = bounds;
        c.size = bounds.size();
        let event = if resized {
            StoreEvent::Resized { id: *id, bounds }
        } else {
            StoreEvent::Moved { id: *id, bounds }
        };
        self.emit(&event);
        Ok(true)
    }

    // --- Layers ---

    fn move_layer(&mut self, id: &ComponentId, target: impl FnOnce(i64, i64) -> i64) -> Result<bool, StoreError> {
        let count = self.layer_count();
        let from = self.get_mut(id)?.layer;
        let to = target(from, count).clamp(0, (count - 1).max(0));
        if from == to {
            return Ok(false);
        }
        for c in self.components.values_mut() {
            if c.id == *id {
                c.layer = to;
            } else if from < to && c.layer > from && c.layer <= to {
                c.layer -= 1;
            } else if to < from && c.layer >= to && c.layer < from {
                c.layer += 1;
            }
        }
        debug!(%id, from, to, "component relayered");
        self.emit(&StoreEvent::Relayered { id: *id, layer: to });
        Ok(true)
    }

    /// Put a component below all others.
    pub fn send_to_back(&mut self, id: &ComponentId) -> Result<bool, StoreError> {
        self.move_layer(id, |_, _| 0)
    }

    /// Swap a component with the one directly below it.
    pub fn send_backward(&mut self, id: &ComponentId) -> Result<bool, StoreError> {
        self.move_layer(id, |from, _| from - 1)
    }

    /// Swap a component with the one directly above it.
    pub fn bring_forward(&mut self, id: &ComponentId) -> Result<bool, StoreError> {
        self.move_layer(id, |from, _| from + 1)
    }

    /// Put a component above all others.
    pub fn bring_to_front(&mut self, id: &ComponentId) -> Result<bool, StoreError> {
        self.move_layer(id, |_, count| count - 1)
    }

    // --- Attributes ---

    pub fn rename(&mut self, id: &ComponentId, name: &str) -> Result<bool, StoreError> {
        let c = self.get_mut(id)?;
        if c.name == name {
            return Ok(false);
        }
        c.name = name.to_owned();
        self.emit(&StoreEvent::Renamed { id: *id, name: name.to_owned() });
        Ok(true)
    }

    pub fn set_color(&mut self, id: &ComponentId, color: &str) -> Result<bool, StoreError> {
        let c = self.get_mut(id)?;
        if c.color == color {
            return Ok(false);
        }
        c.color = color.to_owned();
        self.emit(&StoreEvent::Restyled { id: *id });
        Ok(true)
    }

    pub fn set_css(&mut self, id: &ComponentId, css: serde_json::Value) -> Result<bool, StoreError> {
        let c = self.get_mut(id)?;
        if c.css == css {
            return Ok(false);
        }
        c.css = css;
        self.emit(&StoreEvent::Restyled { id: *id });
        Ok(true)
    }

    /// Refresh the informational parent mirror.
    pub fn set_parent_hint(&mut self, id: &ComponentId, parent: Option<ComponentId>) -> Result<bool, StoreError> {
        let c = self.get_mut(id)?;
        if c.parent == parent {
            return Ok(false);
        }
        c.parent = parent;
        self.emit(&StoreEvent::ParentChanged { id: *id, parent });
        Ok(true)
    }

    // --- Selection ---

    fn replace_selection(&mut self, next: HashSet<ComponentId>) -> bool {
        if next == self.selection {
            return false;
        }
        self.selection = next;
        self.emit(&StoreEvent::SelectionChanged);
        true
    }

    /// Make `id` the only selected component.
    pub fn select(&mut self, id: &ComponentId) -> Result<bool, StoreError> {
        if !self.components.contains_key(id) {
            debug!(%id, "select of unknown component");
            return Err(StoreError::NotFound(*id));
        }
        Ok(self.replace_selection(HashSet::from([*id])))
    }

    /// Add `id` to the selection, or remove it if already selected.
    pub fn toggle_select(&mut self, id: &ComponentId) -> Result<bool, StoreError> {
        if !self.components.contains_key(id) {
            debug!(%id, "toggle of unknown component");
            return Err(StoreError::NotFound(*id));
        }
        let mut next = self.selection.clone();
        if !next.remove(id) {
            next.insert(*id);
        }
        Ok(self.replace_selection(next))
    }

    /// Replace the selection with `ids`. Unknown ids are skipped.
    pub fn select_multiple<'a, I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = &'a ComponentId>,
    {
        let next = ids
            .into_iter()
            .filter(|id| {
                let known = self.components.contains_key(*id);
                if !known {
                    debug!(%id, "skipping unknown component in multi-select");
                }
                known
            })
            .copied()
            .collect();
        self.replace_selection(next)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.replace_selection(HashSet::new())
    }

    #[must_use]
    pub fn selection(&self) -> &HashSet<ComponentId> {
        &self.selection
    }

    #[must_use]
    pub fn is_selected(&self, id: &ComponentId) -> bool {
        self.selection.contains(id)
    }

    /// Bounding box of the selection: the component's own bounds when exactly
    /// one is selected, otherwise the common bounds of all selected.
    #[must_use]
    pub fn selected_bounds(&self) -> Option<Bounds> {
        if self.selection.len() == 1 {
            let id = self.selection.iter().next()?;
            return self.bounds_of(id);
        }
        let rects: Vec<Bounds> = self.selection.iter().filter_map(|id| self.bounds_of(id)).collect();
        common_bounds(&rects)
    }

    // --- Queries ---

    #[must_use]
    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    #[must_use]
    pub fn bounds_of(&self, id: &ComponentId) -> Option<Bounds> {
        self.components.get(id).map(|c| c.bounds)
    }

    /// Immutable copy of every component's bounds.
    #[must_use]
    pub fn bounds_snapshot(&self) -> HashMap<ComponentId, Bounds> {
        self.components.iter().map(|(id, c)| (*id, c.bounds)).collect()
    }

    /// All components sorted bottom to top.
    #[must_use]
    pub fn components_by_layer(&self) -> Vec<&Component> {
        let mut all: Vec<&Component> = self.components.values().collect();
        all.sort_by(|a, b| a.layer.cmp(&b.layer).then_with(|| a.id.cmp(&b.id)));
        all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
