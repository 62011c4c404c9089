//! Interaction controller.
//!
//! The engine is the single writer of the component store and the
//! containment tree. Pointer events drive a small state machine
//! (`Idle → Drawing | Resizing | Dragging → Idle`); every step is computed by
//! the pure transform math from an immutable snapshot, either inline or on the
//! geometry worker, and written back here. The containment tree is only
//! re-resolved on commit (pointer-up or a flex alignment), once per topmost
//! affected component; selected descendants only have their stale links
//! re-homed.
//!
//! Every handler returns the [`Action`]s the host should process.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::doc::{Component, ComponentId, ComponentSpec, ComponentStore, StoreError};
use crate::flex::{self, Direction, FlexOp};
use crate::geometry::{Bounds, Handle, Point, Size};
use crate::hit::{Hit, hit_test};
use crate::input::{ComponentTemplate, Modifiers, MoveCoalescer, StartGeometry, Tool, TransformState};
use crate::transform::{TransformRequest, TransformResponse, compute};
use crate::tree::ContainmentTree;

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ComponentCreated { component: Component },
    BoundsChanged { id: ComponentId, bounds: Bounds },
    ComponentDeleted { id: ComponentId },
    SelectionChanged { selected: Vec<ComponentId>, bounds: Option<Bounds> },
    HierarchyChanged,
    RenderNeeded,
}

/// Core engine state.
#[derive(Debug)]
pub struct Engine {
    store: ComponentStore,
    tree: ContainmentTree,
    config: EngineConfig,
    canvas: Size,
    tool: Tool,
    template: Option<ComponentTemplate>,
    state: TransformState,
    coalescer: MoveCoalescer,
    selection_box: Option<Bounds>,
    next_gesture: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        info!(
            canvas_width = config.canvas.width,
            canvas_height = config.canvas.height,
            snap_threshold = config.snap_threshold,
            "layout engine created"
        );
        Self {
            store: ComponentStore::new(),
            tree: ContainmentTree::new(),
            config,
            canvas: config.canvas,
            tool: Tool::default(),
            template: None,
            state: TransformState::default(),
            coalescer: MoveCoalescer::new(),
            selection_box: None,
            next_gesture: 0,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    /// Mutable store access for hosts that subscribe to store events.
    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }

    #[must_use]
    pub fn tree(&self) -> &ContainmentTree {
        &self.tree
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn template(&self) -> Option<&ComponentTemplate> {
        self.template.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &TransformState {
        &self.state
    }

    /// Bounding box of the selection as of the last step.
    #[must_use]
    pub fn selection_box(&self) -> Option<Bounds> {
        self.selection_box
    }

    fn canvas_bounds(&self) -> Bounds {
        Bounds::from_position_size(Point::default(), self.canvas)
    }

    // --- Settings ---

    pub fn set_tool(&mut self, tool: Tool) {
        debug!(?tool, "tool changed");
        self.tool = tool;
    }

    pub fn set_template(&mut self, template: Option<ComponentTemplate>) {
        self.template = template;
    }

    pub fn set_canvas_size(&mut self, size: Size) -> Vec<Action> {
        if !size.width.is_finite() || !size.height.is_finite() {
            warn!(?size, "ignoring non-finite canvas size");
            return Vec::new();
        }
        self.canvas = size.abs();
        vec![Action::RenderNeeded]
    }

    // =========================================================================
    // COMPONENT OPERATIONS
    // =========================================================================

    /// Create a component and place it in the hierarchy.
    pub fn create_component(&mut self, mut spec: ComponentSpec) -> (ComponentId, Vec<Action>) {
        spec.size = Some(spec.size.unwrap_or(self.config.default_size));
        let component = self.store.create(spec);
        let id = component.id;
        self.tree.add_new_leaf(id);

        let mut actions = vec![Action::ComponentCreated { component }];
        actions.extend(self.commit(&[id]));
        actions.push(Action::RenderNeeded);
        (id, actions)
    }

    /// Remove a component from the store and the tree together. Its children
    /// move up to its parent.
    pub fn delete_component(&mut self, id: &ComponentId) -> Result<Vec<Action>, StoreError> {
        let was_selected = self.store.is_selected(id);
        self.store.delete(id)?;
        if let Err(e) = self.tree.remove_leaf(id) {
            warn!(%id, error = %e, "component missing from containment tree");
        }
        if self.state.subject_ids().contains(id) {
            debug!(%id, "transform subject deleted; cancelling gesture");
            self.state = TransformState::Idle;
            self.coalescer.clear();
        }
        self.sync_parent_hints();

        let mut actions = vec![Action::ComponentDeleted { id: *id }];
        if was_selected {
            actions.push(self.selection_changed());
        }
        actions.push(Action::HierarchyChanged);
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// Delete every selected component.
    pub fn delete_selection(&mut self) -> Vec<Action> {
        let mut ids: Vec<ComponentId> = self.store.selection().iter().copied().collect();
        ids.sort_unstable();
        let mut actions = Vec::new();
        for id in ids {
            match self.delete_component(&id) {
                Ok(a) => actions.extend(a),
                Err(e) => debug!(%id, error = %e, "skipping delete"),
            }
        }
        actions
    }

    pub fn bring_to_front(&mut self, id: &ComponentId) -> Result<Vec<Action>, StoreError> {
        Ok(render_if(self.store.bring_to_front(id)?))
    }

    pub fn bring_forward(&mut self, id: &ComponentId) -> Result<Vec<Action>, StoreError> {
        Ok(render_if(self.store.bring_forward(id)?))
    }

    pub fn send_backward(&mut self, id: &ComponentId) -> Result<Vec<Action>, StoreError> {
        Ok(render_if(self.store.send_backward(id)?))
    }

    pub fn send_to_back(&mut self, id: &ComponentId) -> Result<Vec<Action>, StoreError> {
        Ok(render_if(self.store.send_to_back(id)?))
    }

    pub fn rename(&mut self, id: &ComponentId, name: &str) -> Result<Vec<Action>, StoreError> {
        Ok(render_if(self.store.rename(id, name)?))
    }

    /// Replace the selection programmatically.
    pub fn select(&mut self, ids: &[ComponentId]) -> Vec<Action> {
        if self.store.select_multiple(ids) {
            vec![self.selection_changed(), Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Apply a flex operation to the selection. Components are aligned inside
    /// their containment parent, or the canvas when they are roots, then the
    /// hierarchy is re-resolved.
    pub fn align_selection(&mut self, direction: Direction, op: FlexOp) -> Vec<Action> {
        let mut groups: BTreeMap<Option<ComponentId>, Vec<(ComponentId, Bounds)>> = BTreeMap::new();
        let mut selected: Vec<ComponentId> = self.store.selection().iter().copied().collect();
        selected.sort_unstable();
        for id in &selected {
            if let Some(b) = self.store.bounds_of(id) {
                groups.entry(self.tree.parent_of(id)).or_default().push((*id, b));
            }
        }

        let mut actions = Vec::new();
        for (parent, members) in groups {
            let container = match parent {
                Some(p) => self.store.bounds_of(&p),
                None => Some(self.canvas_bounds()),
            };
            let Some(container) = container else {
                continue;
            };
            let rects: Vec<Bounds> = members.iter().map(|(_, b)| *b).collect();
            let placed = flex::apply(op, &rects, &container, direction);
            for ((id, _), bounds) in members.iter().zip(placed) {
                actions.extend(self.write_bounds(id, bounds));
            }
        }
        debug!(?direction, ?op, count = selected.len(), "selection aligned");

        self.refresh_selection_box();
        actions.extend(self.commit(&selected));
        actions.push(Action::RenderNeeded);
        actions
    }

    // =========================================================================
    // POINTER INPUT
    // =========================================================================

    /// Classify the gesture under `point` and enter the matching state.
    pub fn on_pointer_down(&mut self, point: Point, modifiers: Modifiers) -> Vec<Action> {
        if !self.state.is_idle() {
            debug!("pointer-down ignored: transform in progress");
            return Vec::new();
        }
        self.coalescer.clear();

        if self.tool == Tool::Draw {
            return self.begin_draw(point);
        }

        match hit_test(point, &self.store, self.config.handle_tolerance) {
            Some(Hit::Handle(handle)) => self.begin_resize(point, handle, modifiers.alt),
            Some(Hit::Component(id)) => {
                let changed = if modifiers.shift {
                    self.store.toggle_select(&id)
                } else if self.store.is_selected(&id) {
                    Ok(false)
                } else {
                    self.store.select(&id)
                };
                let mut actions = Vec::new();
                match changed {
                    Ok(true) => actions.push(self.selection_changed()),
                    Ok(false) => {}
                    Err(e) => debug!(error = %e, "hit component vanished"),
                }
                if self.store.is_selected(&id) {
                    self.begin_drag(point);
                }
                actions.push(Action::RenderNeeded);
                actions
            }
            None => {
                if self.store.clear_selection() {
                    vec![self.selection_changed(), Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Record a pointer move for the next animation frame. Returns true when
    /// the host should request a frame.
    pub fn on_pointer_move(&mut self, point: Point) -> bool {
        if self.state.is_idle() {
            return false;
        }
        self.coalescer.push(point)
    }

    /// Process the latest pointer move recorded since the previous frame.
    pub fn on_animation_frame(&mut self) -> Vec<Action> {
        match self.coalescer.take() {
            Some(point) => self.apply_pointer_move(point),
            None => Vec::new(),
        }
    }

    /// Process a pointer move immediately, bypassing coalescing.
    pub fn apply_pointer_move(&mut self, point: Point) -> Vec<Action> {
        match self.transform_request(point) {
            Some(request) => self.apply_transform_response(&compute(&request)),
            None => Vec::new(),
        }
    }

    /// Snapshot the active transform for `point`, for the geometry worker.
    #[must_use]
    pub fn transform_request(&self, point: Point) -> Option<TransformRequest> {
        self.state
            .request(point, self.canvas, self.config.snap_threshold, |id| self.store.bounds_of(id))
    }

    /// Write a computed step back into the store. Answers for a gesture that
    /// is no longer active are discarded.
    pub fn apply_transform_response(&mut self, response: &TransformResponse) -> Vec<Action> {
        if self.state.gesture() != Some(response.gesture) {
            debug!(gesture = response.gesture, "discarding stale transform response");
            return Vec::new();
        }
        let mut actions = Vec::new();
        for update in &response.updates {
            actions.extend(self.write_bounds(&update.id, update.bounds));
        }
        if !actions.is_empty() {
            self.refresh_selection_box();
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Finish the gesture at `point` and commit the hierarchy.
    pub fn on_pointer_up(&mut self, point: Point) -> Vec<Action> {
        if self.state.is_idle() {
            self.coalescer.clear();
            return Vec::new();
        }
        self.coalescer.clear();
        let mut actions = self.apply_pointer_move(point);

        let subjects = self.state.subject_ids();
        self.state = TransformState::Idle;
        actions.extend(self.commit(&subjects));
        self.refresh_selection_box();
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Gesture starts ---

    fn next_gesture(&mut self) -> u64 {
        self.next_gesture += 1;
        self.next_gesture
    }

    fn selected_starts(&self) -> Vec<StartGeometry> {
        let mut starts: Vec<StartGeometry> = self
            .store
            .selection()
            .iter()
            .filter_map(|id| self.store.bounds_of(id).map(|bounds| StartGeometry { id: *id, bounds }))
            .collect();
        starts.sort_by_key(|s| s.id);
        starts
    }

    fn begin_draw(&mut self, point: Point) -> Vec<Action> {
        let Some(template) = self.template.clone() else {
            warn!("draw tool active without a template; ignoring pointer-down");
            return Vec::new();
        };
        let anchor = Point::new(point.x.max(0.0).min(self.canvas.width), point.y.max(0.0).min(self.canvas.height));
        let component = self.store.create(ComponentSpec {
            name: Some(template.name),
            position: anchor,
            size: Some(Size::default()),
            layer: None,
            color: Some(template.color),
            css: Some(template.css),
        });
        let id = component.id;
        self.tree.add_new_leaf(id);

        let mut actions = vec![Action::ComponentCreated { component }];
        if let Err(e) = self.store.select(&id) {
            debug!(%id, error = %e, "drawn component vanished");
        }
        actions.push(self.selection_changed());
        let gesture = self.next_gesture();
        self.state = TransformState::Drawing { gesture, id, anchor };
        debug!(%id, gesture, x = anchor.x, y = anchor.y, "draw started");
        actions.push(Action::RenderNeeded);
        actions
    }

    fn begin_resize(&mut self, point: Point, handle: Handle, from_center: bool) -> Vec<Action> {
        let starts = self.selected_starts();
        let gesture = self.next_gesture();
        debug!(gesture, ?handle, from_center, count = starts.len(), "resize started");
        self.state = TransformState::Resizing { gesture, handle, from_center, start_pointer: point, starts };
        Vec::new()
    }

    fn begin_drag(&mut self, point: Point) {
        let starts = self.selected_starts();
        let Some(start_box) = self.store.selected_bounds() else {
            return;
        };
        let others: Vec<Bounds> = self
            .store
            .components_by_layer()
            .into_iter()
            .filter(|c| !self.store.is_selected(&c.id))
            .map(|c| c.bounds)
            .collect();
        let gesture = self.next_gesture();
        debug!(gesture, count = starts.len(), candidates = others.len(), "drag started");
        self.state = TransformState::Dragging { gesture, start_pointer: point, start_box, starts, others };
    }

    // --- Helpers ---

    fn write_bounds(&mut self, id: &ComponentId, bounds: Bounds) -> Option<Action> {
        match self.store.set_bounds(id, bounds) {
            Ok(true) => self.store.bounds_of(id).map(|bounds| Action::BoundsChanged { id: *id, bounds }),
            Ok(false) => None,
            Err(e) => {
                debug!(%id, error = %e, "skipping bounds update");
                None
            }
        }
    }

    fn refresh_selection_box(&mut self) {
        self.selection_box = self.store.selected_bounds();
    }

    fn selection_changed(&mut self) -> Action {
        self.refresh_selection_box();
        let mut selected: Vec<ComponentId> = self.store.selection().iter().copied().collect();
        selected.sort_unstable();
        Action::SelectionChanged { selected, bounds: self.selection_box }
    }

    /// Re-resolve the hierarchy for every component in `ids` that has no
    /// ancestor in `ids`, then re-home the links of the nested ones,
    /// shallowest first.
    fn commit(&mut self, ids: &[ComponentId]) -> Vec<Action> {
        let set: HashSet<ComponentId> = ids.iter().copied().collect();
        let (topmost, mut nested): (Vec<ComponentId>, Vec<ComponentId>) = ids
            .iter()
            .copied()
            .partition(|id| !self.tree.ancestors(id).iter().any(|a| set.contains(a)));

        let snapshot = self.store.bounds_snapshot();
        let mut changed = false;
        for id in &topmost {
            let Some(bounds) = snapshot.get(id) else {
                continue;
            };
            match self.tree.update_tree(&snapshot, id, *bounds) {
                Ok(c) => changed |= c,
                Err(e) => warn!(%id, error = %e, "containment update failed"),
            }
        }

        nested.sort_by_key(|id| self.tree.ancestors(id).len());
        for id in &nested {
            match self.tree.release_uncontained(&snapshot, id) {
                Ok(c) => changed |= c,
                Err(e) => warn!(%id, error = %e, "containment release failed"),
            }
        }

        if !changed {
            return Vec::new();
        }
        self.sync_parent_hints();
        debug!(topmost = topmost.len(), nested = nested.len(), "hierarchy committed");
        vec![Action::HierarchyChanged]
    }

    /// Mirror tree parents onto the store components.
    fn sync_parent_hints(&mut self) {
        let parents: Vec<(ComponentId, Option<ComponentId>)> = self.tree.nodes().map(|n| (n.id, n.parent)).collect();
        for (id, parent) in parents {
            if let Err(e) = self.store.set_parent_hint(&id, parent) {
                debug!(%id, error = %e, "tree node without component");
            }
        }
    }
}

fn render_if(changed: bool) -> Vec<Action> {
    if changed { vec![Action::RenderNeeded] } else { Vec::new() }
}
