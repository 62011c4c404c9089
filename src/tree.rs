//! Containment tree: explicit parent/child links between components.
//!
//! DESIGN
//! ======
//! The tree is kept separate from the component store. Link primitives
//! (`add_child`, `remove_child`, `update_parent`) keep both directions of every
//! link in sync and refuse to create cycles. Each checks the current state
//! first and reports whether anything changed, so callers can skip redundant
//! notifications.
//!
//! Re-deriving the hierarchy after a move is a pure function of the current
//! tree, an immutable snapshot of component bounds, and the moved component:
//! [`ContainmentTree::resolved`] returns a new tree that the caller swaps in
//! with [`ContainmentTree::update_tree`]. The store is never read while the
//! tree is being mutated.
//!
//! PARENT SELECTION
//! ================
//! A parent candidate must contain the moved bounds (inclusive on all sides).
//! The nearest top-left corner wins. Because a nested container's corner is
//! never farther from the moved corner than its ancestor's, the innermost
//! container always wins; equal distances go to the smaller area, then to the
//! lowest id.

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::doc::ComponentId;
use crate::geometry::Bounds;

// =============================================================================
// TYPES
// =============================================================================

/// One node per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: ComponentId,
    pub parent: Option<ComponentId>,
    pub children: BTreeSet<ComponentId>,
}

impl TreeNode {
    fn leaf(id: ComponentId) -> Self {
        Self { id, parent: None, children: BTreeSet::new() }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("tree node not found: {0}")]
    NotFound(ComponentId),
    #[error("linking {child} under {parent} would create a cycle")]
    Cycle { parent: ComponentId, child: ComponentId },
}

/// Parent/child hierarchy keyed by component id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainmentTree {
    nodes: BTreeMap<ComponentId, TreeNode>,
}

/// `child` lies entirely beyond one side of `parent`.
///
/// Partial overlap does not count as outside; parent re-selection after this
/// check handles partially exited components.
fn is_outside(child: &Bounds, parent: &Bounds) -> bool {
    child.left > parent.right || child.right < parent.left || child.top > parent.bottom || child.bottom < parent.top
}

impl ContainmentTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Lifecycle ---

    /// Register a parentless leaf. Returns false if `id` already exists.
    pub fn add_new_leaf(&mut self, id: ComponentId) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, TreeNode::leaf(id));
        true
    }

    /// Remove a node, handing its children to its parent (or making them roots).
    pub fn remove_leaf(&mut self, id: &ComponentId) -> Result<bool, TreeError> {
        let node = self.nodes.remove(id).ok_or(TreeError::NotFound(*id))?;
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.remove(id);
            parent.children.extend(node.children.iter().copied());
        }
        for child in &node.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = node.parent;
            }
        }
        debug!(%id, children = node.children.len(), "tree leaf removed");
        Ok(true)
    }

    // --- Link primitives ---

    fn require(&self, id: &ComponentId) -> Result<&TreeNode, TreeError> {
        self.nodes.get(id).ok_or(TreeError::NotFound(*id))
    }

    /// Make `child` a child of `parent`, detaching it from any previous parent.
    pub fn add_child(&mut self, parent: &ComponentId, child: &ComponentId) -> Result<bool, TreeError> {
        self.require(parent)?;
        if self.require(child)?.parent == Some(*parent) {
            return Ok(false);
        }
        if parent == child || self.is_ancestor(child, parent) {
            warn!(%parent, %child, "rejected cyclic link");
            return Err(TreeError::Cycle { parent: *parent, child: *child });
        }
        self.detach(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.insert(*child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(*parent);
        }
        Ok(true)
    }

    /// Detach `child` from `parent`. No-op if `parent` is not its parent.
    pub fn remove_child(&mut self, parent: &ComponentId, child: &ComponentId) -> Result<bool, TreeError> {
        self.require(parent)?;
        if self.require(child)?.parent != Some(*parent) {
            return Ok(false);
        }
        self.detach(child);
        Ok(true)
    }

    /// Set or clear the parent of `child`.
    pub fn update_parent(&mut self, child: &ComponentId, parent: Option<&ComponentId>) -> Result<bool, TreeError> {
        match parent {
            Some(p) => self.add_child(p, child),
            None => {
                let current = self.require(child)?.parent;
                match current {
                    Some(p) => self.remove_child(&p, child),
                    None => Ok(false),
                }
            }
        }
    }

    fn detach(&mut self, child: &ComponentId) {
        let Some(old) = self.nodes.get_mut(child).and_then(|c| c.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&old) {
            p.children.remove(child);
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.nodes.contains_key(id)
    }

    #[must_use]
    pub fn node(&self, id: &ComponentId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn parent_of(&self, id: &ComponentId) -> Option<ComponentId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children_of(&self, id: &ComponentId) -> Option<&BTreeSet<ComponentId>> {
        self.nodes.get(id).map(|n| &n.children)
    }

    /// Parent, grandparent, … up to the root.
    #[must_use]
    pub fn ancestors(&self, id: &ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut cursor = self.parent_of(id);
        while let Some(p) = cursor {
            if out.contains(&p) || p == *id {
                break;
            }
            out.push(p);
            cursor = self.parent_of(&p);
        }
        out
    }

    /// Whether `ancestor` appears on the parent chain of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &ComponentId, id: &ComponentId) -> bool {
        self.ancestors(id).contains(ancestor)
    }

    /// Every node below `id`, depth first.
    #[must_use]
    pub fn descendants(&self, id: &ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack: Vec<ComponentId> = self.children_of(id).map(|c| c.iter().copied().collect()).unwrap_or_default();
        while let Some(next) = stack.pop() {
            if out.contains(&next) {
                continue;
            }
            out.push(next);
            if let Some(children) = self.children_of(&next) {
                stack.extend(children.iter().copied());
            }
        }
        out
    }

    /// Parentless nodes in id order.
    #[must_use]
    pub fn roots(&self) -> Vec<ComponentId> {
        self.nodes.values().filter(|n| n.parent.is_none()).map(|n| n.id).collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every link is mirrored, refers to a live node, and no node is its own ancestor.
    #[must_use]
    pub fn check_consistency(&self) -> bool {
        self.nodes.values().all(|n| {
            let parent_ok = n
                .parent
                .is_none_or(|p| self.nodes.get(&p).is_some_and(|pn| pn.children.contains(&n.id)));
            let children_ok = n
                .children
                .iter()
                .all(|c| self.nodes.get(c).is_some_and(|cn| cn.parent == Some(n.id)));
            parent_ok && children_ok && !self.on_cycle(&n.id)
        })
    }

    fn on_cycle(&self, id: &ComponentId) -> bool {
        let mut cursor = self.parent_of(id);
        let mut steps = 0;
        while let Some(p) = cursor {
            if p == *id || steps > self.nodes.len() {
                return true;
            }
            steps += 1;
            cursor = self.parent_of(&p);
        }
        false
    }

    // =========================================================================
    // RESOLUTION
    // =========================================================================

    /// Re-derive the hierarchy around `moved` now occupying `new_bounds`.
    ///
    /// `bounds` is a snapshot of every component's bounds; the entry for
    /// `moved` is ignored in favour of `new_bounds`. Returns the new tree and
    /// leaves `self` untouched.
    pub fn resolved(
        &self,
        bounds: &HashMap<ComponentId, Bounds>,
        moved: &ComponentId,
        new_bounds: Bounds,
    ) -> Result<Self, TreeError> {
        let mut next = self.clone();
        next.resolve_in_place(bounds, moved, new_bounds)?;
        debug_assert!(next.check_consistency(), "containment tree inconsistent after resolving {moved}");
        Ok(next)
    }

    /// Resolve and apply atomically. Returns whether the hierarchy changed.
    pub fn update_tree(
        &mut self,
        bounds: &HashMap<ComponentId, Bounds>,
        moved: &ComponentId,
        new_bounds: Bounds,
    ) -> Result<bool, TreeError> {
        let next = self.resolved(bounds, moved, new_bounds)?;
        let changed = next != *self;
        *self = next;
        Ok(changed)
    }

    /// Re-home `id` and its direct children wherever a link no longer matches
    /// the snapshot: `id` goes to the nearest ancestor that contains it, and
    /// each child outside `id` goes to the nearest ancestor of `id` that
    /// contains the child. No other parent is searched for.
    ///
    /// Used for components that moved together with an ancestor that was
    /// already resolved with [`ContainmentTree::update_tree`].
    pub fn release_uncontained(&mut self, bounds: &HashMap<ComponentId, Bounds>, id: &ComponentId) -> Result<bool, TreeError> {
        self.require(id)?;
        let lookup = |c: &ComponentId| bounds.get(c).copied();
        let Some(own) = lookup(id) else {
            return Ok(false);
        };
        let mut changed = false;

        if let Some(parent) = self.parent_of(id) {
            if lookup(&parent).is_some_and(|b| !b.contains(&own)) {
                let target = self.nearest_containing(self.parent_of(&parent), &own, &lookup);
                changed |= self.update_parent(id, target.as_ref())?;
                debug!(%id, %parent, new_parent = ?target, "released from parent");
            }
        }

        changed |= self.resolve_children_outside(id, own, &lookup)?;
        Ok(changed)
    }

    fn resolve_in_place(
        &mut self,
        bounds: &HashMap<ComponentId, Bounds>,
        moved: &ComponentId,
        new_bounds: Bounds,
    ) -> Result<(), TreeError> {
        self.require(moved)?;
        let lookup = |id: &ComponentId| -> Option<Bounds> {
            if id == moved { Some(new_bounds) } else { bounds.get(id).copied() }
        };

        self.resolve_outside_parent(moved, new_bounds, &lookup)?;
        self.resolve_children_outside(moved, new_bounds, &lookup)?;

        let best = self.find_best_parent(moved, new_bounds, &lookup);
        self.update_parent(moved, best.as_ref())?;
        self.adopt_enclosed(moved, new_bounds, best, &lookup)?;

        debug!(%moved, parent = ?best, "containment resolved");
        Ok(())
    }

    /// Step 1: a component that left its parent entirely moves to the grandparent.
    fn resolve_outside_parent<F>(&mut self, moved: &ComponentId, new_bounds: Bounds, lookup: &F) -> Result<(), TreeError>
    where
        F: Fn(&ComponentId) -> Option<Bounds>,
    {
        let Some(parent) = self.parent_of(moved) else {
            return Ok(());
        };
        let Some(parent_bounds) = lookup(&parent) else {
            return Ok(());
        };
        if is_outside(&new_bounds, &parent_bounds) {
            let grandparent = self.parent_of(&parent);
            self.update_parent(moved, grandparent.as_ref())?;
            debug!(%moved, %parent, "moved outside parent");
        }
        Ok(())
    }

    /// Step 2: children no longer inside the new bounds go to the moved
    /// component's parent, or further up if that parent does not contain them.
    fn resolve_children_outside<F>(&mut self, moved: &ComponentId, new_bounds: Bounds, lookup: &F) -> Result<bool, TreeError>
    where
        F: Fn(&ComponentId) -> Option<Bounds>,
    {
        let parent = self.parent_of(moved);
        let children: Vec<ComponentId> = self.children_of(moved).map(|c| c.iter().copied().collect()).unwrap_or_default();
        let mut changed = false;
        for child in children {
            let Some(child_bounds) = lookup(&child) else {
                continue;
            };
            if new_bounds.contains(&child_bounds) {
                continue;
            }
            let target = self.nearest_containing(parent, &child_bounds, lookup);
            changed |= self.update_parent(&child, target.as_ref())?;
            debug!(%moved, %child, parent = ?target, "child released");
        }
        Ok(changed)
    }

    fn nearest_containing<F>(&self, start: Option<ComponentId>, inner: &Bounds, lookup: &F) -> Option<ComponentId>
    where
        F: Fn(&ComponentId) -> Option<Bounds>,
    {
        let mut chain = Vec::new();
        if let Some(s) = start {
            chain.push(s);
            chain.extend(self.ancestors(&s));
        }
        chain
            .into_iter()
            .find(|id| lookup(id).is_some_and(|b| b.contains(inner)))
    }

    /// Step 3: the closest component whose bounds contain the moved bounds.
    fn find_best_parent<F>(&self, moved: &ComponentId, new_bounds: Bounds, lookup: &F) -> Option<ComponentId>
    where
        F: Fn(&ComponentId) -> Option<Bounds>,
    {
        let excluded: HashSet<ComponentId> = self.descendants(moved).into_iter().chain([*moved]).collect();
        let mut best: Option<(ComponentId, f64, f64)> = None;
        for id in self.nodes.keys() {
            if excluded.contains(id) {
                continue;
            }
            let Some(candidate) = lookup(id) else {
                continue;
            };
            if !candidate.contains(&new_bounds) {
                continue;
            }
            let distance = (candidate.left - new_bounds.left).hypot(candidate.top - new_bounds.top);
            let area = candidate.area();
            let better = match best {
                None => true,
                Some((_, d, a)) => distance < d || (distance == d && area < a),
            };
            if better {
                best = Some((*id, distance, area));
            }
        }
        best.map(|(id, _, _)| id)
    }

    /// Step 4: siblings (or roots) enclosed by the moved bounds become its children.
    fn adopt_enclosed<F>(
        &mut self,
        moved: &ComponentId,
        new_bounds: Bounds,
        parent: Option<ComponentId>,
        lookup: &F,
    ) -> Result<(), TreeError>
    where
        F: Fn(&ComponentId) -> Option<Bounds>,
    {
        let siblings: Vec<ComponentId> = match parent {
            Some(p) => self.children_of(&p).map(|c| c.iter().copied().collect()).unwrap_or_default(),
            None => self.roots(),
        };
        for sibling in siblings {
            if sibling == *moved || self.is_ancestor(&sibling, moved) {
                continue;
            }
            if lookup(&sibling).is_some_and(|b| new_bounds.contains(&b)) {
                self.add_child(moved, &sibling)?;
                debug!(%moved, %sibling, "adopted enclosed component");
            }
        }
        Ok(())
    }
}
