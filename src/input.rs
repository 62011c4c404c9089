//! Input model: tools, modifier keys, the drawing template, the transform
//! state machine, and pointer-move coalescing.
//!
//! `TransformState` is the gesture tracked between pointer-down and
//! pointer-up. Each active variant carries the start snapshot the transform
//! math needs, so every pointer-move step is computed from the gesture start
//! rather than accumulated from the previous step.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::ComponentId;
use crate::geometry::{Bounds, Handle, Point, Size};
use crate::transform::{Subject, TransformKind, TransformRequest};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Select, move and resize (default).
    #[default]
    Pointer,
    /// Draw a new component from the current template.
    Draw,
}

/// Modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Toggle selection instead of replacing it.
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    /// Resize from the center.
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

/// Presentation attributes stamped onto components created with the draw tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub css: serde_json::Value,
}

/// Start geometry of one component captured at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartGeometry {
    pub id: ComponentId,
    pub bounds: Bounds,
}

/// The gesture in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TransformState {
    /// Waiting for the next pointer-down.
    #[default]
    Idle,
    /// Sizing a freshly created component from its anchor corner.
    Drawing {
        gesture: u64,
        id: ComponentId,
        /// Pointer-down position clamped to the canvas.
        anchor: Point,
    },
    /// Dragging a handle of the selection box.
    Resizing {
        gesture: u64,
        handle: Handle,
        from_center: bool,
        start_pointer: Point,
        starts: Vec<StartGeometry>,
    },
    /// Moving the selection.
    Dragging {
        gesture: u64,
        start_pointer: Point,
        /// Selection box at pointer-down.
        start_box: Bounds,
        starts: Vec<StartGeometry>,
        /// Bounds of every non-selected component, for snapping.
        others: Vec<Bounds>,
    },
}

impl TransformState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Gesture counter of the active transform, if any.
    #[must_use]
    pub fn gesture(&self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Drawing { gesture, .. } | Self::Resizing { gesture, .. } | Self::Dragging { gesture, .. } => {
                Some(*gesture)
            }
        }
    }

    /// Ids of the components this gesture rewrites.
    #[must_use]
    pub fn subject_ids(&self) -> Vec<ComponentId> {
        match self {
            Self::Idle => Vec::new(),
            Self::Drawing { id, .. } => vec![*id],
            Self::Resizing { starts, .. } | Self::Dragging { starts, .. } => starts.iter().map(|s| s.id).collect(),
        }
    }

    /// Snapshot one pointer-move step as a [`TransformRequest`].
    ///
    /// `current` returns a component's bounds as of now; subjects it no
    /// longer knows are dropped from the request.
    pub fn request<F>(&self, pointer: Point, canvas: Size, snap_threshold: f64, current: F) -> Option<TransformRequest>
    where
        F: Fn(&ComponentId) -> Option<Bounds>,
    {
        let subjects = |starts: &[StartGeometry]| -> Vec<Subject> {
            starts
                .iter()
                .filter_map(|s| current(&s.id).map(|c| Subject { id: s.id, start: s.bounds, current: c }))
                .collect()
        };
        let (gesture, kind, subjects, start_pointer) = match self {
            Self::Idle => return None,
            Self::Drawing { gesture, id, anchor } => {
                let now = current(id)?;
                let subject = Subject { id: *id, start: Bounds::from_corners(*anchor, *anchor), current: now };
                (*gesture, TransformKind::Draw { anchor: *anchor }, vec![subject], *anchor)
            }
            Self::Resizing { gesture, handle, from_center, start_pointer, starts } => (
                *gesture,
                TransformKind::Resize { handle: *handle, from_center: *from_center },
                subjects(starts),
                *start_pointer,
            ),
            Self::Dragging { gesture, start_pointer, start_box, starts, others } => (
                *gesture,
                TransformKind::Drag { start_box: *start_box, others: others.clone() },
                subjects(starts),
                *start_pointer,
            ),
        };
        Some(TransformRequest { gesture, kind, subjects, start_pointer, pointer, canvas, snap_threshold })
    }
}

/// Keeps only the latest pointer-move between animation frames.
#[derive(Debug, Clone, Default)]
pub struct MoveCoalescer {
    pending: Option<Point>,
    dropped: u64,
}

impl MoveCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move. Returns true when this is the first move since the
    /// last frame, i.e. the host should request a frame.
    pub fn push(&mut self, point: Point) -> bool {
        let first = self.pending.is_none();
        if !first {
            self.dropped += 1;
        }
        self.pending = Some(point);
        first
    }

    /// Take the latest recorded move, if any.
    pub fn take(&mut self) -> Option<Point> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Moves superseded before they were processed.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
