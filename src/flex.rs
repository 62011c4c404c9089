//! Flex-style group alignment.
//!
//! The children are treated as one group: their common bounds is aligned
//! against the parent and the resulting single translation is applied to every
//! child, so the children keep their offsets relative to one another.
//!
//! `justify_*` operates on the main axis and `align_*` on the cross axis, as in
//! CSS flexbox: for [`Direction::Row`] the main axis is x, for
//! [`Direction::Column`] it is y.

#[cfg(test)]
#[path = "flex_test.rs"]
mod flex_test;

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, common_bounds};

/// Layout direction of the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Row,
    Column,
}

/// Where along an axis the group is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlexAlign {
    Start,
    Center,
    End,
}

/// A single flex operation, as requested by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexOp {
    AlignStart,
    AlignCenter,
    AlignEnd,
    JustifyStart,
    JustifyCenter,
    JustifyEnd,
    CenterCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Direction {
    fn main_axis(self) -> Axis {
        match self {
            Self::Row => Axis::X,
            Self::Column => Axis::Y,
        }
    }

    fn cross_axis(self) -> Axis {
        match self {
            Self::Row => Axis::Y,
            Self::Column => Axis::X,
        }
    }
}

fn axis_span(b: &Bounds, axis: Axis) -> (f64, f64) {
    match axis {
        Axis::X => (b.left, b.right),
        Axis::Y => (b.top, b.bottom),
    }
}

fn axis_delta(group: &Bounds, parent: &Bounds, axis: Axis, how: FlexAlign) -> f64 {
    let (g_near, g_far) = axis_span(group, axis);
    let (p_near, p_far) = axis_span(parent, axis);
    match how {
        FlexAlign::Start => p_near - g_near,
        FlexAlign::End => p_far - g_far,
        FlexAlign::Center => (p_near + p_far) / 2.0 - (g_near + g_far) / 2.0,
    }
}

fn translate_all(children: &[Bounds], dx: f64, dy: f64) -> Vec<Bounds> {
    children.iter().map(|c| c.translate(dx, dy)).collect()
}

fn shift_on_axis(children: &[Bounds], parent: &Bounds, axis: Axis, how: FlexAlign) -> Vec<Bounds> {
    let Some(group) = common_bounds(children) else {
        return Vec::new();
    };
    let delta = axis_delta(&group, parent, axis, how);
    match axis {
        Axis::X => translate_all(children, delta, 0.0),
        Axis::Y => translate_all(children, 0.0, delta),
    }
}

/// Position the group on the cross axis.
#[must_use]
pub fn align(children: &[Bounds], parent: &Bounds, direction: Direction, how: FlexAlign) -> Vec<Bounds> {
    shift_on_axis(children, parent, direction.cross_axis(), how)
}

/// Position the group on the main axis.
#[must_use]
pub fn justify(children: &[Bounds], parent: &Bounds, direction: Direction, how: FlexAlign) -> Vec<Bounds> {
    shift_on_axis(children, parent, direction.main_axis(), how)
}

#[must_use]
pub fn align_start(children: &[Bounds], parent: &Bounds, direction: Direction) -> Vec<Bounds> {
    align(children, parent, direction, FlexAlign::Start)
}

#[must_use]
pub fn align_center(children: &[Bounds], parent: &Bounds, direction: Direction) -> Vec<Bounds> {
    align(children, parent, direction, FlexAlign::Center)
}

#[must_use]
pub fn align_end(children: &[Bounds], parent: &Bounds, direction: Direction) -> Vec<Bounds> {
    align(children, parent, direction, FlexAlign::End)
}

#[must_use]
pub fn justify_start(children: &[Bounds], parent: &Bounds, direction: Direction) -> Vec<Bounds> {
    justify(children, parent, direction, FlexAlign::Start)
}

#[must_use]
pub fn justify_center(children: &[Bounds], parent: &Bounds, direction: Direction) -> Vec<Bounds> {
    justify(children, parent, direction, FlexAlign::Center)
}

#[must_use]
pub fn justify_end(children: &[Bounds], parent: &Bounds, direction: Direction) -> Vec<Bounds> {
    justify(children, parent, direction, FlexAlign::End)
}

/// Center the group on both axes. Direction does not matter here.
#[must_use]
pub fn center_center(children: &[Bounds], parent: &Bounds) -> Vec<Bounds> {
    let Some(group) = common_bounds(children) else {
        return Vec::new();
    };
    let dx = axis_delta(&group, parent, Axis::X, FlexAlign::Center);
    let dy = axis_delta(&group, parent, Axis::Y, FlexAlign::Center);
    translate_all(children, dx, dy)
}

/// Dispatch a [`FlexOp`].
#[must_use]
pub fn apply(op: FlexOp, children: &[Bounds], parent: &Bounds, direction: Direction) -> Vec<Bounds> {
    match op {
        FlexOp::AlignStart => align_start(children, parent, direction),
        FlexOp::AlignCenter => align_center(children, parent, direction),
        FlexOp::AlignEnd => align_end(children, parent, direction),
        FlexOp::JustifyStart => justify_start(children, parent, direction),
        FlexOp::JustifyCenter => justify_center(children, parent, direction),
        FlexOp::JustifyEnd => justify_end(children, parent, direction),
        FlexOp::CenterCenter => center_center(children, parent),
    }
}
