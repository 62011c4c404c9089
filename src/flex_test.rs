#![allow(clippy::float_cmp)]

use super::*;

fn rect(l: f64, t: f64, r: f64, b: f64) -> Bounds {
    Bounds::new(l, t, r, b)
}

fn parent() -> Bounds {
    rect(0.0, 0.0, 200.0, 100.0)
}

fn children() -> Vec<Bounds> {
    vec![rect(40.0, 30.0, 60.0, 50.0), rect(70.0, 20.0, 90.0, 40.0)]
}

fn assert_offsets_preserved(before: &[Bounds], after: &[Bounds]) {
    let dx = after[0].left - before[0].left;
    let dy = after[0].top - before[0].top;
    for (b, a) in before.iter().zip(after) {
        assert_eq!(*a, b.translate(dx, dy));
    }
}

#[test]
fn empty_children_yield_empty_result() {
    assert!(align_start(&[], &parent(), Direction::Row).is_empty());
    assert!(center_center(&[], &parent()).is_empty());
}

#[test]
fn row_align_moves_cross_axis_only() {
    let out = align_start(&children(), &parent(), Direction::Row);
    // Common top is 20, parent top is 0.
    assert_eq!(out[0], rect(40.0, 10.0, 60.0, 30.0));
    assert_eq!(out[1], rect(70.0, 0.0, 90.0, 20.0));

    let out = align_end(&children(), &parent(), Direction::Row);
    // Common bottom is 50, parent bottom is 100.
    assert_eq!(out[0].bottom, 100.0);
    assert_eq!(out[1].top, 70.0);
    assert_offsets_preserved(&children(), &out);
}

#[test]
fn row_justify_moves_main_axis_only() {
    let out = justify_start(&children(), &parent(), Direction::Row);
    assert_eq!(out[0].left, 0.0);
    assert_eq!(out[0].top, 30.0);
    let out = justify_end(&children(), &parent(), Direction::Row);
    assert_eq!(out[1].right, 200.0);
    assert_offsets_preserved(&children(), &out);
}

#[test]
fn column_swaps_main_and_cross_axes() {
    let out = justify_start(&children(), &parent(), Direction::Column);
    assert_eq!(out[1].top, 0.0);
    assert_eq!(out[0].left, 40.0);
    let out = align_start(&children(), &parent(), Direction::Column);
    assert_eq!(out[0].left, 0.0);
    assert_eq!(out[0].top, 30.0);
}

#[test]
fn center_ops_center_the_group() {
    // Group spans x 40..90 (center 65) and y 20..50 (center 35).
    let out = justify_center(&children(), &parent(), Direction::Row);
    assert_eq!(out[0].left, 75.0);
    let out = align_center(&children(), &parent(), Direction::Row);
    assert_eq!(out[1].top, 35.0);
    let out = center_center(&children(), &parent());
    assert_eq!(out[0], rect(75.0, 45.0, 95.0, 65.0));
    assert_offsets_preserved(&children(), &out);
}

#[test]
fn apply_dispatches_by_op() {
    assert_eq!(
        apply(FlexOp::JustifyEnd, &children(), &parent(), Direction::Row),
        justify_end(&children(), &parent(), Direction::Row)
    );
    assert_eq!(apply(FlexOp::CenterCenter, &children(), &parent(), Direction::Column), center_center(&children(), &parent()));
}
