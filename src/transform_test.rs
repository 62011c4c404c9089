#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;

fn rect(l: f64, t: f64, r: f64, b: f64) -> Bounds {
    Bounds::new(l, t, r, b)
}

fn subject(b: Bounds) -> Subject {
    Subject { id: Uuid::new_v4(), start: b, current: b }
}

fn request(kind: TransformKind, subjects: Vec<Subject>, from: Point, to: Point) -> TransformRequest {
    TransformRequest {
        gesture: 7,
        kind,
        subjects,
        start_pointer: from,
        pointer: to,
        canvas: Size::new(400.0, 300.0),
        snap_threshold: 4.0,
    }
}

fn drag_request(start_box: Bounds, others: Vec<Bounds>, delta: Point) -> TransformRequest {
    request(
        TransformKind::Drag { start_box, others },
        vec![subject(start_box)],
        Point::new(10.0, 10.0),
        Point::new(10.0 + delta.x, 10.0 + delta.y),
    )
}

// =============================================================
// draw
// =============================================================

#[test]
fn draw_spans_anchor_to_pointer() {
    let anchor = Point::new(100.0, 100.0);
    let req = request(
        TransformKind::Draw { anchor },
        vec![subject(rect(100.0, 100.0, 100.0, 100.0))],
        anchor,
        Point::new(60.0, 130.0),
    );
    let out = compute(&req);
    assert_eq!(out.gesture, 7);
    assert_eq!(out.updates[0].bounds, rect(60.0, 100.0, 100.0, 130.0));
}

#[test]
fn draw_keeps_axis_that_left_canvas() {
    let anchor = Point::new(100.0, 100.0);
    let mut s = subject(rect(100.0, 100.0, 100.0, 100.0));
    s.current = rect(100.0, 100.0, 150.0, 120.0);
    let req = request(TransformKind::Draw { anchor }, vec![s], anchor, Point::new(500.0, 140.0));
    assert_eq!(compute(&req).updates[0].bounds, rect(100.0, 100.0, 150.0, 140.0));
}

// =============================================================
// resize
// =============================================================

#[test]
fn resize_moves_all_subjects_in_lockstep() {
    let a = subject(rect(10.0, 10.0, 60.0, 40.0));
    let b = subject(rect(100.0, 50.0, 120.0, 80.0));
    let req = request(
        TransformKind::Resize { handle: Handle::BottomRight, from_center: false },
        vec![a, b],
        Point::new(120.0, 80.0),
        Point::new(130.0, 100.0),
    );
    let out = compute(&req);
    assert_eq!(out.updates[0].bounds, rect(10.0, 10.0, 70.0, 60.0));
    assert_eq!(out.updates[1].bounds, rect(100.0, 50.0, 130.0, 100.0));
}

#[test]
fn resize_reverts_axis_leaving_canvas() {
    let mut s = subject(rect(350.0, 10.0, 390.0, 40.0));
    s.current = rect(350.0, 10.0, 395.0, 45.0);
    let req = request(
        TransformKind::Resize { handle: Handle::BottomRight, from_center: false },
        vec![s],
        Point::new(390.0, 40.0),
        Point::new(420.0, 60.0),
    );
    // x would reach 420 > 400: keep the current x extent, y still follows.
    assert_eq!(compute(&req).updates[0].bounds, rect(350.0, 10.0, 395.0, 60.0));
}

#[test]
fn resize_from_center_grows_both_sides() {
    let req = request(
        TransformKind::Resize { handle: Handle::Right, from_center: true },
        vec![subject(rect(100.0, 100.0, 200.0, 150.0))],
        Point::new(200.0, 125.0),
        Point::new(210.0, 125.0),
    );
    assert_eq!(compute(&req).updates[0].bounds, rect(90.0, 100.0, 210.0, 150.0));
}

#[test]
fn resize_past_opposite_edge_flips() {
    let req = request(
        TransformKind::Resize { handle: Handle::Left, from_center: false },
        vec![subject(rect(100.0, 100.0, 150.0, 150.0))],
        Point::new(100.0, 125.0),
        Point::new(170.0, 125.0),
    );
    assert_eq!(compute(&req).updates[0].bounds, rect(150.0, 100.0, 170.0, 150.0));
}

// =============================================================
// drag
// =============================================================

#[test]
fn drag_translates_without_snap_candidates() {
    let out = compute(&drag_request(rect(0.0, 0.0, 50.0, 50.0), vec![], Point::new(37.0, 12.0)));
    assert_eq!(out.updates[0].bounds, rect(37.0, 12.0, 87.0, 62.0));
}

#[test]
fn drag_snaps_within_threshold() {
    let out = compute(&drag_request(
        rect(0.0, 0.0, 50.0, 50.0),
        vec![rect(103.0, 200.0, 153.0, 250.0)],
        Point::new(50.0, 0.0),
    ));
    assert_eq!(out.updates[0].bounds, rect(53.0, 0.0, 103.0, 50.0));
}

#[test]
fn drag_ignores_far_alignment() {
    let out = compute(&drag_request(
        rect(0.0, 0.0, 50.0, 50.0),
        vec![rect(110.0, 200.0, 160.0, 250.0)],
        Point::new(50.0, 0.0),
    ));
    assert_eq!(out.updates[0].bounds, rect(50.0, 0.0, 100.0, 50.0));
}

#[test]
fn drag_is_clamped_to_canvas() {
    let out = compute(&drag_request(rect(10.0, 10.0, 60.0, 60.0), vec![], Point::new(1000.0, -100.0)));
    assert_eq!(out.updates[0].bounds, rect(350.0, 0.0, 400.0, 50.0));
}

#[test]
fn drag_moves_every_subject_by_the_same_delta() {
    let a = subject(rect(0.0, 0.0, 10.0, 10.0));
    let b = subject(rect(40.0, 40.0, 60.0, 60.0));
    let req = request(
        TransformKind::Drag { start_box: rect(0.0, 0.0, 60.0, 60.0), others: vec![] },
        vec![a, b],
        Point::new(5.0, 5.0),
        Point::new(25.0, 35.0),
    );
    let out = compute(&req);
    assert_eq!(out.updates[0].bounds, rect(20.0, 30.0, 30.0, 40.0));
    assert_eq!(out.updates[1].bounds, rect(60.0, 70.0, 80.0, 90.0));
}
