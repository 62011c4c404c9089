use super::*;
use crate::doc::ComponentSpec;
use crate::geometry::Size;

fn store_with(rects: &[(f64, f64, f64, f64)]) -> (ComponentStore, Vec<ComponentId>) {
    let mut store = ComponentStore::new();
    let ids = rects
        .iter()
        .map(|&(x, y, w, h)| {
            store
                .create(ComponentSpec {
                    position: Point::new(x, y),
                    size: Some(Size::new(w, h)),
                    ..ComponentSpec::default()
                })
                .id
        })
        .collect();
    (store, ids)
}

// =============================================================
// handle_at
// =============================================================

#[test]
fn corner_within_tolerance() {
    let sel = Bounds::new(100.0, 100.0, 200.0, 150.0);
    assert_eq!(handle_at(Point::new(104.0, 97.0), &sel, 6.0), Some(Handle::TopLeft));
    assert_eq!(handle_at(Point::new(200.0, 150.0), &sel, 6.0), Some(Handle::BottomRight));
}

#[test]
fn edge_midpoints() {
    let sel = Bounds::new(100.0, 100.0, 200.0, 150.0);
    assert_eq!(handle_at(Point::new(150.0, 100.0), &sel, 6.0), Some(Handle::Top));
    assert_eq!(handle_at(Point::new(201.0, 125.0), &sel, 6.0), Some(Handle::Right));
}

#[test]
fn outside_tolerance_misses() {
    let sel = Bounds::new(100.0, 100.0, 200.0, 150.0);
    assert_eq!(handle_at(Point::new(107.0, 100.0), &sel, 6.0), None);
    assert_eq!(handle_at(Point::new(150.0, 125.0), &sel, 6.0), None);
}

#[test]
fn tiny_box_prefers_corner() {
    // Every handle overlaps; the first corner wins.
    let sel = Bounds::new(0.0, 0.0, 4.0, 4.0);
    assert_eq!(handle_at(Point::new(2.0, 2.0), &sel, 6.0), Some(Handle::TopLeft));
}

#[test]
fn overlapping_corner_beats_nearer_edge_midpoint() {
    let sel = Bounds::new(0.0, 0.0, 8.0, 4.0);
    assert_eq!(handle_at(Point::new(5.0, 0.0), &sel, 6.0), Some(Handle::TopLeft));
    assert_eq!(handle_at(Point::new(7.0, 0.0), &sel, 6.0), Some(Handle::TopRight));
}

// =============================================================
// component_at / hit_test
// =============================================================

#[test]
fn topmost_layer_wins() {
    let (store, ids) = store_with(&[(0.0, 0.0, 100.0, 100.0), (50.0, 50.0, 100.0, 100.0)]);
    assert_eq!(component_at(Point::new(75.0, 75.0), &store), Some(ids[1]));
    assert_eq!(component_at(Point::new(10.0, 10.0), &store), Some(ids[0]));
    assert_eq!(component_at(Point::new(500.0, 500.0), &store), None);
}

#[test]
fn hit_test_checks_selection_handles_first() {
    let (mut store, ids) = store_with(&[(0.0, 0.0, 100.0, 100.0), (95.0, 95.0, 50.0, 50.0)]);
    store.select(&ids[0]).unwrap();
    assert_eq!(hit_test(Point::new(100.0, 100.0), &store, 6.0), Some(Hit::Handle(Handle::BottomRight)));
    assert_eq!(hit_test(Point::new(120.0, 120.0), &store, 6.0), Some(Hit::Component(ids[1])));
}

#[test]
fn hit_test_without_selection_hits_bodies() {
    let (store, ids) = store_with(&[(0.0, 0.0, 100.0, 100.0)]);
    assert_eq!(hit_test(Point::new(0.0, 0.0), &store, 6.0), Some(Hit::Component(ids[0])));
    assert_eq!(hit_test(Point::new(-20.0, 0.0), &store, 6.0), None);
}
