#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;

fn spec_at(x: f64, y: f64, w: f64, h: f64) -> ComponentSpec {
    ComponentSpec {
        position: Point::new(x, y),
        size: Some(Size::new(w, h)),
        ..ComponentSpec::default()
    }
}

fn record_events(store: &mut ComponentStore) -> Rc<RefCell<Vec<StoreEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    events
}

fn layers(store: &ComponentStore, ids: &[ComponentId]) -> Vec<i64> {
    ids.iter().map(|id| store.get(id).unwrap().layer).collect()
}

fn assert_dense_layers(store: &ComponentStore) {
    let mut all: Vec<i64> = store.components_by_layer().iter().map(|c| c.layer).collect();
    all.sort_unstable();
    let expected: Vec<i64> = (0..all.len() as i64).collect();
    assert_eq!(all, expected);
}

fn three(store: &mut ComponentStore) -> [ComponentId; 3] {
    [
        store.create(ComponentSpec::default()).id,
        store.create(ComponentSpec::default()).id,
        store.create(ComponentSpec::default()).id,
    ]
}

// =============================================================
// create / delete
// =============================================================

#[test]
fn create_applies_defaults() {
    let mut store = ComponentStore::new();
    let c = store.create(ComponentSpec { position: Point::new(5.0, 6.0), ..ComponentSpec::default() });
    assert_eq!(c.size, Size::new(96.0, 40.0));
    assert_eq!(c.bounds, Bounds::new(5.0, 6.0, 101.0, 46.0));
    assert_eq!(c.layer, 0);
    assert_eq!(c.name, "Component 1");
    assert!(c.parent.is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn create_stacks_layers_on_top() {
    let mut store = ComponentStore::new();
    let ids = three(&mut store);
    assert_eq!(layers(&store, &ids), vec![0, 1, 2]);
}

#[test]
fn create_with_layer_inserts_and_shifts() {
    let mut store = ComponentStore::new();
    let ids = three(&mut store);
    let c = store.create(ComponentSpec { layer: Some(1), ..ComponentSpec::default() });
    assert_eq!(c.layer, 1);
    assert_eq!(layers(&store, &ids), vec![0, 2, 3]);
    assert_dense_layers(&store);
}

#[test]
fn create_with_out_of_range_layer_clamps() {
    let mut store = ComponentStore::new();
    three(&mut store);
    let c = store.create(ComponentSpec { layer: Some(99), ..ComponentSpec::default() });
    assert_eq!(c.layer, 3);
    assert_dense_layers(&store);
}

#[test]
fn delete_compacts_layers_and_selection() {
    let mut store = ComponentStore::new();
    let ids = three(&mut store);
    store.select(&ids[1]).unwrap();
    let removed = store.delete(&ids[1]).unwrap();
    assert_eq!(removed.id, ids[1]);
    assert!(store.selection().is_empty());
    assert_eq!(layers(&store, &[ids[0], ids[2]]), vec![0, 1]);
}

#[test]
fn delete_unknown_is_not_found() {
    let mut store = ComponentStore::new();
    three(&mut store);
    let missing = Uuid::new_v4();
    assert_eq!(store.delete(&missing), Err(StoreError::NotFound(missing)));
    assert_eq!(store.len(), 3);
}

// =============================================================
// geometry updates
// =============================================================

#[test]
fn update_position_keeps_size() {
    let mut store = ComponentStore::new();
    let id = store.create(spec_at(0.0, 0.0, 50.0, 20.0)).id;
    assert!(store.update_position(&id, Point::new(10.0, 15.0)).unwrap());
    let c = store.get(&id).unwrap();
    assert_eq!(c.bounds, Bounds::new(10.0, 15.0, 60.0, 35.0));
    assert_eq!(c.size, c.bounds.size());
}

#[test]
fn update_position_with_uses_current_value() {
    let mut store = ComponentStore::new();
    let id = store.create(spec_at(10.0, 10.0, 50.0, 20.0)).id;
    store.update_position_with(&id, |p| p.offset(5.0, -5.0)).unwrap();
    assert_eq!(store.get(&id).unwrap().position(), Point::new(15.0, 5.0));
}

#[test]
fn update_size_commits_absolute_values() {
    let mut store = ComponentStore::new();
    let id = store.create(spec_at(10.0, 10.0, 50.0, 20.0)).id;
    store.update_size_with(&id, |s| Size::new(-s.width, s.height * 2.0)).unwrap();
    let c = store.get(&id).unwrap();
    assert_eq!(c.size, Size::new(50.0, 40.0));
    assert_eq!(c.bounds, Bounds::new(10.0, 10.0, 60.0, 50.0));
}

#[test]
fn set_bounds_normalizes_and_syncs_size() {
    let mut store = ComponentStore::new();
    let id = store.create(ComponentSpec::default()).id;
    store
        .set_bounds(&id, Bounds { left: 40.0, top: 30.0, right: 10.0, bottom: 0.0 })
        .unwrap();
    let c = store.get(&id).unwrap();
    assert_eq!(c.bounds, Bounds::new(10.0, 0.0, 40.0, 30.0));
    assert_eq!(c.size, Size::new(30.0, 30.0));
}

#[test]
fn non_finite_geometry_is_rejected() {
    let mut store = ComponentStore::new();
    let id = store.create(spec_at(1.0, 2.0, 3.0, 4.0)).id;
    assert_eq!(store.update_position(&id, Point::new(f64::NAN, 0.0)), Err(StoreError::NonFinite(id)));
    assert_eq!(store.get(&id).unwrap().bounds, Bounds::new(1.0, 2.0, 4.0, 6.0));
}

#[test]
fn updates_on_unknown_id_leave_store_untouched() {
    let mut store = ComponentStore::new();
    let id = store.create(spec_at(1.0, 2.0, 3.0, 4.0)).id;
    let missing = Uuid::new_v4();
    assert!(store.update_position(&missing, Point::new(0.0, 0.0)).is_err());
    assert!(store.update_size(&missing, Size::new(1.0, 1.0)).is_err());
    assert!(store.rename(&missing, "x").is_err());
    assert!(store.bring_to_front(&missing).is_err());
    assert_eq!(store.get(&id).unwrap().bounds, Bounds::new(1.0, 2.0, 4.0, 6.0));
}

// =============================================================
// layers
// =============================================================

#[test]
fn bring_to_front_preserves_other_order() {
    let mut store = ComponentStore::new();
    let ids = three(&mut store);
    let d = store.create(ComponentSpec::default()).id;
    assert!(store.bring_to_front(&ids[0]).unwrap());
    assert_eq!(layers(&store, &[ids[1], ids[2], d, ids[0]]), vec![0, 1, 2, 3]);
    assert!(!store.bring_to_front(&ids[0]).unwrap());
}

#[test]
fn send_to_back_preserves_other_order() {
    let mut store = ComponentStore::new();
    let ids = three(&mut store);
    store.send_to_back(&ids[2]).unwrap();
    assert_eq!(layers(&store, &ids), vec![1, 2, 0]);
    assert_dense_layers(&store);
}

#[test]
fn forward_and_backward_swap_with_neighbor() {
    let mut store = ComponentStore::new();
    let ids = three(&mut store);
    store.bring_forward(&ids[0]).unwrap();
    assert_eq!(layers(&store, &ids), vec![1, 0, 2]);
    store.send_backward(&ids[2]).unwrap();
    assert_eq!(layers(&store, &ids), vec![2, 0, 1]);
    // Already at the bottom.
    assert!(!store.send_backward(&ids[1]).unwrap());
}

// =============================================================
// selection
// =============================================================

#[test]
fn select_replaces_and_toggle_flips() {
    let mut store = ComponentStore::new();
    let ids = three(&mut store);
    store.select(&ids[0]).unwrap();
    store.select(&ids[1]).unwrap();
    assert_eq!(store.selection(), &HashSet::from([ids[1]]));
    store.toggle_select(&ids[2]).unwrap();
    assert_eq!(store.selection().len(), 2);
    store.toggle_select(&ids[1]).unwrap();
    assert_eq!(store.selection(), &HashSet::from([ids[2]]));
}

#[test]
fn select_multiple_skips_unknown_ids() {
    let mut store = ComponentStore::new();
    let ids = three(&mut store);
    let missing = Uuid::new_v4();
    store.select_multiple(&[ids[0], missing, ids[2]]);
    assert_eq!(store.selection(), &HashSet::from([ids[0], ids[2]]));
    assert!(store.clear_selection());
    assert!(store.selection().is_empty());
}

#[test]
fn selected_bounds_single_and_multi() {
    let mut store = ComponentStore::new();
    let a = store.create(spec_at(0.0, 0.0, 10.0, 10.0)).id;
    let b = store.create(spec_at(50.0, 20.0, 10.0, 10.0)).id;
    assert!(store.selected_bounds().is_none());
    store.select(&a).unwrap();
    assert_eq!(store.selected_bounds(), Some(Bounds::new(0.0, 0.0, 10.0, 10.0)));
    store.toggle_select(&b).unwrap();
    assert_eq!(store.selected_bounds(), Some(Bounds::new(0.0, 0.0, 60.0, 30.0)));
}

// =============================================================
// notifications
// =============================================================

#[test]
fn subscribers_see_one_event_per_mutation() {
    let mut store = ComponentStore::new();
    let events = record_events(&mut store);
    let id = store.create(ComponentSpec::default()).id;
    store.update_position(&id, Point::new(3.0, 4.0)).unwrap();
    store.rename(&id, "Header").unwrap();
    store.select(&id).unwrap();

    let seen = events.borrow();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0], StoreEvent::Created { id });
    assert!(matches!(seen[1], StoreEvent::Moved { .. }));
    assert_eq!(seen[2], StoreEvent::Renamed { id, name: "Header".to_owned() });
    assert_eq!(seen[3], StoreEvent::SelectionChanged);
}

#[test]
fn no_op_updates_emit_nothing() {
    let mut store = ComponentStore::new();
    let id = store.create(spec_at(0.0, 0.0, 10.0, 10.0)).id;
    let events = record_events(&mut store);
    assert!(!store.update_position(&id, Point::new(0.0, 0.0)).unwrap());
    assert!(!store.update_size(&id, Size::new(10.0, 10.0)).unwrap());
    assert!(!store.set_parent_hint(&id, None).unwrap());
    assert!(!store.clear_selection());
    assert!(events.borrow().is_empty());
}

#[test]
fn unsubscribe_stops_delivery() {
    let mut store = ComponentStore::new();
    let events = Rc::new(RefCell::new(0_usize));
    let sink = Rc::clone(&events);
    let sub = store.subscribe(move |_| *sink.borrow_mut() += 1);
    store.create(ComponentSpec::default());
    assert!(store.unsubscribe(sub));
    store.create(ComponentSpec::default());
    assert_eq!(*events.borrow(), 1);
    assert!(!store.unsubscribe(sub));
}
