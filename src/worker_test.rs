use uuid::Uuid;

use super::*;
use crate::geometry::{Bounds, Handle, Point, Size};
use crate::transform::{Subject, TransformKind};

fn resize_request(gesture: u64) -> TransformRequest {
    let b = Bounds::new(10.0, 10.0, 60.0, 40.0);
    TransformRequest {
        gesture,
        kind: TransformKind::Resize { handle: Handle::BottomRight, from_center: false },
        subjects: vec![Subject { id: Uuid::new_v4(), start: b, current: b }],
        start_pointer: Point::new(60.0, 40.0),
        pointer: Point::new(80.0, 70.0),
        canvas: Size::new(400.0, 300.0),
        snap_threshold: 4.0,
    }
}

#[tokio::test]
async fn worker_answer_matches_inline_computation() {
    let worker = GeometryWorker::spawn();
    let request = resize_request(1);
    let inline = compute(&request);
    let answer = worker.transform(request).await.unwrap();
    assert_eq!(answer, inline);
    assert_eq!(answer.updates[0].bounds, Bounds::new(10.0, 10.0, 80.0, 70.0));
}

#[tokio::test]
async fn try_submit_answers_on_receiver() {
    let worker = GeometryWorker::spawn();
    let rx = worker.try_submit(resize_request(5)).unwrap();
    let answer = rx.await.unwrap();
    assert_eq!(answer.gesture, 5);
}

#[tokio::test]
async fn full_queue_is_reported() {
    // The single-threaded test runtime does not run the worker until we yield.
    let worker = GeometryWorker::spawn_with_capacity(1);
    let first = worker.try_submit(resize_request(1)).unwrap();
    assert_eq!(worker.try_submit(resize_request(2)).unwrap_err(), WorkerError::Full);
    assert_eq!(first.await.unwrap().gesture, 1);
}

#[tokio::test]
async fn clones_share_one_task() {
    let worker = GeometryWorker::spawn();
    let other = worker.clone();
    let (a, b) = tokio::join!(worker.transform(resize_request(1)), other.transform(resize_request(2)));
    assert_eq!(a.unwrap().gesture, 1);
    assert_eq!(b.unwrap().gesture, 2);
}
