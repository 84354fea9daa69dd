use paramscope_core::annotation::{Annotation, AnnotationKind, AnnotationStore};
use paramscope_core::error::ParamscopeError;
use paramscope_core::geometry::{Point, Size};
use paramscope_core::transform::ViewTransform;

#[test]
fn rectangle_commit_normalizes_and_appends() {
    let mut store = AnnotationStore::new();
    store
        .begin_preview(AnnotationKind::Rectangle, Point::new(100.0, 80.0))
        .unwrap();
    // Drag up and to the left; the committed rect must still be normalized.
    store.update_preview(Point::new(10.0, 10.0));
    let index = store.commit_preview().unwrap();

    assert_eq!(index, 0);
    assert_eq!(
        store.committed()[0],
        Annotation::Rectangle {
            x: 10.0,
            y: 10.0,
            width: 90.0,
            height: 70.0,
        }
    );
    assert!(store.preview().is_none());
}

#[test]
fn second_begin_fails_with_already_drawing() {
    let mut store = AnnotationStore::new();
    store
        .begin_preview(AnnotationKind::Rectangle, Point::ZERO)
        .unwrap();
    let err = store
        .begin_preview(AnnotationKind::Line, Point::ZERO)
        .unwrap_err();
    assert!(matches!(err, ParamscopeError::AlreadyDrawing));
}

#[test]
fn tiny_rectangle_is_discarded_not_committed() {
    let mut store = AnnotationStore::new();
    store
        .begin_preview(AnnotationKind::Rectangle, Point::new(50.0, 50.0))
        .unwrap();
    store.update_preview(Point::new(50.4, 50.4));

    assert!(store.commit_preview().is_none());
    assert!(store.is_empty());
    assert!(store.preview().is_none());
}

#[test]
fn short_line_is_discarded() {
    let mut store = AnnotationStore::new();
    store
        .begin_preview(AnnotationKind::Line, Point::new(10.0, 10.0))
        .unwrap();
    store.update_preview(Point::new(12.0, 12.0));
    assert!(store.commit_preview().is_none());

    store
        .begin_preview(AnnotationKind::Line, Point::new(10.0, 10.0))
        .unwrap();
    store.update_preview(Point::new(40.0, 10.0));
    assert!(store.commit_preview().is_some());
}

#[test]
fn polygon_needs_three_vertices() {
    let mut store = AnnotationStore::new();
    store
        .begin_preview(AnnotationKind::Polygon, Point::new(0.0, 0.0))
        .unwrap();
    store.add_vertex(Point::new(30.0, 0.0));
    assert!(store.commit_preview().is_none());

    store
        .begin_preview(AnnotationKind::Polygon, Point::new(0.0, 0.0))
        .unwrap();
    store.add_vertex(Point::new(30.0, 0.0));
    store.add_vertex(Point::new(30.0, 30.0));
    let index = store.commit_preview().unwrap();
    assert!(matches!(
        &store.committed()[index],
        Annotation::Polygon { vertices, closed: true } if vertices.len() == 3
    ));
}

#[test]
fn undo_on_empty_store_is_a_noop() {
    let mut store = AnnotationStore::new();
    assert!(store.undo_last().is_none());
    assert!(store.is_empty());
}

#[test]
fn undo_removes_most_recent_first() {
    let mut store = AnnotationStore::new();
    for i in 0..3 {
        store
            .begin_preview(AnnotationKind::Rectangle, Point::new(0.0, 0.0))
            .unwrap();
        store.update_preview(Point::new(10.0 + i as f32, 10.0));
        store.commit_preview().unwrap();
    }

    let popped = store.undo_last().unwrap();
    assert!(matches!(popped, Annotation::Rectangle { width, .. } if width == 12.0));
    assert_eq!(store.len(), 2);
}

#[test]
fn clear_leaves_the_preview_untouched() {
    let mut store = AnnotationStore::new();
    store
        .begin_preview(AnnotationKind::Rectangle, Point::ZERO)
        .unwrap();
    store.update_preview(Point::new(20.0, 20.0));
    store.commit_preview().unwrap();

    store
        .begin_preview(AnnotationKind::Polygon, Point::new(5.0, 5.0))
        .unwrap();
    store.clear();

    assert!(store.is_empty());
    assert!(store.preview().is_some());
}

#[test]
fn cancel_discards_without_committing() {
    let mut store = AnnotationStore::new();
    store
        .begin_preview(AnnotationKind::Rectangle, Point::ZERO)
        .unwrap();
    store.update_preview(Point::new(50.0, 50.0));

    assert!(store.cancel_preview());
    assert!(store.is_empty());
    assert!(!store.cancel_preview());
}

#[test]
fn stored_coordinates_survive_zoom_and_pan() {
    let mut store = AnnotationStore::new();
    store
        .begin_preview(AnnotationKind::Rectangle, Point::new(10.0, 10.0))
        .unwrap();
    store.update_preview(Point::new(100.0, 80.0));
    store.commit_preview().unwrap();
    let before = store.committed()[0].clone();

    // Zoom and pan only change the projection, never the stored coords.
    let mut transform =
        ViewTransform::new(Size::new(800.0, 600.0), Size::new(800.0, 600.0)).unwrap();
    transform.apply_zoom(2.0, Point::new(400.0, 300.0));
    transform.apply_pan(50.0, 0.0);

    assert_eq!(store.committed()[0], before);
    assert_eq!(
        before,
        Annotation::Rectangle {
            x: 10.0,
            y: 10.0,
            width: 90.0,
            height: 70.0,
        }
    );
}
