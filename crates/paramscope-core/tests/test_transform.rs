use approx::assert_relative_eq;

use paramscope_core::geometry::{Point, Size};
use paramscope_core::transform::{ViewTransform, ZOOM_MAX, ZOOM_MIN};

fn transform(image_w: f32, image_h: f32, view_w: f32, view_h: f32) -> ViewTransform {
    ViewTransform::new(Size::new(image_w, image_h), Size::new(view_w, view_h)).unwrap()
}

#[test]
fn rejects_zero_or_negative_image() {
    assert!(ViewTransform::new(Size::new(0.0, 100.0), Size::new(100.0, 100.0)).is_err());
    assert!(ViewTransform::new(Size::new(100.0, -5.0), Size::new(100.0, 100.0)).is_err());
}

#[test]
fn round_trips_screen_and_image_coordinates() {
    let mut t = transform(1600.0, 1200.0, 800.0, 600.0);
    t.apply_zoom(2.0, Point::new(400.0, 300.0));
    t.apply_pan(-50.0, 30.0);

    for &(x, y) in &[(0.0, 0.0), (123.0, 456.0), (799.0, 599.0)] {
        let p = Point::new(x, y);
        let back = t.image_to_screen(t.screen_to_image(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-3);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-3);
    }
}

#[test]
fn zoom_is_anchored_at_the_pointer() {
    let mut t = transform(1600.0, 1200.0, 800.0, 600.0);
    let pivot = Point::new(250.0, 175.0);
    let before = t.screen_to_image(pivot);

    t.apply_zoom(1.1, pivot);
    let after = t.screen_to_image(pivot);

    assert_relative_eq!(before.x, after.x, epsilon = 1e-3);
    assert_relative_eq!(before.y, after.y, epsilon = 1e-3);
}

#[test]
fn three_zoom_steps_at_fixed_pointer() {
    // 800x600 image, zoom in x1.1 three times at pointer (400, 300).
    let mut t = transform(800.0, 600.0, 800.0, 600.0);
    let pivot = Point::new(400.0, 300.0);
    let anchor = t.screen_to_image(pivot);

    for _ in 0..3 {
        t.apply_zoom(1.1, pivot);
    }

    assert_relative_eq!(t.zoom(), 1.331, epsilon = 1e-3);
    let after = t.screen_to_image(pivot);
    assert_relative_eq!(after.x, anchor.x, epsilon = 1e-2);
    assert_relative_eq!(after.y, anchor.y, epsilon = 1e-2);
}

#[test]
fn zoom_is_clamped_to_limits() {
    let mut t = transform(800.0, 600.0, 800.0, 600.0);
    for _ in 0..100 {
        t.apply_zoom(2.0, Point::ZERO);
    }
    assert_relative_eq!(t.zoom(), ZOOM_MAX);

    for _ in 0..100 {
        t.apply_zoom(0.5, Point::ZERO);
    }
    assert_relative_eq!(t.zoom(), ZOOM_MIN);
}

#[test]
fn visible_rect_stays_inside_the_image() {
    let mut t = transform(800.0, 600.0, 400.0, 300.0);
    t.apply_zoom(3.0, Point::new(200.0, 150.0));

    // Try to pan far outside in every direction.
    for &(dx, dy) in &[(1e5, 0.0), (-1e5, 0.0), (0.0, 1e5), (0.0, -1e5)] {
        t.apply_pan(dx, dy);
        let visible = t.visible_rect();
        assert!(visible.min.x >= -1e-3);
        assert!(visible.min.y >= -1e-3);
        assert!(visible.max.x <= 800.0 + 1e-3);
        assert!(visible.max.y <= 600.0 + 1e-3);
    }
}

#[test]
fn small_image_is_centered() {
    let t = transform(100.0, 80.0, 400.0, 300.0);
    // Span 400x300 at zoom 1 is larger than the raster on both axes.
    assert_relative_eq!(t.pan_offset().x, (100.0 - 400.0) / 2.0);
    assert_relative_eq!(t.pan_offset().y, (80.0 - 300.0) / 2.0);

    let visible = t.visible_rect();
    assert_relative_eq!(visible.min.x, 0.0);
    assert_relative_eq!(visible.max.x, 100.0);
}

#[test]
fn reset_restores_default_view() {
    let mut t = transform(1600.0, 1200.0, 800.0, 600.0);
    t.apply_zoom(4.0, Point::new(100.0, 100.0));
    t.apply_pan(-200.0, -150.0);

    t.reset();

    assert_relative_eq!(t.zoom(), 1.0);
    assert_relative_eq!(t.pan_offset().x, 0.0);
    assert_relative_eq!(t.pan_offset().y, 0.0);
}

#[test]
fn image_size_change_resets_the_view() {
    let mut t = transform(1600.0, 1200.0, 800.0, 600.0);
    t.apply_zoom(2.0, Point::new(400.0, 300.0));
    assert!(t.zoom() > 1.0);

    t.set_image_size(Size::new(3200.0, 2400.0)).unwrap();
    assert_relative_eq!(t.zoom(), 1.0);
    assert_relative_eq!(t.pan_offset().x, 0.0);

    // Same size again must not disturb the view.
    t.apply_zoom(2.0, Point::new(0.0, 0.0));
    t.set_image_size(Size::new(3200.0, 2400.0)).unwrap();
    assert!(t.zoom() > 1.0);
}

#[test]
fn pan_moves_against_drag_direction_in_image_space() {
    let mut t = transform(1600.0, 1200.0, 800.0, 600.0);
    t.apply_zoom(2.0, Point::new(400.0, 300.0));
    let before = t.pan_offset();

    // Dragging content right by 100 screen px shifts the window left by
    // 100 / zoom image px.
    t.apply_pan(100.0, 0.0);
    assert_relative_eq!(t.pan_offset().x, before.x - 100.0 / t.zoom(), epsilon = 1e-3);
}
