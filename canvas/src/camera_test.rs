#![allow(clippy::float_cmp, clippy::unwrap_used)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn relative_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

// --- Transform defaults ---

#[test]
fn transform_default_is_identity() {
    let t = Transform::default();
    assert_eq!(t, Transform::IDENTITY);
    assert_eq!(t.scale, 1.0);
}

#[test]
fn validate_rejects_zero_scale() {
    let t = Transform::new(0.0, 0.0, 0.0);
    assert_eq!(t.validate(), Err(TransformError::Degenerate { scale: 0.0 }));
}

#[test]
fn validate_rejects_negative_scale() {
    let t = Transform::new(0.0, 0.0, -2.0);
    assert!(matches!(t.validate(), Err(TransformError::Degenerate { .. })));
}

#[test]
fn validate_rejects_nan_translation() {
    let t = Transform::new(f64::NAN, 0.0, 1.0);
    assert_eq!(t.validate(), Err(TransformError::NonFinite));
}

#[test]
fn validate_rejects_infinite_scale() {
    let t = Transform::new(0.0, 0.0, f64::INFINITY);
    assert_eq!(t.validate(), Err(TransformError::NonFinite));
}

// --- to_canvas ---

#[test]
fn to_canvas_identity() {
    let canvas = Transform::default().to_canvas(Point::new(50.0, 75.0)).unwrap();
    assert!(point_approx_eq(canvas, Point::new(50.0, 75.0)));
}

#[test]
fn to_canvas_worked_example() {
    let t = Transform::new(50.0, 20.0, 2.0);
    let canvas = t.to_canvas(Point::new(150.0, 120.0)).unwrap();
    assert!(point_approx_eq(canvas, Point::new(50.0, 50.0)));
}

#[test]
fn to_canvas_with_pan_only() {
    let t = Transform::new(100.0, 50.0, 1.0);
    let canvas = t.to_canvas(Point::new(100.0, 50.0)).unwrap();
    assert!(point_approx_eq(canvas, Point::new(0.0, 0.0)));
}

#[test]
fn to_canvas_origin_with_pan_and_zoom() {
    let t = Transform::new(50.0, 30.0, 2.0);
    let canvas = t.to_canvas(Point::new(0.0, 0.0)).unwrap();
    assert!(approx_eq(canvas.x, -25.0));
    assert!(approx_eq(canvas.y, -15.0));
}

#[test]
fn to_canvas_rejects_degenerate_scale() {
    let t = Transform::new(10.0, 10.0, 0.0);
    assert!(t.to_canvas(Point::new(1.0, 1.0)).is_err());
}

#[test]
fn to_canvas_rejects_non_finite_point() {
    let t = Transform::default();
    assert_eq!(t.to_canvas(Point::new(f64::NAN, 0.0)), Err(TransformError::NonFinite));
}

#[test]
fn to_canvas_tiny_positive_scale_is_identity() {
    let t = Transform::new(10.0, 10.0, f64::MIN_POSITIVE);
    let p = Point::new(3.0, 4.0);
    assert_eq!(t.to_canvas(p).unwrap(), p);
    assert_eq!(t.to_screen(p).unwrap(), p);
}

// --- to_screen ---

#[test]
fn to_screen_with_pan_and_zoom() {
    let t = Transform::new(20.0, 10.0, 3.0);
    let screen = t.to_screen(Point::new(5.0, 5.0)).unwrap();
    // 5*3 + 20 = 35, 5*3 + 10 = 25
    assert!(approx_eq(screen.x, 35.0));
    assert!(approx_eq(screen.y, 25.0));
}

#[test]
fn to_screen_rejects_negative_scale() {
    let t = Transform::new(0.0, 0.0, -1.0);
    assert!(t.to_screen(Point::new(1.0, 1.0)).is_err());
}

// --- Round trips ---

#[test]
fn round_trip_fractional_zoom() {
    let t = Transform::new(13.7, -42.3, 0.75);
    let canvas = Point::new(333.3, -999.9);
    let back = t.to_canvas(t.to_screen(canvas).unwrap()).unwrap();
    assert!(point_approx_eq(canvas, back));
}

#[test]
fn round_trip_screen_first_over_scale_range() {
    let points = [
        Point::new(0.0, 0.0),
        Point::new(400.0, 300.0),
        Point::new(-1234.5, 987.25),
        Point::new(1e6, -1e6),
    ];
    let transforms = [
        Transform::new(10.0, 20.0, 1.5),
        Transform::new(-500.0, 250.0, 0.01),
        Transform::new(3.3, 7.7, 50.0),
        Transform::new(0.0, 0.0, 0.1),
        Transform::new(1e4, -1e4, 17.0),
    ];
    for t in transforms {
        for p in points {
            let back = t.to_screen(t.to_canvas(p).unwrap()).unwrap();
            assert!(relative_eq(back.x, p.x), "x drift for {t:?} {p:?}: {back:?}");
            assert!(relative_eq(back.y, p.y), "y drift for {t:?} {p:?}: {back:?}");
        }
    }
}

// --- screen_dist_to_canvas ---

#[test]
fn screen_dist_to_canvas_ignores_pan() {
    let t = Transform::new(999.0, -999.0, 4.0);
    assert!(approx_eq(t.screen_dist_to_canvas(8.0).unwrap(), 2.0));
}

// --- pan / zoom ---

#[test]
fn pan_by_offsets_translation_only() {
    let t = Transform::new(1.0, 2.0, 3.0).pan_by(10.0, -5.0);
    assert_eq!(t, Transform::new(11.0, -3.0, 3.0));
}

#[test]
fn zoom_at_keeps_anchor_fixed() {
    let t = Transform::new(40.0, -10.0, 1.5);
    let anchor = Point::new(300.0, 200.0);
    let before = t.to_canvas(anchor).unwrap();
    let zoomed = t.zoom_at(anchor, 2.0).unwrap();
    let after = zoomed.to_canvas(anchor).unwrap();
    assert!(approx_eq(zoomed.scale, 3.0));
    assert!(point_approx_eq(before, after));
}

#[test]
fn zoom_at_clamps_to_max_scale() {
    let t = Transform::new(0.0, 0.0, 40.0);
    let zoomed = t.zoom_at(Point::new(0.0, 0.0), 10.0).unwrap();
    assert_eq!(zoomed.scale, MAX_SCALE);
}

#[test]
fn zoom_at_clamps_to_min_scale() {
    let t = Transform::new(0.0, 0.0, 0.1);
    let zoomed = t.zoom_at(Point::new(0.0, 0.0), 0.001).unwrap();
    assert_eq!(zoomed.scale, MIN_SCALE);
}

#[test]
fn zoom_at_rejects_non_positive_factor() {
    let t = Transform::default();
    assert!(t.zoom_at(Point::new(0.0, 0.0), 0.0).is_err());
    assert!(t.zoom_at(Point::new(0.0, 0.0), f64::NAN).is_err());
}

// --- fit ---

#[test]
fn fit_centres_canvas_in_viewport() {
    let t = Transform::fit(Viewport::new(1000.0, 800.0), CanvasSize::new(400.0, 600.0), 0.0);
    // limited by height: 800 / 600
    assert!(approx_eq(t.scale, 800.0 / 600.0));
    assert!(approx_eq(t.y, 0.0));
    assert!(approx_eq(t.x, (1000.0 - 400.0 * t.scale) * 0.5));
}

#[test]
fn fit_zero_sized_viewport_is_identity() {
    let t = Transform::fit(Viewport::new(0.0, 600.0), CanvasSize::new(400.0, 600.0), 10.0);
    assert_eq!(t, Transform::IDENTITY);
}

#[test]
fn fit_zero_sized_canvas_is_identity() {
    let t = Transform::fit(Viewport::new(800.0, 600.0), CanvasSize::new(0.0, 0.0), 10.0);
    assert_eq!(t, Transform::IDENTITY);
}

// --- snapping / comparison ---

#[test]
fn snapped_rounds_to_device_pixels() {
    let t = Transform::new(10.26, 3.74, 1.3).snapped(2.0);
    assert!(approx_eq(t.x, 10.5));
    assert!(approx_eq(t.y, 3.5));
    assert!(approx_eq(t.scale, 1.3));
}

#[test]
fn snapped_with_invalid_dpr_uses_css_pixels() {
    let t = Transform::new(10.4, 3.6, 1.0).snapped(0.0);
    assert!(approx_eq(t.x, 10.0));
    assert!(approx_eq(t.y, 4.0));
}

#[test]
fn approx_eq_respects_tolerance() {
    let a = Transform::new(1.0, 1.0, 1.0);
    let b = Transform::new(1.0 + 1e-9, 1.0, 1.0);
    assert!(a.approx_eq(&b, 1e-6));
    assert!(!a.approx_eq(&Transform::new(1.1, 1.0, 1.0), 1e-6));
}

// --- Rect / Viewport ---

#[test]
fn rect_center() {
    let r = Rect::new(10.0, 20.0, 100.0, 50.0);
    assert_eq!(r.center(), Point::new(60.0, 45.0));
    assert_eq!(r.origin(), Point::new(10.0, 20.0));
}

#[test]
fn viewport_empty_detection() {
    assert!(Viewport::new(0.0, 10.0).is_empty());
    assert!(Viewport::default().is_empty());
    assert!(!Viewport::new(1.0, 1.0).is_empty());
}
