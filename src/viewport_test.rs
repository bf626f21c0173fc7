#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn rect(left: f64, top: f64) -> ClientRect {
    ClientRect { left, top, width: 800.0, height: 600.0 }
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn default_zoom_is_one() {
    let vp = Viewport::new();
    assert_eq!(vp.zoom(), 1.0);
}

#[test]
fn default_pivot_is_center() {
    assert_eq!(Viewport::new().pivot(), Pivot::Center);
}

// =============================================================
// set_zoom clamping
// =============================================================

#[test]
fn set_zoom_clamps_above_max() {
    let mut vp = Viewport::new();
    vp.set_zoom(10.0, None);
    assert_eq!(vp.zoom(), 5.0);
}

#[test]
fn set_zoom_clamps_below_min() {
    let mut vp = Viewport::new();
    vp.set_zoom(0.01, None);
    assert_eq!(vp.zoom(), 0.2);
}

#[test]
fn set_zoom_within_range_is_stored_exactly() {
    let mut vp = Viewport::new();
    for z in [0.2, 0.5, 1.0, 2.75, 5.0] {
        vp.set_zoom(z, None);
        assert_eq!(vp.zoom(), z);
    }
}

#[test]
fn set_zoom_ignores_non_finite_target() {
    let mut vp = Viewport::new();
    vp.set_zoom(2.0, None);
    vp.set_zoom(f64::NAN, None);
    assert_eq!(vp.zoom(), 2.0);
    vp.set_zoom(f64::INFINITY, None);
    assert_eq!(vp.zoom(), 2.0);
}

#[test]
fn set_zoom_stores_explicit_pivot() {
    let mut vp = Viewport::new();
    let t = vp.set_zoom(2.0, Some(Point::new(30.0, 40.0)));
    assert_eq!(t.pivot, Pivot::At(Point::new(30.0, 40.0)));
    assert_eq!(vp.pivot(), Pivot::At(Point::new(30.0, 40.0)));
}

#[test]
fn set_zoom_without_pivot_resets_to_center() {
    let mut vp = Viewport::new();
    vp.set_zoom(2.0, Some(Point::new(30.0, 40.0)));
    vp.set(1.5);
    assert_eq!(vp.pivot(), Pivot::Center);
}

// =============================================================
// Step zoom
// =============================================================

#[test]
fn zoom_in_compounds() {
    let mut vp = Viewport::new();
    vp.zoom_in();
    assert!(approx_eq(vp.zoom(), 1.10));
    vp.zoom_in();
    assert!(approx_eq(vp.zoom(), 1.21));
}

#[test]
fn zoom_out_compounds() {
    let mut vp = Viewport::new();
    vp.zoom_out();
    assert!(approx_eq(vp.zoom(), 0.9));
    vp.zoom_out();
    assert!(approx_eq(vp.zoom(), 0.81));
}

#[test]
fn zoom_in_saturates_at_max() {
    let mut vp = Viewport::new();
    for _ in 0..100 {
        vp.zoom_in();
    }
    assert_eq!(vp.zoom(), 5.0);
}

#[test]
fn zoom_out_saturates_at_min() {
    let mut vp = Viewport::new();
    for _ in 0..100 {
        vp.zoom_out();
    }
    assert_eq!(vp.zoom(), 0.2);
}

#[test]
fn buttons_anchor_at_center() {
    let mut vp = Viewport::new();
    vp.set_zoom(1.0, Some(Point::new(5.0, 5.0)));
    assert_eq!(vp.zoom_in().pivot, Pivot::Center);
}

// =============================================================
// Wheel
// =============================================================

#[test]
fn wheel_up_zooms_in() {
    let mut vp = Viewport::new();
    vp.on_wheel(-120.0, Point::new(10.0, 10.0), rect(0.0, 0.0));
    assert!(approx_eq(vp.zoom(), 1.1));
}

#[test]
fn wheel_down_zooms_out() {
    let mut vp = Viewport::new();
    vp.on_wheel(120.0, Point::new(10.0, 10.0), rect(0.0, 0.0));
    assert!(approx_eq(vp.zoom(), 0.9));
}

#[test]
fn wheel_zero_delta_zooms_out() {
    let mut vp = Viewport::new();
    vp.on_wheel(0.0, Point::new(10.0, 10.0), rect(0.0, 0.0));
    assert!(approx_eq(vp.zoom(), 0.9));
}

#[test]
fn wheel_pivot_is_container_local() {
    let mut vp = Viewport::new();
    let t = vp.on_wheel(-1.0, Point::new(250.0, 180.0), rect(200.0, 100.0));
    assert_eq!(t.pivot, Pivot::At(Point::new(50.0, 80.0)));
}

// =============================================================
// Slider
// =============================================================

#[test]
fn slider_maps_percent_to_zoom() {
    let mut vp = Viewport::new();
    vp.set_percent(250);
    assert!(approx_eq(vp.zoom(), 2.5));
    assert_eq!(vp.pivot(), Pivot::Center);
}

#[test]
fn slider_clamps_to_domain() {
    let mut vp = Viewport::new();
    vp.set_percent(5);
    assert!(approx_eq(vp.zoom(), 0.2));
    vp.set_percent(9000);
    assert!(approx_eq(vp.zoom(), 5.0));
}

#[test]
fn zoom_slider_domain_attributes() {
    let (min, max, step) = SliderDomain::ZOOM.attributes();
    assert_eq!((min.as_str(), max.as_str(), step.as_str()), ("20", "500", "1"));
}

#[test]
fn slider_ends_match_zoom_limits() {
    let domain = SliderDomain::ZOOM;
    let mut vp = Viewport::new();
    vp.set_percent(domain.min);
    assert!(approx_eq(vp.zoom(), ZOOM_MIN));
    vp.set_percent(domain.max);
    assert!(approx_eq(vp.zoom(), ZOOM_MAX));
    assert_eq!(domain.clamp(-3), domain.min);
}

#[test]
fn reset_returns_to_identity() {
    let mut vp = Viewport::new();
    vp.set_zoom(3.0, Some(Point::new(1.0, 2.0)));
    vp.reset();
    assert_eq!(vp.zoom(), 1.0);
    assert_eq!(vp.pivot(), Pivot::Center);
}

// =============================================================
// ZoomTransform output
// =============================================================

#[test]
fn transform_percent_rounds() {
    let mut vp = Viewport::new();
    let t = vp.zoom_in();
    assert_eq!(t.percent(), 110);
    let t = vp.zoom_in();
    assert_eq!(t.percent(), 121);
    assert_eq!(t.label(), "121%");
}

#[test]
fn transform_css_center_origin() {
    let t = Viewport::new().transform();
    assert_eq!(t.css_origin(), "center center");
    assert_eq!(t.css_transform(), "scale(1)");
}

#[test]
fn transform_css_point_origin() {
    let mut vp = Viewport::new();
    let t = vp.set_zoom(2.0, Some(Point::new(12.5, 40.0)));
    assert_eq!(t.css_origin(), "12.5px 40px");
    assert_eq!(t.css_transform(), "scale(2)");
}

#[test]
fn custom_limits_are_honored() {
    let mut vp = Viewport::with_limits(0.5, 2.0, 0.25);
    vp.set(10.0);
    assert_eq!(vp.zoom(), 2.0);
    vp.set(1.0);
    vp.zoom_in();
    assert!(approx_eq(vp.zoom(), 1.25));
}
