#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn anchor(x: f64, y: f64, width: f64, height: f64, scale: f64) -> Anchor {
    Anchor {
        id: "a1".into(),
        name: "Zone".into(),
        position: Point::new(x, y),
        size: Size::new(width, height),
        scale,
    }
}

#[test]
fn composite_scale_multiplies_fit_and_anchor_zoom() {
    let image = ImageFrame::new(1280, 720);
    // fit = min(2560/1280, 2160/720) = min(2, 3) = 2; zoom 0.5
    assert!(approx_eq(composite_scale(&anchor(0.0, 0.0, 2560.0, 2160.0, 0.5), image), 1.0));
    // fit = min(640/1280, 720/720) = 0.5; zoom 3
    assert!(approx_eq(composite_scale(&anchor(0.0, 0.0, 640.0, 720.0, 3.0), image), 1.5));
}

#[test]
fn composite_scale_without_anchor_bounds_is_anchor_zoom() {
    let image = ImageFrame::new(1280, 720);
    assert_eq!(composite_scale(&anchor(0.0, 0.0, 0.0, 500.0, 2.5), image), 2.5);
    assert_eq!(composite_scale(&anchor(0.0, 0.0, 500.0, -1.0, 0.75), image), 0.75);
}

#[test]
fn composite_scale_with_unusable_frame_is_anchor_zoom() {
    assert_eq!(composite_scale(&anchor(0.0, 0.0, 100.0, 100.0, 2.0), ImageFrame::new(0, 720)), 2.0);
}

#[test]
fn projects_location_and_size_from_anchor_origin() {
    // fit = min(1280/1280, 1440/720) = 1; zoom 2 -> final 2
    let projector = AnchorProjector::new(&anchor(1000.0, -500.0, 1280.0, 1440.0, 2.0), ImageFrame::new(1280, 720));
    assert!(approx_eq(projector.final_scale(), 2.0));

    let p = projector.project_point(Point::new(110.0, 120.0));
    assert!(approx_eq(p.x, 1220.0));
    assert!(approx_eq(p.y, -260.0));

    let s = projector.project_size(Size::new(100.0, 50.0));
    assert!(approx_eq(s.width, 200.0));
    assert!(approx_eq(s.height, 100.0));
}

#[test]
fn projected_note_has_unit_scale_and_keeps_content() {
    let projector = AnchorProjector::new(&anchor(10.0, 20.0, 640.0, 360.0, 4.0), ImageFrame::new(1280, 720));
    let note = NotePayload::new("Ship it", "#FF5722", Point::new(2.0, 4.0), Size::new(8.0, 16.0)).with_scale(0.37);

    let projected = projector.project_note(&note);
    assert_eq!(projected.scale, 1.0);
    assert_eq!(projected.text, "Ship it");
    assert_eq!(projected.background_color, "#FF5722");
    assert_eq!(projected.widget_type, "Note");
    // final scale = 0.5 * 4 = 2
    assert!(approx_eq(projected.location.x, 14.0));
    assert!(approx_eq(projected.location.y, 28.0));
    assert!(approx_eq(projected.size.width, 16.0));
    assert!(approx_eq(projected.size.height, 32.0));
}
