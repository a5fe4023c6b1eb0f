#![allow(clippy::float_cmp)]

use super::*;

fn detection(text: &str, x: i64, y: i64, width: i64, height: i64) -> Detection {
    Detection {
        text: text.into(),
        color: "#FFEB3B".into(),
        location: PixelPoint { x, y },
        size: PixelSize { width, height },
        scale: 1.0,
    }
}

#[test]
fn maps_reference_scenario() {
    let notes = [detection("a", 0, 0, 200, 200)];
    let mapping = map_to_zone(&notes, ImageFrame::new(1280, 720), Zone::new(640, 480, 100, 50));

    assert_eq!(mapping.scale(), Some(0.5));
    let mapped = &mapping.notes()[0];
    assert_eq!(mapped.location, PixelPoint { x: 110, y: 120 });
    assert_eq!(mapped.size, PixelSize { width: 100, height: 100 });
    assert_eq!(mapped.text, "a");
    assert_eq!(mapped.color, "#FFEB3B");
}

#[test]
fn scale_is_min_of_axis_ratios() {
    let notes = [detection("a", 0, 0, 10, 10)];
    // Width-limited: 300/600 = 0.5 < 400/400 = 1.0
    let wide = map_to_zone(&notes, ImageFrame::new(600, 400), Zone::new(300, 400, 0, 0));
    assert_eq!(wide.scale(), Some(0.5));
    // Height-limited: 200/400 = 0.5 < 900/600 = 1.5
    let tall = map_to_zone(&notes, ImageFrame::new(600, 400), Zone::new(900, 200, 0, 0));
    assert_eq!(tall.scale(), Some(0.5));
}

#[test]
fn letterbox_centers_horizontal_slack() {
    // Height-limited: scale 0.5, scaled image 300 wide in a 500 wide zone.
    let notes = [detection("a", 0, 0, 10, 10)];
    let mapping = map_to_zone(&notes, ImageFrame::new(600, 400), Zone::new(500, 200, 0, 0));
    assert_eq!(mapping.notes()[0].location, PixelPoint { x: 100 + ZONE_MARGIN, y: ZONE_MARGIN });
}

#[test]
fn fractional_results_are_floored() {
    // scale 0.5: 3 * 0.5 = 1.5 -> 1, 7 * 0.5 = 3.5 -> 3
    let notes = [detection("a", 3, 3, 7, 7)];
    let mapping = map_to_zone(&notes, ImageFrame::new(100, 100), Zone::new(50, 50, 0, 0));
    let mapped = &mapping.notes()[0];
    assert_eq!(mapped.location, PixelPoint { x: 1 + ZONE_MARGIN, y: 1 + ZONE_MARGIN });
    assert_eq!(mapped.size, PixelSize { width: 3, height: 3 });
}

#[test]
fn negative_fractions_floor_toward_negative_infinity() {
    let notes = [detection("a", -3, 0, 1, 1)];
    let mapping = map_to_zone(&notes, ImageFrame::new(100, 100), Zone::new(50, 50, 0, 0));
    // -3 * 0.5 = -1.5 -> -2
    assert_eq!(mapping.notes()[0].location.x, -2 + ZONE_MARGIN);
}

#[test]
fn degenerate_geometry_is_identity() {
    let notes = vec![detection("a", 5, 6, 7, 8), detection("b", 9, 10, 11, 12)];
    let cases = [
        (ImageFrame::new(0, 720), Zone::new(640, 480, 1, 1)),
        (ImageFrame::new(1280, 0), Zone::new(640, 480, 1, 1)),
        (ImageFrame::new(1280, 720), Zone::new(0, 480, 1, 1)),
        (ImageFrame::new(1280, 720), Zone::new(640, 0, 1, 1)),
        (ImageFrame::new(-1280, 720), Zone::new(640, 480, 1, 1)),
        (ImageFrame::new(1280, 720), Zone::new(640, -480, 1, 1)),
    ];
    for (image, zone) in cases {
        let mapping = map_to_zone(&notes, image, zone);
        assert!(!mapping.is_mapped());
        assert_eq!(mapping.scale(), None);
        assert_eq!(mapping.into_notes(), notes);
    }
}

#[test]
fn output_preserves_input_order() {
    let notes = vec![detection("A", 0, 0, 10, 10), detection("B", 500, 100, 10, 10), detection("C", 20, 600, 10, 10)];
    let mapping = map_to_zone(&notes, ImageFrame::new(1280, 720), Zone::new(640, 480, 0, 0));
    let texts: Vec<&str> = mapping.notes().iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, ["A", "B", "C"]);
}

#[test]
fn mapped_notes_stay_inside_zone() {
    let frames = [(1280, 720), (720, 1280), (1000, 1000), (333, 77)];
    let zones = [(640, 480), (480, 640), (1920, 1080), (50, 900)];
    for (iw, ih) in frames {
        for (zw, zh) in zones {
            let image = ImageFrame::new(iw, ih);
            let zone = Zone::new(zw, zh, 40, -25);
            // Notes hugging each image corner plus one full-frame note.
            let notes = [
                detection("tl", 0, 0, iw / 4, ih / 4),
                detection("br", iw - iw / 4, ih - ih / 4, iw / 4, ih / 4),
                detection("full", 0, 0, iw, ih),
            ];
            let mapping = map_to_zone(&notes, image, zone);
            let scale = mapping.scale().unwrap();
            #[allow(clippy::cast_precision_loss)]
            let expected = (zw as f64 / iw as f64).min(zh as f64 / ih as f64);
            assert_eq!(scale, expected);

            let left = zone.location.x + ZONE_MARGIN;
            let top = zone.location.y + ZONE_MARGIN;
            for note in mapping.notes() {
                assert!(note.location.x >= left, "{iw}x{ih} -> {zw}x{zh}: {note:?}");
                assert!(note.location.y >= top, "{iw}x{ih} -> {zw}x{zh}: {note:?}");
                assert!(note.location.x - left + note.size.width <= zw, "{iw}x{ih} -> {zw}x{zh}: {note:?}");
                assert!(note.location.y - top + note.size.height <= zh, "{iw}x{ih} -> {zw}x{zh}: {note:?}");
            }
        }
    }
}

#[test]
fn detection_reads_vision_wire_format() {
    let json = serde_json::json!({
        "background_color": "#00FF00",
        "location": { "x": 12, "y": 34 },
        "size": { "width": 56, "height": 78 },
        "scale": 1.5,
        "state": "normal",
        "text": "Green",
        "widget_type": "Note"
    });
    let detection: Detection = serde_json::from_value(json).unwrap();
    assert_eq!(detection.color, "#00FF00");
    assert_eq!(detection.location, PixelPoint { x: 12, y: 34 });
    assert_eq!(detection.scale, 1.5);
}

#[test]
fn extreme_zone_origin_saturates() {
    let notes = [detection("a", 0, 0, 10, 10)];
    let mapping = map_to_zone(&notes, ImageFrame::new(100, 100), Zone::new(50, 50, i64::MAX - 5, i64::MIN));
    let mapped = &mapping.notes()[0];
    assert_eq!(mapped.location, PixelPoint { x: i64::MAX, y: i64::MIN + ZONE_MARGIN });
    assert_eq!(mapped.size, PixelSize { width: 5, height: 5 });
}
