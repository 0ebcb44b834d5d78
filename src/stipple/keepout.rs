//! Keepout shapes around board features
//!
//! Every via, pin, copper line and same-side pad gets a solid clearance shape
//! inflated by the stipple trace. The lattice generator clips these to each
//! island and writes them as forced-solid overlays.

use super::order::LayerSide;
use crate::board::Board;
use crate::geometry::shapes::{capsule_body, circle, rounded_rect, CIRCLE_SEGMENTS, CORNER_SEGMENTS};
use crate::geometry::{Coord, Point, PolygonSet, PolygonWithHoles};
use tracing::debug;

/// Clearance radius of a round feature
fn round_radius(trace: Coord, thickness: Coord, clearance: Coord) -> Coord {
    trace + (thickness + clearance) / 2
}

/// Collect the keepout shapes for one side of the board
///
/// The result is not merged; overlapping keepouts are unioned by the caller.
pub fn build_keepouts(board: &Board, side: LayerSide, trace: Coord) -> PolygonSet {
    let mut keepouts = PolygonSet::new();

    for via in board.vias() {
        let radius = round_radius(trace, via.thickness, via.clearance);
        keepouts.push(circle(Point::new(via.x, via.y), radius, CIRCLE_SEGMENTS).into());
    }

    match board.find_layer_by_name(side.copper_layer()) {
        Some(copper) => {
            let layer = board.layer(copper);
            for line in layer.lines() {
                let radius = round_radius(trace, line.thickness, line.clearance);
                keepouts.push(capsule_body(line.point1, line.point2, radius).into());
                keepouts.push(circle(line.point1, radius, CIRCLE_SEGMENTS).into());
                keepouts.push(circle(line.point2, radius, CIRCLE_SEGMENTS).into());
            }
        }
        None => debug!(
            layer = side.copper_layer(),
            "Copper layer not found, skipping line keepouts"
        ),
    }

    for element in board.elements() {
        if side.matches_element(element.front) {
            for pad in &element.pads {
                let rect = pad
                    .extent()
                    .inflate(trace + pad.thickness / 2 + pad.clearance / 2);
                let corner = trace + pad.clearance / 2;
                keepouts.push(rounded_rect(rect, corner, CORNER_SEGMENTS).into());
            }
        }
        for pin in &element.pins {
            let radius = round_radius(trace, pin.thickness, pin.clearance);
            keepouts.push(circle(Point::new(pin.x, pin.y), radius, CIRCLE_SEGMENTS).into());
        }
    }

    keepouts.retain(|k: &PolygonWithHoles| !k.outline.is_degenerate());
    keepouts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Element, LineRecord, Pad, Pin, Via};

    fn max_radius(shape: &PolygonWithHoles, center: Point) -> f64 {
        shape
            .outline
            .points()
            .iter()
            .map(|p| (((p.x - center.x) as f64).powi(2) + ((p.y - center.y) as f64).powi(2)).sqrt())
            .fold(0.0, f64::max)
    }

    fn element(front: bool) -> Element {
        Element {
            name: if front { "U1" } else { "U2" }.to_string(),
            front,
            pads: vec![Pad {
                point1: Point::new(0, 0),
                point2: Point::new(1000, 0),
                thickness: 400,
                clearance: 200,
            }],
            pins: vec![Pin {
                x: 5000,
                y: 5000,
                thickness: 600,
                clearance: 200,
            }],
        }
    }

    #[test]
    fn test_via_circle_radius() {
        let mut board = Board::new();
        board.add_via(Via {
            x: 100,
            y: 200,
            thickness: 1000,
            clearance: 500,
        });
        let keepouts = build_keepouts(&board, LayerSide::Component, 700);
        assert_eq!(keepouts.len(), 1);
        // 700 + (1000 + 500) / 2
        let r = max_radius(&keepouts[0], Point::new(100, 200));
        assert!((r - 1450.0).abs() <= 1.0);
        assert_eq!(keepouts[0].outline.len(), CIRCLE_SEGMENTS);
    }

    #[test]
    fn test_line_capsule_on_copper_layer() {
        let mut board = Board::new();
        let copper = board.add_layer("solder");
        board.add_line(
            copper,
            LineRecord {
                point1: Point::new(0, 0),
                point2: Point::new(10_000, 0),
                thickness: 1000,
                clearance: 1000,
            },
        );
        assert_eq!(build_keepouts(&board, LayerSide::Solder, 500).len(), 3);
        // The component side reads a different copper layer
        assert!(build_keepouts(&board, LayerSide::Component, 500).is_empty());
    }

    #[test]
    fn test_pads_only_on_matching_side_pins_on_both() {
        let mut board = Board::new();
        board.add_element(element(true));

        let component = build_keepouts(&board, LayerSide::Component, 100);
        assert_eq!(component.len(), 2);
        let pad = component[0].outline.bounding_box().unwrap();
        // 100 + 400/2 + 200/2 on every side of the pad centre line
        assert_eq!(pad.min, Point::new(-400, -400));
        assert_eq!(pad.max, Point::new(1400, 400));

        let solder = build_keepouts(&board, LayerSide::Solder, 100);
        assert_eq!(solder.len(), 1);
        let r = max_radius(&solder[0], Point::new(5000, 5000));
        assert!((r - 500.0).abs() <= 1.0);
    }
}
