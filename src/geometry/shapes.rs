//! Keepout shape construction
//!
//! Approximations of circles, line bodies and rounded pad rectangles as integer
//! polygons. Trigonometry only derives vertex offsets; every vertex is rounded
//! to the nearest board unit.

use super::types::{Coord, Point, Polygon, Rect};
use std::f64::consts::{FRAC_PI_2, PI};

/// Default number of sides for circular keepouts
pub const CIRCLE_SEGMENTS: usize = 24;

/// Default number of segments per 90° corner arc
pub const CORNER_SEGMENTS: usize = 8;

/// Regular polygon inscribed in the circle of `radius` around `center`
pub fn circle(center: Point, radius: Coord, segments: usize) -> Polygon {
    if radius <= 0 || segments < 3 {
        return Polygon::default();
    }
    let r = radius as f64;
    let step = 2.0 * PI / segments as f64;
    let points = (0..segments)
        .map(|i| {
            let theta = -PI + step * i as f64;
            Point::rounded(
                center.x as f64 + r * theta.cos(),
                center.y as f64 + r * theta.sin(),
            )
        })
        .collect();
    Polygon::new(points)
}

/// Angle of the segment `p0 -> p1`, measured from the +Y axis towards +X
fn segment_angle(p0: Point, p1: Point) -> f64 {
    ((p1.x - p0.x) as f64).atan2((p1.y - p0.y) as f64)
}

/// Rectangle covering the segment `p0 -> p1` with `half_width` on each side
///
/// Combined with two end circles of the same radius this approximates a
/// rounded capsule around a track.
pub fn capsule_body(p0: Point, p1: Point, half_width: Coord) -> Polygon {
    let theta = segment_angle(p0, p1);
    let hw = half_width as f64;
    let dx = (hw * (theta + FRAC_PI_2).sin()).round() as Coord;
    let dy = (hw * (theta + FRAC_PI_2).cos()).round() as Coord;

    Polygon::new(vec![
        Point::new(p0.x + dx, p0.y + dy),
        Point::new(p0.x - dx, p0.y - dy),
        Point::new(p1.x - dx, p1.y - dy),
        Point::new(p1.x + dx, p1.y + dy),
    ])
}

/// Rectangle with circular-arc corners
///
/// The corner radius is clamped to half of the shorter side. Each corner arc is
/// approximated with `segments_per_quarter` straight segments.
pub fn rounded_rect(rect: Rect, radius: Coord, segments_per_quarter: usize) -> Polygon {
    let radius = radius.clamp(0, rect.width().min(rect.height()) / 2);
    if radius == 0 || segments_per_quarter == 0 {
        return Polygon::new(vec![
            rect.min,
            Point::new(rect.max.x, rect.min.y),
            rect.max,
            Point::new(rect.min.x, rect.max.y),
        ]);
    }

    let r = radius as f64;
    // Corner centres with their starting angles, walking counter-clockwise
    let corners = [
        (rect.max.x - radius, rect.min.y + radius, -FRAC_PI_2),
        (rect.max.x - radius, rect.max.y - radius, 0.0),
        (rect.min.x + radius, rect.max.y - radius, FRAC_PI_2),
        (rect.min.x + radius, rect.min.y + radius, PI),
    ];
    let step = FRAC_PI_2 / segments_per_quarter as f64;

    let mut points = Vec::with_capacity(4 * (segments_per_quarter + 1));
    for (cx, cy, start) in corners {
        for k in 0..=segments_per_quarter {
            let theta = start + step * k as f64;
            points.push(Point::rounded(
                cx as f64 + r * theta.cos(),
                cy as f64 + r * theta.sin(),
            ));
        }
    }
    Polygon::new(points)
}
