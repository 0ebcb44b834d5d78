//! Stipple lattice generation
//!
//! Each island is covered with a staggered lattice of diamond cut-outs. Rows
//! are half a period apart and every other row is shifted by half a period,
//! which yields a 45° cross-hatch once the diamonds are clipped to the island
//! inset by the trace width.
//!
//! The pipeline per island is:
//! 1. Inset the island outline by `trace` to get the container
//! 2. Walk the lattice over the island's bounding box, merging each row of
//!    diamonds into the running stipple
//! 3. Clip the stipple to the container (cut-outs)
//! 4. Clip the merged keepouts to the island (overlays)

use super::cancel::CancelToken;
use super::order::{StippleParams, MAX_PARAMETER};
use super::progress::{ProgressContext, ProgressSink};
use crate::geometry::{
    intersect, inset, union, union_with, Coord, Point, Polygon, PolygonSet, PolygonWithHoles, Rect,
};
use std::f64::consts::SQRT_2;
use tracing::debug;

/// One island's stipple result
#[derive(Debug, Clone, PartialEq)]
pub struct StippledRegion {
    /// Island outline, written as the polygon outline
    pub outline: Polygon,
    /// Diamonds clipped to the inset outline, written as holes
    pub cut_outs: PolygonSet,
    /// Keepouts clipped to the outline, written as solid polygons
    pub overlays: PolygonSet,
}

/// Lattice spacing derived from trace and pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeGeometry {
    /// Copper width between diamonds, measured along an axis
    pub dx_line: Coord,
    /// Diamond width along an axis
    pub dx_hole: Coord,
    /// Column spacing; rows are `period / 2` apart
    pub period: Coord,
}

impl LatticeGeometry {
    pub fn new(params: StippleParams) -> Self {
        let dx_line = (params.trace as f64 * SQRT_2) as Coord;
        let dx_hole = ((params.pitch - params.trace) as f64 * SQRT_2) as Coord;
        Self {
            dx_line,
            dx_hole,
            period: dx_line + dx_hole,
        }
    }

    pub fn row_step(&self) -> Coord {
        (self.period / 2).max(1)
    }

    /// Lattice origin at or below `value`
    fn align(&self, value: Coord) -> Coord {
        self.period * value.div_euclid(self.period)
    }

    pub fn diamond(&self, x: Coord, y: Coord) -> Polygon {
        let h = self.dx_hole / 2;
        Polygon::new(vec![
            Point::new(x, y - h),
            Point::new(x + h, y),
            Point::new(x, y + h),
            Point::new(x - h, y),
        ])
    }
}

/// Stipple every island, stopping early when `cancel` is raised
///
/// Only islands finished before cancellation are returned. Interior rings of
/// an island are ignored, so enclosed areas are stippled as part of it.
/// Parameters above [`MAX_PARAMETER`] produce no regions.
pub fn compute_stipples(
    islands: &[PolygonWithHoles],
    keepouts: &[PolygonWithHoles],
    params: StippleParams,
    sink: &dyn ProgressSink,
    progress: &ProgressContext,
    cancel: &CancelToken,
) -> Vec<StippledRegion> {
    if params.trace > MAX_PARAMETER || params.pitch > MAX_PARAMETER {
        debug!(layer = %progress.layer_name, ?params, "Stipple parameters out of range");
        return Vec::new();
    }
    let lattice = LatticeGeometry::new(params);
    if lattice.period <= 0 {
        return Vec::new();
    }
    let keepouts = union(keepouts);
    let mut regions = Vec::with_capacity(islands.len());

    for (index, island) in islands.iter().enumerate() {
        let Some(extents) = island.outline.bounding_box() else {
            continue;
        };
        let message = progress.area_message(index, islands.len());
        let outline: [PolygonWithHoles; 1] = [island.outline.clone().into()];

        let Some(stipple) = stipple_rows(&lattice, extents, cancel, |y| {
            let span = (extents.max.y - extents.min.y + lattice.period) as f64;
            let row_fraction = (y - extents.min.y) as f64 / span;
            sink.report(progress.fraction(index, islands.len(), row_fraction), &message);
        }) else {
            debug!(layer = %progress.layer_name, island = index + 1, "Stipple cancelled");
            return regions;
        };

        let container = inset(&outline, -params.trace);
        let cut_outs = intersect(&stipple, &container);
        let overlays = intersect(&keepouts, &outline);
        debug!(
            layer = %progress.layer_name,
            island = index + 1,
            cut_outs = cut_outs.len(),
            overlays = overlays.len(),
            "Island stippled"
        );
        regions.push(StippledRegion {
            outline: island.outline.clone(),
            cut_outs,
            overlays,
        });
    }
    regions
}

/// Union of all lattice diamonds over `extents`, or `None` when cancelled
fn stipple_rows(
    lattice: &LatticeGeometry,
    extents: Rect,
    cancel: &CancelToken,
    mut on_row: impl FnMut(Coord),
) -> Option<PolygonSet> {
    let mut stipple = PolygonSet::new();
    let mut shifted = true;
    let mut y = lattice.align(extents.min.y);

    while y < extents.max.y + lattice.period {
        if cancel.is_cancelled() {
            return None;
        }
        on_row(y);

        let mut x = lattice.align(extents.min.x);
        if shifted {
            x -= lattice.period / 2;
        }
        shifted = !shifted;

        let mut row = PolygonSet::new();
        while x < extents.max.x + lattice.period {
            if cancel.is_cancelled() {
                return None;
            }
            let diamond = lattice.diamond(x, y);
            if !diamond.is_degenerate() {
                row.push(diamond.into());
            }
            x += lattice.period;
        }
        stipple = union_with(&stipple, &row);
        y += lattice.row_step();
    }
    Some(stipple)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stipple::progress::NoProgress;
    use parking_lot::Mutex;

    fn rect(x0: Coord, y0: Coord, x1: Coord, y1: Coord) -> PolygonWithHoles {
        Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
        .into()
    }

    fn context() -> ProgressContext {
        ProgressContext::new(0, 1, "comp-stipple")
    }

    #[test]
    fn test_lattice_geometry() {
        let lattice = LatticeGeometry::new(StippleParams::new(10, 100));
        assert_eq!(lattice.dx_line, 14);
        assert_eq!(lattice.dx_hole, 127);
        assert_eq!(lattice.period, 141);
        assert_eq!(lattice.row_step(), 70);
        assert_eq!(lattice.align(-1), -141);
        assert_eq!(lattice.align(300), 282);
        assert_eq!(lattice.diamond(0, 0).area(), 2.0 * 63.0 * 63.0);
    }

    #[test]
    fn test_single_rectangle_regular_lattice() {
        let params = StippleParams::new(10, 100);
        let regions = compute_stipples(
            &[rect(0, 0, 1000, 1000)],
            &[],
            params,
            &NoProgress,
            &context(),
            &CancelToken::new(),
        );
        assert_eq!(regions.len(), 1);
        let region = &regions[0];
        assert_eq!(region.outline.len(), 4);
        assert!(region.overlays.is_empty());
        assert!(!region.cut_outs.is_empty());

        let full_area = 2.0 * 63.0 * 63.0;
        let mut full = 0;
        for cut in &region.cut_outs {
            let b = cut.outline.bounding_box().unwrap();
            assert!(b.min.x >= 10 && b.min.y >= 10 && b.max.x <= 990 && b.max.y <= 990);
            assert!(cut.area() <= full_area);
            if cut.area() == full_area {
                full += 1;
                let cx = (b.min.x + b.max.x) / 2;
                let cy = (b.min.y + b.max.y) / 2;
                assert_eq!(cy.rem_euclid(70), 0);
                // Even rows are shifted by half a period
                let expected = if (cy / 70) % 2 == 0 { 71 } else { 0 };
                assert_eq!(cx.rem_euclid(141), expected);
            }
        }
        assert!(full > 20, "only {full} full diamonds");
    }

    #[test]
    fn test_overlays_clipped_to_island() {
        let regions = compute_stipples(
            &[rect(0, 0, 1000, 1000)],
            &[rect(900, 900, 1200, 1200), rect(950, 950, 1100, 1100)],
            StippleParams::new(10, 100),
            &NoProgress,
            &context(),
            &CancelToken::new(),
        );
        let overlays = &regions[0].overlays;
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].area(), 100.0 * 100.0);
    }

    #[test]
    fn test_tiny_island_has_no_cut_outs() {
        let regions = compute_stipples(
            &[rect(0, 0, 15, 15)],
            &[],
            StippleParams::new(10, 100),
            &NoProgress,
            &context(),
            &CancelToken::new(),
        );
        assert_eq!(regions.len(), 1);
        assert!(regions[0].cut_outs.is_empty());
    }

    #[test]
    fn test_out_of_range_parameters_yield_nothing() {
        let regions = compute_stipples(
            &[rect(0, 0, 1000, 1000)],
            &[],
            StippleParams::new(2_540_000_000_000_000_000, 9_144_000_000_000_000_000),
            &NoProgress,
            &context(),
            &CancelToken::new(),
        );
        assert!(regions.is_empty());
    }

    struct CancelOnSecondArea {
        cancel: CancelToken,
        fractions: Mutex<Vec<f32>>,
    }

    impl ProgressSink for CancelOnSecondArea {
        fn report(&self, fraction: f32, message: &str) {
            self.fractions.lock().push(fraction);
            if message.starts_with("Area 2 of") {
                self.cancel.cancel();
            }
        }
    }

    #[test]
    fn test_cancel_keeps_finished_islands() {
        let cancel = CancelToken::new();
        let sink = CancelOnSecondArea {
            cancel: cancel.clone(),
            fractions: Mutex::new(Vec::new()),
        };
        let regions = compute_stipples(
            &[rect(0, 0, 500, 500), rect(2000, 0, 2500, 500)],
            &[],
            StippleParams::new(10, 100),
            &sink,
            &context(),
            &cancel,
        );
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].outline.points()[0], Point::new(0, 0));

        let fractions = sink.fractions.lock();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert!(fractions.iter().all(|f| (0.05..=1.0).contains(f)));
    }
}
