//! Work orders: what to stipple and with which parameters
//!
//! A [`WorkOrder`] is built once per invocation, either directly from board
//! units or from raw dialog text via [`WorkOrder::from_input`], which performs
//! every validation before anything touches the board.

use crate::error::{Result, StippleError};
use crate::geometry::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board units per centimil (1/100 mil = 254 nm)
pub const CENTIMIL: Coord = 254;

/// Largest accepted trace or pitch: one metre in board units
///
/// Keeps the lattice period and its loop bounds far inside `Coord` and the
/// Clipper coordinate range.
pub const MAX_PARAMETER: Coord = 1_000_000_000;

/// Which layers to process and how
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StippleMode {
    TopOnly,
    BottomOnly,
    Both,
    /// Stipple only selected template polygons, keeping existing content
    SelectedOnly,
    /// Remove all stippled polygons from both stipple layers
    DeleteAll,
}

impl StippleMode {
    pub fn targets(self) -> Vec<LayerSide> {
        match self {
            StippleMode::TopOnly => vec![LayerSide::Component],
            StippleMode::BottomOnly => vec![LayerSide::Solder],
            StippleMode::Both | StippleMode::SelectedOnly | StippleMode::DeleteAll => {
                vec![LayerSide::Component, LayerSide::Solder]
            }
        }
    }

    /// Existing stipple content is replaced in every mode except `SelectedOnly`
    pub fn replaces_existing(self) -> bool {
        self != StippleMode::SelectedOnly
    }

    pub fn only_selected(self) -> bool {
        self == StippleMode::SelectedOnly
    }
}

/// Board side a stipple job works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerSide {
    Component,
    Solder,
}

impl LayerSide {
    /// Template layer read by the job
    pub fn perimeter_layer(self) -> &'static str {
        match self {
            LayerSide::Component => "comp-perim",
            LayerSide::Solder => "solder-perim",
        }
    }

    /// Layer the stippled polygons are written to
    pub fn stipple_layer(self) -> &'static str {
        match self {
            LayerSide::Component => "comp-stipple",
            LayerSide::Solder => "solder-stipple",
        }
    }

    /// Copper layer whose lines become keepouts
    pub fn copper_layer(self) -> &'static str {
        match self {
            LayerSide::Component => "component",
            LayerSide::Solder => "solder",
        }
    }

    /// Elements placed on the front belong to the component side
    pub fn matches_element(self, front: bool) -> bool {
        front == (self == LayerSide::Component)
    }
}

impl fmt::Display for LayerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSide::Component => write!(f, "component"),
            LayerSide::Solder => write!(f, "solder"),
        }
    }
}

/// Trace and pitch for one side, in board units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StippleParams {
    pub trace: Coord,
    pub pitch: Coord,
}

impl StippleParams {
    pub fn new(trace: Coord, pitch: Coord) -> Self {
        Self { trace, pitch }
    }

    fn validate(&self, side: LayerSide) -> Result<()> {
        let fields = match side {
            LayerSide::Component => ("Component Trace", "Component Pitch"),
            LayerSide::Solder => ("Solder Trace", "Solder Pitch"),
        };
        if self.trace < 0 {
            return Err(StippleError::NegativeParameter {
                field: fields.0,
                value: self.trace,
            });
        }
        if self.pitch < 0 {
            return Err(StippleError::NegativeParameter {
                field: fields.1,
                value: self.pitch,
            });
        }
        for (field, value) in [(fields.0, self.trace), (fields.1, self.pitch)] {
            if value > MAX_PARAMETER {
                return Err(StippleError::ParameterTooLarge {
                    field,
                    value,
                    max: MAX_PARAMETER,
                });
            }
        }
        if self.pitch <= self.trace {
            return Err(StippleError::PitchNotAboveTrace {
                side,
                trace: self.trace,
                pitch: self.pitch,
            });
        }
        Ok(())
    }
}

/// Raw parameter entry as typed by the user
///
/// Trace and pitch are text in centimils.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StippleRequest {
    pub mode: Option<StippleMode>,
    pub component_trace: String,
    pub component_pitch: String,
    pub solder_trace: String,
    pub solder_pitch: String,
}

/// Validated description of one stipple invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    pub mode: StippleMode,
    pub component: StippleParams,
    pub solder: StippleParams,
    pub targets: Vec<LayerSide>,
}

impl WorkOrder {
    /// Build and validate a work order from board-unit parameters
    ///
    /// Only the targeted sides are checked; `DeleteAll` ignores the parameters.
    pub fn new(mode: StippleMode, component: StippleParams, solder: StippleParams) -> Result<Self> {
        let targets = mode.targets();
        if mode != StippleMode::DeleteAll {
            for side in &targets {
                let params = match side {
                    LayerSide::Component => component,
                    LayerSide::Solder => solder,
                };
                params.validate(*side)?;
            }
        }
        Ok(Self {
            mode,
            component,
            solder,
            targets,
        })
    }

    /// Parse and validate dialog input given in centimils
    pub fn from_input(request: &StippleRequest) -> Result<Self> {
        let component_trace = parse_field("Component Trace", &request.component_trace)?;
        let component_pitch = parse_field("Component Pitch", &request.component_pitch)?;
        let solder_trace = parse_field("Solder Trace", &request.solder_trace)?;
        let solder_pitch = parse_field("Solder Pitch", &request.solder_pitch)?;
        let mode = request.mode.ok_or(StippleError::NoModeSelected)?;
        Self::new(
            mode,
            StippleParams::new(component_trace * CENTIMIL, component_pitch * CENTIMIL),
            StippleParams::new(solder_trace * CENTIMIL, solder_pitch * CENTIMIL),
        )
    }

    pub fn params(&self, side: LayerSide) -> StippleParams {
        match side {
            LayerSide::Component => self.component,
            LayerSide::Solder => self.solder,
        }
    }

    /// Perimeter layer names of the targets, in order
    pub fn target_layer_names(&self) -> Vec<&'static str> {
        self.targets.iter().map(|s| s.perimeter_layer()).collect()
    }
}

/// Parse one centimil field; values that would overflow board units are rejected
fn parse_field(field: &'static str, text: &str) -> Result<Coord> {
    text.trim()
        .parse::<Coord>()
        .ok()
        .filter(|value| value.checked_mul(CENTIMIL).is_some())
        .ok_or_else(|| StippleError::InvalidParameter {
            field,
            value: text.to_string(),
        })
}

/// Estimated copper coverage, in percent, of a stipple with the given
/// trace and pitch (any consistent unit)
///
/// This is the figure shown next to the parameter fields, so it rises with
/// trace: `percent_fill(7, 70)` is 18 and `percent_fill(70, 70)` is 100.
/// [`percent_open`] is its complement and is the one that falls as trace
/// grows and rises with pitch.
pub fn percent_fill(trace: f64, pitch: f64) -> i32 {
    if pitch <= 0.0 {
        return 0;
    }
    let sqrt2 = 2f64.sqrt();
    let open_side = pitch / sqrt2 - sqrt2 * trace / 2.0;
    let cell_side = pitch / sqrt2;
    (100.0 * (1.0 - (open_side.powi(2) / 2.0) / (cell_side.powi(2) / 2.0))) as i32
}

/// Open (uncovered) share in percent, the complement of [`percent_fill`]
pub fn percent_open(trace: f64, pitch: f64) -> i32 {
    100 - percent_fill(trace, pitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: Option<StippleMode>, ct: &str, cp: &str, st: &str, sp: &str) -> StippleRequest {
        StippleRequest {
            mode,
            component_trace: ct.to_string(),
            component_pitch: cp.to_string(),
            solder_trace: st.to_string(),
            solder_pitch: sp.to_string(),
        }
    }

    #[test]
    fn test_mode_targets() {
        assert_eq!(StippleMode::TopOnly.targets(), vec![LayerSide::Component]);
        assert_eq!(StippleMode::BottomOnly.targets(), vec![LayerSide::Solder]);
        for mode in [StippleMode::Both, StippleMode::SelectedOnly, StippleMode::DeleteAll] {
            assert_eq!(mode.targets(), vec![LayerSide::Component, LayerSide::Solder]);
        }
        assert!(!StippleMode::SelectedOnly.replaces_existing());
        assert!(StippleMode::DeleteAll.replaces_existing());
    }

    #[test]
    fn test_from_input_converts_centimils() {
        let order = WorkOrder::from_input(&request(
            Some(StippleMode::Both),
            "700",
            " 4500 ",
            "700",
            "7000",
        ))
        .unwrap();
        assert_eq!(order.component, StippleParams::new(700 * 254, 4500 * 254));
        assert_eq!(order.solder, StippleParams::new(177_800, 1_778_000));
        assert_eq!(order.target_layer_names(), vec!["comp-perim", "solder-perim"]);
    }

    #[test]
    fn test_from_input_rejects_garbage() {
        let err = WorkOrder::from_input(&request(Some(StippleMode::Both), "7x0", "4500", "700", "7000"))
            .unwrap_err();
        assert!(matches!(err, StippleError::InvalidParameter { field: "Component Trace", .. }));
    }

    #[test]
    fn test_from_input_requires_mode() {
        let err = WorkOrder::from_input(&request(None, "700", "4500", "700", "7000")).unwrap_err();
        assert!(matches!(err, StippleError::NoModeSelected));
    }

    #[test]
    fn test_pitch_must_exceed_trace() {
        let err = WorkOrder::from_input(&request(Some(StippleMode::BottomOnly), "700", "4500", "700", "700"))
            .unwrap_err();
        assert!(matches!(err, StippleError::PitchNotAboveTrace { side: LayerSide::Solder, .. }));

        // Only targeted sides are validated
        assert!(WorkOrder::from_input(&request(Some(StippleMode::TopOnly), "700", "4500", "700", "700")).is_ok());
        assert!(WorkOrder::new(
            StippleMode::DeleteAll,
            StippleParams::new(0, 0),
            StippleParams::new(0, 0)
        )
        .is_ok());
    }

    #[test]
    fn test_oversized_parameters_rejected() {
        let err = WorkOrder::from_input(&request(
            Some(StippleMode::TopOnly),
            "10000000000000000",
            "36000000000000000",
            "700",
            "7000",
        ))
        .unwrap_err();
        assert!(matches!(err, StippleError::ParameterTooLarge { field: "Component Trace", .. }));
        assert!(err.is_validation());

        let err = WorkOrder::new(
            StippleMode::BottomOnly,
            StippleParams::new(0, 100),
            StippleParams::new(700, MAX_PARAMETER + 1),
        )
        .unwrap_err();
        assert!(matches!(err, StippleError::ParameterTooLarge { field: "Solder Pitch", .. }));

        // The bound itself is accepted
        assert!(WorkOrder::new(
            StippleMode::TopOnly,
            StippleParams::new(700, MAX_PARAMETER),
            StippleParams::new(0, 0)
        )
        .is_ok());
    }

    #[test]
    fn test_negative_values_rejected() {
        let err = WorkOrder::new(
            StippleMode::TopOnly,
            StippleParams::new(-1, 100),
            StippleParams::new(0, 100),
        )
        .unwrap_err();
        assert!(matches!(err, StippleError::NegativeParameter { value: -1, .. }));
    }

    #[test]
    fn test_percent_fill_reference_values() {
        assert_eq!(percent_fill(7.0, 70.0), 18);
        assert_eq!(percent_fill(700.0, 4500.0), 28);
        assert_eq!(percent_fill(0.0, 70.0), 0);
        assert_eq!(percent_fill(70.0, 70.0), 100);
        assert_eq!(percent_fill(10.0, 0.0), 0);
        assert_eq!(percent_open(70.0, 70.0), 0);
    }

    #[test]
    fn test_percent_open_monotonic() {
        let pitch = 70.0;
        let mut last = i32::MAX;
        for trace in 0..70 {
            let open = percent_open(trace as f64, pitch);
            assert!(open <= last);
            last = open;
        }
        let trace = 7.0;
        let mut last = i32::MIN;
        for pitch in 8..200 {
            let open = percent_open(trace, pitch as f64);
            assert!(open >= last);
            last = open;
        }
    }

    #[test]
    fn test_side_names() {
        assert_eq!(LayerSide::Component.to_string(), "component");
        assert_eq!(LayerSide::Solder.stipple_layer(), "solder-stipple");
        assert!(LayerSide::Component.matches_element(true));
        assert!(LayerSide::Solder.matches_element(false));
        assert!(!LayerSide::Solder.matches_element(true));
    }
}
