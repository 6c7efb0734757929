//! Bed leveling (calibration probe) types.

/// Logical location on the build plate, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One measured probe location.
///
/// Serializes flat as `{x, y, z_offset}`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbePoint {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub position: Position,
    /// Signed deviation from bed zero, in millimeters.
    pub z_offset: f64,
}

impl ProbePoint {
    pub const fn new(x: f64, y: f64, z_offset: f64) -> Self {
        Self {
            position: Position::new(x, y),
            z_offset,
        }
    }

    /// True if every coordinate and the offset are finite.
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite() && self.z_offset.is_finite()
    }
}

/// Side of the plate that sits higher than the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TiltDirection {
    Left,
    Right,
    Front,
    Back,
}

impl TiltDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TiltDirection::Left => "left",
            TiltDirection::Right => "right",
            TiltDirection::Front => "front",
            TiltDirection::Back => "back",
        }
    }
}

/// Linear relationship between plate position and measured offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tilt {
    /// Pearson correlation of z against x. `None` when undefined
    /// (fewer than two points, or no variation along the axis).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub x_correlation: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub y_correlation: Option<f64>,
    /// Dominant raised side, if the correlation is strong enough to matter.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub direction: Option<TiltDirection>,
}

/// Actionable hint derived from a leveling report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Advice {
    /// Lower the leveling screws on the raised side.
    LowerSide { side: TiltDirection },
    /// Range is large: run the complete leveling procedure.
    FullRelevel,
    /// Range is moderate: fine-tune near the extreme points.
    FineTune,
    /// Scatter is high: check for debris and clean the plate.
    CleanSurface,
}

impl Advice {
    /// Human-readable recommendation.
    pub fn message(&self) -> String {
        match self {
            Advice::LowerSide { side } => format!(
                "Bed appears tilted up towards the {} side; adjust those leveling screws slightly lower",
                side.as_str()
            ),
            Advice::FullRelevel => {
                "Perform a complete bed leveling procedure, starting with the extreme points"
                    .to_string()
            }
            Advice::FineTune => {
                "Fine-tune the leveling near the highest and lowest points".to_string()
            }
            Advice::CleanSurface => {
                "Check for debris or buildup on the bed surface and clean it with IPA".to_string()
            }
        }
    }
}

/// Statistical summary of a probe grid with a level/not-level verdict.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelingReport {
    /// Probe points in grid order.
    pub points: Vec<ProbePoint>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Largest `|z_offset - mean|` over all points.
    pub max_abs_deviation: f64,
    /// Threshold in effect when the report was built.
    pub tolerance_threshold: f64,
    pub is_level: bool,
    /// `max - min`.
    pub range: f64,
    pub highest: ProbePoint,
    pub lowest: ProbePoint,
    pub tilt: Tilt,
    pub advice: Vec<Advice>,
}
