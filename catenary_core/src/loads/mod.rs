//! Loading conditions for sag-tension analysis
//!
//! A [`LoadingCondition`] is an environmental state of the conductor:
//! temperature, radial glaze ice, wind pressure and an additive code
//! constant. A [`DesignCondition`] adds the limit the conductor is strung to
//! under that state and the cable state ([`Condition`]) the limit applies to.
//!
//! Quantities are in the working unit system (SI for the built-in
//! conductors): ice thickness in length units, wind pressure in force per
//! area, the constant in force per length.
//!
//! # Example
//!
//! ```
//! use catenary_core::loads::{Condition, DesignCondition, LoadLimit, LoadingCondition};
//!
//! let heavy = LoadingCondition::new("Heavy", -20.0)
//!     .with_ice(0.0125)
//!     .with_wind(190.0)
//!     .with_constant(4.40);
//!
//! let design = DesignCondition::new(
//!     LoadingCondition::new("Stringing", 15.0),
//!     LoadLimit::RatedStrengthFraction(0.15),
//!     Condition::Initial,
//! );
//! assert!(heavy.weight(15.66, 0.02811, 8952.0) > 15.66);
//! assert_eq!(design.condition, Condition::Initial);
//! ```

pub mod nesc;

pub use nesc::{standard_temperatures, NescDistrict};

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, require_positive, CalcError, CalcResult};
use crate::units::{Rescale, UnitConversion};

/// Which stress-strain branch a conductor follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Condition {
    /// As strung, before any load history
    #[default]
    Initial,
    /// After the conductor has been loaded to its peak tension
    Final,
    /// After long-term creep; follows the same unloading branch as `Final`
    Creep,
}

impl Condition {
    /// Whether this state follows the final-modulus unloading branch
    pub fn is_after_load(&self) -> bool {
        matches!(self, Condition::Final | Condition::Creep)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Condition::Initial => "Initial",
            Condition::Final => "Final",
            Condition::Creep => "Creep",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Environmental state of a conductor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingCondition {
    /// User label (e.g. "NESC Heavy", "Max operating")
    pub label: String,
    /// Conductor temperature
    pub temperature: f64,
    /// Radial glaze ice thickness
    #[serde(default)]
    pub ice_thickness: f64,
    /// Wind pressure on the projected (iced) diameter
    #[serde(default)]
    pub wind_pressure: f64,
    /// Additive load constant (NESC K factor)
    #[serde(default)]
    pub constant: f64,
}

impl LoadingCondition {
    /// Bare conductor at `temperature`
    pub fn new(label: impl Into<String>, temperature: f64) -> Self {
        LoadingCondition {
            label: label.into(),
            temperature,
            ice_thickness: 0.0,
            wind_pressure: 0.0,
            constant: 0.0,
        }
    }

    pub fn with_ice(mut self, ice_thickness: f64) -> Self {
        self.ice_thickness = ice_thickness;
        self
    }

    pub fn with_wind(mut self, wind_pressure: f64) -> Self {
        self.wind_pressure = wind_pressure;
        self
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        require_finite("temperature", self.temperature)?;
        for (field, value) in [
            ("ice_thickness", self.ice_thickness),
            ("wind_pressure", self.wind_pressure),
            ("constant", self.constant),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Load component must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }

    /// Weight of the ice annulus per unit length, `γ·π·t·(D + t)`
    pub fn ice_weight(&self, diameter: f64, ice_unit_weight: f64) -> f64 {
        ice_unit_weight * std::f64::consts::PI * self.ice_thickness * (diameter + self.ice_thickness)
    }

    /// Wind force per unit length on the iced diameter
    pub fn wind_load(&self, diameter: f64) -> f64 {
        self.wind_pressure * (diameter + 2.0 * self.ice_thickness)
    }

    /// Resultant unit load on the conductor:
    /// `sqrt((w + w_ice)² + (p·(D + 2t))²) + K`
    pub fn weight(&self, bare_weight: f64, diameter: f64, ice_unit_weight: f64) -> f64 {
        let vertical = bare_weight + self.ice_weight(diameter, ice_unit_weight);
        vertical.hypot(self.wind_load(diameter)) + self.constant
    }

    /// Whether this state adds anything to the bare conductor weight
    pub fn is_loaded(&self) -> bool {
        self.ice_thickness > 0.0 || self.wind_pressure > 0.0 || self.constant > 0.0
    }
}

impl Rescale for LoadingCondition {
    fn rescale(&mut self, conversion: &UnitConversion) {
        self.ice_thickness = conversion.length(self.ice_thickness);
        self.wind_pressure = conversion.pressure(self.wind_pressure);
        self.constant = conversion.force_per_length(self.constant);
    }
}

/// The limit a conductor is strung to under its design loading.
///
/// Tension limits apply to the horizontal tension.
///
/// ```json
/// { "type": "RatedStrengthFraction", "value": 0.15 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum LoadLimit {
    /// Maximum sag in length units
    MaximumSag(f64),
    /// Fraction of the conductor rated strength
    RatedStrengthFraction(f64),
    /// Horizontal tension in force units
    HorizontalTension(f64),
}

impl LoadLimit {
    pub fn validate(&self) -> CalcResult<()> {
        match *self {
            LoadLimit::MaximumSag(sag) => require_positive("maximum_sag", sag).map(|_| ()),
            LoadLimit::RatedStrengthFraction(fraction) => {
                require_positive("rated_strength_fraction", fraction)?;
                if fraction >= 1.0 {
                    return Err(CalcError::invalid_input(
                        "rated_strength_fraction",
                        fraction.to_string(),
                        "Fraction of rated strength must be below 1",
                    ));
                }
                Ok(())
            }
            LoadLimit::HorizontalTension(tension) => {
                require_positive("horizontal_tension", tension).map(|_| ())
            }
        }
    }
}

impl std::fmt::Display for LoadLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadLimit::MaximumSag(sag) => write!(f, "max sag {sag}"),
            LoadLimit::RatedStrengthFraction(fraction) => write!(f, "{:.1}% RTS", fraction * 100.0),
            LoadLimit::HorizontalTension(tension) => write!(f, "H = {tension}"),
        }
    }
}

/// Loading plus the limit the conductor is designed to under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignCondition {
    pub loading: LoadingCondition,
    pub limit: LoadLimit,
    #[serde(default)]
    pub condition: Condition,
}

impl DesignCondition {
    pub fn new(loading: LoadingCondition, limit: LoadLimit, condition: Condition) -> Self {
        DesignCondition {
            loading,
            limit,
            condition,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        self.loading.validate()?;
        self.limit.validate()
    }
}

impl Rescale for DesignCondition {
    fn rescale(&mut self, conversion: &UnitConversion) {
        self.loading.rescale(conversion);
        self.limit = match self.limit {
            LoadLimit::MaximumSag(sag) => LoadLimit::MaximumSag(conversion.length(sag)),
            LoadLimit::HorizontalTension(tension) => LoadLimit::HorizontalTension(conversion.force(tension)),
            fraction @ LoadLimit::RatedStrengthFraction(_) => fraction,
        };
    }
}
