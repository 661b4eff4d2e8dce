//! # Unit Systems
//!
//! The mechanics engine is unit-agnostic: every formula works in whatever
//! consistent length/force units the caller uses. This module only knows how
//! to move between the two supported systems and which symbol string a
//! document carries.
//!
//! When the display units change, the caller builds a [`UnitConversion`] and
//! rescales its objects through the [`Rescale`] trait. Positions and steps
//! scale with the length factor, weights with force/length, tensions with
//! force.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::units::{UnitConversion, UnitSystem};
//!
//! let conversion = UnitConversion::between(UnitSystem::Imperial, UnitSystem::Metric);
//! assert!((conversion.length(1000.0) - 304.8).abs() < 1e-9);
//! assert!((conversion.force(1.0) - 4.4482216152605).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Metres per foot
const METERS_PER_FOOT: f64 = 0.3048;
/// Newtons per pound-force
const NEWTONS_PER_POUND: f64 = 4.4482216152605;

/// Supported measurement systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    /// Metres and newtons
    #[default]
    Metric,
    /// Feet and pounds-force
    Imperial,
}

impl UnitSystem {
    /// Symbol string stored in documents, `"<length>/<force>"`
    pub fn symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/N",
            UnitSystem::Imperial => "ft/lb",
        }
    }

    /// Parse a document symbol string
    pub fn from_symbol(symbol: &str) -> CalcResult<Self> {
        match symbol.trim() {
            "m/N" => Ok(UnitSystem::Metric),
            "ft/lb" => Ok(UnitSystem::Imperial),
            other => Err(CalcError::invalid_input(
                "units",
                other,
                "Expected \"m/N\" or \"ft/lb\"",
            )),
        }
    }

    /// Length unit symbol
    pub fn length_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m",
            UnitSystem::Imperial => "ft",
        }
    }

    /// Force unit symbol
    pub fn force_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "N",
            UnitSystem::Imperial => "lb",
        }
    }

    /// Temperature unit symbol
    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    /// Size of one length unit in metres
    pub fn length_to_si(&self) -> f64 {
        match self {
            UnitSystem::Metric => 1.0,
            UnitSystem::Imperial => METERS_PER_FOOT,
        }
    }

    /// Size of one force unit in newtons
    pub fn force_to_si(&self) -> f64 {
        match self {
            UnitSystem::Metric => 1.0,
            UnitSystem::Imperial => NEWTONS_PER_POUND,
        }
    }

    /// Unit weight of glaze ice (force per volume)
    pub fn ice_unit_weight(&self) -> f64 {
        match self {
            UnitSystem::Metric => 8_952.0,
            UnitSystem::Imperial => 57.0,
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Linear length/force rescaling factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    /// New length units per old length unit
    pub length_factor: f64,
    /// New force units per old force unit
    pub force_factor: f64,
}

impl UnitConversion {
    /// Build a conversion from raw factors
    pub fn new(length_factor: f64, force_factor: f64) -> CalcResult<Self> {
        crate::errors::require_positive("length_factor", length_factor)?;
        crate::errors::require_positive("force_factor", force_factor)?;
        Ok(UnitConversion {
            length_factor,
            force_factor,
        })
    }

    /// Conversion from one unit system to another
    pub fn between(from: UnitSystem, to: UnitSystem) -> Self {
        UnitConversion {
            length_factor: from.length_to_si() / to.length_to_si(),
            force_factor: from.force_to_si() / to.force_to_si(),
        }
    }

    /// The identity conversion
    pub fn identity() -> Self {
        UnitConversion {
            length_factor: 1.0,
            force_factor: 1.0,
        }
    }

    /// Convert a length
    pub fn length(&self, value: f64) -> f64 {
        value * self.length_factor
    }

    /// Convert a force
    pub fn force(&self, value: f64) -> f64 {
        value * self.force_factor
    }

    /// Convert a force per unit length (cable weight)
    pub fn force_per_length(&self, value: f64) -> f64 {
        value * self.force_factor / self.length_factor
    }

    /// Convert a force per unit area (pressure, stress)
    pub fn pressure(&self, value: f64) -> f64 {
        value * self.force_factor / (self.length_factor * self.length_factor)
    }
}

/// Objects whose stored quantities follow a change of units.
pub trait Rescale {
    /// Rescale every stored quantity in place
    fn rescale(&mut self, conversion: &UnitConversion);
}

/// Convert a temperature between the systems' scales (°C and °F)
pub fn convert_temperature(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Imperial) => value * 9.0 / 5.0 + 32.0,
        (UnitSystem::Imperial, UnitSystem::Metric) => (value - 32.0) * 5.0 / 9.0,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_roundtrip() {
        for system in [UnitSystem::Metric, UnitSystem::Imperial] {
            assert_eq!(UnitSystem::from_symbol(system.symbol()).unwrap(), system);
        }
        assert!(UnitSystem::from_symbol("km/kN").is_err());
    }

    #[test]
    fn test_conversion_between_systems() {
        let to_metric = UnitConversion::between(UnitSystem::Imperial, UnitSystem::Metric);
        let to_imperial = UnitConversion::between(UnitSystem::Metric, UnitSystem::Imperial);
        assert!((to_metric.length(1.0) - 0.3048).abs() < 1e-12);
        assert!((to_imperial.length(to_metric.length(1234.5)) - 1234.5).abs() < 1e-9);
        // 1 lb/ft is about 14.5939 N/m
        assert!((to_metric.force_per_length(1.0) - 14.593903).abs() < 1e-5);
    }

    #[test]
    fn test_identity_and_validation() {
        let identity = UnitConversion::identity();
        assert_eq!(identity.pressure(12.0), 12.0);
        assert!(UnitConversion::new(0.0, 1.0).is_err());
        assert!(UnitConversion::new(2.0, 3.0).is_ok());
    }

    #[test]
    fn test_temperature_conversion() {
        assert!((convert_temperature(100.0, UnitSystem::Metric, UnitSystem::Imperial) - 212.0).abs() < 1e-12);
        assert!((convert_temperature(-4.0, UnitSystem::Imperial, UnitSystem::Metric) + 20.0).abs() < 1e-12);
        assert_eq!(convert_temperature(15.0, UnitSystem::Metric, UnitSystem::Metric), 15.0);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&UnitSystem::Imperial).unwrap();
        assert_eq!(json, "\"Imperial\"");
        let roundtrip: UnitSystem = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, UnitSystem::Imperial);
    }
}
