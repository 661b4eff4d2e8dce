//! NESC Rule 250B combined ice and wind loading districts
//!
//! Tables are per unit system and handed out as [`LoadingCondition`] values;
//! nothing here is global state.

use serde::{Deserialize, Serialize};

use super::LoadingCondition;
use crate::units::UnitSystem;

/// NESC loading district
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NescDistrict {
    Heavy,
    Medium,
    Light,
}

/// One row of the district table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NescLoading {
    pub ice_thickness: f64,
    pub wind_pressure: f64,
    pub temperature: f64,
    pub constant: f64,
}

impl NescDistrict {
    pub const ALL: [NescDistrict; 3] = [NescDistrict::Heavy, NescDistrict::Medium, NescDistrict::Light];

    pub fn display_name(&self) -> &'static str {
        match self {
            NescDistrict::Heavy => "NESC Heavy",
            NescDistrict::Medium => "NESC Medium",
            NescDistrict::Light => "NESC Light",
        }
    }

    /// District values in the given unit system (SI: m, Pa, °C, N/m; US: ft, psf, °F, lb/ft)
    pub fn values(&self, units: UnitSystem) -> NescLoading {
        match (units, self) {
            (UnitSystem::Metric, NescDistrict::Heavy) => NescLoading {
                ice_thickness: 0.0125,
                wind_pressure: 190.0,
                temperature: -20.0,
                constant: 4.40,
            },
            (UnitSystem::Metric, NescDistrict::Medium) => NescLoading {
                ice_thickness: 0.0065,
                wind_pressure: 190.0,
                temperature: -10.0,
                constant: 2.50,
            },
            (UnitSystem::Metric, NescDistrict::Light) => NescLoading {
                ice_thickness: 0.0,
                wind_pressure: 430.0,
                temperature: -1.0,
                constant: 0.70,
            },
            (UnitSystem::Imperial, NescDistrict::Heavy) => NescLoading {
                ice_thickness: 0.5 / 12.0,
                wind_pressure: 4.0,
                temperature: 0.0,
                constant: 0.30,
            },
            (UnitSystem::Imperial, NescDistrict::Medium) => NescLoading {
                ice_thickness: 0.25 / 12.0,
                wind_pressure: 4.0,
                temperature: 15.0,
                constant: 0.20,
            },
            (UnitSystem::Imperial, NescDistrict::Light) => NescLoading {
                ice_thickness: 0.0,
                wind_pressure: 9.0,
                temperature: 30.0,
                constant: 0.05,
            },
        }
    }

    /// The district as a loading condition
    pub fn loading(&self, units: UnitSystem) -> LoadingCondition {
        let values = self.values(units);
        LoadingCondition::new(self.display_name(), values.temperature)
            .with_ice(values.ice_thickness)
            .with_wind(values.wind_pressure)
            .with_constant(values.constant)
    }
}

impl std::fmt::Display for NescDistrict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Bare-conductor temperatures tabulated in a standard sag-tension chart
pub fn standard_temperatures(units: UnitSystem) -> Vec<f64> {
    match units {
        UnitSystem::Metric => vec![-20.0, -10.0, 0.0, 15.0, 25.0, 50.0, 75.0, 100.0],
        UnitSystem::Imperial => vec![0.0, 15.0, 30.0, 60.0, 90.0, 120.0, 167.0, 212.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::convert_temperature;

    #[test]
    fn test_heavy_district_metric() {
        let heavy = NescDistrict::Heavy.loading(UnitSystem::Metric);
        assert_eq!(heavy.label, "NESC Heavy");
        assert_eq!(heavy.temperature, -20.0);
        assert_eq!(heavy.ice_thickness, 0.0125);
        assert_eq!(heavy.wind_pressure, 190.0);
        assert_eq!(heavy.constant, 4.40);
    }

    #[test]
    fn test_light_district_has_no_ice() {
        for units in [UnitSystem::Metric, UnitSystem::Imperial] {
            assert_eq!(NescDistrict::Light.values(units).ice_thickness, 0.0);
        }
    }

    #[test]
    fn test_tables_agree_across_units() {
        for district in NescDistrict::ALL {
            let metric = district.values(UnitSystem::Metric);
            let imperial = district.values(UnitSystem::Imperial);
            let to_metric = convert_temperature(imperial.temperature, UnitSystem::Imperial, UnitSystem::Metric);
            // SI tables round 0 °F to -20 °C
            assert!((to_metric - metric.temperature).abs() < 2.5);
            assert!((imperial.ice_thickness * 0.3048 - metric.ice_thickness).abs() < 1e-3);
        }
    }

    #[test]
    fn test_standard_temperatures_sorted() {
        for units in [UnitSystem::Metric, UnitSystem::Imperial] {
            let temperatures = standard_temperatures(units);
            assert!(temperatures.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}
