//! # Conductor Model
//!
//! Stranded composite conductors and their tension response to strain,
//! temperature and load history. All quantities are SI: metres, newtons,
//! pascals, °C, strain in percent.
//!
//! ## Layers
//!
//! - [`Material`] / [`MaterialLibrary`]: strand material properties
//! - [`StressStrainCurve`]: initial stress-strain behaviour of one layer
//! - [`StrandGroup`]: one material layer and its derived geometry
//! - [`StressGroup`]: a strand group plus its tension ratchet and pre-strain
//! - [`Conductor`]: the ordered strand groups of one conductor type
//! - [`LoadedCable`]: a conductor strung on a span, with the length/tension
//!   equilibrium solver
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::conductor::{Conductor, MaterialLibrary};
//!
//! let drake = Conductor::drake(&MaterialLibrary::standard()).unwrap();
//! assert!((drake.outer_diameter() - 0.02811).abs() < 1e-9);
//! assert!((drake.weight() - 15.66).abs() < 0.01);
//! ```

pub mod loaded_cable;
pub mod materials;
pub mod strand_group;
pub mod stress_group;
pub mod stress_strain;

pub use loaded_cable::LoadedCable;
pub use materials::{Material, MaterialLibrary, GRAVITY};
pub use strand_group::{stranding_factor, StrandGroup};
pub use stress_group::StressGroup;
pub use stress_strain::{ExponentialCurve, PolynomialCurve, StressStrain, StressStrainCurve};

use serde::Serialize;

use crate::errors::{CalcError, CalcResult};

/// A conductor type: strand groups ordered from the core outwards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conductor {
    name: String,
    groups: Vec<StrandGroup>,
}

impl Conductor {
    pub fn new(name: impl Into<String>, groups: Vec<StrandGroup>) -> CalcResult<Self> {
        if groups.is_empty() {
            return Err(CalcError::invalid_input(
                "groups",
                "[]",
                "A conductor needs at least one strand group",
            ));
        }
        for group in &groups {
            group.validate()?;
        }
        Ok(Conductor {
            name: name.into(),
            groups,
        })
    }

    /// ACSR "Drake" 795 kcmil 26/7
    pub fn drake(library: &MaterialLibrary) -> CalcResult<Self> {
        let steel = library.get("Galvanized Steel")?;
        let aluminum = library.get("Aluminum 1350-H19")?;
        let core = StrandGroup {
            strand_count: 7,
            strand_diameter: 3.45e-3,
            layer_count: 1,
            inner_diameter: 0.0,
            material: steel.clone(),
            initial_curve: ExponentialCurve::fit(1410e6, (0.3, 540e6), (0.6, 880e6), 0.8)?.into(),
            final_modulus: steel.final_modulus,
            reference_temperature: 20.0,
        };
        let outer = StrandGroup {
            strand_count: 26,
            strand_diameter: 4.44e-3,
            layer_count: 2,
            inner_diameter: core.outer_diameter(),
            material: aluminum.clone(),
            initial_curve: PolynomialCurve::new(
                vec![-8.363e6, 305.49e6, -96.56e6, -259.37e6, 211.50e6],
                0.45,
            )?
            .into(),
            final_modulus: aluminum.final_modulus,
            reference_temperature: 20.0,
        };
        Conductor::new("Drake ACSR 26/7", vec![core, outer])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groups(&self) -> &[StrandGroup] {
        &self.groups
    }

    /// Overall diameter, m
    pub fn outer_diameter(&self) -> f64 {
        self.groups
            .iter()
            .map(StrandGroup::outer_diameter)
            .fold(0.0, f64::max)
    }

    /// Total metallic area, m²
    pub fn area(&self) -> f64 {
        self.groups.iter().map(StrandGroup::area).sum()
    }

    /// Bare weight per unit length, N/m
    pub fn weight(&self) -> f64 {
        self.groups.iter().map(StrandGroup::weight).sum()
    }

    /// Rated tensile strength, N
    pub fn rated_strength(&self) -> CalcResult<f64> {
        self.groups.iter().map(StrandGroup::rated_strength).sum()
    }

    /// Largest strain any layer curve is fit to, percent
    pub fn max_strain(&self) -> f64 {
        self.groups
            .iter()
            .map(StrandGroup::max_strain)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drake_properties() {
        let drake = Conductor::drake(&MaterialLibrary::standard()).unwrap();
        assert_eq!(drake.name(), "Drake ACSR 26/7");
        assert_eq!(drake.groups().len(), 2);
        assert!((drake.outer_diameter() - 28.11e-3).abs() < 1e-12);
        assert!((drake.weight() - 15.663).abs() < 1e-2);
        assert_eq!(drake.max_strain(), 0.8);

        let rts = drake.rated_strength().unwrap();
        let aluminum = drake.groups()[1].area() * 165e6 * 0.93;
        let steel = drake.groups()[0].area() * 1410e6 * 0.96;
        assert!((rts - aluminum - steel).abs() < 1e-6);
    }

    #[test]
    fn test_empty_conductor_rejected() {
        assert!(Conductor::new("Nothing", vec![]).is_err());
    }

    #[test]
    fn test_drake_needs_library_entries() {
        let err = Conductor::drake(&MaterialLibrary::new()).unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");
    }

    #[test]
    fn test_invalid_group_rejected() {
        let drake = Conductor::drake(&MaterialLibrary::standard()).unwrap();
        let mut groups = drake.groups().to_vec();
        groups[1].layer_count = 7;
        assert!(Conductor::new("Bad", groups).is_err());
    }
}
