//! # Strand Groups
//!
//! One material layer of a stranded conductor (e.g. the steel core or the
//! aluminum layers of an ACSR), in SI units.
//!
//! Derived geometry assumes round strands laid in concentric layers. A group
//! without an inner diameter has a centre strand, so a 1-layer 7-strand core
//! is three strand diameters across.

use serde::{Deserialize, Serialize};

use super::materials::Material;
use super::stress_strain::{StressStrain, StressStrainCurve};
use crate::errors::{require_finite, require_positive, CalcError, CalcResult};

/// Rated-strength stranding factors for 1..=5 layers
const STRANDING_FACTORS: [f64; 5] = [0.96, 0.93, 0.91, 0.90, 0.89];

/// Rated-strength reduction for a group of `layer_count` layers
pub fn stranding_factor(layer_count: u32) -> CalcResult<f64> {
    match layer_count {
        1..=5 => Ok(STRANDING_FACTORS[(layer_count - 1) as usize]),
        _ => Err(CalcError::unsupported(
            "layer_count",
            layer_count.to_string(),
            "Stranding factors are only defined for 1 to 5 layers",
        )),
    }
}

/// A layer of identical strands of one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandGroup {
    pub strand_count: u32,
    /// m
    pub strand_diameter: f64,
    /// 1..=5
    pub layer_count: u32,
    /// Diameter of whatever this group is wound on, m (0 for a core)
    #[serde(default)]
    pub inner_diameter: f64,
    pub material: Material,
    pub initial_curve: StressStrainCurve,
    /// Slope of the unloading branch, Pa
    pub final_modulus: f64,
    /// Temperature the stress-strain curve was measured at, °C
    pub reference_temperature: f64,
}

impl StrandGroup {
    pub fn validate(&self) -> CalcResult<()> {
        if self.strand_count == 0 {
            return Err(CalcError::invalid_input(
                "strand_count",
                "0",
                "A strand group needs at least one strand",
            ));
        }
        stranding_factor(self.layer_count)?;
        require_positive("strand_diameter", self.strand_diameter)?;
        if !(self.inner_diameter.is_finite() && self.inner_diameter >= 0.0) {
            return Err(CalcError::invalid_input(
                "inner_diameter",
                self.inner_diameter.to_string(),
                "Inner diameter must be finite and non-negative",
            ));
        }
        require_positive("final_modulus", self.final_modulus)?;
        require_finite("reference_temperature", self.reference_temperature)?;
        self.material.validate()
    }

    /// Outside diameter of the group, m
    pub fn outer_diameter(&self) -> f64 {
        let layers = 2.0 * self.layer_count as f64;
        if self.inner_diameter > 0.0 {
            self.inner_diameter + layers * self.strand_diameter
        } else {
            (layers + 1.0) * self.strand_diameter
        }
    }

    /// Cross-section of one strand, m²
    pub fn strand_area(&self) -> f64 {
        std::f64::consts::PI * self.strand_diameter * self.strand_diameter / 4.0
    }

    /// Metallic cross-section of the group, m²
    pub fn area(&self) -> f64 {
        self.strand_count as f64 * self.strand_area()
    }

    /// Weight per unit length, N/m
    pub fn weight(&self) -> f64 {
        self.area() * self.material.unit_weight()
    }

    /// Rated tensile strength of the group, N
    pub fn rated_strength(&self) -> CalcResult<f64> {
        Ok(self.area() * self.material.tensile_strength * stranding_factor(self.layer_count)?)
    }

    /// Largest strain the initial curve is valid for, percent
    pub fn max_strain(&self) -> f64 {
        self.initial_curve.max_strain()
    }
}
