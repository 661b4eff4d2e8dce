//! # Stress Groups
//!
//! A [`StrandGroup`] together with its loading history.
//!
//! The history is a ratchet: `common_tension` records the highest tension
//! the group has carried and only ever rises. Below that tension a group in
//! the `Final` or `Creep` condition unloads along a straight line of slope
//! `final_modulus` anchored where the initial curve reaches the ratchet
//! tension, so a stretched conductor does not recover its original length.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::conductor::{Conductor, MaterialLibrary, StressGroup};
//! use catenary_core::loads::Condition;
//!
//! let drake = Conductor::drake(&MaterialLibrary::standard()).unwrap();
//! let mut steel = StressGroup::new(drake.groups()[0].clone());
//!
//! let peak = steel.tension(0.4, 20.0, Condition::Initial);
//! steel.set_tension(peak);
//! assert!(steel.tension(0.2, 20.0, Condition::Final) < steel.tension(0.2, 20.0, Condition::Initial));
//! ```

use super::strand_group::StrandGroup;
use super::stress_strain::StressStrain;
use crate::errors::{require_finite, CalcResult};
use crate::loads::Condition;

/// A strand group with its tension ratchet and pre-strain
#[derive(Debug, Clone, PartialEq)]
pub struct StressGroup {
    group: StrandGroup,
    common_tension: f64,
    pre_strain: f64,
}

impl StressGroup {
    /// A group with no load history and no pre-strain
    pub fn new(group: StrandGroup) -> Self {
        StressGroup {
            group,
            common_tension: 0.0,
            pre_strain: 0.0,
        }
    }

    pub fn group(&self) -> &StrandGroup {
        &self.group
    }

    /// Highest tension carried so far, N
    pub fn common_tension(&self) -> f64 {
        self.common_tension
    }

    /// Strain offset applied before the curve, percent
    pub fn pre_strain(&self) -> f64 {
        self.pre_strain
    }

    pub fn set_pre_strain(&mut self, pre_strain: f64) -> CalcResult<()> {
        self.pre_strain = require_finite("pre_strain", pre_strain)?;
        Ok(())
    }

    /// Curve strain left after thermal expansion and pre-strain are removed
    pub fn effective_strain(&self, strain: f64, temperature: f64, pre_strain: f64) -> f64 {
        let thermal = 100.0 * self.group.material.thermal_coefficient * (temperature - self.group.reference_temperature);
        strain - thermal - pre_strain
    }

    /// Tension of the group at conductor strain `strain` (percent), using the stored pre-strain
    pub fn tension(&self, strain: f64, temperature: f64, condition: Condition) -> f64 {
        self.tension_with_pre_strain(strain, temperature, self.pre_strain, condition)
    }

    /// Tension of the group at `strain` with an explicit pre-strain, floored at zero
    pub fn tension_with_pre_strain(&self, strain: f64, temperature: f64, pre_strain: f64, condition: Condition) -> f64 {
        let area = self.group.area();
        let curve = &self.group.initial_curve;
        let strain = self.effective_strain(strain, temperature, pre_strain);
        let mut tension = curve.stress_of(strain) * area;
        if condition.is_after_load() && tension < self.common_tension {
            let anchor = curve.strain_of(self.common_tension / area);
            tension = self.common_tension + self.group.final_modulus * area * (strain - anchor) / 100.0;
        }
        tension.max(0.0)
    }

    /// Raise the ratchet to `tension`; lower values are ignored
    pub fn set_tension(&mut self, tension: f64) {
        if tension > self.common_tension {
            log::debug!(
                "{} common tension {:.1} -> {:.1}",
                self.group.material.name,
                self.common_tension,
                tension
            );
            self.common_tension = tension;
        }
    }

    /// Raise the ratchet to the initial-curve tension at `strain` and `temperature`
    pub fn set_tension_at(&mut self, strain: f64, temperature: f64) {
        let tension = self.tension(strain, temperature, Condition::Initial);
        self.set_tension(tension);
    }

    /// Forget the load history
    pub fn reset_history(&mut self) {
        self.common_tension = 0.0;
    }
}
