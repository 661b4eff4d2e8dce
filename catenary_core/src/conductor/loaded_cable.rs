//! # Loaded Cable
//!
//! A conductor strung on one span, with the solver that reconciles the
//! conductor's stress-strain state with catenary mechanics.
//!
//! ## Equilibrium
//!
//! For a loading condition the cable length `L` must satisfy
//!
//! ```text
//! P(L) = material(100·(L/chord − 1)) − mechanical(L) = 0
//! ```
//!
//! where `material` sums the layer tensions at that strain and temperature
//! and `mechanical` is the average tension of a catenary of length `L` under
//! the loaded unit weight (itself an inverse solve over horizontal tension).
//! `P` is `−∞` for `L ≤ chord` and is bisected over `[0, 2·chord]`.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::conductor::{Conductor, LoadedCable, MaterialLibrary};
//! use catenary_core::geometry::{Span, Vector2};
//! use catenary_core::loads::{Condition, DesignCondition, LoadLimit, LoadingCondition};
//!
//! let drake = Conductor::drake(&MaterialLibrary::standard()).unwrap();
//! let span = Span::new(Vector2::ZERO, Vector2::new(400.0, 10.0)).unwrap();
//! let mut cable = LoadedCable::new(span, &drake);
//!
//! let design = DesignCondition::new(
//!     LoadingCondition::new("Stringing", 15.0),
//!     LoadLimit::HorizontalTension(22_000.0),
//!     Condition::Initial,
//! );
//! cable.find_pre_strain(&design).unwrap();
//! let catenary = cable.catenary_at_loading(&design.loading, Condition::Initial).unwrap();
//! assert!((catenary.horizontal_tension() - 22_000.0).abs() < 1.0);
//! ```

use crate::calculator;
use crate::catenary::Catenary;
use crate::errors::{CalcError, CalcResult};
use crate::geometry::Span;
use crate::loads::{Condition, DesignCondition, LoadLimit, LoadingCondition};
use crate::numerics::{Bisection, Solution, SolverTolerances};
use crate::units::UnitSystem;

use super::stress_group::StressGroup;
use super::Conductor;

/// A conductor on a span, carrying its own load history
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCable {
    span: Span,
    conductor: Conductor,
    layers: Vec<StressGroup>,
    ice_unit_weight: f64,
    tolerances: SolverTolerances,
}

impl LoadedCable {
    /// A fresh cable (no history, no pre-strain) of `conductor` on `span`
    pub fn new(span: Span, conductor: &Conductor) -> Self {
        LoadedCable {
            span,
            conductor: conductor.clone(),
            layers: conductor.groups().iter().cloned().map(StressGroup::new).collect(),
            ice_unit_weight: UnitSystem::Metric.ice_unit_weight(),
            tolerances: SolverTolerances::default(),
        }
    }

    pub fn with_tolerances(mut self, tolerances: SolverTolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn conductor(&self) -> &Conductor {
        &self.conductor
    }

    pub fn layers(&self) -> &[StressGroup] {
        &self.layers
    }

    /// Common pre-strain of the layers (percent)
    pub fn pre_strain(&self) -> f64 {
        self.layers.first().map(StressGroup::pre_strain).unwrap_or(0.0)
    }

    /// Resultant unit load under `loading`, N/m
    pub fn loaded_weight(&self, loading: &LoadingCondition) -> f64 {
        loading.weight(
            self.conductor.weight(),
            self.conductor.outer_diameter(),
            self.ice_unit_weight,
        )
    }

    /// Sum of the layer tensions at conductor strain `strain` (percent)
    pub fn material_tension(&self, strain: f64, temperature: f64, condition: Condition) -> f64 {
        self.layers
            .iter()
            .map(|layer| layer.tension(strain, temperature, condition))
            .sum()
    }

    /// Average tension of a catenary of length `length` under `weight`;
    /// NaN when no such catenary exists
    fn mechanical_tension(&self, weight: f64, length: f64) -> f64 {
        let step = self.span.step();
        match calculator::set_total_length(step, weight, length, self.tolerances.length) {
            Ok(solution) => {
                let center = calculator::center_position(step, weight, solution.value);
                calculator::average_tension(step, center, weight, solution.value)
            }
            Err(_) => f64::NAN,
        }
    }

    /// Cable length at which material and mechanical tension agree
    pub fn length_at_loading(&self, loading: &LoadingCondition, condition: Condition) -> CalcResult<Solution> {
        loading.validate()?;
        let weight = self.loaded_weight(loading);
        let step = self.span.step();
        let chord = self.span.diagonal();
        let imbalance = |length: f64| {
            if length <= chord {
                return f64::NEG_INFINITY;
            }
            let strain = calculator::geometric_strain_pct(step, length);
            self.material_tension(strain, loading.temperature, condition) - self.mechanical_tension(weight, length)
        };

        let solution = Bisection::new(0.0, 2.0 * chord)
            .tolerance(self.tolerances.equilibrium)
            .max_iterations(self.tolerances.max_iterations)
            .solve(imbalance, 0.0)
            .ok_or_else(|| {
                CalcError::calculation_failed(
                    "cable length",
                    format!(
                        "no length in (0, {}] balances conductor and catenary tension for '{}'",
                        2.0 * chord,
                        loading.label
                    ),
                )
            })?;
        if !solution.converged {
            log::warn!(
                "length equilibrium for '{}' ({}) stopped after {} iterations at L = {}",
                loading.label,
                condition,
                solution.iterations,
                solution.value
            );
        }
        log::debug!(
            "'{}' ({}): L = {:.6} after {} iterations",
            loading.label,
            condition,
            solution.value,
            solution.iterations
        );
        Ok(solution)
    }

    /// Catenary of length `length` under `weight` on this span
    fn catenary_with_length(&self, weight: f64, length: f64) -> CalcResult<Catenary> {
        let mut catenary = Catenary::new(self.span, weight, weight * self.span.step_x())?;
        let solution = catenary.set_by_total_length(length, self.tolerances.length)?;
        if !solution.converged {
            log::warn!("catenary for length {length} kept its initial tension estimate");
        }
        Ok(catenary)
    }

    /// Equilibrium catenary under `loading` in the given cable state
    pub fn catenary_at_loading(&self, loading: &LoadingCondition, condition: Condition) -> CalcResult<Catenary> {
        let length = self.length_at_loading(loading, condition)?;
        self.catenary_with_length(self.loaded_weight(loading), length.value)
    }

    /// The catenary the design limit prescribes under the design loading
    pub fn design_catenary(&self, design: &DesignCondition) -> CalcResult<Catenary> {
        design.validate()?;
        let weight = self.loaded_weight(&design.loading);
        let mut catenary = Catenary::new(self.span, weight, weight * self.span.step_x())?;
        match design.limit {
            LoadLimit::MaximumSag(sag) => {
                let solution = catenary.set_by_maximum_sag(sag, self.tolerances.sag)?;
                if !solution.converged {
                    log::warn!("design sag {sag} not matched; using tension estimate {}", solution.value);
                }
            }
            LoadLimit::RatedStrengthFraction(fraction) => {
                catenary.set_horizontal_tension(fraction * self.conductor.rated_strength()?)?;
            }
            LoadLimit::HorizontalTension(tension) => {
                catenary.set_horizontal_tension(tension)?;
            }
        }
        Ok(catenary)
    }

    /// Find and store the pre-strain for which the conductor reproduces the
    /// design catenary's average tension at its strain and temperature.
    ///
    /// The search runs over strain, from fully slack (design strain plus one
    /// percent) down to past the largest fitted strain of any layer.
    pub fn find_pre_strain(&mut self, design: &DesignCondition) -> CalcResult<Solution> {
        let catenary = self.design_catenary(design)?;
        let target = catenary.average_tension();
        let strain = catenary.geometric_strain_pct();
        let temperature = design.loading.temperature;
        let condition = design.condition;
        let max_strain = self.conductor.max_strain();

        let layers = &self.layers;
        let total = |pre_strain: f64| -> f64 {
            layers
                .iter()
                .map(|layer| layer.tension_with_pre_strain(strain, temperature, pre_strain, condition))
                .sum()
        };
        let solution = Bisection::new(strain - max_strain - 1.0, strain + 1.0)
            .tolerance(self.tolerances.equilibrium)
            .max_iterations(self.tolerances.max_iterations)
            .solve(total, target)
            .ok_or_else(|| {
                log::warn!("pre-strain search could not bracket design tension {target}");
                CalcError::calculation_failed(
                    "pre-strain",
                    format!("conductor cannot carry the design average tension {target} at {strain}% strain"),
                )
            })?;

        for layer in &mut self.layers {
            layer.set_pre_strain(solution.value)?;
        }
        log::info!(
            "pre-strain {:.5}% reproduces design average tension {:.1} (strain {:.5}%)",
            solution.value,
            target,
            strain
        );
        Ok(solution)
    }

    /// Load the cable to `loading` on its initial curve and raise every
    /// layer's ratchet to the tension it carries there
    pub fn ratchet_at(&mut self, loading: &LoadingCondition) -> CalcResult<Catenary> {
        let length = self.length_at_loading(loading, Condition::Initial)?;
        let strain = calculator::geometric_strain_pct(self.span.step(), length.value);
        for layer in &mut self.layers {
            layer.set_tension_at(strain, loading.temperature);
        }
        self.catenary_with_length(self.loaded_weight(loading), length.value)
    }

    /// Apply the design load and return the loaded catenary
    pub fn load_with(&mut self, design: &DesignCondition) -> CalcResult<Catenary> {
        design.validate()?;
        let catenary = self.ratchet_at(&design.loading)?;
        log::info!(
            "applied '{}': H = {:.1}, sag = {:.3}",
            design.loading.label,
            catenary.horizontal_tension(),
            catenary.maximum_sag()
        );
        Ok(catenary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conductor::MaterialLibrary;
    use crate::geometry::Vector2;

    fn drake_cable() -> LoadedCable {
        let drake = Conductor::drake(&MaterialLibrary::standard()).unwrap();
        let span = Span::new(Vector2::ZERO, Vector2::new(400.0, 10.0)).unwrap();
        LoadedCable::new(span, &drake)
    }

    fn design() -> DesignCondition {
        DesignCondition::new(
            LoadingCondition::new("Stringing", 15.0),
            LoadLimit::HorizontalTension(22_000.0),
            Condition::Initial,
        )
    }

    fn heavy() -> LoadingCondition {
        LoadingCondition::new("Heavy", -20.0)
            .with_ice(0.0125)
            .with_wind(190.0)
            .with_constant(4.40)
    }

    #[test]
    fn test_pre_strain_reproduces_design() {
        let mut cable = drake_cable();
        let design = design();
        let solution = cable.find_pre_strain(&design).unwrap();
        assert!(solution.converged);
        assert!((solution.value - 0.2458).abs() < 2e-3);
        assert!(cable.layers().iter().all(|l| l.pre_strain() == solution.value));

        let design_catenary = cable.design_catenary(&design).unwrap();
        let strain = design_catenary.geometric_strain_pct();
        let material = cable.material_tension(strain, 15.0, Condition::Initial);
        assert!((material - design_catenary.average_tension()).abs() < 1e-3);
    }

    #[test]
    fn test_pre_strain_across_stringing_tensions() {
        let expected = [(12_000.0, 1.08728), (18_000.0, 0.42947), (22_000.0, 0.24577)];
        let mut previous = f64::INFINITY;
        for (tension, pre_strain) in expected {
            let mut cable = drake_cable();
            let design = DesignCondition::new(
                LoadingCondition::new("Stringing", 15.0),
                LoadLimit::HorizontalTension(tension),
                Condition::Initial,
            );
            let solution = cable.find_pre_strain(&design).unwrap();
            assert!(solution.converged);
            assert!((solution.value - pre_strain).abs() < 2e-3);
            assert!(solution.value < previous);
            previous = solution.value;

            let catenary = cable.catenary_at_loading(&design.loading, Condition::Initial).unwrap();
            assert!((catenary.horizontal_tension() - tension).abs() < 1.0);
        }
    }

    #[test]
    fn test_slack_end_of_pre_strain_search_carries_nothing() {
        let cable = drake_cable();
        for layer in cable.layers() {
            assert_eq!(layer.tension_with_pre_strain(0.5, 15.0, 1.5, Condition::Initial), 0.0);
        }
    }

    #[test]
    fn test_equilibrium_at_design_temperature() {
        let mut cable = drake_cable();
        cable.find_pre_strain(&design()).unwrap();
        let length = cable.length_at_loading(&design().loading, Condition::Initial).unwrap();
        assert!(length.converged);
        assert!((length.value - 401.4777).abs() < 1e-3);
        let catenary = cable.catenary_at_loading(&design().loading, Condition::Initial).unwrap();
        assert!((catenary.horizontal_tension() - 22_000.0).abs() < 0.5);
    }

    #[test]
    fn test_temperature_response() {
        let mut cable = drake_cable();
        cable.find_pre_strain(&design()).unwrap();
        let cold = cable
            .catenary_at_loading(&LoadingCondition::new("Cold", -20.0), Condition::Initial)
            .unwrap();
        let hot = cable
            .catenary_at_loading(&LoadingCondition::new("Hot", 50.0), Condition::Initial)
            .unwrap();
        assert!(cold.horizontal_tension() > 22_000.0);
        assert!(hot.horizontal_tension() < 22_000.0);
        assert!(hot.maximum_sag() > cold.maximum_sag());
        assert!((cold.horizontal_tension() - 23_872.6).abs() < 5.0);
        assert!((hot.horizontal_tension() - 20_458.2).abs() < 5.0);
    }

    #[test]
    fn test_load_with_ratchets_and_creeps() {
        let mut cable = drake_cable();
        cable.find_pre_strain(&design()).unwrap();
        let initial = cable.catenary_at_loading(&design().loading, Condition::Initial).unwrap();

        let heavy_design = DesignCondition::new(heavy(), LoadLimit::RatedStrengthFraction(0.5), Condition::Initial);
        let loaded = cable.load_with(&heavy_design).unwrap();
        assert!((loaded.horizontal_tension() - 46_910.1).abs() < 10.0);
        assert!(cable.layers().iter().all(|l| l.common_tension() > 0.0));

        let final_ = cable.catenary_at_loading(&design().loading, Condition::Final).unwrap();
        assert!(final_.maximum_sag() > initial.maximum_sag());
        assert!(final_.horizontal_tension() < initial.horizontal_tension());
        assert!((final_.horizontal_tension() - 20_468.8).abs() < 5.0);
    }

    #[test]
    fn test_ratchet_never_lowers() {
        let mut cable = drake_cable();
        cable.find_pre_strain(&design()).unwrap();
        cable.ratchet_at(&heavy()).unwrap();
        let peaks: Vec<f64> = cable.layers().iter().map(StressGroup::common_tension).collect();
        cable.ratchet_at(&LoadingCondition::new("Hot", 50.0)).unwrap();
        let after: Vec<f64> = cable.layers().iter().map(StressGroup::common_tension).collect();
        assert_eq!(peaks, after);
    }

    #[test]
    fn test_design_limits() {
        let cable = drake_cable();
        let rts = cable.conductor().rated_strength().unwrap();
        let by_fraction = DesignCondition::new(
            LoadingCondition::new("Stringing", 15.0),
            LoadLimit::RatedStrengthFraction(0.2),
            Condition::Initial,
        );
        let catenary = cable.design_catenary(&by_fraction).unwrap();
        assert!((catenary.horizontal_tension() - 0.2 * rts).abs() < 1e-6);

        let by_sag = DesignCondition::new(
            LoadingCondition::new("Stringing", 15.0),
            LoadLimit::MaximumSag(12.0),
            Condition::Initial,
        );
        let catenary = cable.design_catenary(&by_sag).unwrap();
        assert!((catenary.maximum_sag() - 12.0).abs() < 1e-3);

        let invalid = DesignCondition::new(
            LoadingCondition::new("Stringing", 15.0),
            LoadLimit::MaximumSag(-1.0),
            Condition::Initial,
        );
        assert!(cable.design_catenary(&invalid).is_err());
    }

    #[test]
    fn test_invalid_loading_rejected() {
        let cable = drake_cable();
        let bad = LoadingCondition::new("Bad", 15.0).with_wind(-5.0);
        assert!(cable.length_at_loading(&bad, Condition::Initial).is_err());
    }
}
