//! # Catenary
//!
//! A cable hanging on a [`Span`] under its own weight. The only free
//! mechanical variable is the horizontal tension; sag, length, clearance,
//! average tension and the rest are views computed from it.
//!
//! Writing one of those views is an explicit `set_by_*` call that runs the
//! matching inverse solver from [`crate::calculator`] and stores the
//! resulting tension. The call returns the [`Solution`] so the caller can see
//! whether the solve converged or fell back to the analytic guess.
//!
//! The lowest point of the curve relative to the start support is cached and
//! recomputed by every mutator.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::catenary::Catenary;
//! use catenary_core::geometry::{Span, Vector2};
//! use catenary_core::numerics::DEFAULT_SAG_TOLERANCE;
//!
//! let span = Span::new(Vector2::new(0.0, 100.0), Vector2::new(1400.0, -10.0)).unwrap();
//! let mut catenary = Catenary::new(span, 0.75, 5000.0).unwrap();
//!
//! let solution = catenary.set_by_maximum_sag(65.0, DEFAULT_SAG_TOLERANCE).unwrap();
//! assert!(solution.converged);
//! assert!((catenary.maximum_sag() - 65.0).abs() < 1e-3);
//! ```

use crate::calculator;
use crate::errors::{require_finite, require_positive, CalcError, CalcResult};
use crate::geometry::{Span, Vector2};
use crate::numerics::Solution;
use crate::units::{Rescale, UnitConversion};

/// A cable of uniform weight strung between two supports.
///
/// Invariant: `weight` and `horizontal_tension` are finite and positive, and
/// `relative_center` always matches the current span, weight and tension.
#[derive(Debug, Clone, PartialEq)]
pub struct Catenary {
    span: Span,
    weight: f64,
    horizontal_tension: f64,
    relative_center: Vector2,
}

impl Catenary {
    /// Create a catenary from its span, unit weight and horizontal tension
    pub fn new(span: Span, weight: f64, horizontal_tension: f64) -> CalcResult<Self> {
        require_positive("weight", weight)?;
        require_positive("horizontal_tension", horizontal_tension)?;
        let relative_center = calculator::center_position(span.step(), weight, horizontal_tension);
        Ok(Catenary {
            span,
            weight,
            horizontal_tension,
            relative_center,
        })
    }

    fn recompute(&mut self) {
        self.relative_center =
            calculator::center_position(self.span.step(), self.weight, self.horizontal_tension);
    }

    fn apply(&mut self, solution: Solution) -> CalcResult<Solution> {
        if !(solution.value.is_finite() && solution.value > 0.0) {
            return Err(CalcError::calculation_failed(
                "horizontal tension",
                format!("solver produced unusable tension {}", solution.value),
            ));
        }
        self.horizontal_tension = solution.value;
        self.recompute();
        Ok(solution)
    }

    // =========================================================================
    // Stored state
    // =========================================================================

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn start_position(&self) -> Vector2 {
        self.span.start_position()
    }

    pub fn step(&self) -> Vector2 {
        self.span.step()
    }

    pub fn end_position(&self) -> Vector2 {
        self.span.end_position()
    }

    /// Cable weight per unit length
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn horizontal_tension(&self) -> f64 {
        self.horizontal_tension
    }

    /// Lowest point of the full curve relative to the start support
    pub fn relative_center(&self) -> Vector2 {
        self.relative_center
    }

    /// Replace the whole span geometry
    pub fn set_span(&mut self, span: Span) {
        self.span = span;
        self.recompute();
    }

    pub fn set_start_position(&mut self, start_position: Vector2) -> CalcResult<()> {
        self.span.set_start_position(start_position)?;
        self.recompute();
        Ok(())
    }

    pub fn set_step_x(&mut self, step_x: f64) -> CalcResult<()> {
        self.span.set_step_x(step_x)?;
        self.recompute();
        Ok(())
    }

    pub fn set_step_y(&mut self, step_y: f64) -> CalcResult<()> {
        self.span.set_step_y(step_y)?;
        self.recompute();
        Ok(())
    }

    pub fn set_weight(&mut self, weight: f64) -> CalcResult<()> {
        self.weight = require_positive("weight", weight)?;
        self.recompute();
        Ok(())
    }

    pub fn set_horizontal_tension(&mut self, horizontal_tension: f64) -> CalcResult<()> {
        self.horizontal_tension = require_positive("horizontal_tension", horizontal_tension)?;
        self.recompute();
        Ok(())
    }

    // =========================================================================
    // Closed-form setters
    // =========================================================================

    /// Set the tension from the catenary constant `a = H / w`
    pub fn set_by_catenary_constant(&mut self, catenary_constant: f64) -> CalcResult<()> {
        require_positive("catenary_constant", catenary_constant)?;
        self.set_horizontal_tension(catenary_constant * self.weight)
    }

    /// Set the tension from `η = w·Sx / (2H)`
    pub fn set_by_eta(&mut self, eta: f64) -> CalcResult<()> {
        require_positive("eta", eta)?;
        self.set_horizontal_tension(self.weight * self.span.step_x() / (2.0 * eta))
    }

    // =========================================================================
    // Solving setters
    // =========================================================================

    pub fn set_by_maximum_sag(&mut self, sag: f64, tolerance: f64) -> CalcResult<Solution> {
        let solution = calculator::set_maximum_sag(self.step(), self.weight, sag, tolerance)?;
        self.apply(solution)
    }

    pub fn set_by_total_length(&mut self, length: f64, tolerance: f64) -> CalcResult<Solution> {
        let solution = calculator::set_total_length(self.step(), self.weight, length, tolerance)?;
        self.apply(solution)
    }

    /// `tolerance` is relative to `average`
    pub fn set_by_average_tension(&mut self, average: f64, tolerance: f64) -> CalcResult<Solution> {
        let solution = calculator::set_average_tension(self.step(), self.weight, average, tolerance)?;
        self.apply(solution)
    }

    /// Sag `sag` at horizontal offset `x` from the start support
    pub fn set_by_sag_at_x(&mut self, sag: f64, x: f64, tolerance: f64) -> CalcResult<Solution> {
        let solution = calculator::set_sag_at_x(self.step(), self.weight, sag, x, tolerance)?;
        self.apply(solution)
    }

    /// Put the lowest point of the cable at absolute elevation `clearance`
    pub fn set_by_clearance(&mut self, clearance: f64, tolerance: f64) -> CalcResult<Solution> {
        let solution = calculator::set_clearance(
            self.start_position(),
            self.step(),
            self.weight,
            clearance,
            tolerance,
        )?;
        self.apply(solution)
    }

    /// Make the cable pass through the absolute position `point`.
    ///
    /// The point must lie strictly between the supports and below the chord.
    pub fn set_clearance_point(&mut self, point: Vector2, tolerance: f64) -> CalcResult<Solution> {
        require_finite("point_x", point.x())?;
        require_finite("point_y", point.y())?;
        let relative = point - self.start_position();
        let sag = self.span.chord_y_at_x(relative.x()) - relative.y();
        if !(sag > 0.0) {
            return Err(CalcError::invalid_input(
                "point",
                point.to_string(),
                "Point must lie below the chord between the supports",
            ));
        }
        self.set_by_sag_at_x(sag, relative.x(), tolerance)
    }

    /// Set the tension giving `100·(L/chord − 1)` equal to `strain_pct`
    pub fn set_by_geometric_strain_pct(&mut self, strain_pct: f64, tolerance: f64) -> CalcResult<Solution> {
        require_positive("geometric_strain_pct", strain_pct)?;
        let length = self.span.diagonal() * (1.0 + strain_pct / 100.0);
        self.set_by_total_length(length, tolerance)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn catenary_constant(&self) -> f64 {
        calculator::catenary_constant(self.weight, self.horizontal_tension)
    }

    pub fn eta(&self) -> f64 {
        calculator::eta(self.step(), self.weight, self.horizontal_tension)
    }

    pub fn maximum_sag(&self) -> f64 {
        calculator::maximum_sag(self.step(), self.relative_center, self.weight, self.horizontal_tension)
    }

    /// Horizontal offset of the maximum sag from the start support
    pub fn maximum_sag_x(&self) -> f64 {
        calculator::maximum_sag_x(self.step(), self.relative_center, self.weight, self.horizontal_tension)
    }

    pub fn mid_sag(&self) -> f64 {
        calculator::mid_sag(self.step(), self.relative_center, self.weight, self.horizontal_tension)
    }

    /// Vertical sag at horizontal offset `x` from the start support
    pub fn sag_at_x(&self, x: f64) -> f64 {
        calculator::sag_at_x(self.step(), self.relative_center, self.weight, self.horizontal_tension, x)
    }

    pub fn total_length(&self) -> f64 {
        calculator::total_length(self.step(), self.relative_center, self.weight, self.horizontal_tension)
    }

    /// Arc length from the start support to horizontal offset `x`
    pub fn length_segment_at_x(&self, x: f64) -> f64 {
        calculator::length_segment_at_x(self.relative_center, self.weight, self.horizontal_tension, x)
    }

    /// Absolute cable position at horizontal offset `x`
    pub fn position_at_x(&self, x: f64) -> Vector2 {
        self.start_position()
            + calculator::position_at_x(self.relative_center, self.weight, self.horizontal_tension, x)
    }

    /// Absolute cable position at arc-length fraction `t` in `[0, 1]`
    pub fn position_at_t(&self, t: f64) -> Vector2 {
        self.start_position()
            + calculator::position_at_t(self.step(), self.relative_center, self.weight, self.horizontal_tension, t)
    }

    pub fn vertical_tension_at_x(&self, x: f64) -> f64 {
        calculator::vertical_tension_at_x(self.relative_center, self.weight, self.horizontal_tension, x)
    }

    pub fn total_tension_at_x(&self, x: f64) -> f64 {
        calculator::total_tension_at_x(self.relative_center, self.weight, self.horizontal_tension, x)
    }

    /// Total tension at the start support
    pub fn start_tension(&self) -> f64 {
        self.total_tension_at_x(0.0)
    }

    /// Total tension at the end support
    pub fn end_tension(&self) -> f64 {
        self.total_tension_at_x(self.span.step_x())
    }

    /// Largest total tension, always at one of the supports
    pub fn max_tension(&self) -> f64 {
        self.start_tension().max(self.end_tension())
    }

    pub fn average_tension(&self) -> f64 {
        calculator::average_tension(self.step(), self.relative_center, self.weight, self.horizontal_tension)
    }

    /// Absolute elevation of the lowest cable point between the supports
    pub fn clearance(&self) -> f64 {
        calculator::clearance(self.start_position(), self.step(), self.relative_center)
    }

    /// Absolute position of the lowest point of the full curve (may be outside the span)
    pub fn lowest_point(&self) -> Vector2 {
        self.start_position() + self.relative_center
    }

    pub fn geometric_strain_pct(&self) -> f64 {
        calculator::geometric_strain_pct(self.step(), self.total_length())
    }

    pub fn is_ok(&self) -> bool {
        self.span.is_valid()
            && self.weight.is_finite()
            && self.weight > 0.0
            && self.horizontal_tension.is_finite()
            && self.horizontal_tension > 0.0
    }

    pub fn is_center_in_span(&self) -> bool {
        calculator::is_center_in_span(self.step(), self.relative_center)
    }

    /// One support pulls the cable up: the arc length to the lowest point of
    /// the curve falls outside `[0, total_length]`.
    pub fn is_uplift_condition(&self) -> bool {
        let to_center = self.length_segment_at_x(self.relative_center.x());
        !(0.0..=self.total_length()).contains(&to_center)
    }
}

impl Rescale for Catenary {
    fn rescale(&mut self, conversion: &UnitConversion) {
        self.span.rescale(conversion);
        self.weight = conversion.force_per_length(self.weight);
        self.horizontal_tension = conversion.force(self.horizontal_tension);
        self.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerics::{
        DEFAULT_CLEARANCE_TOLERANCE, DEFAULT_LENGTH_TOLERANCE, DEFAULT_SAG_TOLERANCE, DEFAULT_TENSION_TOLERANCE,
    };

    fn reference_catenary() -> Catenary {
        let span = Span::new(Vector2::new(0.0, 100.0), Vector2::new(1400.0, -10.0)).unwrap();
        Catenary::new(span, 0.75, 5000.0).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * b.abs().max(1.0)
    }

    #[test]
    fn test_catenary_constant_form_level_span() {
        let span = Span::new(Vector2::ZERO, Vector2::new(1200.0, 0.0)).unwrap();
        let mut catenary = Catenary::new(span, 0.75, 1000.0).unwrap();
        catenary.set_by_catenary_constant(5000.0 / 0.75).unwrap();

        let a = catenary.catenary_constant();
        let eta = catenary.eta();
        assert!((a - 6666.667).abs() < 1e-3);
        assert!((eta - 0.09).abs() < 1e-12);
        assert!(close(catenary.maximum_sag(), a * (eta.cosh() - 1.0)));
        assert!(close(catenary.total_length(), 2.0 * a * eta.sinh()));
        assert!(close(catenary.max_tension(), catenary.horizontal_tension() * eta.cosh()));
        assert!(close(
            catenary.geometric_strain_pct(),
            100.0 * (2.0 * a * eta.sinh() / 1200.0 - 1.0)
        ));
    }

    #[test]
    fn test_catenary_constant_form_inclined_span() {
        let span = Span::new(Vector2::ZERO, Vector2::new(1200.0, 100.0)).unwrap();
        let catenary = Catenary::new(span, 0.75, 5000.0).unwrap();
        let a = catenary.catenary_constant();
        let eta = catenary.eta();
        let expected = (100.0f64.powi(2) + (2.0 * a * eta.sinh()).powi(2)).sqrt();
        assert!(close(catenary.total_length(), expected));
        assert!((catenary.geometric_strain_pct() - 100.0 * (expected / span.diagonal() - 1.0)).abs() < 1e-10);
    }

    #[test]
    fn test_set_by_maximum_sag() {
        let mut catenary = reference_catenary();
        let solution = catenary.set_by_maximum_sag(65.0, DEFAULT_SAG_TOLERANCE).unwrap();
        assert!(solution.converged);
        assert!((catenary.horizontal_tension() - 2835.082).abs() < 0.1);
        assert!((catenary.maximum_sag() - 65.0).abs() < 1e-3);
    }

    #[test]
    fn test_set_by_average_tension() {
        let mut catenary = reference_catenary();
        catenary.set_by_average_tension(3000.0, DEFAULT_TENSION_TOLERANCE).unwrap();
        assert!((catenary.horizontal_tension() - 2984.443).abs() < 0.1);
        assert!((catenary.average_tension() - 3000.0).abs() < 1e-3);
    }

    #[test]
    fn test_set_by_total_length() {
        let mut catenary = reference_catenary();
        catenary.set_by_total_length(1405.0, DEFAULT_LENGTH_TOLERANCE).unwrap();
        assert!((catenary.horizontal_tension() - 3601.178).abs() < 0.1);
        assert!((catenary.total_length() - 1405.0).abs() < 1e-5);
    }

    #[test]
    fn test_set_by_clearance_and_point() {
        let mut catenary = reference_catenary();
        catenary.set_by_clearance(64.0, DEFAULT_CLEARANCE_TOLERANCE).unwrap();
        assert!((catenary.horizontal_tension() - 5970.4).abs() < 0.1);
        assert!((catenary.clearance() - 64.0).abs() < 1e-3);

        catenary
            .set_clearance_point(Vector2::new(300.0, 60.0), DEFAULT_SAG_TOLERANCE)
            .unwrap();
        assert!((catenary.horizontal_tension() - 3278.9).abs() < 0.1);
        assert!((catenary.position_at_x(300.0).y() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_clearance_point_above_chord_rejected() {
        let mut catenary = reference_catenary();
        let before = catenary.clone();
        assert!(catenary.set_clearance_point(Vector2::new(300.0, 99.0), 1e-4).is_err());
        assert!(catenary.set_clearance_point(Vector2::new(1500.0, 0.0), 1e-4).is_err());
        assert_eq!(catenary, before);
    }

    #[test]
    fn test_invalid_setters_leave_state() {
        let mut catenary = reference_catenary();
        let before = catenary.clone();
        assert!(catenary.set_weight(0.0).is_err());
        assert!(catenary.set_horizontal_tension(f64::NAN).is_err());
        assert!(catenary.set_by_total_length(1000.0, 1e-6).is_err());
        assert!(catenary.set_by_maximum_sag(-1.0, 1e-4).is_err());
        assert!(catenary.set_by_clearance(95.0, 1e-4).is_err());
        assert!(catenary.set_step_x(-3.0).is_err());
        assert!(catenary.set_by_eta(0.0).is_err());
        assert_eq!(catenary, before);
        assert!(catenary.is_ok());
    }

    #[test]
    fn test_eta_and_strain_setters() {
        let mut catenary = reference_catenary();
        catenary.set_by_eta(0.25).unwrap();
        assert!((catenary.eta() - 0.25).abs() < 1e-12);
        assert!((catenary.horizontal_tension() - 2100.0).abs() < 1e-9);

        catenary.set_by_geometric_strain_pct(0.2, 1e-9).unwrap();
        assert!((catenary.geometric_strain_pct() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_positions_are_absolute() {
        let catenary = reference_catenary();
        assert_eq!(catenary.position_at_x(0.0), Vector2::new(0.0, 100.0));
        assert!((catenary.position_at_t(1.0).y() - 90.0).abs() < 1e-9);
        assert!((catenary.lowest_point().y() - catenary.clearance()).abs() < 1e-9);
        assert!(catenary.is_center_in_span());
        assert!(!catenary.is_uplift_condition());
    }

    #[test]
    fn test_uplift_detection() {
        let span = Span::new(Vector2::ZERO, Vector2::new(300.0, 120.0)).unwrap();
        let catenary = Catenary::new(span, 0.75, 8000.0).unwrap();
        assert!(!catenary.is_center_in_span());
        assert!(catenary.is_uplift_condition());
        assert!(catenary.start_tension() < catenary.end_tension());
        assert_eq!(catenary.max_tension(), catenary.end_tension());
    }

    #[test]
    fn test_mutators_refresh_center() {
        let mut catenary = reference_catenary();
        let before = catenary.relative_center();
        catenary.set_step_y(40.0).unwrap();
        assert_ne!(catenary.relative_center(), before);
        assert!((catenary.position_at_x(1400.0).y() - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_rescale() {
        let mut catenary = reference_catenary();
        let sag = catenary.maximum_sag();
        catenary.rescale(&UnitConversion::new(2.0, 3.0).unwrap());
        assert_eq!(catenary.step(), Vector2::new(2800.0, -20.0));
        assert!((catenary.weight() - 1.125).abs() < 1e-12);
        assert!((catenary.horizontal_tension() - 15000.0).abs() < 1e-9);
        // Pure rescaling keeps the shape: sag scales with length
        assert!((catenary.maximum_sag() - 2.0 * sag).abs() < 1e-9);
    }
}
