//! # Stress-Strain Curves
//!
//! Initial (as-strung) stress-strain behaviour of a conductor layer. Strain is
//! in percent, stress in Pa.
//!
//! Two representations share the [`StressStrain`] capability:
//!
//! - [`PolynomialCurve`]: `σ = Σ aᵢ·εⁱ` up to the tested maximum strain and
//!   linear beyond it with the end slope. Inverted by bisection.
//!
//! Strands carry no compression: every curve gives zero stress at or below
//! zero strain.
//! - [`ExponentialCurve`]: saturation curve `σ = σᵤ·(1 − e^(−Q·εᵏ))`, fit
//!   through two control points and inverted in closed form.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::conductor::{ExponentialCurve, StressStrain};
//!
//! let steel = ExponentialCurve::fit(1410e6, (0.3, 540e6), (0.6, 880e6), 0.8).unwrap();
//! assert!((steel.stress_of(0.3) - 540e6).abs() < 1.0);
//! assert!((steel.strain_of(880e6) - 0.6).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, CalcError, CalcResult};
use crate::numerics::Bisection;

/// How many times the inverse search may double its strain bracket
const MAX_STRAIN_EXPANSIONS: usize = 60;

/// Stress as a function of strain and its inverse
pub trait StressStrain {
    /// Stress at `strain` (percent)
    fn stress_of(&self, strain: f64) -> f64;

    /// Strain (percent) at which the curve reaches `stress`
    fn strain_of(&self, stress: f64) -> f64;

    /// Largest strain the curve was fit to
    fn max_strain(&self) -> f64;

    /// Stress at the largest fitted strain
    fn max_stress(&self) -> f64 {
        self.stress_of(self.max_strain())
    }
}

/// Polynomial stress-strain fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialCurve {
    /// `a0, a1, ...` in ascending powers of strain
    coefficients: Vec<f64>,
    max_strain: f64,
}

impl PolynomialCurve {
    pub fn new(coefficients: Vec<f64>, max_strain: f64) -> CalcResult<Self> {
        require_positive("max_strain", max_strain)?;
        if coefficients.is_empty() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(CalcError::invalid_input(
                "coefficients",
                format!("{coefficients:?}"),
                "Polynomial needs at least one finite coefficient",
            ));
        }
        let curve = PolynomialCurve {
            coefficients,
            max_strain,
        };
        if !(curve.slope_at(max_strain) > 0.0) {
            return Err(CalcError::invalid_input(
                "coefficients",
                format!("{:?}", curve.coefficients),
                "Curve must be rising at its maximum strain",
            ));
        }
        Ok(curve)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn evaluate(&self, strain: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * strain + c)
    }

    fn slope_at(&self, strain: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |acc, (power, c)| acc * strain + power as f64 * c)
    }
}

impl StressStrain for PolynomialCurve {
    /// Zero for compression and wherever the fit dips below zero
    fn stress_of(&self, strain: f64) -> f64 {
        if strain <= 0.0 {
            return 0.0;
        }
        let stress = if strain <= self.max_strain {
            self.evaluate(strain)
        } else {
            self.evaluate(self.max_strain) + self.slope_at(self.max_strain) * (strain - self.max_strain)
        };
        stress.max(0.0)
    }

    fn strain_of(&self, stress: f64) -> f64 {
        if stress <= self.stress_of(0.0) {
            return 0.0;
        }
        let mut upper = self.max_strain;
        for _ in 0..MAX_STRAIN_EXPANSIONS {
            if self.stress_of(upper) >= stress {
                break;
            }
            upper *= 2.0;
        }
        Bisection::new(0.0, upper)
            .solve(|strain| self.stress_of(strain), stress)
            .map(|solution| solution.value)
            .unwrap_or(upper)
    }

    fn max_strain(&self) -> f64 {
        self.max_strain
    }
}

/// Exponential saturation stress-strain curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialCurve {
    ultimate_stress: f64,
    q: f64,
    k: f64,
    max_strain: f64,
}

impl ExponentialCurve {
    pub fn new(ultimate_stress: f64, q: f64, k: f64, max_strain: f64) -> CalcResult<Self> {
        require_positive("ultimate_stress", ultimate_stress)?;
        require_positive("q", q)?;
        require_positive("k", k)?;
        require_positive("max_strain", max_strain)?;
        Ok(ExponentialCurve {
            ultimate_stress,
            q,
            k,
            max_strain,
        })
    }

    /// Fit `Q` and `k` through two `(strain %, stress)` points below `ultimate_stress`
    pub fn fit(
        ultimate_stress: f64,
        first: (f64, f64),
        second: (f64, f64),
        max_strain: f64,
    ) -> CalcResult<Self> {
        require_positive("ultimate_stress", ultimate_stress)?;
        let (e1, s1) = first;
        let (e2, s2) = second;
        let ordered = e1 > 0.0 && e2 > e1 && s1 > 0.0 && s2 > s1 && s2 < ultimate_stress;
        if !ordered {
            return Err(CalcError::invalid_input(
                "control_points",
                format!("({e1}, {s1}), ({e2}, {s2})"),
                "Control points must increase in strain and stress and stay below the ultimate stress",
            ));
        }
        let r1 = -(1.0 - s1 / ultimate_stress).ln();
        let r2 = -(1.0 - s2 / ultimate_stress).ln();
        let k = (r2 / r1).ln() / (e2 / e1).ln();
        let q = r1 / e1.powf(k);
        ExponentialCurve::new(ultimate_stress, q, k, max_strain)
    }

    pub fn ultimate_stress(&self) -> f64 {
        self.ultimate_stress
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn k(&self) -> f64 {
        self.k
    }
}

impl StressStrain for ExponentialCurve {
    fn stress_of(&self, strain: f64) -> f64 {
        if strain <= 0.0 {
            return 0.0;
        }
        self.ultimate_stress * (1.0 - (-self.q * strain.powf(self.k)).exp())
    }

    /// Infinite at or above the ultimate stress
    fn strain_of(&self, stress: f64) -> f64 {
        if stress <= 0.0 {
            return 0.0;
        }
        if stress >= self.ultimate_stress {
            return f64::INFINITY;
        }
        (-(1.0 - stress / self.ultimate_stress).ln() / self.q).powf(1.0 / self.k)
    }

    fn max_strain(&self) -> f64 {
        self.max_strain
    }
}

/// Serializable choice of curve
///
/// ```json
/// { "type": "Exponential", "ultimate_stress": 1410e6, "q": 0.61, "k": 1.16, "max_strain": 0.8 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StressStrainCurve {
    Polynomial(PolynomialCurve),
    Exponential(ExponentialCurve),
}

impl StressStrain for StressStrainCurve {
    fn stress_of(&self, strain: f64) -> f64 {
        match self {
            StressStrainCurve::Polynomial(curve) => curve.stress_of(strain),
            StressStrainCurve::Exponential(curve) => curve.stress_of(strain),
        }
    }

    fn strain_of(&self, stress: f64) -> f64 {
        match self {
            StressStrainCurve::Polynomial(curve) => curve.strain_of(stress),
            StressStrainCurve::Exponential(curve) => curve.strain_of(stress),
        }
    }

    fn max_strain(&self) -> f64 {
        match self {
            StressStrainCurve::Polynomial(curve) => curve.max_strain(),
            StressStrainCurve::Exponential(curve) => curve.max_strain(),
        }
    }
}

impl From<PolynomialCurve> for StressStrainCurve {
    fn from(curve: PolynomialCurve) -> Self {
        StressStrainCurve::Polynomial(curve)
    }
}

impl From<ExponentialCurve> for StressStrainCurve {
    fn from(curve: ExponentialCurve) -> Self {
        StressStrainCurve::Exponential(curve)
    }
}
