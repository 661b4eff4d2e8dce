//! # Root Finding
//!
//! A bracketed bisection shared by every inverse solver in the crate, plus the
//! solver tolerance configuration.
//!
//! Every inverse solve works the same way: a closed-form initial guess from
//! the parabolic approximation, a bracket grown geometrically around that
//! guess, and bisection on the forward function. When no bracket can be
//! found the guess itself is returned with `converged == false`.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::numerics::Bisection;
//!
//! let root = Bisection::new(0.0, 2.0)
//!     .tolerance(1e-12)
//!     .solve(|x| x * x, 2.0)
//!     .unwrap();
//! assert!(root.converged);
//! assert!((root.value - 2f64.sqrt()).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// Default relative tolerance when solving for average tension
pub const DEFAULT_TENSION_TOLERANCE: f64 = 1e-8;
/// Default absolute tolerance when solving for a sag
pub const DEFAULT_SAG_TOLERANCE: f64 = 1e-4;
/// Default absolute tolerance when solving for a cable length
pub const DEFAULT_LENGTH_TOLERANCE: f64 = 1e-6;
/// Default absolute tolerance when solving for a clearance
pub const DEFAULT_CLEARANCE_TOLERANCE: f64 = 1e-4;
/// Default tolerance of the length/tension equilibrium of a loaded cable
pub const DEFAULT_EQUILIBRIUM_TOLERANCE: f64 = 1e-5;
/// Iteration cap of a single bisection
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// How many times a bracket may double before the search gives up
const MAX_BRACKET_EXPANSIONS: usize = 40;

/// Outcome of a numeric solve.
///
/// `converged == false` means `value` is the unrefined initial guess and the
/// forward function was never matched to the requested tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Solved (or fallback) value
    pub value: f64,
    /// Whether the bisection met its tolerance
    pub converged: bool,
    /// Number of bisection steps taken
    pub iterations: usize,
}

impl Solution {
    /// A solution that is exact by construction (closed-form setters)
    pub fn exact(value: f64) -> Self {
        Solution {
            value,
            converged: true,
            iterations: 0,
        }
    }

    /// An unrefined fallback value
    pub fn fallback(value: f64) -> Self {
        Solution {
            value,
            converged: false,
            iterations: 0,
        }
    }
}

/// Bisection over a closed bracket `[lower, upper]`.
#[derive(Debug, Clone, Copy)]
pub struct Bisection {
    lower: f64,
    upper: f64,
    tolerance: f64,
    max_iterations: usize,
}

impl Bisection {
    /// Create a bisection over `[lower, upper]` (bounds may come in any order)
    pub fn new(lower: f64, upper: f64) -> Self {
        Bisection {
            lower: lower.min(upper),
            upper: lower.max(upper),
            tolerance: 0.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Absolute tolerance on `|f(x) - target|`
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    /// Maximum number of halvings
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Find `x` in the bracket with `f(x) == target`.
    ///
    /// Returns `None` when the bracket does not straddle the target. A bracket
    /// that collapses to floating-point resolution counts as converged.
    pub fn solve<F>(&self, f: F, target: f64) -> Option<Solution>
    where
        F: Fn(f64) -> f64,
    {
        let mut lo = self.lower;
        let mut hi = self.upper;
        let f_lo = f(lo) - target;
        let f_hi = f(hi) - target;
        if f_lo.is_nan() || f_hi.is_nan() {
            return None;
        }
        if f_lo.abs() <= self.tolerance {
            return Some(Solution { value: lo, converged: true, iterations: 0 });
        }
        if f_hi.abs() <= self.tolerance {
            return Some(Solution { value: hi, converged: true, iterations: 0 });
        }
        if f_lo.signum() == f_hi.signum() {
            return None;
        }

        let lo_negative = f_lo < 0.0;
        for iteration in 1..=self.max_iterations {
            let mid = 0.5 * (lo + hi);
            let f_mid = f(mid) - target;
            if f_mid.is_nan() {
                return None;
            }
            if f_mid.abs() <= self.tolerance {
                return Some(Solution { value: mid, converged: true, iterations: iteration });
            }
            if (f_mid < 0.0) == lo_negative {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= 4.0 * f64::EPSILON * lo.abs().max(hi.abs()).max(1.0) {
                return Some(Solution {
                    value: 0.5 * (lo + hi),
                    converged: true,
                    iterations: iteration,
                });
            }
        }
        Some(Solution {
            value: 0.5 * (lo + hi),
            converged: false,
            iterations: self.max_iterations,
        })
    }
}

/// Refine `guess` so that `f(x) == target`, growing `[guess/2, 2·guess]`
/// geometrically until it straddles the target. Bounds never fall below
/// `floor`. Falls back to `guess` when nothing can be bracketed.
pub fn refine_around<F>(
    f: F,
    target: f64,
    guess: f64,
    floor: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Solution
where
    F: Fn(f64) -> f64,
{
    let mut lower = (0.5 * guess).max(floor);
    let mut upper = (2.0 * guess).max(floor * 2.0);
    for _ in 0..MAX_BRACKET_EXPANSIONS {
        let bisection = Bisection::new(lower, upper)
            .tolerance(tolerance)
            .max_iterations(max_iterations);
        if let Some(solution) = bisection.solve(&f, target) {
            if solution.converged {
                log::debug!(
                    "bisection converged to {} in {} iterations (bracket [{}, {}])",
                    solution.value,
                    solution.iterations,
                    lower,
                    upper
                );
                return solution;
            }
            break;
        }
        lower = (0.5 * lower).max(floor);
        upper *= 2.0;
    }
    log::warn!(
        "bisection for target {} did not converge; returning initial guess {}",
        target,
        guess
    );
    Solution::fallback(guess)
}

/// Tolerances used by the inverse solvers.
///
/// `tension` is relative to the target; the others are absolute in the
/// working length/force units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverTolerances {
    /// Relative tolerance on average tension targets
    pub tension: f64,
    /// Absolute tolerance on sag targets
    pub sag: f64,
    /// Absolute tolerance on length targets
    pub length: f64,
    /// Absolute tolerance on clearance targets
    pub clearance: f64,
    /// Tolerance of the material/mechanical equilibrium
    pub equilibrium: f64,
    /// Iteration cap for every bisection
    pub max_iterations: usize,
}

impl Default for SolverTolerances {
    fn default() -> Self {
        SolverTolerances {
            tension: DEFAULT_TENSION_TOLERANCE,
            sag: DEFAULT_SAG_TOLERANCE,
            length: DEFAULT_LENGTH_TOLERANCE,
            clearance: DEFAULT_CLEARANCE_TOLERANCE,
            equilibrium: DEFAULT_EQUILIBRIUM_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}
