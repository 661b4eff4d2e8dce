//! # Geometry Primitives
//!
//! [`Vector2`] is an immutable point/offset in the vertical plane of a span,
//! rounded to 12 decimals on construction so that values produced by
//! different arithmetic paths compare equal.
//!
//! [`Span`] is the straight line between two supports: a start position and
//! a step to the end support. The step is always strictly positive in x.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::geometry::{Span, Vector2};
//!
//! let span = Span::new(Vector2::new(0.0, 100.0), Vector2::new(1400.0, -10.0)).unwrap();
//! assert_eq!(span.end_position(), Vector2::new(1400.0, 90.0));
//! ```

use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::errors::{require_finite, CalcError, CalcResult};
use crate::units::{Rescale, UnitConversion};

/// Number of decimals kept by [`Vector2`]
pub const VECTOR_PRECISION: i32 = 12;

fn round_component(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(VECTOR_PRECISION);
    let scaled = value * scale;
    // Beyond 2^53 there are no fractional digits left to round
    if scaled.abs() >= 9.007_199_254_740_992e15 {
        return value;
    }
    scaled.round() / scale
}

/// Immutable 2-D vector, x horizontal and y vertical (up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Vector2 {
    x: f64,
    y: f64,
}

impl Vector2 {
    /// The origin
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    /// Create a vector, rounding both components
    pub fn new(x: f64, y: f64) -> Self {
        Vector2 {
            x: round_component(x),
            y: round_component(y),
        }
    }

    /// Horizontal component
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical component
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Copy with a new x
    pub fn with_x(self, x: f64) -> Self {
        Vector2::new(x, self.y)
    }

    /// Copy with a new y
    pub fn with_y(self, y: f64) -> Self {
        Vector2::new(self.x, y)
    }

    /// Both components finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vector2::new(x, y)
    }
}

impl From<Vector2> for (f64, f64) {
    fn from(v: Vector2) -> Self {
        (v.x, v.y)
    }
}

impl Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Vector2::new(-self.x, -self.y)
    }
}

impl std::fmt::Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Rescale for Vector2 {
    fn rescale(&mut self, conversion: &UnitConversion) {
        *self = *self * conversion.length_factor;
    }
}

/// A straight span between two support points.
///
/// Invariant: `step.x()` is finite and strictly positive, every other
/// component is finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSpan", into = "RawSpan")]
pub struct Span {
    start_position: Vector2,
    step: Vector2,
}

/// Unvalidated serialized form of a span
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawSpan {
    start_position: Vector2,
    step: Vector2,
}

impl TryFrom<RawSpan> for Span {
    type Error = CalcError;
    fn try_from(raw: RawSpan) -> CalcResult<Self> {
        Span::new(raw.start_position, raw.step)
    }
}

impl From<Span> for RawSpan {
    fn from(span: Span) -> Self {
        RawSpan {
            start_position: span.start_position,
            step: span.step,
        }
    }
}

fn validate_step_x(step_x: f64) -> CalcResult<f64> {
    if step_x.is_finite() && step_x > 0.0 {
        Ok(step_x)
    } else {
        Err(CalcError::invalid_input(
            "step_x",
            step_x.to_string(),
            "Span width must be finite and positive",
        ))
    }
}

impl Span {
    /// Create a span from its start support and the step to the end support
    pub fn new(start_position: Vector2, step: Vector2) -> CalcResult<Self> {
        require_finite("start_x", start_position.x())?;
        require_finite("start_y", start_position.y())?;
        validate_step_x(step.x())?;
        require_finite("step_y", step.y())?;
        Ok(Span {
            start_position,
            step,
        })
    }

    /// Create a span between two absolute support positions
    pub fn between(start: Vector2, end: Vector2) -> CalcResult<Self> {
        Span::new(start, end - start)
    }

    /// Start support position
    pub fn start_position(&self) -> Vector2 {
        self.start_position
    }

    /// Offset from start to end support
    pub fn step(&self) -> Vector2 {
        self.step
    }

    /// End support position
    pub fn end_position(&self) -> Vector2 {
        self.start_position + self.step
    }

    /// Horizontal span length
    pub fn step_x(&self) -> f64 {
        self.step.x()
    }

    /// Elevation difference, end minus start
    pub fn step_y(&self) -> f64 {
        self.step.y()
    }

    /// Chord (diagonal) length between the supports
    pub fn diagonal(&self) -> f64 {
        self.step.length()
    }

    /// Chord slope `step_y / step_x`
    pub fn slope(&self) -> f64 {
        self.step.y() / self.step.x()
    }

    /// Chord elevation at horizontal offset `x` from the start, relative to the start
    pub fn chord_y_at_x(&self, x: f64) -> f64 {
        self.slope() * x
    }

    /// Always true for a constructed span; kept for parity with `Catenary::is_ok`
    pub fn is_valid(&self) -> bool {
        self.start_position.is_finite() && self.step.is_finite() && self.step.x() > 0.0
    }

    /// Move the start support
    pub fn set_start_position(&mut self, start_position: Vector2) -> CalcResult<()> {
        require_finite("start_x", start_position.x())?;
        require_finite("start_y", start_position.y())?;
        self.start_position = start_position;
        Ok(())
    }

    /// Change the horizontal span length
    pub fn set_step_x(&mut self, step_x: f64) -> CalcResult<()> {
        validate_step_x(step_x)?;
        self.step = self.step.with_x(step_x);
        Ok(())
    }

    /// Change the elevation difference between the supports
    pub fn set_step_y(&mut self, step_y: f64) -> CalcResult<()> {
        require_finite("step_y", step_y)?;
        self.step = self.step.with_y(step_y);
        Ok(())
    }
}

impl Rescale for Span {
    fn rescale(&mut self, conversion: &UnitConversion) {
        self.start_position.rescale(conversion);
        self.step.rescale(conversion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_rounding_suppresses_noise() {
        let a = Vector2::new(0.1 + 0.2, 1.0);
        let b = Vector2::new(0.3, 1.0);
        assert_eq!(a, b);
        assert_eq!(Vector2::new(1e20, -3.5).x(), 1e20);
    }

    #[test]
    fn test_vector_operators() {
        let a = Vector2::new(3.0, 4.0);
        let b = Vector2::new(1.0, -2.0);
        assert_eq!(a + b, Vector2::new(4.0, 2.0));
        assert_eq!(a - b, Vector2::new(2.0, 6.0));
        assert_eq!(a * 2.0, Vector2::new(6.0, 8.0));
        assert_eq!(a / 2.0, Vector2::new(1.5, 2.0));
        assert_eq!(-a, Vector2::new(-3.0, -4.0));
        assert_eq!(a.length(), 5.0);
    }

    #[test]
    fn test_span_rejects_bad_width() {
        assert!(Span::new(Vector2::ZERO, Vector2::new(0.0, 10.0)).is_err());
        assert!(Span::new(Vector2::ZERO, Vector2::new(-5.0, 10.0)).is_err());
        assert!(Span::new(Vector2::ZERO, Vector2::new(f64::NAN, 10.0)).is_err());
        assert!(Span::new(Vector2::new(0.0, f64::INFINITY), Vector2::new(5.0, 1.0)).is_err());
    }

    #[test]
    fn test_span_setters_leave_state_on_error() {
        let mut span = Span::new(Vector2::new(0.0, 100.0), Vector2::new(1400.0, -10.0)).unwrap();
        assert!(span.set_step_x(0.0).is_err());
        assert_eq!(span.step_x(), 1400.0);
        span.set_step_y(20.0).unwrap();
        assert_eq!(span.end_position(), Vector2::new(1400.0, 120.0));
        span.set_start_position(Vector2::new(10.0, 0.0)).unwrap();
        assert_eq!(span.end_position(), Vector2::new(1410.0, 20.0));
    }

    #[test]
    fn test_span_chord() {
        let span = Span::between(Vector2::new(0.0, 100.0), Vector2::new(1400.0, 90.0)).unwrap();
        assert_eq!(span.step(), Vector2::new(1400.0, -10.0));
        assert!((span.chord_y_at_x(700.0) + 5.0).abs() < 1e-12);
        assert!((span.diagonal() - 1400.0f64.hypot(10.0)).abs() < 1e-12);
    }

    #[test]
    fn test_span_serialization_validates() {
        let span = Span::new(Vector2::new(0.0, 100.0), Vector2::new(650.0, 20.0)).unwrap();
        let json = serde_json::to_string(&span).unwrap();
        let roundtrip: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(span, roundtrip);

        let bad = r#"{"start_position":[0.0,0.0],"step":[0.0,1.0]}"#;
        assert!(serde_json::from_str::<Span>(bad).is_err());
    }

    #[test]
    fn test_span_rescale() {
        let mut span = Span::new(Vector2::new(0.0, 100.0), Vector2::new(1000.0, -10.0)).unwrap();
        span.rescale(&UnitConversion::new(0.5, 1.0).unwrap());
        assert_eq!(span.start_position(), Vector2::new(0.0, 50.0));
        assert_eq!(span.step(), Vector2::new(500.0, -5.0));
    }
}
