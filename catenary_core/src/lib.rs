//! # catenary_core - Catenary and Sag-Tension Engine
//!
//! `catenary_core` models overhead conductors hanging between supports: the
//! catenary curve of a single span, chains of spans sharing one horizontal
//! tension (ruling spans), and the sag-tension behaviour of stranded
//! conductors under temperature, ice and wind.
//!
//! ## Design Philosophy
//!
//! - **Checked state**: every constructor and setter validates, and a failed
//!   update leaves the object untouched
//! - **JSON-First**: documents, loadings and result rows implement Serialize/Deserialize
//! - **Rich Errors**: structured [`CalcError`] values, not strings
//!
//! ## Quick Start
//!
//! ```rust
//! use catenary_core::catenary::Catenary;
//! use catenary_core::geometry::{Span, Vector2};
//!
//! let span = Span::new(Vector2::new(0.0, 30.0), Vector2::new(300.0, 0.0)).unwrap();
//! let mut catenary = Catenary::new(span, 15.66, 20_000.0).unwrap();
//! println!("sag = {:.3} m", catenary.maximum_sag());
//!
//! // Re-tension the span to a 6 m sag
//! catenary.set_by_maximum_sag(6.0, 1e-9).unwrap();
//! assert!((catenary.maximum_sag() - 6.0).abs() < 1e-6);
//! ```
//!
//! ## Modules
//!
//! - [`calculator`] - Stateless catenary formulas and their inverses
//! - [`catenary`] - A single span with weight and horizontal tension
//! - [`ruling_span`] - Chained spans at a common tension
//! - [`conductor`] - Materials, stranding, stress-strain and the loaded cable
//! - [`loads`] - Weather loadings, design limits and NESC districts
//! - [`sag_tension`] - Initial/final sag-tension studies
//! - [`report`] - Plain-text study report
//! - [`document`] - Persisted ruling-span documents
//! - [`file_io`] - File operations with atomic saves and locking
//! - [`geometry`] - Points and span geometry
//! - [`numerics`] - Bisection solvers and tolerances
//! - [`units`] - Unit systems and rescaling
//! - [`errors`] - Structured error types

pub mod calculator;
pub mod catenary;
pub mod conductor;
pub mod document;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod geometry;
pub mod loads;
pub mod numerics;
pub mod report;
pub mod ruling_span;
pub mod sag_tension;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use catenary::Catenary;
pub use document::{AnalysisSettings, RulingSpanDocument, SCHEMA_VERSION};
pub use errors::{CalcError, CalcResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_document, save_document, FileLock};
pub use geometry::{Span, Vector2};
pub use ruling_span::RulingSpan;
pub use sag_tension::{SagTensionResult, SagTensionStudy};
pub use units::UnitSystem;
