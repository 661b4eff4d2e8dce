//! # Sag-Tension Study
//!
//! Runs the conductor model over every span of a line section and tabulates
//! the catenary at each requested loading, before and after the load history.
//!
//! For each span:
//!
//! 1. find the pre-strain that reproduces the design condition,
//! 2. record the *initial* catenary at every loading,
//! 3. apply the design load, then every tabulated loading, raising the
//!    layers' tension ratchets,
//! 4. record the *final* catenary at every loading again.
//!
//! Spans are independent: each gets a fresh [`LoadedCable`] and history.
//!
//! ## Example
//!
//! ```rust,no_run
//! use catenary_core::conductor::{Conductor, MaterialLibrary};
//! use catenary_core::geometry::{Span, Vector2};
//! use catenary_core::loads::{Condition, DesignCondition, LoadLimit, LoadingCondition, NescDistrict};
//! use catenary_core::sag_tension::SagTensionStudy;
//! use catenary_core::units::UnitSystem;
//!
//! let drake = Conductor::drake(&MaterialLibrary::standard()).unwrap();
//! let design = DesignCondition::new(
//!     LoadingCondition::new("Stringing", 15.0),
//!     LoadLimit::RatedStrengthFraction(0.15),
//!     Condition::Initial,
//! );
//! let study = SagTensionStudy::new(drake, design)
//!     .with_span(Span::new(Vector2::ZERO, Vector2::new(400.0, 10.0)).unwrap())
//!     .with_loading(NescDistrict::Heavy.loading(UnitSystem::Metric))
//!     .with_loading(LoadingCondition::new("Hot", 75.0));
//!
//! let result = study.run().unwrap();
//! let hot_final = result.catenary(0, 1, Condition::Final).unwrap();
//! println!("final sag at 75 °C: {:.2} m", hot_final.maximum_sag());
//! ```

use serde::{Deserialize, Serialize};

use crate::catenary::Catenary;
use crate::conductor::{Conductor, LoadedCable};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::Span;
use crate::loads::{Condition, DesignCondition, LoadingCondition};
use crate::numerics::SolverTolerances;
use crate::ruling_span::RulingSpan;

/// Input of a sag-tension study (SI units)
#[derive(Debug, Clone, PartialEq)]
pub struct SagTensionStudy {
    pub conductor: Conductor,
    pub spans: Vec<Span>,
    pub design: DesignCondition,
    pub loadings: Vec<LoadingCondition>,
    pub tolerances: SolverTolerances,
}

impl SagTensionStudy {
    pub fn new(conductor: Conductor, design: DesignCondition) -> Self {
        SagTensionStudy {
            conductor,
            spans: Vec::new(),
            design,
            loadings: Vec::new(),
            tolerances: SolverTolerances::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }

    /// Study every span of a line section
    pub fn with_ruling_span(mut self, section: &RulingSpan) -> Self {
        self.spans.extend(section.iter().map(|catenary| *catenary.span()));
        self
    }

    pub fn with_loading(mut self, loading: LoadingCondition) -> Self {
        self.loadings.push(loading);
        self
    }

    pub fn with_tolerances(mut self, tolerances: SolverTolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.spans.is_empty() {
            return Err(CalcError::invalid_input("spans", "[]", "A study needs at least one span"));
        }
        self.design.validate()?;
        for loading in &self.loadings {
            loading.validate()?;
        }
        Ok(())
    }

    /// Run the study
    pub fn run(&self) -> CalcResult<SagTensionResult> {
        self.validate()?;
        let rated_strength = self.conductor.rated_strength()?;
        let mut spans = Vec::with_capacity(self.spans.len());

        for (index, span) in self.spans.iter().enumerate() {
            log::info!(
                "span {}: {:.1} x {:.1}, design '{}' ({})",
                index,
                span.step_x(),
                span.step_y(),
                self.design.loading.label,
                self.design.limit
            );
            spans.push(self.run_span(*span)?);
        }

        Ok(SagTensionResult {
            conductor_name: self.conductor.name().to_string(),
            rated_strength,
            design: self.design.clone(),
            loadings: self.loadings.clone(),
            spans,
        })
    }

    fn run_span(&self, span: Span) -> CalcResult<SpanResult> {
        let mut cable = LoadedCable::new(span, &self.conductor).with_tolerances(self.tolerances);

        let pre_strain = cable.find_pre_strain(&self.design)?;
        let design = cable.design_catenary(&self.design)?;

        let initial = self
            .loadings
            .iter()
            .map(|loading| cable.catenary_at_loading(loading, Condition::Initial))
            .collect::<CalcResult<Vec<_>>>()?;

        cable.load_with(&self.design)?;
        for loading in &self.loadings {
            cable.ratchet_at(loading)?;
        }

        let final_ = self
            .loadings
            .iter()
            .map(|loading| cable.catenary_at_loading(loading, Condition::Final))
            .collect::<CalcResult<Vec<_>>>()?;

        Ok(SpanResult {
            span,
            pre_strain: pre_strain.value,
            common_tensions: cable.layers().iter().map(|layer| layer.common_tension()).collect(),
            design,
            initial,
            final_,
        })
    }
}

/// Results for one span
#[derive(Debug, Clone, PartialEq)]
pub struct SpanResult {
    pub span: Span,
    /// Pre-strain found for the design condition, percent
    pub pre_strain: f64,
    /// Layer tension ratchets after the load history, core first
    pub common_tensions: Vec<f64>,
    /// Catenary prescribed by the design limit
    pub design: Catenary,
    /// One catenary per loading, before the load history
    pub initial: Vec<Catenary>,
    /// One catenary per loading, after the load history
    pub final_: Vec<Catenary>,
}

impl SpanResult {
    /// The table for a cable state; `Creep` shares the final table
    pub fn table(&self, condition: Condition) -> &[Catenary] {
        match condition {
            Condition::Initial => &self.initial,
            Condition::Final | Condition::Creep => &self.final_,
        }
    }
}

/// One tabulated line of a study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub label: String,
    pub temperature: f64,
    pub ice_thickness: f64,
    pub wind_pressure: f64,
    pub weight: f64,
    pub maximum_sag: f64,
    pub horizontal_tension: f64,
    pub max_tension: f64,
    pub percent_rts: f64,
}

/// Output of [`SagTensionStudy::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct SagTensionResult {
    pub conductor_name: String,
    /// Conductor rated strength, N
    pub rated_strength: f64,
    pub design: DesignCondition,
    pub loadings: Vec<LoadingCondition>,
    pub spans: Vec<SpanResult>,
}

impl SagTensionResult {
    /// Catenary of span `span_index` under loading `loading_index` in the given state
    pub fn catenary(&self, span_index: usize, loading_index: usize, condition: Condition) -> CalcResult<&Catenary> {
        let span = self.spans.get(span_index).ok_or(CalcError::IndexOutOfRange {
            index: span_index,
            len: self.spans.len(),
        })?;
        let table = span.table(condition);
        table.get(loading_index).ok_or(CalcError::IndexOutOfRange {
            index: loading_index,
            len: table.len(),
        })
    }

    /// Horizontal tension as a percentage of rated strength
    pub fn percent_rts(&self, catenary: &Catenary) -> f64 {
        100.0 * catenary.horizontal_tension() / self.rated_strength
    }

    /// Tabulated rows of one span and state, in loading order
    pub fn rows(&self, span_index: usize, condition: Condition) -> CalcResult<Vec<ResultRow>> {
        let span = self.spans.get(span_index).ok_or(CalcError::IndexOutOfRange {
            index: span_index,
            len: self.spans.len(),
        })?;
        Ok(self
            .loadings
            .iter()
            .zip(span.table(condition))
            .map(|(loading, catenary)| ResultRow {
                label: loading.label.clone(),
                temperature: loading.temperature,
                ice_thickness: loading.ice_thickness,
                wind_pressure: loading.wind_pressure,
                weight: catenary.weight(),
                maximum_sag: catenary.maximum_sag(),
                horizontal_tension: catenary.horizontal_tension(),
                max_tension: catenary.max_tension(),
                percent_rts: self.percent_rts(catenary),
            })
            .collect())
    }
}
