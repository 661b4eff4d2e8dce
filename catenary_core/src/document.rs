//! # Ruling-Span Documents
//!
//! The persisted form of a line section. Documents serialize to `.rsp` files
//! as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! RulingSpanDocument
//! ├── meta: DocumentMetadata (schema version, engineer, job, timestamps)
//! ├── settings: AnalysisSettings (solver tolerances, design, loadings)
//! ├── units: "m/N" | "ft/lb"
//! └── spans: Vec<SpanRecord> (one flat record per catenary, in line order)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::document::RulingSpanDocument;
//! use catenary_core::geometry::Vector2;
//! use catenary_core::ruling_span::RulingSpan;
//! use catenary_core::units::UnitSystem;
//!
//! let steps = [Vector2::new(650.0, 20.0), Vector2::new(1250.0, -12.0)];
//! let section = RulingSpan::from_steps(Vector2::new(0.0, 100.0), &steps, 0.75, 3200.0).unwrap();
//!
//! let document = RulingSpanDocument::from_ruling_span(&section, UnitSystem::Metric, "Jane Engineer", "26-014");
//! let json = serde_json::to_string_pretty(&document).unwrap();
//! let restored = serde_json::from_str::<RulingSpanDocument>(&json).unwrap().to_ruling_span().unwrap();
//! assert_eq!(restored, section);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catenary::Catenary;
use crate::errors::{CalcError, CalcResult};
use crate::geometry::{Span, Vector2};
use crate::loads::{DesignCondition, LoadingCondition};
use crate::numerics::SolverTolerances;
use crate::ruling_span::RulingSpan;
use crate::units::{convert_temperature, Rescale, UnitConversion, UnitSystem};

/// Current schema version for .rsp files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root document container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulingSpanDocument {
    pub meta: DocumentMetadata,
    #[serde(default)]
    pub settings: AnalysisSettings,
    /// Unit symbol string, see [`UnitSystem::symbol`]
    pub units: String,
    pub spans: Vec<SpanRecord>,
}

/// Document header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub engineer: String,
    pub job_id: String,
    #[serde(default)]
    pub description: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Analysis configuration stored with the section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default)]
    pub tolerances: SolverTolerances,
    /// Design condition of a sag-tension study, if one is set up
    #[serde(default)]
    pub design: Option<DesignCondition>,
    /// Loadings tabulated by a sag-tension study
    #[serde(default)]
    pub loadings: Vec<LoadingCondition>,
}

/// One catenary, attribute per field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub start_x: f64,
    pub start_y: f64,
    pub step_x: f64,
    pub step_y: f64,
    pub weight: f64,
    pub horizontal_tension: f64,
}

impl SpanRecord {
    /// Validating conversion back to a catenary
    pub fn to_catenary(&self) -> CalcResult<Catenary> {
        let span = Span::new(
            Vector2::new(self.start_x, self.start_y),
            Vector2::new(self.step_x, self.step_y),
        )?;
        Catenary::new(span, self.weight, self.horizontal_tension)
    }
}

impl From<&Catenary> for SpanRecord {
    fn from(catenary: &Catenary) -> Self {
        let start = catenary.start_position();
        let step = catenary.step();
        SpanRecord {
            start_x: start.x(),
            start_y: start.y(),
            step_x: step.x(),
            step_y: step.y(),
            weight: catenary.weight(),
            horizontal_tension: catenary.horizontal_tension(),
        }
    }
}

impl RulingSpanDocument {
    /// An empty document
    pub fn new(units: UnitSystem, engineer: impl Into<String>, job_id: impl Into<String>) -> Self {
        let now = Utc::now();
        RulingSpanDocument {
            meta: DocumentMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                description: String::new(),
                created: now,
                modified: now,
            },
            settings: AnalysisSettings::default(),
            units: units.symbol().to_string(),
            spans: Vec::new(),
        }
    }

    /// A document holding every span of `section`
    pub fn from_ruling_span(
        section: &RulingSpan,
        units: UnitSystem,
        engineer: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Self {
        let mut document = RulingSpanDocument::new(units, engineer, job_id);
        document.spans = section.iter().map(SpanRecord::from).collect();
        document
    }

    /// Replace the stored spans
    pub fn set_ruling_span(&mut self, section: &RulingSpan) {
        self.spans = section.iter().map(SpanRecord::from).collect();
        self.touch();
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn unit_system(&self) -> CalcResult<UnitSystem> {
        UnitSystem::from_symbol(&self.units)
    }

    /// Rebuild the section. The first record sets the section start and
    /// tension; later records are chained behind it.
    pub fn to_ruling_span(&self) -> CalcResult<RulingSpan> {
        let first = self.spans.first().ok_or_else(|| {
            CalcError::invalid_input("spans", "[]", "Document contains no spans")
        })?;
        let mut section = RulingSpan::new(
            Vector2::new(first.start_x, first.start_y),
            first.horizontal_tension,
        )?;
        let mut expected_start = section.start_position();
        for (index, record) in self.spans.iter().enumerate() {
            let catenary = record.to_catenary()?;
            if catenary.start_position() != expected_start {
                log::warn!(
                    "span {} starts at {} instead of {}; re-chaining",
                    index,
                    catenary.start_position(),
                    expected_start
                );
            }
            if record.horizontal_tension != first.horizontal_tension {
                log::warn!(
                    "span {} tension {} differs from section tension {}",
                    index,
                    record.horizontal_tension,
                    first.horizontal_tension
                );
            }
            expected_start = expected_start + catenary.step();
            section.push(catenary)?;
        }
        Ok(section)
    }

    /// Convert every stored quantity to another unit system
    pub fn convert_units(&mut self, to: UnitSystem) -> CalcResult<()> {
        let from = self.unit_system()?;
        if from == to {
            return Ok(());
        }
        let conversion = UnitConversion::between(from, to);

        if !self.spans.is_empty() {
            let mut section = self.to_ruling_span()?;
            section.rescale(&conversion);
            self.spans = section.iter().map(SpanRecord::from).collect();
        }
        for loading in &mut self.settings.loadings {
            loading.rescale(&conversion);
            loading.temperature = convert_temperature(loading.temperature, from, to);
        }
        if let Some(design) = &mut self.settings.design {
            design.rescale(&conversion);
            design.loading.temperature = convert_temperature(design.loading.temperature, from, to);
        }
        self.settings.tolerances.sag = conversion.length(self.settings.tolerances.sag);
        self.settings.tolerances.length = conversion.length(self.settings.tolerances.length);
        self.settings.tolerances.clearance = conversion.length(self.settings.tolerances.clearance);

        self.units = to.symbol().to_string();
        self.touch();
        Ok(())
    }
}

impl Default for RulingSpanDocument {
    fn default() -> Self {
        RulingSpanDocument::new(UnitSystem::Metric, "", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::{Condition, LoadLimit};

    fn section() -> RulingSpan {
        let steps = [
            Vector2::new(650.0, 20.0),
            Vector2::new(1250.0, -12.0),
            Vector2::new(800.0, -16.0),
        ];
        RulingSpan::from_steps(Vector2::new(0.0, 100.0), &steps, 0.75, 3200.0).unwrap()
    }

    #[test]
    fn test_document_creation() {
        let document = RulingSpanDocument::new(UnitSystem::Imperial, "John Doe", "26-001");
        assert_eq!(document.meta.version, SCHEMA_VERSION);
        assert_eq!(document.units, "ft/lb");
        assert_eq!(document.unit_system().unwrap(), UnitSystem::Imperial);
        assert!(document.to_ruling_span().is_err());
    }

    #[test]
    fn test_round_trip_through_json() {
        let section = section();
        let document = RulingSpanDocument::from_ruling_span(&section, UnitSystem::Metric, "Engineer", "26-002");
        let json = serde_json::to_string_pretty(&document).unwrap();
        assert!(json.contains("\"horizontal_tension\": 3200.0"));
        assert!(json.contains("\"units\": \"m/N\""));

        let parsed: RulingSpanDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, document);
        let restored = parsed.to_ruling_span().unwrap();
        assert_eq!(restored, section);
    }

    #[test]
    fn test_invalid_record_rejected() {
        let mut document = RulingSpanDocument::from_ruling_span(&section(), UnitSystem::Metric, "E", "J");
        document.spans[1].weight = -0.75;
        assert!(document.to_ruling_span().is_err());
        document.spans[1].weight = 0.75;
        document.spans[1].step_x = 0.0;
        assert!(document.to_ruling_span().is_err());
    }

    #[test]
    fn test_misaligned_records_are_rechained() {
        let mut document = RulingSpanDocument::from_ruling_span(&section(), UnitSystem::Metric, "E", "J");
        document.spans[2].start_x = 0.0;
        document.spans[2].horizontal_tension = 9999.0;
        let restored = document.to_ruling_span().unwrap();
        assert_eq!(restored.get(2).unwrap().start_position(), Vector2::new(1900.0, 108.0));
        assert_eq!(restored.get(2).unwrap().horizontal_tension(), 3200.0);
    }

    #[test]
    fn test_unit_conversion() {
        let mut document = RulingSpanDocument::from_ruling_span(&section(), UnitSystem::Imperial, "E", "J");
        document.settings.design = Some(DesignCondition::new(
            LoadingCondition::new("Stringing", 60.0),
            LoadLimit::MaximumSag(30.0),
            Condition::Initial,
        ));
        document.settings.loadings.push(LoadingCondition::new("Hot", 212.0).with_ice(0.5));

        document.convert_units(UnitSystem::Metric).unwrap();
        assert_eq!(document.units, "m/N");
        assert!((document.spans[0].step_x - 650.0 * 0.3048).abs() < 1e-9);
        assert!((document.spans[0].horizontal_tension - 3200.0 * 4.4482216152605).abs() < 1e-6);
        assert!((document.settings.loadings[0].temperature - 100.0).abs() < 1e-9);
        assert!((document.settings.loadings[0].ice_thickness - 0.1524).abs() < 1e-12);
        let design = document.settings.design.as_ref().unwrap();
        assert_eq!(design.limit, LoadLimit::MaximumSag(30.0 * 0.3048));
        assert!((design.loading.temperature - 15.555_555).abs() < 1e-5);

        // Converting to the current system is a no-op
        let before = document.clone();
        document.convert_units(UnitSystem::Metric).unwrap();
        assert_eq!(document, before);
    }

    #[test]
    fn test_settings_default_when_missing() {
        let json = r#"{
            "meta": {"version": "0.1.0", "engineer": "E", "job_id": "J",
                     "created": "2026-01-05T10:00:00Z", "modified": "2026-01-05T10:00:00Z"},
            "units": "m/N",
            "spans": [{"start_x": 0.0, "start_y": 10.0, "step_x": 300.0, "step_y": 0.0,
                       "weight": 15.66, "horizontal_tension": 20000.0}]
        }"#;
        let document: RulingSpanDocument = serde_json::from_str(json).unwrap();
        assert_eq!(document.settings, AnalysisSettings::default());
        assert_eq!(document.to_ruling_span().unwrap().len(), 1);
    }
}
