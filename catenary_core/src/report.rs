//! # Text Report
//!
//! Plain-text tabulation of a [`SagTensionResult`]: per span, one table of
//! initial and one of final conditions with temperature, ice, wind, loaded
//! weight, sag, horizontal tension and percent of rated strength.
//!
//! Values are printed as stored; `units` only selects the column labels.

use std::fmt;

use crate::loads::Condition;
use crate::sag_tension::{ResultRow, SagTensionResult};
use crate::units::UnitSystem;

const RULE: &str = "════════════════════════════════════════════════════════════════════════════════";

/// A study formatted for display with the labels of `units`
#[derive(Debug, Clone, Copy)]
pub struct SagTensionReport<'a> {
    result: &'a SagTensionResult,
    units: UnitSystem,
}

impl<'a> SagTensionReport<'a> {
    pub fn new(result: &'a SagTensionResult, units: UnitSystem) -> Self {
        SagTensionReport { result, units }
    }

    fn write_table(&self, f: &mut fmt::Formatter<'_>, title: &str, rows: &[ResultRow]) -> fmt::Result {
        let length = self.units.length_symbol();
        let force = self.units.force_symbol();
        writeln!(f, "  {title}")?;
        writeln!(
            f,
            "  {:<18} {:>8} {:>8} {:>8} {:>9} {:>9} {:>11} {:>6}",
            "Loading",
            format!("T [{}]", self.units.temperature_symbol()),
            format!("Ice [{length}]"),
            "Wind",
            format!("w [{force}/{length}]"),
            format!("Sag [{length}]"),
            format!("H [{force}]"),
            "%RTS"
        )?;
        for row in rows {
            writeln!(
                f,
                "  {:<18} {:>8.1} {:>8.4} {:>8.1} {:>9.3} {:>9.3} {:>11.1} {:>6.1}",
                row.label,
                row.temperature,
                row.ice_thickness,
                row.wind_pressure,
                row.weight,
                row.maximum_sag,
                row.horizontal_tension,
                row.percent_rts
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for SagTensionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let length = self.units.length_symbol();
        let force = self.units.force_symbol();

        writeln!(f, "{RULE}")?;
        writeln!(f, "  SAG-TENSION REPORT")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "  Conductor:      {}", result.conductor_name)?;
        writeln!(f, "  Rated strength: {:.0} {force}", result.rated_strength)?;
        writeln!(
            f,
            "  Design:         {} at {:.1} {} ({}, {})",
            result.design.loading.label,
            result.design.loading.temperature,
            self.units.temperature_symbol(),
            result.design.limit,
            result.design.condition
        )?;

        for (index, span) in result.spans.iter().enumerate() {
            writeln!(f)?;
            writeln!(
                f,
                "Span {}: {:.1} {length} x {:.1} {length}, pre-strain {:.4}%",
                index + 1,
                span.span.step_x(),
                span.span.step_y(),
                span.pre_strain
            )?;
            writeln!(
                f,
                "  Design catenary: H = {:.1} {force}, sag = {:.3} {length}",
                span.design.horizontal_tension(),
                span.design.maximum_sag()
            )?;
            for (title, condition) in [("Initial", Condition::Initial), ("Final", Condition::Final)] {
                match result.rows(index, condition) {
                    Ok(rows) => self.write_table(f, title, &rows)?,
                    Err(e) => writeln!(f, "  {title}: {e}")?,
                }
            }
        }
        writeln!(f, "{RULE}")
    }
}

/// Render the whole study as text
pub fn render_report(result: &SagTensionResult, units: UnitSystem) -> String {
    SagTensionReport::new(result, units).to_string()
}
