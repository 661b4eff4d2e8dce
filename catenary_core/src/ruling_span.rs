//! # Ruling Span
//!
//! A line section between two dead-end structures: an ordered, chained
//! sequence of catenaries that all carry one horizontal tension.
//!
//! The section owns its catenaries in a `Vec` and addresses them by index.
//! Two invariants are restored after every mutation:
//!
//! - every span starts where the previous one ends (the first starts at the
//!   section start position);
//! - every span carries the section's horizontal tension.
//!
//! Single-span edits go through [`RulingSpan::edit`], which adopts the edited
//! span's tension for the whole section. Many edits at once go through
//! [`RulingSpan::batch`], which restores the invariants once at the end.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::geometry::Vector2;
//! use catenary_core::ruling_span::RulingSpan;
//!
//! let steps = [Vector2::new(650.0, 20.0), Vector2::new(1250.0, -12.0), Vector2::new(800.0, -16.0)];
//! let section = RulingSpan::from_steps(Vector2::new(0.0, 100.0), &steps, 0.75, 3200.0).unwrap();
//!
//! assert_eq!(section.len(), 3);
//! assert!((section.total_length() - 2706.80).abs() < 0.01);
//! assert_eq!(section.end_position(), Vector2::new(2700.0, 92.0));
//! ```

use crate::catenary::Catenary;
use crate::errors::{require_finite, require_positive, CalcError, CalcResult};
use crate::geometry::{Span, Vector2};
use crate::units::{Rescale, UnitConversion};

/// Chained catenaries sharing one horizontal tension.
#[derive(Debug, Clone, PartialEq)]
pub struct RulingSpan {
    start_position: Vector2,
    horizontal_tension: f64,
    spans: Vec<Catenary>,
}

impl RulingSpan {
    /// An empty section starting at `start_position`
    pub fn new(start_position: Vector2, horizontal_tension: f64) -> CalcResult<Self> {
        require_finite("start_x", start_position.x())?;
        require_finite("start_y", start_position.y())?;
        require_positive("horizontal_tension", horizontal_tension)?;
        Ok(RulingSpan {
            start_position,
            horizontal_tension,
            spans: Vec::new(),
        })
    }

    /// A section of spans with the given steps, all with one weight
    pub fn from_steps(
        start_position: Vector2,
        steps: &[Vector2],
        weight: f64,
        horizontal_tension: f64,
    ) -> CalcResult<Self> {
        let mut section = RulingSpan::new(start_position, horizontal_tension)?;
        let mut start = start_position;
        for step in steps {
            let span = Span::new(start, *step)?;
            section.spans.push(Catenary::new(span, weight, horizontal_tension)?);
            start = span.end_position();
        }
        Ok(section)
    }

    fn check_index(&self, index: usize) -> CalcResult<()> {
        if index < self.spans.len() {
            Ok(())
        } else {
            Err(CalcError::IndexOutOfRange {
                index,
                len: self.spans.len(),
            })
        }
    }

    /// Re-chain start positions and push the section tension to every span
    pub fn refresh(&mut self) -> CalcResult<()> {
        let mut start = self.start_position;
        for catenary in &mut self.spans {
            catenary.set_start_position(start)?;
            catenary.set_horizontal_tension(self.horizontal_tension)?;
            start = catenary.end_position();
        }
        Ok(())
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, index: usize) -> CalcResult<&Catenary> {
        self.check_index(index)?;
        Ok(&self.spans[index])
    }

    pub fn spans(&self) -> &[Catenary] {
        &self.spans
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Catenary> {
        self.spans.iter()
    }

    pub fn start_position(&self) -> Vector2 {
        self.start_position
    }

    /// End support of the last span, or the start position when empty
    pub fn end_position(&self) -> Vector2 {
        self.spans
            .last()
            .map(Catenary::end_position)
            .unwrap_or(self.start_position)
    }

    pub fn horizontal_tension(&self) -> f64 {
        self.horizontal_tension
    }

    // =========================================================================
    // Structural changes
    // =========================================================================

    /// Append a span; it is moved to the end of the chain and takes the section tension
    pub fn push(&mut self, catenary: Catenary) -> CalcResult<()> {
        self.spans.push(catenary);
        self.refresh()
    }

    /// Insert a span before `index` (`index == len` appends)
    pub fn insert(&mut self, index: usize, catenary: Catenary) -> CalcResult<()> {
        if index > self.spans.len() {
            return Err(CalcError::IndexOutOfRange {
                index,
                len: self.spans.len(),
            });
        }
        self.spans.insert(index, catenary);
        self.refresh()
    }

    pub fn remove(&mut self, index: usize) -> CalcResult<Catenary> {
        self.check_index(index)?;
        let removed = self.spans.remove(index);
        self.refresh()?;
        Ok(removed)
    }

    pub fn swap(&mut self, a: usize, b: usize) -> CalcResult<()> {
        self.check_index(a)?;
        self.check_index(b)?;
        self.spans.swap(a, b);
        self.refresh()
    }

    /// Move the span at `from` so that it ends up at index `to`
    pub fn move_span(&mut self, from: usize, to: usize) -> CalcResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let catenary = self.spans.remove(from);
        self.spans.insert(to, catenary);
        self.refresh()
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Set the tension of every span
    pub fn set_horizontal_tension(&mut self, horizontal_tension: f64) -> CalcResult<()> {
        require_positive("horizontal_tension", horizontal_tension)?;
        self.horizontal_tension = horizontal_tension;
        self.refresh()
    }

    /// Adopt the current tension of the span at `index` for the whole section
    pub fn set_horizontal_tension_from(&mut self, index: usize) -> CalcResult<()> {
        let tension = self.get(index)?.horizontal_tension();
        self.set_horizontal_tension(tension)
    }

    /// Mutate one span, then adopt its tension for the section and re-chain.
    ///
    /// The edit runs on a copy; on error the section is unchanged.
    ///
    /// ```rust
    /// # use catenary_core::geometry::Vector2;
    /// # use catenary_core::ruling_span::RulingSpan;
    /// let steps = [Vector2::new(400.0, 0.0), Vector2::new(500.0, 5.0)];
    /// let mut section = RulingSpan::from_steps(Vector2::ZERO, &steps, 1.0, 2000.0).unwrap();
    /// section.edit(1, |span| span.set_by_maximum_sag(20.0, 1e-4)).unwrap();
    /// let tension = section.get(1).unwrap().horizontal_tension();
    /// assert_eq!(section.get(0).unwrap().horizontal_tension(), tension);
    /// ```
    pub fn edit<F, R>(&mut self, index: usize, f: F) -> CalcResult<R>
    where
        F: FnOnce(&mut Catenary) -> CalcResult<R>,
    {
        self.check_index(index)?;
        let mut edited = self.spans[index].clone();
        let result = f(&mut edited)?;
        let tension = edited.horizontal_tension();
        self.spans[index] = edited;
        self.horizontal_tension = tension;
        self.refresh()?;
        Ok(result)
    }

    /// Run several edits with the invariants restored once at the end.
    ///
    /// Per-span tension changes made inside the batch are overridden by the
    /// section tension when it completes. On error the section is unchanged.
    pub fn batch<F, R>(&mut self, f: F) -> CalcResult<R>
    where
        F: FnOnce(&mut Vec<Catenary>) -> CalcResult<R>,
    {
        let mut spans = self.spans.clone();
        let result = f(&mut spans)?;
        let previous = std::mem::replace(&mut self.spans, spans);
        if let Err(e) = self.refresh() {
            self.spans = previous;
            return Err(e);
        }
        Ok(result)
    }

    /// Set the cable weight of every span
    pub fn set_weight(&mut self, weight: f64) -> CalcResult<()> {
        require_positive("weight", weight)?;
        for catenary in &mut self.spans {
            catenary.set_weight(weight)?;
        }
        Ok(())
    }

    /// Move the whole section
    pub fn set_start_position(&mut self, start_position: Vector2) -> CalcResult<()> {
        require_finite("start_x", start_position.x())?;
        require_finite("start_y", start_position.y())?;
        self.start_position = start_position;
        self.refresh()
    }

    // =========================================================================
    // Section quantities
    // =========================================================================

    /// Sum of the cable lengths of every span
    pub fn total_length(&self) -> f64 {
        self.spans.iter().map(Catenary::total_length).sum()
    }

    /// Ruling span `sqrt(Σ Sx³ / Σ Sx·(1 + m²)^1.5)`, rounded to one decimal.
    ///
    /// Zero for an empty section.
    pub fn ruling_span_length(&self) -> f64 {
        if self.spans.is_empty() {
            return 0.0;
        }
        let (cubes, weighted) = self.spans.iter().fold((0.0, 0.0), |(cubes, weighted), catenary| {
            let sx = catenary.step().x();
            let slope = catenary.span().slope();
            (cubes + sx.powi(3), weighted + sx * (1.0 + slope * slope).powf(1.5))
        });
        let length = (cubes / weighted).sqrt();
        (length * 10.0).round() / 10.0
    }

    /// A level span of ruling-span length at the section start, carrying the
    /// section tension and the first span's weight
    pub fn equivalent_span(&self) -> CalcResult<Catenary> {
        let first = self.spans.first().ok_or_else(|| {
            CalcError::invalid_input("spans", "0", "An empty ruling span has no equivalent span")
        })?;
        let span = Span::new(self.start_position, Vector2::new(self.ruling_span_length(), 0.0))?;
        Catenary::new(span, first.weight(), self.horizontal_tension)
    }
}

impl Rescale for RulingSpan {
    fn rescale(&mut self, conversion: &UnitConversion) {
        self.start_position.rescale(conversion);
        self.horizontal_tension = conversion.force(self.horizontal_tension);
        for catenary in &mut self.spans {
            catenary.rescale(conversion);
        }
    }
}

impl<'a> IntoIterator for &'a RulingSpan {
    type Item = &'a Catenary;
    type IntoIter = std::slice::Iter<'a, Catenary>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
