//! Age-indexed curve tables

use crate::error::{CurveLookupError, InputError};
use std::collections::BTreeMap;

/// A single curve: loan age in months (1-based) to a monthly rate
#[derive(Debug, Clone, PartialEq)]
pub struct CurveTable {
    name: String,
    rates: BTreeMap<u32, f64>,
}

impl CurveTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: BTreeMap::new(),
        }
    }

    /// Build a curve from consecutive rates starting at age 1
    pub fn from_rates(name: impl Into<String>, rates: impl IntoIterator<Item = f64>) -> Self {
        Self {
            name: name.into(),
            rates: (1..).zip(rates).collect(),
        }
    }

    /// Same rate for ages 1..=max_age
    pub fn flat(name: impl Into<String>, rate: f64, max_age: u32) -> Self {
        Self::from_rates(name, std::iter::repeat(rate).take(max_age as usize))
    }

    pub fn insert(&mut self, age: u32, rate: f64) {
        self.rates.insert(age, rate);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Highest age with an entry
    pub fn max_age(&self) -> Option<u32> {
        self.rates.keys().next_back().copied()
    }

    /// Rate at a loan age. There is no extrapolation past the table.
    pub fn rate(&self, age: u32) -> Result<f64, CurveLookupError> {
        self.rates.get(&age).copied().ok_or_else(|| CurveLookupError {
            curve: self.name.clone(),
            age,
        })
    }

    /// Fail on the first age in 1..=term without an entry
    pub fn ensure_covers(&self, term: u32) -> Result<(), CurveLookupError> {
        for age in 1..=term {
            self.rate(age)?;
        }
        Ok(())
    }
}

/// A loaded rate table: one row per loan age, one column per grade or term bucket.
///
/// Header position 0 is the `Age` column; curve columns start at position 1,
/// which is how legacy numeric column selectors count.
#[derive(Debug, Clone)]
pub struct CurveSet {
    source_name: String,
    headers: Vec<String>,
    rows: BTreeMap<u32, Vec<Option<f64>>>,
}

impl CurveSet {
    pub(crate) fn new(source_name: &str, headers: Vec<String>, rows: BTreeMap<u32, Vec<Option<f64>>>) -> Self {
        Self {
            source_name: source_name.to_string(),
            headers,
            rows,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Curve column labels, without the age column
    pub fn column_names(&self) -> &[String] {
        self.headers.get(1..).unwrap_or(&[])
    }

    pub fn ages(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    /// Select a curve by column label
    pub fn column(&self, name: &str) -> Result<CurveTable, InputError> {
        let position = self
            .headers
            .iter()
            .skip(1)
            .position(|h| h == name)
            .map(|p| p + 1)
            .ok_or_else(|| {
                InputError::curve_table(&self.source_name, format!("no column named {:?}", name))
            })?;
        Ok(self.extract(position))
    }

    /// Select a curve by header position (1-based past the age column)
    pub fn column_at(&self, position: usize) -> Result<CurveTable, InputError> {
        if position == 0 {
            return Err(InputError::curve_table(
                &self.source_name,
                "column position 0 is the age column",
            ));
        }
        if position >= self.headers.len() {
            return Err(InputError::curve_table(
                &self.source_name,
                format!(
                    "column position {} out of range, table has {} columns",
                    position,
                    self.headers.len()
                ),
            ));
        }
        Ok(self.extract(position))
    }

    fn extract(&self, position: usize) -> CurveTable {
        let mut table = CurveTable::new(format!("{}[{}]", self.source_name, self.headers[position]));
        for (&age, values) in &self.rows {
            if let Some(Some(rate)) = values.get(position - 1) {
                table.insert(age, *rate);
            }
        }
        table
    }
}
