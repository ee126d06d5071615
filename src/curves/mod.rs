//! Default-rate and prepayment-speed curves

mod table;
pub mod loader;

pub use table::{CurveTable, CurveSet};
pub use loader::{load_curve_set, load_curve_set_from_reader, DEFAULT_CURVES_PATH};

use crate::error::{CurveLookupError, InputError, ValuationError};
use crate::loan::LoanTerms;
use std::path::Path;

/// Read-only curve lookups for one loan
pub trait CurveProvider {
    /// Marginal default rate for the loan's grade at a loan age
    fn default_rate(&self, age: u32) -> Result<f64, CurveLookupError>;

    /// Conditional prepayment rate for the loan's term bucket at a loan age
    fn prepay_speed(&self, age: u32) -> Result<f64, CurveLookupError>;
}

/// The pair of curves selected for a single loan
#[derive(Debug, Clone)]
pub struct LoanCurves {
    pub default_curve: CurveTable,
    pub prepay_curve: CurveTable,
}

impl LoanCurves {
    pub fn new(default_curve: CurveTable, prepay_curve: CurveTable) -> Self {
        Self {
            default_curve,
            prepay_curve,
        }
    }

    /// Pick the grade and term-bucket columns for a loan.
    ///
    /// An explicit header position on the terms wins over the grade name.
    pub fn select(library: &CurveLibrary, terms: &LoanTerms) -> Result<Self, InputError> {
        let default_curve = match terms.curve_column {
            Some(position) => library.charged_off.column_at(position)?,
            None => library.charged_off.column(&terms.grade)?,
        };
        let prepay_curve = library.prepay.column(&terms.term_bucket())?;
        Ok(Self::new(default_curve, prepay_curve))
    }

    /// Both curves must cover ages 1..=term before a projection starts
    pub fn ensure_covers(&self, term: u32) -> Result<(), ValuationError> {
        self.default_curve.ensure_covers(term)?;
        self.prepay_curve.ensure_covers(term)?;
        Ok(())
    }
}

impl CurveProvider for LoanCurves {
    fn default_rate(&self, age: u32) -> Result<f64, CurveLookupError> {
        self.default_curve.rate(age)
    }

    fn prepay_speed(&self, age: u32) -> Result<f64, CurveLookupError> {
        self.prepay_curve.rate(age)
    }
}

/// Charged-off and prepayment tables, loaded once and shared across loans
#[derive(Debug, Clone)]
pub struct CurveLibrary {
    pub charged_off: CurveSet,
    pub prepay: CurveSet,
}

impl CurveLibrary {
    /// Load both tables from the default location (data/curves/)
    pub fn load_default() -> Result<Self, InputError> {
        Self::load_from(Path::new(DEFAULT_CURVES_PATH))
    }

    /// Load both tables from a directory using the default file names
    pub fn load_from(dir: &Path) -> Result<Self, InputError> {
        Self::load_files(&dir.join(loader::CHARGED_OFF_FILE), &dir.join(loader::PREPAY_FILE))
    }

    /// Load both tables from explicit file paths
    pub fn load_files(charged_off: &Path, prepay: &Path) -> Result<Self, InputError> {
        Ok(Self {
            charged_off: load_curve_set(charged_off)?,
            prepay: load_curve_set(prepay)?,
        })
    }

    /// Select and validate the curves for a loan
    pub fn curves_for(&self, terms: &LoanTerms) -> crate::Result<LoanCurves> {
        let curves = LoanCurves::select(self, terms)?;
        curves.ensure_covers(terms.term)?;
        Ok(curves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::sample_raw;

    fn library() -> CurveLibrary {
        let mut charged_off = String::from("Age,A1,C4\n");
        let mut prepay = String::from("Age,36,60\n");
        for age in 1..=40 {
            charged_off.push_str(&format!("{},0.001,0.005\n", age));
            prepay.push_str(&format!("{},0.02,0.015\n", age));
        }
        CurveLibrary {
            charged_off: load_curve_set_from_reader("charged_off", charged_off.as_bytes()).unwrap(),
            prepay: load_curve_set_from_reader("prepay", prepay.as_bytes()).unwrap(),
        }
    }

    #[test]
    fn test_select_by_grade_and_term() {
        let terms = sample_raw().into_terms().unwrap();
        let curves = library().curves_for(&terms).unwrap();
        assert_eq!(curves.default_rate(1).unwrap(), 0.005);
        assert_eq!(curves.prepay_speed(36).unwrap(), 0.02);
    }

    #[test]
    fn test_position_overrides_grade() {
        let mut terms = sample_raw().into_terms().unwrap();
        terms.curve_column = Some(1);
        let curves = library().curves_for(&terms).unwrap();
        assert_eq!(curves.default_rate(10).unwrap(), 0.001);
    }

    #[test]
    fn test_coverage_checked_at_selection() {
        let mut terms = sample_raw().into_terms().unwrap();
        terms.term = 60;
        let err = library().curves_for(&terms).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Valuation(ValuationError::CurveCoverage(CurveLookupError { age: 41, .. }))
        ));
    }

    #[test]
    fn test_missing_term_bucket() {
        let mut terms = sample_raw().into_terms().unwrap();
        terms.term = 24;
        assert!(matches!(
            library().curves_for(&terms),
            Err(crate::Error::Input(InputError::CurveTable { .. }))
        ));
    }
}
