//! Error types for loan valuation
//!
//! Boundary problems (malformed literals, unreadable curve files) are
//! `InputError`s. Failures inside the projection or the IRR solver are
//! `ValuationError`s and abort the valuation of that loan.

use thiserror::Error;

/// A curve was asked for an age it has no entry for
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{curve} curve has no entry for age {age}")]
pub struct CurveLookupError {
    pub curve: String,
    pub age: u32,
}

/// Failures raised while projecting cash flows or solving for the IRR
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("month {month}: {field} lookup failed: {source}")]
    CurveLookup {
        month: u32,
        field: &'static str,
        #[source]
        source: CurveLookupError,
    },

    #[error("curve does not cover the loan term: {0}")]
    CurveCoverage(#[from] CurveLookupError),

    #[error("month {month}: previous scheduled balance is zero, cannot compute {field}")]
    DegenerateSchedule { month: u32, field: &'static str },

    #[error("IRR did not converge after {iterations} iterations: {reason}")]
    NoConvergence { iterations: u32, reason: String },

    #[error("invalid loan terms: {0}")]
    InvalidTerms(String),
}

/// Failures reading or parsing inputs at the boundary
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot parse {field} value {value:?}: {reason}")]
    Parse {
        field: String,
        value: String,
        reason: String,
    },

    #[error("curve table {source_name}: {reason}")]
    CurveTable { source_name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl InputError {
    pub(crate) fn parse(field: &str, value: &str, reason: impl Into<String>) -> Self {
        InputError::Parse {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn curve_table(source_name: &str, reason: impl Into<String>) -> Self {
        InputError::CurveTable {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Any error produced while valuing a loan end to end
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
