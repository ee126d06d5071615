//! Loan Valuation - month-by-month cash-flow projection and IRR for amortizing consumer loans
//!
//! This library provides:
//! - Typed loan terms with parsing of formatted percentage/currency literals
//! - Grade and term-bucket curve tables loaded from CSV
//! - The monthly waterfall: amortization, defaults, prepayments, recoveries and fees
//! - IRR solving and annualization
//! - Single-loan, batch and stress-scenario valuation runs

pub mod error;
pub mod config;
pub mod loan;
pub mod curves;
pub mod projection;
pub mod valuation;
pub mod report;

// Re-export commonly used types
pub use error::{CurveLookupError, Error, InputError, Result, ValuationError};
pub use config::ValuationConfig;
pub use loan::LoanTerms;
pub use curves::{CurveLibrary, CurveProvider, CurveTable, LoanCurves};
pub use projection::{CashFlowSchedule, IrrResult, IrrSolver, Period, ScheduleBuilder, WaterfallEngine};
pub use valuation::{LoanValuation, LoanValuer, StressScenario};
