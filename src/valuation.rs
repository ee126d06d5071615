//! Loan valuation runner
//!
//! Pre-loads the curve tables once, then values any number of loans
//! without re-reading CSV files.

use crate::config::ValuationConfig;
use crate::curves::CurveLibrary;
use crate::error::Result;
use crate::loan::LoanTerms;
use crate::projection::{CashFlowSchedule, IrrResult, IrrSettings, IrrSolver, WaterfallEngine};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Schedule and IRR of one loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanValuation {
    pub terms: LoanTerms,
    pub schedule: CashFlowSchedule,
    pub irr: IrrResult,
}

/// Outcome of one loan in a batch; failures do not stop the batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub loan_id: Option<String>,
    pub result: Result<LoanValuation>,
}

/// Alternative default/prepay multipliers for a stress run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub default_multiplier: f64,
    pub prepay_multiplier: f64,
}

/// Pre-loaded valuation runner
///
/// # Example
/// ```ignore
/// let valuer = LoanValuer::from_config(&ValuationConfig::from_env()?)?;
/// let valuation = valuer.value(&terms)?;
/// println!("{}", valuation.irr.display_pct);
/// ```
#[derive(Debug, Clone)]
pub struct LoanValuer {
    curves: CurveLibrary,
    solver: IrrSolver,
}

impl LoanValuer {
    pub fn new(curves: CurveLibrary, settings: IrrSettings) -> Self {
        Self {
            curves,
            solver: IrrSolver::new(settings),
        }
    }

    /// Load the curve tables named by a config
    pub fn from_config(config: &ValuationConfig) -> Result<Self> {
        let curves = CurveLibrary::load_files(&config.charged_off_path(), &config.prepay_path())?;
        Ok(Self::new(curves, config.irr.clone()))
    }

    pub fn curves(&self) -> &CurveLibrary {
        &self.curves
    }

    pub fn settings(&self) -> &IrrSettings {
        self.solver.settings()
    }

    /// Project one loan and solve its IRR
    pub fn value(&self, terms: &LoanTerms) -> Result<LoanValuation> {
        log::info!(
            "valuing loan {} (grade {}, term {}, invested {:.2})",
            terms.loan_id.as_deref().unwrap_or("-"),
            terms.grade,
            terms.term,
            terms.invested
        );

        terms.validate()?;
        let curves = self.curves.curves_for(terms)?;
        let schedule = WaterfallEngine::new(terms, &curves).project()?;
        let irr = self.solver.solve(&schedule.net_cash_flows())?;

        log::info!(
            "loan {}: IRR {:.4}% ({} annualization)",
            terms.loan_id.as_deref().unwrap_or("-"),
            irr.display_pct,
            self.solver.settings().annualization
        );

        Ok(LoanValuation {
            terms: terms.clone(),
            schedule,
            irr,
        })
    }

    /// Value independent loans in parallel, one engine per loan.
    /// Outcomes come back in input order.
    pub fn value_batch(&self, loans: &[LoanTerms]) -> Vec<BatchOutcome> {
        loans
            .par_iter()
            .map(|terms| BatchOutcome {
                loan_id: terms.loan_id.clone(),
                result: self.value(terms),
            })
            .collect()
    }

    /// Re-value one loan under each stress scenario
    pub fn value_scenarios(&self, terms: &LoanTerms, scenarios: &[StressScenario]) -> Vec<Result<LoanValuation>> {
        scenarios
            .iter()
            .map(|s| self.value(&terms.with_multipliers(s.default_multiplier, s.prepay_multiplier)))
            .collect()
    }
}
