//! Internal Rate of Return (IRR) calculation
//!
//! Solves for the monthly rate that zeroes the NPV of a schedule's net cash
//! flows, then annualizes it.

use super::rounding::floor_round;
use crate::error::ValuationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest periodic rate searched (-99%)
const MIN_RATE: f64 = -0.99;

/// Highest periodic rate searched (1000%)
const MAX_RATE: f64 = 10.0;

/// Cash flows smaller than this count as zero when checking for a sign change
const SIGN_EPSILON: f64 = 1e-10;

/// Largest NPV, relative to the gross cash flows, accepted as a root
const ROOT_TOLERANCE: f64 = 1e-8;

/// How a monthly rate is turned into an annual percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Annualization {
    /// `r x 12`, the loan-tape convention
    #[default]
    Linear,
    /// `(1 + r)^12 - 1`
    Compound,
}

impl Annualization {
    /// Annual rate in percent
    pub fn annualize(self, periodic_rate: f64) -> f64 {
        match self {
            Annualization::Linear => periodic_rate * 12.0 * 100.0,
            Annualization::Compound => ((1.0 + periodic_rate).powi(12) - 1.0) * 100.0,
        }
    }
}

impl FromStr for Annualization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Annualization::Linear),
            "compound" => Ok(Annualization::Compound),
            other => Err(format!("unknown annualization {:?}, expected linear or compound", other)),
        }
    }
}

impl fmt::Display for Annualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annualization::Linear => write!(f, "linear"),
            Annualization::Compound => write!(f, "compound"),
        }
    }
}

/// Solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrSettings {
    /// Starting periodic rate for Newton-Raphson
    pub initial_guess: f64,
    /// Convergence tolerance on the rate step (Newton) or bracket width (bisection)
    pub tolerance: f64,
    pub max_iterations: u32,
    pub annualization: Annualization,
}

impl Default for IrrSettings {
    fn default() -> Self {
        Self {
            initial_guess: 0.05 / 12.0, // 5% annual
            tolerance: 1e-10,
            max_iterations: 1000,
            annualization: Annualization::Linear,
        }
    }
}

/// Solved IRR of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrResult {
    /// Monthly rate
    pub periodic_rate: f64,
    /// Annualized rate in percent
    pub annual_pct: f64,
    /// Annual percent truncated to 4 places for display
    pub display_pct: f64,
}

/// Newton-Raphson IRR solver with a bisection fallback
#[derive(Debug, Clone, Default)]
pub struct IrrSolver {
    settings: IrrSettings,
}

impl IrrSolver {
    pub fn new(settings: IrrSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &IrrSettings {
        &self.settings
    }

    /// Solve and annualize
    pub fn solve(&self, cashflows: &[f64]) -> Result<IrrResult, ValuationError> {
        let periodic_rate = self.periodic_rate(cashflows)?;
        let annual_pct = self.settings.annualization.annualize(periodic_rate);
        Ok(IrrResult {
            periodic_rate,
            annual_pct,
            display_pct: floor_round(annual_pct, 4),
        })
    }

    /// Periodic rate `r` with `sum(cf_t / (1 + r)^t) = 0`
    pub fn periodic_rate(&self, cashflows: &[f64]) -> Result<f64, ValuationError> {
        if cashflows.is_empty() {
            return Err(self.no_convergence(0, "no cash flows"));
        }
        if cashflows.iter().any(|cf| !cf.is_finite()) {
            return Err(self.no_convergence(0, "cash flows contain a non-finite value"));
        }

        // At least one sign change is required for an IRR to exist
        let has_positive = cashflows.iter().any(|&cf| cf > SIGN_EPSILON);
        let has_negative = cashflows.iter().any(|&cf| cf < -SIGN_EPSILON);
        if !has_positive || !has_negative {
            return Err(self.no_convergence(0, "cash flows have no sign change"));
        }

        let tolerance = self.settings.tolerance;
        let gross: f64 = cashflows.iter().map(|cf| cf.abs()).sum();
        let mut rate = self.settings.initial_guess;

        for iteration in 0..self.settings.max_iterations {
            let (npv, dnpv) = npv_and_derivative(cashflows, rate);

            if !npv.is_finite() || !dnpv.is_finite() || dnpv.abs() < 1e-20 {
                // Derivative too small, try bisection instead
                log::warn!("IRR Newton step degenerate at iteration {}, falling back to bisection", iteration);
                return self.bisection(cashflows);
            }

            // Bound the rate to reasonable values
            let new_rate = (rate - npv / dnpv).clamp(MIN_RATE, MAX_RATE);

            if (new_rate - rate).abs() < tolerance {
                // A step pinned at a bound is not a root
                let residual = npv_at_rate(cashflows, new_rate);
                if residual.abs() <= ROOT_TOLERANCE * gross {
                    log::debug!("IRR converged by Newton-Raphson after {} iterations: {}", iteration + 1, new_rate);
                    return Ok(new_rate);
                }
                log::warn!(
                    "IRR Newton-Raphson stalled at {} with NPV {}, falling back to bisection",
                    new_rate,
                    residual
                );
                return self.bisection(cashflows);
            }

            rate = new_rate;
        }

        log::warn!(
            "IRR Newton-Raphson did not converge in {} iterations, falling back to bisection",
            self.settings.max_iterations
        );
        self.bisection(cashflows)
    }

    /// Fallback IRR calculation using bisection method
    fn bisection(&self, cashflows: &[f64]) -> Result<f64, ValuationError> {
        let tolerance = self.settings.tolerance;
        let mut low = MIN_RATE;
        let mut high = MAX_RATE;
        let mut npv_low = npv_at_rate(cashflows, low);
        let npv_high = npv_at_rate(cashflows, high);

        // Check that we have a root in this interval
        if !(npv_low.is_finite() && npv_high.is_finite()) || npv_low * npv_high > 0.0 {
            return Err(self.no_convergence(0, "no root bracketed between -99% and 1000% per period"));
        }

        for iteration in 0..self.settings.max_iterations {
            let mid = (low + high) / 2.0;
            let npv_mid = npv_at_rate(cashflows, mid);

            if npv_mid.abs() < tolerance || (high - low) / 2.0 < tolerance {
                log::debug!("IRR converged by bisection after {} iterations: {}", iteration + 1, mid);
                return Ok(mid);
            }

            if npv_mid * npv_low < 0.0 {
                high = mid;
            } else {
                low = mid;
                npv_low = npv_mid;
            }
        }

        Err(self.no_convergence(self.settings.max_iterations, "bisection exhausted its iterations"))
    }

    fn no_convergence(&self, iterations: u32, reason: &str) -> ValuationError {
        ValuationError::NoConvergence {
            iterations,
            reason: reason.to_string(),
        }
    }
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / (discount * (1.0 + rate));
        }
    }

    (npv, dnpv)
}

/// Calculate NPV at a given periodic rate
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}
