//! Cash-flow schedule structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One month of the projected schedule.
///
/// Serialized column names follow the loan-tape report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    // Timing
    #[serde(rename = "Months")]
    pub month: u32,
    /// Contractual payments made by the end of this period
    #[serde(rename = "Paymnt_Count")]
    pub payment_count: u32,
    #[serde(rename = "Paydate")]
    pub pay_date: NaiveDate,

    // Contractual track
    #[serde(rename = "Scheduled_Principal")]
    pub scheduled_principal: f64,
    #[serde(rename = "Scheduled_Interest")]
    pub scheduled_interest: f64,
    #[serde(rename = "Scheduled_Balance")]
    pub scheduled_balance: f64,

    // Curve rates
    #[serde(rename = "Prepay_Speed")]
    pub prepay_speed: f64,
    /// Default hazard applied to this period's balance in the next month
    #[serde(rename = "Default_Rate")]
    pub default_rate: f64,

    // Cash flows
    #[serde(rename = "Recovery")]
    pub recovery: f64,
    #[serde(rename = "Servicing_CF")]
    pub servicing_cf: f64,
    #[serde(rename = "Earnout_CF")]
    pub earnout_cf: f64,

    // Actual track
    #[serde(rename = "Balance")]
    pub balance: f64,
    #[serde(rename = "Principal")]
    pub principal: f64,
    #[serde(rename = "Default")]
    pub default: f64,
    #[serde(rename = "Prepay")]
    pub prepay: f64,
    #[serde(rename = "Interest_Amount")]
    pub interest: f64,

    // Summary
    #[serde(rename = "Total_CF")]
    pub total_cf: f64,
}

impl Period {
    /// Create a period with every cash-flow field zeroed
    pub fn new(month: u32, pay_date: NaiveDate) -> Self {
        Self {
            month,
            payment_count: month,
            pay_date,
            scheduled_principal: 0.0,
            scheduled_interest: 0.0,
            scheduled_balance: 0.0,
            prepay_speed: 0.0,
            default_rate: 0.0,
            recovery: 0.0,
            servicing_cf: 0.0,
            earnout_cf: 0.0,
            balance: 0.0,
            principal: 0.0,
            default: 0.0,
            prepay: 0.0,
            interest: 0.0,
            total_cf: 0.0,
        }
    }
}

/// Complete month-by-month schedule for one loan, months 0..=term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    pub issue_date: NaiveDate,
    pub valuation_date: NaiveDate,

    /// Term in months
    pub term: u32,

    /// Scheduled payments (periods after funding)
    pub payment_count: u32,

    /// Payment dates on or before the valuation date
    pub seasoning_months: u32,

    /// Monthly rows, indexed by month
    pub periods: Vec<Period>,
}

impl CashFlowSchedule {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn period(&self, month: u32) -> Option<&Period> {
        self.periods.get(month as usize)
    }

    /// Net cash flow per month, funding first
    pub fn net_cash_flows(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.total_cf).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let total_principal: f64 = self.periods.iter().map(|p| p.principal).sum();
        let total_interest: f64 = self.periods.iter().map(|p| p.interest).sum();
        let total_default: f64 = self.periods.iter().map(|p| p.default).sum();
        let total_prepay: f64 = self.periods.iter().map(|p| p.prepay).sum();
        let total_recovery: f64 = self.periods.iter().map(|p| p.recovery).sum();
        let total_servicing: f64 = self.periods.iter().map(|p| p.servicing_cf).sum();
        let total_earnout: f64 = self.periods.iter().map(|p| p.earnout_cf).sum();
        let total_net_cf: f64 = self.periods.iter().map(|p| p.total_cf).sum();

        let final_balance = self.periods.last().map(|p| p.balance).unwrap_or(0.0);

        ScheduleSummary {
            total_months: self.payment_count,
            total_principal,
            total_interest,
            total_default,
            total_prepay,
            total_recovery,
            total_servicing,
            total_earnout,
            total_net_cf,
            final_balance,
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_months: u32,
    pub total_principal: f64,
    pub total_interest: f64,
    pub total_default: f64,
    pub total_prepay: f64,
    pub total_recovery: f64,
    pub total_servicing: f64,
    pub total_earnout: f64,
    pub total_net_cf: f64,
    pub final_balance: f64,
}
