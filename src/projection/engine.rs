//! Monthly cash-flow waterfall for a single loan

use super::amortization::LevelPayment;
use super::cashflows::{CashFlowSchedule, Period};
use super::rounding::{bank_round, round_to};
use super::schedule::ScheduleBuilder;
use crate::curves::CurveProvider;
use crate::error::ValuationError;
use crate::loan::LoanTerms;

/// Months at which half of the earnout fee is paid
pub const EARNOUT_MONTHS: [u32; 2] = [12, 18];

/// Projects one loan's schedule, month by month.
///
/// Each month depends on the previous month's actual balance, scheduled
/// balance and default rate, so the recurrence runs strictly forward.
pub struct WaterfallEngine<'a, C: CurveProvider + ?Sized> {
    terms: &'a LoanTerms,
    curves: &'a C,
}

impl<'a, C: CurveProvider + ?Sized> WaterfallEngine<'a, C> {
    pub fn new(terms: &'a LoanTerms, curves: &'a C) -> Self {
        Self { terms, curves }
    }

    /// Validate the terms, build the period axis and run the waterfall
    pub fn project(&self) -> Result<CashFlowSchedule, ValuationError> {
        self.terms.validate()?;
        let skeleton = ScheduleBuilder::from_terms(self.terms).build()?;
        self.populate(skeleton)
    }

    /// Fill a skeleton of `term + 1` zeroed periods.
    ///
    /// The terms are not re-validated here.
    pub fn populate(&self, mut schedule: CashFlowSchedule) -> Result<CashFlowSchedule, ValuationError> {
        let term = self.terms.term;
        if schedule.periods.len() != term as usize + 1 {
            return Err(ValuationError::InvalidTerms(format!(
                "schedule has {} periods, expected {}",
                schedule.periods.len(),
                term + 1
            )));
        }

        let amortization = LevelPayment::new(self.terms.invested, self.terms.monthly_rate(), term);

        self.fund(&mut schedule.periods[0])?;

        for index in 1..schedule.periods.len() {
            let (done, rest) = schedule.periods.split_at_mut(index);
            self.calculate_month(&done[index - 1], &mut rest[0], &amortization)?;
        }

        Ok(schedule)
    }

    /// Month 0: the purchase at issuance
    fn fund(&self, row: &mut Period) -> Result<(), ValuationError> {
        let invested = self.terms.invested;

        row.scheduled_principal = 0.0;
        row.scheduled_interest = 0.0;
        row.prepay_speed = 0.0;
        row.default = 0.0;
        row.prepay = 0.0;
        row.servicing_cf = 0.0;
        row.recovery = 0.0;
        row.interest = 0.0;
        row.earnout_cf = 0.0;
        row.principal = 0.0;

        row.balance = invested;
        row.scheduled_balance = invested;
        row.total_cf = round_to(-invested * (1.0 + self.terms.purchase_premium), 2);
        row.default_rate = self.hazard_after(row.month)?;

        Ok(())
    }

    /// Calculate cash flows for a single month from the month before it
    fn calculate_month(
        &self,
        prev: &Period,
        row: &mut Period,
        amortization: &LevelPayment,
    ) -> Result<(), ValuationError> {
        let terms = self.terms;
        let month = row.month;
        let prev_balance = prev.balance;
        let prev_scheduled_balance = prev.scheduled_balance;

        // Earnout, paid in halves at the milestone months
        let earnout_cf = if EARNOUT_MONTHS.contains(&month) {
            terms.earnout_fee_rate / 2.0 * terms.invested
        } else {
            0.0
        };
        row.earnout_cf = earnout_cf;

        // Contractual track
        let scheduled_principal = round_to(amortization.principal_component(month), 12);
        row.scheduled_principal = scheduled_principal;
        row.scheduled_balance = bank_round((prev_scheduled_balance - scheduled_principal).max(0.0), 12);

        let scheduled_interest = amortization.payment() - scheduled_principal;
        row.scheduled_interest = scheduled_interest;

        // The scheduled balance is the pro-rata divisor for both prepay and principal
        if prev_scheduled_balance <= 0.0 {
            return Err(ValuationError::DegenerateSchedule { month, field: "prepay" });
        }

        // Prepayment
        let prepay_speed = self
            .curves
            .prepay_speed(month)
            .map_err(|source| ValuationError::CurveLookup {
                month,
                field: "prepay_speed",
                source,
            })?;
        row.prepay_speed = round_to(prepay_speed, 4);

        let prepay = (prev_balance
            - ((prev_balance - scheduled_interest) / prev_scheduled_balance) * scheduled_principal)
            * prepay_speed
            * terms.prepay_multiplier;
        row.prepay = round_to(prepay, 2);

        // Default uses last month's hazard on last month's balance
        let default = prev_balance * prev.default_rate * terms.default_multiplier;
        row.default = round_to(default, 2);

        let principal = (prev_balance - default) / prev_scheduled_balance * scheduled_principal + prepay;
        row.principal = round_to(principal, 2);

        // Actual balance, floored at zero
        let balance = prev_balance - default - principal;
        if balance < 0.0 {
            log::debug!("month {}: balance {:.6} floored at zero", month, balance);
        }
        row.balance = bank_round(balance.max(0.0), 16);

        let surviving_balance = prev_balance - default;

        let servicing_cf = surviving_balance * terms.servicing_fee_rate / 12.0;
        row.servicing_cf = round_to(servicing_cf, 2);

        let recovery = default * terms.recovery_rate;
        row.recovery = round_to(recovery, 2);

        let interest = surviving_balance * terms.coupon_rate / 12.0;
        row.interest = round_to(interest, 2);

        // Net cash flow is built from the unrounded components
        let total_cf = principal + interest + recovery - servicing_cf - earnout_cf;
        row.total_cf = round_to(total_cf, 2);

        row.default_rate = self.hazard_after(month)?;

        log::trace!(
            "month {}: balance={:.2} principal={:.2} default={:.2} prepay={:.2} total_cf={:.2}",
            month,
            row.balance,
            row.principal,
            row.default,
            row.prepay,
            row.total_cf
        );

        Ok(())
    }

    /// Default rate recorded on `month`'s row: the hazard for the loan age
    /// entered in the following month. Nothing follows the final month.
    fn hazard_after(&self, month: u32) -> Result<f64, ValuationError> {
        if month >= self.terms.term {
            return Ok(0.0);
        }
        let age = month + 1;
        self.curves
            .default_rate(age)
            .map_err(|source| ValuationError::CurveLookup {
                month,
                field: "default_rate",
                source,
            })
    }
}
