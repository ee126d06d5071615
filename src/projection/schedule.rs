//! Monthly period axis for a loan

use super::cashflows::{CashFlowSchedule, Period};
use crate::error::ValuationError;
use crate::loan::{LoanTerms, MAX_TERM_MONTHS};
use chrono::{Months, NaiveDate};

/// Builds the empty schedule skeleton: months 0..=term with payment dates
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    issue_date: NaiveDate,
    valuation_date: NaiveDate,
    term: u32,
}

impl ScheduleBuilder {
    pub fn new(issue_date: NaiveDate, valuation_date: NaiveDate, term: u32) -> Self {
        Self {
            issue_date,
            valuation_date,
            term,
        }
    }

    pub fn from_terms(terms: &LoanTerms) -> Self {
        Self::new(terms.issue_date, terms.valuation_date, terms.term)
    }

    /// Payment date of month `month`: the issue date shifted by whole
    /// calendar months, clamped to the end of shorter months
    pub fn pay_date(&self, month: u32) -> Result<NaiveDate, ValuationError> {
        self.issue_date
            .checked_add_months(Months::new(month))
            .ok_or_else(|| {
                ValuationError::InvalidTerms(format!(
                    "payment date for month {} overflows the calendar",
                    month
                ))
            })
    }

    /// Produce `term + 1` zeroed periods. Month 0 is funding at the issue date.
    pub fn build(&self) -> Result<CashFlowSchedule, ValuationError> {
        if self.term == 0 {
            return Err(ValuationError::InvalidTerms("term must be at least one month".into()));
        }
        if self.term > MAX_TERM_MONTHS {
            return Err(ValuationError::InvalidTerms(format!(
                "term of {} months exceeds the {} month maximum",
                self.term, MAX_TERM_MONTHS
            )));
        }

        let periods = (0..=self.term)
            .map(|month| Ok(Period::new(month, self.pay_date(month)?)))
            .collect::<Result<Vec<_>, ValuationError>>()?;

        let seasoning_months = periods
            .iter()
            .skip(1)
            .filter(|p| p.pay_date <= self.valuation_date)
            .count() as u32;

        Ok(CashFlowSchedule {
            issue_date: self.issue_date,
            valuation_date: self.valuation_date,
            term: self.term,
            payment_count: self.term,
            seasoning_months,
            periods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_skeleton_shape() {
        let schedule = ScheduleBuilder::new(date(2015, 8, 24), date(2017, 12, 31), 36)
            .build()
            .unwrap();

        assert_eq!(schedule.len(), 37);
        assert_eq!(schedule.payment_count, 36);
        for (i, period) in schedule.periods.iter().enumerate() {
            assert_eq!(period.month as usize, i);
            assert_eq!(period.payment_count, period.month);
            assert_eq!(period.total_cf, 0.0);
            assert_eq!(period.balance, 0.0);
        }
    }

    #[test]
    fn test_dates_key_off_issue_date() {
        let schedule = ScheduleBuilder::new(date(2015, 8, 24), date(2017, 12, 31), 36)
            .build()
            .unwrap();

        assert_eq!(schedule.periods[0].pay_date, date(2015, 8, 24));
        assert_eq!(schedule.periods[1].pay_date, date(2015, 9, 24));
        assert_eq!(schedule.periods[36].pay_date, date(2018, 8, 24));
        // 2015-09-24 through 2017-12-24
        assert_eq!(schedule.seasoning_months, 28);
    }

    #[test]
    fn test_month_end_clamping() {
        let schedule = ScheduleBuilder::new(date(2016, 1, 31), date(2016, 1, 31), 3)
            .build()
            .unwrap();
        assert_eq!(schedule.periods[1].pay_date, date(2016, 2, 29));
        assert_eq!(schedule.periods[2].pay_date, date(2016, 3, 31));
        assert_eq!(schedule.seasoning_months, 0);
    }

    #[test]
    fn test_zero_term_rejected() {
        let result = ScheduleBuilder::new(date(2016, 1, 1), date(2016, 1, 1), 0).build();
        assert!(matches!(result, Err(ValuationError::InvalidTerms(_))));
    }

    #[test]
    fn test_oversized_term_rejected() {
        let result = ScheduleBuilder::new(date(2016, 1, 1), date(2016, 1, 1), u32::MAX).build();
        assert!(matches!(result, Err(ValuationError::InvalidTerms(_))));
        assert!(ScheduleBuilder::new(date(2016, 1, 1), date(2016, 1, 1), MAX_TERM_MONTHS)
            .build()
            .is_ok());
    }
}
