//! Loan terms and the parsing of human-formatted input literals

use crate::error::{InputError, ValuationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Longest supported loan term (50 years)
pub const MAX_TERM_MONTHS: u32 = 600;

/// Typed, immutable terms of a single purchased loan position.
///
/// All rates are decimal fractions (0.025 for 2.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Identifier carried through batch output
    pub loan_id: Option<String>,

    pub issue_date: NaiveDate,
    pub valuation_date: NaiveDate,

    /// Term in months
    pub term: u32,

    /// Annual coupon rate
    pub coupon_rate: f64,

    /// Amount funded at issuance
    pub invested: f64,

    /// Outstanding balance at valuation (informational only)
    pub outstanding_balance: f64,

    /// Fraction of defaulted principal recovered
    pub recovery_rate: f64,

    /// Premium paid over par at purchase
    pub purchase_premium: f64,

    /// Annual servicing fee rate
    pub servicing_fee_rate: f64,

    /// Earnout fee rate, paid half at each milestone month
    pub earnout_fee_rate: f64,

    pub default_multiplier: f64,
    pub prepay_multiplier: f64,

    /// Credit grade, e.g. "C4"
    pub grade: String,

    /// Header position of the grade column in the charged-off table.
    /// When absent the column is looked up by grade name.
    pub curve_column: Option<usize>,
}

impl LoanTerms {
    /// Monthly coupon rate
    pub fn monthly_rate(&self) -> f64 {
        self.coupon_rate / 12.0
    }

    /// Column label of the prepayment curve for this loan's term bucket
    pub fn term_bucket(&self) -> String {
        self.term.to_string()
    }

    /// Check the invariants the projection relies on
    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.term == 0 {
            return Err(ValuationError::InvalidTerms("term must be at least one month".into()));
        }
        if self.term > MAX_TERM_MONTHS {
            return Err(ValuationError::InvalidTerms(format!(
                "term of {} months exceeds the {} month maximum",
                self.term, MAX_TERM_MONTHS
            )));
        }
        if !(self.invested.is_finite() && self.invested > 0.0) {
            return Err(ValuationError::InvalidTerms(format!(
                "invested amount must be positive, got {}",
                self.invested
            )));
        }
        if !(0.0..=1.0).contains(&self.recovery_rate) {
            return Err(ValuationError::InvalidTerms(format!(
                "recovery rate must be within [0, 1], got {}",
                self.recovery_rate
            )));
        }
        if self.default_multiplier < 0.0 || self.prepay_multiplier < 0.0 {
            return Err(ValuationError::InvalidTerms(
                "default and prepay multipliers must be non-negative".into(),
            ));
        }
        let rates = [
            ("coupon rate", self.coupon_rate),
            ("purchase premium", self.purchase_premium),
            ("servicing fee", self.servicing_fee_rate),
            ("earnout fee", self.earnout_fee_rate),
        ];
        for (name, rate) in rates {
            if !rate.is_finite() {
                return Err(ValuationError::InvalidTerms(format!("{} is not a number", name)));
            }
        }
        Ok(())
    }

    /// Copy of these terms with different stress multipliers
    pub fn with_multipliers(&self, default_multiplier: f64, prepay_multiplier: f64) -> Self {
        Self {
            default_multiplier,
            prepay_multiplier,
            ..self.clone()
        }
    }
}

/// Loan terms as they arrive from a config file or loan tape, before parsing.
///
/// Percentages and currency amounts are formatted strings ("28.0%",
/// "$7,500.00"); dates are `M/D/YYYY` or ISO.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLoanTerms {
    #[serde(rename = "Loan_ID", default)]
    pub loan_id: Option<String>,
    #[serde(rename = "Valuation_Date")]
    pub valuation_date: String,
    #[serde(rename = "Grade")]
    pub grade: String,
    #[serde(rename = "Issue_Date")]
    pub issue_date: String,
    #[serde(rename = "Term")]
    pub term: f64,
    #[serde(rename = "CouponRate")]
    pub coupon_rate: String,
    #[serde(rename = "Invested")]
    pub invested: String,
    #[serde(rename = "Outstanding_Balance")]
    pub outstanding_balance: String,
    #[serde(rename = "Recovery_Rate")]
    pub recovery_rate: f64,
    #[serde(rename = "Purchase_Premium")]
    pub purchase_premium: String,
    #[serde(rename = "Servicing_Fee")]
    pub servicing_fee: String,
    #[serde(rename = "Earnout_Fee")]
    pub earnout_fee: String,
    #[serde(rename = "Default_Multiplier")]
    pub default_multiplier: f64,
    #[serde(rename = "Prepay_Multiplier")]
    pub prepay_multiplier: f64,
    #[serde(rename = "Product_Pos", default)]
    pub product_pos: Option<usize>,
    // Legacy flat default rate; the curves drive defaults
    #[serde(rename = "Default_Rate", default)]
    _default_rate: Option<f64>,
}

impl RawLoanTerms {
    /// Parse every formatted field into a typed `LoanTerms`
    pub fn into_terms(self) -> Result<LoanTerms, InputError> {
        if self.term.fract() != 0.0 || self.term < 1.0 {
            return Err(InputError::parse(
                "Term",
                &self.term.to_string(),
                "expected a positive whole number of months",
            ));
        }
        if self.term > MAX_TERM_MONTHS as f64 {
            return Err(InputError::parse(
                "Term",
                &self.term.to_string(),
                format!("at most {} months", MAX_TERM_MONTHS),
            ));
        }

        Ok(LoanTerms {
            loan_id: self.loan_id.filter(|id| !id.trim().is_empty()),
            issue_date: parse_date("Issue_Date", &self.issue_date)?,
            valuation_date: parse_date("Valuation_Date", &self.valuation_date)?,
            term: self.term as u32,
            coupon_rate: parse_percent("CouponRate", &self.coupon_rate)?,
            invested: parse_currency("Invested", &self.invested)?,
            outstanding_balance: parse_currency("Outstanding_Balance", &self.outstanding_balance)?,
            recovery_rate: self.recovery_rate,
            purchase_premium: parse_percent("Purchase_Premium", &self.purchase_premium)?,
            servicing_fee_rate: parse_percent("Servicing_Fee", &self.servicing_fee)?,
            earnout_fee_rate: parse_percent("Earnout_Fee", &self.earnout_fee)?,
            default_multiplier: self.default_multiplier,
            prepay_multiplier: self.prepay_multiplier,
            grade: self.grade.trim().to_string(),
            curve_column: self.product_pos,
        })
    }
}

/// Parse a percentage literal such as "2.50%" into a fraction (0.025).
/// A bare number is read as a percentage too.
pub fn parse_percent(field: &str, value: &str) -> Result<f64, InputError> {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '%' && !c.is_whitespace())
        .collect();
    let pct: f64 = cleaned
        .parse()
        .map_err(|e: std::num::ParseFloatError| InputError::parse(field, value, e.to_string()))?;
    if !pct.is_finite() {
        return Err(InputError::parse(field, value, "not a finite number"));
    }
    Ok(pct / 100.0)
}

/// Parse a currency literal such as "$7,500.00"
pub fn parse_currency(field: &str, value: &str) -> Result<f64, InputError> {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    let amount: f64 = cleaned
        .parse()
        .map_err(|e: std::num::ParseFloatError| InputError::parse(field, value, e.to_string()))?;
    if !amount.is_finite() {
        return Err(InputError::parse(field, value, "not a finite number"));
    }
    Ok(amount)
}

/// Parse a date in `M/D/YYYY` or `YYYY-MM-DD` form
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, InputError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map_err(|e| InputError::parse(field, value, e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    pub(crate) fn sample_raw() -> RawLoanTerms {
        RawLoanTerms {
            loan_id: None,
            valuation_date: "12/31/2017".into(),
            grade: "C4".into(),
            issue_date: "8/24/2015".into(),
            term: 36.0,
            coupon_rate: "28.0007632124385%".into(),
            invested: "$7,500.00".into(),
            outstanding_balance: "$3,228.61".into(),
            recovery_rate: 0.08,
            purchase_premium: "5.1422082%".into(),
            servicing_fee: "2.50%".into(),
            earnout_fee: "2.50%".into(),
            default_multiplier: 1.0,
            prepay_multiplier: 1.0,
            product_pos: None,
            _default_rate: Some(0.03),
        }
    }

    #[test]
    fn test_parse_percent() {
        assert_abs_diff_eq!(parse_percent("x", "2.50%").unwrap(), 0.025, epsilon = 1e-15);
        assert_abs_diff_eq!(parse_percent("x", " 28.0007632124385 % ").unwrap(), 0.280007632124385, epsilon = 1e-15);
        assert_abs_diff_eq!(parse_percent("x", "5").unwrap(), 0.05, epsilon = 1e-15);
        assert!(parse_percent("x", "abc%").is_err());
    }

    #[test]
    fn test_parse_currency() {
        assert_abs_diff_eq!(parse_currency("x", "$7,500.00").unwrap(), 7500.0);
        assert_abs_diff_eq!(parse_currency("x", "$3,228.61").unwrap(), 3228.61);
        assert!(matches!(
            parse_currency("Invested", "7,500.00 USD"),
            Err(InputError::Parse { ref field, .. }) if field == "Invested"
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2015, 8, 24).unwrap();
        assert_eq!(parse_date("d", "8/24/2015").unwrap(), expected);
        assert_eq!(parse_date("d", "2015-08-24").unwrap(), expected);
        assert!(parse_date("d", "24.08.2015").is_err());
    }

    #[test]
    fn test_into_terms() {
        let terms = sample_raw().into_terms().unwrap();
        assert_eq!(terms.term, 36);
        assert_eq!(terms.grade, "C4");
        assert_eq!(terms.term_bucket(), "36");
        assert_abs_diff_eq!(terms.invested, 7500.0);
        assert_abs_diff_eq!(terms.purchase_premium, 0.051422082, epsilon = 1e-15);
        assert_abs_diff_eq!(terms.servicing_fee_rate, 0.025, epsilon = 1e-15);
        assert!(terms.validate().is_ok());
    }

    #[test]
    fn test_fractional_term_rejected() {
        let mut raw = sample_raw();
        raw.term = 36.5;
        assert!(matches!(raw.into_terms(), Err(InputError::Parse { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_terms() {
        let mut terms = sample_raw().into_terms().unwrap();
        terms.recovery_rate = 1.5;
        assert!(matches!(terms.validate(), Err(ValuationError::InvalidTerms(_))));

        let mut terms = sample_raw().into_terms().unwrap();
        terms.prepay_multiplier = -1.0;
        assert!(terms.validate().is_err());
    }

    #[test]
    fn test_term_capped() {
        let mut raw = sample_raw();
        raw.term = 600.0;
        assert!(raw.into_terms().is_ok());

        let mut raw = sample_raw();
        raw.term = 4_294_967_295.0;
        assert!(matches!(
            raw.into_terms(),
            Err(InputError::Parse { ref field, .. }) if field == "Term"
        ));

        let mut terms = sample_raw().into_terms().unwrap();
        terms.term = MAX_TERM_MONTHS + 1;
        assert!(matches!(terms.validate(), Err(ValuationError::InvalidTerms(_))));
    }
}
