//! Console, CSV and JSON output for valuations

use crate::error::InputError;
use crate::loan::LoanTerms;
use crate::projection::{CashFlowSchedule, round_to};
use crate::valuation::{BatchOutcome, LoanValuation};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Parameter/value table of the loan terms
pub fn write_terms<W: Write>(out: &mut W, terms: &LoanTerms) -> std::io::Result<()> {
    let rows: Vec<(&str, String)> = vec![
        ("Loan_ID", terms.loan_id.clone().unwrap_or_else(|| "-".into())),
        ("Valuation_Date", terms.valuation_date.to_string()),
        ("Grade", terms.grade.clone()),
        ("Issue_Date", terms.issue_date.to_string()),
        ("Term", terms.term.to_string()),
        ("CouponRate", format!("{}%", terms.coupon_rate * 100.0)),
        ("Invested", format!("${:.2}", terms.invested)),
        ("Outstanding_Balance", format!("${:.2}", terms.outstanding_balance)),
        ("Recovery_Rate", terms.recovery_rate.to_string()),
        ("Purchase_Premium", format!("{}%", terms.purchase_premium * 100.0)),
        ("Servicing_Fee", format!("{}%", terms.servicing_fee_rate * 100.0)),
        ("Earnout_Fee", format!("{}%", terms.earnout_fee_rate * 100.0)),
        ("Default_Multiplier", format!("{:.3}", terms.default_multiplier)),
        ("Prepay_Multiplier", format!("{:.3}", terms.prepay_multiplier)),
        (
            "Product_Pos",
            terms.curve_column.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
        ),
    ];

    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    writeln!(out, "{:<width$} | Value", "Parameter")?;
    writeln!(out, "{}", "-".repeat(width + 3 + 10))?;
    for (key, value) in rows {
        writeln!(out, "{:<width$} | {}", key, value)?;
    }
    Ok(())
}

/// One line per period; the default rate is shown in percent
pub fn write_schedule_table<W: Write>(out: &mut W, schedule: &CashFlowSchedule) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>5} {:>10} {:>10} {:>10} {:>11} {:>7} {:>7} {:>9} {:>9} {:>9} {:>11} {:>10} {:>9} {:>9} {:>9} {:>11}",
        "Month", "Paydate", "SchedPrin", "SchedInt", "SchedBal", "Prepay%", "Dflt%", "Recovery",
        "Servicing", "Earnout", "Balance", "Principal", "Default", "Prepay", "Interest", "Total_CF"
    )?;
    writeln!(out, "{}", "-".repeat(168))?;

    for p in &schedule.periods {
        writeln!(
            out,
            "{:>5} {:>10} {:>10.2} {:>10.2} {:>11.2} {:>7.4} {:>7.2} {:>9.2} {:>9.2} {:>9.2} {:>11.2} {:>10.2} {:>9.2} {:>9.2} {:>9.2} {:>11.2}",
            p.month,
            p.pay_date,
            p.scheduled_principal,
            p.scheduled_interest,
            p.scheduled_balance,
            p.prepay_speed,
            round_to(p.default_rate * 100.0, 2),
            p.recovery,
            p.servicing_cf,
            p.earnout_cf,
            p.balance,
            p.principal,
            p.default,
            p.prepay,
            p.interest,
            p.total_cf,
        )?;
    }
    Ok(())
}

/// Full console report: terms, schedule, summary and the IRR line
pub fn write_valuation<W: Write>(out: &mut W, valuation: &LoanValuation) -> std::io::Result<()> {
    write_terms(out, &valuation.terms)?;
    writeln!(out)?;
    write_schedule_table(out, &valuation.schedule)?;

    let summary = valuation.schedule.summary();
    writeln!(out)?;
    writeln!(out, "Summary:")?;
    writeln!(out, "  Months:          {}", summary.total_months)?;
    writeln!(out, "  Seasoning:       {} payments at valuation", valuation.schedule.seasoning_months)?;
    writeln!(out, "  Total Principal: ${:.2}", summary.total_principal)?;
    writeln!(out, "  Total Interest:  ${:.2}", summary.total_interest)?;
    writeln!(out, "  Total Defaults:  ${:.2}", summary.total_default)?;
    writeln!(out, "  Total Prepays:   ${:.2}", summary.total_prepay)?;
    writeln!(out, "  Total Recovery:  ${:.2}", summary.total_recovery)?;
    writeln!(out, "  Total Servicing: ${:.2}", summary.total_servicing)?;
    writeln!(out, "  Total Earnout:   ${:.2}", summary.total_earnout)?;
    writeln!(out, "  Net Cash Flow:   ${:.2}", summary.total_net_cf)?;
    writeln!(out)?;
    writeln!(out, "The IRR :  {}", valuation.irr.display_pct)?;
    Ok(())
}

/// Write the schedule as CSV, one row per period
pub fn write_schedule_csv<W: Write>(out: W, schedule: &CashFlowSchedule) -> Result<(), InputError> {
    let mut writer = csv::Writer::from_writer(out);
    for period in &schedule.periods {
        writer.serialize(period)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the schedule as a CSV file
pub fn save_schedule_csv(path: &Path, schedule: &CashFlowSchedule) -> Result<(), InputError> {
    let file = std::fs::File::create(path)?;
    write_schedule_csv(file, schedule)
}

/// One row of batch output
#[derive(Debug, Serialize)]
struct BatchRow<'a> {
    #[serde(rename = "Loan_ID")]
    loan_id: &'a str,
    #[serde(rename = "Grade")]
    grade: Option<&'a str>,
    #[serde(rename = "Term")]
    term: Option<u32>,
    #[serde(rename = "Invested")]
    invested: Option<f64>,
    #[serde(rename = "Net_CF")]
    net_cf: Option<f64>,
    #[serde(rename = "IRR")]
    irr: Option<f64>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// Write per-loan batch results as CSV; failed loans carry their error message
pub fn write_batch_csv<W: Write>(out: W, outcomes: &[BatchOutcome]) -> Result<(), InputError> {
    let mut writer = csv::Writer::from_writer(out);
    for outcome in outcomes {
        let loan_id = outcome.loan_id.as_deref().unwrap_or("-");
        let row = match &outcome.result {
            Ok(valuation) => BatchRow {
                loan_id,
                grade: Some(valuation.terms.grade.as_str()),
                term: Some(valuation.terms.term),
                invested: Some(valuation.terms.invested),
                net_cf: Some(round_to(valuation.schedule.summary().total_net_cf, 2)),
                irr: Some(valuation.irr.display_pct),
                error: None,
            },
            Err(e) => BatchRow {
                loan_id,
                grade: None,
                term: None,
                invested: None,
                net_cf: None,
                irr: None,
                error: Some(e.to_string()),
            },
        };
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Valuation as pretty-printed JSON
pub fn to_json(valuation: &LoanValuation) -> Result<String, InputError> {
    Ok(serde_json::to_string_pretty(valuation)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{CurveTable, LoanCurves};
    use crate::loan::sample_raw;
    use crate::projection::{IrrSolver, WaterfallEngine};
    use approx::assert_abs_diff_eq;

    fn valuation() -> LoanValuation {
        let terms = sample_raw().into_terms().unwrap();
        let curves = LoanCurves::new(
            CurveTable::flat("default", 0.004, 36),
            CurveTable::flat("prepay", 0.015, 36),
        );
        let schedule = WaterfallEngine::new(&terms, &curves).project().unwrap();
        let irr = IrrSolver::default().solve(&schedule.net_cash_flows()).unwrap();
        LoanValuation { terms, schedule, irr }
    }

    #[test]
    fn test_schedule_csv_layout() {
        let valuation = valuation();
        let mut buf = Vec::new();
        write_schedule_csv(&mut buf, &valuation.schedule).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Months,Paymnt_Count,Paydate,Scheduled_Principal,Scheduled_Interest,Scheduled_Balance,Prepay_Speed,Default_Rate,Recovery,Servicing_CF,Earnout_CF,Balance,Principal,Default,Prepay,Interest_Amount,Total_CF"
        );
        assert!(lines.next().unwrap().starts_with("0,0,2015-08-24,"));
        assert!(lines.next().unwrap().starts_with("1,1,2015-09-24,"));
        assert_eq!(text.lines().count(), 38);
    }

    #[test]
    fn test_console_report_ends_with_irr() {
        let valuation = valuation();
        let mut buf = Vec::new();
        write_valuation(&mut buf, &valuation).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Parameter"));
        assert!(text.lines().any(|l| l.starts_with("Grade ") && l.ends_with("| C4")));
        let last = text.lines().last().unwrap();
        assert_eq!(last, format!("The IRR :  {}", valuation.irr.display_pct));
    }

    #[test]
    fn test_json_round_trip_keeps_irr() {
        let valuation = valuation();
        let json = to_json(&valuation).unwrap();
        let parsed: LoanValuation = serde_json::from_str(&json).unwrap();
        assert_abs_diff_eq!(parsed.irr.periodic_rate, valuation.irr.periodic_rate, epsilon = 1e-15);
        assert_eq!(parsed.schedule.periods.len(), 37);
    }
}
