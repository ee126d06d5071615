//! CSV-based curve loader
//!
//! Loads the charged-off and prepayment tables from data/curves/

use super::CurveSet;
use crate::error::InputError;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Default path to the curves directory
pub const DEFAULT_CURVES_PATH: &str = "data/curves";

/// Default file name of the charged-off (default-rate) table
pub const CHARGED_OFF_FILE: &str = "charged_off.csv";

/// Default file name of the prepayment-speed table
pub const PREPAY_FILE: &str = "prepay.csv";

/// Load a curve table from a CSV file.
/// The first column holds the loan age; empty cells are left without an entry.
pub fn load_curve_set(path: &Path) -> Result<CurveSet, InputError> {
    let file = File::open(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    load_curve_set_from_reader(&name, file)
}

/// Load a curve table from any reader
pub fn load_curve_set_from_reader<R: std::io::Read>(name: &str, reader: R) -> Result<CurveSet, InputError> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.len() < 2 {
        return Err(InputError::curve_table(name, "expected an age column and at least one curve column"));
    }

    let mut rows = BTreeMap::new();

    for result in reader.records() {
        let record = result?;
        let age_field = record.get(0).unwrap_or("").trim();
        // Ages may be written as 1 or 1.0
        let age = age_field
            .parse::<u32>()
            .ok()
            .or_else(|| {
                age_field
                    .parse::<f64>()
                    .ok()
                    .filter(|a| a.fract() == 0.0 && *a >= 0.0 && *a <= u32::MAX as f64)
                    .map(|a| a as u32)
            })
            .ok_or_else(|| InputError::parse(&format!("{}.{}", name, headers[0]), age_field, "expected a whole loan age"))?;

        let mut values = Vec::with_capacity(headers.len() - 1);
        for (position, header) in headers.iter().enumerate().skip(1) {
            let cell = record.get(position).unwrap_or("").trim();
            if cell.is_empty() {
                values.push(None);
                continue;
            }
            let rate: f64 = cell
                .parse()
                .map_err(|e: std::num::ParseFloatError| {
                    InputError::parse(&format!("{}.{}[age {}]", name, header, age), cell, e.to_string())
                })?;
            values.push(Some(rate));
        }

        if rows.insert(age, values).is_some() {
            return Err(InputError::curve_table(name, format!("duplicate row for age {}", age)));
        }
    }

    log::debug!("loaded curve table {} with {} columns and {} ages", name, headers.len() - 1, rows.len());

    Ok(CurveSet::new(name, headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_reader() {
        let csv = "Age,36,60\n1,0.010,0.008\n2,0.012,\n3.0,0.014,0.011\n";
        let set = load_curve_set_from_reader("prepay", csv.as_bytes()).unwrap();

        assert_eq!(set.column_names(), &["36".to_string(), "60".to_string()]);
        assert_eq!(set.ages().collect::<Vec<_>>(), vec![1, 2, 3]);

        let sixty = set.column("60").unwrap();
        assert_eq!(sixty.len(), 2);
        assert!(sixty.rate(2).is_err());
    }

    #[test]
    fn test_bad_cell_is_reported() {
        let csv = "Age,A1\n1,0.01\n2,n/a\n";
        let err = load_curve_set_from_reader("charged_off", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::Parse { ref value, .. } if value == "n/a"));
    }

    #[test]
    fn test_duplicate_age_rejected() {
        let csv = "Age,A1\n1,0.01\n1,0.02\n";
        assert!(matches!(
            load_curve_set_from_reader("charged_off", csv.as_bytes()),
            Err(InputError::CurveTable { .. })
        ));
    }
}
