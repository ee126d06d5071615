//! Load loan terms from a JSON config file or a CSV loan tape

use super::{LoanTerms, RawLoanTerms};
use crate::error::InputError;
use csv::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a single loan from a JSON object with the raw field names
pub fn load_loan<P: AsRef<Path>>(path: P) -> Result<LoanTerms, InputError> {
    let file = File::open(path)?;
    load_loan_from_reader(BufReader::new(file))
}

/// Load a single loan from any JSON reader
pub fn load_loan_from_reader<R: std::io::Read>(reader: R) -> Result<LoanTerms, InputError> {
    let raw: RawLoanTerms = serde_json::from_reader(reader)?;
    raw.into_terms()
}

/// Load every loan on a CSV loan tape
pub fn load_loan_tape<P: AsRef<Path>>(path: P) -> Result<Vec<LoanTerms>, InputError> {
    let reader = Reader::from_path(path)?;
    read_tape(reader)
}

/// Load a loan tape from any reader (e.g., string buffer, network stream)
pub fn load_loan_tape_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanTerms>, InputError> {
    read_tape(Reader::from_reader(reader))
}

fn read_tape<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanTerms>, InputError> {
    let mut loans = Vec::new();

    for (row, result) in reader.deserialize().enumerate() {
        let raw: RawLoanTerms = result?;
        let mut terms = raw.into_terms()?;
        // Unnamed loans are identified by their tape row
        if terms.loan_id.is_none() {
            terms.loan_id = Some(format!("row-{}", row + 1));
        }
        loans.push(terms);
    }

    Ok(loans)
}
