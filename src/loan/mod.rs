//! Loan terms and their loading from config files and loan tapes

mod terms;
pub mod loader;

pub use terms::{LoanTerms, RawLoanTerms, MAX_TERM_MONTHS, parse_percent, parse_currency, parse_date};
pub use loader::{load_loan, load_loan_from_reader, load_loan_tape, load_loan_tape_from_reader};

#[cfg(test)]
pub(crate) use terms::tests::sample_raw;
