// Ledger errors - one typed enum for everything the core can fail on
//
// Lookup misses and rejected deposits/withdrawals are NOT errors:
// they come back as Option / bool. Only I/O and row decoding end up here.

use thiserror::Error;

/// A single ledger row could not be turned into an Account
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("expected 4 fields (first_name,last_name,pin,balance), found {found}")]
    FieldCount { found: usize },

    #[error("balance is not a number: {value:?}")]
    Balance { value: String },

    #[error("missing header row")]
    MissingHeader,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed ledger row at line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: RowError,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
