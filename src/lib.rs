// Teller Ledger - Core Library
// Account records, the CSV-backed repository, and the teller session on top

pub mod account;
pub mod config;
pub mod error;
pub mod logging;
pub mod repository;
pub mod teller;

// Re-export commonly used types
pub use account::{format_balance, normalize_name, parse_amount, Account, LEDGER_HEADER};
pub use config::TellerConfig;
pub use error::{LedgerError, Result, RowError};
pub use repository::{AccountHandle, AccountRepository};
pub use teller::{AccountSummary, Teller, TellerError, TransactionKind, TransactionOutcome};
