// 🏧 Teller session - the checks a teller window runs before touching the ledger
//
// Flow:
//   sign_in()      → remember which account is at the counter
//   transact()     → deposit / withdraw on that account, then flush the ledger
//   open_account() → validate, append, flush, and make it current
//
// Every validation failure is a TellerError whose Display is the message
// shown to the customer.

use crate::account::{format_balance, parse_amount, Account};
use crate::error::LedgerError;
use crate::repository::{AccountHandle, AccountRepository};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Shortest PIN accepted for a new account
pub const MIN_PIN_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum TellerError {
    #[error("Please enter valid name and numeric PIN.")]
    InvalidCredentials,

    #[error("Enter valid name and 4+ digit PIN.")]
    InvalidNewAccount,

    #[error("Enter a valid non-negative initial deposit.")]
    InvalidInitialDeposit,

    #[error("Account already exists.")]
    AccountExists,

    #[error("Please search for an account first.")]
    NoAccountSelected,

    #[error("Please enter a valid amount.")]
    InvalidAmount,

    #[error("No account to update.")]
    NoAccountToUpdate,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// What the customer sees about an account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub holder: String,
    #[serde(serialize_with = "serialize_balance")]
    pub balance: Decimal,
}

impl AccountSummary {
    fn of(account: &Account) -> Self {
        AccountSummary {
            holder: account.full_name(),
            balance: account.balance(),
        }
    }

    pub fn balance_line(&self) -> String {
        format!("Your account balance is: ${}", format_balance(self.balance))
    }
}

fn serialize_balance<S: serde::Serializer>(balance: &Decimal, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_balance(*balance))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdraw => "Withdraw",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOutcome {
    pub kind: TransactionKind,
    pub accepted: bool,
    pub balance: Decimal,
}

impl TransactionOutcome {
    pub fn message(&self) -> &'static str {
        match (self.kind, self.accepted) {
            (TransactionKind::Withdraw, true) => "Withdrawal successful.",
            (TransactionKind::Withdraw, false) => "Insufficient funds or invalid amount.",
            (TransactionKind::Deposit, true) => "Deposit successful.",
            (TransactionKind::Deposit, false) => "Invalid deposit amount.",
        }
    }
}

fn is_numeric_pin(pin: &str) -> bool {
    !pin.is_empty() && pin.chars().all(|c| c.is_ascii_digit())
}

pub struct Teller {
    repo: AccountRepository,
    current: Option<AccountHandle>,
}

impl Teller {
    pub fn new(repo: AccountRepository) -> Self {
        Teller { repo, current: None }
    }

    pub fn repository(&self) -> &AccountRepository {
        &self.repo
    }

    /// Summary of the account at the counter, if any
    pub fn current(&self) -> Option<AccountSummary> {
        self.current
            .and_then(|h| self.repo.get(h))
            .map(AccountSummary::of)
    }

    pub fn sign_out(&mut self) {
        self.current = None;
    }

    /// Look up the customer. A miss clears the current account and
    /// returns None.
    pub fn sign_in(
        &mut self,
        first_name: &str,
        last_name: &str,
        pin: &str,
    ) -> Result<Option<AccountSummary>, TellerError> {
        let (first, last, pin) = (first_name.trim(), last_name.trim(), pin.trim());
        if first.is_empty() || last.is_empty() || !is_numeric_pin(pin) {
            return Err(TellerError::InvalidCredentials);
        }

        self.current = self.repo.find(first, last, pin);
        let summary = self.current();

        match &summary {
            Some(s) => tracing::info!(holder = %s.holder, "signed in"),
            None => tracing::warn!("sign-in failed: account not found or wrong PIN"),
        }

        Ok(summary)
    }

    /// Create a new account, write the ledger, and make it current.
    pub fn open_account(
        &mut self,
        first_name: &str,
        last_name: &str,
        pin: &str,
        initial_deposit: &str,
    ) -> Result<AccountSummary, TellerError> {
        let (first, last, pin) = (first_name.trim(), last_name.trim(), pin.trim());
        if first.is_empty() || last.is_empty() || !is_numeric_pin(pin) || pin.len() < MIN_PIN_LEN {
            return Err(TellerError::InvalidNewAccount);
        }

        let deposit = parse_amount(initial_deposit.trim())
            .filter(|amount| *amount >= Decimal::ZERO)
            .ok_or(TellerError::InvalidInitialDeposit)?;

        if self.repo.find(first, last, pin).is_some() {
            return Err(TellerError::AccountExists);
        }

        let handle = self.repo.append(Account::new(first, last, pin, deposit));
        self.repo.save()?;
        self.current = Some(handle);

        let summary = self.current().ok_or(TellerError::NoAccountSelected)?;
        tracing::info!(holder = %summary.holder, balance = %summary.balance, "account opened");
        Ok(summary)
    }

    /// Apply a deposit or withdrawal to the current account and flush the
    /// ledger. A refused amount is not an error: see `accepted`.
    pub fn transact(
        &mut self,
        kind: TransactionKind,
        amount: &str,
    ) -> Result<TransactionOutcome, TellerError> {
        let handle = self.current.ok_or(TellerError::NoAccountSelected)?;
        let amount = parse_amount(amount.trim()).ok_or(TellerError::InvalidAmount)?;

        let accepted = match kind {
            TransactionKind::Deposit => self.repo.deposit(handle, amount),
            TransactionKind::Withdraw => self.repo.withdraw(handle, amount),
        };
        self.repo.persist(handle)?;

        let balance = self
            .repo
            .get(handle)
            .map(Account::balance)
            .ok_or(TellerError::NoAccountSelected)?;

        if accepted {
            tracing::info!(kind = kind.as_str(), %amount, %balance, "transaction accepted");
        } else {
            tracing::warn!(kind = kind.as_str(), %amount, %balance, "transaction refused");
        }

        Ok(TransactionOutcome { kind, accepted, balance })
    }

    /// Flush the ledger on behalf of the current account
    pub fn save_current(&self) -> Result<(), TellerError> {
        let handle = self.current.ok_or(TellerError::NoAccountToUpdate)?;
        self.repo.persist(handle)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
