// 💳 Account - one holder, one PIN, one balance
//
// Fields are private: the only way to move money is deposit()/withdraw(),
// and both leave the balance untouched when they refuse an amount.
//
// Ledger row layout (see LEDGER_HEADER):
//   first_name,last_name,pin,balance
//   Jane,Doe,1234,100.00

use crate::error::RowError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Header row written at the top of every ledger file
pub const LEDGER_HEADER: [&str; 4] = ["first_name", "last_name", "pin", "balance"];

// ============================================================================
// NAME NORMALIZATION
// ============================================================================

/// Title-case a holder name: first letter of each whitespace-delimited
/// token upper-cased, everything else lower-cased. Whitespace is kept as-is.
///
/// Example: "mary ANN" → "Mary Ann"
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_token_start = true;

    for ch in raw.chars() {
        if ch.is_whitespace() {
            at_token_start = true;
            out.push(ch);
        } else if at_token_start {
            out.extend(ch.to_uppercase());
            at_token_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    out
}

// ============================================================================
// ACCOUNT
// ============================================================================

/// A single bank account record.
///
/// Identity for lookups is (full name, PIN); there is no synthetic id.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    first_name: String,
    last_name: String,
    pin: String,
    balance: Decimal,
}

impl Account {
    /// Create an account. Names are normalized, PIN and balance are stored
    /// verbatim (no format or sign checks at this layer).
    pub fn new(first_name: &str, last_name: &str, pin: impl Into<String>, balance: Decimal) -> Self {
        Account {
            first_name: normalize_name(first_name),
            last_name: normalize_name(last_name),
            pin: pin.into(),
            balance,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// "{first} {last}" using the normalized forms
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Exact string comparison, no trimming
    pub fn validate_pin(&self, candidate: &str) -> bool {
        self.pin == candidate
    }

    /// Add `amount` to the balance. Refuses zero and negative amounts, and
    /// anything that would overflow the decimal range.
    pub fn deposit(&mut self, amount: Decimal) -> bool {
        if amount <= Decimal::ZERO {
            return false;
        }
        match self.balance.checked_add(amount) {
            Some(balance) => {
                self.balance = balance;
                true
            }
            None => false,
        }
    }

    /// Take `amount` from the balance. Refuses non-positive amounts and
    /// anything above the current balance.
    pub fn withdraw(&mut self, amount: Decimal) -> bool {
        if amount > Decimal::ZERO && amount <= self.balance {
            self.balance -= amount;
            return true;
        }
        false
    }

    /// Encode as a ledger row, balance with exactly two decimals
    pub fn encode_row(&self) -> [String; 4] {
        [
            self.first_name.clone(),
            self.last_name.clone(),
            self.pin.clone(),
            format_balance(self.balance),
        ]
    }

    /// Decode one ledger row (header already skipped).
    ///
    /// Fails when the row does not have exactly four fields or when the
    /// balance column is not a number. Whitespace is not trimmed.
    pub fn decode_row<S: AsRef<str>>(row: &[S]) -> Result<Account, RowError> {
        let [first_name, last_name, pin, balance] = row else {
            return Err(RowError::FieldCount { found: row.len() });
        };

        let balance = parse_amount(balance.as_ref()).ok_or_else(|| RowError::Balance {
            value: balance.as_ref().to_string(),
        })?;

        Ok(Account::new(first_name.as_ref(), last_name.as_ref(), pin.as_ref(), balance))
    }

    /// True when both the normalized full name and the PIN match
    pub(crate) fn matches(&self, full_name: &str, pin: &str) -> bool {
        self.full_name() == full_name && self.validate_pin(pin)
    }
}

// ============================================================================
// AMOUNT HELPERS
// ============================================================================

/// Parse a base-10 amount the way a float parser would: plain decimals
/// ("12", "12.5", "-3.25") and scientific notation ("1e2").
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Render an amount with exactly two decimals ("50" → "50.00")
pub fn format_balance(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);

    // rescale() is a no-op when the integer part leaves no room for cents
    let mut out = rounded.to_string();
    match rounded.scale() {
        0 => out.push_str(".00"),
        1 => out.push('0'),
        _ => {}
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
