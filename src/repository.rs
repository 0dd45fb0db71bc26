// 🗄️ Account Repository - in-memory accounts synchronized with a flat CSV ledger
//
// The ledger file is rewritten in full on every save (truncate + write),
// never appended to. Memory and file only meet at load() and save().
//
// Lookups hand out an AccountHandle (a position in the sequence, stamped
// with the load generation) instead of a shared reference, so every
// mutation goes through the repository:
//
//   let h = repo.find("jane", "doe", "1234")?;
//   repo.withdraw(h, amount);
//   repo.persist(h)?;

use crate::account::{normalize_name, Account, LEDGER_HEADER};
use crate::error::{LedgerError, Result, RowError};
use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Position of an account inside its repository.
///
/// Handles stay valid until the next successful load(), which replaces the
/// sequence and bumps the generation; older handles are refused after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountHandle {
    index: usize,
    generation: u64,
}

impl AccountHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

pub struct AccountRepository {
    path: PathBuf,
    accounts: Vec<Account>,
    generation: u64,
}

impl AccountRepository {
    /// Bind to a ledger file and load it immediately.
    ///
    /// A missing file is fine (zero accounts); a malformed one is not.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut repo = AccountRepository {
            path: path.into(),
            accounts: Vec::new(),
            generation: 0,
        };
        repo.load()?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory accounts with the ledger file contents.
    ///
    /// The first row must exist and is skipped as the header without
    /// inspecting its contents. A missing header or any malformed row aborts
    /// the whole load and leaves memory (and outstanding handles) unchanged.
    pub fn load(&mut self) -> Result<()> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "ledger not found, starting empty");
                self.replace_accounts(Vec::new());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        // The header row is mandatory, even for a ledger with no accounts
        if rdr.headers()?.is_empty() {
            return Err(LedgerError::Parse {
                line: 1,
                source: RowError::MissingHeader,
            });
        }

        let mut accounts = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let fields: Vec<&str> = record.iter().collect();
            let account = Account::decode_row(&fields)
                .map_err(|source| LedgerError::Parse { line, source })?;
            accounts.push(account);
        }

        tracing::debug!(path = %self.path.display(), count = accounts.len(), "ledger loaded");
        self.replace_accounts(accounts);
        Ok(())
    }

    fn replace_accounts(&mut self, accounts: Vec<Account>) {
        self.accounts = accounts;
        self.generation += 1;
    }

    fn handle_at(&self, index: usize) -> AccountHandle {
        AccountHandle {
            index,
            generation: self.generation,
        }
    }

    fn slot_mut(&mut self, handle: AccountHandle) -> Option<&mut Account> {
        if handle.generation != self.generation {
            return None;
        }
        self.accounts.get_mut(handle.index)
    }

    /// Overwrite the ledger file: header, then one row per account in order.
    pub fn save(&self) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_path(&self.path)?;

        wtr.write_record(LEDGER_HEADER)?;
        for account in &self.accounts {
            wtr.write_record(account.encode_row())?;
        }
        wtr.flush()?;

        tracing::debug!(path = %self.path.display(), count = self.accounts.len(), "ledger saved");
        Ok(())
    }

    /// First account whose normalized full name and PIN both match.
    ///
    /// Linear scan; duplicates (same name + PIN) resolve to the earliest one.
    pub fn find(&self, first_name: &str, last_name: &str, pin: &str) -> Option<AccountHandle> {
        let full_name = format!("{} {}", normalize_name(first_name), normalize_name(last_name));

        self.accounts
            .iter()
            .position(|acc| acc.matches(&full_name, pin))
            .map(|index| self.handle_at(index))
    }

    /// Same as find(), returning the account itself
    pub fn find_account(&self, first_name: &str, last_name: &str, pin: &str) -> Option<&Account> {
        self.find(first_name, last_name, pin).and_then(|h| self.get(h))
    }

    /// None for a handle issued before the last load()
    pub fn get(&self, handle: AccountHandle) -> Option<&Account> {
        if handle.generation != self.generation {
            return None;
        }
        self.accounts.get(handle.index)
    }

    /// Deposit into the account behind `handle`. False on a refused amount
    /// or a stale handle.
    pub fn deposit(&mut self, handle: AccountHandle, amount: Decimal) -> bool {
        self.slot_mut(handle).is_some_and(|acc| acc.deposit(amount))
    }

    /// Withdraw from the account behind `handle`. False on a refused amount
    /// or a stale handle.
    pub fn withdraw(&mut self, handle: AccountHandle, amount: Decimal) -> bool {
        self.slot_mut(handle).is_some_and(|acc| acc.withdraw(amount))
    }

    /// Add a new account at the end. Nothing is written until save().
    pub fn append(&mut self, account: Account) -> AccountHandle {
        self.accounts.push(account);
        self.handle_at(self.accounts.len() - 1)
    }

    /// Flush after changing the account behind `handle`.
    ///
    /// Always writes the whole ledger, not just that one account.
    pub fn persist(&self, handle: AccountHandle) -> Result<()> {
        tracing::debug!(index = handle.index, "persisting account");
        self.save()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Unique ledger path under the system temp dir
    fn temp_ledger() -> PathBuf {
        std::env::temp_dir().join(format!("teller-repo-{}.csv", uuid::Uuid::new_v4()))
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let path = temp_ledger();
        let repo = AccountRepository::open(&path).unwrap();

        assert!(repo.is_empty());
        assert_eq!(repo.path(), path.as_path());
        // Opening does not create the file
        assert!(!path.exists());
    }

    #[test]
    fn test_load_and_find_normalizes_query() {
        let path = temp_ledger();
        fs::write(&path, "first_name,last_name,pin,balance\nJane,Doe,1234,100.00\n").unwrap();

        let repo = AccountRepository::open(&path).unwrap();
        let account = repo.find_account("jane", "DOE", "1234").unwrap();

        assert_eq!(account.full_name(), "Jane Doe");
        assert_eq!(account.balance(), dec("100.00"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_find_wrong_pin_is_none() {
        let path = temp_ledger();
        fs::write(&path, "first_name,last_name,pin,balance\nJane,Doe,1234,100.00\n").unwrap();

        let repo = AccountRepository::open(&path).unwrap();
        assert!(repo.find("Jane", "Doe", "4321").is_none());
        assert!(repo.find("Janet", "Doe", "1234").is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_find_first_match_wins() {
        let path = temp_ledger();
        let mut repo = AccountRepository::open(&path).unwrap();

        let first = repo.append(Account::new("Jo", "Smith", "1111", dec("1")));
        repo.append(Account::new("jo", "SMITH", "1111", dec("2")));

        assert_eq!(repo.find("jo", "smith", "1111"), Some(first));
    }

    #[test]
    fn test_header_row_is_skipped_unchecked() {
        let path = temp_ledger();
        fs::write(&path, "whatever,goes,in,here\nJane,Doe,1234,5\n").unwrap();

        let repo = AccountRepository::open(&path).unwrap();
        assert_eq!(repo.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let path = temp_ledger();
        fs::write(&path, "first_name,last_name,pin,balance\n").unwrap();

        let repo = AccountRepository::open(&path).unwrap();
        assert!(repo.is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_malformed_row_fails_whole_load() {
        let path = temp_ledger();
        fs::write(
            &path,
            "first_name,last_name,pin,balance\nJane,Doe,1234,100.00\nJo,Smith,4321,oops\n",
        )
        .unwrap();

        let err = AccountRepository::open(&path).err().unwrap();
        match err {
            LedgerError::Parse { line, source } => {
                assert_eq!(line, 3);
                assert_eq!(source, RowError::Balance { value: "oops".to_string() });
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_failed_reload_keeps_memory() {
        let path = temp_ledger();
        fs::write(&path, "first_name,last_name,pin,balance\nJane,Doe,1234,100.00\n").unwrap();
        let mut repo = AccountRepository::open(&path).unwrap();

        fs::write(&path, "first_name,last_name,pin,balance\nJane,Doe,1234\n").unwrap();
        assert!(matches!(repo.load(), Err(LedgerError::Parse { .. })));
        assert_eq!(repo.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_writes_header_and_rows() {
        let path = temp_ledger();
        let mut repo = AccountRepository::open(&path).unwrap();
        repo.append(Account::new("jane", "doe", "1234", dec("100")));
        repo.append(Account::new("jo", "smith", "4321", dec("50.5")));
        repo.save().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "first_name,last_name,pin,balance",
                "Jane,Doe,1234,100.00",
                "Jo,Smith,4321,50.50",
            ]
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_truncates_previous_contents() {
        let path = temp_ledger();
        fs::write(
            &path,
            "first_name,last_name,pin,balance\nA,B,1,1.00\nC,D,2,2.00\nE,F,3,3.00\n",
        )
        .unwrap();

        let mut repo = AccountRepository::open(&path).unwrap();
        repo.accounts.truncate(1);
        repo.save().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_mutation_by_handle_then_persist() {
        let path = temp_ledger();
        let mut repo = AccountRepository::open(&path).unwrap();
        repo.append(Account::new("Jo", "Smith", "4321", dec("50.00")));
        repo.save().unwrap();

        let handle = repo.find("jo", "smith", "4321").unwrap();
        assert!(repo.withdraw(handle, dec("30")));
        assert!(!repo.withdraw(handle, dec("30")));
        assert!(repo.deposit(handle, dec("5")));
        assert!(!repo.deposit(handle, dec("-5")));
        repo.persist(handle).unwrap();

        let reloaded = AccountRepository::open(&path).unwrap();
        let account = reloaded.find_account("Jo", "Smith", "4321").unwrap();
        assert_eq!(account.balance(), dec("25.00"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unsaved_changes_are_not_on_disk() {
        let path = temp_ledger();
        let mut repo = AccountRepository::open(&path).unwrap();
        repo.append(Account::new("Jo", "Smith", "4321", dec("50.00")));

        let other = AccountRepository::open(&path).unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_stale_handle_is_refused() {
        let path = temp_ledger();
        let mut repo = AccountRepository::open(&path).unwrap();
        let handle = repo.append(Account::new("Jo", "Smith", "4321", dec("50.00")));

        // Reload from the (missing) file drops the unsaved account
        repo.load().unwrap();
        assert!(repo.get(handle).is_none());
        assert!(!repo.deposit(handle, dec("1")));
        assert!(!repo.withdraw(handle, dec("1")));
    }

    #[test]
    fn test_handle_from_before_reload_is_refused() {
        let path = temp_ledger();
        let mut repo = AccountRepository::open(&path).unwrap();
        let jane = repo.append(Account::new("Jane", "Doe", "1234", dec("100.00")));

        // Another account now sits at the same position
        fs::write(&path, "first_name,last_name,pin,balance\nMallory,X,9999,5.00\n").unwrap();
        repo.load().unwrap();

        assert!(repo.get(jane).is_none());
        assert!(!repo.withdraw(jane, dec("5")));
        assert!(!repo.deposit(jane, dec("5")));
        assert_eq!(repo.accounts()[0].balance(), dec("5.00"));

        // Fresh lookups work again
        let mallory = repo.find("mallory", "x", "9999").unwrap();
        assert!(repo.withdraw(mallory, dec("5")));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_failed_reload_keeps_handles_valid() {
        let path = temp_ledger();
        fs::write(&path, "first_name,last_name,pin,balance\nJane,Doe,1234,100.00\n").unwrap();
        let mut repo = AccountRepository::open(&path).unwrap();
        let jane = repo.find("jane", "doe", "1234").unwrap();

        fs::write(&path, "first_name,last_name,pin,balance\nJane,Doe\n").unwrap();
        assert!(repo.load().is_err());
        assert!(repo.deposit(jane, dec("1")));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_file_is_missing_header() {
        let path = temp_ledger();
        fs::write(&path, "").unwrap();

        let err = AccountRepository::open(&path).err().unwrap();
        assert!(matches!(
            err,
            LedgerError::Parse { line: 1, source: RowError::MissingHeader }
        ));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_to_directory_fails() {
        let dir = temp_ledger();
        fs::create_dir(&dir).unwrap();

        let mut repo = AccountRepository::open(dir.join("ledger.csv")).unwrap();
        repo.append(Account::new("Jo", "Smith", "4321", dec("1")));
        repo.path = dir.clone();

        let err = repo.save().unwrap_err();
        assert!(matches!(err, LedgerError::Io(_) | LedgerError::Csv(_)), "got {:?}", err);

        fs::remove_dir(&dir).unwrap();
    }

    #[test]
    fn test_unreadable_ledger_is_an_error_not_empty() {
        // Exists, but cannot be read as a file
        let dir = temp_ledger();
        fs::create_dir(&dir).unwrap();

        let result = AccountRepository::open(&dir);
        assert!(matches!(result, Err(LedgerError::Io(_) | LedgerError::Csv(_))));

        fs::remove_dir(&dir).unwrap();
    }

    #[test]
    fn test_names_with_commas_survive_roundtrip() {
        let path = temp_ledger();
        let mut repo = AccountRepository::open(&path).unwrap();
        repo.append(Account::new("jr, john", "doe", "1234", dec("1")));
        repo.save().unwrap();

        let reloaded = AccountRepository::open(&path).unwrap();
        assert!(reloaded.find("Jr, John", "Doe", "1234").is_some());

        fs::remove_file(&path).unwrap();
    }
}
