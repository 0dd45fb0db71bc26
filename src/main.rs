// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use teller_ledger::logging::{self, LogSink};
use teller_ledger::{AccountRepository, Teller, TellerConfig, TellerError, TransactionKind};

#[derive(Parser, Debug)]
#[command(name = "teller", version, about = "Single-user bank teller over a CSV ledger")]
struct Cli {
    /// Ledger file (default: $TELLER_LEDGER, then accounts.csv)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Log filter, e.g. "debug" (default: $TELLER_LOG, then info)
    #[arg(long = "log", global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long)]
    first: String,

    #[arg(long)]
    last: String,

    #[arg(long)]
    pin: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a new account
    Open {
        #[command(flatten)]
        who: Credentials,

        /// Initial deposit
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        deposit: String,
    },

    /// Show the balance of an account
    Balance {
        #[command(flatten)]
        who: Credentials,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit into an account
    Deposit {
        #[command(flatten)]
        who: Credentials,

        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Withdraw from an account
    Withdraw {
        #[command(flatten)]
        who: Credentials,

        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Interactive teller screen (default)
    #[cfg(feature = "tui")]
    Ui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TellerConfig::resolve(cli.ledger, cli.log);

    match cli.command {
        #[cfg(feature = "tui")]
        Some(Command::Ui) => run_ui_mode(&config),
        Some(command) => run_command(&config, command),
        None => run_ui_mode(&config),
    }
}

fn open_teller(config: &TellerConfig) -> Result<Teller> {
    let repo = AccountRepository::open(&config.ledger_path)
        .with_context(|| format!("Failed to load ledger {}", config.ledger_path.display()))?;
    Ok(Teller::new(repo))
}

fn run_command(config: &TellerConfig, command: Command) -> Result<()> {
    logging::init(&config.log_filter, LogSink::Stderr)?;
    let mut teller = open_teller(config)?;

    match execute(&mut teller, command) {
        Ok(true) => Ok(()),
        // Refused transaction or unknown account: message already printed
        Ok(false) => process::exit(1),
        Err(TellerError::Ledger(err)) => {
            Err(err).with_context(|| format!("Ledger {} failed", config.ledger_path.display()))
        }
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

/// Run one CLI command. Ok(false) means the teller said no.
fn execute(teller: &mut Teller, command: Command) -> Result<bool, TellerError> {
    let (who, kind, amount) = match command {
        Command::Open { who, deposit } => {
            let summary = teller.open_account(&who.first, &who.last, &who.pin, &deposit)?;
            println!("Account created for {}!", summary.holder);
            println!("{}", summary.balance_line());
            return Ok(true);
        }
        Command::Balance { who, json } => {
            let Some(summary) = teller.sign_in(&who.first, &who.last, &who.pin)? else {
                eprintln!("Account not found or wrong PIN.");
                return Ok(false);
            };
            if json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(out) => println!("{}", out),
                    Err(err) => eprintln!("Failed to encode summary: {}", err),
                }
            } else {
                println!("Welcome {}!", summary.holder);
                println!("{}", summary.balance_line());
            }
            return Ok(true);
        }
        Command::Deposit { who, amount } => (who, TransactionKind::Deposit, amount),
        Command::Withdraw { who, amount } => (who, TransactionKind::Withdraw, amount),
        // Dispatched to the interactive screen before we get here
        #[cfg(feature = "tui")]
        Command::Ui => return Ok(true),
    };

    if teller.sign_in(&who.first, &who.last, &who.pin)?.is_none() {
        eprintln!("Account not found or wrong PIN.");
        return Ok(false);
    }

    let outcome = teller.transact(kind, &amount)?;
    println!("{}", outcome.message());
    if let Some(summary) = teller.current() {
        println!("{}", summary.balance_line());
    }
    Ok(outcome.accepted)
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &TellerConfig) -> Result<()> {
    logging::init(&config.log_filter, LogSink::File(config.ui_log_path()))?;
    let teller = open_teller(config)?;

    let mut app = ui::App::new(teller);
    ui::run_ui(&mut app)?;

    println!("Goodbye.");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &TellerConfig) -> Result<()> {
    eprintln!("❌ Interactive teller not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or run a subcommand: teller --help");
    process::exit(1);
}
