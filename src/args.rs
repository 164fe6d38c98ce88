//! These structs provide the CLI interface for the gofinances CLI.

use crate::model::{NewTransaction, TransactionType};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// gofinances: A personal finance tracker.
///
/// Sign in with your Google account, register income and expense transactions, and see how much
/// came in, how much went out, and what is left. Everything is kept locally in the gofinances home
/// directory.
///
/// Signing in needs an OAuth client for a desktop application created in the Google Cloud
/// Console. Set GOFINANCES_IN_TEST_MODE to any value to run against a built-in fake account
/// instead.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and initialize the configuration files.
    ///
    /// This is the first command you should run. Download the OAuth client credentials JSON of a
    /// desktop application from the Google Cloud Console and pass it as --client-secret. Its
    /// redirect URIs must include http://localhost. The file is moved into the home directory.
    Init(InitArgs),
    /// Sign in with your Google account.
    ///
    /// Prints a URL to open in your browser and waits for Google to redirect back.
    SignIn,
    /// Forget the signed-in account.
    SignOut,
    /// Show the signed-in account.
    Whoami,
    /// Register an income or expense transaction for the signed-in account.
    Register(RegisterArgs),
    /// Show the entries, expenses and balance, and the list of transactions.
    Dashboard,
    /// List the categories a transaction can be registered under.
    Categories,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where gofinances data and configuration is held. Defaults to ~/gofinances
    #[arg(long, env = "GOFINANCES_HOME", default_value_t = default_gofinances_home())]
    gofinances_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, gofinances_home: PathBuf) -> Self {
        Self {
            log_level,
            gofinances_home: gofinances_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn gofinances_home(&self) -> &DisplayPath {
        &self.gofinances_home
    }
}

/// (Not shown): Args for the `gofinances init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to your downloaded OAuth client credentials. This file will be moved to the
    /// secrets location in the home directory. Only optional in test mode.
    #[arg(long)]
    client_secret: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(client_secret: Option<PathBuf>) -> Self {
        Self { client_secret }
    }

    pub fn client_secret(&self) -> Option<&Path> {
        self.client_secret.as_deref()
    }
}

/// (Not shown): Args for the `gofinances register` command.
#[derive(Debug, Parser, Clone)]
pub struct RegisterArgs {
    /// What the transaction was, e.g. "Salary" or "Pizza"
    #[arg(long)]
    name: String,

    /// The amount, always positive, e.g. 1200 or 59,90. Use one decimal separator and no thousands
    /// separators; 1,000 is rejected as ambiguous.
    #[arg(long)]
    amount: String,

    /// "positive" for income, "negative" for an expense
    #[arg(long = "type")]
    transaction_type: TransactionType,

    /// The category key, see `gofinances categories`
    #[arg(long)]
    category: String,
}

impl RegisterArgs {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        transaction_type: TransactionType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            transaction_type,
            category: category.into(),
        }
    }

    pub fn new_transaction(&self) -> NewTransaction {
        NewTransaction {
            name: self.name.clone(),
            amount: self.amount.clone(),
            transaction_type: self.transaction_type,
            category: self.category.clone(),
        }
    }
}

fn default_gofinances_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("gofinances"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --gofinances-home or GOFINANCES_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("gofinances")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_register() {
        let args = Args::try_parse_from([
            "gofinances",
            "--gofinances-home",
            "/tmp/gf",
            "register",
            "--name",
            "Pizza",
            "--amount",
            "59,90",
            "--type",
            "negative",
            "--category",
            "food",
        ])
        .unwrap();
        assert_eq!(args.common().gofinances_home().path(), Path::new("/tmp/gf"));
        let Command::Register(register) = args.command() else {
            panic!("expected the register command");
        };
        let new = register.new_transaction();
        assert_eq!(new.transaction_type, TransactionType::Negative);
        assert_eq!(new.amount, "59,90");
    }

    #[test]
    fn test_parse_bad_type() {
        let result = Args::try_parse_from([
            "gofinances",
            "register",
            "--name",
            "x",
            "--amount",
            "1",
            "--type",
            "sideways",
            "--category",
            "food",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_commands() {
        let args = Args::try_parse_from(["gofinances", "--log-level", "debug", "sign-in"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert!(matches!(args.command(), Command::SignIn));
        let args = Args::try_parse_from(["gofinances", "init"]).unwrap();
        let Command::Init(init) = args.command() else {
            panic!("expected the init command");
        };
        assert!(init.client_secret().is_none());
    }
}
