//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::api::{ClientConfig, DEFAULT_API_ADDRESS, DEFAULT_PAGE_SIZE};

/// blitz - search logs stored in blitzlog.
#[derive(Parser, Debug, Clone)]
#[command(name = "blitz")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// API address.
    #[arg(long, global = true, env = "BLITZ_ADDRESS", default_value = DEFAULT_API_ADDRESS)]
    pub address: String,

    /// Credentials file [default: ~/.blitz/credentials].
    #[arg(long, global = true, env = "BLITZ_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log search used when no subcommand is given.
    #[command(flatten)]
    pub logs: LogsArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments for searching logs.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LogsArgs {
    /// Apply filter when searching logs.
    #[arg(long, default_value = "")]
    pub filter: String,

    /// Start time for searching logs (RFC 3339, YYYY-MM-DD, epoch ms, or a duration like 15m).
    #[arg(long, default_value = "")]
    pub start: String,

    /// End time for searching logs.
    #[arg(long, default_value = "")]
    pub end: String,

    /// Number of entries requested from the service.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
}

impl Default for LogsArgs {
    fn default() -> Self {
        Self {
            filter: String::new(),
            start: String::new(),
            end: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Search logs.
    Logs(LogsArgs),

    /// Exchange an external token for an API token and store credentials.
    Login {
        /// Identity provider that issued the external token.
        #[arg(long)]
        provider: String,

        /// External token; prompted for when omitted.
        #[arg(long, env = "BLITZ_EXTERNAL_TOKEN", hide_env_values = true)]
        external_token: Option<String>,
    },

    /// Show the current account.
    Account,

    /// Organization accounts.
    Org {
        #[command(subcommand)]
        command: OrgCommands,
    },

    /// API keys of the current account.
    Keys {
        #[command(subcommand)]
        command: KeysCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum OrgCommands {
    /// Create an organization account.
    Create {
        /// Organization name.
        name: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum KeysCommands {
    /// List keys.
    List,
    /// Create a new key.
    Create,
}

impl Cli {
    /// Rejects search flags placed before a subcommand; they would otherwise
    /// be ignored.
    pub fn check_search_flags(&self) -> Result<(), clap::Error> {
        if self.command.is_none() || self.logs == LogsArgs::default() {
            return Ok(());
        }
        let hint = match self.command {
            Some(Commands::Logs(_)) => "search flags go after `logs`, e.g. `blitz logs --filter ...`",
            _ => "search flags only apply to log searches",
        };
        Err(Cli::command().error(ErrorKind::ArgumentConflict, hint))
    }

    /// Client settings derived from the global flags and `page_size`.
    pub fn client_config(&self, page_size: u32) -> ClientConfig {
        ClientConfig {
            page_size,
            ..ClientConfig::with_address(self.address.clone())
        }
    }
}
