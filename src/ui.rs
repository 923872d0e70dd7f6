// UI layer: one small synchronous flow per command. Each flow loads what it
// needs, makes a single API call behind a spinner and prints the result.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Utc};
use crossterm::tty::IsTty;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::api::{ApiClient, LogFilter, Transport};
use crate::cli::{Cli, Commands, KeysCommands, LogsArgs, OrgCommands};
use crate::credentials::Credentials;
use crate::output;
use crate::timespec;

/// Runs the command selected on the command line.
pub fn run(cli: Cli) -> Result<()> {
    let creds_path = match &cli.credentials {
        Some(path) => path.clone(),
        None => Credentials::default_path()?,
    };
    let logs_args = match &cli.command {
        Some(Commands::Logs(args)) => args.clone(),
        _ => cli.logs.clone(),
    };
    let api = ApiClient::new(cli.client_config(logs_args.page_size))
        .context("creating api client")?;

    let mut stdout = std::io::stdout().lock();
    let color = std::io::stdout().is_tty();

    match &cli.command {
        None | Some(Commands::Logs(_)) => {
            let creds = load_credentials(&creds_path)?;
            show_logs(&api, &creds, &logs_args, Utc::now(), color, &mut stdout)?;
        }
        Some(Commands::Login {
            provider,
            external_token,
        }) => {
            let external_token = match external_token {
                Some(t) => t.clone(),
                None => Password::new()
                    .with_prompt(format!("{} token", provider))
                    .interact()
                    .context("reading external token")?,
            };
            let creds = login(&api, provider, &external_token, &creds_path)?;
            writeln!(stdout, "Logged in as account {}", creds.account_id)?;
        }
        Some(Commands::Account) => {
            let creds = load_credentials(&creds_path)?;
            show_account(&api, &creds, &mut stdout)?;
        }
        Some(Commands::Org {
            command: OrgCommands::Create { name },
        }) => {
            let creds = load_credentials(&creds_path)?;
            create_org(&api, &creds, name, &mut stdout)?;
        }
        Some(Commands::Keys { command }) => {
            let creds = load_credentials(&creds_path)?;
            match command {
                KeysCommands::List => list_keys(&api, &creds, &mut stdout)?,
                KeysCommands::Create => create_key(&api, &creds, &mut stdout)?,
            }
        }
    }
    Ok(())
}

fn load_credentials(path: &Path) -> Result<Credentials> {
    Credentials::load_from(path).context("getting token")
}

/// Converts the command line search arguments into a query filter.
pub fn log_filter(args: &LogsArgs, now: DateTime<Utc>) -> Result<LogFilter> {
    let (start_ms, end_ms) =
        timespec::parse_range(&args.start, &args.end, now).context("parsing time range")?;
    Ok(LogFilter {
        filter: Some(args.filter.clone()).filter(|f| !f.is_empty()),
        start_ms,
        end_ms,
    })
}

/// Fetches logs and prints one line per entry. Returns the number printed.
pub fn show_logs<T: Transport>(
    api: &ApiClient<T>,
    creds: &Credentials,
    args: &LogsArgs,
    now: DateTime<Utc>,
    color: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let filter = log_filter(args, now)?;
    let resp = with_spinner("Searching logs...", || {
        api.get_logs(&creds.account_id, &creds.token, &filter)
    })
    .context("getting response from api server")?;

    for entry in &resp.logs {
        writeln!(out, "{}", output::format_log(entry, color))?;
    }
    info!(count = resp.logs.len(), "printed logs");
    Ok(resp.logs.len())
}

/// Exchanges an external token for API credentials and stores them at `path`.
///
/// When the token is not yet linked to an account, an individual account is
/// created with the new API token.
pub fn login<T: Transport>(
    api: &ApiClient<T>,
    provider: &str,
    external_token: &str,
    path: &Path,
) -> Result<Credentials> {
    let token = with_spinner("Logging in...", || api.create_token(external_token, provider))
        .context("creating token")?;
    ensure!(!token.token.is_empty(), "token response did not include a token");

    let account_id = match token.account_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            let created = with_spinner("Creating account...", || {
                api.create_individual_account(&token.token)
            })
            .context("creating account")?;
            info!(account_id = %created.account.id, "created individual account");
            created.account.id
        }
    };

    let creds = Credentials::new(account_id, token.token);
    creds.save_to(path).context("saving credentials")?;
    info!(path = %path.display(), "stored credentials");
    Ok(creds)
}

pub fn show_account<T: Transport>(
    api: &ApiClient<T>,
    creds: &Credentials,
    out: &mut impl Write,
) -> Result<()> {
    let resp = with_spinner("Fetching account...", || {
        api.get_account(&creds.account_id, &creds.token)
    })
    .context("getting account")?;
    writeln!(out, "{}", output::format_account(&resp.account))?;
    Ok(())
}

pub fn create_org<T: Transport>(
    api: &ApiClient<T>,
    creds: &Credentials,
    name: &str,
    out: &mut impl Write,
) -> Result<()> {
    let resp = with_spinner("Creating organization...", || {
        api.create_org_account(name, &creds.token)
    })
    .context("creating organization")?;
    writeln!(out, "{}", output::format_account(&resp.account))?;
    Ok(())
}

pub fn list_keys<T: Transport>(
    api: &ApiClient<T>,
    creds: &Credentials,
    out: &mut impl Write,
) -> Result<()> {
    let resp = with_spinner("Fetching keys...", || {
        api.get_keys(&creds.account_id, &creds.token)
    })
    .context("getting keys")?;
    for key in &resp.keys {
        writeln!(out, "{}", output::format_key(key))?;
    }
    Ok(())
}

pub fn create_key<T: Transport>(
    api: &ApiClient<T>,
    creds: &Credentials,
    out: &mut impl Write,
) -> Result<()> {
    let resp = with_spinner("Creating key...", || {
        api.create_key(&creds.account_id, &creds.token)
    })
    .context("creating key")?;
    writeln!(out, "{}", output::format_key(&resp.key))?;
    Ok(())
}

/// Shows a spinner on stderr while `f` runs. Hidden when stderr is not a terminal.
fn with_spinner<R>(msg: &'static str, f: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}
