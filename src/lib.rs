// Library root
// -----------
// The `blitz` binary is a thin wrapper around these modules.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the blitzlog API, one method per
//   remote operation, behind a swappable `Transport`.
// - `credentials`: loads and stores `~/.blitz/credentials`.
// - `timespec`: turns `--start` / `--end` values into epoch milliseconds.
// - `output`: renders log entries, accounts and keys as text.
// - `cli` / `ui`: argument parsing and the per-command terminal flows.
pub mod api;
pub mod cli;
pub mod credentials;
pub mod error;
pub mod output;
pub mod timespec;
pub mod ui;

pub use api::{ApiClient, ClientConfig, LogFilter};
pub use credentials::Credentials;
pub use error::{Error, Result};
