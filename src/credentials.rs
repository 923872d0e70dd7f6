//! Credentials stored in the user's home directory.
//!
//! The file lives at `~/.blitz/credentials` and is a small YAML document:
//!
//! ```yaml
//! account_id: abc123
//! token: 0f3c...
//! ```

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Credentials path relative to the home directory.
pub const CREDENTIALS_SUB_PATH: &str = ".blitz/credentials";

/// Account id and auth token used for every authenticated call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub account_id: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(account_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            token: token.into(),
        }
    }

    /// Returns `~/.blitz/credentials` for the current user.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| Error::FileAccess {
            path: PathBuf::from("~"),
            source: io::Error::new(io::ErrorKind::NotFound, "could not find home directory"),
        })?;
        Ok(home.join(CREDENTIALS_SUB_PATH))
    }

    /// Loads credentials from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Loads credentials from `path`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let creds: Credentials =
            serde_yaml::from_str(&content).map_err(|source| Error::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), account_id = %creds.account_id, "loaded credentials");
        Ok(creds)
    }

    /// Writes credentials to `path`, creating the parent directory.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file_err = |source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(file_err)?;
        }
        // serde_yaml only fails here on non-string map keys, which this type cannot produce.
        let content = serde_yaml::to_string(self).map_err(|e| {
            file_err(io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
        })?;

        // Owner-only from creation; an existing file is tightened before the token lands in it.
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path).map_err(file_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(file_err)?;
        }
        file.write_all(content.as_bytes()).map_err(file_err)?;
        Ok(())
    }
}
