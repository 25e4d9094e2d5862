//! Git config backend.
//!
//! Identity fields live in four config keys, plus a derived SSH command:
//! - `user.name`
//! - `user.email`
//! - `format.signoff`
//! - `commit.gpgsign`
//! - `core.sshCommand` (only written, and only when the profile carries an
//!   identity key)
//!
//! All access shells out to `git config`. Writes are sequential and
//! non-atomic: a failure leaves earlier keys written.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};
use crate::profile::Profile;

const KEY_NAME: &str = "user.name";
const KEY_EMAIL: &str = "user.email";
const KEY_SIGNOFF: &str = "format.signoff";
const KEY_GPGSIGN: &str = "commit.gpgsign";
const KEY_SSH_COMMAND: &str = "core.sshCommand";

/// The identity currently configured for the repository, as far as it is
/// set. Unset keys read as `None` / false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub signoff: bool,
    pub gpgsign: bool,
}

/// Read/write access to the repository's identity configuration.
///
/// Injected into the commands and the interactive loop so tests can supply
/// a fake.
pub trait IdentityBackend: Send + Sync {
    /// Read the currently active identity.
    fn current(&self) -> Result<Identity>;

    /// Write all of `profile`'s fields into the configuration.
    fn apply(&self, profile: &Profile) -> Result<()>;
}

/// Backend shelling out to `git config` in a working directory.
#[derive(Debug, Clone, Default)]
pub struct GitBackend {
    /// Directory to run git in; `None` means the process working directory.
    dir: Option<PathBuf>,
}

impl GitBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend operating on the repository at `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Read a config key. Exit status 1 with empty stderr means the key is
    /// unset; anything else non-zero is a read failure.
    fn get(&self, key: &str, as_bool: bool) -> Result<Option<String>> {
        let mut cmd = self.command();
        cmd.args(["config", "--get"]);
        if as_bool {
            cmd.arg("--type=bool");
        }
        let output = cmd.arg(key).output().map_err(|e| Error::BackendRead {
            key: key.to_string(),
            detail: e.to_string(),
        })?;

        if output.status.success() {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok(Some(value));
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.status.code() == Some(1) && stderr.is_empty() {
            return Ok(None);
        }

        Err(Error::BackendRead {
            key: key.to_string(),
            detail: if stderr.is_empty() {
                format!("git config exited with {}", output.status)
            } else {
                stderr
            },
        })
    }

    fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get(key, true)? {
            Some(value) if value == "true" => Ok(true),
            Some(value) if value == "false" => Ok(false),
            Some(value) => Err(Error::BackendRead {
                key: key.to_string(),
                detail: format!("unexpected boolean value '{value}'"),
            }),
            None => Ok(false),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let output = self
            .command()
            .args(["config", key, value])
            .output()
            .map_err(|e| Error::BackendWrite {
                key: key.to_string(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::BackendWrite {
                key: key.to_string(),
                detail: if stderr.is_empty() {
                    format!("git config exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(())
    }
}

impl IdentityBackend for GitBackend {
    fn current(&self) -> Result<Identity> {
        Ok(Identity {
            name: self.get(KEY_NAME, false)?,
            email: self.get(KEY_EMAIL, false)?,
            signoff: self.get_bool(KEY_SIGNOFF)?,
            gpgsign: self.get_bool(KEY_GPGSIGN)?,
        })
    }

    fn apply(&self, profile: &Profile) -> Result<()> {
        self.set(KEY_NAME, &profile.name)?;
        self.set(KEY_EMAIL, &profile.email)?;
        self.set(KEY_SIGNOFF, if profile.signoff { "true" } else { "false" })?;
        self.set(KEY_GPGSIGN, if profile.gpgsign { "true" } else { "false" })?;
        if let Some(ssh_command) = profile.ssh_command() {
            self.set(KEY_SSH_COMMAND, &ssh_command)?;
        }
        Ok(())
    }
}

/// Run `git clone` with the profile's SSH key exported via
/// `GIT_SSH_COMMAND`. Output goes straight to the user's terminal.
pub fn clone_with_profile(profile: &Profile, repo: &str, dir: Option<&str>) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("clone").arg(repo);
    if let Some(dir) = dir {
        cmd.arg(dir);
    }
    if let Some(ssh_command) = profile.ssh_command() {
        cmd.env("GIT_SSH_COMMAND", ssh_command);
    }

    let status = cmd.status()?;
    if !status.success() {
        return Err(Error::CloneFailed(status.to_string()));
    }
    Ok(())
}
