use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the user. All of them end the current run; nothing is
/// retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The profile file could not be read.
    #[error("failed to read profiles from {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The profile file is not valid TOML (or not the expected shape).
    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The profile file defines no profiles at all.
    #[error("no profiles defined in {path}")]
    NoProfiles { path: PathBuf },

    /// A label was requested that the profile file does not contain.
    #[error("no profile named '{0}'")]
    UnknownProfile(String),

    /// Reading a key from git config failed.
    #[error("failed to read git config {key}: {detail}")]
    BackendRead { key: String, detail: String },

    /// Writing a key to git config failed. Keys written before the failure
    /// stay written; there is no rollback.
    #[error("failed to set git config {key}: {detail}")]
    BackendWrite { key: String, detail: String },

    /// The external fuzzy-finder could not be run or exited abnormally.
    #[error("fuzzy finder '{finder}' failed: {detail}")]
    ExternalPicker { finder: String, detail: String },

    /// `git clone` exited with a failure status.
    #[error("git clone failed: {0}")]
    CloneFailed(String),

    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,

    /// Terminal or subprocess I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
