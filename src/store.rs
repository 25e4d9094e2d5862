//! Loading profiles from the `~/.gitprofiles` file.
//!
//! The file is TOML with a single top-level `profiles` table mapping labels
//! to identity fields:
//!
//! ```toml
//! [profiles.work]
//! name = "Ada Lovelace"
//! email = "ada@company.example"
//! signoff = true
//! gpgsign = true
//! identity_key = "~/.ssh/id_work"
//! ```
//!
//! Profiles are read-only: this tool never writes the file back.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::profile::{Profile, ProfileEntry};

/// File name of the profile file in the home directory.
pub const PROFILES_FILE: &str = ".gitprofiles";

/// On-disk shape of the profile file.
#[derive(Debug, Deserialize)]
struct ProfileFile {
    /// BTreeMap keeps entries ordered by label ascending.
    #[serde(default)]
    profiles: BTreeMap<String, Profile>,
}

/// Default location of the profile file: `~/.gitprofiles`.
pub fn default_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(Error::NoHomeDir)?;
    Ok(base_dirs.home_dir().join(PROFILES_FILE))
}

/// Load all profiles from `path`, sorted by label ascending.
pub fn load(path: &Path) -> Result<Vec<ProfileEntry>> {
    let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    let file: ProfileFile = toml::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(file
        .profiles
        .into_iter()
        .map(|(label, profile)| ProfileEntry { label, profile })
        .collect())
}

/// Load profiles, failing with [`Error::NoProfiles`] when the file defines
/// none.
pub fn load_non_empty(path: &Path) -> Result<Vec<ProfileEntry>> {
    let entries = load(path)?;
    if entries.is_empty() {
        return Err(Error::NoProfiles {
            path: path.to_path_buf(),
        });
    }
    Ok(entries)
}

/// Find the entry with the given label.
pub fn find<'a>(entries: &'a [ProfileEntry], label: &str) -> Result<&'a ProfileEntry> {
    entries
        .iter()
        .find(|e| e.label == label)
        .ok_or_else(|| Error::UnknownProfile(label.to_string()))
}
