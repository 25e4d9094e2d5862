//! Test helpers shared across test modules.

use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::git::{Identity, IdentityBackend};
use crate::profile::Profile;
use crate::store::PROFILES_FILE;

/// Write a two-profile file ("home", "work") into the temp dir and return
/// its path.
pub fn write_profile_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join(PROFILES_FILE);
    std::fs::write(
        &path,
        r#"
        [profiles.work]
        name = "A"
        email = "a@x"
        signoff = true

        [profiles.home]
        name = "B"
        email = "b@x"
        "#,
    )
    .unwrap();
    path
}

/// In-memory identity backend recording every applied profile.
#[derive(Default)]
pub struct FakeBackend {
    pub applied: Mutex<Vec<Profile>>,
    pub current: Identity,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

impl FakeBackend {
    /// A backend whose writes fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// A backend whose reads fail.
    pub fn read_failing() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }
}

impl IdentityBackend for FakeBackend {
    fn current(&self) -> Result<Identity> {
        if self.fail_reads {
            return Err(Error::BackendRead {
                key: "user.name".to_string(),
                detail: "simulated read failure".to_string(),
            });
        }
        Ok(self.current.clone())
    }

    fn apply(&self, profile: &Profile) -> Result<()> {
        if self.fail_writes {
            return Err(Error::BackendWrite {
                key: "user.name".to_string(),
                detail: "simulated write failure".to_string(),
            });
        }
        self.applied.lock().unwrap().push(profile.clone());
        Ok(())
    }
}
