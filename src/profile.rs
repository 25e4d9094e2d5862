use serde::Deserialize;

/// A named bundle of identity fields, as stored in `~/.gitprofiles`.
///
/// The booleans default to false when omitted and may be toggled in the
/// interactive picker before being applied; the file itself is never
/// written back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// Git author name (`user.name`)
    pub name: String,
    /// Git author email (`user.email`)
    pub email: String,
    /// Whether commits should carry a Signed-off-by trailer (`format.signoff`)
    #[serde(default)]
    pub signoff: bool,
    /// Whether commits should be GPG-signed (`commit.gpgsign`)
    #[serde(default)]
    pub gpgsign: bool,
    /// Path to an SSH private key used for this identity
    #[serde(default)]
    pub identity_key: Option<String>,
}

impl Profile {
    /// SSH command derived from the identity key, suitable for
    /// `core.sshCommand` or `GIT_SSH_COMMAND`.
    pub fn ssh_command(&self) -> Option<String> {
        self.identity_key
            .as_deref()
            .map(|key| format!("ssh -i {key} -F /dev/null"))
    }
}

/// A profile together with the label it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    pub label: String,
    pub profile: Profile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(key: Option<&str>) -> Profile {
        Profile {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            signoff: false,
            gpgsign: false,
            identity_key: key.map(String::from),
        }
    }

    #[test]
    fn test_ssh_command_from_identity_key() {
        let p = profile(Some("~/.ssh/id_work"));
        assert_eq!(
            p.ssh_command().as_deref(),
            Some("ssh -i ~/.ssh/id_work -F /dev/null")
        );
    }

    #[test]
    fn test_no_ssh_command_without_key() {
        assert_eq!(profile(None).ssh_command(), None);
    }
}
