//! Selection through an external fuzzy-finder.
//!
//! The finder gets one label per line on stdin and is expected to print the
//! chosen label on stdout. Abort statuses (1: no match, 130: interrupted)
//! mean "nothing chosen" rather than an error, matching fzf's conventions.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Default finder binary.
pub const DEFAULT_FINDER: &str = "fzf";

/// Exit statuses that mean the user walked away without choosing.
const ABORT_STATUSES: [i32; 2] = [1, 130];

/// Run `finder` over `labels`; `Ok(None)` means nothing was chosen.
///
/// The finder string may carry arguments ("fzf --height 40%"); the first
/// word is the binary.
pub fn pick(finder: &str, labels: &[String]) -> Result<Option<String>> {
    let mut words = finder.split_whitespace();
    let bin = words.next().ok_or_else(|| Error::ExternalPicker {
        finder: finder.to_string(),
        detail: "empty finder command".to_string(),
    })?;

    let mut child = Command::new(bin)
        .args(words)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| Error::ExternalPicker {
            finder: finder.to_string(),
            detail: e.to_string(),
        })?;

    // The finder may stop reading before the list ends (head, fzf on
    // early match), so a broken pipe here is not an error.
    if let Some(mut stdin) = child.stdin.take() {
        let input = labels.join("\n");
        let _ = stdin.write_all(input.as_bytes());
    }

    let output = child
        .wait_with_output()
        .map_err(|e| Error::ExternalPicker {
            finder: finder.to_string(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        if ABORT_STATUSES.contains(&output.status.code().unwrap_or(-1)) {
            return Ok(None);
        }
        return Err(Error::ExternalPicker {
            finder: finder.to_string(),
            detail: format!("exited with {}", output.status),
        });
    }

    let chosen = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if chosen.is_empty() {
        return Ok(None);
    }
    Ok(Some(chosen))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["home".to_string(), "work".to_string()]
    }

    #[test]
    #[cfg(unix)]
    fn test_pick_reads_finder_stdout() {
        // `head -n1` stands in for a finder that picks the first label.
        let chosen = pick("head -n1", &labels()).unwrap();
        assert_eq!(chosen.as_deref(), Some("home"));
    }

    #[test]
    #[cfg(unix)]
    fn test_abort_status_means_nothing_chosen() {
        // `false` exits with status 1 and prints nothing.
        assert_eq!(pick("false", &labels()).unwrap(), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_abnormal_exit_is_picker_error() {
        // `grep` rejects the unknown flag and exits with 2, which is
        // neither success nor an abort status.
        let err = pick("grep --definitely-not-a-flag", &labels()).unwrap_err();
        assert!(matches!(err, Error::ExternalPicker { .. }));
    }

    #[test]
    fn test_missing_finder_is_picker_error() {
        let err = pick("git-ident-no-such-finder", &labels()).unwrap_err();
        assert!(matches!(err, Error::ExternalPicker { .. }));
    }

    #[test]
    fn test_empty_finder_command() {
        let err = pick("   ", &labels()).unwrap_err();
        assert!(matches!(err, Error::ExternalPicker { .. }));
    }
}
