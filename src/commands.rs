//! High-level command orchestration for the CLI.
//!
//! One handler per subcommand, plus the interactive default. Handlers take
//! the profile file path, the identity backend and the `Ui` context, so
//! tests can point them at a temp file and a fake backend.

use std::path::Path;
use std::sync::Arc;

use anstyle::AnsiColor;

use crate::error::{Error, Result};
use crate::git::{self, Identity, IdentityBackend};
use crate::model::{Outcome, SelectionModel};
use crate::picker;
use crate::profile::ProfileEntry;
use crate::store;
use crate::tui;
use crate::ui::Ui;

/// Interactive picker: the default when no subcommand is given.
pub fn interactive(
    config_path: &Path,
    backend: Arc<dyn IdentityBackend>,
    ui: &Ui,
) -> Result<()> {
    let entries = store::load_non_empty(config_path)?;

    let current = backend.current()?;
    let current = (current != Identity::default()).then_some(current);

    let mut model = SelectionModel::new(entries, current);
    let outcome = tui::run(&mut model, backend, ui)?;

    match outcome {
        Outcome::Applied => {
            // chosen() is always set once the model reached Applied.
            if let Some(entry) = model.chosen() {
                ui.ok(format!("Switched to [{}]", entry.label));
            }
            Ok(())
        }
        Outcome::Aborted => Ok(()),
        Outcome::Failed => Err(model.take_error().unwrap_or(Error::BackendWrite {
            key: "identity".to_string(),
            detail: "apply failed".to_string(),
        })),
    }
}

/// Apply a profile picked through an external fuzzy-finder.
pub fn pick(
    config_path: &Path,
    finder: &str,
    backend: &dyn IdentityBackend,
    ui: &Ui,
) -> Result<()> {
    let entries = store::load_non_empty(config_path)?;
    let labels: Vec<String> = entries.iter().map(|e| e.label.clone()).collect();

    match picker::pick(finder, &labels)? {
        Some(label) => apply_labeled(&entries, &label, backend, ui),
        None => Ok(()),
    }
}

/// Apply a profile by label, without any UI.
pub fn use_profile(
    config_path: &Path,
    label: &str,
    backend: &dyn IdentityBackend,
    ui: &Ui,
) -> Result<()> {
    let entries = store::load_non_empty(config_path)?;
    apply_labeled(&entries, label, backend, ui)
}

fn apply_labeled(
    entries: &[ProfileEntry],
    label: &str,
    backend: &dyn IdentityBackend,
    ui: &Ui,
) -> Result<()> {
    let entry = store::find(entries, label)?;

    let spinner = ui.spinner(format!("Switching to [{}]...", entry.label));
    match backend.apply(&entry.profile) {
        Ok(()) => {
            ui.spinner_finish_ok(&spinner, format!("Switched to [{}]", entry.label));
            Ok(())
        }
        Err(e) => {
            // main prints the error; just clear the spinner line.
            spinner.finish_and_clear();
            Err(e)
        }
    }
}

/// List all profiles; the one matching the repository's current email is
/// marked active.
pub fn list(config_path: &Path, backend: &dyn IdentityBackend, ui: &Ui) -> Result<()> {
    let entries = store::load(config_path)?;

    if entries.is_empty() {
        ui.warn("No profiles found.");
        ui.newline();
        ui.println(format!(
            "Define some in {}:",
            ui.bold(config_path.display().to_string())
        ));
        ui.println("  [profiles.work]");
        ui.println("  name = \"Ada Lovelace\"");
        ui.println("  email = \"ada@company.example\"");
        return Ok(());
    }

    // Best effort: outside a repository there is simply no active profile.
    let active_email = backend.current().ok().and_then(|id| id.email);

    let mut table = ui.simple_table();
    table.set_header(vec![
        ui.header_cell(""),
        ui.header_cell("Profile"),
        ui.header_cell("Name"),
        ui.header_cell("Email"),
        ui.header_cell("Flags"),
        ui.header_cell("Key"),
    ]);

    for entry in &entries {
        let is_active = active_email.as_deref() == Some(entry.profile.email.as_str());
        let icon = if is_active { ui.icon_ok() } else { " " };

        let mut flags = Vec::new();
        if entry.profile.signoff {
            flags.push("signoff");
        }
        if entry.profile.gpgsign {
            flags.push("gpgsign");
        }
        let flags = if flags.is_empty() {
            "-".to_string()
        } else {
            flags.join(",")
        };

        let key = entry.profile.identity_key.as_deref().unwrap_or("-");

        table.add_row(vec![
            if is_active {
                ui.colored_cell(icon, AnsiColor::Green)
            } else {
                ui.cell(icon)
            },
            ui.cell(&entry.label),
            ui.cell(&entry.profile.name),
            ui.cell(&entry.profile.email),
            ui.cell(flags),
            ui.cell(key),
        ]);
    }

    ui.section("Profiles");
    ui.println(table.to_string());

    Ok(())
}

/// Show the repository's active identity.
pub fn current(backend: &dyn IdentityBackend, ui: &Ui) -> Result<()> {
    let identity = backend.current()?;

    if identity == Identity::default() {
        ui.warn("No identity configured for this repository.");
        return Ok(());
    }

    ui.section("Current identity");
    ui.newline();

    let mut table = ui.simple_table();
    table.add_row(vec![
        ui.cell("Name:"),
        ui.cell(identity.name.as_deref().unwrap_or("(unset)")),
    ]);
    table.add_row(vec![
        ui.cell("Email:"),
        ui.cell(identity.email.as_deref().unwrap_or("(unset)")),
    ]);
    table.add_row(vec![
        ui.cell("Sign-off:"),
        ui.cell(if identity.signoff { "on" } else { "off" }),
    ]);
    table.add_row(vec![
        ui.cell("GPG-sign:"),
        ui.cell(if identity.gpgsign { "on" } else { "off" }),
    ]);
    ui.println(table.to_string());

    Ok(())
}

/// Clone a repository with a profile's SSH key exported to git.
pub fn clone(
    config_path: &Path,
    label: &str,
    repo: &str,
    dir: Option<&str>,
    ui: &Ui,
) -> Result<()> {
    let entries = store::load_non_empty(config_path)?;
    let entry = store::find(&entries, label)?;

    if entry.profile.identity_key.is_none() {
        ui.warn(format!(
            "Profile [{}] has no identity key; cloning with the default SSH setup.",
            entry.label
        ));
    }

    git::clone_with_profile(&entry.profile, repo, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{write_profile_file, FakeBackend};
    use crate::ui::ColorMode;
    use tempfile::TempDir;

    fn plain_ui() -> Ui {
        Ui::new(ColorMode::Never, true)
    }

    #[test]
    fn test_use_profile_applies_named_profile() {
        let dir = TempDir::new().unwrap();
        let path = write_profile_file(&dir);
        let backend = FakeBackend::default();

        use_profile(&path, "work", &backend, &plain_ui()).unwrap();

        let applied = backend.applied.lock().unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].email, "a@x");
    }

    #[test]
    fn test_use_profile_unknown_label() {
        let dir = TempDir::new().unwrap();
        let path = write_profile_file(&dir);
        let backend = FakeBackend::default();

        let err = use_profile(&path, "nope", &backend, &plain_ui()).unwrap_err();
        assert!(matches!(err, Error::UnknownProfile(_)));
        assert!(backend.applied.lock().unwrap().is_empty());
    }

    #[test]
    fn test_use_profile_surfaces_backend_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_profile_file(&dir);
        let backend = FakeBackend::failing();

        let err = use_profile(&path, "work", &backend, &plain_ui()).unwrap_err();
        assert!(matches!(err, Error::BackendWrite { .. }));
    }

    #[test]
    fn test_use_profile_with_empty_profile_set() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".gitprofiles");
        std::fs::write(&path, "").unwrap();

        let backend = FakeBackend::default();
        let err = use_profile(&path, "work", &backend, &plain_ui()).unwrap_err();
        assert!(matches!(err, Error::NoProfiles { .. }));
    }

    #[test]
    fn test_list_tolerates_backend_read_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_profile_file(&dir);
        let backend = FakeBackend::read_failing();

        // Active marker is best effort; the listing itself must work.
        list(&path, &backend, &plain_ui()).unwrap();
    }

    #[test]
    fn test_current_propagates_read_failure() {
        let backend = FakeBackend::read_failing();
        let err = current(&backend, &plain_ui()).unwrap_err();
        assert!(matches!(err, Error::BackendRead { .. }));
    }
}
