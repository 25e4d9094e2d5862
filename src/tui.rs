//! Interactive picker: rendering and the raw-mode event loop.
//!
//! Rendering is a pure function from [`SelectionModel`] to lines of text so
//! it can be tested without a terminal. The loop is strictly serial: one
//! event is processed to completion before the next is read. The only
//! asynchronous step is the apply, which runs on a worker thread and sends a
//! single completion message back over an mpsc channel; by then the model
//! has left the Browsing phase, so no navigation interleaves with it.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::{cursor, queue, terminal};

use crate::error::Result;
use crate::git::IdentityBackend;
use crate::model::{Effect, InputEvent, Outcome, Phase, SelectionModel};
use crate::ui::Ui;

/// How long to wait for a key before checking the apply channel.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Render the model into displayable lines. Pure; no terminal access.
pub fn render(model: &SelectionModel, ui: &Ui) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(current) = model.current() {
        lines.push(ui.underline("Current identity"));
        lines.push(String::new());
        if let Some(name) = &current.name {
            lines.push(format!("  {name}"));
        }
        if let Some(email) = &current.email {
            lines.push(format!("  {email}"));
        }
        if current.signoff {
            lines.push("  +signoff".to_string());
        }
        if current.gpgsign {
            lines.push("  +gpgsign".to_string());
        }
        lines.push(String::new());
    }

    lines.push(ui.underline("Choose profile"));
    lines.push(String::new());

    for (i, entry) in model.entries().iter().enumerate() {
        let gutter = if i == model.cursor() { "│" } else { " " };
        lines.push(format!("{gutter} {}", ui.bold(format!("[{}]", entry.label))));
        lines.push(format!("{gutter} {}", entry.profile.name));
        lines.push(format!("{gutter} {}", entry.profile.email));
        if entry.profile.signoff {
            lines.push(format!("{gutter} +signoff"));
        }
        if entry.profile.gpgsign {
            lines.push(format!("{gutter} +gpgsign"));
        }
        lines.push(String::new());
    }

    if model.phase() == Phase::Applying {
        if let Some(chosen) = model.chosen() {
            lines.push(format!("applying [{}]…", chosen.label));
            lines.push(String::new());
        }
    }

    if model.show_full_help() {
        lines.push(ui.dim("↑/k up · ↓/j down · s sign-off · S gpg-sign · enter apply"));
        lines.push(ui.dim("? help · q/esc quit"));
    } else {
        lines.push(ui.dim("? help · q quit"));
    }

    lines
}

/// Map a key press to a semantic input event.
fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(InputEvent::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(InputEvent::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(InputEvent::Down),
        KeyCode::Char('s') => Some(InputEvent::ToggleSignOff),
        KeyCode::Char('S') => Some(InputEvent::ToggleGpgSign),
        KeyCode::Char('?') => Some(InputEvent::ToggleHelp),
        KeyCode::Enter => Some(InputEvent::Confirm),
        KeyCode::Char('q') | KeyCode::Esc => Some(InputEvent::Quit),
        _ => None,
    }
}

/// Raw-mode guard; restores the terminal on drop, including on panic.
struct RawMode;

impl RawMode {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        queue!(out, cursor::Hide)?;
        out.flush()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = queue!(out, cursor::Show);
        let _ = out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

/// Rows the cursor can move back up over: a frame taller than the terminal
/// scrolls, so the repaint can only cover what is still visible.
fn repaint_rows(line_count: usize, terminal_rows: u16) -> u16 {
    u16::try_from(line_count)
        .unwrap_or(u16::MAX)
        .min(terminal_rows.saturating_sub(1))
}

/// Repaint the frame in place: move back over the previous frame, clear it,
/// print the new one.
fn redraw(out: &mut impl Write, lines: &[String], drawn: &mut u16) -> io::Result<()> {
    queue!(out, cursor::MoveToColumn(0))?;
    if *drawn > 0 {
        queue!(out, cursor::MoveUp(*drawn))?;
    }
    queue!(out, terminal::Clear(terminal::ClearType::FromCursorDown))?;
    for line in lines {
        queue!(out, Print(line), Print("\r\n"))?;
    }
    out.flush()?;

    let (_, rows) = terminal::size().unwrap_or((u16::MAX, u16::MAX));
    *drawn = repaint_rows(lines.len(), rows);
    Ok(())
}

/// Drive the picker until it reaches a terminal phase.
///
/// The frame is cleared before returning; the caller prints the final
/// outcome message. On a Failed outcome the error is left on the model for
/// the caller to take.
pub fn run(
    model: &mut SelectionModel,
    backend: Arc<dyn IdentityBackend>,
    ui: &Ui,
) -> Result<Outcome> {
    let _guard = RawMode::enter()?;
    let mut out = io::stdout();
    let (tx, rx) = mpsc::channel();
    let mut drawn: u16 = 0;
    let mut last_frame: Vec<String> = Vec::new();

    let outcome = loop {
        let frame = render(model, ui);
        if frame != last_frame {
            redraw(&mut out, &frame, &mut drawn)?;
            last_frame = frame;
        }

        if let Phase::Done(outcome) = model.phase() {
            break outcome;
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(input) = map_key(key) {
                        if let Some(Effect::Apply(entry)) = model.on_input(input) {
                            let backend = Arc::clone(&backend);
                            let tx = tx.clone();
                            thread::spawn(move || {
                                let _ = tx.send(backend.apply(&entry.profile));
                            });
                        }
                    }
                }
            }
        }

        if let Ok(result) = rx.try_recv() {
            model.on_applied(result);
        }
    };

    // Leave a clean line for the outcome message.
    queue!(out, cursor::MoveToColumn(0))?;
    if drawn > 0 {
        queue!(out, cursor::MoveUp(drawn))?;
    }
    queue!(out, terminal::Clear(terminal::ClearType::FromCursorDown))?;
    out.flush()?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Identity;
    use crate::profile::{Profile, ProfileEntry};
    use crate::ui::ColorMode;

    fn entry(label: &str, name: &str, email: &str, signoff: bool) -> ProfileEntry {
        ProfileEntry {
            label: label.into(),
            profile: Profile {
                name: name.into(),
                email: email.into(),
                signoff,
                gpgsign: false,
                identity_key: None,
            },
        }
    }

    fn plain_ui() -> Ui {
        Ui::new(ColorMode::Never, true)
    }

    #[test]
    fn test_render_lists_profiles_in_label_order() {
        let model = SelectionModel::new(
            vec![entry("home", "B", "b@x", false), entry("work", "A", "a@x", false)],
            None,
        );
        let text = render(&model, &plain_ui()).join("\n");

        let home = text.find("[home]").unwrap();
        let work = text.find("[work]").unwrap();
        assert!(home < work);
    }

    #[test]
    fn test_render_marks_cursor_row() {
        let mut model = SelectionModel::new(
            vec![entry("home", "B", "b@x", false), entry("work", "A", "a@x", false)],
            None,
        );
        let lines = render(&model, &plain_ui());
        assert!(lines.contains(&"│ [home]".to_string()));
        assert!(lines.contains(&"  [work]".to_string()));

        model.on_input(InputEvent::Down);
        let lines = render(&model, &plain_ui());
        assert!(lines.contains(&"  [home]".to_string()));
        assert!(lines.contains(&"│ [work]".to_string()));
    }

    #[test]
    fn test_render_shows_flags() {
        let model = SelectionModel::new(vec![entry("work", "A", "a@x", true)], None);
        let lines = render(&model, &plain_ui());
        assert!(lines.contains(&"│ +signoff".to_string()));
        assert!(!lines.iter().any(|l| l.contains("+gpgsign")));
    }

    #[test]
    fn test_render_shows_current_identity() {
        let current = Identity {
            name: Some("Ada".into()),
            email: Some("ada@x".into()),
            signoff: false,
            gpgsign: true,
        };
        let model = SelectionModel::new(vec![entry("work", "A", "a@x", false)], Some(current));
        let text = render(&model, &plain_ui()).join("\n");

        assert!(text.contains("Current identity"));
        assert!(text.contains("  Ada"));
        assert!(text.contains("  ada@x"));
        assert!(text.contains("  +gpgsign"));
        assert!(!text.contains("  +signoff"));
    }

    #[test]
    fn test_render_omits_current_section_when_unknown() {
        let model = SelectionModel::new(vec![entry("work", "A", "a@x", false)], None);
        let text = render(&model, &plain_ui()).join("\n");
        assert!(!text.contains("Current identity"));
    }

    #[test]
    fn test_render_applying_status() {
        let mut model = SelectionModel::new(vec![entry("work", "A", "a@x", false)], None);
        model.on_input(InputEvent::Confirm);
        let text = render(&model, &plain_ui()).join("\n");
        assert!(text.contains("applying [work]…"));
    }

    #[test]
    fn test_render_help_footer() {
        let mut model = SelectionModel::new(vec![entry("work", "A", "a@x", false)], None);
        let text = render(&model, &plain_ui()).join("\n");
        assert!(text.contains("? help · q quit"));
        assert!(!text.contains("gpg-sign"));

        model.on_input(InputEvent::ToggleHelp);
        let text = render(&model, &plain_ui()).join("\n");
        assert!(text.contains("s sign-off"));
        assert!(text.contains("S gpg-sign"));
    }

    #[test]
    fn test_repaint_rows_clamped_to_terminal() {
        // Short frame on a tall terminal: every line is repaintable.
        assert_eq!(repaint_rows(3, 50), 3);
        // Frame taller than the terminal: only the visible rows are.
        assert_eq!(repaint_rows(200, 24), 23);
        // Frame longer than u16 must not wrap around.
        assert_eq!(repaint_rows(usize::MAX, 100), 99);
    }

    #[test]
    fn test_key_map() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(map_key(press(KeyCode::Up)), Some(InputEvent::Up));
        assert_eq!(map_key(press(KeyCode::Char('k'))), Some(InputEvent::Up));
        assert_eq!(map_key(press(KeyCode::Char('j'))), Some(InputEvent::Down));
        assert_eq!(
            map_key(press(KeyCode::Char('s'))),
            Some(InputEvent::ToggleSignOff)
        );
        assert_eq!(
            map_key(press(KeyCode::Char('S'))),
            Some(InputEvent::ToggleGpgSign)
        );
        assert_eq!(map_key(press(KeyCode::Enter)), Some(InputEvent::Confirm));
        assert_eq!(map_key(press(KeyCode::Esc)), Some(InputEvent::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputEvent::Quit)
        );
        assert_eq!(map_key(press(KeyCode::Tab)), None);
    }
}
