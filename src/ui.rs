//! Terminal output styling: color detection, labeled messages, tables,
//! spinners.
//!
//! Color is disabled by (in priority order) `--no-color`, the `NO_COLOR`
//! environment variable, `TERM=dumb`, or a non-TTY stdout in auto mode.

use anstream::{eprintln, println};
use anstyle::{AnsiColor, Color, Style};
use comfy_table::{Cell, ContentArrangement, Table, presets};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// When to emit ANSI colors.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Always,
    #[default]
    Auto,
    Never,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            _ => Err(format!("invalid color mode: {}", s)),
        }
    }
}

/// Resolved display settings, passed to anything that prints.
#[derive(Debug, Clone)]
pub struct Ui {
    pub color_enabled: bool,
    pub spinner_enabled: bool,
}

impl Ui {
    pub fn new(mode: ColorMode, force_no_color: bool) -> Self {
        let color_enabled = Self::resolve_color(mode, force_no_color);
        let is_tty = std::io::stdout().is_terminal();
        let spinner_enabled = color_enabled && is_tty;

        if !color_enabled {
            anstream::ColorChoice::write_global(anstream::ColorChoice::Never);
        }

        Self {
            color_enabled,
            spinner_enabled,
        }
    }

    fn resolve_color(mode: ColorMode, force_no_color: bool) -> bool {
        if force_no_color {
            return false;
        }
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }
        if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
            return false;
        }
        match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    fn style_label(&self, color: AnsiColor) -> Style {
        if self.color_enabled {
            Style::new().fg_color(Some(Color::Ansi(color))).bold()
        } else {
            Style::new()
        }
    }

    /// Print OK label (green) with message to stdout
    pub fn ok(&self, msg: impl AsRef<str>) {
        let label = self.style_label(AnsiColor::Green);
        println!("{label}OK{label:#} {}", msg.as_ref());
    }

    /// Print WARN label (yellow) with message to stdout
    pub fn warn(&self, msg: impl AsRef<str>) {
        let label = self.style_label(AnsiColor::Yellow);
        println!("{label}WARN{label:#} {}", msg.as_ref());
    }

    /// Print ERROR label (red) with message to stderr
    pub fn err(&self, msg: impl AsRef<str>) {
        let label = self.style_label(AnsiColor::Red);
        eprintln!("{label}ERROR{label:#} {}", msg.as_ref());
    }

    /// Return a styled string (dimmed/gray) - for inline use
    pub fn dim(&self, s: impl AsRef<str>) -> String {
        if self.color_enabled {
            let st = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));
            format!("{st}{}{st:#}", s.as_ref())
        } else {
            s.as_ref().to_string()
        }
    }

    /// Return a styled string (bold) - for inline use
    pub fn bold(&self, s: impl AsRef<str>) -> String {
        if self.color_enabled {
            let st = Style::new().bold();
            format!("{st}{}{st:#}", s.as_ref())
        } else {
            s.as_ref().to_string()
        }
    }

    /// Return a styled string (underlined) - for section headings
    pub fn underline(&self, s: impl AsRef<str>) -> String {
        if self.color_enabled {
            let st = Style::new().underline();
            format!("{st}{}{st:#}", s.as_ref())
        } else {
            s.as_ref().to_string()
        }
    }

    /// Return a styled string with specific color - for inline use
    pub fn colored(&self, s: impl AsRef<str>, color: AnsiColor) -> String {
        if self.color_enabled {
            let st = Style::new().fg_color(Some(Color::Ansi(color)));
            format!("{st}{}{st:#}", s.as_ref())
        } else {
            s.as_ref().to_string()
        }
    }

    pub fn icon_ok(&self) -> &'static str {
        if self.color_enabled { "✓" } else { "[OK]" }
    }

    // -------------------------------------------------------------------------
    // Tables (comfy-table)
    // -------------------------------------------------------------------------

    /// Create a borderless table for lists
    pub fn simple_table(&self) -> Table {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.load_preset(presets::NOTHING);
        table
    }

    pub fn cell(&self, content: impl Into<String>) -> Cell {
        Cell::new(content.into())
    }

    /// Create a header cell (bold when color enabled)
    pub fn header_cell(&self, content: impl Into<String>) -> Cell {
        let cell = Cell::new(content.into());
        if self.color_enabled {
            cell.add_attribute(comfy_table::Attribute::Bold)
        } else {
            cell
        }
    }

    /// Create a colored cell using comfy-table's native styling
    pub fn colored_cell(&self, content: impl Into<String>, color: AnsiColor) -> Cell {
        let cell = Cell::new(content.into());
        if self.color_enabled {
            cell.fg(ansi_to_comfy_color(color))
        } else {
            cell
        }
    }

    // -------------------------------------------------------------------------
    // Spinners (indicatif)
    // -------------------------------------------------------------------------

    /// Create a spinner for longer operations.
    /// Returns a no-op spinner when disabled.
    pub fn spinner(&self, message: impl Into<std::borrow::Cow<'static, str>>) -> ProgressBar {
        if self.spinner_enabled {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                    .template("{spinner:.cyan} {msg}")
                    .expect("valid template"),
            );
            pb.set_message(message);
            pb.enable_steady_tick(Duration::from_millis(80));
            pb
        } else {
            let pb = ProgressBar::hidden();
            pb.set_message(message);
            pb
        }
    }

    /// Finish a spinner with a success message
    pub fn spinner_finish_ok(
        &self,
        pb: &ProgressBar,
        msg: impl Into<std::borrow::Cow<'static, str>>,
    ) {
        if self.spinner_enabled {
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{msg}")
                    .expect("valid template"),
            );
            let icon = self.colored("✓", AnsiColor::Green);
            pb.finish_with_message(format!("{} {}", icon, msg.into()));
        } else {
            pb.finish_and_clear();
            self.ok(msg.into());
        }
    }

    /// Print a line to stdout
    pub fn println(&self, msg: impl AsRef<str>) {
        println!("{}", msg.as_ref());
    }

    /// Print an empty line
    pub fn newline(&self) {
        println!();
    }

    /// Print a section header
    pub fn section(&self, title: impl AsRef<str>) {
        println!("{}", self.bold(title));
    }
}

fn ansi_to_comfy_color(color: AnsiColor) -> comfy_table::Color {
    match color {
        AnsiColor::Black => comfy_table::Color::Black,
        AnsiColor::Red => comfy_table::Color::Red,
        AnsiColor::Green => comfy_table::Color::Green,
        AnsiColor::Yellow => comfy_table::Color::Yellow,
        AnsiColor::Blue => comfy_table::Color::Blue,
        AnsiColor::Magenta => comfy_table::Color::Magenta,
        AnsiColor::Cyan => comfy_table::Color::Cyan,
        AnsiColor::White => comfy_table::Color::White,
        AnsiColor::BrightBlack => comfy_table::Color::DarkGrey,
        AnsiColor::BrightRed => comfy_table::Color::Red,
        AnsiColor::BrightGreen => comfy_table::Color::Green,
        AnsiColor::BrightYellow => comfy_table::Color::Yellow,
        AnsiColor::BrightBlue => comfy_table::Color::Blue,
        AnsiColor::BrightMagenta => comfy_table::Color::Magenta,
        AnsiColor::BrightCyan => comfy_table::Color::Cyan,
        AnsiColor::BrightWhite => comfy_table::Color::White,
    }
}
