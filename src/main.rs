use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use git_ident::{
    commands,
    error::Result,
    git::GitBackend,
    picker::DEFAULT_FINDER,
    store,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "git-ident")]
#[command(about = "Git identity switcher - manage multiple git user profiles")]
#[command(version)]
struct Cli {
    /// Path to the profile file (default: ~/.gitprofiles)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a profile through an external fuzzy-finder
    Pick {
        /// Finder command to run (gets labels on stdin)
        #[arg(long, default_value = DEFAULT_FINDER)]
        finder: String,
    },

    /// Apply a profile by label
    Use {
        /// Label of the profile to apply
        label: String,
    },

    /// List all profiles
    List,

    /// Show the repository's active identity
    Current,

    /// Clone a repository using a profile's SSH key
    Clone {
        /// Repository to clone
        repo: String,

        /// Target directory (git's default when omitted)
        dir: Option<String>,

        /// Label of the profile whose key to use
        #[arg(long, value_name = "LABEL")]
        profile: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let ui = Ui::new(cli.color, cli.no_color);

    // Exit-code mapping lives here and nowhere else: 0 on success or quit,
    // 1 on any propagated error.
    if let Err(err) = run(cli, &ui) {
        ui.err(err.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli, ui: &Ui) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => store::default_path()?,
    };
    let backend = GitBackend::new();

    match cli.command {
        None => commands::interactive(&config_path, Arc::new(backend), ui),
        Some(Commands::Pick { finder }) => commands::pick(&config_path, &finder, &backend, ui),
        Some(Commands::Use { label }) => commands::use_profile(&config_path, &label, &backend, ui),
        Some(Commands::List) => commands::list(&config_path, &backend, ui),
        Some(Commands::Current) => commands::current(&backend, ui),
        Some(Commands::Clone { repo, dir, profile }) => {
            commands::clone(&config_path, &profile, &repo, dir.as_deref(), ui)
        }
    }
}
