// CLI module - command-line argument parsing and handlers
//
// Without a subcommand the console runs interactively (TUI, or a line prompt
// when AUDIT_CONSOLE_NO_TUI is set). Subcommands:
// - ask <QUERY>: one exchange, streamed to stdout
// - config --show: Display effective configuration
// - config --path: Show config file path
// - config --reset: Regenerate config file with defaults

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};
use std::io::Write;

/// Audit console - terminal front end for the orchestrator's agent stream
#[derive(Parser, Debug)]
#[command(name = "audit-console")]
#[command(version = VERSION)]
#[command(about = "Terminal console for a streaming multi-agent orchestrator", long_about = None)]
pub struct Cli {
    /// Replay a canned orchestrator stream instead of calling the endpoint
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one query and stream the agents' output to stdout
    Ask {
        /// Query text; multiple words are joined with spaces
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// What the binary should do after argument handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// TUI or line prompt, depending on config
    Interactive { demo: bool },
    /// Single headless exchange
    Ask { query: String, demo: bool },
}

impl Cli {
    /// Map parsed arguments to a run mode. `None` for config commands, which
    /// are handled synchronously.
    pub fn run_mode(&self) -> Option<RunMode> {
        match &self.command {
            None => Some(RunMode::Interactive { demo: self.demo }),
            Some(Commands::Ask { query }) => Some(RunMode::Ask {
                query: query.join(" "),
                demo: self.demo,
            }),
            Some(Commands::Config { .. }) => None,
        }
    }
}

/// Parse arguments and handle config commands.
/// Returns the run mode, or `None` if a command was handled (exit after).
pub fn handle_cli() -> Option<RunMode> {
    let cli = Cli::parse();

    if let Some(Commands::Config { show, reset, path }) = &cli.command {
        if *path {
            handle_config_path();
        } else if *show {
            handle_config_show();
        } else if *reset {
            handle_config_reset();
        } else {
            // No flag provided, show help
            println!("Usage: audit-console config [--show|--reset|--path]");
            println!();
            println!("Options:");
            println!("  --show    Display effective configuration");
            println!("  --reset   Reset config file to defaults");
            println!("  --path    Show config file path");
        }
    }

    cli.run_mode()
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());
    println!();
    println!("# Runtime flags");
    println!("# tui = {}", config.enable_tui);
    println!("# demo = {}", config.demo_mode);

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}
