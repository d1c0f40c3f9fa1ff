mod builder;
mod commands;
mod config;
mod diagnostics;
mod domain;
mod error;
mod grammar;
mod index;
mod info;
mod namespace;
mod registry;
mod scanner;
mod types;
mod watch;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Command-line interface.
#[derive(Parser)]
#[command(name = "polyglot", about = "Object descriptions for documentation in many languages")]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// Log scan and registration events to stderr.
    #[arg(long, global = true)]
    debug: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan documentation, register every object, and write .polyglot.index
    Build,
    /// Scan and register without writing the index (exit 0/1/2)
    Check,
    /// Enable or disable a domain in .polyglot.toml
    Domain {
        /// What to change.
        #[command(subcommand)]
        action: DomainAction,
    },
    /// List registered domains, their directives, and project state
    Domains {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Find where an object is declared, e.g. `polyglot lookup go:function io.Copy`
    Lookup {
        /// Directive as domain:directive.
        directive: String,
        /// Qualified object name.
        name: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Parse one signature and show its parts
    Parse {
        /// Directive as domain:directive.
        directive: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Namespace in effect, as if set by an earlier directive.
        #[arg(long)]
        namespace: Option<String>,
        /// Signature text.
        signature: String,
    },
    /// Build, then rebuild whenever documentation changes
    Watch,
}

/// Subcommands of `polyglot domain`.
#[derive(Subcommand)]
enum DomainAction {
    /// Remove a domain from the active list
    Disable {
        /// Domain prefix, e.g. `sql`.
        prefix: String,
    },
    /// Add a domain to the active list
    Enable {
        /// Domain prefix, e.g. `sql`.
        prefix: String,
    },
}

/// Install the stderr log subscriber. `--debug` wins over `RUST_LOG`.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("polyglot=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Build => commands::build(),
        Commands::Check => commands::check(),
        Commands::Domain { action: DomainAction::Disable { prefix } } => {
            commands::disable(&prefix).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Domain { action: DomainAction::Enable { prefix } } => {
            commands::enable(&prefix).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Domains { json } => {
            commands::domains(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Lookup { directive, name, json } => {
            commands::lookup(&directive, &name, json).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Parse { directive, json, namespace, signature } => {
            commands::parse(&directive, &signature, namespace.as_deref(), json).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Watch => watch::run(),
    };

    return match result {
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3)
        },
        Ok(code) => code,
    };
}
