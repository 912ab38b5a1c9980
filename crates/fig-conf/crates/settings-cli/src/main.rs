//! Fig settings CLI
//!
//! Inspect what a layered source pipeline resolves to, which source supplies
//! each key, and how two configuration files differ.
//!
//! ## Usage
//!
//! ```bash
//! fig-settings show --file appSettings.json --env-prefix FIG_ -- fig:Server.Port=9000
//! fig-settings sources --file appSettings.json --optional-file 'appSettings.${CONFIG}.json' --var CONFIG=Production
//! fig-settings diff appSettings.json appSettings.Production.json --show-values
//! ```

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fig-settings")]
#[command(about = "Inspect layered application settings", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Show resolved settings values
	Show(commands::show::ShowArgs),

	/// List pipeline sources, lowest precedence first
	Sources(commands::sources::SourcesArgs),

	/// Compare two configuration files key by key
	Diff(commands::diff::DiffArgs),
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let result = match cli.command {
		Commands::Show(args) => commands::show::execute(args),
		Commands::Sources(args) => commands::sources::execute(args),
		Commands::Diff(args) => commands::diff::execute(args),
	};

	if let Err(e) = result {
		output::error(&format!("{:#}", e));
		process::exit(1);
	}
}

fn init_tracing(verbosity: u8) {
	let level = match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
