//! Subcommands and the pipeline options they share

pub(crate) mod diff;
pub(crate) mod show;
pub(crate) mod sources;

use clap::Args;
use fig_conf::settings::builder::SettingsBuilder;
use fig_conf::settings::sources::FileSource;
use std::path::PathBuf;

/// Sources to stack, in the order they take precedence
///
/// Files come first in the order given (required before optional), then the
/// environment, then the trailing setting arguments.
#[derive(Args, Debug, Default)]
pub(crate) struct PipelineArgs {
	/// Configuration file that must exist (repeatable)
	#[arg(short = 'c', long = "file", value_name = "FILE")]
	pub files: Vec<String>,

	/// Configuration file that may be missing (repeatable)
	#[arg(long = "optional-file", value_name = "FILE")]
	pub optional_files: Vec<String>,

	/// Directory relative file names are resolved against
	#[arg(long, value_name = "DIR")]
	pub base_path: Option<PathBuf>,

	/// Variable for `${NAME}` placeholders in file names
	#[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
	pub variables: Vec<(String, String)>,

	/// Read environment variables starting with this prefix
	#[arg(long, value_name = "PREFIX")]
	pub env_prefix: Option<String>,

	/// Prefix of the setting arguments given after `--`
	#[arg(long, value_name = "PREFIX", default_value = "fig:")]
	pub arg_prefix: String,

	/// Setting arguments, e.g. `-- fig:Server.Port=9000`
	#[arg(last = true, value_name = "ARGS")]
	pub args: Vec<String>,
}

impl PipelineArgs {
	pub(crate) fn builder(&self) -> anyhow::Result<SettingsBuilder> {
		let mut builder = SettingsBuilder::new();

		if let Some(base_path) = &self.base_path {
			builder = builder.base_path(base_path);
		}
		for (name, value) in &self.variables {
			builder = builder.variable(name, value);
		}
		for file in &self.files {
			builder = builder.use_file(FileSource::auto(file.as_str())?.required(true));
		}
		for file in &self.optional_files {
			builder = builder.use_file(FileSource::auto(file.as_str())?);
		}
		if let Some(prefix) = &self.env_prefix {
			builder = builder.use_environment_variables(prefix);
		}
		if !self.args.is_empty() {
			builder = builder.use_command_line(&self.arg_prefix, &self.args);
		}

		for (position, source) in builder.sources().iter().enumerate() {
			tracing::debug!(position, source = %source, "Pipeline source");
		}
		Ok(builder)
	}
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
	match raw.split_once('=') {
		Some((name, value)) if !name.trim().is_empty() => {
			Ok((name.trim().to_string(), value.to_string()))
		}
		_ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
	}
}
