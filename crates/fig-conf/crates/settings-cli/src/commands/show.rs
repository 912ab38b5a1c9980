//! Show command

use super::PipelineArgs;
use crate::output::{self, OutputFormat};
use clap::Args;
use fig_conf::settings::dictionary::CompositeDictionary;
use serde_json::{Map, Value};

#[derive(Args)]
pub(crate) struct ShowArgs {
	#[command(flatten)]
	pub pipeline: PipelineArgs,

	/// Qualified key to show (shows all if not specified)
	#[arg(short, long)]
	pub key: Option<String>,

	/// Include the source that supplied each value
	#[arg(long)]
	pub origins: bool,

	/// Output format
	#[arg(short = 'f', long, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// Show sensitive values without redaction (passwords, keys, tokens)
	#[arg(long)]
	pub show_secrets: bool,
}

/// Display the values a pipeline resolves to
pub(crate) fn execute(args: ShowArgs) -> anyhow::Result<()> {
	let dictionary = args.pipeline.builder()?.build_dictionary()?;
	let rendered = render(&dictionary, &args)?;

	match &args.key {
		Some(key) => output::info(&format!("Value for key '{}':", key)),
		None if rendered.is_empty() => {
			output::warning("No settings resolved");
			return Ok(());
		}
		None => output::info("Resolved settings:"),
	}
	output::print_value(&Value::Object(rendered), args.format)
}

fn render(dictionary: &CompositeDictionary, args: &ShowArgs) -> anyhow::Result<Map<String, Value>> {
	let resolved = dictionary.resolved();

	let selected: Vec<(&String, &(String, String))> = match &args.key {
		Some(key) => {
			let entry = resolved
				.get_key_value(key)
				.ok_or_else(|| anyhow::anyhow!("Key not found: {}", key))?;
			vec![entry]
		}
		None => resolved.iter().collect(),
	};

	Ok(selected
		.into_iter()
		.map(|(key, (value, origin))| {
			let value = output::display_value(key, value, args.show_secrets).to_string();
			let rendered = if args.origins {
				serde_json::json!({ "value": value, "origin": origin })
			} else {
				Value::String(value)
			};
			(key.clone(), rendered)
		})
		.collect())
}
