//! Sources command

use super::PipelineArgs;
use crate::output;
use clap::Args;
use colored::Colorize;
use fig_conf::settings::dictionary::CompositeDictionary;

#[derive(Args)]
pub(crate) struct SourcesArgs {
	#[command(flatten)]
	pub pipeline: PipelineArgs,
}

/// List every source of the pipeline with how many keys it supplies
pub(crate) fn execute(args: SourcesArgs) -> anyhow::Result<()> {
	let builder = args.pipeline.builder()?;
	if builder.sources().is_empty() {
		output::warning("No sources configured");
		return Ok(());
	}

	let dictionary = builder.build_dictionary()?;
	let effective = effective_counts(&dictionary);

	output::info("Sources, lowest precedence first:");
	for (index, (snapshot, winning)) in dictionary.sources().iter().zip(&effective).enumerate() {
		println!(
			"  {}. {} {}",
			(index + 1).to_string().bold(),
			snapshot.origin(),
			format!("({} keys, {} effective)", snapshot.len(), winning).dimmed()
		);
	}
	Ok(())
}

/// Number of keys each source supplies that no later source overrides
fn effective_counts(dictionary: &CompositeDictionary) -> Vec<usize> {
	let layers = dictionary.sources();
	layers
		.iter()
		.enumerate()
		.map(|(index, layer)| {
			layer
				.entries()
				.keys()
				.filter(|key| !dictionary.overlay().contains_key(*key))
				.filter(|key| !layers[index + 1..].iter().any(|later| later.get(key).is_some()))
				.count()
		})
		.collect()
}
