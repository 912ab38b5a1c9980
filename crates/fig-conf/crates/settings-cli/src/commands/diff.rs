//! Diff command

use crate::output::{self, DiffMarker};
use clap::Args;
use fig_conf::settings::sources::{ConfigSource, FileSource};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub(crate) struct DiffArgs {
	/// First configuration file
	#[arg(value_name = "FILE1")]
	pub file1: PathBuf,

	/// Second configuration file
	#[arg(value_name = "FILE2")]
	pub file2: PathBuf,

	/// Show only differences
	#[arg(short, long)]
	pub only_differences: bool,

	/// Show values (otherwise just show keys)
	#[arg(short = 'V', long)]
	pub show_values: bool,

	/// Show sensitive values without redaction
	#[arg(long)]
	pub show_secrets: bool,
}

/// How one key compares between two files
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyDiff {
	Same(String),
	Changed { old: String, new: String },
	Removed(String),
	Added(String),
}

/// One rendered line of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
struct DiffLine {
	marker: DiffMarker,
	key: String,
	old: Option<String>,
	new: Option<String>,
}

/// Compare two files after flattening them into qualified keys
pub(crate) fn execute(args: DiffArgs) -> anyhow::Result<()> {
	output::info("Comparing configuration files");

	let left = load_entries(&args.file1)?;
	let right = load_entries(&args.file2)?;
	let diff = compare(&left, &right);

	for line in render(&diff, &args) {
		output::print_diff(line.marker, &line.key, line.old.as_deref(), line.new.as_deref());
	}

	let count = |marker: DiffMarker| diff.iter().filter(|(_, d)| d.marker() == marker).count();
	let (changed, added, removed) = (
		count(DiffMarker::Changed),
		count(DiffMarker::Added),
		count(DiffMarker::Removed),
	);

	println!();
	output::info(&format!("Changed: {}", changed));
	output::info(&format!("Added: {}", added));
	output::info(&format!("Removed: {}", removed));

	if changed + added + removed == 0 {
		output::success("Files are identical");
	}

	Ok(())
}

impl KeyDiff {
	fn marker(&self) -> DiffMarker {
		match self {
			Self::Same(_) => DiffMarker::Same,
			Self::Changed { .. } => DiffMarker::Changed,
			Self::Removed(_) => DiffMarker::Removed,
			Self::Added(_) => DiffMarker::Added,
		}
	}
}

/// Lines to print, with values only when requested and secrets redacted
fn render(diff: &[(String, KeyDiff)], args: &DiffArgs) -> Vec<DiffLine> {
	diff.iter()
		.filter(|(_, entry)| !(args.only_differences && matches!(entry, KeyDiff::Same(_))))
		.map(|(key, entry)| {
			let shown = |value: &String| {
				args.show_values
					.then(|| output::display_value(key, value, args.show_secrets).to_string())
			};
			let (old, new) = match entry {
				KeyDiff::Same(value) => (shown(value), None),
				KeyDiff::Changed { old, new } => (shown(old), shown(new)),
				KeyDiff::Removed(value) => (shown(value), None),
				KeyDiff::Added(value) => (None, shown(value)),
			};
			DiffLine {
				marker: entry.marker(),
				key: key.clone(),
				old,
				new,
			}
		})
		.collect()
}

fn load_entries(path: &Path) -> anyhow::Result<IndexMap<String, String>> {
	let source = FileSource::auto(path.to_string_lossy())?.required(true);
	let snapshot = source.load()?;
	Ok(snapshot.entries().clone())
}

/// Classify every key of either side, in sorted key order
fn compare(
	left: &IndexMap<String, String>,
	right: &IndexMap<String, String>,
) -> Vec<(String, KeyDiff)> {
	let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();

	keys.into_iter()
		.filter_map(|key| {
			let entry = match (left.get(key), right.get(key)) {
				(Some(old), Some(new)) if old == new => KeyDiff::Same(old.clone()),
				(Some(old), Some(new)) => KeyDiff::Changed {
					old: old.clone(),
					new: new.clone(),
				},
				(Some(old), None) => KeyDiff::Removed(old.clone()),
				(None, Some(new)) => KeyDiff::Added(new.clone()),
				(None, None) => return None,
			};
			Some((key.clone(), entry))
		})
		.collect()
}
