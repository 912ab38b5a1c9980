//! Output formatting utilities

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Output format for displaying values
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
	Text,
	Json,
	Toml,
}

/// Placeholder shown instead of sensitive values
pub(crate) const REDACTED: &str = "[REDACTED]";

/// Property name fragments that mark a value as a secret
const SENSITIVE_PATTERNS: &[&str] = &[
	"password",
	"passwd",
	"pwd",
	"secret",
	"token",
	"apikey",
	"api_key",
	"credential",
	"privatekey",
	"private_key",
	"connectionstring",
	"connection_string",
];

/// Check whether a qualified key names a sensitive property
///
/// Only the property segment (after the last `.`) is inspected, so
/// `Database.Password` is sensitive while `PasswordPolicy.MinLength` is not.
pub(crate) fn is_sensitive_key(key: &str) -> bool {
	let property = key.rsplit('.').next().unwrap_or(key).to_lowercase();
	SENSITIVE_PATTERNS
		.iter()
		.any(|pattern| property.contains(pattern))
}

/// Value to display for `key`, redacted unless secrets were requested
pub(crate) fn display_value<'a>(key: &str, value: &'a str, show_secrets: bool) -> &'a str {
	if show_secrets || !is_sensitive_key(key) {
		value
	} else {
		REDACTED
	}
}

pub(crate) fn success(msg: &str) {
	println!("{} {}", "✓".green().bold(), msg);
}

pub(crate) fn error(msg: &str) {
	eprintln!("{} {}", "✗".red().bold(), msg);
}

pub(crate) fn warning(msg: &str) {
	println!("{} {}", "⚠".yellow().bold(), msg);
}

pub(crate) fn info(msg: &str) {
	println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Print a value in the requested format
pub(crate) fn print_value<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
	match format {
		OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
		OutputFormat::Toml => println!("{}", toml::to_string_pretty(value)?),
		OutputFormat::Text => print_value_text(&serde_json::to_value(value)?, 0),
	}
	Ok(())
}

fn print_value_text(value: &Value, indent: usize) {
	let indent_str = "  ".repeat(indent);
	match value {
		Value::Object(map) => {
			for (key, val) in map {
				if val.is_object() {
					println!("{}{}:", indent_str, key.cyan().bold());
					print_value_text(val, indent + 1);
				} else {
					print!("{}{} = ", indent_str, key.cyan().bold());
					print_value_text(val, 0);
				}
			}
		}
		Value::Array(items) => {
			for item in items {
				print!("{}- ", indent_str);
				print_value_text(item, indent + 1);
			}
		}
		Value::String(s) if s == REDACTED => println!("{}", s.dimmed()),
		Value::String(s) => println!("{}", s.green()),
		Value::Number(n) => println!("{}", n.to_string().yellow()),
		Value::Bool(b) => println!("{}", b.to_string().blue()),
		Value::Null => println!("{}", "null".dimmed()),
	}
}

/// How a key compares between two files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DiffMarker {
	Same,
	Changed,
	Added,
	Removed,
}

impl DiffMarker {
	pub(crate) fn symbol(self) -> &'static str {
		match self {
			Self::Same => "=",
			Self::Changed => "~",
			Self::Added => "+",
			Self::Removed => "-",
		}
	}
}

/// Print one line of a key diff
///
/// Values are optional; without them only the marker and key are shown.
pub(crate) fn print_diff(
	marker: DiffMarker,
	key: &str,
	old_value: Option<&str>,
	new_value: Option<&str>,
) {
	let symbol = marker.symbol();
	match (marker, old_value, new_value) {
		(DiffMarker::Changed, Some(old), Some(new)) => {
			println!(
				"{} {} {} → {}",
				symbol.yellow().bold(),
				key.cyan(),
				old.red().strikethrough(),
				new.green()
			);
		}
		(DiffMarker::Changed, _, _) => println!("{} {}", symbol.yellow().bold(), key.cyan()),
		(DiffMarker::Same, Some(value), _) => {
			println!("{} {} {}", symbol.dimmed(), key.cyan(), value.dimmed());
		}
		(DiffMarker::Same, None, _) => println!("{} {}", symbol.dimmed(), key.cyan()),
		(DiffMarker::Added, _, Some(new)) => {
			println!("{} {} {}", symbol.green().bold(), key.cyan(), new.green());
		}
		(DiffMarker::Added, _, None) => println!("{} {}", symbol.green().bold(), key.cyan()),
		(DiffMarker::Removed, Some(old), _) => {
			println!(
				"{} {} {}",
				symbol.red().bold(),
				key.cyan(),
				old.red().strikethrough()
			);
		}
		(DiffMarker::Removed, None, _) => println!("{} {}", symbol.red().bold(), key.cyan()),
	}
}
