//! Configuration sources for the composite dictionary
//!
//! Each source produces an immutable [`SourceSnapshot`]: an ordered mapping of
//! qualified keys (`ExampleSettings.Count`) to raw strings. Sources know how
//! to read their origin and nothing else; precedence is decided by the order
//! in which snapshots are added to the dictionary.

use indexmap::IndexMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Read this source into a snapshot
	fn load(&self) -> Result<SourceSnapshot, SourceError>;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("Required configuration source is unavailable: {}", path.display())]
	Unavailable { path: PathBuf },

	#[error("Cannot expand '${{{variable}}}' in file name template '{template}'")]
	Template { template: String, variable: String },

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid source: {0}")]
	InvalidSource(String),
}

/// Immutable output of one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSnapshot {
	origin: String,
	entries: IndexMap<String, String>,
}

impl SourceSnapshot {
	/// Create a snapshot from an origin label and its entries
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::sources::SourceSnapshot;
	///
	/// let snapshot = SourceSnapshot::new(
	///     "defaults",
	///     [("ExampleSettings.Count", "42")],
	/// );
	/// assert_eq!(snapshot.get("ExampleSettings.Count"), Some("42"));
	/// ```
	pub fn new<K, V>(origin: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			origin: origin.into(),
			entries: entries
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}

	/// Create a snapshot with no entries
	pub fn empty(origin: impl Into<String>) -> Self {
		Self {
			origin: origin.into(),
			entries: IndexMap::new(),
		}
	}

	pub fn origin(&self) -> &str {
		&self.origin
	}

	pub fn entries(&self) -> &IndexMap<String, String> {
		&self.entries
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Fixed in-memory values
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	values: IndexMap<String, String>,
}

impl MemorySource {
	/// Create an empty in-memory source
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::sources::{ConfigSource, MemorySource};
	///
	/// let source = MemorySource::new()
	///     .with_value("ExampleSettings.Count", "400")
	///     .with_value("ExampleSettings.RequiredInt", "200");
	/// assert_eq!(source.load().unwrap().len(), 2);
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.values.insert(key.into(), value.into());
		self
	}

	pub fn with_values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		self.values
			.extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}
}

impl ConfigSource for MemorySource {
	fn load(&self) -> Result<SourceSnapshot, SourceError> {
		Ok(SourceSnapshot {
			origin: self.description(),
			entries: self.values.clone(),
		})
	}

	fn description(&self) -> String {
		"In-memory values".to_string()
	}
}

/// Command-line argument source
///
/// Recognizes `<prefix>Key=Value` and `<prefix>Key Value`. Tokens without the
/// prefix are ignored so the application can keep its own arguments.
#[derive(Debug, Clone)]
pub struct CommandLineSource {
	prefix: String,
	args: Vec<String>,
}

impl CommandLineSource {
	/// Create a source over explicit arguments
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::sources::{CommandLineSource, ConfigSource};
	///
	/// let source = CommandLineSource::new(
	///     "fig:",
	///     ["--verbose", "fig:ExampleSettings.Count=7", "fig:ExampleSettings.Name", "demo"],
	/// );
	/// let snapshot = source.load().unwrap();
	/// assert_eq!(snapshot.get("ExampleSettings.Count"), Some("7"));
	/// assert_eq!(snapshot.get("ExampleSettings.Name"), Some("demo"));
	/// ```
	pub fn new(prefix: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
		Self {
			prefix: prefix.into(),
			args: args.into_iter().map(Into::into).collect(),
		}
	}

	/// Create a source over the process arguments, skipping the program name
	pub fn from_process_args(prefix: impl Into<String>) -> Self {
		let args: Vec<String> = std::env::args_os()
			.skip(1)
			.filter_map(|arg| arg.into_string().ok())
			.collect();
		Self::new(prefix, args)
	}
}

impl ConfigSource for CommandLineSource {
	fn load(&self) -> Result<SourceSnapshot, SourceError> {
		let mut entries = IndexMap::new();
		let mut args = self.args.iter().peekable();

		while let Some(arg) = args.next() {
			let Some(rest) = arg.strip_prefix(self.prefix.as_str()) else {
				continue;
			};

			let (key, value) = match rest.split_once('=') {
				Some((key, value)) => (key, value.to_string()),
				None => {
					let value = args
						.next_if(|next| !next.starts_with(self.prefix.as_str()))
						.ok_or_else(|| {
							SourceError::Parse(format!(
								"Missing value for command-line setting '{}'",
								rest
							))
						})?;
					(rest, value.clone())
				}
			};

			if key.is_empty() {
				return Err(SourceError::Parse(format!(
					"Empty setting name in argument '{}'",
					arg
				)));
			}
			entries.insert(key.to_string(), value);
		}

		Ok(SourceSnapshot {
			origin: self.description(),
			entries,
		})
	}

	fn description(&self) -> String {
		format!("Command line (prefix: {})", self.prefix)
	}
}

/// Environment variable source
///
/// The prefix is stripped and every `__` becomes `.`, so
/// `FIG_ExampleSettings__Count` binds `ExampleSettings.Count`. Keys stay
/// case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
	prefix: Option<String>,
}

impl EnvSource {
	/// Create a new environment variable configuration source
	pub fn new() -> Self {
		Self { prefix: None }
	}

	/// Set a prefix filter for environment variables
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::sources::EnvSource;
	///
	/// let source = EnvSource::new().with_prefix("FIG_");
	/// // Only loads env vars starting with FIG_
	/// ```
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	fn map_key(&self, name: &str) -> Option<String> {
		let rest = match &self.prefix {
			Some(prefix) => name.strip_prefix(prefix.as_str())?,
			None => name,
		};
		if rest.is_empty() {
			return None;
		}
		Some(rest.replace("__", "."))
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<SourceSnapshot, SourceError> {
		let mut vars: Vec<(String, String)> = std::env::vars_os()
			.filter_map(|(name, value)| utf8_pair(name, value))
			.filter_map(|(name, value)| self.map_key(&name).map(|key| (key, value)))
			.collect();
		vars.sort_by(|a, b| a.0.cmp(&b.0));

		Ok(SourceSnapshot {
			origin: self.description(),
			entries: vars.into_iter().collect(),
		})
	}

	fn description(&self) -> String {
		match &self.prefix {
			Some(prefix) => format!("Environment variables (prefix: {})", prefix),
			None => "Environment variables".to_string(),
		}
	}
}

fn utf8_pair(name: OsString, value: OsString) -> Option<(String, String)> {
	Some((name.into_string().ok()?, value.into_string().ok()?))
}

/// Structured file formats understood by [`FileSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
	Json,
	Toml,
	Ini,
}

impl FileFormat {
	/// Detect the format from a file extension
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
		let path = path.as_ref();
		let ext = path
			.extension()
			.and_then(|e| e.to_str())
			.ok_or_else(|| SourceError::InvalidSource("No file extension".to_string()))?;

		match ext.to_ascii_lowercase().as_str() {
			"json" => Ok(Self::Json),
			"toml" => Ok(Self::Toml),
			"ini" => Ok(Self::Ini),
			_ => Err(SourceError::InvalidSource(format!(
				"Unsupported file extension: {}",
				ext
			))),
		}
	}

	fn label(self) -> &'static str {
		match self {
			Self::Json => "JSON",
			Self::Toml => "TOML",
			Self::Ini => "INI",
		}
	}
}

/// Structured file source
///
/// The file name is a template: `${NAME}` placeholders are filled from the
/// source's variables first, then from the process environment. Relative
/// names are resolved against the base path.
///
/// Nested objects and tables are flattened into dotted keys, arrays into
/// `key.<index>`.
#[derive(Debug, Clone)]
pub struct FileSource {
	format: FileFormat,
	template: String,
	base_path: Option<PathBuf>,
	variables: IndexMap<String, String>,
	required: bool,
}

impl FileSource {
	/// Create a file source with an explicit format
	///
	/// Sources are optional by default: a missing file yields an empty
	/// snapshot.
	pub fn new(format: FileFormat, template: impl Into<String>) -> Self {
		Self {
			format,
			template: template.into(),
			base_path: None,
			variables: IndexMap::new(),
			required: false,
		}
	}

	/// JSON file source
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::sources::FileSource;
	///
	/// let source = FileSource::json("appSettings.${CONFIG}.json")
	///     .with_variable("CONFIG", "Production")
	///     .required(false);
	/// ```
	pub fn json(template: impl Into<String>) -> Self {
		Self::new(FileFormat::Json, template)
	}

	pub fn toml(template: impl Into<String>) -> Self {
		Self::new(FileFormat::Toml, template)
	}

	pub fn ini(template: impl Into<String>) -> Self {
		Self::new(FileFormat::Ini, template)
	}

	/// Detect the format from the template's extension
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::sources::{FileFormat, FileSource};
	///
	/// let source = FileSource::auto("settings.toml").unwrap();
	/// assert_eq!(source.format(), FileFormat::Toml);
	/// assert!(FileSource::auto("settings.yaml").is_err());
	/// ```
	pub fn auto(template: impl Into<String>) -> Result<Self, SourceError> {
		let template = template.into();
		let format = FileFormat::from_path(&template)?;
		Ok(Self::new(format, template))
	}

	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
		self.base_path = Some(base_path.into());
		self
	}

	pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.variables.insert(name.into(), value.into());
		self
	}

	pub fn with_variables(mut self, variables: &IndexMap<String, String>) -> Self {
		self.variables
			.extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
		self
	}

	/// Fill in a base path and variables this source does not set itself
	pub(crate) fn inherit(
		mut self,
		base_path: Option<&Path>,
		variables: &IndexMap<String, String>,
	) -> Self {
		if self.base_path.is_none() {
			self.base_path = base_path.map(Path::to_path_buf);
		}
		for (name, value) in variables {
			self.variables
				.entry(name.clone())
				.or_insert_with(|| value.clone());
		}
		self
	}

	pub fn format(&self) -> FileFormat {
		self.format
	}

	pub fn is_required(&self) -> bool {
		self.required
	}

	/// Expand the template and join it onto the base path
	pub fn resolve_path(&self) -> Result<PathBuf, SourceError> {
		let name = expand_template(&self.template, &self.variables)?;
		let path = PathBuf::from(name);
		Ok(match &self.base_path {
			Some(base) if path.is_relative() => base.join(path),
			_ => path,
		})
	}

	fn parse(&self, content: &str) -> Result<IndexMap<String, String>, SourceError> {
		match self.format {
			FileFormat::Json => {
				let value: serde_json::Value = serde_json::from_str(content)?;
				if !value.is_object() {
					return Err(SourceError::Parse("Expected object at root".to_string()));
				}
				let mut entries = IndexMap::new();
				flatten_json(None, &value, &mut entries);
				Ok(entries)
			}
			FileFormat::Toml => {
				let table: toml::Table = toml::from_str(content)?;
				let mut entries = IndexMap::new();
				for (key, value) in &table {
					flatten_toml(key, value, &mut entries);
				}
				Ok(entries)
			}
			FileFormat::Ini => parse_ini(content),
		}
	}
}

impl ConfigSource for FileSource {
	fn load(&self) -> Result<SourceSnapshot, SourceError> {
		let path = match self.resolve_path() {
			Ok(path) => path,
			Err(SourceError::Template { template, variable }) if !self.required => {
				tracing::debug!(
					template = %template,
					variable = %variable,
					"Skipping optional file source with unresolved template"
				);
				return Ok(SourceSnapshot::empty(self.description()));
			}
			Err(e) => return Err(e),
		};

		if !path.is_file() {
			if self.required {
				return Err(SourceError::Unavailable { path });
			}
			tracing::debug!(path = %path.display(), "Optional file source not found");
			return Ok(SourceSnapshot::empty(self.description()));
		}

		let content = fs::read_to_string(&path)?;
		let entries = self.parse(&content)?;

		Ok(SourceSnapshot {
			origin: format!("{} file: {}", self.format.label(), path.display()),
			entries,
		})
	}

	fn description(&self) -> String {
		format!("{} file: {}", self.format.label(), self.template)
	}
}

/// Expand `${NAME}` placeholders in a file name template
///
/// # Examples
///
/// ```
/// use fig_conf::settings::sources::expand_template;
/// use indexmap::IndexMap;
///
/// let mut vars = IndexMap::new();
/// vars.insert("CONFIG".to_string(), "Staging".to_string());
/// assert_eq!(
///     expand_template("appSettings.${CONFIG}.json", &vars).unwrap(),
///     "appSettings.Staging.json"
/// );
/// ```
pub fn expand_template(
	template: &str,
	variables: &IndexMap<String, String>,
) -> Result<String, SourceError> {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(start) = rest.find("${") {
		out.push_str(&rest[..start]);
		let after = &rest[start + 2..];
		let end = after.find('}').ok_or_else(|| {
			SourceError::Parse(format!("Unterminated placeholder in '{}'", template))
		})?;
		let name = &after[..end];

		let value = variables
			.get(name)
			.cloned()
			.or_else(|| std::env::var(name).ok())
			.ok_or_else(|| SourceError::Template {
				template: template.to_string(),
				variable: name.to_string(),
			})?;
		out.push_str(&value);
		rest = &after[end + 1..];
	}

	out.push_str(rest);
	Ok(out)
}

fn join_key(prefix: Option<&str>, key: &str) -> String {
	match prefix {
		Some(prefix) => format!("{}.{}", prefix, key),
		None => key.to_string(),
	}
}

fn flatten_json(prefix: Option<&str>, value: &serde_json::Value, out: &mut IndexMap<String, String>) {
	use serde_json::Value;

	match value {
		Value::Object(map) => {
			for (key, child) in map {
				let key = join_key(prefix, key);
				flatten_json(Some(&key), child, out);
			}
		}
		Value::Array(items) => {
			for (index, child) in items.iter().enumerate() {
				let key = join_key(prefix, &index.to_string());
				flatten_json(Some(&key), child, out);
			}
		}
		Value::Null => {}
		Value::String(s) => {
			if let Some(prefix) = prefix {
				out.insert(prefix.to_string(), s.clone());
			}
		}
		Value::Bool(_) | Value::Number(_) => {
			if let Some(prefix) = prefix {
				out.insert(prefix.to_string(), value.to_string());
			}
		}
	}
}

fn flatten_toml(key: &str, value: &toml::Value, out: &mut IndexMap<String, String>) {
	use toml::Value;

	match value {
		Value::Table(table) => {
			for (child_key, child) in table {
				flatten_toml(&format!("{}.{}", key, child_key), child, out);
			}
		}
		Value::Array(items) => {
			for (index, child) in items.iter().enumerate() {
				flatten_toml(&format!("{}.{}", key, index), child, out);
			}
		}
		Value::String(s) => {
			out.insert(key.to_string(), s.clone());
		}
		Value::Integer(i) => {
			out.insert(key.to_string(), i.to_string());
		}
		Value::Float(f) => {
			out.insert(key.to_string(), f.to_string());
		}
		Value::Boolean(b) => {
			out.insert(key.to_string(), b.to_string());
		}
		Value::Datetime(dt) => {
			out.insert(key.to_string(), dt.to_string());
		}
	}
}

fn parse_ini(content: &str) -> Result<IndexMap<String, String>, SourceError> {
	let mut entries = IndexMap::new();
	let mut section: Option<String> = None;

	for (index, line) in content.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
			continue;
		}

		if let Some(header) = line.strip_prefix('[') {
			let name = header.strip_suffix(']').ok_or_else(|| {
				SourceError::Parse(format!("Unclosed section header on line {}", index + 1))
			})?;
			let name = name.trim();
			section = (!name.is_empty()).then(|| name.to_string());
			continue;
		}

		let (key, value) = line.split_once('=').ok_or_else(|| {
			SourceError::Parse(format!("Expected 'key = value' on line {}", index + 1))
		})?;
		let key = key.trim();
		if key.is_empty() {
			return Err(SourceError::Parse(format!("Empty key on line {}", index + 1)));
		}

		let full_key = match &section {
			Some(section) => format!("{}.{}", section, key),
			None => key.to_string(),
		};
		entries.insert(full_key, strip_quotes(value.trim()).to_string());
	}

	Ok(entries)
}

/// Strip surrounding quotes (double or single) from an INI value.
fn strip_quotes(raw: &str) -> &str {
	if raw.len() >= 2
		&& ((raw.starts_with('"') && raw.ends_with('"'))
			|| (raw.starts_with('\'') && raw.ends_with('\'')))
	{
		&raw[1..raw.len() - 1]
	} else {
		raw
	}
}
