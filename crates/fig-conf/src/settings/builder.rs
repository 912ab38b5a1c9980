//! Settings builder
//!
//! Collects an explicit, ordered pipeline of sources. Sources are added to the
//! composite dictionary in the order they were registered here, so the last
//! registered source wins for every key it defines, and overrides win over
//! everything.
//!
//! No reordering by source kind takes place. To let command-line arguments
//! beat configuration files, register them after the files:
//!
//! ```
//! use fig_conf::settings::builder::SettingsBuilder;
//!
//! let builder = SettingsBuilder::new()
//!     .base_path(".")
//!     .use_json_file("appSettings.json", false)
//!     .use_json_file("appSettings.${CONFIG}.json", false)
//!     .use_environment_variables("FIG_")
//!     .use_command_line("fig:", Vec::<String>::new());
//!
//! assert_eq!(builder.sources().len(), 4);
//! ```

use super::dictionary::CompositeDictionary;
use super::error::FigResult;
use super::object::{Settings, SettingsType};
use super::registry::{PropertyRegistry, RegistryError};
use super::sources::{CommandLineSource, ConfigSource, EnvSource, FileSource, SourceError};
use indexmap::IndexMap;
use std::path::PathBuf;

enum PipelineEntry {
	File(FileSource),
	Custom(Box<dyn ConfigSource>),
}

impl PipelineEntry {
	fn description(&self) -> String {
		match self {
			Self::File(source) => source.description(),
			Self::Custom(source) => source.description(),
		}
	}
}

/// Builder for a composite dictionary and the settings loaded from it
#[derive(Default)]
pub struct SettingsBuilder {
	base_path: Option<PathBuf>,
	variables: IndexMap<String, String>,
	pipeline: Vec<PipelineEntry>,
	overrides: IndexMap<String, String>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Directory relative file names are resolved against
	///
	/// Applies to every file source without its own base path, including
	/// ones registered before this call.
	pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.base_path = Some(path.into());
		self
	}

	/// Variable available to `${NAME}` placeholders in file name templates
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::builder::SettingsBuilder;
	///
	/// let builder = SettingsBuilder::new()
	///     .variable("CONFIG", "Production")
	///     .use_ini_file("appSettings.${CONFIG}.ini", false);
	/// ```
	pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.variables.insert(name.into(), value.into());
		self
	}

	/// Read `<prefix>Key=Value` settings from explicit arguments
	pub fn use_command_line(
		self,
		prefix: impl Into<String>,
		args: impl IntoIterator<Item = impl Into<String>>,
	) -> Self {
		self.add_source(CommandLineSource::new(prefix, args))
	}

	/// Read `<prefix>Key=Value` settings from the process arguments
	pub fn use_process_args(self, prefix: impl Into<String>) -> Self {
		self.add_source(CommandLineSource::from_process_args(prefix))
	}

	pub fn use_environment_variables(self, prefix: impl Into<String>) -> Self {
		self.add_source(EnvSource::new().with_prefix(prefix))
	}

	pub fn use_json_file(self, template: impl Into<String>, required: bool) -> Self {
		self.use_file(FileSource::json(template).required(required))
	}

	pub fn use_toml_file(self, template: impl Into<String>, required: bool) -> Self {
		self.use_file(FileSource::toml(template).required(required))
	}

	pub fn use_ini_file(self, template: impl Into<String>, required: bool) -> Self {
		self.use_file(FileSource::ini(template).required(required))
	}

	pub fn use_file(mut self, source: FileSource) -> Self {
		self.pipeline.push(PipelineEntry::File(source));
		self
	}

	/// Append any source to the pipeline
	pub fn add_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.pipeline.push(PipelineEntry::Custom(Box::new(source)));
		self
	}

	/// Seed the runtime overlay
	pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.overrides.insert(key.into(), value.into());
		self
	}

	/// Source descriptions from lowest to highest precedence
	pub fn sources(&self) -> Vec<String> {
		self.pipeline.iter().map(PipelineEntry::description).collect()
	}

	/// Load every source in order into a new dictionary
	///
	/// The first failing source aborts the pipeline.
	pub fn build_dictionary(&self) -> Result<CompositeDictionary, SourceError> {
		let mut dictionary = CompositeDictionary::new();

		for entry in &self.pipeline {
			let snapshot = match entry {
				PipelineEntry::File(source) => source
					.clone()
					.inherit(self.base_path.as_deref(), &self.variables)
					.load()?,
				PipelineEntry::Custom(source) => source.load()?,
			};
			dictionary.add(snapshot);
		}

		for (key, value) in &self.overrides {
			dictionary.set(key.clone(), value.clone());
		}
		Ok(dictionary)
	}

	/// Build the dictionary and load a settings object for an explicit registry entry
	pub fn build_settings(&self, registry: &PropertyRegistry, type_name: &str) -> FigResult<Settings> {
		if !registry.contains_type(type_name) {
			return Err(RegistryError::UnknownType {
				type_name: type_name.to_string(),
			}
			.into());
		}
		let dictionary = self.build_dictionary()?.into_shared();
		let mut settings = Settings::from_registry(registry, type_name, dictionary);
		settings.pre_load()?;
		self.log_built(type_name);
		Ok(settings)
	}

	/// Build the dictionary and load `S` from it
	pub fn build<S: SettingsType>(&self) -> FigResult<S> {
		let dictionary = self.build_dictionary()?.into_shared();
		let settings = S::load(dictionary)?;
		self.log_built(S::TYPE_NAME);
		Ok(settings)
	}

	fn log_built(&self, type_name: &str) {
		tracing::info!(
			settings = type_name,
			sources = self.pipeline.len(),
			"Settings built"
		);
	}
}
