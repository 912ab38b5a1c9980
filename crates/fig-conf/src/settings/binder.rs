//! Binding and validation of raw values onto property descriptors
//!
//! A bind pass evaluates every descriptor before reporting. It never touches
//! the settings object: the caller applies the returned values only when the
//! whole pass succeeded.

use super::dictionary::CompositeDictionary;
use super::registry::PropertyDescriptor;
use super::value::{SettingValue, ValueKind};
use indexmap::IndexMap;
use std::fmt;

/// A single failure found during a bind pass
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
	#[error("Missing required value for '{key}'")]
	MissingRequiredValue { key: String },

	#[error("Cannot convert '{raw_value}' to {target_type} for '{key}'")]
	Conversion {
		key: String,
		raw_value: String,
		target_type: ValueKind,
	},
}

impl BindError {
	/// Qualified key the failure refers to
	pub fn key(&self) -> &str {
		match self {
			Self::MissingRequiredValue { key } | Self::Conversion { key, .. } => key,
		}
	}
}

/// Every failure of one bind pass for a settings type
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationError {
	pub type_name: String,
	pub errors: Vec<BindError>,
}

impl ConfigurationError {
	/// True when some failure is a missing required value for `key`
	pub fn is_missing(&self, key: &str) -> bool {
		self.errors
			.iter()
			.any(|e| matches!(e, BindError::MissingRequiredValue { key: k } if k == key))
	}
}

impl fmt::Display for ConfigurationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Configuration of '{}' failed with {} error(s)",
			self.type_name,
			self.errors.len()
		)?;
		for error in &self.errors {
			write!(f, "\n  - {}", error)?;
		}
		Ok(())
	}
}

impl std::error::Error for ConfigurationError {}

/// Values produced by a successful bind pass, keyed by property name
pub type BoundValues = IndexMap<String, SettingValue>;

/// Reads, converts and validates descriptor values from a dictionary
pub struct Binder;

impl Binder {
	/// Bind every descriptor of `type_name`
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::binder::Binder;
	/// use fig_conf::settings::dictionary::CompositeDictionary;
	/// use fig_conf::settings::registry::PropertyDescriptor;
	/// use fig_conf::settings::value::SettingValue;
	///
	/// let descriptors = vec![
	///     PropertyDescriptor::optional::<i64>("S", "Count", 42),
	///     PropertyDescriptor::required::<i64>("S", "Required"),
	/// ];
	///
	/// let mut dictionary = CompositeDictionary::new();
	/// dictionary.set("S.Required", "200");
	///
	/// let values = Binder::bind("S", &descriptors, &dictionary).unwrap();
	/// assert_eq!(values["Count"], SettingValue::Int64(42));
	/// assert_eq!(values["Required"], SettingValue::Int64(200));
	/// ```
	pub fn bind(
		type_name: &str,
		descriptors: &[PropertyDescriptor],
		dictionary: &CompositeDictionary,
	) -> Result<BoundValues, ConfigurationError> {
		let mut values = BoundValues::with_capacity(descriptors.len());
		let mut errors = Vec::new();

		for descriptor in descriptors {
			match Self::bind_one(descriptor, dictionary) {
				Ok(value) => {
					values.insert(descriptor.name().to_string(), value);
				}
				Err(error) => errors.push(error),
			}
		}

		if errors.is_empty() {
			Ok(values)
		} else {
			Err(ConfigurationError {
				type_name: type_name.to_string(),
				errors,
			})
		}
	}

	fn bind_one(
		descriptor: &PropertyDescriptor,
		dictionary: &CompositeDictionary,
	) -> Result<SettingValue, BindError> {
		let key = descriptor.key();

		if let Some(raw) = dictionary.get(key) {
			return descriptor
				.kind()
				.parse(raw)
				.ok_or_else(|| BindError::Conversion {
					key: key.to_string(),
					raw_value: raw.to_string(),
					target_type: descriptor.kind(),
				});
		}

		match descriptor.default_value() {
			Some(default) => Ok(default.clone()),
			None => Err(BindError::MissingRequiredValue {
				key: key.to_string(),
			}),
		}
	}
}
