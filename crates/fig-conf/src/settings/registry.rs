//! Property metadata registry
//!
//! Each settings type declares its bindable properties up front as
//! [`PropertyDescriptor`]s. The registry is the only place the binder learns
//! which keys to read, which type to convert to, and whether a value is
//! required.

use super::value::{SettingKind, SettingValue, ValueKind};
use indexmap::IndexMap;

/// Whether a bound property may be reassigned after load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mutability {
	/// Assignable at runtime through the settings object
	#[default]
	Mutable,
	/// Only changes when the settings object is reloaded
	ReadOnly,
}

/// Build the conventional `<TypeName>.<PropertyName>` key
pub fn qualified_key(type_name: &str, property: &str) -> String {
	format!("{}.{}", type_name, property)
}

/// Static metadata for one bindable property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
	name: String,
	key: String,
	kind: ValueKind,
	required: bool,
	default: Option<SettingValue>,
	mutability: Mutability,
}

impl PropertyDescriptor {
	/// Optional property defaulting to `T::default()`
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::registry::PropertyDescriptor;
	/// use fig_conf::settings::value::SettingValue;
	///
	/// let descriptor = PropertyDescriptor::new::<bool>("ExampleSettings", "Verbose");
	/// assert_eq!(descriptor.key(), "ExampleSettings.Verbose");
	/// assert_eq!(descriptor.default_value(), Some(&SettingValue::Bool(false)));
	/// ```
	pub fn new<T: SettingKind>(type_name: &str, name: &str) -> Self {
		Self::optional::<T>(type_name, name, T::default())
	}

	/// Optional property with an explicit default
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::registry::PropertyDescriptor;
	///
	/// let descriptor = PropertyDescriptor::optional::<i64>("ExampleSettings", "Count", 42);
	/// assert!(!descriptor.is_required());
	/// ```
	pub fn optional<T: SettingKind>(type_name: &str, name: &str, default: impl Into<T>) -> Self {
		Self {
			name: name.to_string(),
			key: qualified_key(type_name, name),
			kind: T::KIND,
			required: false,
			default: Some(default.into().into_value()),
			mutability: Mutability::Mutable,
		}
	}

	/// Property that must be supplied by some source
	pub fn required<T: SettingKind>(type_name: &str, name: &str) -> Self {
		Self {
			name: name.to_string(),
			key: qualified_key(type_name, name),
			kind: T::KIND,
			required: true,
			default: None,
			mutability: Mutability::Mutable,
		}
	}

	/// Make the property read-only after load
	pub fn read_only(mut self) -> Self {
		self.mutability = Mutability::ReadOnly;
		self
	}

	/// Bind from an explicit key instead of `<TypeName>.<PropertyName>`
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::registry::PropertyDescriptor;
	///
	/// let descriptor = PropertyDescriptor::required::<String>("ExampleSettings", "Url")
	///     .with_key("Endpoints.Primary");
	/// assert_eq!(descriptor.key(), "Endpoints.Primary");
	/// assert_eq!(descriptor.name(), "Url");
	/// ```
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = key.into();
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn kind(&self) -> ValueKind {
		self.kind
	}

	pub fn is_required(&self) -> bool {
		self.required
	}

	/// Default value; `None` for required properties
	pub fn default_value(&self) -> Option<&SettingValue> {
		if self.required {
			None
		} else {
			self.default.as_ref()
		}
	}

	pub fn mutability(&self) -> Mutability {
		self.mutability
	}

	pub fn is_mutable(&self) -> bool {
		self.mutability == Mutability::Mutable
	}
}

/// Registry misconfiguration
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("Key '{key}' is registered twice for settings type '{type_name}'")]
	DuplicateKey { type_name: String, key: String },

	#[error("Property '{name}' is registered twice for settings type '{type_name}'")]
	DuplicateProperty { type_name: String, name: String },

	#[error("Settings type '{type_name}' is not registered")]
	UnknownType { type_name: String },
}

/// Per-settings-type catalogue of property descriptors
#[derive(Debug, Clone, Default)]
pub struct PropertyRegistry {
	types: IndexMap<String, Vec<PropertyDescriptor>>,
}

impl PropertyRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a descriptor for `type_name`
	///
	/// Keys and property names must both be unique within a type.
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::registry::{PropertyDescriptor, PropertyRegistry, RegistryError};
	///
	/// let mut registry = PropertyRegistry::new();
	/// registry
	///     .register("S", PropertyDescriptor::optional::<i64>("S", "Count", 42))
	///     .unwrap();
	///
	/// let duplicate = registry.register("S", PropertyDescriptor::required::<i64>("S", "Count"));
	/// assert!(matches!(duplicate, Err(RegistryError::DuplicateKey { .. })));
	/// ```
	pub fn register(
		&mut self,
		type_name: &str,
		descriptor: PropertyDescriptor,
	) -> Result<(), RegistryError> {
		let descriptors = self.types.entry(type_name.to_string()).or_default();

		if descriptors.iter().any(|d| d.key == descriptor.key) {
			return Err(RegistryError::DuplicateKey {
				type_name: type_name.to_string(),
				key: descriptor.key,
			});
		}
		if descriptors.iter().any(|d| d.name == descriptor.name) {
			return Err(RegistryError::DuplicateProperty {
				type_name: type_name.to_string(),
				name: descriptor.name,
			});
		}

		descriptors.push(descriptor);
		Ok(())
	}

	/// Register several descriptors, stopping at the first conflict
	pub fn register_all(
		&mut self,
		type_name: &str,
		descriptors: impl IntoIterator<Item = PropertyDescriptor>,
	) -> Result<(), RegistryError> {
		for descriptor in descriptors {
			self.register(type_name, descriptor)?;
		}
		Ok(())
	}

	/// Descriptors of `type_name` in declaration order
	pub fn descriptors_for(&self, type_name: &str) -> &[PropertyDescriptor] {
		self.types.get(type_name).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn contains_type(&self, type_name: &str) -> bool {
		self.types.contains_key(type_name)
	}

	pub fn type_names(&self) -> impl Iterator<Item = &str> {
		self.types.keys().map(String::as_str)
	}
}
