//! Observable settings objects
//!
//! A [`Settings`] value holds the current typed value of every registered
//! property of one settings type. It is populated by [`Settings::pre_load`],
//! which is all-or-nothing: a failed pass leaves every previously loaded value
//! in place.
//!
//! Application code usually wraps a `Settings` in its own struct implementing
//! [`SettingsType`], exposing typed getters for all properties and setters
//! only for the mutable ones.

use super::binder::{Binder, BoundValues, ConfigurationError};
use super::dictionary::SharedDictionary;
use super::error::FigResult;
use super::notify::{ChangeNotifier, PropertyChanged, SubscriptionId};
use super::registry::{PropertyDescriptor, PropertyRegistry, RegistryError};
use super::value::{SettingKind, SettingValue, ValueKind};
use std::sync::Arc;

/// Lifecycle of a settings object
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
	Unloaded,
	Loaded,
	/// The last `pre_load` failed; values from the previous successful load
	/// (if any) are still in place
	Failed(ConfigurationError),
}

/// Runtime access failures on a settings object
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
	#[error("Settings type '{type_name}' has no property '{name}'")]
	UnknownProperty { type_name: String, name: String },

	#[error("Property '{name}' is read-only outside of loading")]
	ReadOnly { name: String },

	#[error("Property '{name}' holds {expected}, not {actual}")]
	TypeMismatch {
		name: String,
		expected: ValueKind,
		actual: ValueKind,
	},

	#[error("Property '{name}' has not been loaded yet")]
	NotLoaded { name: String },
}

/// Typed, observable property storage for one settings type
pub struct Settings {
	type_name: String,
	descriptors: Arc<[PropertyDescriptor]>,
	values: BoundValues,
	dictionary: SharedDictionary,
	notifier: ChangeNotifier,
	state: LoadState,
}

impl Settings {
	/// Create an unloaded settings object over explicit descriptors
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::dictionary::CompositeDictionary;
	/// use fig_conf::settings::object::Settings;
	/// use fig_conf::settings::registry::PropertyDescriptor;
	///
	/// let dictionary = CompositeDictionary::new().into_shared();
	/// dictionary.write().set("S.Count", "400");
	///
	/// let mut settings = Settings::new(
	///     "S",
	///     vec![PropertyDescriptor::optional::<i64>("S", "Count", 42)],
	///     dictionary.clone(),
	/// );
	/// settings.pre_load().unwrap();
	/// assert_eq!(settings.get::<i64>("Count").unwrap(), 400);
	///
	/// dictionary.write().remove("S.Count");
	/// settings.pre_load().unwrap();
	/// assert_eq!(settings.get::<i64>("Count").unwrap(), 42);
	/// ```
	pub fn new(
		type_name: impl Into<String>,
		descriptors: impl Into<Arc<[PropertyDescriptor]>>,
		dictionary: SharedDictionary,
	) -> Self {
		Self {
			type_name: type_name.into(),
			descriptors: descriptors.into(),
			values: BoundValues::new(),
			dictionary,
			notifier: ChangeNotifier::new(),
			state: LoadState::Unloaded,
		}
	}

	/// Create an unloaded settings object from a registry entry
	pub fn from_registry(
		registry: &PropertyRegistry,
		type_name: &str,
		dictionary: SharedDictionary,
	) -> Self {
		Self::new(type_name, registry.descriptors_for(type_name), dictionary)
	}

	/// Create an unloaded settings object for `S`, registering its properties
	pub fn for_type<S: SettingsType>(dictionary: SharedDictionary) -> Result<Self, RegistryError> {
		let mut registry = PropertyRegistry::new();
		S::register(&mut registry)?;
		Ok(Self::from_registry(&registry, S::TYPE_NAME, dictionary))
	}

	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	pub fn descriptors(&self) -> &[PropertyDescriptor] {
		&self.descriptors
	}

	pub fn descriptor(&self, name: &str) -> Option<&PropertyDescriptor> {
		self.descriptors.iter().find(|d| d.name() == name)
	}

	/// Dictionary this object loads from
	pub fn dictionary(&self) -> &SharedDictionary {
		&self.dictionary
	}

	pub fn state(&self) -> &LoadState {
		&self.state
	}

	/// Current values keyed by property name
	pub fn values(&self) -> &BoundValues {
		&self.values
	}

	/// Populate every property from the dictionary
	///
	/// On success each property whose value changed is announced once, in
	/// declaration order. On failure nothing is applied, the state becomes
	/// [`LoadState::Failed`] and the aggregate error is returned.
	pub fn pre_load(&mut self) -> Result<(), ConfigurationError> {
		let result = {
			let dictionary = self.dictionary.read();
			Binder::bind(&self.type_name, &self.descriptors, &dictionary)
		};

		match result {
			Ok(values) => {
				let changed: Vec<String> = self
					.descriptors
					.iter()
					.map(PropertyDescriptor::name)
					.filter(|name| match (self.values.get(*name), values.get(*name)) {
						(Some(old), Some(new)) => !old.same_as(new),
						(old, new) => old.is_some() != new.is_some(),
					})
					.map(str::to_string)
					.collect();

				self.values = values;
				self.state = LoadState::Loaded;
				tracing::info!(
					settings = %self.type_name,
					properties = self.descriptors.len(),
					changed = changed.len(),
					"Settings loaded"
				);

				for name in &changed {
					self.notifier.notify(name);
				}
				Ok(())
			}
			Err(error) => {
				tracing::warn!(
					settings = %self.type_name,
					errors = error.errors.len(),
					"Settings failed to load"
				);
				self.state = LoadState::Failed(error.clone());
				Err(error)
			}
		}
	}

	/// Current value of a property, untyped
	pub fn value(&self, name: &str) -> Option<&SettingValue> {
		self.values.get(name)
	}

	/// Current value of a property
	pub fn get<T: SettingKind>(&self, name: &str) -> Result<T, AccessError> {
		self.checked_descriptor::<T>(name)?;
		self.values
			.get(name)
			.and_then(T::from_value)
			.ok_or_else(|| AccessError::NotLoaded {
				name: name.to_string(),
			})
	}

	/// Assign a mutable property and notify subscribers
	///
	/// Only the in-memory value changes; the dictionary is untouched, so the
	/// next `pre_load` replaces the assignment with the resolved value.
	/// Assignment requires a successful load first.
	pub fn set<T: SettingKind>(&mut self, name: &str, value: T) -> Result<(), AccessError> {
		let descriptor = self.checked_descriptor::<T>(name)?;
		if !descriptor.is_mutable() {
			return Err(AccessError::ReadOnly {
				name: name.to_string(),
			});
		}
		if !self.values.contains_key(name) {
			return Err(AccessError::NotLoaded {
				name: name.to_string(),
			});
		}

		self.values.insert(name.to_string(), value.into_value());
		self.notifier.notify(name);
		Ok(())
	}

	fn checked_descriptor<T: SettingKind>(
		&self,
		name: &str,
	) -> Result<&PropertyDescriptor, AccessError> {
		let descriptor = self
			.descriptor(name)
			.ok_or_else(|| AccessError::UnknownProperty {
				type_name: self.type_name.clone(),
				name: name.to_string(),
			})?;

		if descriptor.kind() != T::KIND {
			return Err(AccessError::TypeMismatch {
				name: name.to_string(),
				expected: descriptor.kind(),
				actual: T::KIND,
			});
		}
		Ok(descriptor)
	}

	/// Subscribe to property change notifications
	pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
	where
		F: Fn(&PropertyChanged) + Send + Sync + 'static,
	{
		self.notifier.subscribe(callback)
	}

	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.notifier.unsubscribe(id)
	}
}

impl std::fmt::Debug for Settings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Settings")
			.field("type_name", &self.type_name)
			.field("values", &self.values)
			.field("state", &self.state)
			.field("notifier", &self.notifier)
			.finish()
	}
}

/// A typed settings struct backed by [`Settings`]
///
/// # Examples
///
/// ```
/// use fig_conf::settings::dictionary::CompositeDictionary;
/// use fig_conf::settings::object::{Settings, SettingsType};
/// use fig_conf::settings::registry::{PropertyDescriptor, PropertyRegistry, RegistryError};
///
/// struct ServerSettings {
///     inner: Settings,
/// }
///
/// impl ServerSettings {
///     fn port(&self) -> u16 {
///         self.inner.get("Port").unwrap_or_default()
///     }
/// }
///
/// impl SettingsType for ServerSettings {
///     const TYPE_NAME: &'static str = "ServerSettings";
///
///     fn register(registry: &mut PropertyRegistry) -> Result<(), RegistryError> {
///         registry.register(
///             Self::TYPE_NAME,
///             PropertyDescriptor::optional::<u16>(Self::TYPE_NAME, "Port", 8080_u16).read_only(),
///         )
///     }
///
///     fn from_settings(inner: Settings) -> Self {
///         Self { inner }
///     }
///
///     fn settings(&self) -> &Settings {
///         &self.inner
///     }
///
///     fn settings_mut(&mut self) -> &mut Settings {
///         &mut self.inner
///     }
/// }
///
/// let server = ServerSettings::load(CompositeDictionary::new().into_shared()).unwrap();
/// assert_eq!(server.port(), 8080);
/// ```
pub trait SettingsType: Sized {
	/// Name used to build `<TypeName>.<PropertyName>` keys
	const TYPE_NAME: &'static str;

	/// Declare every bindable property
	fn register(registry: &mut PropertyRegistry) -> Result<(), RegistryError>;

	fn from_settings(settings: Settings) -> Self;

	fn settings(&self) -> &Settings;

	fn settings_mut(&mut self) -> &mut Settings;

	/// Create an instance that has not been loaded yet
	fn unloaded(dictionary: SharedDictionary) -> Result<Self, RegistryError> {
		Settings::for_type::<Self>(dictionary).map(Self::from_settings)
	}

	/// Create and load an instance
	fn load(dictionary: SharedDictionary) -> FigResult<Self> {
		let mut settings = Self::unloaded(dictionary)?;
		settings.pre_load()?;
		Ok(settings)
	}

	fn pre_load(&mut self) -> Result<(), ConfigurationError> {
		self.settings_mut().pre_load()
	}

	fn subscribe<F>(&self, callback: F) -> SubscriptionId
	where
		F: Fn(&PropertyChanged) + Send + Sync + 'static,
	{
		self.settings().subscribe(callback)
	}

	fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.settings().unsubscribe(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings::binder::BindError;
	use crate::settings::dictionary::CompositeDictionary;
	use parking_lot::Mutex;

	fn settings() -> Settings {
		let dictionary = CompositeDictionary::new().into_shared();
		{
			let mut dictionary = dictionary.write();
			dictionary.set("S.Count", "400");
			dictionary.set("S.Required", "200");
			dictionary.set("S.Fixed", "600");
		}
		Settings::new(
			"S",
			vec![
				PropertyDescriptor::optional::<i64>("S", "Count", 42),
				PropertyDescriptor::required::<i64>("S", "Required"),
				PropertyDescriptor::new::<i64>("S", "Fixed").read_only(),
			],
			dictionary,
		)
	}

	fn recorder(settings: &Settings) -> Arc<Mutex<Vec<String>>> {
		let log = Arc::new(Mutex::new(Vec::new()));
		let sink = log.clone();
		settings.subscribe(move |event| sink.lock().push(event.property_name.clone()));
		log
	}

	#[test]
	fn test_get_before_load() {
		let settings = settings();
		assert_eq!(settings.state(), &LoadState::Unloaded);
		assert_eq!(
			settings.get::<i64>("Count"),
			Err(AccessError::NotLoaded {
				name: "Count".to_string()
			})
		);
	}

	#[test]
	fn test_set_before_load_is_rejected() {
		let mut settings = settings();
		let log = recorder(&settings);

		assert_eq!(
			settings.set("Count", 1_i64),
			Err(AccessError::NotLoaded {
				name: "Count".to_string()
			})
		);
		assert!(log.lock().is_empty());
		assert!(settings.value("Count").is_none());

		settings.dictionary().write().remove("S.Required");
		assert!(settings.pre_load().is_err());
		assert!(matches!(
			settings.set("Count", 1_i64),
			Err(AccessError::NotLoaded { .. })
		));
	}

	#[test]
	fn test_nan_value_is_not_announced_again() {
		let dictionary = CompositeDictionary::new().into_shared();
		dictionary.write().set("S.Ratio", "NaN");
		let mut settings = Settings::new(
			"S",
			vec![PropertyDescriptor::optional::<f64>("S", "Ratio", 1.0)],
			dictionary,
		);
		settings.pre_load().unwrap();
		let log = recorder(&settings);

		settings.pre_load().unwrap();
		settings.pre_load().unwrap();

		assert!(log.lock().is_empty());
		assert!(settings.get::<f64>("Ratio").unwrap().is_nan());
	}

	#[test]
	fn test_first_load_announces_every_property() {
		let mut settings = settings();
		let log = recorder(&settings);

		settings.pre_load().unwrap();

		assert_eq!(settings.state(), &LoadState::Loaded);
		assert_eq!(*log.lock(), vec!["Count", "Required", "Fixed"]);
	}

	#[test]
	fn test_reload_announces_only_changes() {
		let mut settings = settings();
		settings.pre_load().unwrap();
		let log = recorder(&settings);

		settings.pre_load().unwrap();
		assert!(log.lock().is_empty());

		settings.dictionary().write().set("S.Fixed", "601");
		settings.pre_load().unwrap();
		assert_eq!(*log.lock(), vec!["Fixed"]);
		assert_eq!(settings.get::<i64>("Fixed").unwrap(), 601);
	}

	#[test]
	fn test_failed_load_keeps_previous_values() {
		let mut settings = settings();
		settings.pre_load().unwrap();
		let log = recorder(&settings);

		{
			let mut dictionary = settings.dictionary().write();
			dictionary.set("S.Count", "500");
			dictionary.remove("S.Required");
		}
		let error = settings.pre_load().unwrap_err();

		assert_eq!(
			error.errors,
			vec![BindError::MissingRequiredValue {
				key: "S.Required".to_string()
			}]
		);
		assert_eq!(settings.get::<i64>("Count").unwrap(), 400);
		assert_eq!(settings.get::<i64>("Required").unwrap(), 200);
		assert!(matches!(settings.state(), LoadState::Failed(_)));
		assert!(log.lock().is_empty());
	}

	#[test]
	fn test_set_mutable_property() {
		let mut settings = settings();
		settings.pre_load().unwrap();
		let log = recorder(&settings);

		settings.set("Count", 100_i64).unwrap();

		assert_eq!(settings.get::<i64>("Count").unwrap(), 100);
		assert_eq!(*log.lock(), vec!["Count"]);
		assert_eq!(settings.dictionary().read().get("S.Count"), Some("400"));
	}

	#[test]
	fn test_set_same_value_still_notifies() {
		let mut settings = settings();
		settings.pre_load().unwrap();
		let log = recorder(&settings);

		settings.set("Count", 400_i64).unwrap();
		assert_eq!(*log.lock(), vec!["Count"]);
	}

	#[test]
	fn test_set_rejections() {
		let mut settings = settings();
		settings.pre_load().unwrap();

		assert_eq!(
			settings.set("Fixed", 1_i64),
			Err(AccessError::ReadOnly {
				name: "Fixed".to_string()
			})
		);
		assert_eq!(
			settings.set("Count", 1_i32),
			Err(AccessError::TypeMismatch {
				name: "Count".to_string(),
				expected: ValueKind::Int64,
				actual: ValueKind::Int32,
			})
		);
		assert!(matches!(
			settings.set("Missing", 1_i64),
			Err(AccessError::UnknownProperty { .. })
		));
		assert_eq!(settings.get::<i64>("Fixed").unwrap(), 600);
	}

	#[test]
	fn test_reload_overwrites_runtime_assignment() {
		let mut settings = settings();
		settings.pre_load().unwrap();
		settings.set("Count", 100_i64).unwrap();

		settings.pre_load().unwrap();
		assert_eq!(settings.get::<i64>("Count").unwrap(), 400);
	}

	#[test]
	fn test_objects_can_share_a_dictionary() {
		let first = settings();
		let mut second = Settings::new(
			"S",
			vec![PropertyDescriptor::required::<i64>("S", "Count")],
			first.dictionary().clone(),
		);

		first.dictionary().write().set("S.Count", "9");
		second.pre_load().unwrap();
		assert_eq!(second.get::<i64>("Count").unwrap(), 9);
	}
}
