//! Prelude module for convenient imports
//!
//! Import this module to get access to the most commonly used types and traits.

pub use super::binder::{BindError, Binder, ConfigurationError};
pub use super::builder::SettingsBuilder;
pub use super::dictionary::{CompositeDictionary, SharedDictionary};
pub use super::error::{FigError, FigResult};
pub use super::notify::{ChangeNotifier, PropertyChanged, SubscriptionId};
pub use super::object::{AccessError, LoadState, Settings, SettingsType};
pub use super::registry::{Mutability, PropertyDescriptor, PropertyRegistry, RegistryError};
pub use super::sources::{
	CommandLineSource, ConfigSource, EnvSource, FileFormat, FileSource, MemorySource,
	SourceError, SourceSnapshot,
};
pub use super::value::{SettingKind, SettingValue, ValueKind};
