//! # Settings Module
//!
//! Typed settings resolved from layered configuration sources.
//!
//! The pipeline is:
//!
//! 1. [`sources`] read command-line arguments, environment variables and files
//!    into flat snapshots of qualified keys.
//! 2. A [`dictionary::CompositeDictionary`] stacks the snapshots; the last one
//!    added wins, and the runtime overlay wins over all of them.
//! 3. The [`registry::PropertyRegistry`] lists the properties of each settings
//!    type, and the [`binder::Binder`] converts and validates their values.
//! 4. A [`object::Settings`] holds the typed values and announces changes.

pub mod binder;
pub mod builder;
pub mod dictionary;
pub mod error;
pub mod notify;
pub mod object;
pub mod prelude;
pub mod registry;
pub mod sources;
pub mod testing;
pub mod value;

pub use binder::{BindError, ConfigurationError};
pub use builder::SettingsBuilder;
pub use dictionary::{CompositeDictionary, SharedDictionary};
pub use error::{FigError, FigResult};
pub use object::{Settings, SettingsType};
pub use registry::{PropertyDescriptor, PropertyRegistry};
