//! # Fig Configuration Framework
//!
//! Typed application settings resolved from command-line arguments,
//! environment variables and configuration files.
//!
//! ## Features
//!
//! - **Layered sources**: JSON, TOML and INI files, environment variables and
//!   command-line arguments, stacked in registration order
//! - **Runtime overlay**: programmatic overrides that beat every source
//! - **Declared properties**: key, type, required flag, default and mutability
//!   registered up front for each settings type
//! - **All-or-nothing loading**: every failure of a load pass is reported at
//!   once and nothing is applied
//! - **Change notifications**: subscribers are told which property changed
//!
//! ## Quick Start
//!
//! ```rust
//! use fig_conf::settings::prelude::*;
//!
//! let mut registry = PropertyRegistry::new();
//! registry
//!     .register("App", PropertyDescriptor::optional::<u16>("App", "Port", 8080_u16))
//!     .unwrap();
//!
//! let settings = SettingsBuilder::new()
//!     .use_command_line("fig:", ["fig:App.Port=9000"])
//!     .build_settings(&registry, "App")
//!     .unwrap();
//! assert_eq!(settings.get::<u16>("Port").unwrap(), 9000);
//! ```
//!
//! ## Module Organization
//!
//! - [`settings`]: Core settings management functionality

pub mod settings;

// Re-export commonly used types at the crate root for convenience
pub use settings::{
	CompositeDictionary, ConfigurationError, FigError, FigResult, PropertyDescriptor,
	PropertyRegistry, Settings, SettingsBuilder, SettingsType,
};
