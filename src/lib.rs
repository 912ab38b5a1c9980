//! # Fig
//!
//! Typed, observable application settings resolved from layered sources.
//!
//! Fig reads command-line arguments, environment variables and JSON, TOML or
//! INI files into one composite dictionary, then binds declared properties of
//! each settings type from it. Values are converted and validated in a single
//! all-or-nothing pass, and subscribers are told whenever a property changes.
//!
//! ## Feature Flags
//!
//! - `conf` (default) - The settings engine
//! - `test` - Testing helpers for code that loads settings
//!
//! ## Quick Example
//!
//! ```rust
//! # #[cfg(feature = "conf")]
//! # {
//! use fig::prelude::*;
//!
//! let mut registry = PropertyRegistry::new();
//! registry
//!     .register("Server", PropertyDescriptor::required::<u16>("Server", "Port"))
//!     .unwrap();
//!
//! let settings = SettingsBuilder::new()
//!     .use_environment_variables("FIG_")
//!     .use_command_line("fig:", ["fig:Server.Port=8080"])
//!     .build_settings(&registry, "Server")
//!     .unwrap();
//! assert_eq!(settings.get::<u16>("Port").unwrap(), 8080);
//! # }
//! ```

#[cfg(feature = "conf")]
pub mod conf;

#[cfg(feature = "conf")]
pub use fig_conf::{
	CompositeDictionary, ConfigurationError, FigError, FigResult, PropertyDescriptor,
	PropertyRegistry, Settings, SettingsBuilder, SettingsType,
};

/// Commonly used types
pub mod prelude {
	#[cfg(feature = "conf")]
	pub use fig_conf::settings::prelude::*;
}
