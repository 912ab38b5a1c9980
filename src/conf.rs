//! Settings engine module.
//!
//! Sources, the composite dictionary, the property registry, the binder and
//! settings objects.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "conf")]
//! use fig::conf::settings::sources::{EnvSource, FileSource};
//! # #[cfg(feature = "conf")]
//! use fig::conf::settings::dictionary::CompositeDictionary;
//! ```

#[cfg(feature = "conf")]
pub use fig_conf::*;
