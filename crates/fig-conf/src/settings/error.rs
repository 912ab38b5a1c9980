//! Crate-level error type
//!
//! Each layer keeps its own error enum; [`FigError`] unifies them for the
//! builder and for callers that drive the whole pipeline.

use super::binder::ConfigurationError;
use super::object::AccessError;
use super::registry::RegistryError;
use super::sources::SourceError;

/// Result alias used by the pipeline entry points
pub type FigResult<T> = Result<T, FigError>;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FigError {
	/// A source failed before binding started
	#[error(transparent)]
	Source(#[from] SourceError),

	/// Property registration is inconsistent
	#[error(transparent)]
	Registry(#[from] RegistryError),

	/// The load pass failed
	#[error(transparent)]
	Configuration(#[from] ConfigurationError),

	#[error(transparent)]
	Access(#[from] AccessError),
}

impl FigError {
	/// The aggregate load failure, if this is one
	pub fn as_configuration(&self) -> Option<&ConfigurationError> {
		match self {
			Self::Configuration(error) => Some(error),
			_ => None,
		}
	}
}
