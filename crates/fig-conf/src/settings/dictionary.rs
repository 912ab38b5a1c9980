//! Composite source dictionary
//!
//! Aggregates source snapshots into a single resolved view.
//!
//! ## Precedence
//!
//! Later snapshots override earlier ones for the keys they define. The runtime
//! overlay sits above every snapshot and always wins. Nothing else influences
//! resolution: the kind of source (file, environment, command line) is
//! irrelevant, only the order of [`CompositeDictionary::add`] calls.

use super::sources::{ConfigSource, SourceError, SourceSnapshot};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Origin label reported for keys resolved from the runtime overlay
pub const OVERLAY_ORIGIN: &str = "Runtime overlay";

/// Dictionary handle shared between settings objects
pub type SharedDictionary = Arc<RwLock<CompositeDictionary>>;

/// Precedence-ordered aggregation of source snapshots plus a runtime overlay
#[derive(Debug, Clone, Default)]
pub struct CompositeDictionary {
	layers: Vec<SourceSnapshot>,
	overlay: IndexMap<String, String>,
}

impl CompositeDictionary {
	/// Create an empty dictionary
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::dictionary::CompositeDictionary;
	/// use fig_conf::settings::sources::SourceSnapshot;
	///
	/// let mut dictionary = CompositeDictionary::new();
	/// dictionary.add(SourceSnapshot::new("file", [("S.Count", "1")]));
	/// dictionary.add(SourceSnapshot::new("env", [("S.Count", "2")]));
	/// assert_eq!(dictionary.get("S.Count"), Some("2"));
	///
	/// dictionary.set("S.Count", "3");
	/// assert_eq!(dictionary.get("S.Count"), Some("3"));
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Wrap this dictionary in a shareable handle
	pub fn into_shared(self) -> SharedDictionary {
		Arc::new(RwLock::new(self))
	}

	/// Append a snapshot; it overrides every snapshot added before it
	pub fn add(&mut self, snapshot: SourceSnapshot) {
		tracing::debug!(
			origin = snapshot.origin(),
			entries = snapshot.len(),
			position = self.layers.len(),
			"Added configuration source"
		);
		self.layers.push(snapshot);
	}

	/// Load a source and append its snapshot
	pub fn add_source(&mut self, source: &dyn ConfigSource) -> Result<(), SourceError> {
		let snapshot = source.load()?;
		self.add(snapshot);
		Ok(())
	}

	/// Resolve a key against the overlay, then the snapshots from last to first
	pub fn get(&self, key: &str) -> Option<&str> {
		self.resolve(key).map(|(_, value)| value)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.resolve(key).is_some()
	}

	/// Label of the layer that supplies `key`
	pub fn origin_of(&self, key: &str) -> Option<&str> {
		self.resolve(key).map(|(origin, _)| origin)
	}

	fn resolve(&self, key: &str) -> Option<(&str, &str)> {
		if let Some(value) = self.overlay.get(key) {
			return Some((OVERLAY_ORIGIN, value.as_str()));
		}
		self.layers
			.iter()
			.rev()
			.find_map(|layer| layer.get(key).map(|value| (layer.origin(), value)))
	}

	/// Write into the runtime overlay
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let key = key.into();
		tracing::trace!(key = %key, "Runtime overlay value set");
		self.overlay.insert(key, value.into());
	}

	/// Delete a key from the runtime overlay
	///
	/// Snapshots are untouched, so a key they define resolves again once the
	/// overlay no longer shadows it.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.overlay.shift_remove(key)
	}

	pub fn clear_overlay(&mut self) {
		self.overlay.clear();
	}

	pub fn overlay(&self) -> &IndexMap<String, String> {
		&self.overlay
	}

	/// Snapshots from lowest to highest precedence
	pub fn sources(&self) -> &[SourceSnapshot] {
		&self.layers
	}

	/// Every resolved key with its winning value and origin
	///
	/// Keys appear in first-definition order across snapshots, followed by
	/// overlay-only keys.
	pub fn resolved(&self) -> IndexMap<String, (String, String)> {
		let mut merged: IndexMap<String, (String, String)> = IndexMap::new();
		for layer in &self.layers {
			for (key, value) in layer.entries() {
				merged.insert(key.clone(), (value.clone(), layer.origin().to_string()));
			}
		}
		for (key, value) in &self.overlay {
			merged.insert(key.clone(), (value.clone(), OVERLAY_ORIGIN.to_string()));
		}
		merged
	}
}
