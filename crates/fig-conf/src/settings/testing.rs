//! Testing utilities for settings
//!
//! Helpers for tests that need process environment variables, configuration
//! files on disk, or a dictionary seeded through the runtime overlay.

use super::dictionary::{CompositeDictionary, SharedDictionary};
use indexmap::IndexMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment
///
/// Owns a temporary directory for configuration files and restores every
/// environment variable it touched when dropped. Tests that use it should be
/// marked `#[serial]`, the process environment being global.
pub struct TestEnv {
	temp_dir: TempDir,
	saved: IndexMap<String, Option<OsString>>,
}

impl TestEnv {
	/// Create a new test environment
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::testing::TestEnv;
	///
	/// let mut test_env = TestEnv::new().unwrap();
	/// test_env.set_var("FIG_DOC_TEST_KEY", "value");
	/// assert_eq!(std::env::var("FIG_DOC_TEST_KEY").unwrap(), "value");
	/// drop(test_env);
	/// assert!(std::env::var("FIG_DOC_TEST_KEY").is_err());
	/// ```
	pub fn new() -> std::io::Result<Self> {
		Ok(Self {
			temp_dir: TempDir::new()?,
			saved: IndexMap::new(),
		})
	}

	/// Temporary directory, usable as a builder base path
	pub fn path(&self) -> &Path {
		self.temp_dir.path()
	}

	fn remember(&mut self, key: &str) {
		if !self.saved.contains_key(key) {
			self.saved.insert(key.to_string(), env::var_os(key));
		}
	}

	pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let key = key.into();
		self.remember(&key);

		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// TestEnv is designed for use in tests with #[serial] to ensure exclusive access.
		unsafe {
			env::set_var(&key, value.into());
		}
	}

	pub fn remove_var(&mut self, key: impl Into<String>) {
		let key = key.into();
		self.remember(&key);

		// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
		// TestEnv is designed for use in tests with #[serial] to ensure exclusive access.
		unsafe {
			env::remove_var(&key);
		}
	}

	/// Write a file into the temporary directory
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::testing::TestEnv;
	///
	/// let test_env = TestEnv::new().unwrap();
	/// let path = test_env
	///     .create_file("appSettings.ini", "[ExampleSettings]\nCount = 3")
	///     .unwrap();
	/// assert!(path.exists());
	/// ```
	pub fn create_file(&self, name: &str, content: &str) -> std::io::Result<PathBuf> {
		let path = self.temp_dir.path().join(name);
		std::fs::write(&path, content)?;
		Ok(path)
	}
}

impl Drop for TestEnv {
	fn drop(&mut self) {
		for (key, original) in &self.saved {
			// SAFETY: Restoring environment variables is unsafe in multi-threaded programs.
			// TestEnv is designed for use in tests with #[serial] to ensure exclusive access.
			unsafe {
				match original {
					Some(val) => env::set_var(key, val),
					None => env::remove_var(key),
				}
			}
		}
	}
}

/// Shared dictionary whose overlay holds `entries`
///
/// # Examples
///
/// ```
/// use fig_conf::settings::testing::overlay_dictionary;
///
/// let dictionary = overlay_dictionary([("S.Count", "400")]);
/// assert_eq!(dictionary.read().get("S.Count"), Some("400"));
/// ```
pub fn overlay_dictionary<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> SharedDictionary
where
	K: Into<String>,
	V: Into<String>,
{
	let mut dictionary = CompositeDictionary::new();
	for (key, value) in entries {
		dictionary.set(key, value);
	}
	dictionary.into_shared()
}

/// Assert that a load failed because `key` had no value
#[macro_export]
macro_rules! assert_missing_required {
	($result:expr, $key:expr) => {
		match &$result {
			Err(error) => assert!(
				error.is_missing($key),
				"expected missing required value for {}, got: {}",
				$key,
				error
			),
			Ok(_) => panic!("expected missing required value for {}, load succeeded", $key),
		}
	};
}

#[cfg(test)]
mod tests {
	use super::*;
	use serial_test::serial;

	#[test]
	#[serial]
	fn test_env_isolation() {
		let mut test_env = TestEnv::new().unwrap();
		test_env.set_var("FIG_TEST_VAR_ISOLATION", "test_value");
		assert_eq!(env::var("FIG_TEST_VAR_ISOLATION").unwrap(), "test_value");

		drop(test_env);
		assert!(env::var("FIG_TEST_VAR_ISOLATION").is_err());
	}

	#[test]
	#[serial]
	fn test_env_restoration() {
		{
			let mut outer = TestEnv::new().unwrap();
			outer.set_var("FIG_TEST_VAR_RESTORE", "original");

			{
				let mut inner = TestEnv::new().unwrap();
				inner.set_var("FIG_TEST_VAR_RESTORE", "modified");
				inner.set_var("FIG_TEST_VAR_RESTORE", "modified twice");
				inner.remove_var("FIG_TEST_VAR_RESTORE");
				assert!(env::var("FIG_TEST_VAR_RESTORE").is_err());
			}

			assert_eq!(env::var("FIG_TEST_VAR_RESTORE").unwrap(), "original");
		}
		assert!(env::var("FIG_TEST_VAR_RESTORE").is_err());
	}

	#[test]
	fn test_create_file() {
		let test_env = TestEnv::new().unwrap();
		let path = test_env.create_file("config.toml", "[S]\nA = 1").unwrap();
		assert_eq!(std::fs::read_to_string(path).unwrap(), "[S]\nA = 1");
	}

	#[test]
	fn test_overlay_dictionary_has_no_sources() {
		let dictionary = overlay_dictionary([("S.A", "1"), ("S.B", "2")]);
		let dictionary = dictionary.read();
		assert!(dictionary.sources().is_empty());
		assert_eq!(dictionary.overlay().len(), 2);
	}
}
