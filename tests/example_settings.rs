//! End-to-end behavior of a typed settings wrapper.
//!
//! `ExampleSettings` exposes typed getters for every property and setters only
//! for the mutable ones, the way application code is expected to wrap
//! [`Settings`].

use fig::test::{TestEnv, assert_missing_required, overlay_dictionary};
use fig::prelude::*;
use parking_lot::Mutex;
use rstest::*;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

struct ExampleSettings {
	inner: Settings,
}

impl ExampleSettings {
	fn my_int_property(&self) -> i32 {
		self.inner.get("MyIntProperty").expect("MyIntProperty is an i32")
	}

	fn set_my_int_property(&mut self, value: i32) {
		self.inner
			.set("MyIntProperty", value)
			.expect("MyIntProperty is a mutable i32");
	}

	fn required_int(&self) -> i32 {
		self.inner.get("RequiredInt").expect("RequiredInt is an i32")
	}

	fn my_readonly_int_property(&self) -> i32 {
		self.inner
			.get("MyReadonlyIntProperty")
			.expect("MyReadonlyIntProperty is an i32")
	}

	fn my_time_span(&self) -> Duration {
		self.inner.get("MyTimeSpan").expect("MyTimeSpan is a Duration")
	}
}

impl SettingsType for ExampleSettings {
	const TYPE_NAME: &'static str = "ExampleSettings";

	fn register(registry: &mut PropertyRegistry) -> Result<(), RegistryError> {
		let t = Self::TYPE_NAME;
		registry.register_all(
			t,
			[
				PropertyDescriptor::optional::<i32>(t, "MyIntProperty", 42),
				PropertyDescriptor::required::<i32>(t, "RequiredInt"),
				PropertyDescriptor::new::<i32>(t, "MyReadonlyIntProperty").read_only(),
				PropertyDescriptor::new::<Duration>(t, "MyTimeSpan"),
			],
		)
	}

	fn from_settings(inner: Settings) -> Self {
		Self { inner }
	}

	fn settings(&self) -> &Settings {
		&self.inner
	}

	fn settings_mut(&mut self) -> &mut Settings {
		&mut self.inner
	}
}

/// Fixture: settings loaded from an overlay holding every property
#[fixture]
fn example() -> ExampleSettings {
	let dictionary = overlay_dictionary([
		("ExampleSettings.MyIntProperty", "400"),
		("ExampleSettings.RequiredInt", "200"),
		("ExampleSettings.MyReadonlyIntProperty", "600"),
		("ExampleSettings.MyTimeSpan", "00:20:00"),
	]);
	ExampleSettings::load(dictionary).expect("Failed to load example settings")
}

#[rstest]
fn test_loads_every_property(example: ExampleSettings) {
	assert_eq!(example.my_int_property(), 400);
	assert_eq!(example.required_int(), 200);
	assert_eq!(example.my_readonly_int_property(), 600);
	assert_eq!(example.my_time_span(), Duration::from_secs(20 * 60));
	assert_eq!(example.settings().state(), &LoadState::Loaded);
}

/// Test: assigning a property announces its name
#[rstest]
fn test_property_changed_fires_when_property_changes(mut example: ExampleSettings) {
	// Arrange
	let received = Arc::new(Mutex::new(None));
	let sink = received.clone();
	example.subscribe(move |event| *sink.lock() = Some(event.property_name.clone()));

	// Act
	example.set_my_int_property(500);

	// Assert
	assert_eq!(received.lock().as_deref(), Some("MyIntProperty"));
}

/// Test: removing a key and reloading falls back to the default
#[rstest]
fn test_can_read_default(mut example: ExampleSettings) {
	example
		.settings()
		.dictionary()
		.write()
		.remove("ExampleSettings.MyIntProperty");

	example.pre_load().expect("Reload should succeed");

	assert_eq!(example.my_int_property(), 42);
}

/// Test: runtime assignment changes the value but not the dictionary
#[rstest]
fn test_can_update_runtime_value(mut example: ExampleSettings) {
	example.pre_load().expect("Reload should succeed");

	example.set_my_int_property(100);

	assert_eq!(example.my_int_property(), 100);
	assert_eq!(
		example
			.settings()
			.dictionary()
			.read()
			.get("ExampleSettings.MyIntProperty"),
		Some("400")
	);
}

/// Test: a required property without a value fails the whole load
///
/// Why: values from the previous load must survive a failed pass.
#[rstest]
fn test_missing_property_without_default_fails_validation(mut example: ExampleSettings) {
	let removed = example
		.settings()
		.dictionary()
		.write()
		.remove("ExampleSettings.RequiredInt");
	assert!(removed.is_some());

	let result = example.pre_load();

	assert_missing_required!(result, "ExampleSettings.RequiredInt");
	assert!(matches!(example.settings().state(), LoadState::Failed(_)));
	assert_eq!(example.required_int(), 200);
}

/// Test: read-only properties accept values only through loading
#[rstest]
fn test_read_only_property_rejects_assignment(mut example: ExampleSettings) {
	let result = example.settings_mut().set("MyReadonlyIntProperty", 1_i32);

	assert_eq!(
		result,
		Err(AccessError::ReadOnly {
			name: "MyReadonlyIntProperty".to_string()
		})
	);
	assert_eq!(example.my_readonly_int_property(), 600);
}

/// Test: an unsubscribed callback receives nothing
#[rstest]
fn test_unsubscribe_stops_delivery(mut example: ExampleSettings) {
	let count = Arc::new(Mutex::new(0_usize));
	let sink = count.clone();
	let id = example.subscribe(move |_| *sink.lock() += 1);

	example.set_my_int_property(1);
	assert!(example.unsubscribe(id));
	example.set_my_int_property(2);

	assert_eq!(*count.lock(), 1);
	assert!(!example.unsubscribe(id));
}

/// Test: a reload announces each changed property once, in declaration order
#[rstest]
fn test_reload_announces_changed_properties(mut example: ExampleSettings) {
	let received = Arc::new(Mutex::new(Vec::new()));
	let sink = received.clone();
	example.subscribe(move |event| sink.lock().push(event.property_name.clone()));

	{
		let dictionary = example.settings().dictionary().clone();
		let mut dictionary = dictionary.write();
		dictionary.set("ExampleSettings.MyTimeSpan", "01:00:00");
		dictionary.set("ExampleSettings.MyIntProperty", "401");
		dictionary.set("ExampleSettings.RequiredInt", "200");
	}
	example.pre_load().expect("Reload should succeed");

	assert_eq!(*received.lock(), vec!["MyIntProperty", "MyTimeSpan"]);
}

/// Test: the full builder pipeline with optional sources only
///
/// Why: a typical startup registers arguments, environment and several
/// optional files; none of them existing must not be an error.
#[rstest]
#[serial]
fn test_happy_path() {
	// Arrange
	let mut test_env = TestEnv::new().expect("Failed to create test environment");
	test_env.remove_var("CONFIG");
	test_env.set_var("FIG_ExampleSettings__RequiredInt", "7");
	test_env
		.create_file(
			"appSettings.json",
			r#"{ "ExampleSettings": { "MyIntProperty": 5, "MyTimeSpan": "00:00:30.5" } }"#,
		)
		.expect("Failed to write appSettings.json");

	// Act
	let settings: ExampleSettings = SettingsBuilder::new()
		.use_command_line("fig:", Vec::<String>::new())
		.use_environment_variables("FIG_")
		.base_path(test_env.path())
		.use_json_file("appSettings.${CONFIG}.json", false)
		.use_json_file("appSettings.json", false)
		.use_ini_file("appSettings.${CONFIG}.ini", false)
		.use_ini_file("appSettings.ini", false)
		.build()
		.expect("Failed to build settings");

	// Assert
	assert_eq!(settings.required_int(), 7);
	assert_eq!(settings.my_int_property(), 5);
	assert_eq!(settings.my_readonly_int_property(), 0);
	assert_eq!(settings.my_time_span(), Duration::from_millis(30_500));
}
