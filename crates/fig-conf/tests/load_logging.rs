//! Log output of settings loading and source resolution.

use fig_conf::settings::prelude::*;
use fig_conf::settings::testing::overlay_dictionary;
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

struct LogCapture {
	logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
		struct FieldVisitor {
			message: String,
			fields: Vec<String>,
		}

		impl tracing::field::Visit for FieldVisitor {
			fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
				if field.name() == "message" {
					self.message = format!("{:?}", value);
				} else {
					self.fields.push(format!("{}={:?}", field.name(), value));
				}
			}
		}

		let mut visitor = FieldVisitor {
			message: String::new(),
			fields: Vec::new(),
		};
		event.record(&mut visitor);

		self.logs.lock().push(format!(
			"[{}] {} {}",
			event.metadata().level(),
			visitor.message,
			visitor.fields.join(" ")
		));
	}
}

fn capture() -> (Arc<Mutex<Vec<String>>>, tracing::subscriber::DefaultGuard) {
	let logs = Arc::new(Mutex::new(Vec::new()));
	let layer = LogCapture { logs: logs.clone() };
	let guard = tracing_subscriber::registry().with(layer).set_default();
	(logs, guard)
}

fn descriptors() -> Vec<PropertyDescriptor> {
	vec![
		PropertyDescriptor::required::<i32>("S", "Required"),
		PropertyDescriptor::optional::<i32>("S", "Count", 1),
	]
}

#[test]
fn test_failed_load_logs_warning() {
	// Arrange
	let (logs, _guard) = capture();
	let mut settings = Settings::new("S", descriptors(), overlay_dictionary([("S.Count", "x")]));

	// Act
	let result = settings.pre_load();

	// Assert
	assert_eq!(result.unwrap_err().errors.len(), 2);
	let captured = logs.lock();
	let warning = captured
		.iter()
		.find(|log| log.contains("WARN") && log.contains("Settings failed to load"));
	assert!(
		warning.is_some_and(|log| log.contains("errors=2")),
		"Expected warning log for failed load, but got: {:?}",
		*captured
	);
}

#[test]
fn test_successful_load_logs_changed_count() {
	let (logs, _guard) = capture();
	let mut settings = Settings::new(
		"S",
		descriptors(),
		overlay_dictionary([("S.Required", "5"), ("S.Count", "1")]),
	);

	settings.pre_load().unwrap();
	// Nothing changed on the second pass
	settings.pre_load().unwrap();

	let captured = logs.lock();
	let loaded: Vec<&String> = captured
		.iter()
		.filter(|log| log.contains("INFO") && log.contains("Settings loaded"))
		.collect();
	assert_eq!(loaded.len(), 2, "got: {:?}", *captured);
	assert!(loaded[0].contains("changed=2"));
	assert!(
		loaded[1].contains("changed=0"),
		"Expected info log for load, but got: {:?}",
		*captured
	);
	assert!(!captured.iter().any(|log| log.contains("WARN")));
}

#[test]
fn test_skipped_optional_file_logs_debug() {
	let (logs, _guard) = capture();
	let temp_dir = TempDir::new().unwrap();

	let snapshot = FileSource::json("absent.json")
		.with_base_path(temp_dir.path())
		.load()
		.unwrap();

	assert!(snapshot.is_empty());
	let captured = logs.lock();
	assert!(
		captured
			.iter()
			.any(|log| log.contains("DEBUG") && log.contains("Optional file source not found")),
		"Expected debug log for missing optional file, but got: {:?}",
		*captured
	);
}
