//! Property change notifications
//!
//! Subscribers are kept in subscription order and called synchronously on the
//! thread that changed the value. The subscriber list lock is released before
//! callbacks run, so a callback may subscribe or unsubscribe.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Payload delivered for each changed property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChanged {
	pub property_name: String,
}

/// Handle returned by [`ChangeNotifier::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&PropertyChanged) + Send + Sync>;

/// Ordered broadcast list of change callbacks
pub struct ChangeNotifier {
	subscribers: RwLock<Vec<(SubscriptionId, Callback)>>,
	next_id: AtomicU64,
}

impl ChangeNotifier {
	pub fn new() -> Self {
		Self {
			subscribers: RwLock::new(Vec::new()),
			next_id: AtomicU64::new(1),
		}
	}

	/// Register a callback; it receives every later notification
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::notify::ChangeNotifier;
	/// use std::sync::{Arc, Mutex};
	///
	/// let notifier = ChangeNotifier::new();
	/// let seen = Arc::new(Mutex::new(Vec::new()));
	///
	/// let sink = seen.clone();
	/// let id = notifier.subscribe(move |event| {
	///     sink.lock().unwrap().push(event.property_name.clone());
	/// });
	///
	/// notifier.notify("Count");
	/// assert!(notifier.unsubscribe(id));
	/// notifier.notify("Count");
	///
	/// assert_eq!(*seen.lock().unwrap(), vec!["Count".to_string()]);
	/// ```
	pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
	where
		F: Fn(&PropertyChanged) + Send + Sync + 'static,
	{
		let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.subscribers.write().push((id, Arc::new(callback)));
		id
	}

	/// Remove a callback; returns false when `id` was not subscribed
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut subscribers = self.subscribers.write();
		let before = subscribers.len();
		subscribers.retain(|(existing, _)| *existing != id);
		subscribers.len() != before
	}

	/// Deliver one notification to every current subscriber, in order
	///
	/// Returns the number of callbacks invoked.
	pub fn notify(&self, property_name: &str) -> usize {
		let callbacks: Vec<Callback> = self
			.subscribers
			.read()
			.iter()
			.map(|(_, callback)| Arc::clone(callback))
			.collect();

		if callbacks.is_empty() {
			return 0;
		}

		let event = PropertyChanged {
			property_name: property_name.to_string(),
		};
		for callback in &callbacks {
			callback(&event);
		}
		callbacks.len()
	}

	pub fn subscriber_count(&self) -> usize {
		self.subscribers.read().len()
	}
}

impl Default for ChangeNotifier {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for ChangeNotifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ChangeNotifier")
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use parking_lot::Mutex;

	#[test]
	fn test_notify_without_subscribers() {
		let notifier = ChangeNotifier::new();
		assert_eq!(notifier.notify("Count"), 0);
	}

	#[test]
	fn test_delivery_in_subscription_order() {
		let notifier = ChangeNotifier::new();
		let log = Arc::new(Mutex::new(Vec::new()));

		for label in ["first", "second", "third"] {
			let log = log.clone();
			notifier.subscribe(move |event| {
				log.lock().push(format!("{}:{}", label, event.property_name));
			});
		}

		assert_eq!(notifier.notify("Count"), 3);
		assert_eq!(
			*log.lock(),
			vec!["first:Count", "second:Count", "third:Count"]
		);
	}

	#[test]
	fn test_unsubscribe_unknown_id() {
		let notifier = ChangeNotifier::new();
		let id = notifier.subscribe(|_| {});
		assert!(notifier.unsubscribe(id));
		assert!(!notifier.unsubscribe(id));
		assert_eq!(notifier.subscriber_count(), 0);
	}

	#[test]
	fn test_callback_may_unsubscribe_itself() {
		let notifier = Arc::new(ChangeNotifier::new());
		let calls = Arc::new(Mutex::new(0));
		let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

		let weak = Arc::downgrade(&notifier);
		let counter = calls.clone();
		let own_id = slot.clone();
		let id = notifier.subscribe(move |_| {
			*counter.lock() += 1;
			if let (Some(notifier), Some(id)) = (weak.upgrade(), *own_id.lock()) {
				notifier.unsubscribe(id);
			}
		});
		*slot.lock() = Some(id);

		notifier.notify("Count");
		notifier.notify("Count");
		assert_eq!(*calls.lock(), 1);
	}
}
