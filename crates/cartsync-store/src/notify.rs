//! Change notification for cart subscribers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registry of zero-argument callbacks fired whenever the cart changes.
///
/// Callbacks run synchronously on the notifying task, outside the registry
/// lock, so a callback may subscribe or unsubscribe. Order is unspecified.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers().push((id, Arc::new(callback)));
        id
    }

    /// Drop a callback. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        let len_before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() < len_before
    }

    /// Fire every registered callback.
    pub fn notify(&self) {
        let callbacks: Vec<Callback> = self
            .subscribers()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    // A panicking subscriber never holds the lock, so the data is intact.
    fn subscribers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Callback)>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
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
    use std::sync::atomic::AtomicUsize;

    fn counter(notifier: &ChangeNotifier) -> (SubscriptionId, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let id = notifier.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (id, hits)
    }

    #[test]
    fn test_notify_reaches_every_subscriber() {
        let notifier = ChangeNotifier::new();
        let (_, a) = counter(&notifier);
        let (_, b) = counter(&notifier);

        notifier.notify();

        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let notifier = ChangeNotifier::new();
        let (id, hits) = counter(&notifier);

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_notify_without_subscribers() {
        ChangeNotifier::new().notify();
    }

    #[test]
    fn test_callback_may_subscribe_during_notify() {
        let notifier = Arc::new(ChangeNotifier::new());
        let inner = notifier.clone();
        notifier.subscribe(move || {
            inner.subscribe(|| {});
        });

        notifier.notify();
        assert_eq!(notifier.subscriber_count(), 2);
    }
}
