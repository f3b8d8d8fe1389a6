//! Sample streams with independently removable listeners
//!
//! A [`SensorStream`] is the seam between whatever produces samples (a
//! platform sensor callback, a replay file, a test) and the engine. The
//! producer calls [`SensorStream::emit`]; consumers register a listener and
//! get a [`Subscription`] back. Dropping the subscription, or calling
//! [`Subscription::remove`], detaches the listener.
//!
//! Listeners run on the emitting thread while the stream's registry lock is
//! held, so once `remove` returns the listener is guaranteed not to run
//! again. A listener must not add or remove listeners on the stream that is
//! invoking it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::info;

type Listener<T> = Box<dyn FnMut(T) + Send>;

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

/// Type-erased handle a [`Subscription`] uses to detach itself
trait Detach: Send + Sync {
    fn detach(&self, id: u64) -> bool;
    fn contains(&self, id: u64) -> bool;
}

impl<T> Detach for Mutex<Registry<T>> {
    fn detach(&self, id: u64) -> bool {
        let mut registry = lock(self);
        let before = registry.listeners.len();
        registry.listeners.retain(|(listener_id, _)| *listener_id != id);
        registry.listeners.len() != before
    }

    fn contains(&self, id: u64) -> bool {
        lock(self).listeners.iter().any(|(listener_id, _)| *listener_id == id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Broadcast point for one kind of sample
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use heading_fusion::SensorStream;
///
/// let stream = SensorStream::new("counter");
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// let subscription = stream.add_listener(move |sample: u32| sink.lock().unwrap().push(sample));
///
/// stream.emit(1);
/// subscription.remove();
/// stream.emit(2);
///
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
/// ```
pub struct SensorStream<T> {
    name: &'static str,
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: Copy + 'static> SensorStream<T> {
    /// Create a stream; `name` only appears in log output
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            registry: Arc::new(Mutex::new(Registry::new())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a listener called with every emitted sample
    pub fn add_listener<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Box::new(listener)));
            id
        };

        info!(stream = self.name, id, "Listener attached");
        let registry: Weak<dyn Detach> = Arc::downgrade(&self.registry) as Weak<dyn Detach>;
        Subscription {
            stream: self.name,
            id,
            registry,
        }
    }

    /// Deliver a sample to every registered listener, in registration order
    pub fn emit(&self, sample: T) {
        let mut registry = lock(&self.registry);
        for (_, listener) in registry.listeners.iter_mut() {
            listener(sample);
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

/// Handle keeping one listener registered on a [`SensorStream`]
///
/// The listener is detached when the handle is dropped or removed. Handles
/// are independent: removing one never affects listeners on other streams
/// or other listeners on the same stream.
#[must_use = "dropping a Subscription detaches its listener immediately"]
pub struct Subscription {
    stream: &'static str,
    id: u64,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    /// Detach the listener
    pub fn remove(self) {
        // Drop does the work.
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }

    /// Name of the stream this subscription listens to
    pub fn stream(&self) -> &'static str {
        self.stream
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.detach(self.id) {
                info!(stream = self.stream, id = self.id, "Listener removed");
            }
        }
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("stream", &self.stream)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_listener(counter: &Arc<AtomicUsize>) -> impl FnMut(u8) + Send + 'static {
        let counter = Arc::clone(counter);
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_emit_reaches_every_listener() {
        let stream = SensorStream::new("test");
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let _a = stream.add_listener(counting_listener(&first));
        let _b = stream.add_listener(counting_listener(&second));
        stream.emit(1);
        stream.emit(2);

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(stream.listener_count(), 2);
    }

    #[test]
    fn test_removal_is_independent() {
        let stream = SensorStream::new("test");
        let kept = Arc::new(AtomicUsize::new(0));
        let removed = Arc::new(AtomicUsize::new(0));

        let keep = stream.add_listener(counting_listener(&kept));
        let drop_me = stream.add_listener(counting_listener(&removed));

        stream.emit(0);
        drop_me.remove();
        stream.emit(0);

        assert_eq!(kept.load(Ordering::SeqCst), 2);
        assert_eq!(removed.load(Ordering::SeqCst), 1);
        assert!(keep.is_active());
        assert_eq!(stream.listener_count(), 1);
    }

    #[test]
    fn test_drop_detaches() {
        let stream = SensorStream::new("test");
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let subscription = stream.add_listener(counting_listener(&counter));
            assert!(subscription.is_active());
            assert_eq!(subscription.stream(), "test");
        }
        stream.emit(0);

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(stream.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_stream() {
        let stream = SensorStream::new("test");
        let counter = Arc::new(AtomicUsize::new(0));
        let subscription = stream.add_listener(counting_listener(&counter));

        drop(stream);
        assert!(!subscription.is_active());
        subscription.remove();
    }
}
