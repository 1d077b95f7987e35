//! Scoped event listeners.
//!
//! Listeners forward events into an mpsc sink and live exactly as long as
//! the [`Subscription`] guard returned when they were registered. Dropping
//! the guard, on any exit path, removes the listener, so replacing the
//! element or tearing down a page never leaves stale handlers behind.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::mpsc::UnboundedSender;

type Filter<E> = Box<dyn Fn(&E) -> bool + Send>;

struct Listener<E> {
    id: u64,
    filter: Option<Filter<E>>,
    sink: UnboundedSender<E>,
    once: bool,
}

struct Registry<E> {
    next_id: u64,
    listeners: Vec<Listener<E>>,
}

/// A set of listeners for events of type `E`.
pub struct EventHub<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Default for EventHub<E> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

/// Clones share the same listeners.
impl<E> Clone for EventHub<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> std::fmt::Debug for EventHub<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<E: Clone + Send + 'static> EventHub<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward every event to `sink`.
    pub fn subscribe(&self, sink: UnboundedSender<E>) -> Subscription {
        self.register(None, sink, false)
    }

    /// Forward events matching `filter` to `sink`.
    pub fn subscribe_filtered(
        &self,
        filter: impl Fn(&E) -> bool + Send + 'static,
        sink: UnboundedSender<E>,
    ) -> Subscription {
        self.register(Some(Box::new(filter)), sink, false)
    }

    /// Forward the first event matching `filter`, then retire.
    pub fn once(
        &self,
        filter: impl Fn(&E) -> bool + Send + 'static,
        sink: UnboundedSender<E>,
    ) -> Subscription {
        self.register(Some(Box::new(filter)), sink, true)
    }

    /// Deliver `event` to matching listeners. Returns how many received it.
    ///
    /// Fired one-shot listeners and listeners whose receiver is gone are
    /// removed.
    pub fn emit(&self, event: &E) -> usize {
        let mut registry = self.lock();
        let mut delivered = 0;
        registry.listeners.retain(|listener| {
            if listener.sink.is_closed() {
                return false;
            }
            let matches = listener.filter.as_ref().map_or(true, |f| f(event));
            if !matches {
                return true;
            }
            if listener.sink.send(event.clone()).is_err() {
                return false;
            }
            delivered += 1;
            !listener.once
        });
        delivered
    }

    fn register(
        &self,
        filter: Option<Filter<E>>,
        sink: UnboundedSender<E>,
        once: bool,
    ) -> Subscription {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Listener {
            id,
            filter,
            sink,
            once,
        });
        drop(registry);

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .listeners
                        .retain(|l| l.id != id);
                }
            })),
        }
    }
}

impl<E> EventHub<E> {
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Registry<E>> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Guard that removes its listener when dropped.
#[must_use = "dropping a Subscription removes the listener immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn release(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::engine::PlaybackEvent;

    #[test]
    fn test_drop_removes_listener() {
        let hub = EventHub::<PlaybackEvent>::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let _sub = hub.subscribe(tx);
            assert_eq!(hub.listener_count(), 1);
            assert_eq!(hub.emit(&PlaybackEvent::Play), 1);
        }
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.emit(&PlaybackEvent::Pause), 0);

        assert_eq!(rx.try_recv().ok(), Some(PlaybackEvent::Play));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_filtered_listener() {
        let hub = EventHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = hub.subscribe_filtered(|e| *e == PlaybackEvent::Waiting, tx);

        hub.emit(&PlaybackEvent::Play);
        hub.emit(&PlaybackEvent::Waiting);
        assert_eq!(rx.try_recv().ok(), Some(PlaybackEvent::Waiting));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_once_fires_a_single_time() {
        let hub = EventHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = hub.once(|e| *e == PlaybackEvent::CanPlay, tx);

        hub.emit(&PlaybackEvent::TimeUpdate);
        assert_eq!(hub.listener_count(), 1);
        hub.emit(&PlaybackEvent::CanPlay);
        hub.emit(&PlaybackEvent::CanPlay);

        assert_eq!(hub.listener_count(), 0);
        assert_eq!(rx.try_recv().ok(), Some(PlaybackEvent::CanPlay));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_receiver_is_pruned() {
        let hub = EventHub::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let _sub = hub.subscribe(tx);
        drop(rx);

        assert_eq!(hub.emit(&PlaybackEvent::Ended), 0);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_release_survives_hub_drop() {
        let hub = EventHub::<PlaybackEvent>::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let sub = hub.subscribe(tx);
        drop(hub);
        sub.release();
    }

    #[test]
    fn test_releasing_one_keeps_others() {
        let hub = EventHub::new();
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = hub.subscribe(tx_a);
        let _b = hub.subscribe(tx_b);

        a.release();
        assert_eq!(hub.listener_count(), 1);
        hub.emit(&PlaybackEvent::Play);
        assert_eq!(rx_b.try_recv().ok(), Some(PlaybackEvent::Play));
    }
}
