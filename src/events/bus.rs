//! In-process event bus
//!
//! Each class has at most one subscriber and a bounded queue. `publish`
//! waits for queue space, never for the listener to finish processing.
//! `dispatch` hands events to a background task so mutations never wait at
//! all; dispatched batches are still queued in the order they were handed over.

use super::types::{EventClass, RoleEvent};
use crate::utils::error::AccessError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Error channel depth per subscription
const ERROR_QUEUE: usize = 16;

#[derive(Debug)]
struct Registration {
    id: u64,
    events: mpsc::Sender<RoleEvent>,
    errors: mpsc::Sender<AccessError>,
}

#[derive(Debug)]
struct BusInner {
    capacity: usize,
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<EventClass, Registration>>,
    /// Completion signal of the most recently dispatched batch
    tail: Mutex<Option<oneshot::Receiver<()>>>,
}

/// Shared handle to the bus; clones publish to the same subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

/// An active subscription for one event class
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    class: EventClass,
    id: u64,
    bus: EventBus,
    active: AtomicBool,
    /// Events published for the class, in publish order
    pub events: mpsc::Receiver<RoleEvent>,
    /// Errors reported against the class; closes on unsubscribe
    pub errors: mpsc::Receiver<AccessError>,
}

impl EventBus {
    /// Create a bus whose per-class queues hold `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                capacity: capacity.max(1),
                next_id: AtomicU64::new(1),
                subscribers: Mutex::new(HashMap::new()),
                tail: Mutex::new(None),
            }),
        }
    }

    /// Register the subscriber for `class`, replacing any previous one
    pub fn subscribe(&self, class: EventClass) -> Subscription {
        let (event_tx, event_rx) = mpsc::channel(self.inner.capacity);
        let (error_tx, error_rx) = mpsc::channel(ERROR_QUEUE);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        let previous = self.inner.subscribers.lock().insert(
            class,
            Registration {
                id,
                events: event_tx,
                errors: error_tx,
            },
        );
        if previous.is_some() {
            warn!("Replacing existing {} subscriber", class);
        }
        debug!("Subscribed to {} events", class);

        Subscription {
            class,
            id,
            bus: self.clone(),
            active: AtomicBool::new(true),
            events: event_rx,
            errors: error_rx,
        }
    }

    /// Deliver an event to the subscriber of its class
    ///
    /// Returns `false` when nobody is subscribed; the event is dropped.
    pub async fn publish(&self, event: RoleEvent) -> bool {
        let sender = self
            .inner
            .subscribers
            .lock()
            .get(&event.class)
            .map(|registration| registration.events.clone());

        let Some(sender) = sender else {
            debug!(role_id = %event.role_id, "No {} subscriber, dropping event", event.class);
            return false;
        };

        let class = event.class;
        match sender.send(event).await {
            Ok(()) => true,
            Err(_) => {
                debug!("{} subscriber went away, dropping event", class);
                false
            }
        }
    }

    /// Publish `events` from a background task and return immediately
    ///
    /// A full queue holds up the task, not the caller. Each batch starts only
    /// after the previously dispatched one has been queued.
    pub fn dispatch(&self, events: Vec<RoleEvent>) -> JoinHandle<()> {
        let (done_tx, done_rx) = oneshot::channel();
        let previous = self.inner.tail.lock().replace(done_rx);
        let bus = self.clone();

        tokio::spawn(async move {
            if let Some(previous) = previous {
                // Err means the earlier task ended early; nothing to wait for
                let _ = previous.await;
            }
            for event in events {
                bus.publish(event).await;
            }
            let _ = done_tx.send(());
        })
    }

    /// Wait until every batch dispatched so far has been queued or dropped
    pub async fn flush(&self) {
        let _ = self.dispatch(Vec::new()).await;
    }

    /// Report an error to the subscriber of `class`
    ///
    /// Dropped when nobody is subscribed or the error queue is full.
    pub fn report_error(&self, class: EventClass, error: AccessError) -> bool {
        let guard = self.inner.subscribers.lock();
        match guard.get(&class) {
            Some(registration) => registration.errors.try_send(error).is_ok(),
            None => false,
        }
    }

    pub fn has_subscriber(&self, class: EventClass) -> bool {
        self.inner.subscribers.lock().contains_key(&class)
    }

    /// Drop every subscriber; their receivers close once drained
    pub fn close(&self) {
        self.inner.subscribers.lock().clear();
    }

    fn remove(&self, class: EventClass, id: u64) {
        let mut subscribers = self.inner.subscribers.lock();
        if subscribers.get(&class).is_some_and(|r| r.id == id) {
            subscribers.remove(&class);
            debug!("Unsubscribed from {} events", class);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::config::default_queue_capacity())
    }
}

impl Subscription {
    pub fn class(&self) -> EventClass {
        self.class
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop receiving new events; only the first call has an effect
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            self.bus.remove(self.class, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
