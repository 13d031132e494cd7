//! # Feed
//!
//! One-to-many delivery of events to subscriber-owned bounded queues.
//!
//! A subscriber hands the feed the sending half of an `mpsc` channel it
//! created; the queue depth is the subscriber's choice. [`Feed::send`] waits
//! for room in every live queue, so a slow subscriber slows the publisher.
//! Queues whose receiver is gone are pruned on the next send.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Errors from feed operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The feed was closed and accepts no new subscribers.
    #[error("feed {0} is closed")]
    Closed(&'static str),
}

struct FeedInner<T> {
    name: &'static str,
    subscribers: RwLock<HashMap<u64, mpsc::Sender<T>>>,
    next_id: AtomicU64,
    events_sent: AtomicU64,
    closed: AtomicBool,
}

impl<T> FeedInner<T> {
    fn remove(&self, id: u64) -> bool {
        self.subscribers.write().remove(&id).is_some()
    }
}

/// A named event feed.
///
/// Cloning is cheap; clones share the same subscriber set.
pub struct Feed<T> {
    inner: Arc<FeedInner<T>>,
}

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Feed<T> {
    /// Create an empty feed.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                name,
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                events_sent: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Register `sender` to receive every event sent after this call.
    ///
    /// The returned handle removes the registration when unsubscribed or
    /// dropped.
    pub fn subscribe(&self, sender: mpsc::Sender<T>) -> Result<Subscription<T>, FeedError> {
        let mut subscribers = self.inner.subscribers.write();
        // Checked under the lock so a concurrent close() cannot miss us.
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(FeedError::Closed(self.inner.name));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        subscribers.insert(id, sender);
        debug!(feed = self.inner.name, subscription = id, "Feed subscription added");

        Ok(Subscription {
            id,
            feed: Some(Arc::downgrade(&self.inner)),
            feed_name: self.inner.name,
        })
    }

    /// Deliver `event` to every subscriber, waiting for queue capacity.
    ///
    /// Returns the number of subscribers that received the event.
    pub async fn send(&self, event: T) -> usize {
        self.inner.events_sent.fetch_add(1, Ordering::Relaxed);

        let targets: Vec<(u64, mpsc::Sender<T>)> = self
            .inner
            .subscribers
            .read()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in targets {
            if tx.send(event.clone()).await.is_ok() {
                delivered += 1;
            } else if self.inner.remove(id) {
                debug!(
                    feed = self.inner.name,
                    subscription = id,
                    "Pruned subscription with closed queue"
                );
            }
        }

        trace!(feed = self.inner.name, receivers = delivered, "Feed event sent");
        delivered
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Total events sent, including those nobody received.
    #[must_use]
    pub fn events_sent(&self) -> u64 {
        self.inner.events_sent.load(Ordering::Relaxed)
    }

    /// Feed name, used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Close the feed: drop every subscriber queue and refuse new ones.
    ///
    /// Subscribers observe the close as their receiver returning `None`.
    pub fn close(&self) {
        let mut subscribers = self.inner.subscribers.write();
        self.inner.closed.store(true, Ordering::Release);
        let dropped = subscribers.len();
        subscribers.clear();
        debug!(feed = self.inner.name, dropped, "Feed closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

/// Handle for one feed registration.
///
/// When dropped, the registration is removed.
pub struct Subscription<T> {
    id: u64,
    feed: Option<Weak<FeedInner<T>>>,
    feed_name: &'static str,
}

impl<T> Subscription<T> {
    /// Remove the registration. Calling this more than once is a no-op.
    pub fn unsubscribe(&mut self) {
        let Some(feed) = self.feed.take() else {
            return;
        };
        if let Some(inner) = feed.upgrade() {
            inner.remove(self.id);
        }
        debug!(feed = self.feed_name, subscription = self.id, "Feed subscription removed");
    }

    /// Registration id, unique within the feed.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether `unsubscribe` has not yet run.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.feed.is_some()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("feed", &self.feed_name)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
