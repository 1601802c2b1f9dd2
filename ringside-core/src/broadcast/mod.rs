//! Topic fan-out to connected clients.
//!
//! Delivery is at-most-once with no history: a subscriber only sees events
//! published after it subscribed. Events on one topic reach every subscriber
//! in publish order; there is no ordering across topics.

pub mod events;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

pub use events::{BroadcastEvent, ErrorEvent, JudgeJoined, StatusEvent, Topic};

pub type SubscriptionId = u64;

pub type EventReceiver = mpsc::Receiver<BroadcastEvent>;

#[derive(Debug, Clone)]
struct Subscriber {
    id: SubscriptionId,
    sender: mpsc::Sender<BroadcastEvent>,
}

#[derive(Clone)]
pub struct BroadcastHub {
    /// topic -> subscribers
    topics: Arc<DashMap<Topic, Vec<Subscriber>>>,

    /// subscription -> topics, for cleanup
    connections: Arc<DashMap<SubscriptionId, Vec<Topic>>>,

    next_id: Arc<AtomicU64>,
    capacity: usize,
}

impl BroadcastHub {
    /// `capacity` bounds each subscriber's queue; a subscriber that falls
    /// that far behind misses events instead of stalling publishers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            connections: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to `topics`; one receiver carries all of them
    pub fn subscribe(&self, topics: &[Topic]) -> (SubscriptionId, EventReceiver) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut subscribed = Vec::with_capacity(topics.len());
        for topic in topics {
            if subscribed.contains(topic) {
                continue;
            }
            self.topics.entry(*topic).or_default().push(Subscriber {
                id,
                sender: tx.clone(),
            });
            subscribed.push(*topic);
        }

        info!(
            subscription_id = id,
            topics = ?subscribed,
            "Client subscribed"
        );
        self.connections.insert(id, subscribed);

        (id, rx)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let Some((_, topics)) = self.connections.remove(&id) else {
            debug!(subscription_id = id, "Unsubscribe for unknown subscription");
            return;
        };
        for topic in topics {
            if let Some(mut subscribers) = self.topics.get_mut(&topic) {
                subscribers.retain(|sub| sub.id != id);
            }
        }
        info!(subscription_id = id, "Client unsubscribed");
    }

    /// Deliver `event` to every current subscriber of its topic.
    ///
    /// The topic's subscriber list is held exclusively for the whole
    /// fan-out, so two publishes on one topic never interleave. Subscribers
    /// whose receiver has been dropped are pruned here.
    pub fn publish(&self, event: BroadcastEvent) -> usize {
        let topic = event.topic();
        let mut sent_count = 0;
        let mut closed = Vec::new();

        if let Some(mut subscribers) = self.topics.get_mut(&topic) {
            subscribers.retain(|subscriber| match subscriber.sender.try_send(event.clone()) {
                Ok(()) => {
                    sent_count += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    warn!(
                        topic = %topic,
                        subscription_id = subscriber.id,
                        event_type = event.event_type(),
                        "Subscriber queue full, event dropped"
                    );
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    closed.push(subscriber.id);
                    false
                }
            });
        }

        for id in closed {
            debug!(subscription_id = id, topic = %topic, "Pruned closed subscriber");
            self.unsubscribe(id);
        }

        debug!(
            topic = %topic,
            event_type = event.event_type(),
            sent_count,
            "Event published"
        );
        sent_count
    }

    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics.get(&topic).map_or(0, |subs| subs.len())
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl std::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("connections", &self.connections.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
