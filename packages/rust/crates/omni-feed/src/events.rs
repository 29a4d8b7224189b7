//! Window change notifications for the render layer.
//!
//! Backed by tokio's broadcast channel: every subscriber sees every event
//! published after it subscribed, and publishing with no subscribers is fine.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Something changed in a feed's window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedEvent {
    /// Limit grew; the consumer should re-fetch with the new bound.
    LimitGrew {
        /// New fetch limit.
        limit: usize,
    },
    /// A count refresh was applied.
    TotalRefreshed {
        /// New total.
        total: usize,
        /// Derived flag after the refresh.
        reached_limit: bool,
    },
    /// A count refresh failed; the last known total is kept.
    TotalUnavailable {
        /// Failure description.
        error: String,
    },
    /// A fetch completed and the materialized window changed size.
    WindowFetched {
        /// New window length.
        length: usize,
    },
    /// A fetch failed; the window is unchanged.
    FetchFailed {
        /// Failure description.
        error: String,
    },
    /// The owner was torn down.
    Detached,
}

/// Fan-out bus for [`FeedEvent`]s.
#[derive(Clone, Debug)]
pub struct FeedEventBus {
    tx: broadcast::Sender<FeedEvent>,
}

impl FeedEventBus {
    /// Create a bus holding up to `capacity` undelivered events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to all subscribers. Returns how many received it.
    pub fn publish(&self, event: FeedEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to future events. Dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.tx.subscribe()
    }

    /// Current subscriber count.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let bus = FeedEventBus::new(4);
        assert_eq!(bus.publish(FeedEvent::Detached), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = FeedEventBus::new(4);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(FeedEvent::LimitGrew { limit: 40 });

        let received = rx.recv().await.unwrap();
        assert_eq!(received, FeedEvent::LimitGrew { limit: 40 });
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_value(FeedEvent::TotalRefreshed {
            total: 80,
            reached_limit: false,
        })
        .unwrap();
        assert_eq!(json["kind"], "total_refreshed");
        assert_eq!(json["total"], 80);
    }
}
