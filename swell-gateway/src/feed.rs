//! Change-feed types
//!
//! A subscription is a channel: the gateway side holds a [`FeedSender`] and
//! pushes status transitions and change notifications, the sync controller
//! owns the [`ChangeFeed`] and drains it one message at a time.

use shared::{Collection, RealtimeStatus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Kind of row change reported by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    /// Parse the realtime wire name ("INSERT", "UPDATE", "DELETE")
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// A row changed somewhere in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
}

/// Subscription state of the change-feed channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Connecting,
    Subscribed,
    ChannelError,
    TimedOut,
    Closed,
}

impl ChannelStatus {
    /// Connectivity health shown by the UI
    pub fn realtime_status(&self) -> RealtimeStatus {
        match self {
            ChannelStatus::Connecting => RealtimeStatus::Connecting,
            ChannelStatus::Subscribed => RealtimeStatus::Connected,
            ChannelStatus::ChannelError | ChannelStatus::TimedOut | ChannelStatus::Closed => {
                RealtimeStatus::Error
            }
        }
    }
}

/// Message delivered through a change feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMessage {
    Status(ChannelStatus),
    Change(ChangeEvent),
}

/// Producer half of a change feed
#[derive(Debug, Clone)]
pub struct FeedSender {
    tx: mpsc::UnboundedSender<FeedMessage>,
    shutdown: CancellationToken,
}

impl FeedSender {
    /// Push a message; returns false once the consumer is gone
    pub fn send(&self, msg: FeedMessage) -> bool {
        !self.shutdown.is_cancelled() && self.tx.send(msg).is_ok()
    }

    pub fn status(&self, status: ChannelStatus) -> bool {
        self.send(FeedMessage::Status(status))
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled() || self.tx.is_closed()
    }

    /// Resolves when the consumer tears the subscription down
    pub async fn closed(&self) {
        self.shutdown.cancelled().await
    }
}

/// Consumer half of a change feed
///
/// Dropping the feed cancels the producer.
#[derive(Debug)]
pub struct ChangeFeed {
    rx: mpsc::UnboundedReceiver<FeedMessage>,
    shutdown: CancellationToken,
}

impl ChangeFeed {
    /// Create a connected sender/feed pair
    pub fn channel() -> (FeedSender, ChangeFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        (
            FeedSender {
                tx,
                shutdown: shutdown.clone(),
            },
            ChangeFeed { rx, shutdown },
        )
    }

    /// Next message; `None` when the producer has ended the subscription
    pub async fn recv(&mut self) -> Option<FeedMessage> {
        self.rx.recv().await
    }

    /// Next message if one is already queued
    pub fn try_recv(&mut self) -> Option<FeedMessage> {
        self.rx.try_recv().ok()
    }

    /// Tear the subscription down
    pub fn close(&mut self) {
        self.shutdown.cancel();
        self.rx.close();
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
