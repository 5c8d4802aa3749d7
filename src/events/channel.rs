//! Output channels holding at most one listener each.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::protocol::EventRecord;

/// Type alias for listener function
pub type ListenerFn = Arc<dyn Fn(&EventRecord) + Send + Sync + 'static>;

/// Category of an output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    Status,
    Presence,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [Self::Message, Self::Status, Self::Presence, Self::Error];

    /// Host event channel name
    pub fn channel_name(&self) -> &'static str {
        match self {
            Self::Message => "flutter.ingenio.com/pubnub_message",
            Self::Status => "flutter.ingenio.com/pubnub_status",
            Self::Presence => "flutter.ingenio.com/pubnub_presence",
            Self::Error => "flutter.ingenio.com/pubnub_error",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Message => 0,
            Self::Status => 1,
            Self::Presence => 2,
            Self::Error => 3,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message => write!(f, "message"),
            Self::Status => write!(f, "status"),
            Self::Presence => write!(f, "presence"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "message" => Ok(Self::Message),
            "status" => Ok(Self::Status),
            "presence" => Ok(Self::Presence),
            "error" => Ok(Self::Error),
            other => Self::ALL
                .iter()
                .copied()
                .find(|kind| kind.channel_name() == other)
                .ok_or_else(|| format!("Unknown event channel: {}", s)),
        }
    }
}

/// A registered listener
#[derive(Clone)]
pub struct Listener {
    pub id: u64,
    pub callback: ListenerFn,
}

impl Listener {
    pub fn new(id: u64, callback: impl Fn(&EventRecord) + Send + Sync + 'static) -> Self {
        Self {
            id,
            callback: Arc::new(callback),
        }
    }

    pub fn invoke(&self, record: &EventRecord) {
        (self.callback)(record);
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

/// Delivery counters for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub delivered: u64,
    pub dropped: u64,
}

/// One output channel: a single listener slot plus counters
#[derive(Debug)]
pub struct OutputChannel {
    kind: EventKind,
    slot: Mutex<Option<Listener>>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl OutputChannel {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            slot: Mutex::new(None),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Install a listener, returning the one it replaced
    pub fn set(&self, listener: Listener) -> Option<Listener> {
        self.slot.lock().replace(listener)
    }

    /// Remove the listener, returning it
    pub fn clear(&self) -> Option<Listener> {
        self.slot.lock().take()
    }

    /// Current listener; the lock is released before the caller invokes it
    pub fn current(&self) -> Option<Listener> {
        self.slot.lock().clone()
    }

    pub fn has_listener(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
