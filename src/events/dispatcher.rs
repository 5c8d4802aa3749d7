//! Event fan-out from SDK callbacks to the four output channels.

use futures::Stream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::channel::{ChannelStats, EventKind, Listener, OutputChannel};
use super::queue::DispatchQueue;
use crate::error::Result;
use crate::protocol::EventRecord;

/// Fans SDK events out to the message, status, presence and error channels.
///
/// Each channel holds at most one listener. Deliveries are handed to a
/// [`DispatchQueue`] so listeners always run on the dispatch task, in the
/// order the SDK produced the events.
#[derive(Clone)]
pub struct EventDispatcher {
    channels: Arc<[OutputChannel; 4]>,
    queue: DispatchQueue,
    next_id: Arc<AtomicU64>,
}

impl EventDispatcher {
    /// Create a dispatcher with its own dispatch task
    pub fn new() -> Result<Self> {
        Ok(Self::with_queue(DispatchQueue::spawn()?))
    }

    /// Create a dispatcher delivering through an existing queue
    pub fn with_queue(queue: DispatchQueue) -> Self {
        Self {
            channels: Arc::new(EventKind::ALL.map(OutputChannel::new)),
            queue,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn channel(&self, kind: EventKind) -> &OutputChannel {
        &self.channels[kind.index()]
    }

    /// Register the listener for a channel, replacing any existing one
    pub fn register(
        &self,
        kind: EventKind,
        callback: impl Fn(&EventRecord) + Send + Sync + 'static,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Some(replaced) = self.channel(kind).set(Listener::new(id, callback)) {
            debug!("Replaced {} listener {} with {}", kind, replaced.id, id);
        } else {
            debug!("Registered {} listener {}", kind, id);
        }
        id
    }

    /// Clear the listener for a channel
    pub fn unregister(&self, kind: EventKind) {
        if let Some(listener) = self.channel(kind).clear() {
            debug!("Cancelled {} listener {}", kind, listener.id);
        }
    }

    /// Register a listener that forwards records into a stream.
    ///
    /// The stream ends when the listener is replaced or cancelled.
    pub fn listen_stream(&self, kind: EventKind) -> impl Stream<Item = EventRecord> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.register(kind, move |record| {
            let _ = tx.send(record.clone());
        });
        futures::stream::poll_fn(move |cx| rx.poll_recv(cx))
    }

    /// Queue a record for delivery on its channel.
    ///
    /// With no listener registered the record is dropped. The listener is
    /// looked up again on the dispatch task, so a listener replaced or
    /// cancelled in the meantime never sees the record.
    pub fn deliver(&self, record: EventRecord) {
        let kind = record.kind();
        if !self.channel(kind).has_listener() {
            trace!("No {} listener, dropping record", kind);
            self.channel(kind).record_dropped();
            return;
        }

        let channels = self.channels.clone();
        self.queue.enqueue(Box::new(move || {
            let channel = &channels[kind.index()];
            match channel.current() {
                Some(listener) => {
                    listener.invoke(&record);
                    channel.record_delivered();
                }
                None => channel.record_dropped(),
            }
        }));
    }

    /// Resolve once every record queued so far has been dispatched
    pub async fn flush(&self) {
        self.queue.flush().await;
    }

    pub fn has_listener(&self, kind: EventKind) -> bool {
        self.channel(kind).has_listener()
    }

    /// Id of the active listener for a channel
    pub fn listener_id(&self, kind: EventKind) -> Option<u64> {
        self.channel(kind).current().map(|l| l.id)
    }

    pub fn stats(&self, kind: EventKind) -> ChannelStats {
        self.channel(kind).stats()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active: Vec<EventKind> = EventKind::ALL
            .into_iter()
            .filter(|k| self.has_listener(*k))
            .collect();
        f.debug_struct("EventDispatcher")
            .field("active_listeners", &active)
            .finish()
    }
}
