//! Hand-off queue from SDK callback threads to the delivery context.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{BridgeError, Result};

/// Unit of work run on the delivery context
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Name of the dispatch thread used when no tokio runtime is available
pub const DISPATCH_THREAD_NAME: &str = "pubnub-dispatch";

enum Job {
    Run(Task),
    Flush(oneshot::Sender<()>),
}

/// Unbounded FIFO queue drained by one dedicated dispatch task.
///
/// Producers may enqueue from any thread; every task runs on the dispatch
/// task, one at a time, in enqueue order.
#[derive(Clone, Debug)]
pub struct DispatchQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl DispatchQueue {
    /// Start the dispatch task on the current tokio runtime, or on a dedicated
    /// thread when called outside a runtime.
    pub fn spawn() -> Result<Self> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Ok(Self::spawn_on(&handle)),
            Err(_) => Self::spawn_thread(),
        }
    }

    /// Start the dispatch task on the given runtime
    pub fn spawn_on(handle: &tokio::runtime::Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();

        handle.spawn(async move {
            while let Some(job) = rx.recv().await {
                run_job(job);
            }
            debug!("Dispatch queue closed");
        });

        Self { tx }
    }

    /// Start the dispatch task on a dedicated OS thread
    pub fn spawn_thread() -> Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name(DISPATCH_THREAD_NAME.to_string())
            .spawn(move || {
                while let Some(job) = rx.blocking_recv() {
                    run_job(job);
                }
                debug!("Dispatch thread exiting");
            })
            .map_err(|e| BridgeError::config(format!("Failed to start dispatch thread: {}", e)))?;

        Ok(Self { tx })
    }

    /// Enqueue a task; returns false if the dispatch task has stopped
    pub fn enqueue(&self, task: Task) -> bool {
        if self.tx.send(Job::Run(task)).is_err() {
            warn!("Dispatch queue is closed, task dropped");
            return false;
        }
        true
    }

    /// Resolve once every task enqueued before this call has run
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

fn run_job(job: Job) {
    match job {
        Job::Run(task) => {
            if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)) {
                warn!("Dispatched task panicked: {:?}", e);
            }
        }
        Job::Flush(done) => {
            let _ = done.send(());
        }
    }
}
