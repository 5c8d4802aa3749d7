//! Event fan-out: output channels, hand-off queue and dispatcher.

mod channel;
mod dispatcher;
mod queue;

pub use channel::{ChannelStats, EventKind, Listener, ListenerFn, OutputChannel};
pub use dispatcher::EventDispatcher;
pub use queue::{DispatchQueue, Task, DISPATCH_THREAD_NAME};
