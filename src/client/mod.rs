//! Client handles and the registry that owns them.

mod registry;

pub use registry::{ClientHandle, ClientRegistry};
