//! Seam to the wrapped publish/subscribe SDK.

mod client;
pub mod loopback;
mod types;

pub use client::{SdkClient, SdkFactory, StatusCallback, SubscribeListener};
pub use loopback::{LoopbackClient, LoopbackFactory, LoopbackNetwork};
pub use types::{
    generate_uuid, MessageResult, PresenceEventResult, PublishRequest, SdkConfiguration,
    SdkStatus, SetStateRequest, GENERATED_UUID_PREFIX,
};
