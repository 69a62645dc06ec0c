//! Hidden-frame host adapters

pub mod channel;

pub use channel::{ChannelFrameHost, FrameRequest};
