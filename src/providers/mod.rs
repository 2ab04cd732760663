//! Event source implementations
//!
//! - [`ChannelProvider`]: a live transport pushes events through a [`SourceHandle`]
//! - [`ReplayProvider`]: a recorded YAML event log, optionally paced

pub mod channel;
pub mod replay;

pub use channel::{ChannelProvider, DEFAULT_CHANNEL_CAPACITY, SourceHandle};
pub use replay::ReplayProvider;
