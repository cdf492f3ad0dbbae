//! Wire protocol and named-operation dispatch for rich-clipboard.
//!
//! This crate handles message framing (length-prefixed bincode v2 over any
//! tokio byte stream), the [`Dispatcher`] that maps method names onto the
//! clipboard service, and a TCP [`ChannelClient`].

pub mod client;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod wire;

pub use client::ChannelClient;
pub use connection::{split_tcp, MessageReceiver, MessageSender};
pub use dispatch::{DispatchOptions, Dispatcher};
pub use error::ProtocolError;
