//! Socket client for the clipboard channel.

use std::net::SocketAddr;

use rich_clipboard_types::{ClipboardSnapshot, Method, MethodCall, MethodResponse, Value};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

use crate::connection::{split_tcp, MessageReceiver, MessageSender};
use crate::error::ProtocolError;

/// One connection to a clipboard daemon. Calls are sequential.
pub struct ChannelClient {
    tx: MessageSender<OwnedWriteHalf>,
    rx: MessageReceiver<OwnedReadHalf>,
}

impl ChannelClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self, ProtocolError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ProtocolError::Connection(format!("{addr}: {e}")))?;
        stream.set_nodelay(true)?;
        debug!(%addr, "connected to clipboard daemon");
        let (tx, rx) = split_tcp(stream);
        Ok(Self { tx, rx })
    }

    /// Send one call and wait for its response.
    pub async fn call(&mut self, call: &MethodCall) -> Result<MethodResponse, ProtocolError> {
        self.tx.send(call).await?;
        self.rx
            .recv()
            .await?
            .ok_or(ProtocolError::StreamClosed)
    }

    pub async fn get_data(&mut self) -> Result<MethodResponse, ProtocolError> {
        self.call(&Method::GetData.into()).await
    }

    pub async fn set_data(
        &mut self,
        snapshot: ClipboardSnapshot,
    ) -> Result<MethodResponse, ProtocolError> {
        self.call(&MethodCall::set_data(snapshot)).await
    }

    pub async fn get_available_types(&mut self) -> Result<MethodResponse, ProtocolError> {
        self.call(&Method::GetAvailableTypes.into()).await
    }

    pub async fn get_item_count(&mut self) -> Result<MethodResponse, ProtocolError> {
        self.call(&Method::GetItemCount.into()).await
    }

    /// Call an arbitrary method name with raw arguments.
    pub async fn call_named(
        &mut self,
        method: &str,
        arguments: Value,
    ) -> Result<MethodResponse, ProtocolError> {
        self.call(&MethodCall::new(method).with_arguments(arguments))
            .await
    }

    /// Close the write side; the daemon ends the session.
    pub async fn close(self) -> Result<(), ProtocolError> {
        self.tx.finish().await
    }
}
