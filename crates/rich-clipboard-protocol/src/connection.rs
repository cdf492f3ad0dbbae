//! Stream framing over any tokio byte stream.

use std::io::ErrorKind;

use bincode::{Decode, Encode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::trace;

use crate::error::ProtocolError;
use crate::wire::{check_len, decode_message, encode_payload, MAX_MESSAGE_SIZE};

/// Split a TCP stream into a framed sender and receiver.
pub fn split_tcp(
    stream: TcpStream,
) -> (MessageSender<OwnedWriteHalf>, MessageReceiver<OwnedReadHalf>) {
    let (read, write) = stream.into_split();
    (MessageSender::new(write), MessageReceiver::new(read))
}

/// Sends length-prefixed bincode messages over a byte stream.
pub struct MessageSender<W> {
    stream: W,
}

impl<W: AsyncWrite + Unpin> MessageSender<W> {
    pub fn new(stream: W) -> Self {
        Self { stream }
    }

    /// Send a message, encoding it as length-prefixed bincode.
    pub async fn send<T: Encode>(&mut self, msg: &T) -> Result<(), ProtocolError> {
        let payload = encode_payload(msg)?;
        let len = check_len(payload.len())?;

        self.stream
            .write_all(&len.to_be_bytes())
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        self.stream
            .write_all(&payload)
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        self.stream
            .flush()
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;

        trace!(len, "sent message");
        Ok(())
    }

    /// Shut down the write side (signal no more data).
    pub async fn finish(mut self) -> Result<(), ProtocolError> {
        self.stream
            .shutdown()
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))
    }
}

/// Receives length-prefixed bincode messages from a byte stream.
pub struct MessageReceiver<R> {
    stream: R,
}

impl<R: AsyncRead + Unpin> MessageReceiver<R> {
    pub fn new(stream: R) -> Self {
        Self { stream }
    }

    /// Receive and decode a message.
    ///
    /// Returns `None` if the stream has been cleanly closed by the peer
    /// between frames.
    pub async fn recv<T: Decode<()>>(&mut self) -> Result<Option<T>, ProtocolError> {
        // Read 4-byte length prefix
        let mut len_buf = [0u8; 4];
        match self.stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(ProtocolError::Connection(e.to_string())),
        }

        let len = u32::from_be_bytes(len_buf);
        if len > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::TooLarge {
                size: len as usize,
                max: MAX_MESSAGE_SIZE,
            });
        }

        let mut payload = vec![0u8; len as usize];
        match self.stream.read_exact(&mut payload).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(ProtocolError::StreamClosed);
            }
            Err(e) => return Err(ProtocolError::Connection(e.to_string())),
        }

        let msg = decode_message(&payload)?;
        trace!(len, "received message");
        Ok(Some(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rich_clipboard_types::{Method, MethodCall};

    #[tokio::test]
    async fn frames_cross_a_duplex_pipe() {
        let (a, b) = tokio::io::duplex(1024);
        let mut tx = MessageSender::new(a);
        let mut rx = MessageReceiver::new(b);

        tx.send(&MethodCall::from(Method::GetData)).await.unwrap();
        tx.send(&MethodCall::new("RichClipboard.getItemCount"))
            .await
            .unwrap();
        drop(tx);

        let first: MethodCall = rx.recv().await.unwrap().unwrap();
        let second: MethodCall = rx.recv().await.unwrap().unwrap();
        assert_eq!(first.method, "getData");
        assert_eq!(second.method, "RichClipboard.getItemCount");
        assert!(rx.recv::<MethodCall>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn truncated_frame_is_an_error() {
        let (mut a, b) = tokio::io::duplex(64);
        a.write_all(&10u32.to_be_bytes()).await.unwrap();
        a.write_all(&[1, 2, 3]).await.unwrap();
        drop(a);

        let mut rx = MessageReceiver::new(b);
        let result = rx.recv::<MethodCall>().await;
        assert!(matches!(result, Err(ProtocolError::StreamClosed)));
    }

    #[tokio::test]
    async fn oversized_header_is_rejected() {
        let (mut a, b) = tokio::io::duplex(64);
        a.write_all(&(MAX_MESSAGE_SIZE + 1).to_be_bytes())
            .await
            .unwrap();

        let mut rx = MessageReceiver::new(b);
        let result = rx.recv::<MethodCall>().await;
        assert!(matches!(result, Err(ProtocolError::TooLarge { .. })));
    }
}
