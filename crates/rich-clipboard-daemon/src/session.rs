//! One client connection: a sequence of framed call/response pairs.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rich_clipboard::ClipboardCapability;
use rich_clipboard_protocol::{split_tcp, Dispatcher, ProtocolError};
use rich_clipboard_types::{MethodCall, MethodResponse};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::DaemonError;

/// Serve calls on `stream` until the peer closes it.
///
/// Each call runs on the blocking pool since dispatch touches the
/// platform clipboard synchronously. `register` is held for the whole
/// call, so one client's clear and writes never interleave with another's.
pub(crate) async fn serve<C>(
    stream: TcpStream,
    peer: SocketAddr,
    dispatcher: Arc<Dispatcher<C>>,
    register: Arc<Mutex<()>>,
    calls: Arc<AtomicU64>,
) -> Result<(), DaemonError>
where
    C: ClipboardCapability + 'static,
{
    stream.set_nodelay(true)?;
    let (mut tx, mut rx) = split_tcp(stream);

    while let Some(call) = rx.recv::<MethodCall>().await? {
        trace!(%peer, method = %call.method, "call");
        let dispatcher = Arc::clone(&dispatcher);
        let register = Arc::clone(&register);
        let response = tokio::task::spawn_blocking(move || {
            let _guard = register.lock().unwrap_or_else(PoisonError::into_inner);
            dispatcher.dispatch(&call)
        })
        .await
        .unwrap_or_else(|e| MethodResponse::error("internal", e.to_string()));
        calls.fetch_add(1, Ordering::Relaxed);
        tx.send(&response).await?;
    }

    debug!(%peer, "client closed connection");
    Ok(())
}

/// Whether a session error is just the peer going away.
pub(crate) fn is_disconnect(err: &DaemonError) -> bool {
    matches!(
        err,
        DaemonError::Protocol(ProtocolError::StreamClosed | ProtocolError::Connection(_))
    )
}
