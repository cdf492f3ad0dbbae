//! Clipboard channel server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rich_clipboard::ClipboardCapability;
use rich_clipboard_protocol::Dispatcher;
use rich_clipboard_types::CHANNEL_NAME;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::Config;
use crate::error::DaemonError;
use crate::session;

/// Events processed by the daemon's main loop.
#[derive(Debug)]
pub enum DaemonEvent {
    /// Stop accepting connections and return from [`Daemon::run`].
    Shutdown,
}

/// Point-in-time counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonStatus {
    pub local_addr: SocketAddr,
    pub active_sessions: usize,
    pub calls_served: u64,
}

/// Serves the clipboard channel over loopback TCP.
pub struct Daemon<C> {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher<C>>,
    /// Held by a session for the duration of each call.
    register: Arc<Mutex<()>>,
    event_tx: mpsc::Sender<DaemonEvent>,
    event_rx: mpsc::Receiver<DaemonEvent>,
    active: Arc<AtomicUsize>,
    calls: Arc<AtomicU64>,
}

impl<C: ClipboardCapability + 'static> Daemon<C> {
    /// Bind the configured address.
    pub async fn bind(config: &Config, dispatcher: Dispatcher<C>) -> Result<Self, DaemonError> {
        Self::bind_addr(config.socket_addr()?, dispatcher).await
    }

    pub async fn bind_addr(addr: SocketAddr, dispatcher: Dispatcher<C>) -> Result<Self, DaemonError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| DaemonError::Bind { addr, source })?;
        let (event_tx, event_rx) = mpsc::channel(16);
        Ok(Self {
            listener,
            dispatcher: Arc::new(dispatcher),
            register: Arc::new(Mutex::new(())),
            event_tx,
            event_rx,
            active: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DaemonError> {
        Ok(self.listener.local_addr()?)
    }

    /// Get a clone of the event sender for feeding events into the daemon.
    pub fn event_sender(&self) -> mpsc::Sender<DaemonEvent> {
        self.event_tx.clone()
    }

    pub fn status(&self) -> Result<DaemonStatus, DaemonError> {
        Ok(DaemonStatus {
            local_addr: self.local_addr()?,
            active_sessions: self.active.load(Ordering::Relaxed),
            calls_served: self.calls.load(Ordering::Relaxed),
        })
    }

    /// Accept connections until a shutdown event arrives.
    pub async fn run(&mut self) -> Result<DaemonStatus, DaemonError> {
        let addr = self.local_addr()?;
        info!(addr = %addr, channel = CHANNEL_NAME, "daemon listening");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => self.spawn_session(stream, peer),
                        Err(e) => debug!(error = %e, "accept error"),
                    }
                }
                event = self.event_rx.recv() => {
                    match event {
                        Some(DaemonEvent::Shutdown) | None => {
                            info!("shutting down");
                            break;
                        }
                    }
                }
            }
        }

        let status = self.status()?;
        info!(
            calls = status.calls_served,
            open_sessions = status.active_sessions,
            "daemon shut down complete"
        );
        Ok(status)
    }

    fn spawn_session(&self, stream: tokio::net::TcpStream, peer: SocketAddr) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let register = Arc::clone(&self.register);
        let calls = Arc::clone(&self.calls);
        let active = Arc::clone(&self.active);
        active.fetch_add(1, Ordering::Relaxed);
        debug!(%peer, "accepted connection");

        let span = info_span!("session", channel = CHANNEL_NAME, %peer);
        tokio::spawn(
            async move {
                let result = session::serve(stream, peer, dispatcher, register, calls).await;
                if let Err(e) = result {
                    if session::is_disconnect(&e) {
                        debug!(error = %e, "client went away");
                    } else {
                        warn!(error = %e, "closing connection");
                    }
                }
                active.fetch_sub(1, Ordering::Relaxed);
            }
            .instrument(span),
        );
    }
}
