//! Bounded TCP listener.
//!
//! # Responsibilities
//! - Bind the configured address
//! - Accept connections, holding a slot permit per live connection
//! - Surface accept failures without killing the accept loop

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ListenerConfig;

/// Errors from binding or accepting.
#[derive(Debug, Error)]
pub enum ListenError {
    /// Failed to bind the configured address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to accept a connection.
    #[error("failed to accept connection: {0}")]
    Accept(#[source] std::io::Error),
}

/// TCP listener that caps concurrent connections with a semaphore.
///
/// When every slot is taken, `accept` waits until one frees up.
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
    slots: Arc<Semaphore>,
}

impl Listener {
    /// Bind to the configured address.
    ///
    /// The address resolves through `ToSocketAddrs`, so hostnames such as
    /// "localhost:25555" work here rather than failing to parse.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenError> {
        let inner = TcpListener::bind(config.bind_address.as_str())
            .await
            .map_err(|source| ListenError::Bind {
                address: config.bind_address.clone(),
                source,
            })?;
        let local_addr = inner.local_addr().map_err(|source| ListenError::Bind {
            address: config.bind_address.clone(),
            source,
        })?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner,
            local_addr,
            slots: Arc::new(Semaphore::new(config.max_connections)),
        })
    }

    /// Accept the next connection once a slot is free.
    ///
    /// The returned permit must be held for the connection's lifetime;
    /// dropping it frees the slot.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, OwnedSemaphorePermit), ListenError> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .expect("connection semaphore closed");
        let (stream, peer_addr) = self.inner.accept().await.map_err(ListenError::Accept)?;

        tracing::trace!(
            peer_addr = %peer_addr,
            available_slots = self.slots.available_permits(),
            "Connection accepted"
        );

        Ok((stream, peer_addr, permit))
    }

    /// Address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Free connection slots right now.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }
}
