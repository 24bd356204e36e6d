//! Raw-socket host: a bounded TCP listener speaking HTTP/1.1 through hyper.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Enforce `max_connections` via semaphore
//! - Serve each connection with a [`PipeService`], rendering failures as 500
//! - Stop accepting on shutdown and wait for open connections to drain

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tower::{Service, ServiceExt};

use crate::config::{ListenerConfig, ServerConfig};
use crate::error::PipeError;
use crate::host::{PipeFailure, PipeService};
use crate::lifecycle::ShutdownSignal;
use crate::pipe::Pipe;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    Bind(#[source] std::io::Error),

    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// A bounded TCP listener that limits concurrent connections.
///
/// When the limit is reached, `accept` waits until a slot is released.
pub struct Listener {
    inner: TcpListener,
    connection_limit: Arc<Semaphore>,
    max_connections: usize,
}

impl Listener {
    /// Bind to the configured address with connection limits.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config
            .bind_address
            .parse()
            .map_err(|e| ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;

        let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
        })
    }

    /// Accept a new connection, respecting the connection limit.
    ///
    /// The returned permit must be held for the connection's lifetime.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, OwnedSemaphorePermit), ListenerError> {
        // Permit first: backpressure before the kernel hands us a socket.
        let permit = Arc::clone(&self.connection_limit)
            .acquire_owned()
            .await
            .map_err(|_| ListenerError::Accept(std::io::Error::other("connection limiter closed")))?;

        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(
            peer_addr = %addr,
            available_permits = self.connection_limit.available_permits(),
            "Connection accepted"
        );

        Ok((stream, addr, permit))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// Accept connections until `shutdown` fires, serving each with `service`.
///
/// Pipe failures are logged and answered with a 500; the connection stays up.
/// Once shutdown fires no new connection is accepted, open connections finish
/// their in-flight requests, and `serve` returns after the last one closes.
pub async fn serve<S>(listener: Listener, service: S, mut shutdown: ShutdownSignal) -> Result<(), ListenerError>
where
    S: Service<Request<Incoming>, Response = Response<Body>, Error = PipeError> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    tracing::info!(address = ?listener.local_addr().ok(), "Serving pipe");
    let mut connections = JoinSet::new();

    loop {
        let (stream, peer, permit) = tokio::select! {
            _ = shutdown.recv() => break,
            // Reap finished connections so the set does not grow unbounded.
            Some(_) = connections.join_next(), if !connections.is_empty() => continue,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    continue;
                }
            },
        };

        let service = service.clone();
        let mut signal = shutdown.clone();
        connections.spawn(async move {
            let _permit = permit;
            let handler = hyper::service::service_fn(move |req: Request<Incoming>| {
                let service = service.clone();
                async move {
                    let response = match service.oneshot(req).await {
                        Ok(response) => response,
                        Err(err) => PipeFailure(err).into_response(),
                    };
                    Ok::<_, Infallible>(response)
                }
            });

            let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), handler);
            tokio::pin!(conn);
            let result = tokio::select! {
                result = conn.as_mut() => result,
                _ = signal.recv() => {
                    conn.as_mut().graceful_shutdown();
                    conn.await
                }
            };
            if let Err(e) = result {
                tracing::debug!(peer_addr = %peer, error = %e, "Connection closed with error");
            }
        });
    }

    drop(listener);
    tracing::info!(open_connections = connections.len(), "Listener stopped, draining connections");
    while let Some(joined) = connections.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "Connection task panicked");
        }
    }

    tracing::info!("Listener drained");
    Ok(())
}

/// Bind `config`'s address and serve `pipe` until shutdown.
///
/// The body cap and request timeout come from `config.limits`.
pub async fn serve_pipe<P: Pipe>(pipe: P, config: &ServerConfig, shutdown: ShutdownSignal) -> Result<(), ListenerError> {
    let listener = Listener::bind(&config.listener).await?;
    serve(listener, PipeService::from_limits(pipe, &config.limits), shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(max_connections: usize) -> ListenerConfig {
        ListenerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            max_connections,
        }
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = Listener::bind(&local(4)).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
        assert_eq!(listener.max_connections(), 4);
        assert_eq!(listener.available_permits(), 4);
    }

    #[tokio::test]
    async fn test_bad_address() {
        let config = ListenerConfig {
            bind_address: "not an address".to_string(),
            max_connections: 1,
        };
        assert!(matches!(Listener::bind(&config).await, Err(ListenerError::Bind(_))));
    }

    #[tokio::test]
    async fn test_permit_held_per_connection() {
        let listener = Listener::bind(&local(2)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _client = TcpStream::connect(addr).await.unwrap();

        let (_stream, _peer, permit) = listener.accept().await.unwrap();
        assert_eq!(listener.available_permits(), 1);
        drop(permit);
        assert_eq!(listener.available_permits(), 2);
    }
}
