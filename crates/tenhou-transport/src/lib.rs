//! Transport layer for the Tenhou client.
//!
//! Provides the [`Connection`] trait, a line-oriented view of a persistent
//! socket, and [`WebSocketConnection`], the client implementation used
//! against the real service.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{ConnectOptions, WebSocketConnection};

use std::future::Future;
use std::time::Duration;

/// Receive timeout used when none is configured.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_millis(500);

/// A persistent connection that carries one text line per message.
///
/// The connection is shared between the session loop and the keep-alive
/// task, so every method takes `&self` and returns a `Send` future (the
/// keep-alive task is spawned onto the runtime).
///
/// # Contract
///
/// - `send` writes exactly one whole line; concurrent callers never see
///   their lines interleaved.
/// - `recv` waits at most the configured receive timeout. A pure timeout
///   is `Ok(None)`, which callers use to re-check their shutdown flag.
/// - `close` is idempotent.
pub trait Connection: Send + Sync + 'static {
    /// Sends one line to the remote peer.
    fn send(
        &self,
        line: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next line, or `None` if the receive timeout elapsed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<String>, TransportError>> + Send;

    /// Closes the connection. Calling it again is a no-op.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
