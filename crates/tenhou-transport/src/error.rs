/// Errors that can occur in the transport layer.
///
/// Every variant is fatal to the client run: there is no reconnect. A
/// receive timeout is deliberately *not* an error; see
/// [`Connection::recv`](crate::Connection::recv).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint could not be reached or the upgrade was rejected.
    #[error("connect to {url} failed: {source}")]
    ConnectFailed {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection was closed, either by the server or by us.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}
