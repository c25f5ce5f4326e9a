//! Unified error type for the client.

use tenhou_protocol::ProtocolError;
use tenhou_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Everything except [`Interrupted`](Self::Interrupted) is fatal: the run
/// loop logs it, clears `running`, and releases the connection. The
/// `#[from]` attribute on the wrapping variants auto-generates `From`
/// impls, so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (connect, send, recv, closed).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, missing or mistyped field).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The HELO handshake got no answer within the polling budget.
    #[error("login failed: no HELO reply after {attempts} receive attempts")]
    LoginFailed { attempts: u32 },

    /// The JOIN request got no GO within the polling budget.
    #[error("matching failed: no GO after {attempts} receive attempts")]
    MatchingFailed { attempts: u32 },

    /// A setting is missing or can't be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// `running` was cleared while a stage was in progress.
    #[error("client interrupted")]
    Interrupted,
}
