//! Error types for the protocol layer.
//!
//! Protocol errors are about the *shape* of messages: a line that is not a
//! message at all, or a message whose fields don't hold what a handler
//! expects. Networking problems live in `tenhou_transport::TransportError`.

/// Errors that can occur while encoding, decoding, or reading an [`Action`].
///
/// [`Action`]: crate::Action
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an action into a line).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// A received line is not a valid message.
    ///
    /// Common causes: not JSON, a JSON value that isn't an object, or an
    /// object without a string `tag`. Callers treat this as non-fatal and
    /// drop the line.
    #[error("malformed message {line:?}: {reason}")]
    MalformedMessage { line: String, reason: String },

    /// A field a handler asked for is absent or has the wrong shape.
    ///
    /// This means the server broke an assumption the client relies on, so
    /// it is fatal to the run.
    #[error("field `{key}` is missing or not {expected}")]
    FieldType { key: String, expected: &'static str },
}

impl ProtocolError {
    pub(crate) fn field(key: &str, expected: &'static str) -> Self {
        Self::FieldType {
            key: key.to_owned(),
            expected,
        }
    }
}
