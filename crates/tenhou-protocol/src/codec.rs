//! Codec trait and implementations for turning actions into lines and back.
//!
//! A "codec" (coder/decoder) converts between [`Action`] values and the
//! text lines that travel over the connection. The client doesn't care HOW
//! a line is laid out; it just needs something that implements [`Codec`].
//!
//! The service speaks compact JSON, so [`JsonCodec`] is the only
//! implementation today.

use crate::{Action, ProtocolError};

/// Encodes actions into single lines and decodes lines into actions.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the codec is shared by the session loop, which may
///   run on any worker thread of the Tokio runtime.
/// - `'static` → the codec owns everything it needs and can live inside
///   the long-lived client.
pub trait Codec: Send + Sync + 'static {
    /// Serializes an action into one line (no embedded newlines).
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode(&self, action: &Action) -> Result<String, ProtocolError>;

    /// Parses one line into an action.
    ///
    /// # Errors
    /// Returns `ProtocolError::MalformedMessage` if the line is not a
    /// well-formed message.
    fn decode(&self, line: &str) -> Result<Action, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses compact JSON (via `serde_json`).
///
/// Keys keep insertion order, so an action built with
/// `Action::new("D").with("p", 42)` always encodes as `{"tag":"D","p":42}`.
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use tenhou_protocol::{Action, Codec, JsonCodec};
///
/// let codec = JsonCodec;
///
/// let line = codec.encode(&Action::discard(42)).unwrap();
/// assert_eq!(line, r#"{"tag":"D","p":42}"#);
///
/// let decoded = codec.decode(&line).unwrap();
/// assert_eq!(decoded, Action::discard(42));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode(&self, action: &Action) -> Result<String, ProtocolError> {
        // `to_string` (not `to_string_pretty`) never emits newlines, and
        // string values have their control characters escaped.
        serde_json::to_string(action).map_err(ProtocolError::Encode)
    }

    fn decode(&self, line: &str) -> Result<Action, ProtocolError> {
        // The `TryFrom<Map>` conversion on `Action` rejects non-objects and
        // tagless objects; both surface here as a serde_json error.
        serde_json::from_str(line).map_err(|e| {
            ProtocolError::MalformedMessage {
                line: line.to_owned(),
                reason: e.to_string(),
            }
        })
    }
}
