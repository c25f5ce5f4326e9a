//! Decision hook for the moves the client makes.
//!
//! The session machinery doesn't decide anything: when it is the client's
//! turn to draw-and-discard, or a discard could be claimed, it asks a
//! [`Strategy`]. Swap the implementation to change how the client plays
//! without touching the router or the state machine.

use tenhou_protocol::Action;

/// Chooses replies for turn events.
///
/// Returning `None` sends nothing.
///
/// # Example
///
/// ```rust
/// use tenhou_client::Strategy;
/// use tenhou_protocol::Action;
///
/// /// Holds its draws below tile 4 and otherwise plays like the default.
/// struct Stubborn;
///
/// impl Strategy for Stubborn {
///     fn on_draw(&self, pai: i64) -> Option<Action> {
///         (pai >= 4).then(|| Action::discard(pai))
///     }
///
///     fn on_call_offer(&self, _discard: &Action) -> Option<Action> {
///         Some(Action::pass())
///     }
/// }
/// ```
pub trait Strategy: Send + Sync + 'static {
    /// The client drew tile `pai`; pick the discard.
    fn on_draw(&self, pai: i64) -> Option<Action>;

    /// Another seat discarded and the server offered a call (`t` present).
    fn on_call_offer(&self, discard: &Action) -> Option<Action>;
}

/// Discards whatever it just drew and never calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tsumogiri;

impl Strategy for Tsumogiri {
    fn on_draw(&self, pai: i64) -> Option<Action> {
        Some(Action::discard(pai))
    }

    fn on_call_offer(&self, _discard: &Action) -> Option<Action> {
        Some(Action::pass())
    }
}
