//! Tag names and constructors for the messages the client sends.

use crate::Action;

/// Tag names used by the client, upper-case as they appear on the wire.
pub mod tags {
    pub const HELO: &str = "HELO";
    pub const JOIN: &str = "JOIN";
    pub const GO: &str = "GO";
    pub const GOK: &str = "GOK";
    pub const NEXTREADY: &str = "NEXTREADY";
    pub const TAIKYOKU: &str = "TAIKYOKU";
    pub const INIT: &str = "INIT";
    pub const AGARI: &str = "AGARI";
    pub const RYUUKYOKU: &str = "RYUUKYOKU";
    /// Canonical draw tag after Pai-tag derivation.
    pub const DRAW: &str = "T";
    /// Canonical discard tag after Pai-tag derivation; also the outgoing
    /// discard command.
    pub const DISCARD: &str = "D";
    /// Call/pass reply to a claimable discard.
    pub const CALL: &str = "N";
}

/// The no-op ping. Sent raw, not as JSON; the server accepts its legacy
/// XML form on the WebSocket endpoint.
pub const KEEP_ALIVE: &str = "<Z/>";

/// Set in the JOIN game type for rated (non-test) play.
pub const RATED_PLAY_BIT: u32 = 0x1;

impl Action {
    /// Login handshake carrying the user id and attribute.
    pub fn helo(name: &str, sx: &str) -> Self {
        Self::new(tags::HELO).with("name", name).with("sx", sx)
    }

    /// Match reservation for `lobby` with the game-type bitmask.
    pub fn join(lobby: u32, game_type: u32) -> Self {
        Self::new(tags::JOIN).with("t", format!("{lobby},{game_type}"))
    }

    /// Acknowledges a GO.
    pub fn gok() -> Self {
        Self::new(tags::GOK)
    }

    /// Ready for the next round.
    pub fn next_ready() -> Self {
        Self::new(tags::NEXTREADY)
    }

    /// Discards tile `pai`.
    pub fn discard(pai: i64) -> Self {
        Self::new(tags::DISCARD).with("p", pai)
    }

    /// Declines a call on another player's discard.
    pub fn pass() -> Self {
        Self::new(tags::CALL)
    }
}
