//! Wire protocol for the Tenhou client.
//!
//! This crate defines the "language" the client and the game server speak:
//!
//! - **Action** ([`Action`]): a flat key/value map with a
//!   `tag`, plus typed accessors and Pai-tag derivation ([`PaiTag`]).
//! - **Messages** ([`tags`], [`KEEP_ALIVE`]): tag names and the outgoing
//!   commands the client builds.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how actions are
//!   converted to/from text lines.
//! - **Errors** ([`ProtocolError`]): what can go wrong on the way.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw lines) and the session
//! state machine. It doesn't know about connections or lobbies; it only
//! knows how to read and write messages.
//!
//! ```text
//! Transport (line) → Protocol (Action) → Client (router, handlers)
//! ```

mod action;
mod codec;
mod error;
mod messages;

pub use action::{Action, PaiKind, PaiTag, DISCARD_ACTORS, DRAW_ACTORS};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{tags, KEEP_ALIVE, RATED_PLAY_BIT};
