//! # Tenhou client
//!
//! Automated player for the Tenhou mahjong service.
//!
//! The client logs into the lobby, reserves a match, and plays it by
//! discarding whatever it draws and declining every call, then goes back
//! to the lobby for the next one. A background task keeps the connection
//! alive while it is in lobby or in a match.
//!
//! How the client plays is a [`Strategy`]; how it reacts to each message is
//! an [`ActionRouter`] entry. Both can be swapped without touching the
//! session loop in [`TenhouClient`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tenhou_client::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let config = ClientConfig::from_env()?;
//! let client = TenhouClient::connect(config, Arc::new(Tsumogiri)).await?;
//! client.run_forever().await
//! # }
//! ```

mod client;
mod config;
mod error;
mod handlers;
pub mod keepalive;
pub mod pace;
pub mod rank;
mod router;
mod state;
mod strategy;

pub use client::TenhouClient;
pub use config::{ClientConfig, ANONYMOUS_USER};
pub use error::ClientError;
pub use handlers::{
    handle_discard, handle_draw, handle_go, handle_helo, handle_inert,
    handle_round_end, OWN_SEAT,
};
pub use router::{ActionRouter, Handler, HandlerResult, Outgoing, Pacing};
pub use state::{SessionFlags, ShutdownHandle, Stage};
pub use strategy::{Strategy, Tsumogiri};

/// Everything needed to configure and run a client.
pub mod prelude {
    pub use crate::{
        ActionRouter, ClientConfig, ClientError, Outgoing, Pacing,
        SessionFlags, ShutdownHandle, Stage, Strategy, TenhouClient,
        Tsumogiri,
    };
    pub use tenhou_protocol::{Action, Codec, JsonCodec};
    pub use tenhou_transport::{Connection, TransportError};
}
