//! Client configuration.
//!
//! [`ClientConfig`] carries the reference defaults. The binary builds it
//! with [`ClientConfig::from_env`], which reads an optional `.env` file and
//! `TENHOU_*` variables so credentials stay out of version control.

use std::time::Duration;

use tenhou_protocol::RATED_PLAY_BIT;
use tenhou_transport::{ConnectOptions, DEFAULT_RECV_TIMEOUT};

use crate::ClientError;

/// User id sent when none is configured.
pub const ANONYMOUS_USER: &str = "NoName";

/// Settings consumed by the client. All fields are public; override what
/// you need and take the rest from `Default`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Account id sent in HELO. Empty means [`ANONYMOUS_USER`].
    pub user_id: String,
    /// Account attribute sent in HELO (`sx`).
    pub user_sx: String,

    /// Lobby number sent in JOIN.
    pub lobby: u32,
    /// Game-type bitmask sent in JOIN.
    pub game_type: u32,
    /// Test play leaves [`RATED_PLAY_BIT`] clear.
    pub test_play: bool,
    /// Tournament lobby. Carried for logging; JOIN is the same either way.
    pub tournament: bool,

    /// `ws://` or `wss://` endpoint.
    pub ws_url: String,
    /// `Host` header override. Empty means derive from the URL.
    pub ws_host: String,
    /// `Origin` header. Empty means none.
    pub ws_origin: String,
    /// Upper bound for one receive; the loops re-check `running` this often.
    pub recv_timeout: Duration,

    /// Receives to wait for the HELO reply.
    pub lobby_attempts: u32,
    /// Receives to wait for GO after JOIN.
    pub join_attempts: u32,
    /// Fixed delay before HELO and JOIN.
    pub send_delay: Duration,
    /// Time between keep-alive pings while in lobby or game.
    pub keep_alive_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_id: ANONYMOUS_USER.to_owned(),
            user_sx: "M".to_owned(),
            lobby: 0,
            game_type: 64,
            test_play: true,
            tournament: false,
            ws_url: String::new(),
            ws_host: String::new(),
            ws_origin: String::new(),
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            lobby_attempts: 3,
            join_attempts: 30,
            send_delay: Duration::from_secs(1),
            keep_alive_interval: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Loads `.env` (if present) and applies `TENHOU_*` overrides to the
    /// defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        })
    }

    /// Applies overrides from `lookup` to the defaults and validates.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `TENHOU_USER_ID` | `user_id` |
    /// | `TENHOU_USER_SX` | `user_sx` |
    /// | `TENHOU_LOBBY` | `lobby` |
    /// | `TENHOU_GAME_TYPE` | `game_type` |
    /// | `TENHOU_TEST_PLAY` | `test_play` |
    /// | `TENHOU_TOURNAMENT` | `tournament` |
    /// | `TENHOU_WS_URL` | `ws_url` |
    /// | `TENHOU_WS_HOST` | `ws_host` |
    /// | `TENHOU_WS_ORIGIN` | `ws_origin` |
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ClientError> {
        let mut config = Self::default();

        if let Some(v) = lookup("TENHOU_USER_ID") {
            config.user_id = v;
        }
        if let Some(v) = lookup("TENHOU_USER_SX") {
            config.user_sx = v;
        }
        if let Some(v) = lookup("TENHOU_LOBBY") {
            config.lobby = parse_number("TENHOU_LOBBY", &v)?;
        }
        if let Some(v) = lookup("TENHOU_GAME_TYPE") {
            config.game_type = parse_number("TENHOU_GAME_TYPE", &v)?;
        }
        if let Some(v) = lookup("TENHOU_TEST_PLAY") {
            config.test_play = parse_flag("TENHOU_TEST_PLAY", &v)?;
        }
        if let Some(v) = lookup("TENHOU_TOURNAMENT") {
            config.tournament = parse_flag("TENHOU_TOURNAMENT", &v)?;
        }
        if let Some(v) = lookup("TENHOU_WS_URL") {
            config.ws_url = v;
        }
        if let Some(v) = lookup("TENHOU_WS_HOST") {
            config.ws_host = v;
        }
        if let Some(v) = lookup("TENHOU_WS_ORIGIN") {
            config.ws_origin = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the endpoint and the polling knobs.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.ws_url.is_empty() {
            return Err(ClientError::Config("ws_url is not set".into()));
        }
        let url = url::Url::parse(&self.ws_url).map_err(|e| {
            ClientError::Config(format!("ws_url {:?}: {e}", self.ws_url))
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ClientError::Config(format!(
                "ws_url must be ws:// or wss://, got {}://",
                url.scheme()
            )));
        }
        if self.lobby_attempts == 0 || self.join_attempts == 0 {
            return Err(ClientError::Config(
                "polling attempts must be at least 1".into(),
            ));
        }
        if self.recv_timeout.is_zero() {
            return Err(ClientError::Config(
                "recv_timeout must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The name sent in HELO.
    pub fn user_name(&self) -> &str {
        if self.user_id.is_empty() {
            ANONYMOUS_USER
        } else {
            &self.user_id
        }
    }

    /// The game type sent in JOIN, with the rated-play bit applied.
    pub fn join_game_type(&self) -> u32 {
        if self.test_play {
            self.game_type
        } else {
            self.game_type | RATED_PLAY_BIT
        }
    }

    /// Transport options for this endpoint.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            url: self.ws_url.clone(),
            host: self.ws_host.clone(),
            origin: self.ws_origin.clone(),
            recv_timeout: self.recv_timeout,
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32, ClientError> {
    value
        .trim()
        .parse()
        .map_err(|e| ClientError::Config(format!("{key}={value:?}: {e}")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ClientError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ClientError::Config(format!(
            "{key}={value:?}: expected true or false"
        ))),
    }
}
