//! Shared fixtures for the client integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tenhou_client::ClientConfig;
use tenhou_protocol::{Action, Codec, JsonCodec, KEEP_ALIVE};
use tenhou_transport::{Connection, TransportError, DEFAULT_RECV_TIMEOUT};

/// One scripted event on the receive side.
#[derive(Debug, Clone)]
pub enum Incoming {
    Line(String),
    Timeout,
    Closed,
}

/// A server line built from JSON.
pub fn line(value: Value) -> Incoming {
    Incoming::Line(value.to_string())
}

#[derive(Default)]
struct Inner {
    incoming: Mutex<VecDeque<Incoming>>,
    sent: Mutex<Vec<String>>,
    closed: AtomicBool,
}

/// In-memory [`Connection`] that replays a script and records what was
/// sent. Clones share state, so a test keeps one clone to inspect after
/// handing the other to the client.
///
/// Once the script runs out every receive is a timeout.
#[derive(Clone, Default)]
pub struct ScriptedConnection {
    inner: Arc<Inner>,
}

impl ScriptedConnection {
    pub fn new(script: impl IntoIterator<Item = Incoming>) -> Self {
        let conn = Self::default();
        conn.inner
            .incoming
            .lock()
            .unwrap()
            .extend(script);
        conn
    }

    /// Every line sent, pings included, in order.
    pub fn sent(&self) -> Vec<String> {
        self.inner.sent.lock().unwrap().clone()
    }

    /// Sent JSON actions, pings excluded.
    pub fn sent_actions(&self) -> Vec<Action> {
        self.sent()
            .iter()
            .filter(|line| line.as_str() != KEEP_ALIVE)
            .map(|line| JsonCodec.decode(line).expect("client sent valid JSON"))
            .collect()
    }

    /// Tags of [`sent_actions`](Self::sent_actions).
    pub fn sent_tags(&self) -> Vec<String> {
        self.sent_actions()
            .iter()
            .map(|action| action.tag().to_owned())
            .collect()
    }

    pub fn pings(&self) -> usize {
        self.sent().iter().filter(|line| *line == KEEP_ALIVE).count()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl Connection for ScriptedConnection {
    async fn send(&self, line: &str) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed("closed".into()));
        }
        self.inner.sent.lock().unwrap().push(line.to_owned());
        Ok(())
    }

    async fn recv(&self) -> Result<Option<String>, TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed("closed".into()));
        }
        let next = self.inner.incoming.lock().unwrap().pop_front();
        match next {
            Some(Incoming::Line(line)) => Ok(Some(line)),
            Some(Incoming::Closed) => {
                Err(TransportError::ConnectionClosed("server closed".into()))
            }
            Some(Incoming::Timeout) | None => {
                tokio::time::sleep(DEFAULT_RECV_TIMEOUT).await;
                Ok(None)
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Defaults with a placeholder endpoint; nothing connects to it.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        ws_url: "ws://127.0.0.1:9".into(),
        ..ClientConfig::default()
    }
}

/// The lobby acknowledgement.
pub fn helo() -> Incoming {
    line(serde_json::json!({
        "tag": "HELO",
        "uname": "NoName",
        "PF4": "9,35,1500.00,0,0,0,0,0,0,0,0,0",
    }))
}

pub fn go() -> Incoming {
    line(serde_json::json!({"tag": "GO", "type": "65", "lobby": "0", "gpid": ""}))
}

/// The last round of a match.
pub fn final_ryuukyoku() -> Incoming {
    line(serde_json::json!({
        "tag": "RYUUKYOKU",
        "ba": "0,0",
        "sc": "250,0,250,0,250,0,250,0",
        "owari": "250,0.0,250,0.0,250,0.0,250,0.0",
    }))
}
