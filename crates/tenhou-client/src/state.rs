//! Session flags shared by the session loop and the keep-alive task.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// SessionFlags
// ---------------------------------------------------------------------------

/// The three booleans that gate both loops.
///
/// Handlers on the session loop are the only writers of `in_lobby` and
/// `in_game`; the keep-alive task only reads. `running` is set when a run
/// starts and cleared on a fatal error or through a [`ShutdownHandle`].
/// Once cleared it is never set again for that run.
#[derive(Debug, Default)]
pub struct SessionFlags {
    running: AtomicBool,
    in_lobby: AtomicBool,
    in_game: AtomicBool,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn in_lobby(&self) -> bool {
        self.in_lobby.load(Ordering::Acquire)
    }

    pub fn in_game(&self) -> bool {
        self.in_game.load(Ordering::Acquire)
    }

    /// In lobby or in game: the states that need keep-alive pings.
    pub fn is_active(&self) -> bool {
        self.in_lobby() || self.in_game()
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// HELO acknowledged.
    pub fn enter_lobby(&self) {
        self.in_lobby.store(true, Ordering::Release);
    }

    /// GO received. Lobby is cleared first so the two are never both set.
    pub fn enter_game(&self) {
        self.in_lobby.store(false, Ordering::Release);
        self.in_game.store(true, Ordering::Release);
    }

    /// Match over (`owari`).
    pub fn finish_game(&self) {
        self.in_game.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// ShutdownHandle
// ---------------------------------------------------------------------------

/// Stops a running client from another task (e.g. a Ctrl-C watcher).
///
/// Shutdown is cooperative: both loops observe the cleared flag within one
/// receive timeout or sleep slice.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flags: Arc<SessionFlags>,
}

impl ShutdownHandle {
    pub(crate) fn new(flags: Arc<SessionFlags>) -> Self {
        Self { flags }
    }

    pub fn shutdown(&self) {
        self.flags.stop();
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Where the session state machine is.
///
/// ```text
/// Connecting → Lobby → Reserving → Playing ─┬─→ Lobby
///                                           └─→ Terminated
/// ```
///
/// Any stage can move to `Terminated` on a fatal error or interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connecting,
    Lobby,
    Reserving,
    Playing,
    Terminated,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting"),
            Self::Lobby => write!(f, "Lobby"),
            Self::Reserving => write!(f, "Reserving"),
            Self::Playing => write!(f, "Playing"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}
