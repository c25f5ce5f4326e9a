//! `TenhouClient`: the session state machine.
//!
//! One run of the client looks like this:
//!
//! ```text
//! run_forever
//!   ├─ spawn keep-alive task
//!   └─ while running:
//!        enter_lobby    HELO, wait ≤ lobby_attempts receives for in_lobby
//!        reserve_game   JOIN, wait ≤ join_attempts receives for in_game
//!        play_game      receive + dispatch until in_game clears
//! ```
//!
//! Any error ends the run; there is no reconnect. The connection is closed
//! on every exit path.

use std::sync::{Arc, Mutex, PoisonError};

use tenhou_protocol::{Action, Codec, JsonCodec};
use tenhou_transport::{Connection, TransportError, WebSocketConnection};
use tracing::{debug, error, info, warn};

use crate::pace::{divided_sleep, human_delay};
use crate::router::{ActionRouter, Pacing};
use crate::{keepalive, ClientConfig, ClientError, SessionFlags, ShutdownHandle, Stage, Strategy};

/// Drop guard that stops the run and closes the connection if the run
/// future is dropped or unwinds before [`release`](Self::release).
///
/// Since `Drop` is synchronous, the close is spawned as a fire-and-forget
/// task.
struct RunGuard<C: Connection> {
    conn: Arc<C>,
    flags: Arc<SessionFlags>,
    armed: bool,
}

impl<C: Connection> RunGuard<C> {
    async fn release(mut self) -> Result<(), TransportError> {
        self.armed = false;
        self.conn.close().await
    }
}

impl<C: Connection> Drop for RunGuard<C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.flags.stop();
        let conn = Arc::clone(&self.conn);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = conn.close().await;
            });
        }
    }
}

/// An automated player bound to one connection.
pub struct TenhouClient<C: Connection> {
    conn: Arc<C>,
    flags: Arc<SessionFlags>,
    router: ActionRouter,
    codec: JsonCodec,
    config: ClientConfig,
    stage: Mutex<Stage>,
}

impl TenhouClient<WebSocketConnection> {
    /// Validates `config`, opens the WebSocket, and builds a client with
    /// the standard handlers.
    pub async fn connect(
        config: ClientConfig,
        strategy: Arc<dyn Strategy>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let conn = WebSocketConnection::open(&config.connect_options()).await?;
        Ok(Self::with_connection(
            conn,
            config,
            ActionRouter::standard(strategy),
        ))
    }
}

impl<C: Connection> TenhouClient<C> {
    /// Builds a client over an already-open connection.
    pub fn with_connection(
        conn: C,
        config: ClientConfig,
        router: ActionRouter,
    ) -> Self {
        Self {
            conn: Arc::new(conn),
            flags: Arc::new(SessionFlags::new()),
            router,
            codec: JsonCodec,
            config,
            stage: Mutex::new(Stage::Connecting),
        }
    }

    /// Read access to the session flags.
    pub fn flags(&self) -> &SessionFlags {
        &self.flags
    }

    /// Handle that stops [`run_forever`](Self::run_forever) from elsewhere.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(Arc::clone(&self.flags))
    }

    pub fn stage(&self) -> Stage {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Plays matches until an error or a shutdown.
    ///
    /// Returns `Ok(())` when stopped through a [`ShutdownHandle`], and the
    /// fatal error otherwise. Either way the error has already been logged,
    /// the keep-alive task has finished, and the connection is closed.
    pub async fn run_forever(&self) -> Result<(), ClientError> {
        self.flags.start();
        let guard = RunGuard {
            conn: Arc::clone(&self.conn),
            flags: Arc::clone(&self.flags),
            armed: true,
        };
        let keep_alive = keepalive::spawn(
            Arc::clone(&self.conn),
            Arc::clone(&self.flags),
            self.config.keep_alive_interval,
        );

        let mut outcome = Ok(());
        while self.flags.is_running() {
            match self.run_once().await {
                Ok(()) => {}
                Err(ClientError::Interrupted) => {
                    info!(stage = %self.stage(), "interrupted, shutting down");
                    self.flags.stop();
                }
                Err(e) => {
                    error!(stage = %self.stage(), error = %e, "fatal client error");
                    self.flags.stop();
                    outcome = Err(e);
                }
            }
        }
        self.set_stage(Stage::Terminated);

        if let Err(e) = keep_alive.await {
            warn!(error = %e, "keep-alive task failed");
        }
        if let Err(e) = guard.release().await {
            warn!(error = %e, "closing connection failed");
        }
        info!("client stopped");
        outcome
    }

    async fn run_once(&self) -> Result<(), ClientError> {
        self.enter_lobby().await?;
        self.reserve_game().await?;
        self.play_game().await
    }

    /// Sends HELO and waits for the server to acknowledge it.
    pub async fn enter_lobby(&self) -> Result<(), ClientError> {
        self.set_stage(Stage::Lobby);
        let helo = Action::helo(self.config.user_name(), &self.config.user_sx);
        divided_sleep(&self.flags, self.config.send_delay).await;
        self.send_action(&helo).await?;

        let attempts = self.config.lobby_attempts;
        if self.poll_until(attempts, SessionFlags::in_lobby).await? {
            Ok(())
        } else {
            Err(ClientError::LoginFailed { attempts })
        }
    }

    /// Sends JOIN and waits for GO.
    pub async fn reserve_game(&self) -> Result<(), ClientError> {
        self.set_stage(Stage::Reserving);
        let join = Action::join(self.config.lobby, self.config.join_game_type());
        info!(
            lobby = self.config.lobby,
            game_type = self.config.join_game_type(),
            test_play = self.config.test_play,
            tournament = self.config.tournament,
            "reserving a match"
        );
        divided_sleep(&self.flags, self.config.send_delay).await;
        self.send_action(&join).await?;

        let attempts = self.config.join_attempts;
        if self.poll_until(attempts, SessionFlags::in_game).await? {
            Ok(())
        } else {
            Err(ClientError::MatchingFailed { attempts })
        }
    }

    /// Handles match traffic until a handler clears `in_game`.
    pub async fn play_game(&self) -> Result<(), ClientError> {
        self.set_stage(Stage::Playing);
        while self.flags.in_game() {
            self.recv_and_dispatch().await?;
        }
        self.set_stage(Stage::Lobby);
        Ok(())
    }

    /// Receives and dispatches up to `attempts` times, stopping early once
    /// `done` holds. Returns whether it did.
    async fn poll_until(
        &self,
        attempts: u32,
        done: fn(&SessionFlags) -> bool,
    ) -> Result<bool, ClientError> {
        for _ in 0..attempts {
            self.recv_and_dispatch().await?;
            if done(&self.flags) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn recv_and_dispatch(&self) -> Result<(), ClientError> {
        let Some(mut action) = self.recv_action().await? else {
            return Ok(());
        };
        for reply in self.router.dispatch(&mut action, &self.flags)? {
            if reply.pacing == Pacing::Human {
                divided_sleep(&self.flags, human_delay()).await;
            }
            self.send_action(&reply.action).await?;
        }
        Ok(())
    }

    async fn recv_action(&self) -> Result<Option<Action>, ClientError> {
        self.ensure_running()?;
        let Some(line) = self.conn.recv().await? else {
            return Ok(None);
        };
        debug!("->: {line}");
        if line.is_empty() {
            return Ok(None);
        }
        match self.codec.decode(&line) {
            Ok(action) => Ok(Some(action)),
            Err(e) => {
                warn!(error = %e, "dropping malformed message");
                Ok(None)
            }
        }
    }

    async fn send_action(&self, action: &Action) -> Result<(), ClientError> {
        self.ensure_running()?;
        let line = self.codec.encode(action)?;
        debug!("<-: {line}");
        self.conn.send(&line).await?;
        Ok(())
    }

    fn ensure_running(&self) -> Result<(), ClientError> {
        if self.flags.is_running() {
            Ok(())
        } else {
            Err(ClientError::Interrupted)
        }
    }

    fn set_stage(&self, stage: Stage) {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner) = stage;
        debug!(%stage, "stage");
    }
}
