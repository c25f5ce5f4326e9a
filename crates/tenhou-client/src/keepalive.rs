//! Background keep-alive pings.

use std::sync::Arc;
use std::time::Duration;

use tenhou_protocol::KEEP_ALIVE;
use tenhou_transport::Connection;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::pace::divided_sleep;
use crate::SessionFlags;

/// How often an idle keep-alive task re-checks the flags.
pub const IDLE_POLL: Duration = Duration::from_millis(100);

/// Spawns [`run_keep_alive`] onto the current runtime.
pub fn spawn<C: Connection>(
    conn: Arc<C>,
    flags: Arc<SessionFlags>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(run_keep_alive(conn, flags, interval))
}

/// Pings every `interval` while the client is in lobby or in game, until
/// `running` is cleared.
///
/// Reads the flags, never writes them. A failed ping is only logged: the
/// session loop owns error handling and will hit the same broken
/// connection on its next receive.
pub async fn run_keep_alive<C: Connection>(
    conn: Arc<C>,
    flags: Arc<SessionFlags>,
    interval: Duration,
) {
    debug!("keep-alive started");
    while flags.is_running() {
        if flags.is_active() {
            debug!("<-: {KEEP_ALIVE}");
            if let Err(e) = conn.send(KEEP_ALIVE).await {
                warn!(error = %e, "keep-alive ping failed");
            }
            divided_sleep(&flags, interval).await;
        } else {
            tokio::time::sleep(IDLE_POLL).await;
        }
    }
    debug!("keep-alive stopped");
}
