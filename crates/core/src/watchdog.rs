//! Connection-timeout watchdog.
//!
//! A single-shot timer armed when a session view mounts. If the transport has
//! not reported [`ConnectionState::Connected`] within the bound, it delivers one
//! [`SessionError::ConnectionTimeout`]. Cancelling or dropping the handle stops
//! it for good; it never fires late and never fires twice.

use crate::connection::ConnectionState;
use crate::error::SessionError;

use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How the watchdog task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogExit {
    Connected,
    Cancelled,
    Fired,
}

pub struct ConnectionWatchdog;

impl ConnectionWatchdog {
    /// Arm a watchdog for `bound`, watching `connection` for a successful connect
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(bound: Duration, connection: watch::Receiver<ConnectionState>) -> (WatchdogHandle, WatchdogSignal) {
        let token = CancellationToken::new();
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(watch_connection(bound, connection, token.clone(), tx));
        debug!(bound_ms = bound.as_millis() as u64, "connection watchdog armed");
        (WatchdogHandle { token, task }, WatchdogSignal { rx: Some(rx) })
    }
}

async fn watch_connection(
    bound: Duration, mut connection: watch::Receiver<ConnectionState>, token: CancellationToken,
    tx: oneshot::Sender<SessionError>,
) -> WatchdogExit {
    let bound_ms = bound.as_millis() as u64;
    let deadline = tokio::time::sleep(bound);
    tokio::pin!(deadline);
    let mut transport_gone = false;

    loop {
        if *connection.borrow_and_update() == ConnectionState::Connected {
            debug!("connection established; watchdog disarmed");
            return WatchdogExit::Connected;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("connection watchdog cancelled");
                return WatchdogExit::Cancelled;
            }
            _ = &mut deadline => {
                warn!(bound_ms, "no connection within bound; requesting teardown");
                let _ = tx.send(SessionError::ConnectionTimeout { bound_ms });
                return WatchdogExit::Fired;
            }
            changed = connection.changed(), if !transport_gone => {
                if changed.is_err() {
                    transport_gone = true;
                }
            }
        }
    }
}

/// Owner of an armed watchdog; cancels it on drop
#[derive(Debug)]
pub struct WatchdogHandle {
    token: CancellationToken,
    task: JoinHandle<WatchdogExit>,
}

impl WatchdogHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_armed(&self) -> bool {
        !self.token.is_cancelled() && !self.task.is_finished()
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Receiving end of the single teardown signal
#[derive(Debug)]
pub struct WatchdogSignal {
    rx: Option<oneshot::Receiver<SessionError>>,
}

impl WatchdogSignal {
    /// Resolve with the teardown error
    ///
    /// Pends forever once the watchdog was disarmed or has already delivered its
    /// one signal, so it can sit in a `select!` loop safely.
    pub async fn fired(&mut self) -> SessionError {
        loop {
            match self.rx.as_mut() {
                Some(rx) => match rx.await {
                    Ok(err) => {
                        self.rx = None;
                        return err;
                    }
                    Err(_) => self.rx = None,
                },
                None => std::future::pending::<()>().await,
            }
        }
    }

    /// Non-blocking check
    pub fn try_fired(&mut self) -> Option<SessionError> {
        let rx = self.rx.as_mut()?;
        match rx.try_recv() {
            Ok(err) => {
                self.rx = None;
                Some(err)
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.rx = None;
                None
            }
        }
    }
}
