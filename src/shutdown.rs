use std::fmt;

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Interrupt,
    Terminate,
    QuitKey,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Interrupt => write!(f, "SIGINT"),
            Reason::Terminate => write!(f, "SIGTERM"),
            Reason::QuitKey => write!(f, "quit key"),
        }
    }
}

/// One-shot shutdown flag shared by the signal listener, the key listener
/// and the control loop. The first trigger wins; later ones are ignored.
#[derive(Clone)]
pub struct Shutdown {
    tx: watch::Sender<Option<Reason>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Returns true if this call was the one that triggered shutdown.
    pub fn trigger(&self, reason: Reason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    pub fn reason(&self) -> Option<Reason> {
        *self.tx.borrow()
    }

    pub fn is_triggered(&self) -> bool {
        self.reason().is_some()
    }

    pub async fn triggered(&self) -> Reason {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        match rx.wait_for(Option::is_some).await {
            Ok(reason) => (*reason).unwrap_or(Reason::Terminate),
            Err(_) => Reason::Terminate,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards SIGINT and SIGTERM into `shutdown`. Keeps listening afterwards
/// so a second Ctrl+C during shutdown does not kill the supervisor before
/// its children are stopped.
pub fn spawn_signal_listener(shutdown: Shutdown) -> std::io::Result<tokio::task::JoinHandle<()>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            let reason = tokio::select! {
                Some(()) = sigint.recv() => Reason::Interrupt,
                Some(()) = sigterm.recv() => Reason::Terminate,
                else => return,
            };
            if !shutdown.trigger(reason) {
                debug!("ignoring {}, already stopping", reason);
            }
        }
    }))
}
