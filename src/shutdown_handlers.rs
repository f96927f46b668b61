use tracing::warn;

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// OS signal that ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
        }
    }
}

/// OS signal handlers for the run, installed when constructed.
///
/// Signals delivered between [`ShutdownListener::register`] and the first
/// [`ShutdownListener::wait`] are kept, so registering early covers startup.
pub struct ShutdownListener {
    #[cfg(unix)]
    interrupt: Option<Signal>,
    #[cfg(unix)]
    terminate: Option<Signal>,
}

impl ShutdownListener {
    /// Installs SIGINT and SIGTERM handlers (Ctrl+C only off unix).
    ///
    /// Must be called from within a tokio runtime context.
    #[must_use]
    pub fn register() -> Self {
        #[cfg(unix)]
        {
            Self {
                interrupt: install(SignalKind::interrupt(), "SIGINT"),
                terminate: install(SignalKind::terminate(), "SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    /// Resolves on the first SIGINT or SIGTERM received since registration.
    pub async fn wait(&mut self) -> ShutdownSignal {
        #[cfg(unix)]
        {
            tokio::select! {
                () = recv_or_pending(self.interrupt.as_mut()) => ShutdownSignal::Interrupt,
                () = recv_or_pending(self.terminate.as_mut()) => ShutdownSignal::Terminate,
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", err);
                std::future::pending::<()>().await;
            }
            ShutdownSignal::Interrupt
        }
    }
}

#[cfg(unix)]
fn install(kind: SignalKind, name: &str) -> Option<Signal> {
    match signal(kind) {
        Ok(signal) => Some(signal),
        Err(err) => {
            warn!("Failed to register {} handler: {}", name, err);
            None
        }
    }
}

#[cfg(unix)]
async fn recv_or_pending(signal: Option<&mut Signal>) {
    match signal {
        Some(signal) => {
            if signal.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}
