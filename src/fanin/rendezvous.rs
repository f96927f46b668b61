use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// The receiving half was dropped before taking the value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("rendezvous receiver dropped")]
pub struct Disconnected;

struct Envelope<T> {
    value: T,
    taken: oneshot::Sender<()>,
}

/// Cloneable producer side of an unbuffered channel.
pub struct RendezvousSender<T> {
    tx: mpsc::Sender<Envelope<T>>,
}

impl<T> Clone for RendezvousSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Single consumer side of an unbuffered channel.
pub struct RendezvousReceiver<T> {
    rx: mpsc::Receiver<Envelope<T>>,
}

/// Creates a channel whose `send` only completes once the receiver has
/// taken the value.
#[must_use]
pub fn rendezvous<T>() -> (RendezvousSender<T>, RendezvousReceiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (RendezvousSender { tx }, RendezvousReceiver { rx })
}

impl<T> RendezvousSender<T> {
    /// Hands `value` to the receiver and waits until it has been taken.
    ///
    /// # Errors
    ///
    /// Returns [`Disconnected`] when the receiver is gone; the value is lost.
    pub async fn send(&self, value: T) -> Result<(), Disconnected> {
        let (taken, on_taken) = oneshot::channel();
        self.tx
            .send(Envelope { value, taken })
            .await
            .map_err(|_closed| Disconnected)?;
        on_taken.await.map_err(|_dropped| Disconnected)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> RendezvousReceiver<T> {
    /// Takes the next value, releasing its sender.
    ///
    /// Returns `None` once every sender has been dropped.
    pub async fn recv(&mut self) -> Option<T> {
        let Envelope { value, taken } = self.rx.recv().await?;
        // The sender may have given up waiting; the value is still delivered.
        taken.send(()).ok();
        Some(value)
    }
}
