//! Multicast action channel shared by the fold and every effect.

use std::sync::Arc;

use futures::future;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::action::identifier::Identifier;
use crate::action::types::Action;
use crate::config::{ChannelSettings, ConfigError};

/// Lossless fan-out of all actions for a store.
///
/// Cloning yields another handle to the same channel. Only receivers
/// subscribed before a send observe that action. Every receiver sees every
/// action, in the order `dispatch` was called.
#[derive(Clone)]
pub struct ActionChannel {
    receivers: Arc<Mutex<Vec<mpsc::UnboundedSender<Action>>>>,
    settings: ChannelSettings,
}

impl ActionChannel {
    /// # Errors
    /// Returns `ValidationError` for settings that fail
    /// [`ChannelSettings::validate`].
    pub fn new(settings: &ChannelSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            receivers: Arc::new(Mutex::new(Vec::new())),
            settings: *settings,
        })
    }

    /// Send `action` to every live receiver.
    ///
    /// Returns the number of receivers reached. Zero means the action was
    /// dropped. Receivers that were dropped are pruned here.
    pub fn dispatch(&self, action: Action) -> usize {
        let mut receivers = self.receivers.lock();
        receivers.retain(|tx| tx.send(action.clone()).is_ok());
        if receivers.is_empty() {
            tracing::trace!(action = %action.kind, "Action dropped (no receivers)");
        }
        receivers.len()
    }

    pub fn subscribe(&self) -> ActionReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.receivers.lock().push(tx);
        ActionReceiver {
            rx,
            backlog_warning: self.settings.backlog_warning,
            backlogged: false,
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers
            .lock()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

impl Default for ActionChannel {
    fn default() -> Self {
        Self {
            receivers: Arc::new(Mutex::new(Vec::new())),
            settings: ChannelSettings::default(),
        }
    }
}

/// One subscription to an [`ActionChannel`].
pub struct ActionReceiver {
    rx: mpsc::UnboundedReceiver<Action>,
    backlog_warning: usize,
    backlogged: bool,
}

impl ActionReceiver {
    /// Next action, or `None` once every channel handle is gone.
    ///
    /// Cancel-safe. Warns once each time the queued backlog crosses the
    /// configured threshold.
    pub async fn recv(&mut self) -> Option<Action> {
        let action = self.rx.recv().await?;
        let backlog = self.rx.len();
        if backlog >= self.backlog_warning && !self.backlogged {
            tracing::warn!(backlog, "Action receiver is falling behind");
            self.backlogged = true;
        } else if backlog < self.backlog_warning / 2 {
            self.backlogged = false;
        }
        Some(action)
    }

    pub fn into_stream(self) -> BoxStream<'static, Action> {
        UnboundedReceiverStream::new(self.rx).boxed()
    }

    /// Stream of actions whose kind is `kind`.
    pub fn of_type(self, kind: Identifier) -> BoxStream<'static, Action> {
        self.into_stream()
            .filter(move |action| future::ready(action.kind == kind))
            .boxed()
    }
}
