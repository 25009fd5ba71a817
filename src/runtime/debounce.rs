use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot, Mutex},
    time::{Duration, Instant},
};

use crate::persist::{PersistError, PersistResult};

use super::RuntimeError;

enum DebounceMsg<T> {
    Call(T),
    Flush {
        resp: oneshot::Sender<PersistResult<bool>>,
    },
    Cancel {
        resp: oneshot::Sender<bool>,
    },
    Shutdown {
        resp: oneshot::Sender<PersistResult<bool>>,
    },
}

/// Delays applying a value until no new value has arrived for the quiet
/// period. Only the latest value is applied; earlier ones are dropped.
///
/// The apply function runs on the blocking pool.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<DebounceMsg<T>>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

/// Outcome of every apply, in order.
pub type ApplyOutcomes = mpsc::UnboundedReceiver<PersistResult<()>>;

impl<T: Send + 'static> Debouncer<T> {
    /// Starts the debounce task.
    pub fn spawn<F>(delay: Duration, apply: F) -> Self
    where
        F: FnMut(T) -> PersistResult<()> + Send + 'static,
    {
        spawn_debouncer(delay, apply, None)
    }

    /// Starts the debounce task and reports every apply result.
    pub fn spawn_with_outcomes<F>(delay: Duration, apply: F) -> (Self, ApplyOutcomes)
    where
        F: FnMut(T) -> PersistResult<()> + Send + 'static,
    {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        (spawn_debouncer(delay, apply, Some(outcome_tx)), outcome_rx)
    }

    /// Replaces any pending value with `value` and restarts the quiet period.
    pub fn call(&self, value: T) -> Result<(), RuntimeError> {
        self.tx
            .send(DebounceMsg::Call(value))
            .map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Applies the pending value now. `Ok(false)` when nothing was pending.
    pub async fn flush(&self) -> Result<bool, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(DebounceMsg::Flush { resp: tx })
            .map_err(|_| RuntimeError::ChannelClosed)?;
        Ok(rx.await.map_err(|_| RuntimeError::ChannelClosed)??)
    }

    /// Drops the pending value. Returns whether one was pending.
    pub async fn cancel(&self) -> Result<bool, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(DebounceMsg::Cancel { resp: tx })
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Applies the pending value, then stops the task.
    pub async fn shutdown(&self) -> Result<bool, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(DebounceMsg::Shutdown { resp: tx })
            .map_err(|_| RuntimeError::ChannelClosed)?;
        Ok(rx.await.map_err(|_| RuntimeError::ChannelClosed)??)
    }
}

fn spawn_debouncer<T, F>(
    delay: Duration,
    apply: F,
    outcomes: Option<mpsc::UnboundedSender<PersistResult<()>>>,
) -> Debouncer<T>
where
    T: Send + 'static,
    F: FnMut(T) -> PersistResult<()> + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<DebounceMsg<T>>();
    let apply = Arc::new(Mutex::new(apply));

    tokio::spawn(async move {
        let mut pending: Option<T> = None;
        let mut deadline = Instant::now() + delay;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = apply_pending(&apply, &mut pending, outcomes.as_ref()).await;
                        break;
                    };

                    match msg {
                        DebounceMsg::Call(value) => {
                            pending = Some(value);
                            deadline = Instant::now() + delay;
                        }
                        DebounceMsg::Flush { resp } => {
                            let result = apply_pending(&apply, &mut pending, outcomes.as_ref()).await;
                            let _ = resp.send(result);
                        }
                        DebounceMsg::Cancel { resp } => {
                            let dropped = pending.take().is_some();
                            if dropped {
                                tracing::debug!("pending write cancelled");
                            }
                            let _ = resp.send(dropped);
                        }
                        DebounceMsg::Shutdown { resp } => {
                            let result = apply_pending(&apply, &mut pending, outcomes.as_ref()).await;
                            let _ = resp.send(result);
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                    let _ = apply_pending(&apply, &mut pending, outcomes.as_ref()).await;
                }
            }
        }
    });

    Debouncer { tx }
}

async fn apply_pending<T, F>(
    apply: &Arc<Mutex<F>>,
    pending: &mut Option<T>,
    outcomes: Option<&mpsc::UnboundedSender<PersistResult<()>>>,
) -> PersistResult<bool>
where
    T: Send + 'static,
    F: FnMut(T) -> PersistResult<()> + Send + 'static,
{
    let Some(value) = pending.take() else {
        return Ok(false);
    };

    let apply_ref = Arc::clone(apply);
    let result = tokio::task::spawn_blocking(move || {
        let mut apply = apply_ref.blocking_lock();
        (&mut *apply)(value)
    })
    .await
    .map_err(|e| PersistError::Message(format!("join error: {e}")))
    .and_then(|inner| inner);

    if let Err(err) = &result {
        tracing::warn!(error = %err, "debounced write failed");
    }
    if let Some(tx) = outcomes {
        let _ = tx.send(match &result {
            Ok(()) => Ok(()),
            Err(err) => Err(PersistError::Message(err.to_string())),
        });
    }
    result.map(|()| true)
}
