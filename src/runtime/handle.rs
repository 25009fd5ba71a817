use std::sync::Arc;

use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::Duration,
};

use crate::{
    persist::KvStore,
    photos::PhotoData,
    state::SettingsMap,
    tables::{save_tables, TablesCollection},
    types::{CutType, TableId},
};

use super::{
    debounce::{ApplyOutcomes, Debouncer},
    events::TrackerEvent,
    RuntimeConfig, RuntimeError,
};

type Snapshot = Arc<TablesCollection>;
type Reply = oneshot::Sender<Result<Snapshot, RuntimeError>>;

/// Cloneable handle to the tracker task.
pub struct TrackerHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<TrackerEvent>,
}

impl Clone for TrackerHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Snapshot {
        resp: oneshot::Sender<Snapshot>,
    },
    AddTable {
        name: String,
        group_ids: Vec<String>,
        resp: Reply,
    },
    SetActive {
        id: TableId,
        resp: Reply,
    },
    Rename {
        id: TableId,
        name: String,
        resp: Reply,
    },
    Delete {
        id: TableId,
        resp: Reply,
    },
    Duplicate {
        id: TableId,
        resp: Reply,
    },
    SetPhotoData {
        photo_data: PhotoData,
        resp: Reply,
    },
    SetGroupSettings {
        settings: SettingsMap,
        resp: Reply,
    },
    SetPhotoCount {
        group_id: String,
        fullname: String,
        cut: CutType,
        value: u32,
        resp: Reply,
    },
    Flush {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

/// Starts the tracker task owning `tables`.
///
/// With a store, every change schedules a debounced save of the whole
/// collection; only the latest snapshot in a quiet period is written.
pub fn spawn_tracker(
    tables: Snapshot,
    store: Option<Box<dyn KvStore>>,
    config: RuntimeConfig,
) -> TrackerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<TrackerEvent>(config.event_queue_bound);

    let (saver, mut outcomes): (Option<Debouncer<Snapshot>>, Option<ApplyOutcomes>) = match store {
        Some(mut store) => {
            let (saver, outcomes) = Debouncer::spawn_with_outcomes(
                Duration::from_millis(config.debounce_ms),
                move |snapshot: Snapshot| {
                    save_tables(store.as_mut(), &snapshot)?;
                    store.flush()
                },
            );
            (Some(saver), Some(outcomes))
        }
        None => (None, None),
    };

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut tables = tables;

        loop {
            if let Some(rx) = outcomes.as_mut() {
                let mut outcomes_closed = false;
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break; };
                        if handle_command(cmd, &mut tables, &events_tx_loop, saver.as_ref(), &config).await {
                            break;
                        }
                    }
                    outcome = rx.recv() => {
                        match outcome {
                            Some(Ok(())) => {
                                let _ = events_tx_loop.send(TrackerEvent::Persisted);
                            }
                            Some(Err(err)) => {
                                let _ = events_tx_loop.send(TrackerEvent::PersistFailed {
                                    message: err.to_string(),
                                });
                            }
                            None => outcomes_closed = true,
                        }
                    }
                }
                if outcomes_closed {
                    outcomes = None;
                }
            } else {
                let Some(cmd) = cmd_rx.recv().await else { break; };
                if handle_command(cmd, &mut tables, &events_tx_loop, saver.as_ref(), &config).await {
                    break;
                }
            }
        }

        if let Some(saver) = saver {
            let _ = saver.shutdown().await;
        }
    });

    TrackerHandle { cmd_tx, events_tx }
}

impl TrackerHandle {
    /// Receives every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events_tx.subscribe()
    }

    /// Current collection.
    pub async fn snapshot(&self) -> Result<Snapshot, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Snapshot { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Creates, appends, and activates a table enabling `group_ids`.
    pub async fn add_table(
        &self,
        name: impl Into<String>,
        group_ids: Vec<String>,
    ) -> Result<Snapshot, RuntimeError> {
        let name = name.into();
        self.request(|resp| Command::AddTable { name, group_ids, resp }).await
    }

    /// Activates `id`.
    pub async fn set_active_table(&self, id: TableId) -> Result<Snapshot, RuntimeError> {
        self.request(|resp| Command::SetActive { id, resp }).await
    }

    /// Renames `id`.
    pub async fn rename_table(&self, id: TableId, name: impl Into<String>) -> Result<Snapshot, RuntimeError> {
        let name = name.into();
        self.request(|resp| Command::Rename { id, name, resp }).await
    }

    /// Deletes `id`.
    pub async fn delete_table(&self, id: TableId) -> Result<Snapshot, RuntimeError> {
        self.request(|resp| Command::Delete { id, resp }).await
    }

    /// Duplicates `id` using the configured placement.
    pub async fn duplicate_table(&self, id: TableId) -> Result<Snapshot, RuntimeError> {
        self.request(|resp| Command::Duplicate { id, resp }).await
    }

    /// Replaces the active table's photo data.
    pub async fn update_active_photo_data(&self, photo_data: PhotoData) -> Result<Snapshot, RuntimeError> {
        self.request(|resp| Command::SetPhotoData { photo_data, resp }).await
    }

    /// Replaces the active table's enablement settings.
    pub async fn update_active_group_settings(&self, settings: SettingsMap) -> Result<Snapshot, RuntimeError> {
        self.request(|resp| Command::SetGroupSettings { settings, resp }).await
    }

    /// Sets one cut count on the active table.
    pub async fn set_photo_count(
        &self,
        group_id: impl Into<String>,
        fullname: impl Into<String>,
        cut: CutType,
        value: u32,
    ) -> Result<Snapshot, RuntimeError> {
        let group_id = group_id.into();
        let fullname = fullname.into();
        self.request(|resp| Command::SetPhotoCount {
            group_id,
            fullname,
            cut,
            value,
            resp,
        })
        .await
    }

    /// Writes any pending save now.
    pub async fn flush(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Flush { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Writes any pending save and stops the tracker.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    async fn request(&self, make: impl FnOnce(Reply) -> Command) -> Result<Snapshot, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }
}

async fn handle_command(
    cmd: Command,
    tables: &mut Snapshot,
    events_tx: &broadcast::Sender<TrackerEvent>,
    saver: Option<&Debouncer<Snapshot>>,
    config: &RuntimeConfig,
) -> bool {
    match cmd {
        Command::Snapshot { resp } => {
            let _ = resp.send(Arc::clone(tables));
        }
        Command::AddTable { name, group_ids, resp } => {
            let res = tables.add_table(&name, group_ids.as_slice()).map_err(RuntimeError::from);
            let res = commit(tables, res, saver, events_tx, |next| TrackerEvent::TableCreated {
                id: next.active_table_id,
            });
            let _ = resp.send(res);
        }
        Command::SetActive { id, resp } => {
            let next = tables.set_active_table(&id);
            let res = commit(tables, Ok(next), saver, events_tx, |_| TrackerEvent::ActiveTableChanged { id });
            let _ = resp.send(res);
        }
        Command::Rename { id, name, resp } => {
            let res = tables.rename_table(&id, &name).map_err(RuntimeError::from);
            let res = commit(tables, res, saver, events_tx, |_| TrackerEvent::TableRenamed { id });
            let _ = resp.send(res);
        }
        Command::Delete { id, resp } => {
            let before = tables.active_table_id;
            let res = tables.delete_table(&id).map_err(RuntimeError::from);
            let res = commit(tables, res, saver, events_tx, |_| TrackerEvent::TableDeleted { id });
            if let Ok(next) = &res {
                if next.active_table_id != before {
                    let _ = events_tx.send(TrackerEvent::ActiveTableChanged {
                        id: next.active_table_id,
                    });
                }
            }
            let _ = resp.send(res);
        }
        Command::Duplicate { id, resp } => {
            let before: Vec<TableId> = tables.tables.iter().map(|t| t.id).collect();
            let res = tables
                .duplicate_table(&id, config.duplicate)
                .map_err(RuntimeError::from);
            let res = commit(tables, res, saver, events_tx, |next| TrackerEvent::TableDuplicated {
                source: id,
                id: next
                    .tables
                    .iter()
                    .map(|t| t.id)
                    .find(|t| !before.contains(t))
                    .unwrap_or(id),
            });
            let _ = resp.send(res);
        }
        Command::SetPhotoData { photo_data, resp } => {
            let next = tables.update_active_photo_data(photo_data);
            let res = commit(tables, Ok(next), saver, events_tx, |next| TrackerEvent::TableUpdated {
                id: next.active_table_id,
            });
            let _ = resp.send(res);
        }
        Command::SetGroupSettings { settings, resp } => {
            let next = tables.update_active_group_settings(settings);
            let res = commit(tables, Ok(next), saver, events_tx, |next| TrackerEvent::TableUpdated {
                id: next.active_table_id,
            });
            let _ = resp.send(res);
        }
        Command::SetPhotoCount {
            group_id,
            fullname,
            cut,
            value,
            resp,
        } => {
            let next = tables.set_photo_count(&group_id, &fullname, cut, value);
            let res = commit(tables, Ok(next), saver, events_tx, |next| TrackerEvent::TableUpdated {
                id: next.active_table_id,
            });
            let _ = resp.send(res);
        }
        Command::Flush { resp } => {
            let out = match saver {
                Some(saver) => saver.flush().await.map(|_| ()),
                None => Ok(()),
            };
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            let out = match saver {
                Some(saver) => saver.shutdown().await.map(|_| ()),
                None => Ok(()),
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

/// Installs `next` as current, schedules a save, and emits `event`.
/// Same-`Arc` results are no-ops and emit nothing.
fn commit(
    tables: &mut Snapshot,
    next: Result<Snapshot, RuntimeError>,
    saver: Option<&Debouncer<Snapshot>>,
    events_tx: &broadcast::Sender<TrackerEvent>,
    event: impl FnOnce(&TablesCollection) -> TrackerEvent,
) -> Result<Snapshot, RuntimeError> {
    let next = next?;
    if Arc::ptr_eq(tables, &next) {
        return Ok(next);
    }

    *tables = Arc::clone(&next);
    if let Some(saver) = saver {
        saver.call(Arc::clone(&next))?;
    }
    let _ = events_tx.send(event(&next));
    Ok(next)
}
