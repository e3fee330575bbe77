//! The single shared board and its fan-out.
//!
//! `SyncHub` is created once by the server's composition root and handed to
//! every REST and WebSocket handler through `AppState`. Every mutation and
//! its broadcast happen while the store lock is held, so subscribers see
//! board updates in exactly the order the server applied them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use taskboard_common::{Board, BoardError, BoardStore, SyncMessage};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::errors::SyncError;

/// Identifies one realtime connection for the lifetime of the process.
pub type ConnectionId = u64;

/// A serialized `board-update` plus the connection that caused it.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// `None` for updates that came from the REST surface.
    pub origin: Option<ConnectionId>,
    pub payload: String,
}

pub struct SyncHub {
    store: Mutex<BoardStore>,
    tx: broadcast::Sender<Envelope>,
    next_id: AtomicU64,
}

impl SyncHub {
    pub fn new(board: Board, capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            store: Mutex::new(BoardStore::new(board)),
            tx,
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a realtime connection.
    ///
    /// The initial `board-update` and the subscription are taken under the
    /// same lock, so the connection sees every later update and none twice.
    pub fn connect(&self) -> Result<Subscription, SyncError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let store = self.lock()?;
        let initial = SyncMessage::BoardUpdate(store.snapshot()).to_json()?;
        let rx = self.tx.subscribe();
        drop(store);
        Ok(Subscription { id, initial, rx })
    }

    pub fn snapshot(&self) -> Result<Board, SyncError> {
        Ok(self.lock()?.snapshot())
    }

    /// Adopt a client's board verbatim and push it to every other
    /// connection. Last writer wins; an inconsistent board is logged but
    /// still adopted.
    pub fn replace_from(&self, origin: ConnectionId, board: Board) -> Result<(), SyncError> {
        let mut store = self.lock()?;
        if let Err(e) = board.check_invariants() {
            warn!(connection = origin, error = %e, "adopting board that breaks invariants");
        }
        let msg = SyncMessage::BoardUpdate(board);
        let payload = msg.to_json()?;
        store.replace(msg.into_board());
        debug!(connection = origin, "board replaced by client");
        self.publish(Some(origin), payload);
        Ok(())
    }

    /// Run a mutation and broadcast the new board to every connection.
    pub fn mutate<R>(
        &self,
        f: impl FnOnce(&mut BoardStore) -> Result<R, BoardError>,
    ) -> Result<R, SyncError> {
        self.mutate_when(f, |_| true)
    }

    /// Like [`SyncHub::mutate`], broadcasting only when `changed` says the
    /// result altered the board.
    pub fn mutate_when<R>(
        &self,
        f: impl FnOnce(&mut BoardStore) -> Result<R, BoardError>,
        changed: impl FnOnce(&R) -> bool,
    ) -> Result<R, SyncError> {
        let mut store = self.lock()?;
        let result = f(&mut store)?;
        if changed(&result) {
            let payload = SyncMessage::BoardUpdate(store.snapshot()).to_json()?;
            self.publish(None, payload);
        }
        Ok(result)
    }

    /// Number of live subscriptions.
    pub fn connection_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn publish(&self, origin: Option<ConnectionId>, payload: String) {
        // Err only means nobody is listening.
        let receivers = self.tx.send(Envelope { origin, payload }).unwrap_or(0);
        debug!(receivers, "broadcast board-update");
    }

    fn lock(&self) -> Result<MutexGuard<'_, BoardStore>, SyncError> {
        self.store.lock().map_err(|_| SyncError::LockPoisoned)
    }
}

/// One connection's view of the broadcast stream.
pub struct Subscription {
    id: ConnectionId,
    initial: String,
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The `board-update` to send as soon as the connection opens.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// Next `board-update` for this connection, skipping the ones it
    /// caused itself. `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if envelope.origin == Some(self.id) => continue,
                Ok(envelope) => return Some(envelope.payload),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Each update is a full board; the next one supersedes
                    // whatever was missed.
                    warn!(connection = self.id, skipped, "subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
