//! Snapshot publication: the latest-snapshot slot and subscriber fan-out.
//!
//! [`LatestSnapshot`] holds the most recently committed
//! `Arc<GameSnapshot>`; readers clone the `Arc` and never wait on a
//! mutation. [`SnapshotHub`] offers every committed snapshot to each
//! subscriber's one-slot channel, replacing a snapshot the subscriber
//! has not read yet. The engine calls [`SnapshotHub::publish`] while it
//! still holds its state lock, so the versions a subscriber does see
//! strictly increase and the last one it sees is the newest.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use indexmap::IndexMap;

use gelds_core::SubscriberId;

use crate::state::GameSnapshot;

/// Single slot holding the newest snapshot.
pub(crate) struct LatestSnapshot {
    slot: Mutex<Arc<GameSnapshot>>,
}

impl LatestSnapshot {
    pub fn new(initial: Arc<GameSnapshot>) -> Self {
        Self {
            slot: Mutex::new(initial),
        }
    }

    pub fn store(&self, snapshot: Arc<GameSnapshot>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    pub fn load(&self) -> Arc<GameSnapshot> {
        Arc::clone(&self.slot.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// A live subscription to snapshot updates.
///
/// The current snapshot is already queued when the subscription is
/// returned ("replay latest"). At most one snapshot is ever pending: a
/// commit that lands before the previous one was read replaces it, so a
/// slow reader skips intermediate versions but never misses the newest.
/// The channel disconnects when the subscriber is removed or the engine
/// shuts down. Dropping the `Subscription` removes it at the next commit.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: Receiver<Arc<GameSnapshot>>,
    _alive: Arc<()>,
}

impl Subscription {
    /// Identifier for [`GameEngine::unsubscribe`](crate::GameEngine::unsubscribe).
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// The underlying channel, for `select!` loops.
    pub fn receiver(&self) -> &Receiver<Arc<GameSnapshot>> {
        &self.receiver
    }

    /// Block until the next snapshot or until the publisher goes away.
    pub fn recv(&self) -> Option<Arc<GameSnapshot>> {
        self.receiver.recv().ok()
    }

    /// Block for at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Arc<GameSnapshot>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(snap) => Some(snap),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain everything queued and return the newest snapshot, if any.
    pub fn latest(&self) -> Option<Arc<GameSnapshot>> {
        let mut newest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(snap) => newest = Some(snap),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return newest,
            }
        }
    }

    /// Number of snapshots waiting to be read (zero or one).
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Whether the publisher has dropped this subscription.
    pub fn is_closed(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }
}

/// Hub side of one subscription: the sender plus a second handle on the
/// receiver so a snapshot the subscriber has not read can be replaced.
struct Slot {
    tx: Sender<Arc<GameSnapshot>>,
    stale: Receiver<Arc<GameSnapshot>>,
    alive: Weak<()>,
}

impl Slot {
    /// Put `snapshot` in the slot. Returns `false` once the
    /// [`Subscription`] has been dropped.
    fn offer(&self, snapshot: &Arc<GameSnapshot>) -> bool {
        if self.alive.strong_count() == 0 {
            return false;
        }
        match self.tx.try_send(Arc::clone(snapshot)) {
            Ok(()) => true,
            Err(TrySendError::Full(snapshot)) => {
                // Publishing is serialized by the engine lock, so after
                // the drain the slot is empty.
                let _ = self.stale.try_recv();
                self.tx.try_send(snapshot).is_ok()
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Subscriber registry keyed by [`SubscriberId`].
pub(crate) struct SnapshotHub {
    subscribers: IndexMap<SubscriberId, Slot>,
    next_id: u64,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self {
            subscribers: IndexMap::new(),
            next_id: 0,
        }
    }

    /// Register a subscriber and queue `current` for it immediately.
    pub fn subscribe(&mut self, current: &Arc<GameSnapshot>) -> Subscription {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = crossbeam_channel::bounded(1);
        // Cannot fail: the slot is empty and we hold the receiver.
        let _ = tx.try_send(Arc::clone(current));
        let alive = Arc::new(());
        self.subscribers.insert(
            id,
            Slot {
                tx,
                stale: rx.clone(),
                alive: Arc::downgrade(&alive),
            },
        );
        Subscription {
            id,
            receiver: rx,
            _alive: alive,
        }
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.shift_remove(&id).is_some()
    }

    /// Offer `snapshot` to every subscriber, pruning any whose receiver
    /// has been dropped. Returns the number of deliveries.
    pub fn publish(&mut self, snapshot: &Arc<GameSnapshot>) -> usize {
        self.subscribers.retain(|_, slot| slot.offer(snapshot));
        self.subscribers.len()
    }

    /// Drop every subscriber, disconnecting their channels.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }
}
