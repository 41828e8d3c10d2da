//! # Side Events
//!
//! Things that happened during a frame, for collaborators that do not take
//! part in the simulation (audio, HUD, logging).
//!
//! ```text
//! ┌──────────────┐      ┌─────────────┐      ┌──────────────┐
//! │   Systems &  │─────>│   Bounded   │─────>│  Audio / HUD │
//! │   Reactions  │      │   Channel   │      │  (host side) │
//! └──────────────┘      └─────────────┘      └──────────────┘
//! ```
//!
//! The channel is bounded. A full channel drops the event: the simulation
//! never blocks on a slow consumer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use keystone_core::EntityId;
use keystone_shared::{Category, Side};

use crate::state::GameState;

/// Events emitted by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    // =========================================================================
    // Entity Events
    // =========================================================================
    /// An entity entered the store.
    EntitySpawned {
        /// New entity.
        entity_id: EntityId,
        /// Its category.
        category: Category,
    },

    /// An entity left the store.
    EntityDespawned {
        /// Removed entity.
        entity_id: EntityId,
    },

    /// An entity lost health.
    EntityDamaged {
        /// Entity that was hit.
        entity_id: EntityId,
        /// Health after the hit.
        health_remaining: i32,
    },

    /// An entity's health reached zero.
    EntityDied {
        /// Entity that died.
        entity_id: EntityId,
        /// Its category.
        category: Category,
    },

    // =========================================================================
    // Player Events
    // =========================================================================
    /// The player touched a pickup.
    ItemCollected {
        /// Kind of pickup.
        category: Category,
        /// Coins or health gained.
        amount: u32,
    },

    /// The sword came out.
    SwordSwung,

    /// An arrow left the bow.
    ArrowFired,

    /// A bomb was dropped.
    BombPlaced,

    // =========================================================================
    // Room Events
    // =========================================================================
    /// A switch changed state.
    SwitchToggled {
        /// The switch.
        entity_id: EntityId,
        /// New state.
        pressed: bool,
    },

    /// Doors in the room opened or closed.
    DoorsChanged {
        /// New state.
        open: bool,
    },

    /// A slide toward `side` started.
    TransitionStarted {
        /// Edge crossed.
        side: Side,
        /// Destination, 0 for a bounce.
        next_room: u32,
    },

    /// A room became current.
    RoomEntered {
        /// Room id.
        room: u32,
    },

    /// The state machine moved.
    StateChanged {
        /// State left.
        from: GameState,
        /// State entered.
        to: GameState,
    },
}

/// Event bus: one bounded channel plus a drop counter.
pub struct EventBus {
    /// Sender end - held by event producers.
    sender: Sender<GameEvent>,
    /// Receiver end - held by event consumers.
    receiver: Receiver<GameEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight before new ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Events dropped because the channel was full.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<GameEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Sends an event (non-blocking).
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: GameEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(?event, dropped, "event channel full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Events dropped because the channel was full.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<GameEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<GameEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_and_drain() {
        let bus = EventBus::new(8);
        let sender = bus.sender();
        let receiver = bus.receiver();

        assert!(sender.send(GameEvent::SwordSwung));
        assert!(sender.send(GameEvent::RoomEntered { room: 2 }));
        assert_eq!(receiver.pending_count(), 2);

        let events = receiver.drain();
        assert_eq!(events, vec![GameEvent::SwordSwung, GameEvent::RoomEntered { room: 2 }]);
        assert!(!receiver.has_events());
    }

    #[test]
    fn test_full_channel_drops_and_counts() {
        let bus = EventBus::new(1);
        let sender = bus.sender();

        assert!(sender.send(GameEvent::ArrowFired));
        assert!(!sender.send(GameEvent::BombPlaced));
        assert!(!sender.send(GameEvent::BombPlaced));
        assert_eq!(bus.dropped_count(), 2);

        assert_eq!(bus.receiver().try_recv(), Some(GameEvent::ArrowFired));
        assert!(sender.send(GameEvent::BombPlaced));
    }
}
