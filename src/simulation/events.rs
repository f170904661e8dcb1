//! Bounded event log kept by each system.
//!
//! Only the newest `capacity` events are retained; pushing onto a full log
//! evicts the oldest entry.

use std::collections::VecDeque;

use serde::Serialize;

use super::star::StellarStage;

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Formation {
        object: String,
        kind: String,
    },
    Replacement {
        object: String,
    },
    Removal {
        object: String,
    },
    Collision {
        objects: [String; 2],
        survivor: String,
        energy: f64,
        relative_speed: f64,
    },
    StageTransition {
        object: String,
        from: StellarStage,
        to: StellarStage,
    },
    TransitArrival {
        object: String,
    },
}

/// An event stamped with the system age at which it was recorded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemEvent {
    pub age: f64,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<SystemEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn push(&mut self, age: f64, kind: EventKind) {
        if self.capacity == 0 {
            return;
        }
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(SystemEvent { age, kind });
    }

    /// Newest first, at most `limit` events (all of them for `None`)
    pub fn recent(&self, limit: Option<usize>) -> Vec<SystemEvent> {
        let take = limit.unwrap_or(self.events.len());
        self.events.iter().rev().take(take).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
