use std::time::{Duration, Instant};

use tundra_shared::{Float3, Quat};

/// Remembers the last observer update that went out. The first update is
/// always sent; later ones need the period to have passed and the observer
/// to have moved or turned.
#[derive(Debug, Clone, Default)]
pub struct ObserverHeartbeat {
    last_sent: Option<SentObserver>,
}

#[derive(Debug, Clone, Copy)]
struct SentObserver {
    at: Instant,
    position: Float3,
    orientation: Quat,
}

impl ObserverHeartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_send(&self, now: Instant, period: Duration, position: Float3, orientation: Quat) -> bool {
        let Some(last) = &self.last_sent else {
            return true;
        };
        if now.saturating_duration_since(last.at) < period {
            return false;
        }
        last.position != position || last.orientation != orientation
    }

    pub fn mark_sent(&mut self, now: Instant, position: Float3, orientation: Quat) {
        self.last_sent = Some(SentObserver {
            at: now,
            position,
            orientation,
        });
    }

    pub fn last_sent_at(&self) -> Option<Instant> {
        self.last_sent.map(|last| last.at)
    }

    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}
