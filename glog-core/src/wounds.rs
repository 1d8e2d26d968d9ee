//! The fatal-wound track.
//!
//! Four slots of escalating severity, index 0 the least severe and
//! index 3 the most. New fatal wounds land in slot 3; each turn's tick
//! rolls the track toward slot 0, where wounds accumulate as lasting
//! harm.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of slots on the track.
pub const WOUND_SLOTS: usize = 4;

/// A character's fatal-wound track.
///
/// Slot values are unbounded non-negative counts; reading slot 3
/// against a death threshold is the caller's concern, not the track's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WoundTrack {
    slots: [u32; WOUND_SLOTS],
}

impl WoundTrack {
    /// An empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a track from a persisted snapshot.
    pub fn from_slots(slots: [u32; WOUND_SLOTS]) -> Self {
        WoundTrack { slots }
    }

    /// The current snapshot.
    pub fn slots(&self) -> [u32; WOUND_SLOTS] {
        self.slots
    }

    /// Wounds across all slots.
    pub fn total(&self) -> u32 {
        self.slots.iter().sum()
    }

    /// Wounds in the most severe slot.
    pub fn fatal(&self) -> u32 {
        self.slots[3]
    }

    pub fn is_clear(&self) -> bool {
        self.slots == [0; WOUND_SLOTS]
    }

    /// Adds one fatal wound to slot 3.
    ///
    /// Every new wound lands in the most severe slot regardless of how
    /// it was inflicted; ticking is what spreads severity over time.
    pub fn add(&mut self) -> [u32; WOUND_SLOTS] {
        self.slots[3] += 1;
        self.slots
    }

    /// Adds `count` fatal wounds at once, with the same net effect as
    /// `count` calls to [`add`](Self::add).
    pub fn add_many(&mut self, count: u32) -> [u32; WOUND_SLOTS] {
        self.slots[3] += count;
        self.slots
    }

    /// Heals one wound: the first non-empty slot, scanning from least
    /// severe, loses one. At most one slot changes; an empty track is a
    /// no-op.
    pub fn remove(&mut self) -> [u32; WOUND_SLOTS] {
        for slot in self.slots.iter_mut() {
            if *slot > 0 {
                *slot -= 1;
                break;
            }
        }
        self.slots
    }

    /// Advances the track one turn in a single atomic step: slot 1
    /// collapses into slot 0, slots 2 and 3 shift down, and slot 3
    /// drains. All reads use the pre-tick snapshot.
    pub fn tick(&mut self) -> [u32; WOUND_SLOTS] {
        let [a, b, c, d] = self.slots;
        self.slots = [a + b, c, d, 0];
        self.slots
    }
}

impl fmt::Display for WoundTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.slots;
        write!(f, "[{a}, {b}, {c}, {d}]")
    }
}
