//! Fixed-width slot bit-set.
//!
//! A [`SlotMask`] is used two ways at once: as a set of slots (equality and
//! subset tests) and as an unsigned integer (ordering). The ordering is the
//! plain numeric order of the underlying word, so `{3, 4}` (24) is greater
//! than `{0, 1}` (3) even though both hold two slots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::Slot;

/// Number of bits available in a single mask word.
pub const MASK_BITS: u8 = 64;

/// Bit-set over slot indices, bit `i` set means slot `i` is a member.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SlotMask(u64);

impl SlotMask {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Mask with the lowest `count` bits set.
    ///
    /// `count` is clamped to [`MASK_BITS`].
    pub const fn low_bits(count: u8) -> Self {
        if count >= MASK_BITS {
            Self(u64::MAX)
        } else {
            Self((1u64 << count) - 1)
        }
    }

    pub const fn contains(&self, slot: Slot) -> bool {
        slot.index() < MASK_BITS && self.0 & (1u64 << slot.index()) != 0
    }

    /// Sets or clears the bit for `slot`. Out-of-range slots are ignored.
    pub fn set(&mut self, slot: Slot, member: bool) {
        if slot.index() >= MASK_BITS {
            return;
        }
        if member {
            self.0 |= 1u64 << slot.index();
        } else {
            self.0 &= !(1u64 << slot.index());
        }
    }

    pub fn insert(&mut self, slot: Slot) {
        self.set(slot, true);
    }

    pub fn remove(&mut self, slot: Slot) {
        self.set(slot, false);
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_subset_of(&self, other: SlotMask) -> bool {
        self.0 & !other.0 == 0
    }

    /// Lowest slot that is *not* a member, limited to the first `width` bits.
    ///
    /// Inverts the mask, isolates the lowest set bit and takes its position.
    /// Returns `None` when all `width` bits are occupied.
    pub fn first_free(&self, width: u8) -> Option<Slot> {
        let free = !self.0 & Self::low_bits(width).0;
        if free == 0 {
            return None;
        }
        let lowest = free & free.wrapping_neg();
        Some(Slot::new(lowest.trailing_zeros() as u8))
    }

    /// Iterates member slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Slot> {
        let bits = self.0;
        (0..MASK_BITS)
            .filter(move |i| bits & (1u64 << i) != 0)
            .map(Slot::new)
    }
}

impl fmt::Binary for SlotMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

impl fmt::Display for SlotMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}
