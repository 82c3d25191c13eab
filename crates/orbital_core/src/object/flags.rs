//! # Object Flags
//!
//! One authoritative flag set per object. Most bits are plain attributes;
//! [`ObjectFlags::COLLIDES`] and [`ObjectFlags::NOT_IN_COLL`] mirror the
//! collision gateway's registration state and must only change through
//! `ObjectPool::set_flags`.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bit set of per-object attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ObjectFlags(pub u32);

impl ObjectFlags {
    /// No flags.
    pub const EMPTY: Self = Self(0);

    /// Takes no damage.
    pub const INVULNERABLE: Self = Self(1 << 0);

    /// Not targeted by AI.
    pub const PROTECTED: Self = Self(1 << 1);

    /// Not targeted by AI beams.
    pub const BEAM_PROTECTED: Self = Self(1 << 2);

    /// Shield quadrants are ignored.
    pub const NO_SHIELDS: Self = Self(1 << 3);

    /// Can be targeted like a bomb.
    pub const TARGETABLE_AS_BOMB: Self = Self(1 << 4);

    /// Not targeted by AI flak.
    pub const FLAK_PROTECTED: Self = Self(1 << 5);

    /// Not targeted by AI lasers.
    pub const LASER_PROTECTED: Self = Self(1 << 6);

    /// Not targeted by AI missiles.
    pub const MISSILE_PROTECTED: Self = Self(1 << 7);

    /// Physics skipped while hull strength is positive.
    pub const IMMOBILE: Self = Self(1 << 8);

    /// Participates in collision detection.
    pub const COLLIDES: Self = Self(1 << 9);

    /// Soft delete; reaped at the start of the next tick.
    pub const SHOULD_BE_DEAD: Self = Self(1 << 10);

    /// Not (yet) registered with the collision gateway.
    pub const NOT_IN_COLL: Self = Self(1 << 11);

    /// Position came from the network this frame.
    pub const JUST_UPDATED: Self = Self(1 << 12);

    /// Dock propagation already moved this object this tick.
    pub const DOCKED_ALREADY_HANDLED: Self = Self(1 << 13);

    /// The local player's ship.
    pub const PLAYER_SHIP: Self = Self(1 << 14);

    /// Ship a player may take control of.
    pub const COULD_BE_PLAYER: Self = Self(1 << 15);

    /// Owning collaborator says the object may be reaped under pool pressure.
    pub const RECLAIMABLE: Self = Self(1 << 16);

    /// Content-facing flag names, in the order they are listed to designers.
    pub const NAMED: [(&'static str, Self); 10] = [
        ("invulnerable", Self::INVULNERABLE),
        ("protect-ship", Self::PROTECTED),
        ("beam-protect-ship", Self::BEAM_PROTECTED),
        ("no-shields", Self::NO_SHIELDS),
        ("targetable-as-bomb", Self::TARGETABLE_AS_BOMB),
        ("flak-protect-ship", Self::FLAK_PROTECTED),
        ("laser-protect-ship", Self::LASER_PROTECTED),
        ("missile-protect-ship", Self::MISSILE_PROTECTED),
        ("immobile", Self::IMMOBILE),
        ("collides", Self::COLLIDES),
    ];

    /// Looks up a content-facing flag by name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, flag)| *flag)
    }

    /// True if every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True if no bits are set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns a copy with `other` set.
    #[inline]
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns a copy with `other` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Sets `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears `other`.
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Sets or clears `other`.
    #[inline]
    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl BitOr for ObjectFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for ObjectFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut flags = ObjectFlags::COLLIDES | ObjectFlags::IMMOBILE;
        assert!(flags.contains(ObjectFlags::COLLIDES));

        flags.remove(ObjectFlags::COLLIDES);
        assert!(!flags.contains(ObjectFlags::COLLIDES));
        assert!(flags.contains(ObjectFlags::IMMOBILE));

        flags.set(ObjectFlags::SHOULD_BE_DEAD, true);
        assert!(flags.intersects(ObjectFlags::SHOULD_BE_DEAD | ObjectFlags::PROTECTED));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ObjectFlags::from_name("Collides"), Some(ObjectFlags::COLLIDES));
        assert_eq!(
            ObjectFlags::from_name("beam-protect-ship"),
            Some(ObjectFlags::BEAM_PROTECTED)
        );
        // Engine-internal bits are not content-facing.
        assert_eq!(ObjectFlags::from_name("should-be-dead"), None);
    }
}
