//! # Object Kinds
//!
//! The closed set of world object kinds. The discriminant doubles as the
//! index into the dispatch table, so the order here is load-bearing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind tag of a world object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectKind {
    /// Free slot. Never dispatched.
    #[default]
    None = 0,
    /// Ship.
    Ship,
    /// Weapon projectile or missile.
    Weapon,
    /// Explosion / warp effect.
    Fireball,
    /// Player start point.
    Start,
    /// Waypoint.
    Waypoint,
    /// Hull debris.
    Debris,
    /// Countermeasure (legacy kind; live countermeasures are weapons).
    Countermeasure,
    /// Dead player ship kept for camera and network references.
    Ghost,
    /// Editor point.
    Point,
    /// Shockwave.
    Shockwave,
    /// Wing marker.
    Wing,
    /// Camera-only observer.
    Observer,
    /// Asteroid.
    Asteroid,
    /// Jump node.
    JumpNode,
    /// Beam weapon.
    Beam,
}

impl ObjectKind {
    /// Number of kinds, including `None`.
    pub const COUNT: usize = 16;

    /// Every kind in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::None,
        Self::Ship,
        Self::Weapon,
        Self::Fireball,
        Self::Start,
        Self::Waypoint,
        Self::Debris,
        Self::Countermeasure,
        Self::Ghost,
        Self::Point,
        Self::Shockwave,
        Self::Wing,
        Self::Observer,
        Self::Asteroid,
        Self::JumpNode,
        Self::Beam,
    ];

    /// Table index of this kind.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up a kind by table index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Human-readable name, as shown in debug overlays and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Ship => "Ship",
            Self::Weapon => "Weapon",
            Self::Fireball => "Fireball",
            Self::Start => "Start",
            Self::Waypoint => "Waypoint",
            Self::Debris => "Debris",
            Self::Countermeasure => "Countermeasure",
            Self::Ghost => "Ghost",
            Self::Point => "Point",
            Self::Shockwave => "Shockwave",
            Self::Wing => "Wing",
            Self::Observer => "Observer",
            Self::Asteroid => "Asteroid",
            Self::JumpNode => "Jump Node",
            Self::Beam => "Beam",
        }
    }

    /// True for every kind except `None`.
    #[inline]
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_table_order() {
        for (i, kind) in ObjectKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(ObjectKind::from_index(i), Some(*kind));
        }
        assert_eq!(ObjectKind::from_index(ObjectKind::COUNT), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(ObjectKind::JumpNode.to_string(), "Jump Node");
        assert_eq!(ObjectKind::None.name(), "None");
        assert!(!ObjectKind::None.is_live());
        assert!(ObjectKind::Ghost.is_live());
    }
}
