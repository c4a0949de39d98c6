//! Collision layers for filtering the broad phase
//!
//! Every collider carries a set of layers. A layer is one bit; a collider may
//! be on several. Two colliders are narrow-phase tested only when their sets
//! share at least one layer.

use bitflags::bitflags;

bitflags! {
    /// Set of single-bit collision layers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Layer every new collider starts on
        const DEFAULT = 1 << 0;
        /// Player characters
        const PLAYER = 1 << 1;
        /// Enemy characters
        const ENEMY = 1 << 2;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 3;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 4;
        /// Trigger volumes
        const TRIGGER = 1 << 5;
        /// Debris and small objects
        const DEBRIS = 1 << 6;
        /// Pickups and collectibles
        const PICKUP = 1 << 7;

        // Bits 8-31 are free for games to name
        const _ = !0;
    }
}

impl CollisionLayers {
    /// A user-defined layer by bit index (0-31)
    pub const fn custom(bit: u32) -> Option<Self> {
        if bit < 32 {
            Some(Self::from_bits_retain(1 << bit))
        } else {
            None
        }
    }

    /// Check whether two layer sets allow a collision test
    #[inline]
    pub const fn should_collide(self, other: Self) -> bool {
        self.bits() & other.bits() != 0
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A layer value is valid when exactly one bit is set
#[inline]
pub const fn is_valid_layer(bits: u32) -> bool {
    bits != 0 && bits & (bits - 1) == 0
}
