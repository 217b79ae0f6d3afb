//! Fixture categories and collision filtering

use bitflags::bitflags;

bitflags! {
    /// Category bits carried by every fixture
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct CollisionCategory: u16 {
        /// Solid collider
        const SOLID = 0x0001;
        /// Trigger volume
        const SENSOR = 0x0002;
        /// Presence-only fixture of a body with neither collider nor trigger
        const PHANTOM = 0x0004;
    }
}

/// Category and mask of one fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureFilter {
    /// What this fixture is
    pub category: CollisionCategory,
    /// What this fixture collides with
    pub mask: CollisionCategory,
}

impl FixtureFilter {
    /// Solid colliders touch other solids only
    pub const fn solid() -> Self {
        Self {
            category: CollisionCategory::SOLID,
            mask: CollisionCategory::SOLID,
        }
    }
    
    /// Triggers overlap other triggers only
    pub const fn sensor() -> Self {
        Self {
            category: CollisionCategory::SENSOR,
            mask: CollisionCategory::SENSOR,
        }
    }
    
    /// Phantoms interact with nothing
    pub const fn phantom() -> Self {
        Self {
            category: CollisionCategory::PHANTOM,
            mask: CollisionCategory::empty(),
        }
    }
    
    /// Both fixtures must accept each other's category
    pub fn should_collide(&self, other: &Self) -> bool {
        self.category.intersects(other.mask) && other.category.intersects(self.mask)
    }
    
    /// Whether this is a presence-only fixture
    pub fn is_phantom(&self) -> bool {
        self.category.contains(CollisionCategory::PHANTOM)
    }
}

impl Default for FixtureFilter {
    fn default() -> Self {
        Self::solid()
    }
}
