//! Entity identifiers

/// Entity handle
///
/// Opaque and totally ordered. The collision pipeline only uses it to order
/// and deduplicate pairs and as the key passed to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

impl EntityId {
    /// Wrap a raw handle
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw handle
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Small integer tag naming the kind of entity; indexes the handler table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntityType(pub u16);

impl EntityType {
    /// Position in the handler table
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Map or partition an entity lives on. Entities on different maps never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MapId(pub u16);
