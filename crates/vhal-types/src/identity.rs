use std::fmt;

use serde::{Deserialize, Serialize};

/// Area identifier used by global (non-zoned) properties.
pub const GLOBAL_AREA: i32 = 0;

const AREA_TYPE_MASK: i32 = 0x0f00_0000;
const AREA_TYPE_GLOBAL: i32 = 0x0100_0000;

/// Identity of a single property instance: the property and the zone it
/// applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId {
    /// Vehicle property identifier.
    pub property: i32,
    /// Area (zone) identifier, [`GLOBAL_AREA`] for global properties.
    pub area: i32,
}

impl PropertyId {
    /// Builds an identity for the given property and area.
    #[must_use]
    pub const fn new(property: i32, area: i32) -> Self {
        Self { property, area }
    }

    /// Builds the identity of a global property.
    #[must_use]
    pub const fn global(property: i32) -> Self {
        Self::new(property, GLOBAL_AREA)
    }

    /// Whether the identity addresses the global area.
    #[must_use]
    pub const fn is_global_area(self) -> bool {
        self.area == GLOBAL_AREA
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:#x}/{:#x}", self.property, self.area)
    }
}

/// Returns `true` when the area-type bits of `property` mark it as global.
#[must_use]
pub const fn is_global_property(property: i32) -> bool {
    property & AREA_TYPE_MASK == AREA_TYPE_GLOBAL
}
