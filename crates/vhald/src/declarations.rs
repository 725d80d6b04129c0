//! Built-in property declarations served by the daemon.

use vhal_types::{
    ChangeMode, ConfigDeclaration, PropertyAccess, PropertyConfig, TaggedValue, ValueKind,
};

/// HVAC fan speed, seat-zoned in the vehicle property map.
pub const HVAC_FAN_SPEED: i32 = 0x1540_0500;
/// Vehicle manufacturer.
pub const INFO_MAKE: i32 = 0x1110_0101;
/// Currently selected gear.
pub const GEAR_SELECTION: i32 = 0x1140_0400;

/// Properties whose writes are forwarded to the agent.
pub const FORWARDED_PROPERTIES: [i32; 1] = [HVAC_FAN_SPEED];

/// Declarations used to seed the store at start-up.
#[must_use]
pub fn default_declarations() -> Vec<ConfigDeclaration> {
    vec![
        ConfigDeclaration::new(PropertyConfig {
            property: HVAC_FAN_SPEED,
            access: PropertyAccess::ReadWrite,
            change_mode: ChangeMode::OnChange,
            value_kind: ValueKind::Int32,
            area_ids: Vec::new(),
        })
        .with_initial_value(TaggedValue::Int32(0)),
        ConfigDeclaration::new(PropertyConfig {
            property: INFO_MAKE,
            access: PropertyAccess::Read,
            change_mode: ChangeMode::Static,
            value_kind: ValueKind::String,
            area_ids: Vec::new(),
        })
        .with_initial_value(TaggedValue::String(String::from("Toy Vehicle"))),
        ConfigDeclaration::new(PropertyConfig {
            property: GEAR_SELECTION,
            access: PropertyAccess::Read,
            change_mode: ChangeMode::OnChange,
            value_kind: ValueKind::Int32,
            area_ids: Vec::new(),
        })
        .with_initial_value(TaggedValue::Int32(0x0004)),
    ]
}
