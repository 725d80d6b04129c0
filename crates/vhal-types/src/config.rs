//! Static property configuration and initial values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::{GLOBAL_AREA, is_global_property};
use crate::value::{TaggedValue, ValueKind};

/// Access mode advertised for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyAccess {
    /// Host may only read.
    Read,
    /// Host may only write.
    Write,
    /// Host may read and write.
    ReadWrite,
}

/// How a property changes over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMode {
    /// Value never changes.
    Static,
    /// Value changes on events.
    OnChange,
    /// Value is sampled continuously.
    Continuous,
}

/// Configuration of one property as advertised to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Vehicle property identifier.
    pub property: i32,
    /// Access mode.
    pub access: PropertyAccess,
    /// Change mode.
    pub change_mode: ChangeMode,
    /// Payload kind every value of this property must carry.
    pub value_kind: ValueKind,
    /// Configured zones. Empty for properties served on the global area.
    #[serde(default)]
    pub area_ids: Vec<i32>,
}

impl PropertyConfig {
    /// Areas values may be stored for.
    ///
    /// Global properties and properties without configured zones use the
    /// global area only.
    #[must_use]
    pub fn areas(&self) -> Vec<i32> {
        if is_global_property(self.property) || self.area_ids.is_empty() {
            vec![GLOBAL_AREA]
        } else {
            self.area_ids.clone()
        }
    }

    /// Whether `area` is one of [`Self::areas`].
    #[must_use]
    pub fn has_area(&self, area: i32) -> bool {
        self.areas().contains(&area)
    }
}

/// A configuration together with its initial values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDeclaration {
    /// Advertised configuration.
    pub config: PropertyConfig,
    /// Initial value shared by every area, used when no per-area values exist.
    #[serde(default)]
    pub initial_value: Option<TaggedValue>,
    /// Initial values keyed by area.
    #[serde(default)]
    pub initial_area_values: BTreeMap<i32, TaggedValue>,
}

impl ConfigDeclaration {
    /// Declares a configuration without initial values.
    #[must_use]
    pub const fn new(config: PropertyConfig) -> Self {
        Self {
            config,
            initial_value: None,
            initial_area_values: BTreeMap::new(),
        }
    }

    /// Sets the shared initial value.
    #[must_use]
    pub fn with_initial_value(mut self, value: TaggedValue) -> Self {
        self.initial_value = Some(value);
        self
    }

    /// Sets the initial value for one area.
    #[must_use]
    pub fn with_area_value(mut self, area: i32, value: TaggedValue) -> Self {
        self.initial_area_values.insert(area, value);
        self
    }

    /// Initial value for `area`, if one was declared.
    ///
    /// Per-area values take precedence; the shared value applies only when no
    /// per-area values are declared at all.
    #[must_use]
    pub fn initial_value_for(&self, area: i32) -> Option<&TaggedValue> {
        if self.initial_area_values.is_empty() {
            self.initial_value.as_ref()
        } else {
            self.initial_area_values.get(&area)
        }
    }
}
