//! Property store holding configurations and the latest value per identity.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use vhal_types::{PropertyConfig, PropertyId, PropertyValue, ValueKind};

/// Callback run after a write changes the stored value.
pub type OnChangeCallback = Arc<dyn Fn(&PropertyValue) + Send + Sync>;

/// Errors returned by [`PropertyStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No value is stored for the identity.
    #[error("no value stored for {id}")]
    NotFound {
        /// Identity that was read.
        id: PropertyId,
    },
    /// The property is unknown or the area is not configured for it.
    #[error("{id} is not a registered property area")]
    NotRegistered {
        /// Identity that was written.
        id: PropertyId,
    },
    /// The payload variant differs from the configured kind.
    #[error("{id} expects {expected} values, got {actual}")]
    TypeMismatch {
        /// Identity that was written.
        id: PropertyId,
        /// Kind pinned by the configuration.
        expected: ValueKind,
        /// Kind carried by the rejected value.
        actual: ValueKind,
    },
    /// The incoming value is older than the stored one.
    #[error("stale write to {id}: stored timestamp {stored} is newer than {incoming}")]
    Stale {
        /// Identity that was written.
        id: PropertyId,
        /// Timestamp currently stored.
        stored: i64,
        /// Timestamp of the rejected value.
        incoming: i64,
    },
}

/// Storage seam used by the gateway and the request resolvers.
pub trait PropertyStore: Send + Sync {
    /// Registers (or replaces) the configuration of one property.
    fn register_property(&self, config: PropertyConfig);

    /// Reads the latest value for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when nothing is stored.
    fn read_value(&self, id: PropertyId) -> Result<PropertyValue, StoreError>;

    /// Writes `value`.
    ///
    /// With `update_status` false a previously stored status is kept.
    ///
    /// # Errors
    ///
    /// Rejects unknown identities, payloads of the wrong kind and values older
    /// than the stored one.
    fn write_value(&self, value: PropertyValue, update_status: bool) -> Result<(), StoreError>;

    /// Every stored value ordered by identity.
    fn read_all_values(&self) -> Vec<PropertyValue>;

    /// Every registered configuration ordered by property.
    fn all_configs(&self) -> Vec<PropertyConfig>;

    /// Installs the callback run after value-changing writes.
    fn set_on_change(&self, callback: OnChangeCallback);
}

impl<T> PropertyStore for Arc<T>
where
    T: PropertyStore + ?Sized,
{
    fn register_property(&self, config: PropertyConfig) {
        (**self).register_property(config);
    }

    fn read_value(&self, id: PropertyId) -> Result<PropertyValue, StoreError> {
        (**self).read_value(id)
    }

    fn write_value(&self, value: PropertyValue, update_status: bool) -> Result<(), StoreError> {
        (**self).write_value(value, update_status)
    }

    fn read_all_values(&self) -> Vec<PropertyValue> {
        (**self).read_all_values()
    }

    fn all_configs(&self) -> Vec<PropertyConfig> {
        (**self).all_configs()
    }

    fn set_on_change(&self, callback: OnChangeCallback) {
        (**self).set_on_change(callback);
    }
}

/// In-memory [`PropertyStore`].
///
/// Change notifications run outside every lock but in the order the writes
/// were applied: each changing write draws a ticket while it holds the value
/// map and waits for its turn before notifying. An on-change callback must
/// therefore not write to the same store.
#[derive(Default)]
pub struct MemoryPropertyStore {
    configs: RwLock<BTreeMap<i32, PropertyConfig>>,
    values: RwLock<BTreeMap<PropertyId, PropertyValue>>,
    on_change: RwLock<Option<OnChangeCallback>>,
    tickets: AtomicU64,
    turn: Mutex<u64>,
    turn_changed: Condvar,
}

/// Ends a notification turn when dropped, even if the callback panicked.
struct NotifyTurn<'a> {
    store: &'a MemoryPropertyStore,
}

impl Drop for NotifyTurn<'_> {
    fn drop(&mut self) {
        *self
            .store
            .turn
            .lock()
            .unwrap_or_else(|poison| poison.into_inner()) += 1;
        self.store.turn_changed.notify_all();
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poison| poison.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poison| poison.into_inner())
}

impl MemoryPropertyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(&self, value: &PropertyValue) -> Result<(), StoreError> {
        let configs = read(&self.configs);
        let id = value.id;
        let config = configs
            .get(&id.property)
            .filter(|config| config.has_area(id.area))
            .ok_or(StoreError::NotRegistered { id })?;
        let actual = value.value.kind();
        if actual != config.value_kind {
            return Err(StoreError::TypeMismatch {
                id,
                expected: config.value_kind,
                actual,
            });
        }
        Ok(())
    }

    /// Stores `value` and returns it, with its notification ticket, when the
    /// payload or status changed.
    fn apply(
        &self,
        mut value: PropertyValue,
        update_status: bool,
    ) -> Result<Option<(PropertyValue, u64)>, StoreError> {
        let mut values = write(&self.values);
        let changed = match values.get(&value.id) {
            Some(stored) => {
                if value.timestamp < stored.timestamp {
                    return Err(StoreError::Stale {
                        id: value.id,
                        stored: stored.timestamp,
                        incoming: value.timestamp,
                    });
                }
                if !update_status {
                    value.status = stored.status;
                }
                stored.value != value.value || stored.status != value.status
            }
            None => true,
        };
        values.insert(value.id, value.clone());
        if !changed {
            return Ok(None);
        }
        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);
        Ok(Some((value, ticket)))
    }

    fn wait_for_turn(&self, ticket: u64) -> NotifyTurn<'_> {
        let turn = self.turn.lock().unwrap_or_else(|poison| poison.into_inner());
        drop(
            self.turn_changed
                .wait_while(turn, |current| *current != ticket)
                .unwrap_or_else(|poison| poison.into_inner()),
        );
        NotifyTurn { store: self }
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn register_property(&self, config: PropertyConfig) {
        write(&self.configs).insert(config.property, config);
    }

    fn read_value(&self, id: PropertyId) -> Result<PropertyValue, StoreError> {
        read(&self.values)
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    fn write_value(&self, value: PropertyValue, update_status: bool) -> Result<(), StoreError> {
        self.validate(&value)?;
        let Some((changed, ticket)) = self.apply(value, update_status)? else {
            return Ok(());
        };
        let _turn = self.wait_for_turn(ticket);
        let callback = read(&self.on_change).clone();
        if let Some(callback) = callback {
            callback(&changed);
        }
        Ok(())
    }

    fn read_all_values(&self) -> Vec<PropertyValue> {
        read(&self.values).values().cloned().collect()
    }

    fn all_configs(&self) -> Vec<PropertyConfig> {
        read(&self.configs).values().cloned().collect()
    }

    fn set_on_change(&self, callback: OnChangeCallback) {
        *write(&self.on_change) = Some(callback);
    }
}
