//! Type-erased component storage: the identity service, per-type
//! [`Column`]s, and the [`ComponentTable`] that owns all of them.

mod column;
mod table;

pub use column::Column;
pub use table::ComponentTable;

use crate::util::FastMap;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::sync::Mutex;

/// A process-wide numeric identity for a component type.
///
/// Two calls to [`type_id::<T>`] for the same `T` always return the same
/// id, and two different `T`s always return different ids, for the
/// lifetime of the process. Ids are assigned lazily, in the order their
/// types are first seen, and are never reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(u32);

impl ComponentTypeId {
    #[cfg(test)]
    pub(crate) fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// The raw numeric value of this id.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentType({})", self.0)
    }
}

/// Marker trait for values storable as components.
///
/// A component only needs to be cloneable (standing in for the storage
/// contract's "copy-constructible, move-constructible") and safely shared
/// across threads at the type level; the crate itself never mutates a
/// `Registry` from more than one thread at a time, but `Send + Sync` keeps
/// the erased cells usable from a host that does move a whole `Registry`
/// across threads between single-threaded sessions.
pub trait Component: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Component for T {}

struct IdTable {
    ids: FastMap<TypeId, ComponentTypeId>,
    next: u32,
}

static ID_TABLE: Lazy<Mutex<IdTable>> = Lazy::new(|| {
    Mutex::new(IdTable {
        ids: FastMap::default(),
        next: 1,
    })
});

/// Returns the process-wide [`ComponentTypeId`] for `T`, assigning one on
/// first use.
pub fn type_id<T: Component>() -> ComponentTypeId {
    let key = TypeId::of::<T>();
    let mut table = ID_TABLE.lock().unwrap();
    if let Some(id) = table.ids.get(&key) {
        return *id;
    }
    let id = ComponentTypeId(table.next);
    table.next += 1;
    table.ids.insert(key, id);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Position {
        #[allow(dead_code)]
        x: f32,
        #[allow(dead_code)]
        y: f32,
    }

    #[derive(Clone)]
    struct Velocity;

    #[test]
    fn same_type_yields_same_id() {
        assert_eq!(type_id::<Position>(), type_id::<Position>());
    }

    #[test]
    fn distinct_types_yield_distinct_ids() {
        assert_ne!(type_id::<Position>(), type_id::<Velocity>());
    }
}
