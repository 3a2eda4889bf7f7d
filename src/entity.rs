//! [`EntityId`] and the [`EntityTable`] that tracks which ids are live and
//! what component types each one carries.

use crate::component::ComponentTypeId;
use crate::util::FastMap;
use std::collections::HashSet;

/// An opaque numeric identity.
///
/// Zero is never issued: [`EntityTable::reserve`] hands out ids starting at
/// 1 and never reuses one within a process lifetime, even after the entity
/// that held it is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// The raw numeric value of this id.
    ///
    /// Mostly useful for logging or building an external index; comparing
    /// two `EntityId`s directly is almost always what you want instead.
    pub fn value(self) -> u32 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn test_new(n: u32) -> Self {
        Self(n)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Storage of entities and the set of component types each one carries.
///
/// An entity is *live* iff it has an entry here. A *reserved* id
/// ([`EntityTable::reserve`] was called but [`EntityTable::instantiate`]
/// was not) has no entry and is invisible to every other method, including
/// [`EntityTable::has`].
#[derive(Debug)]
pub struct EntityTable {
    next_id: u32,
    members: FastMap<EntityId, HashSet<ComponentTypeId>>,
}

impl Default for EntityTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTable {
    /// Create an empty table. The first id returned by [`Self::reserve`] or
    /// [`Self::create`] is `1`.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            members: FastMap::default(),
        }
    }

    /// Return the next id and increment the counter, *without* making the
    /// entity live.
    ///
    /// The id is immediately usable as the target of component writes (see
    /// [`crate::Registry::emplace`]), but is invisible to queries and to
    /// [`Self::has`] until [`Self::instantiate`] is called on it. This
    /// split lets an external command-buffer-style collaborator hand out
    /// an id synchronously while deferring the entity's actual appearance
    /// in the world to a later batch commit.
    pub fn reserve(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Make a previously reserved id live by giving it an empty membership
    /// set. Idempotent: instantiating an id that is already live does not
    /// reset its membership set.
    pub fn instantiate(&mut self, id: EntityId) {
        self.members.entry(id).or_default();
    }

    /// Reserve a fresh id and instantiate it in one step.
    pub fn create(&mut self) -> EntityId {
        let id = self.reserve();
        self.instantiate(id);
        id
    }

    /// If `id` is live, remove it and return its membership set. Returns
    /// `None`, and does nothing, if `id` is not live (never reserved, only
    /// reserved-not-instantiated, or already destroyed).
    pub fn remove(&mut self, id: EntityId) -> Option<HashSet<ComponentTypeId>> {
        self.members.remove(&id)
    }

    /// Whether `id` is live.
    pub fn has(&self, id: EntityId) -> bool {
        self.members.contains_key(&id)
    }

    /// Add `component` to `id`'s membership set.
    ///
    /// Returns `false` and does nothing if `id` is not live — in
    /// particular, this is a silent no-op for a reserved-but-not-yet-
    /// instantiated id, even though a component value may already have
    /// been written for it (see the crate-level docs on `Registry::emplace`).
    pub fn add_component(&mut self, id: EntityId, component: ComponentTypeId) -> bool {
        match self.members.get_mut(&id) {
            Some(set) => {
                set.insert(component);
                true
            }
            None => false,
        }
    }

    /// Remove `component` from `id`'s membership set, if `id` is live.
    pub fn remove_component(&mut self, id: EntityId, component: ComponentTypeId) {
        if let Some(set) = self.members.get_mut(&id) {
            set.remove(&component);
        }
    }

    /// Whether `id` is live and its membership set contains `component`.
    pub fn has_component(&self, id: EntityId, component: ComponentTypeId) -> bool {
        self.members
            .get(&id)
            .is_some_and(|set| set.contains(&component))
    }

    /// The number of live entities.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether there are no live entities.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctype(n: u32) -> ComponentTypeId {
        // Tests only need distinct ids, not ids obtained from `type_id::<T>()`.
        ComponentTypeId::from_raw(n)
    }

    #[test]
    fn reserve_ids_are_distinct_and_monotonic() {
        let mut table = EntityTable::new();
        let a = table.reserve();
        let b = table.reserve();
        let c = table.reserve();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(a.value() < b.value());
        assert!(b.value() < c.value());
    }

    #[test]
    fn reserve_then_instantiate_split() {
        let mut table = EntityTable::new();
        let id = table.reserve();
        assert!(!table.has(id));

        table.instantiate(id);
        assert!(table.has(id));

        // idempotent
        table.instantiate(id);
        assert!(table.has(id));
    }

    #[test]
    fn create_is_reserve_then_instantiate() {
        let mut table = EntityTable::new();
        let id = table.create();
        assert!(table.has(id));
    }

    #[test]
    fn remove_returns_membership_set_once() {
        let mut table = EntityTable::new();
        let id = table.create();
        table.add_component(id, ctype(1));
        table.add_component(id, ctype(2));

        let removed = table.remove(id).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!table.has(id));

        assert!(table.remove(id).is_none());
    }

    #[test]
    fn add_component_on_reserved_entity_is_a_no_op() {
        let mut table = EntityTable::new();
        let id = table.reserve();
        assert!(!table.add_component(id, ctype(1)));
        assert!(!table.has_component(id, ctype(1)));
    }

    #[test]
    fn component_membership_roundtrip() {
        let mut table = EntityTable::new();
        let id = table.create();
        let c = ctype(7);

        assert!(!table.has_component(id, c));
        assert!(table.add_component(id, c));
        assert!(table.has_component(id, c));

        table.remove_component(id, c);
        assert!(!table.has_component(id, c));
    }

    #[test]
    fn has_is_false_for_never_issued_ids() {
        let table = EntityTable::new();
        // Id 0 is never issued by `reserve`/`create`.
        assert!(!table.has(EntityId(0)));
    }
}
