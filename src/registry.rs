//! [`Registry`]: the public façade combining entity and component bookkeeping.

use crate::component::{type_id, Component, ComponentTable};
use crate::entity::{EntityId, EntityTable};
use crate::view::{SharedViewItems, TypeIdList, View, ViewItems};

/// The entity-component data store.
///
/// Owns an [`EntityTable`] and a [`ComponentTable`] and keeps their
/// bookkeeping consistent under insert, overwrite, delete, and entity
/// destruction. This is the one type most callers need; the `entity` and
/// `component` modules are exposed directly for tooling that wants to
/// operate on either table in isolation.
#[derive(Debug, Default)]
pub struct Registry {
    entities: EntityTable,
    components: ComponentTable,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id, then immediately make it live. Equivalent to
    /// [`Registry::reserve_entity`] followed by [`Registry::instantiate_entity`].
    pub fn create_entity(&mut self) -> EntityId {
        self.entities.create()
    }

    /// Hand out the next id without making it live yet.
    ///
    /// The id is usable immediately as the target of [`Registry::emplace`]/
    /// [`Registry::set`] calls — useful for an external command-buffer-style
    /// collaborator that wants to reference an entity in several commands
    /// before it actually appears in the world. It stays invisible to
    /// [`Registry::has_entity`] and to every [`crate::view::View`] until
    /// [`Registry::instantiate_entity`] is called on it.
    pub fn reserve_entity(&mut self) -> EntityId {
        self.entities.reserve()
    }

    /// Make a reserved id live. Idempotent.
    pub fn instantiate_entity(&mut self, id: EntityId) {
        self.entities.instantiate(id);
    }

    /// Whether `id` is live.
    pub fn has_entity(&self, id: EntityId) -> bool {
        self.entities.has(id)
    }

    /// Destroy `id`: remove it and every component value it holds.
    ///
    /// Returns whether `id` was live. A second call on the same id returns
    /// `false` and does nothing.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        match self.entities.remove(id) {
            Some(types) => {
                self.components.remove_many(id, &types);
                true
            }
            None => false,
        }
    }

    /// Store `value` as `entity`'s `T`, constructing it in place.
    ///
    /// Equivalent to [`Registry::set`] in this crate (Rust has no separate
    /// placement-construction step); kept as its own name because the
    /// two-verb convention is part of the public surface. Permitted on an
    /// entity that has only been reserved: the component value is stored,
    /// but the membership-set write silently no-ops, so the value stays
    /// invisible to queries until the entity is instantiated.
    pub fn emplace<T: Component>(&mut self, entity: EntityId, value: T) {
        self.components.emplace(entity, value);
        self.entities.add_component(entity, type_id::<T>());
    }

    /// Store `value` as `entity`'s `T`, overwriting any previous value.
    /// See [`Registry::emplace`] for the reserved-entity caveat.
    pub fn set<T: Component>(&mut self, entity: EntityId, value: T) {
        self.components.set(entity, value);
        self.entities.add_component(entity, type_id::<T>());
    }

    /// Remove `entity`'s `T` value. Returns whether anything was removed.
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> bool {
        let removed = self.components.remove::<T>(entity);
        if removed {
            self.entities.remove_component(entity, type_id::<T>());
        }
        removed
    }

    /// Whether `entity` is live and has a `T` value.
    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.entities.has(entity) && self.components.has::<T>(entity)
    }

    /// Borrow `entity`'s `T` value, or `None` if `entity` is not live or
    /// has no `T`.
    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        if !self.entities.has(entity) {
            return None;
        }
        self.components.get::<T>(entity)
    }

    /// Mutably borrow `entity`'s `T` value. See [`Registry::get`].
    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        if !self.entities.has(entity) {
            return None;
        }
        self.components.get_mut::<T>(entity)
    }

    /// Build a shared view over the entities carrying every component type
    /// in `Incl` and none of the types in `Filt`.
    ///
    /// `Incl` must be a tuple of shared references (`(&A,)`, `(&A, &B)`,
    /// …); use [`Registry::view_mut`] for a view that mutates through its
    /// items. `Filt` is a tuple of component types with no references
    /// (`()`, `(A,)`, `(A, B)`, …).
    pub fn view<'a, Incl, Filt>(&'a self) -> View<'a, Incl, Filt>
    where
        Incl: SharedViewItems<'a>,
        Filt: TypeIdList,
    {
        View::new(&self.components)
    }

    /// Build a view over the entities carrying every component type in
    /// `Incl` and none of the types in `Filt`, where `Incl` may name
    /// `&mut T` slots.
    pub fn view_mut<'a, Incl, Filt>(&'a mut self) -> View<'a, Incl, Filt>
    where
        Incl: ViewItems<'a>,
        Filt: TypeIdList,
    {
        View::new_mut(&mut self.components)
    }
}
