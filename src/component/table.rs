//! [`ComponentTable`]: owns every [`Column`], keyed by component-type identity.

use std::collections::HashSet;
use std::ptr::NonNull;

use super::{type_id, Column, Component, ComponentTypeId};
use crate::entity::EntityId;
use crate::util::FastMap;

/// Owns one [`Column`] per component type that has ever been written to,
/// and dispatches every typed call to the right one.
///
/// A column is created lazily on first write to its type; reads against a
/// type with no column yet behave exactly as a read on an empty one would
/// (`None`/`false`). Columns are never removed except when the whole table
/// is dropped — this is the only place component-type → Column lookup
/// happens, so [`Column`] itself stays untyped-table-agnostic and
/// [`crate::view::View`] construction can stay cheap.
#[derive(Debug, Default)]
pub struct ComponentTable {
    columns: FastMap<ComponentTypeId, Column>,
}

impl ComponentTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for `entity` under `T`'s column, creating the column
    /// if this is the first write of that type.
    pub fn emplace<T: Component>(&mut self, entity: EntityId, value: T) {
        self.columns
            .entry(type_id::<T>())
            .or_insert_with(Column::new)
            .emplace(entity, value);
    }

    /// Equivalent to [`ComponentTable::emplace`].
    pub fn set<T: Component>(&mut self, entity: EntityId, value: T) {
        self.columns
            .entry(type_id::<T>())
            .or_insert_with(Column::new)
            .set(entity, value);
    }

    /// Remove `entity`'s `T` value. Returns whether anything was removed.
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> bool {
        match self.columns.get_mut(&type_id::<T>()) {
            Some(column) => column.remove(entity),
            None => false,
        }
    }

    /// Whether `entity` has a `T` value.
    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.columns
            .get(&type_id::<T>())
            .is_some_and(|column| column.has(entity))
    }

    /// Borrow `entity`'s `T` value.
    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.columns.get(&type_id::<T>())?.get(entity)
    }

    /// Mutably borrow `entity`'s `T` value.
    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.columns.get_mut(&type_id::<T>())?.get_mut(entity)
    }

    /// Bulk removal used by entity destruction: remove `entity` from every
    /// column named in `types`.
    pub fn remove_many(&mut self, entity: EntityId, types: &HashSet<ComponentTypeId>) {
        for id in types {
            if let Some(column) = self.columns.get_mut(id) {
                column.remove(entity);
            }
        }
    }

    /// A shared raw pointer to the column for `id`, if one has been created.
    ///
    /// For use by [`crate::view::View`], which needs to hold several
    /// columns' pointers side by side without the borrow checker treating
    /// them as one long-lived borrow of `self`.
    pub(crate) fn column_ptr(&self, id: ComponentTypeId) -> Option<NonNull<Column>> {
        self.columns.get(&id).map(|column| {
            // SAFETY: only ever dereferenced through `Column::get`/`has`/
            // `iter`, never `get_mut`, by callers that went through
            // `Registry::view` (which only hands out shared `ViewItem`s).
            unsafe { NonNull::new_unchecked(column as *const Column as *mut Column) }
        })
    }

    /// An exclusive raw pointer to the column for `id`, if one has been
    /// created. See [`ComponentTable::column_ptr`].
    pub(crate) fn column_ptr_mut(&mut self, id: ComponentTypeId) -> Option<NonNull<Column>> {
        self.columns
            .get_mut(&id)
            .map(|column| unsafe { NonNull::new_unchecked(column as *mut Column) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eid(n: u32) -> EntityId {
        crate::entity::EntityId::test_new(n)
    }

    #[test]
    fn column_created_lazily_on_first_write() {
        let mut table = ComponentTable::new();
        assert!(!table.has::<i32>(eid(1)));
        table.set(eid(1), 5i32);
        assert!(table.has::<i32>(eid(1)));
    }

    #[test]
    fn get_on_never_written_type_is_none() {
        let table = ComponentTable::new();
        assert_eq!(table.get::<i32>(eid(1)), None);
    }

    #[test]
    fn remove_many_clears_only_named_columns() {
        let mut table = ComponentTable::new();
        table.set(eid(1), 1i32);
        table.set(eid(1), true);

        let mut types = HashSet::new();
        types.insert(type_id::<i32>());
        table.remove_many(eid(1), &types);

        assert!(!table.has::<i32>(eid(1)));
        assert!(table.has::<bool>(eid(1)));
    }
}
