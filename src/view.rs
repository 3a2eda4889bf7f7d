//! [`View`]: a lazy, forward iterator over the entities carrying a chosen
//! combination of components while lacking another.

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::component::{type_id, Column, Component, ComponentTable, ComponentTypeId};
use crate::entity::EntityId;

/// One slot of a View's include list: a shared or exclusive reference to a
/// single entity's value of one component type.
///
/// Implemented for `&'a T` and `&'a mut T` for every [`Component`] `T` —
/// this is how a per-component mutable-vs-immutable request is expressed,
/// in place of threading a const-qualification flag at runtime.
pub trait ViewItem<'a> {
    /// The component type this slot reads.
    type Value: Component;

    /// # Safety
    ///
    /// `column` must point to a live `Column` storing `Self::Value`,
    /// outliving `'a`, containing a value for `entity`; and no other live
    /// `ViewItem` may hold a `&mut` to the same column while this one is
    /// alive.
    unsafe fn fetch(column: NonNull<Column>, entity: EntityId) -> Self;
}

impl<'a, T: Component> ViewItem<'a> for &'a T {
    type Value = T;

    unsafe fn fetch(column: NonNull<Column>, entity: EntityId) -> Self {
        column
            .as_ref()
            .get::<T>(entity)
            .expect("entity passed the View's membership checks but is missing from a column")
    }
}

impl<'a, T: Component> ViewItem<'a> for &'a mut T {
    type Value = T;

    unsafe fn fetch(mut column: NonNull<Column>, entity: EntityId) -> Self {
        column
            .as_mut()
            .get_mut::<T>(entity)
            .expect("entity passed the View's membership checks but is missing from a column")
    }
}

/// A tuple of [`ViewItem`]s: the include list of a [`View`].
///
/// Implemented for tuples of arity 1 through 4; a `View` over more
/// component types than that isn't supported.
pub trait ViewItems<'a>: Sized {
    /// The `ComponentTypeId` of each slot, in tuple order.
    fn type_ids() -> Vec<ComponentTypeId>;

    /// # Safety
    /// Every entry in `columns` must satisfy the safety contract of the
    /// corresponding slot's [`ViewItem::fetch`], and `entity` must be
    /// present in all of them (see [`ViewItems::has_all`]).
    unsafe fn fetch(columns: &[NonNull<Column>], entity: EntityId) -> Self;

    /// # Safety
    /// Every entry in `columns` must point to a live `Column` outliving
    /// the call.
    unsafe fn has_all(columns: &[NonNull<Column>], entity: EntityId) -> bool;
}

/// Marks a [`ViewItems`] tuple composed entirely of shared references, so
/// it can be produced from a `&Registry` without risking aliasing.
///
/// Only implemented for tuples of `&'a T`; a tuple containing `&'a mut T`
/// does not implement this trait and so cannot be used with
/// [`crate::Registry::view`] (use [`crate::Registry::view_mut`] instead).
pub trait SharedViewItems<'a>: ViewItems<'a> {}

/// A tuple of component types used as a View's filter list.
///
/// Implemented for `()` (no filter) through 4-tuples.
pub trait TypeIdList {
    /// The `ComponentTypeId` of each named type, in tuple order.
    fn type_ids() -> Vec<ComponentTypeId>;
}

impl TypeIdList for () {
    fn type_ids() -> Vec<ComponentTypeId> {
        Vec::new()
    }
}

macro_rules! impl_view_items {
    ($($name:ident $idx:tt),+) => {
        impl<'a, $($name: ViewItem<'a>),+> ViewItems<'a> for ($($name,)+) {
            fn type_ids() -> Vec<ComponentTypeId> {
                vec![$(type_id::<$name::Value>()),+]
            }

            unsafe fn fetch(columns: &[NonNull<Column>], entity: EntityId) -> Self {
                ($($name::fetch(columns[$idx], entity),)+)
            }

            unsafe fn has_all(columns: &[NonNull<Column>], entity: EntityId) -> bool {
                $(columns[$idx].as_ref().has(entity))&&+
            }
        }

        impl<'a, $($name: Component),+> SharedViewItems<'a> for ($(&'a $name,)+) {}

        impl<$($name: Component),+> TypeIdList for ($($name,)+) {
            fn type_ids() -> Vec<ComponentTypeId> {
                vec![$(type_id::<$name>()),+]
            }
        }
    };
}

impl_view_items!(A 0);
impl_view_items!(A 0, B 1);
impl_view_items!(A 0, B 1, C 2);
impl_view_items!(A 0, B 1, C 2, D 3);

/// A lazy, forward iterator over the entities carrying a chosen combination
/// of components while lacking another.
///
/// Constructed by [`crate::Registry::view`] (shared access) or
/// [`crate::Registry::view_mut`] (allows `&mut T` slots). Borrows the
/// owning [`crate::Registry`]'s component storage for its lifetime: no
/// structural mutation (inserting or removing a component, or destroying
/// an entity) may happen while a `View` is alive.
pub struct View<'a, Incl, Filt = ()> {
    driver_entities: Vec<EntityId>,
    idx: usize,
    include_columns: Vec<NonNull<Column>>,
    filter_columns: Vec<NonNull<Column>>,
    _marker: PhantomData<(&'a ComponentTable, fn() -> Incl, fn() -> Filt)>,
}

impl<'a, Incl, Filt> View<'a, Incl, Filt>
where
    Incl: ViewItems<'a>,
    Filt: TypeIdList,
{
    fn empty() -> Self {
        Self {
            driver_entities: Vec::new(),
            idx: 0,
            include_columns: Vec::new(),
            filter_columns: Vec::new(),
            _marker: PhantomData,
        }
    }

    fn assert_distinct_includes(include_ids: &[ComponentTypeId]) {
        let mut seen = include_ids.to_vec();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(
            seen.len(),
            include_ids.len(),
            "a View's include list names the same component type more than once"
        );
    }

    /// Build a shared (`&T`-only) View over `table`.
    pub(crate) fn new(table: &'a ComponentTable) -> Self
    where
        Incl: SharedViewItems<'a>,
    {
        let include_ids = Incl::type_ids();
        Self::assert_distinct_includes(&include_ids);

        let mut include_columns = Vec::with_capacity(include_ids.len());
        for id in &include_ids {
            match table.column_ptr(*id) {
                Some(ptr) => include_columns.push(ptr),
                None => return Self::empty(),
            }
        }

        let filter_columns = Filt::type_ids()
            .into_iter()
            .filter_map(|id| table.column_ptr(id))
            .collect();

        Self::from_columns(include_columns, filter_columns)
    }

    /// Build a View over `table` that may include `&mut T` slots.
    pub(crate) fn new_mut(table: &'a mut ComponentTable) -> Self {
        let include_ids = Incl::type_ids();
        Self::assert_distinct_includes(&include_ids);

        let mut include_columns = Vec::with_capacity(include_ids.len());
        for id in &include_ids {
            match table.column_ptr_mut(*id) {
                Some(ptr) => include_columns.push(ptr),
                None => return Self::empty(),
            }
        }

        let filter_columns = Filt::type_ids()
            .into_iter()
            .filter_map(|id| table.column_ptr(id))
            .collect();

        Self::from_columns(include_columns, filter_columns)
    }

    fn from_columns(include_columns: Vec<NonNull<Column>>, filter_columns: Vec<NonNull<Column>>) -> Self {
        // SAFETY: each pointer was obtained from a distinct ComponentTypeId
        // (checked by `assert_distinct_includes`) in the same table, so no
        // two entries alias the same Column.
        let mut driver_idx = 0;
        let mut driver_len = unsafe { include_columns[0].as_ref().len() };
        for (i, column) in include_columns.iter().enumerate().skip(1) {
            let len = unsafe { column.as_ref().len() };
            if len < driver_len {
                driver_idx = i;
                driver_len = len;
            }
        }

        if driver_len == 0 {
            return Self::empty();
        }

        let driver_entities = unsafe { include_columns[driver_idx].as_ref().keys().collect() };

        Self {
            driver_entities,
            idx: 0,
            include_columns,
            filter_columns,
            _marker: PhantomData,
        }
    }
}

impl<'a, Incl, Filt> Iterator for View<'a, Incl, Filt>
where
    Incl: ViewItems<'a>,
    Filt: TypeIdList,
{
    type Item = (EntityId, Incl);

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < self.driver_entities.len() {
            let entity = self.driver_entities[self.idx];
            self.idx += 1;

            // SAFETY: every column pointer in `include_columns` and
            // `filter_columns` was obtained from `self`'s owning table and
            // outlives `'a`; no mutation can have occurred since this View
            // borrows the table for `'a`.
            let present = unsafe { Incl::has_all(&self.include_columns, entity) };
            if !present {
                continue;
            }

            let filtered = self
                .filter_columns
                .iter()
                .any(|column| unsafe { column.as_ref().has(entity) });
            if filtered {
                continue;
            }

            let item = unsafe { Incl::fetch(&self.include_columns, entity) };
            return Some((entity, item));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    #[derive(Clone, Debug, PartialEq)]
    struct Position(i32, i32);

    #[test]
    fn empty_view_yields_nothing() {
        let registry = Registry::new();
        let mut view = registry.view::<(&Position,), ()>();
        assert!(view.next().is_none());
    }

    #[test]
    fn view_filters_by_membership() {
        let mut registry = Registry::new();
        let e1 = registry.create_entity();
        let e2 = registry.create_entity();
        registry.set(e1, Position(1, 2));
        registry.set(e1, true);
        registry.set(e2, Position(3, 4));

        let results: Vec<_> = registry
            .view::<(&Position, &bool), ()>()
            .map(|(e, (pos, b))| (e, pos.clone(), *b))
            .collect();
        assert_eq!(results, vec![(e1, Position(1, 2), true)]);
    }

    #[test]
    fn filter_excludes_matching_entities() {
        let mut registry = Registry::new();
        let e1 = registry.create_entity();
        let e2 = registry.create_entity();
        registry.set(e1, Position(1, 2));
        registry.set(e1, true);
        registry.set(e2, Position(3, 4));

        let results: Vec<_> = registry
            .view::<(&Position,), (bool,)>()
            .map(|(e, (pos,))| (e, pos.clone()))
            .collect();
        assert_eq!(results, vec![(e2, Position(3, 4))]);
    }

    #[test]
    fn filter_equal_to_included_type_is_always_empty() {
        let mut registry = Registry::new();
        let e1 = registry.create_entity();
        registry.set(e1, Position(1, 2));
        registry.set(e1, true);

        let count = registry.view::<(&Position, &bool), (bool,)>().count();
        assert_eq!(count, 0);
    }

    #[test]
    fn view_mut_allows_mutation_through_the_iterator() {
        let mut registry = Registry::new();
        let e1 = registry.create_entity();
        registry.set(e1, Position(1, 2));

        for (_, (pos,)) in registry.view_mut::<(&mut Position,), ()>() {
            pos.0 += 1;
        }
        assert_eq!(registry.get::<Position>(e1), Some(&Position(2, 2)));
    }
}
