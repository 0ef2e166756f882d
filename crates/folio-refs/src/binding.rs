//! The reference binding arena.
//!
//! Every indirect reference is an index into one [`BindingTable`]. Its entry
//! maps each store the reference is bound to onto the identity it holds
//! there, and remembers which store to dereference through.

use std::collections::BTreeMap;

use folio_object::ReferenceTable;
use folio_types::{IndirectRef, ObjectId, StoreId};

use crate::error::{RefError, RefResult};

/// Per-reference binding state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    stores: BTreeMap<StoreId, ObjectId>,
    source: Option<StoreId>,
}

impl Binding {
    pub fn identity_in(&self, store: StoreId) -> Option<ObjectId> {
        self.stores.get(&store).copied()
    }

    /// Bound stores and identities, in store order.
    pub fn stores(&self) -> impl Iterator<Item = (StoreId, ObjectId)> + '_ {
        self.stores.iter().map(|(&store, &id)| (store, id))
    }

    pub fn is_bound(&self) -> bool {
        !self.stores.is_empty()
    }

    /// The store dereferencing reads from, once a payload was written.
    pub fn source(&self) -> Option<StoreId> {
        self.source
    }
}

/// Arena of bindings indexed by [`IndirectRef`].
#[derive(Clone, Debug, Default)]
pub struct BindingTable {
    entries: Vec<Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A fresh, unbound reference.
    pub fn create(&mut self) -> RefResult<IndirectRef> {
        let index = u32::try_from(self.entries.len()).map_err(|_| RefError::ArenaFull("reference"))?;
        self.entries.push(Binding::default());
        Ok(IndirectRef::from_index(index))
    }

    pub fn get(&self, reference: IndirectRef) -> RefResult<&Binding> {
        self.entries
            .get(reference.index() as usize)
            .ok_or(RefError::UnknownReference(reference))
    }

    fn get_mut(&mut self, reference: IndirectRef) -> RefResult<&mut Binding> {
        self.entries
            .get_mut(reference.index() as usize)
            .ok_or(RefError::UnknownReference(reference))
    }

    pub fn bind(&mut self, reference: IndirectRef, store: StoreId, id: ObjectId) -> RefResult<()> {
        self.get_mut(reference)?.stores.insert(store, id);
        Ok(())
    }

    /// Remove the binding to `store`, clearing the source if it pointed
    /// there.
    pub fn unbind(&mut self, reference: IndirectRef, store: StoreId) -> RefResult<Option<ObjectId>> {
        let binding = self.get_mut(reference)?;
        if binding.source == Some(store) {
            binding.source = None;
        }
        Ok(binding.stores.remove(&store))
    }

    pub fn set_source(&mut self, reference: IndirectRef, store: Option<StoreId>) -> RefResult<()> {
        self.get_mut(reference)?.source = store;
        Ok(())
    }

    /// Drop every binding to `store`.
    ///
    /// Returns each reference that lost a binding, flagged `true` when
    /// `store` was also its source.
    pub fn drop_store(&mut self, store: StoreId) -> Vec<(IndirectRef, bool)> {
        let mut affected = Vec::new();
        for (index, binding) in self.entries.iter_mut().enumerate() {
            if binding.stores.remove(&store).is_some() {
                let was_source = binding.source == Some(store);
                if was_source {
                    binding.source = None;
                }
                affected.push((IndirectRef::from_index(index as u32), was_source));
            }
        }
        affected
    }

    /// Identity lookup scoped to one store.
    pub fn view(&self, store: StoreId) -> StoreView<'_> {
        StoreView { table: self, store }
    }
}

/// The bindings of one store, as seen by serialization.
#[derive(Clone, Copy, Debug)]
pub struct StoreView<'a> {
    table: &'a BindingTable,
    store: StoreId,
}

impl StoreView<'_> {
    pub fn store(&self) -> StoreId {
        self.store
    }
}

impl ReferenceTable for StoreView<'_> {
    fn identity(&self, reference: IndirectRef) -> Option<ObjectId> {
        self.table.get(reference).ok()?.identity_in(self.store)
    }
}
