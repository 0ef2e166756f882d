use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use folio_object::serialize::write_reference;
use folio_object::{Dereference, FilterRegistry, Object, Protected};
use folio_store::{CloseReport, ObjectStore, Release, StoreConfig};
use folio_types::{IndirectRef, ObjectId, StoreId};
use tracing::{debug, warn};

use crate::binding::{Binding, BindingTable, StoreView};
use crate::error::{RefError, RefResult};

/// Owner of every store, every reference binding and the filter registry.
///
/// References are created independently of any store and bound lazily:
/// the first time a reference is mentioned in, written to, or explicitly
/// looked up in a store, it reserves an identity there. Writing a reference
/// writes its payload to every store it is bound to; binding an already
/// written reference to a new store copies the payload across, so every
/// store it appears in stays self-contained.
#[derive(Debug)]
pub struct Session {
    stores: Vec<Option<ObjectStore>>,
    bindings: BindingTable,
    filters: FilterRegistry,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session with the default filters.
    pub fn new() -> Self {
        Self::with_filters(FilterRegistry::with_defaults())
    }

    pub fn with_filters(filters: FilterRegistry) -> Self {
        Self {
            stores: Vec::new(),
            bindings: BindingTable::new(),
            filters,
        }
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterRegistry {
        &mut self.filters
    }

    // -----------------------------------------------------------------------
    // Stores
    // -----------------------------------------------------------------------

    /// Take ownership of an open store.
    pub fn open_store(&mut self, store: ObjectStore) -> RefResult<StoreId> {
        let index = u32::try_from(self.stores.len()).map_err(|_| RefError::ArenaFull("store"))?;
        self.stores.push(Some(store));
        let id = StoreId::from_index(index);
        debug!(store = %id, "opened store");
        Ok(id)
    }

    pub fn create_store(&mut self, path: impl AsRef<Path>, config: StoreConfig) -> RefResult<StoreId> {
        let store = ObjectStore::create(path, config)?;
        self.open_store(store)
    }

    pub fn memory_store(&mut self, config: StoreConfig) -> RefResult<StoreId> {
        let store = ObjectStore::in_memory(config)?;
        self.open_store(store)
    }

    pub fn store(&self, store: StoreId) -> RefResult<&ObjectStore> {
        self.stores
            .get(store.index() as usize)
            .and_then(Option::as_ref)
            .ok_or(RefError::StoreClosed(store))
    }

    fn store_mut(&mut self, store: StoreId) -> RefResult<&mut ObjectStore> {
        self.stores
            .get_mut(store.index() as usize)
            .and_then(Option::as_mut)
            .ok_or(RefError::StoreClosed(store))
    }

    pub fn is_open(&self, store: StoreId) -> bool {
        self.store(store).is_ok()
    }

    /// Handles of the stores not yet closed.
    pub fn open_stores(&self) -> impl Iterator<Item = StoreId> + '_ {
        self.stores
            .iter()
            .enumerate()
            .filter(|(_, store)| store.is_some())
            .map(|(index, _)| StoreId::from_index(index as u32))
    }

    /// Reference numbering for `store`, for serializing whole objects.
    pub fn table(&self, store: StoreId) -> RefResult<StoreView<'_>> {
        self.store(store)?;
        Ok(self.bindings.view(store))
    }

    // -----------------------------------------------------------------------
    // References
    // -----------------------------------------------------------------------

    /// A reference bound to no store yet.
    pub fn new_reference(&mut self) -> RefResult<IndirectRef> {
        self.bindings.create()
    }

    /// A reference with identities reserved up front in each of `stores`.
    pub fn new_reference_in(&mut self, stores: &[StoreId]) -> RefResult<IndirectRef> {
        for &store in stores {
            self.store(store)?;
        }
        let reference = self.bindings.create()?;
        for &store in stores {
            self.identity_for(reference, store)?;
        }
        Ok(reference)
    }

    pub fn binding(&self, reference: IndirectRef) -> RefResult<&Binding> {
        self.bindings.get(reference)
    }

    /// The identity of `reference` in `store`, reserving one if needed.
    ///
    /// When a fresh identity is reserved and the reference already has a
    /// payload elsewhere, that payload is copied into `store` along with
    /// bindings for every reference it mentions. The binding is recorded
    /// before copying, so reference cycles terminate.
    pub fn identity_for(&mut self, reference: IndirectRef, store: StoreId) -> RefResult<ObjectId> {
        let mut pending = Vec::new();
        let id = self.bind_into(reference, store, &mut pending)?;
        self.drain(store, pending)?;
        Ok(id)
    }

    /// Bind `reference` to `store` if it is not yet, queueing a copy of its
    /// payload when a source holds one.
    fn bind_into(
        &mut self,
        reference: IndirectRef,
        store: StoreId,
        pending: &mut Vec<(ObjectId, Object)>,
    ) -> RefResult<ObjectId> {
        let binding = self.bindings.get(reference)?;
        if let Some(id) = binding.identity_in(store) {
            return Ok(id);
        }
        let source = binding
            .source()
            .and_then(|source| Some((source, binding.identity_in(source)?)));

        let id = self.store_mut(store)?.reserve()?;
        self.bindings.bind(reference, store, id)?;
        debug!(?reference, %store, %id, "bound reference");

        if let Some((source, source_id)) = source {
            let payload = self.store(source)?.resolve(source_id).ok().cloned();
            if let Some(payload) = payload {
                debug!(?reference, from = %source, to = %store, "copying payload");
                pending.push((id, payload));
            }
        }
        Ok(id)
    }

    /// Write queued bodies into `store`.
    ///
    /// Each body has every reference it mentions bound before it is written;
    /// newly bound references that carry a payload join the queue. Depth of
    /// the reference graph never grows the call stack.
    fn drain(&mut self, store: StoreId, mut pending: Vec<(ObjectId, Object)>) -> RefResult<()> {
        while let Some((id, object)) = pending.pop() {
            for nested in object.references() {
                self.bind_into(nested, store, &mut pending)?;
            }

            let Session {
                stores, bindings, ..
            } = &mut *self;
            let target = stores
                .get_mut(store.index() as usize)
                .and_then(Option::as_mut)
                .ok_or(RefError::StoreClosed(store))?;
            let view = bindings.view(store);
            if target.is_written(id) {
                target.rewrite_at(id, object, &view)?;
            } else {
                target.write_at(id, object, &view)?;
            }
        }
        Ok(())
    }

    /// Write the payload of `reference` to every store it is bound to.
    ///
    /// Writing again replaces the payload. The first store written becomes
    /// the reference's dereference source.
    pub fn write(&mut self, reference: IndirectRef, object: impl Into<Object>) -> RefResult<()> {
        let object = object.into();
        let targets: Vec<(StoreId, ObjectId)> = self.bindings.get(reference)?.stores().collect();
        let Some(&(first, _)) = targets.first() else {
            return Err(RefError::UnboundReference(reference));
        };

        for &(store, id) in &targets {
            self.drain(store, vec![(id, object.clone())])?;
            debug!(?reference, %store, %id, "wrote reference");
        }
        if self.bindings.get(reference)?.source().is_none() {
            self.bindings.set_source(reference, Some(first))?;
        }
        Ok(())
    }

    /// Create a reference, bind it to `store` and write it in one step.
    pub fn write_new(&mut self, store: StoreId, object: impl Into<Object>) -> RefResult<IndirectRef> {
        let reference = self.new_reference_in(&[store])?;
        self.write(reference, object)?;
        Ok(reference)
    }

    /// Write the `n g R` token for `reference` as numbered in `store`.
    ///
    /// With no store the sentinel token `0 65535 R` is written, which keeps
    /// diagnostic printing of unbound graphs possible.
    pub fn serialize_reference<W: Write + ?Sized>(
        &self,
        reference: IndirectRef,
        out: &mut W,
        store: Option<StoreId>,
    ) -> RefResult<()> {
        self.bindings.get(reference)?;
        match store {
            None => write_reference(out, reference, None)?,
            Some(store) => {
                let view = self.table(store)?;
                write_reference(out, reference, Some(&view))?;
            }
        }
        Ok(())
    }

    /// Resolve `reference` to its payload, following chains of references
    /// until a non-reference object is reached.
    pub fn dereference(&self, reference: IndirectRef) -> RefResult<Protected<'_>> {
        let mut visited = HashSet::new();
        let mut current = reference;
        loop {
            if !visited.insert(current) {
                return Err(RefError::CyclicReference(current));
            }
            let binding = self.bindings.get(current)?;
            let (source, id) = binding
                .source()
                .and_then(|source| Some((source, binding.identity_in(source)?)))
                .ok_or(RefError::NoSource(current))?;
            let payload = self.store(source)?.resolve(id)?;
            match payload.as_reference() {
                Some(next) => current = next,
                None => return Ok(payload.protect()),
            }
        }
    }

    /// Delete the identity of `reference` in `store` and drop the binding.
    ///
    /// If `store` was the dereference source, another bound store holding
    /// the payload takes over.
    pub fn delete(&mut self, reference: IndirectRef, store: StoreId) -> RefResult<Release> {
        let id = self
            .bindings
            .get(reference)?
            .identity_in(store)
            .ok_or(RefError::NotBound { reference, store })?;
        let outcome = self.store_mut(store)?.delete(id)?;
        self.bindings.unbind(reference, store)?;
        if self.bindings.get(reference)?.source().is_none() {
            self.adopt_source(reference)?;
        }
        Ok(outcome)
    }

    /// Point the source at any bound store that holds a payload.
    fn adopt_source(&mut self, reference: IndirectRef) -> RefResult<bool> {
        let candidate = self
            .bindings
            .get(reference)?
            .stores()
            .find(|&(store, id)| self.store(store).is_ok_and(|s| s.is_written(id)))
            .map(|(store, _)| store);
        self.bindings.set_source(reference, candidate)?;
        Ok(candidate.is_some())
    }

    // -----------------------------------------------------------------------
    // Trailer and close
    // -----------------------------------------------------------------------

    pub fn set_catalog(&mut self, store: StoreId, reference: IndirectRef) -> RefResult<()> {
        let id = self.identity_for(reference, store)?;
        self.store_mut(store)?.set_catalog(id)?;
        Ok(())
    }

    pub fn set_info(&mut self, store: StoreId, reference: IndirectRef) -> RefResult<()> {
        let id = self.identity_for(reference, store)?;
        self.store_mut(store)?.set_info(id)?;
        Ok(())
    }

    /// Close `store`, invalidating its handle and every binding into it.
    ///
    /// Contract failures (no catalog, unwritten identities) leave the store
    /// open. An I/O failure while finishing still releases the handle, and
    /// references sourced there fall back to other stores holding them.
    pub fn close(&mut self, store: StoreId) -> RefResult<CloseReport> {
        self.store(store)?.check_closable()?;
        let target = self
            .stores
            .get_mut(store.index() as usize)
            .and_then(Option::take)
            .ok_or(RefError::StoreClosed(store))?;
        let closed = target.close();
        if let Err(error) = &closed {
            warn!(%store, %error, "store failed to finish");
        }

        let affected = self.bindings.drop_store(store);
        let mut orphaned = 0usize;
        for &(reference, was_source) in &affected {
            if was_source && !self.adopt_source(reference)? {
                orphaned += 1;
            }
        }
        debug!(%store, dropped = affected.len(), "dropped bindings");
        if orphaned > 0 {
            warn!(%store, orphaned, "closed store was the only source for some references");
        }

        Ok(closed?)
    }
}

impl Dereference for Session {
    type Error = RefError;

    fn dereference(&self, reference: IndirectRef) -> Result<Protected<'_>, RefError> {
        Session::dereference(self, reference)
    }
}
