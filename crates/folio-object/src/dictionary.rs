use std::collections::BTreeMap;
use std::io::Write;

use folio_types::IndirectRef;

use crate::array::Array;
use crate::error::ObjectResult;
use crate::object::Object;
use crate::protect::ProtectedDictionary;
use crate::scalar::{Name, PdfString};
use crate::serialize::ReferenceTable;

/// A name-keyed map of objects, owned exclusively by its holder.
///
/// Keys are kept ordered so output is deterministic. Lookups return
/// `Option`: a missing key and a key holding the wrong kind of object are
/// both ordinary "not found" results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
    entries: BTreeMap<Name, Object>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace an entry, returning the previous value. Protected
    /// views are deep-copied on the way in.
    pub fn insert(&mut self, key: impl Into<Name>, value: impl Into<Object>) -> Option<Object> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<Name>, value: impl Into<Object>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.entries.get_mut(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Name> + '_ {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Object)> + '_ {
        self.entries.iter()
    }

    // -----------------------------------------------------------------------
    // Typed lookups
    // -----------------------------------------------------------------------

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_integer()
    }

    /// Reals and integers both answer.
    pub fn get_real(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_real()
    }

    pub fn get_name(&self, key: &str) -> Option<&Name> {
        self.get(key)?.as_name()
    }

    pub fn get_string(&self, key: &str) -> Option<&PdfString> {
        self.get(key)?.as_string()
    }

    pub fn get_array(&self, key: &str) -> Option<&Array> {
        self.get(key)?.as_array()
    }

    pub fn get_array_mut(&mut self, key: &str) -> Option<&mut Array> {
        self.get_mut(key)?.as_array_mut()
    }

    pub fn get_dictionary(&self, key: &str) -> Option<&Dictionary> {
        self.get(key)?.as_dictionary()
    }

    pub fn get_dictionary_mut(&mut self, key: &str) -> Option<&mut Dictionary> {
        self.get_mut(key)?.as_dictionary_mut()
    }

    pub fn get_reference(&self, key: &str) -> Option<IndirectRef> {
        self.get(key)?.as_reference()
    }

    /// Read-only view for handing to another owner.
    pub fn protect(&self) -> ProtectedDictionary<'_> {
        ProtectedDictionary::new(self)
    }

    pub(crate) fn collect_references(&self, out: &mut Vec<IndirectRef>) {
        for value in self.entries.values() {
            value.collect_references(out);
        }
    }

    /// Write `<</Key value /Key2 value2>>`.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        out: &mut W,
        refs: Option<&dyn ReferenceTable>,
    ) -> ObjectResult<()> {
        out.write_all(b"<<")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.write_all(b" ")?;
            }
            key.write_to(out)?;
            out.write_all(b" ")?;
            value.write_to(out, refs)?;
        }
        out.write_all(b">>")?;
        Ok(())
    }
}

impl<K: Into<Name>, V: Into<Object>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
