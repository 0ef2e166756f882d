//! Protected (read-only) views.
//!
//! A protected view lets an owner lend a composite to someone else without
//! giving up exclusive mutation rights. Traversal through a view only ever
//! yields more views, and the only way to obtain something mutable is
//! `unprotect`, which deep-copies into a new, independent owner.
//!
//! Leaves are returned by shared reference: they are immutable already.
//! A protected reference exposes identity lookup and serialization, and
//! unprotects to the very same handle.

use std::fmt;
use std::io::Write;

use folio_types::{IndirectRef, ObjectId};

use crate::array::Array;
use crate::dictionary::Dictionary;
use crate::error::ObjectResult;
use crate::filter::FilterRegistry;
use crate::object::{Object, ObjectKind};
use crate::scalar::{Name, PdfString};
use crate::serialize::{write_reference, Dereference, ReferenceTable};
use crate::stream::Stream;

// ---------------------------------------------------------------------------
// Protected (any object)
// ---------------------------------------------------------------------------

/// Read-only view of any object.
#[derive(Clone, Copy, PartialEq)]
pub struct Protected<'a> {
    object: &'a Object,
}

impl<'a> Protected<'a> {
    pub fn new(object: &'a Object) -> Self {
        Self { object }
    }

    pub fn kind(&self) -> ObjectKind {
        self.object.kind()
    }

    /// Deep copy into a new, independently owned object.
    pub fn unprotect(&self) -> Object {
        self.object.clone()
    }

    pub fn is_null(&self) -> bool {
        self.object.is_null()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.object.as_bool()
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.object.as_integer()
    }

    pub fn as_real(&self) -> Option<f64> {
        self.object.as_real()
    }

    pub fn as_name(&self) -> Option<&'a Name> {
        self.object.as_name()
    }

    pub fn as_string(&self) -> Option<&'a PdfString> {
        self.object.as_string()
    }

    pub fn as_array(&self) -> Option<ProtectedArray<'a>> {
        self.object.as_array().map(ProtectedArray::new)
    }

    pub fn as_dictionary(&self) -> Option<ProtectedDictionary<'a>> {
        self.object.as_dictionary().map(ProtectedDictionary::new)
    }

    pub fn as_stream(&self) -> Option<ProtectedStream<'a>> {
        self.object.as_stream().map(ProtectedStream::new)
    }

    pub fn as_reference(&self) -> Option<ProtectedRef> {
        self.object.as_reference().map(ProtectedRef)
    }

    /// Follow references until a non-reference payload is reached.
    pub fn dereference<R: Dereference>(&self, resolver: &'a R) -> Result<Protected<'a>, R::Error> {
        match self.object.as_reference() {
            Some(reference) => resolver.dereference(reference),
            None => Ok(*self),
        }
    }

    pub fn write_to<W: Write + ?Sized>(
        &self,
        out: &mut W,
        refs: Option<&dyn ReferenceTable>,
    ) -> ObjectResult<()> {
        self.object.write_to(out, refs)
    }

    pub fn to_bytes(&self, refs: Option<&dyn ReferenceTable>) -> ObjectResult<Vec<u8>> {
        self.object.to_bytes(refs)
    }
}

impl fmt::Debug for Protected<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Protected({:?})", self.object)
    }
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

/// Read-only view of an array.
#[derive(Clone, Copy)]
pub struct ProtectedArray<'a> {
    array: &'a Array,
}

impl<'a> ProtectedArray<'a> {
    pub fn new(array: &'a Array) -> Self {
        Self { array }
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Protected<'a>> {
        self.array.get(index).map(Protected::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = Protected<'a>> + 'a {
        self.array.iter().map(Protected::new)
    }

    /// Deep copy into a new, independently owned array.
    pub fn unprotect(&self) -> Array {
        self.array.clone()
    }

    pub fn write_to<W: Write + ?Sized>(
        &self,
        out: &mut W,
        refs: Option<&dyn ReferenceTable>,
    ) -> ObjectResult<()> {
        self.array.write_to(out, refs)
    }
}

impl fmt::Debug for ProtectedArray<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtectedArray({:?})", self.array)
    }
}

// ---------------------------------------------------------------------------
// Dictionaries
// ---------------------------------------------------------------------------

/// Read-only view of a dictionary.
#[derive(Clone, Copy)]
pub struct ProtectedDictionary<'a> {
    dict: &'a Dictionary,
}

impl<'a> ProtectedDictionary<'a> {
    pub fn new(dict: &'a Dictionary) -> Self {
        Self { dict }
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.dict.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Protected<'a>> {
        self.dict.get(key).map(Protected::new)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a Name> + 'a {
        self.dict.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a Name, Protected<'a>)> + 'a {
        self.dict.iter().map(|(k, v)| (k, Protected::new(v)))
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.dict.get_integer(key)
    }

    pub fn get_name(&self, key: &str) -> Option<&'a Name> {
        self.dict.get_name(key)
    }

    pub fn get_array(&self, key: &str) -> Option<ProtectedArray<'a>> {
        self.dict.get_array(key).map(ProtectedArray::new)
    }

    pub fn get_dictionary(&self, key: &str) -> Option<ProtectedDictionary<'a>> {
        self.dict.get_dictionary(key).map(ProtectedDictionary::new)
    }

    pub fn get_reference(&self, key: &str) -> Option<ProtectedRef> {
        self.dict.get_reference(key).map(ProtectedRef)
    }

    /// Deep copy into a new, independently owned dictionary.
    pub fn unprotect(&self) -> Dictionary {
        self.dict.clone()
    }

    pub fn write_to<W: Write + ?Sized>(
        &self,
        out: &mut W,
        refs: Option<&dyn ReferenceTable>,
    ) -> ObjectResult<()> {
        self.dict.write_to(out, refs)
    }
}

impl fmt::Debug for ProtectedDictionary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtectedDictionary({:?})", self.dict)
    }
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Read-only view of a stream.
#[derive(Clone, Copy)]
pub struct ProtectedStream<'a> {
    stream: &'a Stream,
}

impl<'a> ProtectedStream<'a> {
    pub fn new(stream: &'a Stream) -> Self {
        Self { stream }
    }

    pub fn dictionary(&self) -> ProtectedDictionary<'a> {
        ProtectedDictionary::new(self.stream.dictionary())
    }

    /// The encoded payload.
    pub fn data(&self) -> &'a [u8] {
        self.stream.data()
    }

    pub fn filters(&self) -> ObjectResult<Vec<Name>> {
        self.stream.filters()
    }

    pub fn decode_with(&self, registry: &FilterRegistry) -> ObjectResult<Vec<u8>> {
        self.stream.decode_with(registry)
    }

    /// Deep copy into a new, independently owned stream.
    pub fn unprotect(&self) -> Stream {
        self.stream.clone()
    }

    pub fn write_to<W: Write + ?Sized>(
        &self,
        out: &mut W,
        refs: Option<&dyn ReferenceTable>,
    ) -> ObjectResult<()> {
        self.stream.write_to(out, refs)
    }
}

impl fmt::Debug for ProtectedStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtectedStream({:?})", self.stream)
    }
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// Read-only view of an indirect reference: lookup and serialization only.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtectedRef(IndirectRef);

impl ProtectedRef {
    pub fn new(reference: IndirectRef) -> Self {
        Self(reference)
    }

    /// The same reference handle, never a copy of its identity.
    pub fn unprotect(&self) -> IndirectRef {
        self.0
    }

    /// Identity in the store behind `table`, if bound there.
    pub fn identity_in(&self, table: &dyn ReferenceTable) -> Option<ObjectId> {
        table.identity(self.0)
    }

    pub fn write_to<W: Write + ?Sized>(
        &self,
        out: &mut W,
        refs: Option<&dyn ReferenceTable>,
    ) -> ObjectResult<()> {
        write_reference(out, self.0, refs)
    }

    /// Resolve to the payload, following reference chains.
    pub fn dereference<'a, R: Dereference>(&self, resolver: &'a R) -> Result<Protected<'a>, R::Error> {
        resolver.dereference(self.0)
    }
}

impl fmt::Debug for ProtectedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtectedRef({:?})", self.0)
    }
}

impl From<ProtectedRef> for IndirectRef {
    fn from(view: ProtectedRef) -> Self {
        view.unprotect()
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    fn tree() -> impl Strategy<Value = Object> {
        let leaf = prop_oneof![
            any::<i64>().prop_map(Object::from),
            any::<bool>().prop_map(Object::from),
            "[A-Za-z]{1,6}".prop_map(|text| Object::from(Name::new(text))),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(|items| Object::from(Array::from_iter(items))),
                prop::collection::vec(("[A-Z][a-z]{0,4}", inner), 0..6).prop_map(|entries| {
                    let mut dict = Dictionary::new();
                    for (key, value) in entries {
                        dict.insert(key, value);
                    }
                    Object::from(dict)
                }),
            ]
        })
    }

    /// Append to every container and overwrite every leaf, depth first.
    fn scribble(object: &mut Object) {
        if let Some(array) = object.as_array_mut() {
            for index in 0..array.len() {
                if let Some(item) = array.get_mut(index) {
                    scribble(item);
                }
            }
            array.push(Name::new("Added"));
        } else if let Some(dict) = object.as_dictionary_mut() {
            let keys: Vec<Name> = dict.keys().cloned().collect();
            for key in keys {
                if let Some(value) = dict.get_mut(key.as_str()) {
                    scribble(value);
                }
            }
            dict.insert("added", true);
        } else {
            *object = Object::Null;
        }
    }

    proptest! {
        #[test]
        fn mutating_an_unprotected_copy_leaves_original(original in tree()) {
            let snapshot = original.clone();
            let mut copy = original.protect().unprotect();
            prop_assert_eq!(&copy, &original);

            scribble(&mut copy);
            prop_assert_ne!(&copy, &original);
            prop_assert_eq!(&original, &snapshot);
        }
    }
}
