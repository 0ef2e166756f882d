use std::fmt;
use std::io::Write;

use folio_types::IndirectRef;

use crate::array::Array;
use crate::dictionary::Dictionary;
use crate::error::ObjectResult;
use crate::protect::{Protected, ProtectedArray, ProtectedDictionary, ProtectedRef, ProtectedStream};
use crate::scalar::{Name, Number, PdfString};
use crate::serialize::{write_reference, Dereference, ReferenceTable};
use crate::stream::Stream;

/// The closed set of object kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Null,
    Boolean,
    Number,
    Name,
    String,
    Array,
    Dictionary,
    Stream,
    Indirect,
}

impl ObjectKind {
    /// Leaf kinds are immutable and may be shared freely.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Boolean | Self::Number | Self::Name | Self::String
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Name => "name",
            Self::String => "string",
            Self::Array => "array",
            Self::Dictionary => "dictionary",
            Self::Stream => "stream",
            Self::Indirect => "indirect",
        };
        f.write_str(text)
    }
}

/// Any storable value.
///
/// `Clone` is a deep copy for composites and a buffer-sharing copy for
/// leaves. An `Indirect` clones to the same reference handle.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Object {
    #[default]
    Null,
    Boolean(bool),
    Number(Number),
    Name(Name),
    String(PdfString),
    Array(Array),
    Dictionary(Dictionary),
    Stream(Stream),
    Indirect(IndirectRef),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Null => ObjectKind::Null,
            Object::Boolean(_) => ObjectKind::Boolean,
            Object::Number(_) => ObjectKind::Number,
            Object::Name(_) => ObjectKind::Name,
            Object::String(_) => ObjectKind::String,
            Object::Array(_) => ObjectKind::Array,
            Object::Dictionary(_) => ObjectKind::Dictionary,
            Object::Stream(_) => ObjectKind::Stream,
            Object::Indirect(_) => ObjectKind::Indirect,
        }
    }

    pub fn integer(value: i64) -> Self {
        Object::Number(Number::Integer(value))
    }

    pub fn real(value: f64) -> Self {
        Object::Number(Number::Real(value))
    }

    pub fn name(text: impl AsRef<str>) -> Self {
        Object::Name(Name::new(text))
    }

    /// Read-only view. Everything reachable through it is read-only too.
    pub fn protect(&self) -> Protected<'_> {
        Protected::new(self)
    }

    /// Follow references until a non-reference payload is reached.
    /// Non-references resolve to themselves.
    pub fn dereference<'a, R: Dereference>(
        &'a self,
        resolver: &'a R,
    ) -> Result<Protected<'a>, R::Error> {
        self.protect().dereference(resolver)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&PdfString> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Object::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_stream_mut(&mut self) -> Option<&mut Stream> {
        match self {
            Object::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<IndirectRef> {
        match self {
            Object::Indirect(r) => Some(*r),
            _ => None,
        }
    }

    /// Every reference reachable from this object, in traversal order,
    /// duplicates included.
    pub fn references(&self) -> Vec<IndirectRef> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    pub(crate) fn collect_references(&self, out: &mut Vec<IndirectRef>) {
        match self {
            Object::Indirect(r) => out.push(*r),
            Object::Array(a) => a.collect_references(out),
            Object::Dictionary(d) => d.collect_references(out),
            Object::Stream(s) => s.collect_references(out),
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Write the textual form. References resolve through `refs`; with no
    /// table they render as the sentinel token.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        out: &mut W,
        refs: Option<&dyn ReferenceTable>,
    ) -> ObjectResult<()> {
        match self {
            Object::Null => out.write_all(b"null")?,
            Object::Boolean(true) => out.write_all(b"true")?,
            Object::Boolean(false) => out.write_all(b"false")?,
            Object::Number(n) => n.write_to(out)?,
            Object::Name(n) => n.write_to(out)?,
            Object::String(s) => s.write_to(out)?,
            Object::Array(a) => a.write_to(out, refs)?,
            Object::Dictionary(d) => d.write_to(out, refs)?,
            Object::Stream(s) => s.write_to(out, refs)?,
            Object::Indirect(r) => write_reference(out, *r, refs)?,
        }
        Ok(())
    }

    /// [`write_to`](Self::write_to) into a fresh buffer.
    pub fn to_bytes(&self, refs: Option<&dyn ReferenceTable>) -> ObjectResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out, refs)?;
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::integer(value)
    }
}

impl From<i32> for Object {
    fn from(value: i32) -> Self {
        Object::integer(i64::from(value))
    }
}

impl From<u32> for Object {
    fn from(value: u32) -> Self {
        Object::integer(i64::from(value))
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::real(value)
    }
}

impl From<Number> for Object {
    fn from(value: Number) -> Self {
        Object::Number(value)
    }
}

impl From<Name> for Object {
    fn from(value: Name) -> Self {
        Object::Name(value)
    }
}

impl From<PdfString> for Object {
    fn from(value: PdfString) -> Self {
        Object::String(value)
    }
}

impl From<Array> for Object {
    fn from(value: Array) -> Self {
        Object::Array(value)
    }
}

impl From<Dictionary> for Object {
    fn from(value: Dictionary) -> Self {
        Object::Dictionary(value)
    }
}

impl From<Stream> for Object {
    fn from(value: Stream) -> Self {
        Object::Stream(value)
    }
}

impl From<IndirectRef> for Object {
    fn from(value: IndirectRef) -> Self {
        Object::Indirect(value)
    }
}

/// Inserting a protected view deep-copies it.
impl From<Protected<'_>> for Object {
    fn from(view: Protected<'_>) -> Self {
        view.unprotect()
    }
}

impl From<ProtectedArray<'_>> for Object {
    fn from(view: ProtectedArray<'_>) -> Self {
        Object::Array(view.unprotect())
    }
}

impl From<ProtectedDictionary<'_>> for Object {
    fn from(view: ProtectedDictionary<'_>) -> Self {
        Object::Dictionary(view.unprotect())
    }
}

impl From<ProtectedStream<'_>> for Object {
    fn from(view: ProtectedStream<'_>) -> Self {
        Object::Stream(view.unprotect())
    }
}

/// A reference keeps its identity across the boundary.
impl From<ProtectedRef> for Object {
    fn from(view: ProtectedRef) -> Self {
        Object::Indirect(view.unprotect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(object: &Object) -> String {
        String::from_utf8(object.to_bytes(None).unwrap()).unwrap()
    }

    #[test]
    fn scalars_render() {
        assert_eq!(render(&Object::Null), "null");
        assert_eq!(render(&Object::from(true)), "true");
        assert_eq!(render(&Object::from(false)), "false");
        assert_eq!(render(&Object::from(7i64)), "7");
        assert_eq!(render(&Object::from(0.5)), "0.5");
        assert_eq!(render(&Object::name("Page")), "/Page");
        assert_eq!(render(&Object::from(PdfString::from("hi"))), "(hi)");
    }

    #[test]
    fn reference_without_table_is_sentinel() {
        let object = Object::from(IndirectRef::from_index(4));
        assert_eq!(render(&object), "0 65535 R");
    }

    #[test]
    fn nested_composites_render() {
        let mut kids = Array::new();
        kids.push(IndirectRef::from_index(0));
        let dict = Dictionary::new()
            .with("Type", Name::new("Pages"))
            .with("Kids", kids)
            .with("Count", 1i64);
        assert_eq!(
            render(&Object::from(dict)),
            "<</Count 1 /Kids [0 65535 R] /Type /Pages>>"
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(Object::Null.kind(), ObjectKind::Null);
        assert_eq!(Object::from(Array::new()).kind(), ObjectKind::Array);
        assert!(ObjectKind::Name.is_leaf());
        assert!(!ObjectKind::Dictionary.is_leaf());
        assert!(!ObjectKind::Indirect.is_leaf());
        assert_eq!(ObjectKind::Stream.to_string(), "stream");
    }

    #[test]
    fn references_collects_nested() {
        let a = IndirectRef::from_index(1);
        let b = IndirectRef::from_index(2);
        let mut array = Array::new();
        array.push(a);
        array.push(Dictionary::new().with("X", b));
        let stream = Stream::new(Dictionary::new().with("Y", a), b"".to_vec());
        array.push(stream);
        assert_eq!(Object::from(array).references(), vec![a, b, a]);
    }

    #[test]
    fn typed_accessors_are_absence_not_errors() {
        let object = Object::from(3i64);
        assert_eq!(object.as_integer(), Some(3));
        assert_eq!(object.as_real(), Some(3.0));
        assert!(object.as_name().is_none());
        assert!(object.as_reference().is_none());
        assert!(Object::from(1.5).as_integer().is_none());
    }

    #[test]
    fn clone_of_leaf_shares_buffer() {
        let object = Object::name("Shared");
        let copy = object.clone();
        assert!(object.as_name().unwrap().shares_buffer(copy.as_name().unwrap()));
    }

    #[test]
    fn clone_of_reference_keeps_identity() {
        let object = Object::from(IndirectRef::from_index(8));
        assert_eq!(object.clone().as_reference(), Some(IndirectRef::from_index(8)));
    }
}
