use std::io::Write;

use folio_types::IndirectRef;
use tracing::debug;

use crate::array::Array;
use crate::dictionary::Dictionary;
use crate::error::{ObjectError, ObjectResult};
use crate::filter::FilterRegistry;
use crate::object::Object;
use crate::protect::ProtectedStream;
use crate::scalar::Name;
use crate::serialize::ReferenceTable;

/// A dictionary plus a byte payload.
///
/// `data` always holds the *encoded* bytes; the filters that produced them
/// are listed in the dictionary's `/Filter` entry, outermost first. The
/// `/Length` entry is computed at write time and never trusted from the
/// dictionary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stream {
    dict: Dictionary,
    data: Vec<u8>,
}

impl Stream {
    /// A stream over unencoded bytes. Any `/Filter` in `dict` is dropped.
    pub fn new(mut dict: Dictionary, data: impl Into<Vec<u8>>) -> Self {
        dict.remove("Filter");
        Self {
            dict,
            data: data.into(),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dict
    }

    /// The encoded payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the payload with unencoded bytes, clearing `/Filter`.
    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) {
        self.dict.remove("Filter");
        self.data = data.into();
    }

    /// Filters listed in `/Filter`, in decode order.
    pub fn filters(&self) -> ObjectResult<Vec<Name>> {
        match self.dict.get("Filter") {
            None => Ok(Vec::new()),
            Some(Object::Name(name)) => Ok(vec![name.clone()]),
            Some(Object::Array(list)) => list
                .iter()
                .map(|item| item.as_name().cloned().ok_or(ObjectError::MalformedFilterEntry))
                .collect(),
            Some(_) => Err(ObjectError::MalformedFilterEntry),
        }
    }

    /// Encode the payload with the named filter and record it as the
    /// outermost entry of `/Filter`.
    pub fn encode_with(&mut self, registry: &FilterRegistry, filter: &str) -> ObjectResult<()> {
        let codec = registry
            .get(filter)
            .ok_or_else(|| ObjectError::UnknownFilter(filter.to_string()))?;
        let mut filters = self.filters()?;
        let encoded = codec.encode(&self.data)?;
        debug!(filter, before = self.data.len(), after = encoded.len(), "stream encoded");
        self.data = encoded;

        filters.insert(0, Name::new(filter));
        if filters.len() == 1 {
            self.dict.insert("Filter", filters.remove(0));
        } else {
            self.dict.insert("Filter", filters.into_iter().collect::<Array>());
        }
        Ok(())
    }

    /// Undo every listed filter and return the plain bytes.
    pub fn decode_with(&self, registry: &FilterRegistry) -> ObjectResult<Vec<u8>> {
        let mut data = self.data.clone();
        for name in self.filters()? {
            let codec = registry
                .get(name.as_str())
                .ok_or_else(|| ObjectError::UnknownFilter(name.as_str().to_string()))?;
            data = codec.decode(&data)?;
        }
        Ok(data)
    }

    /// Read-only view for handing to another owner.
    pub fn protect(&self) -> ProtectedStream<'_> {
        ProtectedStream::new(self)
    }

    pub(crate) fn collect_references(&self, out: &mut Vec<IndirectRef>) {
        self.dict.collect_references(out);
    }

    /// Write `<<dict /Length n>>\nstream\n<bytes>\nendstream`.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        out: &mut W,
        refs: Option<&dyn ReferenceTable>,
    ) -> ObjectResult<()> {
        let mut dict = self.dict.clone();
        dict.insert("Length", self.data.len() as i64);
        dict.write_to(out, refs)?;
        out.write_all(b"\nstream\n")?;
        out.write_all(&self.data)?;
        out.write_all(b"\nendstream")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(stream: &Stream) -> Vec<u8> {
        let mut out = Vec::new();
        stream.write_to(&mut out, None).unwrap();
        out
    }

    #[test]
    fn length_is_computed() {
        let stream = Stream::new(Dictionary::new().with("Length", 999i64), b"abc".to_vec());
        assert_eq!(render(&stream), b"<</Length 3>>\nstream\nabc\nendstream");
    }

    #[test]
    fn new_drops_stale_filter() {
        let dict = Dictionary::new().with("Filter", Name::new("FlateDecode"));
        let stream = Stream::new(dict, b"plain".to_vec());
        assert!(stream.filters().unwrap().is_empty());
    }

    #[test]
    fn flate_roundtrip_records_filter() {
        let registry = FilterRegistry::with_defaults();
        let mut stream = Stream::new(Dictionary::new(), b"hello hello hello hello".to_vec());
        stream.encode_with(&registry, "FlateDecode").unwrap();
        assert_eq!(stream.dictionary().get_name("Filter").map(Name::as_str), Some("FlateDecode"));
        assert_ne!(stream.data(), b"hello hello hello hello");
        assert_eq!(stream.decode_with(&registry).unwrap(), b"hello hello hello hello");
    }

    #[test]
    fn chained_filters_decode_in_reverse_application_order() {
        let registry = FilterRegistry::with_defaults();
        let mut stream = Stream::new(Dictionary::new(), b"chained".to_vec());
        stream.encode_with(&registry, "FlateDecode").unwrap();
        stream.encode_with(&registry, "ASCIIHexDecode").unwrap();

        let names: Vec<_> = stream.filters().unwrap();
        assert_eq!(names, vec![Name::new("ASCIIHexDecode"), Name::new("FlateDecode")]);
        assert!(stream.data().iter().all(|b| b.is_ascii_hexdigit() || *b == b'>'));
        assert_eq!(stream.decode_with(&registry).unwrap(), b"chained");
    }

    #[test]
    fn unknown_filter_fails() {
        let registry = FilterRegistry::new();
        let mut stream = Stream::new(Dictionary::new(), b"x".to_vec());
        assert!(matches!(
            stream.encode_with(&registry, "FlateDecode"),
            Err(ObjectError::UnknownFilter(_))
        ));
    }

    #[test]
    fn malformed_filter_entry() {
        let mut stream = Stream::new(Dictionary::new(), b"x".to_vec());
        stream.dictionary_mut().insert("Filter", 3i64);
        assert!(matches!(stream.filters(), Err(ObjectError::MalformedFilterEntry)));
    }

    #[test]
    fn set_data_clears_filters() {
        let registry = FilterRegistry::with_defaults();
        let mut stream = Stream::new(Dictionary::new(), b"x".to_vec());
        stream.encode_with(&registry, "ASCIIHexDecode").unwrap();
        stream.set_data(b"y".to_vec());
        assert!(stream.filters().unwrap().is_empty());
        assert_eq!(stream.data(), b"y");
    }
}
