use std::io::Write;

use folio_types::IndirectRef;

use crate::error::ObjectResult;
use crate::object::Object;
use crate::protect::ProtectedArray;
use crate::serialize::ReferenceTable;

/// An ordered sequence of objects, owned exclusively by its holder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Array {
    items: Vec<Object>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item. Protected views are deep-copied on the way in.
    pub fn push(&mut self, item: impl Into<Object>) {
        self.items.push(item.into());
    }

    /// Insert at `index`, shifting later items. Returns `false` (and leaves
    /// the array untouched) if `index > len()`.
    pub fn insert(&mut self, index: usize, item: impl Into<Object>) -> bool {
        if index > self.items.len() {
            return false;
        }
        self.items.insert(index, item.into());
        true
    }

    /// Replace the item at `index`, returning the old one.
    pub fn set(&mut self, index: usize, item: impl Into<Object>) -> Option<Object> {
        let slot = self.items.get_mut(index)?;
        Some(std::mem::replace(slot, item.into()))
    }

    pub fn remove(&mut self, index: usize) -> Option<Object> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Object> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Object> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Object> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Object] {
        &self.items
    }

    /// Read-only view for handing to another owner.
    pub fn protect(&self) -> ProtectedArray<'_> {
        ProtectedArray::new(self)
    }

    pub(crate) fn collect_references(&self, out: &mut Vec<IndirectRef>) {
        for item in &self.items {
            item.collect_references(out);
        }
    }

    /// Write `[a b c]`.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        out: &mut W,
        refs: Option<&dyn ReferenceTable>,
    ) -> ObjectResult<()> {
        out.write_all(b"[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.write_all(b" ")?;
            }
            item.write_to(out, refs)?;
        }
        out.write_all(b"]")?;
        Ok(())
    }
}

impl<T: Into<Object>> FromIterator<T> for Array {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Object;
    type IntoIter = std::slice::Iter<'a, Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(array: &Array) -> String {
        let mut out = Vec::new();
        array.write_to(&mut out, None).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renders_space_separated() {
        let array: Array = [1i64, 2, 3].into_iter().collect();
        assert_eq!(render(&array), "[1 2 3]");
        assert_eq!(render(&Array::new()), "[]");
    }

    #[test]
    fn insert_set_remove() {
        let mut array: Array = [1i64, 3].into_iter().collect();
        assert!(array.insert(1, 2i64));
        assert!(!array.insert(9, 0i64));
        assert_eq!(render(&array), "[1 2 3]");
        assert_eq!(array.set(0, 10i64), Some(Object::from(1i64)));
        assert_eq!(array.set(5, 0i64), None);
        assert_eq!(array.remove(2), Some(Object::from(3i64)));
        assert_eq!(array.remove(2), None);
        assert_eq!(render(&array), "[10 2]");
    }

    #[test]
    fn clone_is_independent() {
        let mut inner = Array::new();
        inner.push(1i64);
        let mut outer = Array::new();
        outer.push(inner);

        let mut copy = outer.clone();
        if let Some(Object::Array(nested)) = copy.get_mut(0) {
            nested.push(2i64);
        }
        assert_eq!(render(&outer), "[[1]]");
        assert_eq!(render(&copy), "[[1 2]]");
    }
}
