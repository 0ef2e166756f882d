//! Double-ended stack over [`SparseArray`].
//!
//! Built only from `at`, `set_size` and `len`. Back operations are cheap;
//! front operations shift every element by one position.

use crate::array::SparseArray;
use crate::error::SparseResult;

/// A stack with push/pop at both ends, backed by a [`SparseArray`].
#[derive(Clone, Debug)]
pub struct SparseStack<T> {
    items: SparseArray<T>,
}

impl<T: Default> SparseStack<T> {
    /// Create an empty stack with the given cluster size.
    pub fn new(cluster: usize) -> SparseResult<Self> {
        Ok(Self {
            items: SparseArray::new(cluster)?,
        })
    }

    /// Push onto the back.
    pub fn push_back(&mut self, value: T) -> SparseResult<()> {
        let len = self.items.len();
        self.items.set_size(len + 1)?;
        *self.items.at(len)? = value;
        Ok(())
    }

    /// Pop from the back. `None` when empty.
    pub fn pop_back(&mut self) -> SparseResult<Option<T>> {
        let len = self.items.len();
        if len == 0 {
            return Ok(None);
        }
        let value = std::mem::take(self.items.at(len - 1)?);
        self.items.set_size(len - 1)?;
        Ok(Some(value))
    }

    /// Push onto the front, shifting every element up by one.
    pub fn push_front(&mut self, value: T) -> SparseResult<()> {
        let len = self.items.len();
        self.items.set_size(len + 1)?;
        for i in (0..len).rev() {
            let moved = std::mem::take(self.items.at(i)?);
            *self.items.at(i + 1)? = moved;
        }
        *self.items.at(0)? = value;
        Ok(())
    }

    /// Pop from the front, shifting every element down by one. `None` when
    /// empty.
    pub fn pop_front(&mut self) -> SparseResult<Option<T>> {
        let len = self.items.len();
        if len == 0 {
            return Ok(None);
        }
        let value = std::mem::take(self.items.at(0)?);
        for i in 1..len {
            let moved = std::mem::take(self.items.at(i)?);
            *self.items.at(i - 1)? = moved;
        }
        self.items.set_size(len - 1)?;
        Ok(Some(value))
    }
}

impl<T> SparseStack<T> {
    /// Element at the back, if any.
    pub fn peek_back(&self) -> Option<&T> {
        self.items.len().checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// Element at the front, if any.
    pub fn peek_front(&self) -> Option<&T> {
        self.items.get(0)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_is_lifo() {
        let mut stack = SparseStack::new(4).unwrap();
        for i in 0..10 {
            stack.push_back(i).unwrap();
        }
        assert_eq!(stack.peek_back(), Some(&9));
        let popped: Vec<_> = (0..10).map(|_| stack.pop_back().unwrap().unwrap()).collect();
        assert_eq!(popped, (0..10).rev().collect::<Vec<_>>());
        assert!(stack.is_empty());
    }

    #[test]
    fn back_push_front_pop_keeps_order() {
        let mut stack = SparseStack::new(3).unwrap();
        for i in 0..7 {
            stack.push_back(i).unwrap();
        }
        let popped: Vec<_> = (0..7).map(|_| stack.pop_front().unwrap().unwrap()).collect();
        assert_eq!(popped, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn front_push_front_pop_is_lifo() {
        let mut stack = SparseStack::new(3).unwrap();
        for i in 0..7 {
            stack.push_front(i).unwrap();
        }
        let popped: Vec<_> = (0..7).map(|_| stack.pop_front().unwrap().unwrap()).collect();
        assert_eq!(popped, (0..7).rev().collect::<Vec<_>>());
    }

    #[test]
    fn push_front_shifts() {
        let mut stack = SparseStack::new(2).unwrap();
        stack.push_back(2).unwrap();
        stack.push_front(1).unwrap();
        stack.push_front(0).unwrap();
        assert_eq!(stack.peek_front(), Some(&0));
        assert_eq!(stack.peek_back(), Some(&2));
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn pop_empty_is_none() {
        let mut stack = SparseStack::<String>::new(2).unwrap();
        assert_eq!(stack.pop_back().unwrap(), None);
        assert_eq!(stack.pop_front().unwrap(), None);
        assert_eq!(stack.peek_back(), None);
    }

    #[test]
    fn owned_values_move_through() {
        let mut stack = SparseStack::new(2).unwrap();
        stack.push_back("b".to_string()).unwrap();
        stack.push_front("a".to_string()).unwrap();
        assert_eq!(stack.pop_front().unwrap().as_deref(), Some("a"));
        assert_eq!(stack.pop_back().unwrap().as_deref(), Some("b"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn back_push_pop_reverses(cluster in 2usize..8, values in prop::collection::vec(any::<u32>(), 0..200)) {
            let mut stack = SparseStack::new(cluster).unwrap();
            for v in &values {
                stack.push_back(*v).unwrap();
            }
            let mut popped = Vec::new();
            while let Some(v) = stack.pop_back().unwrap() {
                popped.push(v);
            }
            let mut expected = values.clone();
            expected.reverse();
            prop_assert_eq!(popped, expected);
        }

        #[test]
        fn front_push_then_front_pop_reverses(cluster in 2usize..8, values in prop::collection::vec(any::<u32>(), 0..100)) {
            let mut stack = SparseStack::new(cluster).unwrap();
            for v in &values {
                stack.push_front(*v).unwrap();
            }
            let mut popped = Vec::new();
            while let Some(v) = stack.pop_front().unwrap() {
                popped.push(v);
            }
            let mut expected = values.clone();
            expected.reverse();
            prop_assert_eq!(popped, expected);
        }

        #[test]
        fn front_push_back_pop_preserves_insertion_order(cluster in 2usize..8, values in prop::collection::vec(any::<u32>(), 0..100)) {
            let mut stack = SparseStack::new(cluster).unwrap();
            for v in &values {
                stack.push_front(*v).unwrap();
            }
            let mut popped = Vec::new();
            while let Some(v) = stack.pop_back().unwrap() {
                popped.push(v);
            }
            prop_assert_eq!(popped, values);
        }
    }
}
