//! The clustered tree-array.
//!
//! # Invariants
//!
//! - `capacity` is always `cluster^k` for some `k >= 1`.
//! - A node is a leaf iff the capacity of its level equals `cluster`.
//! - Every position at or past `size` reads back as `T::default()`: shrinking
//!   releases (or resets) everything beyond the new size at every depth, so a
//!   later grow never resurrects stale values.

use std::fmt;

use crate::error::{SparseError, SparseResult};

enum Node<T> {
    Leaf(Box<[T]>),
    Branch(Box<[Option<Box<Node<T>>>]>),
}

impl<T: Default> Node<T> {
    fn leaf(cluster: usize) -> Box<Self> {
        Box::new(Node::Leaf((0..cluster).map(|_| T::default()).collect()))
    }
}

impl<T> Node<T> {
    fn branch(cluster: usize) -> Box<Self> {
        Box::new(Node::Branch((0..cluster).map(|_| None).collect()))
    }

    fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch(children) => children
                .iter()
                .flatten()
                .map(|child| child.leaf_count())
                .sum(),
        }
    }
}

impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Leaf(items) => Node::Leaf(items.clone()),
            Node::Branch(children) => Node::Branch(children.clone()),
        }
    }
}

/// A resizable array stored as a tree of fixed-size clusters.
///
/// Access and resize cost `O(log_cluster(capacity))`. Nodes are only
/// allocated when a position beneath them is written through [`at`], so
/// reading an untouched position returns a shared default value.
///
/// [`at`]: SparseArray::at
pub struct SparseArray<T> {
    cluster: usize,
    capacity: usize,
    size: usize,
    root: Option<Box<Node<T>>>,
    empty: T,
}

impl<T: Default> SparseArray<T> {
    /// Create an empty array with the given branching factor.
    pub fn new(cluster: usize) -> SparseResult<Self> {
        if cluster < 2 {
            return Err(SparseError::InvalidClusterSize(cluster));
        }
        Ok(Self {
            cluster,
            capacity: cluster,
            size: 0,
            root: None,
            empty: T::default(),
        })
    }

    /// Mutable access to the element at `index`, allocating cluster nodes
    /// along the path as needed.
    pub fn at(&mut self, index: usize) -> SparseResult<&mut T> {
        if index >= self.size {
            return Err(SparseError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }
        locate(&mut self.root, self.cluster, self.capacity, index)
    }

    /// Grow or shrink the logical size to `size`.
    ///
    /// Growing wraps the root as child 0 of new roots until the capacity
    /// covers `size`. Shrinking unwraps roots while `capacity / cluster`
    /// still covers `size`, then releases every subtree past the last
    /// retained index.
    pub fn set_size(&mut self, size: usize) -> SparseResult<()> {
        while self.capacity < size {
            let capacity = self
                .capacity
                .checked_mul(self.cluster)
                .ok_or(SparseError::CapacityOverflow { requested: size })?;
            if let Some(root) = self.root.take() {
                let mut wider = Node::branch(self.cluster);
                if let Node::Branch(children) = &mut *wider {
                    children[0] = Some(root);
                }
                self.root = Some(wider);
            }
            self.capacity = capacity;
        }

        while self.capacity > self.cluster && self.capacity / self.cluster >= size {
            self.root = match self.root.take() {
                Some(root) => match *root {
                    Node::Branch(mut children) => children[0].take(),
                    Node::Leaf(_) => {
                        return Err(SparseError::ShapeMismatch {
                            capacity: self.capacity,
                        })
                    }
                },
                None => None,
            };
            self.capacity /= self.cluster;
        }

        if size < self.size {
            release(&mut self.root, self.cluster, self.capacity, size)?;
        }
        self.size = size;
        Ok(())
    }
}

impl<T> SparseArray<T> {
    /// Shared access to the element at `index`.
    ///
    /// Returns `None` past the logical size. Positions never written read
    /// back as the default value.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size {
            return None;
        }
        let Some(mut node) = self.root.as_deref() else {
            return Some(&self.empty);
        };
        let mut capacity = self.capacity;
        let mut offset = index;
        loop {
            match node {
                Node::Leaf(items) => return Some(items.get(offset).unwrap_or(&self.empty)),
                Node::Branch(children) => {
                    let child_capacity = capacity / self.cluster;
                    match children
                        .get(offset / child_capacity)
                        .and_then(|c| c.as_deref())
                    {
                        Some(child) => node = child,
                        None => return Some(&self.empty),
                    }
                    offset %= child_capacity;
                    capacity = child_capacity;
                }
            }
        }
    }

    /// Logical size.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the logical size is zero.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current capacity (a power of the cluster size).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Branching factor.
    pub fn cluster_size(&self) -> usize {
        self.cluster
    }

    /// Number of levels in the tree (1 when the root is a single leaf).
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut capacity = self.capacity;
        while capacity > self.cluster {
            capacity /= self.cluster;
            depth += 1;
        }
        depth
    }

    /// Number of leaf clusters currently allocated.
    pub fn allocated_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.leaf_count())
    }

    /// Iterate over the elements `0..len()`.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.size).filter_map(move |i| self.get(i))
    }
}

impl<T: Clone> Clone for SparseArray<T> {
    fn clone(&self) -> Self {
        Self {
            cluster: self.cluster,
            capacity: self.capacity,
            size: self.size,
            root: self.root.clone(),
            empty: self.empty.clone(),
        }
    }
}

impl<T> fmt::Debug for SparseArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseArray")
            .field("cluster", &self.cluster)
            .field("capacity", &self.capacity)
            .field("size", &self.size)
            .field("allocated_leaves", &self.allocated_leaves())
            .finish()
    }
}

fn locate<T: Default>(
    slot: &mut Option<Box<Node<T>>>,
    cluster: usize,
    capacity: usize,
    offset: usize,
) -> SparseResult<&mut T> {
    if capacity == cluster {
        let node = slot.get_or_insert_with(|| Node::leaf(cluster));
        return match &mut **node {
            Node::Leaf(items) => items
                .get_mut(offset)
                .ok_or(SparseError::ShapeMismatch { capacity }),
            Node::Branch(_) => Err(SparseError::ShapeMismatch { capacity }),
        };
    }
    let node = slot.get_or_insert_with(|| Node::branch(cluster));
    let child_capacity = capacity / cluster;
    match &mut **node {
        Node::Branch(children) => locate(
            &mut children[offset / child_capacity],
            cluster,
            child_capacity,
            offset % child_capacity,
        ),
        Node::Leaf(_) => Err(SparseError::ShapeMismatch { capacity }),
    }
}

/// Drop everything in `slot`'s subtree at or past `keep`.
///
/// Siblings after the last retained child are dropped wholesale; earlier
/// siblings are fully retained, so only the last retained child needs the
/// recursive pass.
fn release<T: Default>(
    slot: &mut Option<Box<Node<T>>>,
    cluster: usize,
    capacity: usize,
    keep: usize,
) -> SparseResult<()> {
    if keep == 0 {
        *slot = None;
        return Ok(());
    }
    let Some(node) = slot.as_deref_mut() else {
        return Ok(());
    };
    match node {
        Node::Leaf(items) => {
            let start = keep.min(items.len());
            for item in &mut items[start..] {
                *item = T::default();
            }
            Ok(())
        }
        Node::Branch(children) => {
            if capacity == cluster {
                return Err(SparseError::ShapeMismatch { capacity });
            }
            let child_capacity = capacity / cluster;
            let last = (keep - 1) / child_capacity;
            for child in &mut children[last + 1..] {
                *child = None;
            }
            release(
                &mut children[last],
                cluster,
                child_capacity,
                keep - last * child_capacity,
            )
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn shrink_and_regrow_retains_prefix_only(
            cluster in 2usize..9,
            n in 1usize..600,
            cut in 0usize..600,
        ) {
            let m = cut % n;
            let mut array = SparseArray::<u64>::new(cluster).unwrap();
            array.set_size(n).unwrap();
            for i in 0..n {
                *array.at(i).unwrap() = i as u64 + 1;
            }
            array.set_size(m).unwrap();
            prop_assert_eq!(array.len(), m);
            array.set_size(n).unwrap();
            for i in 0..m {
                prop_assert_eq!(array.get(i), Some(&(i as u64 + 1)));
            }
            for i in m..n {
                prop_assert_eq!(array.get(i), Some(&0));
            }
        }

        #[test]
        fn capacity_covers_size_minimally(cluster in 2usize..9, n in 0usize..5000) {
            let mut array = SparseArray::<u8>::new(cluster).unwrap();
            array.set_size(n).unwrap();
            prop_assert!(array.capacity() >= n);
            prop_assert!(array.capacity() == cluster || array.capacity() / cluster < n);
        }

        #[test]
        fn leaves_never_exceed_needed(cluster in 2usize..6, n in 1usize..400, m in 0usize..400) {
            let mut array = SparseArray::<u8>::new(cluster).unwrap();
            array.set_size(n).unwrap();
            for i in 0..n {
                *array.at(i).unwrap() = 1;
            }
            let m = m.min(n);
            array.set_size(m).unwrap();
            prop_assert_eq!(array.allocated_leaves(), m.div_ceil(cluster));
        }
    }
}
