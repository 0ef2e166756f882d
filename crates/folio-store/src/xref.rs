//! The cross-reference table and its free list.
//!
//! Free slots are chained through their `offset` field, starting at slot 0.
//! Deleting a slot bumps its generation and pushes it onto the head of the
//! chain. Once a slot's generation reaches the configured maximum it is
//! retired: still chained, but never handed out again.

use folio_sparse::SparseArray;
use folio_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::slot::SlotRecord;

/// Outcome of releasing a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// Linked into the free list at the given new generation.
    Recycled(u16),
    /// Generation exhausted; the slot stays chained but is never reused.
    Retired,
}

/// Slot records indexed by object number.
#[derive(Clone, Debug)]
pub struct XrefTable {
    slots: SparseArray<SlotRecord>,
    max_generation: u16,
}

impl XrefTable {
    /// A table holding only the free-list head.
    pub fn new(cluster_size: usize, max_generation: u16) -> StoreResult<Self> {
        let mut slots = SparseArray::new(cluster_size)?;
        slots.set_size(1)?;
        *slots.at(0)? = SlotRecord {
            offset: 0,
            generation: max_generation,
            in_use: false,
            dirty: true,
        };
        Ok(Self {
            slots,
            max_generation,
        })
    }

    /// Number of slots, including the head.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    pub fn max_generation(&self) -> u16 {
        self.max_generation
    }

    pub fn slot(&self, number: u32) -> Option<&SlotRecord> {
        self.slots.get(number as usize)
    }

    pub fn slots(&self) -> impl Iterator<Item = &SlotRecord> + '_ {
        self.slots.iter()
    }

    /// Identities currently in use, in number order.
    pub fn live(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.in_use)
            .map(|(number, slot)| ObjectId::new(number as u32, slot.generation))
    }

    /// Issue an identity: the lowest-numbered reusable free slot, or a new
    /// slot at generation 0.
    pub fn reserve(&mut self) -> StoreResult<ObjectId> {
        let reusable = (1..self.len()).find(|&number| {
            self.slots
                .get(number)
                .is_some_and(|slot| !slot.in_use && slot.generation < self.max_generation)
        });

        let id = match reusable {
            Some(number) => {
                self.unlink(number)?;
                let slot = self.slots.at(number)?;
                *slot = SlotRecord::reserved(slot.generation);
                ObjectId::new(number as u32, slot.generation)
            }
            None => {
                let number = self.len();
                let id_number = u32::try_from(number).map_err(|_| StoreError::TableFull)?;
                self.slots.set_size(number + 1)?;
                *self.slots.at(number)? = SlotRecord::reserved(0);
                ObjectId::new(id_number, 0)
            }
        };
        debug!(number = id.number, generation = id.generation, reused = reusable.is_some(), "reserved identity");
        Ok(id)
    }

    /// Check that `id` names an in-use slot at its current generation.
    pub fn validate(&self, id: ObjectId) -> StoreResult<&SlotRecord> {
        let slot = self
            .slot(id.number)
            .filter(|slot| id.number != 0 && slot.in_use)
            .ok_or(StoreError::NotReserved(id))?;
        if slot.generation != id.generation {
            return Err(StoreError::StaleIdentity {
                id,
                current: slot.generation,
            });
        }
        Ok(slot)
    }

    /// Point an in-use slot at a written body.
    pub fn set_offset(&mut self, id: ObjectId, offset: u64) -> StoreResult<()> {
        self.validate(id)?;
        let slot = self.slots.at(id.number as usize)?;
        slot.offset = offset;
        slot.dirty = true;
        Ok(())
    }

    /// Free `id`, bumping its generation and pushing it onto the chain.
    ///
    /// A slot whose generation reaches the maximum stays in the chain but is
    /// never reserved again.
    pub fn release(&mut self, id: ObjectId) -> StoreResult<Release> {
        self.validate(id)?;
        let number = id.number as usize;
        let next_generation = id.generation.saturating_add(1).min(self.max_generation);

        let head = self.slots.at(0)?;
        let next_free = head.offset;
        head.offset = number as u64;
        head.dirty = true;
        *self.slots.at(number)? = SlotRecord {
            offset: next_free,
            generation: next_generation,
            in_use: false,
            dirty: true,
        };
        let outcome = if next_generation < self.max_generation {
            Release::Recycled(next_generation)
        } else {
            Release::Retired
        };
        debug!(number, ?outcome, "released identity");
        Ok(outcome)
    }

    /// Remove `number` from the free chain, wherever it sits.
    fn unlink(&mut self, number: usize) -> StoreResult<()> {
        let target = number as u64;
        let mut previous = 0usize;
        // A well-formed chain visits each slot at most once.
        for _ in 0..self.len() {
            let current = self.slots.get(previous).map_or(0, |slot| slot.offset);
            if current == 0 {
                break;
            }
            if current == target {
                let next = self.slots.get(number).map_or(0, |slot| slot.offset);
                let link = self.slots.at(previous)?;
                link.offset = next;
                link.dirty = true;
                return Ok(());
            }
            previous = current as usize;
        }
        Ok(())
    }

    /// Maximal runs of dirty slots as `(first, length)`.
    pub fn dirty_segments(&self) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        let mut run: Option<(usize, usize)> = None;
        for (number, slot) in self.slots.iter().enumerate() {
            if !slot.dirty {
                segments.extend(run.take());
            } else if let Some((_, len)) = &mut run {
                *len += 1;
            } else {
                run = Some((number, 1));
            }
        }
        segments.extend(run);
        segments
    }

    /// Reserved identities with no body yet.
    pub fn pending(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_pending())
            .map(|(number, slot)| ObjectId::new(number as u32, slot.generation))
    }

    /// Free-list chain from the head, for inspection.
    pub fn free_chain(&self) -> Vec<u32> {
        let mut chain = Vec::new();
        let mut current = self.slots.get(0).map_or(0, |slot| slot.offset);
        while current != 0 && chain.len() < self.len() {
            chain.push(current as u32);
            current = self.slots.get(current as usize).map_or(0, |slot| slot.offset);
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use proptest::prelude::*;

    use super::*;

    fn table() -> XrefTable {
        XrefTable::new(4, folio_types::MAX_GENERATION).unwrap()
    }

    // -----------------------------------------------------------------------
    // Reservation
    // -----------------------------------------------------------------------

    #[test]
    fn new_table_has_head_only() {
        let table = table();
        assert_eq!(table.len(), 1);
        assert!(table.is_empty());
        let head = table.slot(0).unwrap();
        assert!(!head.in_use);
        assert_eq!(head.generation, 65535);
        assert!(head.dirty);
    }

    #[test]
    fn reserve_appends_from_one() {
        let mut table = table();
        assert_eq!(table.reserve().unwrap(), ObjectId::new(1, 0));
        assert_eq!(table.reserve().unwrap(), ObjectId::new(2, 0));
        assert_eq!(table.reserve().unwrap(), ObjectId::new(3, 0));
        assert_eq!(table.len(), 4);
        assert_eq!(table.pending().count(), 3);
    }

    #[test]
    fn delete_then_reserve_reuses_with_next_generation() {
        let mut table = table();
        let _one = table.reserve().unwrap();
        let two = table.reserve().unwrap();
        let _three = table.reserve().unwrap();

        assert_eq!(table.release(two).unwrap(), Release::Recycled(1));
        assert_eq!(table.free_chain(), vec![2]);
        assert_eq!(table.reserve().unwrap(), ObjectId::new(2, 1));
        assert!(table.free_chain().is_empty());
        assert_eq!(table.reserve().unwrap(), ObjectId::new(4, 0));
    }

    #[test]
    fn linear_scan_prefers_lowest_number() {
        let mut table = table();
        let ids: Vec<_> = (0..4).map(|_| table.reserve().unwrap()).collect();
        table.release(ids[0]).unwrap();
        table.release(ids[2]).unwrap();
        // Head points at 3, which links to 1.
        assert_eq!(table.free_chain(), vec![3, 1]);

        assert_eq!(table.reserve().unwrap(), ObjectId::new(1, 1));
        assert_eq!(table.free_chain(), vec![3]);
        assert_eq!(table.reserve().unwrap(), ObjectId::new(3, 1));
        assert!(table.free_chain().is_empty());
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn stale_and_unreserved_identities_rejected() {
        let mut table = table();
        let id = table.reserve().unwrap();
        table.release(id).unwrap();
        assert!(matches!(table.validate(id), Err(StoreError::NotReserved(_))));

        let reused = table.reserve().unwrap();
        assert_eq!(reused.number, id.number);
        assert!(matches!(
            table.validate(id),
            Err(StoreError::StaleIdentity { current: 1, .. })
        ));
        assert!(matches!(
            table.validate(ObjectId::new(9, 0)),
            Err(StoreError::NotReserved(_))
        ));
        assert!(table.validate(ObjectId::sentinel()).is_err());
    }

    #[test]
    fn exhausted_generation_retires_slot() {
        let mut table = XrefTable::new(4, 2).unwrap();
        let first = table.reserve().unwrap();
        assert_eq!(table.release(first).unwrap(), Release::Recycled(1));
        let second = table.reserve().unwrap();
        assert_eq!(second, ObjectId::new(1, 1));
        assert_eq!(table.release(second).unwrap(), Release::Retired);

        let slot = table.slot(1).unwrap();
        assert_eq!((slot.offset, slot.generation, slot.in_use), (0, 2, false));
        assert_eq!(table.free_chain(), vec![1]);
        assert_eq!(table.reserve().unwrap(), ObjectId::new(2, 0));
        assert_eq!(table.free_chain(), vec![1]);

        // Retired slots stay linked behind later releases.
        let third = table.reserve().unwrap();
        assert_eq!(third, ObjectId::new(3, 0));
        assert_eq!(table.release(third).unwrap(), Release::Recycled(1));
        assert_eq!(table.free_chain(), vec![3, 1]);
        assert_eq!(table.reserve().unwrap(), ObjectId::new(3, 1));
        assert_eq!(table.free_chain(), vec![1]);
    }

    // -----------------------------------------------------------------------
    // Segments
    // -----------------------------------------------------------------------

    #[test]
    fn dirty_segments_are_maximal_runs() {
        let mut table = table();
        for _ in 0..5 {
            table.reserve().unwrap();
        }
        assert_eq!(table.dirty_segments(), vec![(0, 6)]);

        for number in [1usize, 2, 4] {
            table.slots.at(number).unwrap().dirty = false;
        }
        assert_eq!(table.dirty_segments(), vec![(0, 1), (3, 1), (5, 1)]);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    #[derive(Clone, Debug)]
    enum Op {
        Reserve,
        Delete(usize),
    }

    fn ops() -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(
            prop_oneof![Just(Op::Reserve), any::<usize>().prop_map(Op::Delete)],
            1..200,
        )
    }

    proptest! {
        #[test]
        fn identities_unique_and_generations_increase(
            ops in ops(),
            max_generation in 2u16..6,
        ) {
            let mut table = XrefTable::new(3, max_generation).unwrap();
            let mut live: Vec<ObjectId> = Vec::new();
            let mut last_generation: HashMap<u32, u16> = HashMap::new();
            let mut retired: HashSet<u32> = HashSet::new();

            for op in ops {
                match op {
                    Op::Reserve => {
                        let id = table.reserve().unwrap();
                        prop_assert!(!retired.contains(&id.number));
                        if let Some(&previous) = last_generation.get(&id.number) {
                            prop_assert!(id.generation > previous);
                        }
                        last_generation.insert(id.number, id.generation);
                        live.push(id);
                    }
                    Op::Delete(pick) if !live.is_empty() => {
                        let id = live.swap_remove(pick % live.len());
                        if table.release(id).unwrap() == Release::Retired {
                            retired.insert(id.number);
                        }
                    }
                    Op::Delete(_) => {}
                }

                let unique: HashSet<_> = live.iter().map(|id| id.number).collect();
                prop_assert_eq!(unique.len(), live.len());
                for id in &live {
                    prop_assert!(table.validate(*id).is_ok());
                }
                prop_assert_eq!(table.live().count(), live.len());
            }
        }
    }
}
