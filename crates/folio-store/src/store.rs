use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use folio_object::{Object, ReferenceTable};
use folio_types::ObjectId;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::output::{Output, OutputCursor};
use crate::slot::SlotRecord;
use crate::xref::{Release, XrefTable};

/// A payload kept in memory after it was written.
#[derive(Clone, Debug)]
struct Written {
    object: Object,
    len: usize,
}

/// Summary of a successful close.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloseReport {
    /// Trailer `/Size`: number of table slots including the head.
    pub size: usize,
    /// Number of table segments emitted.
    pub segments: usize,
    /// Byte offset of the `xref` keyword.
    pub xref_offset: u64,
    pub output: Output,
}

/// One output file under construction.
///
/// The store hands out identities, appends framed object bodies to its
/// output as they are written, and emits the cross-reference table and
/// trailer on [`close`](Self::close). Bodies are appended in write order,
/// not identity order, which is what makes forward references possible:
/// reserve an identity, mention it anywhere, write it later.
///
/// Written payloads are also retained in memory so they can be resolved
/// and copied into other stores.
pub struct ObjectStore {
    config: StoreConfig,
    table: XrefTable,
    output: OutputCursor,
    payloads: HashMap<u32, Written>,
    catalog: Option<ObjectId>,
    info: Option<ObjectId>,
}

impl ObjectStore {
    /// Create a file-backed store at `path`, truncating any existing file.
    pub fn create(path: impl AsRef<Path>, config: StoreConfig) -> StoreResult<Self> {
        let path = path.as_ref();
        let store = Self::with_output(OutputCursor::create(path)?, config)?;
        debug!(path = %path.display(), "store created");
        Ok(store)
    }

    /// Create a store that writes into memory.
    pub fn in_memory(config: StoreConfig) -> StoreResult<Self> {
        Self::with_output(OutputCursor::in_memory(), config)
    }

    /// Reading an existing file's table and trailer is not implemented.
    pub fn open_existing(path: impl AsRef<Path>) -> StoreResult<Self> {
        Err(StoreError::Unsupported(format!(
            "opening existing store {}",
            path.as_ref().display()
        )))
    }

    fn with_output(mut output: OutputCursor, config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let table = XrefTable::new(config.cluster_size, config.max_generation)?;
        output.append(&config.header())?;
        Ok(Self {
            config,
            table,
            output,
            payloads: HashMap::new(),
            catalog: None,
            info: None,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn table(&self) -> &XrefTable {
        &self.table
    }

    pub fn slot(&self, number: u32) -> Option<SlotRecord> {
        self.table.slot(number).copied()
    }

    /// Current output position.
    pub fn position(&self) -> u64 {
        self.output.position()
    }

    pub fn catalog(&self) -> Option<ObjectId> {
        self.catalog
    }

    pub fn info(&self) -> Option<ObjectId> {
        self.info
    }

    // -----------------------------------------------------------------------
    // Identities
    // -----------------------------------------------------------------------

    /// Reserve an identity, reusing the lowest free slot if one remains.
    pub fn reserve(&mut self) -> StoreResult<ObjectId> {
        self.table.reserve()
    }

    /// Free an identity. Its payload is dropped and the slot is either
    /// recycled at the next generation or retired.
    pub fn delete(&mut self, id: ObjectId) -> StoreResult<Release> {
        let outcome = self.table.release(id)?;
        self.payloads.remove(&id.number);
        if self.catalog == Some(id) {
            self.catalog = None;
        }
        if self.info == Some(id) {
            self.info = None;
        }
        debug!(%id, ?outcome, "deleted object");
        Ok(outcome)
    }

    pub fn is_written(&self, id: ObjectId) -> bool {
        self.table.validate(id).is_ok_and(|slot| !slot.is_pending())
    }

    // -----------------------------------------------------------------------
    // Payloads
    // -----------------------------------------------------------------------

    /// Write the first payload for a reserved identity.
    ///
    /// References inside `object` are numbered through `refs`, which must
    /// describe this store. Returns the body's byte offset.
    pub fn write_at(
        &mut self,
        id: ObjectId,
        object: impl Into<Object>,
        refs: &dyn ReferenceTable,
    ) -> StoreResult<u64> {
        if !self.table.validate(id)?.is_pending() {
            return Err(StoreError::DoubleWrite(id));
        }
        let offset = self.append_body(id, object.into(), refs)?;
        debug!(%id, offset, "wrote object");
        Ok(offset)
    }

    /// Replace the payload of an identity by appending a new body.
    ///
    /// The previous body stays in the output but is no longer referenced by
    /// the table. Also accepts identities that are reserved but unwritten.
    pub fn rewrite_at(
        &mut self,
        id: ObjectId,
        object: impl Into<Object>,
        refs: &dyn ReferenceTable,
    ) -> StoreResult<u64> {
        self.table.validate(id)?;
        let offset = self.append_body(id, object.into(), refs)?;
        debug!(%id, offset, "rewrote object");
        Ok(offset)
    }

    /// Reserve and write in one step, for payloads with no forward
    /// references.
    pub fn write(&mut self, object: impl Into<Object>, refs: &dyn ReferenceTable) -> StoreResult<ObjectId> {
        let id = self.reserve()?;
        self.write_at(id, object, refs)?;
        Ok(id)
    }

    fn append_body(&mut self, id: ObjectId, object: Object, refs: &dyn ReferenceTable) -> StoreResult<u64> {
        // Serialize before touching the output so a failure leaves no trace.
        let mut body = id.header().into_bytes();
        body.push(b'\n');
        object.write_to(&mut body, Some(refs))?;
        body.extend_from_slice(b"\nendobj\n");

        let offset = self.output.append(&body)?;
        self.table.set_offset(id, offset)?;
        self.payloads.insert(
            id.number,
            Written {
                object,
                len: body.len(),
            },
        );
        Ok(offset)
    }

    /// The retained payload of a written identity.
    pub fn resolve(&self, id: ObjectId) -> StoreResult<&Object> {
        self.table.validate(id)?;
        self.payloads
            .get(&id.number)
            .map(|written| &written.object)
            .ok_or(StoreError::NotWritten(id))
    }

    /// The framed body bytes of a written identity, read back from the
    /// output.
    pub fn read_raw(&mut self, id: ObjectId) -> StoreResult<Vec<u8>> {
        let offset = self.table.validate(id)?.offset;
        let len = self
            .payloads
            .get(&id.number)
            .map(|written| written.len)
            .ok_or(StoreError::NotWritten(id))?;
        Ok(self.output.read_at(offset, len)?)
    }

    // -----------------------------------------------------------------------
    // Trailer
    // -----------------------------------------------------------------------

    /// Register the document catalog. Required before close.
    pub fn set_catalog(&mut self, id: ObjectId) -> StoreResult<()> {
        self.table.validate(id)?;
        self.catalog = Some(id);
        Ok(())
    }

    /// Register the optional document information dictionary.
    pub fn set_info(&mut self, id: ObjectId) -> StoreResult<()> {
        self.table.validate(id)?;
        self.info = Some(id);
        Ok(())
    }

    /// Check the conditions `close` enforces without consuming the store.
    pub fn check_closable(&self) -> StoreResult<()> {
        if self.catalog.is_none() {
            return Err(StoreError::MissingCatalog);
        }
        let mut pending = self.table.pending();
        if let Some(first) = pending.next() {
            return Err(StoreError::UnwrittenObjects {
                count: 1 + pending.count(),
                first,
            });
        }
        Ok(())
    }

    /// Emit the table and trailer, then flush and release the output.
    ///
    /// Only dirty slots are written, as maximal contiguous segments.
    pub fn close(mut self) -> StoreResult<CloseReport> {
        self.check_closable()?;
        let catalog = self.catalog.ok_or(StoreError::MissingCatalog)?;

        let size = self.table.len();
        let segments = self.table.dirty_segments();
        let mut section = b"xref\n".to_vec();
        for &(first, len) in &segments {
            section.extend_from_slice(format!("{first} {len}\n").as_bytes());
            for number in first..first + len {
                let slot = self.table.slot(number as u32).copied().unwrap_or_default();
                section.extend_from_slice(slot.xref_line().as_bytes());
            }
        }
        let xref_offset = self.output.append(&section)?;

        let mut trailer = format!("trailer\n<</Size {size} /Root {catalog}");
        if let Some(info) = self.info {
            trailer.push_str(&format!(" /Info {info}"));
        }
        trailer.push_str(&format!(">>\nstartxref\n{xref_offset}\n%%EOF\n"));
        self.output.append(trailer.as_bytes())?;

        let output = self.output.finish()?;
        info!(size, segments = segments.len(), xref_offset, "store closed");
        Ok(CloseReport {
            size,
            segments: segments.len(),
            xref_offset,
            output,
        })
    }
}

impl fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("slots", &self.table.len())
            .field("position", &self.output.position())
            .field("catalog", &self.catalog)
            .field("info", &self.info)
            .finish()
    }
}
