use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    document::model::{Layout, Shape},
    foundation::error::{DeckError, DeckResult},
};

/// One produced item of the output document.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputItem {
    /// 1-based index of the source item this was produced from.
    pub source_index: usize,
    /// Template layout index the item was instantiated from.
    pub layout: usize,
    /// Name of that layout.
    pub layout_name: String,
    /// Layout placeholders followed by copied content.
    pub shapes: Vec<Shape>,
}

impl OutputItem {
    /// Fresh item carrying the placeholders of `layout`.
    pub fn from_layout(source_index: usize, layout_idx: usize, layout: &Layout) -> Self {
        Self {
            source_index,
            layout: layout_idx,
            layout_name: layout.name.clone(),
            shapes: layout.placeholders.clone(),
        }
    }
}

/// Opaque reference to an item slot in the output document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemHandle(pub(crate) usize);

/// Structural mutations of the output document.
///
/// Implementations are not required to be thread-safe; [`SharedDocument`] serializes every
/// call.
pub trait DocumentWriter: Send {
    /// Add a new item and return its handle.
    fn append(&mut self, item: OutputItem) -> ItemHandle;
    /// Overwrite the item behind `handle`.
    fn replace(&mut self, handle: ItemHandle, item: OutputItem) -> DeckResult<()>;
    /// Consume the writer and return the finished document.
    fn into_document(self: Box<Self>) -> OutputDocument;
}

/// Output document: the collection of produced items.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputDocument {
    /// Produced items.
    pub items: Vec<OutputItem>,
}

impl OutputDocument {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return `true` when nothing has been produced.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Put items back into source order.
    ///
    /// Concurrent runs append in completion order; sorting is stable so items sharing a source
    /// index keep their relative order.
    pub fn sort_by_source(&mut self) {
        self.items.sort_by_key(|item| item.source_index);
    }
}

impl DocumentWriter for OutputDocument {
    fn append(&mut self, item: OutputItem) -> ItemHandle {
        self.items.push(item);
        ItemHandle(self.items.len() - 1)
    }

    fn replace(&mut self, handle: ItemHandle, item: OutputItem) -> DeckResult<()> {
        let slot = self.items.get_mut(handle.0).ok_or_else(|| {
            DeckError::precondition(format!("item handle {} is out of range", handle.0))
        })?;
        if slot.source_index != item.source_index {
            return Err(DeckError::precondition(format!(
                "item handle {} belongs to item {}, not item {}",
                handle.0, slot.source_index, item.source_index
            )));
        }
        *slot = item;
        Ok(())
    }

    fn into_document(self: Box<Self>) -> OutputDocument {
        *self
    }
}

/// The single output document shared by all runs of a conversion job.
///
/// Every structural mutation goes through one document-wide lock; runs only ever see the
/// [`ItemHandle`]s returned to them.
pub struct SharedDocument {
    inner: Mutex<Box<dyn DocumentWriter>>,
}

impl SharedDocument {
    /// Share a fresh [`OutputDocument`].
    pub fn new() -> Self {
        Self::with_writer(Box::new(OutputDocument::new()))
    }

    /// Share a custom writer.
    pub fn with_writer(writer: Box<dyn DocumentWriter>) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    /// Append `item` under the document lock.
    pub fn append(&self, item: OutputItem) -> ItemHandle {
        self.lock().append(item)
    }

    /// Replace the item behind `handle` under the document lock.
    pub fn replace(&self, handle: ItemHandle, item: OutputItem) -> DeckResult<()> {
        self.lock().replace(handle, item)
    }

    /// Finish the job: unwrap the writer and return the document in source order.
    pub fn finalize(self) -> OutputDocument {
        let writer = self.inner.into_inner().unwrap_or_else(PoisonError::into_inner);
        let mut doc = writer.into_document();
        doc.sort_by_source();
        doc
    }

    // Writers mutate in a single call, so a run that panicked while holding the lock cannot
    // leave a half-written item behind; later runs keep going.
    fn lock(&self) -> MutexGuard<'_, Box<dyn DocumentWriter>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SharedDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDocument").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/output.rs"]
mod tests;
