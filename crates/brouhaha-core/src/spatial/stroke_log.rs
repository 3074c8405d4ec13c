//! Undo-capable log of stroke batches.

use std::collections::VecDeque;

use super::model::PlacedObject;
use crate::error::{ArError, Result};

/// Objects placed during one continuous spray gesture.
pub type StrokeBatch = Vec<PlacedObject>;

/// Ordered log of closed stroke batches, most recent first.
///
/// A gesture opens a batch with [`StrokeLog::start_batch`], fills it with
/// [`StrokeLog::append`] and closes it with [`StrokeLog::end_batch`]. Only
/// non-empty batches reach the log, so [`StrokeLog::undo_last`] always removes
/// a whole visible stroke.
#[derive(Debug, Default)]
pub struct StrokeLog {
    batches: VecDeque<StrokeBatch>,
    open: Option<StrokeBatch>,
}

impl StrokeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new empty batch.
    ///
    /// A batch that is still open is closed first, as if its gesture had ended.
    pub fn start_batch(&mut self) {
        if self.open.is_some() {
            self.end_batch();
        }
        self.open = Some(StrokeBatch::new());
    }

    /// Appends to the open batch.
    ///
    /// # Errors
    ///
    /// Returns [`ArError::NoOpenBatch`] when no gesture is in progress; the
    /// object is not recorded.
    pub fn append(&mut self, object: PlacedObject) -> Result<()> {
        match self.open.as_mut() {
            Some(batch) => {
                batch.push(object);
                Ok(())
            }
            None => Err(ArError::NoOpenBatch),
        }
    }

    /// Closes the open batch, prepending it to the log if it holds anything.
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.open.take() {
            if !batch.is_empty() {
                self.batches.push_front(batch);
            }
        }
    }

    /// Removes the most recent batch and returns its objects in append order.
    ///
    /// Returns an empty vec and leaves the log untouched when it is empty.
    pub fn undo_last(&mut self) -> Vec<PlacedObject> {
        self.batches.pop_front().unwrap_or_default()
    }

    /// Number of closed batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn has_open_batch(&self) -> bool {
        self.open.is_some()
    }

    /// Closed batches, most recent first.
    pub fn batches(&self) -> impl Iterator<Item = &StrokeBatch> {
        self.batches.iter()
    }

    /// Drops every batch, open or closed.
    pub fn clear(&mut self) {
        self.batches.clear();
        self.open = None;
    }
}
