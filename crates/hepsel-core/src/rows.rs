//! Fixed-capacity row storage for flat event records

use serde::{Deserialize, Serialize};

/// Append-only rows with a hard capacity.
///
/// Pushing beyond capacity drops the row and counts it; callers log the
/// truncation. `clear` resets both the rows and the dropped count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedRows<T> {
    rows: Vec<T>,
    capacity: usize,
    dropped: usize,
}

/// Outcome of a push into [`BoundedRows`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pushed {
    /// Stored at this slot index
    Stored(usize),
    /// Capacity reached; the row was discarded
    Truncated,
}

impl Pushed {
    pub fn slot(self) -> Option<usize> {
        match self {
            Pushed::Stored(index) => Some(index),
            Pushed::Truncated => None,
        }
    }
}

impl<T> BoundedRows<T> {
    /// Create empty rows bounded at `capacity`
    pub fn new(capacity: usize) -> Self {
        Self {
            rows: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    /// Append a row if a slot is free
    pub fn push(&mut self, row: T) -> Pushed {
        if self.rows.len() >= self.capacity {
            self.dropped += 1;
            return Pushed::Truncated;
        }
        self.rows.push(row);
        Pushed::Stored(self.rows.len() - 1)
    }

    /// Occupancy counter
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rows discarded since the last clear
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.rows.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Reset for the next event
    pub fn clear(&mut self) {
        self.rows.clear();
        self.dropped = 0;
    }
}

impl<'a, T> IntoIterator for &'a BoundedRows<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
