//! Bounded history of received stream messages.

use std::collections::VecDeque;

use super::types::StreamMessage;

/// Buffer of capacity zero: every push is discarded.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullBuffer;

/// Fixed capacity FIFO. Pushing into a full buffer evicts the oldest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingBuffer<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    /// `capacity` must be non-zero, use [`NullBuffer`] otherwise.
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Append `value`, returning the evicted entry if the buffer was full.
    fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(value);
        evicted
    }
}

/// Messages a session keeps after yielding them, oldest first.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum History<T = StreamMessage> {
    Null(NullBuffer),
    Ring(RingBuffer<T>),
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::Null(NullBuffer)
    }
}

impl<T> History<T> {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            Self::Null(NullBuffer)
        } else {
            Self::Ring(RingBuffer::new(capacity))
        }
    }

    pub fn push(&mut self, value: T) {
        let Self::Ring(ring) = self else {
            return;
        };

        if ring.push(value).is_some() {
            #[cfg(feature = "tracing")]
            tracing::debug!(capacity = ring.capacity, "history full, evicted oldest message");
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let entries = match self {
            Self::Null(_) => None,
            Self::Ring(ring) => Some(ring.entries.iter()),
        };
        entries.into_iter().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Null(_) => 0,
            Self::Ring(ring) => ring.entries.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        match self {
            Self::Null(_) => 0,
            Self::Ring(ring) => ring.capacity,
        }
    }

    pub fn clear(&mut self) {
        if let Self::Ring(ring) = self {
            ring.entries.clear();
        }
    }
}

impl<'history, T> IntoIterator for &'history History<T> {
    type Item = &'history T;
    type IntoIter = Box<dyn Iterator<Item = &'history T> + 'history>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
