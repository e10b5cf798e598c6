// src/exec/log_buffer.rs

//! Bounded, insertion-ordered capture of process output.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Ordered buffer of captured output units (lines or byte chunks).
///
/// With a capacity, appending to a full buffer evicts the oldest unit first.
/// A limit of `0` passed to [`LogBuffer::new`] means unbounded.
#[derive(Debug, Clone)]
pub struct LogBuffer<T> {
    units: VecDeque<T>,
    capacity: Option<NonZeroUsize>,
}

impl<T> LogBuffer<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            units: VecDeque::new(),
            capacity: NonZeroUsize::new(limit),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn append(&mut self, unit: T) {
        if let Some(cap) = self.capacity {
            while self.units.len() >= cap.get() {
                self.units.pop_front();
            }
        }
        self.units.push_back(unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity.map(NonZeroUsize::get)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.units.iter()
    }
}

impl LogBuffer<String> {
    /// Lines joined with `\n`, or `None` if nothing was captured.
    pub fn materialize(&self) -> Option<String> {
        if self.units.is_empty() {
            return None;
        }
        let mut out = String::new();
        for (i, line) in self.units.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line);
        }
        Some(out)
    }
}

impl LogBuffer<Vec<u8>> {
    /// Byte chunks concatenated as-is, or `None` if nothing was captured.
    pub fn materialize(&self) -> Option<Vec<u8>> {
        if self.units.is_empty() {
            return None;
        }
        let total = self.units.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(total);
        for chunk in &self.units {
            out.extend_from_slice(chunk);
        }
        Some(out)
    }
}
