//! Fixed-capacity circular sample buffer.

use crate::error::{Error, Result};
use std::collections::VecDeque;

/// Fixed-capacity ring of samples for one series, oldest evicted first.
///
/// # Example
///
/// ```
/// use trueno_strip::model::RingColumn;
///
/// let mut col = RingColumn::new("temp", 3).unwrap();
/// for v in [1.0, 2.0, 3.0, 4.0] {
///     col.append(v);
/// }
/// assert_eq!(col.iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
/// assert_eq!(col.max().unwrap(), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RingColumn<T> {
    name: String,
    capacity: usize,
    values: VecDeque<T>,
}

impl<T: PartialOrd + Copy> RingColumn<T> {
    /// Create an empty column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] when `capacity` is zero.
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self {
            name: name.into(),
            capacity,
            values: VecDeque::with_capacity(capacity),
        })
    }

    /// Series label; empty for timestamp columns.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of retained samples.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no samples are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when the next append evicts the oldest sample.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Push a sample, dropping the oldest one when full.
    pub fn append(&mut self, value: T) {
        if self.is_full() {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Sample at `index`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowOutOfRange`] when `index >= len()`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.values.get(index).copied().ok_or(Error::RowOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    /// Overwrite the sample at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowOutOfRange`] when `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(Error::RowOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Most recent sample, if any.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.values.back().copied()
    }

    /// Largest retained sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySource`] when the column is empty.
    pub fn max(&self) -> Result<T> {
        self.reduce(|candidate, best| candidate > best)
    }

    /// Smallest retained sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySource`] when the column is empty.
    pub fn min(&self) -> Result<T> {
        self.reduce(|candidate, best| candidate < best)
    }

    fn reduce(&self, better: impl Fn(T, T) -> bool) -> Result<T> {
        let mut iter = self.values.iter().copied();
        let first = iter.next().ok_or(Error::EmptySource)?;
        Ok(iter.fold(first, |best, v| if better(v, best) { v } else { best }))
    }

    /// Change the capacity, keeping the most recent `min(len, new_capacity)`
    /// samples in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] when `new_capacity` is zero.
    pub fn resize(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity == 0 {
            return Err(Error::InvalidCapacity(new_capacity));
        }
        let excess = self.values.len().saturating_sub(new_capacity);
        self.values.drain(..excess);
        if new_capacity > self.capacity {
            self.values.reserve(new_capacity - self.values.len());
        } else {
            self.values.shrink_to(new_capacity);
        }
        self.capacity = new_capacity;
        Ok(())
    }

    /// Drop every sample, keeping the capacity.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Samples oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = T> + ExactSizeIterator + '_ {
        self.values.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            RingColumn::<f64>::new("x", 0),
            Err(Error::InvalidCapacity(0))
        ));
    }

    #[test]
    fn test_append_evicts_oldest() {
        let mut col = RingColumn::new("", 3).unwrap();
        for t in [10_i64, 20, 30] {
            col.append(t);
        }
        assert!(col.is_full());
        col.append(40);
        assert_eq!(col.len(), 3);
        assert_eq!(col.get(0).unwrap(), 20);
        assert_eq!(col.last(), Some(40));
    }

    #[test]
    fn test_get_set_out_of_range() {
        let mut col = RingColumn::new("v", 2).unwrap();
        col.append(1.0);
        assert!(matches!(
            col.get(1),
            Err(Error::RowOutOfRange { index: 1, len: 1 })
        ));
        assert!(col.set(5, 2.0).is_err());
        col.set(0, 9.0).unwrap();
        assert_eq!(col.get(0).unwrap(), 9.0);
    }

    #[test]
    fn test_min_max_empty() {
        let col = RingColumn::<f64>::new("v", 4).unwrap();
        assert!(matches!(col.max(), Err(Error::EmptySource)));
        assert!(matches!(col.min(), Err(Error::EmptySource)));
    }

    #[test]
    fn test_min_max_scan() {
        let mut col = RingColumn::new("v", 8).unwrap();
        for v in [3.0, -1.5, 7.25, 0.0] {
            col.append(v);
        }
        assert_eq!(col.max().unwrap(), 7.25);
        assert_eq!(col.min().unwrap(), -1.5);
    }

    #[test]
    fn test_resize_shrink_keeps_recent() {
        let mut col = RingColumn::new("v", 5).unwrap();
        for v in 1..=5 {
            col.append(v);
        }
        col.resize(2).unwrap();
        assert_eq!(col.iter().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(col.capacity(), 2);
    }

    #[test]
    fn test_resize_grow_keeps_all() {
        let mut col = RingColumn::new("v", 2).unwrap();
        col.append(1);
        col.append(2);
        col.resize(4).unwrap();
        col.append(3);
        assert_eq!(col.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(col.resize(0).is_err());
    }

    #[test]
    fn test_clear() {
        let mut col = RingColumn::new("v", 2).unwrap();
        col.append(1);
        col.clear();
        assert!(col.is_empty());
        assert_eq!(col.capacity(), 2);
    }
}
