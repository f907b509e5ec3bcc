//! Synchronized multi-series time-series table.

use super::column::RingColumn;
use super::cursor::TableCursor;
use crate::clock::{Clock, USEC_PER_SEC};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

/// Default visible window: one minute.
pub const DEFAULT_TIMESPAN_US: i64 = 60 * USEC_PER_SEC;

/// Default lower value bound.
pub const DEFAULT_VALUE_MIN: f64 = 0.0;

/// Default upper value bound.
pub const DEFAULT_VALUE_MAX: f64 = 100.0;

/// A table shared between its sampler and the charts observing it.
pub type SharedTable = Rc<RefCell<TimeSeriesTable>>;

/// Notification emitted to table subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableEvent {
    /// A row was appended, a value was written, or rows were dropped.
    Changed,
    /// The lower value bound moved to the given value.
    ValueMinChanged(f64),
    /// The upper value bound moved to the given value.
    ValueMaxChanged(f64),
    /// The visible timespan changed (microseconds).
    TimespanChanged(i64),
}

/// One timestamp column plus N value columns of equal length.
///
/// Rows are appended atomically. Value bounds only ever expand to cover the
/// data; they are never shrunk automatically.
///
/// # Example
///
/// ```
/// use trueno_strip::model::TimeSeriesTable;
///
/// let mut table = TimeSeriesTable::new(&["gpu"], 3).unwrap();
/// table.append(10, &[1.0]).unwrap();
/// table.append(20, &[150.0]).unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.value_max(), 150.0);
/// ```
#[derive(Debug)]
pub struct TimeSeriesTable {
    timestamps: RingColumn<i64>,
    columns: Vec<RingColumn<f64>>,
    value_min: f64,
    value_max: f64,
    timespan: i64,
    subscribers: Vec<Sender<TableEvent>>,
}

impl TimeSeriesTable {
    /// Create an empty table with one value column per series name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] when `capacity` is zero.
    pub fn new<S: AsRef<str>>(series_names: &[S], capacity: usize) -> Result<Self> {
        let columns = series_names
            .iter()
            .map(|name| RingColumn::new(name.as_ref(), capacity))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            timestamps: RingColumn::new("", capacity)?,
            columns,
            value_min: DEFAULT_VALUE_MIN,
            value_max: DEFAULT_VALUE_MAX,
            timespan: DEFAULT_TIMESPAN_US,
            subscribers: Vec::new(),
        })
    }

    /// Set the visible timespan (builder style).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimespan`] unless `timespan_us > 0`.
    pub fn with_timespan(mut self, timespan_us: i64) -> Result<Self> {
        if timespan_us <= 0 {
            return Err(Error::InvalidTimespan(timespan_us));
        }
        self.timespan = timespan_us;
        Ok(self)
    }

    /// Set the declared value bounds (builder style).
    ///
    /// # Errors
    ///
    /// Returns [`Error::BoundsOrder`] unless `min < max`.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Result<Self> {
        if !is_ordered(min, max) {
            return Err(Error::BoundsOrder { min, max });
        }
        self.value_min = min;
        self.value_max = max;
        Ok(self)
    }

    /// Wrap the table for sharing with observers.
    #[must_use]
    pub fn into_shared(self) -> SharedTable {
        Rc::new(RefCell::new(self))
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Register an observer. Events are queued until the receiver drains them;
    /// dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<TableEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn emit(&mut self, event: TableEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    // ========================================================================
    // Shape
    // ========================================================================

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// True when the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Maximum number of rows retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.timestamps.capacity()
    }

    /// Number of value columns.
    #[must_use]
    pub fn series_count(&self) -> usize {
        self.columns.len()
    }

    /// Series names in column order.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(RingColumn::name)
    }

    /// Change the capacity of every column, keeping the most recent rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] when `capacity` is zero.
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        self.timestamps.resize(capacity)?;
        for column in &mut self.columns {
            column.resize(capacity)?;
        }
        self.emit(TableEvent::Changed);
        Ok(())
    }

    /// Drop every row. Bounds and timespan are kept.
    pub fn clear(&mut self) {
        self.timestamps.clear();
        for column in &mut self.columns {
            column.clear();
        }
        self.emit(TableEvent::Changed);
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Append one row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueCountMismatch`] when `values.len()` differs from
    /// [`series_count`](Self::series_count); the table is left untouched.
    pub fn append(&mut self, timestamp: i64, values: &[f64]) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::ValueCountMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        self.timestamps.append(timestamp);
        for (column, &value) in self.columns.iter_mut().zip(values) {
            column.append(value);
        }
        for &value in values {
            self.expand_bounds(value);
        }
        self.emit(TableEvent::Changed);
        Ok(())
    }

    /// Overwrite one cell, expanding bounds as needed.
    pub(crate) fn write_value(&mut self, row: usize, column: usize, value: f64) -> Result<()> {
        let count = self.columns.len();
        self.columns
            .get_mut(column)
            .ok_or(Error::ColumnOutOfRange { index: column, count })?
            .set(row, value)?;
        self.expand_bounds(value);
        self.emit(TableEvent::Changed);
        Ok(())
    }

    fn expand_bounds(&mut self, value: f64) {
        if value > self.value_max {
            self.value_max = value;
            self.emit(TableEvent::ValueMaxChanged(value));
        } else if value < self.value_min {
            self.value_min = value;
            self.emit(TableEvent::ValueMinChanged(value));
        }
    }

    // ========================================================================
    // Bounds & window
    // ========================================================================

    /// Lower value bound.
    #[must_use]
    pub fn value_min(&self) -> f64 {
        self.value_min
    }

    /// Upper value bound.
    #[must_use]
    pub fn value_max(&self) -> f64 {
        self.value_max
    }

    /// Set the lower value bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BoundsOrder`] unless `value < value_max()`.
    pub fn set_value_min(&mut self, value: f64) -> Result<()> {
        if !is_ordered(value, self.value_max) {
            return Err(Error::BoundsOrder {
                min: value,
                max: self.value_max,
            });
        }
        self.value_min = value;
        self.emit(TableEvent::ValueMinChanged(value));
        Ok(())
    }

    /// Set the upper value bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BoundsOrder`] unless `value > value_min()`.
    pub fn set_value_max(&mut self, value: f64) -> Result<()> {
        if !is_ordered(self.value_min, value) {
            return Err(Error::BoundsOrder {
                min: self.value_min,
                max: value,
            });
        }
        self.value_max = value;
        self.emit(TableEvent::ValueMaxChanged(value));
        Ok(())
    }

    /// Visible window width in microseconds.
    #[must_use]
    pub fn timespan(&self) -> i64 {
        self.timespan
    }

    /// Change the visible window width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimespan`] unless `timespan_us > 0`.
    pub fn set_timespan(&mut self, timespan_us: i64) -> Result<()> {
        if timespan_us <= 0 {
            return Err(Error::InvalidTimespan(timespan_us));
        }
        self.timespan = timespan_us;
        self.emit(TableEvent::TimespanChanged(timespan_us));
        Ok(())
    }

    /// Timestamp of the newest row, or the clock reading when empty.
    #[must_use]
    pub fn end_time(&self, clock: &dyn Clock) -> i64 {
        self.timestamps.last().unwrap_or_else(|| clock.now_us())
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// The timestamp column.
    #[must_use]
    pub fn timestamps(&self) -> &RingColumn<i64> {
        &self.timestamps
    }

    /// Value column `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnOutOfRange`] for an invalid index.
    pub fn column(&self, index: usize) -> Result<&RingColumn<f64>> {
        self.columns.get(index).ok_or(Error::ColumnOutOfRange {
            index,
            count: self.columns.len(),
        })
    }

    /// Timestamp of `row`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowOutOfRange`] when `row >= len()`.
    pub fn timestamp(&self, row: usize) -> Result<i64> {
        self.timestamps.get(row)
    }

    /// Value at `row` in `column`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnOutOfRange`] or [`Error::RowOutOfRange`].
    pub fn value(&self, row: usize, column: usize) -> Result<f64> {
        self.column(column)?.get(row)
    }

    /// Newest value in `column`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnOutOfRange`] for an invalid index.
    pub fn latest(&self, column: usize) -> Result<Option<f64>> {
        Ok(self.column(column)?.last())
    }

    /// Largest value in `column`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySource`] when the table has no rows, checked
    /// before the index, and [`Error::ColumnOutOfRange`] for an invalid index.
    pub fn column_max(&self, column: usize) -> Result<f64> {
        if self.is_empty() {
            return Err(Error::EmptySource);
        }
        self.column(column)?.max()
    }

    /// Smallest value in `column`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySource`] when the table has no rows, checked
    /// before the index, and [`Error::ColumnOutOfRange`] for an invalid index.
    pub fn column_min(&self, column: usize) -> Result<f64> {
        if self.is_empty() {
            return Err(Error::EmptySource);
        }
        self.column(column)?.min()
    }

    // ========================================================================
    // Cursors
    // ========================================================================

    /// Read cursor positioned before the first row.
    #[must_use]
    pub fn first_cursor(&self) -> TableCursor<&Self> {
        TableCursor::first(self)
    }

    /// Read/write cursor positioned before the first row.
    #[must_use]
    pub fn first_cursor_mut(&mut self) -> TableCursor<&mut Self> {
        TableCursor::first(self)
    }

    /// Read cursor positioned at `len() - 2`, so one advance lands on the
    /// newest row. Detached when the table is empty.
    #[must_use]
    pub fn last_cursor(&self) -> TableCursor<&Self> {
        TableCursor::last(self)
    }
}

/// `min < max`, false when either side is NaN.
fn is_ordered(min: f64, max: f64) -> bool {
    min.partial_cmp(&max) == Some(Ordering::Less)
}
