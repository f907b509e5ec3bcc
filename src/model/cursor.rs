//! Row cursor over a [`TimeSeriesTable`].

use super::table::TimeSeriesTable;
use crate::error::{Error, Result};
use std::ops::{Deref, DerefMut};

/// Stateful row iterator.
///
/// A cursor starts one step before its first row and must be
/// [`advance`](Self::advance)d before reading. Stepping past either end drops
/// the table handle; a detached cursor stays detached.
///
/// `R` is any handle to a table: `&TimeSeriesTable` for reading,
/// `&mut TimeSeriesTable` for writing, or a `Ref`/`RefMut` borrowed from a
/// [`SharedTable`](super::SharedTable).
#[derive(Debug)]
pub struct TableCursor<R> {
    table: Option<R>,
    index: isize,
    timestamp: Option<i64>,
}

impl<R: Deref<Target = TimeSeriesTable>> TableCursor<R> {
    /// Cursor positioned before the first row.
    pub fn first(table: R) -> Self {
        Self {
            table: Some(table),
            index: -1,
            timestamp: None,
        }
    }

    /// Cursor positioned at `len - 2`, detached when the table is empty.
    pub fn last(table: R) -> Self {
        if table.is_empty() {
            return Self::detached();
        }
        Self {
            index: table.len() as isize - 2,
            table: Some(table),
            timestamp: None,
        }
    }

    /// Cursor bound to no table.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            table: None,
            index: -1,
            timestamp: None,
        }
    }

    /// Step to the next row. Returns false, and detaches, once the index
    /// leaves the table.
    pub fn advance(&mut self) -> bool {
        let Some(table) = self.table.as_deref() else {
            return false;
        };
        self.index += 1;
        let row = usize::try_from(self.index).ok().filter(|&r| r < table.len());
        match row.map(|r| table.timestamp(r)) {
            Some(Ok(ts)) => {
                self.timestamp = Some(ts);
                true
            }
            _ => {
                self.table = None;
                self.timestamp = None;
                false
            }
        }
    }

    /// Current row index; -1 before the first advance.
    #[must_use]
    pub fn index(&self) -> isize {
        self.index
    }

    /// True when the cursor is positioned on a row.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.table.is_some() && self.timestamp.is_some()
    }

    /// True once the cursor has dropped its table handle.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.table.is_none()
    }

    /// Timestamp captured by the last successful advance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] when not positioned on a row.
    pub fn timestamp(&self) -> Result<i64> {
        if self.table.is_none() {
            return Err(Error::InvalidCursor);
        }
        self.timestamp.ok_or(Error::InvalidCursor)
    }

    /// Value of `column` at the current row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] when not positioned on a row,
    /// [`Error::ColumnOutOfRange`] for a bad column and
    /// [`Error::EmptySource`] when the column holds no samples.
    pub fn read(&self, column: usize) -> Result<f64> {
        let (table, row) = self.locate(column)?;
        table.value(row, column)
    }

    fn locate(&self, column: usize) -> Result<(&TimeSeriesTable, usize)> {
        let table = self.table.as_deref().ok_or(Error::InvalidCursor)?;
        self.timestamp.ok_or(Error::InvalidCursor)?;
        let row = usize::try_from(self.index).map_err(|_| Error::InvalidCursor)?;
        if table.column(column)?.is_empty() {
            return Err(Error::EmptySource);
        }
        Ok((table, row))
    }
}

impl<R: DerefMut<Target = TimeSeriesTable>> TableCursor<R> {
    /// Overwrite `column` at the current row, expanding the table bounds and
    /// notifying subscribers.
    ///
    /// # Errors
    ///
    /// Same conditions as [`read`](Self::read).
    pub fn write(&mut self, column: usize, value: f64) -> Result<()> {
        let (_, row) = self.locate(column)?;
        self.table
            .as_deref_mut()
            .ok_or(Error::InvalidCursor)?
            .write_value(row, column, value)
    }
}

impl<R: Deref<Target = TimeSeriesTable>> Iterator for TableCursor<R> {
    type Item = i64;

    /// Advance and yield the new row's timestamp.
    fn next(&mut self) -> Option<i64> {
        if self.advance() {
            self.timestamp
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableEvent;

    fn table_with(values: &[(i64, f64)]) -> TimeSeriesTable {
        let mut table = TimeSeriesTable::new(&["v"], 8).unwrap();
        for &(t, v) in values {
            table.append(t, &[v]).unwrap();
        }
        table
    }

    #[test]
    fn test_read_before_advance_fails() {
        let table = table_with(&[(10, 1.0)]);
        let cursor = table.first_cursor();
        assert_eq!(cursor.index(), -1);
        assert!(matches!(cursor.read(0), Err(Error::InvalidCursor)));
        assert!(matches!(cursor.timestamp(), Err(Error::InvalidCursor)));
    }

    #[test]
    fn test_walk_and_exhaust() {
        let table = table_with(&[(10, 1.0), (20, 2.0)]);
        let mut cursor = table.first_cursor();
        assert!(cursor.advance());
        assert_eq!(cursor.timestamp().unwrap(), 10);
        assert_eq!(cursor.read(0).unwrap(), 1.0);
        assert!(cursor.advance());
        assert_eq!(cursor.read(0).unwrap(), 2.0);

        assert!(!cursor.advance());
        assert!(cursor.is_detached());
        assert!(matches!(cursor.read(0), Err(Error::InvalidCursor)));
        assert!(!cursor.advance());
    }

    #[test]
    fn test_bad_column() {
        let table = table_with(&[(10, 1.0)]);
        let mut cursor = table.first_cursor();
        cursor.advance();
        assert!(matches!(
            cursor.read(2),
            Err(Error::ColumnOutOfRange { index: 2, count: 1 })
        ));
    }

    #[test]
    fn test_last_cursor_lands_on_newest_row() {
        let table = table_with(&[(10, 1.0), (20, 2.0), (30, 3.0)]);
        let mut cursor = table.last_cursor();
        assert_eq!(cursor.index(), 1);
        assert!(cursor.advance());
        assert_eq!(cursor.timestamp().unwrap(), 30);
        assert!(!cursor.advance());
    }

    #[test]
    fn test_last_cursor_single_and_empty() {
        let table = table_with(&[(10, 1.0)]);
        let mut cursor = table.last_cursor();
        assert_eq!(cursor.index(), -1);
        assert!(cursor.advance());
        assert_eq!(cursor.read(0).unwrap(), 1.0);

        let empty = table_with(&[]);
        let mut cursor = empty.last_cursor();
        assert!(cursor.is_detached());
        assert!(!cursor.advance());
    }

    #[test]
    fn test_write_expands_bounds_and_notifies() {
        let mut table = table_with(&[(10, 1.0)]);
        let rx = table.subscribe();
        {
            let mut cursor = table.first_cursor_mut();
            cursor.advance();
            cursor.write(0, 250.0).unwrap();
        }
        assert_eq!(table.value(0, 0).unwrap(), 250.0);
        assert_eq!(table.value_max(), 250.0);
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![TableEvent::ValueMaxChanged(250.0), TableEvent::Changed]
        );
    }

    #[test]
    fn test_write_while_iterating() {
        let mut table = table_with(&[(10, 1.0), (20, 2.0)]);
        {
            let mut cursor = table.first_cursor_mut();
            assert_eq!(cursor.next(), Some(10));
            cursor.write(0, 7.0).unwrap();
            assert_eq!(cursor.next(), Some(20));
            cursor.write(0, 8.0).unwrap();
            assert_eq!(cursor.read(0).unwrap(), 8.0);
        }
        assert_eq!(table.value(0, 0).unwrap(), 7.0);
        assert_eq!(table.value(1, 0).unwrap(), 8.0);
    }

    #[test]
    fn test_write_on_unadvanced_cursor_fails() {
        let mut table = table_with(&[(10, 1.0)]);
        let mut cursor = table.first_cursor_mut();
        assert!(matches!(cursor.write(0, 5.0), Err(Error::InvalidCursor)));
    }

    #[test]
    fn test_cursor_over_shared_borrow() {
        let shared = table_with(&[(1, 5.0), (2, 6.0)]).into_shared();
        let timestamps: Vec<i64> = TableCursor::first(shared.borrow()).collect();
        assert_eq!(timestamps, vec![1, 2]);
    }
}
