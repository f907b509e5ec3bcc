//! Ring-buffer time-series model.
//!
//! A [`TimeSeriesTable`] keeps a timestamp column and any number of value
//! columns in lock step, each a fixed-capacity [`RingColumn`]. Samples are
//! appended one row at a time; the oldest row is evicted once the table is
//! full. Observers subscribe to [`TableEvent`]s and traverse rows with a
//! [`TableCursor`].

mod column;
mod cursor;
mod table;

pub use column::RingColumn;
pub use cursor::TableCursor;
pub use table::{
    SharedTable, TableEvent, TimeSeriesTable, DEFAULT_TIMESPAN_US, DEFAULT_VALUE_MAX,
    DEFAULT_VALUE_MIN,
};
