//! Engine-neutral table and column definitions.

mod column;
mod table;

pub use column::{
    bigint, blob, boolean, date, datetime, decimal, double, enumeration, float, integer, real,
    smallint, string, text, time, uuid, ColumnBuilder, ColumnSpec, DefaultValue, ForeignKeyRef,
    ReferentialAction, Unique,
};
pub(crate) use table::validate_column;
pub use table::{
    HasColumns, HasName, IndexSpec, NoColumns, NoName, TableBuilder, TableSpec, UniqueKey,
};
