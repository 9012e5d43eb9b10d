//! A module for creating and manipulating data frames. A data frame can be
//! created by adding `Column`s or `Row`s programmatically, or read from a
//! `.df` or CSV file with the functions in the [`io`](crate::io) module.
//!
//! A data frame in `colframe` is lightly inspired by those found in `R` or
//! `pandas`. It is an ordered collection of named `Column`s of equal length,
//! each holding values of a single `DataType` in a typed buffer. Every
//! data frame has a `Mode` fixed at construction: in `Mode::Default` no cell
//! may be null, in `Mode::Nullable` any cell may be.
//!
//! Data frames use these supplementary data structures and can be useful in
//! understanding DataFrames:
//!  - `Value` : A single boxed cell value, used wherever a value crosses the
//!     typed column boundary
//!  - `Row` : A single row of `Value`s from the data frame and provides a
//!     useful API to help implement the `Rower` trait
//!  - `RowView` : A borrowed view of one row, handed to filter predicates
//!  - `Schema` : The mode, names and types of the columns of a data frame
//!
//! The `dataframe` module also declares the `Rower` and `Fielder` visitor
//! traits that can be used to build visitors that iterate over the elements of
//! a row or data frame.

mod bitmap;

mod types;
pub use types::{DataType, Mode, Value, ALL_TYPES};

mod column;
pub use column::{Column, ColumnIter, Element, COLUMN_OVERHEAD};

mod row;
pub use row::{Row, RowView};

mod schema;
pub use schema::Schema;

mod frame;
pub use frame::{ColumnKey, DataFrame, Selection, Selector, TABLE_OVERHEAD};

mod transform;
pub use transform::{FactorMap, MatchSpec, Matcher};

mod combine;
pub use combine::Aggregate;

pub(crate) use bitmap::NullMask;
pub(crate) use column::{parse_text, ColumnData};

/// A field visitor that may be implemented to iterate and visit all the
/// elements of a `Row`.
pub trait Fielder {
    /// Called for fields of type `byte` with the value of the field
    fn visit_byte(&mut self, b: i8);

    /// Called for fields of type `short` with the value of the field
    fn visit_short(&mut self, s: i16);

    /// Called for fields of type `int` with the value of the field
    fn visit_int(&mut self, i: i32);

    /// Called for fields of type `long` with the value of the field
    fn visit_long(&mut self, l: i64);

    /// Called for fields of type `float` with the value of the field
    fn visit_float(&mut self, f: f32);

    /// Called for fields of type `double` with the value of the field
    fn visit_double(&mut self, d: f64);

    /// Called for fields of type `boolean` with the value of the field
    fn visit_bool(&mut self, b: bool);

    /// Called for fields of type `char` with the value of the field
    fn visit_char(&mut self, c: char);

    /// Called for fields of type `string` with the value of the field
    fn visit_string(&mut self, s: &str);

    /// Called for fields of type `binary` with the value of the field
    fn visit_binary(&mut self, b: &[u8]);

    /// Called for fields where the value of the field is missing. This method
    /// may be as simple as doing nothing but there are use cases where
    /// some operations are required.
    fn visit_null(&mut self);
}

/// A trait for visitors who iterate through and process each row of a
/// `DataFrame`.
pub trait Rower {
    /// This function is called once per row, in row order. The row index of
    /// `r` is set. The return value is used in `DataFrame::filter` to
    /// indicate whether a row should be kept.
    fn visit(&mut self, r: &Row) -> bool;
}
