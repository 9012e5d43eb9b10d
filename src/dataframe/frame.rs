//! Defines functionality for a `DataFrame`
use crate::dataframe::{Column, Mode, Row, RowView, Schema, Value};
use crate::error::{DataFrameError, Result};
use deepsize::DeepSizeOf;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, Range};

/// Fixed number of bytes accounted for every `DataFrame` by `memory_usage`.
pub const TABLE_OVERHEAD: usize = std::mem::size_of::<DataFrame>();

/// Identifies a column of a `DataFrame` by position or by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKey<'a> {
    Index(usize),
    Name(&'a str),
}

impl From<usize> for ColumnKey<'_> {
    fn from(idx: usize) -> Self {
        ColumnKey::Index(idx)
    }
}

impl<'a> From<&'a str> for ColumnKey<'a> {
    fn from(name: &'a str) -> Self {
        ColumnKey::Name(name)
    }
}

impl<'a> From<&'a String> for ColumnKey<'a> {
    fn from(name: &'a String) -> Self {
        ColumnKey::Name(name)
    }
}

/// What to look up with `DataFrame::at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    /// A whole row
    Row(usize),
    /// A whole column
    Column(ColumnKey<'a>),
    /// A single cell, given as `(row, column)`
    Cell(usize, ColumnKey<'a>),
}

impl From<usize> for Selector<'_> {
    fn from(row: usize) -> Self {
        Selector::Row(row)
    }
}

impl<'a> From<&'a str> for Selector<'a> {
    fn from(name: &'a str) -> Self {
        Selector::Column(ColumnKey::Name(name))
    }
}

impl<'a> From<ColumnKey<'a>> for Selector<'a> {
    fn from(key: ColumnKey<'a>) -> Self {
        Selector::Column(key)
    }
}

impl<'a, K: Into<ColumnKey<'a>>> From<(usize, K)> for Selector<'a> {
    fn from((row, key): (usize, K)) -> Self {
        Selector::Cell(row, key.into())
    }
}

/// The result of `DataFrame::at`.
#[derive(Debug, PartialEq)]
pub enum Selection<'a> {
    Row(Row),
    Column(&'a Column),
    Cell(Value),
}

/// Represents a data frame which contains data stored in a columnar format.
/// All columns have the same logical length and the nullability given by the
/// `Mode` of the data frame.
#[derive(Debug, Serialize, Deserialize, DeepSizeOf)]
#[serde(try_from = "FrameRepr", into = "FrameRepr")]
pub struct DataFrame {
    mode: Mode,
    /// The columns of this data frame, in display and serialization order
    columns: Vec<Column>,
    /// Maps every column name to its index, rebuilt on structural change
    names: HashMap<String, usize>,
    n_rows: usize,
}

#[derive(Serialize, Deserialize)]
struct FrameRepr {
    mode: Mode,
    columns: Vec<Column>,
}

impl From<DataFrame> for FrameRepr {
    fn from(df: DataFrame) -> Self {
        FrameRepr {
            mode: df.mode,
            columns: df.columns,
        }
    }
}

impl TryFrom<FrameRepr> for DataFrame {
    type Error = DataFrameError;

    fn try_from(repr: FrameRepr) -> Result<Self> {
        DataFrame::from_columns(repr.mode, repr.columns)
    }
}

/// An implementation for a `DataFrame`, inspired by the data frames used
/// in `pandas` and `R`.
impl DataFrame {
    /// Creates an empty `DataFrame` with no columns.
    pub fn new(mode: Mode) -> Self {
        DataFrame {
            mode,
            columns: Vec::new(),
            names: HashMap::new(),
            n_rows: 0,
        }
    }

    /// Creates an empty `DataFrame` from the given `Schema`. The `DataFrame`
    /// is created with no rows, one empty column per field of the `schema`,
    /// and the mode of the `schema`.
    pub fn with_schema(schema: &Schema) -> Self {
        let nullable = schema.mode().is_nullable();
        let columns = schema
            .iter()
            .map(|(name, data_type)| {
                Column::with_capacity(name, data_type, nullable, 0)
            })
            .collect();
        let mut df = DataFrame {
            mode: schema.mode(),
            columns,
            names: HashMap::new(),
            n_rows: 0,
        };
        df.rebuild_names();
        df
    }

    /// Creates a `DataFrame` of the given `mode` from the given `columns`.
    /// Every column must have a unique, non-empty name, the same length, and
    /// a nullability matching `mode`.
    pub fn from_columns(mode: Mode, columns: Vec<Column>) -> Result<Self> {
        let mut df = DataFrame::new(mode);
        for col in columns {
            df.add_column(col)?;
        }
        Ok(df)
    }

    /// The `Schema` of this `DataFrame`.
    pub fn schema(&self) -> Schema {
        Schema::from_parts(
            self.mode,
            self.columns.iter().map(Column::data_type).collect(),
            self.columns.iter().map(|c| c.name().to_string()).collect(),
        )
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_nullable(&self) -> bool {
        self.mode.is_nullable()
    }

    /// Return the number of rows in this `DataFrame`.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns in this `DataFrame`.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Whether this `DataFrame` has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// The number of rows this `DataFrame` can hold before any of its
    /// columns has to grow.
    pub fn capacity(&self) -> usize {
        self.columns.iter().map(Column::capacity).min().unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get the index of the `Column` with the given `col_name`. Returns `Some`
    /// if a `Column` with the given name exists, or `None` otherwise.
    pub fn col_idx(&self, col_name: &str) -> Option<usize> {
        self.names.get(col_name).copied()
    }

    /// Given a column index, returns its name
    pub fn col_name(&self, col_idx: usize) -> Result<&str> {
        match self.columns.get(col_idx) {
            Some(col) => Ok(col.name()),
            None => Err(DataFrameError::out_of_bounds(col_idx, self.n_cols())),
        }
    }

    /// The names of all columns, in column order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn has_column(&self, col_name: &str) -> bool {
        self.names.contains_key(col_name)
    }

    /// Resolves a `ColumnKey` into a column index.
    pub(crate) fn resolve<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<usize> {
        match key.into() {
            ColumnKey::Index(idx) if idx < self.n_cols() => Ok(idx),
            ColumnKey::Index(idx) => {
                Err(DataFrameError::out_of_bounds(idx, self.n_cols()))
            }
            ColumnKey::Name(name) => self
                .col_idx(name)
                .ok_or_else(|| DataFrameError::ColumnNotFound(name.to_string())),
        }
    }

    /// Get a reference to the `Column` with the given key.
    pub fn column<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<&Column> {
        let idx = self.resolve(key)?;
        Ok(&self.columns[idx])
    }

    /// Mutable access for operations that keep the length of the column.
    pub(crate) fn column_mut<'k>(
        &mut self,
        key: impl Into<ColumnKey<'k>>,
    ) -> Result<&mut Column> {
        let idx = self.resolve(key)?;
        Ok(&mut self.columns[idx])
    }

    fn rebuild_names(&mut self) {
        self.names = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name().to_string(), i))
            .collect();
    }

    fn check_name(&self, name: &str, replacing: Option<usize>) -> Result<()> {
        if name.is_empty() {
            return Err(DataFrameError::InvalidArgument(
                "column names must not be empty".to_string(),
            ));
        }
        match self.col_idx(name) {
            Some(idx) if Some(idx) != replacing => {
                Err(DataFrameError::DuplicateColumnName(name.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Checks that `col` may become part of this `DataFrame`, optionally in
    /// place of the column at index `replacing`.
    fn check_attachable(&self, col: &Column, replacing: Option<usize>) -> Result<()> {
        self.check_name(col.name(), replacing)?;
        if col.is_nullable() != self.is_nullable() {
            return Err(DataFrameError::SchemaMismatch(format!(
                "column '{}' is {}nullable but the table mode is {:?}",
                col.name(),
                if col.is_nullable() { "" } else { "not " },
                self.mode
            )));
        }
        let others = self.n_cols() - usize::from(replacing.is_some());
        if others > 0 && col.len() != self.n_rows {
            return Err(DataFrameError::SchemaMismatch(format!(
                "column '{}' has {} rows but the table has {}",
                col.name(),
                col.len(),
                self.n_rows
            )));
        }
        Ok(())
    }

    /// Adds a `Column` at the end of this `DataFrame`. Returns a
    /// `DataFrameError::DuplicateColumnName` if the name of `col` is already
    /// in use, and a `DataFrameError::SchemaMismatch` if its length or
    /// nullability does not fit this `DataFrame`.
    pub fn add_column(&mut self, col: Column) -> Result<()> {
        self.check_attachable(&col, None)?;
        if self.columns.is_empty() {
            self.n_rows = col.len();
        }
        self.names.insert(col.name().to_string(), self.columns.len());
        self.columns.push(col);
        Ok(())
    }

    /// Inserts a `Column` at the given column index, shifting all following
    /// columns to the right.
    pub fn insert_column(&mut self, col_idx: usize, col: Column) -> Result<()> {
        if col_idx > self.n_cols() {
            return Err(DataFrameError::out_of_bounds(col_idx, self.n_cols()));
        }
        self.check_attachable(&col, None)?;
        if self.columns.is_empty() {
            self.n_rows = col.len();
        }
        self.columns.insert(col_idx, col);
        self.rebuild_names();
        Ok(())
    }

    /// Removes and returns the `Column` with the given key. Removing the last
    /// column leaves an empty `DataFrame` with no rows.
    pub fn remove_column<'k>(&mut self, key: impl Into<ColumnKey<'k>>) -> Result<Column> {
        let idx = self.resolve(key)?;
        let col = self.columns.remove(idx);
        if self.columns.is_empty() {
            self.n_rows = 0;
        }
        self.rebuild_names();
        Ok(col)
    }

    /// Replaces the `Column` with the given key, returning the old one.
    pub fn set_column<'k>(
        &mut self,
        key: impl Into<ColumnKey<'k>>,
        col: Column,
    ) -> Result<Column> {
        let idx = self.resolve(key)?;
        self.check_attachable(&col, Some(idx))?;
        self.n_rows = col.len();
        let old = std::mem::replace(&mut self.columns[idx], col);
        self.rebuild_names();
        Ok(old)
    }

    /// Renames the `Column` with the given key.
    pub fn rename_column<'k>(
        &mut self,
        key: impl Into<ColumnKey<'k>>,
        new_name: &str,
    ) -> Result<()> {
        let idx = self.resolve(key)?;
        self.check_name(new_name, Some(idx))?;
        self.columns[idx].set_name(new_name);
        self.rebuild_names();
        Ok(())
    }

    /// Get the `Value` at the given `row_idx` in the given column.
    pub fn get<'k>(&self, row_idx: usize, key: impl Into<ColumnKey<'k>>) -> Result<Value> {
        self.column(key)?.get(row_idx)
    }

    /// Mutates the value in this `DataFrame` at the given `row_idx` and
    /// column to be changed to the given `value`.
    pub fn set<'k>(
        &mut self,
        row_idx: usize,
        key: impl Into<ColumnKey<'k>>,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.column_mut(key)?.set(row_idx, value)
    }

    /// Whether the cell at `row_idx` in the given nullable column is null.
    pub fn is_null<'k>(&self, row_idx: usize, key: impl Into<ColumnKey<'k>>) -> Result<bool> {
        self.column(key)?.is_null(row_idx)
    }

    /// Sets the cell at `row_idx` in the given nullable column to null.
    pub fn set_null<'k>(&mut self, row_idx: usize, key: impl Into<ColumnKey<'k>>) -> Result<()> {
        self.column_mut(key)?.set_null(row_idx)
    }

    fn check_row(&self, row_idx: usize) -> Result<()> {
        if row_idx < self.n_rows {
            Ok(())
        } else {
            Err(DataFrameError::out_of_bounds(row_idx, self.n_rows))
        }
    }

    /// A borrowed view of the row at `row_idx`.
    pub fn row_view(&self, row_idx: usize) -> Result<RowView<'_>> {
        self.check_row(row_idx)?;
        Ok(RowView::new(self, row_idx))
    }

    /// Iterates over views of all rows, in row order.
    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        (0..self.n_rows).map(move |i| RowView::new(self, i))
    }

    /// Copies the row at `row_idx` into a new `Row`.
    pub fn get_row(&self, row_idx: usize) -> Result<Row> {
        let mut row = Row::with_width(self.n_cols());
        self.fill_row(row_idx, &mut row)?;
        Ok(row)
    }

    /// Set the fields of the given `Row` struct with values from this
    /// `DataFrame` at the given `row_idx`. The `row` is resized to the
    /// number of columns of this `DataFrame`.
    pub fn fill_row(&self, row_idx: usize, row: &mut Row) -> Result<()> {
        self.check_row(row_idx)?;
        row.data.clear();
        for col in &self.columns {
            row.data.push(col.get(row_idx)?);
        }
        row.set_idx(row_idx);
        Ok(())
    }

    /// Checks every value of `row` against its column, returning the
    /// coerced values. Nothing is written if any value is rejected.
    fn coerce_row(&self, row: &Row) -> Result<Vec<Value>> {
        if self.columns.is_empty() {
            return Err(DataFrameError::InvalidArgument(
                "cannot add a row to a table without columns".to_string(),
            ));
        }
        if row.width() != self.n_cols() {
            return Err(DataFrameError::SchemaMismatch(format!(
                "row has {} values but the table has {} columns",
                row.width(),
                self.n_cols()
            )));
        }
        self.columns
            .iter()
            .zip(row.values())
            .map(|(col, value)| col.coerce(value.clone()))
            .collect()
    }

    /// Replaces the row at `row_idx` with the values of `row`.
    pub fn set_row(&mut self, row_idx: usize, row: &Row) -> Result<()> {
        self.check_row(row_idx)?;
        let values = self.coerce_row(row)?;
        for (col, value) in self.columns.iter_mut().zip(values) {
            col.set(row_idx, value)?;
        }
        Ok(())
    }

    /// Add a `Row` at the end of this `DataFrame`.
    ///
    /// If a value of the `row` does not fit the type or nullability of its
    /// column, an error is returned and this `DataFrame` is left unchanged.
    pub fn add_row(&mut self, row: &Row) -> Result<()> {
        let values = self.coerce_row(row)?;
        for (col, value) in self.columns.iter_mut().zip(values) {
            col.append(value)?;
        }
        self.n_rows += 1;
        Ok(())
    }

    /// Inserts a `Row` at `row_idx`, shifting all following rows down.
    pub fn insert_row(&mut self, row_idx: usize, row: &Row) -> Result<()> {
        if row_idx > self.n_rows {
            return Err(DataFrameError::out_of_bounds(row_idx, self.n_rows));
        }
        let values = self.coerce_row(row)?;
        for (col, value) in self.columns.iter_mut().zip(values) {
            col.insert(row_idx, value)?;
        }
        self.n_rows += 1;
        Ok(())
    }

    /// Removes and returns the row at `row_idx`. The rows above it shift
    /// down by one and the capacity is left unchanged.
    pub fn remove_row(&mut self, row_idx: usize) -> Result<Row> {
        self.check_row(row_idx)?;
        let mut values = Vec::with_capacity(self.n_cols());
        for col in self.columns.iter_mut() {
            values.push(col.remove(row_idx)?);
        }
        self.n_rows -= 1;
        Ok(Row::from(values))
    }

    fn check_range(&self, rows: &Range<usize>) -> Result<()> {
        if rows.end > self.n_rows {
            return Err(DataFrameError::out_of_bounds(rows.end, self.n_rows));
        }
        if rows.start > rows.end {
            return Err(DataFrameError::InvalidArgument(format!(
                "invalid row range {}..{}",
                rows.start, rows.end
            )));
        }
        Ok(())
    }

    /// Removes all rows in the given range.
    pub fn remove_rows(&mut self, rows: Range<usize>) -> Result<()> {
        self.check_range(&rows)?;
        for col in self.columns.iter_mut() {
            col.remove_range(rows.start, rows.end)?;
        }
        self.n_rows -= rows.end - rows.start;
        Ok(())
    }

    /// Copies the rows in the given range into a new `DataFrame`.
    pub fn get_rows(&self, rows: Range<usize>) -> Result<DataFrame> {
        self.check_range(&rows)?;
        let indices: Vec<usize> = rows.collect();
        self.take(&indices)
    }

    /// Creates a new `DataFrame` with the same columns holding the rows at
    /// the given `indices`, in that order.
    pub(crate) fn take(&self, indices: &[usize]) -> Result<DataFrame> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.take(indices))
            .collect::<Result<Vec<_>>>()?;
        Ok(DataFrame {
            mode: self.mode,
            columns,
            names: self.names.clone(),
            n_rows: indices.len(),
        })
    }

    /// Creates a new `DataFrame` holding the given columns, which are taken
    /// from this `DataFrame` and so already satisfy its invariants.
    pub(crate) fn with_columns(&self, columns: Vec<Column>) -> DataFrame {
        let mut df = DataFrame {
            mode: self.mode,
            n_rows: if columns.is_empty() { 0 } else { self.n_rows },
            columns,
            names: HashMap::new(),
        };
        df.rebuild_names();
        df
    }

    /// Replaces every column with the result of `f`, which must keep the
    /// name, type and nullability of the column and produce `n_rows` rows.
    pub(crate) fn replace_columns(
        &mut self,
        n_rows: usize,
        f: impl Fn(&Column) -> Result<Column>,
    ) -> Result<()> {
        let columns = self.columns.iter().map(f).collect::<Result<Vec<_>>>()?;
        self.columns = columns;
        self.n_rows = n_rows;
        Ok(())
    }

    /// Keeps only the rows whose position is `true` in `keep`, returning the
    /// number of removed rows.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) -> Result<usize> {
        if keep.len() != self.n_rows {
            return Err(DataFrameError::SchemaMismatch(format!(
                "{} keep flags for {} rows",
                keep.len(),
                self.n_rows
            )));
        }
        for col in self.columns.iter_mut() {
            col.retain(keep)?;
        }
        let kept = keep.iter().filter(|k| **k).count();
        let removed = self.n_rows - kept;
        self.n_rows = kept;
        Ok(removed)
    }

    /// Removes all rows. The columns and their capacity are kept.
    pub fn clear(&mut self) {
        for col in self.columns.iter_mut() {
            col.clear();
        }
        self.n_rows = 0;
    }

    /// Shrinks the capacity of every column to the number of rows.
    pub fn flush(&mut self) {
        for col in self.columns.iter_mut() {
            col.shrink_to_fit();
        }
    }

    /// Unified indexed access to a row, a column, or a single cell.
    ///
    /// ```
    /// use colframe::dataframe::{Column, DataFrame, Mode, Selection, Value};
    ///
    /// let df = DataFrame::from_columns(
    ///     Mode::Default,
    ///     vec![Column::from_vec("A", vec![1, 2, 3]).unwrap()],
    /// )
    /// .unwrap();
    /// assert_eq!(df.at((1, "A")).unwrap(), Selection::Cell(Value::Int(2)));
    /// assert!(df.at(3).is_err());
    /// ```
    pub fn at<'k>(&self, selector: impl Into<Selector<'k>>) -> Result<Selection<'_>> {
        match selector.into() {
            Selector::Row(row_idx) => Ok(Selection::Row(self.get_row(row_idx)?)),
            Selector::Column(key) => Ok(Selection::Column(self.column(key)?)),
            Selector::Cell(row_idx, key) => {
                Ok(Selection::Cell(self.get(row_idx, key)?))
            }
        }
    }
}

impl TryFrom<Vec<Column>> for DataFrame {
    type Error = DataFrameError;

    /// Construct a new `DataFrame` with the given `columns`. The mode is
    /// taken from the nullability of the first column.
    fn try_from(columns: Vec<Column>) -> Result<Self> {
        let mode = columns
            .first()
            .map_or(Mode::Default, |c| Mode::from_nullable(c.is_nullable()));
        DataFrame::from_columns(mode, columns)
    }
}

impl Clone for DataFrame {
    /// Deep-copies every column into storage sized to the number of rows.
    fn clone(&self) -> Self {
        DataFrame {
            mode: self.mode,
            columns: self.columns.clone(),
            names: self.names.clone(),
            n_rows: self.n_rows,
        }
    }
}

impl PartialEq for DataFrame {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.columns == other.columns
    }
}

impl Eq for DataFrame {}

impl Hash for DataFrame {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mode.hash(state);
        self.columns.len().hash(state);
        for col in &self.columns {
            col.hash(state);
        }
    }
}

impl Index<&str> for DataFrame {
    type Output = Column;

    fn index(&self, name: &str) -> &Self::Output {
        match self.col_idx(name) {
            Some(idx) => &self.columns[idx],
            None => panic!("no column named '{}'", name),
        }
    }
}

impl Index<usize> for DataFrame {
    type Output = Column;

    fn index(&self, col_idx: usize) -> &Self::Output {
        &self.columns[col_idx]
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for col in &self.columns {
            write!(f, "<{}:{}>", col.name(), col.data_type())?;
        }
        writeln!(f)?;
        for i in 0..self.n_rows {
            for col in &self.columns {
                match col.get(i) {
                    Ok(value) => write!(f, "<{}>", value)?,
                    Err(_) => return Err(fmt::Error),
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
