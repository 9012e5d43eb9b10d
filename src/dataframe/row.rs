//! Structs and functions for working with rows of data in a `DataFrame`.
use crate::dataframe::{ColumnKey, DataFrame, Fielder, Schema, Value};
use crate::error::{DataFrameError, Result};
use deepsize::DeepSizeOf;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Represents a single row in a data frame: one boxed value per column, in
/// column order.
///
/// A `Row` is detached from any `DataFrame`. Values are checked against the
/// column types and nullability of a `DataFrame` only when the `Row` is
/// written into it.
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Debug, DeepSizeOf)]
pub struct Row {
    /// The data of this `Row` as boxed values.
    pub(crate) data: Vec<Value>,
    /// The offset of this `Row` in the data frame
    idx: Option<usize>,
}

/// Functions for creating, mutating, and getting data from `Row`s.
impl Row {
    /// Constructs a new `Row` with one field per column of the given
    /// `Schema` and fills it with `Null` values.
    pub fn new(schema: &Schema) -> Self {
        Row::with_width(schema.width())
    }

    /// Constructs a new `Row` of `width` `Null` values.
    pub fn with_width(width: usize) -> Self {
        Row {
            data: vec![Value::Null; width],
            idx: None,
        }
    }

    /// Sets the field in this `Row` at the given `col_idx` to have the given
    /// `value`.
    pub fn set(&mut self, col_idx: usize, value: impl Into<Value>) -> Result<()> {
        let width = self.width();
        match self.data.get_mut(col_idx) {
            Some(d) => {
                *d = value.into();
                Ok(())
            }
            None => Err(DataFrameError::out_of_bounds(col_idx, width)),
        }
    }

    /// Sets the field in this `Row` at the given `col_idx` to be `Null`.
    pub fn set_null(&mut self, col_idx: usize) -> Result<()> {
        self.set(col_idx, Value::Null)
    }

    /// Set the row offset in the dataframe for this `Row`.
    pub fn set_idx(&mut self, idx: usize) {
        self.idx = Some(idx);
    }

    /// Get the current index of this `Row`. Is `Some` if the index has been
    /// set, and is `None` otherwise.
    pub fn get_idx(&self) -> Option<usize> {
        self.idx
    }

    /// Get a reference of the boxed value at the given `idx`.
    pub fn get(&self, idx: usize) -> Result<&Value> {
        match self.data.get(idx) {
            Some(d) => Ok(d),
            None => Err(DataFrameError::out_of_bounds(idx, self.width())),
        }
    }

    /// Get the number of columns in this `Row`.
    pub fn width(&self) -> usize {
        self.data.len()
    }

    pub fn values(&self) -> &[Value] {
        &self.data
    }

    pub fn into_values(self) -> Vec<Value> {
        self.data
    }

    /// Accept a `Fielder` visitor for this row that visits all the elements in
    /// this `Row`.
    pub fn accept<T: Fielder>(&self, f: &mut T) {
        for data in &self.data {
            match data {
                Value::Byte(d) => f.visit_byte(*d),
                Value::Short(d) => f.visit_short(*d),
                Value::Int(d) => f.visit_int(*d),
                Value::Long(d) => f.visit_long(*d),
                Value::Float(d) => f.visit_float(*d),
                Value::Double(d) => f.visit_double(*d),
                Value::Boolean(d) => f.visit_bool(*d),
                Value::Char(d) => f.visit_char(*d),
                Value::String(d) => f.visit_string(d),
                Value::Binary(d) => f.visit_binary(d),
                Value::Null => f.visit_null(),
            }
        }
    }
}

impl From<Vec<Value>> for Row {
    fn from(data: Vec<Value>) -> Self {
        Row { data, idx: None }
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.data[idx]
    }
}

/// A borrowed, read-only view of the row at one index of a `DataFrame`.
/// Values are read from the columns on demand.
#[derive(Clone, Copy, Debug)]
pub struct RowView<'a> {
    df: &'a DataFrame,
    idx: usize,
}

impl<'a> RowView<'a> {
    pub(crate) fn new(df: &'a DataFrame, idx: usize) -> Self {
        RowView { df, idx }
    }

    /// The row index this view looks at.
    pub fn index(&self) -> usize {
        self.idx
    }

    /// The value in the given column.
    pub fn get<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<Value> {
        self.df.get(self.idx, key)
    }

    /// Whether the value in the given column is null. Unlike
    /// `DataFrame::is_null` this is `false` for non-nullable columns.
    pub fn is_null<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<bool> {
        Ok(self.get(key)?.is_null())
    }

    /// Copies the viewed values into an owned `Row`.
    pub fn to_row(&self) -> Result<Row> {
        self.df.get_row(self.idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::{DataType, Mode};

    #[derive(Default)]
    struct TestFielder {
        num_null: usize,
        num_ints: usize,
        num_bools: usize,
        num_floats: usize,
        num_strings: usize,
        num_other: usize,
    }

    impl Fielder for TestFielder {
        fn visit_byte(&mut self, _b: i8) {
            self.num_other += 1;
        }

        fn visit_short(&mut self, _s: i16) {
            self.num_other += 1;
        }

        fn visit_int(&mut self, _i: i32) {
            self.num_ints += 1;
        }

        fn visit_long(&mut self, _l: i64) {
            self.num_ints += 1;
        }

        fn visit_float(&mut self, _f: f32) {
            self.num_floats += 1;
        }

        fn visit_double(&mut self, _d: f64) {
            self.num_floats += 1;
        }

        fn visit_bool(&mut self, _b: bool) {
            self.num_bools += 1;
        }

        fn visit_char(&mut self, _c: char) {
            self.num_other += 1;
        }

        fn visit_string(&mut self, _s: &str) {
            self.num_strings += 1;
        }

        fn visit_binary(&mut self, _b: &[u8]) {
            self.num_other += 1;
        }

        fn visit_null(&mut self) {
            self.num_null += 1;
        }
    }

    fn init() -> (Schema, Row) {
        let s: Schema = "a:int,b:boolean,c:double,d:string,e:char".parse().unwrap();
        let r = Row::new(&s);
        (s, r)
    }

    #[test]
    fn test_accept() {
        let (_s, mut r) = init();
        r.set(0, 42).unwrap();
        r.set(1, true).unwrap();
        r.set(2, 420.69).unwrap();
        r.set(3, "Finally a sane language").unwrap();
        let mut f = TestFielder::default();
        r.accept(&mut f);
        assert_eq!(f.num_null, 1);
        assert_eq!(f.num_ints, 1);
        assert_eq!(f.num_bools, 1);
        assert_eq!(f.num_floats, 1);
        assert_eq!(f.num_strings, 1);
        assert_eq!(f.num_other, 0);
    }

    #[test]
    fn test_width() {
        let mut s = Schema::new(Mode::Default);
        let r = Row::new(&s);
        assert_eq!(r.width(), 0);
        s.add_column(DataType::Int, "a").unwrap();
        assert_eq!(r.width(), 0);
        let r2 = Row::new(&s);
        assert_eq!(r2.width(), 1);
    }

    #[test]
    fn test_get_set_idx() {
        let (_s, mut r) = init();
        assert!(r.get_idx().is_none());
        r.set_idx(0);
        assert_eq!(r.get_idx(), Some(0));
    }

    #[test]
    fn test_getters_and_setters() {
        let (_s, mut r) = init();
        assert!(r.values().iter().all(Value::is_null));

        r.set(0, 42).unwrap();
        assert_eq!(r.get(0).unwrap(), &Value::Int(42));
        r.set(3, String::from("foo")).unwrap();
        assert_eq!(r[3], Value::from("foo"));
        r.set_null(3).unwrap();
        assert_eq!(r.get(3).unwrap(), &Value::Null);
        assert!(r.set(5, 1).is_err());
        assert!(r.get(5).is_err());
    }
}
