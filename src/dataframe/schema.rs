//! A Schema module for managing the mode, column names and column types of
//! a `DataFrame`.

use crate::dataframe::{DataType, Mode};
use crate::error::{DataFrameError, Result};
use deepsize::DeepSizeOf;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The ordered column names and types of a `DataFrame`, together with its
/// `Mode`.
#[derive(
    Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Debug, Default, DeepSizeOf,
)]
pub struct Schema {
    mode: Mode,
    /// The `DataType` of every column, in column order
    schema: Vec<DataType>,
    /// The name of every column, in column order
    col_names: Vec<String>,
}

/// The implementation of the Schema interface, which manages the data types
/// and column names of a `DataFrame`
impl Schema {
    /// Constructs an empty Schema for a table of the given `mode`.
    pub fn new(mode: Mode) -> Self {
        Schema {
            mode,
            ..Default::default()
        }
    }

    /// Builds a `Schema` from column types and names that are already known
    /// to be unique and non-empty.
    pub(crate) fn from_parts(
        mode: Mode,
        schema: Vec<DataType>,
        col_names: Vec<String>,
    ) -> Self {
        debug_assert_eq!(schema.len(), col_names.len());
        Schema {
            mode,
            schema,
            col_names,
        }
    }

    /// Add a column with the given `data_type` and `col_name` to this
    /// Schema. Column names must be unique and non-empty. If `col_name`
    /// already exists in this `Schema`, the column will not be added and a
    /// `DataFrameError::DuplicateColumnName` error will be returned.
    pub fn add_column(
        &mut self,
        data_type: DataType,
        col_name: impl Into<String>,
    ) -> Result<()> {
        let col_name = col_name.into();
        if col_name.is_empty() {
            return Err(DataFrameError::InvalidArgument(
                "column names must not be empty".to_string(),
            ));
        }
        if self.col_idx(&col_name).is_some() {
            return Err(DataFrameError::DuplicateColumnName(col_name));
        }
        self.schema.push(data_type);
        self.col_names.push(col_name);
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns this Schema with its mode changed to the given `mode`.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Gets the name of the column at the given `idx`.
    /// Returns a result that will `Error` if the `idx` is out of bounds.
    pub fn col_name(&self, idx: usize) -> Result<&str> {
        match self.col_names.get(idx) {
            Some(name) => Ok(name),
            None => Err(DataFrameError::out_of_bounds(idx, self.width())),
        }
    }

    /// Get the data type of the column at the given `idx`
    /// Returns a result that will `Error` if the `idx` is out of bounds.
    pub fn col_type(&self, idx: usize) -> Result<DataType> {
        match self.schema.get(idx) {
            Some(data_type) => Ok(*data_type),
            None => Err(DataFrameError::out_of_bounds(idx, self.width())),
        }
    }

    /// Given a column name, returns its index
    pub fn col_idx(&self, col_name: &str) -> Option<usize> {
        self.col_names.iter().position(|n| n == col_name)
    }

    /// The number of columns in this Schema.
    pub fn width(&self) -> usize {
        self.col_names.len()
    }

    /// Iterates over the `(name, type)` pairs of this Schema.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DataType)> + '_ {
        self.col_names
            .iter()
            .map(String::as_str)
            .zip(self.schema.iter().copied())
    }
}

impl FromStr for Schema {
    type Err = DataFrameError;

    /// Parses a comma separated list of `name:type` pairs, for example
    /// `"id:int,label:string"`, into a Schema of `Mode::Default`.
    fn from_str(s: &str) -> Result<Self> {
        let mut schema = Schema::new(Mode::Default);
        for field in s.split(',').filter(|f| !f.trim().is_empty()) {
            match field.rsplit_once(':') {
                Some((name, data_type)) => {
                    schema.add_column(data_type.parse()?, name.trim())?
                }
                None => {
                    return Err(DataFrameError::InvalidArgument(format!(
                        "expected 'name:type', found '{}'",
                        field
                    )))
                }
            }
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let s: Schema = "".parse().unwrap();
        assert_eq!(s.width(), 0);
        let s: Schema = "id:int, name:string,score:double".parse().unwrap();
        assert_eq!(s.width(), 3);
        assert_eq!(s.col_type(0).unwrap(), DataType::Int);
        assert_eq!(s.col_name(1).unwrap(), "name");
        assert_eq!(s.col_type(2).unwrap(), DataType::Double);
        assert_eq!(s.mode(), Mode::Default);
        assert!("id".parse::<Schema>().is_err());
        assert!("id:decimal".parse::<Schema>().is_err());
        assert!(matches!(
            "a:int,a:long".parse::<Schema>(),
            Err(DataFrameError::DuplicateColumnName(_))
        ));
    }

    #[test]
    fn test_col_getters_setters() {
        let mut s = Schema::new(Mode::Nullable);
        assert_eq!(s.width(), 0);
        s.add_column(DataType::String, "foo").unwrap();
        s.add_column(DataType::Int, "bar").unwrap();
        assert_eq!(s.width(), 2);
        assert_eq!(s.col_idx("bar"), Some(1));
        assert_eq!(s.col_idx("baz"), None);
        assert!(s.col_name(2).is_err());
        assert!(s.add_column(DataType::Int, "").is_err());
        let fields: Vec<_> = s.iter().collect();
        assert_eq!(fields, vec![("foo", DataType::String), ("bar", DataType::Int)]);
        assert_eq!(s.with_mode(Mode::Default).mode(), Mode::Default);
    }
}
