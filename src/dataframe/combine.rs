//! Operations building one `DataFrame` out of two or more: grouped
//! aggregation, joins, row and column set operations, merging and appending.
//!
//! Rows are compared by value, so two rows are the same when every cell is
//! equal under `Value` equality.
use crate::dataframe::{Column, ColumnKey, DataFrame, DataType, Mode, Row, Value};
use crate::error::{DataFrameError, Result};
use std::collections::{HashMap, HashSet};

/// How `DataFrame::group_by` summarizes the rows of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// The smallest non-null value, keeping the column type
    Minimum,
    /// The largest non-null value, keeping the column type
    Maximum,
    /// The mean of the non-null values, as a `Double`
    Average,
    /// The sum of the non-null values, as a `Double`
    Sum,
}

impl Aggregate {
    fn apply(self, col: &Column, groups: &[Vec<usize>]) -> Result<Column> {
        let data_type = match self {
            Aggregate::Minimum | Aggregate::Maximum => col.data_type(),
            Aggregate::Average | Aggregate::Sum => DataType::Double,
        };
        let mut out =
            Column::with_capacity(col.name(), data_type, col.is_nullable(), groups.len());
        for rows in groups {
            let part = col.take(rows)?;
            let value = match self {
                Aggregate::Minimum => part.minimum()?.unwrap_or(Value::Null),
                Aggregate::Maximum => part.maximum()?.unwrap_or(Value::Null),
                Aggregate::Average => part.average()?.map_or(Value::Null, Value::Double),
                Aggregate::Sum => Value::Double(part.sum()?),
            };
            out.append(value)?;
        }
        Ok(out)
    }
}

/// A copy of `col` with the nullability of `mode`.
fn fit_mode(col: &Column, mode: Mode) -> Result<Column> {
    if mode.is_nullable() {
        Ok(col.to_nullable())
    } else {
        col.to_default()
    }
}

impl DataFrame {
    /// Creates an empty `DataFrame` with the mode, column names and column
    /// types of this one.
    pub fn like(&self) -> DataFrame {
        DataFrame::with_schema(&self.schema())
    }

    /// Appends every row of `other`, matching columns by name. Columns of
    /// `other` this `DataFrame` does not have are ignored. Columns `other`
    /// lacks are filled with null, or with the default value of their type
    /// in `Mode::Default`. Values widen as in `add_row`.
    ///
    /// Returns the number of added rows. Every row is checked before the
    /// first one is added, so on error this `DataFrame` is unchanged.
    pub fn add_rows(&mut self, other: &DataFrame) -> Result<usize> {
        if self.n_cols() == 0 {
            return Err(DataFrameError::InvalidArgument(
                "cannot add rows to a table without columns".to_string(),
            ));
        }
        let sources: Vec<Option<&Column>> = self
            .columns()
            .iter()
            .map(|c| other.col_idx(c.name()).map(|i| &other.columns()[i]))
            .collect();
        let mut rows = Vec::with_capacity(other.n_rows());
        for row in 0..other.n_rows() {
            let values = self
                .columns()
                .iter()
                .zip(&sources)
                .map(|(col, source)| {
                    let value = match source {
                        Some(source) => source.get(row)?,
                        None if self.is_nullable() => Value::Null,
                        None => col.data_type().default_value(),
                    };
                    col.coerce(value)
                })
                .collect::<Result<Vec<Value>>>()?;
            rows.push(Row::from(values));
        }
        for row in &rows {
            self.add_row(row)?;
        }
        Ok(rows.len())
    }

    /// Summarizes the rows of this `DataFrame` by the distinct values of the
    /// `key` column.
    ///
    /// The result has one row per distinct key, in order of first
    /// occurrence, with a null key last. Its first column is the key column
    /// and every other numeric column follows, summarized with `aggregate`.
    /// Non-numeric columns are left out. A group whose values are all null
    /// summarizes to null, except for `Aggregate::Sum`, which gives zero.
    pub fn group_by<'k>(
        &self,
        key: impl Into<ColumnKey<'k>>,
        aggregate: Aggregate,
    ) -> Result<DataFrame> {
        let key = self.resolve(key)?;
        let key_col = &self.columns()[key];
        let mut positions: HashMap<Value, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut nulls = Vec::new();
        for (row, value) in key_col.iter().enumerate() {
            if value.is_null() {
                nulls.push(row);
                continue;
            }
            match positions.get(&value) {
                Some(&g) => groups[g].push(row),
                None => {
                    positions.insert(value, groups.len());
                    groups.push(vec![row]);
                }
            }
        }
        if !nulls.is_empty() {
            groups.push(nulls);
        }

        let firsts: Vec<usize> = groups.iter().map(|g| g[0]).collect();
        let mut columns = vec![key_col.take(&firsts)?];
        for (idx, col) in self.columns().iter().enumerate() {
            if idx != key && col.is_numeric() {
                columns.push(aggregate.apply(col, &groups)?);
            }
        }
        DataFrame::from_columns(self.mode(), columns)
    }

    /// See `group_by` with `Aggregate::Minimum`.
    pub fn group_minimum_by<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<DataFrame> {
        self.group_by(key, Aggregate::Minimum)
    }

    /// See `group_by` with `Aggregate::Maximum`.
    pub fn group_maximum_by<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<DataFrame> {
        self.group_by(key, Aggregate::Maximum)
    }

    /// See `group_by` with `Aggregate::Average`.
    pub fn group_average_by<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<DataFrame> {
        self.group_by(key, Aggregate::Average)
    }

    /// See `group_by` with `Aggregate::Sum`.
    pub fn group_sum_by<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<DataFrame> {
        self.group_by(key, Aggregate::Sum)
    }

    /// Joins this `DataFrame` with `other` on the single column name they
    /// share. See `join_on`.
    pub fn join(&self, other: &DataFrame) -> Result<DataFrame> {
        let shared: Vec<&str> = self
            .column_names()
            .into_iter()
            .filter(|name| other.has_column(name))
            .collect();
        match shared.as_slice() {
            [name] => self.join_on(other, *name, *name),
            [] => Err(DataFrameError::InvalidArgument(
                "the tables have no column in common".to_string(),
            )),
            _ => Err(DataFrameError::InvalidArgument(format!(
                "the tables share the columns {:?}, pick one with join_on",
                shared
            ))),
        }
    }

    /// An inner join pairing every row of this `DataFrame` with every row of
    /// `other` whose `right` cell equals its `left` cell. Null keys never
    /// match. Both key columns must have the same type.
    ///
    /// The result holds all columns of this `DataFrame` followed by the
    /// columns of `other` except `right` and any name already present. Rows
    /// come in the order of this `DataFrame`, then of `other`. The result is
    /// nullable if either input is.
    pub fn join_on<'k, 'j>(
        &self,
        other: &DataFrame,
        left: impl Into<ColumnKey<'k>>,
        right: impl Into<ColumnKey<'j>>,
    ) -> Result<DataFrame> {
        let left = self.resolve(left)?;
        let right = other.resolve(right)?;
        let (left_col, right_col) = (&self.columns()[left], &other.columns()[right]);
        if left_col.data_type() != right_col.data_type() {
            return Err(DataFrameError::TypeMismatch(format!(
                "cannot join {} column '{}' with {} column '{}'",
                left_col.data_type(),
                left_col.name(),
                right_col.data_type(),
                right_col.name()
            )));
        }

        let mut index: HashMap<Value, Vec<usize>> = HashMap::new();
        for (row, value) in right_col.iter().enumerate() {
            if !value.is_null() {
                index.entry(value).or_default().push(row);
            }
        }
        let (mut left_rows, mut right_rows) = (Vec::new(), Vec::new());
        for (row, value) in left_col.iter().enumerate() {
            if let Some(matches) = index.get(&value) {
                for &other_row in matches {
                    left_rows.push(row);
                    right_rows.push(other_row);
                }
            }
        }

        let mode = Mode::from_nullable(self.is_nullable() || other.is_nullable());
        let mut columns = Vec::with_capacity(self.n_cols() + other.n_cols());
        for col in self.columns() {
            columns.push(fit_mode(&col.take(&left_rows)?, mode)?);
        }
        for (idx, col) in other.columns().iter().enumerate() {
            if idx != right && !self.has_column(col.name()) {
                columns.push(fit_mode(&col.take(&right_rows)?, mode)?);
            }
        }
        DataFrame::from_columns(mode, columns)
    }

    fn check_same_types(&self, other: &DataFrame) -> Result<()> {
        if self.n_cols() != other.n_cols() {
            return Err(DataFrameError::SchemaMismatch(format!(
                "{} columns against {}",
                self.n_cols(),
                other.n_cols()
            )));
        }
        for (idx, (a, b)) in self.columns().iter().zip(other.columns()).enumerate() {
            if a.data_type() != b.data_type() {
                return Err(DataFrameError::SchemaMismatch(format!(
                    "column {} is {} in one table and {} in the other",
                    idx,
                    a.data_type(),
                    b.data_type()
                )));
            }
        }
        Ok(())
    }

    fn value_rows(&self) -> Result<Vec<Vec<Value>>> {
        (0..self.n_rows())
            .map(|row| self.columns().iter().map(|c| c.get(row)).collect())
            .collect()
    }

    /// The distinct rows of this `DataFrame` followed by the distinct rows
    /// of `other` not already present. Both must have the same column types
    /// in the same order. The result takes its names and mode from this
    /// `DataFrame`, so a null row of `other` fails in `Mode::Default`.
    pub fn union_rows(&self, other: &DataFrame) -> Result<DataFrame> {
        self.check_same_types(other)?;
        let mut seen = HashSet::new();
        let mine: Vec<usize> = self
            .value_rows()?
            .into_iter()
            .enumerate()
            .filter_map(|(row, values)| seen.insert(values).then_some(row))
            .collect();
        let mut result = self.take(&mine)?;
        for values in other.value_rows()? {
            if !seen.contains(&values) {
                seen.insert(values.clone());
                result.add_row(&Row::from(values))?;
            }
        }
        Ok(result)
    }

    /// The distinct rows of this `DataFrame` that also appear in `other`,
    /// in the order of this `DataFrame`.
    pub fn intersection_rows(&self, other: &DataFrame) -> Result<DataFrame> {
        self.check_same_types(other)?;
        let theirs: HashSet<Vec<Value>> = other.value_rows()?.into_iter().collect();
        let mut seen = HashSet::new();
        let keep: Vec<usize> = self
            .value_rows()?
            .into_iter()
            .enumerate()
            .filter(|(_, values)| theirs.contains(values))
            .filter_map(|(row, values)| seen.insert(values).then_some(row))
            .collect();
        self.take(&keep)
    }

    /// The rows found in only one of the two tables: the distinct rows of
    /// this `DataFrame` missing from `other`, followed by the distinct rows
    /// of `other` missing from this one.
    pub fn difference_rows(&self, other: &DataFrame) -> Result<DataFrame> {
        self.check_same_types(other)?;
        let mine = self.value_rows()?;
        let theirs = other.value_rows()?;
        let mine_set: HashSet<&Vec<Value>> = mine.iter().collect();
        let theirs_set: HashSet<&Vec<Value>> = theirs.iter().collect();

        let mut seen = HashSet::new();
        let keep: Vec<usize> = mine
            .iter()
            .enumerate()
            .filter(|(_, values)| !theirs_set.contains(values) && seen.insert(*values))
            .map(|(row, _)| row)
            .collect();
        let mut result = self.take(&keep)?;
        for values in &theirs {
            if !mine_set.contains(values) && seen.insert(values) {
                result.add_row(&Row::from(values.clone()))?;
            }
        }
        Ok(result)
    }

    fn check_same_rows(&self, other: &DataFrame) -> Result<()> {
        if self.n_cols() > 0 && other.n_cols() > 0 && self.n_rows() != other.n_rows() {
            return Err(DataFrameError::SchemaMismatch(format!(
                "{} rows against {}",
                self.n_rows(),
                other.n_rows()
            )));
        }
        Ok(())
    }

    /// All columns of this `DataFrame` followed by the columns of `other`
    /// whose names it does not have. Columns are matched by name, both
    /// tables must have the same number of rows, and the result has the mode
    /// of this `DataFrame`.
    pub fn union_columns(&self, other: &DataFrame) -> Result<DataFrame> {
        self.check_same_rows(other)?;
        let mut columns = self.columns().to_vec();
        for col in other.columns() {
            if !self.has_column(col.name()) {
                columns.push(fit_mode(col, self.mode())?);
            }
        }
        DataFrame::from_columns(self.mode(), columns)
    }

    /// The columns of this `DataFrame` whose names `other` also has.
    pub fn intersection_columns(&self, other: &DataFrame) -> Result<DataFrame> {
        self.check_same_rows(other)?;
        let columns = self
            .columns()
            .iter()
            .filter(|c| other.has_column(c.name()))
            .cloned()
            .collect();
        DataFrame::from_columns(self.mode(), columns)
    }

    /// The columns whose names only one table has: those of this
    /// `DataFrame` first, then those of `other`.
    pub fn difference_columns(&self, other: &DataFrame) -> Result<DataFrame> {
        self.check_same_rows(other)?;
        let mut columns: Vec<Column> = self
            .columns()
            .iter()
            .filter(|c| !other.has_column(c.name()))
            .cloned()
            .collect();
        for col in other.columns() {
            if !self.has_column(col.name()) {
                columns.push(fit_mode(col, self.mode())?);
            }
        }
        DataFrame::from_columns(self.mode(), columns)
    }

    /// Places the columns of all `frames` side by side. Every frame with
    /// columns must have the same number of rows. The result is nullable if
    /// any input is. A name used by more than one column gets a `_k` suffix
    /// on every use, counting from zero.
    pub fn merge(frames: &[&DataFrame]) -> Result<DataFrame> {
        if frames.is_empty() {
            return Err(DataFrameError::InvalidArgument(
                "nothing to merge".to_string(),
            ));
        }
        let mode = Mode::from_nullable(frames.iter().any(|f| f.is_nullable()));
        let mut uses: HashMap<&str, usize> = HashMap::new();
        for col in frames.iter().flat_map(|f| f.columns()) {
            *uses.entry(col.name()).or_insert(0) += 1;
        }

        let mut next: HashMap<&str, usize> = HashMap::new();
        let mut columns = Vec::new();
        let mut rows: Option<usize> = None;
        for frame in frames.iter().filter(|f| f.n_cols() > 0) {
            match rows {
                Some(n) if n != frame.n_rows() => {
                    return Err(DataFrameError::SchemaMismatch(format!(
                        "cannot merge tables of {} and {} rows",
                        n,
                        frame.n_rows()
                    )))
                }
                _ => rows = Some(frame.n_rows()),
            }
            for col in frame.columns() {
                let mut merged = fit_mode(col, mode)?;
                if uses[col.name()] > 1 {
                    let k = next.entry(col.name()).or_insert(0);
                    merged.set_name(format!("{}_{}", col.name(), k));
                    *k += 1;
                }
                columns.push(merged);
            }
        }
        DataFrame::from_columns(mode, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams() -> DataFrame {
        DataFrame::from_columns(
            Mode::Default,
            vec![
                Column::from_vec("team", vec!["x", "y", "x", "z", "y"]).unwrap(),
                Column::from_vec("pts", vec![1, 5, 3, 2, 7]).unwrap(),
                Column::from_vec("note", vec!["a", "b", "c", "d", "e"]).unwrap(),
                Column::from_vec("w", vec![0.5, 1.5, 2.5, 3.5, 4.5]).unwrap(),
            ],
        )
        .unwrap()
    }

    fn ints(values: &[i32]) -> Vec<Value> {
        values.iter().map(|&x| Value::Int(x)).collect()
    }

    fn doubles(values: &[f64]) -> Vec<Value> {
        values.iter().map(|&x| Value::Double(x)).collect()
    }

    #[test]
    fn test_group_by() {
        let df = teams();
        let sums = df.group_sum_by("team").unwrap();
        assert_eq!(sums.column_names(), vec!["team", "pts", "w"]);
        assert_eq!(
            sums["team"].to_values(),
            vec![Value::from("x"), Value::from("y"), Value::from("z")]
        );
        assert_eq!(sums["pts"].data_type(), DataType::Double);
        assert_eq!(sums["pts"].to_values(), doubles(&[4.0, 12.0, 2.0]));
        assert_eq!(sums["w"].to_values(), doubles(&[3.0, 6.0, 3.5]));

        let mins = df.group_minimum_by("team").unwrap();
        assert_eq!(mins["pts"].data_type(), DataType::Int);
        assert_eq!(mins["pts"].to_values(), ints(&[1, 5, 2]));
        let maxs = df.group_maximum_by(0usize).unwrap();
        assert_eq!(maxs["pts"].to_values(), ints(&[3, 7, 2]));
        let avgs = df.group_average_by("team").unwrap();
        assert_eq!(avgs["pts"].to_values(), doubles(&[2.0, 6.0, 2.0]));
        assert_eq!(avgs.mode(), Mode::Default);

        // a numeric key is not summarized
        let by_pts = df.group_sum_by("pts").unwrap();
        assert_eq!(by_pts.column_names(), vec!["pts", "w"]);
        assert_eq!(by_pts.n_rows(), 5);
        assert!(df.group_sum_by("missing").is_err());
    }

    #[test]
    fn test_group_by_nullable() {
        let df = DataFrame::from_columns(
            Mode::Nullable,
            vec![
                Column::from_options("k", vec![None, Some('x'), None, Some('x')]).unwrap(),
                Column::from_options("n", vec![None, Some(1i64), None, Some(3)]).unwrap(),
            ],
        )
        .unwrap();
        let mins = df.group_minimum_by("k").unwrap();
        assert_eq!(mins["k"].to_values(), vec![Value::Char('x'), Value::Null]);
        assert_eq!(mins["n"].to_values(), vec![Value::Long(1), Value::Null]);
        let avgs = df.group_average_by("k").unwrap();
        assert_eq!(avgs["n"].to_values(), vec![Value::Double(2.0), Value::Null]);
        let sums = df.group_sum_by("k").unwrap();
        assert_eq!(sums["n"].to_values(), doubles(&[4.0, 0.0]));

        let empty = df.like().group_sum_by("k").unwrap();
        assert_eq!(empty.n_rows(), 0);
        assert_eq!(empty.n_cols(), 2);
    }

    #[test]
    fn test_join() {
        let left = DataFrame::from_columns(
            Mode::Default,
            vec![
                Column::from_vec("id", vec![1, 2, 3]).unwrap(),
                Column::from_vec("name", vec!["a", "b", "c"]).unwrap(),
            ],
        )
        .unwrap();
        let right = DataFrame::from_columns(
            Mode::Nullable,
            vec![
                Column::from_options("id", vec![Some(2), Some(3), Some(3), None]).unwrap(),
                Column::from_options("city", vec![Some("p"), None, Some("r"), Some("s")])
                    .unwrap(),
            ],
        )
        .unwrap();
        let joined = left.join(&right).unwrap();
        assert_eq!(joined.mode(), Mode::Nullable);
        assert_eq!(joined.column_names(), vec!["id", "name", "city"]);
        assert_eq!(joined["id"].to_values(), ints(&[2, 3, 3]));
        assert_eq!(
            joined["city"].to_values(),
            vec![Value::from("p"), Value::Null, Value::from("r")]
        );

        let renamed = DataFrame::from_columns(
            Mode::Default,
            vec![
                Column::from_vec("key", vec![3, 1]).unwrap(),
                Column::from_vec("name", vec!["q", "r"]).unwrap(),
            ],
        )
        .unwrap();
        let joined = left.join_on(&renamed, "id", "key").unwrap();
        assert_eq!(joined.mode(), Mode::Default);
        // "key" is the join column and "name" is already present
        assert_eq!(joined.column_names(), vec!["id", "name"]);
        assert_eq!(joined["id"].to_values(), ints(&[1, 3]));

        let longs = DataFrame::from_columns(
            Mode::Default,
            vec![Column::from_vec("id", vec![1i64]).unwrap()],
        )
        .unwrap();
        assert!(matches!(
            left.join(&longs),
            Err(DataFrameError::TypeMismatch(_))
        ));
        assert!(left.join(&DataFrame::new(Mode::Default)).is_err());
        assert!(left.join(&left).is_err());
    }

    fn pairs(k: Vec<i32>, s: Vec<&str>) -> DataFrame {
        DataFrame::from_columns(
            Mode::Default,
            vec![
                Column::from_vec("k", k).unwrap(),
                Column::from_vec("s", s).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_row_set_operations() {
        let a = pairs(vec![1, 2, 2, 3], vec!["x", "y", "y", "z"]);
        let b = pairs(vec![3, 4, 1], vec!["z", "w", "q"]);

        let union = a.union_rows(&b).unwrap();
        assert_eq!(union["k"].to_values(), ints(&[1, 2, 3, 4, 1]));
        assert_eq!(union.get(4, "s").unwrap(), Value::from("q"));

        let both = a.intersection_rows(&b).unwrap();
        assert_eq!(both.n_rows(), 1);
        assert_eq!(both["k"].to_values(), ints(&[3]));
        assert_eq!(both.get(0, "s").unwrap(), Value::from("z"));

        let either = a.difference_rows(&b).unwrap();
        assert_eq!(either["k"].to_values(), ints(&[1, 2, 4, 1]));
        assert_eq!(either["s"].to_values(), vec![
            Value::from("x"),
            Value::from("y"),
            Value::from("w"),
            Value::from("q"),
        ]);

        let chars = DataFrame::from_columns(
            Mode::Default,
            vec![
                Column::from_vec("k", vec![1]).unwrap(),
                Column::from_vec("s", vec!['x']).unwrap(),
            ],
        )
        .unwrap();
        assert!(matches!(
            a.union_rows(&chars),
            Err(DataFrameError::SchemaMismatch(_))
        ));
        assert!(a.intersection_rows(&a.include(&["k"]).unwrap()).is_err());
    }

    #[test]
    fn test_column_set_operations() {
        let a = pairs(vec![1, 2], vec!["x", "y"]);
        let b = DataFrame::from_columns(
            Mode::Nullable,
            vec![
                Column::from_options("s", vec![None, Some("q")]).unwrap(),
                Column::from_options("t", vec![Some(true), Some(false)]).unwrap(),
            ],
        )
        .unwrap();

        let union = a.union_columns(&b).unwrap();
        assert_eq!(union.mode(), Mode::Default);
        assert_eq!(union.column_names(), vec!["k", "s", "t"]);
        assert_eq!(union.get(0, "s").unwrap(), Value::from("x"));

        let union = b.union_columns(&a).unwrap();
        assert_eq!(union.column_names(), vec!["s", "t", "k"]);
        assert!(union["k"].is_nullable());

        let both = a.intersection_columns(&b).unwrap();
        assert_eq!(both.column_names(), vec!["s"]);
        assert_eq!(both["s"].to_values(), vec![Value::from("x"), Value::from("y")]);

        let either = a.difference_columns(&b).unwrap();
        assert_eq!(either.column_names(), vec!["k", "t"]);
        assert_eq!(either.n_rows(), 2);

        // a null cell cannot move into a default table
        let holes = DataFrame::from_columns(
            Mode::Nullable,
            vec![Column::from_options("u", vec![Some(1.0), None]).unwrap()],
        )
        .unwrap();
        assert!(matches!(
            a.union_columns(&holes),
            Err(DataFrameError::NullabilityViolation { .. })
        ));
        assert!(a.union_columns(&pairs(vec![1], vec!["x"])).is_err());
    }

    #[test]
    fn test_merge() {
        let a = pairs(vec![1, 2], vec!["x", "y"]);
        let b = DataFrame::from_columns(
            Mode::Nullable,
            vec![
                Column::from_options("k", vec![None, Some(5)]).unwrap(),
                Column::from_options("v", vec![Some(0.5), None]).unwrap(),
            ],
        )
        .unwrap();
        let merged = DataFrame::merge(&[&a, &b]).unwrap();
        assert_eq!(merged.mode(), Mode::Nullable);
        assert_eq!(merged.column_names(), vec!["k_0", "s", "k_1", "v"]);
        assert!(merged.is_null(0, "k_1").unwrap());
        assert_eq!(merged.get(1, "k_0").unwrap(), Value::Int(2));

        assert_eq!(DataFrame::merge(&[&a]).unwrap(), a);
        assert_eq!(
            DataFrame::merge(&[&a, &DataFrame::new(Mode::Default)]).unwrap(),
            a
        );
        assert!(DataFrame::merge(&[]).is_err());
        assert!(DataFrame::merge(&[&a, &pairs(vec![1], vec!["z"])]).is_err());
    }

    #[test]
    fn test_add_rows() {
        let mut a = DataFrame::from_columns(
            Mode::Default,
            vec![
                Column::from_vec("k", vec![1i64]).unwrap(),
                Column::from_vec("s", vec!["x"]).unwrap(),
            ],
        )
        .unwrap();
        let b = DataFrame::from_columns(
            Mode::Default,
            vec![
                Column::from_vec("s", vec!["y", "z"]).unwrap(),
                Column::from_vec("extra", vec![true, false]).unwrap(),
                Column::from_vec("k", vec![2, 3]).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(a.add_rows(&b).unwrap(), 2);
        assert_eq!(
            a["k"].to_values(),
            vec![Value::Long(1), Value::Long(2), Value::Long(3)]
        );
        assert_eq!(a.get(2, "s").unwrap(), Value::from("z"));

        let only_s = b.include(&["s"]).unwrap();
        a.add_rows(&only_s).unwrap();
        assert_eq!(a.get(3, "k").unwrap(), Value::Long(0));

        let mut nullable = DataFrame::from_columns(
            Mode::Nullable,
            vec![
                Column::from_options("k", vec![Some(9i64)]).unwrap(),
                Column::from_options("q", vec![Some('c')]).unwrap(),
            ],
        )
        .unwrap();
        nullable.add_rows(&b).unwrap();
        assert_eq!(nullable.get(2, "k").unwrap(), Value::Long(3));
        assert!(nullable.is_null(2, "q").unwrap());

        let wrong = DataFrame::from_columns(
            Mode::Default,
            vec![Column::from_vec("k", vec!["1", "2"]).unwrap()],
        )
        .unwrap();
        let before = a.clone();
        assert!(a.add_rows(&wrong).is_err());
        assert_eq!(a, before);
        assert!(DataFrame::new(Mode::Default).add_rows(&b).is_err());
    }

    #[test]
    fn test_like() {
        let df = teams();
        let empty = df.like();
        assert_eq!(empty.n_rows(), 0);
        assert_eq!(empty.schema(), df.schema());
        assert_eq!(empty.capacity(), 0);
    }
}
