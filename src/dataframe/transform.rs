//! Row and column transformations of a `DataFrame`: row visitors and
//! filters, projection, factoring, match based search, replacement and
//! removal, deduplication, sorting, and numeric transforms.
//!
//! Everything here is built on the public `Column` and `DataFrame`
//! operations plus a few crate internal helpers that keep the row count of
//! a `DataFrame` consistent.
use crate::dataframe::{
    Column, ColumnKey, DataFrame, DataType, Row, RowView, Rower, Value, TABLE_OVERHEAD,
};
use crate::error::{DataFrameError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// The mapping from factor codes to the categories they replaced, as
/// returned by `DataFrame::factor`.
pub type FactorMap = BTreeMap<i32, Value>;

/// A condition on a single cell.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// The cell equals the value. Numeric values are widened to the column
    /// type first, so `Int(2)` matches `2` in a `Long` column.
    Equals(Value),
    /// The cell is null
    IsNull,
    /// The display text of the cell fully matches the expression. Null
    /// cells display as `null`.
    Regex(Regex),
}

impl Matcher {
    /// A matcher for cells whose display text fully matches `pattern`.
    pub fn regex(pattern: &str) -> Result<Matcher> {
        let anchored = format!("^(?:{})$", pattern);
        Ok(Matcher::Regex(Regex::new(&anchored)?))
    }

    fn bind(&self, col: &Column) -> Bound<'_> {
        match self {
            Matcher::Equals(Value::Null) | Matcher::IsNull => Bound::Null,
            Matcher::Equals(value) => match value.widen_to(col.data_type()) {
                Some(v) => Bound::Value(v),
                None => Bound::Never,
            },
            Matcher::Regex(re) => Bound::Regex(re),
        }
    }
}

/// A `Matcher` resolved against the type of one column.
enum Bound<'m> {
    Never,
    Null,
    Value(Value),
    Regex(&'m Regex),
}

impl Bound<'_> {
    fn test(&self, col: &Column, row: usize) -> bool {
        match self {
            Bound::Never => false,
            Bound::Null => col.value_equals(row, &Value::Null),
            Bound::Value(v) => col.value_equals(row, v),
            Bound::Regex(re) => col
                .get(row)
                .map_or(false, |v| re.is_match(&v.to_string())),
        }
    }
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        Matcher::Equals(value)
    }
}

impl From<Regex> for Matcher {
    fn from(re: Regex) -> Self {
        Matcher::Regex(re)
    }
}

macro_rules! matcher_from {
    ($($type:ty),*) => {
        $(
            impl From<$type> for Matcher {
                fn from(x: $type) -> Self {
                    Matcher::Equals(Value::from(x))
                }
            }
        )*
    };
}

matcher_from!(i8, i16, i32, i64, f32, f64, bool, char, String, &str, Vec<u8>);

/// One or more column constraints, all of which must hold for a row to
/// match.
///
/// ```
/// use colframe::dataframe::{MatchSpec, Matcher};
///
/// let spec = MatchSpec::on("animal", "dog").and("age", Matcher::IsNull);
/// assert_eq!(spec.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatchSpec {
    constraints: Vec<(String, Matcher)>,
}

impl MatchSpec {
    pub fn new() -> Self {
        MatchSpec::default()
    }

    /// A specification with a single constraint.
    pub fn on(col_name: &str, matcher: impl Into<Matcher>) -> Self {
        MatchSpec::new().and(col_name, matcher)
    }

    /// Adds a constraint on the named column.
    pub fn and(mut self, col_name: &str, matcher: impl Into<Matcher>) -> Self {
        self.constraints.push((col_name.to_string(), matcher.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    fn bind<'a>(&'a self, df: &'a DataFrame) -> Result<Vec<(&'a Column, Bound<'a>)>> {
        if self.is_empty() {
            return Err(DataFrameError::InvalidArgument(
                "a match specification needs at least one constraint".to_string(),
            ));
        }
        self.constraints
            .iter()
            .map(|(name, matcher)| {
                let col = df.column(name.as_str())?;
                Ok((col, matcher.bind(col)))
            })
            .collect()
    }
}

impl DataFrame {
    /// Applies the given `rower` to every row of this `DataFrame`, in row
    /// order, and returns it.
    ///
    /// Since `map` takes an immutable reference to `self`, the `rower` can
    /// not mutate this `DataFrame`. If mutation is desired, the `rower` must
    /// create its own `DataFrame` internally and build it up as it visits
    /// rows.
    pub fn map<T: Rower>(&self, mut rower: T) -> Result<T> {
        let mut row = Row::with_width(self.n_cols());
        for i in 0..self.n_rows() {
            self.fill_row(i, &mut row)?;
            rower.visit(&row);
        }
        Ok(rower)
    }

    /// Creates a new `DataFrame` by applying the given `rower` to every
    /// row and copying the rows for which the `rower` returns `true` from
    /// its `visit` method. Rows keep their original order.
    pub fn filter<T: Rower>(&self, rower: &mut T) -> Result<DataFrame> {
        let mut row = Row::with_width(self.n_cols());
        let mut keep = Vec::new();
        for i in 0..self.n_rows() {
            self.fill_row(i, &mut row)?;
            if rower.visit(&row) {
                keep.push(i);
            }
        }
        self.take(&keep)
    }

    /// Creates a new `DataFrame` holding copies of the rows for which
    /// `predicate` returns `true`, in their original order.
    pub fn filter_by<F>(&self, mut predicate: F) -> Result<DataFrame>
    where
        F: FnMut(&RowView<'_>) -> bool,
    {
        let keep: Vec<usize> = self
            .rows()
            .filter(|r| predicate(r))
            .map(|r| r.index())
            .collect();
        self.take(&keep)
    }

    fn resolve_all(&self, col_names: &[&str]) -> Result<HashSet<usize>> {
        col_names.iter().map(|name| self.resolve(*name)).collect()
    }

    /// Creates a new `DataFrame` with copies of only the named columns, in
    /// the column order of this `DataFrame`.
    pub fn include(&self, col_names: &[&str]) -> Result<DataFrame> {
        let wanted = self.resolve_all(col_names)?;
        let columns = self
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| wanted.contains(i))
            .map(|(_, c)| c.clone())
            .collect();
        Ok(self.with_columns(columns))
    }

    /// Creates a new `DataFrame` with copies of all but the named columns.
    pub fn drop(&self, col_names: &[&str]) -> Result<DataFrame> {
        let unwanted = self.resolve_all(col_names)?;
        let columns = self
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| !unwanted.contains(i))
            .map(|(_, c)| c.clone())
            .collect();
        Ok(self.with_columns(columns))
    }

    /// Replaces the categories of a non-numeric column with `Int` codes.
    /// Codes start at 1 and are assigned in order of first occurrence; nulls
    /// stay null. Returns the mapping from codes to categories. A numeric
    /// column is left unchanged and yields an empty mapping.
    pub fn factor<'k>(&mut self, key: impl Into<ColumnKey<'k>>) -> Result<FactorMap> {
        let idx = self.resolve(key)?;
        let col = &self.columns()[idx];
        let mut factors = FactorMap::new();
        if col.is_numeric() {
            return Ok(factors);
        }
        let mut codes: HashMap<Value, i32> = HashMap::new();
        let mut coded = Column::with_capacity(
            col.name(),
            DataType::Int,
            col.is_nullable(),
            col.len(),
        );
        for (row, value) in col.iter().enumerate() {
            if value.is_null() {
                coded.append(Value::Null)?;
                continue;
            }
            let next = codes.len() + 1;
            let code = match codes.get(&value) {
                Some(code) => *code,
                None => {
                    let code = i32::try_from(next).map_err(|_| DataFrameError::Overflow {
                        column: col.name().to_string(),
                        row,
                    })?;
                    codes.insert(value.clone(), code);
                    factors.insert(code, value);
                    code
                }
            };
            coded.append(code)?;
        }
        self.set_column(idx, coded)?;
        Ok(factors)
    }

    fn matching_rows(&self, spec: &MatchSpec) -> Result<Vec<bool>> {
        let bound = spec.bind(self)?;
        Ok((0..self.n_rows())
            .map(|row| bound.iter().all(|(col, m)| m.test(col, row)))
            .collect())
    }

    /// The smallest row index whose cell in the given column matches, or
    /// `None` if no cell matches.
    pub fn index_of<'k>(
        &self,
        key: impl Into<ColumnKey<'k>>,
        matcher: impl Into<Matcher>,
    ) -> Result<Option<usize>> {
        let col = self.column(key)?;
        let matcher = matcher.into();
        let bound = matcher.bind(col);
        Ok((0..col.len()).find(|&row| bound.test(col, row)))
    }

    /// All row indices whose cell in the given column matches, ascending.
    pub fn index_of_all<'k>(
        &self,
        key: impl Into<ColumnKey<'k>>,
        matcher: impl Into<Matcher>,
    ) -> Result<Vec<usize>> {
        let col = self.column(key)?;
        let matcher = matcher.into();
        let bound = matcher.bind(col);
        Ok((0..col.len()).filter(|&row| bound.test(col, row)).collect())
    }

    /// Whether any cell in the given column matches.
    pub fn contains<'k>(
        &self,
        key: impl Into<ColumnKey<'k>>,
        matcher: impl Into<Matcher>,
    ) -> Result<bool> {
        Ok(self.index_of(key, matcher)?.is_some())
    }

    /// Removes every row whose cell in the given column matches, returning
    /// the number of removed rows.
    pub fn exclude<'k>(
        &mut self,
        key: impl Into<ColumnKey<'k>>,
        matcher: impl Into<Matcher>,
    ) -> Result<usize> {
        let col = self.column(key)?;
        let matcher = matcher.into();
        let bound = matcher.bind(col);
        let keep: Vec<bool> = (0..col.len()).map(|row| !bound.test(col, row)).collect();
        self.retain_rows(&keep)
    }

    /// The number of cells in the given column that match.
    pub fn count<'k>(
        &self,
        key: impl Into<ColumnKey<'k>>,
        matcher: impl Into<Matcher>,
    ) -> Result<usize> {
        Ok(self.index_of_all(key, matcher)?.len())
    }

    /// Sets the cell in the `target` column of every row matching `spec` to
    /// `replacement`, returning the number of replaced cells. The
    /// replacement is validated before any cell changes.
    pub fn replace_by_match<'k>(
        &mut self,
        spec: &MatchSpec,
        target: impl Into<ColumnKey<'k>>,
        replacement: impl Into<Value>,
    ) -> Result<usize> {
        let target = self.resolve(target)?;
        let value = self.columns()[target].coerce(replacement.into())?;
        let matching = self.matching_rows(spec)?;
        let col = self.column_mut(target)?;
        let mut replaced = 0;
        for (row, _) in matching.iter().enumerate().filter(|(_, m)| **m) {
            col.set(row, value.clone())?;
            replaced += 1;
        }
        Ok(replaced)
    }

    /// Removes every row matching `spec`, returning the number of removed
    /// rows. The remaining rows keep their order.
    pub fn remove_rows_by_match(&mut self, spec: &MatchSpec) -> Result<usize> {
        let keep: Vec<bool> = self.matching_rows(spec)?.into_iter().map(|m| !m).collect();
        self.retain_rows(&keep)
    }

    /// The distinct values of the given column. Null is one distinct value.
    pub fn unique<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<HashSet<Value>> {
        Ok(self.column(key)?.unique_values())
    }

    /// The number of distinct values of the given column.
    pub fn count_unique<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<usize> {
        Ok(self.unique(key)?.len())
    }

    /// The distinct values of the given column with the number of their
    /// occurrences, most frequent first. Ties keep first occurrence order.
    pub fn value_counts<'k>(
        &self,
        key: impl Into<ColumnKey<'k>>,
    ) -> Result<Vec<(Value, usize)>> {
        let col = self.column(key)?;
        let mut positions: HashMap<Value, usize> = HashMap::new();
        let mut counts: Vec<(Value, usize)> = Vec::new();
        for value in col.iter() {
            match positions.get(&value) {
                Some(&pos) => counts[pos].1 += 1,
                None => {
                    positions.insert(value.clone(), counts.len());
                    counts.push((value, 1));
                }
            }
        }
        // sort_by is stable
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(counts)
    }

    /// The estimated number of bytes held by this `DataFrame`, computed from
    /// the capacity of every column without looking at any row.
    pub fn memory_usage(&self) -> usize {
        TABLE_OVERHEAD + self.columns().iter().map(Column::memory_usage).sum::<usize>()
    }

    /// See `Column::absolute`.
    pub fn absolute<'k>(&mut self, key: impl Into<ColumnKey<'k>>) -> Result<()> {
        self.column_mut(key)?.absolute()
    }

    /// See `Column::ceil`.
    pub fn ceil<'k>(&mut self, key: impl Into<ColumnKey<'k>>) -> Result<()> {
        self.column_mut(key)?.ceil()
    }

    /// See `Column::floor`.
    pub fn floor<'k>(&mut self, key: impl Into<ColumnKey<'k>>) -> Result<()> {
        self.column_mut(key)?.floor()
    }

    pub fn round<'k>(&mut self, key: impl Into<ColumnKey<'k>>, places: u32) -> Result<()> {
        self.column_mut(key)?.round(places)
    }

    pub fn clip<'k>(
        &mut self,
        key: impl Into<ColumnKey<'k>>,
        low: Option<f64>,
        high: Option<f64>,
    ) -> Result<()> {
        self.column_mut(key)?.clip(low, high)
    }

    pub fn sum<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<f64> {
        self.column(key)?.sum()
    }

    pub fn average<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<Option<f64>> {
        self.column(key)?.average()
    }

    pub fn median<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<Option<f64>> {
        self.column(key)?.median()
    }

    pub fn minimum<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<Option<Value>> {
        self.column(key)?.minimum()
    }

    pub fn maximum<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Result<Option<Value>> {
        self.column(key)?.maximum()
    }

    /// Converts the given column to the `target` type in place. See
    /// `Column::convert_to`.
    pub fn convert<'k>(
        &mut self,
        key: impl Into<ColumnKey<'k>>,
        target: DataType,
    ) -> Result<()> {
        let idx = self.resolve(key)?;
        let converted = self.columns()[idx].convert_to(target)?;
        self.set_column(idx, converted)?;
        Ok(())
    }

    /// Sorts all rows by the given column in ascending order. The sort is
    /// stable and nulls come last.
    pub fn sort_ascending_by<'k>(&mut self, key: impl Into<ColumnKey<'k>>) -> Result<()> {
        self.sort_by(key, false)
    }

    /// Sorts all rows by the given column in descending order. The sort is
    /// stable and nulls come last.
    pub fn sort_descending_by<'k>(&mut self, key: impl Into<ColumnKey<'k>>) -> Result<()> {
        self.sort_by(key, true)
    }

    fn sort_by<'k>(&mut self, key: impl Into<ColumnKey<'k>>, descending: bool) -> Result<()> {
        let values = self.column(key)?.to_values();
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| {
            let (x, y) = (&values[a], &values[b]);
            match (x.is_null(), y.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                _ if descending => y.compare(x),
                _ => x.compare(y),
            }
        });
        self.replace_columns(order.len(), |c| c.take(&order))
    }
}
