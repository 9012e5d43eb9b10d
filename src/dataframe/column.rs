//! A `Column` is a single named, typed and growable sequence of values.
//!
//! Each `Column` owns a contiguous, typed backing buffer whose capacity may
//! exceed the logical length of the column. The positions between the
//! logical length and the capacity are never observable: every accessor,
//! iterator, comparison and hash only looks at the logical range. A
//! nullable `Column` additionally owns a `NullMask` with one bit per
//! logical entry.
use crate::dataframe::bitmap::NullMask;
use crate::dataframe::types::{canonical_f32, canonical_f64, DataType, Value};
use crate::error::{DataFrameError, Result};
use deepsize::DeepSizeOf;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Smallest capacity a `Column` grows to on its first reallocation.
const MIN_CAPACITY: usize = 8;

/// Fixed number of bytes accounted for every `Column` by `memory_usage`.
pub const COLUMN_OVERHEAD: usize = std::mem::size_of::<Column>();

/// The typed backing storage of a `Column`. Null entries of a nullable
/// column hold the element type's default value.
#[derive(Serialize, Deserialize, Debug, DeepSizeOf)]
pub(crate) enum ColumnData {
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Boolean(Vec<bool>),
    /// ASCII characters stored as single bytes
    Char(Vec<u8>),
    String(Vec<String>),
    Binary(Vec<Vec<u8>>),
}

/// Evaluates `$body` with `$v` bound to the typed vector inside `$data`.
macro_rules! with_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::Byte($v) => $body,
            ColumnData::Short($v) => $body,
            ColumnData::Int($v) => $body,
            ColumnData::Long($v) => $body,
            ColumnData::Float($v) => $body,
            ColumnData::Double($v) => $body,
            ColumnData::Boolean($v) => $body,
            ColumnData::Char($v) => $body,
            ColumnData::String($v) => $body,
            ColumnData::Binary($v) => $body,
        }
    };
}

/// Like `with_data!`, but `$body` produces a new vector which is wrapped
/// in the same `ColumnData` variant.
macro_rules! map_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::Byte($v) => ColumnData::Byte($body),
            ColumnData::Short($v) => ColumnData::Short($body),
            ColumnData::Int($v) => ColumnData::Int($body),
            ColumnData::Long($v) => ColumnData::Long($body),
            ColumnData::Float($v) => ColumnData::Float($body),
            ColumnData::Double($v) => ColumnData::Double($body),
            ColumnData::Boolean($v) => ColumnData::Boolean($body),
            ColumnData::Char($v) => ColumnData::Char($body),
            ColumnData::String($v) => ColumnData::String($body),
            ColumnData::Binary($v) => ColumnData::Binary($body),
        }
    };
}

/// Where `ColumnData::write` puts a value.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Set(usize),
    Push,
    Insert(usize),
}

impl ColumnData {
    pub(crate) fn with_capacity(data_type: DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Byte => ColumnData::Byte(Vec::with_capacity(capacity)),
            DataType::Short => ColumnData::Short(Vec::with_capacity(capacity)),
            DataType::Int => ColumnData::Int(Vec::with_capacity(capacity)),
            DataType::Long => ColumnData::Long(Vec::with_capacity(capacity)),
            DataType::Float => ColumnData::Float(Vec::with_capacity(capacity)),
            DataType::Double => ColumnData::Double(Vec::with_capacity(capacity)),
            DataType::Boolean => {
                ColumnData::Boolean(Vec::with_capacity(capacity))
            }
            DataType::Char => ColumnData::Char(Vec::with_capacity(capacity)),
            DataType::String => {
                ColumnData::String(Vec::with_capacity(capacity))
            }
            DataType::Binary => {
                ColumnData::Binary(Vec::with_capacity(capacity))
            }
        }
    }

    pub(crate) fn data_type(&self) -> DataType {
        match self {
            ColumnData::Byte(_) => DataType::Byte,
            ColumnData::Short(_) => DataType::Short,
            ColumnData::Int(_) => DataType::Int,
            ColumnData::Long(_) => DataType::Long,
            ColumnData::Float(_) => DataType::Float,
            ColumnData::Double(_) => DataType::Double,
            ColumnData::Boolean(_) => DataType::Boolean,
            ColumnData::Char(_) => DataType::Char,
            ColumnData::String(_) => DataType::String,
            ColumnData::Binary(_) => DataType::Binary,
        }
    }

    pub(crate) fn len(&self) -> usize {
        with_data!(self, v => v.len())
    }

    fn capacity(&self) -> usize {
        with_data!(self, v => v.capacity())
    }

    /// The element at `index`, ignoring nullability.
    fn value_at(&self, index: usize) -> Value {
        match self {
            ColumnData::Byte(v) => Value::Byte(v[index]),
            ColumnData::Short(v) => Value::Short(v[index]),
            ColumnData::Int(v) => Value::Int(v[index]),
            ColumnData::Long(v) => Value::Long(v[index]),
            ColumnData::Float(v) => Value::Float(v[index]),
            ColumnData::Double(v) => Value::Double(v[index]),
            ColumnData::Boolean(v) => Value::Boolean(v[index]),
            ColumnData::Char(v) => Value::Char(char::from(v[index])),
            ColumnData::String(v) => Value::String(v[index].clone()),
            ColumnData::Binary(v) => Value::Binary(v[index].clone()),
        }
    }

    /// Writes an already coerced `value` into the given `slot`. `Null` is
    /// written as the default value of the element type.
    fn write(&mut self, slot: Slot, value: Value) -> Result<()> {
        macro_rules! put {
            ($v:ident, $x:expr) => {
                match slot {
                    Slot::Set(i) => $v[i] = $x,
                    Slot::Push => $v.push($x),
                    Slot::Insert(i) => $v.insert(i, $x),
                }
            };
        }

        match (self, value) {
            (ColumnData::Byte(v), Value::Byte(x)) => put!(v, x),
            (ColumnData::Short(v), Value::Short(x)) => put!(v, x),
            (ColumnData::Int(v), Value::Int(x)) => put!(v, x),
            (ColumnData::Long(v), Value::Long(x)) => put!(v, x),
            (ColumnData::Float(v), Value::Float(x)) => put!(v, x),
            (ColumnData::Double(v), Value::Double(x)) => put!(v, x),
            (ColumnData::Boolean(v), Value::Boolean(x)) => put!(v, x),
            (ColumnData::Char(v), Value::Char(x)) => put!(v, x as u8),
            (ColumnData::String(v), Value::String(x)) => put!(v, x),
            (ColumnData::Binary(v), Value::Binary(x)) => put!(v, x),
            (data, Value::Null) => {
                with_data!(data, v => put!(v, Default::default()))
            }
            (data, other) => {
                return Err(DataFrameError::TypeMismatch(format!(
                    "cannot store {} value in {} storage",
                    type_name_of(&other),
                    data.data_type()
                )))
            }
        }
        Ok(())
    }

    /// Whether the elements at `index` of `self` and `other` are equal.
    /// Floating point elements compare by canonical bits.
    fn element_eq(&self, other: &ColumnData, index: usize) -> bool {
        match (self, other) {
            (ColumnData::Byte(a), ColumnData::Byte(b)) => a[index] == b[index],
            (ColumnData::Short(a), ColumnData::Short(b)) => a[index] == b[index],
            (ColumnData::Int(a), ColumnData::Int(b)) => a[index] == b[index],
            (ColumnData::Long(a), ColumnData::Long(b)) => a[index] == b[index],
            (ColumnData::Float(a), ColumnData::Float(b)) => {
                canonical_f32(a[index]) == canonical_f32(b[index])
            }
            (ColumnData::Double(a), ColumnData::Double(b)) => {
                canonical_f64(a[index]) == canonical_f64(b[index])
            }
            (ColumnData::Boolean(a), ColumnData::Boolean(b)) => {
                a[index] == b[index]
            }
            (ColumnData::Char(a), ColumnData::Char(b)) => a[index] == b[index],
            (ColumnData::String(a), ColumnData::String(b)) => {
                a[index] == b[index]
            }
            (ColumnData::Binary(a), ColumnData::Binary(b)) => {
                a[index] == b[index]
            }
            _ => false,
        }
    }

    fn hash_element<H: Hasher>(&self, index: usize, state: &mut H) {
        match self {
            ColumnData::Byte(v) => v[index].hash(state),
            ColumnData::Short(v) => v[index].hash(state),
            ColumnData::Int(v) => v[index].hash(state),
            ColumnData::Long(v) => v[index].hash(state),
            ColumnData::Float(v) => canonical_f32(v[index]).hash(state),
            ColumnData::Double(v) => canonical_f64(v[index]).hash(state),
            ColumnData::Boolean(v) => v[index].hash(state),
            ColumnData::Char(v) => v[index].hash(state),
            ColumnData::String(v) => v[index].hash(state),
            // hex keeps the hash independent of how the bytes are held
            ColumnData::Binary(v) => hex::encode(&v[index]).hash(state),
        }
    }
}

impl Clone for ColumnData {
    /// Copies the logical content into a buffer sized exactly to it.
    fn clone(&self) -> Self {
        map_data!(self, v => {
            let mut out = Vec::with_capacity(v.len());
            out.extend_from_slice(v);
            out
        })
    }
}

fn type_name_of(value: &Value) -> &'static str {
    value.data_type().map(|t| t.name()).unwrap_or("null")
}

/// Element types a `Column` can be built from directly.
pub trait Element: Into<Value> {
    /// The `DataType` of a `Column` holding this element type.
    const DATA_TYPE: DataType;
}

macro_rules! element {
    ($type:ty, $data_type:ident) => {
        impl Element for $type {
            const DATA_TYPE: DataType = DataType::$data_type;
        }
    };
}

element!(i8, Byte);
element!(i16, Short);
element!(i32, Int);
element!(i64, Long);
element!(f32, Float);
element!(f64, Double);
element!(bool, Boolean);
element!(char, Char);
element!(String, String);
element!(Vec<u8>, Binary);

impl<'a> Element for &'a str {
    const DATA_TYPE: DataType = DataType::String;
}

/// A single named and typed sequence of values, optionally permitting nulls.
#[derive(Debug, Serialize, Deserialize, DeepSizeOf)]
#[serde(try_from = "ColumnRepr", into = "ColumnRepr")]
pub struct Column {
    name: String,
    data: ColumnData,
    /// `Some` if and only if this column is nullable
    nulls: Option<NullMask>,
}

#[derive(Serialize, Deserialize)]
struct ColumnRepr {
    name: String,
    data: ColumnData,
    nulls: Option<Vec<bool>>,
}

impl From<Column> for ColumnRepr {
    fn from(col: Column) -> Self {
        ColumnRepr {
            nulls: col.nulls.as_ref().map(|m| m.iter().collect()),
            name: col.name,
            data: col.data,
        }
    }
}

impl TryFrom<ColumnRepr> for Column {
    type Error = DataFrameError;

    fn try_from(repr: ColumnRepr) -> Result<Self> {
        if let Some(nulls) = &repr.nulls {
            if nulls.len() != repr.data.len() {
                return Err(DataFrameError::SchemaMismatch(format!(
                    "column '{}' has {} values but {} null flags",
                    repr.name,
                    repr.data.len(),
                    nulls.len()
                )));
            }
        }
        Ok(Column {
            name: repr.name,
            data: repr.data,
            nulls: repr.nulls.map(|n| NullMask::from_bools(&n)),
        })
    }
}

impl Column {
    /// Creates an empty, non-nullable `Column`.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column::with_capacity(name, data_type, false, 0)
    }

    /// Creates an empty, nullable `Column`.
    pub fn new_nullable(name: impl Into<String>, data_type: DataType) -> Self {
        Column::with_capacity(name, data_type, true, 0)
    }

    /// Creates an empty `Column` whose backing buffer can hold `capacity`
    /// values before it has to grow.
    pub fn with_capacity(
        name: impl Into<String>,
        data_type: DataType,
        nullable: bool,
        capacity: usize,
    ) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::with_capacity(data_type, capacity),
            nulls: if nullable {
                Some(NullMask::with_capacity(capacity))
            } else {
                None
            },
        }
    }

    /// Creates a `Column` holding the given `values`, with a capacity equal
    /// to their number. Every value must be storable in a column of
    /// `data_type`, and values may only be `Null` if `nullable` is set.
    pub fn from_values(
        name: impl Into<String>,
        data_type: DataType,
        nullable: bool,
        values: Vec<Value>,
    ) -> Result<Self> {
        let mut col =
            Column::with_capacity(name, data_type, nullable, values.len());
        for value in values {
            col.append(value)?;
        }
        Ok(col)
    }

    /// Creates a non-nullable `Column` from a vector of plain values.
    ///
    /// ```
    /// use colframe::dataframe::{Column, DataType};
    ///
    /// let col = Column::from_vec("A", vec![1, 2, 3]).unwrap();
    /// assert_eq!(col.data_type(), DataType::Int);
    /// assert_eq!(col.capacity(), 3);
    /// ```
    pub fn from_vec<T: Element>(
        name: impl Into<String>,
        values: Vec<T>,
    ) -> Result<Self> {
        let values = values.into_iter().map(Into::into).collect();
        Column::from_values(name, T::DATA_TYPE, false, values)
    }

    /// Creates a nullable `Column` where every `None` becomes a null entry.
    pub fn from_options<T: Element>(
        name: impl Into<String>,
        values: Vec<Option<T>>,
    ) -> Result<Self> {
        let values = values.into_iter().map(Value::from).collect();
        Column::from_values(name, T::DATA_TYPE, true, values)
    }

    pub(crate) fn from_parts(
        name: String,
        data: ColumnData,
        nulls: Option<NullMask>,
    ) -> Self {
        Column { name, data, nulls }
    }

    pub(crate) fn data(&self) -> &ColumnData {
        &self.data
    }

    pub(crate) fn null_mask(&self) -> Option<&NullMask> {
        self.nulls.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames this `Column`. A `Column` owned by a `DataFrame` is renamed
    /// through `DataFrame::rename_column` instead.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn is_nullable(&self) -> bool {
        self.nulls.is_some()
    }

    pub fn is_numeric(&self) -> bool {
        self.data_type().is_numeric()
    }

    /// The logical length of this `Column`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of values the backing buffer can hold without growing.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The number of null entries. Always zero for non-nullable columns.
    pub fn null_count(&self) -> usize {
        self.nulls.as_ref().map_or(0, |m| m.count_ones())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(DataFrameError::out_of_bounds(index, self.len()))
        }
    }

    fn is_null_at(&self, index: usize) -> bool {
        self.nulls.as_ref().map_or(false, |m| m.get(index))
    }

    fn value_at(&self, index: usize) -> Value {
        if self.is_null_at(index) {
            Value::Null
        } else {
            self.data.value_at(index)
        }
    }

    /// Checks that `value` may be stored in this `Column` and returns it
    /// converted to the element type of this `Column`. Numeric values are
    /// widened if that is lossless; any other type difference is a
    /// `TypeMismatch`, and `Null` is a `NullabilityViolation` unless this
    /// `Column` is nullable.
    pub fn coerce(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return if self.is_nullable() {
                Ok(Value::Null)
            } else {
                Err(DataFrameError::NullabilityViolation {
                    column: self.name.clone(),
                })
            };
        }
        match value.widen_to(self.data_type()) {
            Some(Value::Char(c)) if !c.is_ascii() => {
                Err(DataFrameError::TypeMismatch(format!(
                    "column '{}': char {:?} is not ASCII",
                    self.name, c
                )))
            }
            Some(v) => Ok(v),
            None => Err(DataFrameError::unexpected_type(
                &self.name,
                self.data_type(),
                type_name_of(&value),
            )),
        }
    }

    fn store(&mut self, slot: Slot, value: Value) -> Result<()> {
        let is_null = value.is_null();
        self.data.write(slot, value)?;
        if let Some(mask) = &mut self.nulls {
            match slot {
                Slot::Set(i) => mask.set(i, is_null),
                Slot::Push => mask.push(is_null),
                Slot::Insert(i) => mask.insert(i, is_null),
            }
        }
        Ok(())
    }

    /// Grows the backing buffer by half its size (at least to
    /// `MIN_CAPACITY`) if it is full.
    fn grow_if_full(&mut self) {
        let len = self.len();
        let capacity = self.capacity();
        if len < capacity {
            return;
        }
        let target = std::cmp::max(capacity + capacity / 2, MIN_CAPACITY);
        with_data!(&mut self.data, v => v.reserve_exact(target - len));
        if let Some(mask) = &mut self.nulls {
            mask.reserve_bits(target);
        }
    }

    /// Get the value at the given `index`.
    pub fn get(&self, index: usize) -> Result<Value> {
        self.check_index(index)?;
        Ok(self.value_at(index))
    }

    /// Replaces the value at the given `index`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        self.check_index(index)?;
        let value = self.coerce(value.into())?;
        self.store(Slot::Set(index), value)
    }

    /// Appends a value at the end of this `Column`.
    pub fn append(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = self.coerce(value.into())?;
        self.grow_if_full();
        self.store(Slot::Push, value)
    }

    /// Inserts a value at `index`, shifting all following values up by one.
    /// `index` may be equal to the length of this `Column`.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        if index > self.len() {
            return Err(DataFrameError::out_of_bounds(index, self.len()));
        }
        let value = self.coerce(value.into())?;
        self.grow_if_full();
        self.store(Slot::Insert(index), value)
    }

    /// Removes and returns the value at `index`, shifting all following
    /// values down by one. The capacity is left unchanged.
    pub fn remove(&mut self, index: usize) -> Result<Value> {
        self.check_index(index)?;
        let removed = self.value_at(index);
        self.remove_range(index, index + 1)?;
        Ok(removed)
    }

    /// Removes the values in `[from, to)`.
    pub fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        if to > self.len() {
            return Err(DataFrameError::out_of_bounds(to, self.len()));
        }
        if from > to {
            return Err(DataFrameError::InvalidArgument(format!(
                "invalid range {}..{}",
                from, to
            )));
        }
        with_data!(&mut self.data, v => {
            v.drain(from..to);
        });
        if let Some(mask) = &mut self.nulls {
            mask.remove_range(from, to);
        }
        Ok(())
    }

    /// Keeps only the values whose position is `true` in `keep`, which must
    /// have exactly one entry per value.
    pub fn retain(&mut self, keep: &[bool]) -> Result<()> {
        if keep.len() != self.len() {
            return Err(DataFrameError::SchemaMismatch(format!(
                "column '{}' has {} values but {} keep flags",
                self.name,
                self.len(),
                keep.len()
            )));
        }
        with_data!(&mut self.data, v => {
            let mut flags = keep.iter();
            v.retain(|_| *flags.next().unwrap_or(&true));
        });
        if let Some(mask) = &mut self.nulls {
            mask.retain(keep);
        }
        Ok(())
    }

    /// Removes all values. The capacity is left unchanged.
    pub fn clear(&mut self) {
        with_data!(&mut self.data, v => v.clear());
        if let Some(mask) = &mut self.nulls {
            mask.truncate(0);
        }
    }

    /// Shrinks the capacity of this `Column` to its logical length.
    pub fn shrink_to_fit(&mut self) {
        with_data!(&mut self.data, v => v.shrink_to_fit());
        if let Some(mask) = &mut self.nulls {
            mask.shrink_to_fit();
        }
    }

    /// Creates a new `Column` with the same name and type holding the values
    /// at the given `indices`, in that order. The new `Column` has no
    /// capacity slack.
    pub fn take(&self, indices: &[usize]) -> Result<Column> {
        if let Some(bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(DataFrameError::out_of_bounds(*bad, self.len()));
        }
        let data = map_data!(&self.data, v => {
            indices.iter().map(|&i| v[i].clone()).collect()
        });
        let nulls = self.nulls.as_ref().map(|m| {
            let bits: Vec<bool> = indices.iter().map(|&i| m.get(i)).collect();
            NullMask::from_bools(&bits)
        });
        Ok(Column::from_parts(self.name.clone(), data, nulls))
    }

    /// Whether the value at `index` is null. Only nullable columns can be
    /// asked this.
    pub fn is_null(&self, index: usize) -> Result<bool> {
        if !self.is_nullable() {
            return Err(DataFrameError::NullabilityViolation {
                column: self.name.clone(),
            });
        }
        self.check_index(index)?;
        Ok(self.is_null_at(index))
    }

    /// Sets the value at `index` to null. Only nullable columns permit this.
    pub fn set_null(&mut self, index: usize) -> Result<()> {
        self.set(index, Value::Null)
    }

    /// Whether the value at `index` equals `needle`, without copying the
    /// value. Out of range indices never match.
    pub fn value_equals(&self, index: usize, needle: &Value) -> bool {
        if index >= self.len() {
            return false;
        }
        if self.is_null_at(index) {
            return needle.is_null();
        }
        match (&self.data, needle) {
            (ColumnData::String(v), Value::String(s)) => v[index] == *s,
            (ColumnData::Binary(v), Value::Binary(b)) => v[index] == *b,
            (data, needle) => data.value_at(index) == *needle,
        }
    }

    /// A snapshot of the logical content of this `Column`.
    pub fn to_values(&self) -> Vec<Value> {
        self.iter().collect()
    }

    /// Iterates over the logical content of this `Column`.
    pub fn iter(&self) -> ColumnIter<'_> {
        ColumnIter {
            column: self,
            next: 0,
        }
    }

    /// The set of distinct values in this `Column`. If any entry is null,
    /// `Value::Null` is part of the set exactly once.
    pub fn unique_values(&self) -> HashSet<Value> {
        self.iter().collect()
    }

    /// Creates a nullable copy of this `Column`.
    pub fn to_nullable(&self) -> Column {
        let mut col = self.clone();
        if col.nulls.is_none() {
            col.nulls = Some(NullMask::from_bools(&vec![false; col.len()]));
        }
        col
    }

    /// Creates a non-nullable copy of this `Column`. Fails with a
    /// `NullabilityViolation` if any entry is null.
    pub fn to_default(&self) -> Result<Column> {
        if self.null_count() > 0 {
            return Err(DataFrameError::NullabilityViolation {
                column: self.name.clone(),
            });
        }
        let mut col = self.clone();
        col.nulls = None;
        Ok(col)
    }

    /// Creates a copy of this `Column` with every value converted to the
    /// `target` type. Nullability is preserved and nulls stay null.
    ///
    /// | from \ to | numeric      | boolean   | char   | string  | binary     |
    /// |-----------|--------------|-----------|--------|---------|------------|
    /// | numeric   | checked cast | non-zero  | -      | display | big-endian |
    /// | boolean   | 1 / 0        | identity  | -      | display | one byte   |
    /// | char      | -            | -         | same   | display | -          |
    /// | string    | parse        | parse     | 1 char | same    | -          |
    /// | binary    | -            | -         | -      | -       | same       |
    pub fn convert_to(&self, target: DataType) -> Result<Column> {
        let mut out = Column::with_capacity(
            self.name.clone(),
            target,
            self.is_nullable(),
            self.len(),
        );
        for (row, value) in self.iter().enumerate() {
            let converted = convert_value(&value, target).map_err(|e| {
                DataFrameError::TypeMismatch(format!(
                    "row {}, column '{}': {}",
                    row, self.name, e
                ))
            })?;
            out.store(Slot::Push, converted)?;
        }
        Ok(out)
    }

    /// The estimated number of bytes held by this `Column`: the element
    /// width times the capacity of the backing buffer, the null mask, and a
    /// fixed per-column overhead. Heap data referenced by `String` and
    /// `Binary` elements is not included.
    pub fn memory_usage(&self) -> usize {
        let mask = self.nulls.as_ref().map_or(0, |m| m.capacity() / 8);
        COLUMN_OVERHEAD
            + self.name.len()
            + self.data_type().width() * self.capacity()
            + mask
    }

    fn require_numeric(&self, op: &str) -> Result<()> {
        if self.is_numeric() {
            Ok(())
        } else {
            Err(DataFrameError::TypeMismatch(format!(
                "cannot compute {} of {} column '{}'",
                op,
                self.data_type(),
                self.name
            )))
        }
    }

    /// Applies `f` to every non-null floating point value. Integral columns
    /// are left unchanged.
    fn map_floats(&mut self, f: impl Fn(f64) -> f64) {
        let nulls = self.nulls.as_ref();
        let is_null = |i: usize| nulls.map_or(false, |m| m.get(i));
        match &mut self.data {
            ColumnData::Float(v) => {
                for (i, x) in v.iter_mut().enumerate() {
                    if !is_null(i) {
                        *x = f(f64::from(*x)) as f32;
                    }
                }
            }
            ColumnData::Double(v) => {
                for (i, x) in v.iter_mut().enumerate() {
                    if !is_null(i) {
                        *x = f(*x);
                    }
                }
            }
            _ => {}
        }
    }

    /// Replaces every numeric value with its absolute value. Nulls stay
    /// null.
    pub fn absolute(&mut self) -> Result<()> {
        self.require_numeric("absolute")?;
        let name = &self.name;
        let nulls = self.nulls.as_ref();
        let is_null = |i: usize| nulls.map_or(false, |m| m.get(i));
        macro_rules! abs_integral {
            ($v:ident) => {{
                let overflow = $v
                    .iter()
                    .enumerate()
                    .find(|(i, x)| x.checked_abs().is_none() && !is_null(*i));
                if let Some((row, _)) = overflow {
                    return Err(DataFrameError::Overflow {
                        column: name.clone(),
                        row,
                    });
                }
                for x in $v.iter_mut() {
                    *x = x.wrapping_abs();
                }
            }};
        }
        match &mut self.data {
            ColumnData::Byte(v) => abs_integral!(v),
            ColumnData::Short(v) => abs_integral!(v),
            ColumnData::Int(v) => abs_integral!(v),
            ColumnData::Long(v) => abs_integral!(v),
            _ => {}
        }
        self.map_floats(f64::abs);
        Ok(())
    }

    /// Rounds every floating point value up to the next integer. Integral
    /// columns are left unchanged and nulls stay null.
    pub fn ceil(&mut self) -> Result<()> {
        self.require_numeric("ceil")?;
        self.map_floats(f64::ceil);
        Ok(())
    }

    /// Rounds every floating point value down to the next integer. Integral
    /// columns are left unchanged and nulls stay null.
    pub fn floor(&mut self) -> Result<()> {
        self.require_numeric("floor")?;
        self.map_floats(f64::floor);
        Ok(())
    }

    /// Rounds every floating point value to `places` decimal places.
    pub fn round(&mut self, places: u32) -> Result<()> {
        self.require_numeric("round")?;
        // 10^308 is the largest finite power of ten
        let factor = 10f64.powi(places.min(f64::MAX_10_EXP as u32) as i32);
        self.map_floats(|x| {
            let scaled = x * factor;
            // from 2^52 on every f64 is already an integer
            if !scaled.is_finite() || scaled.abs() >= 4_503_599_627_370_496.0 {
                x
            } else {
                scaled.round() / factor
            }
        });
        Ok(())
    }

    /// Limits every numeric value to the range `[low, high]`. Either bound
    /// may be omitted. For integral columns the bounds must be
    /// representable by the element type.
    pub fn clip(&mut self, low: Option<f64>, high: Option<f64>) -> Result<()> {
        self.require_numeric("clip")?;
        if let (Some(l), Some(h)) = (low, high) {
            if l > h {
                return Err(DataFrameError::InvalidArgument(format!(
                    "clip bounds {} > {}",
                    l, h
                )));
            }
        }
        let data_type = self.data_type();
        if data_type.is_floating_point() {
            let lo = low.unwrap_or(f64::NEG_INFINITY);
            let hi = high.unwrap_or(f64::INFINITY);
            self.map_floats(|x| if x.is_nan() { x } else { x.max(lo).min(hi) });
            return Ok(());
        }
        let bound = |b: Option<f64>, round: fn(f64) -> f64| -> Result<Option<i64>> {
            match b {
                None => Ok(None),
                Some(b) => match integral_value(round(b) as i64, data_type) {
                    Some(_) if b.is_finite() => Ok(Some(round(b) as i64)),
                    _ => Err(DataFrameError::InvalidArgument(format!(
                        "clip bound {} does not fit in {}",
                        b, data_type
                    ))),
                },
            }
        };
        let lo = bound(low, f64::ceil)?.unwrap_or(i64::MIN);
        let hi = bound(high, f64::floor)?.unwrap_or(i64::MAX);
        macro_rules! clip_integral {
            ($v:ident, $t:ty) => {
                for x in $v.iter_mut() {
                    *x = (i64::from(*x)).max(lo).min(hi) as $t;
                }
            };
        }
        match &mut self.data {
            ColumnData::Byte(v) => clip_integral!(v, i8),
            ColumnData::Short(v) => clip_integral!(v, i16),
            ColumnData::Int(v) => clip_integral!(v, i32),
            ColumnData::Long(v) => clip_integral!(v, i64),
            _ => {}
        }
        Ok(())
    }

    /// Iterates over the non-null values of a numeric column as `f64`.
    fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().filter_map(|v| v.as_f64())
    }

    /// The sum of all non-null values of a numeric column.
    pub fn sum(&self) -> Result<f64> {
        self.require_numeric("sum")?;
        Ok(self.numbers().sum())
    }

    /// The mean of all non-null values, or `None` if there are none.
    pub fn average(&self) -> Result<Option<f64>> {
        self.require_numeric("average")?;
        let (sum, n) = self
            .numbers()
            .fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
        Ok(if n == 0 { None } else { Some(sum / n as f64) })
    }

    /// The median of all non-null values, or `None` if there are none. For
    /// an even count it is the mean of the two middle values.
    pub fn median(&self) -> Result<Option<f64>> {
        self.require_numeric("median")?;
        let mut xs: Vec<f64> = self.numbers().collect();
        if xs.is_empty() {
            return Ok(None);
        }
        xs.sort_by(f64::total_cmp);
        let mid = xs.len() / 2;
        Ok(Some(if xs.len() % 2 == 0 {
            (xs[mid - 1] + xs[mid]) / 2.0
        } else {
            xs[mid]
        }))
    }

    /// The smallest non-null value, or `None` if there is none.
    pub fn minimum(&self) -> Result<Option<Value>> {
        self.require_numeric("minimum")?;
        Ok(self.iter().filter(|v| !v.is_null()).min_by(|a, b| a.compare(b)))
    }

    /// The largest non-null value, or `None` if there is none.
    pub fn maximum(&self) -> Result<Option<Value>> {
        self.require_numeric("maximum")?;
        Ok(self.iter().filter(|v| !v.is_null()).max_by(|a, b| a.compare(b)))
    }
}

fn integral_value(x: i64, target: DataType) -> Option<Value> {
    match target {
        DataType::Byte => i8::try_from(x).ok().map(Value::Byte),
        DataType::Short => i16::try_from(x).ok().map(Value::Short),
        DataType::Int => i32::try_from(x).ok().map(Value::Int),
        DataType::Long => Some(Value::Long(x)),
        DataType::Float => Some(Value::Float(x as f32)),
        DataType::Double => Some(Value::Double(x as f64)),
        _ => None,
    }
}

fn floating_value(x: f64, target: DataType) -> Option<Value> {
    match target {
        DataType::Float => {
            if x.is_finite() && x.abs() > f64::from(f32::MAX) {
                None
            } else {
                Some(Value::Float(x as f32))
            }
        }
        DataType::Double => Some(Value::Double(x)),
        _ => {
            let t = x.trunc();
            // i64::MAX as f64 rounds up to 2^63, which is out of range
            if !t.is_finite() || t < i64::MIN as f64 || t >= i64::MAX as f64 {
                None
            } else {
                integral_value(t as i64, target)
            }
        }
    }
}

/// Converts a single value to the `target` type. See
/// `Column::convert_to` for the conversion table.
pub(crate) fn convert_value(value: &Value, target: DataType) -> Result<Value> {
    let source = match value.data_type() {
        None => return Ok(Value::Null),
        Some(t) => t,
    };
    let fail = || {
        DataFrameError::TypeMismatch(format!(
            "cannot convert {} '{}' to {}",
            source, value, target
        ))
    };
    if let Some(widened) = value.widen_to(target) {
        return Ok(widened);
    }
    let converted = match (value, target) {
        (_, DataType::String) if source != DataType::Binary => {
            Some(Value::String(value.to_string()))
        }
        (Value::Boolean(b), t) if t.is_numeric() => {
            integral_value(i64::from(*b), t)
        }
        (Value::Boolean(b), DataType::Binary) => {
            Some(Value::Binary(vec![u8::from(*b)]))
        }
        (v, DataType::Boolean) if source.is_numeric() => {
            v.as_f64().map(|x| Value::Boolean(x != 0.0))
        }
        (v, DataType::Binary) if source.is_numeric() => Some(Value::Binary(
            match v {
                Value::Byte(x) => x.to_be_bytes().to_vec(),
                Value::Short(x) => x.to_be_bytes().to_vec(),
                Value::Int(x) => x.to_be_bytes().to_vec(),
                Value::Long(x) => x.to_be_bytes().to_vec(),
                Value::Float(x) => x.to_be_bytes().to_vec(),
                Value::Double(x) => x.to_be_bytes().to_vec(),
                _ => return Err(fail()),
            },
        )),
        (v, t) if source.is_integral() && t.is_numeric() => {
            v.as_i64().and_then(|x| integral_value(x, t))
        }
        (v, t) if source.is_floating_point() && t.is_numeric() => {
            v.as_f64().and_then(|x| floating_value(x, t))
        }
        (Value::String(s), t) if t != DataType::Binary => parse_text(s, t),
        _ => None,
    };
    converted.ok_or_else(fail)
}

/// Parses text into a value of type `target`. Numbers are parsed as
/// integers where possible and range checked; floating point text only
/// converts to integral types if it has no fractional part.
pub(crate) fn parse_text(text: &str, target: DataType) -> Option<Value> {
    let s = text.trim();
    match target {
        DataType::String => Some(Value::String(text.to_string())),
        DataType::Boolean => match s.to_ascii_lowercase().as_str() {
            "true" => Some(Value::Boolean(true)),
            "false" => Some(Value::Boolean(false)),
            _ => None,
        },
        DataType::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Some(Value::Char(c)),
                _ => None,
            }
        }
        DataType::Binary => hex::decode(s).ok().map(Value::Binary),
        DataType::Float => s.parse::<f32>().ok().map(Value::Float),
        DataType::Double => s.parse::<f64>().ok().map(Value::Double),
        t => match s.parse::<i64>() {
            Ok(x) => integral_value(x, t),
            Err(_) => s
                .parse::<f64>()
                .ok()
                .filter(|x| x.fract() == 0.0)
                .and_then(|x| floating_value(x, t)),
        },
    }
}

impl Clone for Column {
    /// Deep-copies the logical content into storage sized exactly to the
    /// logical length.
    fn clone(&self) -> Self {
        Column {
            name: self.name.clone(),
            data: self.data.clone(),
            nulls: self.nulls.clone(),
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type() == other.data_type()
            && self.is_nullable() == other.is_nullable()
            && self.len() == other.len()
            && (0..self.len()).all(|i| {
                let null = self.is_null_at(i);
                null == other.is_null_at(i)
                    && (null || self.data.element_eq(&other.data, i))
            })
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.data_type().type_code(self.is_nullable()).hash(state);
        self.len().hash(state);
        for i in 0..self.len() {
            if self.is_null_at(i) {
                0u8.hash(state);
            } else {
                1u8.hash(state);
                self.data.hash_element(i, state);
            }
        }
    }
}

/// An iterator over the logical content of a `Column`.
pub struct ColumnIter<'a> {
    column: &'a Column,
    next: usize,
}

impl<'a> Iterator for ColumnIter<'a> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.next < self.column.len() {
            let value = self.column.value_at(self.next);
            self.next += 1;
            Some(value)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.column.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for ColumnIter<'a> {}

impl<'a> IntoIterator for &'a Column {
    type Item = Value;
    type IntoIter = ColumnIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_literal_construction_has_no_slack() {
        let col = Column::from_vec("A", vec![1i64, 2, 3]).unwrap();
        assert_eq!(col.len(), 3);
        assert_eq!(col.capacity(), 3);
        assert_eq!(col.data_type(), DataType::Long);
        assert!(!col.is_nullable());
    }

    #[test]
    fn test_append_grows_geometrically() {
        let mut col = Column::new("A", DataType::Int);
        assert_eq!(col.capacity(), 0);
        col.append(1).unwrap();
        assert!(col.capacity() >= MIN_CAPACITY);
        let mut reallocations = 0;
        let mut last = col.capacity();
        for i in 0..1000 {
            col.append(i).unwrap();
            if col.capacity() != last {
                reallocations += 1;
                last = col.capacity();
            }
        }
        assert_eq!(col.len(), 1001);
        assert!(reallocations < 20);
    }

    #[test]
    fn test_get_is_bounded_by_length_not_capacity() {
        let mut col = Column::with_capacity("A", DataType::Int, false, 10);
        col.append(7).unwrap();
        assert_eq!(col.get(0).unwrap(), Value::Int(7));
        assert!(matches!(
            col.get(1),
            Err(DataFrameError::IndexOutOfBounds { index: 1, len: 1 })
        ));
        assert!(col.set(5, 1).is_err());
    }

    #[test]
    fn test_widening_and_narrowing() {
        let mut col = Column::new("A", DataType::Long);
        col.append(Value::Byte(1)).unwrap();
        col.append(Value::Int(2)).unwrap();
        assert_eq!(col.get(0).unwrap(), Value::Long(1));

        let mut ints = Column::new("B", DataType::Int);
        assert!(matches!(
            ints.append(Value::Long(1)),
            Err(DataFrameError::TypeMismatch(_))
        ));
        assert!(ints.append("one").is_err());
        assert!(ints.is_empty());
    }

    #[test]
    fn test_nullability() {
        let mut col = Column::new("A", DataType::String);
        col.append("x").unwrap();
        assert!(matches!(
            col.append(Value::Null),
            Err(DataFrameError::NullabilityViolation { .. })
        ));
        assert!(col.set_null(0).is_err());
        assert!(col.is_null(0).is_err());

        let mut col = Column::from_options("B", vec![Some(1.5), None]).unwrap();
        assert!(col.is_null(1).unwrap());
        assert!(!col.is_null(0).unwrap());
        col.set_null(0).unwrap();
        assert_eq!(col.null_count(), 2);
        col.set(1, 2.5).unwrap();
        assert_eq!(col.to_values(), vec![Value::Null, Value::Double(2.5)]);
    }

    #[test]
    fn test_chars_must_be_ascii() {
        let mut col = Column::new("c", DataType::Char);
        col.append('a').unwrap();
        assert!(col.append('é').is_err());
        assert_eq!(col.get(0).unwrap(), Value::Char('a'));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut col = Column::from_options("A", vec![Some(1), None, Some(3)]).unwrap();
        col.insert(1, 9).unwrap();
        assert_eq!(
            col.to_values(),
            vec![Value::Int(1), Value::Int(9), Value::Null, Value::Int(3)]
        );
        assert_eq!(col.remove(2).unwrap(), Value::Null);
        assert_eq!(col.to_values(), vec![Value::Int(1), Value::Int(9), Value::Int(3)]);
        assert!(col.remove(3).is_err());
        assert!(col.insert(4, 1).is_err());
    }

    #[test]
    fn test_capacity_is_invisible() {
        let literal = Column::from_vec("A", vec!["a", "b"]).unwrap();
        let mut grown = Column::with_capacity("A", DataType::String, false, 64);
        grown.append("a").unwrap();
        grown.append("b").unwrap();
        grown.append("c").unwrap();
        grown.remove(2).unwrap();
        assert_ne!(literal.capacity(), grown.capacity());
        assert_eq!(literal, grown);
        assert_eq!(hash_of(&literal), hash_of(&grown));
        assert_eq!(literal.unique_values(), grown.unique_values());
        assert_eq!(grown.clone().capacity(), 2);
    }

    #[test]
    fn test_binary_equality_and_hash() {
        let a = Column::from_vec("b", vec![vec![0u8, 1], vec![255]]).unwrap();
        let mut b = Column::new("b", DataType::Binary);
        b.append(vec![0u8, 1]).unwrap();
        b.append(&[255u8][..]).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_unique_values_counts_null_once() {
        let col =
            Column::from_options("A", vec![Some("x"), None, Some("x"), None]).unwrap();
        let unique = col.unique_values();
        assert_eq!(unique.len(), 2);
        assert!(unique.contains(&Value::Null));
        assert!(Column::new("B", DataType::Int).unique_values().is_empty());
    }

    #[test]
    fn test_take_and_retain() {
        let col = Column::from_options("A", vec![Some(1), None, Some(3)]).unwrap();
        let taken = col.take(&[2, 1]).unwrap();
        assert_eq!(taken.to_values(), vec![Value::Int(3), Value::Null]);
        assert_eq!(taken.capacity(), 2);
        assert!(col.take(&[3]).is_err());

        let mut col = col;
        col.retain(&[false, true, true]).unwrap();
        assert_eq!(col.to_values(), vec![Value::Null, Value::Int(3)]);
        assert!(col.retain(&[true]).is_err());
    }

    #[test]
    fn test_convert_to() {
        let col = Column::from_vec("A", vec![1i64, 300]).unwrap();
        let s = col.convert_to(DataType::String).unwrap();
        assert_eq!(s.to_values(), vec![Value::from("1"), Value::from("300")]);
        assert!(col.convert_to(DataType::Byte).is_err());
        let shorts = col.convert_to(DataType::Short).unwrap();
        assert_eq!(shorts.get(1).unwrap(), Value::Short(300));
        let bin = col.convert_to(DataType::Binary).unwrap();
        assert_eq!(bin.get(0).unwrap(), Value::Binary(vec![0, 0, 0, 0, 0, 0, 0, 1]));

        let text = Column::from_options("T", vec![Some("12"), None]).unwrap();
        let ints = text.convert_to(DataType::Int).unwrap();
        assert!(ints.is_nullable());
        assert_eq!(ints.to_values(), vec![Value::Int(12), Value::Null]);
        assert!(text.convert_to(DataType::Binary).is_err());

        let doubles = Column::from_vec("D", vec![2.9, -0.5]).unwrap();
        let ints = doubles.convert_to(DataType::Int).unwrap();
        assert_eq!(ints.to_values(), vec![Value::Int(2), Value::Int(0)]);
        let bools = doubles.convert_to(DataType::Boolean).unwrap();
        assert_eq!(bools.to_values(), vec![Value::Boolean(true), Value::Boolean(true)]);
    }

    #[test]
    fn test_to_default_and_to_nullable() {
        let col = Column::from_vec("A", vec![1, 2]).unwrap();
        let nullable = col.to_nullable();
        assert!(nullable.is_nullable());
        assert_eq!(nullable.to_default().unwrap(), col);
        let mut with_null = nullable.clone();
        with_null.set_null(0).unwrap();
        assert!(with_null.to_default().is_err());
    }

    #[test]
    fn test_numeric_transforms_preserve_nulls() {
        let mut col =
            Column::from_options("A", vec![Some(-1.5f64), None, Some(2.25)]).unwrap();
        col.absolute().unwrap();
        assert_eq!(
            col.to_values(),
            vec![Value::Double(1.5), Value::Null, Value::Double(2.25)]
        );
        col.ceil().unwrap();
        assert_eq!(col.to_values(), vec![Value::Double(2.0), Value::Null, Value::Double(3.0)]);

        let mut col = Column::from_vec("B", vec![-1.5f32, 2.7]).unwrap();
        col.floor().unwrap();
        assert_eq!(col.to_values(), vec![Value::Float(-2.0), Value::Float(2.0)]);

        let mut col = Column::from_vec("C", vec![i8::MIN, 1]).unwrap();
        assert!(matches!(col.absolute(), Err(DataFrameError::Overflow { row: 0, .. })));
        assert_eq!(col.get(0).unwrap(), Value::Byte(i8::MIN));

        let mut col = Column::from_vec("S", vec!["a"]).unwrap();
        assert!(col.ceil().is_err());
    }

    #[test]
    fn test_round_and_clip() {
        let mut col = Column::from_vec("A", vec![1.2345, -9.87]).unwrap();
        col.round(2).unwrap();
        assert_eq!(col.to_values(), vec![Value::Double(1.23), Value::Double(-9.87)]);
        col.clip(Some(0.0), None).unwrap();
        assert_eq!(col.to_values(), vec![Value::Double(1.23), Value::Double(0.0)]);

        let mut ints = Column::from_vec("B", vec![1i8, 50, 100]).unwrap();
        ints.clip(Some(10.0), Some(60.5)).unwrap();
        assert_eq!(
            ints.to_values(),
            vec![Value::Byte(10), Value::Byte(50), Value::Byte(60)]
        );
        assert!(ints.clip(Some(1000.0), None).is_err());
        assert!(ints.clip(Some(5.0), Some(1.0)).is_err());
    }

    #[test]
    fn test_round_with_extreme_places() {
        let values = vec![Value::Double(1.5), Value::Double(1e300), Value::Double(-0.125)];
        for places in [400, u32::MAX] {
            let mut col = Column::from_values("A", DataType::Double, false, values.clone())
                .unwrap();
            col.round(places).unwrap();
            assert_eq!(col.to_values(), values);
        }
        let mut col = Column::from_vec("A", vec![1e300, f64::INFINITY, 2.675e-3]).unwrap();
        col.round(2).unwrap();
        assert_eq!(
            col.to_values(),
            vec![Value::Double(1e300), Value::Double(f64::INFINITY), Value::Double(0.0)]
        );
    }

    #[test]
    fn test_aggregates() {
        let col = Column::from_options("A", vec![Some(4), None, Some(-2), Some(7)]).unwrap();
        assert_eq!(col.sum().unwrap(), 9.0);
        assert_eq!(col.average().unwrap(), Some(3.0));
        assert_eq!(col.minimum().unwrap(), Some(Value::Int(-2)));
        assert_eq!(col.maximum().unwrap(), Some(Value::Int(7)));
        let empty = Column::new("B", DataType::Double);
        assert_eq!(empty.average().unwrap(), None);
        assert_eq!(empty.maximum().unwrap(), None);
        assert!(Column::new("C", DataType::Boolean).sum().is_err());
    }

    #[test]
    fn test_median() {
        let col = Column::from_options("A", vec![Some(4), None, Some(-2), Some(7)]).unwrap();
        assert_eq!(col.median().unwrap(), Some(4.0));
        let col = Column::from_vec("B", vec![3.0, 1.0, 4.0, 1.5]).unwrap();
        assert_eq!(col.median().unwrap(), Some(2.25));
        let nulls = Column::from_options("C", vec![None::<i64>, None]).unwrap();
        assert_eq!(nulls.median().unwrap(), None);
        assert!(Column::from_vec("D", vec!["x"]).unwrap().median().is_err());
    }

    #[test]
    fn test_deep_size_counts_heap_bytes() {
        let short = Column::from_vec("A", vec!["a", "b"]).unwrap();
        let long = Column::from_vec("A", vec!["a".repeat(500), "b".repeat(500)]).unwrap();
        // memory_usage ignores the text behind each handle, deep_size_of does not
        assert_eq!(short.memory_usage(), long.memory_usage());
        assert!(long.deep_size_of() >= short.deep_size_of() + 998);

        let blobs = Column::from_vec("B", vec![vec![0u8; 256]]).unwrap();
        assert!(blobs.deep_size_of() >= 256 + std::mem::size_of::<Vec<u8>>());

        let nullable = Column::from_options("C", vec![Some(1i64), None]).unwrap();
        assert!(nullable.deep_size_of() > Column::from_vec("C", vec![1i64, 2]).unwrap().deep_size_of());
    }

    #[test]
    fn test_memory_usage_counts_capacity() {
        let small = Column::with_capacity("A", DataType::Long, false, 1);
        let large = Column::with_capacity("A", DataType::Long, false, 101);
        assert_eq!(large.memory_usage() - small.memory_usage(), 800);
    }
}
