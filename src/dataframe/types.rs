//! The closed set of element types a `Column` may hold, the table-wide
//! nullability `Mode`, and `Value`, the boxed representation of a single
//! cell.

use crate::error::DataFrameError;
use deepsize::DeepSizeOf;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// The element type of a `Column`.
#[derive(
    Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug, DeepSizeOf,
)]
pub enum DataType {
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit floating point number
    Float,
    /// 64-bit floating point number
    Double,
    Boolean,
    /// A single ASCII character
    Char,
    /// UTF-8 text
    String,
    /// An opaque sequence of bytes
    Binary,
}

/// Every `DataType`, in type code order.
pub const ALL_TYPES: [DataType; 10] = [
    DataType::Byte,
    DataType::Short,
    DataType::Int,
    DataType::Long,
    DataType::String,
    DataType::Float,
    DataType::Double,
    DataType::Char,
    DataType::Boolean,
    DataType::Binary,
];

impl DataType {
    /// The canonical lowercase name of this type, as used in CSV headers.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Byte => "byte",
            DataType::Short => "short",
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Boolean => "boolean",
            DataType::Char => "char",
            DataType::String => "string",
            DataType::Binary => "binary",
        }
    }

    /// The one byte tag identifying a column of this type in the binary
    /// file format. Nullable columns use a distinct range of tags.
    ///
    /// | type    | default | nullable |
    /// |---------|---------|----------|
    /// | byte    | 1       | 10       |
    /// | short   | 2       | 11       |
    /// | int     | 3       | 12       |
    /// | long    | 4       | 13       |
    /// | string  | 5       | 14       |
    /// | float   | 6       | 15       |
    /// | double  | 7       | 16       |
    /// | char    | 8       | 17       |
    /// | boolean | 9       | 18       |
    /// | binary  | 19      | 20       |
    pub fn type_code(self, nullable: bool) -> u8 {
        let (default, nullable_code) = match self {
            DataType::Byte => (1, 10),
            DataType::Short => (2, 11),
            DataType::Int => (3, 12),
            DataType::Long => (4, 13),
            DataType::String => (5, 14),
            DataType::Float => (6, 15),
            DataType::Double => (7, 16),
            DataType::Char => (8, 17),
            DataType::Boolean => (9, 18),
            DataType::Binary => (19, 20),
        };
        if nullable {
            nullable_code
        } else {
            default
        }
    }

    /// Resolves a type code into its `DataType` and whether it denotes a
    /// nullable column.
    pub fn from_type_code(code: u8) -> Option<(DataType, bool)> {
        ALL_TYPES.iter().find_map(|t| {
            if t.type_code(false) == code {
                Some((*t, false))
            } else if t.type_code(true) == code {
                Some((*t, true))
            } else {
                None
            }
        })
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating_point()
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            DataType::Byte | DataType::Short | DataType::Int | DataType::Long
        )
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// The value a non-nullable cell of this type holds when nothing else
    /// is known: zero, `false`, the NUL character, or empty text or bytes.
    pub fn default_value(self) -> Value {
        match self {
            DataType::Byte => Value::Byte(0),
            DataType::Short => Value::Short(0),
            DataType::Int => Value::Int(0),
            DataType::Long => Value::Long(0),
            DataType::Float => Value::Float(0.0),
            DataType::Double => Value::Double(0.0),
            DataType::Boolean => Value::Boolean(false),
            DataType::Char => Value::Char('\0'),
            DataType::String => Value::String(String::new()),
            DataType::Binary => Value::Binary(Vec::new()),
        }
    }

    /// The in-memory width in bytes of one element of this type. For
    /// `String` and `Binary` this is the width of the owning handle, not of
    /// the referenced heap data.
    pub fn width(self) -> usize {
        match self {
            DataType::Byte | DataType::Char => 1,
            DataType::Boolean => std::mem::size_of::<bool>(),
            DataType::Short => 2,
            DataType::Int | DataType::Float => 4,
            DataType::Long | DataType::Double => 8,
            DataType::String => std::mem::size_of::<String>(),
            DataType::Binary => std::mem::size_of::<Vec<u8>>(),
        }
    }

    /// Whether a value of type `self` may be stored in a column of type
    /// `target` without loss.
    pub fn widens_to(self, target: DataType) -> bool {
        use DataType::*;
        self == target
            || matches!(
                (self, target),
                (Byte, Short)
                    | (Byte, Int)
                    | (Byte, Long)
                    | (Byte, Float)
                    | (Byte, Double)
                    | (Short, Int)
                    | (Short, Long)
                    | (Short, Float)
                    | (Short, Double)
                    | (Int, Long)
                    | (Int, Double)
                    | (Float, Double)
            )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = DataFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "byte" => Ok(DataType::Byte),
            "short" => Ok(DataType::Short),
            "int" | "integer" => Ok(DataType::Int),
            "long" => Ok(DataType::Long),
            "float" => Ok(DataType::Float),
            "double" => Ok(DataType::Double),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "char" | "character" => Ok(DataType::Char),
            "string" | "str" => Ok(DataType::String),
            "binary" => Ok(DataType::Binary),
            other => Err(DataFrameError::InvalidArgument(format!(
                "unknown type name '{}'",
                other
            ))),
        }
    }
}

/// Whether a `DataFrame` and all of its `Column`s permit null values.
#[derive(
    Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug, DeepSizeOf,
)]
pub enum Mode {
    /// No cell may be null
    Default,
    /// Any cell may be null
    Nullable,
}

impl Mode {
    pub fn is_nullable(self) -> bool {
        self == Mode::Nullable
    }

    pub(crate) fn from_nullable(nullable: bool) -> Self {
        if nullable {
            Mode::Nullable
        } else {
            Mode::Default
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Default
    }
}

/// A single boxed cell value.
///
/// Equality and hashing treat floating point values by their canonical bit
/// pattern: every `NaN` is equal to every other `NaN`, and `-0.0` is equal
/// to `0.0`. This makes `Value` usable as a set or map key.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Char(char),
    String(String),
    Binary(Vec<u8>),
    Null,
}

pub(crate) fn canonical_f32(f: f32) -> u32 {
    if f.is_nan() {
        f32::NAN.to_bits()
    } else if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

pub(crate) fn canonical_f64(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

impl Value {
    /// The `DataType` of this value, or `None` if it is `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Byte(_) => Some(DataType::Byte),
            Value::Short(_) => Some(DataType::Short),
            Value::Int(_) => Some(DataType::Int),
            Value::Long(_) => Some(DataType::Long),
            Value::Float(_) => Some(DataType::Float),
            Value::Double(_) => Some(DataType::Double),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Char(_) => Some(DataType::Char),
            Value::String(_) => Some(DataType::String),
            Value::Binary(_) => Some(DataType::Binary),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Widens this value to the given `target` type. Returns `None` if the
    /// conversion would be narrowing or is not defined. `Null` widens to
    /// every type.
    pub fn widen_to(&self, target: DataType) -> Option<Value> {
        let source = match self.data_type() {
            Some(t) => t,
            None => return Some(Value::Null),
        };
        if source == target {
            return Some(self.clone());
        }
        if !source.widens_to(target) {
            return None;
        }
        let widened = match target {
            DataType::Short => Value::Short(self.as_i64()? as i16),
            DataType::Int => Value::Int(self.as_i64()? as i32),
            DataType::Long => Value::Long(self.as_i64()?),
            DataType::Float => Value::Float(self.as_f64()? as f32),
            DataType::Double => match self {
                // go through the decimal representation so 4.4f32 becomes
                // 4.4f64 rather than 4.400000095367432
                Value::Float(f) => Value::Double(f64::from_str(&f.to_string()).ok()?),
                _ => Value::Double(self.as_f64()?),
            },
            _ => return None,
        };
        Some(widened)
    }

    /// The value as an `i64` if it is an integral number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(x) => Some(i64::from(*x)),
            Value::Short(x) => Some(i64::from(*x)),
            Value::Int(x) => Some(i64::from(*x)),
            Value::Long(x) => Some(*x),
            _ => None,
        }
    }

    /// The value as an `f64` if it is any kind of number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(f64::from(*x)),
            Value::Double(x) => Some(*x),
            _ => self.as_i64().map(|x| x as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Orders two values of the same type. Numbers of different types are
    /// compared numerically, `Null` sorts after everything else, and values
    /// of unrelated types compare by their type code.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    _ => {
                        let code = |v: &Value| v.data_type().map(|t| t.type_code(false));
                        code(a).cmp(&code(b))
                    }
                },
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => canonical_f32(*a) == canonical_f32(*b),
            (Value::Double(a), Value::Double(b)) => canonical_f64(*a) == canonical_f64(*b),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.data_type() {
            Some(t) => t.type_code(false).hash(state),
            None => 0u8.hash(state),
        }
        match self {
            Value::Byte(x) => x.hash(state),
            Value::Short(x) => x.hash(state),
            Value::Int(x) => x.hash(state),
            Value::Long(x) => x.hash(state),
            Value::Float(x) => canonical_f32(*x).hash(state),
            Value::Double(x) => canonical_f64(*x).hash(state),
            Value::Boolean(x) => x.hash(state),
            Value::Char(x) => x.hash(state),
            Value::String(x) => x.hash(state),
            Value::Binary(x) => hex::encode(x).hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(x) => write!(f, "{}", x),
            Value::Short(x) => write!(f, "{}", x),
            Value::Int(x) => write!(f, "{}", x),
            Value::Long(x) => write!(f, "{}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Double(x) => write!(f, "{}", x),
            Value::Boolean(x) => write!(f, "{}", x),
            Value::Char(x) => write!(f, "{}", x),
            Value::String(x) => f.write_str(x),
            Value::Binary(x) => f.write_str(&hex::encode(x)),
            Value::Null => f.write_str("null"),
        }
    }
}

impl DeepSizeOf for Value {
    fn deep_size_of_children(&self, context: &mut deepsize::Context) -> usize {
        match self {
            Value::String(s) => s.deep_size_of_children(context),
            Value::Binary(b) => b.deep_size_of_children(context),
            _ => 0,
        }
    }
}

macro_rules! value_from {
    ($type:ty, $variant:ident) => {
        impl From<$type> for Value {
            fn from(x: $type) -> Self {
                Value::$variant(x)
            }
        }
    };
}

value_from!(i8, Byte);
value_from!(i16, Short);
value_from!(i32, Int);
value_from!(i64, Long);
value_from!(f32, Float);
value_from!(f64, Double);
value_from!(bool, Boolean);
value_from!(char, Char);
value_from!(String, String);
value_from!(Vec<u8>, Binary);

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::String(x.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(x: &[u8]) -> Self {
        Value::Binary(x.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(x: Option<T>) -> Self {
        match x {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
