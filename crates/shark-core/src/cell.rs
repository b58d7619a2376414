//! The dynamically-typed value used for parameter escaping and row binding.

use serde::{Deserialize, Serialize};

use crate::error::{Error, TypeError};
use crate::types::TypeFlag;

/// A single decoded/encoded column value over the closed logical type set.
///
/// `Cell::Null` represents SQL NULL; it is distinct from e.g. `Cell::String(String::new())`,
/// the empty string, which must never collapse into NULL on any path (escape,
/// bind, or insert-field filtering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Binary(Vec<u8>),
    Clob(String),
    Blob(Vec<u8>),
    /// ISO-8601 `YYYY-MM-DD`.
    Date(String),
    /// ISO-8601 `YYYY-MM-DDTHH:MM:SS`.
    DateTime(String),
    /// `HH:MM:SS`.
    Time(String),
}

impl Cell {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// The logical type of this cell, or `None` for `Cell::Null`.
    #[must_use]
    pub const fn type_flag(&self) -> Option<TypeFlag> {
        Some(match self {
            Cell::Null => return None,
            Cell::Bool(_) => TypeFlag::BOOL,
            Cell::Byte(_) => TypeFlag::BYTE,
            Cell::Short(_) => TypeFlag::SHORT,
            Cell::Int(_) => TypeFlag::INT,
            Cell::Long(_) => TypeFlag::LONG,
            Cell::Float(_) => TypeFlag::FLOAT,
            Cell::Double(_) => TypeFlag::DOUBLE,
            Cell::Char(_) => TypeFlag::CHAR,
            Cell::String(_) => TypeFlag::STRING,
            Cell::Binary(_) => TypeFlag::BINARY,
            Cell::Clob(_) => TypeFlag::CLOB,
            Cell::Blob(_) => TypeFlag::BLOB,
            Cell::Date(_) => TypeFlag::DATE,
            Cell::DateTime(_) => TypeFlag::DATE_TIME,
            Cell::Time(_) => TypeFlag::TIME,
        })
    }

    /// Render this cell the way the generic insert/update builder renders a
    /// present value: numerics via their lexical `to_string`, everything
    /// else as its raw (unescaped) text. Callers apply escaping afterwards.
    #[must_use]
    pub fn to_literal_text(&self) -> String {
        match self {
            Cell::Null => "null".to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Byte(v) => v.to_string(),
            Cell::Short(v) => v.to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Long(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Double(v) => v.to_string(),
            Cell::Char(c) => c.to_string(),
            Cell::String(s) | Cell::Clob(s) | Cell::Date(s) | Cell::DateTime(s) | Cell::Time(s) => {
                s.clone()
            }
            Cell::Binary(b) | Cell::Blob(b) => {
                b.iter().map(|byte| format!("{byte:02x}")).collect()
            }
        }
    }

    /// Whether this cell's literal text needs quote-escaping when inlined
    /// into SQL (string-family types do; numerics and binary do not).
    #[must_use]
    pub const fn needs_string_escaping(&self) -> bool {
        matches!(self, Cell::Char(_) | Cell::String(_) | Cell::Clob(_))
    }
}

macro_rules! from_impl {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Cell {
            fn from(v: $ty) -> Self {
                Cell::$variant(v)
            }
        }
    };
}

from_impl!(bool, Bool);
from_impl!(i8, Byte);
from_impl!(i16, Short);
from_impl!(i32, Int);
from_impl!(i64, Long);
from_impl!(f32, Float);
from_impl!(f64, Double);
from_impl!(char, Char);
from_impl!(String, String);
from_impl!(Vec<u8>, Binary);

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::String(v.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Cell::Null,
        }
    }
}

macro_rules! try_from_impl {
    ($ty:ty, $variant:ident) => {
        impl TryFrom<Cell> for $ty {
            type Error = Error;

            fn try_from(value: Cell) -> Result<Self, Self::Error> {
                match value {
                    Cell::$variant(v) => Ok(v),
                    other => Err(Error::Type(TypeError {
                        expected: stringify!($ty),
                        actual: other.type_flag().map_or("NULL", TypeFlag::name).to_string(),
                        column: None,
                        rust_type: Some(stringify!($ty)),
                    })),
                }
            }
        }
    };
}

try_from_impl!(bool, Bool);
try_from_impl!(i8, Byte);
try_from_impl!(i16, Short);
try_from_impl!(i32, Int);
try_from_impl!(i64, Long);
try_from_impl!(f32, Float);
try_from_impl!(f64, Double);
try_from_impl!(char, Char);

// `String`/`Clob` and `Binary`/`Blob` are wire-level synonyms (the same
// logical byte shape, different declared-field intent) so these two
// accept either sibling variant rather than using `try_from_impl!`.
impl TryFrom<Cell> for String {
    type Error = Error;

    fn try_from(value: Cell) -> Result<Self, Self::Error> {
        match value {
            Cell::String(v) | Cell::Clob(v) => Ok(v),
            other => Err(Error::Type(TypeError {
                expected: "String",
                actual: other.type_flag().map_or("NULL", TypeFlag::name).to_string(),
                column: None,
                rust_type: Some("String"),
            })),
        }
    }
}

impl TryFrom<Cell> for Vec<u8> {
    type Error = Error;

    fn try_from(value: Cell) -> Result<Self, Self::Error> {
        match value {
            Cell::Binary(v) | Cell::Blob(v) => Ok(v),
            other => Err(Error::Type(TypeError {
                expected: "Vec<u8>",
                actual: other.type_flag().map_or("NULL", TypeFlag::name).to_string(),
                column: None,
                rust_type: Some("Vec<u8>"),
            })),
        }
    }
}

impl<T> TryFrom<Cell> for Option<T>
where
    T: TryFrom<Cell, Error = Error>,
{
    type Error = Error;

    fn try_from(value: Cell) -> Result<Self, Self::Error> {
        match value {
            Cell::Null => Ok(None),
            v => T::try_from(v).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_distinct_from_empty_string() {
        let empty: Cell = String::new().into();
        assert!(!empty.is_null());
        assert_ne!(empty, Cell::Null);
    }

    #[test]
    fn option_none_becomes_null() {
        let cell: Cell = Option::<i32>::None.into();
        assert_eq!(cell, Cell::Null);
    }

    #[test]
    fn option_some_unwraps() {
        let cell: Cell = Some(42i32).into();
        assert_eq!(cell, Cell::Int(42));
    }

    #[test]
    fn round_trip_bool() {
        let cell: Cell = true.into();
        let back: bool = cell.try_into().unwrap();
        assert!(back);
    }

    #[test]
    fn mismatch_is_type_error() {
        let cell = Cell::String("x".into());
        let result: Result<i32, _> = cell.try_into();
        assert!(matches!(result, Err(Error::Type(_))));
    }

    #[test]
    fn binary_literal_text_is_hex() {
        let cell = Cell::Blob(vec![0xDE, 0xAD]);
        assert_eq!(cell.to_literal_text(), "dead");
    }

    #[test]
    fn string_try_from_accepts_clob_sibling() {
        let s: String = Cell::Clob("c".into()).try_into().unwrap();
        assert_eq!(s, "c");
    }

    #[test]
    fn vec_u8_try_from_accepts_blob_sibling() {
        let v: Vec<u8> = Cell::Blob(vec![1, 2]).try_into().unwrap();
        assert_eq!(v, vec![1, 2]);
    }
}
