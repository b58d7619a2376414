//! The closed, logical column type set and its bit-flag representation.
//!
//! Every logical type is a single bit so that one declared DB type can
//! satisfy several logical types at once (PostgreSQL `bytea` is both
//! `Binary` and `Blob`). Compatibility is always a bitwise AND, never
//! equality — see [`TypeFlag::intersects`].

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A bitmask over the closed logical type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeFlag(u16);

macro_rules! flags {
    ($($name:ident = $bit:expr),+ $(,)?) => {
        impl TypeFlag {
            $(
                pub const $name: TypeFlag = TypeFlag(1 << $bit);
            )+
        }
    };
}

flags! {
    BOOL = 0,
    BYTE = 1,
    SHORT = 2,
    INT = 3,
    LONG = 4,
    FLOAT = 5,
    DOUBLE = 6,
    CHAR = 7,
    STRING = 8,
    BINARY = 9,
    CLOB = 10,
    BLOB = 11,
    DATE = 12,
    DATE_TIME = 13,
    TIME = 14,
}

impl TypeFlag {
    pub const NONE: TypeFlag = TypeFlag(0);

    /// Names in declaration order.
    pub const ALL: [(&'static str, TypeFlag); 15] = [
        ("Bool", TypeFlag::BOOL),
        ("Byte", TypeFlag::BYTE),
        ("Short", TypeFlag::SHORT),
        ("Int", TypeFlag::INT),
        ("Long", TypeFlag::LONG),
        ("Float", TypeFlag::FLOAT),
        ("Double", TypeFlag::DOUBLE),
        ("Char", TypeFlag::CHAR),
        ("String", TypeFlag::STRING),
        ("Binary", TypeFlag::BINARY),
        ("Clob", TypeFlag::CLOB),
        ("Blob", TypeFlag::BLOB),
        ("Date", TypeFlag::DATE),
        ("DateTime", TypeFlag::DATE_TIME),
        ("Time", TypeFlag::TIME),
    ];

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        TypeFlag(bits)
    }

    /// Bitwise-AND compatibility test. Two declared types are compatible
    /// iff this is non-zero.
    #[must_use]
    pub const fn intersects(self, other: TypeFlag) -> bool {
        (self.0 & other.0) != 0
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(_, f)| *f == self)
            .map_or("Unknown", |(n, _)| n)
    }
}

impl BitOr for TypeFlag {
    type Output = TypeFlag;

    fn bitor(self, rhs: TypeFlag) -> TypeFlag {
        TypeFlag(self.0 | rhs.0)
    }
}

impl BitOrAssign for TypeFlag {
    fn bitor_assign(&mut self, rhs: TypeFlag) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for TypeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::ALL
            .iter()
            .filter(|(_, flag)| self.intersects(*flag))
            .map(|(n, _)| *n)
            .collect();
        if names.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytea_mask_is_compatible_with_either_declared_form() {
        let bytea = TypeFlag::BINARY | TypeFlag::BLOB;
        assert!(bytea.intersects(TypeFlag::BINARY));
        assert!(bytea.intersects(TypeFlag::BLOB));
        assert!(!bytea.intersects(TypeFlag::STRING));
    }

    #[test]
    fn incompatible_types_do_not_intersect() {
        assert!(!TypeFlag::INT.intersects(TypeFlag::STRING));
    }

    #[test]
    fn display_lists_all_set_bits() {
        let combo = TypeFlag::CLOB | TypeFlag::STRING;
        let rendered = combo.to_string();
        assert!(rendered.contains("Clob"));
        assert!(rendered.contains("String"));
    }
}
