//! The WHERE clause tree: a binary tree of boolean row
//! filters, rendered by recursive descent in `shark-schema`.

use shark_core::Cell;

/// Comparison operators reachable from the clause tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    IsNull,
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
}

impl Operator {
    /// The SQL operator word rendered by the translator.
    #[must_use]
    pub const fn word(self) -> &'static str {
        match self {
            Operator::IsNull => "is",
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEquals => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEquals => "<=",
        }
    }
}

/// How two `Where` subtrees combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glue {
    And,
    Or,
}

impl Glue {
    #[must_use]
    pub const fn word(self) -> &'static str {
        match self {
            Glue::And => "and",
            Glue::Or => "or",
        }
    }
}

/// A WHERE clause: either a single `field op value` statement or the
/// And/Or composition of two subtrees.
#[derive(Debug, Clone)]
pub enum Where {
    Statement {
        field: String,
        operator: Operator,
        value: String,
        needs_escaping: bool,
    },
    ComplexStatement {
        left: Box<Where>,
        glue: Glue,
        right: Box<Where>,
    },
}

impl Where {
    /// Build a leaf statement from a literal value. String-typed literals
    /// need escaping; everything else does not.
    #[must_use]
    pub fn statement(field: impl Into<String>, operator: Operator, value: &Cell) -> Self {
        Where::Statement {
            field: field.into(),
            operator,
            value: value.to_literal_text(),
            needs_escaping: !value.is_null() && value.needs_string_escaping(),
        }
    }

    #[must_use]
    pub fn and(self, other: Where) -> Self {
        Where::ComplexStatement {
            left: Box::new(self),
            glue: Glue::And,
            right: Box::new(other),
        }
    }

    #[must_use]
    pub fn or(self, other: Where) -> Self {
        Where::ComplexStatement {
            left: Box::new(self),
            glue: Glue::Or,
            right: Box::new(other),
        }
    }

    /// Fold a non-empty list of `(column, value)` equality pairs into an
    /// AND-joined tree — used to synthesize id-based WHERE clauses for
    /// `update`/`del`/`select_id`.
    #[must_use]
    pub fn all_equal(pairs: &[(String, Cell)]) -> Option<Self> {
        let mut iter = pairs.iter();
        let (name, value) = iter.next()?;
        let mut acc = Where::statement(name.clone(), Operator::Equals, value);
        for (name, value) in iter {
            acc = acc.and(Where::statement(name.clone(), Operator::Equals, value));
        }
        Some(acc)
    }
}

impl std::ops::BitAnd for Where {
    type Output = Where;

    fn bitand(self, rhs: Where) -> Where {
        self.and(rhs)
    }
}

impl std::ops::BitOr for Where {
    type Output = Where;

    fn bitor(self, rhs: Where) -> Where {
        self.or(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_or_compose_into_complex_statement() {
        let a = Where::statement("a", Operator::LessThan, &Cell::Int(40));
        let b = Where::statement("b", Operator::NotEquals, &Cell::Int(0));
        let combo = a & b;
        assert!(matches!(combo, Where::ComplexStatement { glue: Glue::And, .. }));
    }

    #[test]
    fn literal_string_needs_escaping_but_numeric_does_not() {
        let s = Where::statement("name", Operator::Equals, &Cell::String("x".into()));
        let n = Where::statement("n", Operator::Equals, &Cell::Int(5));
        match (s, n) {
            (
                Where::Statement { needs_escaping: se, .. },
                Where::Statement { needs_escaping: ne, .. },
            ) => {
                assert!(se);
                assert!(!ne);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn all_equal_folds_composite_keys_with_and() {
        let pairs = vec![
            ("id1".to_string(), Cell::Int(1)),
            ("id2".to_string(), Cell::String("test".into())),
        ];
        let w = Where::all_equal(&pairs).unwrap();
        assert!(matches!(w, Where::ComplexStatement { glue: Glue::And, .. }));
    }

    #[test]
    fn all_equal_on_empty_is_none() {
        assert!(Where::all_equal(&[]).is_none());
    }
}
