//! The fluent `var(...)` entry point for building `Where` trees. Combine
//! the resulting statements with `&`/`|`, overloaded on [`Where`] itself.
//!
//! ```ignore
//! let filter = var("age").gte(&18.into()) & var("name").eq(&"Ada".into());
//! ```

use shark_core::Cell;

use crate::clause::{Operator, Where};

/// A column reference awaiting an operator to become a `Where` leaf.
#[derive(Debug, Clone)]
pub struct Var {
    field: String,
}

/// Start a clause on the named column.
#[must_use]
pub fn var(field: impl Into<String>) -> Var {
    Var { field: field.into() }
}

impl Var {
    #[must_use]
    pub fn eq(self, value: &Cell) -> Where {
        Where::statement(self.field, Operator::Equals, value)
    }

    #[must_use]
    pub fn ne(self, value: &Cell) -> Where {
        Where::statement(self.field, Operator::NotEquals, value)
    }

    #[must_use]
    pub fn gt(self, value: &Cell) -> Where {
        Where::statement(self.field, Operator::GreaterThan, value)
    }

    #[must_use]
    pub fn gte(self, value: &Cell) -> Where {
        Where::statement(self.field, Operator::GreaterThanOrEquals, value)
    }

    #[must_use]
    pub fn lt(self, value: &Cell) -> Where {
        Where::statement(self.field, Operator::LessThan, value)
    }

    #[must_use]
    pub fn lte(self, value: &Cell) -> Where {
        Where::statement(self.field, Operator::LessThanOrEquals, value)
    }

    #[must_use]
    pub fn is_null(self) -> Where {
        Where::statement(self.field, Operator::IsNull, &Cell::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_eq_and_gte_compose_with_and() {
        let filter = var("age").gte(&Cell::Int(18)) & var("name").eq(&Cell::String("Ada".into()));
        assert!(matches!(filter, Where::ComplexStatement { .. }));
    }

    #[test]
    fn is_null_uses_is_operator_and_null_literal() {
        let filter = var("deleted_at").is_null();
        match filter {
            Where::Statement { operator, value, .. } => {
                assert_eq!(operator, Operator::IsNull);
                assert_eq!(value, "null");
            }
            _ => unreachable!(),
        }
    }
}
