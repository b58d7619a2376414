//! ORDER BY direction and the LIMIT window, plus the `Select` request that
//! bundles a WHERE tree with them.

use crate::clause::Where;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    #[must_use]
    pub const fn word(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    #[must_use]
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Order { field: field.into(), direction }
    }

    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Order::new(field, Direction::Ascending)
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Order::new(field, Direction::Descending)
    }
}

/// A row window: `lower` rows skipped, up to `upper` rows returned.
/// `upper == 0` is the sole "no limit" sentinel — it is never rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    lower: u64,
    upper: u64,
}

impl Limit {
    /// Construct a window. Rejects `lower >= upper` when both are nonzero,
    /// since that window can never return a row.
    pub fn new(lower: u64, upper: u64) -> crate::Result<Self> {
        if upper != 0 && lower >= upper {
            return Err(shark_core::Error::Database(format!(
                "limit window [{lower}, {upper}) is empty"
            )));
        }
        Ok(Limit { lower, upper })
    }

    /// `LIMIT upper` with no offset.
    pub fn top(upper: u64) -> crate::Result<Self> {
        Limit::new(0, upper)
    }

    /// No upper bound, no offset. Always valid, unlike [`Limit::new`].
    #[must_use]
    pub const fn unbounded() -> Self {
        Limit { lower: 0, upper: 0 }
    }

    #[must_use]
    pub const fn offset(self) -> u64 {
        self.lower
    }

    /// `None` when this window has no upper bound.
    #[must_use]
    pub const fn count(self) -> Option<u64> {
        if self.upper == 0 {
            None
        } else {
            Some(self.upper - self.lower)
        }
    }
}

/// A full row-selection request: an optional filter, ordering, and window.
///
/// `random` mirrors the `Order { rand, fields }` shape: when set it
/// overrides `order` entirely and renders as the backend's random
/// function (PostgreSQL `random()`, MySQL `rand()`) instead of any named
/// column.
#[derive(Debug, Clone, Default)]
pub struct Select {
    pub filter: Option<Where>,
    pub order: Vec<Order>,
    pub random: bool,
    pub limit: Option<Limit>,
}

impl Select {
    #[must_use]
    pub fn new() -> Self {
        Select::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: Where) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    /// Order by the backend's random function, overriding any `order_by`
    /// columns already added.
    #[must_use]
    pub fn order_by_random(mut self) -> Self {
        self.random = true;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_rejects_empty_window() {
        assert!(Limit::new(10, 5).is_err());
        assert!(Limit::new(10, 10).is_err());
    }

    #[test]
    fn limit_zero_upper_is_unbounded() {
        let l = Limit::new(5, 0).unwrap();
        assert_eq!(l.offset(), 5);
        assert_eq!(l.count(), None);
    }

    #[test]
    fn limit_top_has_zero_offset() {
        let l = Limit::top(20).unwrap();
        assert_eq!(l.offset(), 0);
        assert_eq!(l.count(), Some(20));
    }

    #[test]
    fn unbounded_has_no_count() {
        let l = Limit::unbounded();
        assert_eq!(l.offset(), 0);
        assert_eq!(l.count(), None);
    }

    #[test]
    fn select_builder_accumulates_multiple_orders() {
        let select = Select::new()
            .order_by(Order::asc("name"))
            .order_by(Order::desc("id"));
        assert_eq!(select.order.len(), 2);
    }

    #[test]
    fn order_by_random_sets_the_flag() {
        let select = Select::new().order_by(Order::asc("name")).order_by_random();
        assert!(select.random);
    }
}
