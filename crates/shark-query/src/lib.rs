//! The WHERE/ORDER/LIMIT clause tree and the fluent builder that
//! constructs it, rendered to SQL text by `shark-schema`'s translator.

pub mod builder;
pub mod clause;
pub mod select;

pub use builder::var;
pub use clause::{Glue, Operator, Where};
pub use select::{Direction, Limit, Order, Select};

pub type Result<T> = shark_core::Result<T>;
