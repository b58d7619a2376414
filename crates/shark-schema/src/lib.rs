//! Table reconciliation and SQL text generation: the abstract translator
//! between a declared `Entity` and a `Backend`.
//!
//! - `ddl` — per-dialect type rendering and create/alter/drop statement text
//! - `diff` — compare declared fields against a live table and drive the
//!   backend through whatever create/add/alter/drop steps reconcile them
//! - `translator` — SQL text for select/update/delete, built from the
//!   `shark-query` WHERE/ORDER/LIMIT clause tree

pub mod ddl;
pub mod diff;
pub mod translator;

pub use diff::{Action, plan, reconcile};
pub use translator::{build_delete_sql, build_select_sql, build_update_sql, render_cell_literal, render_limit, render_order, render_where};
