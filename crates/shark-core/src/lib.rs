//! Core types shared by the `shark` entity translator and its wire
//! protocol backends: the closed logical type set, the nullable wrapper,
//! the `FieldSpec`/`TableInfo` shapes the reconciler compares, the result
//! binder's input, the error taxonomy, and the `Backend` capability trait.

pub mod backend;
pub mod cell;
pub mod column;
pub mod error;
pub mod field;
pub mod framed;
pub mod identifiers;
pub mod model;
pub mod row;
pub mod types;

pub use backend::Backend;
pub use cell::Cell;
pub use column::Column;
pub use error::{Error, Result};
pub use field::{FieldSpec, Reconciliation, TableInfo, reconcile_field};
pub use framed::{Endianness, Frame, FrameConfig, read_frame, write_frame};
pub use identifiers::resolve_name;
pub use model::Entity;
pub use row::{Bind, ResultSet, RowView};
pub use types::TypeFlag;
