//! The fixed backend capability set the abstract translator (C4) drives.
//!
//! Backends are modeled with interface
//! abstraction rather than inheritance: `Database<B>` is generic over any
//! `B: Backend`, and `shark-postgres`/`shark-mysql` are the two
//! implementations.

use std::collections::HashMap;

use crate::error::Result;
use crate::field::{FieldSpec, TableInfo};
use crate::row::ResultSet;

/// Capabilities a wire protocol client must provide for the schema/CRUD
/// translator to drive it.
pub trait Backend {
    /// `None` when the table does not exist.
    fn get_table_info(&mut self, table: &str) -> Result<Option<HashMap<String, TableInfo>>>;

    /// Render one column definition for `create table`/`alter ... add`.
    fn generate_field(&self, field: &FieldSpec) -> String;

    fn create_table(&mut self, table: &str, column_defs: &[String], primary_keys: &[String]) -> Result<()>;

    fn alter_table_add_column(&mut self, table: &str, field: &FieldSpec) -> Result<()>;

    fn alter_table_column(
        &mut self,
        table: &str,
        field: &FieldSpec,
        type_changed: bool,
        nullable_changed: bool,
    ) -> Result<()>;

    fn alter_table_drop_column(&mut self, table: &str, column: &str) -> Result<()>;

    fn drop_table(&mut self, table: &str, if_exists: bool) -> Result<()>;

    /// Issue an insert; when `primary_keys` is non-empty the backend is
    /// asked to return the inserted key values as a single-row result.
    fn insert_into(
        &mut self,
        table: &str,
        names: &[String],
        values: &[String],
        primary_keys: &[String],
    ) -> Result<Option<ResultSet>>;

    /// Execute a statement that produces no rows (DDL, update, delete).
    fn query(&mut self, sql: &str) -> Result<()>;

    /// Execute a statement that produces rows.
    fn query_select(&mut self, sql: &str) -> Result<ResultSet>;

    fn random_function(&self) -> &'static str;

    /// `Binary`/`Blob` literal rendering; backend-specific.
    fn escape_binary(&self, bytes: &[u8]) -> String;

    /// Release the socket and mark the connection unusable. Per the
    /// spec's resource discipline the connection is not resumable after
    /// this; the caller must reconnect.
    fn close(&mut self);

    /// Identifier quote character for this dialect. PostgreSQL's default
    /// (`"`) is shared; MySQL overrides with `` ` ``.
    fn quote_char(&self) -> char {
        '"'
    }

    /// String/Char/Clob literal rendering: single-quoted, inner `'`
    /// doubled. Shared default; no backend overrides it.
    fn escape_string(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for c in s.chars() {
            if c == '\'' {
                out.push('\'');
            }
            out.push(c);
        }
        out.push('\'');
        out
    }
}
