//! The result-binder input shape and the `Bind` trait that
//! `derive(Entity)` implements for each declared type.

use std::collections::HashMap;

use crate::cell::Cell;
use crate::error::{Error, Result};

/// A full result set: a shared column-name → position index plus the
/// per-row cells. Column insertion order is irrelevant; only the name →
/// index mapping matters.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: HashMap<String, usize>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultSet {
    #[must_use]
    pub fn new(columns: HashMap<String, usize>, rows: Vec<Vec<Cell>>) -> Self {
        ResultSet { columns, rows }
    }

    #[must_use]
    pub fn empty() -> Self {
        ResultSet::default()
    }

    pub fn views(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |cells| RowView {
            columns: &self.columns,
            cells,
        })
    }

    /// Bind every row to `T`.
    pub fn bind_all<T: Bind>(&self) -> Result<Vec<T>> {
        self.views().map(|row| T::bind(&row)).collect()
    }

    /// Bind the first row only, if any.
    pub fn bind_one<T: Bind>(&self) -> Result<Option<T>> {
        match self.views().next() {
            Some(row) => T::bind(&row).map(Some),
            None => Ok(None),
        }
    }
}

/// A single row, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a HashMap<String, usize>,
    cells: &'a [Cell],
}

impl<'a> RowView<'a> {
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.columns.get(column).and_then(|&i| self.cells.get(i))
    }

    /// Fetch the named column as an owned `Cell`, failing with
    /// `Error::Type` if the column is absent from the result (a column the
    /// entity declares but the query didn't project is a bind-time
    /// programmer error, not a null value).
    pub fn require(&self, column: &str) -> Result<Cell> {
        self.get(column).cloned().ok_or_else(|| {
            Error::Type(crate::error::TypeError {
                expected: "present column",
                actual: "missing column".to_string(),
                column: Some(column.to_string()),
                rust_type: None,
            })
        })
    }
}

/// Implemented by every entity type (normally via `derive(Entity)`): maps
/// a [`RowView`] onto a fresh instance, honoring nullability: a null cell
/// nullifies a nullable wrapper or fails `TypeMismatch` for a non-nullable
/// field; a present cell is cast per the type table, failing
/// `TypeMismatch` on mismatch.
pub trait Bind: Sized {
    fn bind(row: &RowView<'_>) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        id: i32,
        name: Option<String>,
    }

    impl Bind for Pair {
        fn bind(row: &RowView<'_>) -> Result<Self> {
            let id_cell = row.require("id")?;
            let id = i32::try_from(id_cell)?;
            let name = match row.require("name")? {
                Cell::Null => None,
                c => Some(String::try_from(c)?),
            };
            Ok(Pair { id, name })
        }
    }

    #[test]
    fn binds_present_and_null_columns() {
        let mut columns = HashMap::new();
        columns.insert("id".to_string(), 0);
        columns.insert("name".to_string(), 1);
        let rs = ResultSet::new(
            columns,
            vec![
                vec![Cell::Int(1), Cell::String("a".into())],
                vec![Cell::Int(2), Cell::Null],
            ],
        );
        let rows: Vec<Pair> = rs.bind_all().unwrap();
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].name.as_deref(), Some("a"));
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[1].name, None);
    }

    #[test]
    fn bind_one_on_empty_is_none() {
        let rs = ResultSet::empty();
        let row: Option<Pair> = rs.bind_one().unwrap();
        assert!(row.is_none());
    }
}
