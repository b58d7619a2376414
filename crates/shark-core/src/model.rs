//! The `Entity` contract produced by `derive(Entity)`.

use crate::cell::Cell;
use crate::field::FieldSpec;
use crate::row::Bind;

/// A declared record type mapped onto a table.
///
/// `table_name` is queried at runtime from an instance, never derived from
/// the type identifier — consumers must call it on an instance, not assume
/// a `const` or type-level name.
pub trait Entity: Bind {
    /// The table this entity maps to.
    fn table_name(&self) -> String;

    /// The ordered, canonical field list (name, type, nullability, ...).
    fn fields() -> Vec<FieldSpec>
    where
        Self: Sized;

    /// Declared primary-key column names, in declaration order. May be
    /// empty; may be composite.
    fn primary_keys() -> Vec<String>
    where
        Self: Sized;

    /// Present, non-null fields of this instance as `(column, cell)`
    /// pairs, in `fields()` order — the input to `insert`/`update`
    ///
    fn present_fields(&self) -> Vec<(String, Cell)>;

    /// This instance's primary-key values as `(column, cell)` pairs, used
    /// to synthesize id-based WHERE clauses for `update`/`del`/`select_id`.
    fn primary_key_values(&self) -> Vec<(String, Cell)>;

    /// Apply a returned row (e.g. from a PostgreSQL `returning` clause)
    /// back onto `self`, used by `insert` when `update_id` is requested.
    fn apply_returned(&mut self, row: &crate::row::RowView<'_>) -> crate::error::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::row::RowView;
    use crate::types::TypeFlag;

    struct Widget {
        id: Option<i32>,
        name: String,
    }

    impl Bind for Widget {
        fn bind(row: &RowView<'_>) -> Result<Self> {
            let id = match row.require("id")? {
                Cell::Null => None,
                c => Some(i32::try_from(c)?),
            };
            let name = String::try_from(row.require("name")?)?;
            Ok(Widget { id, name })
        }
    }

    impl Entity for Widget {
        fn table_name(&self) -> String {
            "widget".to_string()
        }

        fn fields() -> Vec<FieldSpec> {
            vec![
                {
                    let mut f = FieldSpec::new("id", TypeFlag::INT);
                    f.auto_increment = true;
                    f.nullable = false;
                    f
                },
                FieldSpec::new("name", TypeFlag::STRING),
            ]
        }

        fn primary_keys() -> Vec<String> {
            vec!["id".to_string()]
        }

        fn present_fields(&self) -> Vec<(String, Cell)> {
            let mut out = vec![("name".to_string(), Cell::String(self.name.clone()))];
            if let Some(id) = self.id {
                out.push(("id".to_string(), Cell::Int(id)));
            }
            out
        }

        fn primary_key_values(&self) -> Vec<(String, Cell)> {
            self.id
                .map(|id| vec![("id".to_string(), Cell::Int(id))])
                .unwrap_or_default()
        }

        fn apply_returned(&mut self, row: &RowView<'_>) -> Result<()> {
            if let Cell::Int(id) = row.require("id")? {
                self.id = Some(id);
            }
            Ok(())
        }
    }

    #[test]
    fn auto_increment_field_forces_non_null() {
        let fields = Widget::fields();
        let id_field = fields.iter().find(|f| f.name == "id").unwrap();
        assert!(id_field.auto_increment);
        assert!(!id_field.nullable);
    }

    #[test]
    fn present_fields_omits_unset_pk() {
        let w = Widget { id: None, name: "a".into() };
        let present = w.present_fields();
        assert_eq!(present.len(), 1);
        assert_eq!(present[0].0, "name");
    }
}
