//! SQL text builders for select/update/delete, driven by the WHERE/ORDER/
//! LIMIT clause tree from `shark-query`. DDL text lives in `ddl`; this
//! module covers the CRUD surface that isn't bare insert/create/alter/drop
//! (those go straight through `Backend`).

use shark_core::{Backend, Cell};
use shark_query::{Operator, Order, Select, Where};

use crate::ddl::quote_identifier;

/// Render one value the way a literal belongs in SQL text: `null` for
/// `Cell::Null`, backend-specific hex for binary, quote-escaped for the
/// string family, bare lexical form for everything else.
#[must_use]
pub fn render_cell_literal<B: Backend + ?Sized>(cell: &Cell, backend: &B) -> String {
    match cell {
        Cell::Null => "null".to_string(),
        Cell::Binary(bytes) | Cell::Blob(bytes) => backend.escape_binary(bytes),
        c if c.needs_string_escaping() => backend.escape_string(&c.to_literal_text()),
        c => c.to_literal_text(),
    }
}

/// Recursively render a WHERE subtree. Column names are quoted; the
/// literal text a [`Where::Statement`] already carries is escaped here
/// only when the leaf says it needs it.
#[must_use]
pub fn render_where<B: Backend + ?Sized>(node: &Where, backend: &B, quote: char) -> String {
    match node {
        Where::Statement { field, operator, value, needs_escaping } => {
            let column = quote_identifier(field, quote);
            if matches!(operator, Operator::IsNull) {
                format!("{column} is null")
            } else {
                let rendered = if *needs_escaping { backend.escape_string(value) } else { value.clone() };
                format!("{column} {} {rendered}", operator.word())
            }
        }
        Where::ComplexStatement { left, glue, right } => {
            format!("({}) {} ({})", render_where(left, backend, quote), glue.word(), render_where(right, backend, quote))
        }
    }
}

/// Render the non-random half of a `Select`'s ordering. Callers check
/// `select.random` first — a `rand=true` request overrides this entirely
/// and renders the backend's random function instead (see
/// [`build_select_sql`]).
#[must_use]
pub fn render_order(orders: &[Order], quote: char) -> String {
    orders
        .iter()
        .map(|o| format!("{} {}", quote_identifier(&o.field, quote), o.direction.word()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a `Select`'s window: `limit upper` when there's no offset, else
/// `limit lower,upper`. Identical for both backends. `upper == 0` (no
/// upper bound at all) omits the clause entirely — there is no
/// offset-only LIMIT form.
#[must_use]
pub fn render_limit(select: &Select) -> String {
    let Some(limit) = select.limit else {
        return String::new();
    };
    let Some(count) = limit.count() else {
        return String::new();
    };
    let offset = limit.offset();
    let upper = offset + count;
    if offset == 0 { format!("limit {upper}") } else { format!("limit {offset},{upper}") }
}

#[must_use]
pub fn build_select_sql<B: Backend + ?Sized>(
    table: &str,
    columns: &[String],
    select: &Select,
    backend: &B,
    quote: char,
) -> String {
    let projection = if columns.is_empty() {
        "*".to_string()
    } else {
        columns.iter().map(|c| quote_identifier(c, quote)).collect::<Vec<_>>().join(", ")
    };

    let mut sql = format!("select {projection} from {}", quote_identifier(table, quote));

    if let Some(filter) = &select.filter {
        sql.push_str(" where ");
        sql.push_str(&render_where(filter, backend, quote));
    }
    if select.random {
        sql.push_str(" order by ");
        sql.push_str(backend.random_function());
    } else if !select.order.is_empty() {
        sql.push_str(" order by ");
        sql.push_str(&render_order(&select.order, quote));
    }
    let limit = render_limit(select);
    if !limit.is_empty() {
        sql.push(' ');
        sql.push_str(&limit);
    }

    sql
}

/// An absent `filter` is not an error: it modifies every row in the
/// table. Callers are expected to have already logged a warning before
/// reaching here — this function only decides the SQL text.
#[must_use]
pub fn build_update_sql<B: Backend + ?Sized>(
    table: &str,
    assignments: &[(String, Cell)],
    filter: Option<&Where>,
    backend: &B,
    quote: char,
) -> String {
    let set_clause = assignments
        .iter()
        .map(|(name, value)| format!("{} = {}", quote_identifier(name, quote), render_cell_literal(value, backend)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("update {} set {set_clause}", quote_identifier(table, quote));
    if let Some(filter) = filter {
        sql.push_str(" where ");
        sql.push_str(&render_where(filter, backend, quote));
    }
    sql
}

/// See [`build_update_sql`]: an absent `filter` deletes every row.
#[must_use]
pub fn build_delete_sql<B: Backend + ?Sized>(table: &str, filter: Option<&Where>, backend: &B, quote: char) -> String {
    let mut sql = format!("delete from {}", quote_identifier(table, quote));
    if let Some(filter) = filter {
        sql.push_str(" where ");
        sql.push_str(&render_where(filter, backend, quote));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use shark_core::{FieldSpec, Result, ResultSet, TableInfo};
    use shark_query::{Limit, var};
    use std::collections::HashMap;

    struct Dummy;

    impl Backend for Dummy {
        fn get_table_info(&mut self, _table: &str) -> Result<Option<HashMap<String, TableInfo>>> {
            Ok(None)
        }
        fn generate_field(&self, _field: &FieldSpec) -> String {
            String::new()
        }
        fn create_table(&mut self, _table: &str, _defs: &[String], _pk: &[String]) -> Result<()> {
            Ok(())
        }
        fn alter_table_add_column(&mut self, _table: &str, _field: &FieldSpec) -> Result<()> {
            Ok(())
        }
        fn alter_table_column(&mut self, _table: &str, _field: &FieldSpec, _t: bool, _n: bool) -> Result<()> {
            Ok(())
        }
        fn alter_table_drop_column(&mut self, _table: &str, _column: &str) -> Result<()> {
            Ok(())
        }
        fn drop_table(&mut self, _table: &str, _if_exists: bool) -> Result<()> {
            Ok(())
        }
        fn insert_into(&mut self, _table: &str, _names: &[String], _values: &[String], _pk: &[String]) -> Result<Option<ResultSet>> {
            Ok(None)
        }
        fn query(&mut self, _sql: &str) -> Result<()> {
            Ok(())
        }
        fn query_select(&mut self, _sql: &str) -> Result<ResultSet> {
            Ok(ResultSet::empty())
        }
        fn random_function(&self) -> &'static str {
            "random()"
        }
        fn escape_binary(&self, bytes: &[u8]) -> String {
            format!("'\\x{}'", bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
        }
        fn close(&mut self) {}
    }

    #[test]
    fn select_with_filter_order_and_limit() {
        let backend = Dummy;
        let select = Select::new()
            .filter(var("age").gte(&Cell::Int(18)))
            .order_by(Order::asc("name"))
            .limit(Limit::top(10).unwrap());
        let sql = build_select_sql("users", &["id".to_string(), "name".to_string()], &select, &backend, '"');
        assert_eq!(sql, "select \"id\", \"name\" from \"users\" where \"age\" >= 18 order by \"name\" asc limit 10");
    }

    #[test]
    fn random_order_overrides_named_columns_and_uses_the_backend_function() {
        let backend = Dummy;
        let select = Select::new().order_by(Order::asc("name")).order_by_random();
        let sql = build_select_sql("users", &[], &select, &backend, '"');
        assert!(sql.ends_with("order by random()"));
        assert!(!sql.contains("\"name\""));
    }

    #[test]
    fn limit_with_offset_renders_lower_comma_upper() {
        let backend = Dummy;
        let select = Select::new().limit(Limit::new(5, 15).unwrap());
        assert!(build_select_sql("users", &[], &select, &backend, '"').ends_with("limit 5,15"));
    }

    #[test]
    fn limit_with_no_upper_bound_omits_the_clause() {
        let backend = Dummy;
        let select = Select::new().limit(Limit::new(5, 0).unwrap());
        assert_eq!(render_limit(&select), "");
    }

    #[test]
    fn no_limit_omits_the_clause() {
        let select = Select::new();
        assert_eq!(render_limit(&select), "");
    }

    #[test]
    fn is_null_renders_without_a_literal() {
        let backend = Dummy;
        let where_ = var("deleted_at").is_null();
        assert_eq!(render_where(&where_, &backend, '"'), "\"deleted_at\" is null");
    }

    #[test]
    fn string_literal_is_escaped_through_backend() {
        let backend = Dummy;
        let where_ = var("name").eq(&Cell::String("o'brien".to_string()));
        assert_eq!(render_where(&where_, &backend, '"'), "\"name\" = 'o''brien'");
    }

    /// §8.5: `var("a").lessThan(40) & var("b").notEquals(0)` renders with
    /// each operand parenthesized, not the whole node.
    #[test]
    fn complex_statement_parenthesizes_each_operand_not_the_whole_node() {
        let backend = Dummy;
        let where_ = var("a").lt(&Cell::Int(40)) & var("b").ne(&Cell::Int(0));
        assert_eq!(render_where(&where_, &backend, '"'), "(\"a\" < 40) and (\"b\" != 0)");
    }

    /// §8.5: `(p | q) & r` preserves parenthesization on the nested side.
    #[test]
    fn nested_complex_statement_preserves_parenthesization() {
        let backend = Dummy;
        let where_ = (var("p").eq(&Cell::Bool(true)) | var("q").eq(&Cell::Bool(true))) & var("r").eq(&Cell::Bool(true));
        assert_eq!(
            render_where(&where_, &backend, '"'),
            "((\"p\" = true) or (\"q\" = true)) and (\"r\" = true)"
        );
    }

    #[test]
    fn update_sql_sets_columns_and_filters_by_where() {
        let backend = Dummy;
        let filter = Where::all_equal(&[("id".to_string(), Cell::Int(1))]).unwrap();
        let sql = build_update_sql("users", &[("name".to_string(), Cell::String("Ann".into()))], Some(&filter), &backend, '"');
        assert_eq!(sql, "update \"users\" set \"name\" = 'Ann' where \"id\" = 1");
    }

    #[test]
    fn update_sql_with_no_filter_omits_where_and_touches_whole_table() {
        let backend = Dummy;
        let sql = build_update_sql("users", &[("name".to_string(), Cell::String("Ann".into()))], None, &backend, '"');
        assert_eq!(sql, "update \"users\" set \"name\" = 'Ann'");
    }

    #[test]
    fn delete_sql_filters_by_where() {
        let backend = Dummy;
        let filter = Where::all_equal(&[("id".to_string(), Cell::Int(7))]).unwrap();
        assert_eq!(build_delete_sql("users", Some(&filter), &backend, '"'), "delete from \"users\" where \"id\" = 7");
    }

    #[test]
    fn delete_sql_with_no_filter_omits_where_and_touches_whole_table() {
        let backend = Dummy;
        assert_eq!(build_delete_sql("users", None, &backend, '"'), "delete from \"users\"");
    }
}
