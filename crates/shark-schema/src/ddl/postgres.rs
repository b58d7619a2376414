//! PostgreSQL DDL text: type rendering plus create/alter/drop statements.

use shark_core::{FieldSpec, TypeFlag};

const QUOTE: char = '"';

fn quote(name: &str) -> String {
    super::quote_identifier(name, QUOTE)
}

/// Render a declared field's base SQL type, honoring `auto_increment` via
/// the `serial`/`bigserial` identity shorthand.
#[must_use]
pub fn render_type(field: &FieldSpec) -> String {
    let f = field.type_flag;
    if field.auto_increment {
        if f == TypeFlag::LONG {
            return "bigserial".to_string();
        }
        return "serial".to_string();
    }
    if f == TypeFlag::BOOL {
        "boolean".to_string()
    } else if f == TypeFlag::BYTE || f == TypeFlag::SHORT {
        "smallint".to_string()
    } else if f == TypeFlag::INT {
        "integer".to_string()
    } else if f == TypeFlag::LONG {
        "bigint".to_string()
    } else if f == TypeFlag::FLOAT {
        "real".to_string()
    } else if f == TypeFlag::DOUBLE {
        "double precision".to_string()
    } else if f == TypeFlag::CHAR {
        "char(1)".to_string()
    } else if f == TypeFlag::STRING {
        if field.length > 0 {
            format!("varchar({})", field.length)
        } else {
            "text".to_string()
        }
    } else if f == TypeFlag::CLOB {
        "text".to_string()
    } else if f == TypeFlag::BINARY || f == TypeFlag::BLOB {
        "bytea".to_string()
    } else if f == TypeFlag::DATE {
        "date".to_string()
    } else if f == TypeFlag::DATE_TIME {
        "timestamp".to_string()
    } else if f == TypeFlag::TIME {
        "time".to_string()
    } else {
        "text".to_string()
    }
}

/// Render one column definition for `CREATE TABLE`/`ALTER TABLE ... ADD COLUMN`.
#[must_use]
pub fn generate_field(field: &FieldSpec) -> String {
    let mut parts = vec![quote(&field.name), render_type(field)];
    if !field.nullable {
        parts.push("NOT NULL".to_string());
    }
    if field.unique {
        parts.push("UNIQUE".to_string());
    }
    if let Some(default) = &field.default_value {
        parts.push(format!("DEFAULT {default}"));
    }
    parts.join(" ")
}

#[must_use]
pub fn create_table_sql(table: &str, column_defs: &[String], primary_keys: &[String]) -> String {
    let mut parts = column_defs.to_vec();
    if !primary_keys.is_empty() {
        let pk_cols = primary_keys.iter().map(|k| quote(k)).collect::<Vec<_>>().join(", ");
        parts.push(format!("PRIMARY KEY ({pk_cols})"));
    }
    format!("CREATE TABLE {} ({})", quote(table), parts.join(", "))
}

#[must_use]
pub fn alter_add_column_sql(table: &str, field: &FieldSpec) -> String {
    format!("ALTER TABLE {} ADD COLUMN {}", quote(table), generate_field(field))
}

/// `ALTER COLUMN ... TYPE` and `ALTER COLUMN ... SET/DROP NOT NULL` are
/// distinct statements in PostgreSQL; only the requested halves are emitted.
#[must_use]
pub fn alter_column_sql(table: &str, field: &FieldSpec, type_changed: bool, nullable_changed: bool) -> String {
    let mut statements = Vec::new();
    if type_changed {
        statements.push(format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            quote(table),
            quote(&field.name),
            render_type(field)
        ));
    }
    if nullable_changed {
        let action = if field.nullable { "DROP NOT NULL" } else { "SET NOT NULL" };
        statements.push(format!("ALTER TABLE {} ALTER COLUMN {} {}", quote(table), quote(&field.name), action));
    }
    statements.join("; ")
}

#[must_use]
pub fn alter_drop_column_sql(table: &str, column: &str) -> String {
    format!("ALTER TABLE {} DROP COLUMN {}", quote(table), quote(column))
}

#[must_use]
pub fn drop_table_sql(table: &str, if_exists: bool) -> String {
    if if_exists {
        format!("DROP TABLE IF EXISTS {}", quote(table))
    } else {
        format!("DROP TABLE {}", quote(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, type_flag: TypeFlag) -> FieldSpec {
        FieldSpec::new(name, type_flag)
    }

    #[test]
    fn auto_increment_long_renders_bigserial() {
        let mut f = field("id", TypeFlag::LONG);
        f.auto_increment = true;
        assert_eq!(render_type(&f), "bigserial");
    }

    #[test]
    fn string_with_length_renders_varchar() {
        let mut f = field("name", TypeFlag::STRING);
        f.length = 64;
        assert_eq!(render_type(&f), "varchar(64)");
    }

    #[test]
    fn string_without_length_renders_text() {
        let f = field("name", TypeFlag::STRING);
        assert_eq!(render_type(&f), "text");
    }

    #[test]
    fn binary_and_blob_both_render_bytea() {
        assert_eq!(render_type(&field("a", TypeFlag::BINARY)), "bytea");
        assert_eq!(render_type(&field("a", TypeFlag::BLOB)), "bytea");
    }

    #[test]
    fn generate_field_combines_not_null_unique_default() {
        let mut f = field("name", TypeFlag::STRING);
        f.nullable = false;
        f.unique = true;
        f.default_value = Some("'anon'".to_string());
        assert_eq!(generate_field(&f), "\"name\" text NOT NULL UNIQUE DEFAULT 'anon'");
    }

    #[test]
    fn create_table_appends_primary_key_clause() {
        let sql = create_table_sql("widgets", &["\"id\" serial".to_string()], &["id".to_string()]);
        assert_eq!(sql, "CREATE TABLE \"widgets\" (\"id\" serial, PRIMARY KEY (\"id\"))");
    }

    #[test]
    fn alter_column_emits_only_requested_halves() {
        let f = field("name", TypeFlag::STRING);
        assert_eq!(
            alter_column_sql("widgets", &f, true, false),
            "ALTER TABLE \"widgets\" ALTER COLUMN \"name\" TYPE text"
        );
        let mut nullable_changed = f.clone();
        nullable_changed.nullable = false;
        assert_eq!(
            alter_column_sql("widgets", &nullable_changed, false, true),
            "ALTER TABLE \"widgets\" ALTER COLUMN \"name\" SET NOT NULL"
        );
    }

    #[test]
    fn drop_table_honors_if_exists() {
        assert_eq!(drop_table_sql("widgets", true), "DROP TABLE IF EXISTS \"widgets\"");
        assert_eq!(drop_table_sql("widgets", false), "DROP TABLE \"widgets\"");
    }
}
