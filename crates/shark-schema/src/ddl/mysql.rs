//! MySQL DDL text: type rendering plus create/alter/drop statements.

use shark_core::{FieldSpec, TypeFlag};

const QUOTE: char = '`';

fn quote(name: &str) -> String {
    super::quote_identifier(name, QUOTE)
}

#[must_use]
pub fn render_type(field: &FieldSpec) -> String {
    let f = field.type_flag;
    if f == TypeFlag::BOOL {
        "tinyint(1)".to_string()
    } else if f == TypeFlag::BYTE {
        "tinyint".to_string()
    } else if f == TypeFlag::SHORT {
        "smallint".to_string()
    } else if f == TypeFlag::INT {
        "int".to_string()
    } else if f == TypeFlag::LONG {
        "bigint".to_string()
    } else if f == TypeFlag::FLOAT {
        "float".to_string()
    } else if f == TypeFlag::DOUBLE {
        "double".to_string()
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
    } else if f == TypeFlag::BINARY {
        format!("varbinary({})", if field.length > 0 { field.length } else { 255 })
    } else if f == TypeFlag::BLOB {
        "blob".to_string()
    } else if f == TypeFlag::DATE {
        "date".to_string()
    } else if f == TypeFlag::DATE_TIME {
        "datetime".to_string()
    } else if f == TypeFlag::TIME {
        "time".to_string()
    } else {
        "text".to_string()
    }
}

fn column_def(field: &FieldSpec, include_auto_increment: bool) -> String {
    let mut parts = vec![quote(&field.name), render_type(field)];
    if !field.nullable {
        parts.push("NOT NULL".to_string());
    }
    if include_auto_increment && field.auto_increment {
        parts.push("AUTO_INCREMENT".to_string());
    }
    if field.unique {
        parts.push("UNIQUE".to_string());
    }
    if let Some(default) = &field.default_value {
        parts.push(format!("DEFAULT {default}"));
    }
    parts.join(" ")
}

/// Render one column definition for `CREATE TABLE`/`ALTER TABLE ... ADD COLUMN`.
#[must_use]
pub fn generate_field(field: &FieldSpec) -> String {
    column_def(field, true)
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

/// MySQL restates the whole column definition in a single `MODIFY COLUMN`;
/// type and nullability cannot be altered independently. `AUTO_INCREMENT`
/// is left out since the column may not be the table's primary key.
#[must_use]
pub fn alter_column_sql(table: &str, field: &FieldSpec, type_changed: bool, nullable_changed: bool) -> String {
    if !type_changed && !nullable_changed {
        return String::new();
    }
    format!("ALTER TABLE {} MODIFY COLUMN {}", quote(table), column_def(field, false))
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
    fn bool_renders_tinyint_one() {
        assert_eq!(render_type(&field("a", TypeFlag::BOOL)), "tinyint(1)");
    }

    #[test]
    fn binary_and_blob_diverge() {
        assert_eq!(render_type(&field("a", TypeFlag::BINARY)), "varbinary(255)");
        assert_eq!(render_type(&field("a", TypeFlag::BLOB)), "blob");
    }

    #[test]
    fn generate_field_includes_auto_increment() {
        let mut f = field("id", TypeFlag::LONG);
        f.auto_increment = true;
        f.nullable = false;
        assert_eq!(generate_field(&f), "`id` bigint NOT NULL AUTO_INCREMENT");
    }

    #[test]
    fn alter_modify_omits_auto_increment() {
        let mut f = field("id", TypeFlag::LONG);
        f.auto_increment = true;
        assert_eq!(alter_column_sql("widgets", &f, true, false), "ALTER TABLE `widgets` MODIFY COLUMN `id` bigint");
    }

    #[test]
    fn alter_noop_when_nothing_changed() {
        let f = field("id", TypeFlag::LONG);
        assert_eq!(alter_column_sql("widgets", &f, false, false), "");
    }

    #[test]
    fn create_table_appends_primary_key_clause() {
        let sql = create_table_sql("widgets", &["`id` bigint".to_string()], &["id".to_string()]);
        assert_eq!(sql, "CREATE TABLE `widgets` (`id` bigint, PRIMARY KEY (`id`))");
    }
}
