//! Dialect-specific DDL text generation, keyed directly off `FieldSpec`.

pub mod mysql;
pub mod postgres;

/// Quote an identifier the way the owning dialect requires.
#[must_use]
pub fn quote_identifier(name: &str, quote: char) -> String {
    let escaped = if quote == '"' {
        name.replace('"', "\"\"")
    } else {
        name.replace('`', "``")
    };
    format!("{quote}{escaped}{quote}")
}
