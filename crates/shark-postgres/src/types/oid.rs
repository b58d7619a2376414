//! The thirteen PostgreSQL type OIDs this backend decodes, and the
//! `information_schema.columns.data_type` strings `get_table_info` maps
//! back onto the logical [`TypeFlag`](shark_core::TypeFlag) set.

use shark_core::TypeFlag;

pub const BOOL: u32 = 16;
pub const BYTEA: u32 = 17;
pub const INT8: u32 = 20;
pub const INT2: u32 = 21;
pub const INT4: u32 = 23;
pub const TEXT: u32 = 25;
pub const FLOAT4: u32 = 700;
pub const FLOAT8: u32 = 701;
pub const BPCHAR: u32 = 1042;
pub const VARCHAR: u32 = 1043;
pub const DATE: u32 = 1082;
pub const TIME: u32 = 1083;
pub const TIMESTAMP: u32 = 1114;

/// Map an `information_schema.columns.data_type` value back onto the
/// logical type mask it satisfies. `text` is deliberately `String|Clob`
/// (either declared form reconciles against a live `text` column, per
/// the same bitmask rule that lets `bytea` satisfy `Binary|Blob`).
#[must_use]
pub fn type_flag_for_data_type(data_type: &str) -> TypeFlag {
    match data_type {
        "boolean" => TypeFlag::BOOL,
        "smallint" => TypeFlag::SHORT,
        "integer" => TypeFlag::INT,
        "bigint" => TypeFlag::LONG,
        "real" => TypeFlag::FLOAT,
        "double precision" => TypeFlag::DOUBLE,
        "character" => TypeFlag::CHAR,
        "character varying" => TypeFlag::STRING,
        "text" => TypeFlag::STRING | TypeFlag::CLOB,
        "bytea" => TypeFlag::BINARY | TypeFlag::BLOB,
        "date" => TypeFlag::DATE,
        "timestamp without time zone" | "timestamp with time zone" => TypeFlag::DATE_TIME,
        "time without time zone" | "time with time zone" => TypeFlag::TIME,
        _ => TypeFlag::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_string_or_clob() {
        let f = type_flag_for_data_type("text");
        assert!(f.intersects(TypeFlag::STRING));
        assert!(f.intersects(TypeFlag::CLOB));
    }

    #[test]
    fn bytea_is_binary_or_blob() {
        let f = type_flag_for_data_type("bytea");
        assert!(f.intersects(TypeFlag::BINARY));
        assert!(f.intersects(TypeFlag::BLOB));
    }

    #[test]
    fn unknown_data_type_is_none() {
        assert_eq!(type_flag_for_data_type("jsonb"), TypeFlag::NONE);
    }

    #[test]
    fn scalar_data_types_map_one_to_one() {
        assert_eq!(type_flag_for_data_type("boolean"), TypeFlag::BOOL);
        assert_eq!(type_flag_for_data_type("integer"), TypeFlag::INT);
        assert_eq!(type_flag_for_data_type("bigint"), TypeFlag::LONG);
        assert_eq!(type_flag_for_data_type("character varying"), TypeFlag::STRING);
    }
}
