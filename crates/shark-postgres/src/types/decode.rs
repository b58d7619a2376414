//! Decode one PostgreSQL text-format `DataRow` value into a [`Cell`],
//! dispatched by the column's type OID (the thirteen OIDs in [`super::oid`]).

use shark_core::error::TypeError;
use shark_core::{Cell, Error, Result};

use super::oid;

/// `data == None` is the wire-level null sentinel (`0xFFFFFFFF` length);
/// every other OID is read as its text representation.
pub fn decode_cell(type_oid: u32, data: Option<&[u8]>) -> Result<Cell> {
    let Some(bytes) = data else {
        return Ok(Cell::Null);
    };
    let text = std::str::from_utf8(bytes).map_err(|_| type_error(type_oid, "invalid UTF-8 in column text"))?;

    Ok(match type_oid {
        oid::BOOL => Cell::Bool(decode_bool(text, type_oid)?),
        oid::BYTEA => Cell::Binary(decode_bytea(text, type_oid)?),
        oid::INT8 => Cell::Long(text.parse().map_err(|_| type_error(type_oid, "invalid int8 text"))?),
        oid::INT2 => Cell::Short(text.parse().map_err(|_| type_error(type_oid, "invalid int2 text"))?),
        oid::INT4 => Cell::Int(text.parse().map_err(|_| type_error(type_oid, "invalid int4 text"))?),
        oid::TEXT => Cell::String(text.to_string()),
        oid::FLOAT4 => Cell::Float(text.parse().map_err(|_| type_error(type_oid, "invalid float4 text"))?),
        oid::FLOAT8 => Cell::Double(text.parse().map_err(|_| type_error(type_oid, "invalid float8 text"))?),
        oid::BPCHAR => Cell::Char(text.chars().next().unwrap_or(' ')),
        oid::VARCHAR => Cell::String(text.to_string()),
        oid::DATE => Cell::Date(text.to_string()),
        oid::TIME => Cell::Time(text.to_string()),
        oid::TIMESTAMP => Cell::DateTime(normalize_timestamp(text)),
        _ => return Err(type_error(type_oid, "unsupported column type OID")),
    })
}

fn decode_bool(text: &str, type_oid: u32) -> Result<bool> {
    match text {
        "t" => Ok(true),
        "f" => Ok(false),
        _ => Err(type_error(type_oid, "invalid boolean text")),
    }
}

/// `bytea` text output is `\x` followed by lowercase hex pairs.
fn decode_bytea(text: &str, type_oid: u32) -> Result<Vec<u8>> {
    let hex = text.strip_prefix("\\x").ok_or_else(|| type_error(type_oid, "bytea text missing \\x prefix"))?;
    if hex.len() % 2 != 0 {
        return Err(type_error(type_oid, "bytea hex has odd length"));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| type_error(type_oid, "invalid bytea hex digit")))
        .collect()
}

/// PostgreSQL renders `timestamp` text with a space between date and time;
/// the spec's canonical form uses a `T` separator instead.
fn normalize_timestamp(text: &str) -> String {
    text.replacen(' ', "T", 1)
}

fn type_error(type_oid: u32, message: &'static str) -> Error {
    Error::Type(TypeError { expected: "text column value", actual: message, column: None, rust_type: Some(oid_name(type_oid)) })
}

fn oid_name(type_oid: u32) -> &'static str {
    match type_oid {
        oid::BOOL => "bool",
        oid::BYTEA => "bytea",
        oid::INT8 => "int8",
        oid::INT2 => "int2",
        oid::INT4 => "int4",
        oid::TEXT => "text",
        oid::FLOAT4 => "float4",
        oid::FLOAT8 => "float8",
        oid::BPCHAR => "bpchar",
        oid::VARCHAR => "varchar",
        oid::DATE => "date",
        oid::TIME => "time",
        oid::TIMESTAMP => "timestamp",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_data_decodes_to_cell_null() {
        assert_eq!(decode_cell(oid::INT4, None).unwrap(), Cell::Null);
    }

    #[test]
    fn bool_true_and_false() {
        assert_eq!(decode_cell(oid::BOOL, Some(b"t")).unwrap(), Cell::Bool(true));
        assert_eq!(decode_cell(oid::BOOL, Some(b"f")).unwrap(), Cell::Bool(false));
    }

    #[test]
    fn bytea_hex_decodes_to_binary() {
        let cell = decode_cell(oid::BYTEA, Some(b"\\xdead")).unwrap();
        assert_eq!(cell, Cell::Binary(vec![0xde, 0xad]));
    }

    #[test]
    fn integers_parse_by_width() {
        assert_eq!(decode_cell(oid::INT8, Some(b"9223372036854775807")).unwrap(), Cell::Long(i64::MAX));
        assert_eq!(decode_cell(oid::INT2, Some(b"-5")).unwrap(), Cell::Short(-5));
        assert_eq!(decode_cell(oid::INT4, Some(b"42")).unwrap(), Cell::Int(42));
    }

    #[test]
    fn text_and_varchar_pass_through() {
        assert_eq!(decode_cell(oid::TEXT, Some(b"hello")).unwrap(), Cell::String("hello".to_string()));
        assert_eq!(decode_cell(oid::VARCHAR, Some(b"hi")).unwrap(), Cell::String("hi".to_string()));
    }

    #[test]
    fn floats_parse() {
        assert_eq!(decode_cell(oid::FLOAT4, Some(b"0.55")).unwrap(), Cell::Float(0.55));
        assert_eq!(decode_cell(oid::FLOAT8, Some(b"73482300000")).unwrap(), Cell::Double(7.34823e10));
    }

    #[test]
    fn bpchar_takes_first_char() {
        assert_eq!(decode_cell(oid::BPCHAR, Some(b";")).unwrap(), Cell::Char(';'));
    }

    #[test]
    fn date_passes_through_iso_text() {
        assert_eq!(decode_cell(oid::DATE, Some(b"2018-12-31")).unwrap(), Cell::Date("2018-12-31".to_string()));
    }

    #[test]
    fn time_passes_through_iso_text() {
        assert_eq!(decode_cell(oid::TIME, Some(b"00:36:12")).unwrap(), Cell::Time("00:36:12".to_string()));
    }

    #[test]
    fn timestamp_space_is_normalized_to_t() {
        let cell = decode_cell(oid::TIMESTAMP, Some(b"2019-01-01 00:27:43")).unwrap();
        assert_eq!(cell, Cell::DateTime("2019-01-01T00:27:43".to_string()));
    }

    #[test]
    fn unknown_oid_is_a_type_error() {
        assert!(decode_cell(999_999, Some(b"x")).is_err());
    }
}
