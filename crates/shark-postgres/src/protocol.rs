//! Wire-level constants and the message reader/writer used by the startup
//! sequence, simple query protocol, and extended query protocol. Packet
//! framing (opcode + length) itself lives in `shark_core::framed`; this
//! module covers the PostgreSQL-specific body encoding on top of that.

use std::collections::HashMap;

use shark_core::error::ErrorCode;
use shark_core::framed::{read_zero_terminated_string, write_zero_terminated_string};
use shark_core::{Error, Result};

/// Messages the backend sends.
pub mod backend_tag {
    pub const AUTHENTICATION: u8 = b'R';
    pub const PARAMETER_STATUS: u8 = b'S';
    pub const BACKEND_KEY_DATA: u8 = b'K';
    pub const READY_FOR_QUERY: u8 = b'Z';
    pub const ROW_DESCRIPTION: u8 = b'T';
    pub const DATA_ROW: u8 = b'D';
    pub const COMMAND_COMPLETE: u8 = b'C';
    pub const EMPTY_QUERY_RESPONSE: u8 = b'I';
    pub const ERROR_RESPONSE: u8 = b'E';
    pub const NOTICE_RESPONSE: u8 = b'N';
    pub const PARSE_COMPLETE: u8 = b'1';
    pub const BIND_COMPLETE: u8 = b'2';
}

/// Messages the frontend (us) sends.
pub mod frontend_tag {
    pub const QUERY: u8 = b'Q';
    pub const PARSE: u8 = b'P';
    pub const BIND: u8 = b'B';
    pub const EXECUTE: u8 = b'E';
    pub const SYNC: u8 = b'S';
    pub const FLUSH: u8 = b'H';
    pub const PASSWORD_MESSAGE: u8 = b'p';
}

pub mod auth_method {
    pub const OK: i32 = 0;
    pub const CLEARTEXT_PASSWORD: i32 = 3;
    pub const MD5_PASSWORD: i32 = 5;
}

/// Text format code; PostgreSQL's other option (`1`, binary) is never used here.
pub const FORMAT_TEXT: i16 = 0;
pub const NULL_LENGTH: i32 = -1;

/// A cursor over one message body, big-endian throughout.
pub struct MessageReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MessageReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        MessageReader { data, pos: 0 }
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let b = self.data.get(self.pos).copied()?;
        self.pos += 1;
        Some(b)
    }

    pub fn read_i16(&mut self) -> Option<i16> {
        let bytes = self.data.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        let bytes = self.data.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.read_i32().map(|v| v as u32)
    }

    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.pos..self.pos + len)?;
        self.pos += len;
        Some(bytes)
    }

    pub fn read_cstring(&mut self) -> Result<String> {
        read_zero_terminated_string(self.data, &mut self.pos)
    }

    #[must_use]
    pub fn read_rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// Appends a PostgreSQL-encoded body; the caller hands the finished
/// `Vec<u8>` to `write_frame` as the frame body.
#[derive(Default)]
pub struct MessageWriter {
    buf: Vec<u8>,
}

impl MessageWriter {
    #[must_use]
    pub fn new() -> Self {
        MessageWriter::default()
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn write_cstring(&mut self, s: &str) {
        write_zero_terminated_string(&mut self.buf, s);
    }

    /// A bind parameter value: `-1` length for null, else a 4-byte length
    /// followed by the raw (not NUL-terminated) bytes.
    pub fn write_sized_value(&mut self, value: Option<&[u8]>) {
        match value {
            None => self.write_i32(NULL_LENGTH),
            Some(bytes) => {
                self.write_i32(bytes.len() as i32);
                self.write_bytes(bytes);
            }
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Parse an `ErrorResponse`/`NoticeResponse` body: repeated
/// `(field-code byte, C-string)` pairs terminated by a `\0` field code.
pub fn parse_fields(body: &[u8]) -> Result<HashMap<u8, String>> {
    let mut reader = MessageReader::new(body);
    let mut fields = HashMap::new();
    loop {
        let code = reader.read_u8().ok_or_else(|| Error::protocol("truncated error/notice field list"))?;
        if code == 0 {
            break;
        }
        fields.insert(code, reader.read_cstring()?);
    }
    Ok(fields)
}

/// Field codes used out of the full PostgreSQL set: severity, SQLSTATE
/// code, and message are all this backend needs to classify an error.
pub mod field_code {
    pub const SEVERITY: u8 = b'S';
    pub const SQLSTATE: u8 = b'C';
    pub const MESSAGE: u8 = b'M';
}

#[must_use]
pub fn error_code_from_fields(fields: &HashMap<u8, String>) -> ErrorCode {
    ErrorCode {
        backend: "postgresql",
        code: fields.get(&field_code::SQLSTATE).cloned().unwrap_or_default(),
        message: fields.get(&field_code::MESSAGE).cloned().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_reader_reads_big_endian_ints() {
        let data = [0x00, 0x00, 0x00, 0x2a];
        assert_eq!(MessageReader::new(&data).read_i32(), Some(42));
    }

    #[test]
    fn sized_value_null_is_minus_one_length() {
        let mut w = MessageWriter::new();
        w.write_sized_value(None);
        assert_eq!(w.into_bytes(), (-1i32).to_be_bytes());
    }

    #[test]
    fn sized_value_some_writes_length_then_bytes() {
        let mut w = MessageWriter::new();
        w.write_sized_value(Some(b"hi"));
        let mut expected = 2i32.to_be_bytes().to_vec();
        expected.extend_from_slice(b"hi");
        assert_eq!(w.into_bytes(), expected);
    }

    #[test]
    fn parse_fields_reads_until_nul_terminator() {
        let mut body = vec![b'S'];
        body.extend_from_slice(b"ERROR\0");
        body.push(b'C');
        body.extend_from_slice(b"23505\0");
        body.push(0);
        let fields = parse_fields(&body).unwrap();
        assert_eq!(fields.get(&b'S'), Some(&"ERROR".to_string()));
        assert_eq!(fields.get(&b'C'), Some(&"23505".to_string()));
    }

    #[test]
    fn error_code_from_fields_pulls_sqlstate_and_message() {
        let mut fields = HashMap::new();
        fields.insert(field_code::SQLSTATE, "23505".to_string());
        fields.insert(field_code::MESSAGE, "duplicate key".to_string());
        let code = error_code_from_fields(&fields);
        assert_eq!(code.code, "23505");
        assert_eq!(code.message, "duplicate key");
    }
}
