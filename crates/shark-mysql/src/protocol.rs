//! Wire-level constants and the packet reader/writer used by the
//! handshake and `COM_QUERY` exchange. Packet framing (length + sequence
//! byte) itself lives in `shark_core::framed`; this module covers the
//! MySQL-specific body encoding on top of that.

use shark_core::{Error, Result};

pub mod capabilities {
    pub const CLIENT_CONNECT_WITH_DB: u32 = 1 << 3;
    pub const CLIENT_PROTOCOL_41: u32 = 1 << 9;
    pub const CLIENT_SECURE_CONNECTION: u32 = 1 << 15;
    pub const CLIENT_PLUGIN_AUTH: u32 = 1 << 19;
}

pub mod charset {
    pub const UTF8MB4_0900_AI_CI: u8 = 255;
}

pub mod command {
    pub const QUERY: u8 = 0x03;
    pub const QUIT: u8 = 0x01;
}

/// A cursor over one packet body, little-endian throughout.
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        PacketReader { data, pos: 0 }
    }

    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let b = self.data.get(self.pos).copied()?;
        self.pos += 1;
        Some(b)
    }

    pub fn read_u16_le(&mut self) -> Option<u16> {
        let bytes = self.data.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32_le(&mut self) -> Option<u32> {
        let bytes = self.data.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Length-encoded integer: the first byte selects a fixed width, or is
    /// itself the value when `< 0xfb`.
    pub fn read_lenenc_int(&mut self) -> Option<u64> {
        let first = self.read_u8()?;
        match first {
            0..=0xfa => Some(u64::from(first)),
            0xfb => None,
            0xfc => self.read_u16_le().map(u64::from),
            0xfd => {
                let bytes = self.data.get(self.pos..self.pos + 3)?;
                self.pos += 3;
                Some(u64::from(bytes[0]) | (u64::from(bytes[1]) << 8) | (u64::from(bytes[2]) << 16))
            }
            0xfe => {
                let bytes = self.data.get(self.pos..self.pos + 8)?;
                self.pos += 8;
                Some(u64::from_le_bytes(bytes.try_into().ok()?))
            }
            0xff => None,
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.pos..self.pos + len)?;
        self.pos += len;
        Some(bytes)
    }

    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    pub fn read_null_string(&mut self) -> Option<String> {
        let end = self.data[self.pos..].iter().position(|&b| b == 0)?;
        let s = String::from_utf8_lossy(&self.data[self.pos..self.pos + end]).into_owned();
        self.pos += end + 1;
        Some(s)
    }

    #[must_use]
    pub fn read_rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

/// Appends a MySQL-encoded body; the caller hands the finished `Vec<u8>`
/// to `write_frame` as the frame body.
#[derive(Default)]
pub struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    #[must_use]
    pub fn new() -> Self {
        PacketWriter::default()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u32_le(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_zeros(&mut self, n: usize) {
        self.buf.extend(std::iter::repeat_n(0u8, n));
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn write_null_string(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug, Clone)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
}

#[derive(Debug, Clone)]
pub struct ErrPacket {
    pub error_code: u16,
    pub sql_state: String,
    pub error_message: String,
}

/// `payload[0]` has already been checked to be `0x00`.
pub fn parse_ok_packet(payload: &[u8]) -> Result<OkPacket> {
    let mut reader = PacketReader::new(payload);
    reader.read_u8();
    let affected_rows = reader.read_lenenc_int().ok_or_else(|| Error::protocol("malformed OK packet: affected_rows"))?;
    let last_insert_id = reader.read_lenenc_int().ok_or_else(|| Error::protocol("malformed OK packet: last_insert_id"))?;
    Ok(OkPacket { affected_rows, last_insert_id })
}

/// `payload[0]` has already been checked to be `0xff`.
pub fn parse_err_packet(payload: &[u8]) -> Result<ErrPacket> {
    let mut reader = PacketReader::new(payload);
    reader.read_u8();
    let error_code = reader.read_u16_le().ok_or_else(|| Error::protocol("malformed ERR packet: error_code"))?;
    // MySQL 4.1+ always includes the '#' SQLSTATE marker plus 5-byte state.
    if reader.peek() == Some(b'#') {
        reader.read_u8();
        let state_bytes = reader.read_bytes(5).ok_or_else(|| Error::protocol("malformed ERR packet: sqlstate"))?;
        let sql_state = String::from_utf8_lossy(state_bytes).into_owned();
        let error_message = String::from_utf8_lossy(reader.read_rest()).into_owned();
        Ok(ErrPacket { error_code, sql_state, error_message })
    } else {
        let error_message = String::from_utf8_lossy(reader.read_rest()).into_owned();
        Ok(ErrPacket { error_code, sql_state: "HY000".to_string(), error_message })
    }
}

/// `Binary`/`Blob` literal rendering: bare `0x`-prefixed hex, no quotes.
#[must_use]
pub fn escape_binary_hex(bytes: &[u8]) -> String {
    format!("0x{}", bytes.iter().map(|b| format!("{b:02X}")).collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_binary_is_bare_0x_hex() {
        assert_eq!(escape_binary_hex(&[0xDE, 0xAD]), "0xDEAD");
    }

    #[test]
    fn lenenc_int_small_value_is_the_byte_itself() {
        let data = [0x05];
        assert_eq!(PacketReader::new(&data).read_lenenc_int(), Some(5));
    }

    #[test]
    fn lenenc_int_0xfc_prefix_reads_two_bytes() {
        let data = [0xfc, 0x00, 0x01];
        assert_eq!(PacketReader::new(&data).read_lenenc_int(), Some(256));
    }

    #[test]
    fn null_string_stops_at_terminator() {
        let mut data = b"root".to_vec();
        data.push(0);
        data.extend_from_slice(b"trailing");
        let mut reader = PacketReader::new(&data);
        assert_eq!(reader.read_null_string(), Some("root".to_string()));
        assert_eq!(reader.read_rest(), b"trailing");
    }

    #[test]
    fn err_packet_parses_sqlstate_and_message() {
        let mut payload = vec![0xff, 0x19, 0x04]; // 1049
        payload.extend_from_slice(b"#42000Unknown database");
        let err = parse_err_packet(&payload).unwrap();
        assert_eq!(err.error_code, 1049);
        assert_eq!(err.sql_state, "42000");
        assert_eq!(err.error_message, "Unknown database");
    }

    #[test]
    fn ok_packet_parses_affected_rows_and_insert_id() {
        let payload = [0x00, 0x01, 0x07];
        let ok = parse_ok_packet(&payload).unwrap();
        assert_eq!(ok.affected_rows, 1);
        assert_eq!(ok.last_insert_id, 7);
    }
}
