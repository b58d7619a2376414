//! MySQL wire protocol connection: handshake v10, authentication, and
//! `COM_QUERY` over the simple text protocol. Implements [`Backend`].

use std::collections::HashMap;
use std::io::Write;
use std::net::TcpStream;

use shark_core::error::ErrorCode;
use shark_core::framed::{Frame, FrameConfig, read_frame, write_frame};
use shark_core::{Backend, Error, FieldSpec, Result, ResultSet, TableInfo};
use shark_schema::ddl;

use crate::auth;
use crate::config::MySqlConfig;
use crate::protocol::{OkPacket, PacketReader, PacketWriter, capabilities, command, parse_err_packet, parse_ok_packet};

const FRAME: FrameConfig = FrameConfig::mysql();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Authenticating,
    Ready,
    Closed,
}

/// MySQL connection implementing the `shark` [`Backend`] trait.
pub struct MySqlConnection {
    stream: TcpStream,
    state: ConnectionState,
    sequence: u8,
    config: MySqlConfig,
}

impl std::fmt::Debug for MySqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlConnection").field("state", &self.state).field("host", &self.config.host).finish_non_exhaustive()
    }
}

impl MySqlConnection {
    /// TCP connect, read the server's handshake v10 packet, send a
    /// handshake response, and resolve whatever auth-switch/extra-auth
    /// round trip the server asks for.
    pub fn connect(config: MySqlConfig) -> Result<Self> {
        let stream = TcpStream::connect(config.socket_addr())?;
        stream.set_nodelay(true).ok();
        stream.set_read_timeout(Some(config.connect_timeout)).ok();
        stream.set_write_timeout(Some(config.connect_timeout)).ok();

        let mut conn = MySqlConnection { stream, state: ConnectionState::Authenticating, sequence: 0, config };

        let handshake = conn.read_handshake()?;
        conn.send_handshake_response(&handshake)?;
        conn.handle_auth_result()?;
        conn.state = ConnectionState::Ready;
        Ok(conn)
    }

    /// Mark the connection closed and release the socket. Per the spec's
    /// resource discipline, a closed connection is not resumable; the
    /// caller must reconnect.
    pub fn close(&mut self) {
        self.state = ConnectionState::Closed;
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    fn read_packet(&mut self) -> Result<Vec<u8>> {
        let frame = read_frame(&mut self.stream, FRAME)?;
        self.sequence = frame.sequence.wrapping_add(1);
        Ok(frame.body)
    }

    fn write_packet(&mut self, body: &[u8]) -> Result<()> {
        write_frame(&mut self.stream, FRAME, &Frame { opcode: None, sequence: self.sequence, body: body.to_vec() })?;
        self.stream.flush()?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(())
    }

    fn read_handshake(&mut self) -> Result<Handshake> {
        let payload = self.read_packet()?;
        let mut reader = PacketReader::new(&payload);

        let protocol_version = reader.read_u8().ok_or_else(|| Error::protocol("missing protocol version"))?;
        if protocol_version != 10 {
            return Err(Error::protocol(format!("unsupported handshake protocol version {protocol_version}")));
        }

        reader.read_null_string().ok_or_else(|| Error::protocol("missing server version"))?;
        reader.read_u32_le().ok_or_else(|| Error::protocol("missing connection id"))?;
        let auth_data_1 = reader.read_bytes(8).ok_or_else(|| Error::protocol("missing auth data part 1"))?.to_vec();
        reader.skip(1);
        let caps_lower = reader.read_u16_le().ok_or_else(|| Error::protocol("missing capability flags"))?;
        reader.read_u8(); // charset
        reader.read_u16_le(); // status flags
        let caps_upper = reader.read_u16_le().unwrap_or(0);
        let capabilities = u32::from(caps_lower) | (u32::from(caps_upper) << 16);

        let auth_data_len =
            if capabilities & capabilities::CLIENT_PLUGIN_AUTH != 0 { reader.read_u8().unwrap_or(0) as usize } else { 0 };
        reader.skip(10);

        let mut auth_data = auth_data_1;
        if capabilities & capabilities::CLIENT_SECURE_CONNECTION != 0 {
            let len2 = if auth_data_len > 8 { auth_data_len - 8 } else { 13 };
            if let Some(part2) = reader.read_bytes(len2) {
                let part2 = if part2.last() == Some(&0) { &part2[..part2.len() - 1] } else { part2 };
                auth_data.extend_from_slice(part2);
            }
        }

        let auth_plugin = if capabilities & capabilities::CLIENT_PLUGIN_AUTH != 0 {
            reader.read_null_string().unwrap_or_else(|| auth::plugins::MYSQL_NATIVE_PASSWORD.to_string())
        } else {
            auth::plugins::MYSQL_NATIVE_PASSWORD.to_string()
        };

        Ok(Handshake { auth_plugin, auth_data })
    }

    fn send_handshake_response(&mut self, handshake: &Handshake) -> Result<()> {
        let client_caps = self.config.capability_flags();
        let auth_response = compute_auth_response(&handshake.auth_plugin, self.config.password.as_deref().unwrap_or(""), &handshake.auth_data);

        let mut writer = PacketWriter::new();
        writer.write_u32_le(client_caps);
        writer.write_u32_le(self.config.max_packet_size);
        writer.write_u8(self.config.charset);
        writer.write_zeros(23);
        writer.write_null_string(&self.config.user);

        // CLIENT_SECURE_CONNECTION is always set: one length byte then the bytes.
        writer.write_u8(auth_response.len() as u8);
        writer.write_bytes(&auth_response);

        if client_caps & capabilities::CLIENT_CONNECT_WITH_DB != 0 {
            writer.write_null_string(self.config.database.as_deref().unwrap_or(""));
        }
        if client_caps & capabilities::CLIENT_PLUGIN_AUTH != 0 {
            writer.write_null_string(&handshake.auth_plugin);
        }

        self.write_packet(&writer.into_bytes())
    }

    fn handle_auth_result(&mut self) -> Result<()> {
        let payload = self.read_packet()?;
        let Some(&first) = payload.first() else {
            return Err(Error::protocol("empty authentication response"));
        };

        match first {
            0x00 => {
                parse_ok_packet(&payload)?;
                Ok(())
            }
            0xff => {
                let err = parse_err_packet(&payload)?;
                Err(Error::auth(format!("{} ({})", err.error_message, err.sql_state)))
            }
            0xfe => self.handle_auth_switch(&payload[1..]),
            _ => self.handle_additional_auth(&payload),
        }
    }

    fn handle_auth_switch(&mut self, data: &[u8]) -> Result<()> {
        let mut reader = PacketReader::new(data);
        let plugin = reader.read_null_string().ok_or_else(|| Error::protocol("missing plugin name in auth switch"))?;
        let auth_data = reader.read_rest();
        let response = compute_auth_response(&plugin, self.config.password.as_deref().unwrap_or(""), auth_data);
        self.write_packet(&response)?;
        self.handle_auth_result()
    }

    fn handle_additional_auth(&mut self, data: &[u8]) -> Result<()> {
        match data.first() {
            Some(&auth::caching_sha2::FAST_AUTH_SUCCESS) => {
                let payload = self.read_packet()?;
                parse_ok_packet(&payload)?;
                Ok(())
            }
            Some(&auth::caching_sha2::PERFORM_FULL_AUTH) => {
                Err(Error::Unsupported("caching_sha2_password full authentication requires TLS or RSA, neither negotiated here".to_string()))
            }
            _ => Err(Error::protocol("unrecognized authentication response")),
        }
    }

    /// Send `COM_QUERY` and return the first response packet's body.
    fn send_query(&mut self, sql: &str) -> Result<Vec<u8>> {
        self.sequence = 0;
        let mut writer = PacketWriter::new();
        writer.write_u8(command::QUERY);
        writer.write_bytes(sql.as_bytes());
        self.write_packet(&writer.into_bytes())?;
        self.read_packet()
    }

    fn execute(&mut self, sql: &str) -> Result<OkPacket> {
        let payload = self.send_query(sql)?;
        match payload.first() {
            Some(&0x00) => parse_ok_packet(&payload),
            Some(&0xff) => Err(query_error(&parse_err_packet(&payload)?)),
            _ => Err(Error::protocol("query() received a row-returning result set")),
        }
    }
}

struct Handshake {
    auth_plugin: String,
    auth_data: Vec<u8>,
}

fn compute_auth_response(plugin: &str, password: &str, auth_data: &[u8]) -> Vec<u8> {
    match plugin {
        auth::plugins::MYSQL_NATIVE_PASSWORD => auth::mysql_native_password(password, auth_data),
        auth::plugins::CACHING_SHA2_PASSWORD => auth::caching_sha2_password(password, auth_data),
        auth::plugins::MYSQL_CLEAR_PASSWORD => {
            let mut v = password.as_bytes().to_vec();
            v.push(0);
            v
        }
        _ => auth::mysql_native_password(password, auth_data),
    }
}

fn query_error(err: &crate::protocol::ErrPacket) -> Error {
    Error::Code(ErrorCode { backend: "mysql", code: err.error_code.to_string(), message: err.error_message.clone() })
}

impl Backend for MySqlConnection {
    /// Live-schema introspection via `INFORMATION_SCHEMA` is not
    /// implemented; reconciliation always treats the table as absent and
    /// issues `CREATE TABLE`.
    fn get_table_info(&mut self, _table: &str) -> Result<Option<HashMap<String, TableInfo>>> {
        Ok(None)
    }

    fn generate_field(&self, field: &FieldSpec) -> String {
        ddl::mysql::generate_field(field)
    }

    fn create_table(&mut self, table: &str, column_defs: &[String], primary_keys: &[String]) -> Result<()> {
        self.execute(&ddl::mysql::create_table_sql(table, column_defs, primary_keys)).map(|_| ())
    }

    fn alter_table_add_column(&mut self, table: &str, field: &FieldSpec) -> Result<()> {
        self.execute(&ddl::mysql::alter_add_column_sql(table, field)).map(|_| ())
    }

    fn alter_table_column(&mut self, table: &str, field: &FieldSpec, type_changed: bool, nullable_changed: bool) -> Result<()> {
        let sql = ddl::mysql::alter_column_sql(table, field, type_changed, nullable_changed);
        if sql.is_empty() {
            return Ok(());
        }
        self.execute(&sql).map(|_| ())
    }

    fn alter_table_drop_column(&mut self, table: &str, column: &str) -> Result<()> {
        self.execute(&ddl::mysql::alter_drop_column_sql(table, column)).map(|_| ())
    }

    fn drop_table(&mut self, table: &str, if_exists: bool) -> Result<()> {
        self.execute(&ddl::mysql::drop_table_sql(table, if_exists)).map(|_| ())
    }

    /// Builds a plain `INSERT INTO (...) VALUES (...)` from the pre-rendered
    /// literal texts and derives any requested primary-key value from the
    /// `OK` packet's `last_insert_id` bookkeeping — no arbitrary result-set
    /// decoding is needed for this path.
    fn insert_into(&mut self, table: &str, names: &[String], values: &[String], primary_keys: &[String]) -> Result<Option<ResultSet>> {
        let quoted_table = ddl::quote_identifier(table, '`');
        let columns = names.iter().map(|n| ddl::quote_identifier(n, '`')).collect::<Vec<_>>().join(", ");
        let sql = format!("INSERT INTO {quoted_table} ({columns}) VALUES ({})", values.join(", "));
        let ok = self.execute(&sql)?;

        if primary_keys.is_empty() || ok.last_insert_id == 0 {
            return Ok(None);
        }

        let mut columns = HashMap::new();
        for (i, key) in primary_keys.iter().enumerate() {
            columns.insert(key.clone(), i);
        }
        let row = vec![shark_core::Cell::Long(ok.last_insert_id as i64); primary_keys.len()];
        Ok(Some(ResultSet::new(columns, vec![row])))
    }

    fn query(&mut self, sql: &str) -> Result<()> {
        self.execute(sql).map(|_| ())
    }

    /// Decoding an arbitrary MySQL text-protocol result set (column
    /// definitions plus per-row length-encoded values) into `Cell`s is not
    /// implemented.
    fn query_select(&mut self, _sql: &str) -> Result<ResultSet> {
        Err(Error::Unsupported("MySQL result-set decoding is not implemented".to_string()))
    }

    fn random_function(&self) -> &'static str {
        "rand()"
    }

    fn escape_binary(&self, bytes: &[u8]) -> String {
        crate::protocol::escape_binary_hex(bytes)
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn close(&mut self) {
        MySqlConnection::close(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_auth_response_defaults_unknown_plugin_to_native() {
        let seed = [0u8; 20];
        assert_eq!(compute_auth_response("unknown_plugin", "secret", &seed), auth::mysql_native_password("secret", &seed));
    }

    #[test]
    fn clear_password_response_is_password_plus_nul() {
        let response = compute_auth_response(auth::plugins::MYSQL_CLEAR_PASSWORD, "hunter2", &[]);
        assert_eq!(response, b"hunter2\0");
    }

    #[test]
    fn query_error_wraps_packet_as_backend_code() {
        let err = crate::protocol::ErrPacket { error_code: 1146, sql_state: "42S02".to_string(), error_message: "Table doesn't exist".to_string() };
        let wrapped = query_error(&err);
        assert!(matches!(wrapped, Error::Code(ErrorCode { backend: "mysql", .. })));
    }
}
