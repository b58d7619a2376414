//! PostgreSQL wire protocol connection: startup, MD5/cleartext
//! authentication, simple and extended query protocols, typed column
//! decoding, and `ReadyForQuery` synchronization. Implements [`Backend`].

use std::collections::HashMap;
use std::io::Write;
use std::net::TcpStream;

use tracing::{debug, warn};

use shark_core::error::ErrorCode;
use shark_core::framed::{Frame, FrameConfig, read_frame, write_frame};
use shark_core::{Backend, Cell, Error, FieldSpec, Result, ResultSet, TableInfo};
use shark_schema::ddl;

use crate::auth::md5_password;
use crate::config::PgConfig;
use crate::protocol::{
    FORMAT_TEXT, MessageReader, MessageWriter, NULL_LENGTH, auth_method, backend_tag, error_code_from_fields, field_code,
    frontend_tag, parse_fields,
};
use crate::types::decode::decode_cell;
use crate::types::oid;

const FRAME: FrameConfig = FrameConfig::postgres();
const PROTOCOL_VERSION: i32 = 0x0003_0000;
const TABLE_INFO_STATEMENT: &str = "_shark_table_info";
const TABLE_INFO_SQL: &str = "select column_name, data_type, is_nullable, character_maximum_length, column_default from INFORMATION_SCHEMA.COLUMNS where table_name=$1;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authenticating,
    Ready,
    Closed,
}

/// A PostgreSQL connection implementing the `shark` [`Backend`] trait.
/// Owns one `TcpStream`; not safe to share across threads.
pub struct PgConnection {
    stream: TcpStream,
    state: ConnectionState,
}

impl std::fmt::Debug for PgConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnection").field("state", &self.state).finish_non_exhaustive()
    }
}

impl PgConnection {
    /// Connect, run the startup/auth handshake to `ReadyForQuery`, and
    /// prepare the long-lived `getTableInfo` statement.
    pub fn connect(config: PgConfig) -> Result<Self> {
        let stream = TcpStream::connect(config.socket_addr()).map_err(|e| Error::connect(e.to_string()))?;
        stream.set_nodelay(true).ok();
        stream.set_read_timeout(Some(config.connect_timeout)).ok();
        stream.set_write_timeout(Some(config.connect_timeout)).ok();

        let mut conn = PgConnection { stream, state: ConnectionState::Connecting };
        conn.send_startup(&config)?;
        conn.state = ConnectionState::Authenticating;
        conn.authenticate(&config)?;
        conn.await_ready_for_query()?;
        conn.state = ConnectionState::Ready;
        conn.prepare_table_info_statement()?;
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

    fn read_message(&mut self) -> Result<Frame> {
        read_frame(&mut self.stream, FRAME)
    }

    fn write_message(&mut self, tag: u8, body: Vec<u8>) -> Result<()> {
        write_frame(&mut self.stream, FRAME, &Frame { opcode: Some(tag), sequence: 0, body })?;
        self.stream.flush()?;
        Ok(())
    }

    /// `StartupMessage` has no leading opcode byte, unlike every message
    /// that follows it, so it is framed by hand rather than through
    /// `write_message`.
    fn send_startup(&mut self, config: &PgConfig) -> Result<()> {
        let mut body = Vec::new();
        body.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
        for (key, value) in config.startup_params() {
            body.extend_from_slice(key.as_bytes());
            body.push(0);
            body.extend_from_slice(value.as_bytes());
            body.push(0);
        }
        body.push(0);

        let mut packet = Vec::with_capacity(body.len() + 4);
        packet.extend_from_slice(&(body.len() as u32 + 4).to_be_bytes());
        packet.extend_from_slice(&body);
        self.stream.write_all(&packet)?;
        self.stream.flush()?;
        Ok(())
    }

    fn authenticate(&mut self, config: &PgConfig) -> Result<()> {
        loop {
            let frame = self.read_message()?;
            match frame.opcode {
                Some(backend_tag::AUTHENTICATION) => {
                    let mut reader = MessageReader::new(&frame.body);
                    let method = reader.read_i32().ok_or_else(|| Error::protocol("missing authentication method"))?;
                    match method {
                        auth_method::OK => return Ok(()),
                        auth_method::CLEARTEXT_PASSWORD => {
                            self.send_password(config.password.as_deref().unwrap_or(""))?;
                        }
                        auth_method::MD5_PASSWORD => {
                            let salt_bytes = reader.read_bytes(4).ok_or_else(|| Error::protocol("missing md5 salt"))?;
                            let salt: [u8; 4] = salt_bytes.try_into().map_err(|_| Error::protocol("malformed md5 salt"))?;
                            let password = config.password.as_deref().unwrap_or("");
                            let hashed = md5_password(&config.user, password, &salt);
                            self.send_password(&hashed)?;
                        }
                        other => return Err(Error::protocol(format!("unsupported authentication method {other}"))),
                    }
                }
                Some(backend_tag::ERROR_RESPONSE) => return Err(self.collect_error_and_drain(&frame.body)?),
                Some(other) => {
                    return Err(Error::WrongPacketSequence { expected: backend_tag::AUTHENTICATION, got: other });
                }
                None => return Err(Error::protocol("missing message opcode")),
            }
        }
    }

    fn send_password(&mut self, password: &str) -> Result<()> {
        let mut writer = MessageWriter::new();
        writer.write_cstring(password);
        self.write_message(frontend_tag::PASSWORD_MESSAGE, writer.into_bytes())
    }

    fn await_ready_for_query(&mut self) -> Result<()> {
        loop {
            let frame = self.read_message()?;
            match frame.opcode {
                Some(backend_tag::PARAMETER_STATUS) | Some(backend_tag::BACKEND_KEY_DATA) => continue,
                Some(backend_tag::NOTICE_RESPONSE) => {
                    self.log_notice(&frame.body);
                }
                Some(backend_tag::READY_FOR_QUERY) => return Ok(()),
                Some(backend_tag::ERROR_RESPONSE) => return Err(self.collect_error_and_drain(&frame.body)?),
                Some(other) => return Err(Error::WrongPacketSequence { expected: backend_tag::READY_FOR_QUERY, got: other }),
                None => return Err(Error::protocol("missing message opcode")),
            }
        }
    }

    fn prepare_table_info_statement(&mut self) -> Result<()> {
        let mut writer = MessageWriter::new();
        writer.write_cstring(TABLE_INFO_STATEMENT);
        writer.write_cstring(TABLE_INFO_SQL);
        writer.write_i16(1);
        writer.write_u32(oid::VARCHAR);
        self.write_message(frontend_tag::PARSE, writer.into_bytes())?;
        self.write_message(frontend_tag::FLUSH, Vec::new())?;

        let frame = self.read_message()?;
        match frame.opcode {
            Some(backend_tag::PARSE_COMPLETE) => Ok(()),
            Some(backend_tag::ERROR_RESPONSE) => Err(self.collect_error_and_drain(&frame.body)?),
            Some(other) => Err(Error::WrongPacketSequence { expected: backend_tag::PARSE_COMPLETE, got: other }),
            None => Err(Error::protocol("missing message opcode")),
        }
    }

    fn send_simple_query(&mut self, sql: &str) -> Result<()> {
        let mut writer = MessageWriter::new();
        writer.write_cstring(sql);
        self.write_message(frontend_tag::QUERY, writer.into_bytes())
    }

    /// Consume responses to a no-row statement (DDL, insert/update/delete
    /// without `RETURNING`) through the trailing `ReadyForQuery`. A
    /// multi-statement simple query (e.g. `alter_table_column`'s combined
    /// type-change + nullability statements) yields several
    /// `CommandComplete`s before the single `Z`.
    fn drain_to_ready(&mut self) -> Result<()> {
        loop {
            let frame = self.read_message()?;
            match frame.opcode {
                Some(backend_tag::COMMAND_COMPLETE) | Some(backend_tag::EMPTY_QUERY_RESPONSE) => continue,
                Some(backend_tag::NOTICE_RESPONSE) => self.log_notice(&frame.body),
                Some(backend_tag::ERROR_RESPONSE) => return Err(self.collect_error_and_drain(&frame.body)?),
                Some(backend_tag::READY_FOR_QUERY) => return Ok(()),
                Some(other) => return Err(Error::WrongPacketSequence { expected: backend_tag::READY_FOR_QUERY, got: other }),
                None => return Err(Error::protocol("missing message opcode")),
            }
        }
    }

    /// Consume responses to a row-returning statement through the
    /// trailing `ReadyForQuery`. A `CommandComplete` with no preceding
    /// `RowDescription` leaves `columns`/rows empty, matching "first
    /// response is `C`: return empty".
    fn drain_rows_to_ready(&mut self) -> Result<ResultSet> {
        let mut columns = HashMap::new();
        let mut column_oids = Vec::new();
        let mut rows = Vec::new();

        loop {
            let frame = self.read_message()?;
            match frame.opcode {
                Some(backend_tag::ROW_DESCRIPTION) => {
                    let (cols, oids) = parse_row_description(&frame.body)?;
                    columns = cols;
                    column_oids = oids;
                }
                Some(backend_tag::DATA_ROW) => rows.push(decode_data_row(&frame.body, &column_oids)?),
                Some(backend_tag::COMMAND_COMPLETE) | Some(backend_tag::EMPTY_QUERY_RESPONSE) => continue,
                Some(backend_tag::NOTICE_RESPONSE) => self.log_notice(&frame.body),
                Some(backend_tag::ERROR_RESPONSE) => return Err(self.collect_error_and_drain(&frame.body)?),
                Some(backend_tag::READY_FOR_QUERY) => return Ok(ResultSet::new(columns, rows)),
                Some(other) => return Err(Error::WrongPacketSequence { expected: backend_tag::READY_FOR_QUERY, got: other }),
                None => return Err(Error::protocol("missing message opcode")),
            }
        }
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.send_simple_query(sql)?;
        self.drain_to_ready()
    }

    fn execute_select(&mut self, sql: &str) -> Result<ResultSet> {
        self.send_simple_query(sql)?;
        self.drain_rows_to_ready()
    }

    /// Extended-query path for `getTableInfo`: bind the lazily-prepared
    /// `_shark_table_info` statement, execute, sync, and parse the
    /// resulting rows the same way a simple-query select would.
    fn fetch_table_info(&mut self, table: &str) -> Result<HashMap<String, TableInfo>> {
        let mut bind = MessageWriter::new();
        bind.write_cstring("");
        bind.write_cstring(TABLE_INFO_STATEMENT);
        bind.write_i16(1);
        bind.write_i16(FORMAT_TEXT);
        bind.write_i16(1);
        bind.write_sized_value(Some(table.as_bytes()));
        bind.write_i16(1);
        bind.write_i16(FORMAT_TEXT);
        self.write_message(frontend_tag::BIND, bind.into_bytes())?;

        let mut execute = MessageWriter::new();
        execute.write_cstring("");
        execute.write_i32(0);
        self.write_message(frontend_tag::EXECUTE, execute.into_bytes())?;

        self.write_message(frontend_tag::SYNC, Vec::new())?;

        let frame = self.read_message()?;
        match frame.opcode {
            Some(backend_tag::BIND_COMPLETE) => {}
            Some(backend_tag::ERROR_RESPONSE) => return Err(self.collect_error_and_drain(&frame.body)?),
            Some(other) => return Err(Error::WrongPacketSequence { expected: backend_tag::BIND_COMPLETE, got: other }),
            None => return Err(Error::protocol("missing message opcode")),
        }

        let result = self.drain_rows_to_ready()?;
        rows_to_table_info(&result)
    }

    /// Parse an `ErrorResponse`/`NoticeResponse` body this connection just
    /// saw into one `ErrorCode`, then drain remaining packets up to the
    /// next `ReadyForQuery`, logging how many were discarded.
    fn collect_error_and_drain(&mut self, first_body: &[u8]) -> Result<Error> {
        let mut errors = vec![error_code_from_fields(&parse_fields(first_body)?)];
        let mut discarded = 0u32;
        loop {
            let frame = self.read_message()?;
            match frame.opcode {
                Some(backend_tag::READY_FOR_QUERY) => break,
                Some(backend_tag::ERROR_RESPONSE) => errors.push(error_code_from_fields(&parse_fields(&frame.body)?)),
                Some(backend_tag::NOTICE_RESPONSE) => self.log_notice(&frame.body),
                Some(_) => discarded += 1,
                None => return Err(Error::protocol("missing message opcode")),
            }
        }
        if discarded > 0 {
            warn!(discarded, "drained stale packets after error");
        }
        Ok(if errors.len() == 1 { Error::Code(errors.remove(0)) } else { Error::Codes(errors) })
    }

    fn log_notice(&self, body: &[u8]) {
        if let Ok(fields) = parse_fields(body) {
            let message = fields.get(&field_code::MESSAGE).cloned().unwrap_or_default();
            debug!(message, "received NOTICE from server");
        }
    }
}

fn parse_row_description(body: &[u8]) -> Result<(HashMap<String, usize>, Vec<u32>)> {
    let mut reader = MessageReader::new(body);
    let field_count = reader.read_i16().ok_or_else(|| Error::protocol("missing row description field count"))?;
    let mut columns = HashMap::new();
    let mut oids = Vec::with_capacity(field_count.max(0) as usize);
    for i in 0..field_count {
        let name = reader.read_cstring()?;
        reader.read_bytes(6).ok_or_else(|| Error::protocol("truncated row description field"))?;
        let type_oid = reader.read_u32().ok_or_else(|| Error::protocol("missing column type OID"))?;
        reader.read_bytes(8).ok_or_else(|| Error::protocol("truncated row description field"))?;
        columns.insert(name, i as usize);
        oids.push(type_oid);
    }
    Ok((columns, oids))
}

fn decode_data_row(body: &[u8], column_oids: &[u32]) -> Result<Vec<Cell>> {
    let mut reader = MessageReader::new(body);
    let count = reader.read_i16().ok_or_else(|| Error::protocol("missing data row column count"))?;
    let mut cells = Vec::with_capacity(count.max(0) as usize);
    for i in 0..count as usize {
        let len = reader.read_i32().ok_or_else(|| Error::protocol("missing column length"))?;
        let data = if len == NULL_LENGTH {
            None
        } else {
            Some(reader.read_bytes(len as usize).ok_or_else(|| Error::protocol("truncated column data"))?)
        };
        let type_oid = column_oids.get(i).copied().unwrap_or(oid::TEXT);
        cells.push(decode_cell(type_oid, data)?);
    }
    Ok(cells)
}

fn cell_as_text(cell: &Cell) -> Result<&str> {
    match cell {
        Cell::String(s) | Cell::Clob(s) => Ok(s.as_str()),
        other => Err(Error::protocol(format!("expected a text column, got {other:?}"))),
    }
}

/// Map `_shark_table_info`'s five projected columns onto `TableInfo`
/// values, keyed by `column_name`. An empty result means the table does
/// not exist.
fn rows_to_table_info(result: &ResultSet) -> Result<HashMap<String, TableInfo>> {
    let index_of = |name: &str| -> Result<usize> {
        result.columns.get(name).copied().ok_or_else(|| Error::protocol(format!("missing {name} in table info result")))
    };
    let name_i = index_of("column_name")?;
    let type_i = index_of("data_type")?;
    let nullable_i = index_of("is_nullable")?;
    let length_i = index_of("character_maximum_length")?;
    let default_i = index_of("column_default")?;

    let mut info = HashMap::new();
    for row in &result.rows {
        let name = cell_as_text(&row[name_i])?.to_string();
        let data_type = cell_as_text(&row[type_i])?;
        let nullable = cell_as_text(&row[nullable_i])? == "YES";
        let length = match &row[length_i] {
            Cell::Null => 0,
            Cell::Int(n) => (*n).max(0) as usize,
            other => return Err(Error::protocol(format!("unexpected character_maximum_length value {other:?}"))),
        };
        let default_value = match &row[default_i] {
            Cell::Null => None,
            c => Some(c.to_literal_text()),
        };
        info.insert(
            name.clone(),
            TableInfo { name, type_flag: oid::type_flag_for_data_type(data_type), length, nullable, default_value },
        );
    }
    Ok(info)
}

impl Backend for PgConnection {
    fn get_table_info(&mut self, table: &str) -> Result<Option<HashMap<String, TableInfo>>> {
        let info = self.fetch_table_info(table)?;
        if info.is_empty() { Ok(None) } else { Ok(Some(info)) }
    }

    fn generate_field(&self, field: &FieldSpec) -> String {
        ddl::postgres::generate_field(field)
    }

    fn create_table(&mut self, table: &str, column_defs: &[String], primary_keys: &[String]) -> Result<()> {
        self.execute(&ddl::postgres::create_table_sql(table, column_defs, primary_keys))
    }

    fn alter_table_add_column(&mut self, table: &str, field: &FieldSpec) -> Result<()> {
        self.execute(&ddl::postgres::alter_add_column_sql(table, field))
    }

    fn alter_table_column(&mut self, table: &str, field: &FieldSpec, type_changed: bool, nullable_changed: bool) -> Result<()> {
        let sql = ddl::postgres::alter_column_sql(table, field, type_changed, nullable_changed);
        if sql.is_empty() { Ok(()) } else { self.execute(&sql) }
    }

    fn alter_table_drop_column(&mut self, table: &str, column: &str) -> Result<()> {
        self.execute(&ddl::postgres::alter_drop_column_sql(table, column))
    }

    fn drop_table(&mut self, table: &str, if_exists: bool) -> Result<()> {
        self.execute(&ddl::postgres::drop_table_sql(table, if_exists))
    }

    /// Appends `RETURNING pk1, pk2, ...` when `primary_keys` is non-empty
    /// and runs the row-returning path so the single returned row can be
    /// applied back onto the entity.
    fn insert_into(&mut self, table: &str, names: &[String], values: &[String], primary_keys: &[String]) -> Result<Option<ResultSet>> {
        let quoted_table = ddl::quote_identifier(table, '"');
        let columns = names.iter().map(|n| ddl::quote_identifier(n, '"')).collect::<Vec<_>>().join(", ");
        let mut sql = format!("INSERT INTO {quoted_table} ({columns}) VALUES ({})", values.join(", "));

        if primary_keys.is_empty() {
            self.execute(&sql)?;
            return Ok(None);
        }

        let returning = primary_keys.iter().map(|k| ddl::quote_identifier(k, '"')).collect::<Vec<_>>().join(", ");
        sql.push_str(" RETURNING ");
        sql.push_str(&returning);
        Ok(Some(self.execute_select(&sql)?))
    }

    fn query(&mut self, sql: &str) -> Result<()> {
        self.execute(sql)
    }

    fn query_select(&mut self, sql: &str) -> Result<ResultSet> {
        self.execute_select(sql)
    }

    fn random_function(&self) -> &'static str {
        "random()"
    }

    fn escape_binary(&self, bytes: &[u8]) -> String {
        format!("'\\x{}'", bytes.iter().map(|b| format!("{b:02X}")).collect::<String>())
    }

    fn close(&mut self) {
        PgConnection::close(self);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_description_skips_table_oid_attnum_then_reads_type_oid() {
        let mut body = Vec::new();
        body.extend_from_slice(&1i16.to_be_bytes());
        body.extend_from_slice(b"id\0");
        body.extend_from_slice(&[0u8; 6]);
        body.extend_from_slice(&oid::INT4.to_be_bytes());
        body.extend_from_slice(&[0u8; 8]);

        let (columns, oids) = parse_row_description(&body).unwrap();
        assert_eq!(columns.get("id"), Some(&0));
        assert_eq!(oids, vec![oid::INT4]);
    }

    #[test]
    fn data_row_null_sentinel_decodes_to_cell_null() {
        let mut body = Vec::new();
        body.extend_from_slice(&1i16.to_be_bytes());
        body.extend_from_slice(&NULL_LENGTH.to_be_bytes());

        let cells = decode_data_row(&body, &[oid::TEXT]).unwrap();
        assert_eq!(cells, vec![Cell::Null]);
    }

    #[test]
    fn data_row_decodes_text_value_by_column_oid() {
        let mut body = Vec::new();
        body.extend_from_slice(&1i16.to_be_bytes());
        body.extend_from_slice(&5i32.to_be_bytes());
        body.extend_from_slice(b"hello");

        let cells = decode_data_row(&body, &[oid::TEXT]).unwrap();
        assert_eq!(cells, vec![Cell::String("hello".to_string())]);
    }

    #[test]
    fn rows_to_table_info_maps_five_projected_columns() {
        let mut columns = HashMap::new();
        columns.insert("column_name".to_string(), 0);
        columns.insert("data_type".to_string(), 1);
        columns.insert("is_nullable".to_string(), 2);
        columns.insert("character_maximum_length".to_string(), 3);
        columns.insert("column_default".to_string(), 4);
        let rows = vec![vec![
            Cell::String("name".to_string()),
            Cell::String("character varying".to_string()),
            Cell::String("YES".to_string()),
            Cell::Int(64),
            Cell::Null,
        ]];
        let result = ResultSet::new(columns, rows);
        let info = rows_to_table_info(&result).unwrap();
        let name_info = info.get("name").unwrap();
        assert!(name_info.nullable);
        assert_eq!(name_info.length, 64);
        assert!(name_info.type_flag.intersects(shark_core::TypeFlag::STRING));
    }

    #[test]
    fn empty_result_yields_empty_table_info_map() {
        let info = rows_to_table_info(&ResultSet::empty()).unwrap();
        assert!(info.is_empty());
    }
}
