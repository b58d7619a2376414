//! MySQL wire protocol backend for `shark`: handshake v10, authentication
//! (`mysql_native_password`/`caching_sha2_password`), and `COM_QUERY` over
//! the text protocol. Implements [`shark_core::Backend`].

pub mod auth;
pub mod config;
pub mod connection;
pub mod protocol;

pub use config::MySqlConfig;
pub use connection::{ConnectionState, MySqlConnection};
