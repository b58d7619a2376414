//! PostgreSQL backend: the v3 wire protocol implemented directly over
//! `std::net::TcpStream`, no async runtime, no connection pooling, no TLS.
//!
//! - `auth` — MD5 password hashing
//! - `config` — connection parameters
//! - `connection` — startup, authentication, simple and extended query
//!   protocols, and the [`shark_core::Backend`] implementation
//! - `protocol` — message framing constants and the reader/writer used by
//!   every message body
//! - `types` — the thirteen type OIDs this backend speaks and their
//!   text-format decoding
//!
//! # Example
//!
//! ```rust,ignore
//! use shark_postgres::{PgConfig, PgConnection};
//!
//! let config = PgConfig::new("localhost", "postgres", "mydb").password("secret");
//! let conn = PgConnection::connect(config)?;
//! ```

pub mod auth;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod types;

pub use config::PgConfig;
pub use connection::{ConnectionState, PgConnection};
pub use types::oid;
