//! The error taxonomy.

use std::fmt;

/// The top-level error type produced by any shark operation.
#[derive(Debug)]
pub enum Error {
    /// Generic, user-visible failure not tied to the wire or a backend code
    /// (escape failure, bind type mismatch, malformed clause).
    Database(String),
    /// Unexpected/malformed packet, protocol mismatch, authentication
    /// failure, or a closed socket.
    Connection(ConnectionError),
    /// A single backend-coded failure (PostgreSQL: field-tagged `E`
    /// message; MySQL: numeric ERR code).
    Code(ErrorCode),
    /// Multiple backend-coded failures joined together (PostgreSQL errors
    /// may carry several fields at once).
    Codes(Vec<ErrorCode>),
    /// A result cell could not be cast to the field's declared type.
    Type(TypeError),
    /// The reader expected one opcode byte and received another.
    WrongPacketSequence { expected: u8, got: u8 },
    /// A capability the active backend does not implement for this spec
    /// (the MySQL stubs that only cover the ERR path).
    Unsupported(String),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    Connect,
    Closed,
    Io,
    Auth,
    Protocol,
}

/// One backend-coded error: a name (`"postgresql"`/`"mysql"`), a
/// backend-specific code, and a human message. Displays as `(name-code)
/// message`.
#[derive(Debug, Clone)]
pub struct ErrorCode {
    pub backend: &'static str,
    pub code: String,
    pub message: String,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}-{}) {}", self.backend, self.code, self.message)
    }
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
    pub rust_type: Option<&'static str>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database(msg) => write!(f, "{msg}"),
            Error::Connection(e) => write!(f, "connection error: {}", e.message),
            Error::Code(e) => write!(f, "{e}"),
            Error::Codes(errs) => {
                let joined = errs
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{joined}")
            }
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "type mismatch in column '{}': expected {}, got {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "type mismatch: expected {}, got {}", e.expected, e.actual)
                }
            }
            Error::WrongPacketSequence { expected, got } => write!(
                f,
                "wrong packet sequence: expected opcode {expected:#04x}, got {got:#04x}"
            ),
            Error::Unsupported(what) => write!(f, "unsupported: {what}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    #[must_use]
    pub fn connect(message: impl Into<String>) -> Self {
        Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Connect,
            message: message.into(),
        })
    }

    #[must_use]
    pub fn closed() -> Self {
        Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Closed,
            message: "connection closed by peer".to_string(),
        })
    }

    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Auth,
            message: message.into(),
        })
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Protocol,
            message: message.into(),
        })
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::closed()
        } else {
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Io,
                message: e.to_string(),
            })
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_renders_name_dash_code() {
        let e = ErrorCode {
            backend: "postgresql",
            code: "23505".to_string(),
            message: "duplicate key value".to_string(),
        }
        .to_string();
        assert_eq!(e, "(postgresql-23505) duplicate key value");
    }

    #[test]
    fn aggregate_joins_with_comma_space() {
        let err = Error::Codes(vec![
            ErrorCode { backend: "postgresql", code: "23505".into(), message: "dup".into() },
            ErrorCode { backend: "postgresql", code: "42601".into(), message: "syntax".into() },
        ]);
        assert_eq!(
            err.to_string(),
            "(postgresql-23505) dup, (postgresql-42601) syntax"
        );
    }

    #[test]
    fn zero_byte_read_maps_to_closed() {
        let io = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        let err: Error = io.into();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError { kind: ConnectionErrorKind::Closed, .. })
        ));
    }
}
