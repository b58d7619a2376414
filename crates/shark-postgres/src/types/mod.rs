//! PostgreSQL type OIDs and text-format decoding.
//!
//! The thirteen OIDs this backend speaks (see [`oid`]), and the decode
//! dispatch that turns a `DataRow` column's raw text into a [`shark_core::Cell`]
//! (see [`decode`]).

pub mod decode;
pub mod oid;

pub use decode::decode_cell;
