//! The `derive(Entity)` proc-macro: reflects a struct's fields into
//! `shark_core::FieldSpec`s and implements `Bind`/`Entity` for it.
//!
//! # Attributes
//!
//! - `#[shark(table = "name")]` (struct) — override the default table name
//! - `#[shark(column = "name")]` (field) — override the default column name
//! - `#[shark(primary_key)]`, `#[shark(auto_increment)]`, `#[shark(unique)]`
//! - `#[shark(not_null)]` — forbidden on `Option<T>` fields; implied by a
//!   bare (non-`Option`) type
//! - `#[shark(length = N)]`, `#[shark(default = "expr")]`
//! - `#[shark(kind = "Clob"|"Blob"|"Date"|"DateTime"|"Time")]` — disambiguate
//!   a `String`/`Vec<u8>` field that maps to one of the closed type set's
//!   non-default variants
//!
//! ```ignore
//! use shark_macros::Entity;
//!
//! #[derive(Entity)]
//! #[shark(table = "widgets")]
//! struct Widget {
//!     #[shark(primary_key, auto_increment)]
//!     id: Option<i32>,
//!     #[shark(unique, length = 64)]
//!     name: String,
//!     created_at: Option<String>,
//! }
//! ```

mod generate;
mod kind;
mod parse;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

#[proc_macro_derive(Entity, attributes(shark))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let def = match parse::parse_entity(&input) {
        Ok(def) => def,
        Err(err) => return err.to_compile_error().into(),
    };
    generate::generate(&def).into()
}
