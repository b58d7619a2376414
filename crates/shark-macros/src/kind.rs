//! Mapping between a field's Rust type (plus an optional explicit
//! override) and the closed logical type set `shark-core` exposes as
//! `TypeFlag`/`Cell`.
//!
//! Most Rust primitives have an unambiguous `Cell` variant already wired
//! up via `From`/`TryFrom` in `shark-core::cell`. `String` and `Vec<u8>`
//! are ambiguous — each backs two logical types (`String`/`Clob`,
//! `Binary`/`Blob`) plus, for `String`, the three textual temporal types —
//! so those need the `#[shark(kind = "...")]` override to disambiguate.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Stringy,
    Binary,
    Clob,
    Blob,
    Date,
    DateTime,
    Time,
}

impl ColumnKind {
    /// Infer from the bare (Option-unwrapped) Rust type name, falling back
    /// to an explicit `kind` override for the ambiguous storage types.
    pub fn resolve(rust_type: &str, kind_attr: Option<&str>) -> syn::Result<Self> {
        if let Some(k) = kind_attr {
            return match (rust_type, k) {
                ("String", "String") => Ok(ColumnKind::Stringy),
                ("String", "Clob") => Ok(ColumnKind::Clob),
                ("String", "Date") => Ok(ColumnKind::Date),
                ("String", "DateTime") => Ok(ColumnKind::DateTime),
                ("String", "Time") => Ok(ColumnKind::Time),
                ("Vec<u8>", "Binary") => Ok(ColumnKind::Binary),
                ("Vec<u8>", "Blob") => Ok(ColumnKind::Blob),
                _ => Err(Error::new(
                    Span::call_site(),
                    format!("kind = \"{k}\" is not valid for a field of type {rust_type}"),
                )),
            };
        }

        match rust_type {
            "bool" => Ok(ColumnKind::Bool),
            "i8" => Ok(ColumnKind::Byte),
            "i16" => Ok(ColumnKind::Short),
            "i32" => Ok(ColumnKind::Int),
            "i64" => Ok(ColumnKind::Long),
            "f32" => Ok(ColumnKind::Float),
            "f64" => Ok(ColumnKind::Double),
            "char" => Ok(ColumnKind::Char),
            "String" => Ok(ColumnKind::Stringy),
            "Vec<u8>" => Ok(ColumnKind::Binary),
            other => Err(Error::new(
                Span::call_site(),
                format!(
                    "unsupported field type `{other}`; use one of bool, i8, i16, i32, i64, f32, \
                     f64, char, String, Vec<u8> (optionally with a `kind` override for Clob, \
                     Blob, Date, DateTime, Time)"
                ),
            )),
        }
    }

    pub fn type_flag_tokens(self) -> TokenStream {
        let ident = match self {
            ColumnKind::Bool => quote!(BOOL),
            ColumnKind::Byte => quote!(BYTE),
            ColumnKind::Short => quote!(SHORT),
            ColumnKind::Int => quote!(INT),
            ColumnKind::Long => quote!(LONG),
            ColumnKind::Float => quote!(FLOAT),
            ColumnKind::Double => quote!(DOUBLE),
            ColumnKind::Char => quote!(CHAR),
            ColumnKind::Stringy => quote!(STRING),
            ColumnKind::Binary => quote!(BINARY),
            ColumnKind::Clob => quote!(CLOB),
            ColumnKind::Blob => quote!(BLOB),
            ColumnKind::Date => quote!(DATE),
            ColumnKind::DateTime => quote!(DATE_TIME),
            ColumnKind::Time => quote!(TIME),
        };
        quote! { shark_core::TypeFlag::#ident }
    }

    /// Whether this kind has a direct `From`/`TryFrom<Cell>` impl in
    /// `shark-core` (the primitives), versus needing an explicit variant
    /// match (the ambiguous storage types).
    fn is_direct(self) -> bool {
        !matches!(
            self,
            ColumnKind::Clob | ColumnKind::Blob | ColumnKind::Date | ColumnKind::DateTime | ColumnKind::Time
        )
    }

    /// Build a `shark_core::Cell` from an owned value expression.
    pub fn to_cell(self, value: &TokenStream) -> TokenStream {
        if self.is_direct() {
            quote! { shark_core::Cell::from(#value) }
        } else {
            let variant = match self {
                ColumnKind::Clob => quote!(Clob),
                ColumnKind::Blob => quote!(Blob),
                ColumnKind::Date => quote!(Date),
                ColumnKind::DateTime => quote!(DateTime),
                ColumnKind::Time => quote!(Time),
                _ => unreachable!(),
            };
            quote! { shark_core::Cell::#variant(#value) }
        }
    }

    /// Extract this field's Rust value out of an owned `Cell` expression,
    /// as a `Result<T, shark_core::Error>`-typed expression.
    pub fn from_cell(self, cell: &TokenStream, column_name: &str) -> TokenStream {
        if self.is_direct() {
            quote! { ::std::convert::TryFrom::try_from(#cell) }
        } else {
            // `Clob`/`Blob` share a wire shape with plain `String`/`Binary`
            // (a backend decoding a text or bytea column has no way to know
            // which one the entity declared), so both sides of each pair
            // bind interchangeably.
            let (pattern, expected, rust_type) = match self {
                ColumnKind::Clob => (quote!(shark_core::Cell::Clob(v) | shark_core::Cell::String(v)), "Clob", "String"),
                ColumnKind::Blob => (quote!(shark_core::Cell::Blob(v) | shark_core::Cell::Binary(v)), "Blob", "Vec<u8>"),
                ColumnKind::Date => (quote!(shark_core::Cell::Date(v)), "Date", "String"),
                ColumnKind::DateTime => (quote!(shark_core::Cell::DateTime(v)), "DateTime", "String"),
                ColumnKind::Time => (quote!(shark_core::Cell::Time(v)), "Time", "String"),
                _ => unreachable!(),
            };
            quote! {
                match #cell {
                    #pattern => Ok(v),
                    other => Err(shark_core::Error::Type(shark_core::error::TypeError {
                        expected: #expected,
                        actual: other
                            .type_flag()
                            .map(shark_core::TypeFlag::name)
                            .unwrap_or("NULL")
                            .to_string(),
                        column: Some(#column_name.to_string()),
                        rust_type: Some(#rust_type),
                    })),
                }
            }
        }
    }
}
