//! Code generation: turns an [`EntityDef`] into `impl Bind`/`impl Entity`.

use proc_macro2::TokenStream;
use quote::quote;

use crate::parse::EntityDef;

pub fn generate(def: &EntityDef) -> TokenStream {
    let name = &def.name;
    let table_name = &def.table_name;

    let field_spec_entries: Vec<TokenStream> = def
        .fields
        .iter()
        .map(|f| {
            let column = &f.column_name;
            let type_flag = f.kind.type_flag_tokens();
            let nullable = f.nullable;
            let unique = f.unique;
            let auto_increment = f.auto_increment;
            let length = f.length;
            let default_value = match &f.default_value {
                Some(d) => quote! { Some(#d.to_string()) },
                None => quote! { None },
            };
            quote! {
                shark_core::FieldSpec {
                    name: #column.to_string(),
                    type_flag: #type_flag,
                    length: #length,
                    nullable: #nullable,
                    unique: #unique,
                    auto_increment: #auto_increment,
                    default_value: #default_value,
                }
            }
        })
        .collect();

    let primary_key_entries: Vec<TokenStream> = def
        .primary_keys()
        .iter()
        .map(|f| {
            let column = &f.column_name;
            quote! { #column.to_string() }
        })
        .collect();

    let present_field_stmts: Vec<TokenStream> = def
        .fields
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let column = &f.column_name;
            if f.is_option {
                let cell = f.kind.to_cell(&quote! { v.clone() });
                quote! {
                    if let Some(v) = &self.#ident {
                        out.push((#column.to_string(), #cell));
                    }
                }
            } else {
                let cell = f.kind.to_cell(&quote! { self.#ident.clone() });
                quote! {
                    out.push((#column.to_string(), #cell));
                }
            }
        })
        .collect();

    let primary_key_value_stmts: Vec<TokenStream> = def
        .primary_keys()
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let column = &f.column_name;
            if f.is_option {
                let cell = f.kind.to_cell(&quote! { v.clone() });
                quote! {
                    if let Some(v) = &self.#ident {
                        out.push((#column.to_string(), #cell));
                    }
                }
            } else {
                let cell = f.kind.to_cell(&quote! { self.#ident.clone() });
                quote! {
                    out.push((#column.to_string(), #cell));
                }
            }
        })
        .collect();

    let apply_returned_stmts: Vec<TokenStream> = def
        .primary_keys()
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let column = &f.column_name;
            let from_cell = f.kind.from_cell(&quote! { cell }, column);
            if f.is_option {
                quote! {
                    match row.require(#column)? {
                        shark_core::Cell::Null => { self.#ident = None; }
                        cell => { self.#ident = Some((#from_cell)?); }
                    }
                }
            } else {
                quote! {
                    let cell = row.require(#column)?;
                    self.#ident = (#from_cell)?;
                }
            }
        })
        .collect();

    let bind_stmts: Vec<TokenStream> = def
        .fields
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let column = &f.column_name;
            let from_cell = f.kind.from_cell(&quote! { cell }, column);
            if f.is_option {
                quote! {
                    let #ident = match row.require(#column)? {
                        shark_core::Cell::Null => None,
                        cell => Some((#from_cell)?),
                    };
                }
            } else {
                quote! {
                    let cell = row.require(#column)?;
                    let #ident = (#from_cell)?;
                }
            }
        })
        .collect();

    let field_idents: Vec<_> = def.fields.iter().map(|f| &f.ident).collect();

    quote! {
        impl shark_core::Bind for #name {
            fn bind(row: &shark_core::RowView<'_>) -> shark_core::Result<Self> {
                #(#bind_stmts)*
                Ok(#name { #(#field_idents),* })
            }
        }

        impl shark_core::Entity for #name {
            fn table_name(&self) -> String {
                #table_name.to_string()
            }

            fn fields() -> Vec<shark_core::FieldSpec> {
                vec![#(#field_spec_entries),*]
            }

            fn primary_keys() -> Vec<String> {
                vec![#(#primary_key_entries),*]
            }

            fn present_fields(&self) -> Vec<(String, shark_core::Cell)> {
                let mut out = Vec::new();
                #(#present_field_stmts)*
                out
            }

            fn primary_key_values(&self) -> Vec<(String, shark_core::Cell)> {
                let mut out = Vec::new();
                #(#primary_key_value_stmts)*
                out
            }

            fn apply_returned(&mut self, row: &shark_core::RowView<'_>) -> shark_core::Result<()> {
                #(#apply_returned_stmts)*
                Ok(())
            }
        }
    }
}
