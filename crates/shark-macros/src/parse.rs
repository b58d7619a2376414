//! Parsing logic for `derive(Entity)`: extracts struct- and field-level
//! `#[shark(...)]` attributes into [`EntityDef`]/[`EntityField`].

use std::collections::HashSet;

use quote::ToTokens;
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields, GenericArgument, Ident, Lit, PathArguments, Result, Type};

use crate::kind::ColumnKind;

pub struct EntityDef {
    pub name: Ident,
    pub table_name: String,
    pub fields: Vec<EntityField>,
}

pub struct EntityField {
    pub ident: Ident,
    pub column_name: String,
    pub rust_type: Type,
    pub kind: ColumnKind,
    /// Whether the *declared Rust field* is wrapped in `Option<T>` — drives
    /// codegen (whether `bind`/`present_fields`/etc. go through `Some`/`None`).
    pub is_option: bool,
    /// The `FieldSpec.nullable` metadata sent to the backend. Usually equal
    /// to `is_option`, except `auto_increment` always forces this to
    /// `false` regardless of the Rust wrapper (the id is still unset
    /// before insert, but the column itself is never nullable).
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub length: usize,
    pub default_value: Option<String>,
}

impl EntityDef {
    pub fn primary_keys(&self) -> Vec<&EntityField> {
        self.fields.iter().filter(|f| f.primary_key).collect()
    }
}

pub fn parse_entity(input: &DeriveInput) -> Result<EntityDef> {
    let name = input.ident.clone();
    let table_name = parse_struct_attrs(&input.attrs, &name)?;

    let fields = match &input.data {
        Data::Struct(data) => parse_fields(&data.fields)?,
        Data::Enum(_) => {
            return Err(Error::new_spanned(input, "Entity can only be derived for structs, not enums"));
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(input, "Entity can only be derived for structs, not unions"));
        }
    };

    let mut seen = HashSet::new();
    for field in &fields {
        if !seen.insert(field.column_name.clone()) {
            return Err(Error::new_spanned(
                &field.ident,
                format!("duplicate column name `{}`", field.column_name),
            ));
        }
    }

    Ok(EntityDef { name, table_name, fields })
}

fn parse_struct_attrs(attrs: &[Attribute], struct_name: &Ident) -> Result<String> {
    let mut table_name: Option<String> = None;

    for attr in attrs {
        if !attr.path().is_ident("shark") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: Lit = meta.value()?.parse()?;
                if let Lit::Str(lit_str) = value {
                    table_name = Some(lit_str.value());
                    Ok(())
                } else {
                    Err(Error::new_spanned(value, "expected string literal for table name"))
                }
            } else {
                Err(Error::new_spanned(
                    meta.path,
                    "unknown shark struct attribute (supported: table)",
                ))
            }
        })?;
    }

    Ok(table_name.unwrap_or_else(|| shark_core::resolve_name(&struct_name.to_string())))
}

fn parse_fields(fields: &Fields) -> Result<Vec<EntityField>> {
    match fields {
        Fields::Named(named) => named.named.iter().map(parse_field).collect(),
        Fields::Unnamed(_) => Err(Error::new_spanned(fields, "Entity requires named fields, not a tuple struct")),
        Fields::Unit => Err(Error::new_spanned(fields, "Entity requires fields, not a unit struct")),
    }
}

fn parse_field(field: &Field) -> Result<EntityField> {
    let ident = field.ident.clone().ok_or_else(|| Error::new_spanned(field, "expected named field"))?;
    let is_option = is_option_type(&field.ty);
    let rust_type = if is_option { unwrap_option(&field.ty).clone() } else { field.ty.clone() };

    let attrs = parse_field_attrs(&field.attrs)?;
    let column_name = attrs.column.unwrap_or_else(|| shark_core::resolve_name(&ident.to_string()));
    let kind = ColumnKind::resolve(&type_to_string(&rust_type), attrs.kind.as_deref())?;

    if attrs.not_null && is_option {
        return Err(Error::new_spanned(&ident, "`not_null` is redundant on an Option<T> field; remove the wrapper instead"));
    }

    Ok(EntityField {
        ident,
        column_name,
        rust_type,
        kind,
        is_option,
        nullable: is_option && !attrs.not_null && !attrs.auto_increment,
        primary_key: attrs.primary_key,
        auto_increment: attrs.auto_increment,
        unique: attrs.unique,
        length: attrs.length.unwrap_or(0),
        default_value: attrs.default,
    })
}

#[derive(Default)]
struct FieldAttrs {
    column: Option<String>,
    kind: Option<String>,
    primary_key: bool,
    auto_increment: bool,
    not_null: bool,
    unique: bool,
    length: Option<usize>,
    default: Option<String>,
}

fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("shark") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let path = &meta.path;
            if path.is_ident("primary_key") {
                result.primary_key = true;
            } else if path.is_ident("auto_increment") {
                result.auto_increment = true;
            } else if path.is_ident("not_null") {
                result.not_null = true;
            } else if path.is_ident("unique") {
                result.unique = true;
            } else if path.is_ident("column") {
                let value: Lit = meta.value()?.parse()?;
                result.column = Some(expect_str(value, "column")?);
            } else if path.is_ident("kind") {
                let value: Lit = meta.value()?.parse()?;
                result.kind = Some(expect_str(value, "kind")?);
            } else if path.is_ident("length") {
                let value: Lit = meta.value()?.parse()?;
                if let Lit::Int(lit_int) = value {
                    result.length = Some(lit_int.base10_parse()?);
                } else {
                    return Err(Error::new_spanned(value, "expected integer literal for length"));
                }
            } else if path.is_ident("default") {
                let value: Lit = meta.value()?.parse()?;
                result.default = Some(expect_str(value, "default")?);
            } else {
                return Err(Error::new_spanned(
                    path,
                    "unknown shark field attribute (supported: primary_key, auto_increment, \
                     not_null, unique, column, kind, length, default)",
                ));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

fn expect_str(value: Lit, attr: &str) -> Result<String> {
    if let Lit::Str(s) = value {
        Ok(s.value())
    } else {
        Err(Error::new_spanned(value, format!("expected string literal for {attr}")))
    }
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}

fn unwrap_option(ty: &Type) -> &Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return inner;
                    }
                }
            }
        }
    }
    ty
}

fn type_to_string(ty: &Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn table_name_defaults_via_resolve_name() {
        let input: DeriveInput = parse_quote! {
            struct Widget {
                #[shark(primary_key, auto_increment)]
                id: Option<i32>,
                name: String,
            }
        };
        let def = parse_entity(&input).unwrap();
        assert_eq!(def.table_name, "_widget");
    }

    #[test]
    fn table_name_override() {
        let input: DeriveInput = parse_quote! {
            #[shark(table = "widgets")]
            struct Widget {
                #[shark(primary_key)]
                id: i32,
            }
        };
        let def = parse_entity(&input).unwrap();
        assert_eq!(def.table_name, "widgets");
    }

    #[test]
    fn duplicate_column_name_errors() {
        let input: DeriveInput = parse_quote! {
            struct Widget {
                #[shark(column = "dup")]
                a: i32,
                #[shark(column = "dup")]
                b: i32,
            }
        };
        let err = parse_entity(&input).unwrap_err();
        assert!(err.to_string().contains("duplicate column name"));
    }

    #[test]
    fn option_field_is_nullable_and_tuple_errors() {
        let input: DeriveInput = parse_quote! {
            struct Widget {
                id: Option<i32>,
            }
        };
        let def = parse_entity(&input).unwrap();
        assert!(def.fields[0].nullable);

        let tuple_struct: DeriveInput = parse_quote! {
            struct Widget(i32);
        };
        assert!(parse_entity(&tuple_struct).is_err());
    }

    #[test]
    fn auto_increment_forces_metadata_nullable_false_but_keeps_option_codegen() {
        let input: DeriveInput = parse_quote! {
            struct Widget {
                #[shark(primary_key, auto_increment)]
                id: Option<i32>,
            }
        };
        let def = parse_entity(&input).unwrap();
        assert!(!def.fields[0].nullable);
        assert!(def.fields[0].is_option);
    }

    #[test]
    fn not_null_on_option_field_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Widget {
                #[shark(not_null)]
                id: Option<i32>,
            }
        };
        assert!(parse_entity(&input).is_err());
    }
}
