//! `#[migrun(...)]` attribute parsing shared by both derives

use syn::{spanned::Spanned, Attribute, Data, DeriveInput, Error, Field, Fields, Ident, Result};

/// Per-field options.
pub struct FieldConfig {
    pub ident: Ident,
    /// Column name, after `rename`
    pub column: String,
    pub ty: syn::Type,
    /// Not read from rows and not part of the table layout
    pub skip: bool,
    pub key: bool,
    pub generated: bool,
}

fn unknown(meta: &syn::meta::ParseNestedMeta) -> Error {
    meta.error(format!(
        "unknown migrun attribute `{}`",
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    ))
}

fn migrun_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|a| a.path().is_ident("migrun"))
}

pub fn parse_field(field: &Field) -> Result<FieldConfig> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new(field.span(), "tuple structs are not supported"))?;

    let mut config = FieldConfig {
        column: ident.to_string(),
        ident,
        ty: field.ty.clone(),
        skip: false,
        key: false,
        generated: false,
    };

    for attr in migrun_attrs(&field.attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                config.column = lit.value();
            } else if meta.path.is_ident("skip") {
                config.skip = true;
            } else if meta.path.is_ident("key") {
                config.key = true;
            } else if meta.path.is_ident("generated") {
                config.generated = true;
            } else {
                return Err(unknown(&meta));
            }
            Ok(())
        })?;
    }

    Ok(config)
}

pub fn parse_fields(input: &DeriveInput) -> Result<Vec<FieldConfig>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(Error::new(input.span(), "only named fields are supported")),
        },
        _ => return Err(Error::new(input.span(), "only structs are supported")),
    };
    fields.iter().map(parse_field).collect()
}

/// Table name from `#[migrun(table = "...")]`, defaulting to the struct name.
pub fn parse_table(input: &DeriveInput) -> Result<String> {
    let mut table = input.ident.to_string();
    for attr in migrun_attrs(&input.attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                table = lit.value();
                Ok(())
            } else {
                Err(unknown(&meta))
            }
        })?;
    }
    Ok(table)
}
