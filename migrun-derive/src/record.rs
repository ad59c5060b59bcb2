//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, DeriveInput, Error, Result};

use crate::attrs::{parse_fields, parse_table, FieldConfig};

/// The explicit `#[migrun(key)]` field, else a field named `id`.
fn key_field<'a>(input: &DeriveInput, columns: &[&'a FieldConfig]) -> Result<&'a FieldConfig> {
    let marked: Vec<&FieldConfig> = columns.iter().copied().filter(|f| f.key).collect();
    match marked.as_slice() {
        [one] => Ok(*one),
        [] => columns
            .iter()
            .copied()
            .find(|f| f.ident == "id")
            .ok_or_else(|| {
                Error::new(
                    input.span(),
                    "Record needs a key column: mark a field with #[migrun(key)] or name it `id`",
                )
            }),
        [_, second, ..] => Err(Error::new(
            second.ident.span(),
            "only one field may be marked #[migrun(key)]",
        )),
    }
}

pub fn derive_record_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let table = parse_table(&input)?;
    let fields = parse_fields(&input)?;
    let columns: Vec<&FieldConfig> = fields.iter().filter(|f| !f.skip).collect();
    let key = key_field(&input, &columns)?;

    let specs = columns.iter().map(|f| {
        let column = &f.column;
        let is_key = std::ptr::eq(*f, key);
        let generated = f.generated;
        quote! {
            migrun::ColumnSpec {
                name: #column,
                key: #is_key,
                generated: #generated,
            }
        }
    });

    let values = columns.iter().map(|f| {
        let ident = &f.ident;
        quote! { migrun::ToValue::to_value(&self.#ident) }
    });

    let key_ident = &key.ident;

    Ok(quote! {
        impl #impl_generics migrun::Record for #name #ty_generics #where_clause {
            const TABLE: migrun::TableSpec = migrun::TableSpec {
                name: #table,
                columns: &[#(#specs),*],
            };

            fn values(&self) -> ::std::vec::Vec<migrun::Value> {
                ::std::vec![#(#values),*]
            }

            fn key_value(&self) -> migrun::Value {
                migrun::ToValue::to_value(&self.#key_ident)
            }
        }
    })
}
