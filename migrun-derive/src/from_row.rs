//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::parse_fields;

pub fn derive_from_row_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = parse_fields(&input)?;

    let extractions = fields.iter().map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        let column = &f.column;
        if f.skip {
            quote! { #ident: <#ty as ::std::default::Default>::default() }
        } else {
            quote! { #ident: migrun::RowExt::get::<#ty>(row, #column)? }
        }
    });

    let columns = fields.iter().filter(|f| !f.skip).map(|f| f.column.as_str());

    Ok(quote! {
        impl #impl_generics migrun::FromRow for #name #ty_generics #where_clause {
            fn from_row<R: migrun::Row>(row: &R) -> migrun::Result<Self> {
                Ok(Self {
                    #(#extractions),*
                })
            }

            fn column_names() -> &'static [&'static str] {
                &[#(#columns),*]
            }
        }
    })
}
