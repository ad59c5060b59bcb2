//! Derive macros for migrun
//!
//! - `FromRow` maps a result row onto a struct by column name
//! - `Record` declares the struct's table layout for the SQL builder
//!
//! Both are re-exported from `migrun`; depend on that crate instead.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attrs;
mod from_row;
mod record;

/// Derive `migrun::FromRow`.
///
/// # Attributes
///
/// - `#[migrun(rename = "column")]` - read from a differently named column
/// - `#[migrun(skip)]` - leave the field at `Default::default()`
///
/// ```ignore
/// #[derive(FromRow)]
/// pub struct Applied {
///     #[migrun(rename = "scriptName")]
///     pub script_name: String,
/// }
/// ```
#[proc_macro_derive(FromRow, attributes(migrun))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::derive_from_row_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `migrun::Record`.
///
/// # Attributes
///
/// - `#[migrun(table = "name")]` on the struct - table name, defaults to the struct name
/// - `#[migrun(rename = "column")]` - column name, defaults to the field name
/// - `#[migrun(key)]` - the key column; without it a field named `id` is used
/// - `#[migrun(generated)]` - filled in by the database, left out of INSERT
/// - `#[migrun(skip)]` - not a column
///
/// ```ignore
/// #[derive(FromRow, Record)]
/// #[migrun(table = "templates")]
/// pub struct Template {
///     #[migrun(generated)]
///     pub id: i64,
///     pub name: String,
/// }
/// ```
#[proc_macro_derive(Record, attributes(migrun))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::derive_record_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
