#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the Polycase workspace.
//!
//! * [`macro@Contract`] turns a plain struct into a statically described
//!   serialization model. The field table is computed at compile time, so the
//!   contract resolver never has to introspect a type at runtime.
//! * [`macro@polycase_error`] wires an error enum into the workspace error
//!   conventions (`thiserror`, context helpers, `From` conversions).
//!
//! The generated code refers to `::polycase_contract` and `::thiserror`, so
//! consumers must depend on those crates.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives the static contract description of a struct.
///
/// Generates a `static` [`TypeDescriptor`] holding one field descriptor per
/// named field (declaration order), plus the `Describe`, `ContractObject`
/// and `ContractValue` implementations the resolver and the value engine
/// call into.
///
/// Each field's declared identifier is the `PascalCase` form of its Rust
/// name (`first_name` becomes `FirstName`). The active naming convention is
/// applied to that identifier, or to the `rename` override when present.
///
/// # Attributes
///
/// Type level:
/// * `#[contract(skip_null = bool)]` - omit members whose value is null.
/// * `#[contract(skip_default = bool)]` - omit members holding their type's default.
/// * `#[contract(ignore_cycles = bool)]` - omit members that re-enter an object
///   already being written instead of failing.
///
/// Field level:
/// * `#[contract(rename = "DateOfBirth")]` - override the declared identifier.
/// * `#[contract(date_only)]` - always write the value as `YYYY-MM-DD`.
/// * `#[contract(skip)]` - leave the field out of the contract; it is
///   rebuilt with `Default::default()` when reading.
///
/// # Errors
/// Emits a compile-time error for enums, unions, tuple structs, generic
/// structs and unknown or duplicated attribute arguments.
///
/// # Example
///
/// ```rust,ignore
/// use polycase_contract::Contract;
///
/// #[derive(Debug, Contract)]
/// #[contract(skip_default = false)]
/// pub struct Person {
///     pub id: i32,
///     pub first_name: String,
///     #[contract(rename = "DateOfBirth", date_only)]
///     pub dob: Option<chrono::NaiveDateTime>,
/// }
/// ```
///
/// [`TypeDescriptor`]: https://docs.rs/polycase-contract
#[proc_macro_derive(Contract, attributes(contract))]
pub fn derive_contract(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::contract::expand_derive(input).into()
}

/// A high-level attribute macro for defining domain-specific error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source`
///   field (or a field marked `#[source]`/`#[from]`), enabling `?` on upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. Variants that support context carry a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping an upstream error must also carry the context field.
///
/// # Example
///
/// ```rust,ignore
/// use polycase_derive::polycase_error;
/// use std::borrow::Cow;
///
/// #[polycase_error]
/// pub enum StoreError {
///     #[error("Serialization error{}: {source}", format_context(.context))]
///     Json { source: serde_json::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn polycase_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
