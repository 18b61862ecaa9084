//! Derive macros for Shopfront form reducers
//!
//! This crate provides procedural macros to reduce boilerplate when writing
//! form actions and drafts.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates helpers for action enums (edits/derived events)
//! - `#[derive(State)]` - Generates revision tracking for drafts
//!
//! # Example
//!
//! ```ignore
//! use shopfront_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum BrandFormAction {
//!     #[command]
//!     SetName { name: String },
//!
//!     #[event]
//!     SlugDerived { slug: String },
//! }
//!
//! // Generated methods:
//! assert!(BrandFormAction::SetName { name: "Acme".into() }.is_command());
//! assert_eq!(BrandFormAction::SlugDerived { slug: "acme".into() }.action_name(), "SlugDerived");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_command()` - Returns true if this variant is a user edit / request
/// - `is_event()` - Returns true if this variant records something that happened
/// - `action_name()` - Returns the variant name, for structured logging
///
/// # Attributes
///
/// - `#[command]` - Mark a variant as a command
/// - `#[event]` - Mark a variant as an event
///
/// Unmarked variants are neither commands nor events but still have a name.
///
/// # Errors
///
/// This macro produces a compile error if:
/// - Applied to a non-enum type
/// - A variant has both `#[command]` and `#[event]` attributes
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum OrderFormAction {
///     #[command]
///     ChangeQuantity { line_id: LineId, quantity: Option<u32> },
///
///     #[event]
///     LineTotalChanged { line_id: LineId, total_price: Option<Money> },
/// }
/// ```
#[proc_macro_derive(Action, attributes(command, event))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut is_command_arms = Vec::new();
    let mut is_event_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        if is_command && is_event {
            return syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[command] and #[event]",
            )
            .to_compile_error()
            .into();
        }

        let pattern = variant_pattern(&variant.ident, &variant.fields);
        let variant_name = variant.ident.to_string();

        if is_command {
            is_command_arms.push(quote! { #pattern => true, });
        }
        if is_event {
            is_event_arms.push(quote! { #pattern => true, });
        }
        name_arms.push(quote! { #pattern => #variant_name, });
    }

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is a command
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#is_command_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#is_event_arms)*
                    _ => false,
                }
            }

            /// Returns the variant name of this action
            #[must_use]
            pub const fn action_name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for draft State structs
///
/// Generates revision tracking for a field marked `#[revision]` (type `u64`):
/// - `revision()` - Returns the current revision
/// - `bump_revision()` - Advances the revision after an accepted edit
///
/// Structs without a `#[revision]` field get no generated items.
///
/// # Errors
///
/// This macro produces a compile error if:
/// - Applied to a non-struct type
/// - More than one field is marked `#[revision]`
///
/// # Example
///
/// ```ignore
/// use shopfront_macros::State;
///
/// #[derive(State, Clone, Debug, Default)]
/// struct BrandDraft {
///     pub name: String,
///     #[revision]
///     pub revision: u64,
/// }
/// ```
#[proc_macro_derive(State, attributes(revision))]
pub fn derive_state(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(State)] can only be used on structs")
            .to_compile_error()
            .into();
    };

    let marked: Vec<_> = data_struct
        .fields
        .iter()
        .filter(|field| has_attribute(&field.attrs, "revision"))
        .collect();

    let field = match marked.as_slice() {
        [] => return TokenStream::new(),
        [field] => field,
        [_, second, ..] => {
            return syn::Error::new_spanned(second, "Only one field can be marked #[revision]")
                .to_compile_error()
                .into();
        },
    };

    let Some(field_name) = field.ident.as_ref() else {
        return syn::Error::new_spanned(field, "#[revision] requires a named field")
            .to_compile_error()
            .into();
    };

    let expanded = quote! {
        impl #name {
            /// Current revision of this draft (number of accepted edits)
            #[must_use]
            pub const fn revision(&self) -> u64 {
                self.#field_name
            }

            /// Advance the revision after an accepted edit
            pub fn bump_revision(&mut self) {
                self.#field_name = self.#field_name.wrapping_add(1);
            }
        }
    };

    TokenStream::from(expanded)
}

/// Builds a match pattern for a variant that ignores its fields
fn variant_pattern(ident: &Ident, fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
