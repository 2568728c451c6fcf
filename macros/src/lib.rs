//! Derive macros for Composable Todo
//!
//! This crate provides procedural macros to reduce boilerplate around action
//! enums that cross a string-keyed boundary (wire formats, shells, logs).
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates `kind()`, `KINDS` and `is_recognized()`
//!
//! # Example
//!
//! ```ignore
//! use composable_todo_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[action(kind = "add-todo")]
//!     Add { name: String },
//!
//!     #[action(fallback)]
//!     Unknown { kind: String },
//! }
//!
//! assert_eq!(TodoAction::Add { name: "milk".into() }.kind(), "add-todo");
//! assert_eq!(TodoAction::KINDS, &["add-todo"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Variant};

/// Kind string reported by the fallback variant
const FALLBACK_KIND: &str = "unknown";

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `KINDS` - The kind strings of every recognized variant, in declaration order
/// - `kind()` - Returns the kind string of this variant
/// - `is_recognized()` - Returns false only for the fallback variant
///
/// # Attributes
///
/// - `#[action(kind = "...")]` - Override the kind string (default: kebab-case variant name)
/// - `#[action(fallback)]` - Mark the variant that stands in for unrecognized kinds;
///   its `kind()` is `"unknown"` and it is left out of `KINDS`
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - More than one variant is marked `#[action(fallback)]`
/// - A variant is both `fallback` and given a `kind`
/// - Two variants share a kind string
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut kinds = Vec::new();
    let mut kind_arms = Vec::new();
    let mut fallback_pattern = None;

    for variant in &data_enum.variants {
        let options = match ActionOptions::parse(&variant.attrs) {
            Ok(options) => options,
            Err(error) => return error.to_compile_error().into(),
        };

        let pattern = variant_pattern(variant);

        if options.fallback {
            if options.kind.is_some() {
                return syn::Error::new_spanned(
                    variant,
                    "A fallback variant cannot declare a kind",
                )
                .to_compile_error()
                .into();
            }
            if fallback_pattern.is_some() {
                return syn::Error::new_spanned(
                    variant,
                    "Only one variant can be #[action(fallback)]",
                )
                .to_compile_error()
                .into();
            }
            kind_arms.push(quote! { #pattern => #FALLBACK_KIND, });
            fallback_pattern = Some(pattern);
            continue;
        }

        let kind = options
            .kind
            .unwrap_or_else(|| kebab_case(&variant.ident.to_string()));

        if kinds.contains(&kind) {
            return syn::Error::new_spanned(variant, format!("Duplicate action kind \"{kind}\""))
                .to_compile_error()
                .into();
        }

        kind_arms.push(quote! { #pattern => #kind, });
        kinds.push(kind);
    }

    let is_recognized_body = match &fallback_pattern {
        Some(pattern) => quote! { !matches!(self, #pattern) },
        None => quote! { true },
    };

    let expanded = quote! {
        impl #name {
            /// Kind strings of every recognized action, in declaration order
            pub const KINDS: &'static [&'static str] = &[#(#kinds),*];

            /// Returns the kind string of this action
            #[must_use]
            pub const fn kind(&self) -> &'static str {
                match self {
                    #(#kind_arms)*
                }
            }

            /// Returns false if this action stands in for an unrecognized kind
            #[must_use]
            pub const fn is_recognized(&self) -> bool {
                #is_recognized_body
            }
        }
    };

    TokenStream::from(expanded)
}

/// Options collected from `#[action(...)]` attributes on one variant
#[derive(Default)]
struct ActionOptions {
    kind: Option<String>,
    fallback: bool,
}

impl ActionOptions {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("action")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("kind") {
                    let value: LitStr = meta.value()?.parse()?;
                    options.kind = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("fallback") {
                    options.fallback = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `kind = \"...\"` or `fallback`"))
                }
            })?;
        }

        Ok(options)
    }
}

/// Match pattern for a variant that ignores its fields
fn variant_pattern(variant: &Variant) -> proc_macro2::TokenStream {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// `AddTodo` -> `add-todo`
fn kebab_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (index, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if index > 0 {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
