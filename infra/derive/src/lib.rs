#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the infrastructure crates: error enums with
//! contextual wrapping, API model/handler glue, and the runtime bootstrap
//! attribute.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to bootstrap the specialized Tokio runtime.
///
/// Transforms an `async fn main` into a plain `fn main` that builds one of
/// the preset runtimes from `corral-runtime` and blocks on the body.
///
/// # Arguments
///
/// * `service` - Tuned for long-running server processes.
/// * `lightweight` - Smaller footprint for tools and sidecars.
/// * `default` - Auto-detected worker threads, default stack.
///
/// # Examples
///
/// ```rust,ignore
/// #[corral_runtime::main(service)]
/// async fn main() -> anyhow::Result<()> {
/// # Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for API data transfer objects.
///
/// Injects `Debug`, `Serialize` and `Deserialize` derives when missing,
/// `utoipa::ToSchema` behind the consumer's `server` feature, and a
/// `camelCase` serde rename policy unless the struct declares its own.
///
/// # Example
///
/// ```rust,ignore
/// use corral_derive::api_model;
///
/// #[api_model(rename_all = "snake_case")]
/// pub struct StatusReport {
///     pub status: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro bridging Axum handlers with `OpenAPI` documentation.
///
/// Forwards its arguments to `utoipa::path` when the consumer's `server`
/// feature is enabled and silences the `unused_async` lint that extractor
/// boilerplate tends to trigger.
///
/// # Example
///
/// ```rust,ignore
/// use corral_derive::api_handler;
///
/// #[api_handler(
///     get,
///     path = "/healthcheck",
///     responses((status = OK, description = "Empty body")),
///     tag = "system"
/// )]
/// pub async fn healthcheck() -> &'static str {
///     ""
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Attribute macro for domain-specific error enums.
///
/// Transforms a plain enum into a full error type wired into the workspace
/// conventions:
///
/// * Injects `#[derive(Debug, thiserror::Error)]`.
/// * Generates a companion `<Name>Ext` trait adding `.context(...)` to
///   `Result`s carrying this error or any wrapped source error.
/// * Implements `From<Source>` for variants holding a `source` field, so `?`
///   works on upstream errors.
/// * Implements `From<&'static str>`/`From<String>` when an `Internal`
///   variant exists.
///
/// # Requirements
///
/// * Applies to enums with named-field variants only.
/// * Variants holding a `source` must also hold
///   `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use corral_derive::app_error;
/// use std::borrow::Cow;
///
/// #[app_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn app_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
