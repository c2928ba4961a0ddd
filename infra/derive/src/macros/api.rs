use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{Attribute, ItemFn, ItemStruct, Lit, LitStr, Meta};

/// Expands the `#[api_model]` attribute macro.
///
/// Adds the common derives (`Debug`, `Serialize`, `Deserialize`, `ToSchema`)
/// and a serde rename policy unless the struct already declares them.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let rename_all = match parse_rename_arg(args) {
        Ok(value) => value,
        Err(err) => return err,
    };

    let derives = derived_trait_names(&input.attrs);
    let mut tokens = Vec::new();
    if !derives.contains("Debug") {
        tokens.push(quote! { Debug });
    }
    if !derives.contains("Serialize") {
        tokens.push(quote! { ::serde::Serialize });
    }
    if !derives.contains("Deserialize") {
        tokens.push(quote! { ::serde::Deserialize });
    }
    let derive_attr =
        if tokens.is_empty() { quote! {} } else { quote! { #[derive(#(#tokens),*)] } };

    let schema_attr = if derives.contains("ToSchema") {
        quote! {}
    } else {
        quote! { #[cfg_attr(feature = "server", derive(::utoipa::ToSchema))] }
    };

    let rename_attr = if has_serde_rename(&input.attrs) {
        quote! {}
    } else {
        let policy = rename_all
            .unwrap_or_else(|| LitStr::new("camelCase", proc_macro2::Span::call_site()));
        quote! { #[serde(rename_all = #policy)] }
    };

    quote! {
        #derive_attr
        #schema_attr
        #rename_attr
        #input
    }
}

/// Expands the `#[api_handler]` attribute macro.
///
/// Wraps the handler with `utoipa::path` metadata while keeping the
/// signature untouched.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let body = &input.block;
    let sig = &input.sig;
    let vis = &input.vis;
    let attrs = &input.attrs;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #vis #sig {
            #body
        }
    }
}

fn parse_rename_arg(args: TokenStream) -> Result<Option<LitStr>, TokenStream> {
    let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
    let metas = parser.parse2(args).map_err(|err| err.to_compile_error())?;

    let mut rename_all = None;
    for meta in metas {
        let name_value = match meta {
            Meta::NameValue(name_value) => name_value,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "Expected name-value arguments like `rename_all = \"...\"`",
                )
                .to_compile_error());
            }
        };
        if !name_value.path.is_ident("rename_all") {
            return Err(syn::Error::new_spanned(
                name_value.path,
                "Unsupported argument; expected rename_all",
            )
            .to_compile_error());
        }
        if rename_all.is_some() {
            return Err(
                syn::Error::new_spanned(name_value, "Duplicate argument").to_compile_error()
            );
        }
        match &name_value.value {
            syn::Expr::Lit(expr_lit) => match &expr_lit.lit {
                Lit::Str(lit) => rename_all = Some(lit.clone()),
                _ => {
                    return Err(syn::Error::new_spanned(
                        &name_value.value,
                        "rename_all must be a string literal",
                    )
                    .to_compile_error());
                }
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    &name_value.value,
                    "rename_all must be a string literal",
                )
                .to_compile_error());
            }
        }
    }

    Ok(rename_all)
}

fn has_serde_rename(attrs: &[Attribute]) -> bool {
    let mut found = false;
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let value = meta.value()?;
                let _: LitStr = value.parse()?;
                found = true;
            }
            Ok(())
        });
    }
    found
}

fn derived_trait_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut traits = FxHashSet::default();

    for attr in attrs {
        if !attr.path().is_ident("derive") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.segments.last().map(|seg| seg.ident.to_string()) {
                traits.insert(ident);
            }
            Ok(())
        });
    }

    traits
}
