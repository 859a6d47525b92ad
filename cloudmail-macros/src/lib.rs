extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Fields, Ident, Lit, LitStr, Token, Variant};

/// Derive macro for mapping error variants to HTTP status and caller-facing message
///
/// Every variant must carry `#[http_error(...)]` with one or two arguments
/// - status code (required)
/// - caller message (optional)
///
/// ### Status Code
///
/// May be a `StatusCode` constant (e.g. `BAD_REQUEST`) or a number (e.g. `400`).
/// Returned by `http_code()`.
///
/// ### Caller Message
///
/// A string literal with basic interpolation: tuple variants by index (`"{0}"`),
/// struct variants by field name (`"{field}"`).
///
/// When omitted, the `Display` implementation is used. Provide a message whenever
/// `Display` carries detail that must stay in the server log and out of the response.
///
/// Returned by `http_message()`.
///
/// ### Example
///
/// ```rust,ignore
/// #[derive(Debug, thiserror::Error, cloudmail::HttpError)]
/// enum ComposeError {
///     #[error("{0}")]
///     #[http_error(BAD_REQUEST)]
///     Validation(String),
///
///     #[error("smtp rejected credentials: {0}")]
///     #[http_error(INTERNAL_SERVER_ERROR, "Email authentication failed")]
///     Authentication(String),
///
///     #[error("unexpected: {0:?}")]
///     #[http_error(500, "Internal server error")]
///     Internal(#[from] anyhow::Error),
/// }
/// ```
#[proc_macro_derive(HttpError, attributes(http_error))]
pub fn http_error_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct VariantSpec {
    pattern: TokenStream2,
    status: TokenStream2,
    message: TokenStream2,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "HttpError can only be derived for enums",
        ));
    };

    let specs = data
        .variants
        .iter()
        .map(variant_spec)
        .collect::<syn::Result<Vec<_>>>()?;

    let code_arms = specs.iter().map(|spec| {
        let VariantSpec { pattern, status, .. } = spec;
        quote! { #[allow(unused_variables)] #pattern => #status, }
    });
    let message_arms = specs.iter().map(|spec| {
        let VariantSpec {
            pattern, message, ..
        } = spec;
        quote! { #[allow(unused_variables)] #pattern => #message, }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            pub fn http_code(&self) -> ::http::StatusCode {
                match self {
                    #(#code_arms)*
                }
            }

            pub fn http_message(&self) -> String {
                match self {
                    #(#message_arms)*
                }
            }
        }
    })
}

fn variant_spec(variant: &Variant) -> syn::Result<VariantSpec> {
    let attr = variant
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("http_error"))
        .ok_or_else(|| syn::Error::new_spanned(&variant.ident, "missing #[http_error(...)]"))?;

    let list = attr.meta.require_list()?;
    let args = Punctuated::<Expr, Token![,]>::parse_terminated.parse2(list.tokens.clone())?;
    let mut args = args.into_iter();

    let status = match args.next() {
        Some(Expr::Path(path)) => {
            let code = &path.path;
            quote! { ::http::StatusCode::#code }
        }
        Some(Expr::Lit(lit)) => match &lit.lit {
            Lit::Int(int) => {
                let code = int.base10_parse::<u16>()?;
                if !(100..=999).contains(&code) {
                    return Err(syn::Error::new_spanned(int, "status code out of range"));
                }
                quote! { ::http::StatusCode::from_u16(#code).unwrap() }
            }
            other => return Err(syn::Error::new_spanned(other, "expected a status code")),
        },
        Some(other) => return Err(syn::Error::new_spanned(other, "expected a status code")),
        None => return Err(syn::Error::new_spanned(list, "missing status code")),
    };

    let template = match args.next() {
        Some(Expr::Lit(lit)) => match lit.lit {
            Lit::Str(s) => Some(s),
            other => return Err(syn::Error::new_spanned(other, "expected a message string")),
        },
        Some(other) => return Err(syn::Error::new_spanned(other, "expected a message string")),
        None => None,
    };

    let ident = &variant.ident;
    let (pattern, message) = match &variant.fields {
        Fields::Unit => (quote! { Self::#ident }, format_message(template)),
        Fields::Unnamed(fields) => {
            let bindings: Vec<Ident> = (0..fields.unnamed.len())
                .map(|i| Ident::new(&format!("__field_{i}"), Span::call_site()))
                .collect();
            let message = format_message(
                template.map(|t| LitStr::new(&rename_positional(&t.value()), t.span())),
            );
            (quote! { Self::#ident(#(#bindings),*) }, message)
        }
        Fields::Named(fields) => {
            let names: Vec<&Ident> = fields.named.iter().filter_map(|f| f.ident.as_ref()).collect();
            let message = format_message(template);
            (quote! { Self::#ident { #(#names),* } }, message)
        }
    };

    Ok(VariantSpec {
        pattern,
        status,
        message,
    })
}

// Bindings in the match pattern share the literal's span, so inline captures resolve.
fn format_message(template: Option<LitStr>) -> TokenStream2 {
    match template {
        Some(t) => quote! { format!(#t) },
        None => quote! { self.to_string() },
    }
}

/// Rewrites `{0}` style placeholders to the bindings used in tuple patterns.
/// Escaped braces (`{{0}}`) are literal text and pass through untouched.
fn rename_positional(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push_str("{{");
            }
            '{' => {
                out.push('{');
                if chars.peek().is_some_and(char::is_ascii_digit) {
                    out.push_str("__field_");
                }
            }
            c => out.push(c),
        }
    }
    out
}
