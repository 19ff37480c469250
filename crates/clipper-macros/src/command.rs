//! `#[command]` proc macro: marks a function as a command.
//!
//! The function itself is emitted unchanged (minus parameter annotations).
//! Next to it the macro generates `<fn>__command()`, which returns an
//! opted-in `clipper::FunctionDef` carrying the function's doc comment,
//! parameter signature, return type and a wrapper that pulls each parameter
//! out of the bound `Arguments`.
//!
//! # Example
//!
//! ```rust,ignore
//! use clipper::command;
//!
//! /// Copies a file.
//! ///
//! /// # Arguments
//! ///
//! /// * `src` - Source path.
//! /// * `dst` - Destination path.
//! /// * `retries` - How often to retry.
//! #[command]
//! fn copy(
//!     src: PathBuf,
//!     dst: PathBuf,
//!     #[arg(default = 3)] retries: u32,
//!     #[flag] dry_run: bool,
//!     mode: Option<String>,
//! ) -> anyhow::Result<()> {
//!     // ...
//! }
//!
//! // Generates:
//! // fn copy__command() -> ::clipper::FunctionDef
//! ```
//!
//! # Command Attributes
//!
//! | Attribute | Type | Description |
//! |-----------|------|-------------|
//! | `name` | string | Command name (defaults to the function name, `_` → `-`) |
//!
//! # Parameter Annotations
//!
//! | Annotation | Type | Binding |
//! |------------|------|---------|
//! | none | `T` | Required positional `<name>` |
//! | none | `Option<T>` | Optional `--name=value`, default `None` |
//! | `#[flag]` | `bool` | Optional `--name`, default `false` |
//! | `#[arg(default = lit)]` | `T` | Optional `--name=value`, default `lit` |
//! | `#[arg(name = "x")]` / `#[flag(name = "x")]` | any | Renames the option |
//!
//! # Return Types
//!
//! | Return Type | Wrapper |
//! |-------------|---------|
//! | none | returns `Value::None` |
//! | `Result<T, E>` | `IntoCommandResult` (errors become application errors) |
//! | `T` | `IntoValue` |

use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::{
    ext::IdentExt,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Error, Expr, ExprLit, ExprUnary, FnArg, Ident, ItemFn, Lit, Meta, Pat, PatType, Path,
    Result, ReturnType, Token, Type, UnOp,
};

// =============================================================================
// Command-level attributes
// =============================================================================

/// Parsed command-level attributes from `#[command(...)]`
#[derive(Default)]
struct CommandAttrs {
    name: Option<String>,
}

impl Parse for CommandAttrs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attrs = CommandAttrs::default();

        if input.is_empty() {
            return Ok(attrs);
        }

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    attrs.name = Some(parse_string_value(&nv.value)?);
                }
                Meta::NameValue(nv) => {
                    let other = nv.path.to_token_stream().to_string();
                    return Err(Error::new(
                        nv.path.span(),
                        format!("unknown command attribute `{}`", other),
                    ));
                }
                other => {
                    return Err(Error::new(
                        other.span(),
                        "expected `name = \"...\"` style attribute",
                    ));
                }
            }
        }

        Ok(attrs)
    }
}

// =============================================================================
// Parameter-level attributes
// =============================================================================

/// A literal default from `#[arg(default = ...)]`.
#[derive(Debug, Clone, PartialEq)]
enum DefaultValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl DefaultValue {
    fn from_expr(expr: &Expr) -> Result<Self> {
        match expr {
            Expr::Lit(ExprLit { lit, .. }) => match lit {
                Lit::Str(s) => Ok(DefaultValue::Str(s.value())),
                Lit::Int(i) => Ok(DefaultValue::Int(i.base10_parse()?)),
                Lit::Float(f) => Ok(DefaultValue::Float(f.base10_parse()?)),
                Lit::Bool(b) => Ok(DefaultValue::Bool(b.value())),
                other => Err(Error::new(other.span(), "unsupported default literal")),
            },
            Expr::Unary(ExprUnary {
                op: UnOp::Neg(_),
                expr: inner,
                ..
            }) => match DefaultValue::from_expr(inner)? {
                DefaultValue::Int(n) => Ok(DefaultValue::Int(-n)),
                DefaultValue::Float(n) => Ok(DefaultValue::Float(-n)),
                _ => Err(Error::new(expr.span(), "only numbers can be negated")),
            },
            other => Err(Error::new(
                other.span(),
                "expected a string, number or boolean literal",
            )),
        }
    }

    fn to_value(&self) -> TokenStream {
        match self {
            DefaultValue::Str(s) => quote! { ::clipper::Value::Str(::std::string::String::from(#s)) },
            DefaultValue::Int(n) => quote! { ::clipper::Value::Int(#n) },
            DefaultValue::Float(n) => quote! { ::clipper::Value::Float(#n) },
            DefaultValue::Bool(b) => quote! { ::clipper::Value::Bool(#b) },
        }
    }
}

/// Attributes for `#[flag(...)]` and `#[arg(...)]`
#[derive(Debug, Clone, Default)]
struct ParamAttrs {
    name: Option<String>,
    default: Option<DefaultValue>,
}

/// What kind of parameter this is
#[derive(Debug, Clone)]
enum ParamKind {
    /// `#[flag]`: boolean option defaulting to false
    Flag(ParamAttrs),
    /// `#[arg(...)]`
    Arg(ParamAttrs),
    /// No annotation
    Plain,
}

/// Parsed parameter information
struct ParamInfo {
    rust_name: Ident,
    cli_name: String,
    ty: Type,
    default: Option<TokenStream>,
    type_name: String,
}

fn parse_string_value(expr: &Expr) -> Result<String> {
    if let Expr::Lit(expr_lit) = expr {
        if let Lit::Str(lit_str) = &expr_lit.lit {
            return Ok(lit_str.value());
        }
    }
    Err(Error::new(expr.span(), "expected string literal"))
}

fn parse_param_attrs(attr: &syn::Attribute, allow_default: bool) -> Result<ParamAttrs> {
    let mut attrs = ParamAttrs::default();

    if attr.meta.require_path_only().is_ok() {
        return Ok(attrs);
    }

    attr.parse_nested_meta(|meta| {
        let ident = meta.path.get_ident().map(|i| i.to_string());
        match ident.as_deref() {
            Some("name") => {
                let value: Lit = meta.value()?.parse()?;
                if let Lit::Str(s) = value {
                    attrs.name = Some(s.value());
                } else {
                    return Err(Error::new(value.span(), "expected string literal"));
                }
            }
            Some("default") if allow_default => {
                let value: Expr = meta.value()?.parse()?;
                attrs.default = Some(DefaultValue::from_expr(&value)?);
            }
            Some(other) => {
                return Err(Error::new(
                    meta.path.span(),
                    format!("unknown parameter attribute `{}`", other),
                ));
            }
            None => {
                return Err(Error::new(meta.path.span(), "expected identifier"));
            }
        }
        Ok(())
    })?;

    Ok(attrs)
}

fn parse_param_kind(pat_type: &PatType) -> Result<ParamKind> {
    for attr in &pat_type.attrs {
        if attr.path().is_ident("flag") {
            return Ok(ParamKind::Flag(parse_param_attrs(attr, false)?));
        }
        if attr.path().is_ident("arg") {
            return Ok(ParamKind::Arg(parse_param_attrs(attr, true)?));
        }
    }
    Ok(ParamKind::Plain)
}

fn extract_param_name(pat: &Pat) -> Result<Ident> {
    match pat {
        Pat::Ident(ident) => Ok(ident.ident.clone()),
        _ => Err(Error::new(
            pat.span(),
            "expected identifier pattern for parameter",
        )),
    }
}

/// Option-name spelling of a Rust identifier.
fn cli_name(rust_name: &str) -> String {
    rust_name.replace('_', "-")
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last(),
        _ => None,
    }
}

fn is_option_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|s| s.ident == "Option")
}

fn is_result_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|s| s.ident == "Result")
}

fn is_reference_type(ty: &Type) -> bool {
    matches!(ty, Type::Reference(_))
}

/// First generic argument of `Option<T>` / `Result<T, E>`.
fn extract_inner_type(ty: &Type) -> Option<&Type> {
    if let syn::PathArguments::AngleBracketed(args) = &last_segment(ty)?.arguments {
        if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
            return Some(inner);
        }
    }
    None
}

/// The type name handed to `TypeTag::from_type_name`, e.g. `"u32"`.
///
/// `Option<T>` reports `T`. Non-path types report an empty name.
fn type_name(ty: &Type) -> String {
    let ty = if is_option_type(ty) {
        extract_inner_type(ty).unwrap_or(ty)
    } else {
        ty
    };
    last_segment(ty)
        .map(|s| s.ident.to_string())
        .unwrap_or_default()
}

fn analyze_param(pat_type: &PatType) -> Result<ParamInfo> {
    let kind = parse_param_kind(pat_type)?;
    let rust_name = extract_param_name(&pat_type.pat)?;
    let ty = (*pat_type.ty).clone();

    if is_reference_type(&ty) {
        return Err(Error::new(
            pat_type.ty.span(),
            "command parameters must be owned types (use String instead of &str)",
        ));
    }

    let (attrs, default) = match kind {
        ParamKind::Flag(attrs) => {
            if type_name(&ty) != "bool" {
                return Err(Error::new(pat_type.ty.span(), "#[flag] parameters must be bool"));
            }
            (attrs, Some(quote! { ::clipper::Value::Bool(false) }))
        }
        ParamKind::Arg(attrs) => {
            let default = match &attrs.default {
                Some(value) => Some(value.to_value()),
                None if is_option_type(&ty) => Some(quote! { ::clipper::Value::None }),
                None => None,
            };
            (attrs, default)
        }
        ParamKind::Plain => {
            let default = is_option_type(&ty).then(|| quote! { ::clipper::Value::None });
            (ParamAttrs::default(), default)
        }
    };

    Ok(ParamInfo {
        cli_name: attrs
            .name
            .unwrap_or_else(|| cli_name(&rust_name.unraw().to_string())),
        type_name: type_name(&ty),
        rust_name,
        ty,
        default,
    })
}

/// Joins the function's `#[doc = "..."]` lines.
fn doc_text(fn_item: &ItemFn) -> String {
    fn_item
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => parse_string_value(&nv.value).ok(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Code generation
// =============================================================================

fn generate_extraction(param: &ParamInfo) -> TokenStream {
    let rust_name = &param.rust_name;
    let cli_name = &param.cli_name;
    let ty = &param.ty;
    quote! {
        let #rust_name: #ty = __args.take::<#ty>(#cli_name)?;
    }
}

fn generate_parameter(param: &ParamInfo) -> TokenStream {
    let cli_name = &param.cli_name;
    let type_name = &param.type_name;
    let default = match &param.default {
        Some(value) => quote! { ::std::option::Option::Some(#value) },
        None => quote! { ::std::option::Option::None },
    };
    quote! {
        .parameter(#cli_name, ::clipper::TypeTag::from_type_name(#type_name), #default)
    }
}

// =============================================================================
// Main implementation
// =============================================================================

pub fn command_impl(attr: TokenStream, item: TokenStream) -> Result<TokenStream> {
    let cmd_attrs: CommandAttrs = syn::parse2(attr)?;
    let fn_item: ItemFn = syn::parse2(item)?;

    let sig = &fn_item.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(Error::new(asyncness.span(), "#[command] functions cannot be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(Error::new(
            sig.generics.span(),
            "#[command] functions cannot be generic",
        ));
    }

    let fn_name = &sig.ident;
    let fn_vis = &fn_item.vis;
    let command_fn_name = format_ident!("{}__command", fn_name);
    let command_name = cmd_attrs
        .name
        .unwrap_or_else(|| cli_name(&fn_name.unraw().to_string()));

    let mut params: Vec<ParamInfo> = Vec::new();
    for fn_arg in &sig.inputs {
        match fn_arg {
            FnArg::Typed(pat_type) => params.push(analyze_param(pat_type)?),
            FnArg::Receiver(_) => {
                return Err(Error::new(
                    fn_arg.span(),
                    "#[command] functions cannot have self parameter",
                ));
            }
        }
    }

    let extractions: Vec<TokenStream> = params.iter().map(generate_extraction).collect();
    let parameters: Vec<TokenStream> = params.iter().map(generate_parameter).collect();
    let call_args: Vec<&Ident> = params.iter().map(|p| &p.rust_name).collect();
    let call = quote! { #fn_name(#(#call_args),*) };

    let (call_and_return, return_type_name) = match &sig.output {
        ReturnType::Default => (
            quote! {
                #call;
                ::std::result::Result::Ok(::clipper::Value::None)
            },
            String::new(),
        ),
        ReturnType::Type(_, ty) if is_result_type(ty) => (
            quote! { ::clipper::IntoCommandResult::into_command_result(#call) },
            extract_inner_type(ty).map(type_name).unwrap_or_default(),
        ),
        ReturnType::Type(_, ty) => (
            quote! { ::std::result::Result::Ok(::clipper::IntoValue::into_value(#call)) },
            type_name(ty),
        ),
    };

    let doc = doc_text(&fn_item);

    // Strip our annotations from the emitted function's parameters
    let mut clean_fn = fn_item.clone();
    for fn_arg in &mut clean_fn.sig.inputs {
        if let FnArg::Typed(pat_type) = fn_arg {
            pat_type
                .attrs
                .retain(|attr| !attr.path().is_ident("flag") && !attr.path().is_ident("arg"));
        }
    }

    Ok(quote! {
        #clean_fn

        #[doc(hidden)]
        #[allow(non_snake_case)]
        #fn_vis fn #command_fn_name() -> ::clipper::FunctionDef {
            ::clipper::FunctionDef::new(
                #command_name,
                |__args: &::clipper::Arguments| -> ::clipper::Result<::clipper::Value> {
                    #(#extractions)*
                    #call_and_return
                },
            )
            .doc(#doc)
            #(#parameters)*
            .returns(::clipper::TypeTag::from_type_name(#return_type_name))
            .opt_in()
        }
    })
}

/// Input of `commands![a, path::to::b]`.
struct CommandList {
    paths: Punctuated<Path, Token![,]>,
}

impl Parse for CommandList {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(CommandList {
            paths: Punctuated::parse_terminated(input)?,
        })
    }
}

pub fn commands_impl(input: TokenStream) -> Result<TokenStream> {
    let list: CommandList = syn::parse2(input)?;

    let calls = list.paths.into_iter().map(|mut path| {
        if let Some(last) = path.segments.last_mut() {
            last.ident = format_ident!("{}__command", last.ident);
        }
        quote! { #path() }
    });

    Ok(quote! {
        ::std::vec![#(#calls),*]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(attr: TokenStream, item: TokenStream) -> String {
        command_impl(attr, item).unwrap().to_string()
    }

    #[test]
    fn test_parse_command_attrs() {
        let attrs: CommandAttrs = syn::parse2(quote! { name = "ls" }).unwrap();
        assert_eq!(attrs.name, Some("ls".to_string()));

        let attrs: CommandAttrs = syn::parse2(quote! {}).unwrap();
        assert_eq!(attrs.name, None);
    }

    #[test]
    fn test_unknown_command_attr_rejected() {
        assert!(syn::parse2::<CommandAttrs>(quote! { about = "x" }).is_err());
    }

    #[test]
    fn test_default_literals() {
        let cases: Vec<(Expr, DefaultValue)> = vec![
            (syn::parse_quote!("x"), DefaultValue::Str("x".into())),
            (syn::parse_quote!(3), DefaultValue::Int(3)),
            (syn::parse_quote!(-3), DefaultValue::Int(-3)),
            (syn::parse_quote!(1.5), DefaultValue::Float(1.5)),
            (syn::parse_quote!(true), DefaultValue::Bool(true)),
        ];
        for (expr, expected) in cases {
            assert_eq!(DefaultValue::from_expr(&expr).unwrap(), expected);
        }
        let call: Expr = syn::parse_quote!(compute());
        assert!(DefaultValue::from_expr(&call).is_err());
    }

    #[test]
    fn test_type_name() {
        let ty: Type = syn::parse_quote!(Option<u16>);
        assert_eq!(type_name(&ty), "u16");
        let ty: Type = syn::parse_quote!(std::path::PathBuf);
        assert_eq!(type_name(&ty), "PathBuf");
        let ty: Type = syn::parse_quote!((i32, i32));
        assert_eq!(type_name(&ty), "");
    }

    #[test]
    fn test_generates_command_fn() {
        let out = expand(
            quote! {},
            quote! {
                /// Adds.
                fn add(a: i64, #[arg(default = 2)] b: i64) -> i64 { a + b }
            },
        );
        assert!(out.contains("fn add__command"));
        assert!(out.contains("\"add\""));
        assert!(out.contains("\" Adds.\""));
        assert!(out.contains("IntoValue :: into_value"));
        assert!(out.contains("Value :: Int (2i64)"));
    }

    #[test]
    fn test_annotations_are_stripped() {
        let out = expand(
            quote! {},
            quote! {
                fn run(#[flag] dry_run: bool) {}
            },
        );
        assert!(!out.contains("# [flag]"));
        assert!(out.contains("\"dry-run\""));
        assert!(out.contains("\"run\""));
    }

    #[test]
    fn test_raw_identifier_parameter() {
        let out = expand(
            quote! {},
            quote! {
                fn show(r#type: String) {}
            },
        );
        assert!(out.contains("let r#type : String"));
        assert!(out.contains("show (r#type)"));
        assert!(out.contains("\"type\""));
    }

    #[test]
    fn test_command_name_override() {
        let out = expand(quote! { name = "ls" }, quote! { fn list_all() {} });
        assert!(out.contains("\"ls\""));
        assert!(out.contains("fn list_all__command"));
    }

    #[test]
    fn test_result_return_uses_into_command_result() {
        let out = expand(
            quote! {},
            quote! { fn check(path: String) -> anyhow::Result<bool> { Ok(true) } },
        );
        assert!(out.contains("IntoCommandResult :: into_command_result"));
        assert!(out.contains("from_type_name (\"bool\")"));
    }

    #[test]
    fn test_rejects_invalid_signatures() {
        assert!(command_impl(quote! {}, quote! { fn f(&self) {} }).is_err());
        assert!(command_impl(quote! {}, quote! { fn f(s: &str) {} }).is_err());
        assert!(command_impl(quote! {}, quote! { fn f(#[flag] n: u8) {} }).is_err());
        assert!(command_impl(quote! {}, quote! { fn f<T>(t: T) {} }).is_err());
        assert!(command_impl(quote! {}, quote! { async fn f() {} }).is_err());
    }

    #[test]
    fn test_flag_rejects_default() {
        let item = quote! { fn f(#[flag(default = true)] v: bool) {} };
        assert!(command_impl(quote! {}, item).is_err());
    }

    #[test]
    fn test_commands_list() {
        let out = commands_impl(quote! { add, tools::greet }).unwrap().to_string();
        assert!(out.contains("add__command ()"));
        assert!(out.contains("tools :: greet__command ()"));
    }
}
