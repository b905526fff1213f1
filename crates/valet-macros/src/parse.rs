//! Attribute parsing for `#[derive(Bind)]`.
//!
//! Field attributes are turned into the struct-tag annotation understood by
//! the runtime metadata parser, so a derived plan and a hand-built plan read
//! the same rules.

use syn::{
    punctuated::Punctuated, spanned::Spanned, Attribute, Data, DeriveInput, Expr, ExprLit,
    Fields, Ident, Lit, Meta, Path, Token,
};

/// Options set on the struct itself.
#[derive(Debug)]
pub struct ContainerAttrs {
    /// Path to the runtime crate.
    pub krate: Path,
}

impl ContainerAttrs {
    /// Reads `#[bind(crate = "...")]` from the container attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut krate: Path = syn::parse_quote!(::valet_bind);

        for meta in bind_metas(attrs)? {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("crate") => {
                    krate = syn::parse_str(&string_lit(&nv.value)?)?;
                }
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "unknown container attribute, expected `crate = \"...\"`",
                    ))
                }
            }
        }

        Ok(Self { krate })
    }
}

/// A field that takes part in binding.
#[derive(Debug)]
pub struct BindableField {
    /// The field identifier.
    pub ident: Ident,
    /// The Rust field name, without a raw identifier prefix.
    pub field_name: String,
    /// The generated annotation.
    pub annotation: String,
}

/// Collects the bindable fields of a derive input.
pub fn bindable_fields(input: &DeriveInput) -> syn::Result<Vec<BindableField>> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Bind cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => return Ok(Vec::new()),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "Bind can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Bind can only be derived for structs",
            ))
        }
    };

    let mut out = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let Some(annotation) = field_annotation(&field.attrs)? else {
            continue;
        };

        let field_name = ident.to_string().trim_start_matches("r#").to_string();
        out.push(BindableField {
            ident,
            field_name,
            annotation,
        });
    }
    Ok(out)
}

/// Builds the annotation for a field, or `None` when the field is skipped.
fn field_annotation(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut parts: Vec<String> = Vec::new();
    let mut raw: Vec<String> = Vec::new();

    for meta in bind_metas(attrs)? {
        match &meta {
            Meta::Path(path) if path.is_ident("skip") => return Ok(None),
            Meta::Path(path) if path.is_ident("required") => parts.push("required".to_string()),
            Meta::NameValue(nv) => {
                let key = nv
                    .path
                    .get_ident()
                    .ok_or_else(|| syn::Error::new(nv.path.span(), "expected identifier"))?
                    .to_string();

                match key.as_str() {
                    "from" => {
                        let value = string_lit(&nv.value)?;
                        if !matches!(value.as_str(), "path" | "query" | "header" | "body") {
                            return Err(syn::Error::new(
                                nv.value.span(),
                                "expected one of \"path\", \"query\", \"header\", \"body\"",
                            ));
                        }
                        parts.push(tag("from", &value));
                    }
                    "name" | "pattern" => parts.push(tag(&key, &string_lit(&nv.value)?)),
                    "min" | "max" | "default" => parts.push(tag(&key, &literal_text(&nv.value)?)),
                    "required" => {
                        if bool_lit(&nv.value)? {
                            parts.push("required".to_string());
                        }
                    }
                    _ => {
                        return Err(syn::Error::new(
                            nv.path.span(),
                            format!("unknown bind attribute: {key}"),
                        ))
                    }
                }
            }
            _ => {
                return Err(syn::Error::new(
                    meta.span(),
                    "expected `skip`, `required` or `key = value`",
                ))
            }
        }
    }

    for attr in attrs.iter().filter(|a| a.path().is_ident("bind")) {
        if let Meta::List(list) = &attr.meta {
            if let Ok(lit) = list.parse_args::<syn::LitStr>() {
                raw.push(lit.value());
            }
        }
    }

    parts.extend(raw);
    Ok(Some(parts.join(" ")))
}

/// Returns the nested metas of every `#[bind(...)]` attribute.
///
/// An attribute holding a single string literal is a raw annotation and
/// yields no metas.
fn bind_metas(attrs: &[Attribute]) -> syn::Result<Vec<Meta>> {
    let mut metas = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("bind")) {
        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new(attr.span(), "expected `#[bind(...)]`"));
        };
        if list.parse_args::<syn::LitStr>().is_ok() {
            continue;
        }
        metas.extend(list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?);
    }
    Ok(metas)
}

fn tag(key: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{key}:\"{escaped}\"")
}

fn string_lit(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        _ => Err(syn::Error::new(expr.span(), "expected string literal")),
    }
}

fn bool_lit(expr: &Expr) -> syn::Result<bool> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Bool(b), ..
        }) => Ok(b.value),
        _ => Err(syn::Error::new(expr.span(), "expected `true` or `false`")),
    }
}

/// Accepts string, integer, float and boolean literals, with an optional
/// leading minus for numbers.
fn literal_text(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_string()),
            Lit::Float(f) => Ok(f.base10_digits().to_string()),
            Lit::Bool(b) => Ok(b.value.to_string()),
            _ => Err(syn::Error::new(lit.span(), "unsupported literal")),
        },
        Expr::Unary(unary) if matches!(unary.op, syn::UnOp::Neg(_)) => {
            Ok(format!("-{}", literal_text(&unary.expr)?))
        }
        _ => Err(syn::Error::new(expr.span(), "expected literal")),
    }
}
