//! Parameter struct generation.
//!
//! Every operation gets an `<Op>Params` struct with one private optional
//! field per distinct param, a constructor taking the required params, one
//! setter per param, and `to_query()` which encodes the set fields for the
//! wire.

use std::collections::BTreeSet;

use cloudstack_define::{Operation, Param, Policy, PolicyFlag};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

use crate::naming::{field_name, ident, param_arg_name, params_type_name, type_ident};
use crate::type_map::RustType;

/// A param together with the identifiers generated for it.
#[derive(Debug, Clone)]
pub struct ParamField<'a> {
    pub param: &'a Param,
    pub ty: RustType,
    /// Struct field.
    pub field: Ident,
    /// `set_<name>` method.
    pub setter: Ident,
    /// Argument name in constructors and helpers.
    pub arg: Ident,
}

impl ParamField<'_> {
    /// Wire name of the param.
    pub fn name(&self) -> &str {
        &self.param.name
    }

    /// Argument type used by the constructor.
    pub fn constructor_arg_type(&self) -> TokenStream {
        if self.ty.is_string() {
            quote! { impl Into<String> }
        } else {
            self.ty.tokens()
        }
    }

    /// Argument type used by courtesy helpers, which pass their arguments on more than once.
    pub fn helper_arg_type(&self) -> TokenStream {
        match self.ty {
            RustType::Bool | RustType::I32 | RustType::I64 | RustType::F64 => self.ty.tokens(),
            _ if self.ty.is_string() => quote! { &str },
            _ => {
                let ty = self.ty.tokens();
                quote! { &#ty }
            }
        }
    }

    /// Expression converting a helper argument into a constructor argument.
    pub fn helper_to_constructor(&self) -> TokenStream {
        let arg = &self.arg;
        match self.ty {
            RustType::Bool | RustType::I32 | RustType::I64 | RustType::F64 => quote! { #arg },
            _ if self.ty.is_string() => quote! { #arg },
            _ => quote! { #arg.clone() },
        }
    }
}

/// Returns the distinct params of an operation in declaration order.
///
/// The first declaration of a name wins; params whose field identifiers
/// would collide are dropped the same way.
pub fn param_fields<'a>(service: &str, op: &'a Operation) -> Vec<ParamField<'a>> {
    let mut seen_names = BTreeSet::new();
    let mut seen_fields = BTreeSet::new();
    let mut fields = Vec::with_capacity(op.params.len());

    for param in &op.params {
        if param.name.is_empty() || !seen_names.insert(param.name.as_str()) {
            continue;
        }
        let name = field_name(&param.name);
        if !seen_fields.insert(name.clone()) {
            continue;
        }
        fields.push(ParamField {
            param,
            ty: RustType::for_param(&param.kind),
            field: ident(&name),
            setter: format_ident!("set_{}", name.trim_start_matches('_')),
            arg: ident(&param_arg_name(service, &param.name)),
        });
    }

    fields
}

/// Generates the `<Op>Params` struct and its impl.
///
/// ## Examples
///
/// For `listZones` with an optional `name` and a required `domainid`:
/// ```ignore
/// pub struct ListZonesParams {
///     domainid: Option<String>,
///     name: Option<String>,
/// }
///
/// impl ListZonesParams {
///     pub fn new(domainid: impl Into<String>) -> Self { ... }
///     pub fn set_domainid(&mut self, v: impl Into<String>) -> &mut Self { ... }
///     pub fn set_name(&mut self, v: impl Into<String>) -> &mut Self { ... }
///     pub fn to_query(&self) -> cloudstack_runtime::Query { ... }
/// }
/// ```
pub fn generate_params(service: &str, op: &Operation, policy: &Policy) -> TokenStream {
    let struct_name = type_ident(&params_type_name(&op.name));
    let fields = param_fields(service, op);
    let doc = format!(" Parameters for `{}`.", op.name);

    let field_defs = fields.iter().map(|f| {
        let field = &f.field;
        let ty = f.ty.tokens();
        quote! { #field: Option<#ty> }
    });

    let constructor = generate_constructor(&fields);
    let setters = fields.iter().map(generate_setter);
    let to_query = generate_to_query(&fields, policy.has(PolicyFlag::DetailsKeyValue));

    let required_count = fields.iter().filter(|f| f.param.required).count();
    let allow_default = (required_count == 0).then(|| quote! { #[allow(clippy::new_without_default)] });

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq)]
        pub struct #struct_name {
            #(#field_defs,)*
        }

        #allow_default
        impl #struct_name {
            #constructor

            #(#setters)*

            #to_query
        }
    }
}

fn generate_constructor(fields: &[ParamField<'_>]) -> TokenStream {
    let args = fields.iter().filter(|f| f.param.required).map(|f| {
        let arg = &f.arg;
        let ty = f.constructor_arg_type();
        quote! { #arg: #ty }
    });

    let inits = fields.iter().map(|f| {
        let field = &f.field;
        let arg = &f.arg;
        match (f.param.required, f.ty.is_string()) {
            (true, true) => quote! { #field: Some(#arg.into()) },
            (true, false) => quote! { #field: Some(#arg) },
            (false, _) => quote! { #field: None },
        }
    });

    quote! {
        /// Creates the parameters with every required field set.
        pub fn new(#(#args),*) -> Self {
            Self {
                #(#inits,)*
            }
        }
    }
}

fn generate_setter(f: &ParamField<'_>) -> TokenStream {
    let field = &f.field;
    let setter = &f.setter;
    let doc = if f.param.description.is_empty() {
        format!(" Sets `{}`.", f.name())
    } else {
        format!(" {}", f.param.description.trim())
    };

    if f.ty.is_string() {
        quote! {
            #[doc = #doc]
            pub fn #setter(&mut self, v: impl Into<String>) -> &mut Self {
                self.#field = Some(v.into());
                self
            }
        }
    } else {
        let ty = f.ty.tokens();
        quote! {
            #[doc = #doc]
            pub fn #setter(&mut self, v: #ty) -> &mut Self {
                self.#field = Some(v);
                self
            }
        }
    }
}

fn generate_to_query(fields: &[ParamField<'_>], details_key_value: bool) -> TokenStream {
    if fields.is_empty() {
        return quote! {
            /// Encodes the set parameters for the wire.
            pub fn to_query(&self) -> cloudstack_runtime::Query {
                cloudstack_runtime::Query::new()
            }
        };
    }

    let encoders = fields.iter().map(|f| {
        let field = &f.field;
        let wire = f.name();
        let set = match f.ty {
            RustType::Bool | RustType::I32 | RustType::I64 | RustType::F64 => {
                quote! { query.set_display(#wire, v); }
            }
            RustType::StringList => quote! { query.set_list(#wire, v); },
            RustType::StringMap => quote! {
                query.set_map(
                    #wire,
                    v,
                    cloudstack_runtime::MapEncoding::for_field(#wire, #details_key_value),
                );
            },
            RustType::ValueList => quote! { query.set_values(#wire, v); },
            RustType::RawValue => quote! { query.set(#wire, v.to_string()); },
            _ => quote! { query.set(#wire, v.as_str()); },
        };
        quote! {
            if let Some(v) = &self.#field {
                #set
            }
        }
    });

    quote! {
        /// Encodes the set parameters for the wire.
        pub fn to_query(&self) -> cloudstack_runtime::Query {
            let mut query = cloudstack_runtime::Query::new();
            #(#encoders)*
            query
        }
    }
}
