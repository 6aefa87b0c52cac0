//! Courtesy helper generation for list operations.
//!
//! A list operation can get up to three lookups on its service facade:
//!
//! - `get_<x>_id(name, …)` resolves a name (or keyword) to an id
//! - `get_<x>_by_id(id, …)` fetches the single element with that id
//! - `get_<x>_by_name(name, …)` chains the two
//!
//! Which of them exist depends on the operation's params and response
//! fields. The resolution logic itself lives in `cloudstack_runtime::resolve`.

use std::collections::BTreeSet;

use cloudstack_define::{Operation, Policy, PolicyFlag};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use tracing::warn;

use super::params::{ParamField, param_fields};
use super::responses::ResponseShape;
use crate::naming::{field_ident, ident, method_name, params_type_name, snake_case, type_ident};
use crate::type_map::RustType;

const COURTESY_DOC: &str = " This is a courtesy helper function, which in some cases may not work as expected!";

/// Everything the three helpers share for one list operation.
struct Lookup<'a> {
    fields: Vec<ParamField<'a>>,
    params_type: Ident,
    list_method: Ident,
    list_field: Ident,
    element: Ident,
    /// Singular resource name, used in method names and error messages.
    singular: String,
    count_correction: bool,
}

impl<'a> Lookup<'a> {
    fn field(&self, name: &str) -> Option<&ParamField<'a>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    fn string_field(&self, name: &str) -> Option<&ParamField<'a>> {
        self.field(name).filter(|f| f.ty.is_string())
    }

    fn required(&self) -> impl Iterator<Item = &ParamField<'a>> {
        self.fields.iter().filter(|f| f.param.required)
    }

    /// Optional `isofilter`/`zoneid` params the id lookup also takes.
    fn extras(&self) -> Vec<&ParamField<'a>> {
        let mut names = Vec::new();
        if self.singular == "Iso" {
            names.push("isofilter");
        }
        if self.singular == "Template" || self.singular == "Iso" {
            names.push("zoneid");
        }
        names
            .into_iter()
            .filter_map(|name| self.string_field(name))
            .filter(|f| !f.param.required)
            .collect()
    }

    fn method(&self, suffix: &str) -> String {
        format!("get_{}_{suffix}", snake_case(&self.singular))
    }

    /// The count the lookup trusts, read from the list response `l`.
    fn count_expr(&self) -> TokenStream {
        let list_field = &self.list_field;
        if self.count_correction {
            quote! { l.#list_field.len() as i32 }
        } else {
            quote! { l.count }
        }
    }

    /// Constructor call for the params, with `needle` standing in for the needle param.
    fn construct(&self, needle: Option<(&str, &Ident)>) -> TokenStream {
        let params_type = &self.params_type;
        let args = self.required().map(|f| match needle {
            Some((name, ident)) if f.name() == name => quote! { #ident },
            _ => f.helper_to_constructor(),
        });
        quote! { #params_type::new(#(#args),*) }
    }
}

/// Generates the courtesy helpers for one operation.
///
/// Returns an empty stream for operations that get none. `methods` holds
/// the method names already defined on the facade; helpers that would clash
/// with one are skipped, and the generated names are added to it.
pub fn generate_helpers(
    service: &str,
    op: &Operation,
    policy: &Policy,
    shape: &ResponseShape,
    methods: &mut BTreeSet<String>,
) -> TokenStream {
    if !op.name.starts_with("list") {
        return TokenStream::new();
    }
    let (Some((list_wire, element)), Some(singular)) = (shape.lookup_list(), shape.element.as_deref()) else {
        return TokenStream::new();
    };

    let lookup = Lookup {
        fields: param_fields(service, op),
        params_type: type_ident(&params_type_name(&op.name)),
        list_method: ident(&method_name(&op.name)),
        list_field: field_ident(list_wire),
        element: type_ident(element),
        singular: singular.to_string(),
        count_correction: policy.has(PolicyFlag::CountCorrection),
    };

    if lookup.field("id").is_some_and(|f| f.param.required) {
        return TokenStream::new();
    }

    let mut claim = |name: String| {
        if methods.insert(name.clone()) {
            true
        } else {
            warn!(service, operation = op.name.as_str(), method = name.as_str(), "helper name already taken, skipping");
            false
        }
    };

    let needle = lookup.string_field("name").or_else(|| lookup.string_field("keyword"));
    let has_id_param = lookup.string_field("id").is_some();

    let id_helper = match needle {
        Some(needle) if has_id_and_name_fields(op) => {
            claim(lookup.method("id")).then(|| generate_get_id(&lookup, needle))
        }
        _ => None,
    };
    let by_id_helper = match lookup.string_field("id") {
        Some(id) => claim(lookup.method("by_id")).then(|| generate_get_by_id(&lookup, id)),
        None => None,
    };
    let by_name_helper = match needle {
        Some(needle) if has_id_param && id_helper.is_some() && by_id_helper.is_some() => {
            claim(lookup.method("by_name")).then(|| generate_get_by_name(&lookup, needle))
        }
        _ => None,
    };

    quote! {
        #id_helper
        #by_name_helper
        #by_id_helper
    }
}

/// `id` and `name` are both string fields of the operation's response.
fn has_id_and_name_fields(op: &Operation) -> bool {
    let is_string = |name: &str| {
        op.response_field(name)
            .is_some_and(|f| !f.is_nested() && RustType::from_primitive(&f.kind).is_string())
    };
    is_string("id") && is_string("name")
}

/// Arguments of the id and by-name lookups after the needle.
fn lookup_args<'a>(lookup: &'a Lookup<'a>, needle: &ParamField<'_>) -> Vec<&'a ParamField<'a>> {
    lookup
        .required()
        .filter(|f| f.name() != needle.name())
        .chain(lookup.extras())
        .collect()
}

fn generate_get_id(lookup: &Lookup<'_>, needle: &ParamField<'_>) -> TokenStream {
    let method = format_ident!("{}", lookup.method("id"));
    let needle_arg = &needle.field;
    let args = lookup_args(lookup, needle);
    let arg_defs = args.iter().map(|f| {
        let arg = &f.arg;
        let ty = f.helper_arg_type();
        quote! { #arg: #ty }
    });

    let construct = lookup.construct(Some((needle.name(), needle_arg)));
    let mut setters = Vec::new();
    if !needle.param.required {
        let setter = &needle.setter;
        setters.push(quote! { p.#setter(#needle_arg); });
    }
    for extra in lookup.extras() {
        let setter = &extra.setter;
        let arg = &extra.arg;
        setters.push(quote! { p.#setter(#arg); });
    }
    let binding = if setters.is_empty() { quote! { let p } } else { quote! { let mut p } };

    let list_method = &lookup.list_method;
    let list_field = &lookup.list_field;
    let count = lookup.count_expr();

    quote! {
        #[doc = #COURTESY_DOC]
        pub async fn #method(
            &self,
            #needle_arg: &str,
            #(#arg_defs),*
        ) -> Result<(String, i32), cloudstack_runtime::CloudStackError> {
            #binding = #construct;
            #(#setters)*
            let l = self.#list_method(&p).await?;
            let count = #count;
            cloudstack_runtime::resolve::pick_id_by_name(
                #needle_arg,
                count,
                &l.#list_field,
                |v| v.id.as_str(),
                |v| v.name.as_str(),
            )
        }
    }
}

fn generate_get_by_name(lookup: &Lookup<'_>, needle: &ParamField<'_>) -> TokenStream {
    let method = format_ident!("{}", lookup.method("by_name"));
    let id_method = format_ident!("{}", lookup.method("id"));
    let by_id_method = format_ident!("{}", lookup.method("by_id"));
    let element = &lookup.element;

    let args = lookup_args(lookup, needle);
    let arg_defs = args.iter().map(|f| {
        let arg = &f.arg;
        let ty = f.helper_arg_type();
        quote! { #arg: #ty }
    });
    let id_args = args.iter().map(|f| &f.arg);
    let by_id_args = lookup.required().filter(|f| f.name() != "id").map(|f| {
        if f.name() == needle.name() {
            quote! { name }
        } else {
            let arg = &f.arg;
            quote! { #arg }
        }
    });

    quote! {
        #[doc = #COURTESY_DOC]
        pub async fn #method(
            &self,
            name: &str,
            #(#arg_defs),*
        ) -> Result<(#element, i32), cloudstack_runtime::CloudStackError> {
            let (id, _) = self.#id_method(name, #(#id_args),*).await?;
            self.#by_id_method(&id, #(#by_id_args),*).await
        }
    }
}

fn generate_get_by_id(lookup: &Lookup<'_>, id: &ParamField<'_>) -> TokenStream {
    let method = format_ident!("{}", lookup.method("by_id"));
    let element = &lookup.element;
    let kind = &lookup.singular;

    let args: Vec<_> = lookup.required().filter(|f| f.name() != "id").collect();
    let arg_defs = args.iter().map(|f| {
        let arg = &f.arg;
        let ty = f.helper_arg_type();
        quote! { #arg: #ty }
    });

    let construct = lookup.construct(None);
    let setter = &id.setter;
    let list_method = &lookup.list_method;
    let list_field = &lookup.list_field;
    let count = lookup.count_expr();

    quote! {
        #[doc = #COURTESY_DOC]
        pub async fn #method(
            &self,
            id: &str,
            #(#arg_defs),*
        ) -> Result<(#element, i32), cloudstack_runtime::CloudStackError> {
            let mut p = #construct;
            p.#setter(id);
            let listed = self.#list_method(&p).await.map(|l| (#count, l.#list_field));
            cloudstack_runtime::resolve::resolve_by_id(#kind, id, listed)
        }
    }
}
