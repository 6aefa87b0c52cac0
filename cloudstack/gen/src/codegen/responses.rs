//! Response record generation.
//!
//! Building and rendering are separate steps. [`build_records`] walks an
//! operation's response tree and produces [`RecordDef`] descriptors, claiming
//! type names from the [`TypeRegistry`] as it goes. [`render_record`] turns a
//! descriptor into a struct.
//!
//! ## Naming
//!
//! - The top-level record is `<Op>Response` (a leading `configure` is dropped).
//! - List operations get a wrapper with `count` and a list of element
//!   records named after the singular of the listed resource.
//! - Nested records are named `<Parent><Field>`, except the shared rule, nic
//!   and tags families.

use std::collections::BTreeSet;

use cloudstack_define::{Operation, ResponseField};
use proc_macro2::TokenStream;
use quote::quote;

use crate::naming::{field_ident, field_ident_text, list_element_name, response_type_name, type_ident};
use crate::registry::TypeRegistry;
use crate::type_map::{OUT_OF_BAND_RECORD, RustType, VIRTUAL_MACHINE_RECORD};

/// The type of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(RustType),
    /// A list of generated records.
    Records(String),
    /// A list of the runtime's `SecondaryIp`.
    SecondaryIps,
}

/// One field of a generated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Name on the wire.
    pub wire: String,
    pub ty: FieldType,
}

impl FieldDef {
    pub fn new(wire: impl Into<String>, ty: FieldType) -> Self {
        Self { wire: wire.into(), ty }
    }

    fn scalar(wire: impl Into<String>, ty: RustType) -> Self {
        Self::new(wire, FieldType::Scalar(ty))
    }
}

/// A generated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
    /// Decode through `cloudstack_runtime::compat::coerce_record` first.
    pub custom_decode: bool,
}

impl RecordDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            custom_decode: false,
        }
    }

    /// Returns the field with the given wire name.
    pub fn field(&self, wire: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.wire == wire)
    }

    /// Returns `true` if the record has a string field with the given wire name.
    pub fn has_string_field(&self, wire: &str) -> bool {
        matches!(self.field(wire), Some(FieldDef { ty: FieldType::Scalar(ty), .. }) if ty.is_string())
    }
}

/// A list carried by a list wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListField {
    /// Wire key of the list.
    pub wire: String,
    /// Element record, or `None` when the element is a raw JSON value.
    pub element: Option<String>,
}

/// Shape of an operation's top-level response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseShape {
    /// Name of the top-level record the operation returns.
    pub name: String,
    /// Lists of a list wrapper, empty for plain records.
    pub lists: Vec<ListField>,
    /// The element record built from the catalog response tree, for wrappers.
    pub element: Option<String>,
}

impl ResponseShape {
    /// Returns `true` for operations whose result is a counted list.
    pub fn is_list(&self) -> bool {
        !self.lists.is_empty()
    }

    /// The list courtesy helpers resolve against, with its element record.
    pub fn lookup_list(&self) -> Option<(&str, &str)> {
        let list = self.lists.last()?;
        Some((list.wire.as_str(), list.element.as_deref()?))
    }
}

/// Returns `true` for operations that get a counted list wrapper.
pub fn is_list_operation(op: &Operation) -> bool {
    op.name.starts_with("list") || op.name == "registerTemplate"
}

/// Returns the top-level type names an operation will claim.
///
/// Used to reserve them before any nested name is handed out.
pub fn top_level_names(op: &Operation) -> Vec<String> {
    let mut names = vec![response_type_name(&op.name)];
    if is_list_operation(op) {
        names.push(list_element_name(&op.name));
    }
    names
}

/// Computes the top-level shape of an operation's response.
pub fn response_shape(op: &Operation, registry: &TypeRegistry) -> ResponseShape {
    let name = response_type_name(&op.name);
    if !is_list_operation(op) {
        return ResponseShape {
            name,
            lists: Vec::new(),
            element: None,
        };
    }

    let element = list_element_name(&op.name);
    let lists = match op.name.as_str() {
        "listAsyncJobs" => vec![list_of("asyncjobs", &element)],
        "listEgressFirewallRules" => vec![list_of("firewallrule", &element)],
        "registerTemplate" => vec![list_of("template", &element)],
        "listLoadBalancerRuleInstances" => vec![
            list_of("lbrulevmidip", &element),
            ListField {
                wire: "loadbalancerruleinstance".to_string(),
                element: registry
                    .contains(VIRTUAL_MACHINE_RECORD)
                    .then(|| VIRTUAL_MACHINE_RECORD.to_string()),
            },
        ],
        _ => vec![list_of(&element.to_lowercase(), &element)],
    };

    ResponseShape {
        name,
        lists,
        element: Some(element),
    }
}

fn list_of(wire: &str, element: &str) -> ListField {
    ListField {
        wire: wire.to_string(),
        element: Some(element.to_string()),
    }
}

/// Builds every record an operation's response needs, in emission order.
///
/// The top-level names must already be reserved (see [`top_level_names`]);
/// nested names are claimed here. Shared records that already exist are
/// referenced, not rebuilt.
pub fn build_records(op: &Operation, registry: &mut TypeRegistry) -> Vec<RecordDef> {
    let shape = response_shape(op, registry);
    let mut records = Vec::new();

    let top = match &shape.element {
        Some(element) => {
            let mut wrapper = RecordDef::new(&shape.name);
            wrapper.fields.push(FieldDef::scalar("count", RustType::I32));
            for list in &shape.lists {
                let ty = match &list.element {
                    Some(element) => FieldType::Records(element.clone()),
                    None => FieldType::Scalar(RustType::ValueList),
                };
                wrapper.fields.push(FieldDef::new(&list.wire, ty));
            }
            if op.is_async {
                wrapper.fields.push(FieldDef::scalar("jobid", RustType::String));
            }
            records.push(wrapper);
            element.clone()
        }
        None => shape.name.clone(),
    };

    let start = records.len();
    expand_record(&top, &op.response, op.is_async, registry, &mut records);

    if op.is_async && shape.element.is_none() {
        let record = &mut records[start];
        if record.field("jobid").is_none() {
            record.fields.push(FieldDef::scalar("jobid", RustType::String));
        }
    }

    records
}

/// Builds `name` and, after it, every nested record it creates.
///
/// Children get their names in field order; the created children are then
/// expanded last-declared-first.
fn expand_record(
    name: &str,
    fields: &[ResponseField],
    top_level_async: bool,
    registry: &mut TypeRegistry,
    out: &mut Vec<RecordDef>,
) {
    let mut sorted: Vec<&ResponseField> = fields.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut record = RecordDef::new(name);
    let mut seen = BTreeSet::new();
    let mut children: Vec<(String, &[ResponseField])> = Vec::new();

    for field in sorted {
        if field.name.is_empty() || !seen.insert(field_ident_text(&field.name)) {
            continue;
        }

        if field.name == "secondaryip" {
            record.fields.push(FieldDef::new(&field.name, FieldType::SecondaryIps));
            continue;
        }

        if field.is_nested() {
            let (child, created) = registry.unique_type_name(name, &field.name);
            if created {
                children.push((child.clone(), field.response.as_slice()));
            }
            record.fields.push(FieldDef::new(&field.name, FieldType::Records(child)));
            continue;
        }

        let ty = match field.name.as_str() {
            "success" => {
                if !top_level_async {
                    record.custom_decode = true;
                }
                RustType::Bool
            }
            "ostypeid" => {
                record.custom_decode = true;
                RustType::String
            }
            _ => RustType::from_primitive(&field.kind).resolve_records(|r| registry.contains(r)),
        };
        let ty = match ty {
            RustType::OutOfBandManagement if name == OUT_OF_BAND_RECORD => RustType::RawValue,
            ty => ty,
        };
        record.fields.push(FieldDef::scalar(&field.name, ty));
    }

    out.push(record);

    for (child, fields) in children.into_iter().rev() {
        expand_record(&child, fields, false, registry, out);
    }
}

/// Returns `true` when the response only reports success and a message.
///
/// The job result of such operations is used as-is instead of being unwrapped.
pub fn is_success_only_response(op: &Operation) -> bool {
    op.response_field("success").is_some() && op.response_field("displaytext").is_some()
}

fn field_type_tokens(ty: &FieldType) -> TokenStream {
    match ty {
        FieldType::Scalar(ty) => ty.tokens(),
        FieldType::Records(name) => {
            let name = type_ident(name);
            quote! { Vec<#name> }
        }
        FieldType::SecondaryIps => quote! { Vec<cloudstack_runtime::SecondaryIp> },
    }
}

/// Renders a record as a struct.
///
/// Records needing coercion get `#[serde(remote = "Self")]` plus manual
/// `Deserialize`/`Serialize` impls that run
/// `cloudstack_runtime::compat::coerce_record` before the derived decode.
pub fn render_record(record: &RecordDef) -> TokenStream {
    let name = type_ident(&record.name);

    let fields = record.fields.iter().map(|f| {
        let ident = field_ident(&f.wire);
        let ty = field_type_tokens(&f.ty);
        let rename = (field_ident_text(&f.wire) != f.wire).then(|| {
            let wire = &f.wire;
            quote! { #[serde(rename = #wire)] }
        });
        quote! {
            #rename
            pub #ident: #ty
        }
    });

    if !record.custom_decode {
        return quote! {
            #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
            #[serde(default)]
            pub struct #name {
                #(#fields,)*
            }
        };
    }

    quote! {
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default, remote = "Self")]
        pub struct #name {
            #(#fields,)*
        }

        impl<'de> serde::Deserialize<'de> for #name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let mut record =
                    <serde_json::Map<String, serde_json::Value> as serde::Deserialize>::deserialize(deserializer)?;
                cloudstack_runtime::compat::coerce_record(&mut record);
                #name::deserialize(serde_json::Value::Object(record)).map_err(serde::de::Error::custom)
            }
        }

        impl serde::Serialize for #name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                #name::serialize(self, serializer)
            }
        }
    }
}
