//! Identifier derivation for generated code.
//!
//! Catalog names are camel-case operation names (`listVirtualMachines`) and
//! lower-case wire names (`serviceofferingid`). This module turns them into
//! Rust type names, snake-case method/field names and safe identifiers.

use proc_macro2::{Ident, Span};

/// Rust keywords that cannot be used as bare identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that are not allowed as raw identifiers either.
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// Upper-cases the first character.
///
/// `jobid` is special-cased to `JobID`.
///
/// ## Examples
///
/// ```
/// use cloudstack_gen::naming::capitalize;
///
/// assert_eq!(capitalize("listZones"), "ListZones");
/// assert_eq!(capitalize("jobid"), "JobID");
/// ```
pub fn capitalize(s: &str) -> String {
    if s == "jobid" {
        return "JobID".to_string();
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first character.
pub fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives the singular form of a plural name.
///
/// Only three rules apply: `ies` → `y`, `sses` → `ss`, and a trailing `s` is
/// dropped. Irregular plurals are left as they are.
///
/// ## Examples
///
/// ```
/// use cloudstack_gen::naming::singularize;
///
/// assert_eq!(singularize("Policies"), "Policy");
/// assert_eq!(singularize("Addresses"), "Address");
/// assert_eq!(singularize("Zones"), "Zone");
/// assert_eq!(singularize("Status"), "Statu");
/// ```
pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if name.ends_with("sses") {
        return name[..name.len() - 2].to_string();
    }
    name.strip_suffix('s').unwrap_or(name).to_string()
}

/// Converts a camel-case name to snake case.
///
/// Runs of capitals are treated as one acronym, and a lower-case `s` closing
/// an acronym stays attached to it. Characters that cannot appear in an
/// identifier become `_`.
///
/// ## Examples
///
/// ```
/// use cloudstack_gen::naming::snake_case;
///
/// assert_eq!(snake_case("listVirtualMachines"), "list_virtual_machines");
/// assert_eq!(snake_case("listVPCs"), "list_vpcs");
/// assert_eq!(snake_case("createVPCOffering"), "create_vpc_offering");
/// assert_eq!(snake_case("GuestOSService"), "guest_os_service");
/// ```
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.is_empty() && !out.ends_with('_') {
                let prev = chars[i - 1];
                let next = chars.get(i + 1).copied();
                let after_lower = prev.is_ascii_lowercase() || prev.is_ascii_digit();
                let acronym_end = prev.is_ascii_uppercase()
                    && next.is_some_and(|n| n.is_ascii_lowercase())
                    && !is_plural_tail(&chars, i + 1);
                if after_lower || acronym_end {
                    out.push('_');
                }
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// An `s` that ends the name or is followed by a capital.
fn is_plural_tail(chars: &[char], i: usize) -> bool {
    chars.get(i) == Some(&'s') && chars.get(i + 1).is_none_or(|c| c.is_ascii_uppercase())
}

/// Returns the snake-case field name for a wire name.
///
/// The result is always a valid identifier once keywords are escaped by
/// [`ident`].
pub fn field_name(wire: &str) -> String {
    let mut name = snake_case(wire);
    if name.is_empty() {
        name.push_str("field");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Builds an identifier, escaping Rust keywords.
///
/// Keywords become raw identifiers (`r#type`); the few that cannot be raw
/// get a trailing underscore (`self_`).
pub fn ident(name: &str) -> Ident {
    if NON_RAW_KEYWORDS.contains(&name) || name == "_" {
        Ident::new(&format!("{name}_"), Span::call_site())
    } else if KEYWORDS.contains(&name) {
        Ident::new_raw(name, Span::call_site())
    } else {
        Ident::new(name, Span::call_site())
    }
}

/// Returns the field identifier for a wire name.
pub fn field_ident(wire: &str) -> Ident {
    ident(&field_name(wire))
}

/// Returns the bare identifier text of [`field_ident`], without any `r#` prefix.
///
/// Serde strips the raw prefix itself, so this is what the field decodes from
/// when no rename is emitted.
pub fn field_ident_text(wire: &str) -> String {
    field_ident(wire).to_string().trim_start_matches("r#").to_string()
}

/// Sanitizes a name for use inside a type identifier.
fn type_part(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect()
}

/// Builds a record type name from a parent prefix and a field name.
pub fn type_name(prefix: &str, field: &str) -> String {
    let name = format!("{prefix}{}", capitalize(&type_part(field)));
    if name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name
    } else {
        format!("T{name}")
    }
}

/// Builds a type identifier from an already derived type name.
pub fn type_ident(name: &str) -> Ident {
    Ident::new(&type_part(name), Span::call_site())
}

/// Name of the generated parameter struct for an operation.
pub fn params_type_name(operation: &str) -> String {
    type_name("", &format!("{operation}Params"))
}

/// Name of the top-level response record for an operation.
///
/// A leading `configure` is dropped: `configureOutOfBandManagement` →
/// `OutOfBandManagementResponse`.
pub fn response_type_name(operation: &str) -> String {
    let base = operation.strip_prefix("configure").unwrap_or(operation);
    type_name("", &format!("{base}Response"))
}

/// Name of the element record of a list operation (`listZones` → `Zone`).
pub fn list_element_name(operation: &str) -> String {
    let base = operation.strip_prefix("list").unwrap_or(operation);
    singularize(&type_name("", base))
}

/// Module file stem for a service (`VirtualMachineService` → `virtual_machine_service`).
pub fn module_name(service: &str) -> String {
    snake_case(service)
}

/// Field name of a service facade on the client (`VirtualMachineService` → `virtual_machine`).
pub fn facade_field(service: &str) -> String {
    snake_case(service.strip_suffix("Service").unwrap_or(service))
}

/// Method name for an operation (`listZones` → `list_zones`).
pub fn method_name(operation: &str) -> String {
    field_name(operation)
}

/// Argument name used for a param in constructors and helpers.
///
/// A param literally named `type` is qualified with the service it belongs
/// to, so `NetworkService` gets `network_type`.
pub fn param_arg_name(service: &str, param: &str) -> String {
    if param == "type" {
        let stem = service.strip_suffix("Service").unwrap_or(service);
        return format!("{}_type", snake_case(&uncapitalize(stem)));
    }
    field_name(param)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_handles_empty_and_jobid() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("jobid"), "JobID");
        assert_eq!(capitalize("nic"), "Nic");
    }

    #[test]
    fn uncapitalize_lowers_first_char() {
        assert_eq!(uncapitalize("VirtualMachine"), "virtualMachine");
        assert_eq!(uncapitalize(""), "");
    }

    #[test]
    fn singularize_follows_three_rules() {
        assert_eq!(singularize("NetworkOfferings"), "NetworkOffering");
        assert_eq!(singularize("Capabilities"), "Capability");
        assert_eq!(singularize("IpAddresses"), "IpAddress");
        assert_eq!(singularize("Template"), "Template");
    }

    #[test]
    fn snake_case_splits_acronyms() {
        assert_eq!(snake_case("listSSHKeyPairs"), "list_ssh_key_pairs");
        assert_eq!(snake_case("listNetworkACLs"), "list_network_acls");
        assert_eq!(snake_case("createNetworkACLList"), "create_network_acl_list");
        assert_eq!(snake_case("disableHAForZone"), "disable_ha_for_zone");
        assert_eq!(snake_case("ISOService"), "iso_service");
        assert_eq!(snake_case("SSHService"), "ssh_service");
        assert_eq!(snake_case("createIpv6FirewallRule"), "create_ipv6_firewall_rule");
    }

    #[test]
    fn snake_case_keeps_lowercase_wire_names() {
        assert_eq!(snake_case("serviceofferingid"), "serviceofferingid");
        assert_eq!(snake_case("isDynamicallyScalable"), "is_dynamically_scalable");
    }

    #[test]
    fn snake_case_replaces_invalid_characters() {
        assert_eq!(snake_case("cpu.speed"), "cpu_speed");
        assert_eq!(snake_case("a--b"), "a_b");
    }

    #[test]
    fn field_ident_escapes_keywords() {
        assert_eq!(field_ident("type").to_string(), "r#type");
        assert_eq!(field_ident("self").to_string(), "self_");
        assert_eq!(field_ident("zoneid").to_string(), "zoneid");
        assert_eq!(field_ident_text("type"), "type");
    }

    #[test]
    fn field_name_prefixes_leading_digits() {
        assert_eq!(field_name("3par"), "_3par");
    }

    #[test]
    fn operation_type_names() {
        assert_eq!(params_type_name("listZones"), "ListZonesParams");
        assert_eq!(response_type_name("deployVirtualMachine"), "DeployVirtualMachineResponse");
        assert_eq!(
            response_type_name("configureOutOfBandManagement"),
            "OutOfBandManagementResponse"
        );
        assert_eq!(list_element_name("listVirtualMachines"), "VirtualMachine");
        assert_eq!(list_element_name("listVPCs"), "VPC");
        assert_eq!(list_element_name("registerTemplate"), "RegisterTemplate");
    }

    #[test]
    fn nested_type_names_take_parent_prefix() {
        assert_eq!(type_name("VirtualMachine", "affinitygroup"), "VirtualMachineAffinitygroup");
        assert_eq!(type_name("", "3d"), "T3d");
    }

    #[test]
    fn service_derived_names() {
        assert_eq!(module_name("VirtualMachineService"), "virtual_machine_service");
        assert_eq!(facade_field("VirtualMachineService"), "virtual_machine");
        assert_eq!(facade_field("GuestOSService"), "guest_os");
        assert_eq!(facade_field("CustomService"), "custom");
    }

    #[test]
    fn type_param_is_qualified_by_service() {
        assert_eq!(param_arg_name("NetworkService", "type"), "network_type");
        assert_eq!(param_arg_name("VirtualMachineService", "type"), "virtual_machine_type");
        assert_eq!(param_arg_name("NetworkService", "zoneid"), "zoneid");
    }
}
