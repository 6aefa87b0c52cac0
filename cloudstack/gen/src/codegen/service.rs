//! Per-service module assembly.

use std::collections::BTreeSet;

use cloudstack_define::policy_for;
use proc_macro2::TokenStream;
use quote::quote;
use tracing::debug;

use super::custom::generate_custom_module;
use super::helpers::generate_helpers;
use super::operations::generate_operation;
use super::params::generate_params;
use super::responses::{build_records, render_record, response_shape};
use crate::grouper::Service;
use crate::naming::{method_name, type_ident};
use crate::registry::TypeRegistry;

/// Generates the module file of one service.
///
/// Operations are emitted in service order. For each one the module holds
/// its params struct, an `impl` block on the facade with the operation
/// method and its courtesy helpers, and then the response records.
///
/// The registry must already hold every top-level name of the crate, so
/// that nested records never take a name a later service needs.
///
/// ## Examples
///
/// ```ignore
/// let (mut registry, _failed) = seed_registry(&services);
/// let tokens = generate_service_module(&services[0], &mut registry);
/// let file = validate_code(&tokens)?;
/// ```
pub fn generate_service_module(service: &Service, registry: &mut TypeRegistry) -> TokenStream {
    if service.is_custom() {
        return generate_custom_module();
    }

    let doc = format!(" Operations of `{}`.", service.name);
    let facade = type_ident(&service.name);

    let mut methods: BTreeSet<String> = service.operations.iter().map(|op| method_name(&op.name)).collect();
    let mut items = Vec::with_capacity(service.operations.len());

    for op in &service.operations {
        let policy = policy_for(&service.name, &op.name);
        if !policy.is_empty() {
            let flags: Vec<String> = policy.flags().map(|f| f.to_string()).collect();
            debug!(
                service = service.name.as_str(),
                operation = op.name.as_str(),
                flags = %flags.join(","),
                "applying policy"
            );
        }

        let shape = response_shape(op, registry);
        let records = build_records(op, registry);

        let params = generate_params(&service.name, op, &policy);
        let method = generate_operation(op, &policy, &shape);
        let helpers = generate_helpers(&service.name, op, &policy, &shape, &mut methods);
        let records = records.iter().map(render_record);

        items.push(quote! {
            #params

            impl #facade {
                #method

                #helpers
            }

            #(#records)*
        });
    }

    let imports = (!service.operations.is_empty()).then(|| quote! { use crate::*; });

    quote! {
        #![doc = #doc]

        #imports

        #(#items)*
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{nested, operation, param, render, response};

    fn zone_service() -> Service {
        let mut list = operation("listZones", &[param("id", "uuid", false), param("name", "string", false)]);
        list.response = vec![
            response("id", "string"),
            response("name", "string"),
            nested("tags", vec![response("key", "string"), response("value", "string")]),
        ];
        let mut delete = operation("deleteZone", &[param("id", "uuid", true)]);
        delete.response = vec![response("displaytext", "string"), response("success", "boolean")];

        let mut service = Service::new("ZoneService");
        service.operations = vec![list, delete];
        service
    }

    fn seeded(service: &Service) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        for op in &service.operations {
            for name in crate::codegen::responses::top_level_names(op) {
                registry.reserve(&name);
            }
        }
        registry
    }

    #[test]
    fn module_holds_params_methods_and_records() {
        let service = zone_service();
        let code = render(&generate_service_module(&service, &mut seeded(&service)));

        assert!(code.contains("//! Operations of `ZoneService`."), "module doc missing:\n{code}");
        assert!(code.contains("use crate::*;"), "crate import missing:\n{code}");
        assert!(code.contains("pub struct ListZonesParams"), "params missing:\n{code}");
        assert!(code.contains("impl ZoneService"), "facade impl missing:\n{code}");
        assert!(code.contains("pub async fn list_zones("), "list method missing:\n{code}");
        assert!(code.contains("pub async fn delete_zone("), "delete method missing:\n{code}");
        assert!(code.contains("pub async fn get_zone_by_name("), "helper missing:\n{code}");
        assert!(code.contains("pub struct ListZonesResponse"), "wrapper missing:\n{code}");
        assert!(code.contains("pub struct Zone "), "element missing:\n{code}");
        assert!(code.contains("pub struct Tags"), "shared record missing:\n{code}");
        assert!(code.contains("pub struct DeleteZoneResponse"), "delete response missing:\n{code}");
    }

    #[test]
    fn output_is_deterministic() {
        let service = zone_service();
        let first = render(&generate_service_module(&service, &mut seeded(&service)));
        let second = render(&generate_service_module(&service, &mut seeded(&service)));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_service_has_no_import() {
        let service = Service::new("EmptyService");
        let code = render(&generate_service_module(&service, &mut TypeRegistry::new()));
        assert!(!code.contains("use crate"), "unused import:\n{code}");
    }

    #[test]
    fn custom_service_gets_free_form_request() {
        let service = Service::new("CustomService");
        let code = render(&generate_service_module(&service, &mut TypeRegistry::new()));
        assert!(code.contains("pub async fn custom_request"), "custom request missing:\n{code}");
    }
}
