//! Grouping of catalog operations into services.

use cloudstack_define::{CUSTOM_SERVICE, Layout, Operation, OperationIndex};
use tracing::{debug, warn};

use crate::errors::GeneratorError;
use crate::naming::{facade_field, module_name};

/// A named group of operations, generated as one facade and one module.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    /// Operations in layout order, each with its params sorted by name.
    pub operations: Vec<Operation>,
}

impl Service {
    /// Creates an empty service.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Returns `true` for the free-form service without catalog operations.
    pub fn is_custom(&self) -> bool {
        self.name == CUSTOM_SERVICE
    }

    /// Module file stem of the service.
    pub fn module_name(&self) -> String {
        module_name(&self.name)
    }

    /// Field name of the service facade on the client.
    pub fn facade_field(&self) -> String {
        facade_field(&self.name)
    }
}

/// Partitions the catalog into services following the layout.
///
/// Operations named in the layout but missing from the catalog are skipped
/// and reported as [`GeneratorError::OperationNotFound`]; grouping itself
/// never fails. The free-form [`CUSTOM_SERVICE`] is always appended, and the
/// result is sorted by service name.
///
/// ## Examples
///
/// ```
/// use cloudstack_define::{Layout, load_catalog};
/// use cloudstack_gen::grouper::group_services;
///
/// let index = load_catalog(r#"{"count":1,"api":[{"name":"listZones","isasync":false}]}"#).unwrap();
/// let mut layout = Layout::new();
/// layout.insert("ZoneService", ["listZones", "createZone"]);
///
/// let (services, errors) = group_services(&index, &layout);
/// assert_eq!(services.len(), 2);
/// assert_eq!(services[0].name, "CustomService");
/// assert_eq!(errors[0].to_string(), "Could not find API details for: createZone");
/// ```
pub fn group_services(index: &OperationIndex, layout: &Layout) -> (Vec<Service>, Vec<GeneratorError>) {
    let mut services = Vec::with_capacity(layout.len() + 1);
    let mut errors = Vec::new();

    for (name, operations) in layout.services() {
        let mut service = Service::new(name);
        for operation in operations {
            match index.get(operation) {
                Some(op) => {
                    let mut op = op.clone();
                    op.params.sort_by(|a, b| a.name.cmp(&b.name));
                    service.operations.push(op);
                }
                None => {
                    warn!(service = name, operation = operation.as_str(), "operation not found in catalog");
                    errors.push(GeneratorError::OperationNotFound {
                        operation: operation.clone(),
                    });
                }
            }
        }
        debug!(service = name, operations = service.operations.len(), "grouped service");
        services.push(service);
    }

    services.push(Service::new(CUSTOM_SERVICE));
    services.sort_by(|a, b| a.name.cmp(&b.name));

    (services, errors)
}
