//! Layout validation.
//!
//! A layout is checked before any code is generated so that a bad table
//! fails the run up front instead of producing a crate that does not compile.

use std::collections::BTreeMap;

use cloudstack_define::{CUSTOM_SERVICE, Layout};

use crate::errors::GeneratorError;

/// Validates an operation→service layout.
///
/// ## Errors
///
/// Returns [`GeneratorError::ConfigError`] when:
/// - a service name is not a valid Rust type identifier ending in `Service`
/// - a service is named [`CUSTOM_SERVICE`], which the generator always adds itself
/// - an operation name is empty
/// - an operation is listed more than once, in the same or different services
pub fn validate_layout(layout: &Layout) -> Result<(), GeneratorError> {
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();

    for (service, operations) in layout.services() {
        validate_service_name(service)?;

        for operation in operations {
            if operation.trim().is_empty() {
                return Err(GeneratorError::ConfigError(format!(
                    "Service '{service}' lists an empty operation name"
                )));
            }
            if let Some(owner) = owners.insert(operation.as_str(), service) {
                return Err(GeneratorError::ConfigError(format!(
                    "Operation '{operation}' is listed in both '{owner}' and '{service}'"
                )));
            }
        }
    }

    Ok(())
}

fn validate_service_name(name: &str) -> Result<(), GeneratorError> {
    if name == CUSTOM_SERVICE {
        return Err(GeneratorError::ConfigError(format!(
            "'{CUSTOM_SERVICE}' is reserved and generated automatically"
        )));
    }
    if !name.ends_with("Service") || name == "Service" {
        return Err(GeneratorError::ConfigError(format!(
            "Service name '{name}' must end with 'Service'"
        )));
    }
    let starts_upper = name.starts_with(|c: char| c.is_ascii_uppercase());
    if !starts_upper || syn::parse_str::<syn::Ident>(name).is_err() {
        return Err(GeneratorError::ConfigError(format!(
            "Service name '{name}' is not a valid Rust type identifier"
        )));
    }
    Ok(())
}
