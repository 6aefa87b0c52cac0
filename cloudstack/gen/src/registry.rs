//! Canonical type naming.
//!
//! Every generated type lives in one crate-wide namespace, so names are
//! handed out by a single [`TypeRegistry`] in a fixed traversal order. The
//! same input therefore always yields the same names.

use std::collections::BTreeSet;

use crate::naming::type_name;

/// Names the generated crate defines or re-exports outside any service.
pub const RESERVED_TYPE_NAMES: &[&str] = &["ClientConfig", "CloudStackClient", "CloudStackError", "CustomParams"];

/// Maps a field name onto one of the shared record families.
///
/// In/egress rules, network interfaces and tags have the same shape wherever
/// they appear, so each family is generated once under a prefix-free name.
fn shared_family(field: &str) -> Option<&'static str> {
    if field.ends_with("gressrule") {
        Some("rule")
    } else if field.ends_with("nic") {
        Some("nic")
    } else if field.ends_with("tags") {
        Some("tags")
    } else {
        None
    }
}

/// Registry of type names already claimed in the generated crate.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    names: BTreeSet<String>,
}

impl TypeRegistry {
    /// Creates a registry holding only [`RESERVED_TYPE_NAMES`].
    pub fn new() -> Self {
        Self {
            names: RESERVED_TYPE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Claims a name. Returns `false` if it was already taken.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    /// Returns `true` if the name is taken.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns the canonical type name for a nested field of `prefix`.
    ///
    /// The boolean is `true` when the name was newly claimed and its record
    /// must be generated, and `false` when an existing shared record is
    /// reused. Non-shared names that are already taken are retried with
    /// `Internal` appended to the field name until a free one is found.
    ///
    /// ## Examples
    ///
    /// ```
    /// use cloudstack_gen::registry::TypeRegistry;
    ///
    /// let mut registry = TypeRegistry::new();
    /// assert_eq!(registry.unique_type_name("Zone", "capacity"), ("ZoneCapacity".to_string(), true));
    /// assert_eq!(
    ///     registry.unique_type_name("Zone", "capacity"),
    ///     ("ZoneCapacityInternal".to_string(), true)
    /// );
    /// assert_eq!(registry.unique_type_name("VirtualMachine", "nic"), ("Nic".to_string(), true));
    /// assert_eq!(registry.unique_type_name("Router", "nic"), ("Nic".to_string(), false));
    /// ```
    pub fn unique_type_name(&mut self, prefix: &str, field: &str) -> (String, bool) {
        if let Some(family) = shared_family(field) {
            let name = type_name("", family);
            let created = self.reserve(&name);
            return (name, created);
        }

        let mut field = field.to_string();
        loop {
            let name = type_name(prefix, &field);
            if self.reserve(&name) {
                return (name, true);
            }
            field.push_str("Internal");
        }
    }
}
