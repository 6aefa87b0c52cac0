//! Shared records and id helpers used by generated code.

use serde::{Deserialize, Serialize};

/// Special id that stands for an unlimited resource.
pub const UNLIMITED_RESOURCE_ID: &str = "-1";

/// A secondary IP address attached to a NIC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryIp {
    pub id: String,
    pub ipaddress: String,
}

/// Returns `true` if `id` is a lower-case UUID or [`UNLIMITED_RESOURCE_ID`].
///
/// ## Examples
///
/// ```
/// use cloudstack_runtime::is_id;
///
/// assert!(is_id("9e6f6ad9-3a60-4bf6-a2d1-1c6e5dbbc9f3"));
/// assert!(is_id("-1"));
/// assert!(!is_id("Zone1"));
/// ```
pub fn is_id(id: &str) -> bool {
    if id == UNLIMITED_RESOURCE_ID {
        return true;
    }

    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let parts: Vec<&str> = id.split('-').collect();
    parts.len() == GROUPS.len()
        && parts.iter().zip(GROUPS).all(|(part, len)| {
            part.len() == len && part.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        })
}
