//! Named backward-compatibility exceptions.
//!
//! The platform has a handful of operations that need bespoke handling on
//! the wire or after decoding. Rather than scattering operation names through
//! the generator and runtime, every exception is listed once here as a
//! [`PolicyFlag`] against the operations it applies to.

use std::collections::BTreeSet;

use strum::Display;

/// One named exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PolicyFlag {
    /// Sent as a form-encoded POST instead of a signed GET.
    PostForm,
    /// The call is idempotent and retried on transport failure.
    RetryIdempotent,
    /// The reported `count` is wrong; use the element count instead.
    CountCorrection,
    /// A single-element `ingressrule` list collapses to the element.
    CollapseIngressRule,
    /// A single-element `egressrule` list collapses to the element.
    CollapseEgressRule,
    /// String-typed `startport`/`endport` fields are coerced to integers.
    CoercePorts,
    /// `details` maps always expand as `details[i].key` / `details[i].value`.
    DetailsKeyValue,
    /// The response body is wrapped in a second single-key envelope.
    UnwrapNestedEnvelope,
}

const OPERATION_POLICIES: &[(PolicyFlag, &[&str])] = &[
    (
        PolicyFlag::PostForm,
        &["deployVirtualMachine", "login", "updateVirtualMachine"],
    ),
    (PolicyFlag::RetryIdempotent, &["queryAsyncJobResult"]),
    (PolicyFlag::CountCorrection, &["listAffinityGroups"]),
    (PolicyFlag::CollapseIngressRule, &["authorizeSecurityGroupIngress"]),
    (PolicyFlag::CollapseEgressRule, &["authorizeSecurityGroupEgress"]),
    (
        PolicyFlag::DetailsKeyValue,
        &[
            "addGuestOs",
            "addImageStore",
            "addResourceDetail",
            "createSecondaryStagingStore",
            "updateCloudToUseObjectStore",
            "updateGuestOs",
            "updateZone",
        ],
    ),
    (
        PolicyFlag::UnwrapNestedEnvelope,
        &[
            "createAccount",
            "createNetwork",
            "createNetworkOffering",
            "createSSHKeyPair",
            "createSecurityGroup",
            "createServiceOffering",
            "createUser",
            "getVirtualMachineUserData",
            "registerSSHKeyPair",
            "registerUserKeys",
        ],
    ),
];

const SERVICE_POLICIES: &[(&str, &[PolicyFlag])] =
    &[("FirewallService", &[PolicyFlag::CoercePorts])];

/// The set of flags that apply to one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    flags: BTreeSet<PolicyFlag>,
}

impl Policy {
    /// Returns `true` if `flag` applies.
    pub fn has(&self, flag: PolicyFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Iterates over the applicable flags in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = PolicyFlag> + '_ {
        self.flags.iter().copied()
    }

    /// Returns `true` if no exception applies.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// The rule field to collapse when the decoded list has one element.
    pub fn collapse_rule_field(&self) -> Option<&'static str> {
        if self.has(PolicyFlag::CollapseIngressRule) {
            Some("ingressrule")
        } else if self.has(PolicyFlag::CollapseEgressRule) {
            Some("egressrule")
        } else {
            None
        }
    }
}

/// Returns the operation-level flags for `operation`.
///
/// Service-level entries are not included; the runtime uses this when it
/// does not know the service an operation belongs to.
///
/// ## Examples
///
/// ```
/// use cloudstack_define::{PolicyFlag, operation_policy};
///
/// assert!(operation_policy("login").has(PolicyFlag::PostForm));
/// assert!(operation_policy("listZones").is_empty());
/// ```
pub fn operation_policy(operation: &str) -> Policy {
    let flags = OPERATION_POLICIES
        .iter()
        .filter(|(_, ops)| ops.contains(&operation))
        .map(|(flag, _)| *flag)
        .collect();
    Policy { flags }
}

/// Returns every flag for `operation` when grouped under `service`.
pub fn policy_for(service: &str, operation: &str) -> Policy {
    let mut policy = operation_policy(operation);
    for (name, flags) in SERVICE_POLICIES {
        if *name == service {
            policy.flags.extend(flags.iter().copied());
        }
    }
    policy
}
