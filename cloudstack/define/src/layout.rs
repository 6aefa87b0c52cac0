//! The service layout table.
//!
//! The catalog is a flat list of operations; the layout assigns each of them
//! to a named service facade. It is supplied from outside the catalog,
//! either the built-in [`default_layout`] or a TOML file of the form:
//!
//! ```toml
//! ZoneService = ["createZone", "listZones"]
//! AsyncjobService = ["queryAsyncJobResult"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DefineError;

/// Name of the reserved service hosting the free-form request escape hatch.
///
/// It never appears in a layout table; the grouper appends it.
pub const CUSTOM_SERVICE: &str = "CustomService";

/// Service name -> ordered operation names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    services: BTreeMap<String, Vec<String>>,
}

impl Layout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a service entry.
    pub fn insert<S, I, O>(&mut self, service: S, operations: I)
    where
        S: Into<String>,
        I: IntoIterator<Item = O>,
        O: Into<String>,
    {
        self.services.insert(
            service.into(),
            operations.into_iter().map(Into::into).collect(),
        );
    }

    /// Iterates over services in name order.
    pub fn services(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.services
            .iter()
            .map(|(name, ops)| (name.as_str(), ops.as_slice()))
    }

    /// Returns the number of services in the table.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if the table has no services.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Parses a layout from TOML.
    ///
    /// ## Errors
    ///
    /// Returns [`DefineError::Layout`] if the document is not a table of
    /// string arrays.
    pub fn from_toml(toml: &str) -> Result<Self, DefineError> {
        Ok(toml::from_str(toml)?)
    }

    /// Reads a layout from a TOML file.
    ///
    /// ## Errors
    ///
    /// Returns [`DefineError::Read`] if the file cannot be read and
    /// [`DefineError::Layout`] if it cannot be parsed.
    pub fn read(path: &Path) -> Result<Self, DefineError> {
        let toml = fs::read_to_string(path).map_err(|e| DefineError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&toml)
    }
}

const DEFAULT_LAYOUT: &[(&str, &[&str])] = &[
    ("AccountService", &[
        "createAccount", "deleteAccount", "disableAccount", "enableAccount",
        "listAccounts", "lockAccount", "updateAccount",
    ]),
    ("AffinityGroupService", &[
        "createAffinityGroup", "deleteAffinityGroup", "listAffinityGroupTypes",
        "listAffinityGroups", "updateVMAffinityGroup",
    ]),
    ("AsyncjobService", &["listAsyncJobs", "queryAsyncJobResult"]),
    ("AuthenticationService", &["login", "logout"]),
    ("DomainService", &[
        "createDomain", "deleteDomain", "listDomainChildren", "listDomains", "updateDomain",
    ]),
    ("FirewallService", &[
        "createEgressFirewallRule", "createFirewallRule", "createPortForwardingRule",
        "deleteEgressFirewallRule", "deleteFirewallRule", "deletePortForwardingRule",
        "listEgressFirewallRules", "listFirewallRules", "listPortForwardingRules",
        "updateEgressFirewallRule", "updateFirewallRule", "updatePortForwardingRule",
    ]),
    ("GuestOSService", &[
        "addGuestOs", "addGuestOsMapping", "listGuestOsMapping", "listOsCategories",
        "listOsTypes", "removeGuestOs", "updateGuestOs",
    ]),
    ("ISOService", &[
        "attachIso", "copyIso", "deleteIso", "detachIso", "extractIso",
        "listIsoPermissions", "listIsos", "registerIso", "updateIso", "updateIsoPermissions",
    ]),
    ("ImageStoreService", &[
        "addImageStore", "createSecondaryStagingStore", "deleteImageStore",
        "listImageStores", "listSecondaryStagingStores", "updateCloudToUseObjectStore",
    ]),
    ("LoadBalancerService", &[
        "assignToLoadBalancerRule", "createLoadBalancerRule", "deleteLoadBalancerRule",
        "listLoadBalancerRuleInstances", "listLoadBalancerRules",
        "removeFromLoadBalancerRule", "updateLoadBalancerRule",
    ]),
    ("NetworkOfferingService", &[
        "createNetworkOffering", "deleteNetworkOffering", "listNetworkOfferings",
        "updateNetworkOffering",
    ]),
    ("NetworkService", &[
        "addNetworkServiceProvider", "createNetwork", "createPhysicalNetwork",
        "deleteNetwork", "deletePhysicalNetwork", "listNetworkServiceProviders",
        "listNetworks", "listPhysicalNetworks", "restartNetwork", "updateNetwork",
    ]),
    ("NicService", &["addIpToNic", "listNics", "removeIpFromNic", "updateVmNicIp"]),
    ("OutofbandManagementService", &[
        "changeOutOfBandManagementPassword", "configureOutOfBandManagement",
        "disableOutOfBandManagementForHost", "enableOutOfBandManagementForHost",
        "issueOutOfBandManagementPowerAction",
    ]),
    ("ProjectService", &[
        "activateProject", "createProject", "deleteProject", "listProjects",
        "suspendProject", "updateProject",
    ]),
    ("ResourcemetadataService", &[
        "addResourceDetail", "getVolumeSnapshotDetails", "listResourceDetails",
        "removeResourceDetail",
    ]),
    ("SSHService", &[
        "createSSHKeyPair", "deleteSSHKeyPair", "listSSHKeyPairs", "registerSSHKeyPair",
        "resetSSHKeyForVirtualMachine",
    ]),
    ("SecurityGroupService", &[
        "authorizeSecurityGroupEgress", "authorizeSecurityGroupIngress",
        "createSecurityGroup", "deleteSecurityGroup", "listSecurityGroups",
        "revokeSecurityGroupEgress", "revokeSecurityGroupIngress", "updateSecurityGroup",
    ]),
    ("ServiceOfferingService", &[
        "createServiceOffering", "deleteServiceOffering", "listServiceOfferings",
        "updateServiceOffering",
    ]),
    ("TemplateService", &[
        "copyTemplate", "createTemplate", "deleteTemplate", "extractTemplate",
        "listTemplatePermissions", "listTemplates", "prepareTemplate", "registerTemplate",
        "updateTemplate", "updateTemplatePermissions",
    ]),
    ("UserService", &[
        "createUser", "deleteUser", "disableUser", "enableUser", "getUserKeys",
        "listUsers", "registerUserKeys", "updateUser",
    ]),
    ("VPCService", &[
        "createNetworkACL", "createNetworkACLList", "createVPC", "createVPCOffering",
        "deleteVPC", "listNetworkACLLists", "listNetworkACLs", "listVPCOfferings",
        "listVPCs", "restartVPC", "updateVPC",
    ]),
    ("VirtualMachineService", &[
        "addNicToVirtualMachine", "assignVirtualMachine", "changeServiceForVirtualMachine",
        "deployVirtualMachine", "destroyVirtualMachine", "expungeVirtualMachine",
        "getVirtualMachineUserData", "listVirtualMachines", "listVirtualMachinesMetrics",
        "migrateVirtualMachine", "rebootVirtualMachine", "recoverVirtualMachine",
        "removeNicFromVirtualMachine", "resetPasswordForVirtualMachine",
        "restoreVirtualMachine", "scaleVirtualMachine", "startVirtualMachine",
        "stopVirtualMachine", "updateDefaultNicForVirtualMachine", "updateVirtualMachine",
    ]),
    ("VolumeService", &[
        "attachVolume", "createVolume", "deleteVolume", "detachVolume", "listVolumes",
        "migrateVolume", "resizeVolume", "uploadVolume",
    ]),
    ("ZoneService", &[
        "createZone", "dedicateZone", "deleteZone", "disableHAForZone", "enableHAForZone",
        "listDedicatedZones", "listZones", "listZonesMetrics", "releaseDedicatedZone",
        "updateZone",
    ]),
];

/// Returns the built-in layout covering the core platform services.
///
/// ## Examples
///
/// ```
/// use cloudstack_define::default_layout;
///
/// let layout = default_layout();
/// let (_, ops) = layout
///     .services()
///     .find(|(name, _)| *name == "AsyncjobService")
///     .unwrap();
/// assert!(ops.iter().any(|op| op == "queryAsyncJobResult"));
/// ```
pub fn default_layout() -> Layout {
    let mut layout = Layout::new();
    for (service, operations) in DEFAULT_LAYOUT {
        layout.insert(*service, operations.iter().copied());
    }
    layout
}
