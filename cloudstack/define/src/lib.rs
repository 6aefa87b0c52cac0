//! CloudStack Definition Library
//!
//! This crate provides the input side of cloudstack code generation: the
//! parsed API catalog, the table that groups operations into services, and
//! the policy table listing the platform's named backward-compatibility
//! exceptions. These definitions are consumed by the `cloudstack-gen` binary
//! and, for transport decisions, by `cloudstack-runtime`.
//!
//! ## Core Types
//!
//! - [`Catalog`] - The raw catalog document (`{ "count": .., "api": [..] }`)
//! - [`Operation`] - A single remote operation with params and response tree
//! - [`Param`] - One operation parameter
//! - [`ResponseField`] - One node of an operation's response tree
//! - [`PrimitiveType`] - The closed set of catalog type tags
//! - [`Layout`] - The service name -> operation names table
//! - [`Policy`] / [`PolicyFlag`] - Per-operation exception flags
//!
//! ## Examples
//!
//! ```
//! use cloudstack_define::{load_catalog, PrimitiveType};
//!
//! let index = load_catalog(r#"{
//!     "count": 1,
//!     "api": [{
//!         "name": "listZones",
//!         "description": "Lists zones",
//!         "isasync": false,
//!         "params": [{"name": "name", "description": "", "type": "string", "required": false}],
//!         "response": [{"name": "id", "description": "", "type": "string"}]
//!     }]
//! }"#).unwrap();
//!
//! let op = &index["listZones"];
//! assert!(!op.is_async);
//! assert_eq!(op.params[0].kind, PrimitiveType::String);
//! ```

pub mod catalog;
pub mod error;
pub mod layout;
pub mod policy;
pub mod types;

pub use catalog::{Catalog, Operation, OperationIndex, Param, ResponseField, load_catalog, read_catalog};
pub use error::DefineError;
pub use layout::{CUSTOM_SERVICE, Layout, default_layout};
pub use policy::{Policy, PolicyFlag, operation_policy, policy_for};
pub use types::PrimitiveType;
