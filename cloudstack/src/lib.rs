//! Protocol runtime for generated cloudstack clients.
//!
//! The `cloudstack-gen` binary emits one typed method per platform operation;
//! each of those methods calls into this crate for the parts of the protocol
//! that do not depend on the operation:
//!
//! - **Signing**: canonical query string + HMAC-SHA1 ([`signing`])
//! - **Transport**: GET/POST selection, envelope unwrapping and error decoding ([`Transport`])
//! - **Async jobs**: the poll loop with bounded linear backoff ([`jobs`])
//! - **Compatibility rewrites** applied to raw payloads ([`compat`])
//! - **Courtesy helpers**: name/id resolution over list results ([`resolve`])
//! - **Free-form requests** for operations without a typed wrapper ([`CustomParams`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use cloudstack_runtime::{ClientConfig, Query, Transport};
//!
//! let config = ClientConfig::builder("https://cloud.example/client/api", "key", "secret").build()?;
//! let transport = Transport::new(config)?;
//!
//! let mut params = Query::new();
//! params.set("name", "Zone1");
//! let zones = transport.request("listZones", &params).await?;
//! ```

pub mod client;
pub mod compat;
pub mod custom;
pub mod envelope;
pub mod error;
pub mod jobs;
pub mod query;
pub mod resolve;
pub mod signing;
pub mod types;

pub use client::{ClientConfig, ClientConfigBuilder, Transport};
pub use custom::{CustomParams, ParamValue};
pub use error::CloudStackError;
pub use jobs::{Backoff, JobSource, JobStatus, poll_job};
pub use query::{MapEncoding, Query};
pub use types::{SecondaryIp, UNLIMITED_RESOURCE_ID, is_id};
