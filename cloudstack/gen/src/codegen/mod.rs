//! Code generation modules for cloudstack.
//!
//! Each submodule produces one kind of item of the generated client crate.
//! All generators return `proc_macro2::TokenStream`, which is then validated
//! with `syn` and formatted with `prettyplease` (see [`crate::output`]).
//!
//! ## Submodules
//!
//! - [`client`] - `CloudStackClient` and the per-service facade structs
//! - [`params`] - `<Op>Params` structs with setters and query encoding
//! - [`responses`] - Response record naming, construction and rendering
//! - [`operations`] - The `async fn` of each operation on its facade
//! - [`helpers`] - Courtesy `get_<x>_id` / `_by_name` / `_by_id` lookups
//! - [`custom`] - The free-form `CustomService`
//! - [`service`] - Assembly of one service module
//!
//! ## Code Generation Flow
//!
//! 1. Every top-level name is reserved in the [`TypeRegistry`](crate::registry::TypeRegistry)
//! 2. Each service module is built via [`generate_service_module`]
//! 3. The shared `client.rs` is built via [`generate_client`]

pub mod client;
pub mod custom;
pub mod helpers;
pub mod operations;
pub mod params;
pub mod responses;
pub mod service;

pub use client::generate_client;
pub use custom::generate_custom_module;
pub use helpers::generate_helpers;
pub use operations::generate_operation;
pub use params::{ParamField, generate_params, param_fields};
pub use responses::{RecordDef, ResponseShape, build_records, render_record, response_shape, top_level_names};
pub use service::generate_service_module;
