//! CloudStack code generator library.
//!
//! This crate turns a saved `listApis` catalog into a typed Rust client
//! crate for the platform API. The generated code includes:
//!
//! - A `CloudStackClient` with one facade field per service
//! - An `<Op>Params` struct per operation with setters and query encoding
//! - Response records with the platform's quirks handled at decode time
//! - An `async fn` per operation, waiting for async jobs when asked to
//! - Courtesy `get_<x>_id` / `get_<x>_by_name` / `get_<x>_by_id` lookups
//!
//! The protocol itself (signing, transport, job polling) lives in
//! `cloudstack-runtime`, which the generated crate depends on.
//!
//! ## Modules
//!
//! - [`naming`] - Identifier derivation from catalog names
//! - [`type_map`] - Catalog type tags to Rust types
//! - [`grouper`] - Operations into services, following the layout
//! - [`registry`] - The crate-wide type name registry
//! - [`codegen`] - Code generation for individual components
//! - [`output`] - Final assembly, validation, and file writing
//! - [`cargo_gen`] - Cargo.toml generation for the output package
//! - [`orchestrator`] - The end-to-end run
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use cloudstack_gen::orchestrator::{GeneratorConfig, run};
//!
//! let config = GeneratorConfig {
//!     dry_run: true,
//!     ..GeneratorConfig::default()
//! };
//! let report = run(&config).unwrap();
//! for err in &report.errors {
//!     eprintln!("{err}");
//! }
//! ```

pub mod cargo_gen;
pub mod codegen;
pub mod errors;
pub mod grouper;
pub mod naming;
pub mod orchestrator;
pub mod output;
pub mod registry;
pub mod type_map;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use errors::GeneratorError;
pub use orchestrator::{GeneratorConfig, RunReport, generate, run};
