//! Output assembly and file writing for generated code.
//!
//! This module handles the final phase of code generation: assembling the
//! generated pieces into complete Rust files, validating them, formatting
//! them, and writing them to disk atomically.
//!
//! ## Output Structure
//!
//! ```text
//! client/src/
//! ├── lib.rs                      # Module declarations and re-exports
//! ├── client.rs                   # CloudStackClient and the service facades
//! ├── zone_service.rs             # One module per service
//! └── virtual_machine_service.rs
//! ```
//!
//! ## Safety Guarantees
//!
//! - **Validation**: All generated code is validated with `syn` before writing
//! - **Formatting**: Output is formatted with `prettyplease` for consistent style
//! - **Atomic writes**: Uses temp file + rename pattern to prevent partial writes

use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;
use quote::quote;
use tracing::debug;

use crate::errors::GeneratorError;
use crate::grouper::Service;
use crate::naming::ident;

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// This code was automatically generated by cloudstack-gen. Do not edit manually.";

/// One generated file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub content: String,
}

impl GeneratedFile {
    /// Validates and formats `tokens` into a file.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::CodeGenError` if the tokens are not a valid Rust file.
    pub fn render(file_name: impl Into<String>, tokens: &TokenStream) -> Result<Self, GeneratorError> {
        let file = validate_code(tokens)?;
        Ok(Self {
            file_name: file_name.into(),
            content: format_code(&file),
        })
    }
}

/// Assembles the lib.rs content of the client crate.
///
/// Declares `client` and one module per service, glob re-exports all of
/// them at the crate root, and re-exports the runtime types callers need.
pub fn assemble_lib_rs(services: &[&Service]) -> TokenStream {
    let modules: Vec<_> = services.iter().map(|s| ident(&s.module_name())).collect();
    // Only modules that declare types; the custom and empty ones hold impls alone.
    let reexports: Vec<_> = services
        .iter()
        .filter(|s| !s.is_custom() && !s.operations.is_empty())
        .map(|s| ident(&s.module_name()))
        .collect();

    quote! {
        //! Typed client for the cloudstack API.
        //!
        //! Every operation is an `async fn` on the facade of its service,
        //! reached through a field of [`CloudStackClient`].
        //!
        //! ## Examples
        //!
        //! ```ignore
        //! use cloudstack_client::*;
        //!
        //! let client = CloudStackClient::new("https://cloud.example/client/api", "key", "secret", true)?;
        //! let (zone, _) = client.zone.get_zone_by_name("Zone1").await?;
        //! ```

        pub mod client;
        #(pub mod #modules;)*

        pub use client::*;
        #(pub use #reexports::*;)*

        pub use cloudstack_runtime::{ClientConfig, CloudStackError, CustomParams};
    }
}

/// Validates generated code using syn.
///
/// Parses the token stream as a complete Rust file to ensure it's syntactically
/// valid before writing to disk.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if the code fails to parse.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGenError(format!("Generated code is invalid: {}", e)))
}

/// Formats generated code using prettyplease.
///
/// Converts a parsed syn::File back to a nicely formatted string,
/// prepending [`GENERATED_HEADER`] as a regular comment.
pub fn format_code(file: &syn::File) -> String {
    let formatted = prettyplease::unparse(file);
    format!("{}\n\n{}", GENERATED_HEADER, formatted)
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if:
/// - Parent directories cannot be created
/// - The temp file cannot be written
/// - The rename operation fails
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| GeneratorError::WriteError {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Writes the files into `output_dir`, or prints them when `dry_run` is set.
///
/// Returns the paths written, which is empty on a dry run.
///
/// ## Errors
///
/// Returns the first `GeneratorError::WriteError`; files before it stay written.
pub fn write_files(files: &[GeneratedFile], output_dir: &Path, dry_run: bool) -> Result<Vec<PathBuf>, GeneratorError> {
    if dry_run {
        for file in files {
            println!("=== {} ===\n{}\n", file.file_name, file.content);
        }
        return Ok(Vec::new());
    }

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = output_dir.join(&file.file_name);
        write_atomic(&path, &file.content)?;
        debug!(path = %path.display(), bytes = file.content.len(), "wrote file");
        written.push(path);
    }
    Ok(written)
}
