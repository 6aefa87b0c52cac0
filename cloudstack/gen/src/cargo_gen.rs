//! Cargo.toml generation for the client crate.
//!
//! The client crate lives outside the generator's workspace (it carries an
//! empty `[workspace]` table) and links against `cloudstack-runtime` by path.

use std::path::{Path, PathBuf};

use crate::errors::GeneratorError;
use crate::output::write_atomic;

/// Package name of the generated crate.
pub const CLIENT_PACKAGE: &str = "cloudstack-client";

/// Default path from the client crate to `cloudstack-runtime`.
pub const DEFAULT_RUNTIME_PATH: &str = "..";

/// Generates the Cargo.toml content of the client crate.
///
/// ## Examples
///
/// ```
/// use cloudstack_gen::cargo_gen::generate_cargo_toml;
///
/// let toml = generate_cargo_toml("..");
/// assert!(toml.contains(r#"cloudstack-runtime = { path = ".." }"#));
/// ```
pub fn generate_cargo_toml(runtime_path: &str) -> String {
    let runtime_path = runtime_path.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"[package]
name = "{CLIENT_PACKAGE}"
version = "0.1.0"
edition = "2021"
description = "Typed client for the cloudstack API, generated by cloudstack-gen"
publish = false

[workspace]

[dependencies]
cloudstack-runtime = {{ path = "{runtime_path}" }}
serde = {{ version = "1.0", features = ["derive"] }}
serde_json = "1.0"
"#
    )
}

/// Writes Cargo.toml into `crate_dir`, or prints it when `dry_run` is set.
///
/// Returns the path written, or `None` on a dry run.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if the file cannot be written.
pub fn write_cargo_toml(crate_dir: &Path, runtime_path: &str, dry_run: bool) -> Result<Option<PathBuf>, GeneratorError> {
    let content = generate_cargo_toml(runtime_path);

    if dry_run {
        println!("=== Cargo.toml ===\n{}\n", content);
        return Ok(None);
    }

    let path = crate_dir.join("Cargo.toml");
    write_atomic(&path, &content)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cargo_toml_is_valid_toml() {
        let parsed: toml::Value = toml::from_str(&generate_cargo_toml("..")).unwrap();

        assert_eq!(parsed["package"]["name"].as_str(), Some(CLIENT_PACKAGE));
        assert_eq!(parsed["package"]["edition"].as_str(), Some("2021"));
        assert!(parsed.get("workspace").is_some(), "client crate must be its own workspace");
        assert_eq!(
            parsed["dependencies"]["cloudstack-runtime"]["path"].as_str(),
            Some(DEFAULT_RUNTIME_PATH)
        );
        assert!(parsed["dependencies"].get("serde").is_some());
        assert!(parsed["dependencies"].get("serde_json").is_some());
    }

    #[test]
    fn runtime_path_is_escaped() {
        let parsed: toml::Value = toml::from_str(&generate_cargo_toml(r"C:\work\cloudstack")).unwrap();
        assert_eq!(
            parsed["dependencies"]["cloudstack-runtime"]["path"].as_str(),
            Some(r"C:\work\cloudstack")
        );
    }

    #[test]
    fn write_cargo_toml_respects_dry_run() {
        let dir = TempDir::new().unwrap();

        assert_eq!(write_cargo_toml(dir.path(), "..", true).unwrap(), None);
        assert!(!dir.path().join("Cargo.toml").exists());

        let path = write_cargo_toml(dir.path(), "..", false).unwrap();
        assert_eq!(path, Some(dir.path().join("Cargo.toml")));
        assert!(dir.path().join("Cargo.toml").exists());
    }
}
