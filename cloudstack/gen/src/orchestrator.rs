//! Run sequencing: catalog → services → files → formatter.
//!
//! Loading the catalog or the layout is fatal. Everything after that is
//! collected per operation or per service, so one broken service never
//! prevents its siblings from being generated.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use cloudstack_define::{Layout, OperationIndex, default_layout, read_catalog};
use tracing::{debug, info, instrument, warn};

use crate::cargo_gen::{DEFAULT_RUNTIME_PATH, write_cargo_toml};
use crate::codegen::{generate_client, generate_service_module, top_level_names};
use crate::errors::GeneratorError;
use crate::grouper::{Service, group_services};
use crate::naming::params_type_name;
use crate::output::{GeneratedFile, assemble_lib_rs, write_files};
use crate::registry::TypeRegistry;
use crate::validation::validate_layout;

/// Everything one generator run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// The `listApis` catalog document.
    pub api_path: PathBuf,
    /// TOML layout file; the built-in layout is used when absent.
    pub layout_path: Option<PathBuf>,
    /// The `src/` directory of the client crate. Cargo.toml goes into its parent.
    pub output_dir: PathBuf,
    /// Path from the client crate to `cloudstack-runtime`, written into its Cargo.toml.
    pub runtime_path: String,
    /// Print files instead of writing them.
    pub dry_run: bool,
    /// Run the external formatter over the written files.
    pub format: bool,
    pub formatter: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_path: PathBuf::from("listApis.json"),
            layout_path: None,
            output_dir: PathBuf::from("cloudstack/client/src"),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            dry_run: false,
            format: true,
            formatter: "rustfmt".to_string(),
        }
    }
}

/// The in-memory result of generation, before anything is written.
#[derive(Debug)]
pub struct Generation {
    /// `lib.rs`, `client.rs`, then one file per generated service.
    pub files: Vec<GeneratedFile>,
    /// Non-fatal failures in the order they occurred.
    pub errors: Vec<GeneratorError>,
    /// Names of the services that were generated.
    pub services: Vec<String>,
}

/// Outcome of a [`run`].
#[derive(Debug)]
pub struct RunReport {
    /// Every path written, Cargo.toml last. Empty on a dry run.
    pub written: Vec<PathBuf>,
    pub errors: Vec<GeneratorError>,
    pub services: Vec<String>,
}

impl RunReport {
    /// Returns `true` when nothing went wrong.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Claims every crate-level type name up front.
///
/// Service names come first, then each operation's params, response and
/// list element names in service order. A service whose names are already
/// taken is returned in the failure map and must not be generated.
pub fn seed_registry(services: &[Service]) -> (TypeRegistry, BTreeMap<String, GeneratorError>) {
    let mut registry = TypeRegistry::new();
    let mut failed = BTreeMap::new();

    for service in services {
        if !registry.reserve(&service.name) {
            failed.insert(
                service.name.clone(),
                GeneratorError::CodeGenError(format!("Type name '{}' is already taken", service.name)),
            );
        }
    }

    for service in services {
        if failed.contains_key(&service.name) {
            continue;
        }
        'ops: for op in &service.operations {
            let mut names = vec![params_type_name(&op.name)];
            names.extend(top_level_names(op));
            for name in names {
                if !registry.reserve(&name) {
                    failed.insert(
                        service.name.clone(),
                        GeneratorError::CodeGenError(format!(
                            "Type name '{}' of operation '{}' is already taken",
                            name, op.name
                        )),
                    );
                    break 'ops;
                }
            }
        }
    }

    (registry, failed)
}

/// Generates every file of the client crate in memory.
///
/// A failed service can leave names claimed in the registry, including a
/// shared record such as `Nic` that later services then only reference.
/// Whenever a pass has failures, those services are dropped and the pass is
/// repeated, so every referenced record is emitted by a service that
/// survives. Each repeat drops at least one service.
///
/// ## Errors
///
/// Returns `GeneratorError::ConfigError` for an invalid layout, and
/// `GeneratorError::CodeGenError` if `lib.rs` or `client.rs` cannot be
/// generated. Per-operation and per-service failures are collected in
/// [`Generation::errors`] instead.
pub fn generate(index: &OperationIndex, layout: &Layout) -> Result<Generation, GeneratorError> {
    validate_layout(layout)?;

    let (mut services, mut errors) = group_services(index, layout);

    let service_files = loop {
        match render_services(&services) {
            Ok(files) => break files,
            Err(failures) => {
                for (service, err) in failures {
                    warn!(service = service.as_str(), error = %err, "service failed to generate");
                    services.retain(|s| s.name != service);
                    errors.push(err.for_service(service));
                }
            }
        }
    };

    let generated: Vec<&Service> = services.iter().collect();
    for service in &generated {
        debug!(service = service.name.as_str(), operations = service.operations.len(), "generated service");
    }

    let mut files = Vec::with_capacity(service_files.len() + 2);
    files.push(GeneratedFile::render("lib.rs", &assemble_lib_rs(&generated))?);
    files.push(GeneratedFile::render("client.rs", &generate_client(&generated))?);
    files.extend(service_files);

    Ok(Generation {
        files,
        errors,
        services: generated.iter().map(|s| s.name.clone()).collect(),
    })
}

/// Renders one module per service against a freshly seeded registry.
///
/// Returns the files in service order, or every service that failed.
fn render_services(services: &[Service]) -> Result<Vec<GeneratedFile>, Vec<(String, GeneratorError)>> {
    let (mut registry, mut failed) = seed_registry(services);
    let mut files = Vec::with_capacity(services.len());
    let mut failures = Vec::new();

    for service in services {
        if let Some(err) = failed.remove(&service.name) {
            failures.push((service.name.clone(), err));
            continue;
        }

        let tokens = generate_service_module(service, &mut registry);
        match GeneratedFile::render(format!("{}.rs", service.module_name()), &tokens) {
            Ok(file) => files.push(file),
            Err(err) => failures.push((service.name.clone(), err)),
        }
    }

    if failures.is_empty() { Ok(files) } else { Err(failures) }
}

/// Runs the generator end to end.
///
/// ## Errors
///
/// Returns an error if the catalog or layout cannot be loaded, the layout is
/// invalid, the output directory has no parent for Cargo.toml, or a file
/// cannot be written. Everything else ends up in [`RunReport::errors`].
#[instrument(skip(config), fields(api = %config.api_path.display(), output = %config.output_dir.display()))]
pub fn run(config: &GeneratorConfig) -> Result<RunReport, GeneratorError> {
    let crate_dir = config
        .output_dir
        .parent()
        .ok_or_else(|| GeneratorError::OutputDirNotFound(config.output_dir.display().to_string()))?;

    let index = read_catalog(&config.api_path)?;
    info!(operations = index.len(), "loaded catalog");

    let layout = match &config.layout_path {
        Some(path) => Layout::read(path)?,
        None => default_layout(),
    };
    info!(services = layout.len(), "loaded layout");

    let Generation {
        files,
        mut errors,
        services,
    } = generate(&index, &layout)?;

    let sources = write_files(&files, &config.output_dir, config.dry_run)?;
    let cargo_toml = write_cargo_toml(crate_dir, &config.runtime_path, config.dry_run)?;

    if config.format
        && !sources.is_empty()
        && let Err(err) = run_formatter(&config.formatter, &sources)
    {
        warn!(error = %err, "formatter failed");
        errors.push(err);
    }

    let mut written = sources;
    written.extend(cargo_toml);
    info!(files = written.len(), errors = errors.len(), "generation finished");

    Ok(RunReport {
        written,
        errors,
        services,
    })
}

/// Runs `<formatter> --edition 2021 <files…>`.
///
/// ## Errors
///
/// Returns `GeneratorError::FormatFailed` if the formatter cannot be started
/// or exits unsuccessfully; it carries the combined output.
pub fn run_formatter(formatter: &str, files: &[PathBuf]) -> Result<(), GeneratorError> {
    debug!(formatter, files = files.len(), "running formatter");
    let output = Command::new(formatter)
        .args(["--edition", "2021"])
        .args(files)
        .output()
        .map_err(|e| GeneratorError::FormatFailed {
            output: format!("could not run '{}': {}", formatter, e),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Err(GeneratorError::FormatFailed {
        output: combined.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{nested, operation, param, response};
    use cloudstack_define::Operation;
    use std::fs;
    use tempfile::TempDir;

    fn index(ops: Vec<Operation>) -> OperationIndex {
        ops.into_iter().map(|op| (op.name.clone(), op)).collect()
    }

    fn list_zones() -> Operation {
        let mut op = operation("listZones", &[param("name", "string", false)]);
        op.response = vec![response("id", "string"), response("name", "string")];
        op
    }

    fn file<'a>(generation: &'a Generation, name: &str) -> &'a str {
        generation
            .files
            .iter()
            .find(|f| f.file_name == name)
            .map(|f| f.content.as_str())
            .unwrap_or_else(|| panic!("{name} was not generated"))
    }

    #[test]
    fn generates_lib_client_and_service_files() {
        let mut layout = Layout::new();
        layout.insert("ZoneService", ["listZones"]);

        let generation = generate(&index(vec![list_zones()]), &layout).unwrap();

        let names: Vec<_> = generation.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, ["lib.rs", "client.rs", "custom_service.rs", "zone_service.rs"]);
        assert_eq!(generation.services, ["CustomService", "ZoneService"]);
        assert!(generation.errors.is_empty());
        assert!(file(&generation, "zone_service.rs").contains("pub async fn list_zones("));
    }

    #[test]
    fn missing_operations_are_reported_but_not_fatal() {
        let mut layout = Layout::new();
        layout.insert("ZoneService", ["listZones", "createZone"]);

        let generation = generate(&index(vec![list_zones()]), &layout).unwrap();

        assert_eq!(generation.errors.len(), 1);
        assert!(matches!(
            &generation.errors[0],
            GeneratorError::OperationNotFound { operation } if operation == "createZone"
        ));
        assert!(file(&generation, "zone_service.rs").contains("list_zones"));
    }

    #[test]
    fn name_clash_fails_only_the_later_service() {
        let mut layout = Layout::new();
        layout.insert("AZoneService", ["listZones"]);
        layout.insert("BZoneService", ["listZone"]);

        let clash = operation("listZone", &[]);
        let generation = generate(&index(vec![list_zones(), clash]), &layout).unwrap();

        assert_eq!(generation.services, ["AZoneService", "CustomService"]);
        assert_eq!(generation.errors.len(), 1);
        let message = generation.errors[0].to_string();
        assert!(message.starts_with("API BZoneService failed to generate code"), "{message}");
        assert_eq!(generation.files.len(), 4, "lib, client, custom and AZoneService only");
    }

    #[test]
    fn shared_record_moves_to_a_surviving_service() {
        let mut list_nics = operation("listNics", &[]);
        list_nics.response = vec![response("id", "string"), response("ipaddress", "string")];
        let mut list_vms = operation("listVirtualMachines", &[]);
        list_vms.response = vec![
            response("id", "string"),
            nested("nic", vec![response("id", "string"), response("ipaddress", "string")]),
        ];

        let mut layout = Layout::new();
        layout.insert("AccountService", ["configureDeleteNic"]);
        layout.insert("NicService", ["listNics", "deleteNic"]);
        layout.insert("VirtualMachineService", ["listVirtualMachines"]);
        let catalog = index(vec![
            operation("configureDeleteNic", &[]),
            list_nics,
            operation("deleteNic", &[]),
            list_vms,
        ]);

        let generation = generate(&catalog, &layout).unwrap();

        assert_eq!(generation.services, ["AccountService", "CustomService", "VirtualMachineService"]);
        assert_eq!(generation.errors.len(), 1);
        assert!(generation.errors[0].to_string().starts_with("API NicService failed to generate code"));

        let vms = file(&generation, "virtual_machine_service.rs");
        assert!(vms.contains("pub nic: Vec<Nic>"), "nic field missing:\n{vms}");
        assert!(vms.contains("pub struct Nic {"), "Nic must be emitted once its owner failed:\n{vms}");
        assert!(
            !file(&generation, "lib.rs").contains("nic_service"),
            "failed service must not be declared"
        );
    }

    #[test]
    fn invalid_layout_is_fatal() {
        let mut layout = Layout::new();
        layout.insert("Zones", ["listZones"]);
        let err = generate(&index(vec![list_zones()]), &layout).unwrap_err();
        assert!(matches!(err, GeneratorError::ConfigError(_)));
    }

    #[test]
    fn generation_is_deterministic() {
        let mut layout = Layout::new();
        layout.insert("ZoneService", ["listZones"]);
        let catalog = index(vec![list_zones()]);

        let first = generate(&catalog, &layout).unwrap();
        let second = generate(&catalog, &layout).unwrap();
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn run_writes_sources_and_cargo_toml() {
        let dir = TempDir::new().unwrap();
        let api_path = dir.path().join("listApis.json");
        fs::write(
            &api_path,
            r#"{"count":1,"api":[{"name":"listZones","isasync":false,"params":[],"response":[]}]}"#,
        )
        .unwrap();
        let layout_path = dir.path().join("layout.toml");
        fs::write(&layout_path, "ZoneService = [\"listZones\"]\n").unwrap();

        let config = GeneratorConfig {
            api_path,
            layout_path: Some(layout_path),
            output_dir: dir.path().join("client").join("src"),
            format: false,
            ..GeneratorConfig::default()
        };
        let report = run(&config).unwrap();

        assert!(report.is_success(), "unexpected errors: {:?}", report.errors);
        assert!(dir.path().join("client/src/lib.rs").exists());
        assert!(dir.path().join("client/src/zone_service.rs").exists());
        assert_eq!(report.written.last(), Some(&dir.path().join("client").join("Cargo.toml")));
    }

    #[test]
    fn missing_catalog_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig {
            api_path: dir.path().join("missing.json"),
            output_dir: dir.path().join("src"),
            ..GeneratorConfig::default()
        };
        assert!(matches!(run(&config), Err(GeneratorError::ReadError { .. })));
    }

    #[test]
    fn missing_formatter_is_reported() {
        let err = run_formatter("cloudstack-gen-no-such-formatter", &[PathBuf::from("lib.rs")]).unwrap_err();
        assert!(matches!(err, GeneratorError::FormatFailed { ref output } if output.contains("could not run")));
    }
}
