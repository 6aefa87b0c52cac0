//! CloudStack Code Generator
//!
//! Generates a typed Rust client crate from a `listApis` catalog.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cloudstack_gen::cargo_gen::DEFAULT_RUNTIME_PATH;
use cloudstack_gen::{GeneratorConfig, run};
use colored::Colorize;
use tracing::error;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// CloudStack code generator - transforms a listApis catalog into a typed Rust client
#[derive(Parser, Debug)]
#[command(name = "cloudstack-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the listApis catalog document
    #[arg(short, long, default_value = "listApis.json")]
    api: PathBuf,

    /// TOML table of service name -> operation names (defaults to the built-in layout)
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// Output directory for the generated sources; Cargo.toml goes into its parent
    #[arg(short, long, default_value = "cloudstack/client/src")]
    output: PathBuf,

    /// Path from the generated crate to cloudstack-runtime
    #[arg(long, default_value = DEFAULT_RUNTIME_PATH)]
    runtime_path: String,

    /// Print generated code without writing files
    #[arg(long)]
    dry_run: bool,

    /// Skip the external formatter
    #[arg(long)]
    no_format: bool,

    /// Formatter command, invoked as `<cmd> --edition 2021 <files>`
    #[arg(long, default_value = "rustfmt")]
    formatter: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

impl From<Cli> for GeneratorConfig {
    fn from(cli: Cli) -> Self {
        GeneratorConfig {
            api_path: cli.api,
            layout_path: cli.layout,
            output_dir: cli.output,
            runtime_path: cli.runtime_path,
            dry_run: cli.dry_run,
            format: !cli.no_format,
            formatter: cli.formatter,
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,cloudstack_gen=info".to_string(),
            2 => "info,cloudstack_gen=debug,cloudstack_define=debug".to_string(),
            _ => "debug,cloudstack_gen=trace,cloudstack_define=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    let dry_run = cli.dry_run;
    let config = GeneratorConfig::from(cli);

    let report = match run(&config) {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "generation aborted");
            eprintln!("{} {}", "error:".red().bold(), err);
            return ExitCode::FAILURE;
        }
    };

    if !report.errors.is_empty() {
        error!("{} API(s) failed to generate:", report.errors.len());
        for err in &report.errors {
            error!("{err}");
            eprintln!("  {} {}", "✗".red(), err);
        }
    }

    let summary = if dry_run {
        format!("{} services generated (dry run, nothing written)", report.services.len())
    } else {
        format!(
            "{} services generated, {} files written to {}",
            report.services.len(),
            report.written.len(),
            config.output_dir.display()
        )
    };

    if report.is_success() {
        eprintln!("{} {}", "✓".green(), summary);
        ExitCode::SUCCESS
    } else {
        eprintln!("{} {} with {} error(s)", "!".yellow(), summary, report.errors.len());
        ExitCode::FAILURE
    }
}
