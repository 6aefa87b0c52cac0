//! Generates the fixture catalog's client into `OUT_DIR`.
//!
//! The generated `lib.rs` declares one file module per service. Those files
//! cannot be pulled in with `include!` because they open with inner doc
//! comments, so each `pub mod x;` is replaced by an inline `pub mod x { .. }`
//! holding the file's content, and the result is written as one source.

use std::error::Error;
use std::path::PathBuf;
use std::{env, fs};

use cloudstack_define::{Layout, read_catalog};
use cloudstack_gen::generate;
use cloudstack_gen::output::GeneratedFile;

fn main() -> Result<(), Box<dyn Error>> {
    let fixtures = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?).join("../gen/tests/fixtures");
    let api_path = fixtures.join("listApis.json");
    let layout_path = fixtures.join("layout.toml");
    println!("cargo:rerun-if-changed={}", api_path.display());
    println!("cargo:rerun-if-changed={}", layout_path.display());

    let generation = generate(&read_catalog(&api_path)?, &Layout::read(&layout_path)?)?;
    if let Some(err) = generation.errors.first() {
        return Err(format!("fixture catalog failed to generate: {err}").into());
    }

    let source = inline_modules(&generation.files)?;
    let out = PathBuf::from(env::var("OUT_DIR")?).join("cloudstack_client.rs");
    fs::write(out, source)?;
    Ok(())
}

fn inline_modules(files: &[GeneratedFile]) -> Result<String, Box<dyn Error>> {
    let find = |name: &str| {
        files
            .iter()
            .find(|f| f.file_name == name)
            .ok_or_else(|| format!("{name} was not generated"))
    };

    let mut source = String::new();
    for line in find("lib.rs")?.content.lines() {
        if line.trim_start().starts_with("//!") {
            continue;
        }
        match line.trim().strip_prefix("pub mod ").and_then(|m| m.strip_suffix(';')) {
            Some(module) => {
                let file = find(&format!("{module}.rs"))?;
                source.push_str(&format!("pub mod {module} {{\n{}\n}}\n", file.content));
            }
            None => {
                source.push_str(line);
                source.push('\n');
            }
        }
    }
    Ok(source)
}
