//! Validate and resolve a project configuration file.
//!
//! Usage:
//!   cargo run --example validate_project -- path/to/llamafarm.yaml
//!
//! Prints every validation finding with its document path, or the fully
//! resolved configuration when the document is clean.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use llamafarm_config::{load_settings, ConfigDocument, ProjectLoader};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path: PathBuf = match std::env::args_os().nth(1) {
        Some(arg) => arg.into(),
        None => bail!("usage: validate_project <project.yaml>"),
    };

    let settings = load_settings()?;
    let loader = ProjectLoader::new(settings).context("failed to open schema registry")?;

    let document = ConfigDocument::read(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let report = loader.validate_document(document.value())?;
    if !report.is_valid() {
        eprintln!("{} finding(s) in {}:", report.len(), path.display());
        for error in report.errors() {
            let at = if error.path.is_empty() {
                "<root>"
            } else {
                &error.path
            };
            eprintln!("  [{at}] {}", error.message);
        }
        std::process::exit(1);
    }

    let resolved = loader.resolve_document(document.value())?;
    print!("{}", serde_yaml::to_string(&resolved)?);
    Ok(())
}
