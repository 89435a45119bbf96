//! Apply a chain to one value command

use anyhow::{Context, Result};

/// Run the apply command
pub fn run(config_path: &str, name: &str, value: &str, chain: &str) -> Result<()> {
    let engine = super::load_engine(config_path)?;
    let mut tx = engine.transaction();
    tx.add_nulstr(name, value)?;

    let report = engine
        .get_with_transform_report(&mut tx, name, Some(chain))
        .with_context(|| format!("Failed to apply chain '{chain}'"))?;

    for step in &report.skipped {
        tracing::warn!("Skipped '{}': {}", step.name, step.error);
    }
    println!("{}", report.field.value());
    Ok(())
}
