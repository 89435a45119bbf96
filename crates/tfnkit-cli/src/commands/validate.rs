//! Validate configuration command

use anyhow::Result;

/// Run the validate command
pub fn run(config_path: &str) -> Result<()> {
    tracing::info!("Validating configuration: {}", config_path);

    let engine = super::load_engine(config_path)?;
    let config = engine.config();

    tracing::info!("✓ Chain step errors: {:?}", config.chain.on_step_error);
    if let Some(limit) = config.transaction_arena_limit {
        tracing::info!("✓ Transaction arena limit: {} bytes", limit);
    }

    println!(
        "✓ Configuration is valid ({} transforms registered)",
        engine.registry().len()
    );
    Ok(())
}
