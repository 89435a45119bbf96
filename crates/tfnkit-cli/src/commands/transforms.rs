//! List registered transforms command

use anyhow::Result;

/// Run the transforms command
pub fn run(config_path: &str) -> Result<()> {
    let engine = super::load_engine(config_path)?;

    for descriptor in engine.registry().descriptors() {
        if descriptor.handles_whole_list() {
            println!("{} (whole list)", descriptor.name());
        } else {
            println!("{}", descriptor.name());
        }
    }
    Ok(())
}
