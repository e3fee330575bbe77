//! Configuration view and init commands: `taskboard config`.

use anyhow::Result;
use std::path::Path;
use taskboard::config::TaskboardConfig;

use super::super::ConfigCommands;

pub fn cmd_config(
    config_path: &Path,
    effective: &TaskboardConfig,
    command: Option<ConfigCommands>,
) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Taskboard Configuration");
            println!("=======================");
            println!();
            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No taskboard.toml found at {}", config_path.display());
                println!("Using defaults.");
            }
            println!();
            println!("Effective values (with env overrides):");
            println!();
            print!("{}", effective.to_toml()?);
        }
        Some(ConfigCommands::Init { force }) => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite.",
                    config_path.display()
                );
            }
            TaskboardConfig::default().save(config_path)?;
            println!("Wrote default configuration to {}", config_path.display());
        }
    }
    Ok(())
}
