//! `toolrun init` — write a default configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use toolrun_core::config::{get_config_path, save_config, Config};

/// Run the init command. `path` overrides `~/.toolrun/config.json`.
pub fn run(path: Option<&Path>, force: bool) -> Result<()> {
    println!();
    println!("{}", "toolrun — setup".cyan().bold());
    println!();

    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        println!(
            "  {} config already exists at {} (use --force to overwrite)",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(&Config::default(), Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} wrote default config to {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "{}",
        "  Set provider.apiKey (or TOOLRUN_PROVIDER__API_KEY), then run `toolrun run -g \"...\"`."
            .green()
    );
    println!();

    Ok(())
}
