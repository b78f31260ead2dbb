//! `toolrun status` — show configuration and endpoint status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use toolrun_core::config::{get_config_path, load_config};

/// Run the status command. `path` overrides `~/.toolrun/config.json`.
pub fn run(path: Option<&Path>) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    let config = load_config(Some(&config_path));

    println!();
    println!("{}", "toolrun status".cyan().bold());
    println!();

    println!(
        "  {:<14} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    let agent = &config.agent;
    println!("  {:<14} {}", "Model:".bold(), agent.model);
    println!(
        "  {:<14} {}",
        "Parameters:".bold(),
        format!(
            "temp: {} | max_tokens: {} | max_turns: {} | validation: {:?}",
            agent.temperature, agent.max_tokens, agent.max_turns, agent.validation
        )
        .dimmed()
    );

    let provider = &config.provider;
    println!("  {:<14} {}", "Endpoint:".bold(), provider.api_base_or_default());
    let key_status = if provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<14} {}", "API key:".bold(), key_status);

    let retry = &config.retry;
    println!(
        "  {:<14} {}",
        "Retry:".bold(),
        format!(
            "{} attempts, {}ms base, {}ms cap",
            retry.max_attempts, retry.base_delay_ms, retry.max_delay_ms
        )
        .dimmed()
    );

    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(Some(&dir.path().join("missing.json"))).is_ok());
    }
}
