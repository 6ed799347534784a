//! Configuration management commands.

use std::path::Path;

use anyhow::{bail, Result};
use console::Term;
use dialoguer::Confirm;
use relay_sdk::relay_core::RelayConfig;
use relay_sdk::relay_observability::{LogFormat, LogLevel};

use super::{ConfigArgs, ConfigCommand};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("source", &path.display().to_string()),
        None => ctx.output.kv("source", "built-in defaults"),
    }
    println!();
    print!("{}", toml::to_string_pretty(&ctx.config)?);

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force && !confirm_overwrite(&config_path)? {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    RelayConfig::default().save(&config_path.to_string_lossy())?;
    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

/// Ask before overwriting. Non-interactive sessions never overwrite.
fn confirm_overwrite(path: &Path) -> Result<bool> {
    if !Term::stderr().is_term() {
        return Ok(false);
    }
    Ok(Confirm::new()
        .with_prompt(format!("{} exists. Overwrite?", path.display()))
        .default(false)
        .interact()?)
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let warnings = config_warnings(&ctx.config);

    if let Err(e) = ctx.config.validate() {
        ctx.output.error(&format!("Error: {:#}", e));
        for warning in &warnings {
            ctx.output.warn(&format!("Warning: {}", warning));
        }
        bail!("Configuration is invalid");
    }

    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }
    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Settings that work but are probably mistakes.
fn config_warnings(config: &RelayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.logging.level.parse::<LogLevel>().is_err() {
        warnings.push(format!(
            "logging.level '{}' is unknown, info will be used",
            config.logging.level
        ));
    }

    if config.logging.format.parse::<LogFormat>().is_err() {
        warnings.push(format!(
            "logging.format '{}' is unknown, json will be used",
            config.logging.format
        ));
    }

    if config.origin.base_url.starts_with("http://") {
        warnings.push("origin.base_url is not https; credentials would be sent in clear text".to_string());
    }

    if config.origin.timeout_ms > 60_000 {
        warnings.push(format!(
            "origin.timeout_ms {} is longer than a minute",
            config.origin.timeout_ms
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_warnings() {
        assert!(config_warnings(&RelayConfig::default()).is_empty());
    }

    #[test]
    fn test_warnings() {
        let mut config = RelayConfig::default();
        config.logging.level = "loud".to_string();
        config.logging.format = "xml".to_string();
        config.origin.base_url = "http://127.0.0.1:8080".to_string();
        config.origin.timeout_ms = 120_000;

        let warnings = config_warnings(&config);
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].contains("logging.level"));
        assert!(warnings[2].contains("not https"));
    }

    #[test]
    fn test_default_config_saves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_NAMES[0]);
        let path = path.to_string_lossy();

        RelayConfig::default().save(&path).unwrap();
        assert_eq!(RelayConfig::load(&path).unwrap(), RelayConfig::default());
    }
}
