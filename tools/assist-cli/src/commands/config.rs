//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use assist_core::generate_default_config;

use super::{ConfigArgs, ConfigCommand};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        let mut config = ctx.config.clone();
        for language in &mut config.languages {
            language.secret_key = mask(&language.secret_key);
        }
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("endpoint", &ctx.config.endpoint);
    ctx.output.kv("page_size", &ctx.config.page_size.to_string());
    ctx.output.kv("result_size", &ctx.config.result_size.to_string());
    ctx.output.kv("timeout_secs", &ctx.config.timeout_secs.to_string());
    ctx.output.kv("cache_capacity", &ctx.config.cache_capacity.to_string());

    for language in &ctx.config.languages {
        ctx.output.info("");
        ctx.output.info(&format!("[{}]", language.label));
        ctx.output.kv("index_name", &language.index_name);
        ctx.output.kv("client_id", &language.client_id);
        ctx.output.kv("secret_key", &mask(&language.secret_key));
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));
    ctx.output.info("Fill in client_id and secret_key for each language before searching");

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    ctx.config.validate().context("Configuration is invalid")?;

    let missing = ctx.config.languages_missing_credentials();
    if missing.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for label in &missing {
        ctx.output
            .warn(&format!("Warning: no credentials for language '{}'", label));
    }
    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
