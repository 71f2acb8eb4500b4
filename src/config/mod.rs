mod schema;

pub use schema::{Config, Settings};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::expr::Expression;
use crate::rules::{RuleError, RuleSet};

const CONFIG_ENV_VAR: &str = "FILTEREXPR_CONFIG";

const LOG_TARGET: &str = "filterexpr::config";

pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(expand(&path));
    }

    // ~/.filterexpr/config.json
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".filterexpr")
        .join("config.json"))
}

/// `--config` wins over the env var and the default location
pub fn get_config_path_with_override(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(expand(&path.to_string_lossy())),
        None => get_config_path(),
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).to_string())
}

/// read a config file; a missing file is an empty config
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::debug!(target: LOG_TARGET, "no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn load_with_override(path: Option<&Path>) -> Result<Config> {
    load(&get_config_path_with_override(path)?)
}

/// strict JSON first, then JSON5 for comments and trailing commas
fn parse(content: &str) -> Result<Config> {
    match serde_json::from_str(content) {
        Ok(config) => Ok(config),
        Err(json_err) => json5::from_str(content).map_err(|_| anyhow!("invalid JSON: {}", json_err)),
    }
}

pub fn save(config: &Config, path: &Path) -> Result<()> {
    // ensure directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    log::debug!(target: LOG_TARGET, "saved config to {}", path.display());
    Ok(())
}

pub fn save_with_override(config: &Config, path: Option<&Path>) -> Result<()> {
    save(config, &get_config_path_with_override(path)?)
}

/// compile every rule of the config, collecting one message per broken rule
pub fn verify(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config = parse(&content)?;

    Ok(verify_rules(&config))
}

fn verify_rules(config: &Config) -> Vec<String> {
    let mut errors = Vec::new();

    for (name, source) in &config.rules {
        let prefix = format!("rules.{}", name);

        if name.trim().is_empty() {
            errors.push(format!("{}: rule name must not be empty", prefix));
        }

        if source.trim().is_empty() {
            errors.push(format!("{}: expression is empty", prefix));
            continue;
        }

        if let Err(e) = Expression::compile(source) {
            errors.push(format!("{}: {}", prefix, e));
        }
    }

    errors
}

/// compile the rules table of `config`
pub fn rule_set(config: &Config) -> Result<RuleSet, RuleError> {
    RuleSet::compile(&config.rules)
}

/// add or replace a rule; the expression must compile
pub fn set_rule(config: &mut Config, name: &str, source: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Rule name must not be empty"));
    }

    let expression = Expression::compile(source)
        .with_context(|| format!("Invalid expression for rule '{}'", name))?;

    config
        .rules
        .insert(name.to_string(), expression.source().to_string());
    Ok(())
}

/// remove a rule, returning its expression
pub fn remove_rule(config: &mut Config, name: &str) -> Result<String> {
    if let Some(source) = config.rules.remove(name) {
        return Ok(source);
    }

    let suggestions = crate::rules::suggest_names(config.rules.keys(), name);
    if suggestions.is_empty() {
        Err(anyhow!("Unknown rule: {}", name))
    } else {
        Err(anyhow!(
            "Unknown rule: {}. Did you mean: {}?",
            name,
            suggestions.join(", ")
        ))
    }
}
