use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use thiserror::Error;

use std::io::{self, Read};
use std::path::PathBuf;

use crate::config;
use crate::expr::{DynamicValue, ExprError, Expression, MapResolver, SyntaxError, TokenizeError};
use crate::rules::{self, RuleError};

use super::exit_codes;
use super::output::{
    self, CheckData, EqualData, EvalData, OutputMode, PathData, RuleChangeData, TokenData,
    TokensData, VerifyData,
};

#[derive(Parser)]
#[command(name = "filterexpr")]
#[command(about = "Evaluate boolean filter expressions against key/value data")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides FILTEREXPR_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log what the evaluator does (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate an expression (exit 0 when true, 2 when false)
    Eval {
        /// Expression text, e.g. "code >= 200 && code < 300"
        expression: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Print the tokens an expression is split into
    Tokens {
        /// Expression text
        expression: String,
    },

    /// Check whether two expressions are structurally equal
    Equal {
        left: String,
        right: String,
    },

    /// Evaluate rules from the config file
    Check {
        /// Rule name(s) to evaluate (default: all rules)
        #[arg(short, long = "rule", action = clap::ArgAction::Append)]
        rules: Vec<String>,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Show current configuration
    Show,
    /// Verify that every configured rule compiles
    Verify,
    /// Add or replace a rule
    SetRule {
        /// Rule name
        name: String,
        /// Expression text
        expression: String,
    },
    /// Remove a rule
    RemoveRule {
        /// Rule name
        name: String,
    },
}

/// variables to evaluate against
#[derive(Args, Debug, Default)]
pub struct DataArgs {
    /// JSON object of variables, or "-" to read it from stdin
    #[arg(short, long)]
    pub data: Option<String>,

    /// Set one variable (repeatable); numbers and booleans are detected
    #[arg(long = "var", value_name = "NAME=VALUE", action = clap::ArgAction::Append)]
    pub vars: Vec<String>,
}

/// a failure that maps to a specific exit code
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    pub code: i32,
    pub message: String,
    pub suggestions: Vec<String>,
    pub details: Vec<String>,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            details: Vec::new(),
        }
    }

    fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

impl From<TokenizeError> for CliError {
    fn from(e: TokenizeError) -> Self {
        Self::new(exit_codes::SYNTAX_ERROR, ExprError::from(e).to_string())
    }
}

impl From<SyntaxError> for CliError {
    fn from(e: SyntaxError) -> Self {
        Self::new(exit_codes::SYNTAX_ERROR, ExprError::from(e).to_string())
    }
}

impl From<ExprError> for CliError {
    fn from(e: ExprError) -> Self {
        let code = if e.is_syntax() {
            exit_codes::SYNTAX_ERROR
        } else {
            exit_codes::EVAL_ERROR
        };
        Self::new(code, e.to_string())
    }
}

impl From<RuleError> for CliError {
    fn from(e: RuleError) -> Self {
        match e {
            RuleError::Compile { .. } => Self::new(exit_codes::CONFIG_ERROR, e.to_string()),
            RuleError::Unknown {
                ref suggestions, ..
            } => {
                let suggestions = suggestions.clone();
                Self::new(exit_codes::INVALID_ARGS, e.to_string()).with_suggestions(suggestions)
            }
        }
    }
}

/// run a command, returning the process exit code
///
/// failures are reported here, on stdout as a JSON-RPC error in JSON mode or
/// on stderr otherwise.
pub fn execute(cli: Cli) -> i32 {
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet);

    match dispatch(cli, output_mode) {
        Ok(code) => code,
        Err(e) => {
            let (code, suggestions, details) = match e.downcast_ref::<CliError>() {
                Some(cli_err) => (
                    cli_err.code,
                    cli_err.suggestions.clone(),
                    cli_err.details.clone(),
                ),
                None => (exit_codes::ERROR, Vec::new(), Vec::new()),
            };
            let message = format!("{:#}", e);

            if output_mode.is_json() {
                if suggestions.is_empty() && details.is_empty() {
                    output::print_json_error(code, &message);
                } else {
                    output::print_json_error_with_data(code, &message, suggestions, details);
                }
            } else {
                eprintln!("Error: {}", message);
                for detail in &details {
                    eprintln!("  - {}", detail);
                }
                if !suggestions.is_empty() {
                    eprintln!("Did you mean: {}?", suggestions.join(", "));
                }
            }
            code
        }
    }
}

fn dispatch(cli: Cli, output_mode: OutputMode) -> Result<i32> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Eval { expression, data } => {
            let expr = Expression::compile(&expression).map_err(CliError::from)?;
            let resolver = build_resolver(&data)?;

            let value = expr.evaluate(&resolver).map_err(CliError::from)?;
            if let Some(e) = value.error_ref() {
                return Err(CliError::from(ExprError::from(e.clone())).into());
            }
            let verdict = value.as_boolean();

            match output_mode {
                OutputMode::Json => output::print_json(&EvalData {
                    expression: expr.source().to_string(),
                    verdict,
                    value: value.to_string(),
                }),
                OutputMode::Text => println!("{}", verdict),
                OutputMode::Quiet => {}
            }

            Ok(verdict_code(verdict))
        }

        Commands::Tokens { expression } => {
            let expr = Expression::compile(&expression).map_err(CliError::from)?;
            let tokens: Vec<_> = expr.tokens().iter().filter(|t| !t.is_end()).collect();

            match output_mode {
                OutputMode::Json => output::print_json(&TokensData {
                    expression: expr.source().to_string(),
                    tokens: tokens.iter().map(|t| TokenData::from(*t)).collect(),
                }),
                OutputMode::Text => {
                    for token in tokens {
                        println!("{:<10} {}", token.kind.name(), token.raw);
                    }
                }
                OutputMode::Quiet => {}
            }

            Ok(exit_codes::SUCCESS)
        }

        Commands::Equal { left, right } => {
            let equal = crate::expr::structurally_equal(&left, &right);

            match output_mode {
                OutputMode::Json => output::print_json(&EqualData { left, right, equal }),
                OutputMode::Text => println!("{}", equal),
                OutputMode::Quiet => {}
            }

            Ok(verdict_code(equal))
        }

        Commands::Check { rules, data } => {
            let config = config::load_with_override(config_path)
                .map_err(|e| CliError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)))?;
            let rule_set = config::rule_set(&config).map_err(CliError::from)?;

            if rule_set.is_empty() {
                return Err(CliError::new(
                    exit_codes::CONFIG_ERROR,
                    "no rules configured (add one with `filterexpr config set-rule`)",
                )
                .into());
            }

            let resolver = build_resolver(&data)?;
            let outcomes = if rules.is_empty() {
                rule_set.evaluate(&resolver)
            } else {
                rule_set
                    .evaluate_selected(rules.as_slice(), &resolver)
                    .map_err(CliError::from)?
            };

            let has_error = outcomes.iter().any(|o| o.result.is_err());
            let has_false = outcomes.iter().any(|o| matches!(o.result, Ok(false)));
            let code = if has_error && config.settings.fail_on_error {
                exit_codes::EVAL_ERROR
            } else if has_false {
                exit_codes::VERDICT_FALSE
            } else {
                exit_codes::SUCCESS
            };

            match output_mode {
                OutputMode::Json => output::print_json(&CheckData {
                    passed: code == exit_codes::SUCCESS,
                    rules: outcomes.iter().map(|o| o.to_data()).collect(),
                }),
                OutputMode::Text => {
                    for outcome in &outcomes {
                        match &outcome.result {
                            Ok(true) => println!("✓ {}", outcome.name),
                            Ok(false) => println!("✗ {}", outcome.name),
                            Err(e) => println!("! {}: {}", outcome.name, e),
                        }
                    }
                }
                OutputMode::Quiet => {}
            }

            Ok(code)
        }

        Commands::Config { command } => run_config(command, config_path, output_mode),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_config(
    command: ConfigCommands,
    config_path: Option<&std::path::Path>,
    output_mode: OutputMode,
) -> Result<i32> {
    let config_error = |e: anyhow::Error| CliError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e));

    match command {
        ConfigCommands::Path => {
            let path = config::get_config_path_with_override(config_path)?;
            match output_mode {
                OutputMode::Json => output::print_json(&PathData {
                    path: path.display().to_string(),
                }),
                _ => println!("{}", path.display()),
            }
            Ok(exit_codes::SUCCESS)
        }

        ConfigCommands::Show => {
            let config = config::load_with_override(config_path).map_err(config_error)?;
            match output_mode {
                OutputMode::Json => output::print_json(&config),
                OutputMode::Text => {
                    let json = serde_json::to_string_pretty(&config)
                        .context("Failed to serialize config")?;
                    println!("{}", json);
                }
                OutputMode::Quiet => {}
            }
            Ok(exit_codes::SUCCESS)
        }

        ConfigCommands::Verify => {
            let path = config::get_config_path_with_override(config_path)?;
            let errors = config::verify(&path).map_err(config_error)?;

            if errors.is_empty() {
                match output_mode {
                    OutputMode::Json => output::print_json(&VerifyData {
                        path: path.display().to_string(),
                        valid: true,
                        errors,
                    }),
                    OutputMode::Text => {
                        println!("✓ Configuration is valid: {}", path.display())
                    }
                    OutputMode::Quiet => {}
                }
                return Ok(exit_codes::SUCCESS);
            }

            Err(CliError::new(
                exit_codes::CONFIG_ERROR,
                format!(
                    "configuration has {} error(s): {}",
                    errors.len(),
                    path.display()
                ),
            )
            .with_details(errors)
            .into())
        }

        ConfigCommands::SetRule { name, expression } => {
            // report bad expressions as syntax errors, not config errors
            Expression::compile(&expression).map_err(CliError::from)?;

            let mut config = config::load_with_override(config_path).map_err(config_error)?;
            config::set_rule(&mut config, &name, &expression)
                .map_err(|e| CliError::new(exit_codes::INVALID_ARGS, format!("{:#}", e)))?;
            config::save_with_override(&config, config_path)?;

            let name = name.trim().to_string();
            let expression = config.rules.get(&name).cloned().unwrap_or(expression);
            match output_mode {
                OutputMode::Json => output::print_json(&RuleChangeData {
                    action: "set",
                    name,
                    expression,
                }),
                OutputMode::Text => println!("Set rule {} = {}", name, expression),
                OutputMode::Quiet => {}
            }
            Ok(exit_codes::SUCCESS)
        }

        ConfigCommands::RemoveRule { name } => {
            let mut config = config::load_with_override(config_path).map_err(config_error)?;
            let suggestions = rules::suggest_names(config.rules.keys(), &name);
            let expression = config::remove_rule(&mut config, &name).map_err(|e| {
                CliError::new(exit_codes::INVALID_ARGS, e.to_string()).with_suggestions(suggestions)
            })?;
            config::save_with_override(&config, config_path)?;

            match output_mode {
                OutputMode::Json => output::print_json(&RuleChangeData {
                    action: "remove",
                    name,
                    expression,
                }),
                OutputMode::Text => println!("Removed rule {}", name),
                OutputMode::Quiet => {}
            }
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn verdict_code(verdict: bool) -> i32 {
    if verdict {
        exit_codes::SUCCESS
    } else {
        exit_codes::VERDICT_FALSE
    }
}

/// build the variables for one run from `--data` and `--var`
///
/// `--var` entries are applied after `--data`, so they override it.
fn build_resolver(args: &DataArgs) -> Result<MapResolver, CliError> {
    let mut resolver = MapResolver::new();

    if let Some(data) = &args.data {
        let content = if data == "-" {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input).map_err(|e| {
                CliError::new(exit_codes::INVALID_ARGS, format!("failed to read stdin: {}", e))
            })?;
            input
        } else {
            data.clone()
        };

        let object = parse_data(&content)?;
        resolver.extend(object.iter().map(|(k, v)| (k.as_str(), DynamicValue::from(v))));
    }

    for var in &args.vars {
        let (name, value) = parse_var(var)?;
        resolver.insert(name, DynamicValue::parse(value));
    }

    Ok(resolver)
}

fn parse_data(content: &str) -> Result<serde_json::Map<String, serde_json::Value>, CliError> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| {
        CliError::new(exit_codes::INVALID_ARGS, format!("invalid --data JSON: {}", e))
    })?;

    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(CliError::new(
            exit_codes::INVALID_ARGS,
            format!("--data must be a JSON object, got: {}", other),
        )),
    }
}

fn parse_var(var: &str) -> Result<(&str, &str), CliError> {
    match var.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(CliError::new(
            exit_codes::INVALID_ARGS,
            format!("invalid --var '{}': expected NAME=VALUE", var),
        )),
    }
}
