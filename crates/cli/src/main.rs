mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use clausal_core::{load_rule_set, validate_document, LoadError, RuleSet, ValidationError};
use clausal_eval::{evaluate_with, DecisionState, EvalOptions, FactEnv};

use crate::config::Config;

/// Exit status when evaluation succeeded but produced block errors.
const EXIT_BLOCKED: i32 = 2;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Clause rule language toolchain.
#[derive(Parser)]
#[command(name = "clausal", version, about = "Clause rule language toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a clausal.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter directive (overrides the config file; RUST_LOG overrides both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a rule document and report every structural error
    Validate {
        /// Path to the rule document (JSON)
        rules: PathBuf,
    },

    /// Evaluate a rule document against a set of facts
    Eval {
        /// Path to the rule document (JSON)
        rules: PathBuf,
        /// Path to the facts JSON file
        #[arg(long)]
        facts: PathBuf,
        /// Fail when a {"var": ...} operand does not resolve
        #[arg(long)]
        strict_references: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())
        .unwrap_or_else(|e| fail(&format!("error: {}", e), cli.output, cli.quiet));
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Err(e) = logging::init(&config.logging) {
        fail(&format!("error: {}", e), cli.output, cli.quiet);
    }

    match cli.command {
        Commands::Validate { rules } => {
            cmd_validate(&rules, cli.output, cli.quiet);
        }
        Commands::Eval {
            rules,
            facts,
            strict_references,
        } => {
            let options = EvalOptions {
                strict_references: strict_references || config.eval.strict_references,
            };
            cmd_eval(&rules, &facts, &options, cli.output, cli.quiet);
        }
    }
}

fn cmd_validate(rules_path: &Path, output: OutputFormat, quiet: bool) {
    let doc = read_json(rules_path, "rules").unwrap_or_else(|msg| fail(&msg, output, quiet));

    let errors = validate_document(&doc);
    if !errors.is_empty() {
        report_validation_errors(&errors, output, quiet);
        process::exit(1);
    }

    let rule_set = RuleSet::from_json(&doc).unwrap_or_else(|e| {
        fail(&format!("error: {}", e), output, quiet)
    });
    if quiet {
        return;
    }
    let fingerprint = format!("sha256:{}", rule_set.fingerprint());
    match output {
        OutputFormat::Text => println!("valid ({} rules, {})", rule_set.len(), fingerprint),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "valid": true,
                "rules": rule_set.len(),
                "fingerprint": fingerprint,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}

fn cmd_eval(
    rules_path: &Path,
    facts_path: &Path,
    options: &EvalOptions,
    output: OutputFormat,
    quiet: bool,
) {
    let doc = read_json(rules_path, "rules").unwrap_or_else(|msg| fail(&msg, output, quiet));
    let facts_doc =
        read_json(facts_path, "facts").unwrap_or_else(|msg| fail(&msg, output, quiet));

    // Validation is the gate: an invalid document is never evaluated.
    let rule_set = match load_rule_set(&doc) {
        Ok(rs) => rs,
        Err(LoadError::Invalid(errors)) => {
            report_validation_errors(&errors, output, quiet);
            process::exit(1);
        }
        Err(e) => fail(&format!("error: {}", e), output, quiet),
    };

    let facts = FactEnv::from_json(&facts_doc).unwrap_or_else(|e| {
        fail(
            &format!("error: invalid facts in {}: {}", facts_path.display(), e),
            output,
            quiet,
        )
    });

    tracing::debug!(
        rules = %rules_path.display(),
        facts = %facts_path.display(),
        strict_references = options.strict_references,
        "evaluating rule document"
    );
    let state = evaluate_with(&rule_set, &facts, options)
        .unwrap_or_else(|e| fail(&format!("evaluation error: {}", e), output, quiet));

    if !quiet {
        match output {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&state.to_json())
                    .unwrap_or_else(|e| format!("serialization error: {}", e))
            ),
            OutputFormat::Text => print_decision_summary(&state, rule_set.len()),
        }
    }

    if let Err(blocked) = state.ensure_generatable() {
        if !quiet && output == OutputFormat::Text {
            eprintln!("{}", blocked);
        }
        process::exit(EXIT_BLOCKED);
    }
}

fn print_decision_summary(state: &DecisionState, total_rules: usize) {
    println!("{} of {} rule(s) fired", state.trace.len(), total_rules);
    if !state.clauses.is_empty() {
        println!("clauses:");
        for (clause_id, status) in &state.clauses {
            println!("  {}: {}", clause_id, status);
        }
    }
    if !state.variants.is_empty() {
        println!("variants:");
        for (clause_id, variant_id) in &state.variants {
            println!("  {}: {}", clause_id, variant_id);
        }
    }
    if !state.variables.is_empty() {
        println!("variables:");
        for (key, value) in &state.variables {
            println!("  {} = {}", key, value);
        }
    }
    if !state.questions.is_empty() {
        println!("questions:");
        for key in &state.questions {
            println!("  {}", key);
        }
    }
    if !state.warnings.is_empty() {
        println!("warnings:");
        for w in &state.warnings {
            println!("  [{}] {}", w.rule_id, w.message);
        }
    }
    if !state.blocks.is_empty() {
        println!("blocks:");
        for b in &state.blocks {
            println!("  [{}] {}", b.rule_id, b.message);
        }
    }
}

fn read_json(path: &Path, what: &str) -> Result<serde_json::Value, String> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| format!("error: {} file '{}': {}", what, path.display(), e))?;
    serde_json::from_str(&src)
        .map_err(|e| format!("error: invalid JSON in {}: {}", path.display(), e))
}

fn report_validation_errors(errors: &[ValidationError], output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => {
            eprintln!("invalid rule document: {} error(s)", errors.len());
            for err in errors {
                eprintln!("  - {}", err);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "valid": false,
                "errors": errors,
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}

fn fail(msg: &str, output: OutputFormat, quiet: bool) -> ! {
    report_error(msg, output, quiet);
    process::exit(1);
}
