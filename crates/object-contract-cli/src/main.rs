// crates/object-contract-cli/src/main.rs
// ============================================================================
// Module: Object Contract CLI Entry Point
// Description: Command dispatcher for contract runs and config checks.
// Purpose: Run lifecycle cases against a live API and report the outcome.
// Dependencies: clap, object-contract-core, object-contract-config, serde_jcs, tokio
// ============================================================================

//! ## Overview
//! `object-contract run` resolves configuration, builds the HTTP transport and
//! diagnostic sink, runs the selected cases, optionally writes report
//! artifacts, and exits non-zero when any case failed or errored. Human output
//! goes to stdout; errors and diagnostics go to stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use object_contract_config::ConfigError;
use object_contract_config::DiagnosticSinkKind;
use object_contract_config::DiagnosticsConfig;
use object_contract_config::HarnessConfig;
use object_contract_core::ContractRunner;
use object_contract_core::DiagnosticSink;
use object_contract_core::FileDiagnosticSink;
use object_contract_core::HttpObjectTransport;
use object_contract_core::NoopDiagnosticSink;
use object_contract_core::Scenario;
use object_contract_core::StderrDiagnosticSink;
use object_contract_core::SuiteReport;
use object_contract_core::write_suite_report;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definitions
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "object-contract", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run lifecycle cases against the configured API.
    Run(RunCommand),
    /// List the available scenarios.
    Scenarios,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `run`.
#[derive(Args, Debug, Default)]
struct RunCommand {
    /// Optional config file path (defaults to object-contract.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Base URL override (takes precedence over config and environment).
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Scenario to run; repeat to select several (defaults to config or all).
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,
    /// Run cases concurrently.
    #[arg(long, action = ArgAction::SetTrue)]
    parallel: bool,
    /// Directory for `summary.json` and `summary.md`.
    #[arg(long, value_name = "DIR")]
    report: Option<PathBuf>,
    /// Emit the suite report as canonical JSON instead of a text summary.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a harness configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to object-contract.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("object-contract {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run(command) => command_run(command).await,
        Commands::Scenarios => command_scenarios(),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(command) => command_config_validate(&command),
        },
    }
}

/// Prints CLI help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let mut config = HarnessConfig::load(command.config.as_deref()).map_err(config_error)?;
    apply_run_overrides(&mut config, &command).map_err(config_error)?;
    let base_url = config.base_url().map_err(config_error)?;
    let transport = HttpObjectTransport::new(base_url, config.timeout(), config.connect_timeout())
        .map_err(|err| CliError::new(err.to_string()))?;
    let sink = build_sink(&config.diagnostics)?;

    let mut runner = ContractRunner::new(Arc::new(transport), sink);
    for scenario in config.scenarios().map_err(config_error)? {
        runner.register(scenario);
    }
    let report = runner.run_all(config.run_mode()).await;

    if let Some(dir) = &command.report {
        write_suite_report(dir, &report).map_err(|err| {
            CliError::new(format!("failed to write report to {}: {err}", dir.display()))
        })?;
    }
    if command.json {
        let bytes = serde_jcs::to_vec(&report)
            .map_err(|err| CliError::new(format!("failed to serialize report: {err}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|err| CliError::new(format!("failed to serialize report: {err}")))?;
        write_stdout_line(&text).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else {
        for line in summary_lines(&report) {
            write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::from(exit_status(&report)))
}

/// Applies command-line overrides on top of file and environment settings.
fn apply_run_overrides(config: &mut HarnessConfig, command: &RunCommand) -> Result<(), ConfigError> {
    if let Some(base_url) = &command.base_url {
        config.target.base_url.clone_from(base_url);
    }
    if command.parallel {
        config.run.parallel = true;
    }
    if !command.scenarios.is_empty() {
        config.run.scenarios.clone_from(&command.scenarios);
    }
    config.validate()
}

/// Builds the diagnostic sink selected by configuration.
fn build_sink(diagnostics: &DiagnosticsConfig) -> CliResult<Arc<dyn DiagnosticSink>> {
    match diagnostics.sink {
        DiagnosticSinkKind::Stderr => Ok(Arc::new(StderrDiagnosticSink)),
        DiagnosticSinkKind::None => Ok(Arc::new(NoopDiagnosticSink)),
        DiagnosticSinkKind::File => {
            let path = diagnostics.path.as_deref().ok_or_else(|| {
                CliError::new("diagnostics.sink = \"file\" requires diagnostics.path".to_string())
            })?;
            let sink = FileDiagnosticSink::new(path).map_err(|err| {
                CliError::new(format!(
                    "failed to open diagnostics file {}: {err}",
                    path.display()
                ))
            })?;
            Ok(Arc::new(sink))
        }
    }
}

/// Renders the text summary, one line per case followed by totals.
fn summary_lines(report: &SuiteReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.cases.len() + 1);
    for case in &report.cases {
        let mut line =
            format!("{:<8} {} ({} ms)", case.outcome.label(), case.case, case.duration_ms);
        if let Some(detail) = case.outcome.detail() {
            line.push_str(": ");
            line.push_str(detail);
        }
        lines.push(line);
    }
    lines.push(format!(
        "{} passed, {} failed, {} errored",
        report.passed(),
        report.failed(),
        report.errored()
    ));
    lines
}

/// Process exit status for a finished run.
fn exit_status(report: &SuiteReport) -> u8 {
    u8::from(!report.is_success())
}

// ============================================================================
// SECTION: Scenario and Config Commands
// ============================================================================

/// Executes the `scenarios` command.
fn command_scenarios() -> CliResult<ExitCode> {
    for scenario in Scenario::ALL {
        write_stdout_line(&format!("{:<20} {}", scenario.name(), scenario.description()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config validate` command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = HarnessConfig::load(command.config.as_deref()).map_err(config_error)?;
    let scenarios = config.scenarios().map_err(config_error)?;
    write_stdout_line(&format!(
        "config ok: base_url={}, scenarios={}",
        config.target.base_url,
        scenarios.len()
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Wraps a configuration failure.
fn config_error(err: ConfigError) -> CliError {
    CliError::new(format!("failed to load config: {err}"))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
