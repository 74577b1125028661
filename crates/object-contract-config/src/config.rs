// crates/object-contract-config/src/config.rs
// ============================================================================
// Module: Harness Configuration
// Description: Configuration loading and validation for contract runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: object-contract-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is resolved from an explicit path, else
//! `OBJECT_CONTRACT_CONFIG`, else `object-contract.toml` when it exists, else
//! built-in defaults. Environment overrides for the base URL and timeout are
//! applied after the file is parsed and before validation. Environment values
//! are read with strict UTF-8 enforcement.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use object_contract_core::RunMode;
use object_contract_core::Scenario;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "object-contract.toml";
/// Default base URL of the API under test.
pub const DEFAULT_BASE_URL: &str = "https://api.restful-api.dev";
/// Default whole-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Minimum allowed timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum allowed timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Environment keys read by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Config file path override.
    ConfigPath,
    /// Base URL override.
    BaseUrl,
    /// Request timeout override in milliseconds (positive integer).
    TimeoutMs,
}

impl HarnessEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "OBJECT_CONTRACT_CONFIG",
            Self::BaseUrl => "OBJECT_CONTRACT_BASE_URL",
            Self::TimeoutMs => "OBJECT_CONTRACT_TIMEOUT_MS",
        }
    }
}

/// Environment lookup used during resolution; injectable for tests.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<OsString>;

/// Reads from the process environment.
fn process_env(name: &str) -> Option<OsString> {
    env::var_os(name)
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Object contract harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// API under test.
    #[serde(default)]
    pub target: TargetConfig,
    /// Diagnostic sink selection.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Run selection and mode.
    #[serde(default)]
    pub run: RunConfig,
}

/// Target API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Base URL; `/objects` is resolved against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl TargetConfig {
    /// Validates the target settings.
    fn validate(&self) -> Result<(), ConfigError> {
        parse_base_url(&self.base_url)?;
        validate_timeout("target.timeout_ms", self.timeout_ms)?;
        validate_timeout("target.connect_timeout_ms", self.connect_timeout_ms)?;
        Ok(())
    }
}

/// Diagnostic sink kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `diagnostics.path`.
    File,
    /// Discard diagnostics.
    None,
}

/// Diagnostics settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: DiagnosticSinkKind,
    /// File path for the `file` sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DiagnosticsConfig {
    /// Validates the diagnostics settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (DiagnosticSinkKind::File, None) => Err(ConfigError::Invalid(
                "diagnostics.sink = \"file\" requires diagnostics.path".to_string(),
            )),
            (_, Some(path)) => validate_path_string("diagnostics.path", &path.to_string_lossy()),
            (_, None) => Ok(()),
        }
    }
}

/// Run selection settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Run cases concurrently.
    #[serde(default)]
    pub parallel: bool,
    /// Scenario names to run; empty runs all.
    #[serde(default)]
    pub scenarios: Vec<String>,
}

impl RunConfig {
    /// Validates scenario names.
    fn validate(&self) -> Result<(), ConfigError> {
        for name in &self.scenarios {
            if Scenario::from_name(name).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "run.scenarios contains unknown scenario `{name}`"
                )));
            }
        }
        Ok(())
    }
}

impl HarnessConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, &process_env)
    }

    /// Loads configuration using an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding, or validation fails.
    pub fn load_with_env(path: Option<&Path>, lookup: EnvLookup<'_>) -> Result<Self, ConfigError> {
        let mut config = match resolve_path(path, lookup)? {
            Some(resolved) => Self::read_file(&resolved)?,
            None => Self::default(),
        };
        config.apply_env_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file without validating it.
    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies `OBJECT_CONTRACT_BASE_URL` and `OBJECT_CONTRACT_TIMEOUT_MS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override is not UTF-8, is
    /// empty, or is not a positive integer.
    pub fn apply_env_overrides(&mut self, lookup: EnvLookup<'_>) -> Result<(), ConfigError> {
        if let Some(base_url) = read_env_nonempty(lookup, HarnessEnv::BaseUrl)? {
            self.target.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = read_env_nonempty(lookup, HarnessEnv::TimeoutMs)? {
            self.target.timeout_ms = parse_positive_millis(HarnessEnv::TimeoutMs.as_str(), &raw)?;
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target.validate()?;
        self.diagnostics.validate()?;
        self.run.validate()?;
        Ok(())
    }

    /// Returns the parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the base URL is not an absolute
    /// http or https URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.target.base_url)
    }

    /// Returns the whole-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.target.timeout_ms)
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.target.connect_timeout_ms)
    }

    /// Returns the selected scenarios in configured order without duplicates;
    /// every scenario when none are selected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown scenario name.
    pub fn scenarios(&self) -> Result<Vec<Scenario>, ConfigError> {
        if self.run.scenarios.is_empty() {
            return Ok(Scenario::ALL.to_vec());
        }
        let mut selected = Vec::with_capacity(self.run.scenarios.len());
        for name in &self.run.scenarios {
            let scenario = Scenario::from_name(name).ok_or_else(|| {
                ConfigError::Invalid(format!("run.scenarios contains unknown scenario `{name}`"))
            })?;
            if !selected.contains(&scenario) {
                selected.push(scenario);
            }
        }
        Ok(selected)
    }

    /// Returns the configured run mode.
    #[must_use]
    pub const fn run_mode(&self) -> RunMode {
        if self.run.parallel { RunMode::Concurrent } else { RunMode::Sequential }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default base URL.
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Resolves the config path from CLI, environment, or the default filename.
/// Returns `None` when nothing was requested and no default file exists.
fn resolve_path(path: Option<&Path>, lookup: EnvLookup<'_>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(env_path) = read_env_nonempty(lookup, HarnessEnv::ConfigPath)? {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default_path.is_file().then_some(default_path))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Parses the base URL, requiring an absolute http or https URL.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| ConfigError::Invalid(format!("target.base_url is invalid: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!(
            "target.base_url must use http or https, found {}",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::Invalid("target.base_url must include a host".to_string()));
    }
    Ok(url)
}

/// Checks a timeout against the allowed range.
fn validate_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
        )));
    }
    Ok(())
}

/// Reads an environment variable with strict UTF-8 and rejects empty values.
fn read_env_nonempty(lookup: EnvLookup<'_>, key: HarnessEnv) -> Result<Option<String>, ConfigError> {
    let name = key.as_str();
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let value =
        raw.into_string().map_err(|_| ConfigError::Invalid(format!("{name} must be valid UTF-8")))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{name} must not be empty")));
    }
    Ok(Some(value))
}

/// Parses a positive integer number of milliseconds.
fn parse_positive_millis(name: &str, raw: &str) -> Result<u64, ConfigError> {
    let invalid = || ConfigError::Invalid(format!("{name} must be a positive integer of milliseconds"));
    let value: u64 = raw.trim().parse().map_err(|_| invalid())?;
    if value == 0 {
        return Err(invalid());
    }
    Ok(value)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
