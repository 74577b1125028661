// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: OBJECT_CONTRACT_SYSTEM_TEST_* variables mapped to typed settings.
// Purpose: Let suites pick artifact roots, a live target, and slower timeouts.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Parsing works over a lookup function so suites read the process
//! environment while unit tests pass a fixed table. A variable that is set
//! must be UTF-8, non-blank, and well-formed; otherwise loading fails.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Variables understood by the system tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Directory that receives per-test artifact folders.
    RunRoot,
    /// Base URL targeted by the `live-api` suite.
    LiveBaseUrl,
    /// Minimum per-request timeout, in whole seconds.
    TimeoutSeconds,
    /// Keep artifacts of passing tests under `target/system-tests`.
    KeepArtifacts,
}

impl SystemTestEnv {
    /// Returns the variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "OBJECT_CONTRACT_SYSTEM_TEST_RUN_ROOT",
            Self::LiveBaseUrl => "OBJECT_CONTRACT_SYSTEM_TEST_LIVE_URL",
            Self::TimeoutSeconds => "OBJECT_CONTRACT_SYSTEM_TEST_TIMEOUT_SEC",
            Self::KeepArtifacts => "OBJECT_CONTRACT_SYSTEM_TEST_KEEP_ARTIFACTS",
        }
    }
}

/// Settings shared by the system-test helpers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Artifact root override.
    pub run_root: Option<PathBuf>,
    /// Live suite target; the public API when unset.
    pub live_base_url: Option<String>,
    /// Floor applied to request timeouts.
    pub timeout: Option<Duration>,
    /// Whether passing tests keep their artifacts.
    pub keep_artifacts: bool,
}

impl SystemTestConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending variable.
    pub fn load() -> Result<Self, String> {
        Self::from_lookup(std::env::var_os)
    }

    /// Reads variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending variable.
    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<OsString>) -> Result<Self, String> {
        let text = |var: SystemTestEnv| -> Result<Option<String>, String> {
            let Some(raw) = lookup(var.as_str()) else {
                return Ok(None);
            };
            let value = raw.into_string().map_err(|_| format!("{} is not UTF-8", var.as_str()))?;
            if value.trim().is_empty() {
                return Err(format!("{} is set but blank", var.as_str()));
            }
            Ok(Some(value))
        };
        Ok(Self {
            run_root: text(SystemTestEnv::RunRoot)?.map(PathBuf::from),
            live_base_url: text(SystemTestEnv::LiveBaseUrl)?,
            timeout: text(SystemTestEnv::TimeoutSeconds)?.as_deref().map(seconds).transpose()?,
            keep_artifacts: text(SystemTestEnv::KeepArtifacts)?.as_deref().map(flag).transpose()?
                == Some(true),
        })
    }
}

/// Whole positive seconds.
fn seconds(raw: &str) -> Result<Duration, String> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(format!(
            "{} expects whole seconds above zero, got '{raw}'",
            SystemTestEnv::TimeoutSeconds.as_str()
        )),
    }
}

/// `1`/`0` or `true`/`false`, any case.
fn flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(format!(
            "{} expects 1, 0, true, or false, got '{raw}'",
            SystemTestEnv::KeepArtifacts.as_str()
        )),
    }
}
