// crates/object-contract-config/src/lib.rs
// ============================================================================
// Module: Object Contract Config Library
// Description: Configuration model and validation for harness runs.
// Purpose: Single source of truth for object-contract.toml semantics.
// Dependencies: object-contract-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `object-contract-config` resolves the target API, timeouts, diagnostics
//! sink, and scenario selection from a TOML file plus environment overrides.
//! Validation is fail-closed: an invalid file never falls back to defaults.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
