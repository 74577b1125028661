// system-tests/src/lib.rs
// ============================================================================
// Module: Object Contract System Tests Library
// Description: Shared configuration for system test suites.
// Purpose: Provide common settings for the object contract system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the object contract
//! system-tests binaries in `system-tests/tests`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
