//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `filer` exit codes.
//! Exit codes are part of the shell contract; schedulers rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Run completed (per-row errors included)  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | Usage / config error                     |
//! | 50-59   | stores           | Sheet and Drive access                   |
//!
//! Row-level failures never change the exit code; they are only logged.

use filer_recon::{ReconError, StoreError};

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - the run completed.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable or invalid config.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Stores (50-59)
// =============================================================================

/// No access token provided (neither flag nor env var).
pub const EXIT_STORE_NOT_AUTH: u8 = 50;

/// Token rejected by Google (401/403).
pub const EXIT_STORE_AUTH: u8 = 51;

/// The configured sheet tab does not exist.
pub const EXIT_SHEET_NOT_FOUND: u8 = 52;

/// Upstream error, network failure, or malformed response.
pub const EXIT_STORE_UPSTREAM: u8 = 53;

/// Map a fatal run error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_USAGE,
        ReconError::SheetNotFound(_) => EXIT_SHEET_NOT_FOUND,
        ReconError::ReadRows(e) | ReconError::Inventory(e) => store_exit_code(e),
    }
}

pub fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::Auth(_) => EXIT_STORE_AUTH,
        StoreError::SheetNotFound(_) => EXIT_SHEET_NOT_FOUND,
        _ => EXIT_STORE_UPSTREAM,
    }
}
