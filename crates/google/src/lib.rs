//! Google Drive / Sheets stores for `filer-recon`.
//!
//! No GUI concepts. No retries. No progress bars.

mod client;
pub mod drive;
pub mod sheets;

pub use client::{extract_google_error, ApiClient, USER_AGENT};
pub use drive::{DriveClient, DRIVE_API_BASE};
pub use sheets::{SheetsClient, SHEETS_API_BASE};
