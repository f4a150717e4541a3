//! `filer-recon`: files staged invoice PDFs into the folders a sheet names.
//!
//! Pure engine crate: talks to the sheet and the folder tree only through
//! the [`store`] traits. No HTTP or CLI dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod memory;
pub mod model;
pub mod store;

pub use classify::{classify, expected_name, view_link, Decision};
pub use config::{Column, ColumnRoles, FilerConfig};
pub use engine::{load_snapshot, plan, run, Snapshot};
pub use error::{ReconError, StoreError};
pub use inventory::{build_inventory, InventoryMap, NameCollision};
pub use model::{Artifact, CellValue, Outcome, Record, RunReport, RunStats};
pub use store::{FileStore, ListPage, ListQuery, Pages, RecordStore};
