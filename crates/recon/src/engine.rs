use crate::classify::{classify, view_link, Decision};
use crate::config::FilerConfig;
use crate::error::{ReconError, StoreError};
use crate::inventory::{build_inventory, InventoryMap};
use crate::model::{
    Artifact, OrphanedRecord, Outcome, Record, RowOutcome, RunMeta, RunReport, RunStats,
};
use crate::store::{FileStore, RecordStore};

/// Everything read from the two stores before any mutation happens.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub inventory: InventoryMap,
}

/// A record paired with what `run` would do to it.
#[derive(Debug, Clone)]
pub struct PlannedRow<'a> {
    pub record: &'a Record,
    pub decision: Decision<'a>,
}

/// Read the sheet, then index the staging folder to completion.
///
/// A missing sheet or any listing failure is fatal. A sheet with no data
/// rows skips indexing entirely.
pub fn load_snapshot<R, F>(config: &FilerConfig, records: &R, files: &F) -> Result<Snapshot, ReconError>
where
    R: RecordStore,
    F: FileStore,
{
    config.validate()?;

    let rows = records
        .read_rows(&config.sheet_name)
        .map_err(|e| match e {
            StoreError::SheetNotFound(name) => ReconError::SheetNotFound(name),
            other => ReconError::ReadRows(other),
        })?;

    let data_rows = rows.get(config.header_rows..).unwrap_or_default();
    let records = Record::from_rows(data_rows, config.header_rows + 1, &config.columns);
    if records.is_empty() {
        log::info!("sheet '{}' has no data rows", config.sheet_name);
        return Ok(Snapshot {
            records,
            inventory: InventoryMap::new(),
        });
    }

    let inventory =
        build_inventory(files, &config.staging_folder_id).map_err(ReconError::Inventory)?;
    log::info!(
        "indexed {} files in staging folder ({} pages)",
        inventory.len(),
        inventory.pages()
    );

    Ok(Snapshot { records, inventory })
}

/// Classify every record without touching either store.
pub fn plan<'a>(records: &'a [Record], inventory: &'a InventoryMap) -> Vec<PlannedRow<'a>> {
    records
        .iter()
        .map(|record| PlannedRow {
            record,
            decision: classify(record, inventory),
        })
        .collect()
}

/// Run one full pass: snapshot, reconcile, log the summary.
pub fn run<R, F>(config: &FilerConfig, records: &mut R, files: &mut F) -> Result<RunReport, ReconError>
where
    R: RecordStore,
    F: FileStore,
{
    let snapshot = load_snapshot(config, &*records, &*files)?;
    let report = reconcile(config, &snapshot, records, files);
    log_summary(&report.stats);
    Ok(report)
}

/// Walk the snapshot's records once, in order. Never fails: per-row
/// store errors become `Outcome::Error`.
pub fn reconcile<R, F>(
    config: &FilerConfig,
    snapshot: &Snapshot,
    records: &mut R,
    files: &mut F,
) -> RunReport
where
    R: RecordStore,
    F: FileStore,
{
    let mut stats = RunStats::default();
    let mut rows = Vec::with_capacity(snapshot.records.len());
    let mut orphaned = Vec::new();

    for planned in plan(&snapshot.records, &snapshot.inventory) {
        let record = planned.record;
        let mut row = RowOutcome {
            row: record.row,
            identifier: record.identifier.clone(),
            outcome: Outcome::Error,
            artifact_id: planned.decision.artifact().map(|a| a.id.clone()),
            link: None,
            message: None,
        };

        if let Some(outcome) = planned.decision.settled_outcome() {
            row.outcome = outcome;
        } else if let Decision::Move {
            artifact,
            destination,
        } = planned.decision
        {
            match file_record(config, record, artifact, destination, records, files) {
                Ok(link) => {
                    row.outcome = Outcome::Moved;
                    row.link = Some(link);
                }
                Err(failure) => {
                    let message = failure.error().to_string();
                    log::error!("Row {} | Error: {}", record.row, message);

                    if let FilingFailure::WriteBack(_) = failure {
                        log::warn!(
                            "Row {} | file {} was moved to {} but its link was not written; \
                             later runs will report it as missing",
                            record.row,
                            artifact.id,
                            destination
                        );
                        orphaned.push(OrphanedRecord {
                            row: record.row,
                            identifier: record.identifier.clone().unwrap_or_default(),
                            artifact_id: artifact.id.clone(),
                            destination: destination.to_string(),
                            message: message.clone(),
                        });
                    }
                    row.message = Some(message);
                }
            }
        }

        stats.record(row.outcome);
        rows.push(row);
    }

    RunReport {
        meta: RunMeta {
            config_name: config.name.clone(),
            sheet_name: config.sheet_name.clone(),
            staging_folder_id: config.staging_folder_id.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        stats,
        rows,
        collisions: snapshot.inventory.collisions().to_vec(),
        orphaned,
    }
}

enum FilingFailure {
    Move(StoreError),
    WriteBack(StoreError),
}

impl FilingFailure {
    fn error(&self) -> &StoreError {
        match self {
            Self::Move(e) | Self::WriteBack(e) => e,
        }
    }
}

/// Move the file out of every current parent into `destination`, then
/// write its view link into the record's link cell.
fn file_record<R, F>(
    config: &FilerConfig,
    record: &Record,
    artifact: &Artifact,
    destination: &str,
    records: &mut R,
    files: &mut F,
) -> Result<String, FilingFailure>
where
    R: RecordStore,
    F: FileStore,
{
    let remove: Vec<String> = artifact
        .parents
        .iter()
        .filter(|p| p.as_str() != destination)
        .cloned()
        .collect();
    files
        .move_file(&artifact.id, &[destination.to_string()], &remove)
        .map_err(FilingFailure::Move)?;

    let link = view_link(&artifact.id);
    records
        .write_cell(&config.sheet_name, record.row, config.columns.link, &link)
        .map_err(FilingFailure::WriteBack)?;

    Ok(link)
}

/// Emit the end-of-run tally.
pub fn log_summary(stats: &RunStats) {
    log::info!("===== PROCESS SUMMARY =====");
    for (key, count) in stats.entries() {
        log::info!("{key}: {count}");
    }
}
