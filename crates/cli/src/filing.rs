//! `filer run` / `filer plan` / `filer inventory`.

use std::io::Write;
use std::path::PathBuf;

use filer_google::{DriveClient, SheetsClient};
use filer_recon::{build_inventory, load_snapshot, plan, Decision};

use crate::settings::{self, Settings};
use crate::CliError;

fn open_stores(settings: &Settings, token: String) -> Result<(SheetsClient, DriveClient), CliError> {
    let sheets = SheetsClient::with_base_url(
        token.clone(),
        settings.config.spreadsheet_id.clone(),
        settings.endpoints.sheets.clone(),
    )
    .map_err(CliError::store)?;
    let drive = DriveClient::with_base_url(token, settings.endpoints.drive.clone())
        .map_err(CliError::store)?;
    Ok((sheets, drive))
}

fn csv_writer(out: &Option<PathBuf>) -> Result<csv::Writer<Box<dyn Write>>, CliError> {
    let writer: Box<dyn Write> = match out {
        Some(path) => {
            let f = std::fs::File::create(path).map_err(|e| {
                CliError::io(format!("cannot create {}: {}", path.display(), e))
            })?;
            Box::new(std::io::BufWriter::new(f))
        }
        None => Box::new(std::io::BufWriter::new(std::io::stdout().lock())),
    };

    Ok(csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer))
}

fn csv_error(e: impl std::fmt::Display) -> CliError {
    CliError::io(format!("CSV write error: {}", e))
}

// ── run ─────────────────────────────────────────────────────────────

pub fn cmd_run(
    config: Option<PathBuf>,
    access_token: Option<String>,
    report: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = settings::load(config)?;
    let token = settings::resolve_access_token(access_token)?;
    let (mut sheets, mut drive) = open_stores(&settings, token)?;

    log::info!(
        "filing '{}' from folder {} ({})",
        settings.config.sheet_name,
        settings.config.staging_folder_id,
        settings.path.display()
    );

    let result = filer_recon::run(&settings.config, &mut sheets, &mut drive)
        .map_err(CliError::recon)?;

    if let Some(path) = report {
        let json = result
            .to_json()
            .map_err(|e| CliError::io(format!("cannot serialize report: {}", e)))?;
        std::fs::write(&path, json)
            .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))?;
    }

    Ok(())
}

// ── plan ────────────────────────────────────────────────────────────

pub fn cmd_plan(
    config: Option<PathBuf>,
    access_token: Option<String>,
    out: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = settings::load(config)?;
    let token = settings::resolve_access_token(access_token)?;
    let (sheets, drive) = open_stores(&settings, token)?;

    let snapshot = load_snapshot(&settings.config, &sheets, &drive).map_err(CliError::recon)?;

    let mut w = csv_writer(&out)?;
    w.write_record(["row", "identifier", "decision", "artifact_id", "destination"])
        .map_err(csv_error)?;

    for planned in plan(&snapshot.records, &snapshot.inventory) {
        let record = planned.record;
        let destination = match &planned.decision {
            Decision::Move { destination, .. } => *destination,
            _ => "",
        };
        w.write_record([
            record.row.to_string().as_str(),
            record.identifier.as_deref().unwrap_or(""),
            planned.decision.label(),
            planned.decision.artifact().map(|a| a.id.as_str()).unwrap_or(""),
            destination,
        ])
        .map_err(csv_error)?;
    }

    w.flush().map_err(csv_error)
}

// ── inventory ───────────────────────────────────────────────────────

pub fn cmd_inventory(
    config: Option<PathBuf>,
    access_token: Option<String>,
    out: Option<PathBuf>,
) -> Result<(), CliError> {
    let settings = settings::load(config)?;
    let token = settings::resolve_access_token(access_token)?;
    let (_, drive) = open_stores(&settings, token)?;

    let inventory = build_inventory(&drive, &settings.config.staging_folder_id)
        .map_err(CliError::store)?;

    let mut w = csv_writer(&out)?;
    w.write_record(["name", "id", "parents"]).map_err(csv_error)?;
    for file in inventory.sorted() {
        let parents: Vec<&str> = file.parents.iter().map(String::as_str).collect();
        w.write_record([file.name.as_str(), file.id.as_str(), parents.join(";").as_str()])
            .map_err(csv_error)?;
    }

    w.flush().map_err(csv_error)?;
    log::info!(
        "{} files in {} ({} pages)",
        inventory.len(),
        settings.config.staging_folder_id,
        inventory.pages()
    );
    Ok(())
}
