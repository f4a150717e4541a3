//! Sheets v4 record store.
//!
//! API: GET https://sheets.googleapis.com/v4/spreadsheets/{id}
//!      GET https://sheets.googleapis.com/v4/spreadsheets/{id}/values/{range}
//!      PUT https://sheets.googleapis.com/v4/spreadsheets/{id}/values/{range}
//! Values are read with `UNFORMATTED_VALUE` so numbers arrive as JSON
//! numbers and go through `CellValue::normalized` like any other cell.

use filer_recon::{CellValue, Column, RecordStore, StoreError};
use serde::Deserialize;

use crate::client::{endpoint, ApiClient};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

// ── A1 notation ─────────────────────────────────────────────────────

/// `'Sheet Name'` with embedded quotes doubled.
pub fn quote_sheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Single-cell range, e.g. `'Invoice_List'!P7`.
pub fn cell_range(sheet: &str, row: usize, column: Column) -> String {
    format!("{}!{}{}", quote_sheet(sheet), column.letters(), row)
}

// ── Sheets client ───────────────────────────────────────────────────

pub struct SheetsClient {
    client: ApiClient,
    base_url: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(token: String, spreadsheet_id: String) -> Result<Self, StoreError> {
        Self::with_base_url(token, spreadsheet_id, SHEETS_API_BASE.to_string())
    }

    pub fn with_base_url(
        token: String,
        spreadsheet_id: String,
        base_url: String,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            client: ApiClient::new("Sheets", token)?,
            base_url,
            spreadsheet_id,
        })
    }

    /// Titles of every tab in the spreadsheet.
    pub fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        let url = endpoint(&self.base_url, &["v4", "spreadsheets", self.spreadsheet_id.as_str()])?;
        let req = self
            .client
            .http()
            .get(url)
            .query(&[("fields", "sheets.properties.title")]);
        let meta: SpreadsheetMeta = self.client.send(req)?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }
}

impl RecordStore for SheetsClient {
    fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
        if !self.sheet_titles()?.iter().any(|t| t == sheet) {
            return Err(StoreError::SheetNotFound(sheet.to_string()));
        }

        let range = quote_sheet(sheet);
        let url = endpoint(
            &self.base_url,
            &["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range.as_str()],
        )?;
        let req = self.client.http().get(url).query(&[
            ("valueRenderOption", "UNFORMATTED_VALUE"),
            ("majorDimension", "ROWS"),
        ]);

        let values: ValueRange = self.client.send(req)?;
        log::debug!("sheet '{}': {} rows", sheet, values.values.len());

        Ok(values
            .values
            .iter()
            .map(|row| row.iter().map(CellValue::from_json).collect())
            .collect())
    }

    fn write_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: Column,
        value: &str,
    ) -> Result<(), StoreError> {
        let range = cell_range(sheet, row, column);
        let url = endpoint(
            &self.base_url,
            &["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range.as_str()],
        )?;
        let req = self
            .client
            .http()
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&serde_json::json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [[value]],
            }));

        let _: serde_json::Value = self.client.send(req)?;
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
