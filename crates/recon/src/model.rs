use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::ColumnRoles;
use crate::inventory::NameCollision;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A raw spreadsheet cell as the record store returned it.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Decode a Sheets API value (`UNFORMATTED_VALUE` render option).
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Empty, Self::Number),
            other => Self::Text(other.to_string()),
        }
    }

    /// The one normalization every record field goes through: render to
    /// text, trim, and map blank to `None`.
    pub fn normalized(&self) -> Option<String> {
        let rendered = match self {
            Self::Empty => return None,
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => render_number(*n),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
        };
        (!rendered.is_empty()).then_some(rendered)
    }
}

// Integral values print without a fraction so 1001.0 joins as "1001".
fn render_number(n: f64) -> String {
    if !n.is_finite() {
        return String::new();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ---------------------------------------------------------------------------
// Records + Artifacts
// ---------------------------------------------------------------------------

/// One data row of the sheet, normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// 1-based sheet row number, used only to target the write-back.
    pub row: usize,
    pub identifier: Option<String>,
    pub destination: Option<String>,
    pub completion_link: Option<String>,
}

impl Record {
    /// Pick the role columns out of a row. Short rows read as blank.
    pub fn from_cells(row: usize, cells: &[CellValue], columns: &ColumnRoles) -> Self {
        let field = |col: crate::config::Column| {
            cells.get(col.offset()).and_then(CellValue::normalized)
        };
        Self {
            row,
            identifier: field(columns.identifier),
            destination: field(columns.destination),
            completion_link: field(columns.link),
        }
    }

    /// Normalize every data row. `first_row` is the sheet row number of
    /// `rows[0]`.
    pub fn from_rows(rows: &[Vec<CellValue>], first_row: usize, columns: &ColumnRoles) -> Vec<Self> {
        rows.iter()
            .enumerate()
            .map(|(i, cells)| Self::from_cells(first_row + i, cells, columns))
            .collect()
    }
}

/// A file in the staging folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub id: String,
    pub name: String,
    /// Every folder currently holding the file.
    pub parents: BTreeSet<String>,
}

impl Artifact {
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            parents: parents.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AlreadyLinked,
    MissingArtifact,
    MissingDestination,
    Moved,
    Error,
    /// Blank identifier. Tallied apart from the five outcome categories.
    NoIdentifier,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyLinked => write!(f, "already_linked"),
            Self::MissingArtifact => write!(f, "missing_artifact"),
            Self::MissingDestination => write!(f, "missing_destination"),
            Self::Moved => write!(f, "moved"),
            Self::Error => write!(f, "error"),
            Self::NoIdentifier => write!(f, "no_identifier"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub moved: usize,
    pub skipped_no_pdf: usize,
    pub skipped_no_folder: usize,
    pub skipped_has_link: usize,
    pub errors: usize,
    pub no_identifier: usize,
}

impl RunStats {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Moved => self.moved += 1,
            Outcome::MissingArtifact => self.skipped_no_pdf += 1,
            Outcome::MissingDestination => self.skipped_no_folder += 1,
            Outcome::AlreadyLinked => self.skipped_has_link += 1,
            Outcome::Error => self.errors += 1,
            Outcome::NoIdentifier => self.no_identifier += 1,
        }
    }

    /// Sum of the five outcome categories (excludes `no_identifier`).
    pub fn outcome_total(&self) -> usize {
        self.moved + self.skipped_no_pdf + self.skipped_no_folder + self.skipped_has_link + self.errors
    }

    /// Summary lines in log order.
    pub fn entries(&self) -> [(&'static str, usize); 6] {
        [
            ("moved", self.moved),
            ("skippedNoPdf", self.skipped_no_pdf),
            ("skippedNoFolder", self.skipped_no_folder),
            ("skippedHasLink", self.skipped_has_link),
            ("errors", self.errors),
            ("noIdentifier", self.no_identifier),
        ]
    }
}

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A row whose file was moved but whose link never got written. The file
/// has left the staging folder, so later runs report it as missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedRecord {
    pub row: usize,
    pub identifier: String,
    pub artifact_id: String,
    pub destination: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub stats: RunStats,
    pub rows: Vec<RowOutcome>,
    pub collisions: Vec<NameCollision>,
    pub orphaned: Vec<OrphanedRecord>,
}

impl RunReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub sheet_name: String,
    pub staging_folder_id: String,
    pub engine_version: String,
    pub run_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Column, ColumnRoles};

    #[test]
    fn normalized_trims_and_blanks() {
        assert_eq!(CellValue::text("  1001 ").normalized().as_deref(), Some("1001"));
        assert_eq!(CellValue::text("   ").normalized(), None);
        assert_eq!(CellValue::Empty.normalized(), None);
        assert_eq!(CellValue::Bool(true).normalized().as_deref(), Some("TRUE"));
    }

    #[test]
    fn normalized_numbers() {
        assert_eq!(CellValue::Number(1001.0).normalized().as_deref(), Some("1001"));
        assert_eq!(CellValue::Number(-7.0).normalized().as_deref(), Some("-7"));
        assert_eq!(CellValue::Number(12.5).normalized().as_deref(), Some("12.5"));
        assert_eq!(CellValue::Number(f64::NAN).normalized(), None);
    }

    #[test]
    fn from_json_maps_sheet_values() {
        let row: Vec<CellValue> = serde_json::json!(["1001", 1002, true, null, ""])
            .as_array()
            .unwrap()
            .iter()
            .map(CellValue::from_json)
            .collect();
        assert_eq!(row[0], CellValue::text("1001"));
        assert_eq!(row[1], CellValue::Number(1002.0));
        assert_eq!(row[2], CellValue::Bool(true));
        assert_eq!(row[3], CellValue::Empty);
        assert_eq!(row[4].normalized(), None);
    }

    #[test]
    fn record_from_short_row_reads_blank() {
        let columns = ColumnRoles::default();
        let record = Record::from_cells(2, &[CellValue::Number(1001.0)], &columns);
        assert_eq!(record.row, 2);
        assert_eq!(record.identifier.as_deref(), Some("1001"));
        assert_eq!(record.destination, None);
        assert_eq!(record.completion_link, None);
    }

    #[test]
    fn records_number_from_first_row() {
        let columns = ColumnRoles {
            identifier: Column::new(1).unwrap(),
            destination: Column::new(2).unwrap(),
            link: Column::new(3).unwrap(),
        };
        let rows = vec![
            vec![CellValue::text("a"), CellValue::text("F1")],
            vec![CellValue::text("b"), CellValue::text(" "), CellValue::text("https://x")],
        ];
        let records = Record::from_rows(&rows, 2, &columns);
        assert_eq!(records[0].row, 2);
        assert_eq!(records[1].row, 3);
        assert_eq!(records[1].destination, None);
        assert_eq!(records[1].completion_link.as_deref(), Some("https://x"));
    }

    #[test]
    fn stats_keep_no_identifier_out_of_outcome_total() {
        let mut stats = RunStats::default();
        for o in [
            Outcome::Moved,
            Outcome::Error,
            Outcome::NoIdentifier,
            Outcome::AlreadyLinked,
        ] {
            stats.record(o);
        }
        assert_eq!(stats.outcome_total(), 3);
        assert_eq!(stats.no_identifier, 1);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["skippedHasLink"], 1);
        assert_eq!(json["noIdentifier"], 1);
    }
}
