//! In-memory stores for tests and offline runs.
//!
//! Both stores can be told to fail specific calls so the per-row error
//! path can be exercised without a network.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::Column;
use crate::error::StoreError;
use crate::model::{Artifact, CellValue};
use crate::store::{FileStore, ListPage, ListQuery, RecordStore};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub sheet: String,
    pub row: usize,
    pub column: Column,
    pub value: String,
}

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    sheets: BTreeMap<String, Vec<Vec<CellValue>>>,
    writes: Vec<CellWrite>,
    failing_rows: HashMap<usize, StoreError>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        self.sheets.insert(name.to_string(), rows);
        self
    }

    /// Make every write to sheet row `row` fail with `error`.
    pub fn fail_writes_on_row(&mut self, row: usize, error: StoreError) {
        self.failing_rows.insert(row, error);
    }

    pub fn cell(&self, sheet: &str, row: usize, column: Column) -> Option<&CellValue> {
        self.sheets
            .get(sheet)?
            .get(row.checked_sub(1)?)?
            .get(column.offset())
    }

    /// Successful writes, in call order.
    pub fn writes(&self) -> &[CellWrite] {
        &self.writes
    }
}

impl RecordStore for MemoryRecordStore {
    fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError> {
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }

    fn write_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: Column,
        value: &str,
    ) -> Result<(), StoreError> {
        if let Some(err) = self.failing_rows.get(&row) {
            return Err(err.clone());
        }
        let rows = self
            .sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;
        if row == 0 {
            return Err(StoreError::Other("row numbers start at 1".into()));
        }
        if rows.len() < row {
            rows.resize(row, Vec::new());
        }
        let cells = &mut rows[row - 1];
        if cells.len() <= column.offset() {
            cells.resize(column.offset() + 1, CellValue::Empty);
        }
        cells[column.offset()] = CellValue::text(value);

        self.writes.push(CellWrite {
            sheet: sheet.to_string(),
            row,
            column,
            value: value.to_string(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCall {
    pub file_id: String,
    pub add_parents: Vec<String>,
    pub remove_parents: Vec<String>,
}

/// Files listed in insertion order, `page_size` per page. Page tokens are
/// the offset of the next page.
#[derive(Debug)]
pub struct MemoryFileStore {
    files: Vec<Artifact>,
    trashed: HashSet<String>,
    page_size: usize,
    list_calls: Cell<u32>,
    list_failure: Option<StoreError>,
    failing_moves: HashMap<String, StoreError>,
    moves: Vec<MoveCall>,
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            trashed: HashSet::new(),
            page_size: 100,
            list_calls: Cell::new(0),
            list_failure: None,
            failing_moves: HashMap::new(),
            moves: Vec::new(),
        }
    }
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn add(&mut self, artifact: Artifact) {
        self.files.push(artifact);
    }

    /// Add a file that exists but is in the trash.
    pub fn add_trashed(&mut self, artifact: Artifact) {
        self.trashed.insert(artifact.id.clone());
        self.files.push(artifact);
    }

    pub fn fail_listing(&mut self, error: StoreError) {
        self.list_failure = Some(error);
    }

    pub fn fail_moves_of(&mut self, file_id: &str, error: StoreError) {
        self.failing_moves.insert(file_id.to_string(), error);
    }

    pub fn file(&self, id: &str) -> Option<&Artifact> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Current parents of `id`, sorted.
    pub fn parents_of(&self, id: &str) -> Vec<String> {
        self.file(id)
            .map(|f| f.parents.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.get()
    }

    /// Successful moves, in call order.
    pub fn moves(&self) -> &[MoveCall] {
        &self.moves
    }
}

impl FileStore for MemoryFileStore {
    fn list_page(&self, query: &ListQuery, page_token: Option<&str>) -> Result<ListPage, StoreError> {
        self.list_calls.set(self.list_calls.get() + 1);
        if let Some(err) = &self.list_failure {
            return Err(err.clone());
        }

        let start = match page_token {
            None => 0,
            Some(t) => t
                .parse::<usize>()
                .map_err(|_| StoreError::Http {
                    status: 400,
                    message: format!("Invalid page token: {t}"),
                })?,
        };

        let matching: Vec<&Artifact> = self
            .files
            .iter()
            .filter(|f| f.parents.contains(&query.parent) && !self.trashed.contains(&f.id))
            .collect();

        let end = (start + self.page_size).min(matching.len());
        let files = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|f| (*f).clone())
            .collect();
        let next_page_token = (end < matching.len()).then(|| end.to_string());

        Ok(ListPage {
            files,
            next_page_token,
        })
    }

    fn move_file(
        &mut self,
        file_id: &str,
        add_parents: &[String],
        remove_parents: &[String],
    ) -> Result<(), StoreError> {
        if let Some(err) = self.failing_moves.get(file_id) {
            return Err(err.clone());
        }
        let file = self
            .files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| StoreError::NotFound(format!("File not found: {file_id}")))?;

        for parent in remove_parents {
            file.parents.remove(parent);
        }
        for parent in add_parents {
            file.parents.insert(parent.clone());
        }

        self.moves.push(MoveCall {
            file_id: file_id.to_string(),
            add_parents: add_parents.to_vec(),
            remove_parents: remove_parents.to_vec(),
        });
        Ok(())
    }
}
