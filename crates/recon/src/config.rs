use std::fmt;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FilerConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub staging_folder_id: String,
    /// Rows at the top of the sheet that are never treated as records.
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,
    #[serde(default)]
    pub columns: ColumnRoles,
}

fn default_name() -> String {
    "invoice-filer".to_string()
}

fn default_header_rows() -> usize {
    1
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Which sheet columns play which role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnRoles {
    pub identifier: Column,
    pub destination: Column,
    pub link: Column,
}

impl Default for ColumnRoles {
    /// A = invoice number, M = destination folder id, P = file link.
    fn default() -> Self {
        Self {
            identifier: Column(1),
            destination: Column(13),
            link: Column(16),
        }
    }
}

/// A 1-based sheet column. Deserializes from either an index (`13`) or
/// letters (`"M"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "ColumnRef")]
pub struct Column(usize);

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ColumnRef {
    Index(i64),
    Letters(String),
}

impl TryFrom<ColumnRef> for Column {
    type Error = String;

    fn try_from(value: ColumnRef) -> Result<Self, Self::Error> {
        match value {
            ColumnRef::Index(i) if i >= 1 => Ok(Column(i as usize)),
            ColumnRef::Index(i) => Err(format!("column index must be >= 1, got {i}")),
            ColumnRef::Letters(s) => Column::from_letters(&s)
                .ok_or_else(|| format!("invalid column letters '{s}'")),
        }
    }
}

impl Column {
    /// Build from a 1-based index. Returns `None` for 0.
    pub fn new(index: usize) -> Option<Self> {
        (index >= 1).then_some(Self(index))
    }

    /// Parse spreadsheet column letters (`A`, `M`, `AA`), case-insensitive.
    pub fn from_letters(letters: &str) -> Option<Self> {
        let letters = letters.trim();
        if letters.is_empty() || letters.len() > 3 {
            return None;
        }
        let mut index = 0usize;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            index = index * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
        }
        Some(Self(index))
    }

    /// 1-based column number.
    pub fn index(self) -> usize {
        self.0
    }

    /// 0-based offset into a row of cells.
    pub fn offset(self) -> usize {
        self.0 - 1
    }

    /// A1-notation letters (1 → `A`, 27 → `AA`).
    pub fn letters(self) -> String {
        let mut n = self.0;
        let mut out = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            out.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        out.reverse();
        String::from_utf8(out).unwrap_or_default()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letters())
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl FilerConfig {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        staging_folder_id: impl Into<String>,
    ) -> Self {
        Self {
            name: default_name(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            staging_folder_id: staging_folder_id.into(),
            header_rows: default_header_rows(),
            columns: ColumnRoles::default(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: FilerConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (field, value) in [
            ("spreadsheet_id", &self.spreadsheet_id),
            ("sheet_name", &self.sheet_name),
            ("staging_folder_id", &self.staging_folder_id),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{field} must not be blank"
                )));
            }
        }

        // The link column is written to; it must not clobber an input column.
        let cols = &self.columns;
        if cols.link == cols.identifier || cols.link == cols.destination {
            return Err(ReconError::ConfigValidation(format!(
                "link column {} overlaps an input column",
                cols.link
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
