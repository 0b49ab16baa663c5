//! Load workbook I/O
//!
//! The whole workbook is read into memory with calamine, mutated in place
//! while a run writes back remote ids, then written out once with
//! rust_xlsxwriter. Only cell values survive a save; formatting does not.

pub mod columns;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::entities::EntityKind;
use columns::SHEET_NAMES;

/// One worksheet as a grid of cells; `rows[0]` is the header
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Data>>,
}

/// A load workbook held in memory
#[derive(Debug, Clone)]
pub struct DataFile {
    path: PathBuf,
    sheets: Vec<Sheet>,
}

impl DataFile {
    /// Read every sheet of an .xlsx file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook: Xlsx<_> = open_workbook(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for name in sheet_names {
            let range = workbook
                .worksheet_range(&name)
                .with_context(|| format!("Failed to read sheet: {}", name))?;

            // Ranges start at the first used cell; pad back to A1
            let (start_row, start_col) = range.start().unwrap_or((0, 0));
            let mut rows: Vec<Vec<Data>> = vec![Vec::new(); start_row as usize];
            for row in range.rows() {
                let mut cells = vec![Data::Empty; start_col as usize];
                cells.extend(row.iter().cloned());
                rows.push(cells);
            }

            log::debug!("Read sheet '{}' with {} rows", name, rows.len());
            sheets.push(Sheet { name, rows });
        }

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    /// Build from sheets already in memory
    pub fn from_sheets(path: impl Into<PathBuf>, sheets: Vec<Sheet>) -> Self {
        Self {
            path: path.into(),
            sheets,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Fail unless exactly the five expected sheets are present
    pub fn validate_layout(&self) -> Result<()> {
        let mut found: Vec<&str> = self.sheets.iter().map(|s| s.name.as_str()).collect();
        found.sort_unstable();
        let mut expected = SHEET_NAMES.to_vec();
        expected.sort_unstable();

        if found != expected {
            bail!(
                "{} does not have the expected sheets. Expected: {}. Found: {}",
                self.path.display(),
                SHEET_NAMES.join(", "),
                self.sheets
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(())
    }

    pub fn sheet(&self, kind: EntityKind) -> Result<&Sheet> {
        let name = columns::sheet_name(kind);
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .with_context(|| format!("Sheet '{}' not found", name))
    }

    pub fn sheet_mut(&mut self, kind: EntityKind) -> Result<&mut Sheet> {
        let name = columns::sheet_name(kind);
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .with_context(|| format!("Sheet '{}' not found", name))
    }

    /// Write back to the file this was opened from
    pub fn save(&self) -> Result<()> {
        self.save_as(&self.path)
    }

    pub fn save_as<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut workbook = Workbook::new();

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            write_sheet(worksheet, sheet)?;
        }

        workbook
            .save(path)
            .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;
        log::debug!("Saved {}", path.display());
        Ok(())
    }
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Data rows as (row index, cells), skipping the header
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[Data])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, row)| (idx, row.as_slice()))
    }

    /// Trimmed text of a cell; empty cells read as `None`
    pub fn cell_string(&self, row: usize, col: u16) -> Option<String> {
        self.rows.get(row).and_then(|r| cell_string(r, col))
    }

    /// Set a cell, growing the grid as needed
    pub fn set_string(&mut self, row: usize, col: u16, value: &str) {
        if self.rows.len() <= row {
            self.rows.resize(row + 1, Vec::new());
        }
        let cells = &mut self.rows[row];
        let col = col as usize;
        if cells.len() <= col {
            cells.resize(col + 1, Data::Empty);
        }
        cells[col] = Data::String(value.to_string());
    }

    pub fn clear(&mut self, row: usize, col: u16) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col as usize)) {
            *cell = Data::Empty;
        }
    }

    /// Write `value` into `target_col` of every data row whose `key_col`
    /// equals `key`; returns the number of rows written
    pub fn write_where(&mut self, key_col: u16, key: &str, target_col: u16, value: &str) -> usize {
        let matching: Vec<usize> = self
            .data_rows()
            .filter(|(_, cells)| cell_string(cells, key_col).as_deref() == Some(key))
            .map(|(idx, _)| idx)
            .collect();

        for idx in &matching {
            self.set_string(*idx, target_col, value);
        }
        matching.len()
    }
}

/// Trimmed text of a cell in a row
pub fn cell_string(row: &[Data], col: u16) -> Option<String> {
    row.get(col as usize).and_then(|c| match c {
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                Some((*f as i64).to_string())
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::DateTime(dt) => Some(dt.to_string()),
        Data::Empty | Data::Error(_) => None,
    })
}

fn write_sheet(ws: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    for (row_idx, cells) in sheet.rows.iter().enumerate() {
        let row = row_idx as u32;
        for (col_idx, cell) in cells.iter().enumerate() {
            let col = col_idx as u16;
            match cell {
                Data::Empty | Data::Error(_) => { /* Leave cell empty */ }
                Data::String(s) => { ws.write_string(row, col, s)?; }
                Data::Int(i) => { ws.write_number(row, col, *i as f64)?; }
                Data::Float(f) => { ws.write_number(row, col, *f)?; }
                Data::Bool(b) => { ws.write_boolean(row, col, *b)?; }
                Data::DateTime(dt) => { ws.write_number(row, col, dt.as_f64())?; }
                Data::DateTimeIso(s) | Data::DurationIso(s) => { ws.write_string(row, col, s)?; }
            }
        }
    }
    Ok(())
}
