//! Spreadsheet <-> flat text bridge
//!
//! The destination sheet is flattened to a CSV file next to the workbook,
//! extracted rows are appended to that file, and the file is written back over
//! the sheet. The CSV only lives for the duration of one run.

use crate::record::{RateRecord, DATE_FORMAT};
use crate::ImportError;
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveTime;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Path of the flat text file for a workbook (extension replaced by `.csv`)
pub fn flat_text_path<P: AsRef<Path>>(workbook: P) -> PathBuf {
    workbook.as_ref().with_extension("csv")
}

/// Intermediate CSV file, removed from disk when dropped
#[derive(Debug)]
pub struct FlatTextFile {
    path: PathBuf,
}

impl FlatTextFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FlatTextFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}

fn spreadsheet_error(workbook: &Path, e: impl std::fmt::Display) -> ImportError {
    ImportError::Spreadsheet(format!("{}: {}", workbook.display(), e))
}

/// Render a cell the way it should appear in the flat file
fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() <= 9_007_199_254_740_992.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        // Same text as the dates of appended rows
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.time() == NaiveTime::MIN => {
                datetime.format(DATE_FORMAT).to_string()
            }
            Some(datetime) => datetime.format("%m/%d/%Y %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Read a sheet into rows of text, anchored at `A1`
pub fn read_sheet(workbook: &Path, sheet: &str) -> Result<Vec<Vec<String>>, ImportError> {
    let mut wb: Xlsx<_> = open_workbook(workbook).map_err(|e| spreadsheet_error(workbook, e))?;

    if !wb.sheet_names().iter().any(|name| name == sheet) {
        return Err(ImportError::SheetNotFound {
            workbook: workbook.to_path_buf(),
            sheet: sheet.to_string(),
        });
    }

    let range = wb
        .worksheet_range(sheet)
        .map_err(|e| spreadsheet_error(workbook, e))?;

    // The range starts at the first used cell; pad back to A1 so rows and
    // columns land where they were when the sheet is rewritten.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let width = range.width() + col_offset;

    let mut rows: Vec<Vec<String>> = (0..row_offset).map(|_| vec![String::new(); width]).collect();
    for row in range.rows() {
        let mut cells = vec![String::new(); col_offset];
        cells.extend(row.iter().map(cell_to_text));
        rows.push(cells);
    }

    Ok(rows)
}

/// Flatten a sheet into a CSV file next to the workbook
pub fn workbook_to_flat_text(workbook: &Path, sheet: &str) -> Result<FlatTextFile, ImportError> {
    let rows = read_sheet(workbook, sheet)?;
    let flat = FlatTextFile {
        path: flat_text_path(workbook),
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(flat.path())?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    log::debug!(
        "Wrote {} rows of {} to {}",
        rows.len(),
        sheet,
        flat.path().display()
    );
    Ok(flat)
}

/// Append one CSV row per record to an existing flat file
pub fn append_records(flat: &Path, records: &[RateRecord]) -> Result<(), ImportError> {
    let file = OpenOptions::new().append(true).open(flat)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(file);

    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read every row of a flat file, header included
pub fn read_flat_text(flat: &Path) -> Result<Vec<Vec<String>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(flat)?;

    reader
        .records()
        .map(|record| Ok(record?.iter().map(str::to_string).collect()))
        .collect()
}

/// Replace the contents of a sheet with `rows`, starting at `A1`.
///
/// Other sheets of the workbook are kept. The workbook is written to a
/// temporary file in the same directory and renamed over the original.
///
/// Cell types are inferred from the text, as pandas does on a CSV read: any
/// value that parses as a finite number becomes a numeric cell, so text such
/// as `"007"` comes back as `7`. Dates come back as `MM/DD/YYYY` text.
pub fn write_sheet(workbook: &Path, sheet: &str, rows: &[Vec<String>]) -> Result<(), ImportError> {
    let mut book =
        umya_spreadsheet::reader::xlsx::read(workbook).map_err(|e| spreadsheet_error(workbook, e))?;

    let ws = book
        .get_sheet_by_name_mut(sheet)
        .ok_or_else(|| ImportError::SheetNotFound {
            workbook: workbook.to_path_buf(),
            sheet: sheet.to_string(),
        })?;

    let highest_row = ws.get_highest_row();
    if highest_row > 0 {
        ws.remove_row(&1, &highest_row);
    }

    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let cell = ws.get_cell_mut(((c + 1) as u32, (r + 1) as u32));
            match value.parse::<f64>() {
                Ok(number) if number.is_finite() => {
                    cell.set_value_number(number);
                }
                _ => {
                    cell.set_value_string(value.clone());
                }
            }
        }
    }

    let dir = match workbook.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = tempfile::Builder::new()
        .prefix(".rates-")
        .suffix(".xlsx")
        .tempfile_in(dir)?;

    umya_spreadsheet::writer::xlsx::write(&book, staged.path())
        .map_err(|e| spreadsheet_error(workbook, e))?;
    staged.persist(workbook).map_err(|e| ImportError::Io(e.error))?;

    Ok(())
}

/// Write a flat file back over the sheet it was taken from
pub fn flat_text_to_workbook(
    flat: &Path,
    workbook: &Path,
    sheet: &str,
) -> Result<(), ImportError> {
    let rows = read_flat_text(flat)?;
    write_sheet(workbook, sheet, &rows)?;
    log::debug!("Wrote {} rows to {} / {}", rows.len(), workbook.display(), sheet);
    Ok(())
}
