//! Rate-table import from plan PDFs into an upload workbook
//!
//! This crate provides:
//! - Line-oriented page text extraction from PDFs
//! - Positional field extraction for the small-group rate-table template
//! - A CSV bridge that appends extracted rows to an existing workbook sheet

pub mod extractor;
pub mod fields;
pub mod logging;
pub mod record;
pub mod settings;
pub mod states;
pub mod workbook;

pub use extractor::{extract_pages, extract_pages_mem, load_document, Page};
pub use fields::{extract_record, Field, FieldError, PageLayout};
pub use record::{AgeBand, RateRecord, AGE_BAND_COUNT};
pub use settings::Settings;

use std::path::PathBuf;

/// Records extracted from every configured document
#[derive(Debug, Default)]
pub struct ParsedDocuments {
    pub records: Vec<RateRecord>,
    pub documents_parsed: usize,
    /// Documents that could not be opened
    pub documents_skipped: usize,
}

/// Outcome of a completed import run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub documents_parsed: usize,
    pub documents_skipped: usize,
    pub records_appended: usize,
}

/// Extract a record from every page of every configured document.
///
/// Unopenable documents are skipped; the first page that does not match the
/// layout aborts the whole parse.
pub fn parse_documents(settings: &Settings) -> Result<ParsedDocuments, ImportError> {
    let mut parsed = ParsedDocuments::default();

    for document in &settings.documents {
        log::info!("Beginning to parse {}", document.display());

        let Some(pages) = load_document(document) else {
            parsed.documents_skipped += 1;
            continue;
        };

        for page in &pages {
            let record = extract_record(&page.lines, &settings.layout).map_err(|source| {
                ImportError::Field {
                    document: document.clone(),
                    page: page.number,
                    source,
                }
            })?;
            log::debug!(
                "{} page {}: {} {} {}",
                document.display(),
                page.number,
                record.product_name,
                record.state,
                record.rating_area
            );
            parsed.records.push(record);
        }

        parsed.documents_parsed += 1;
        log::info!("Finished parsing {}", document.display());
    }

    Ok(parsed)
}

/// Run a full import: parse every document, then append the records to the
/// destination sheet.
///
/// Nothing is written until every document has been parsed, so a layout
/// failure leaves the workbook untouched. Re-running appends the rows again.
pub fn run_import(settings: &Settings) -> Result<ImportSummary, ImportError> {
    let parsed = parse_documents(settings)?;

    log::info!("Creating temporary CSV");
    let flat = workbook::workbook_to_flat_text(&settings.workbook, &settings.sheet)?;

    log::info!("Writing to CSV");
    workbook::append_records(flat.path(), &parsed.records)?;

    log::info!("Converting from CSV to XLSX");
    workbook::flat_text_to_workbook(flat.path(), &settings.workbook, &settings.sheet)?;
    drop(flat);

    Ok(ImportSummary {
        documents_parsed: parsed.documents_parsed,
        documents_skipped: parsed.documents_skipped,
        records_appended: parsed.records.len(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Pdf(String),
    #[error("{} page {page}: {source}", document.display())]
    Field {
        document: PathBuf,
        page: u32,
        #[source]
        source: FieldError,
    },
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("Sheet {sheet:?} not found in {}", workbook.display())]
    SheetNotFound { workbook: PathBuf, sheet: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Settings error: {0}")]
    Settings(String),
}

impl From<lopdf::Error> for ImportError {
    fn from(e: lopdf::Error) -> Self {
        ImportError::Pdf(e.to_string())
    }
}
