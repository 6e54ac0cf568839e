//! CLI tool appending rate tables from plan PDFs to the upload workbook

use rate_sheet_importer::logging::init_logger;
use rate_sheet_importer::{run_import, Settings};
use std::env;
use std::process;

fn main() {
    init_logger();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 || args.get(1).is_some_and(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: {} [settings.toml]", args[0]);
        eprintln!();
        eprintln!("Extracts rate tables from the configured PDFs and appends them");
        eprintln!("to the configured workbook sheet. Without a settings file the");
        eprintln!("built-in document list is used.");
        process::exit(1);
    }

    let settings = match args.get(1) {
        Some(path) => match Settings::from_toml_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}", e);
                process::exit(1);
            }
        },
        None => Settings::default(),
    };

    match run_import(&settings) {
        Ok(summary) => {
            log::info!(
                "Appended {} rows from {} documents to {} ({} skipped)",
                summary.records_appended,
                summary.documents_parsed,
                settings.workbook.display(),
                summary.documents_skipped
            );
        }
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    }
}
