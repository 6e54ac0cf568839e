//! Import run configuration

use crate::fields::PageLayout;
use crate::ImportError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// What to import and where to put it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Destination workbook, rewritten in place
    pub workbook: PathBuf,
    /// Sheet of `workbook` the rows are appended to
    pub sheet: String,
    /// Rate-table PDFs, read in order
    pub documents: Vec<PathBuf>,
    pub layout: PageLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from("BeneFix Small Group Plans.xlsx"),
            sheet: "Blank Upload Template".to_string(),
            documents: [
                "para01.pdf",
                "para02.pdf",
                "para03.pdf",
                "para05.pdf",
                "para06.pdf",
                "para07.pdf",
                "para08.pdf",
                "para09.pdf",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            layout: PageLayout::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ImportError> {
        toml::from_str(content).map_err(|e| ImportError::Settings(e.to_string()))
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ImportError::Settings(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}
