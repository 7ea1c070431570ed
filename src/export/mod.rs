// History exporters (CSV and PDF)

mod csv_file;
mod pdf;

pub use self::csv_file::{export_csv, to_csv_string, write_csv, CSV_FILE_NAME};
pub use self::pdf::{export_pdf, render_pdf, PDF_FILE_NAME, PDF_TITLE};

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::session::InteractionLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    pub fn default_file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_FILE_NAME,
            ExportFormat::Pdf => PDF_FILE_NAME,
        }
    }
}

/// Export `log` in `format`. Without a path, CSV goes to the default file
/// name in the working directory and PDF to a temp file.
pub fn export(log: &InteractionLog, format: ExportFormat, path: Option<&Path>) -> Result<PathBuf> {
    match format {
        ExportFormat::Csv => {
            let path = path.unwrap_or_else(|| Path::new(CSV_FILE_NAME));
            export_csv(log, path)
        }
        ExportFormat::Pdf => export_pdf(log, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse(" pdf "), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("xlsx"), None);
        assert_eq!(ExportFormat::Pdf.default_file_name(), "Chat_History.pdf");
    }
}
