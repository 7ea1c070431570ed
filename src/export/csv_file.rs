// CSV export of an interaction log

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::session::InteractionLog;

/// Suggested download name
pub const CSV_FILE_NAME: &str = "interaction_history.csv";

/// Write the log as CSV (header `user_query,assistant_response`)
pub fn write_csv<W: Write>(log: &InteractionLog, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    // Explicit header so an empty log still produces one
    wtr.write_record(["user_query", "assistant_response"])?;
    for turn in log.turns() {
        wtr.write_record([turn.query(), turn.response()])?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn to_csv_string(log: &InteractionLog) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(log, &mut buf)?;
    String::from_utf8(buf).context("CSV output was not valid UTF-8")
}

/// Export to `path`, creating parent directories as needed
pub fn export_csv(log: &InteractionLog, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(log, file)?;
    tracing::info!(path = %path.display(), turns = log.len(), "history exported as CSV");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log_has_header_only() {
        let csv = to_csv_string(&InteractionLog::new()).unwrap();
        assert_eq!(csv, "user_query,assistant_response\n");
    }

    #[test]
    fn test_fields_with_commas_and_quotes_are_quoted() {
        let mut log = InteractionLog::new();
        log.append("rent, deposit?", "Say \"no\"\nthen leave");
        let csv = to_csv_string(&log).unwrap();

        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "rent, deposit?");
        assert_eq!(&rows[0][1], "Say \"no\"\nthen leave");
    }
}
