use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::session::SessionEvent;

/// Append-only JSON-lines record of logins and scans.
pub struct EventJournal {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl EventJournal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open event journal {}", path.display()))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write and flush one event.
    pub fn record(&mut self, event: &SessionEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush event journal {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;

    #[test]
    fn appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scans.jsonl");
        fs::write(&path, "{\"earlier\":true}\n").unwrap();

        let mut journal = EventJournal::open(&path).unwrap();
        journal
            .record(&SessionEvent::Login {
                at: Utc::now(),
                visit_id: "v1".into(),
                identity: "Ryan".into(),
            })
            .unwrap();
        journal
            .record(&SessionEvent::Scan {
                at: Utc::now(),
                visit_id: "v1".into(),
                identity: "Ryan".into(),
                item_name: "VEGA Plant-based Protein Shake".into(),
                raw: " 0838766101903".into(),
                digits: "0838766101903".into(),
            })
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);

        let login: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(login["event"], "login");
        assert_eq!(login["identity"], "Ryan");

        let scan: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(scan["event"], "scan");
        assert_eq!(scan["itemName"], "VEGA Plant-based Protein Shake");
        assert_eq!(scan["raw"], " 0838766101903");
        assert_eq!(scan["digits"], "0838766101903");
        assert_eq!(scan["visitId"], "v1");
    }

    #[test]
    fn open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EventJournal::open(dir.path().join("nope").join("scans.jsonl")).is_err());
    }
}
