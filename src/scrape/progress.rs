use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

const HEADER: &str = "team";

/// Append-only record of teams whose rosters are already stored.
///
/// Each `mark_done` is written and synced on its own, outside any database
/// transaction. Marking happens after the roster is persisted, so a crash in
/// between only costs a re-scrape of that team.
#[derive(Debug)]
pub struct ProgressLog {
    path: PathBuf,
    done: HashSet<String>,
}

impl ProgressLog {
    /// Open the log for writing. A missing or empty file gets the header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_header(&path)?;
        let done = read_teams(&path)?;

        tracing::debug!("Progress log {:?} has {} teams", path, done.len());
        Ok(Self { path, done })
    }

    /// Load the log without touching the filesystem. A missing file reads
    /// as an empty log.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let done = if path.exists() {
            read_teams(&path)?
        } else {
            HashSet::new()
        };
        Ok(Self { path, done })
    }

    pub fn is_done(&self, team: &str) -> bool {
        self.done.contains(team)
    }

    pub fn mark_done(&mut self, team: &str) -> Result<()> {
        if self.done.contains(team) {
            return Ok(());
        }

        ensure_header(&self.path)?;
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)?;
        // A hand-edited file may end mid-line; appending would glue names together.
        if !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([team])?;
        writer.flush()?;
        let file: File = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        file.sync_all()?;

        self.done.insert(team.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.done.iter().map(String::as_str)
    }
}

/// Write the header when the file is missing or empty, so the first team
/// name is never read back as the header.
fn ensure_header(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => return Ok(()),
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Err(e) => return Err(e.into()),
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.write_record([HEADER])?;
    writer.flush()?;
    let file: File = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    file.sync_all()?;
    Ok(())
}

fn ends_with_newline(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn read_teams(path: &Path) -> Result<HashSet<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut done = HashSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(team) = record.get(0).map(str::trim).filter(|t| !t.is_empty()) {
            done.insert(team.to_string());
        }
    }
    Ok(done)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.csv");

        let mut log = ProgressLog::open(&path).unwrap();
        assert!(!log.is_done("Maine"));
        log.mark_done("Maine").unwrap();
        log.mark_done("St. Cloud State, MN").unwrap();
        log.mark_done("Maine").unwrap();
        assert!(log.is_done("Maine"));

        let reopened = ProgressLog::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.is_done("Maine"));
        assert!(reopened.is_done("St. Cloud State, MN"));
        assert!(!reopened.is_done("team"));
    }

    #[test]
    fn new_log_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("progress.csv");

        let log = ProgressLog::open(&path).unwrap();
        assert_eq!(log.len(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "team\n");
    }

    #[test]
    fn empty_existing_file_gets_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.csv");
        std::fs::write(&path, "").unwrap();

        let mut log = ProgressLog::open(&path).unwrap();
        log.mark_done("Maine").unwrap();
        log.mark_done("Denver").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "team\nMaine\nDenver\n"
        );
        let reopened = ProgressLog::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.is_done("Maine"));
        assert!(reopened.is_done("Denver"));
    }

    #[test]
    fn missing_trailing_newline_is_repaired_before_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.csv");
        std::fs::write(&path, "team\nMaine").unwrap();

        let mut log = ProgressLog::open(&path).unwrap();
        assert!(log.is_done("Maine"));
        log.mark_done("Denver").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "team\nMaine\nDenver\n"
        );
        let reopened = ProgressLog::open(&path).unwrap();
        assert!(reopened.is_done("Maine"));
        assert!(reopened.is_done("Denver"));
    }

    #[test]
    fn read_does_not_create_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.csv");

        let log = ProgressLog::read(&path).unwrap();
        assert_eq!(log.len(), 0);
        assert!(!path.exists());

        std::fs::write(&path, "team\nMaine\n").unwrap();
        assert!(ProgressLog::read(&path).unwrap().is_done("Maine"));
    }
}
