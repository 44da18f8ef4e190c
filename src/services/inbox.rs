use anyhow::{Context, Result};
use log::debug;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::settings::PathSettings;

/// Pending match files plus the processed/failed folders they are moved into
pub struct Inbox {
    pending_dir: PathBuf,
    processed_dir: PathBuf,
    failed_dir: PathBuf,
    file_name_regex: Regex,
}

impl Inbox {
    /// Creates the inbox, making sure all three directories exist
    pub fn new(paths: &PathSettings) -> Result<Self> {
        for dir in [&paths.pending_dir, &paths.processed_dir, &paths.failed_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }

        Ok(Self {
            pending_dir: paths.pending_dir.clone(),
            processed_dir: paths.processed_dir.clone(),
            failed_dir: paths.failed_dir.clone(),
            file_name_regex: Self::compile_regex()?,
        })
    }

    fn compile_regex() -> Result<Regex> {
        Regex::new(r"^Matches-tournament-(\d+)\.json$")
            .context("Failed to compile match file name regex")
    }

    /// Pending files sorted by name
    pub fn list_pending(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.pending_dir).with_context(|| {
            format!("Failed to read pending directory {}", self.pending_dir.display())
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Tournament id encoded in a `Matches-tournament-<id>.json` file name
    pub fn tournament_id(&self, path: &Path) -> Option<i64> {
        let name = path.file_name()?.to_str()?;
        let captures = self.file_name_regex.captures(name)?;
        captures.get(1)?.as_str().parse().ok()
    }

    pub fn move_to_processed(&self, path: &Path) -> Result<PathBuf> {
        move_into(path, &self.processed_dir)
    }

    pub fn move_to_failed(&self, path: &Path) -> Result<PathBuf> {
        move_into(path, &self.failed_dir)
    }
}

fn move_into(path: &Path, dir: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;
    let target = dir.join(name);

    if fs::rename(path, &target).is_err() {
        // rename fails across filesystems
        fs::copy(path, &target).with_context(|| {
            format!("Failed to copy {} to {}", path.display(), target.display())
        })?;
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    }

    debug!("Moved {} to {}", path.display(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbox_in(root: &Path) -> Inbox {
        Inbox::new(&PathSettings {
            pending_dir: root.join("pending"),
            processed_dir: root.join("processed"),
            failed_dir: root.join("failed"),
            database: root.join("db.sqlite"),
            report: root.join("report.json"),
        })
        .unwrap()
    }

    #[test]
    fn parses_tournament_id_from_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let inbox = inbox_in(dir.path());

        assert_eq!(inbox.tournament_id(Path::new("Matches-tournament-170676.json")), Some(170676));
        assert_eq!(inbox.tournament_id(Path::new("/x/Matches-tournament-5.json")), Some(5));
        assert_eq!(inbox.tournament_id(Path::new("Matches-tournament-abc.json")), None);
        assert_eq!(inbox.tournament_id(Path::new("notes.txt")), None);
        assert_eq!(inbox.tournament_id(Path::new("old-Matches-tournament-5.json.bak")), None);
    }

    #[test]
    fn lists_sorted_files_and_moves_them() {
        let dir = tempfile::tempdir().unwrap();
        let inbox = inbox_in(dir.path());
        let pending = dir.path().join("pending");

        fs::write(pending.join("b.json"), "[]").unwrap();
        fs::write(pending.join("a.json"), "[]").unwrap();
        fs::create_dir(pending.join("nested")).unwrap();

        let files = inbox.list_pending().unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.json", "b.json"]);

        let moved = inbox.move_to_processed(&files[0]).unwrap();
        assert!(moved.exists());
        assert!(!files[0].exists());

        let failed = inbox.move_to_failed(&files[1]).unwrap();
        assert_eq!(failed, dir.path().join("failed").join("b.json"));
        assert!(inbox.list_pending().unwrap().is_empty());
    }
}
