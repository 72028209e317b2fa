#![allow(dead_code)]

use dayplan_core::{FileHandle, FileStore, ResolutionError, Task, TaskLocation, Timestamp};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::PathBuf;

/// In-memory file store that records every call.
#[derive(Default)]
pub struct RecordingFiles {
    files: Mutex<BTreeMap<String, String>>,
    dirs: BTreeSet<String>,
    pub reads: Mutex<Vec<String>>,
    pub writes: Mutex<Vec<String>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl RecordingFiles {
    pub fn with_file(path: &str, contents: &str) -> Self {
        let store = Self::default();
        store
            .files
            .lock()
            .insert(path.to_string(), contents.to_string());
        store
    }

    pub fn with_dir(mut self, path: &str) -> Self {
        self.dirs.insert(path.to_string());
        self
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().get(path).cloned()
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().len()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }
}

impl FileStore for RecordingFiles {
    fn resolve(&self, path: &str) -> Result<FileHandle, ResolutionError> {
        if self.dirs.contains(path) {
            return Err(ResolutionError::NotAFile(path.to_string()));
        }
        if !self.files.lock().contains_key(path) {
            return Err(ResolutionError::NotFound(path.to_string()));
        }
        Ok(FileHandle {
            vault_path: path.to_string(),
            location: PathBuf::from(path),
        })
    }

    fn read_text(&self, file: &FileHandle) -> io::Result<String> {
        self.reads.lock().push(file.vault_path.clone());
        if self.fail_reads {
            return Err(io::Error::new(io::ErrorKind::Other, "disk unavailable"));
        }
        self.files
            .lock()
            .get(&file.vault_path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file vanished"))
    }

    fn write_text(&self, file: &FileHandle, contents: &str) -> io::Result<()> {
        self.writes.lock().push(file.vault_path.clone());
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.files
            .lock()
            .insert(file.vault_path.clone(), contents.to_string());
        Ok(())
    }
}

pub fn task_at(path: &str, line: usize, text: &str, start: &str, duration: u32) -> Task {
    Task::new(
        TaskLocation::new(path, line),
        "- [ ] ",
        text,
        Timestamp::from_clock(start, duration).expect("valid test clock"),
    )
}
