//! Note file store contract and directory-backed vault.
//!
//! # Responsibility
//! - Resolve vault-relative note paths into readable file handles.
//! - Provide whole-file text read and whole-file replace.
//!
//! # Invariants
//! - Resolution never escapes the vault root (`..`, absolute paths, and
//!   symlinks pointing outside are rejected).
//! - Handles carry the canonical path, so writes land on a symlink's target.
//! - Only regular files resolve; directories fail with `NotAFile`.
//! - `write_text` replaces the file atomically (temp file + rename) and keeps
//!   the original permissions.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Resolved note file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    /// Normalized vault-relative path, slash separated.
    pub vault_path: String,
    /// Backing location understood by the owning store.
    pub location: PathBuf,
}

/// Path resolution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Path is empty, absolute, or climbs out of the vault.
    InvalidPath(String),
    /// Nothing exists at the path.
    NotFound(String),
    /// Something exists, but it is not a regular file.
    NotAFile(String),
}

impl Display for ResolutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(path) => write!(f, "invalid vault path: `{path}`"),
            Self::NotFound(path) => write!(f, "note file not found: `{path}`"),
            Self::NotAFile(path) => write!(f, "path is not a regular file: `{path}`"),
        }
    }
}

impl Error for ResolutionError {}

/// Host file store seam.
pub trait FileStore {
    /// Resolves a vault-relative path to a regular file.
    fn resolve(&self, path: &str) -> Result<FileHandle, ResolutionError>;
    /// Reads the full text of a resolved file.
    fn read_text(&self, file: &FileHandle) -> io::Result<String>;
    /// Replaces the full text of a resolved file.
    fn write_text(&self, file: &FileHandle, contents: &str) -> io::Result<()>;
}

impl<F: FileStore + ?Sized> FileStore for std::sync::Arc<F> {
    fn resolve(&self, path: &str) -> Result<FileHandle, ResolutionError> {
        (**self).resolve(path)
    }

    fn read_text(&self, file: &FileHandle) -> io::Result<String> {
        (**self).read_text(file)
    }

    fn write_text(&self, file: &FileHandle, contents: &str) -> io::Result<()> {
        (**self).write_text(file, contents)
    }
}

/// Vault rooted at one directory on the local file system.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStore for FsVault {
    fn resolve(&self, path: &str) -> Result<FileHandle, ResolutionError> {
        let vault_path = normalize_vault_path(path)?;
        let root = std::fs::canonicalize(&self.root)
            .map_err(|_| ResolutionError::NotFound(vault_path.clone()))?;
        let location = match std::fs::canonicalize(self.root.join(&vault_path)) {
            Ok(location) => location,
            Err(_) => return Err(ResolutionError::NotFound(vault_path)),
        };
        // Symlinks are followed; the real target must still live in the vault.
        if !location.starts_with(&root) {
            return Err(ResolutionError::InvalidPath(vault_path));
        }
        match std::fs::metadata(&location) {
            Ok(meta) if meta.is_file() => Ok(FileHandle {
                vault_path,
                location,
            }),
            Ok(_) => Err(ResolutionError::NotAFile(vault_path)),
            Err(_) => Err(ResolutionError::NotFound(vault_path)),
        }
    }

    fn read_text(&self, file: &FileHandle) -> io::Result<String> {
        std::fs::read_to_string(&file.location)
    }

    /// Replaces the note at its canonical location, keeping its permissions.
    fn write_text(&self, file: &FileHandle, contents: &str) -> io::Result<()> {
        let parent = file
            .location
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(self.root.as_path());
        let permissions = std::fs::metadata(&file.location)?.permissions();

        let mut staged = NamedTempFile::new_in(parent)?;
        staged.write_all(contents.as_bytes())?;
        staged.as_file().set_permissions(permissions)?;
        staged.as_file().sync_all()?;
        staged.persist(&file.location).map_err(|err| err.error)?;
        Ok(())
    }
}

/// Normalizes a vault-relative path into slash-separated form.
///
/// Rejects empty values, absolute paths and any `..` component.
pub fn normalize_vault_path(path: &str) -> Result<String, ResolutionError> {
    let trimmed = path.trim();
    let invalid = || ResolutionError::InvalidPath(path.to_string());
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let mut parts = Vec::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::CurDir => {}
            _ => return Err(invalid()),
        }
    }

    if parts.is_empty() {
        return Err(invalid());
    }
    Ok(parts.join("/"))
}
