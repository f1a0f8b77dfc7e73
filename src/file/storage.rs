//! Flat on-disk file store.
//!
//! Every operation goes straight to the store directory. There is no index or
//! cache, so two requests only ever share state through the filesystem.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::name::{renamed_file_name, suffixed_name, validate_file_name};
use super::record::{FileRecord, StoredFile};
use crate::{FiledropError, Result};

/// Store directory handle.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Store directory as configured (not canonicalized).
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the store directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// List the regular files in the store directory, in enumeration order.
    ///
    /// A store directory that has disappeared lists as empty.
    pub async fn list(&self) -> Result<Vec<FileRecord>> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!(name = ?raw, "Skipping non UTF-8 file name");
                    continue;
                }
            };

            // Removed between read_dir and stat.
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            if metadata.is_file() {
                files.push(FileRecord::from_metadata(name, &metadata));
            }
        }

        Ok(files)
    }

    /// Resolve `name` to a path inside the store.
    ///
    /// The name must be a single component naming a regular file (not a
    /// symlink) whose canonical path lies inside the canonical store
    /// directory. Anything else is reported as not found.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf> {
        validate_file_name(name)?;
        let not_found = || FiledropError::NotFound(format!("file {name}"));

        let root = match fs::canonicalize(&self.base_path).await {
            Ok(root) => root,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        // Only regular files are served, matching what `list` reports.
        let entry = self.base_path.join(name);
        match fs::symlink_metadata(&entry).await {
            Ok(metadata) if metadata.file_type().is_file() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        let target = match fs::canonicalize(&entry).await {
            Ok(target) => target,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        if !target.starts_with(&root) {
            tracing::warn!(name, target = %target.display(), "Rejected path outside store");
            return Err(not_found());
        }

        Ok(entry)
    }

    /// Open a stored file for reading.
    pub async fn open(&self, name: &str) -> Result<(File, FileRecord)> {
        let path = self.resolve(name).await?;

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FiledropError::NotFound(format!("file {name}")))
            }
            Err(e) => return Err(e.into()),
        };
        let metadata = file.metadata().await?;

        Ok((file, FileRecord::from_metadata(name, &metadata)))
    }

    /// Start writing a new file named after `name`.
    ///
    /// If `name` is taken, `base(1)ext`, `base(2)ext`, ... are tried in order.
    /// The file is created with create-new semantics, so an existing file is
    /// never overwritten.
    pub async fn begin_upload(&self, name: &str) -> Result<PendingUpload> {
        validate_file_name(name)?;

        let mut candidate = name.to_string();
        let mut attempt = 0u32;
        loop {
            let path = self.base_path.join(&candidate);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => {
                    return Ok(PendingUpload {
                        name: candidate,
                        file,
                        partial: PartialFile::new(path),
                        written: 0,
                    })
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    attempt = attempt.checked_add(1).ok_or_else(|| {
                        FiledropError::AlreadyExists(format!("every suffix of {name}"))
                    })?;
                    candidate = suffixed_name(name, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Store `content` under `name`, applying the collision policy.
    pub async fn save(&self, name: &str, content: &[u8]) -> Result<StoredFile> {
        let mut upload = self.begin_upload(name).await?;
        if let Err(e) = upload.write_chunk(content).await {
            upload.abort().await;
            return Err(e);
        }
        upload.finish().await
    }

    /// Delete a stored file.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let path = self.resolve(name).await?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FiledropError::NotFound(format!("file {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rename a stored file, keeping its extension.
    ///
    /// Returns the final name. Renaming onto an existing file fails with
    /// [`FiledropError::AlreadyExists`].
    pub async fn rename(&self, name: &str, new_name: &str) -> Result<String> {
        let source = self.resolve(name).await?;
        let target_name = renamed_file_name(name, new_name)?;

        if target_name == name {
            return Ok(target_name);
        }

        let target = self.base_path.join(&target_name);
        match fs::symlink_metadata(&target).await {
            Ok(_) => return Err(FiledropError::AlreadyExists(target_name)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        match fs::rename(&source, &target).await {
            Ok(()) => Ok(target_name),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FiledropError::NotFound(format!("file {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A file being written by an upload.
///
/// Call [`PendingUpload::finish`] once all chunks are written, or
/// [`PendingUpload::abort`] to remove the partial file. Dropping it without
/// either also removes the partial file, so a cancelled request leaves
/// nothing behind.
#[derive(Debug)]
pub struct PendingUpload {
    name: String,
    // Declared before `partial` so the handle is closed before removal.
    file: File,
    partial: PartialFile,
    written: u64,
}

impl PendingUpload {
    /// Final name chosen for this upload.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append a chunk.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush the file and report what was stored.
    ///
    /// The partial file is removed if the flush fails.
    pub async fn finish(mut self) -> Result<StoredFile> {
        let metadata = match self.flush().await {
            Ok(metadata) => metadata,
            Err(e) => {
                self.abort().await;
                return Err(e);
            }
        };
        let record = FileRecord::from_metadata(self.name.as_str(), &metadata);

        Ok(StoredFile {
            name: self.name,
            size: record.size,
            modified_at: record.modified_at,
            path: self.partial.keep(),
        })
    }

    async fn flush(&mut self) -> Result<std::fs::Metadata> {
        self.file.flush().await?;
        Ok(self.file.metadata().await?)
    }

    /// Remove the partially written file.
    pub async fn abort(self) {
        let PendingUpload { file, partial, .. } = self;
        drop(file);

        let path = partial.keep();
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial upload");
            }
        }
    }
}

/// Removes an unfinished upload's file when dropped, unless kept.
#[derive(Debug)]
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Disarm the guard and hand back the path.
    fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed cancelled upload");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove cancelled upload");
            }
        }
    }
}
