use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;

const JSON_EXTENSION: &str = ".json";

/// Suffix for in-flight writes; never matches [`JSON_EXTENSION`]
const TEMP_SUFFIX: &str = ".tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A saved file as reported by a directory listing
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub filename: String,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq)]
pub struct SavedFile {
    pub filename: String,
    pub path: PathBuf,
}

/// Result of a directory listing
#[derive(Debug, Clone)]
pub struct FileListing {
    pub files: Vec<StoredFile>,
    pub folder_path: PathBuf,
}

/// Rejected filename, with the reason it was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFilename {
    pub filename: String,
    pub reason: &'static str,
}

impl fmt::Display for InvalidFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid filename '{}': {}", self.filename, self.reason)
    }
}

impl std::error::Error for InvalidFilename {}

/// Normalize a client-supplied filename into a bare `<name>.json` file name.
///
/// The result never contains a path separator, so joining it onto the storage
/// root can't escape that directory.
pub fn normalize_filename(name: &str) -> Result<String, InvalidFilename> {
    let trimmed = name.trim();
    let reject = |reason| InvalidFilename {
        filename: name.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(reject("filename must not be empty"));
    }
    if trimmed.contains(['/', '\\']) {
        return Err(reject("filename must not contain path separators"));
    }
    if trimmed.contains('\0') {
        return Err(reject("filename must not contain NUL bytes"));
    }
    if trimmed.starts_with('.') {
        return Err(reject("filename must not start with '.'"));
    }

    if trimmed.ends_with(JSON_EXTENSION) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}{}", trimmed, JSON_EXTENSION))
    }
}

/// Flat directory of pretty-printed JSON files, shareable across handlers
#[derive(Debug, Clone)]
pub struct FileStore {
    root: Arc<PathBuf>,
}

impl FileStore {
    /// Open the store, creating the directory (and its parents) if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create storage directory {}", root.display()))?;

        tracing::info!("Using storage directory: {}", root.display());

        Ok(Self {
            root: Arc::new(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the storage directory is still present on disk
    pub async fn exists(&self) -> bool {
        fs::metadata(self.root.as_path())
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Write `data` to `<filename>.json`, replacing any previous file of that name
    ///
    /// The contents go to a hidden temporary file first and are renamed into
    /// place, so readers see either the old file or the new one, never a mix.
    ///
    /// # Errors
    /// Returns an [`InvalidFilename`] (wrapped in `anyhow`) if the name is
    /// rejected, or an I/O error if the write fails
    pub async fn save(&self, filename: &str, data: &JsonValue) -> Result<SavedFile> {
        let filename = normalize_filename(filename)?;
        let path = self.root.join(&filename);

        let contents = serde_json::to_vec_pretty(data).context("Failed to serialize JSON data")?;

        let temp_path = self.root.join(format!(
            ".{}.{}.{}{}",
            filename,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            TEMP_SUFFIX
        ));

        fs::write(&temp_path, contents)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;

        if let Err(err) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err).with_context(|| format!("Failed to replace {}", path.display()));
        }

        tracing::info!("File saved successfully: {}", path.display());
        Ok(SavedFile { filename, path })
    }

    /// Read the raw bytes of a saved file
    ///
    /// # Returns
    /// * `Ok(Some(bytes))` - file exists
    /// * `Ok(None)` - no file with that name
    /// * `Err(_)` - invalid name or read failure
    pub async fn read(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let filename = normalize_filename(filename)?;
        let path = self.root.join(&filename);

        match fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// List every `.json` file directly inside the storage directory, sorted by name
    ///
    /// A missing directory yields an empty listing.
    pub async fn list(&self) -> Result<FileListing> {
        let folder_path = self.root.to_path_buf();

        let mut entries = match fs::read_dir(&folder_path).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!("Storage directory {} does not exist", folder_path.display());
                return Ok(FileListing {
                    files: Vec::new(),
                    folder_path,
                });
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read directory {}", folder_path.display()));
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !filename.ends_with(JSON_EXTENSION) {
                continue;
            }

            let metadata = entry
                .metadata()
                .await
                .with_context(|| format!("Failed to stat {}", filename))?;
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata
                .modified()
                .with_context(|| format!("Failed to read modification time of {}", filename))?;

            files.push(StoredFile {
                filename,
                size_bytes: metadata.len(),
                modified: DateTime::<Utc>::from(modified),
            });
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));

        tracing::debug!("Listed {} files in {}", files.len(), folder_path.display());
        Ok(FileListing { files, folder_path })
    }
}
