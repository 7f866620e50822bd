/// Storage seam between the pipeline and the lake.
///
/// Workers never share a handle: each one asks the [`StorageFactory`] for its
/// own [`Storage`] before touching a partition.
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::CredentialsConfig;
use crate::credentials;
use crate::error::{LakeError, Result};

/// Block compression used for written partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputCompression {
    #[default]
    Snappy,
    Zstd,
    Lz4,
    Uncompressed,
}

impl From<OutputCompression> for ParquetCompression {
    fn from(c: OutputCompression) -> Self {
        match c {
            OutputCompression::Snappy => ParquetCompression::Snappy,
            OutputCompression::Zstd => ParquetCompression::Zstd(None),
            OutputCompression::Lz4 => ParquetCompression::Lz4Raw,
            OutputCompression::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

pub trait Storage {
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Immediate subdirectories of `path`, sorted.
    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>>;

    fn read_parquet(&self, path: &Path) -> Result<DataFrame>;

    /// Write `df` to `path`, creating parent directories. Only `path` itself is
    /// replaced; siblings are left alone.
    fn write_parquet(
        &self,
        path: &Path,
        df: &mut DataFrame,
        compression: OutputCompression,
    ) -> Result<()>;
}

/// Hands out independent storage handles.
pub trait StorageFactory: Send + Sync {
    fn connect(&self) -> Result<Box<dyn Storage>>;
}

// ── Local filesystem ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(path.try_exists()?)
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn read_parquet(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;
        Ok(ParquetReader::new(file).finish()?)
    }

    fn write_parquet(
        &self,
        path: &Path,
        df: &mut DataFrame,
        compression: OutputCompression,
    ) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| LakeError::Storage(format!("no parent directory for {}", path.display())))?;
        fs::create_dir_all(parent)?;

        // The target's existence marks the partition as done, so it must only
        // appear once fully written.
        let mut tmp = TempFile::new(parent.join(format!(".{}.tmp", Uuid::new_v4())));
        let file = File::create(tmp.path())?;
        let bytes = ParquetWriter::new(file)
            .with_compression(compression.into())
            .finish(df)?;
        fs::rename(tmp.path(), path)?;
        tmp.disarm();

        debug!(path = %path.display(), bytes, "wrote parquet");
        Ok(())
    }
}

/// Removes its file on drop, so neither an error nor a panic mid-write leaves
/// a stray temp file next to the partition. Disarm once the file has moved.
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Factory for [`LocalStorage`]. When credentials are required, every
/// `connect` re-resolves the credential file on its own.
#[derive(Debug, Clone, Default)]
pub struct LocalStorageFactory {
    credentials: CredentialsConfig,
}

impl LocalStorageFactory {
    pub fn new(credentials: CredentialsConfig) -> Self {
        Self { credentials }
    }
}

impl StorageFactory for LocalStorageFactory {
    fn connect(&self) -> Result<Box<dyn Storage>> {
        // Local files need no token; resolving only checks that the
        // credential file is still there for this handle.
        if self.credentials.required {
            let path = credentials::resolve(self.credentials.path.as_deref())?;
            debug!(credentials = %path.display(), "credentials present");
        }
        Ok(Box::new(LocalStorage))
    }
}
