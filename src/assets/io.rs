use std::future::Future;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::assets::exporters::ExportArtifact;
use crate::errors::{Result, StudioError};

/// Asset Reader Trait
///
/// Reads a whole file into memory. Inputs are consumed whole before decode;
/// there is no streaming.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Local file reader
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        let data = tokio::fs::read(&path).await?;
        log::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }
}

/// In-memory reader keyed by file name.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetReader {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(uri.into(), bytes);
    }

    #[must_use]
    pub fn with_file(mut self, uri: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(uri, bytes);
        self
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.files.get(uri).cloned().ok_or_else(|| {
            StudioError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no in-memory file named '{uri}'"),
            ))
        })
    }
}

/// Writes `artifact` into `dir` under its file name and returns the path.
pub async fn write_artifact(artifact: &ExportArtifact, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(&artifact.file_name);
    tokio::fs::write(&path, artifact.as_bytes()).await?;
    log::info!("Wrote {} ({})", path.display(), artifact.mime_type());
    Ok(path)
}

/// A file picked for clip merging: its bytes plus the name it was selected
/// under.
#[derive(Debug, Clone)]
pub struct ClipSource {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ClipSource {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Name given to every clip merged from this file.
    #[must_use]
    pub fn base_name(&self) -> &str {
        file_base_name(&self.file_name)
    }
}

/// File name without directories and without everything from the first `.`
/// onwards: `"anims/walk.cycle.glb"` becomes `"walk"`.
#[must_use]
pub fn file_base_name(file_name: &str) -> &str {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    name.split('.').next().unwrap_or(name)
}
