use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::errors::{Result, SinewError};

/// Asynchronous byte source for scenes and the files they reference.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads files below a root directory.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    /// A file path roots the reader at its parent directory.
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
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(SinewError::AssetNotFound(path.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Serves byte blobs registered up front. Handy for embedded assets and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetReader {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(uri, bytes);
        self
    }

    pub fn insert(&mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(uri.into(), bytes.into());
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.files
            .get(uri)
            .cloned()
            .ok_or_else(|| SinewError::AssetNotFound(uri.to_string()))
    }
}

/// Closed set of readers, so callers avoid `dyn` over an async trait.
#[derive(Debug, Clone)]
pub enum AssetReaderVariant {
    File(Arc<FileAssetReader>),
    Memory(Arc<MemoryAssetReader>),
}

impl AssetReaderVariant {
    /// Picks a reader from a path. Network sources are rejected.
    pub fn from_source(source: impl AsRef<Path>) -> Result<Self> {
        let source = source.as_ref();
        let text = source.to_string_lossy();
        if text.starts_with("http://") || text.starts_with("https://") {
            return Err(SinewError::UnsupportedSource(text.into_owned()));
        }
        Ok(Self::File(Arc::new(FileAssetReader::new(source))))
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            Self::Memory(r) => r.read_bytes(uri).await,
        }
    }

    /// Prefix that turns a reader-relative path into a full asset path.
    #[must_use]
    pub fn base_path(&self) -> String {
        match self {
            Self::File(r) => r.root_path().to_string_lossy().into_owned(),
            Self::Memory(_) => String::new(),
        }
    }
}

impl From<MemoryAssetReader> for AssetReaderVariant {
    fn from(reader: MemoryAssetReader) -> Self {
        Self::Memory(Arc::new(reader))
    }
}

impl From<FileAssetReader> for AssetReaderVariant {
    fn from(reader: FileAssetReader) -> Self {
        Self::File(Arc::new(reader))
    }
}

/// Directory part of a `/`-separated path, empty when there is none.
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rfind(['/', '\\']).map_or("", |index| &path[..index])
}

/// Joins with `/`, skipping the separator when `dir` is empty.
#[must_use]
pub fn join_path(dir: &str, path: &str) -> String {
    if dir.is_empty() {
        path.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{path}")
    } else {
        format!("{dir}/{path}")
    }
}
