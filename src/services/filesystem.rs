//! File system access used by the work units

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// File operations the pipelines perform
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    async fn read_text(&self, path: &Path) -> io::Result<String>;

    async fn write_text(&self, path: &Path, content: &str) -> io::Result<()>;

    async fn exists(&self, path: &Path) -> bool;

    /// Create `path` and its missing parents
    async fn ensure_directory(&self, path: &Path) -> io::Result<()>;

    async fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Files directly inside `directory`, optionally filtered by extension
    async fn list_files(&self, directory: &Path, extension: Option<&str>) -> io::Result<Vec<PathBuf>>;

    async fn delete_file(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystemAccess`] on the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

#[async_trait]
impl FileSystemAccess for LocalFileSystem {
    async fn read_text(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        tokio::fs::write(path, content).await
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn ensure_directory(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::copy(from, to).await.map(|_| ())
    }

    async fn list_files(&self, directory: &Path, extension: Option<&str>) -> io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(directory).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let matches = extension.map_or(true, |wanted| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map_or(false, |e| e.eq_ignore_ascii_case(wanted))
            });
            if matches {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    async fn delete_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}
