use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory missing or not writable: {0}")]
    DownloadDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the download directory exists; create if missing.
pub fn ensure_download_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::DownloadDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::DownloadDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::DownloadDir(e.to_string()))?;
    }
    Ok(())
}

/// Streams an artifact into a temp file next to its final location, then
/// renames it into place so a half-written download is never visible.
pub struct ArtifactWriter {
    dir: PathBuf,
    tmp: NamedTempFile,
}

impl ArtifactWriter {
    pub fn create(dir: &Path) -> Result<Self, PersistError> {
        ensure_download_dir(dir)?;
        let tmp = NamedTempFile::new_in(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            tmp,
        })
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), PersistError> {
        self.tmp.write_all(chunk)?;
        Ok(())
    }

    pub fn finish(mut self, filename: &str) -> Result<PathBuf, PersistError> {
        self.tmp.flush()?;
        self.tmp.as_file_mut().sync_all()?;

        let target = self.dir.join(filename);
        // Replace an earlier download of the same artifact.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        self.tmp
            .persist(&target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_artifact_replaces_previous_download() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.bin"), b"old").unwrap();

        let mut writer = ArtifactWriter::create(dir.path()).unwrap();
        writer.write_chunk(b"new ").unwrap();
        writer.write_chunk(b"bytes").unwrap();
        let path = writer.finish("app.bin").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new bytes");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn rejects_a_file_as_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        assert!(matches!(
            ensure_download_dir(&file),
            Err(PersistError::DownloadDir(_))
        ));
    }
}
