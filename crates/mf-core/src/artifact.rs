use std::io;
use std::path::{Path, PathBuf};

/// An in-memory downloadable result: generated media, a script bundle, a
/// prompt list. The caller decides whether to hand the bytes to a UI or
/// write them out.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Write the artifact into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}
