use std::path::PathBuf;
use std::sync::Arc;

use crate::validate::extension_of;

/// Where the bytes of a picked file live until upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Memory(Arc<[u8]>),
    /// Read lazily by the uploader.
    Path(PathBuf),
}

/// Opaque handle for a user-picked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    name: String,
    size_bytes: u64,
    source: FileSource,
}

impl CandidateFile {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    /// `size_bytes` is captured at pick time; the file is not opened here.
    pub fn from_path(name: impl Into<String>, path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            source: FileSource::Path(path.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    pub fn mime_type(&self) -> &'static str {
        mime_for_extension(&extension_of(&self.name))
    }
}

pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        ".mp3" => "audio/mpeg",
        ".wav" => "audio/wav",
        ".m4a" => "audio/mp4",
        ".aac" => "audio/aac",
        ".ogg" => "audio/ogg",
        ".flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}
