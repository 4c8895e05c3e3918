use std::collections::BTreeSet;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".m4a", ".aac", ".ogg", ".flac"];
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_MAX_FILES_PER_BATCH: usize = 10;

/// Server-advertised upload limits. Fetched once per session, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraints {
    allowed_extensions: BTreeSet<String>,
    max_file_size_bytes: u64,
    max_files_per_batch: usize,
}

impl Constraints {
    /// Builds constraints, normalizing every extension to lowercase with a leading dot.
    ///
    /// Returns `None` when either limit is zero or no usable extension remains.
    pub fn new<I, S>(extensions: I, max_file_size_bytes: u64, max_files_per_batch: usize) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_extensions: BTreeSet<String> = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        if allowed_extensions.is_empty() || max_file_size_bytes == 0 || max_files_per_batch == 0 {
            return None;
        }
        Some(Self {
            allowed_extensions,
            max_file_size_bytes,
            max_files_per_batch,
        })
    }

    pub fn allowed_extensions(&self) -> &BTreeSet<String> {
        &self.allowed_extensions
    }

    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(extension)
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    pub fn max_files_per_batch(&self) -> usize {
        self.max_files_per_batch
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            max_files_per_batch: DEFAULT_MAX_FILES_PER_BATCH,
        }
    }
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_ascii_lowercase()))
}
