//! Index of files already present in the destination directory.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use tgfetch_core::media::message_id_from_file_name;
use tracing::debug;

/// Downloaded files keyed by the message ID embedded in their names.
///
/// Built once before a resumed run starts and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExistingFileIndex {
    dir: PathBuf,
    by_message: HashMap<i64, String>,
}

impl ExistingFileIndex {
    /// List `dir` and index every file whose name carries a message ID.
    ///
    /// A missing directory yields an empty index.
    pub async fn scan(dir: &Path) -> io::Result<Self> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::from_names(dir, names));
            }
            Err(err) => return Err(err),
        };

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        let index = Self::from_names(dir, names);
        debug!(dir = %dir.display(), indexed = index.len(), "Indexed existing files");
        Ok(index)
    }

    /// Build an index from a known list of file names in `dir`.
    pub fn from_names<I, S>(dir: &Path, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let by_message = names
            .into_iter()
            .map(Into::into)
            .filter_map(|name| message_id_from_file_name(&name).map(|id| (id, name)))
            .collect();
        Self {
            dir: dir.to_path_buf(),
            by_message,
        }
    }

    /// Path of the existing file for `message_id`, if any.
    pub fn find(&self, message_id: i64) -> Option<PathBuf> {
        self.by_message.get(&message_id).map(|name| self.dir.join(name))
    }

    /// Whether a file for `message_id` exists.
    pub fn contains(&self, message_id: i64) -> bool {
        self.by_message.contains_key(&message_id)
    }

    /// Number of indexed message IDs.
    pub fn len(&self) -> usize {
        self.by_message.len()
    }

    /// Whether nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.by_message.is_empty()
    }
}
