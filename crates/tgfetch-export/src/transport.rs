//! `MediaTransport` over a Telegram Desktop export directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tgfetch_core::media::RemoteMessage;
use tgfetch_core::ports::{EntityHandle, MediaTransport, ProgressCallback, SessionInfo, TransportError};
use tgfetch_core::reference::CanonicalReference;
use tracing::{debug, info};

use crate::copy::copy_with_progress;
use crate::error::{ExportError, ExportResult};
use crate::models::{ExportChat, ExportFile};

/// File name Telegram Desktop gives to its JSON export.
pub const RESULT_FILE: &str = "result.json";

/// A chat and the directory its media paths are relative to.
struct LoadedChat {
    chat: ExportChat,
    base: PathBuf,
}

/// Transport reading messages and media from a local export.
pub struct ExportTransport {
    root: PathBuf,
    owner: Option<String>,
    chats: Vec<LoadedChat>,
}

impl ExportTransport {
    /// Load `root/result.json` and any `root/*/result.json`.
    pub async fn open(root: impl AsRef<Path>) -> ExportResult<Self> {
        let root = root.as_ref().to_path_buf();
        let files = find_result_files(&root).await?;
        if files.is_empty() {
            return Err(ExportError::NoExport(root));
        }

        let mut owner = None;
        let mut chats = Vec::new();
        for path in files {
            let export = load_result_file(&path).await?;
            let base = path.parent().map_or_else(|| root.clone(), Path::to_path_buf);

            if owner.is_none() {
                owner = export
                    .personal_information
                    .as_ref()
                    .and_then(|p| p.display_name());
            }
            let loaded = export.into_chats();
            debug!(path = %path.display(), chats = loaded.len(), "Loaded export file");
            chats.extend(loaded.into_iter().map(|chat| LoadedChat {
                chat,
                base: base.clone(),
            }));
        }

        info!(root = %root.display(), chats = chats.len(), "Opened Telegram export");
        Ok(Self { root, owner, chats })
    }

    /// The export directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of chats found.
    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    fn chat(&self, entity: &EntityHandle) -> Result<&LoadedChat, TransportError> {
        self.chats
            .iter()
            .find(|c| c.chat.id == entity.id)
            .ok_or_else(|| TransportError::not_found(format!("chat {}", entity.id)))
    }
}

async fn find_result_files(root: &Path) -> ExportResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    let direct = root.join(RESULT_FILE);
    if tokio::fs::metadata(&direct).await.is_ok_and(|m| m.is_file()) {
        files.push(direct);
    }

    let mut entries = tokio::fs::read_dir(root)
        .await
        .map_err(|e| ExportError::read(root, e))?;
    let mut nested = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ExportError::read(root, e))?
    {
        let candidate = entry.path().join(RESULT_FILE);
        if tokio::fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            nested.push(candidate);
        }
    }
    nested.sort();
    files.extend(nested);

    Ok(files)
}

async fn load_result_file(path: &Path) -> ExportResult<ExportFile> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ExportError::read(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| ExportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl MediaTransport for ExportTransport {
    async fn connect(&self) -> Result<SessionInfo, TransportError> {
        let display_name = self
            .owner
            .clone()
            .unwrap_or_else(|| format!("Telegram export at {}", self.root.display()));
        Ok(SessionInfo { display_name })
    }

    async fn resolve_entity(
        &self,
        candidate: &CanonicalReference,
    ) -> Result<EntityHandle, TransportError> {
        let found = self.chats.iter().find(|c| match candidate {
            CanonicalReference::Username(name) => c.chat.has_name(name),
            CanonicalReference::NumericId(id) => c.chat.has_numeric_id(*id),
            CanonicalReference::PeerChannelId(bare) => c.chat.has_peer_id(*bare),
        });

        found
            .map(|c| EntityHandle::new(c.chat.id, c.chat.title()))
            .ok_or_else(|| TransportError::not_found(candidate.to_string()))
    }

    async fn enumerate_messages(
        &self,
        entity: &EntityHandle,
        limit: Option<usize>,
    ) -> Result<Vec<RemoteMessage>, TransportError> {
        let loaded = self.chat(entity)?;
        Ok(loaded
            .chat
            .messages
            .iter()
            .rev()
            .filter(|m| m.is_message())
            .take(limit.unwrap_or(usize::MAX))
            .map(|m| m.to_remote(&loaded.base))
            .collect())
    }

    async fn fetch_message(
        &self,
        entity: &EntityHandle,
        message_id: i64,
    ) -> Result<RemoteMessage, TransportError> {
        let loaded = self.chat(entity)?;
        loaded
            .chat
            .messages
            .iter()
            .find(|m| m.id == message_id && m.is_message())
            .map(|m| m.to_remote(&loaded.base))
            .ok_or_else(|| TransportError::not_found(format!("message {message_id}")))
    }

    async fn transfer_media(
        &self,
        message: &RemoteMessage,
        destination: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<u64, TransportError> {
        let source = message.source.as_deref().ok_or_else(|| {
            TransportError::unavailable(format!(
                "media of message {} was not included in the export",
                message.id
            ))
        })?;

        copy_with_progress(Path::new(source), destination, progress.as_ref())
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => TransportError::unavailable(format!(
                    "media of message {} is missing: {e}",
                    message.id
                )),
                _ => TransportError::from(e),
            })
    }
}
