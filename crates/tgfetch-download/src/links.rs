//! Media link extraction results.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tgfetch_core::errors::DownloadError;
use tgfetch_core::media::{MediaItem, MediaKind};
use tgfetch_core::reference::CanonicalReference;

use crate::ledger::{MEDIA_LINKS_PREFIX, write_locator_file};

/// A message link to one media item, plus what is known about the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLink {
    /// `t.me` link that resolves back to the message.
    pub link: String,
    /// Detected media type.
    pub kind: MediaKind,
    /// Message ID.
    pub message_id: i64,
    /// When the message was posted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Original file name, when the item carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Size in bytes, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl MediaLink {
    /// Describe `item` as found in the channel addressed by `reference`.
    pub fn new(reference: &CanonicalReference, item: &MediaItem) -> Self {
        Self {
            link: reference.message_link(item.id()),
            kind: item.kind.clone(),
            message_id: item.id(),
            date: item.message.date,
            file_name: item.file_name.clone(),
            size: item.size_bytes,
        }
    }
}

/// Save links one per line as `media_links_<timestamp>.txt` in `dir`.
pub async fn save_media_links(dir: &Path, links: &[MediaLink]) -> Result<PathBuf, DownloadError> {
    let lines: Vec<String> = links.iter().map(|l| l.link.clone()).collect();
    write_locator_file(dir, MEDIA_LINKS_PREFIX, &lines).await
}

#[cfg(test)]
mod tests {
    use tgfetch_core::media::{MediaPayload, RemoteMessage};

    use super::*;
    use crate::ledger::read_locator_file;

    fn video(id: i64) -> MediaItem {
        MediaItem::classify(RemoteMessage::with_media(
            id,
            MediaPayload::Document {
                mime_type: Some("video/mp4".into()),
                file_name: Some("clip.mp4".into()),
                size: Some(2048),
            },
        ))
        .unwrap()
    }

    #[test]
    fn links_follow_reference_form() {
        let item = video(12);
        let by_name = MediaLink::new(&CanonicalReference::Username("chan".into()), &item);
        assert_eq!(by_name.link, "https://t.me/chan/12");
        assert_eq!(by_name.kind, MediaKind::Video);
        assert_eq!(by_name.file_name.as_deref(), Some("clip.mp4"));

        let by_peer = MediaLink::new(&CanonicalReference::PeerChannelId(555), &item);
        assert_eq!(by_peer.link, "https://t.me/c/555/12");

        let by_prefixed =
            MediaLink::new(&CanonicalReference::NumericId(-1_000_000_000_555), &item);
        assert_eq!(by_prefixed.link, "https://t.me/c/555/12");
    }

    #[tokio::test]
    async fn saved_links_are_readable_as_locators() {
        let dir = tempfile::tempdir().unwrap();
        let reference = CanonicalReference::Username("chan".into());
        let links = vec![MediaLink::new(&reference, &video(1)), MediaLink::new(&reference, &video(2))];

        let path = save_media_links(dir.path(), &links).await.unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("media_links_"));
        assert_eq!(
            read_locator_file(&path).await.unwrap(),
            vec!["https://t.me/chan/1", "https://t.me/chan/2"]
        );
    }
}
