//! Media items: classification, type filtering and local file naming.
//!
//! # Naming
//!
//! Downloaded files are named `{timestamp}_{message_id}_{original_name}`,
//! `{timestamp}_{message_id}.{mime_subtype}`, or `{timestamp}_{message_id}.jpg`
//! for photos. The timestamp is the time of the download attempt; the
//! embedded message ID is what makes a file recognisable on a resumed run.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// `strftime` pattern of the capture timestamp embedded in file names.
pub const CAPTURE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Extensions folded into the `document` type.
const OFFICE_EXTENSIONS: [&str; 6] = ["doc", "docx", "xls", "xlsx", "ppt", "pptx"];

/// Media attached to a message, as reported by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaPayload {
    /// A compressed photo.
    Photo {
        /// Size in bytes when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
    },
    /// Any file sent as a document (videos, audio, archives, ...).
    Document {
        /// Declared MIME type.
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        /// Original file name attribute.
        #[serde(skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
        /// Size in bytes when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
    },
}

/// One enumerable message of a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMessage {
    /// Message ID, unique within its channel.
    pub id: i64,
    /// When the message was posted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Attached media, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaPayload>,
    /// Opaque handle the transport uses to locate the bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RemoteMessage {
    /// Create a message without media.
    pub const fn text(id: i64) -> Self {
        Self {
            id,
            date: None,
            media: None,
            source: None,
        }
    }

    /// Create a message carrying media.
    pub const fn with_media(id: i64, media: MediaPayload) -> Self {
        Self {
            id,
            date: None,
            media: Some(media),
            source: None,
        }
    }
}

/// Detected media type of an item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MediaKind {
    Video,
    Photo,
    Audio,
    /// Office documents (`doc`, `docx`, `xls`, `xlsx`, `ppt`, `pptx`).
    Document,
    Pdf,
    /// Any other extension or MIME subtype, lowercased.
    Extension(String),
    Unknown,
}

impl MediaKind {
    /// Map an extension, MIME subtype or filter label to a kind.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        match label.as_str() {
            "" | "unknown" => Self::Unknown,
            "video" => Self::Video,
            "photo" => Self::Photo,
            "audio" => Self::Audio,
            "pdf" => Self::Pdf,
            "document" => Self::Document,
            ext if OFFICE_EXTENSIONS.contains(&ext) => Self::Document,
            _ => Self::Extension(label),
        }
    }

    /// The label used for filtering and display.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Video => "video",
            Self::Photo => "photo",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Pdf => "pdf",
            Self::Extension(ext) => ext,
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for MediaKind {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<MediaKind> for String {
    fn from(value: MediaKind) -> Self {
        value.as_str().to_string()
    }
}

/// A message whose media has been classified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// The underlying message handle.
    pub message: RemoteMessage,
    /// Detected type.
    pub kind: MediaKind,
    /// Declared MIME type (documents only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Original file name (documents only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Size in bytes when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl MediaItem {
    /// Classify a message. Returns `None` when it carries no media.
    pub fn classify(message: RemoteMessage) -> Option<Self> {
        let media = message.media.clone()?;
        let item = match media {
            MediaPayload::Photo { size } => Self {
                message,
                kind: MediaKind::Photo,
                mime_type: None,
                file_name: None,
                size_bytes: size,
            },
            MediaPayload::Document {
                mime_type,
                file_name,
                size,
            } => {
                let file_name = file_name.filter(|name| !name.trim().is_empty());
                Self {
                    kind: detect_document_kind(mime_type.as_deref(), file_name.as_deref()),
                    message,
                    mime_type,
                    file_name,
                    size_bytes: size,
                }
            }
        };
        Some(item)
    }

    /// The message ID.
    pub const fn id(&self) -> i64 {
        self.message.id
    }

    /// Whether the MIME type belongs to the given top-level category.
    pub fn mime_is(&self, category: &str) -> bool {
        self.mime_type.as_deref().is_some_and(|mime| {
            mime.split_once('/')
                .is_some_and(|(top, _)| top.eq_ignore_ascii_case(category))
        })
    }

    /// Local file name for a download attempted at `captured_at`.
    pub fn file_name_at(&self, captured_at: &NaiveDateTime) -> String {
        let stamp = captured_at.format(CAPTURE_TIMESTAMP_FORMAT);
        let id = self.id();

        if let Some(name) = &self.file_name {
            return format!("{stamp}_{id}_{}", sanitize_file_name(name));
        }

        match self.message.media {
            Some(MediaPayload::Document { .. }) => {
                let ext = self
                    .mime_type
                    .as_deref()
                    .and_then(mime_subtype)
                    .map_or_else(|| "unknown".to_string(), sanitize_file_name);
                format!("{stamp}_{id}.{ext}")
            }
            _ => format!("{stamp}_{id}.jpg"),
        }
    }
}

/// Detect the type of a document from its MIME type and file name.
///
/// With a file name, a `video/*` MIME type wins; otherwise the extension
/// decides. Without one, the MIME subtype decides (`video/mp4`
/// is `mp4`, `application/pdf` is `pdf`).
fn detect_document_kind(mime_type: Option<&str>, file_name: Option<&str>) -> MediaKind {
    let mime = mime_type.map(str::to_ascii_lowercase);
    let from_mime = || {
        mime.as_deref()
            .and_then(mime_subtype)
            .map_or(MediaKind::Unknown, MediaKind::from_label)
    };

    let Some(name) = file_name else {
        return from_mime();
    };

    if mime.as_deref().is_some_and(|m| m.starts_with("video/")) {
        return MediaKind::Video;
    }

    match extension(name) {
        Some(ext) => MediaKind::from_label(ext),
        None => from_mime(),
    }
}

fn mime_subtype(mime: &str) -> Option<&str> {
    mime.split_once('/')
        .map(|(_, sub)| sub.split(';').next().unwrap_or(sub).trim())
        .filter(|sub| !sub.is_empty())
}

fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| ext)
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect()
}

/// Recover the message ID embedded in a downloaded file's name.
///
/// Only names of the form `YYYYMMDD_HHMMSS_<id>_...` or
/// `YYYYMMDD_HHMMSS_<id>.<ext>` match.
pub fn message_id_from_file_name(name: &str) -> Option<i64> {
    let mut parts = name.splitn(3, '_');
    let date = parts.next()?;
    let time = parts.next()?;
    let rest = parts.next()?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if date.len() != 8 || time.len() != 6 || !all_digits(date) || !all_digits(time) {
        return None;
    }

    let end = rest.find(['_', '.'])?;
    let id = &rest[..end];
    if !all_digits(id) {
        return None;
    }
    id.parse().ok()
}

/// Set of requested media types. Empty accepts everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeFilter(BTreeSet<String>);

impl TypeFilter {
    /// A filter that accepts every item.
    pub const fn all() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse a comma-separated list such as `"video, PDF"`.
    pub fn parse(list: &str) -> Self {
        Self::from_labels(list.split(','))
    }

    /// Build from individual labels; blanks are ignored, case is folded.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            labels
                .into_iter()
                .map(|l| l.as_ref().trim().to_ascii_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
        )
    }

    /// Whether no types were requested.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Requested labels, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether the item should be transferred.
    ///
    /// Requesting `video` (or `audio`) also accepts any item whose MIME type
    /// is `video/*` (or `audio/*`), whatever its detected type.
    pub fn accepts(&self, item: &MediaItem) -> bool {
        if self.0.is_empty() || self.0.contains(item.kind.as_str()) {
            return true;
        }
        ["video", "audio"]
            .iter()
            .any(|category| self.0.contains(*category) && item.mime_is(category))
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("all");
        }
        let joined: Vec<&str> = self.labels().collect();
        f.write_str(&joined.join(", "))
    }
}
