//! Telegram Desktop `result.json` schema.
//!
//! Only the fields the transport needs are modelled; everything else in the
//! export is ignored. These types are internal to `tgfetch-export`.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tgfetch_core::media::{MediaPayload, RemoteMessage};
use tgfetch_core::reference::supergroup_id;

// ============================================================================
// Export file
// ============================================================================

/// Top level of a `result.json`.
///
/// A single-chat export carries `name`/`type`/`id`/`messages` at the top
/// level; a full account export carries `chats.list` (and `left_chats.list`).
#[derive(Debug, Default, Deserialize)]
pub struct ExportFile {
    #[serde(default)]
    pub personal_information: Option<PersonalInformation>,
    #[serde(default)]
    pub chats: Option<ChatList>,
    #[serde(default)]
    pub left_chats: Option<ChatList>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub messages: Option<Vec<ExportMessage>>,
}

impl ExportFile {
    /// Every chat in the file.
    pub fn into_chats(self) -> Vec<ExportChat> {
        let mut chats = Vec::new();

        if let (Some(id), Some(messages)) = (self.id, self.messages) {
            chats.push(ExportChat {
                name: self.name,
                kind: self.kind.unwrap_or_default(),
                id,
                messages,
            });
        }
        for list in [self.chats, self.left_chats].into_iter().flatten() {
            chats.extend(list.list);
        }

        chats
    }
}

/// Account owner, present in full exports.
#[derive(Debug, Default, Deserialize)]
pub struct PersonalInformation {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl PersonalInformation {
    /// "First Last", the `@username`, or `None` when neither is set.
    pub fn display_name(&self) -> Option<String> {
        let full: Vec<&str> = [&self.first_name, &self.last_name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !full.is_empty() {
            return Some(full.join(" "));
        }
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| format!("@{}", u.trim_start_matches('@')))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatList {
    #[serde(default)]
    pub list: Vec<ExportChat>,
}

// ============================================================================
// Chats
// ============================================================================

/// How the export's chat `type` maps to ID encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCategory {
    /// Users, bots, saved messages: addressed by the positive ID.
    Personal,
    /// Basic groups: addressed by `-id`.
    BasicGroup,
    /// Channels and supergroups: addressed by the bare ID or `-100` + ID.
    Channel,
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportChat {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub id: i64,
    #[serde(default)]
    pub messages: Vec<ExportMessage>,
}

impl ExportChat {
    pub fn category(&self) -> ChatCategory {
        match self.kind.as_str() {
            "personal_chat" | "bot_chat" | "saved_messages" => ChatCategory::Personal,
            "private_group" => ChatCategory::BasicGroup,
            k if k.contains("channel") || k.contains("supergroup") => ChatCategory::Channel,
            _ => ChatCategory::Other,
        }
    }

    /// Whether `name` matches, ignoring case and a leading `@`.
    pub fn has_name(&self, name: &str) -> bool {
        let wanted = name.trim_start_matches('@');
        self.name
            .as_deref()
            .is_some_and(|n| n.trim_start_matches('@').eq_ignore_ascii_case(wanted))
    }

    /// Whether a transport-style numeric ID addresses this chat.
    pub fn has_numeric_id(&self, value: i64) -> bool {
        match self.category() {
            ChatCategory::Personal => value == self.id,
            ChatCategory::BasicGroup => Some(value) == self.id.checked_neg(),
            ChatCategory::Channel => Some(value) == supergroup_id(self.id),
            ChatCategory::Other => false,
        }
    }

    /// Whether a bare channel ID addresses this chat.
    pub fn has_peer_id(&self, bare: i64) -> bool {
        self.category() == ChatCategory::Channel && self.id == bare
    }

    pub fn title(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("chat {}", self.id))
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ExportMessage {
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_unixtime: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub photo_file_size: Option<u64>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl ExportMessage {
    /// Service entries (joins, pins, ...) are not messages.
    pub fn is_message(&self) -> bool {
        self.kind == "message"
    }

    /// Convert to the core message, resolving media paths against `base`.
    ///
    /// Media the export did not include keeps its payload but gets no
    /// source, so the transfer fails while classification still works.
    pub fn to_remote(&self, base: &Path) -> RemoteMessage {
        let (media, path) = if let Some(path) = &self.photo {
            (
                Some(MediaPayload::Photo {
                    size: self.photo_file_size,
                }),
                Some(path),
            )
        } else if let Some(path) = &self.file {
            let file_name = self.file_name.clone().or_else(|| {
                self.media_type
                    .is_none()
                    .then(|| base_name(path))
                    .flatten()
            });
            (
                Some(MediaPayload::Document {
                    mime_type: self.mime_type.clone(),
                    file_name,
                    size: self.file_size,
                }),
                Some(path),
            )
        } else {
            (None, None)
        };

        RemoteMessage {
            id: self.id,
            date: self.timestamp(),
            media,
            source: path
                .filter(|p| !is_placeholder(p))
                .map(|p| base.join(p).to_string_lossy().into_owned()),
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        if let Some(secs) = self.date_unixtime.as_deref().and_then(|s| s.parse().ok()) {
            return DateTime::from_timestamp(secs, 0);
        }
        self.date
            .as_deref()
            .and_then(|d| NaiveDateTime::parse_from_str(d, "%Y-%m-%dT%H:%M:%S").ok())
            .map(|naive| naive.and_utc())
    }
}

/// Paths like "(File not included. Change data exporting settings to download.)".
fn is_placeholder(path: &str) -> bool {
    path.trim_start().starts_with('(')
}

fn base_name(path: &str) -> Option<String> {
    if is_placeholder(path) {
        return None;
    }
    path.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
