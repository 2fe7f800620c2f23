//! Channel locators and their canonical encodings.
//!
//! A locator is whatever the user typed: a username, a numeric ID, a
//! `t.me` link, a private `t.me/c/...` link, or a web-client URL. Parsing
//! is pure; turning the parsed form into an entity is the resolver's job,
//! which walks the ordered list returned by [`ParsedLocator::candidates`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ResolutionError;

/// Offset between a bare channel ID and its `-100`-prefixed form.
///
/// `-100` followed by the bare ID equals `-(SUPERGROUP_OFFSET + bare)` for
/// every bare ID of up to twelve digits.
pub const SUPERGROUP_OFFSET: i64 = 1_000_000_000_000;

/// Domains whose path-style links address a channel.
const LINK_DOMAINS: [&str; 3] = ["t.me/", "telegram.me/", "telegram.dog/"];

/// Host of the browser client whose URLs carry the peer in a fragment.
const WEB_CLIENT_HOST: &str = "web.telegram.org";

/// One addressable encoding of a channel, as understood by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CanonicalReference {
    /// Public username, without a leading `@`.
    Username(String),
    /// Numeric entity ID exactly as the transport expects it (may be negative).
    NumericId(i64),
    /// Bare internal channel ID: no `-100` prefix, no sign.
    PeerChannelId(i64),
}

impl CanonicalReference {
    /// Build the `t.me` link pointing at one message of this channel.
    ///
    /// Negative numeric IDs and peer IDs produce private `t.me/c/` links
    /// with the bare ID, so the link resolves again through the same
    /// fallback chain.
    pub fn message_link(&self, message_id: i64) -> String {
        match self {
            Self::Username(name) => format!("https://t.me/{name}/{message_id}"),
            Self::PeerChannelId(bare) => format!("https://t.me/c/{bare}/{message_id}"),
            Self::NumericId(id) => match bare_channel_id(*id) {
                Some(bare) => format!("https://t.me/c/{bare}/{message_id}"),
                None => format!("https://t.me/{id}/{message_id}"),
            },
        }
    }
}

impl fmt::Display for CanonicalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(name) => write!(f, "@{name}"),
            Self::NumericId(id) => write!(f, "{id}"),
            Self::PeerChannelId(bare) => write!(f, "peer:{bare}"),
        }
    }
}

/// Which syntactic form a locator was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorForm {
    /// `web.telegram.org/k/#<peer>` or `...?p=<peer>`.
    WebClient,
    /// `t.me/<name-or-id>[/<message>]`.
    PublicLink,
    /// `t.me/c/<bare-id>[/<message>]`.
    PrivateLink,
    /// A bare, optionally signed, number.
    Numeric,
    /// Anything else.
    Username,
}

/// What a locator points at, before any transport lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocatorTarget {
    /// A username candidate.
    Username(String),
    /// A numeric ID in any of its encodings.
    Numeric(i64),
    /// The bare ID taken from a `t.me/c/` link.
    PrivateChannel(i64),
}

/// A locator split into its channel part and optional message ID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLocator {
    /// The locator as supplied.
    pub raw: String,
    /// Syntactic form that matched.
    pub form: LocatorForm,
    /// The channel part.
    pub target: LocatorTarget,
    /// Message ID carried by link forms.
    pub message_id: Option<i64>,
}

impl ParsedLocator {
    /// Parse a raw locator.
    ///
    /// Precedence: web-client fragment, path-style link, bare number,
    /// username. The first matching form wins.
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(ResolutionError::malformed(raw, "empty locator"));
        }

        if let Some(fragment) = web_client_fragment(input) {
            return Self::from_web_fragment(raw, fragment);
        }

        if let Some(path) = strip_link_domain(input) {
            return Self::from_link_path(raw, path);
        }

        if let Some(value) = parse_signed(input) {
            return Ok(Self::new(raw, LocatorForm::Numeric, LocatorTarget::Numeric(value)));
        }

        Ok(Self::new(
            raw,
            LocatorForm::Username,
            LocatorTarget::Username(input.trim_start_matches('@').to_string()),
        ))
    }

    fn new(raw: &str, form: LocatorForm, target: LocatorTarget) -> Self {
        Self {
            raw: raw.to_string(),
            form,
            target,
            message_id: None,
        }
    }

    fn from_web_fragment(raw: &str, fragment: &str) -> Result<Self, ResolutionError> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Err(ResolutionError::malformed(raw, "web client URL without a peer"));
        }

        let target = parse_signed(fragment).map_or_else(
            || LocatorTarget::Username(fragment.trim_start_matches('@').to_string()),
            LocatorTarget::Numeric,
        );
        Ok(Self::new(raw, LocatorForm::WebClient, target))
    }

    fn from_link_path(raw: &str, path: &str) -> Result<Self, ResolutionError> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path
            .trim_end_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Err(ResolutionError::malformed(raw, "link without a channel")),
            ["c", rest @ ..] => {
                let channel = rest
                    .first()
                    .and_then(|s| s.parse::<i64>().ok())
                    .filter(|id| *id > 0)
                    .ok_or_else(|| {
                        ResolutionError::malformed(raw, "private link without a channel id")
                    })?;
                let mut parsed = Self::new(
                    raw,
                    LocatorForm::PrivateLink,
                    LocatorTarget::PrivateChannel(channel),
                );
                parsed.message_id = parse_message_segment(raw, rest.get(1).copied())?;
                Ok(parsed)
            }
            [channel, rest @ ..] => {
                let target = parse_signed(channel).map_or_else(
                    || LocatorTarget::Username(channel.trim_start_matches('@').to_string()),
                    LocatorTarget::Numeric,
                );
                let mut parsed = Self::new(raw, LocatorForm::PublicLink, target);
                parsed.message_id = parse_message_segment(raw, rest.first().copied())?;
                Ok(parsed)
            }
        }
    }

    /// Candidate encodings to try against the transport, in order.
    pub fn candidates(&self) -> Vec<CanonicalReference> {
        match &self.target {
            LocatorTarget::Username(name) => vec![CanonicalReference::Username(name.clone())],
            LocatorTarget::Numeric(value) => numeric_candidates(*value),
            LocatorTarget::PrivateChannel(bare) => private_channel_candidates(*bare),
        }
    }

    /// The message ID, or a `MalformedLocator` error for channel-only locators.
    pub fn require_message_id(&self) -> Result<i64, ResolutionError> {
        self.message_id
            .ok_or_else(|| ResolutionError::malformed(&self.raw, "no message id in link"))
    }
}

/// Ordered encodings for a numeric ID.
///
/// - positive: the value as given
/// - `-100`-prefixed: the value as given, then the bare peer ID
/// - single dash: the value as given, the bare peer ID, then the
///   `-100`-prefixed form
pub fn numeric_candidates(value: i64) -> Vec<CanonicalReference> {
    let mut out = vec![CanonicalReference::NumericId(value)];

    if value <= -SUPERGROUP_OFFSET {
        if let Some(bare) = bare_channel_id(value) {
            out.push(CanonicalReference::PeerChannelId(bare));
        }
    } else if value < 0 {
        let bare = -value;
        out.push(CanonicalReference::PeerChannelId(bare));
        if let Some(prefixed) = supergroup_id(bare) {
            out.push(CanonicalReference::NumericId(prefixed));
        }
    }

    out
}

/// Ordered encodings for the bare ID of a private link.
pub fn private_channel_candidates(bare: i64) -> Vec<CanonicalReference> {
    let mut out = vec![CanonicalReference::PeerChannelId(bare)];
    if let Some(prefixed) = supergroup_id(bare) {
        out.push(CanonicalReference::NumericId(prefixed));
    }
    out
}

/// `-10^12 - bare`, the `-100`-prefixed form of a bare channel ID.
pub fn supergroup_id(bare: i64) -> Option<i64> {
    (-SUPERGROUP_OFFSET).checked_sub(bare)
}

/// Strip the sign and any `-100` prefix from a negative ID.
///
/// Returns `None` for non-negative IDs.
pub fn bare_channel_id(id: i64) -> Option<i64> {
    if id <= -SUPERGROUP_OFFSET {
        id.checked_neg().map(|v| v - SUPERGROUP_OFFSET).filter(|v| *v > 0)
    } else if id < 0 {
        Some(-id)
    } else {
        None
    }
}

fn web_client_fragment(input: &str) -> Option<&str> {
    if !input.contains(WEB_CLIENT_HOST) {
        return None;
    }
    if let Some((_, fragment)) = input.rsplit_once('#') {
        return Some(fragment);
    }
    input
        .split_once("?p=")
        .map(|(_, query)| query.split('&').next().unwrap_or_default())
}

fn strip_link_domain(input: &str) -> Option<&str> {
    LINK_DOMAINS
        .iter()
        .find_map(|domain| input.find(domain).map(|idx| &input[idx + domain.len()..]))
}

fn parse_message_segment(raw: &str, segment: Option<&str>) -> Result<Option<i64>, ResolutionError> {
    segment
        .map(|s| {
            s.parse::<i64>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| ResolutionError::malformed(raw, format!("invalid message id '{s}'")))
        })
        .transpose()
}

/// Parse `[-]digits`; rejects `+`, whitespace and empty digit runs.
fn parse_signed(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
