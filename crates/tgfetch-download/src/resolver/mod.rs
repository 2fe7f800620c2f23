//! Channel reference resolution.
//!
//! Parsing a locator yields an ordered list of candidate encodings; this
//! module tries them one at a time against the transport's entity lookup
//! and keeps the first that the transport knows.

use std::sync::Arc;

use tgfetch_core::errors::ResolutionError;
use tgfetch_core::ports::{EntityHandle, MediaTransport};
use tgfetch_core::reference::{CanonicalReference, ParsedLocator};
use tracing::debug;

/// A locator that the transport has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// The parsed locator (keeps the raw input and any message ID).
    pub locator: ParsedLocator,
    /// The encoding that matched.
    pub reference: CanonicalReference,
    /// Transport handle for the entity.
    pub entity: EntityHandle,
}

impl ResolvedReference {
    /// Message ID carried by link-form locators.
    pub const fn message_id(&self) -> Option<i64> {
        self.locator.message_id
    }

    /// Link to one message of the resolved channel.
    pub fn message_link(&self, message_id: i64) -> String {
        self.reference.message_link(message_id)
    }
}

/// Resolves raw locators through the transport.
#[derive(Clone)]
pub struct ReferenceResolver {
    transport: Arc<dyn MediaTransport>,
}

impl ReferenceResolver {
    /// Create a new resolver over the given transport.
    pub fn new(transport: Arc<dyn MediaTransport>) -> Self {
        Self { transport }
    }

    /// Parse and resolve a raw locator.
    pub async fn resolve(&self, locator: &str) -> Result<ResolvedReference, ResolutionError> {
        let parsed = ParsedLocator::parse(locator)?;
        self.resolve_parsed(parsed).await
    }

    /// Resolve an already-parsed locator.
    pub async fn resolve_parsed(
        &self,
        locator: ParsedLocator,
    ) -> Result<ResolvedReference, ResolutionError> {
        let candidates = locator.candidates();
        let (reference, entity) = self.first_match(&locator.raw, candidates).await?;
        Ok(ResolvedReference {
            locator,
            reference,
            entity,
        })
    }

    /// Try each candidate in order; any transport error moves on to the next.
    async fn first_match(
        &self,
        raw: &str,
        candidates: Vec<CanonicalReference>,
    ) -> Result<(CanonicalReference, EntityHandle), ResolutionError> {
        let attempts = candidates.len();

        for (attempt, candidate) in candidates.into_iter().enumerate() {
            match self.transport.resolve_entity(&candidate).await {
                Ok(entity) => {
                    debug!(
                        locator = raw,
                        %candidate,
                        attempt = attempt + 1,
                        entity_id = entity.id,
                        "Resolved channel"
                    );
                    return Ok((candidate, entity));
                }
                Err(err) => {
                    debug!(locator = raw, %candidate, attempt = attempt + 1, error = %err, "Candidate rejected");
                }
            }
        }

        Err(ResolutionError::not_found(raw, attempts))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use mockall::{Sequence, mock, predicate::eq};
    use tgfetch_core::media::RemoteMessage;
    use tgfetch_core::ports::{ProgressCallback, SessionInfo, TransportError};
    use tgfetch_core::reference::SUPERGROUP_OFFSET;

    use super::*;

    mock! {
        Transport {}

        #[async_trait]
        impl MediaTransport for Transport {
            async fn connect(&self) -> Result<SessionInfo, TransportError>;
            async fn resolve_entity(
                &self,
                candidate: &CanonicalReference,
            ) -> Result<EntityHandle, TransportError>;
            async fn enumerate_messages(
                &self,
                entity: &EntityHandle,
                limit: Option<usize>,
            ) -> Result<Vec<RemoteMessage>, TransportError>;
            async fn fetch_message(
                &self,
                entity: &EntityHandle,
                message_id: i64,
            ) -> Result<RemoteMessage, TransportError>;
            async fn transfer_media(
                &self,
                message: &RemoteMessage,
                destination: &Path,
                progress: Option<ProgressCallback>,
            ) -> Result<u64, TransportError>;
        }
    }

    fn resolver(mock: MockTransport) -> ReferenceResolver {
        ReferenceResolver::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn single_dash_id_falls_back_to_supergroup_form() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        mock.expect_resolve_entity()
            .with(eq(CanonicalReference::NumericId(-12345)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(TransportError::not_found("-12345")));
        mock.expect_resolve_entity()
            .with(eq(CanonicalReference::PeerChannelId(12345)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(TransportError::not_found("peer 12345")));
        mock.expect_resolve_entity()
            .with(eq(CanonicalReference::NumericId(-SUPERGROUP_OFFSET - 12345)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(EntityHandle::new(12345, "Private")));

        let resolved = resolver(mock).resolve("-12345").await.unwrap();
        assert_eq!(
            resolved.reference,
            CanonicalReference::NumericId(-1_000_000_012_345)
        );
        assert_eq!(resolved.entity.title, "Private");
    }

    #[tokio::test]
    async fn public_link_resolves_username_and_keeps_message_id() {
        let mut mock = MockTransport::new();
        mock.expect_resolve_entity()
            .with(eq(CanonicalReference::Username("examplechan".into())))
            .times(1)
            .returning(|_| Ok(EntityHandle::new(7, "Example")));

        let resolved = resolver(mock)
            .resolve("https://t.me/examplechan/123")
            .await
            .unwrap();
        assert_eq!(
            resolved.reference,
            CanonicalReference::Username("examplechan".into())
        );
        assert_eq!(resolved.message_id(), Some(123));
        assert_eq!(resolved.message_link(5), "https://t.me/examplechan/5");
    }

    #[tokio::test]
    async fn variant_matches_locator_form() {
        let cases = [
            ("examplechan", CanonicalReference::Username("examplechan".into())),
            ("777", CanonicalReference::NumericId(777)),
            ("t.me/c/555/9", CanonicalReference::PeerChannelId(555)),
            (
                "https://web.telegram.org/k/#-1000000000042",
                CanonicalReference::NumericId(-1_000_000_000_042),
            ),
        ];

        for (locator, expected) in cases {
            let mut mock = MockTransport::new();
            mock.expect_resolve_entity()
                .returning(|candidate| Ok(EntityHandle::new(1, candidate.to_string())));
            let resolved = resolver(mock).resolve(locator).await.unwrap();
            assert_eq!(resolved.reference, expected, "locator {locator}");
        }
    }

    #[tokio::test]
    async fn not_found_after_every_encoding() {
        let mut mock = MockTransport::new();
        mock.expect_resolve_entity()
            .times(3)
            .returning(|c| Err(TransportError::not_found(c.to_string())));

        let err = resolver(mock).resolve("-42").await.unwrap_err();
        assert_eq!(err, ResolutionError::not_found("-42", 3));
    }

    #[tokio::test]
    async fn transport_errors_do_not_stop_the_chain() {
        let mut mock = MockTransport::new();
        mock.expect_resolve_entity()
            .with(eq(CanonicalReference::PeerChannelId(99)))
            .returning(|_| Err(TransportError::other("flood wait")));
        mock.expect_resolve_entity()
            .with(eq(CanonicalReference::NumericId(-1_000_000_000_099)))
            .returning(|_| Ok(EntityHandle::new(99, "Ninety-nine")));

        let resolved = resolver(mock).resolve("t.me/c/99/1").await.unwrap();
        assert_eq!(resolved.entity.id, 99);
    }

    #[tokio::test]
    async fn malformed_locator_never_reaches_transport() {
        let mock = MockTransport::new();
        let err = resolver(mock).resolve("https://t.me/c/").await.unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedLocator { .. }));
    }
}
