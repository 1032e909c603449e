//! Per-kind item handlers.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use queue_core::{FetchItem, FetchKind};

use crate::CrawlerContext;
use crate::error::FetchError;
use crate::handlers::{IdentityHandler, IdentityIdHandler, MatchHandler};

/// Result type for item handlers.
pub type HandlerResult = Result<(), FetchError>;

/// Future type for async item handlers.
pub type HandlerFuture<'a> = BoxFuture<'a, HandlerResult>;

/// Trait for item handlers.
///
/// A handler does the work for one item and reports success or failure. It
/// never touches the item's own status; the orchestrator does that.
pub trait FetchHandler: Send + Sync + 'static {
    /// The item kind this handler processes.
    fn kind(&self) -> FetchKind;

    fn handle<'a>(&'a self, item: &'a FetchItem) -> HandlerFuture<'a>;
}

/// One handler per `FetchKind`.
#[derive(Clone)]
pub struct HandlerSet {
    identity_id: Arc<dyn FetchHandler>,
    identity: Arc<dyn FetchHandler>,
    match_detail: Arc<dyn FetchHandler>,
}

impl HandlerSet {
    /// Build a set from one handler per kind.
    ///
    /// # Panics
    ///
    /// If a handler's `kind()` does not match the slot it is passed in.
    pub fn new(
        identity_id: impl FetchHandler,
        identity: impl FetchHandler,
        match_detail: impl FetchHandler,
    ) -> Self {
        assert_eq!(identity_id.kind(), FetchKind::IdentityId, "identity_id handler kind");
        assert_eq!(identity.kind(), FetchKind::Identity, "identity handler kind");
        assert_eq!(match_detail.kind(), FetchKind::Match, "match_detail handler kind");
        Self {
            identity_id: Arc::new(identity_id),
            identity: Arc::new(identity),
            match_detail: Arc::new(match_detail),
        }
    }

    /// The discovery pipeline: resolve accounts, list matches, fetch details.
    pub fn standard(ctx: &CrawlerContext) -> Self {
        Self::new(
            IdentityIdHandler::new(ctx.clone()),
            IdentityHandler::new(ctx.clone()),
            MatchHandler::new(ctx.clone()),
        )
    }

    pub fn get(&self, kind: FetchKind) -> &dyn FetchHandler {
        match kind {
            FetchKind::IdentityId => self.identity_id.as_ref(),
            FetchKind::Identity => self.identity.as_ref(),
            FetchKind::Match => self.match_detail.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop(FetchKind);

    impl FetchHandler for Noop {
        fn kind(&self) -> FetchKind {
            self.0
        }

        fn handle<'a>(&'a self, _item: &'a FetchItem) -> HandlerFuture<'a> {
            Box::pin(async { Ok(()) })
        }
    }

    #[test]
    fn dispatch_follows_kind() {
        let set = HandlerSet::new(
            Noop(FetchKind::IdentityId),
            Noop(FetchKind::Identity),
            Noop(FetchKind::Match),
        );
        for kind in [FetchKind::IdentityId, FetchKind::Identity, FetchKind::Match] {
            assert_eq!(set.get(kind).kind(), kind);
        }
    }

    #[test]
    #[should_panic(expected = "identity handler kind")]
    fn misplaced_handler_is_rejected() {
        HandlerSet::new(
            Noop(FetchKind::IdentityId),
            Noop(FetchKind::Match),
            Noop(FetchKind::Match),
        );
    }
}
