//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::HubConfig;
use crate::domain::RelayBus;
use crate::persistence::MarketStore;
use crate::service::{
    AccountService, AnalyticsService, CatalogService, MessageService, OrderService, ReviewService,
};

/// Upload settings the upload handler needs.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Target directory.
    pub dir: std::path::PathBuf,
    /// Per-file limit in bytes.
    pub max_file_bytes: usize,
}

impl UploadSettings {
    /// Files accepted per request.
    pub const MAX_FILES: usize = 10;

    /// Multipart framing allowance on top of the file payloads.
    const FRAMING_BYTES: usize = 1024 * 1024;

    /// Whole-request ceiling: a full batch of maximum-size files plus
    /// framing. Per-file limits are enforced while reading.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        self.max_file_bytes
            .saturating_mul(Self::MAX_FILES)
            .saturating_add(Self::FRAMING_BYTES)
    }
}

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Profile synchronization.
    pub accounts: Arc<AccountService>,
    /// Listings, search, categories and portfolios.
    pub catalog: Arc<CatalogService>,
    /// Orders and their lifecycle.
    pub orders: Arc<OrderService>,
    /// Order-scoped chat.
    pub messages: Arc<MessageService>,
    /// Reviews of completed orders.
    pub reviews: Arc<ReviewService>,
    /// Seller and platform statistics.
    pub analytics: Arc<AnalyticsService>,
    /// Relay bus the WebSocket tasks subscribe to.
    pub relay: RelayBus,
    /// Bearer token verification.
    pub tokens: TokenVerifier,
    /// Upload target.
    pub uploads: UploadSettings,
}

impl AppState {
    /// Wires every service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn MarketStore>, config: &HubConfig) -> Self {
        let relay = RelayBus::new(config.event_bus_capacity);
        Self {
            accounts: Arc::new(AccountService::new(Arc::clone(&store))),
            catalog: Arc::new(CatalogService::new(Arc::clone(&store))),
            orders: Arc::new(OrderService::new(Arc::clone(&store))),
            messages: Arc::new(MessageService::new(Arc::clone(&store), relay.clone())),
            reviews: Arc::new(ReviewService::new(Arc::clone(&store))),
            analytics: Arc::new(AnalyticsService::new(store)),
            relay,
            tokens: TokenVerifier::new(&config.jwt_secret),
            uploads: UploadSettings {
                dir: config.upload_dir.clone(),
                max_file_bytes: config.upload_max_file_bytes,
            },
        }
    }
}
