//! HTTP API layer with Axum routes over the Ledgerwise core.
//!
//! This crate provides:
//! - REST routes for journals, allocations, reconciliation, landed costs,
//!   document numbering and exchange rates
//! - Error to JSON response mapping
//! - The acting-user extractor
//! - An HTTP client for a live exchange rate feed

pub mod error;
pub mod middleware;
pub mod rate_feed;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use ledgerwise_core::currency::RateFeed;
use ledgerwise_core::store::Store;
use ledgerwise_shared::MatchingConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use rate_feed::HttpRateFeed;

/// Application state shared across handlers.
pub struct AppState<S> {
    /// Persistence.
    pub store: Arc<S>,
    /// Default reconciliation parameters.
    pub matching: Arc<MatchingConfig>,
    /// Live exchange rate feed, when configured.
    pub rate_feed: Option<Arc<dyn RateFeed>>,
}

impl<S> AppState<S> {
    /// Creates state without a live rate feed.
    pub fn new(store: S, matching: MatchingConfig) -> Self {
        Self {
            store: Arc::new(store),
            matching: Arc::new(matching),
            rate_feed: None,
        }
    }

    /// Attaches a live rate feed.
    #[must_use]
    pub fn with_rate_feed(mut self, feed: Arc<dyn RateFeed>) -> Self {
        self.rate_feed = Some(feed);
        self
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            matching: Arc::clone(&self.matching),
            rate_feed: self.rate_feed.clone(),
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .merge(routes::health::routes::<AppState<S>>())
        .nest("/api/v1/companies/{company_id}", routes::company_routes::<S>())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
