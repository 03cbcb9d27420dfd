//! In-memory application used by the route tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use ledgerwise_core::company::{CompanySettings, DefaultAccounts};
use ledgerwise_core::currency::RateFeed;
use ledgerwise_core::store::InMemoryStore;
use ledgerwise_shared::MatchingConfig;
use ledgerwise_shared::types::{AccountId, CompanyId};
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, create_router};

pub(crate) struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
    pub company: CompanyId,
    pub cash: AccountId,
    pub revenue: AccountId,
    pub payable: AccountId,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    pub async fn with_rate_feed(feed: Arc<dyn RateFeed>) -> Self {
        Self::build(Some(feed)).await
    }

    async fn build(feed: Option<Arc<dyn RateFeed>>) -> Self {
        let store = InMemoryStore::new();
        let company = CompanyId::new();
        let cash = AccountId::new();
        let revenue = AccountId::new();
        let receivable = AccountId::new();
        let payable = AccountId::new();

        store
            .seed(|s| {
                s.add_company(CompanySettings {
                    company_id: company,
                    base_currency: "USD".to_string(),
                    fiscal_year_start_month: 1,
                    accounts: DefaultAccounts {
                        receivable: Some(receivable),
                        payable: Some(payable),
                        revenue: Some(revenue),
                        cash: Some(cash),
                        ..DefaultAccounts::default()
                    },
                });
                for account in [cash, revenue, receivable, payable] {
                    s.add_account(company, account);
                }
            })
            .await;

        let mut state = AppState::new(store.clone(), MatchingConfig::default());
        if let Some(feed) = feed {
            state = state.with_rate_feed(feed);
        }
        let router = create_router(state);
        Self {
            router,
            store,
            company,
            cash,
            revenue,
            payable,
        }
    }
}

/// Sends a request under the company prefix and decodes the JSON reply.
pub(crate) async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let uri = format!("/api/v1/companies/{}{uri}", app.company);
    send_raw(&app.router, method, &uri, body).await
}

pub(crate) async fn send_raw(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
