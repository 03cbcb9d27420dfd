//! Exchange rate routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use ledgerwise_core::currency::{CurrencyService, ExchangeRate, RateQuote};
use ledgerwise_core::store::{Store, StoreTx};
use ledgerwise_shared::types::CompanyId;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::today;
use crate::{AppState, error::ApiError};

/// Creates the exchange rate routes.
pub fn routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/exchange-rates", get(list_rates::<S>).post(upsert_rate::<S>))
        .route("/exchange-rates/quote", get(quote::<S>))
        .route("/exchange-rates/refresh", post(refresh::<S>))
}

/// Optional pair filter.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListRatesQuery {
    /// Source currency.
    pub from: Option<String>,
    /// Target currency.
    pub to: Option<String>,
}

/// Pair and date of a quote.
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    /// Source currency.
    pub from: String,
    /// Target currency.
    pub to: String,
    /// As-of date, today when omitted.
    pub date: Option<NaiveDate>,
}

/// Request body for storing a rate snapshot.
#[derive(Debug, Deserialize)]
pub struct UpsertRateRequest {
    /// Source currency.
    pub from_currency: String,
    /// Target currency.
    pub to_currency: String,
    /// Units of `to_currency` per unit of `from_currency`.
    pub rate: Decimal,
    /// Effective date.
    pub date: NaiveDate,
}

/// Request body for refreshing a pair from the live feed.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Source currency.
    pub from_currency: String,
    /// Target currency.
    pub to_currency: String,
    /// Snapshot date, today when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// GET `/exchange-rates?from=&to=`
async fn list_rates<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    Query(query): Query<ListRatesQuery>,
) -> Result<Json<Vec<ExchangeRate>>, ApiError> {
    let mut tx = state.store.begin().await?;
    let rates =
        CurrencyService::list_rates(&mut tx, company_id, query.from.as_deref(), query.to.as_deref()).await?;
    Ok(Json(rates))
}

/// POST `/exchange-rates` - Insert or replace the snapshot for a pair and date.
async fn upsert_rate<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    Json(req): Json<UpsertRateRequest>,
) -> Result<(StatusCode, Json<ExchangeRate>), ApiError> {
    let mut tx = state.store.begin().await?;
    let stored = CurrencyService::upsert_rate(
        &mut tx,
        ExchangeRate {
            company_id,
            from_currency: req.from_currency,
            to_currency: req.to_currency,
            rate: req.rate,
            date: req.date,
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        company_id = %company_id,
        from = %stored.from_currency,
        to = %stored.to_currency,
        rate = %stored.rate,
        "Exchange rate stored"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET `/exchange-rates/quote?from=&to=&date=`
async fn quote<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<RateQuote>, ApiError> {
    let mut tx = state.store.begin().await?;
    let quote = CurrencyService::get_rate(
        &mut tx,
        company_id,
        &query.from,
        &query.to,
        query.date.unwrap_or_else(today),
    )
    .await?;
    Ok(Json(quote))
}

/// POST `/exchange-rates/refresh` - Pull from the live feed when one is
/// configured, otherwise quote from stored snapshots.
async fn refresh<S: Store>(
    State(state): State<AppState<S>>,
    Path(company_id): Path<CompanyId>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RateQuote>, ApiError> {
    let date = req.date.unwrap_or_else(today);
    let mut tx = state.store.begin().await?;
    let quote = match &state.rate_feed {
        Some(feed) => {
            CurrencyService::refresh_rate(&mut tx, feed.as_ref(), company_id, &req.from_currency, &req.to_currency, date)
                .await?
        }
        None => CurrencyService::get_rate(&mut tx, company_id, &req.from_currency, &req.to_currency, date).await?,
    };
    tx.commit().await?;
    Ok(Json(quote))
}
