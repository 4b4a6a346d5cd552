//! HTTP handlers

use super::docs;
use super::metrics::HttpMetrics;
use crate::db::RateStore;
use crate::error::{AppError, Result};
use crate::services::RatesService;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Shared state for HTTP handlers
pub struct ApiState {
    pub rates: Arc<dyn RateStore>,
    pub metrics: Arc<HttpMetrics>,
}

impl ApiState {
    pub fn new(rates: Arc<dyn RateStore>, metrics: Arc<HttpMetrics>) -> Self {
        Self { rates, metrics }
    }
}

fn text(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}

/// GET /rates
pub async fn get_rates(State(state): State<Arc<ApiState>>) -> Result<Response> {
    let body = RatesService::rates_text(state.rates.as_ref())?;
    Ok(text(body))
}

/// GET /rates/:currency
pub async fn get_rate(
    State(state): State<Arc<ApiState>>,
    Path(currency): Path<String>,
) -> Result<Response> {
    let body = RatesService::rate_text(state.rates.as_ref(), &currency)?;
    Ok(text(body))
}

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<ApiState>>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.render(),
    )
        .into_response()
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /swagger
pub async fn swagger_index() -> Html<&'static str> {
    Html(docs::SWAGGER_INDEX)
}

/// GET /swagger/*path
pub async fn swagger(Path(path): Path<String>) -> Result<Response> {
    match path.trim_start_matches('/') {
        "" | "index.html" => Ok(Html(docs::SWAGGER_INDEX).into_response()),
        "doc.json" => Ok(Json(docs::openapi_doc()).into_response()),
        other => Err(AppError::NotFound(format!("no such document: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDb;
    use axum::body::to_bytes;
    use chrono::{TimeZone, Utc};

    fn state_with(db: Arc<MemoryDb>) -> State<Arc<ApiState>> {
        State(Arc::new(ApiState::new(db, Arc::new(HttpMetrics::new()))))
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn seeded_db() -> Arc<MemoryDb> {
        let db = Arc::new(MemoryDb::new());
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        db.record_price("bitcoin", 65000.0, now).unwrap();
        db.record_price("ethereum", 3000.0, now).unwrap();
        db
    }

    #[tokio::test]
    async fn test_get_rates() {
        let response = get_rates(state_with(seeded_db())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);

        let body = body_string(response).await;
        let records: Vec<&str> = body.split("\r\n\r\n").collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].starts_with("CurrencyID: bitcoin\r\nCurrentPrice: 65000.00"));
        assert!(records[1].starts_with("CurrencyID: ethereum"));
    }

    #[tokio::test]
    async fn test_get_rate_not_found() {
        let db = seeded_db();
        let reads = db.read_count();

        let response = get_rate(state_with(db.clone()), Path("xrp".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(db.read_count(), reads);

        let response = get_rate(state_with(db), Path("tron".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_rate_storage_failure() {
        let db = seeded_db();
        db.set_failing(true);

        let response = get_rate(state_with(db.clone()), Path("bitcoin".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = get_rates(state_with(db)).await.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_swagger_paths() {
        let response = swagger(Path("doc.json".to_string())).await.unwrap();
        let body = body_string(response).await;
        assert!(body.contains("\"/rates/{currency}\""));

        let response = swagger(Path("index.html".to_string())).await.unwrap();
        assert!(body_string(response).await.contains("swagger-ui"));

        let response = swagger(Path("missing.txt".to_string())).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
