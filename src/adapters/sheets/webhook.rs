use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    app_error::{AppError, AppResult},
    use_cases::registration::{AttendanceRecord, RecordStore, Registration},
};

/// Record store backed by a spreadsheet webhook (a Google Apps Script
/// endpoint): `POST` appends one row, `GET` answers a plain-text row count.
///
/// The endpoint has no row read-back, so `load` yields an empty list and
/// exports from this backend carry only the header. Failed submissions are
/// not retried; the caller reports them and the user resubmits.
pub struct SheetWebhookStore {
    client: Client,
    url: String,
}

impl SheetWebhookStore {
    pub fn new(url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl RecordStore for SheetWebhookStore {
    async fn load(&self) -> AppResult<Vec<AttendanceRecord>> {
        debug!("remote sheet has no row read-back");
        Ok(Vec::new())
    }

    async fn append(&self, registration: &Registration) -> AppResult<AttendanceRecord> {
        let record = AttendanceRecord {
            timestamp: Utc::now().naive_utc(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            masterclass: registration.masterclass,
            session: registration.session,
        };

        self.client
            .post(&self.url)
            .json(&record)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Transport(e.to_string()))?;

        Ok(record)
    }

    async fn count(&self) -> Option<u64> {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "headcount fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(status = %response.status(), "headcount fetch returned an error status");
            return None;
        }
        let body = response.text().await.ok()?;
        body.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post},
    };

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn registration() -> Registration {
        Registration {
            name: "Aya".to_string(),
            email: "aya@test.com".to_string(),
            phone: "+971501234567".to_string(),
            masterclass: None,
            session: None,
        }
    }

    #[tokio::test]
    async fn append_posts_the_record_and_returns_it_stamped() {
        let url = serve(Router::new().route("/", post(|| async { StatusCode::OK }))).await;
        let store = SheetWebhookStore::new(url, Duration::from_secs(5)).unwrap();

        let record = store.append(&registration()).await.unwrap();
        assert_eq!(record.name, "Aya");
        assert_eq!(record.phone, "+971501234567");
    }

    #[tokio::test]
    async fn append_maps_error_status_to_transport_error() {
        let url = serve(Router::new().route(
            "/",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;
        let store = SheetWebhookStore::new(url, Duration::from_secs(5)).unwrap();

        let err = store.append(&registration()).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn append_maps_connect_failure_to_transport_error() {
        // Port 1 is never listening.
        let store =
            SheetWebhookStore::new("http://127.0.0.1:1".to_string(), Duration::from_secs(1))
                .unwrap();
        let err = store.append(&registration()).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn count_parses_a_plain_integer_body() {
        let url = serve(Router::new().route("/", get(|| async { "  42\n" }))).await;
        let store = SheetWebhookStore::new(url, Duration::from_secs(5)).unwrap();
        assert_eq!(store.count().await, Some(42));
    }

    #[tokio::test]
    async fn count_is_unknown_on_garbage_error_status_or_dead_endpoint() {
        let url = serve(Router::new().route("/", get(|| async { "not a number" }))).await;
        let store = SheetWebhookStore::new(url, Duration::from_secs(5)).unwrap();
        assert_eq!(store.count().await, None);

        let url = serve(Router::new().route(
            "/",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;
        let store = SheetWebhookStore::new(url, Duration::from_secs(5)).unwrap();
        assert_eq!(store.count().await, None);

        let store =
            SheetWebhookStore::new("http://127.0.0.1:1".to_string(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(store.count().await, None);
    }

    #[tokio::test]
    async fn load_is_empty_for_the_remote_backend() {
        let store =
            SheetWebhookStore::new("http://127.0.0.1:1".to_string(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(store.load().await.unwrap(), Vec::new());
    }
}
