//! Session REST Client
//!
//! Thin client for the session server's REST boundary. The real-time path
//! goes over the sync channel; of these endpoints only session creation and
//! lookup are used in normal operation, `update_location` being the
//! documented REST fallback.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ParticipantId, SessionId};
use crate::shared::ApiError;

/// Per-request deadline for REST calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body for `POST /api/session`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub user_id: ParticipantId,
    pub latitude: f64,
    pub longitude: f64,
    pub heading: f64,
}

/// Response of `POST /api/session`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
    #[serde(default)]
    pub message: Option<String>,
}

/// Session metadata from `GET /api/session/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_count: u32,
}

/// Request body for `POST /api/location` (REST fallback).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    pub session_id: SessionId,
    pub user_id: ParticipantId,
    pub latitude: f64,
    pub longitude: f64,
}

/// Client for the `/api` endpoints.
#[derive(Debug, Clone)]
pub struct SessionApi {
    http: reqwest::Client,
    base_url: String,
}

impl SessionApi {
    /// `base_url` is the API root, e.g. `https://example.com:8443/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Create a new shareable session seeded with the caller's location.
    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<SessionId, ApiError> {
        let response = self
            .http
            .post(format!("{}/session", self.base_url))
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let body: CreateSessionResponse = response.json().await?;
        tracing::info!(session_id = %body.session_id, "Session created");
        Ok(body.session_id)
    }

    /// Fetch metadata for an existing session.
    pub async fn get_session(&self, id: &SessionId) -> Result<SessionInfo, ApiError> {
        let response = self
            .http
            .get(format!("{}/session/{}", self.base_url, id))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// REST fallback for location updates; not used by the real-time path.
    pub async fn update_location(&self, request: &UpdateLocationRequest) -> Result<(), ApiError> {
        self.http
            .post(format!("{}/location", self.base_url))
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
