//! HTTP client for the booking REST API.
//!
//! Wraps `reqwest` with the API's error contract: one login per run
//! producing a bearer token, then stateless availability queries that are
//! safe to issue concurrently.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use citawatch_core::ApiConfig;

use crate::error::ApiError;
use crate::types::{AvailabilitySlot, JobKey, LoginResponse};

const INITIAL_TIME: &str = "07:00";
const END_TIME: &str = "21:00";

/// Client for the booking REST API.
///
/// Holds the HTTP client, resolved endpoint URLs, credentials, and the
/// run-fixed query parameters (agreement and appointment format). Point the
/// config's `base_url` at a mock server to test against wiremock.
pub struct AvailabilityClient {
    client: Client,
    login_url: Url,
    availability_url: Url,
    username: String,
    password: String,
    agreement_id: i64,
    format_id: i64,
}

impl AvailabilityClient {
    /// Creates a client from the pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the configured base URL does
    /// not parse, or [`ApiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // join() appends path segments instead of replacing the last one.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let invalid = |reason: String| ApiError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason,
        };
        let base_url = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        let login_url = base_url
            .join("auth/login")
            .map_err(|e| invalid(e.to_string()))?;
        let availability_url = base_url
            .join("me/appointment-availabilities")
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            login_url,
            availability_url,
            username: config.username.clone(),
            password: config.password.clone(),
            agreement_id: config.agreement_id,
            format_id: config.format_id,
        })
    }

    /// Logs in with the configured credentials and returns the bearer token
    /// for the run.
    ///
    /// No retries: a rejected login is fatal to the whole pipeline run.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`] — any non-200 status, carrying status and body.
    /// - [`ApiError::Deserialize`] — 200 with a body that is not the
    ///   expected `{token, customer_id}` shape.
    /// - [`ApiError::Http`] — network or TLS failure.
    pub async fn login(&self) -> Result<String, ApiError> {
        let payload = serde_json::json!({
            "username": self.username,
            "password": self.password,
        });

        let response = self
            .client
            .post(self.login_url.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(ApiError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
                context: "login response".to_string(),
                source: e,
            })?;

        Ok(login.token)
    }

    /// Queries open slots for one `(health centre, specialty)` pair within
    /// the run-fixed time window.
    ///
    /// Pure function of its inputs — no shared mutable state, safe to call
    /// from concurrent jobs.
    ///
    /// # Errors
    ///
    /// - [`ApiError::UpstreamStatus`] — any non-200 status.
    /// - [`ApiError::Deserialize`] — body is not a JSON slot array.
    /// - [`ApiError::Http`] — network or TLS failure.
    pub async fn availability(
        &self,
        token: &str,
        job: JobKey,
        initial_date: &str,
    ) -> Result<Vec<AvailabilitySlot>, ApiError> {
        let url = self.availability_query_url(job, initial_date);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("language", "es")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: format!(
                "availability response for centre {} specialty {}",
                job.health_centre_id, job.specialty_id
            ),
            source: e,
        })
    }

    /// Builds the availability URL with properly percent-encoded query
    /// parameters via [`Url::query_pairs_mut`].
    fn availability_query_url(&self, job: JobKey, initial_date: &str) -> Url {
        let mut url = self.availability_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format_ids", &self.format_id.to_string());
            pairs.append_pair("specialty_id", &job.specialty_id.to_string());
            pairs.append_pair("initial_date", initial_date);
            pairs.append_pair("initial_time", INITIAL_TIME);
            pairs.append_pair("end_time", END_TIME);
            pairs.append_pair("agreement_id", &self.agreement_id.to_string());
            pairs.append_pair("health_centre_id", &job.health_centre_id.to_string());
        }
        url
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
