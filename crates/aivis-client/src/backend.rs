//! HTTP client for the analysis backend.
//!
//! Covers run status, site audits, and billing. Runs and audits are
//! long-running jobs; the `poll_*` methods wait for them on a fixed cadence.

use std::time::Duration;

use aivis_core::{AppConfig, RunStatusResponse};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::poll::{poll_until, PollPolicy};
use crate::types::{BillingStatus, CheckoutRequest, SessionUrl, SiteAudit, SiteAuditRequest};

pub struct BackendClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    poll: PollPolicy,
}

impl BackendClient {
    /// Creates a client from application config: base URL, bearer token,
    /// request timeout, and poll cadence.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `AIVIS_API_BASE_URL` is not
    /// an http(s) URL, or [`ClientError::Http`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let mut client = Self::with_base_url(&config.api_base_url, config.request_timeout_secs)?
            .with_poll_policy(PollPolicy {
                interval: Duration::from_millis(config.poll_interval_ms),
                max_attempts: config.poll_max_attempts,
            });
        client.token.clone_from(&config.api_token);
        Ok(client)
    }

    /// Creates an unauthenticated client for `base_url` (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] or [`ClientError::Http`].
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("aivis/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            token: None,
            poll: PollPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Fetches the current status and results of a run.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] if the backend does not know `run_id`.
    /// - [`ClientError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the payload does not match
    ///   [`RunStatusResponse`].
    pub async fn get_run(&self, run_id: &str) -> Result<RunStatusResponse, ClientError> {
        let url = self.endpoint(&["api", "v1", "run", run_id]);
        let request = self.client.get(url.clone());
        self.send_json(request, &url).await
    }

    /// Polls a run until it is complete, failed, or cancelled.
    ///
    /// # Errors
    ///
    /// Any non-transient error from [`BackendClient::get_run`], or
    /// [`ClientError::PollTimeout`] once the attempt budget is spent.
    pub async fn poll_run(&self, run_id: &str) -> Result<RunStatusResponse, ClientError> {
        let run = poll_until(
            "run",
            run_id,
            self.poll,
            || self.get_run(run_id),
            |run: &RunStatusResponse| {
                tracing::debug!(
                    run_id,
                    status = ?run.status,
                    completed = run.completed_calls,
                    total = run.total_calls,
                    "run progress"
                );
                run.status.is_terminal()
            },
        )
        .await?;

        tracing::info!(
            run_id,
            status = ?run.status,
            results = run.results.len(),
            failed_calls = run.failed_calls,
            "run finished"
        );
        Ok(run)
    }

    /// Starts an AI-readiness audit of `site_url`.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::get_run`].
    pub async fn create_site_audit(&self, site_url: &str) -> Result<SiteAudit, ClientError> {
        let url = self.endpoint(&["api", "v1", "site-audit"]);
        let request = self
            .client
            .post(url.clone())
            .json(&SiteAuditRequest { url: site_url });
        self.send_json(request, &url).await
    }

    /// # Errors
    ///
    /// Same as [`BackendClient::get_run`].
    pub async fn get_site_audit(&self, audit_id: &str) -> Result<SiteAudit, ClientError> {
        let url = self.endpoint(&["api", "v1", "site-audit", audit_id]);
        let request = self.client.get(url.clone());
        self.send_json(request, &url).await
    }

    /// Polls an audit until it is complete or failed.
    ///
    /// # Errors
    ///
    /// Any non-transient error from [`BackendClient::get_site_audit`], or
    /// [`ClientError::PollTimeout`].
    pub async fn poll_site_audit(&self, audit_id: &str) -> Result<SiteAudit, ClientError> {
        let audit = poll_until(
            "site audit",
            audit_id,
            self.poll,
            || self.get_site_audit(audit_id),
            |audit: &SiteAudit| audit.status.is_terminal(),
        )
        .await?;

        tracing::info!(
            audit_id,
            status = ?audit.status,
            score = ?audit.score,
            "site audit finished"
        );
        Ok(audit)
    }

    /// Current subscription state. Any failure falls back to the free tier so
    /// callers can always render a paywall decision.
    pub async fn billing_status(&self) -> BillingStatus {
        let url = self.endpoint(&["api", "billing", "status"]);
        let request = self.client.get(url.clone());
        match self.send_json::<BillingStatus>(request, &url).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = %err, "billing status unavailable, assuming free tier");
                BillingStatus::default()
            }
        }
    }

    /// Creates a hosted checkout session for `price_id`.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::get_run`].
    pub async fn create_checkout_session(&self, price_id: &str) -> Result<SessionUrl, ClientError> {
        let url = self.endpoint(&["api", "billing", "checkout"]);
        let request = self
            .client
            .post(url.clone())
            .json(&CheckoutRequest { price_id });
        self.send_json(request, &url).await
    }

    /// Creates a hosted billing-portal session for the current subscriber.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::get_run`].
    pub async fn create_portal_session(&self) -> Result<SessionUrl, ClientError> {
        let url = self.endpoint(&["api", "billing", "portal"]);
        let request = self.client.post(url.clone()).json(&serde_json::json!({}));
        self.send_json(request, &url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects URLs that cannot be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        decode(response, url).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T, ClientError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound {
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
        context: url.path().to_owned(),
        source: e,
    })
}

/// Parses `raw` as an http(s) base URL with a trailing slash.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", raw.trim().trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: "expected an http or https URL".to_owned(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    fn body_of<B: Serialize>(body: &B) -> serde_json::Value {
        serde_json::to_value(body).unwrap()
    }

    #[test]
    fn endpoint_joins_segments_under_base_path() {
        let client = BackendClient::with_base_url("http://localhost:8000/backend/", 5).unwrap();
        assert_eq!(
            client.endpoint(&["api", "v1", "run", "r-1"]).as_str(),
            "http://localhost:8000/backend/api/v1/run/r-1"
        );
    }

    #[test]
    fn endpoint_escapes_ids() {
        let client = BackendClient::with_base_url("http://localhost:8000", 5).unwrap();
        assert_eq!(
            client.endpoint(&["api", "v1", "run", "a/b"]).as_str(),
            "http://localhost:8000/api/v1/run/a%2Fb"
        );
    }

    #[test]
    fn rejects_non_http_base_urls() {
        assert!(matches!(
            parse_base_url("mailto:ops@example.com"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn checkout_body_uses_camel_case() {
        assert_eq!(
            body_of(&CheckoutRequest { price_id: "price_123" }),
            serde_json::json!({ "priceId": "price_123" })
        );
    }
}
