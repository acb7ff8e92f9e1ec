//! Session handling, request building, and response normalization for the
//! StepUp API.
//!
//! # Design
//! `StepUpClient` validates the login once, at construction, and is
//! immutable afterwards: one client, one authenticated identity. Each
//! remote operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`;
//! the async wrappers run the pair through the configured
//! [`HttpTransport`]. The split keeps request/response shaping
//! deterministic and testable without a network.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::error::ApiError;
use crate::http::{
    Body, HttpMethod, HttpRequest, HttpResponse, HttpTransport, Query, ReqwestTransport,
};
use crate::token::api_user_from_token;
use crate::types::{
    AccountType, ActivityOptions, ActivityResponse, ActivitySummary, ApiUser, Auth, NudgeOptions,
    StepUpInit,
};

/// Base URL of the production StepUp service.
pub const DEFAULT_API_URL: &str = "https://stepup-api.azurewebsites.net";

/// Routing token appended as the final path segment of every endpoint.
pub const DEFAULT_ENDING_PATHNAME: &str = "d05f8abd-9b4b-489f-837e-acbc86477b66";

/// User-Agent of the official Android app; the service expects it.
const USER_AGENT: &str = "okhttp/4.9.3.6";

/// Authenticated client for the StepUp API.
///
/// Construction checks the account type, decodes the identity token, and
/// applies the freshness policy; a client that constructs is fully usable.
/// All state is read-only afterwards, so clones share the transport and
/// may issue operations concurrently.
#[derive(Clone)]
pub struct StepUpClient {
    auth: Auth,
    user: ApiUser,
    base_url: String,
    ending_pathname: String,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for StepUpClient {
    // The raw token is a credential; keep it out of debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepUpClient")
            .field("user", &self.user.id)
            .field("account_type", &self.auth.account_type)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl StepUpClient {
    /// Log in and build a client that talks to the service through
    /// [`ReqwestTransport`].
    pub fn new(init: StepUpInit) -> Result<Self, ApiError> {
        Self::with_transport(init, Arc::new(ReqwestTransport::new()))
    }

    /// Log in and build a client with a caller-supplied transport.
    pub fn with_transport(
        init: StepUpInit,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ApiError> {
        let StepUpInit { auth, api } = init;

        if matches!(auth.account_type, AccountType::Facebook | AccountType::Bot) {
            return Err(ApiError::UnsupportedAccountType(auth.account_type));
        }

        let user = api_user_from_token(&auth.token).ok_or(ApiError::InvalidLoginData)?;

        // Intentionally `>`: the deployed clients reject tokens whose
        // expiry is still in the future and accept already-expired ones.
        // Pinned by `login_accepts_expired_token` until the service owner
        // confirms the intended polarity (see DESIGN.md).
        if user.expiry > Utc::now().timestamp() {
            return Err(ApiError::InvalidLoginData);
        }

        let api = api.unwrap_or_default();
        let base_url = builtin_or_override(Some(DEFAULT_API_URL), api.url);
        let ending_pathname =
            builtin_or_override(Some(DEFAULT_ENDING_PATHNAME), api.ending_pathname);

        tracing::debug!(user = %user.id, account_type = %auth.account_type, "session established");

        Ok(Self {
            auth,
            user,
            base_url: base_url.trim_end_matches('/').to_string(),
            ending_pathname,
            transport,
        })
    }

    /// The identity decoded from the login token.
    pub fn me(&self) -> &ApiUser {
        &self.user
    }

    /// Compose one authenticated request against the configured base URL.
    ///
    /// The URL is always `{base}/{endpoint}/{ending_pathname}?{query}`,
    /// with the `?` present even when the query is empty. Credential
    /// headers and the User-Agent are attached to every request;
    /// `extra_headers` are applied last and replace computed defaults on
    /// case-insensitive name collision.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        search: Option<Query>,
        body: Option<Body>,
        extra_headers: &[(String, String)],
    ) -> Result<HttpRequest, ApiError> {
        let query = search.map(|q| q.encode()).unwrap_or_default();
        let url = format!(
            "{}/{}/{}?{}",
            self.base_url, endpoint, self.ending_pathname, query
        );

        let mut headers: Vec<(String, String)> = Vec::new();
        let body = match body {
            Some(Body::Json(value)) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(
                    serde_json::to_string(&value)
                        .map_err(|e| ApiError::Serialization(e.to_string()))?,
                )
            }
            Some(Body::Text(text)) => Some(text),
            None => None,
        };

        headers.push(("userid".to_string(), self.user.id.clone()));
        headers.push(("usertoken".to_string(), self.auth.token.clone()));
        headers.push((
            "usertype".to_string(),
            self.auth.account_type.as_str().to_string(),
        ));
        headers.push(("User-Agent".to_string(), USER_AGENT.to_string()));

        for (name, value) in extra_headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// POST specialization of [`Self::build_request`].
    pub fn build_post(
        &self,
        endpoint: &str,
        search: Option<Query>,
        body: Option<Body>,
    ) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Post, endpoint, search, body, &[])
    }

    /// Build the request for [`Self::nudge`].
    pub fn build_nudge(&self, options: &NudgeOptions) -> Result<HttpRequest, ApiError> {
        self.build_post(
            "poke",
            None,
            Some(Body::Json(json!({
                "action": options.expression,
                "id": options.recipient_id,
                "type": options.recipient_type,
                "message": options.message,
            }))),
        )
    }

    /// Interpret a poke response: any 2xx status counts as delivered.
    pub fn parse_nudge(&self, response: HttpResponse) -> bool {
        (200..300).contains(&response.status)
    }

    /// Send a social expression to another user.
    ///
    /// Returns `true` iff the service answered with a 2xx status; the
    /// response body is never inspected. Transport failures propagate.
    pub async fn nudge(&self, options: NudgeOptions) -> Result<bool, ApiError> {
        let request = self.build_nudge(&options)?;
        let response = self.transport.fetch(request).await?;
        Ok(self.parse_nudge(response))
    }

    /// Build the request for [`Self::activity`].
    pub fn build_activity(&self, options: &ActivityOptions) -> Result<HttpRequest, ApiError> {
        let search = Query::pairs([
            ("steps", options.steps.to_string()),
            ("calories", options.calories.to_string()),
            ("distance", options.distance.to_string()),
            // Without bg=false the service defers processing and answers
            // with an empty summary.
            ("bg", "false".to_string()),
        ]);
        // The request field is spelled `leaderboard`; only the *response*
        // carries the service's `leaderbord` spelling.
        let body = json!({
            "history": options.history,
            "leaderboard": options.leaderboards,
        });
        self.build_post("activity/v2", Some(search), Some(Body::Json(body)))
    }

    /// Interpret an activity response.
    ///
    /// A 2xx body is parsed as an [`ActivitySummary`], decoding every
    /// `dateTime` on the way in; anything else is captured verbatim as a
    /// failure. Exactly one variant comes out.
    pub fn parse_activity(&self, response: HttpResponse) -> Result<ActivityResponse, ApiError> {
        if (200..300).contains(&response.status) {
            let summary: ActivitySummary = response
                .json()
                .map_err(|e| ApiError::Deserialization(e.to_string()))?;
            return Ok(ActivityResponse::Success(summary));
        }

        tracing::warn!(status = response.status, "activity submission rejected");
        Ok(ActivityResponse::Failure {
            error: response.body,
            status: response.status,
        })
    }

    /// Submit step data and receive the current leaderboards.
    pub async fn activity(&self, options: ActivityOptions) -> Result<ActivityResponse, ApiError> {
        let request = self.build_activity(&options)?;
        let response = self.transport.fetch(request).await?;
        self.parse_activity(response)
    }
}

/// Default-resolution order for the endpoint settings: a built-in value
/// wins whenever it is present, so a constructor override only lands when
/// the corresponding built-in has been removed.
fn builtin_or_override(builtin: Option<&str>, override_value: Option<String>) -> String {
    match builtin {
        Some(value) => value.to_string(),
        None => override_value.unwrap_or_default(),
    }
}
