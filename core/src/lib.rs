//! Async API client for the StepUp step-tracking service.
//!
//! # Overview
//! Authenticates with a pre-issued Google or Apple identity token (decoded
//! locally, never verified) and exposes the service's social and activity
//! operations: [`StepUpClient::nudge`], [`StepUpClient::activity`], and
//! the [`StepUpClient::me`] identity accessor.
//!
//! # Design
//! - `StepUpClient` is immutable after construction: one client, one
//!   authenticated identity. Login validation is fail-fast.
//! - Each operation is split into `build_*` (produces a plain-data
//!   [`HttpRequest`]) and `parse_*` (consumes an [`HttpResponse`]); the
//!   async wrappers run the pair through a pluggable [`HttpTransport`],
//!   reqwest by default, so the shaping logic stays deterministic and
//!   testable without a network.
//! - Wire field names, including the service's `leaderbord` spelling, are
//!   preserved exactly; see [`types`] for the mapping.
//! - Non-2xx statuses are data, not errors: `activity` returns a typed
//!   failure variant and `nudge` returns `false`. Only transport and
//!   JSON-boundary failures surface as [`ApiError`].

pub mod client;
pub mod error;
pub mod http;
pub mod token;
pub mod types;

pub use client::{StepUpClient, DEFAULT_API_URL, DEFAULT_ENDING_PATHNAME};
pub use error::ApiError;
pub use http::{
    Body, HttpMethod, HttpRequest, HttpResponse, HttpTransport, Query, ReqwestTransport,
};
pub use token::api_user_from_token;
pub use types::{
    AccountType, ActivityOptions, ActivityResponse, ActivitySummary, ApiConfig, ApiUser, Auth,
    Expression, Leaderboard, LeaderboardDay, NudgeOptions, StepUpInit, User, UserGroup,
    UserScoreOneDay,
};
