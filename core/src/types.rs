//! Domain DTOs for the StepUp API.
//!
//! # Design
//! Wire field names (`leaderbord`, `isFinal`, `dateTime`) are preserved
//! exactly via serde renames, so payloads stay byte-compatible with what
//! the official mobile apps exchange; the Rust identifiers use
//! conventional spelling. The mock-server crate defines its own copies of
//! these shapes and the integration tests catch schema drift between the
//! two crates.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identity provider behind a StepUp login.
///
/// Only `Google` and `Apple` are accepted at login. `Facebook` and `Bot`
/// exist on the wire (other users may carry them) but cannot authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Google,
    Apple,
    Facebook,
    Bot,
}

impl AccountType {
    /// Lowercase wire name, as sent in the `usertype` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Google => "google",
            AccountType::Apple => "apple",
            AccountType::Facebook => "facebook",
            AccountType::Bot => "bot",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials held for the lifetime of a client and attached to every
/// outgoing request.
#[derive(Debug, Clone)]
pub struct Auth {
    pub account_type: AccountType,
    /// Raw signed identity token from Google or Apple sign-in, passed
    /// through verbatim in the `usertoken` header.
    pub token: String,
}

/// Optional endpoint overrides for [`StepUpInit`].
///
/// Resolution is builtin-first: an override only lands when the
/// corresponding built-in constant is absent, so with the shipped defaults
/// these fields are effectively inert. The surface is kept for parity with
/// the official clients' constructor.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub url: Option<String>,
    pub ending_pathname: Option<String>,
}

/// Constructor input for [`StepUpClient`](crate::StepUpClient).
#[derive(Debug, Clone)]
pub struct StepUpInit {
    pub auth: Auth,
    pub api: Option<ApiConfig>,
}

/// Read-only identity snapshot decoded from the login token.
///
/// Created once at login and never mutated; discarded with the client.
/// Profile claims the identity provider omitted are `None`; `id` and
/// `expiry` are always present because a token without them does not
/// decode into a user at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUser {
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub given_name: Option<String>,
    /// Subject identifier (`sub` claim).
    pub id: String,
    /// Expiry timestamp (`exp` claim), seconds since the Unix epoch.
    pub expiry: i64,
}

/// Social expression sent with a [`nudge`](crate::StepUpClient::nudge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Nudge,
    Cheer,
    Taunt,
}

/// Input for [`nudge`](crate::StepUpClient::nudge).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NudgeOptions {
    pub expression: Expression,
    pub recipient_id: String,
    /// Free-form recipient kind; the service does not constrain it.
    pub recipient_type: String,
    pub message: String,
}

/// Input for [`activity`](crate::StepUpClient::activity).
///
/// `history` and `leaderboards` are client state echoed back to the
/// service; both default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityOptions {
    pub steps: u64,
    pub calories: f64,
    pub distance: f64,
    /// Opaque history entries; the service accepts any JSON list here.
    #[serde(default)]
    pub history: Vec<serde_json::Value>,
    #[serde(default)]
    pub leaderboards: Vec<Leaderboard>,
}

/// Named time window a leaderboard aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardDay {
    Today,
    Yesterday,
    Last7Days,
    Month,
}

/// One leaderboard window: per-user day scores plus the window total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub day: LeaderboardDay,
    /// Display label for the window, as the service formats it.
    pub date: String,
    pub data: Vec<UserScoreOneDay>,
    pub total_steps: u64,
}

/// One user's metrics for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScoreOneDay {
    pub id: String,
    pub steps: u64,
    pub calories: f64,
    pub distance: f64,
    pub is_final: bool,
    /// Calendar timestamp for the scored day. The wire value is a
    /// percent-encoded string, with `""` standing in for "not dated".
    #[serde(with = "wire_date")]
    pub date_time: Option<NaiveDateTime>,
}

/// Another app user referenced by leaderboard and group payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

/// Group membership for the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: String,
    pub name: String,
    /// `admin` or a free-form role label.
    pub role: String,
}

/// Payload of a successful activity submission.
///
/// Every section is defaulted: the service omits whatever it has nothing
/// to say about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// The remote field is spelled without the second "a"; the rename
    /// keeps the wire contract intact.
    #[serde(rename = "leaderbord", default)]
    pub leaderboards: Vec<Leaderboard>,
    #[serde(default)]
    pub unread_alerts_count: u32,
    #[serde(default)]
    pub user_groups: Vec<UserGroup>,
    #[serde(default)]
    pub users: Vec<User>,
}

/// Outcome of an activity submission.
///
/// 2xx responses parse into `Success`; everything else is captured
/// verbatim as `Failure`. Transport breakdowns are not represented here,
/// they surface as [`ApiError::Transport`](crate::ApiError::Transport).
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityResponse {
    Success(ActivitySummary),
    Failure {
        /// Plain-text response body.
        error: String,
        /// HTTP status code.
        status: u16,
    },
}

impl ActivityResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ActivityResponse::Success(_))
    }
}

/// Serde adapter for the service's day-score timestamps.
///
/// The service transmits `dateTime` as a percent-encoded local timestamp
/// (`2024-01-15T00%3A00%3A00`) and the empty string when a score has no
/// date. Outgoing payloads use the plain format; the service accepts both.
mod wire_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(stamp) => serializer.serialize_str(&stamp.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        let decoded = urlencoding::decode(&raw).map_err(serde::de::Error::custom)?;
        parse_stamp(&decoded)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized dateTime: {decoded}")))
    }

    /// The service is not consistent about fractional seconds or zone
    /// suffixes; accept the shapes seen in production traffic.
    fn parse_stamp(s: &str) -> Option<NaiveDateTime> {
        if let Ok(stamp) = chrono::DateTime::parse_from_rfc3339(s) {
            return Some(stamp.naive_utc());
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}
