//! Error types for the StepUp API client.
//!
//! # Design
//! Login failures get dedicated variants because they are terminal: the
//! client cannot be constructed and the caller has to start over with
//! corrected input. The runtime variants cover the transport and the JSON
//! boundary only; a non-2xx status is *not* an error here. `activity`
//! reports rejections as a typed failure result and `nudge` collapses them
//! to `false`, so callers never have to catch anything to learn the
//! service said no.

use thiserror::Error;

use crate::types::AccountType;

/// Errors returned by [`StepUpClient`](crate::StepUpClient) construction
/// and operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Login was attempted with an account type the service does not
    /// accept.
    #[error("Unsupported account type: {0}")]
    UnsupportedAccountType(AccountType),

    /// The identity token could not be decoded into a user, or failed the
    /// freshness policy.
    #[error("Your token is not valid or may have expired.")]
    InvalidLoginData,

    /// The HTTP round-trip itself failed (DNS, refused connection, broken
    /// stream).
    #[error("request failed: {0}")]
    Transport(String),

    /// A request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A 2xx response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}
