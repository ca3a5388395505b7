//! Status-carrying values threaded through validator chains.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed pass/fail marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// The payload passed every check so far.
    Success,
    /// A check rejected the payload. Downstream validators are skipped.
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => f.write_str("SUCCESS"),
            Status::Failure => f.write_str("FAILURE"),
        }
    }
}

/// A payload paired with a [`Status`].
///
/// Both arms carry the same payload type. A validator that rejects its input
/// returns `Failure` holding whatever diagnostic it wants the caller to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "UPPERCASE")]
pub enum Outcome<T> {
    /// Passed.
    Success(T),
    /// Rejected.
    Failure(T),
}

impl<T> Outcome<T> {
    /// Wrap a passing payload.
    pub fn success(payload: T) -> Self {
        Outcome::Success(payload)
    }

    /// Wrap a rejected payload.
    pub fn failure(payload: T) -> Self {
        Outcome::Failure(payload)
    }

    /// Build from a status marker and a payload.
    pub fn with_status(status: Status, payload: T) -> Self {
        match status {
            Status::Success => Outcome::Success(payload),
            Status::Failure => Outcome::Failure(payload),
        }
    }

    /// The status marker.
    pub fn status(&self) -> Status {
        match self {
            Outcome::Success(_) => Status::Success,
            Outcome::Failure(_) => Status::Failure,
        }
    }

    /// Check for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Check for `Failure`. Used as the skip guard of every validator step.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Borrow the payload regardless of status.
    pub fn payload(&self) -> &T {
        match self {
            Outcome::Success(payload) | Outcome::Failure(payload) => payload,
        }
    }

    /// Take the payload regardless of status.
    pub fn into_payload(self) -> T {
        match self {
            Outcome::Success(payload) | Outcome::Failure(payload) => payload,
        }
    }

    /// Transform the payload, keeping the status.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(payload) => Outcome::Success(f(payload)),
            Outcome::Failure(payload) => Outcome::Failure(f(payload)),
        }
    }

    /// `Ok` for a success, `Err` for a failure.
    pub fn into_result(self) -> Result<T, T> {
        match self {
            Outcome::Success(payload) => Ok(payload),
            Outcome::Failure(payload) => Err(payload),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.status(), self.payload())
    }
}
