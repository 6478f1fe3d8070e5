use std::{fmt, str::FromStr};

use borsh::BorshSerialize;
use serde::{Deserialize, Serialize};

use crate::domain::{RequestId, RequestType};

/// Review status of a request.
///
/// Every request starts `Pending` and moves to exactly one terminal status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    BorshSerialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Awaiting review.
    #[default]
    Pending,
    /// Approved by a reviewer.
    Approved,
    /// Rejected by a reviewer.
    Rejected,
    /// Interview held.
    Completed,
    /// Interview called off.
    Cancelled,
}

impl Status {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Whether no further transition is defined from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid status: {s}"))
    }
}

/// A terminal status change a reviewer can apply to a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Move to [`Status::Approved`].
    Approve,
    /// Move to [`Status::Rejected`], optionally recording why.
    Reject {
        /// Best-effort note shown alongside the rejection.
        reason: Option<String>,
    },
    /// Move an interview to [`Status::Completed`].
    Complete,
    /// Move an interview to [`Status::Cancelled`].
    Cancel,
}

impl Transition {
    /// The status this transition leads to.
    #[must_use]
    pub const fn target(&self) -> Status {
        match self {
            Self::Approve => Status::Approved,
            Self::Reject { .. } => Status::Rejected,
            Self::Complete => Status::Completed,
            Self::Cancel => Status::Cancelled,
        }
    }

    /// Whether this transition is defined for requests of the given type.
    ///
    /// Approve and reject apply to every type; complete and cancel only to
    /// interviews.
    #[must_use]
    pub fn applies_to(&self, request_type: &RequestType) -> bool {
        match self {
            Self::Approve | Self::Reject { .. } => true,
            Self::Complete | Self::Cancel => matches!(request_type, RequestType::Interview),
        }
    }

    /// Verb used in messages, e.g. "approve".
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject { .. } => "reject",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

/// Result of a transition that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The status changed.
    Applied {
        /// Status before the transition (always pending).
        from: Status,
        /// Status after the transition.
        to: Status,
    },
    /// The request was already in the target status; nothing changed.
    Unchanged(Status),
}

impl TransitionOutcome {
    /// Whether the store was mutated.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Errors that can occur when applying a transition.
///
/// None of these leave a request partially updated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    /// No request has this id.
    #[error("request {0} not found")]
    NotFound(RequestId),
    /// The request already reached a different terminal status.
    #[error("request {id} is already {status}")]
    AlreadyDecided {
        /// The request.
        id: RequestId,
        /// Its terminal status.
        status: Status,
    },
    /// The transition is not defined for this request type.
    #[error("cannot {verb} a {request_type} request")]
    Unsupported {
        /// The attempted transition.
        verb: &'static str,
        /// Type of the request.
        request_type: RequestType,
    },
    /// The caller's etag is stale.
    #[error("request {id} has changed (expected etag {expected}, found {actual})")]
    PreconditionFailed {
        /// The request.
        id: RequestId,
        /// Etag supplied by the caller.
        expected: String,
        /// Current etag.
        actual: String,
    },
}
