use std::{fmt, str::FromStr};

use borsh::BorshSerialize;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{RequestData, RequestType, Status, Transition, TransitionError, TransitionOutcome};

/// Globally unique, perpetually stable identifier of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn uuid(self) -> Uuid {
        self.0
    }

    /// The first eight hex digits, used in tables.
    #[must_use]
    pub fn short(self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// The employee who submitted a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Display name.
    #[serde(rename = "employeeName")]
    pub name: String,
    /// Employee number, e.g. "EMP-1042".
    #[serde(rename = "employeeId")]
    pub id: String,
    /// Department the employee belongs to.
    pub department: String,
}

impl Employee {
    /// Creates a new employee reference.
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            department: department.into(),
        }
    }
}

/// How urgently a request should be reviewed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Review first.
    High,
    /// The default. Also accepted as "normal".
    #[default]
    #[serde(alias = "normal")]
    Medium,
    /// Review when convenient.
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" | "normal" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

/// An employee-submitted item requiring department review.
///
/// Everything except the review decision is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub(crate) metadata: Metadata,
    pub(crate) data: RequestData,
    pub(crate) decision: Decision,
}

/// Immutable identity and descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Metadata {
    pub(crate) id: RequestId,
    pub(crate) employee: Employee,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) priority: Priority,
    pub(crate) created: DateTime<Utc>,
}

/// The mutable part of a request: its review status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Decision {
    pub(crate) status: Status,
    pub(crate) reason: Option<String>,
    pub(crate) decided_at: Option<DateTime<Utc>>,
}

/// The fields a submission flow supplies when creating a request.
///
/// The store assigns the id, creation time and initial `pending` status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    /// Submitter.
    pub employee: Employee,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Review priority.
    pub priority: Priority,
    /// Type-specific payload.
    pub data: RequestData,
}

impl NewRequest {
    /// Starts a submission with an empty title and description.
    #[must_use]
    pub fn new(employee: Employee, data: RequestData) -> Self {
        Self {
            employee,
            title: String::new(),
            description: String::new(),
            priority: Priority::default(),
            data,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl Request {
    pub(crate) fn new(new: NewRequest, id: RequestId, created: DateTime<Utc>) -> Self {
        Self {
            metadata: Metadata {
                id,
                employee: new.employee,
                title: new.title,
                description: new.description,
                priority: new.priority,
                created,
            },
            data: new.data,
            decision: Decision::default(),
        }
    }

    /// The request's id.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.metadata.id
    }

    /// The discriminator, derived from the payload.
    #[must_use]
    pub fn request_type(&self) -> RequestType {
        self.data.request_type()
    }

    /// Who submitted the request.
    #[must_use]
    pub const fn employee(&self) -> &Employee {
        &self.metadata.employee
    }

    /// Short title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// Longer description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    /// Review priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.metadata.priority
    }

    /// When the request was submitted.
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.metadata.created
    }

    /// The type-specific payload.
    #[must_use]
    pub const fn data(&self) -> &RequestData {
        &self.data
    }

    /// Current review status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.decision.status
    }

    /// Note recorded with a rejection, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.decision.reason.as_deref()
    }

    /// When the terminal transition was applied.
    #[must_use]
    pub const fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decision.decided_at
    }

    /// Whether the request still awaits review.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.decision.status.is_terminal()
    }

    /// The monetary amount carried by the payload, if any.
    #[must_use]
    pub fn amount(&self) -> Option<Decimal> {
        self.data.amount()
    }

    /// Entity tag over the mutable state of the request.
    ///
    /// The tag changes whenever the status or rejection note changes. Callers
    /// can pass it back to [`RequestStore::apply_if_match`] to refuse a
    /// transition against a request someone else already decided.
    ///
    /// # Panics
    ///
    /// Panics if borsh serialization fails (which should never happen for this
    /// data structure).
    ///
    /// [`RequestStore::apply_if_match`]: crate::domain::RequestStore::apply_if_match
    #[must_use]
    pub fn etag(&self) -> String {
        #[derive(BorshSerialize)]
        struct EtagData<'a> {
            id: &'a [u8; 16],
            status: Status,
            reason: Option<&'a str>,
        }

        let data = EtagData {
            id: self.metadata.id.0.as_bytes(),
            status: self.decision.status,
            reason: self.decision.reason.as_deref(),
        };

        let encoded = borsh::to_vec(&data).expect("this should never fail");
        let hash = Sha256::digest(encoded);

        // 16 hex digits are plenty to detect a concurrent decision
        format!("{hash:x}")[..16].to_string()
    }

    /// Checks whether `transition` may be applied, without applying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not defined for this request's
    /// type, or if the request already reached a different terminal status.
    pub fn check(&self, transition: &Transition) -> Result<TransitionOutcome, TransitionError> {
        let request_type = self.request_type();
        if !transition.applies_to(&request_type) {
            return Err(TransitionError::Unsupported {
                verb: transition.verb(),
                request_type,
            });
        }

        let target = transition.target();
        match self.decision.status {
            Status::Pending => Ok(TransitionOutcome::Applied {
                from: Status::Pending,
                to: target,
            }),
            current if current == target => Ok(TransitionOutcome::Unchanged(current)),
            current => Err(TransitionError::AlreadyDecided {
                id: self.id(),
                status: current,
            }),
        }
    }

    /// Applies a transition in place.
    ///
    /// Nothing is modified unless the outcome is
    /// [`TransitionOutcome::Applied`].
    pub(crate) fn apply(
        &mut self,
        transition: Transition,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let outcome = self.check(&transition)?;

        if outcome.is_applied() {
            self.decision.status = transition.target();
            if let Transition::Reject { reason } = transition {
                self.decision.reason = reason
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());
            }
            self.decision.decided_at = Some(at);
        }

        Ok(outcome)
    }
}
