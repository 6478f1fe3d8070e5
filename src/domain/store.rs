//! In-memory store of requests.
//!
//! The [`RequestStore`] knows nothing about the filesystem. It is the single
//! source of truth that every department view projects from, and all state
//! changes go through [`RequestStore::apply`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    NewRequest, Request, RequestId, RequestType, Transition, TransitionError, TransitionOutcome,
};

/// A state change dispatched to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The request to change.
    pub id: RequestId,
    /// The change to apply.
    pub transition: Transition,
}

impl Action {
    /// Approve the request.
    #[must_use]
    pub const fn approve(id: RequestId) -> Self {
        Self {
            id,
            transition: Transition::Approve,
        }
    }

    /// Reject the request, optionally with a reason.
    #[must_use]
    pub const fn reject(id: RequestId, reason: Option<String>) -> Self {
        Self {
            id,
            transition: Transition::Reject { reason },
        }
    }

    /// Mark an interview as held.
    #[must_use]
    pub const fn complete(id: RequestId) -> Self {
        Self {
            id,
            transition: Transition::Complete,
        }
    }

    /// Call off an interview.
    #[must_use]
    pub const fn cancel(id: RequestId) -> Self {
        Self {
            id,
            transition: Transition::Cancel,
        }
    }
}

/// An ordered, in-memory collection of requests.
///
/// Requests keep the order they were inserted in. Lookups by id are O(1).
#[derive(Debug, Default, Clone)]
pub struct RequestStore {
    /// Requests in insertion order.
    requests: Vec<Request>,

    /// Position of each request in `requests`.
    index: HashMap<RequestId, usize>,
}

/// Error returned when inserting a request whose id is already stored.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("duplicate request id {0}")]
pub struct DuplicateIdError(pub RequestId);

/// Errors that can occur when resolving a (possibly abbreviated) request id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No request id starts with the given prefix.
    #[error("no request matches '{0}'")]
    NoMatch(String),
    /// More than one request id starts with the given prefix.
    #[error("'{prefix}' is ambiguous ({count} requests match)")]
    Ambiguous {
        /// The prefix supplied.
        prefix: String,
        /// Number of matching requests.
        count: usize,
    },
}

impl RequestStore {
    /// Creates an empty store with room for `capacity` requests.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            requests: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts an existing request at the end of the collection.
    ///
    /// # Errors
    ///
    /// Returns an error, and leaves the store untouched, if a request with the
    /// same id is already stored.
    pub fn insert(&mut self, request: Request) -> Result<(), DuplicateIdError> {
        let id = request.id();
        if self.index.contains_key(&id) {
            return Err(DuplicateIdError(id));
        }
        self.index.insert(id, self.requests.len());
        self.requests.push(request);
        Ok(())
    }

    /// Creates a new `pending` request from a submission and stores it.
    #[instrument(level = "debug", skip(self, new), fields(request_type = %new.data.request_type()))]
    pub fn add(&mut self, new: NewRequest) -> &Request {
        let request = self.prepare(new);
        let position = self.requests.len();
        self.index.insert(request.id(), position);
        self.requests.push(request);
        &self.requests[position]
    }

    /// Builds the request [`add`](Self::add) would store, without storing it.
    #[must_use]
    pub fn prepare(&self, new: NewRequest) -> Request {
        let mut id = RequestId::new();
        while self.index.contains_key(&id) {
            id = RequestId::new();
        }
        Request::new(new, id, Utc::now())
    }

    /// The full collection, in insertion order.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Iterates over the requests of one type, in insertion order.
    pub fn of_type<'a>(
        &'a self,
        request_type: &'a RequestType,
    ) -> impl Iterator<Item = &'a Request> + 'a {
        self.requests
            .iter()
            .filter(move |request| &request.request_type() == request_type)
    }

    /// Looks up a request by id.
    #[must_use]
    pub fn get(&self, id: RequestId) -> Option<&Request> {
        self.index.get(&id).map(|&position| &self.requests[position])
    }

    /// Number of stored requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Resolves a full id or a unique prefix of its hex form.
    ///
    /// Hyphens in the prefix are ignored and matching is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns an error if no request matches, or if more than one does.
    pub fn resolve(&self, prefix: &str) -> Result<RequestId, ResolveError> {
        if let Ok(id) = prefix.parse::<RequestId>() {
            if self.index.contains_key(&id) {
                return Ok(id);
            }
        }

        let needle: String = prefix
            .chars()
            .filter(|c| *c != '-')
            .collect::<String>()
            .to_lowercase();
        if needle.is_empty() {
            return Err(ResolveError::NoMatch(prefix.to_string()));
        }

        let matches: Vec<RequestId> = self
            .requests
            .iter()
            .map(Request::id)
            .filter(|id| id.uuid().simple().to_string().starts_with(&needle))
            .collect();

        match matches.as_slice() {
            [] => Err(ResolveError::NoMatch(prefix.to_string())),
            [id] => Ok(*id),
            _ => Err(ResolveError::Ambiguous {
                prefix: prefix.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Checks an action against the current state without applying it.
    ///
    /// # Errors
    ///
    /// Returns the error [`apply`](Self::apply) would return.
    pub fn check(&self, action: &Action) -> Result<TransitionOutcome, TransitionError> {
        self.get(action.id)
            .ok_or(TransitionError::NotFound(action.id))?
            .check(&action.transition)
    }

    /// Applies an action.
    ///
    /// Applying the transition that produced the current terminal status
    /// again is a no-op and returns [`TransitionOutcome::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns an error, and mutates nothing, if the request does not exist,
    /// already reached a different terminal status, or does not support the
    /// transition.
    pub fn apply(&mut self, action: Action) -> Result<TransitionOutcome, TransitionError> {
        self.apply_at(action, Utc::now())
    }

    /// Like [`apply`](Self::apply), but only if the request's current
    /// [`etag`](Request::etag) equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::PreconditionFailed`] if the etag is stale,
    /// otherwise the errors of [`apply`](Self::apply).
    pub fn apply_if_match(
        &mut self,
        action: Action,
        expected: &str,
    ) -> Result<TransitionOutcome, TransitionError> {
        let request = self
            .get(action.id)
            .ok_or(TransitionError::NotFound(action.id))?;

        let actual = request.etag();
        if actual != expected.trim() {
            return Err(TransitionError::PreconditionFailed {
                id: action.id,
                expected: expected.trim().to_string(),
                actual,
            });
        }

        self.apply(action)
    }

    pub(crate) fn apply_at(
        &mut self,
        action: Action,
        at: DateTime<Utc>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let position = *self
            .index
            .get(&action.id)
            .ok_or(TransitionError::NotFound(action.id))?;

        let request = &mut self.requests[position];
        let outcome = request.apply(action.transition, at)?;

        if outcome.is_applied() {
            tracing::info!(
                id = %action.id,
                status = %request.status(),
                "Request {}",
                request.status()
            );
        }

        Ok(outcome)
    }

    /// Replaces a stored request with an updated copy of itself.
    ///
    /// Used by hosts that persist a change before committing it.
    pub(crate) fn replace(&mut self, request: Request) -> Result<(), TransitionError> {
        let position = *self
            .index
            .get(&request.id())
            .ok_or(TransitionError::NotFound(request.id()))?;
        self.requests[position] = request;
        Ok(())
    }

    /// Convenience for `apply(Action::approve(id))`.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn approve(&mut self, id: RequestId) -> Result<TransitionOutcome, TransitionError> {
        self.apply(Action::approve(id))
    }

    /// Convenience for `apply(Action::reject(id, reason))`.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn reject(
        &mut self,
        id: RequestId,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, TransitionError> {
        self.apply(Action::reject(id, reason))
    }

    /// Convenience for `apply(Action::complete(id))`.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn complete(&mut self, id: RequestId) -> Result<TransitionOutcome, TransitionError> {
        self.apply(Action::complete(id))
    }

    /// Convenience for `apply(Action::cancel(id))`.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn cancel(&mut self, id: RequestId) -> Result<TransitionOutcome, TransitionError> {
        self.apply(Action::cancel(id))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::domain::{Employee, RequestData, Status};

    fn submission(request_type: RequestType, data: serde_json::Value) -> NewRequest {
        NewRequest::new(
            Employee::new("Ravi Kumar", "EMP-104", "Operations"),
            RequestData::from_parts(request_type, data),
        )
    }

    #[test]
    fn add_assigns_pending_status_and_keeps_order() {
        let mut store = RequestStore::default();
        let first = store.add(submission(RequestType::Loan, json!({}))).id();
        let second = store.add(submission(RequestType::Asset, json!({}))).id();

        let ids: Vec<_> = store.requests().iter().map(Request::id).collect();
        assert_eq!(ids, vec![first, second]);
        assert!(store.requests().iter().all(Request::is_pending));
    }

    #[test]
    fn approve_changes_only_the_target_request() {
        let mut store = RequestStore::default();
        let a = store.add(submission(RequestType::Loan, json!({}))).id();
        let b = store.add(submission(RequestType::Loan, json!({}))).id();
        let b_before = store.get(b).unwrap().clone();

        store.approve(a).unwrap();

        assert_eq!(store.get(a).unwrap().status(), Status::Approved);
        assert_eq!(store.get(b).unwrap(), &b_before);
    }

    #[test]
    fn approving_an_unknown_id_is_a_recoverable_error() {
        let mut store = RequestStore::default();
        store.add(submission(RequestType::Loan, json!({})));
        let before: Vec<_> = store.requests().to_vec();

        let missing = RequestId::new();
        assert_eq!(
            store.approve(missing),
            Err(TransitionError::NotFound(missing))
        );
        assert_eq!(store.requests(), before.as_slice());
    }

    #[test]
    fn approving_twice_is_a_no_op() {
        let mut store = RequestStore::default();
        let id = store.add(submission(RequestType::Loan, json!({}))).id();
        store.approve(id).unwrap();
        let snapshot = store.get(id).unwrap().clone();

        assert_eq!(
            store.approve(id),
            Ok(TransitionOutcome::Unchanged(Status::Approved))
        );
        assert_eq!(store.get(id).unwrap(), &snapshot);
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut store = RequestStore::default();
        let request = store.add(submission(RequestType::Leave, json!({}))).clone();
        assert_eq!(store.insert(request.clone()), Err(DuplicateIdError(request.id())));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn apply_if_match_refuses_stale_etag() {
        let mut store = RequestStore::default();
        let id = store.add(submission(RequestType::Asset, json!({}))).id();
        let stale = store.get(id).unwrap().etag();

        store.reject(id, Some("duplicate".to_string())).unwrap();

        let err = store.apply_if_match(Action::approve(id), &stale).unwrap_err();
        assert!(matches!(err, TransitionError::PreconditionFailed { .. }));
        assert_eq!(store.get(id).unwrap().status(), Status::Rejected);
    }

    #[test]
    fn apply_if_match_accepts_current_etag() {
        let mut store = RequestStore::default();
        let id = store.add(submission(RequestType::Asset, json!({}))).id();
        let etag = store.get(id).unwrap().etag();

        assert!(store.apply_if_match(Action::approve(id), &etag).unwrap().is_applied());
    }

    #[test]
    fn resolve_accepts_unique_prefixes() {
        let mut store = RequestStore::default();
        let id = store.add(submission(RequestType::Loan, json!({}))).id();

        assert_eq!(store.resolve(&id.to_string()), Ok(id));
        assert_eq!(store.resolve(&id.short()), Ok(id));
        assert_eq!(store.resolve(&id.short().to_uppercase()), Ok(id));
        assert!(matches!(
            store.resolve("zzzz"),
            Err(ResolveError::NoMatch(_))
        ));
    }

    #[test]
    fn resolve_reports_ambiguous_prefix() {
        let mut store = RequestStore::default();
        for n in 1..=2u128 {
            let id = RequestId::from(uuid::Uuid::from_u128((0xabcd_u128 << 112) | n));
            let request = Request::new(
                submission(RequestType::Loan, json!({})),
                id,
                Utc::now(),
            );
            store.insert(request).unwrap();
        }

        assert_eq!(
            store.resolve("abcd"),
            Err(ResolveError::Ambiguous {
                prefix: "abcd".to_string(),
                count: 2
            })
        );
        assert!(matches!(store.resolve("-"), Err(ResolveError::NoMatch(_))));
    }

    #[test]
    fn of_type_filters_in_order() {
        let mut store = RequestStore::default();
        let loan_a = store
            .add(submission(RequestType::Loan, json!({"amount": 1})))
            .id();
        store.add(submission(RequestType::Asset, json!({})));
        let loan_b = store
            .add(submission(RequestType::Loan, json!({"amount": 2})))
            .id();

        let loans: Vec<_> = store.of_type(&RequestType::Loan).map(Request::id).collect();
        assert_eq!(loans, vec![loan_a, loan_b]);
        assert_eq!(
            store.get(loan_b).unwrap().amount(),
            Some(Decimal::from(2))
        );
    }
}
