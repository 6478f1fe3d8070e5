//! Department views over the shared request collection.
//!
//! A view claims one or more request types and projects each claimed request
//! into a render-ready [`ViewRow`] whose type-specific part never contains a
//! missing value: text falls back to [`NOT_AVAILABLE`] and numbers to zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Priority, Request, RequestId, RequestType, Status, ViewStats};

mod all;
mod asset;
mod grievance;
mod interview;
mod loan;
mod mrf;

pub use all::{AllRequestsView, RequestSummary};
pub use asset::{AssetDetail, AssetView};
pub use grievance::{GrievanceDetail, GrievanceView};
pub use interview::{InterviewDetail, InterviewView};
pub use loan::{LoanDetail, LoanView};
pub use mrf::{MrfDetail, MrfView};

/// Placeholder rendered for absent text fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// A department-specific projection of requests.
pub trait Projection {
    /// The type-specific display shape.
    type Detail: Clone + Serialize;

    /// Human-readable view name, e.g. "Loan approvals".
    const NAME: &'static str;

    /// Whether this view shows requests of the given type.
    fn claims(request_type: &RequestType) -> bool;

    /// Reads the type-specific fields out of a claimed request.
    fn detail(request: &Request) -> Self::Detail;

    /// The type-specific field matched by free-text search.
    fn search_key(detail: &Self::Detail) -> &str;
}

/// One request as shown by a department view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRow<D> {
    /// Request id.
    pub id: RequestId,
    /// Request type.
    pub request_type: RequestType,
    /// Submitter's name.
    pub employee_name: String,
    /// Submitter's employee number.
    pub employee_id: String,
    /// Submitter's department.
    pub department: String,
    /// Request title, or [`NOT_AVAILABLE`].
    pub title: String,
    /// Review priority.
    pub priority: Priority,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Current status.
    pub status: Status,
    /// Rejection note, if one was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Monetary amount of the request, if its type carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Type-specific fields.
    pub detail: D,
    #[serde(skip)]
    search_key: String,
}

impl<D> ViewRow<D> {
    /// The fields free-text search looks at: employee name, employee id and
    /// the view's type-specific key.
    #[must_use]
    pub fn search_fields(&self) -> [&str; 3] {
        [
            self.employee_name.as_str(),
            self.employee_id.as_str(),
            self.search_key.as_str(),
        ]
    }

    /// Case-insensitive substring match against any of
    /// [`search_fields`](Self::search_fields). A blank query matches.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
    }

    /// Whether the row still awaits review.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// A projected view: the claimed requests, in collection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Board<D> {
    rows: Vec<ViewRow<D>>,
}

impl<D> Board<D> {
    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[ViewRow<D>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the view has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows awaiting review.
    pub fn pending(&self) -> impl Iterator<Item = &ViewRow<D>> {
        self.rows.iter().filter(|row| row.is_pending())
    }

    /// Rows that reached a terminal status.
    pub fn processed(&self) -> impl Iterator<Item = &ViewRow<D>> {
        self.rows.iter().filter(|row| !row.is_pending())
    }

    /// Rows in the given status.
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &ViewRow<D>> {
        self.rows.iter().filter(move |row| row.status == status)
    }

    /// Approved rows.
    pub fn approved(&self) -> impl Iterator<Item = &ViewRow<D>> {
        self.with_status(Status::Approved)
    }

    /// Rejected rows.
    pub fn rejected(&self) -> impl Iterator<Item = &ViewRow<D>> {
        self.with_status(Status::Rejected)
    }

    /// Rows matching a free-text query. A blank query returns every row.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&ViewRow<D>> {
        self.rows.iter().filter(|row| row.matches(query)).collect()
    }

    /// Status counts and approved total for this view.
    #[must_use]
    pub fn stats(&self) -> ViewStats {
        let mut stats = ViewStats::default();
        for row in &self.rows {
            stats.record(row.status, row.amount);
        }
        stats
    }

    /// Keeps only the rows matching `predicate`.
    #[must_use]
    pub fn retain(mut self, predicate: impl FnMut(&ViewRow<D>) -> bool) -> Self {
        self.rows.retain(predicate);
        self
    }
}

/// Projects the requests claimed by `P`, preserving their relative order.
#[must_use]
pub fn project<'a, P: Projection>(requests: impl IntoIterator<Item = &'a Request>) -> Board<P::Detail> {
    let rows = requests
        .into_iter()
        .filter(|request| P::claims(&request.request_type()))
        .map(project_one::<P>)
        .collect();
    Board { rows }
}

fn project_one<P: Projection>(request: &Request) -> ViewRow<P::Detail> {
    let detail = P::detail(request);
    let search_key = P::search_key(&detail).to_string();
    let employee = request.employee();

    ViewRow {
        id: request.id(),
        request_type: request.request_type(),
        employee_name: employee.name.clone(),
        employee_id: employee.id.clone(),
        department: employee.department.clone(),
        title: text_or_na([Some(request.title())]),
        priority: request.priority(),
        created_at: request.created(),
        status: request.status(),
        reason: request.reason().map(ToString::to_string),
        amount: request.amount(),
        detail,
        search_key,
    }
}

/// The first candidate that is present and not blank, or [`NOT_AVAILABLE`].
pub(crate) fn text_or_na<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{Employee, NewRequest, RequestData, RequestStore};

    fn store() -> RequestStore {
        let mut store = RequestStore::default();
        for (name, id, request_type, purpose) in [
            ("Meera Pillai", "EMP-201", RequestType::Loan, "Wedding"),
            ("Arjun Mehta", "EMP-202", RequestType::Asset, ""),
            ("Sana Qureshi", "EMP-203", RequestType::Loan, "Medical"),
        ] {
            store.add(NewRequest::new(
                Employee::new(name, id, "Engineering"),
                RequestData::from_parts(request_type, json!({"purpose": purpose})),
            ));
        }
        store
    }

    #[test]
    fn text_or_na_skips_blank_candidates() {
        assert_eq!(text_or_na([None, Some("  "), Some("x")]), "x");
        assert_eq!(text_or_na([None, Some("")]), NOT_AVAILABLE);
    }

    #[test]
    fn projection_keeps_claimed_subset_in_order() {
        let store = store();
        let board = project::<LoanView>(store.requests());

        let expected: Vec<_> = store
            .requests()
            .iter()
            .filter(|r| r.request_type() == RequestType::Loan)
            .map(Request::id)
            .collect();
        let actual: Vec<_> = board.rows().iter().map(|row| row.id).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn blank_search_returns_everything() {
        let board = project::<AllRequestsView>(store().requests());
        assert_eq!(board.search("").len(), board.len());
        assert_eq!(board.search("   ").len(), board.len());
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let board = project::<LoanView>(store().requests());

        let by_name: Vec<_> = board.search("meera").iter().map(|r| r.employee_id.clone()).collect();
        assert_eq!(by_name, vec!["EMP-201"]);

        let by_id = board.search("emp-203");
        assert_eq!(by_id.len(), 1);

        let by_purpose = board.search("MEDIC");
        assert_eq!(by_purpose.len(), 1);
        assert_eq!(by_purpose[0].employee_name, "Sana Qureshi");
    }

    #[test]
    fn search_without_match_is_empty() {
        let board = project::<LoanView>(store().requests());
        assert!(board.search("no such thing").is_empty());
    }

    #[test]
    fn pending_and_processed_partition_the_board() {
        let mut store = store();
        let first = store.requests()[0].id();
        store.approve(first).unwrap();

        let board = project::<LoanView>(store.requests());
        assert_eq!(board.pending().count(), 1);
        assert_eq!(board.processed().count(), 1);
        assert_eq!(board.approved().next().map(|row| row.id), Some(first));
        assert_eq!(board.rejected().count(), 0);
    }

    #[test]
    fn board_stats_add_up() {
        let mut store = store();
        let first = store.requests()[0].id();
        store.reject(first, None).unwrap();

        let stats = project::<LoanView>(store.requests()).stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.pending + stats.approved + stats.rejected + stats.closed, stats.total);
    }
}
