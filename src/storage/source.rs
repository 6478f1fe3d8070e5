//! The seam between department views and wherever requests live.

use crate::{
    domain::{NewRequest, Request, RequestId, RequestStore, TransitionError, TransitionOutcome},
    storage::{AddRequestError, DecideError, Directory, directory::Loaded},
};

/// A collaborator that holds requests and accepts review decisions.
///
/// Views only ever read [`fetch_requests`](Self::fetch_requests); all writes
/// go through the other methods.
pub trait RequestSource {
    /// Error returned by the write operations.
    type Error: std::error::Error;

    /// A snapshot of every request, in the source's stable order.
    fn fetch_requests(&self) -> &[Request];

    /// Submits a new request.
    ///
    /// # Errors
    ///
    /// Returns an error if the source refuses or cannot store the request.
    fn add_request(&mut self, new: NewRequest) -> Result<Request, Self::Error>;

    /// Approves a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request doesn't exist or was already decided
    /// differently.
    fn approve_request(&mut self, id: RequestId) -> Result<TransitionOutcome, Self::Error>;

    /// Rejects a request, optionally with a reason.
    ///
    /// # Errors
    ///
    /// Returns an error if the request doesn't exist or was already decided
    /// differently.
    fn reject_request(
        &mut self,
        id: RequestId,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, Self::Error>;
}

impl RequestSource for RequestStore {
    type Error = TransitionError;

    fn fetch_requests(&self) -> &[Request] {
        self.requests()
    }

    fn add_request(&mut self, new: NewRequest) -> Result<Request, Self::Error> {
        Ok(self.add(new).clone())
    }

    fn approve_request(&mut self, id: RequestId) -> Result<TransitionOutcome, Self::Error> {
        self.approve(id)
    }

    fn reject_request(
        &mut self,
        id: RequestId,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, Self::Error> {
        self.reject(id, reason)
    }
}

/// Errors raised by a [`Directory`] acting as a [`RequestSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Submitting failed.
    #[error(transparent)]
    Add(#[from] AddRequestError),
    /// Deciding failed.
    #[error(transparent)]
    Decide(#[from] DecideError),
}

impl RequestSource for Directory<Loaded> {
    type Error = SourceError;

    fn fetch_requests(&self) -> &[Request] {
        self.requests()
    }

    fn add_request(&mut self, new: NewRequest) -> Result<Request, Self::Error> {
        Ok(Self::add_request(self, new)?)
    }

    fn approve_request(&mut self, id: RequestId) -> Result<TransitionOutcome, Self::Error> {
        Ok(self.approve(id)?)
    }

    fn reject_request(
        &mut self,
        id: RequestId,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, Self::Error> {
        Ok(self.reject(id, reason)?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{
        Employee, RequestData, RequestType, Status, ViewStats, project, view::LoanView,
    };

    fn loan(name: &str, amount: u64) -> NewRequest {
        NewRequest::new(
            Employee::new(name, "EMP-400", "Finance"),
            RequestData::from_parts(RequestType::Loan, json!({ "amount": amount })),
        )
    }

    /// Exercises a source purely through the trait.
    fn approve_largest_pending_loan<S: RequestSource>(source: &mut S) -> ViewStats {
        let largest = project::<LoanView>(source.fetch_requests())
            .pending()
            .max_by_key(|row| row.detail.amount)
            .map(|row| row.id);
        if let Some(id) = largest {
            let _ = source.approve_request(id);
        }
        project::<LoanView>(source.fetch_requests()).stats()
    }

    fn seed<S: RequestSource>(source: &mut S) -> RequestId {
        source.add_request(loan("Asha", 200_000)).unwrap();
        source.add_request(loan("Bala", 150_000)).unwrap();
        let approved = source.add_request(loan("Chitra", 100_000)).unwrap().id();
        source.approve_request(approved).unwrap();
        approved
    }

    #[test]
    fn in_memory_source() {
        let mut store = RequestStore::default();
        seed(&mut store);

        let stats = approve_largest_pending_loan(&mut store);
        assert_eq!(stats.approved, 2);
        assert_eq!(stats.approved_amount, Decimal::from(300_000));
    }

    #[test]
    fn directory_source() {
        let tmp = TempDir::new().unwrap();
        let mut directory = Directory::new(tmp.path().to_path_buf()).init().unwrap();
        seed(&mut directory);

        let stats = approve_largest_pending_loan(&mut directory);
        assert_eq!(stats.approved, 2);
        assert_eq!(stats.approved_amount, Decimal::from(300_000));
    }

    #[test]
    fn rejecting_an_unknown_id_is_an_error() {
        let mut store = RequestStore::default();
        let approved = seed(&mut store);
        let missing = RequestId::new();

        assert_eq!(
            store.reject_request(missing, None),
            Err(TransitionError::NotFound(missing))
        );
        assert_eq!(store.get(approved).unwrap().status(), Status::Approved);
    }
}
