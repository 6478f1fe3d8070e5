//! Domain models for employee requests.
//!
//! This module contains the request model, its review state machine, the
//! in-memory store, department views and aggregate statistics.

mod config;
pub use config::Config;

/// Type-specific request payloads.
pub mod payload;
pub use payload::RequestData;

/// The request entity and its identifiers.
pub mod request;
pub use request::{Employee, NewRequest, Priority, Request, RequestId};

mod request_type;
pub use request_type::{InvalidTypeError, RequestType, TypeTag};

mod status;
pub use status::{Status, Transition, TransitionError, TransitionOutcome};

/// Aggregate statistics and amount formatting.
pub mod stats;
pub use stats::{AmountStyle, Dashboard, Money, ViewStats};

mod store;
pub use store::{Action, DuplicateIdError, RequestStore, ResolveError};

pub mod view;
pub use view::{Board, Projection, ViewRow, project};
