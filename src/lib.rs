//! Employee request desk
//!
//! Requests submitted by employees (loans, assets, interviews, manpower
//! requisitions, grievances and more) live in a single collection. Each
//! department reviews its own slice of that collection through a typed
//! [`view`](domain::view), and every review decision goes through one
//! state machine.

pub mod domain;
pub use domain::{
    Action, Config, Dashboard, Employee, NewRequest, Priority, Request, RequestData, RequestId,
    RequestStore, RequestType, Status, Transition, TransitionError, TransitionOutcome, ViewStats,
};

/// Filesystem storage and directory management for requests.
pub mod storage;
pub use storage::{Directory, RequestSource};
