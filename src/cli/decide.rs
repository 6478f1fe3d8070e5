use std::{io::IsTerminal, path::PathBuf};

use request_desk::{Action, RequestId, TransitionOutcome};
use tracing::instrument;

use super::terminal::Colorize;

/// The decision a command applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Approve,
    Reject,
    Complete,
    Cancel,
}

impl Verb {
    fn action(self, id: RequestId, reason: Option<String>) -> Action {
        match self {
            Self::Approve => Action::approve(id),
            Self::Reject => Action::reject(id, reason),
            Self::Complete => Action::complete(id),
            Self::Cancel => Action::cancel(id),
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Request id or a unique prefix of it
    id: String,

    /// Only apply the decision if the request's etag still matches
    ///
    /// The current etag is printed by 'desk show'.
    #[arg(long, value_name = "ETAG")]
    if_match: Option<String>,
}

impl Command {
    #[instrument(skip(self))]
    pub fn run(self, root: PathBuf, verb: Verb) -> anyhow::Result<()> {
        self.decide(root, verb, None)
    }

    fn decide(self, root: PathBuf, verb: Verb, reason: Option<String>) -> anyhow::Result<()> {
        let mut directory = super::open(root)?;
        let id = super::resolve(&directory, &self.id)?;

        let reason = match reason {
            None if verb == Verb::Reject
                && directory.config().require_rejection_reason
                && std::io::stdin().is_terminal() =>
            {
                Some(prompt_reason()?)
            }
            reason => reason,
        };

        let outcome = directory.transition(verb.action(id, reason), self.if_match.as_deref())?;

        match outcome {
            TransitionOutcome::Applied { to, .. } => {
                println!("{}", format!("Request {} is now {to}", id.short()).success());
            }
            TransitionOutcome::Unchanged(status) => {
                println!(
                    "{}",
                    format!("Request {} was already {status}", id.short()).dim()
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Reject {
    #[command(flatten)]
    target: Command,

    /// Why the request is being rejected
    #[arg(long, short = 'm')]
    reason: Option<String>,
}

impl Reject {
    #[instrument(skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        self.target.decide(root, Verb::Reject, self.reason)
    }
}

fn prompt_reason() -> anyhow::Result<String> {
    let reason = dialoguer::Input::<String>::new()
        .with_prompt("Reason for rejection")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("a reason is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use request_desk::{
        Directory, Employee, NewRequest, RequestData, RequestType, Status,
    };
    use tempfile::tempdir;

    use super::*;

    fn seed(root: &std::path::Path, request_type: RequestType) -> RequestId {
        let mut directory = Directory::new(root.to_path_buf()).init().unwrap();
        directory
            .add_request(NewRequest::new(
                Employee::new("Kiran Rao", "EMP-550", "Sales"),
                RequestData::empty(request_type),
            ))
            .unwrap()
            .id()
    }

    fn status(root: &std::path::Path, id: RequestId) -> Status {
        Directory::new(root.to_path_buf())
            .load_all()
            .unwrap()
            .store()
            .get(id)
            .unwrap()
            .status()
    }

    #[test]
    fn approve_by_prefix() {
        let tmp = tempdir().unwrap();
        let id = seed(tmp.path(), RequestType::Asset);

        Command::parse_from(["approve", id.short().as_str()])
            .run(tmp.path().to_path_buf(), Verb::Approve)
            .unwrap();
        assert_eq!(status(tmp.path(), id), Status::Approved);
    }

    #[test]
    fn reject_records_reason() {
        let tmp = tempdir().unwrap();
        let id = seed(tmp.path(), RequestType::Loan);

        Reject::parse_from(["reject", id.to_string().as_str(), "-m", "Over limit"])
            .run(tmp.path().to_path_buf())
            .unwrap();

        let directory = Directory::new(tmp.path().to_path_buf()).load_all().unwrap();
        let request = directory.store().get(id).unwrap();
        assert_eq!(request.status(), Status::Rejected);
        assert_eq!(request.reason(), Some("Over limit"));
    }

    #[test]
    fn conflicting_decision_fails_and_keeps_status() {
        let tmp = tempdir().unwrap();
        let id = seed(tmp.path(), RequestType::Loan);

        Command::parse_from(["approve", id.short().as_str()])
            .run(tmp.path().to_path_buf(), Verb::Approve)
            .unwrap();
        assert!(
            Reject::parse_from(["reject", id.short().as_str()])
                .run(tmp.path().to_path_buf())
                .is_err()
        );
        assert_eq!(status(tmp.path(), id), Status::Approved);
    }

    #[test]
    fn complete_rejects_non_interviews() {
        let tmp = tempdir().unwrap();
        let id = seed(tmp.path(), RequestType::Grievance);

        assert!(
            Command::parse_from(["complete", id.short().as_str()])
                .run(tmp.path().to_path_buf(), Verb::Complete)
                .is_err()
        );
        assert_eq!(status(tmp.path(), id), Status::Pending);
    }

    #[test]
    fn stale_etag_is_refused() {
        let tmp = tempdir().unwrap();
        let id = seed(tmp.path(), RequestType::Interview);

        assert!(
            Command::parse_from(["cancel", id.short().as_str(), "--if-match", "0000000000000000"])
                .run(tmp.path().to_path_buf(), Verb::Cancel)
                .is_err()
        );
        assert_eq!(status(tmp.path(), id), Status::Pending);
    }
}
