use serde::Serialize;

use super::{Projection, text_or_na};
use crate::domain::{Request, RequestData, RequestType, payload::InterviewData};

/// Recruitment view of scheduled interviews.
#[derive(Debug, Clone, Copy)]
pub struct InterviewView;

/// Interview fields as displayed to a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewDetail {
    /// Candidate name.
    pub candidate_name: String,
    /// Position, falling back to the request title.
    pub position: String,
    /// Date as `YYYY-MM-DD`.
    pub interview_date: String,
    /// Time as entered.
    pub interview_time: String,
    /// Mode of interview.
    pub interview_mode: String,
    /// Panel members, comma separated.
    pub interviewers: String,
}

impl Projection for InterviewView {
    type Detail = InterviewDetail;

    const NAME: &'static str = "Interview schedule";

    fn claims(request_type: &RequestType) -> bool {
        *request_type == RequestType::Interview
    }

    fn detail(request: &Request) -> InterviewDetail {
        let fallback = InterviewData::default();
        let data = match request.data() {
            RequestData::Interview(data) => data,
            _ => &fallback,
        };

        let date = data.interview_date.map(|d| d.format("%Y-%m-%d").to_string());
        let interviewers = data.interviewers.as_ref().map(|names| {
            names
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        });

        InterviewDetail {
            candidate_name: text_or_na([data.candidate_name.as_deref()]),
            position: text_or_na([data.position.as_deref(), Some(request.title())]),
            interview_date: text_or_na([date.as_deref()]),
            interview_time: text_or_na([data.interview_time.as_deref()]),
            interview_mode: text_or_na([data.interview_mode.as_deref()]),
            interviewers: text_or_na([interviewers.as_deref()]),
        }
    }

    fn search_key(detail: &InterviewDetail) -> &str {
        &detail.candidate_name
    }
}
