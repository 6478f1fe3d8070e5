use serde::Serialize;

use super::{Projection, text_or_na};
use crate::domain::{Request, RequestType};

/// Super-admin view of every request regardless of type.
#[derive(Debug, Clone, Copy)]
pub struct AllRequestsView;

/// The one-line summary shown for a request of any type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    /// Title, falling back to the description.
    pub summary: String,
}

impl Projection for AllRequestsView {
    type Detail = RequestSummary;

    const NAME: &'static str = "All requests";

    fn claims(_request_type: &RequestType) -> bool {
        true
    }

    fn detail(request: &Request) -> RequestSummary {
        RequestSummary {
            summary: text_or_na([Some(request.title()), Some(request.description())]),
        }
    }

    fn search_key(detail: &RequestSummary) -> &str {
        &detail.summary
    }
}
