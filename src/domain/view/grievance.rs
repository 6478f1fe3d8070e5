use serde::Serialize;

use super::{Projection, text_or_na};
use crate::domain::{Request, RequestData, RequestType, payload::GrievanceData};

/// HR view of grievances.
#[derive(Debug, Clone, Copy)]
pub struct GrievanceView;

/// Grievance fields as displayed to a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrievanceDetail {
    /// Category.
    pub category: String,
    /// Subject, falling back to the request title.
    pub subject: String,
    /// Person or team concerned.
    pub against: String,
    /// Incident date as `YYYY-MM-DD`.
    pub incident_date: String,
    /// Severity, falling back to the request priority.
    pub severity: String,
}

impl Projection for GrievanceView {
    type Detail = GrievanceDetail;

    const NAME: &'static str = "Grievances";

    fn claims(request_type: &RequestType) -> bool {
        *request_type == RequestType::Grievance
    }

    fn detail(request: &Request) -> GrievanceDetail {
        let fallback = GrievanceData::default();
        let data = match request.data() {
            RequestData::Grievance(data) => data,
            _ => &fallback,
        };

        let incident_date = data.incident_date.map(|d| d.format("%Y-%m-%d").to_string());
        let priority = request.priority().to_string();

        GrievanceDetail {
            category: text_or_na([data.category.as_deref()]),
            subject: text_or_na([
                data.subject.as_deref(),
                Some(request.title()),
                Some(request.description()),
            ]),
            against: text_or_na([data.against.as_deref()]),
            incident_date: text_or_na([incident_date.as_deref()]),
            severity: text_or_na([data.severity.as_deref(), Some(&priority)]),
        }
    }

    fn search_key(detail: &GrievanceDetail) -> &str {
        &detail.subject
    }
}
