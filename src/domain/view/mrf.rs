use rust_decimal::Decimal;
use serde::Serialize;

use super::{Projection, text_or_na};
use crate::domain::{Request, RequestData, RequestType, payload::MrfData};

/// HR view of manpower requisition forms.
#[derive(Debug, Clone, Copy)]
pub struct MrfView;

/// MRF fields as displayed to a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MrfDetail {
    /// Position, falling back to the request title.
    pub position: String,
    /// People required, or zero.
    pub headcount: u32,
    /// Experience required.
    pub experience: String,
    /// Budget, or zero.
    pub budget: Decimal,
    /// Employment type.
    pub employment_type: String,
    /// Justification, falling back to the request description.
    pub justification: String,
}

impl Projection for MrfView {
    type Detail = MrfDetail;

    const NAME: &'static str = "Manpower requisitions";

    fn claims(request_type: &RequestType) -> bool {
        *request_type == RequestType::Mrf
    }

    fn detail(request: &Request) -> MrfDetail {
        let fallback = MrfData::default();
        let data = match request.data() {
            RequestData::Mrf(data) => data,
            _ => &fallback,
        };

        MrfDetail {
            position: text_or_na([data.position.as_deref(), Some(request.title())]),
            headcount: data.headcount.unwrap_or_default(),
            experience: text_or_na([data.experience.as_deref()]),
            budget: data.budget.unwrap_or_default(),
            employment_type: text_or_na([data.employment_type.as_deref()]),
            justification: text_or_na([
                data.justification.as_deref(),
                Some(request.description()),
            ]),
        }
    }

    fn search_key(detail: &MrfDetail) -> &str {
        &detail.position
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{Employee, NewRequest, RequestStore, view::project};

    #[test]
    fn position_falls_back_to_title() {
        let mut store = RequestStore::default();
        store.add(
            NewRequest::new(
                Employee::new("Leela Menon", "EMP-330", "Engineering"),
                RequestData::from_parts(RequestType::Mrf, json!({"headcount": "3"})),
            )
            .title("QA Engineers"),
        );

        let board = project::<MrfView>(store.requests());
        let detail = &board.rows()[0].detail;
        assert_eq!(detail.position, "QA Engineers");
        // "3" is not a number, so the headcount degrades to zero
        assert_eq!(detail.headcount, 0);
        assert_eq!(board.search("qa eng").len(), 1);
    }
}
