use rust_decimal::Decimal;
use serde::Serialize;

use super::{Projection, text_or_na};
use crate::domain::{Request, RequestData, RequestType, payload::LoanData};

/// Finance view of loan requests.
#[derive(Debug, Clone, Copy)]
pub struct LoanView;

/// Loan fields as displayed to a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetail {
    /// Principal requested, or zero.
    pub amount: Decimal,
    /// Tenure in months, or zero.
    pub tenure: u32,
    /// Monthly instalment, or zero.
    pub emi: Decimal,
    /// Purpose, falling back to the request description.
    pub purpose: String,
    /// Loan product.
    pub loan_type: String,
}

impl Projection for LoanView {
    type Detail = LoanDetail;

    const NAME: &'static str = "Loan approvals";

    fn claims(request_type: &RequestType) -> bool {
        *request_type == RequestType::Loan
    }

    fn detail(request: &Request) -> LoanDetail {
        let fallback = LoanData::default();
        let data = match request.data() {
            RequestData::Loan(data) => data,
            _ => &fallback,
        };

        LoanDetail {
            amount: data.amount.unwrap_or_default(),
            tenure: data.tenure.unwrap_or_default(),
            emi: data.emi.unwrap_or_default(),
            purpose: text_or_na([data.purpose.as_deref(), Some(request.description())]),
            loan_type: text_or_na([data.loan_type.as_deref()]),
        }
    }

    fn search_key(detail: &LoanDetail) -> &str {
        &detail.purpose
    }
}
