use rust_decimal::Decimal;
use serde::Serialize;

use super::{Projection, text_or_na};
use crate::domain::{Request, RequestData, RequestType, payload::AssetData};

/// IT and admin view of asset requests.
#[derive(Debug, Clone, Copy)]
pub struct AssetView;

/// Asset fields as displayed to a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetail {
    /// Kind of asset.
    pub asset_type: String,
    /// Specification text.
    pub specifications: String,
    /// Units requested, or zero.
    pub quantity: u32,
    /// Justification, falling back to the request description.
    pub justification: String,
    /// Estimated cost, or zero.
    pub estimated_cost: Decimal,
}

impl Projection for AssetView {
    type Detail = AssetDetail;

    const NAME: &'static str = "Asset approvals";

    fn claims(request_type: &RequestType) -> bool {
        *request_type == RequestType::Asset
    }

    fn detail(request: &Request) -> AssetDetail {
        let fallback = AssetData::default();
        let data = match request.data() {
            RequestData::Asset(data) => data,
            _ => &fallback,
        };

        AssetDetail {
            asset_type: text_or_na([data.asset_type.as_deref(), Some(request.title())]),
            specifications: text_or_na([data.specifications.as_deref()]),
            quantity: data.quantity.unwrap_or_default(),
            justification: text_or_na([
                data.justification.as_deref(),
                Some(request.description()),
            ]),
            estimated_cost: data.estimated_cost.unwrap_or_default(),
        }
    }

    fn search_key(detail: &AssetDetail) -> &str {
        &detail.asset_type
    }
}
