//! Type-specific request payloads.
//!
//! Each [`RequestType`] owns exactly one payload shape. Every payload field is
//! optional: a field that is missing, `null`, or of the wrong shape is read as
//! `None` so that projections can substitute their fallbacks instead of
//! failing the whole request.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::domain::request_type::{RequestType, TypeTag};

/// Reads a field, mapping anything that does not fit `T` to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(field) => Ok(Some(field)),
        Err(e) => {
            tracing::debug!("Ignoring malformed payload field: {e}");
            Ok(None)
        }
    }
}

macro_rules! payload {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(
                    default,
                    deserialize_with = "lenient",
                    skip_serializing_if = "Option::is_none"
                )]
                pub $field: Option<$ty>,
            )*
        }
    };
}

payload! {
    /// Payload of a `loan` request.
    LoanData {
        /// Principal requested.
        amount: Decimal,
        /// Repayment tenure in months.
        tenure: u32,
        /// Monthly instalment.
        emi: Decimal,
        /// What the loan is for.
        purpose: String,
        /// Loan product, e.g. "personal" or "salary advance".
        loan_type: String,
    }
}

payload! {
    /// Payload of an `asset` request.
    AssetData {
        /// Kind of asset, e.g. "Laptop".
        asset_type: String,
        /// Free-text specification.
        specifications: String,
        /// Number of units.
        quantity: u32,
        /// Business justification.
        justification: String,
        /// Estimated cost of the allocation.
        estimated_cost: Decimal,
    }
}

payload! {
    /// Payload of an `interview` request.
    InterviewData {
        /// Candidate being interviewed.
        candidate_name: String,
        /// Position the candidate applied for.
        position: String,
        /// Scheduled date.
        interview_date: NaiveDate,
        /// Scheduled time, as entered (e.g. "10:30 AM").
        interview_time: String,
        /// "online", "in-person", "phone"...
        interview_mode: String,
        /// Panel members.
        interviewers: Vec<String>,
    }
}

payload! {
    /// Payload of an `mrf` (manpower requisition) request.
    MrfData {
        /// Position to be filled.
        position: String,
        /// Number of people required.
        headcount: u32,
        /// Required experience, as entered.
        experience: String,
        /// Approved budget for the positions.
        budget: Decimal,
        /// "permanent", "contract"...
        employment_type: String,
        /// Why the positions are needed.
        justification: String,
    }
}

payload! {
    /// Payload of a `grievance` request.
    GrievanceData {
        /// Grievance category.
        category: String,
        /// Short subject line.
        subject: String,
        /// Person or team the grievance is raised against.
        against: String,
        /// When the incident happened.
        incident_date: NaiveDate,
        /// Reported severity.
        severity: String,
    }
}

payload! {
    /// Payload of a `leave` request.
    LeaveData {
        /// "casual", "sick", "earned"...
        leave_type: String,
        /// First day of leave.
        from_date: NaiveDate,
        /// Last day of leave.
        to_date: NaiveDate,
        /// Number of days, possibly fractional.
        days: Decimal,
        /// Reason given.
        reason: String,
    }
}

payload! {
    /// Payload of a `document` request.
    DocumentData {
        /// Letter or certificate requested.
        document_type: String,
        /// What the document is needed for.
        purpose: String,
        /// Number of copies.
        copies: u32,
    }
}

payload! {
    /// Payload of a `training` request.
    TrainingData {
        /// Programme name.
        program: String,
        /// Training provider.
        provider: String,
        /// Start date.
        start_date: NaiveDate,
        /// Course fee.
        cost: Decimal,
    }
}

payload! {
    /// Payload of a `reimbursement` request.
    ReimbursementData {
        /// "travel", "meals"...
        expense_type: String,
        /// Amount claimed.
        amount: Decimal,
        /// Date on the bill.
        bill_date: NaiveDate,
        /// Bill or invoice number.
        bill_number: String,
    }
}

payload! {
    /// Payload of an `overtime` request.
    OvertimeData {
        /// Day the overtime was worked.
        date: NaiveDate,
        /// Hours claimed.
        hours: Decimal,
        /// Reason given.
        reason: String,
    }
}

payload! {
    /// Payload of a `uniform` request.
    UniformData {
        /// Item requested.
        item: String,
        /// Size.
        size: String,
        /// Number of units.
        quantity: u32,
    }
}

/// The variant-specific payload attached to a request.
///
/// The request type is derived from the variant, so a payload can never
/// disagree with its discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestData {
    /// Employee loan or salary advance.
    Loan(LoanData),
    /// IT or office asset allocation.
    Asset(AssetData),
    /// Candidate interview scheduling.
    Interview(InterviewData),
    /// Manpower requisition.
    Mrf(MrfData),
    /// Employee grievance.
    Grievance(GrievanceData),
    /// Leave of absence.
    Leave(LeaveData),
    /// Letter or certificate request.
    Document(DocumentData),
    /// Training or course enrolment.
    Training(TrainingData),
    /// Expense reimbursement.
    Reimbursement(ReimbursementData),
    /// Overtime claim.
    Overtime(OvertimeData),
    /// Uniform issue.
    Uniform(UniformData),
    /// A payload for a type without a dedicated shape, kept verbatim.
    Other {
        /// The unrecognised type tag.
        request_type: TypeTag,
        /// The payload object as submitted.
        fields: Map<String, Value>,
    },
}

fn decode<T: DeserializeOwned + Default>(request_type: &RequestType, data: Value) -> T {
    serde_json::from_value(data).unwrap_or_else(|e| {
        tracing::debug!("Ignoring malformed {request_type} payload: {e}");
        T::default()
    })
}

impl RequestData {
    /// Builds the payload for `request_type` from a loosely-typed JSON value.
    ///
    /// This never fails. Missing or malformed fields are left empty, and a
    /// value that is not an object is treated as an empty object.
    #[must_use]
    pub fn from_parts(request_type: RequestType, data: Value) -> Self {
        let data = if data.is_object() {
            data
        } else {
            if !data.is_null() {
                tracing::debug!("Payload for {request_type} is not an object, ignoring it");
            }
            Value::Object(Map::new())
        };

        match request_type {
            RequestType::Loan => Self::Loan(decode(&request_type, data)),
            RequestType::Asset => Self::Asset(decode(&request_type, data)),
            RequestType::Interview => Self::Interview(decode(&request_type, data)),
            RequestType::Mrf => Self::Mrf(decode(&request_type, data)),
            RequestType::Grievance => Self::Grievance(decode(&request_type, data)),
            RequestType::Leave => Self::Leave(decode(&request_type, data)),
            RequestType::Document => Self::Document(decode(&request_type, data)),
            RequestType::Training => Self::Training(decode(&request_type, data)),
            RequestType::Reimbursement => Self::Reimbursement(decode(&request_type, data)),
            RequestType::Overtime => Self::Overtime(decode(&request_type, data)),
            RequestType::Uniform => Self::Uniform(decode(&request_type, data)),
            RequestType::Other(tag) => Self::Other {
                request_type: tag,
                fields: match data {
                    Value::Object(fields) => fields,
                    _ => Map::new(),
                },
            },
        }
    }

    /// An empty payload for the given type.
    #[must_use]
    pub fn empty(request_type: RequestType) -> Self {
        Self::from_parts(request_type, Value::Null)
    }

    /// The discriminator of this payload.
    #[must_use]
    pub fn request_type(&self) -> RequestType {
        match self {
            Self::Loan(_) => RequestType::Loan,
            Self::Asset(_) => RequestType::Asset,
            Self::Interview(_) => RequestType::Interview,
            Self::Mrf(_) => RequestType::Mrf,
            Self::Grievance(_) => RequestType::Grievance,
            Self::Leave(_) => RequestType::Leave,
            Self::Document(_) => RequestType::Document,
            Self::Training(_) => RequestType::Training,
            Self::Reimbursement(_) => RequestType::Reimbursement,
            Self::Overtime(_) => RequestType::Overtime,
            Self::Uniform(_) => RequestType::Uniform,
            Self::Other { request_type, .. } => RequestType::Other(request_type.clone()),
        }
    }

    /// The payload as a JSON object.
    ///
    /// # Panics
    ///
    /// Panics if a payload fails to serialize, which cannot happen for these
    /// plain data types.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let value = match self {
            Self::Loan(data) => serde_json::to_value(data),
            Self::Asset(data) => serde_json::to_value(data),
            Self::Interview(data) => serde_json::to_value(data),
            Self::Mrf(data) => serde_json::to_value(data),
            Self::Grievance(data) => serde_json::to_value(data),
            Self::Leave(data) => serde_json::to_value(data),
            Self::Document(data) => serde_json::to_value(data),
            Self::Training(data) => serde_json::to_value(data),
            Self::Reimbursement(data) => serde_json::to_value(data),
            Self::Overtime(data) => serde_json::to_value(data),
            Self::Uniform(data) => serde_json::to_value(data),
            Self::Other { fields, .. } => Ok(Value::Object(fields.clone())),
        };
        value.expect("this must never fail")
    }

    /// The monetary amount carried by the payload, if the type has one.
    ///
    /// Untyped payloads contribute a numeric (or numeric string) `amount` key.
    #[must_use]
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Loan(data) => data.amount,
            Self::Reimbursement(data) => data.amount,
            Self::Training(data) => data.cost,
            Self::Asset(data) => data.estimated_cost,
            Self::Mrf(data) => data.budget,
            Self::Other { fields, .. } => fields
                .get("amount")
                .and_then(|amount| serde_json::from_value(amount.clone()).ok()),
            Self::Interview(_)
            | Self::Grievance(_)
            | Self::Leave(_)
            | Self::Document(_)
            | Self::Overtime(_)
            | Self::Uniform(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    #[test]
    fn loan_payload_reads_camel_case_fields() {
        let data = RequestData::from_parts(
            RequestType::Loan,
            json!({"amount": 200000, "tenure": 24, "emi": "9500.50", "purpose": "Home repair", "loanType": "personal"}),
        );

        let RequestData::Loan(loan) = data else {
            panic!("expected a loan payload");
        };
        assert_eq!(loan.amount, Some(Decimal::from(200_000)));
        assert_eq!(loan.tenure, Some(24));
        assert_eq!(loan.emi, Some(Decimal::new(950_050, 2)));
        assert_eq!(loan.purpose.as_deref(), Some("Home repair"));
        assert_eq!(loan.loan_type.as_deref(), Some("personal"));
    }

    #[test]
    fn malformed_fields_degrade_to_none() {
        let data = RequestData::from_parts(
            RequestType::Asset,
            json!({"assetType": "Laptop", "quantity": "lots", "estimatedCost": {"nested": true}}),
        );

        let RequestData::Asset(asset) = data else {
            panic!("expected an asset payload");
        };
        assert_eq!(asset.asset_type.as_deref(), Some("Laptop"));
        assert_eq!(asset.quantity, None);
        assert_eq!(asset.estimated_cost, None);
    }

    #[test]
    fn non_object_payload_is_treated_as_empty() {
        let data = RequestData::from_parts(RequestType::Interview, json!("not an object"));
        assert_eq!(data, RequestData::Interview(InterviewData::default()));
    }

    #[test]
    fn other_payload_is_kept_verbatim() {
        let request_type: RequestType = "insurance".parse().unwrap();
        let fields = json!({"policyNumber": "POL-7781", "amount": 12500});
        let data = RequestData::from_parts(request_type.clone(), fields.clone());

        assert_eq!(data.request_type(), request_type);
        assert_eq!(data.to_value(), fields);
        assert_eq!(data.amount(), Some(Decimal::from(12_500)));
    }

    #[test]
    fn to_value_omits_missing_fields() {
        let data = RequestData::Loan(LoanData {
            amount: Some(Decimal::from(5000)),
            ..LoanData::default()
        });
        let value = data.to_value();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("amount"));
    }

    #[test]
    fn payload_survives_a_value_round_trip() {
        let original = RequestData::Interview(InterviewData {
            candidate_name: Some("Asha Rao".to_string()),
            interview_date: NaiveDate::from_ymd_opt(2024, 3, 14),
            interviewers: Some(vec!["K. Iyer".to_string(), "M. Shah".to_string()]),
            ..InterviewData::default()
        });
        let restored = RequestData::from_parts(RequestType::Interview, original.to_value());
        assert_eq!(restored, original);
    }

    #[test]
    fn amount_is_none_for_non_monetary_types() {
        assert_eq!(RequestData::empty(RequestType::Grievance).amount(), None);
        assert_eq!(RequestData::empty(RequestType::Loan).amount(), None);
    }
}
