//! Aggregate statistics over a snapshot of requests.
//!
//! Everything here is a pure function of the collection it is given and is
//! recomputed on demand.

use std::{collections::BTreeMap, fmt};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::{Request, RequestType, Status};

/// Status counts for a set of requests, plus the approved monetary total.
///
/// `pending + approved + rejected + closed == total` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    /// Number of requests counted.
    pub total: usize,
    /// Requests awaiting review.
    pub pending: usize,
    /// Approved requests.
    pub approved: usize,
    /// Rejected requests.
    pub rejected: usize,
    /// Completed or cancelled interviews.
    pub closed: usize,
    /// Sum of the monetary amount of approved requests.
    pub approved_amount: Decimal,
    /// Sum of the monetary amount of pending requests.
    pub pending_amount: Decimal,
}

impl ViewStats {
    /// Counts one request.
    ///
    /// Amount totals saturate at [`Decimal::MAX`] rather than overflow.
    pub fn record(&mut self, status: Status, amount: Option<Decimal>) {
        self.total += 1;
        let amount = amount.unwrap_or_default();
        match status {
            Status::Pending => {
                self.pending += 1;
                self.pending_amount = self.pending_amount.saturating_add(amount);
            }
            Status::Approved => {
                self.approved += 1;
                self.approved_amount = self.approved_amount.saturating_add(amount);
            }
            Status::Rejected => self.rejected += 1,
            Status::Completed | Status::Cancelled => self.closed += 1,
        }
    }

    /// Requests that reached a terminal status.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.approved + self.rejected + self.closed
    }
}

impl<'a> FromIterator<&'a Request> for ViewStats {
    fn from_iter<I: IntoIterator<Item = &'a Request>>(iter: I) -> Self {
        let mut stats = Self::default();
        for request in iter {
            stats.record(request.status(), request.amount());
        }
        stats
    }
}

/// Summary tiles across every request type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Statistics per request type, in type order.
    pub by_type: BTreeMap<RequestType, ViewStats>,
    /// Statistics over the whole collection.
    pub overall: ViewStats,
}

impl Dashboard {
    /// Reduces a snapshot into per-type and overall statistics.
    #[must_use]
    pub fn compute(requests: &[Request]) -> Self {
        let mut dashboard = Self::default();
        for request in requests {
            let status = request.status();
            let amount = request.amount();
            dashboard
                .by_type
                .entry(request.request_type())
                .or_default()
                .record(status, amount);
            dashboard.overall.record(status, amount);
        }
        dashboard
    }

    /// Statistics for one type; all zero if no request of that type exists.
    #[must_use]
    pub fn of_type(&self, request_type: &RequestType) -> ViewStats {
        self.by_type.get(request_type).cloned().unwrap_or_default()
    }
}

const LAKH: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);
const CRORE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// How monetary amounts are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmountStyle {
    /// Lakh and crore units with one decimal place, e.g. `1.2 Cr`.
    #[default]
    Compact,
    /// Full amount with Indian digit grouping, e.g. `12,00,000`.
    Grouped,
}

/// A monetary amount paired with its display settings.
#[derive(Debug, Clone, Copy)]
pub struct Money<'a> {
    amount: Decimal,
    symbol: &'a str,
    style: AmountStyle,
}

impl<'a> Money<'a> {
    /// Creates a displayable amount.
    #[must_use]
    pub const fn new(amount: Decimal, symbol: &'a str, style: AmountStyle) -> Self {
        Self {
            amount,
            symbol,
            style,
        }
    }
}

impl fmt::Display for Money<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = match self.style {
            AmountStyle::Compact => compact(self.amount),
            AmountStyle::Grouped => grouped(self.amount),
        };
        write!(f, "{}{rendered}", self.symbol)
    }
}

/// Scales an amount to crore (`>= 10^7`) or lakh (`>= 10^5`) with one decimal
/// place, rounding half away from zero. Smaller amounts are grouped in full.
#[must_use]
pub fn compact(amount: Decimal) -> String {
    let magnitude = amount.abs();
    let (unit, divisor) = if magnitude >= CRORE {
        ("Cr", CRORE)
    } else if magnitude >= LAKH {
        ("L", LAKH)
    } else {
        return grouped(amount);
    };

    let scaled = (amount / divisor).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{scaled:.1} {unit}")
}

/// Formats an amount with Indian digit grouping (`12,34,567.5`).
///
/// Amounts are rounded to two decimal places; trailing zeros are dropped.
#[must_use]
pub fn grouped(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut groups = Vec::new();
    let (mut head, tail) = integer.split_at(integer.len().saturating_sub(3));
    while head.len() > 2 {
        let (rest, group) = head.split_at(head.len() - 2);
        groups.push(group);
        head = rest;
    }
    if !head.is_empty() {
        groups.push(head);
    }
    groups.reverse();
    groups.push(tail);

    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let integer = groups.join(",");
    if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use test_case::test_case;

    use super::*;
    use crate::domain::{Employee, NewRequest, RequestData, RequestId, Transition};

    fn request(request_type: RequestType, amount: u64, transition: Option<Transition>) -> Request {
        let mut request = Request::new(
            NewRequest::new(
                Employee::new("Anita Desai", "EMP-310", "HR"),
                RequestData::from_parts(request_type, json!({"amount": amount})),
            ),
            RequestId::new(),
            Utc::now(),
        );
        if let Some(transition) = transition {
            request.apply(transition, Utc::now()).unwrap();
        }
        request
    }

    #[test_case(Decimal::from(0), "0")]
    #[test_case(Decimal::from(999), "999")]
    #[test_case(Decimal::from(1_000), "1,000")]
    #[test_case(Decimal::from(99_999), "99,999")]
    #[test_case(Decimal::new(1_234_567_5, 1), "12,34,567.5")]
    #[test_case(Decimal::from(-45_000), "-45,000")]
    fn groups_indian_style(amount: Decimal, expected: &str) {
        assert_eq!(grouped(amount), expected);
    }

    #[test_case(Decimal::from(100_000), "1.0 L")]
    #[test_case(Decimal::from(350_000), "3.5 L")]
    #[test_case(Decimal::from(9_999_999), "100.0 L")]
    #[test_case(Decimal::from(10_000_000), "1.0 Cr")]
    #[test_case(Decimal::from(12_500_000), "1.3 Cr")]
    #[test_case(Decimal::from(12_000_000), "1.2 Cr")]
    #[test_case(Decimal::from(45_000), "45,000")]
    fn compacts_to_lakh_and_crore(amount: Decimal, expected: &str) {
        assert_eq!(compact(amount), expected);
    }

    #[test]
    fn money_prefixes_symbol() {
        let money = Money::new(Decimal::from(300_000), "₹", AmountStyle::Compact);
        assert_eq!(money.to_string(), "₹3.0 L");
        let money = Money::new(Decimal::from(300_000), "Rs ", AmountStyle::Grouped);
        assert_eq!(money.to_string(), "Rs 3,00,000");
    }

    #[test]
    fn counts_add_up_to_total() {
        let requests = vec![
            request(RequestType::Loan, 1, None),
            request(RequestType::Loan, 2, Some(Transition::Approve)),
            request(RequestType::Loan, 3, Some(Transition::Reject { reason: None })),
            request(RequestType::Interview, 0, Some(Transition::Cancel)),
        ];
        let stats: ViewStats = requests.iter().collect();
        assert_eq!(stats.total, 4);
        assert_eq!(
            stats.pending + stats.approved + stats.rejected + stats.closed,
            stats.total
        );
        assert_eq!(stats.processed(), 3);
    }

    #[test]
    fn approved_amount_ignores_other_statuses() {
        let requests = vec![
            request(RequestType::Loan, 200_000, None),
            request(RequestType::Loan, 100_000, Some(Transition::Approve)),
            request(RequestType::Loan, 50_000, Some(Transition::Reject { reason: None })),
        ];
        let stats: ViewStats = requests.iter().collect();
        assert_eq!(stats.approved_amount, Decimal::from(100_000));
        assert_eq!(stats.pending_amount, Decimal::from(200_000));
    }

    #[test]
    fn approved_amount_saturates_instead_of_overflowing() {
        let huge = || {
            let mut request = Request::new(
                NewRequest::new(
                    Employee::new("Anita Desai", "EMP-310", "HR"),
                    RequestData::from_parts(
                        RequestType::Loan,
                        json!({"amount": "50000000000000000000000000000"}),
                    ),
                ),
                RequestId::new(),
                Utc::now(),
            );
            request.apply(Transition::Approve, Utc::now()).unwrap();
            request
        };
        let requests = vec![huge(), huge()];

        let dashboard = Dashboard::compute(&requests);
        assert_eq!(dashboard.overall.approved, 2);
        assert_eq!(dashboard.overall.approved_amount, Decimal::MAX);

        let stats: ViewStats = requests.iter().collect();
        assert_eq!(stats.approved_amount, Decimal::MAX);
        assert!(!compact(stats.approved_amount).is_empty());
    }

    #[test]
    fn dashboard_groups_by_type() {
        let requests = vec![
            request(RequestType::Loan, 100_000, Some(Transition::Approve)),
            request(RequestType::Reimbursement, 2_500, Some(Transition::Approve)),
            request(RequestType::Asset, 0, None),
        ];
        let dashboard = Dashboard::compute(&requests);

        assert_eq!(dashboard.overall.total, 3);
        assert_eq!(dashboard.overall.approved_amount, Decimal::from(102_500));
        assert_eq!(dashboard.of_type(&RequestType::Loan).approved, 1);
        assert_eq!(dashboard.of_type(&RequestType::Asset).pending, 1);
        assert_eq!(dashboard.of_type(&RequestType::Grievance), ViewStats::default());
    }
}
