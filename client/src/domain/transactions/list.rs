//! Status filtering and closing-date ordering for transaction lists.

use std::cmp::Reverse;

use chrono::NaiveDate;

use super::{Transaction, TransactionStatus};

/// Select the transactions matching `status`, ordered for display.
///
/// Active and under-contract lists show the next deal to close first
/// (ascending closing date); the closed list shows the most recent closing
/// first (descending). Transactions without a closing date sort last under
/// either direction.
///
/// Pure and synchronous; callers fetch, then slice per facet.
pub fn filter_and_sort(
    transactions: &[Transaction],
    status: TransactionStatus,
) -> Vec<&Transaction> {
    let mut matching: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.status == status)
        .collect();

    match status {
        TransactionStatus::Active | TransactionStatus::UnderContract => {
            matching.sort_by_key(|t| (t.closing_date.is_none(), t.closing_date));
        }
        TransactionStatus::Closed => {
            matching.sort_by_key(|t| (t.closing_date.is_none(), Reverse(t.closing_date)));
        }
    }
    matching
}

/// Render a closing or contract date as `MM/DD/YY`, or `N/A` when absent.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use client::domain::transactions::format_short_date;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1);
/// assert_eq!(format_short_date(date), "03/01/25");
/// assert_eq!(format_short_date(None), "N/A");
/// ```
pub fn format_short_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%m/%d/%y").to_string(),
        None => "N/A".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    //! Ordering coverage for the list transform.

    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::transactions::ClientType;

    fn transaction(
        label: &str,
        status: TransactionStatus,
        closing: Option<(i32, u32, u32)>,
    ) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            address: format!("{label} Street"),
            client_last_name: label.to_owned(),
            client_type: ClientType::Buyer,
            status,
            under_contract_date: None,
            sale_price: None,
            closing_date: closing
                .map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date")),
            gross_commission_income: None,
            image_url: None,
            created_at: Utc
                .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .expect("valid time"),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction("A", TransactionStatus::Active, Some((2025, 3, 1))),
            transaction("B", TransactionStatus::Active, Some((2025, 1, 1))),
            transaction("C", TransactionStatus::Closed, Some((2024, 6, 1))),
            transaction("D", TransactionStatus::Closed, Some((2024, 12, 1))),
        ]
    }

    fn labels(listed: &[&Transaction]) -> Vec<String> {
        listed
            .iter()
            .map(|t| t.client_last_name.clone())
            .collect()
    }

    #[test]
    fn active_facet_orders_soonest_closing_first() {
        let all = sample();
        let listed = filter_and_sort(&all, TransactionStatus::Active);
        assert_eq!(labels(&listed), ["B", "A"]);
    }

    #[test]
    fn closed_facet_orders_latest_closing_first() {
        let all = sample();
        let listed = filter_and_sort(&all, TransactionStatus::Closed);
        assert_eq!(labels(&listed), ["D", "C"]);
    }

    #[test]
    fn other_statuses_are_excluded_from_the_facet() {
        let all = sample();
        let listed = filter_and_sort(&all, TransactionStatus::UnderContract);
        assert!(listed.is_empty());
    }

    #[test]
    fn missing_closing_dates_sort_last_in_both_directions() {
        let all = vec![
            transaction("Dated", TransactionStatus::Active, Some((2025, 2, 1))),
            transaction("Blank", TransactionStatus::Active, None),
            transaction("Later", TransactionStatus::Active, Some((2025, 4, 1))),
        ];
        let active = filter_and_sort(&all, TransactionStatus::Active);
        assert_eq!(labels(&active), ["Dated", "Later", "Blank"]);

        let all = vec![
            transaction("Blank", TransactionStatus::Closed, None),
            transaction("Old", TransactionStatus::Closed, Some((2024, 1, 1))),
            transaction("New", TransactionStatus::Closed, Some((2024, 9, 1))),
        ];
        let closed = filter_and_sort(&all, TransactionStatus::Closed);
        assert_eq!(labels(&closed), ["New", "Old", "Blank"]);
    }
}
