//! Goal aggregate: per-year performance targets and actuals.
//!
//! One goal record exists per (agent, year). The *target* side is what the
//! agent typed into the goal form; the *actual* side is recomputed by the
//! platform whenever transactions change and is read-only here. Dashboards
//! compare the two through [`Goal::facet_totals`].

mod progress;
mod service;

pub use self::progress::{
    MetricProgress, ProgressBand, format_currency, format_volume, progress_percent, third_marks,
};
pub use self::service::{GoalDashboard, GoalService};

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::validation::{parse_count, parse_money};

/// Dashboard subdivision of goal metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facet {
    /// Combined buyer and seller figures.
    #[default]
    Total,
    /// Buyer-side figures only.
    Buyers,
    /// Seller-side figures only.
    Sellers,
}

/// One stored goal record.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    /// Stable record identifier.
    pub id: i64,
    /// Owning agent account.
    pub user_id: Uuid,
    /// Calendar year the goals apply to.
    pub year: i32,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Target closed-transaction count, buyer side.
    pub buyer_transactions_closed: Option<u32>,
    /// Target closed-transaction count, seller side.
    pub seller_transactions_closed: Option<u32>,
    /// Target closed-transaction count, combined.
    pub total_transactions_closed: Option<u32>,
    /// Target sales volume, buyer side.
    pub sales_volume_buyers: Option<f64>,
    /// Target sales volume, seller side.
    pub sales_volume_sellers: Option<f64>,
    /// Target sales volume, combined.
    pub total_sales_volume: Option<f64>,
    /// Target commission income, buyer side.
    pub commission_income_buyers: Option<f64>,
    /// Target commission income, seller side.
    pub commission_income_sellers: Option<f64>,
    /// Target commission income, combined.
    pub total_commission_income: Option<f64>,

    /// Actual closed-transaction count, buyer side.
    pub actual_buyer_transactions_closed: Option<u32>,
    /// Actual closed-transaction count, seller side.
    pub actual_seller_transactions_closed: Option<u32>,
    /// Actual closed-transaction count, combined.
    pub actual_total_transactions_closed: Option<u32>,
    /// Actual sales volume, buyer side.
    pub actual_sales_volume_buyers: Option<f64>,
    /// Actual sales volume, seller side.
    pub actual_sales_volume_sellers: Option<f64>,
    /// Actual sales volume, combined.
    pub actual_total_sales_volume: Option<f64>,
    /// Actual commission income, buyer side.
    pub actual_commission_income_buyers: Option<f64>,
    /// Actual commission income, seller side.
    pub actual_commission_income_sellers: Option<f64>,
    /// Actual commission income, combined.
    pub actual_total_commission_income: Option<f64>,
}

/// Current/target value pairs for one facet, absent fields read as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacetTotals {
    /// Closed-transaction count: (actual, target).
    pub closed_transactions: (f64, f64),
    /// Commission income: (actual, target).
    pub gross_income: (f64, f64),
    /// Sales volume: (actual, target).
    pub closed_volume: (f64, f64),
}

impl Goal {
    /// Extract the (actual, target) pairs backing the selected facet.
    pub fn facet_totals(&self, facet: Facet) -> FacetTotals {
        let count = |value: Option<u32>| f64::from(value.unwrap_or(0));
        let money = |value: Option<f64>| value.unwrap_or(0.0);
        match facet {
            Facet::Total => FacetTotals {
                closed_transactions: (
                    count(self.actual_total_transactions_closed),
                    count(self.total_transactions_closed),
                ),
                gross_income: (
                    money(self.actual_total_commission_income),
                    money(self.total_commission_income),
                ),
                closed_volume: (
                    money(self.actual_total_sales_volume),
                    money(self.total_sales_volume),
                ),
            },
            Facet::Buyers => FacetTotals {
                closed_transactions: (
                    count(self.actual_buyer_transactions_closed),
                    count(self.buyer_transactions_closed),
                ),
                gross_income: (
                    money(self.actual_commission_income_buyers),
                    money(self.commission_income_buyers),
                ),
                closed_volume: (
                    money(self.actual_sales_volume_buyers),
                    money(self.sales_volume_buyers),
                ),
            },
            Facet::Sellers => FacetTotals {
                closed_transactions: (
                    count(self.actual_seller_transactions_closed),
                    count(self.seller_transactions_closed),
                ),
                gross_income: (
                    money(self.actual_commission_income_sellers),
                    money(self.commission_income_sellers),
                ),
                closed_volume: (
                    money(self.actual_sales_volume_sellers),
                    money(self.sales_volume_sellers),
                ),
            },
        }
    }

    /// Build a goal carrying only the targets of `record`; actuals start
    /// empty. Used by fixtures and by adapters echoing an insert.
    pub fn from_targets(id: i64, record: &NewGoal) -> Self {
        Self {
            id,
            user_id: record.user_id,
            year: record.year,
            created_at: Utc::now(),
            buyer_transactions_closed: record.buyer_transactions_closed,
            seller_transactions_closed: record.seller_transactions_closed,
            total_transactions_closed: record.total_transactions_closed,
            sales_volume_buyers: record.sales_volume_buyers,
            sales_volume_sellers: record.sales_volume_sellers,
            total_sales_volume: record.total_sales_volume,
            commission_income_buyers: record.commission_income_buyers,
            commission_income_sellers: record.commission_income_sellers,
            total_commission_income: record.total_commission_income,
            actual_buyer_transactions_closed: None,
            actual_seller_transactions_closed: None,
            actual_total_transactions_closed: None,
            actual_sales_volume_buyers: None,
            actual_sales_volume_sellers: None,
            actual_total_sales_volume: None,
            actual_commission_income_buyers: None,
            actual_commission_income_sellers: None,
            actual_total_commission_income: None,
        }
    }
}

/// Validated target payload accepted by the goal store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    /// Owning agent account.
    pub user_id: Uuid,
    /// Calendar year the goals apply to.
    pub year: i32,
    /// Target closed-transaction count, buyer side.
    pub buyer_transactions_closed: Option<u32>,
    /// Target closed-transaction count, seller side.
    pub seller_transactions_closed: Option<u32>,
    /// Target closed-transaction count, combined.
    pub total_transactions_closed: Option<u32>,
    /// Target sales volume, buyer side.
    pub sales_volume_buyers: Option<f64>,
    /// Target sales volume, seller side.
    pub sales_volume_sellers: Option<f64>,
    /// Target sales volume, combined.
    pub total_sales_volume: Option<f64>,
    /// Target commission income, buyer side.
    pub commission_income_buyers: Option<f64>,
    /// Target commission income, seller side.
    pub commission_income_sellers: Option<f64>,
    /// Target commission income, combined.
    pub total_commission_income: Option<f64>,
}

/// Raw goal-form state; all numeric fields arrive as typed text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalForm {
    /// Record being edited, or `None` when creating.
    pub editing_id: Option<i64>,
    /// Goal year field.
    pub year: String,
    /// Buyer closed-transaction target field.
    pub buyer_transactions_closed: String,
    /// Seller closed-transaction target field.
    pub seller_transactions_closed: String,
    /// Combined closed-transaction target field.
    pub total_transactions_closed: String,
    /// Buyer sales-volume target field.
    pub sales_volume_buyers: String,
    /// Seller sales-volume target field.
    pub sales_volume_sellers: String,
    /// Combined sales-volume target field.
    pub total_sales_volume: String,
    /// Buyer commission target field.
    pub commission_income_buyers: String,
    /// Seller commission target field.
    pub commission_income_sellers: String,
    /// Combined commission target field.
    pub total_commission_income: String,
}

impl GoalForm {
    /// Parse and validate the form against `current_year`, collecting every
    /// violation into one error.
    pub fn validate(&self, user_id: Uuid, current_year: i32) -> Result<NewGoal, Error> {
        let mut violations = Vec::new();

        let year = match self.year.trim().parse::<i32>() {
            Ok(year) if (current_year - 5..=current_year + 10).contains(&year) => year,
            _ => {
                violations.push(format!(
                    "Goal year must be a valid year between {} and {}",
                    current_year - 5,
                    current_year + 10
                ));
                current_year
            }
        };

        let mut count = |raw: &str, label: &str| match parse_count(raw) {
            Ok(value) => value,
            Err(_) => {
                violations.push(format!("{label} must be a non-negative number"));
                None
            }
        };
        let buyer_transactions_closed =
            count(&self.buyer_transactions_closed, "Buyer transactions closed");
        let seller_transactions_closed = count(
            &self.seller_transactions_closed,
            "Seller transactions closed",
        );
        let total_transactions_closed =
            count(&self.total_transactions_closed, "Total transactions closed");

        let mut money = |raw: &str, label: &str| match parse_money(raw) {
            Ok(value) => value,
            Err(_) => {
                violations.push(format!("{label} must be a non-negative number"));
                None
            }
        };
        let sales_volume_buyers = money(&self.sales_volume_buyers, "Sales volume buyers");
        let sales_volume_sellers = money(&self.sales_volume_sellers, "Sales volume sellers");
        let total_sales_volume = money(&self.total_sales_volume, "Total sales volume");
        let commission_income_buyers = money(
            &self.commission_income_buyers,
            "Commission income from buyers",
        );
        let commission_income_sellers = money(
            &self.commission_income_sellers,
            "Commission income from sellers",
        );
        let total_commission_income =
            money(&self.total_commission_income, "Total commission income");

        if !violations.is_empty() {
            return Err(Error::invalid_request(violations.join(". "))
                .with_details(json!({ "violations": violations })));
        }

        Ok(NewGoal {
            user_id,
            year,
            buyer_transactions_closed,
            seller_transactions_closed,
            total_transactions_closed,
            sales_volume_buyers,
            sales_volume_sellers,
            total_sales_volume,
            commission_income_buyers,
            commission_income_sellers,
            total_commission_income,
        })
    }
}
