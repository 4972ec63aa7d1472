//! Wire DTOs for the hosted backend surfaces.
//!
//! Row shapes mirror the database columns (note `sales_price` on the wire
//! versus `sale_price` in the domain, and goal years stored as the Jan 1
//! date of the year). Conversions into domain types are fallible so decode
//! problems surface as decode errors instead of panics.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::goals::{Goal, NewGoal};
use crate::domain::ports::{Session, UserProfile};
use crate::domain::transactions::{ClientType, NewTransaction, Transaction, TransactionStatus};

/// Error descriptor returned by every backend surface.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDescriptorDto {
    /// Human-readable failure description.
    #[serde(alias = "msg", alias = "error_description")]
    pub message: Option<String>,
    /// Extra context, e.g. the violated constraint.
    pub details: Option<String>,
    /// Remediation hint.
    pub hint: Option<String>,
    /// Stable backend error code.
    pub code: Option<String>,
}

/// One transaction row from the record API.
#[derive(Debug, Deserialize)]
pub(crate) struct TransactionRowDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: Option<String>,
    pub client_last_name: String,
    pub client_type: ClientType,
    pub status: TransactionStatus,
    pub under_contract_date: Option<NaiveDate>,
    pub sales_price: Option<f64>,
    pub closing_date: Option<NaiveDate>,
    pub gross_commission_income: Option<f64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRowDto {
    pub(crate) fn into_domain(self) -> Transaction {
        Transaction {
            id: self.id,
            user_id: self.user_id,
            address: self.address.unwrap_or_default(),
            client_last_name: self.client_last_name,
            client_type: self.client_type,
            status: self.status,
            under_contract_date: self.under_contract_date,
            sale_price: self.sales_price,
            closing_date: self.closing_date,
            gross_commission_income: self.gross_commission_income,
            image_url: self.image_url,
            created_at: self.created_at,
        }
    }
}

/// Insert/update payload for the transactions table.
#[derive(Debug, Serialize)]
pub(crate) struct TransactionWriteDto<'a> {
    pub user_id: Uuid,
    pub address: &'a str,
    pub client_last_name: &'a str,
    pub client_type: ClientType,
    pub status: TransactionStatus,
    pub under_contract_date: Option<NaiveDate>,
    pub sales_price: Option<f64>,
    pub closing_date: Option<NaiveDate>,
    pub gross_commission_income: Option<f64>,
    pub image_url: Option<&'a str>,
}

impl<'a> TransactionWriteDto<'a> {
    pub(crate) fn from_domain(record: &'a NewTransaction) -> Self {
        Self {
            user_id: record.user_id,
            address: &record.address,
            client_last_name: &record.client_last_name,
            client_type: record.client_type,
            status: record.status,
            under_contract_date: record.under_contract_date,
            sales_price: record.sale_price,
            closing_date: record.closing_date,
            gross_commission_income: record.gross_commission_income,
            image_url: record.image_url.as_deref(),
        }
    }
}

/// One goal row from the record API.
#[derive(Debug, Deserialize)]
pub(crate) struct GoalRowDto {
    pub id: i64,
    pub user_id: Uuid,
    pub year: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,

    pub buyer_transactions_closed: Option<u32>,
    pub seller_transactions_closed: Option<u32>,
    pub total_transactions_closed: Option<u32>,
    pub sales_volume_buyers: Option<f64>,
    pub sales_volume_sellers: Option<f64>,
    pub total_sales_volume: Option<f64>,
    pub commission_income_buyers: Option<f64>,
    pub commission_income_sellers: Option<f64>,
    pub total_commission_income: Option<f64>,

    pub actual_buyer_transactions_closed: Option<u32>,
    pub actual_seller_transactions_closed: Option<u32>,
    pub actual_total_transactions_closed: Option<u32>,
    pub actual_sales_volume_buyers: Option<f64>,
    pub actual_sales_volume_sellers: Option<f64>,
    pub actual_total_sales_volume: Option<f64>,
    pub actual_commission_income_buyers: Option<f64>,
    pub actual_commission_income_sellers: Option<f64>,
    pub actual_total_commission_income: Option<f64>,
}

impl GoalRowDto {
    pub(crate) fn into_domain(self) -> Result<Goal, String> {
        let year = self
            .year
            .ok_or_else(|| format!("goal row {} has no year", self.id))?
            .year();
        Ok(Goal {
            id: self.id,
            user_id: self.user_id,
            year,
            created_at: self.created_at,
            buyer_transactions_closed: self.buyer_transactions_closed,
            seller_transactions_closed: self.seller_transactions_closed,
            total_transactions_closed: self.total_transactions_closed,
            sales_volume_buyers: self.sales_volume_buyers,
            sales_volume_sellers: self.sales_volume_sellers,
            total_sales_volume: self.total_sales_volume,
            commission_income_buyers: self.commission_income_buyers,
            commission_income_sellers: self.commission_income_sellers,
            total_commission_income: self.total_commission_income,
            actual_buyer_transactions_closed: self.actual_buyer_transactions_closed,
            actual_seller_transactions_closed: self.actual_seller_transactions_closed,
            actual_total_transactions_closed: self.actual_total_transactions_closed,
            actual_sales_volume_buyers: self.actual_sales_volume_buyers,
            actual_sales_volume_sellers: self.actual_sales_volume_sellers,
            actual_total_sales_volume: self.actual_total_sales_volume,
            actual_commission_income_buyers: self.actual_commission_income_buyers,
            actual_commission_income_sellers: self.actual_commission_income_sellers,
            actual_total_commission_income: self.actual_total_commission_income,
        })
    }
}

/// Insert/update payload for the goals table.
#[derive(Debug, Serialize)]
pub(crate) struct GoalWriteDto {
    pub user_id: Uuid,
    /// Stored as the Jan 1 date of the goal year.
    pub year: String,
    pub buyer_transactions_closed: Option<u32>,
    pub seller_transactions_closed: Option<u32>,
    pub total_transactions_closed: Option<u32>,
    pub sales_volume_buyers: Option<f64>,
    pub sales_volume_sellers: Option<f64>,
    pub total_sales_volume: Option<f64>,
    pub commission_income_buyers: Option<f64>,
    pub commission_income_sellers: Option<f64>,
    pub total_commission_income: Option<f64>,
}

impl GoalWriteDto {
    pub(crate) fn from_domain(record: &NewGoal) -> Self {
        Self {
            user_id: record.user_id,
            year: format!("{:04}-01-01", record.year),
            buyer_transactions_closed: record.buyer_transactions_closed,
            seller_transactions_closed: record.seller_transactions_closed,
            total_transactions_closed: record.total_transactions_closed,
            sales_volume_buyers: record.sales_volume_buyers,
            sales_volume_sellers: record.sales_volume_sellers,
            total_sales_volume: record.total_sales_volume,
            commission_income_buyers: record.commission_income_buyers,
            commission_income_sellers: record.commission_income_sellers,
            total_commission_income: record.total_commission_income,
        }
    }
}

/// Session payload from the auth surface.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthSessionDto {
    pub access_token: Option<String>,
    pub user: Option<AuthUserDto>,
}

/// User payload nested in a session response.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthUserDto {
    pub id: Uuid,
    pub email: Option<String>,
    pub user_metadata: Option<AuthUserMetadataDto>,
}

/// Profile metadata attached at sign-up.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthUserMetadataDto {
    pub full_name: Option<String>,
}

impl AuthSessionDto {
    pub(crate) fn into_domain(self) -> Result<Session, String> {
        let access_token = self.access_token.ok_or_else(|| {
            "session missing access token (email confirmation may be required)".to_owned()
        })?;
        let user = self.user.ok_or_else(|| "session missing user".to_owned())?;
        Ok(Session {
            user: UserProfile {
                id: user.id,
                email: user.email.unwrap_or_default(),
                full_name: user.user_metadata.and_then(|metadata| metadata.full_name),
            },
            access_token,
        })
    }
}

/// Sign-up request payload.
#[derive(Debug, Serialize)]
pub(crate) struct SignUpRequestDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: SignUpMetadataDto<'a>,
}

/// Profile metadata submitted with sign-up.
#[derive(Debug, Serialize)]
pub(crate) struct SignUpMetadataDto<'a> {
    pub full_name: &'a str,
}

/// Password sign-in request payload.
#[derive(Debug, Serialize)]
pub(crate) struct PasswordGrantRequestDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
}
