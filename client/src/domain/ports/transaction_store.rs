//! Driven port for transaction record storage.
//!
//! The domain owns the record shapes so services stay adapter-agnostic;
//! the hosted-backend adapter maps its wire rows into [`Transaction`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::transactions::{NewTransaction, Transaction};

/// Errors surfaced by transaction store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionStoreError {
    /// Transport failed before a response arrived.
    #[error("transaction store transport failed: {message}")]
    Transport { message: String },
    /// The call exceeded its deadline.
    #[error("transaction store timeout: {message}")]
    Timeout { message: String },
    /// The backend rejected the request (auth, constraint, bad payload).
    #[error("transaction store rejected the request: {message}")]
    Rejected { message: String },
    /// The response could not be decoded into records.
    #[error("transaction store response decode failed: {message}")]
    Decode { message: String },
}

impl TransactionStoreError {
    /// Build a [`TransactionStoreError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`TransactionStoreError::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Build a [`TransactionStoreError::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Build a [`TransactionStoreError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for transaction record CRUD.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// List transactions owned by `user_id`, newest first, optionally
    /// capped at `limit` rows.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>, TransactionStoreError>;

    /// Insert one record and return the stored row.
    async fn insert(&self, record: &NewTransaction)
    -> Result<Transaction, TransactionStoreError>;

    /// Replace the record identified by `id` and return the stored row.
    async fn update(
        &self,
        id: Uuid,
        record: &NewTransaction,
    ) -> Result<Transaction, TransactionStoreError>;

    /// Delete the record identified by `id`.
    async fn delete(&self, id: Uuid) -> Result<(), TransactionStoreError>;
}

/// Fixture implementation backed by nothing; lists come back empty and
/// mutations echo the submitted record.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTransactionStore;

#[async_trait]
impl TransactionStore for FixtureTransactionStore {
    async fn list_for_user(
        &self,
        _user_id: Uuid,
        _limit: Option<u32>,
    ) -> Result<Vec<Transaction>, TransactionStoreError> {
        Ok(Vec::new())
    }

    async fn insert(
        &self,
        record: &NewTransaction,
    ) -> Result<Transaction, TransactionStoreError> {
        Ok(echo(Uuid::new_v4(), record))
    }

    async fn update(
        &self,
        id: Uuid,
        record: &NewTransaction,
    ) -> Result<Transaction, TransactionStoreError> {
        Ok(echo(id, record))
    }

    async fn delete(&self, _id: Uuid) -> Result<(), TransactionStoreError> {
        Ok(())
    }
}

fn echo(id: Uuid, record: &NewTransaction) -> Transaction {
    Transaction {
        id,
        user_id: record.user_id,
        address: record.address.clone(),
        client_last_name: record.client_last_name.clone(),
        client_type: record.client_type,
        status: record.status,
        under_contract_date: record.under_contract_date,
        sale_price: record.sale_price,
        closing_date: record.closing_date,
        gross_commission_income: record.gross_commission_income,
        image_url: record.image_url.clone(),
        created_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::transactions::{ClientType, TransactionStatus};

    #[tokio::test]
    async fn fixture_echoes_mutations_and_lists_nothing() {
        let store = FixtureTransactionStore;
        let record = NewTransaction {
            user_id: Uuid::new_v4(),
            address: "1 Main St".to_owned(),
            client_last_name: "Okafor".to_owned(),
            client_type: ClientType::Seller,
            status: TransactionStatus::Active,
            under_contract_date: None,
            sale_price: None,
            closing_date: None,
            gross_commission_income: None,
            image_url: None,
        };

        let inserted = store.insert(&record).await.expect("insert succeeds");
        assert_eq!(inserted.address, "1 Main St");

        let listed = store
            .list_for_user(record.user_id, None)
            .await
            .expect("list succeeds");
        assert!(listed.is_empty());
    }

    #[test]
    fn error_display_carries_the_remote_message() {
        let error = TransactionStoreError::rejected("status 409: duplicate row");
        assert_eq!(
            error.to_string(),
            "transaction store rejected the request: status 409: duplicate row"
        );
    }
}
