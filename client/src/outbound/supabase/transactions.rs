//! Record-API adapter for the transaction store port.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use uuid::Uuid;

use crate::domain::ports::{TransactionStore, TransactionStoreError};
use crate::domain::transactions::{NewTransaction, Transaction};

use super::dto::{TransactionRowDto, TransactionWriteDto};
use super::{RequestFailure, SupabaseTransport, status_message};

const TRANSACTIONS_PATH: &str = "rest/v1/transactions";

/// Transaction store backed by the hosted record API.
pub struct SupabaseTransactionStore {
    transport: Arc<SupabaseTransport>,
}

impl SupabaseTransactionStore {
    /// Build the adapter over a shared transport.
    pub fn new(transport: Arc<SupabaseTransport>) -> Self {
        Self { transport }
    }

    fn decode_rows(body: &[u8]) -> Result<Vec<Transaction>, TransactionStoreError> {
        let rows: Vec<TransactionRowDto> = serde_json::from_slice(body)
            .map_err(|err| TransactionStoreError::decode(err.to_string()))?;
        Ok(rows.into_iter().map(TransactionRowDto::into_domain).collect())
    }

    fn decode_single(body: &[u8]) -> Result<Transaction, TransactionStoreError> {
        Self::decode_rows(body)?
            .into_iter()
            .next()
            .ok_or_else(|| TransactionStoreError::decode("mutation returned no rows"))
    }
}

#[async_trait]
impl TransactionStore for SupabaseTransactionStore {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>, TransactionStoreError> {
        let mut query = vec![
            ("select".to_owned(), "*".to_owned()),
            ("user_id".to_owned(), format!("eq.{user_id}")),
            ("order".to_owned(), "created_at.desc".to_owned()),
        ];
        if let Some(limit) = limit {
            query.push(("limit".to_owned(), limit.to_string()));
        }

        let request = self
            .transport
            .request(Method::GET, TRANSACTIONS_PATH)
            .map_err(map_failure)?
            .query(&query);
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        Self::decode_rows(&body)
    }

    async fn insert(
        &self,
        record: &NewTransaction,
    ) -> Result<Transaction, TransactionStoreError> {
        let request = self
            .transport
            .request(Method::POST, TRANSACTIONS_PATH)
            .map_err(map_failure)?
            .header("Prefer", "return=representation")
            .json(&[TransactionWriteDto::from_domain(record)]);
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        Self::decode_single(&body)
    }

    async fn update(
        &self,
        id: Uuid,
        record: &NewTransaction,
    ) -> Result<Transaction, TransactionStoreError> {
        let request = self
            .transport
            .request(Method::PATCH, TRANSACTIONS_PATH)
            .map_err(map_failure)?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&TransactionWriteDto::from_domain(record));
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        Self::decode_single(&body)
    }

    async fn delete(&self, id: Uuid) -> Result<(), TransactionStoreError> {
        let request = self
            .transport
            .request(Method::DELETE, TRANSACTIONS_PATH)
            .map_err(map_failure)?
            .query(&[("id", format!("eq.{id}"))]);
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        Ok(())
    }
}

fn map_failure(failure: RequestFailure) -> TransactionStoreError {
    match failure {
        RequestFailure::Timeout { message } => TransactionStoreError::timeout(message),
        RequestFailure::Transport { message } => TransactionStoreError::transport(message),
    }
}

fn map_status(status: StatusCode, body: &[u8]) -> TransactionStoreError {
    let message = status_message(status, body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TransactionStoreError::timeout(message)
        }
        _ if status.is_client_error() => TransactionStoreError::rejected(message),
        _ => TransactionStoreError::transport(message),
    }
}
