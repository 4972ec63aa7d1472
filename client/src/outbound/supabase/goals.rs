//! Record-API adapter for the goal store port.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use uuid::Uuid;

use crate::domain::goals::{Goal, NewGoal};
use crate::domain::ports::{GoalStore, GoalStoreError};

use super::dto::{GoalRowDto, GoalWriteDto};
use super::{RequestFailure, SupabaseTransport, status_message};

// The table predates the naming convention; the capital G is load-bearing.
const GOALS_PATH: &str = "rest/v1/Goals";

/// Goal store backed by the hosted record API.
pub struct SupabaseGoalStore {
    transport: Arc<SupabaseTransport>,
}

impl SupabaseGoalStore {
    /// Build the adapter over a shared transport.
    pub fn new(transport: Arc<SupabaseTransport>) -> Self {
        Self { transport }
    }

    fn decode_rows(body: &[u8]) -> Result<Vec<Goal>, GoalStoreError> {
        let rows: Vec<GoalRowDto> =
            serde_json::from_slice(body).map_err(|err| GoalStoreError::decode(err.to_string()))?;
        rows.into_iter()
            .map(|row| row.into_domain().map_err(GoalStoreError::decode))
            .collect()
    }

    fn decode_single(body: &[u8]) -> Result<Goal, GoalStoreError> {
        Self::decode_rows(body)?
            .into_iter()
            .next()
            .ok_or_else(|| GoalStoreError::decode("mutation returned no rows"))
    }
}

#[async_trait]
impl GoalStore for SupabaseGoalStore {
    async fn find_for_year(
        &self,
        user_id: Uuid,
        year: i32,
    ) -> Result<Option<Goal>, GoalStoreError> {
        let request = self
            .transport
            .request(Method::GET, GOALS_PATH)
            .map_err(map_failure)?
            .query(&[
                ("select", "*".to_owned()),
                ("user_id", format!("eq.{user_id}")),
                ("year", format!("eq.{year:04}-01-01")),
                ("order", "created_at.desc".to_owned()),
            ]);
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        // Newest row wins should the uniqueness invariant ever be violated.
        Ok(Self::decode_rows(&body)?.into_iter().next())
    }

    async fn insert(&self, record: &NewGoal) -> Result<Goal, GoalStoreError> {
        let request = self
            .transport
            .request(Method::POST, GOALS_PATH)
            .map_err(map_failure)?
            .header("Prefer", "return=representation")
            .json(&[GoalWriteDto::from_domain(record)]);
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        Self::decode_single(&body)
    }

    async fn update(&self, id: i64, record: &NewGoal) -> Result<Goal, GoalStoreError> {
        let request = self
            .transport
            .request(Method::PATCH, GOALS_PATH)
            .map_err(map_failure)?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&GoalWriteDto::from_domain(record));
        let (status, body) = self.transport.send(request).await.map_err(map_failure)?;
        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        Self::decode_single(&body)
    }
}

fn map_failure(failure: RequestFailure) -> GoalStoreError {
    match failure {
        RequestFailure::Timeout { message } => GoalStoreError::timeout(message),
        RequestFailure::Transport { message } => GoalStoreError::transport(message),
    }
}

fn map_status(status: StatusCode, body: &[u8]) -> GoalStoreError {
    let message = status_message(status, body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GoalStoreError::timeout(message)
        }
        _ if status.is_client_error() => GoalStoreError::rejected(message),
        _ => GoalStoreError::transport(message),
    }
}
