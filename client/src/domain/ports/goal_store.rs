//! Driven port for goal record storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::goals::{Goal, NewGoal};

/// Errors surfaced by goal store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GoalStoreError {
    /// Transport failed before a response arrived.
    #[error("goal store transport failed: {message}")]
    Transport { message: String },
    /// The call exceeded its deadline.
    #[error("goal store timeout: {message}")]
    Timeout { message: String },
    /// The backend rejected the request (auth, constraint, bad payload).
    #[error("goal store rejected the request: {message}")]
    Rejected { message: String },
    /// The response could not be decoded into records.
    #[error("goal store response decode failed: {message}")]
    Decode { message: String },
}

impl GoalStoreError {
    /// Build a [`GoalStoreError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`GoalStoreError::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Build a [`GoalStoreError::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Build a [`GoalStoreError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for goal record storage.
///
/// At most one goal exists per (user, year); the backend enforces the
/// invariant and surfaces violations as rejections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Fetch the goal for `user_id` and `year`, or `None` when the agent
    /// has not set goals for that year yet.
    async fn find_for_year(
        &self,
        user_id: Uuid,
        year: i32,
    ) -> Result<Option<Goal>, GoalStoreError>;

    /// Insert one record and return the stored row.
    async fn insert(&self, record: &NewGoal) -> Result<Goal, GoalStoreError>;

    /// Replace the record identified by `id` and return the stored row.
    async fn update(&self, id: i64, record: &NewGoal) -> Result<Goal, GoalStoreError>;
}

/// Fixture implementation: no goals exist and mutations echo the record.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGoalStore;

#[async_trait]
impl GoalStore for FixtureGoalStore {
    async fn find_for_year(
        &self,
        _user_id: Uuid,
        _year: i32,
    ) -> Result<Option<Goal>, GoalStoreError> {
        Ok(None)
    }

    async fn insert(&self, record: &NewGoal) -> Result<Goal, GoalStoreError> {
        Ok(Goal::from_targets(0, record))
    }

    async fn update(&self, id: i64, record: &NewGoal) -> Result<Goal, GoalStoreError> {
        Ok(Goal::from_targets(id, record))
    }
}
