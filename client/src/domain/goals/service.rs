//! Goal dashboard and submission service.

use std::sync::Arc;

use chrono::Datelike;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::GoalStore;
use crate::domain::retry::{AttemptGauge, RetryPolicy, RetryingExecutor};

use super::{Facet, Goal, GoalForm, MetricProgress};

/// One facet of the goals dashboard, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDashboard {
    /// The backing record, kept so an edit can pre-populate the form.
    pub goal: Goal,
    /// Facet the metrics were computed for.
    pub facet: Facet,
    /// Closed-transaction metric.
    pub closed_transactions: MetricProgress,
    /// Commission-income metric.
    pub gross_income: MetricProgress,
    /// Sales-volume metric.
    pub closed_volume: MetricProgress,
}

/// Driving service for the goals screen.
///
/// Submissions run through the retrying executor; dashboard reads do not —
/// the screen surfaces a reload affordance instead, matching how the rest
/// of the product treats fetch failures.
pub struct GoalService<G> {
    goals: Arc<G>,
    executor: RetryingExecutor,
}

impl<G> GoalService<G> {
    /// Build a service with the default retry policy.
    pub fn new(goals: Arc<G>) -> Self {
        Self::with_executor(goals, RetryingExecutor::new(RetryPolicy::default()))
    }

    /// Build a service with an explicit executor (tests inject a
    /// non-sleeping one).
    pub fn with_executor(goals: Arc<G>, executor: RetryingExecutor) -> Self {
        Self { goals, executor }
    }

    /// Observable attempt counter for submission feedback.
    pub fn attempt_gauge(&self) -> AttemptGauge {
        self.executor.gauge()
    }
}

impl<G> GoalService<G>
where
    G: GoalStore,
{
    /// Fetch the goal for (`user_id`, `year`) and compute the metrics for
    /// `facet`. `None` means no goals have been set for that year.
    pub async fn dashboard(
        &self,
        user_id: Uuid,
        year: i32,
        facet: Facet,
    ) -> Result<Option<GoalDashboard>, Error> {
        let found = self
            .goals
            .find_for_year(user_id, year)
            .await
            .map_err(|error| {
                tracing::error!(%error, %user_id, year, "goal fetch failed");
                Error::service_unavailable("Failed to load goals data")
            })?;

        Ok(found.map(|goal| {
            let totals = goal.facet_totals(facet);
            GoalDashboard {
                facet,
                closed_transactions: MetricProgress::new(
                    totals.closed_transactions.0,
                    totals.closed_transactions.1,
                ),
                gross_income: MetricProgress::new(totals.gross_income.0, totals.gross_income.1),
                closed_volume: MetricProgress::new(totals.closed_volume.0, totals.closed_volume.1),
                goal,
            }
        }))
    }

    /// Validate and persist a goal form, creating or updating depending on
    /// whether the form carries a record id.
    pub async fn submit(&self, user_id: Uuid, form: &GoalForm) -> Result<Goal, Error> {
        let current_year = chrono::Utc::now().year();
        let record = form.validate(user_id, current_year)?;

        let result = match form.editing_id {
            Some(id) => {
                self.executor
                    .execute(|| self.goals.update(id, &record))
                    .await
            }
            None => self.executor.execute(|| self.goals.insert(&record)).await,
        };

        result.map_err(|error| {
            let verb = if form.editing_id.is_some() {
                "update"
            } else {
                "create"
            };
            tracing::error!(%error, %user_id, year = record.year, "goal submit failed");
            Error::service_unavailable(format!(
                "Failed to {verb} goal. Please check your internet connection and try again."
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour coverage for the goal service.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::GoalStoreError;
    use crate::domain::goals::{NewGoal, ProgressBand};
    use crate::domain::retry::RetrySleeper;

    struct InstantSleeper;

    #[async_trait]
    impl RetrySleeper for InstantSleeper {
        async fn sleep(&self, _duration: Duration) {}
    }

    struct ScriptedGoalStore {
        lookup: Mutex<Option<Result<Option<Goal>, GoalStoreError>>>,
        mutations: Mutex<std::collections::VecDeque<Result<Goal, GoalStoreError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedGoalStore {
        fn with_lookup(result: Result<Option<Goal>, GoalStoreError>) -> Self {
            Self {
                lookup: Mutex::new(Some(result)),
                mutations: Mutex::new(std::collections::VecDeque::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_mutations(outcomes: Vec<Result<Goal, GoalStoreError>>) -> Self {
            Self {
                lookup: Mutex::new(None),
                mutations: Mutex::new(outcomes.into_iter().collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn next_mutation(&self) -> Result<Goal, GoalStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.mutations
                .lock()
                .expect("mutations mutex")
                .pop_front()
                .unwrap_or_else(|| Err(GoalStoreError::rejected("script exhausted")))
        }
    }

    #[async_trait]
    impl GoalStore for ScriptedGoalStore {
        async fn find_for_year(
            &self,
            _user_id: Uuid,
            _year: i32,
        ) -> Result<Option<Goal>, GoalStoreError> {
            self.lookup
                .lock()
                .expect("lookup mutex")
                .take()
                .unwrap_or(Ok(None))
        }

        async fn insert(&self, record: &NewGoal) -> Result<Goal, GoalStoreError> {
            self.next_mutation().map(|mut goal| {
                goal.year = record.year;
                goal
            })
        }

        async fn update(&self, id: i64, _record: &NewGoal) -> Result<Goal, GoalStoreError> {
            self.next_mutation().map(|mut goal| {
                goal.id = id;
                goal
            })
        }
    }

    fn service(store: ScriptedGoalStore) -> GoalService<ScriptedGoalStore> {
        GoalService::with_executor(
            Arc::new(store),
            RetryingExecutor::with_sleeper(RetryPolicy::default(), Arc::new(InstantSleeper)),
        )
    }

    fn stored_goal() -> Goal {
        let mut goal = Goal::from_targets(
            3,
            &NewGoal {
                user_id: Uuid::new_v4(),
                year: 2025,
                buyer_transactions_closed: Some(8),
                seller_transactions_closed: Some(16),
                total_transactions_closed: Some(24),
                sales_volume_buyers: None,
                sales_volume_sellers: None,
                total_sales_volume: Some(6_000_000.0),
                commission_income_buyers: None,
                commission_income_sellers: None,
                total_commission_income: Some(180_000.0),
            },
        );
        goal.actual_total_transactions_closed = Some(6);
        goal.actual_total_commission_income = Some(135_000.0);
        goal
    }

    fn valid_form() -> GoalForm {
        GoalForm {
            year: chrono::Utc::now().year().to_string(),
            total_transactions_closed: "24".to_owned(),
            ..GoalForm::default()
        }
    }

    #[tokio::test]
    async fn dashboard_computes_metrics_for_the_selected_facet() {
        let service = service(ScriptedGoalStore::with_lookup(Ok(Some(stored_goal()))));

        let dashboard = service
            .dashboard(Uuid::new_v4(), 2025, Facet::Total)
            .await
            .expect("dashboard fetch succeeds")
            .expect("goal exists");

        assert_eq!(dashboard.closed_transactions.percent, 25.0);
        assert_eq!(dashboard.closed_transactions.band, ProgressBand::Low);
        assert_eq!(dashboard.gross_income.percent, 75.0);
        assert_eq!(dashboard.gross_income.band, ProgressBand::High);
        assert_eq!(dashboard.closed_volume.percent, 0.0);
    }

    #[tokio::test]
    async fn dashboard_reports_absence_as_none() {
        let service = service(ScriptedGoalStore::with_lookup(Ok(None)));
        let dashboard = service
            .dashboard(Uuid::new_v4(), 2026, Facet::Buyers)
            .await
            .expect("dashboard fetch succeeds");
        assert!(dashboard.is_none());
    }

    #[tokio::test]
    async fn dashboard_fetch_failure_maps_to_a_friendly_message() {
        let service = service(ScriptedGoalStore::with_lookup(Err(
            GoalStoreError::transport("connection refused"),
        )));

        let err = service
            .dashboard(Uuid::new_v4(), 2025, Facet::Total)
            .await
            .expect_err("dashboard fetch must fail");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(err.message(), "Failed to load goals data");
    }

    #[tokio::test]
    async fn submit_retries_transient_failures_until_success() {
        let store = ScriptedGoalStore::with_mutations(vec![
            Err(GoalStoreError::transport("network unreachable")),
            Err(GoalStoreError::timeout("connection timeout")),
            Ok(stored_goal()),
        ]);
        let service = service(store);

        let saved = service
            .submit(Uuid::new_v4(), &valid_form())
            .await
            .expect("submit succeeds");
        assert_eq!(saved.year, chrono::Utc::now().year());
        assert_eq!(service.goals.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn submit_surfaces_a_generic_message_after_permanent_failure() {
        let store = ScriptedGoalStore::with_mutations(vec![Err(GoalStoreError::rejected(
            "status 409: duplicate key value violates unique constraint",
        ))]);
        let service = service(store);

        let err = service
            .submit(Uuid::new_v4(), &valid_form())
            .await
            .expect_err("submit must fail");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert!(err.message().starts_with("Failed to create goal."));
        assert!(!err.message().contains("duplicate key"));
        assert_eq!(service.goals.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn submit_with_editing_id_updates_instead_of_inserting() {
        let store = ScriptedGoalStore::with_mutations(vec![Ok(stored_goal())]);
        let service = service(store);
        let mut form = valid_form();
        form.editing_id = Some(11);

        let saved = service
            .submit(Uuid::new_v4(), &form)
            .await
            .expect("submit succeeds");
        assert_eq!(saved.id, 11);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_store() {
        let store = ScriptedGoalStore::with_mutations(vec![Ok(stored_goal())]);
        let service = service(store);
        let mut form = valid_form();
        form.total_transactions_closed = "-4".to_owned();

        let err = service
            .submit(Uuid::new_v4(), &form)
            .await
            .expect_err("submit must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(service.goals.calls.load(Ordering::SeqCst), 0);
    }
}
