//! Transaction listing, submission, and deletion service.
//!
//! Submission is the busiest flow in the product: validate the draft,
//! upload the photo if one was selected (upload failure must not sink the
//! save), write the record through the retrying executor, then publish the
//! refresh signal so the goals dashboard re-fetches its actuals.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{ImageStore, ImageStoreError, TransactionStore};
use crate::domain::refresh::RefreshSignal;
use crate::domain::retry::{AttemptGauge, RetryPolicy, RetryingExecutor};

use super::{ImageAttachment, Transaction, TransactionDraft};

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSubmitOutcome {
    /// The stored record.
    pub transaction: Transaction,
    /// Friendly explanation when the photo upload failed but the save
    /// itself went through.
    pub image_warning: Option<String>,
}

/// Driving service for the transactions screen and entry form.
pub struct TransactionService<T, I> {
    transactions: Arc<T>,
    images: Arc<I>,
    refresh: RefreshSignal,
    executor: RetryingExecutor,
}

impl<T, I> TransactionService<T, I> {
    /// Build a service with the default retry policy.
    pub fn new(transactions: Arc<T>, images: Arc<I>, refresh: RefreshSignal) -> Self {
        Self::with_executor(
            transactions,
            images,
            refresh,
            RetryingExecutor::new(RetryPolicy::default()),
        )
    }

    /// Build a service with an explicit executor (tests inject a
    /// non-sleeping one).
    pub fn with_executor(
        transactions: Arc<T>,
        images: Arc<I>,
        refresh: RefreshSignal,
        executor: RetryingExecutor,
    ) -> Self {
        Self {
            transactions,
            images,
            refresh,
            executor,
        }
    }

    /// Observable attempt counter for submission feedback.
    pub fn attempt_gauge(&self) -> AttemptGauge {
        self.executor.gauge()
    }
}

impl<T, I> TransactionService<T, I>
where
    T: TransactionStore,
    I: ImageStore,
{
    /// Fetch every transaction owned by `user_id`, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Transaction>, Error> {
        self.transactions
            .list_for_user(user_id, None)
            .await
            .map_err(|error| {
                tracing::error!(%error, %user_id, "transaction fetch failed");
                Error::service_unavailable("Failed to load transactions")
            })
    }

    /// Whether the agent has recorded any transaction at all; drives the
    /// post-login landing decision.
    pub async fn has_any(&self, user_id: Uuid) -> Result<bool, Error> {
        self.transactions
            .list_for_user(user_id, Some(1))
            .await
            .map(|rows| !rows.is_empty())
            .map_err(|error| {
                tracing::error!(%error, %user_id, "transaction existence probe failed");
                Error::service_unavailable("Failed to load transactions")
            })
    }

    /// Validate and persist a draft, uploading its photo first if one was
    /// selected. Returns the stored record plus an optional upload warning.
    pub async fn submit(&self, draft: &TransactionDraft) -> Result<TransactionSubmitOutcome, Error> {
        let today = Utc::now().date_naive();
        let mut record = draft.validate(today)?;

        let mut image_warning = None;
        record.image_url = match &draft.attachment {
            Some(attachment) => match self.upload_attachment(draft.user_id, attachment).await {
                Ok(url) => Some(url),
                Err(warning) => {
                    // The save goes ahead without a photo; the warning is
                    // reported alongside the success.
                    image_warning = Some(warning);
                    None
                }
            },
            None => draft.existing_image_url.clone(),
        };

        let result = match draft.editing_id {
            Some(id) => {
                self.executor
                    .execute(|| self.transactions.update(id, &record))
                    .await
            }
            None => {
                self.executor
                    .execute(|| self.transactions.insert(&record))
                    .await
            }
        };

        let transaction = result.map_err(|error| {
            tracing::error!(%error, user_id = %draft.user_id, "transaction submit failed");
            Error::service_unavailable(
                "Failed to save transaction. Please check your internet connection and try again.",
            )
        })?;

        self.refresh.publish();
        Ok(TransactionSubmitOutcome {
            transaction,
            image_warning,
        })
    }

    /// Delete a transaction and invalidate the goals dashboard.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        self.transactions.delete(id).await.map_err(|error| {
            tracing::error!(%error, %id, "transaction delete failed");
            Error::service_unavailable("Error deleting transaction. Please try again.")
        })?;

        self.refresh.publish();
        Ok(())
    }

    async fn upload_attachment(
        &self,
        user_id: Uuid,
        attachment: &ImageAttachment,
    ) -> Result<String, String> {
        let path = format!(
            "{user_id}/{}.{}",
            Utc::now().timestamp_millis(),
            attachment.extension()
        );
        match self
            .images
            .upload(&path, &attachment.bytes, &attachment.content_type)
            .await
        {
            Ok(stored) => Ok(self.images.public_url(&stored.path)),
            Err(error) => {
                tracing::warn!(%error, %user_id, "photo upload failed; saving without image");
                Err(upload_warning(&error))
            }
        }
    }
}

fn upload_warning(error: &ImageStoreError) -> String {
    match error {
        ImageStoreError::NotFound { .. } | ImageStoreError::Denied { .. } => {
            "Image upload is currently unavailable. Please try again later or contact support."
                .to_owned()
        }
        ImageStoreError::TooLarge { .. } => {
            "File is too large for storage. Please choose a smaller image.".to_owned()
        }
        ImageStoreError::Transport { .. }
        | ImageStoreError::Timeout { .. }
        | ImageStoreError::Decode { .. } => {
            "Image upload failed. Please try again or continue without an image.".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour coverage for the transaction service.

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{Datelike, NaiveDate};

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        FixtureImageStore, StoredImage, TransactionStoreError,
    };
    use crate::domain::retry::RetrySleeper;
    use crate::domain::transactions::{ClientType, NewTransaction, TransactionStatus};

    struct InstantSleeper;

    #[async_trait]
    impl RetrySleeper for InstantSleeper {
        async fn sleep(&self, _duration: Duration) {}
    }

    struct ScriptedTransactionStore {
        mutations: Mutex<VecDeque<Result<(), TransactionStoreError>>>,
        calls: AtomicUsize,
        saved: Mutex<Vec<NewTransaction>>,
    }

    impl ScriptedTransactionStore {
        fn new(outcomes: Vec<Result<(), TransactionStoreError>>) -> Self {
            Self {
                mutations: Mutex::new(outcomes.into_iter().collect()),
                calls: AtomicUsize::new(0),
                saved: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, record: &NewTransaction) -> Result<Transaction, TransactionStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.saved
                .lock()
                .expect("saved mutex")
                .push(record.clone());
            self.mutations
                .lock()
                .expect("mutations mutex")
                .pop_front()
                .unwrap_or(Ok(()))
                .map(|()| Transaction {
                    id: Uuid::new_v4(),
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
                    created_at: Utc::now(),
                })
        }
    }

    #[async_trait]
    impl TransactionStore for ScriptedTransactionStore {
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
            self.next(record)
        }

        async fn update(
            &self,
            _id: Uuid,
            record: &NewTransaction,
        ) -> Result<Transaction, TransactionStoreError> {
            self.next(record)
        }

        async fn delete(&self, _id: Uuid) -> Result<(), TransactionStoreError> {
            Ok(())
        }
    }

    struct FailingImageStore {
        error: ImageStoreError,
    }

    #[async_trait]
    impl ImageStore for FailingImageStore {
        async fn upload(
            &self,
            _path: &str,
            _bytes: &[u8],
            _content_type: &str,
        ) -> Result<StoredImage, ImageStoreError> {
            Err(self.error.clone())
        }

        fn public_url(&self, path: &str) -> String {
            format!("https://storage.invalid/public/{path}")
        }
    }

    fn draft() -> TransactionDraft {
        TransactionDraft {
            user_id: Uuid::new_v4(),
            editing_id: None,
            address: "12 Harbour Row".to_owned(),
            client_last_name: "Nakamura".to_owned(),
            client_type: ClientType::Seller,
            status: TransactionStatus::Closed,
            under_contract_date: NaiveDate::from_ymd_opt(Utc::now().year(), 1, 10),
            sale_price: "$450,000".to_owned(),
            closing_date: NaiveDate::from_ymd_opt(Utc::now().year(), 3, 10),
            gross_commission_income: "13500".to_owned(),
            attachment: None,
            existing_image_url: None,
        }
    }

    fn attachment() -> ImageAttachment {
        ImageAttachment {
            file_name: "house.jpg".to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    fn service_with<I: ImageStore>(
        store: ScriptedTransactionStore,
        images: I,
        refresh: RefreshSignal,
    ) -> TransactionService<ScriptedTransactionStore, I> {
        TransactionService::with_executor(
            Arc::new(store),
            Arc::new(images),
            refresh,
            RetryingExecutor::with_sleeper(RetryPolicy::default(), Arc::new(InstantSleeper)),
        )
    }

    #[tokio::test]
    async fn submit_saves_and_publishes_the_refresh_signal() {
        let refresh = RefreshSignal::new();
        let mut listener = refresh.subscribe();
        let service = service_with(
            ScriptedTransactionStore::new(vec![Ok(())]),
            FixtureImageStore,
            refresh,
        );

        let outcome = service.submit(&draft()).await.expect("submit succeeds");

        assert!(outcome.image_warning.is_none());
        assert!(listener.try_changed());
    }

    #[tokio::test]
    async fn submit_retries_transient_store_failures() {
        let refresh = RefreshSignal::new();
        let service = service_with(
            ScriptedTransactionStore::new(vec![
                Err(TransactionStoreError::transport("network unreachable")),
                Err(TransactionStoreError::timeout("connection timed out")),
                Ok(()),
            ]),
            FixtureImageStore,
            refresh,
        );

        let outcome = service.submit(&draft()).await.expect("submit succeeds");
        assert_eq!(service.transactions.calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.transaction.sale_price, Some(450_000.0));
    }

    #[tokio::test]
    async fn submit_gives_up_on_permanent_store_failures_without_publishing() {
        let refresh = RefreshSignal::new();
        let mut listener = refresh.subscribe();
        let service = service_with(
            ScriptedTransactionStore::new(vec![Err(TransactionStoreError::rejected(
                "status 403: row-level security",
            ))]),
            FixtureImageStore,
            refresh,
        );

        let err = service.submit(&draft()).await.expect_err("submit must fail");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert!(err.message().starts_with("Failed to save transaction."));
        assert_eq!(service.transactions.calls.load(Ordering::SeqCst), 1);
        assert!(!listener.try_changed());
    }

    #[tokio::test]
    async fn photo_upload_failure_is_not_fatal_to_the_save() {
        let refresh = RefreshSignal::new();
        let service = service_with(
            ScriptedTransactionStore::new(vec![Ok(())]),
            FailingImageStore {
                error: ImageStoreError::not_found("bucket does not exist"),
            },
            refresh,
        );
        let mut input = draft();
        input.attachment = Some(attachment());

        let outcome = service.submit(&input).await.expect("submit succeeds");

        assert_eq!(outcome.transaction.image_url, None);
        assert_eq!(
            outcome.image_warning.as_deref(),
            Some("Image upload is currently unavailable. Please try again later or contact support.")
        );
    }

    #[tokio::test]
    async fn successful_upload_stamps_the_public_url() {
        let refresh = RefreshSignal::new();
        let service = service_with(
            ScriptedTransactionStore::new(vec![Ok(())]),
            FixtureImageStore,
            refresh,
        );
        let mut input = draft();
        input.attachment = Some(attachment());

        let outcome = service.submit(&input).await.expect("submit succeeds");
        let url = outcome.transaction.image_url.expect("image url present");
        assert!(url.starts_with("https://storage.invalid/public/"));
        assert!(url.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn editing_keeps_the_previous_photo_when_none_is_selected() {
        let refresh = RefreshSignal::new();
        let service = service_with(
            ScriptedTransactionStore::new(vec![Ok(())]),
            FixtureImageStore,
            refresh,
        );
        let mut input = draft();
        input.editing_id = Some(Uuid::new_v4());
        input.existing_image_url = Some("https://storage.invalid/public/kept.jpg".to_owned());

        let outcome = service.submit(&input).await.expect("submit succeeds");
        assert_eq!(
            outcome.transaction.image_url.as_deref(),
            Some("https://storage.invalid/public/kept.jpg")
        );
    }

    #[tokio::test]
    async fn delete_publishes_the_refresh_signal() {
        let refresh = RefreshSignal::new();
        let mut listener = refresh.subscribe();
        let service = service_with(
            ScriptedTransactionStore::new(Vec::new()),
            FixtureImageStore,
            refresh,
        );

        service
            .delete(Uuid::new_v4())
            .await
            .expect("delete succeeds");
        assert!(listener.try_changed());
    }

    #[rstest::rstest]
    #[case(ImageStoreError::denied("policy violation"), "currently unavailable")]
    #[case(ImageStoreError::too_large("413 payload too large"), "too large for storage")]
    #[case(ImageStoreError::transport("connection reset"), "continue without an image")]
    fn upload_warnings_map_per_error_family(
        #[case] error: ImageStoreError,
        #[case] expected: &str,
    ) {
        assert!(upload_warning(&error).contains(expected));
    }
}
