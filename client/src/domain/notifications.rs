//! Monthly reminder preference.
//!
//! The native shell owns actual notification delivery; this side only
//! remembers whether the agent opted in, in the device-local preference
//! store. The service is a constructed instance handed to whichever screen
//! needs it — there is no global accessor.

use std::sync::Arc;

use crate::domain::Error;
use crate::domain::ports::PreferenceStore;

const MONTHLY_REMINDER_KEY: &str = "monthly_reminder_enabled";

/// Reminder opt-in flag backed by the preference store.
pub struct NotificationPreferences<P> {
    store: Arc<P>,
}

impl<P> NotificationPreferences<P> {
    /// Build the service over a preference store.
    pub fn new(store: Arc<P>) -> Self {
        Self { store }
    }
}

impl<P> NotificationPreferences<P>
where
    P: PreferenceStore,
{
    /// Record that the agent wants the monthly reminder.
    pub fn enable_monthly_reminder(&self) -> Result<(), Error> {
        self.store
            .set(MONTHLY_REMINDER_KEY, "true")
            .map_err(|error| {
                tracing::error!(%error, "failed to persist reminder opt-in");
                Error::internal("Could not save your notification preference.")
            })
    }

    /// Record that the agent declined the monthly reminder.
    pub fn disable_monthly_reminder(&self) -> Result<(), Error> {
        self.store
            .set(MONTHLY_REMINDER_KEY, "false")
            .map_err(|error| {
                tracing::error!(%error, "failed to persist reminder opt-out");
                Error::internal("Could not save your notification preference.")
            })
    }

    /// Whether the monthly reminder is enabled. An unreadable or absent
    /// flag reads as disabled rather than failing the settings screen.
    pub fn is_monthly_reminder_enabled(&self) -> bool {
        match self.store.get(MONTHLY_REMINDER_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(error) => {
                tracing::warn!(%error, "failed to read reminder preference");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour coverage for the reminder preference.

    use super::*;
    use crate::domain::ports::{FixturePreferenceStore, MockPreferenceStore, PreferenceStoreError};

    #[test]
    fn flag_round_trips_through_the_store() {
        let prefs = NotificationPreferences::new(Arc::new(FixturePreferenceStore::default()));
        assert!(!prefs.is_monthly_reminder_enabled());

        prefs.enable_monthly_reminder().expect("enable succeeds");
        assert!(prefs.is_monthly_reminder_enabled());

        prefs.disable_monthly_reminder().expect("disable succeeds");
        assert!(!prefs.is_monthly_reminder_enabled());
    }

    #[test]
    fn unreadable_flag_reads_as_disabled() {
        let mut store = MockPreferenceStore::new();
        store
            .expect_get()
            .returning(|_| Err(PreferenceStoreError::io("disk unavailable")));

        let prefs = NotificationPreferences::new(Arc::new(store));
        assert!(!prefs.is_monthly_reminder_enabled());
    }

    #[test]
    fn write_failure_surfaces_a_friendly_error() {
        let mut store = MockPreferenceStore::new();
        store
            .expect_set()
            .returning(|_, _| Err(PreferenceStoreError::io("read-only filesystem")));

        let prefs = NotificationPreferences::new(Arc::new(store));
        let err = prefs
            .enable_monthly_reminder()
            .expect_err("enable must fail");
        assert_eq!(err.message(), "Could not save your notification preference.");
    }
}
