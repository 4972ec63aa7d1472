//! Driven ports for the hexagonal boundary.
//!
//! Each port owns its request/response shapes and a message-carrying error
//! enum whose rendered form mirrors the remote error descriptor. Every port
//! ships a `Fixture*` implementation for code paths that do not exercise
//! the adapter, and a mockall mock for behaviour tests.

mod goal_store;
mod image_store;
mod preference_store;
mod session_service;
mod transaction_store;

#[cfg(test)]
pub use goal_store::MockGoalStore;
pub use goal_store::{FixtureGoalStore, GoalStore, GoalStoreError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{FixtureImageStore, ImageStore, ImageStoreError, StoredImage};
#[cfg(test)]
pub use preference_store::MockPreferenceStore;
pub use preference_store::{FixturePreferenceStore, PreferenceStore, PreferenceStoreError};
#[cfg(test)]
pub use session_service::MockSessionService;
pub use session_service::{
    AuthChange, AuthChangeListener, Credentials, FixtureSessionService, NewAccount, Session,
    SessionService, SessionServiceError, UserProfile,
};
#[cfg(test)]
pub use transaction_store::MockTransactionStore;
pub use transaction_store::{FixtureTransactionStore, TransactionStore, TransactionStoreError};
