//! Domain entities, calculators, and driving services.
//!
//! Purpose: define the strongly typed model for transactions and goals,
//! the pure computations the dashboards render (progress bands, list
//! ordering, display formatting), and the services that orchestrate remote
//! calls through the driven ports in [`ports`].
//!
//! Conventions:
//! - entities are immutable once constructed; form input is parsed into
//!   typed values during validation, never stored raw on an entity;
//! - services recover every remote failure into an [`Error`] carrying a
//!   user-presentable message — detailed remote descriptors are logged,
//!   not surfaced;
//! - anything with a port dependency takes it explicitly (no globals).

pub mod error;
pub mod goals;
pub mod notifications;
pub mod ports;
pub mod refresh;
pub mod retry;
pub mod sessions;
pub mod transactions;

mod validation;

pub use self::error::{Error, ErrorCode};
pub use self::refresh::{RefreshListener, RefreshSignal};
pub use self::retry::{AttemptGauge, RetryPolicy, RetrySleeper, RetryingExecutor, TokioSleeper};
