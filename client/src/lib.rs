//! Client-side core for the sales performance tracker.
//!
//! The crate is split along a hexagonal boundary: [`domain`] holds entities,
//! pure calculators, driving services, and the driven port traits those
//! services depend on; [`outbound`] holds the adapters that implement the
//! ports against the hosted backend platform and the local filesystem.
//!
//! UI shells construct the adapters, wire them into the services, and render
//! whatever the services return. Nothing in this crate draws a screen.

pub mod domain;
pub mod outbound;
