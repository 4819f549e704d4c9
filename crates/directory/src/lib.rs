//! Typed access to the upstream property-management service.
//!
//! The [`DirectoryProvider`] trait is the capability seam the rest of the
//! system programs against; [`RestDirectoryClient`] is its production
//! implementation over the service's REST API. The adapter is a pure I/O
//! layer: no business logic, no cross-request caching.

pub mod provider;
pub mod rest;
pub mod types;

pub use provider::DirectoryProvider;
pub use rest::RestDirectoryClient;
pub use types::{Property, Reservation};
