use async_trait::async_trait;
use chrono::NaiveDate;
use ik_domain::error::Result;

use crate::types::{Property, Reservation};

/// Capability seam over the upstream property-management service.
///
/// Every operation is a network call and may fail with an upstream-error
/// condition the caller must treat as non-fatal-but-reportable.
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Fetch the full property catalog.
    async fn list_properties(&self) -> Result<Vec<Property>>;

    /// Fetch one property. Unknown ids fail with [`ik_domain::Error::NotFound`].
    async fn get_property(&self, id: &str) -> Result<Property>;

    /// Case-insensitive substring match against the property name.
    /// Nothing matching is an empty vec, not an error.
    async fn find_properties_by_name(&self, needle: &str) -> Result<Vec<Property>>;

    /// Case-insensitive substring match against the property's city.
    async fn find_properties_by_city(&self, needle: &str) -> Result<Vec<Property>>;

    /// All reservations (any status) for the given property ids, optionally
    /// narrowed by a date window. The window is a filter hint only — the
    /// upstream's windowing semantics are not guaranteed exact, so callers
    /// must still apply the precise overlap test themselves.
    async fn reservations(
        &self,
        property_ids: &[String],
        window: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Reservation>>;
}
