//! Property-detail normalization.
//!
//! Raw directory records vary in completeness; downstream consumers (the
//! reply renderer, and ultimately the guest) rely on a fixed attribute
//! shape. Absent upstream fields are filled with an explicit `"N/A"`
//! sentinel instead of omitting the key.

use std::sync::Arc;

use serde::Serialize;

use ik_directory::{DirectoryProvider, Property};
use ik_domain::error::Result;

/// Sentinel for attributes the upstream record does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Normalized shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A property record normalized to a stable, front-end-agnostic shape.
/// Every key is always present.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyDetails {
    pub id: String,
    pub name: String,
    pub public_name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub coordinates: NormalizedCoordinates,
    pub timezone: String,
    pub listed: bool,
    pub currency: String,
    pub summary: String,
    pub description: String,
    pub checkin: String,
    pub checkout: String,
    pub amenities: Vec<String>,
    pub capacity: serde_json::Value,
    pub house_rules: serde_json::Value,
    pub calendar_restricted: bool,
}

/// Coordinates rendered as strings so the sentinel fits the same slot.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedCoordinates {
    pub latitude: String,
    pub longitude: String,
}

impl From<&Property> for PropertyDetails {
    fn from(p: &Property) -> Self {
        Self {
            id: p.id.clone(),
            name: or_na_str(&p.name),
            public_name: or_na(&p.public_name),
            address: or_na(&p.address.display),
            city: or_na(&p.address.city),
            country: or_na(&p.address.country_name),
            coordinates: NormalizedCoordinates {
                latitude: num_or_na(p.address.coordinates.latitude),
                longitude: num_or_na(p.address.coordinates.longitude),
            },
            timezone: or_na(&p.timezone),
            listed: p.listed,
            currency: or_na(&p.currency),
            summary: or_na(&p.summary),
            description: or_na(&p.description),
            checkin: or_na(&p.checkin),
            checkout: or_na(&p.checkout),
            amenities: p.amenities.clone(),
            capacity: object_or_empty(&p.capacity),
            house_rules: object_or_empty(&p.house_rules),
            calendar_restricted: p.calendar_restricted,
        }
    }
}

fn or_na(value: &Option<String>) -> String {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v.to_owned(),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

fn or_na_str(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_owned()
    } else {
        value.to_owned()
    }
}

fn num_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), |v| v.to_string())
}

fn object_or_empty(value: &serde_json::Value) -> serde_json::Value {
    if value.is_null() {
        serde_json::json!({})
    } else {
        value.clone()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Formatter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Fetches and normalizes property details.
pub struct DetailFormatter {
    directory: Arc<dyn DirectoryProvider>,
}

impl DetailFormatter {
    pub fn new(directory: Arc<dyn DirectoryProvider>) -> Self {
        Self { directory }
    }

    /// With an id: that single property, normalized (unknown ids propagate
    /// `Error::NotFound` for the caller to render as an error payload).
    /// Without: the whole catalog, one entry per upstream record.
    pub async fn fetch(&self, property_id: Option<&str>) -> Result<Vec<PropertyDetails>> {
        match property_id {
            Some(id) => {
                let property = self.directory.get_property(id).await?;
                Ok(vec![PropertyDetails::from(&property)])
            }
            None => {
                let properties = self.directory.list_properties().await?;
                Ok(properties.iter().map(PropertyDetails::from).collect())
            }
        }
    }
}
