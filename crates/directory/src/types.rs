//! Wire types for the property directory API.
//!
//! Every field carries a serde default so partially-populated upstream
//! records still deserialize; normalization to a fixed presentation shape
//! happens downstream, not here.

use chrono::NaiveDate;
use ik_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Standard `{"data": ...}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Property
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A property record as the upstream service reports it.
///
/// Read-through projection of upstream state — never created or mutated
/// on this side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub public_name: Option<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub listed: bool,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub checkin: Option<String>,
    #[serde(default)]
    pub checkout: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Guest/bedroom/bathroom counts — shape defined by upstream.
    #[serde(default)]
    pub capacity: serde_json::Value,
    #[serde(default)]
    pub house_rules: serde_json::Value,
    #[serde(default)]
    pub calendar_restricted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Property {
    /// The guest-facing name when set, otherwise the internal one.
    pub fn display_name(&self) -> &str {
        match self.public_name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => &self.name,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reservation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Status value that never blocks availability.
pub const STATUS_CANCELLED: &str = "cancelled";

/// A reservation as the upstream service reports it. Fetched fresh per
/// query, never persisted locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    #[serde(default)]
    pub property_id: String,
    /// ISO-8601; may carry a time component and/or a trailing `Z`.
    #[serde(default)]
    pub arrival_date: String,
    #[serde(default)]
    pub departure_date: String,
    #[serde(default)]
    pub status: String,
}

impl Reservation {
    pub fn is_cancelled(&self) -> bool {
        self.status == STATUS_CANCELLED
    }

    pub fn arrival(&self) -> Result<NaiveDate> {
        parse_calendar_date(&self.arrival_date)
    }

    pub fn departure(&self) -> Result<NaiveDate> {
        parse_calendar_date(&self.departure_date)
    }
}

/// Extract the calendar date from an upstream timestamp.
///
/// Upstream sends either a bare `YYYY-MM-DD` or a full ISO-8601 timestamp
/// (possibly `Z`-suffixed); only the date component matters here.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate> {
    let date_part = raw.trim_end_matches('Z').split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| Error::Directory(format!("unparseable date {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_property_record_deserializes() {
        let raw = r#"{"id": "P1", "name": "The Walk Flat"}"#;
        let p: Property = serde_json::from_str(raw).unwrap();
        assert_eq!(p.id, "P1");
        assert_eq!(p.display_name(), "The Walk Flat");
        assert!(p.address.city.is_none());
        assert!(p.amenities.is_empty());
    }

    #[test]
    fn public_name_wins_display() {
        let raw = r#"{"id": "P1", "name": "unit-12", "public_name": "Marina Loft"}"#;
        let p: Property = serde_json::from_str(raw).unwrap();
        assert_eq!(p.display_name(), "Marina Loft");
    }

    #[test]
    fn full_envelope_deserializes() {
        let raw = r#"{
            "data": [{
                "id": "P2",
                "name": "Sea View",
                "address": {
                    "display": "1 Beach Rd",
                    "city": "Dubai",
                    "country_name": "United Arab Emirates",
                    "coordinates": {"latitude": 25.2, "longitude": 55.27}
                },
                "listed": true,
                "currency": "AED",
                "amenities": ["wifi", "pool"],
                "capacity": {"max": 4, "bedrooms": 2, "bathrooms": 1}
            }]
        }"#;
        let env: DataEnvelope<Vec<Property>> = serde_json::from_str(raw).unwrap();
        assert_eq!(env.data.len(), 1);
        assert_eq!(env.data[0].address.city.as_deref(), Some("Dubai"));
        assert_eq!(env.data[0].capacity["max"], 4);
    }

    #[test]
    fn calendar_date_accepts_plain_and_timestamped() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert_eq!(parse_calendar_date("2025-06-10").unwrap(), expected);
        assert_eq!(parse_calendar_date("2025-06-10T15:00:00Z").unwrap(), expected);
        assert_eq!(parse_calendar_date("2025-06-10T00:00:00").unwrap(), expected);
    }

    #[test]
    fn calendar_date_rejects_garbage() {
        assert!(parse_calendar_date("June 10").is_err());
        assert!(parse_calendar_date("2025-13-40").is_err());
        assert!(parse_calendar_date("").is_err());
    }

    #[test]
    fn cancelled_status_detected() {
        let r = Reservation { status: "cancelled".into(), ..Default::default() };
        assert!(r.is_cancelled());
        let r = Reservation { status: "accepted".into(), ..Default::default() };
        assert!(!r.is_cancelled());
    }
}
