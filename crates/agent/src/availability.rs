//! Booking-availability resolution.
//!
//! Given a scope selector (property id, property name, or city) and a date
//! range, resolve the scope to concrete property ids, fetch their
//! reservations, and reduce to a [`Verdict`]. Every failure mode —
//! validation, not-found, ambiguity, upstream errors — folds into a
//! verdict; [`AvailabilityResolver::resolve`] never raises.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ik_directory::types::Reservation;
use ik_directory::{DirectoryProvider, Property};
use ik_domain::error::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Query & verdict types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An availability question, exactly as decoded from the model's tool
/// call. Everything is optional here; validation is the resolver's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
}

/// Structured reason code carried next to the human-readable message so a
/// supervising layer can tell "not found" from "upstream unavailable"
/// without parsing message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    Available,
    Unavailable,
    MissingDates,
    InvalidDateFormat,
    InvalidDateOrder,
    MissingScope,
    NotFound,
    AmbiguousName,
    UpstreamError,
}

/// The resolved, user-presentable outcome of an availability query.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub available: bool,
    pub kind: VerdictKind,
    pub message: String,
    /// City scope only: display names of the properties that are free.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_properties: Vec<String>,
}

impl Verdict {
    fn negative(kind: VerdictKind, message: impl Into<String>) -> Self {
        Self {
            available: false,
            kind,
            message: message.into(),
            available_properties: Vec::new(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolves availability queries against the property directory.
pub struct AvailabilityResolver {
    directory: Arc<dyn DirectoryProvider>,
}

/// A validated scope, ready for the overlap check.
enum Scope {
    /// One property, addressed by id (given directly or resolved from a
    /// unique name match). Single-scope messages never enumerate names.
    Single { id: String },
    /// Every property in a city; display names retained for the verdict.
    City {
        name: String,
        properties: Vec<Property>,
    },
}

impl AvailabilityResolver {
    pub fn new(directory: Arc<dyn DirectoryProvider>) -> Self {
        Self { directory }
    }

    /// Resolve a query into a verdict. Never fails: directory errors
    /// degrade to an availability-unknown verdict instead of terminating
    /// the conversation turn.
    pub async fn resolve(&self, query: &AvailabilityQuery) -> Verdict {
        let (check_in, check_out) = match validate_dates(query) {
            Ok(dates) => dates,
            Err(verdict) => return verdict,
        };

        if selector(&query.property_id).is_none()
            && selector(&query.property_name).is_none()
            && selector(&query.city_name).is_none()
        {
            return Verdict::negative(
                VerdictKind::MissingScope,
                "Please provide a property id, property name, or city name.",
            );
        }

        match self.resolve_checked(query, check_in, check_out).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(error = %e, "availability check degraded to unknown");
                Verdict::negative(
                    VerdictKind::UpstreamError,
                    format!("Could not check availability right now: {e}"),
                )
            }
        }
    }

    async fn resolve_checked(
        &self,
        query: &AvailabilityQuery,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Verdict, Error> {
        let scope = match self.resolve_scope(query).await? {
            Ok(scope) => scope,
            Err(verdict) => return Ok(verdict),
        };

        match scope {
            Scope::Single { id } => {
                let free = self.property_is_free(&id, check_in, check_out).await?;
                Ok(if free {
                    Verdict {
                        available: true,
                        kind: VerdictKind::Available,
                        message: "The property is available for these dates.".into(),
                        available_properties: Vec::new(),
                    }
                } else {
                    Verdict::negative(
                        VerdictKind::Unavailable,
                        "The property is not available for these dates.",
                    )
                })
            }
            Scope::City { name, properties } => {
                // Strictly sequential per the resource model: one
                // reservation fetch per property, no internal parallelism.
                let mut free_names = Vec::new();
                for property in &properties {
                    if self.property_is_free(&property.id, check_in, check_out).await? {
                        free_names.push(property.display_name().to_owned());
                    }
                }

                Ok(if free_names.is_empty() {
                    Verdict::negative(
                        VerdictKind::Unavailable,
                        format!("No properties in {name} are available for these dates."),
                    )
                } else {
                    Verdict {
                        available: true,
                        kind: VerdictKind::Available,
                        message: format!(
                            "The following properties in {name} are available: {}",
                            free_names.join(", ")
                        ),
                        available_properties: free_names,
                    }
                })
            }
        }
    }

    /// Turn the query's scope selector into concrete properties.
    ///
    /// Selector precedence is id > name > city (mutually exclusive
    /// resolution paths). The inner `Err` carries early verdicts
    /// (not-found, ambiguity); the outer `Err` is an upstream failure.
    async fn resolve_scope(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Result<Scope, Verdict>, Error> {
        if let Some(id) = selector(&query.property_id) {
            // Id given: no directory lookup needed.
            return Ok(Ok(Scope::Single { id: id.to_owned() }));
        }

        if let Some(name) = selector(&query.property_name) {
            let matches = self.directory.find_properties_by_name(name).await?;
            return Ok(match matches.len() {
                0 => Err(Verdict::negative(
                    VerdictKind::NotFound,
                    format!("Property '{name}' not found."),
                )),
                1 => Ok(Scope::Single {
                    id: matches[0].id.clone(),
                }),
                _ => {
                    // More than one hit: surface the ambiguity instead of
                    // silently taking the first match.
                    let names: Vec<&str> =
                        matches.iter().map(|p| p.display_name()).collect();
                    Err(Verdict::negative(
                        VerdictKind::AmbiguousName,
                        format!(
                            "Multiple properties match '{name}': {}. Please pick one.",
                            names.join(", ")
                        ),
                    ))
                }
            });
        }

        // Scope presence was checked up front, so city must be set here.
        let city = selector(&query.city_name).unwrap_or_default();
        let properties = self.directory.find_properties_by_city(city).await?;
        if properties.is_empty() {
            return Ok(Err(Verdict::negative(
                VerdictKind::NotFound,
                format!("No properties found in {city}."),
            )));
        }
        Ok(Ok(Scope::City {
            name: city.to_owned(),
            properties,
        }))
    }

    /// True when no non-cancelled reservation overlaps the query window.
    async fn property_is_free(
        &self,
        property_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, Error> {
        let reservations = self
            .directory
            .reservations(&[property_id.to_owned()], Some((check_in, check_out)))
            .await?;
        Ok(reservations
            .iter()
            .all(|r| !occupies(r, check_in, check_out)))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pure helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Treat missing, empty, and whitespace-only selectors alike.
fn selector(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Validate and parse the query's dates, producing an early verdict on
/// any problem. Runs before the first network call.
fn validate_dates(query: &AvailabilityQuery) -> Result<(NaiveDate, NaiveDate), Verdict> {
    let (Some(check_in), Some(check_out)) =
        (selector(&query.check_in), selector(&query.check_out))
    else {
        return Err(Verdict::negative(
            VerdictKind::MissingDates,
            "Please provide both check-in and check-out dates.",
        ));
    };

    let parse = |raw: &str| NaiveDate::parse_from_str(raw, "%Y-%m-%d");
    let (Ok(start), Ok(end)) = (parse(check_in), parse(check_out)) else {
        return Err(Verdict::negative(
            VerdictKind::InvalidDateFormat,
            "Dates must be in YYYY-MM-DD format (e.g. 2025-06-10).",
        ));
    };

    if start >= end {
        return Err(Verdict::negative(
            VerdictKind::InvalidDateOrder,
            "Check-out date must be after check-in date.",
        ));
    }

    Ok((start, end))
}

/// Half-open interval overlap: a reservation blocks the stay iff
/// `check_in < departure && check_out > arrival`. Touching at a boundary
/// is not a conflict — same-day back-to-back turnover is allowed.
///
/// A non-cancelled reservation whose dates fail to parse counts as
/// occupying: availability errs toward "not available" over a possible
/// double booking.
fn occupies(reservation: &Reservation, check_in: NaiveDate, check_out: NaiveDate) -> bool {
    if reservation.is_cancelled() {
        return false;
    }
    match (reservation.arrival(), reservation.departure()) {
        (Ok(arrival), Ok(departure)) => check_in < departure && check_out > arrival,
        _ => {
            tracing::warn!(
                reservation_id = %reservation.id,
                "reservation has unparseable dates; treating it as occupying"
            );
            true
        }
    }
}
