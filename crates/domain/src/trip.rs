//! Trip request types and validation rules.

use serde::Serialize;
use serde_json::Value;

use crate::validation::FieldViolation;

/// Minimum destination length in characters.
pub const DESTINATION_MIN_CHARS: usize = 2;

/// Maximum destination length in characters.
pub const DESTINATION_MAX_CHARS: usize = 100;

/// Maximum trip duration in days.
pub const MAX_TRIP_DAYS: u8 = 30;

/// Maximum number of interests per request.
pub const MAX_INTERESTS: usize = 5;

/// Maximum traveler count per request.
pub const MAX_TRAVELERS: u8 = 20;

/// Spending profile for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    /// Low budget: hostels, street food.
    Economic,
    /// Mid-range value for money.
    Balanced,
    /// Four-star hotels and good restaurants.
    Comfort,
}

impl Budget {
    /// Returns the wire identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economic => "economic",
            Self::Balanced => "balanced",
            Self::Comfort => "comfort",
        }
    }

    /// Parses a wire identifier into a budget.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "economic" => Some(Self::Economic),
            "balanced" => Some(Self::Balanced),
            "comfort" => Some(Self::Comfort),
            _ => None,
        }
    }
}

/// Daily activity density for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    /// 2-3 activities per day with free time.
    Relaxed,
    /// 4-5 activities per day.
    Balanced,
    /// Packed days.
    Intense,
}

impl Pace {
    /// Returns the wire identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Balanced => "balanced",
            Self::Intense => "intense",
        }
    }

    /// Parses a wire identifier into a pace.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "relaxed" => Some(Self::Relaxed),
            "balanced" => Some(Self::Balanced),
            "intense" => Some(Self::Intense),
            _ => None,
        }
    }
}

/// Closed set of trip interests selectable by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interest {
    /// Museums and cultural venues.
    Culture,
    /// Nature and hiking.
    Nature,
    /// Local food and restaurants.
    Gastronomie,
    /// Historical sites and heritage.
    Histoire,
    /// Beaches and water activities.
    Plage,
    /// Adventure and adrenaline.
    Aventure,
    /// Shopping and markets.
    Shopping,
    /// Spa and downtime.
    Relaxation,
    /// Off-the-beaten-path experiences.
    Insolite,
    /// Sports and physical activities.
    Sport,
    /// Nightlife and bars.
    VieNocturne,
    /// Family-friendly activities.
    Famille,
}

impl Interest {
    /// Returns the wire identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Culture => "culture",
            Self::Nature => "nature",
            Self::Gastronomie => "gastronomie",
            Self::Histoire => "histoire",
            Self::Plage => "plage",
            Self::Aventure => "aventure",
            Self::Shopping => "shopping",
            Self::Relaxation => "relaxation",
            Self::Insolite => "insolite",
            Self::Sport => "sport",
            Self::VieNocturne => "vie_nocturne",
            Self::Famille => "famille",
        }
    }

    /// Parses a wire identifier into an interest.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "culture" => Some(Self::Culture),
            "nature" => Some(Self::Nature),
            "gastronomie" => Some(Self::Gastronomie),
            "histoire" => Some(Self::Histoire),
            "plage" => Some(Self::Plage),
            "aventure" => Some(Self::Aventure),
            "shopping" => Some(Self::Shopping),
            "relaxation" => Some(Self::Relaxation),
            "insolite" => Some(Self::Insolite),
            "sport" => Some(Self::Sport),
            "vie_nocturne" => Some(Self::VieNocturne),
            "famille" => Some(Self::Famille),
            _ => None,
        }
    }
}

/// A validated, normalized itinerary-generation request.
///
/// Construction goes through [`TripRequest::from_value`], which enforces every
/// field constraint before any quota is consumed or any external call is made.
/// The `Serialize` implementation is the canonical form used for
/// fingerprinting: struct field order is fixed, so two structurally identical
/// requests serialize identically regardless of the key order of their source
/// JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    /// Destination, trimmed.
    pub destination: String,
    /// Trip duration in days (1-30).
    pub days: u8,
    /// Spending profile.
    pub budget: Budget,
    /// Selected interests, order-preserving (1-5 entries).
    pub interests: Vec<Interest>,
    /// Daily activity density.
    pub pace: Pace,
    /// Traveler count (1-20) when provided.
    pub travelers: Option<u8>,
    /// Departure date as `YYYY-MM-DD` when provided.
    pub start_date: Option<String>,
}

impl TripRequest {
    /// Validates an arbitrary JSON value into a normalized trip request.
    ///
    /// Total and pure: no I/O, every constraint checked, all violations
    /// collected rather than stopping at the first. Unknown fields are
    /// ignored.
    pub fn from_value(value: &Value) -> Result<Self, Vec<FieldViolation>> {
        let Some(object) = value.as_object() else {
            return Err(vec![FieldViolation::new(
                "body",
                "request body must be a JSON object",
            )]);
        };

        let mut violations = Vec::new();

        let destination = validate_destination(object.get("destination"), &mut violations);
        let days = validate_days(object.get("days"), &mut violations);
        let budget = validate_budget(object.get("budget"), &mut violations);
        let interests = validate_interests(object.get("interests"), &mut violations);
        let pace = validate_pace(object.get("pace"), &mut violations);
        let travelers = validate_travelers(object.get("travelers"), &mut violations);
        let start_date = validate_start_date(object.get("startDate"), &mut violations);

        if !violations.is_empty() {
            return Err(violations);
        }

        match (destination, days, budget, interests, pace) {
            (Some(destination), Some(days), Some(budget), Some(interests), Some(pace)) => {
                Ok(Self {
                    destination,
                    days,
                    budget,
                    interests,
                    pace,
                    travelers,
                    start_date,
                })
            }
            // Unreachable when no violation was recorded; kept as a guard
            // against helpers drifting out of sync.
            _ => Err(vec![FieldViolation::new(
                "body",
                "request validation failed",
            )]),
        }
    }
}

fn validate_destination(
    value: Option<&Value>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let Some(value) = value else {
        violations.push(FieldViolation::new("destination", "is required"));
        return None;
    };

    let Some(raw) = value.as_str() else {
        violations.push(FieldViolation::new("destination", "must be a string"));
        return None;
    };

    let trimmed = raw.trim();
    let char_count = trimmed.chars().count();

    if char_count < DESTINATION_MIN_CHARS {
        violations.push(FieldViolation::new(
            "destination",
            format!("must be at least {DESTINATION_MIN_CHARS} characters"),
        ));
        return None;
    }

    if char_count > DESTINATION_MAX_CHARS {
        violations.push(FieldViolation::new(
            "destination",
            format!("must not exceed {DESTINATION_MAX_CHARS} characters"),
        ));
        return None;
    }

    if !trimmed.chars().all(is_destination_char) {
        violations.push(FieldViolation::new(
            "destination",
            "may only contain letters, spaces, hyphens, apostrophes and commas",
        ));
        return None;
    }

    Some(trimmed.to_owned())
}

fn is_destination_char(character: char) -> bool {
    character.is_alphabetic()
        || character.is_whitespace()
        || matches!(character, '-' | '\'' | ',')
}

fn validate_days(value: Option<&Value>, violations: &mut Vec<FieldViolation>) -> Option<u8> {
    let Some(value) = value else {
        violations.push(FieldViolation::new("days", "is required"));
        return None;
    };

    let Some(days) = value.as_u64() else {
        violations.push(FieldViolation::new("days", "must be an integer"));
        return None;
    };

    if !(1..=u64::from(MAX_TRIP_DAYS)).contains(&days) {
        violations.push(FieldViolation::new(
            "days",
            format!("must be between 1 and {MAX_TRIP_DAYS}"),
        ));
        return None;
    }

    u8::try_from(days).ok()
}

fn validate_budget(value: Option<&Value>, violations: &mut Vec<FieldViolation>) -> Option<Budget> {
    let Some(value) = value else {
        violations.push(FieldViolation::new("budget", "is required"));
        return None;
    };

    let budget = value.as_str().and_then(Budget::parse);
    if budget.is_none() {
        violations.push(FieldViolation::new(
            "budget",
            "must be one of: economic, balanced, comfort",
        ));
    }

    budget
}

fn validate_pace(value: Option<&Value>, violations: &mut Vec<FieldViolation>) -> Option<Pace> {
    let Some(value) = value else {
        violations.push(FieldViolation::new("pace", "is required"));
        return None;
    };

    let pace = value.as_str().and_then(Pace::parse);
    if pace.is_none() {
        violations.push(FieldViolation::new(
            "pace",
            "must be one of: relaxed, balanced, intense",
        ));
    }

    pace
}

fn validate_interests(
    value: Option<&Value>,
    violations: &mut Vec<FieldViolation>,
) -> Option<Vec<Interest>> {
    let Some(value) = value else {
        violations.push(FieldViolation::new("interests", "is required"));
        return None;
    };

    let Some(entries) = value.as_array() else {
        violations.push(FieldViolation::new("interests", "must be an array"));
        return None;
    };

    if entries.is_empty() {
        violations.push(FieldViolation::new(
            "interests",
            "must contain at least 1 interest",
        ));
        return None;
    }

    if entries.len() > MAX_INTERESTS {
        violations.push(FieldViolation::new(
            "interests",
            format!("must not contain more than {MAX_INTERESTS} interests"),
        ));
        return None;
    }

    let mut interests = Vec::with_capacity(entries.len());
    let mut valid = true;

    for (index, entry) in entries.iter().enumerate() {
        match entry.as_str().and_then(Interest::parse) {
            Some(interest) => interests.push(interest),
            None => {
                violations.push(FieldViolation::new(
                    format!("interests.{index}"),
                    "is not a known interest",
                ));
                valid = false;
            }
        }
    }

    valid.then_some(interests)
}

fn validate_travelers(value: Option<&Value>, violations: &mut Vec<FieldViolation>) -> Option<u8> {
    let value = match value {
        None | Some(Value::Null) => return None,
        Some(value) => value,
    };

    let Some(travelers) = value.as_u64() else {
        violations.push(FieldViolation::new("travelers", "must be an integer"));
        return None;
    };

    if !(1..=u64::from(MAX_TRAVELERS)).contains(&travelers) {
        violations.push(FieldViolation::new(
            "travelers",
            format!("must be between 1 and {MAX_TRAVELERS}"),
        ));
        return None;
    }

    u8::try_from(travelers).ok()
}

fn validate_start_date(
    value: Option<&Value>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let value = match value {
        None | Some(Value::Null) => return None,
        Some(value) => value,
    };

    let Some(date) = value.as_str() else {
        violations.push(FieldViolation::new("startDate", "must be a string"));
        return None;
    };

    if !is_iso_date_shape(date) {
        violations.push(FieldViolation::new(
            "startDate",
            "must use the YYYY-MM-DD format",
        ));
        return None;
    }

    Some(date.to_owned())
}

fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| matches!(index, 4 | 7) || byte.is_ascii_digit())
}
