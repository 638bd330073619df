//! Itinerary types and the response schema validator.
//!
//! The generation service is untrusted: nothing it produces is persisted or
//! returned to callers without passing [`Itinerary::from_value`] field for
//! field. Wrong-typed or missing required fields are rejected, never coerced.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::{FieldViolation, join_path};

/// Maximum activities per itinerary day.
pub const MAX_ACTIVITIES_PER_DAY: usize = 8;

/// A validated, structured travel plan produced by the generation service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// Destination as echoed by the generator.
    pub destination: String,
    /// Ordered day plans, at least one.
    pub days: Vec<DayPlan>,
    /// Estimated spending breakdown for the whole trip.
    pub budget_summary: BudgetSummary,
    /// General tips, ordered.
    pub tips: Vec<String>,
    /// Best period to visit, free text.
    pub best_time_to_visit: Option<String>,
    /// Packing suggestions, ordered.
    pub packing_essentials: Option<Vec<String>>,
}

/// One day of the itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    /// 1-based day number.
    pub day: u32,
    /// Calendar date when the request carried a start date.
    pub date: Option<String>,
    /// Short headline for the day.
    pub theme: String,
    /// Ordered activities, 1 to 8 entries.
    pub activities: Vec<Activity>,
    /// Meal suggestions for the day.
    pub meals: Meals,
    /// Suggested accommodation for the night.
    pub accommodation: Option<Accommodation>,
    /// Local transport advice for the day.
    pub transport_tip: Option<String>,
}

/// A single scheduled activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Time label (`"09:00"` or descriptive).
    pub time: String,
    /// Activity name.
    pub title: String,
    /// What the activity is about.
    pub description: String,
    /// Address or neighborhood.
    pub location: String,
    /// Expected duration, free text.
    pub duration: Option<String>,
    /// Price estimate, free text.
    pub cost_estimate: String,
    /// Practical tip.
    pub tips: Option<String>,
}

/// Meal suggestions for one day; every slot is optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meals {
    /// Morning suggestion.
    pub breakfast: Option<Meal>,
    /// Midday suggestion.
    pub lunch: Option<Meal>,
    /// Evening suggestion.
    pub dinner: Option<Meal>,
}

/// One meal suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    /// Venue name.
    pub name: String,
    /// Cuisine type.
    #[serde(rename = "type")]
    pub meal_type: String,
    /// Price estimate, free text.
    pub cost_estimate: String,
    /// Extra detail about the venue.
    pub description: Option<String>,
}

/// Suggested accommodation for a night.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    /// Venue name.
    pub name: String,
    /// Venue category (hotel, hostel, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Nightly price range, free text.
    pub price_range: String,
    /// Neighborhood.
    pub neighborhood: Option<String>,
}

/// Estimated spending breakdown for the whole trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// Accommodation estimate.
    pub accommodation: String,
    /// Food estimate.
    pub food: String,
    /// Activities estimate.
    pub activities: String,
    /// Local transport estimate.
    pub transport: String,
    /// Overall estimate.
    pub total: String,
}

impl Itinerary {
    /// Validates an arbitrary parsed JSON value into a typed itinerary.
    ///
    /// Collects all violations with dotted field paths. Unknown fields are
    /// ignored.
    pub fn from_value(value: &Value) -> Result<Self, Vec<FieldViolation>> {
        let Some(object) = value.as_object() else {
            return Err(vec![FieldViolation::new(
                "itinerary",
                "must be a JSON object",
            )]);
        };

        let mut violations = Vec::new();

        let destination = required_str(object, "", "destination", &mut violations);
        let days = validate_days(object.get("days"), &mut violations);
        let budget_summary = validate_budget_summary(object.get("budgetSummary"), &mut violations);
        let tips = required_str_array(object, "", "tips", &mut violations);
        let best_time_to_visit = optional_str(object, "", "bestTimeToVisit", &mut violations);
        let packing_essentials = optional_str_array(object, "", "packingEssentials", &mut violations);

        if !violations.is_empty() {
            return Err(violations);
        }

        match (destination, days, budget_summary, tips) {
            (Some(destination), Some(days), Some(budget_summary), Some(tips)) => Ok(Self {
                destination,
                days,
                budget_summary,
                tips,
                best_time_to_visit,
                packing_essentials,
            }),
            // Unreachable when no violation was recorded; kept as a guard
            // against helpers drifting out of sync.
            _ => Err(vec![FieldViolation::new(
                "itinerary",
                "response validation failed",
            )]),
        }
    }
}

fn validate_days(
    value: Option<&Value>,
    violations: &mut Vec<FieldViolation>,
) -> Option<Vec<DayPlan>> {
    let entries = match value {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new("days", "is required"));
            return None;
        }
        Some(value) => match value.as_array() {
            Some(entries) => entries,
            None => {
                violations.push(FieldViolation::new("days", "must be an array"));
                return None;
            }
        },
    };

    if entries.is_empty() {
        violations.push(FieldViolation::new("days", "must contain at least 1 day"));
        return None;
    }

    let mut days = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if let Some(day) = validate_day(entry, &format!("days.{index}"), violations) {
            days.push(day);
        }
    }

    (days.len() == entries.len()).then_some(days)
}

fn validate_day(value: &Value, path: &str, violations: &mut Vec<FieldViolation>) -> Option<DayPlan> {
    let Some(object) = value.as_object() else {
        violations.push(FieldViolation::new(path, "must be an object"));
        return None;
    };

    let day = validate_day_number(object.get("day"), path, violations);
    let date = optional_str(object, path, "date", violations);
    let theme = required_str(object, path, "theme", violations);
    let activities = validate_activities(object.get("activities"), path, violations);
    let meals = validate_meals(object.get("meals"), path, violations);
    let accommodation = validate_accommodation(object.get("accommodation"), path, violations);
    let transport_tip = optional_str(object, path, "transportTip", violations);

    match (day, theme, activities, meals) {
        (Some(day), Some(theme), Some(activities), Some(meals)) => Some(DayPlan {
            day,
            date,
            theme,
            activities,
            meals,
            accommodation,
            transport_tip,
        }),
        _ => None,
    }
}

fn validate_day_number(
    value: Option<&Value>,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<u32> {
    let field = join_path(path, "day");
    let value = match value {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(field, "is required"));
            return None;
        }
        Some(value) => value,
    };

    match value.as_u64().filter(|day| *day >= 1) {
        Some(day) => u32::try_from(day).ok().or_else(|| {
            violations.push(FieldViolation::new(field, "is out of range"));
            None
        }),
        None => {
            violations.push(FieldViolation::new(field, "must be a positive integer"));
            None
        }
    }
}

fn validate_activities(
    value: Option<&Value>,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Vec<Activity>> {
    let field = join_path(path, "activities");
    let entries = match value {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(field, "is required"));
            return None;
        }
        Some(value) => match value.as_array() {
            Some(entries) => entries,
            None => {
                violations.push(FieldViolation::new(field, "must be an array"));
                return None;
            }
        },
    };

    if entries.is_empty() || entries.len() > MAX_ACTIVITIES_PER_DAY {
        violations.push(FieldViolation::new(
            field,
            format!("must contain between 1 and {MAX_ACTIVITIES_PER_DAY} activities"),
        ));
        return None;
    }

    let mut activities = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if let Some(activity) = validate_activity(entry, &format!("{field}.{index}"), violations) {
            activities.push(activity);
        }
    }

    (activities.len() == entries.len()).then_some(activities)
}

fn validate_activity(
    value: &Value,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Activity> {
    let Some(object) = value.as_object() else {
        violations.push(FieldViolation::new(path, "must be an object"));
        return None;
    };

    let time = required_str(object, path, "time", violations);
    let title = required_str(object, path, "title", violations);
    let description = required_str(object, path, "description", violations);
    let location = required_str(object, path, "location", violations);
    let duration = optional_str(object, path, "duration", violations);
    let cost_estimate = required_str(object, path, "costEstimate", violations);
    let tips = optional_str(object, path, "tips", violations);

    match (time, title, description, location, cost_estimate) {
        (Some(time), Some(title), Some(description), Some(location), Some(cost_estimate)) => {
            Some(Activity {
                time,
                title,
                description,
                location,
                duration,
                cost_estimate,
                tips,
            })
        }
        _ => None,
    }
}

fn validate_meals(
    value: Option<&Value>,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Meals> {
    let field = join_path(path, "meals");
    let object = match value {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(field, "is required"));
            return None;
        }
        Some(value) => match value.as_object() {
            Some(object) => object,
            None => {
                violations.push(FieldViolation::new(field, "must be an object"));
                return None;
            }
        },
    };

    let breakfast = validate_meal_slot(object.get("breakfast"), &field, "breakfast", violations);
    let lunch = validate_meal_slot(object.get("lunch"), &field, "lunch", violations);
    let dinner = validate_meal_slot(object.get("dinner"), &field, "dinner", violations);

    match (breakfast, lunch, dinner) {
        (Some(breakfast), Some(lunch), Some(dinner)) => Some(Meals {
            breakfast,
            lunch,
            dinner,
        }),
        _ => None,
    }
}

/// Returns `Some(None)` when the slot is absent, `Some(Some(meal))` when it
/// validates, `None` when it is present but malformed.
fn validate_meal_slot(
    value: Option<&Value>,
    path: &str,
    slot: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Option<Meal>> {
    let value = match value {
        None | Some(Value::Null) => return Some(None),
        Some(value) => value,
    };

    let slot_path = join_path(path, slot);
    let Some(object) = value.as_object() else {
        violations.push(FieldViolation::new(slot_path, "must be an object"));
        return None;
    };

    let name = required_str(object, &slot_path, "name", violations);
    let meal_type = required_str(object, &slot_path, "type", violations);
    let cost_estimate = required_str(object, &slot_path, "costEstimate", violations);
    let description = optional_str(object, &slot_path, "description", violations);

    match (name, meal_type, cost_estimate) {
        (Some(name), Some(meal_type), Some(cost_estimate)) => Some(Some(Meal {
            name,
            meal_type,
            cost_estimate,
            description,
        })),
        _ => None,
    }
}

fn validate_accommodation(
    value: Option<&Value>,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Accommodation> {
    let value = match value {
        None | Some(Value::Null) => return None,
        Some(value) => value,
    };

    let field = join_path(path, "accommodation");
    let Some(object) = value.as_object() else {
        violations.push(FieldViolation::new(field, "must be an object"));
        return None;
    };

    let name = required_str(object, &field, "name", violations);
    let kind = required_str(object, &field, "type", violations);
    let price_range = required_str(object, &field, "priceRange", violations);
    let neighborhood = optional_str(object, &field, "neighborhood", violations);

    match (name, kind, price_range) {
        (Some(name), Some(kind), Some(price_range)) => Some(Accommodation {
            name,
            kind,
            price_range,
            neighborhood,
        }),
        _ => None,
    }
}

fn validate_budget_summary(
    value: Option<&Value>,
    violations: &mut Vec<FieldViolation>,
) -> Option<BudgetSummary> {
    let object = match value {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new("budgetSummary", "is required"));
            return None;
        }
        Some(value) => match value.as_object() {
            Some(object) => object,
            None => {
                violations.push(FieldViolation::new("budgetSummary", "must be an object"));
                return None;
            }
        },
    };

    let accommodation = required_str(object, "budgetSummary", "accommodation", violations);
    let food = required_str(object, "budgetSummary", "food", violations);
    let activities = required_str(object, "budgetSummary", "activities", violations);
    let transport = required_str(object, "budgetSummary", "transport", violations);
    let total = required_str(object, "budgetSummary", "total", violations);

    match (accommodation, food, activities, transport, total) {
        (Some(accommodation), Some(food), Some(activities), Some(transport), Some(total)) => {
            Some(BudgetSummary {
                accommodation,
                food,
                activities,
                transport,
                total,
            })
        }
        _ => None,
    }
}

fn required_str(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(join_path(path, key), "is required"));
            None
        }
        Some(value) => match value.as_str() {
            Some(text) => Some(text.to_owned()),
            None => {
                violations.push(FieldViolation::new(join_path(path, key), "must be a string"));
                None
            }
        },
    }
}

fn optional_str(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_str() {
            Some(text) => Some(text.to_owned()),
            None => {
                violations.push(FieldViolation::new(join_path(path, key), "must be a string"));
                None
            }
        },
    }
}

fn required_str_array(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Vec<String>> {
    match object.get(key) {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(join_path(path, key), "is required"));
            None
        }
        Some(value) => str_array(value, &join_path(path, key), violations),
    }
}

fn optional_str_array(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Vec<String>> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => str_array(value, &join_path(path, key), violations),
    }
}

fn str_array(
    value: &Value,
    field: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Vec<String>> {
    let Some(entries) = value.as_array() else {
        violations.push(FieldViolation::new(field, "must be an array"));
        return None;
    };

    let mut texts = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match entry.as_str() {
            Some(text) => texts.push(text.to_owned()),
            None => violations.push(FieldViolation::new(
                format!("{field}.{index}"),
                "must be a string",
            )),
        }
    }

    (texts.len() == entries.len()).then_some(texts)
}
