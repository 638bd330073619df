use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use itinero_domain::{
    Accommodation, Activity, BudgetSummary, DayPlan, Itinerary, Meal, Meals,
};

/// Success envelope for the generation endpoint.
///
/// The itinerary travels as the JSON value stored in the idempotency cache,
/// so cached and fresh responses are byte-identical.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generate-itinerary-response.ts"
)]
pub struct GenerateItineraryResponse {
    pub success: bool,
    #[ts(type = "ItineraryResponse")]
    pub itinerary: Value,
    pub cached: bool,
}

/// A validated itinerary as exposed to the frontend.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/itinerary-response.ts"
)]
pub struct ItineraryResponse {
    pub destination: String,
    pub days: Vec<DayPlanResponse>,
    pub budget_summary: BudgetSummaryResponse,
    pub tips: Vec<String>,
    pub best_time_to_visit: Option<String>,
    pub packing_essentials: Option<Vec<String>>,
}

/// One itinerary day.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/day-plan-response.ts"
)]
pub struct DayPlanResponse {
    pub day: u32,
    pub date: Option<String>,
    pub theme: String,
    pub activities: Vec<ActivityResponse>,
    pub meals: MealsResponse,
    pub accommodation: Option<AccommodationResponse>,
    pub transport_tip: Option<String>,
}

/// One scheduled activity.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/activity-response.ts"
)]
pub struct ActivityResponse {
    pub time: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub duration: Option<String>,
    pub cost_estimate: String,
    pub tips: Option<String>,
}

/// Meal suggestions for one day.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/meals-response.ts"
)]
pub struct MealsResponse {
    pub breakfast: Option<MealResponse>,
    pub lunch: Option<MealResponse>,
    pub dinner: Option<MealResponse>,
}

/// One meal suggestion.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/meal-response.ts"
)]
pub struct MealResponse {
    pub name: String,
    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub meal_type: String,
    pub cost_estimate: String,
    pub description: Option<String>,
}

/// Suggested accommodation for a night.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/accommodation-response.ts"
)]
pub struct AccommodationResponse {
    pub name: String,
    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub kind: String,
    pub price_range: String,
    pub neighborhood: Option<String>,
}

/// Estimated spending breakdown.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/budget-summary-response.ts"
)]
pub struct BudgetSummaryResponse {
    pub accommodation: String,
    pub food: String,
    pub activities: String,
    pub transport: String,
    pub total: String,
}

impl From<Itinerary> for ItineraryResponse {
    fn from(value: Itinerary) -> Self {
        Self {
            destination: value.destination,
            days: value.days.into_iter().map(DayPlanResponse::from).collect(),
            budget_summary: BudgetSummaryResponse::from(value.budget_summary),
            tips: value.tips,
            best_time_to_visit: value.best_time_to_visit,
            packing_essentials: value.packing_essentials,
        }
    }
}

impl From<DayPlan> for DayPlanResponse {
    fn from(value: DayPlan) -> Self {
        Self {
            day: value.day,
            date: value.date,
            theme: value.theme,
            activities: value
                .activities
                .into_iter()
                .map(ActivityResponse::from)
                .collect(),
            meals: MealsResponse::from(value.meals),
            accommodation: value.accommodation.map(AccommodationResponse::from),
            transport_tip: value.transport_tip,
        }
    }
}

impl From<Activity> for ActivityResponse {
    fn from(value: Activity) -> Self {
        Self {
            time: value.time,
            title: value.title,
            description: value.description,
            location: value.location,
            duration: value.duration,
            cost_estimate: value.cost_estimate,
            tips: value.tips,
        }
    }
}

impl From<Meals> for MealsResponse {
    fn from(value: Meals) -> Self {
        Self {
            breakfast: value.breakfast.map(MealResponse::from),
            lunch: value.lunch.map(MealResponse::from),
            dinner: value.dinner.map(MealResponse::from),
        }
    }
}

impl From<Meal> for MealResponse {
    fn from(value: Meal) -> Self {
        Self {
            name: value.name,
            meal_type: value.meal_type,
            cost_estimate: value.cost_estimate,
            description: value.description,
        }
    }
}

impl From<Accommodation> for AccommodationResponse {
    fn from(value: Accommodation) -> Self {
        Self {
            name: value.name,
            kind: value.kind,
            price_range: value.price_range,
            neighborhood: value.neighborhood,
        }
    }
}

impl From<BudgetSummary> for BudgetSummaryResponse {
    fn from(value: BudgetSummary) -> Self {
        Self {
            accommodation: value.accommodation,
            food: value.food,
            activities: value.activities,
            transport: value.transport,
            total: value.total,
        }
    }
}
