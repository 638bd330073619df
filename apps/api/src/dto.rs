//! API data transfer objects.
//!
//! DTOs derive `TS` so the frontend package consumes generated types instead
//! of hand-maintained ones.

mod common;
mod generate;

pub use common::{GenerationStatusResponse, HealthDependencyStatus, HealthResponse};
pub use generate::{
    AccommodationResponse, ActivityResponse, BudgetSummaryResponse, DayPlanResponse,
    GenerateItineraryResponse, ItineraryResponse, MealResponse, MealsResponse,
};
