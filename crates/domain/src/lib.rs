//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod itinerary;
mod trip;
mod validation;

pub use itinerary::{
    Accommodation, Activity, BudgetSummary, DayPlan, Itinerary, MAX_ACTIVITIES_PER_DAY, Meal,
    Meals,
};
pub use trip::{
    Budget, DESTINATION_MAX_CHARS, DESTINATION_MIN_CHARS, Interest, MAX_INTERESTS, MAX_TRAVELERS,
    MAX_TRIP_DAYS, Pace, TripRequest,
};
pub use validation::{FieldViolation, format_violations};
