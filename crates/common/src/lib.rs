//! Shared identifier types used across the food-ordering services.

mod ids;

pub use ids::{FoodItemId, OrderId, RestaurantId, UserId};
