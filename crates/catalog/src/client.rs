//! Catalog client trait and validation outcome classification.

use async_trait::async_trait;
use common::{FoodItemId, RestaurantId, UserId};
use serde::{Deserialize, Serialize};

/// A catalog item as returned by the food service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemRecord {
    pub food_item_id: FoodItemId,
    #[serde(rename = "restaurant")]
    pub restaurant_id: RestaurantId,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    pub name: String,
    pub price: f64,
    pub is_available: bool,
    pub quantity: u32,
}

/// Classification of one item validation.
///
/// The variant — not a boolean — drives the failure reason surfaced on
/// the order.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Item exists, belongs to the order's restaurant, is available and
    /// has enough stock.
    Valid(FoodItemRecord),
    /// No such item in the catalog.
    NotFound,
    /// Item belongs to a different restaurant than the order.
    WrongRestaurant,
    /// Item is marked unavailable.
    Unavailable,
    /// Not enough stock for the requested quantity.
    InsufficientStock { available: u32 },
    /// The catalog service could not be reached.
    UpstreamUnavailable,
}

impl ValidationOutcome {
    /// Returns true for [`ValidationOutcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    /// Returns true if the outcome is a transient transport failure worth
    /// retrying, as opposed to a business rejection.
    pub fn is_transient(&self) -> bool {
        matches!(self, ValidationOutcome::UpstreamUnavailable)
    }

    /// Classifies a fetched record against the order's restaurant and the
    /// requested quantity.
    pub fn classify(
        record: FoodItemRecord,
        restaurant_id: RestaurantId,
        quantity: u32,
    ) -> ValidationOutcome {
        if record.restaurant_id != restaurant_id {
            ValidationOutcome::WrongRestaurant
        } else if !record.is_available {
            ValidationOutcome::Unavailable
        } else if record.quantity < quantity {
            ValidationOutcome::InsufficientStock {
                available: record.quantity,
            }
        } else {
            ValidationOutcome::Valid(record)
        }
    }

    /// Renders the failure reason for the labelled item, `None` if valid.
    pub fn failure_reason(&self, label: &str) -> Option<String> {
        match self {
            ValidationOutcome::Valid(_) => None,
            ValidationOutcome::NotFound => Some(format!("Food item {label} not found")),
            ValidationOutcome::WrongRestaurant => Some(format!(
                "Food item {label} does not belong to this restaurant"
            )),
            ValidationOutcome::Unavailable => {
                Some(format!("Food item {label} is currently unavailable"))
            }
            ValidationOutcome::InsufficientStock { available } => Some(format!(
                "Food item {label} is out of stock ({available} available)"
            )),
            ValidationOutcome::UpstreamUnavailable => {
                Some(format!("Food service unavailable while validating {label}"))
            }
        }
    }
}

/// Synchronous catalog lookups used by order validation.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Validates one order line against the catalog.
    ///
    /// Never returns an error: transport failures are classified as
    /// [`ValidationOutcome::UpstreamUnavailable`].
    async fn validate_item(
        &self,
        food_item_id: FoodItemId,
        restaurant_id: RestaurantId,
        quantity: u32,
    ) -> ValidationOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(restaurant_id: RestaurantId, quantity: u32, available: bool) -> FoodItemRecord {
        FoodItemRecord {
            food_item_id: FoodItemId::new(),
            restaurant_id,
            owner_id: Some(UserId::new()),
            name: "Pad Thai".to_string(),
            price: 12.0,
            is_available: available,
            quantity,
        }
    }

    #[test]
    fn classify_valid() {
        let restaurant = RestaurantId::new();
        let outcome = ValidationOutcome::classify(record(restaurant, 5, true), restaurant, 3);
        assert!(outcome.is_valid());
    }

    #[test]
    fn classify_wrong_restaurant_before_availability() {
        let outcome =
            ValidationOutcome::classify(record(RestaurantId::new(), 5, false), RestaurantId::new(), 3);
        assert_eq!(outcome, ValidationOutcome::WrongRestaurant);
    }

    #[test]
    fn classify_unavailable() {
        let restaurant = RestaurantId::new();
        let outcome = ValidationOutcome::classify(record(restaurant, 5, false), restaurant, 3);
        assert_eq!(outcome, ValidationOutcome::Unavailable);
    }

    #[test]
    fn classify_insufficient_stock() {
        let restaurant = RestaurantId::new();
        let outcome = ValidationOutcome::classify(record(restaurant, 2, true), restaurant, 3);
        assert_eq!(outcome, ValidationOutcome::InsufficientStock { available: 2 });
    }

    #[test]
    fn exact_stock_is_valid() {
        let restaurant = RestaurantId::new();
        let outcome = ValidationOutcome::classify(record(restaurant, 3, true), restaurant, 3);
        assert!(outcome.is_valid());
    }

    #[test]
    fn only_upstream_is_transient() {
        assert!(ValidationOutcome::UpstreamUnavailable.is_transient());
        assert!(!ValidationOutcome::NotFound.is_transient());
        assert!(!ValidationOutcome::InsufficientStock { available: 0 }.is_transient());
    }

    #[test]
    fn failure_reasons_name_the_item() {
        assert!(
            ValidationOutcome::NotFound
                .failure_reason("Pad Thai")
                .unwrap()
                .contains("Pad Thai")
        );
        assert!(
            ValidationOutcome::InsufficientStock { available: 1 }
                .failure_reason("Pad Thai")
                .unwrap()
                .contains("1 available")
        );
        let restaurant = RestaurantId::new();
        let valid = ValidationOutcome::classify(record(restaurant, 5, true), restaurant, 1);
        assert!(valid.failure_reason("Pad Thai").is_none());
    }

    #[test]
    fn record_wire_format_is_camel_case() {
        let restaurant = RestaurantId::new();
        let json = serde_json::to_value(record(restaurant, 5, true)).unwrap();
        assert!(json.get("foodItemId").is_some());
        assert!(json.get("restaurant").is_some());
        assert!(json.get("isAvailable").is_some());
    }
}
