//! HTTP client for the food service.
//!
//! Two surfaces share one base URL and one set of service credentials:
//! [`HttpCatalogClient`] for read-side validation lookups and
//! [`HttpInventoryStore`] for the stock mutation endpoints.

use async_trait::async_trait;
use common::{FoodItemId, RestaurantId};
use domain::InventoryItem;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use store::{InventoryStore, StoreError};

use crate::client::{CatalogClient, FoodItemRecord, ValidationOutcome};

/// Service-to-service identity sent on every request.
#[derive(Debug, Clone)]
pub struct ServiceCredentials {
    pub service_name: String,
    pub token: String,
}

const SERVICE_NAME_HEADER: &str = "X-Service-Name";
const SERVICE_TOKEN_HEADER: &str = "X-Service-Token";

/// A hung food service must surface as a transport error (and be
/// classified as unavailable) rather than stall the saga task.
const UPSTREAM_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(UPSTREAM_TIMEOUT).build()
}

#[derive(Debug, Deserialize)]
struct FoodItemEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(rename = "foodItem")]
    food_item: Option<FoodItemRecord>,
}

#[derive(Debug, Serialize)]
struct InventoryUpdateBody {
    quantity: u32,
    operation: &'static str,
}

#[derive(Debug, Deserialize)]
struct InventoryUpdateEnvelope {
    #[serde(default)]
    message: Option<String>,
}

/// Read-side catalog client over the food service HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: String,
    credentials: ServiceCredentials,
}

impl HttpCatalogClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: ServiceCredentials,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            base_url: base_url.into(),
            credentials,
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}/{path}", self.base_url.trim_end_matches('/')))
            .header(SERVICE_NAME_HEADER, &self.credentials.service_name)
            .header(SERVICE_TOKEN_HEADER, &self.credentials.token)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[tracing::instrument(skip(self), fields(%food_item_id))]
    async fn validate_item(
        &self,
        food_item_id: FoodItemId,
        restaurant_id: RestaurantId,
        quantity: u32,
    ) -> ValidationOutcome {
        let response = match self.get(&format!("get-fooditem/{food_item_id}")).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "food service unreachable");
                return ValidationOutcome::UpstreamUnavailable;
            }
        };

        match response.status() {
            StatusCode::NOT_FOUND => return ValidationOutcome::NotFound,
            status if status.is_server_error() => {
                tracing::warn!(%status, "food service error");
                return ValidationOutcome::UpstreamUnavailable;
            }
            _ => {}
        }

        match response.json::<FoodItemEnvelope>().await {
            Ok(envelope) => match envelope.food_item {
                Some(record) if envelope.success => {
                    ValidationOutcome::classify(record, restaurant_id, quantity)
                }
                _ => ValidationOutcome::NotFound,
            },
            Err(err) => {
                tracing::warn!(error = %err, "malformed food service response");
                ValidationOutcome::UpstreamUnavailable
            }
        }
    }
}

/// Stock mutations over the food service HTTP API.
///
/// Each call maps to one `update-inventory` request; the conditional
/// decrement happens inside the food service, so this adapter carries no
/// state of its own.
#[derive(Debug, Clone)]
pub struct HttpInventoryStore {
    http: reqwest::Client,
    base_url: String,
    credentials: ServiceCredentials,
}

impl HttpInventoryStore {
    pub fn new(
        base_url: impl Into<String>,
        credentials: ServiceCredentials,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            base_url: base_url.into(),
            credentials,
        })
    }

    async fn update_inventory(
        &self,
        food_item_id: FoodItemId,
        quantity: u32,
        operation: &'static str,
    ) -> store::Result<()> {
        let url = format!(
            "{}/update-inventory/{food_item_id}",
            self.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .put(url)
            .header(SERVICE_NAME_HEADER, &self.credentials.service_name)
            .header(SERVICE_TOKEN_HEADER, &self.credentials.token)
            .json(&InventoryUpdateBody { quantity, operation })
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::ItemNotFound(food_item_id)),
            StatusCode::BAD_REQUEST if operation == "reduce" => {
                // The food service rejects a reduce below zero but does not
                // report the remaining stock.
                Err(StoreError::InsufficientStock {
                    food_item_id,
                    requested: quantity,
                    available: 0,
                })
            }
            status => {
                let detail = response
                    .json::<InventoryUpdateEnvelope>()
                    .await
                    .ok()
                    .and_then(|envelope| envelope.message)
                    .unwrap_or_else(|| status.to_string());
                Err(StoreError::Unavailable(detail))
            }
        }
    }
}

#[async_trait]
impl InventoryStore for HttpInventoryStore {
    async fn get(&self, food_item_id: FoodItemId) -> store::Result<Option<InventoryItem>> {
        let url = format!(
            "{}/get-fooditem/{food_item_id}",
            self.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .get(url)
            .header(SERVICE_NAME_HEADER, &self.credentials.service_name)
            .header(SERVICE_TOKEN_HEADER, &self.credentials.token)
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(response.status().to_string()));
        }

        let envelope = response
            .json::<FoodItemEnvelope>()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(envelope.food_item.filter(|_| envelope.success).map(|record| {
            InventoryItem {
                id: record.food_item_id,
                restaurant_id: record.restaurant_id,
                owner_id: record.owner_id.unwrap_or_default(),
                name: record.name,
                price: record.price,
                quantity: record.quantity,
                is_available: record.is_available,
            }
        }))
    }

    #[tracing::instrument(skip(self), fields(%food_item_id))]
    async fn reserve(&self, food_item_id: FoodItemId, quantity: u32) -> store::Result<()> {
        self.update_inventory(food_item_id, quantity, "reduce").await
    }

    #[tracing::instrument(skip(self), fields(%food_item_id))]
    async fn restore(&self, food_item_id: FoodItemId, quantity: u32) -> store::Result<()> {
        if quantity == 0 {
            return Ok(());
        }
        self.update_inventory(food_item_id, quantity, "add").await
    }

    async fn deactivate_restaurant(&self, _restaurant_id: RestaurantId) -> store::Result<u64> {
        // Deactivation is a catalog-internal reaction to restaurant
        // deletion; the consumer runs next to the real store, never over
        // this adapter.
        Err(StoreError::Unavailable(
            "restaurant deactivation is not exposed over the inventory API".to_string(),
        ))
    }
}
