//! Integration tests driving the router with `tower::ServiceExt::oneshot`.

use std::time::Duration;

use api::identity::{USER_ID_HEADER, USER_ROLE_HEADER};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{FoodItemId, RestaurantId, UserId};
use domain::InventoryItem;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use store::InMemoryInventoryStore;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    inventory: InMemoryInventoryStore,
    restaurant_id: RestaurantId,
    owner_id: UserId,
    customer_id: UserId,
}

impl TestApp {
    fn new() -> Self {
        let (state, inventory, _bus) = api::create_default_state();
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();
        Self {
            app: api::create_app(state, metrics_handle),
            inventory,
            restaurant_id: RestaurantId::new(),
            owner_id: UserId::new(),
            customer_id: UserId::new(),
        }
    }

    fn seed(&self, name: &str, price: f64, quantity: u32) -> FoodItemId {
        self.inventory.insert_item(InventoryItem::new(
            self.restaurant_id,
            self.owner_id,
            name,
            price,
            quantity,
        ))
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        identity: Option<(UserId, &str)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((user_id, role)) = identity {
            builder = builder
                .header(USER_ID_HEADER, user_id.to_string())
                .header(USER_ROLE_HEADER, role);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, body)
    }

    async fn place(&self, items: Value, total: f64) -> Value {
        let (status, body) = self
            .send(
                "POST",
                "/api/v1/orders/place-order",
                Some((self.customer_id, "customer")),
                Some(json!({
                    "restaurant_id": self.restaurant_id,
                    "items": items,
                    "total_amount": total,
                    "delivery_address": "1 Main St",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::ACCEPTED, "{body}");
        body
    }

    /// Polls until the spawned saga phase has moved the order out of
    /// `Validating`.
    async fn settled_order(&self, order_id: &str) -> Value {
        for _ in 0..100 {
            let (status, body) = self
                .send(
                    "GET",
                    &format!("/api/v1/orders/get-order/{order_id}"),
                    Some((self.customer_id, "customer")),
                    None,
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            if body["order"]["status"] != "Validating" {
                return body["order"].clone();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("order {order_id} never left Validating");
    }
}

#[tokio::test]
async fn health_and_metrics_respond() {
    let t = TestApp::new();
    let (status, body) = t.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "order-service");

    let (status, _) = t.send("GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn place_order_confirms_in_the_background() {
    let t = TestApp::new();
    let food = t.seed("Ramen", 11.0, 5);

    let body = t
        .place(
            json!([{ "food_item_id": food, "unit_price": 11.0, "quantity": 2 }]),
            22.0,
        )
        .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["order"]["status"], "Validating");

    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    let order = t.settled_order(&order_id).await;
    assert_eq!(order["status"], "Confirmed");
    assert_eq!(t.inventory.quantity(food), Some(3));
}

#[tokio::test]
async fn placement_failure_surfaces_on_subsequent_reads() {
    let t = TestApp::new();
    let food = t.seed("Ramen", 11.0, 1);

    let body = t
        .place(
            json!([{ "food_item_id": food, "unit_price": 11.0, "quantity": 4 }]),
            44.0,
        )
        .await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let order = t.settled_order(&order_id).await;
    assert_eq!(order["status"], "Failed");
    assert!(
        order["failure_reason"]
            .as_str()
            .unwrap()
            .contains(&food.to_string())
    );
    assert_eq!(t.inventory.quantity(food), Some(1));
}

#[tokio::test]
async fn identity_headers_are_required_and_validated() {
    let t = TestApp::new();

    let (status, _) = t.send("GET", "/api/v1/orders/get-orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = t
        .send(
            "GET",
            "/api/v1/orders/get-orders",
            Some((t.customer_id, "admin")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn owners_cannot_use_customer_routes_and_vice_versa() {
    let t = TestApp::new();
    let food = t.seed("Ramen", 11.0, 5);

    let (status, _) = t
        .send(
            "POST",
            "/api/v1/orders/place-order",
            Some((t.owner_id, "owner")),
            Some(json!({
                "restaurant_id": t.restaurant_id,
                "items": [{ "food_item_id": food, "unit_price": 11.0, "quantity": 1 }],
                "total_amount": 11.0,
                "delivery_address": "1 Main St",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = t
        .send(
            "GET",
            &format!("/api/v1/orders/restaurant-orders/{}", t.restaurant_id),
            Some((t.customer_id, "customer")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn total_mismatch_is_rejected_up_front() {
    let t = TestApp::new();
    let food = t.seed("Ramen", 11.0, 5);

    let (status, body) = t
        .send(
            "POST",
            "/api/v1/orders/place-order",
            Some((t.customer_id, "customer")),
            Some(json!({
                "restaurant_id": t.restaurant_id,
                "items": [{ "food_item_id": food, "unit_price": 11.0, "quantity": 2 }],
                "total_amount": 30.0,
                "delivery_address": "1 Main St",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let t = TestApp::new();
    let (status, _) = t
        .send(
            "GET",
            &format!("/api/v1/orders/get-order/{}", uuid::Uuid::new_v4()),
            Some((t.customer_id, "customer")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn foreign_orders_are_forbidden() {
    let t = TestApp::new();
    let food = t.seed("Ramen", 11.0, 5);

    let body = t
        .place(
            json!([{ "food_item_id": food, "unit_price": 11.0, "quantity": 1 }]),
            11.0,
        )
        .await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let (status, _) = t
        .send(
            "GET",
            &format!("/api/v1/orders/get-order/{order_id}"),
            Some((UserId::new(), "customer")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn owner_advances_status_along_the_chain_only() {
    let t = TestApp::new();
    let food = t.seed("Ramen", 11.0, 5);

    let body = t
        .place(
            json!([{ "food_item_id": food, "unit_price": 11.0, "quantity": 1 }]),
            11.0,
        )
        .await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    t.settled_order(&order_id).await;

    // Skipping Preparing is an illegal transition
    let (status, _) = t
        .send(
            "PUT",
            &format!("/api/v1/orders/update-order-status/{order_id}"),
            Some((t.owner_id, "owner")),
            Some(json!({ "status": "Delivered" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = t
        .send(
            "PUT",
            &format!("/api/v1/orders/update-order-status/{order_id}"),
            Some((t.owner_id, "owner")),
            Some(json!({ "status": "Preparing" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "Preparing");
}

#[tokio::test]
async fn cancel_returns_immediately_and_restores_stock() {
    let t = TestApp::new();
    let food = t.seed("Ramen", 11.0, 5);

    let body = t
        .place(
            json!([{ "food_item_id": food, "unit_price": 11.0, "quantity": 2 }]),
            22.0,
        )
        .await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    t.settled_order(&order_id).await;
    assert_eq!(t.inventory.quantity(food), Some(3));

    let (status, body) = t
        .send(
            "PUT",
            &format!("/api/v1/orders/cancel-order/{order_id}"),
            Some((t.customer_id, "customer")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "Cancelled");

    // Compensation is fire-and-forget; wait for the restore to land
    for _ in 0..100 {
        if t.inventory.quantity(food) == Some(5) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("stock was never restored after cancellation");
}

#[tokio::test]
async fn update_order_adjusts_reservations_by_delta() {
    let t = TestApp::new();
    let ramen = t.seed("Ramen", 11.0, 10);
    let mochi = t.seed("Mochi", 3.0, 10);

    let body = t
        .place(
            json!([{ "food_item_id": ramen, "unit_price": 11.0, "quantity": 2 }]),
            22.0,
        )
        .await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    t.settled_order(&order_id).await;

    let (status, _) = t
        .send(
            "PUT",
            &format!("/api/v1/orders/update-order/{order_id}"),
            Some((t.customer_id, "customer")),
            Some(json!({
                "items": [
                    { "food_item_id": ramen, "unit_price": 11.0, "quantity": 3 },
                    { "food_item_id": mochi, "unit_price": 3.0, "quantity": 1 },
                ],
                "total_amount": 36.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let order = t.settled_order(&order_id).await;
    assert_eq!(order["status"], "Confirmed");
    assert_eq!(t.inventory.quantity(ramen), Some(7));
    assert_eq!(t.inventory.quantity(mochi), Some(9));
}
