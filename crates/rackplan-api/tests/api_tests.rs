use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use rackplan_api::create_router;
use rackplan_core::{DeviceInput, RackInput};
use rackplan_store::Inventory;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn add_rack(inventory: &Inventory, id: i64, unit_capacity: i64, max_power: i64) {
    inventory
        .create_rack(RackInput {
            id: Some(id),
            name: format!("R{}", id),
            description: String::new(),
            serial_number: format!("SN-R{}", id),
            unit_capacity,
            max_power_consumption: max_power,
        })
        .await
        .unwrap();
}

async fn add_device(inventory: &Inventory, id: i64, unit_size: i64, power: i64) {
    inventory
        .create_device(DeviceInput {
            id: Some(id),
            name: format!("D{}", id),
            description: String::new(),
            serial_number: format!("SN-D{}", id),
            unit_size,
            power_consumption: power,
            rack_id: None,
        })
        .await
        .unwrap();
}

async fn suggestion_inventory() -> Arc<Inventory> {
    let inventory = Arc::new(Inventory::new());
    add_rack(&inventory, 3, 8, 1200).await;
    add_rack(&inventory, 4, 8, 1100).await;
    add_rack(&inventory, 5, 8, 1000).await;

    add_device(&inventory, 4, 2, 400).await;
    add_device(&inventory, 5, 2, 400).await;
    add_device(&inventory, 6, 2, 300).await;
    add_device(&inventory, 7, 2, 200).await;

    add_device(&inventory, 8, 2, 800).await;
    add_device(&inventory, 9, 2, 800).await;
    add_device(&inventory, 10, 2, 700).await;
    inventory
}

#[tokio::test]
async fn test_suggestion_balances_power() {
    let app = create_router(suggestion_inventory().await);

    let (status, json) = send(
        app,
        "GET",
        "/api/v1/suggestion?device_ids=4&device_ids=5&device_ids=6&device_ids=7&rack_ids=3&rack_ids=4&rack_ids=5",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let racks = json.as_array().unwrap();
    assert_eq!(racks.len(), 3);

    assert_eq!(racks[0]["rack_id"], 3);
    assert_eq!(racks[0]["rack_name"], "R3");
    assert_eq!(racks[0]["max_power_consumption"], 1200);
    assert_eq!(racks[0]["power_consumption"], 600);
    assert_eq!(racks[0]["power_percentage"], 50.0);
    assert_eq!(racks[0]["unit_capacity"], 8);
    assert_eq!(racks[0]["unit_size_taken"], 4);
    assert_eq!(racks[0]["size_percentage"], 50.0);
    assert_eq!(racks[0]["device_ids"], json!([4, 7]));

    assert_eq!(racks[1]["max_power_consumption"], 1100);
    assert_eq!(racks[1]["power_consumption"], 400);
    assert_eq!(racks[1]["power_percentage"], 36.36363636363637);
    assert_eq!(racks[1]["size_percentage"], 25.0);
    assert_eq!(racks[1]["device_ids"], json!([5]));

    assert_eq!(racks[2]["max_power_consumption"], 1000);
    assert_eq!(racks[2]["power_consumption"], 300);
    assert_eq!(racks[2]["power_percentage"], 30.0);
    assert_eq!(racks[2]["size_percentage"], 25.0);
    assert_eq!(racks[2]["device_ids"], json!([6]));
}

#[tokio::test]
async fn test_suggestion_placement_failure() {
    let app = create_router(suggestion_inventory().await);

    let (status, json) = send(
        app,
        "GET",
        "/api/v1/suggestion?device_ids=8&device_ids=9&device_ids=10&rack_ids=3&rack_ids=4",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Not enough space or power to store all devices");
}

#[tokio::test]
async fn test_suggestion_aggregate_failures() {
    let inventory = suggestion_inventory().await;

    let (status, json) = send(
        create_router(inventory.clone()),
        "GET",
        "/api/v1/suggestion?device_ids=8&device_ids=9&rack_ids=5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Not enough power to store all devices");

    add_device(&inventory, 11, 9, 10).await;
    let (status, json) = send(
        create_router(inventory),
        "GET",
        "/api/v1/suggestion?device_ids=11&rack_ids=5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Not enough space to store all devices");
}

#[tokio::test]
async fn test_suggestion_ignores_unknown_ids_and_empty_lists() {
    let app = create_router(suggestion_inventory().await);

    let (status, json) = send(
        app.clone(),
        "GET",
        "/api/v1/suggestion?rack_ids=3&rack_ids=42",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));

    let (status, json) = send(app, "GET", "/api/v1/suggestion?device_ids=99", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_suggestion_ignores_existing_rack_contents() {
    let inventory = suggestion_inventory().await;
    // Rack 5 is physically full of power already
    let (status, _) = send(
        create_router(inventory.clone()),
        "POST",
        "/api/v1/devices/add_to_rack",
        Some(json!({"device_id": 8, "rack_id": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        create_router(inventory),
        "GET",
        "/api/v1/suggestion?device_ids=10&rack_ids=5",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["power_consumption"], 700);
    assert_eq!(json[0]["device_ids"], json!([10]));
}

#[tokio::test]
async fn test_suggestion_bad_id() {
    let app = create_router(Arc::new(Inventory::new()));
    let (status, json) = send(app, "GET", "/api/v1/suggestion?device_ids=x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Invalid value 'x' for 'device_ids'");
}

#[tokio::test]
async fn test_malformed_requests_use_detail_body() {
    let app = create_router(Arc::new(Inventory::new()));

    let (status, json) = send(
        app.clone(),
        "POST",
        "/api/v1/racks",
        Some(json!({"name": "R1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["detail"].as_str().unwrap().contains("missing field"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/devices/add_to_rack")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["detail"].is_string());

    let (status, json) = send(app, "GET", "/api/v1/racks/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].is_string());
}

#[tokio::test]
async fn test_rack_crud() {
    let app = create_router(Arc::new(Inventory::new()));

    let (status, json) = send(
        app.clone(),
        "POST",
        "/api/v1/racks",
        Some(json!({
            "name": " R1 ",
            "description": "first row",
            "serial_number": "SN-001",
            "unit_capacity": 42,
            "max_power_consumption": 5000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 1);
    assert_eq!(json["name"], "R1");

    let (status, json) = send(app.clone(), "GET", "/api/v1/racks/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["power_consumption"], 0);
    assert_eq!(json["unit_capacity"], 42);

    let (status, json) = send(
        app.clone(),
        "PUT",
        "/api/v1/racks/1",
        Some(json!({
            "name": "R1",
            "description": "first row",
            "serial_number": "SN-001",
            "unit_capacity": 0,
            "max_power_consumption": 5000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Unit capacity must be positive number.");

    let (status, json) = send(app.clone(), "DELETE", "/api/v1/racks/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Rack 'R1' deleted successfully");

    let (status, json) = send(app, "GET", "/api/v1/racks/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "Rack with id 1 does not exist");
}

#[tokio::test]
async fn test_device_lifecycle() {
    let inventory = Arc::new(Inventory::new());
    add_rack(&inventory, 1, 4, 1000).await;
    let app = create_router(inventory);

    let (status, json) = send(
        app.clone(),
        "POST",
        "/api/v1/devices",
        Some(json!({
            "name": "D1",
            "description": "switch",
            "serial_number": "SN-D1",
            "unit_size": 2,
            "power_consumption": 700,
            "rack_id": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["rack_id"], 1);

    let (status, json) = send(
        app.clone(),
        "POST",
        "/api/v1/devices",
        Some(json!({
            "name": "D2",
            "description": "server",
            "serial_number": "SN-D2",
            "unit_size": 1,
            "power_consumption": 400
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 2);

    let (status, json) = send(
        app.clone(),
        "POST",
        "/api/v1/devices/add_to_rack",
        Some(json!({"device_id": 2, "rack_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["detail"],
        "Power consumption exceeds maximum allowed value in the current rack."
    );

    let (status, json) = send(app.clone(), "GET", "/api/v1/devices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["rack_name"], "R1");
    assert_eq!(json[1]["rack_name"], "None");

    let (status, json) = send(
        app.clone(),
        "POST",
        "/api/v1/devices/remove_from_rack",
        Some(json!({"device_id": 1, "rack_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Device 'D1' is removed from rack 'R1'");

    let (status, json) = send(
        app.clone(),
        "POST",
        "/api/v1/devices/add_to_rack",
        Some(json!({"device_id": 2, "rack_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Device 'D2' is added to rack 'R1'");

    let (status, json) = send(app.clone(), "DELETE", "/api/v1/devices/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Device 'D2' deleted successfully");

    let (status, _) = send(app, "GET", "/api/v1/devices/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_serial_number() {
    let inventory = Arc::new(Inventory::new());
    add_rack(&inventory, 1, 4, 1000).await;
    let app = create_router(inventory);

    let (status, json) = send(
        app,
        "POST",
        "/api/v1/devices",
        Some(json!({
            "name": "D1",
            "description": "",
            "serial_number": "SN-R1",
            "unit_size": 1,
            "power_consumption": 10
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Serial number 'SN-R1' already exists.");
}

#[tokio::test]
async fn test_status() {
    let inventory = Arc::new(Inventory::new());
    inventory.seed_demo_data().await.unwrap();

    let (status, json) = send(create_router(inventory), "GET", "/api/v1/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["racks"], 2);
    assert_eq!(json["devices"], 3);
}
