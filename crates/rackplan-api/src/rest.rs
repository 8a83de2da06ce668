//! REST API handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Query, State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rackplan_core::{
    ApiConfig, Device, DeviceInput, DeviceView, Rack, RackInput, RackSuggestion, RackView,
    RackplanError,
};
use rackplan_store::Inventory;
use rackplan_suggest::SuggestionEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub inventory: Arc<Inventory>,
    pub engine: SuggestionEngine,
}

/// Create the API router
pub fn create_router(inventory: Arc<Inventory>) -> Router {
    let state = Arc::new(AppState {
        inventory,
        engine: SuggestionEngine::default(),
    });

    Router::new()
        .route("/api/v1/racks", get(list_racks).post(create_rack))
        .route(
            "/api/v1/racks/:id",
            get(get_rack).put(update_rack).delete(delete_rack),
        )
        .route("/api/v1/devices", get(list_devices).post(create_device))
        .route("/api/v1/devices/add_to_rack", post(add_device_to_rack))
        .route("/api/v1/devices/remove_from_rack", post(remove_device_from_rack))
        .route(
            "/api/v1/devices/:id",
            get(get_device).put(update_device).delete(delete_device),
        )
        .route("/api/v1/suggestion", get(suggest))
        .route("/api/v1/status", get(get_status))
        .with_state(state)
}

/// Create the router with tracing and, when enabled, CORS middleware
pub fn create_app(inventory: Arc<Inventory>, config: &ApiConfig) -> Router {
    let router = create_router(inventory).layer(TraceLayer::new_for_http());
    if !config.cors_enabled {
        return router;
    }

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };
    router.layer(cors)
}

/// Error response carrying a `detail` message
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<RackplanError> for ApiError {
    fn from(err: RackplanError) -> Self {
        let status = match &err {
            RackplanError::RackNotFound(_) | RackplanError::DeviceNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %err, "Request failed");
        } else {
            warn!(error = %err, status = status.as_u16(), "Request rejected");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "Malformed request body");
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection, "Malformed path parameter");
        Self::new(rejection.status(), rejection.body_text())
    }
}

/// JSON body extractor that rejects with a `detail` body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor that rejects with a `detail` body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Body for plain acknowledgements
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// List all racks
async fn list_racks(State(state): State<Arc<AppState>>) -> Json<Vec<RackView>> {
    Json(state.inventory.list_racks().await)
}

/// Get a specific rack
async fn get_rack(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<RackView>, ApiError> {
    Ok(Json(state.inventory.get_rack(id).await?))
}

/// Create a new rack
async fn create_rack(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RackInput>,
) -> Result<(StatusCode, Json<Rack>), ApiError> {
    info!(name = %req.name, serial_number = %req.serial_number, "Creating rack");
    let rack = state.inventory.create_rack(req).await?;
    Ok((StatusCode::CREATED, Json(rack)))
}

/// Update a rack
async fn update_rack(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<RackInput>,
) -> Result<Json<Rack>, ApiError> {
    Ok(Json(state.inventory.update_rack(id, req).await?))
}

/// Delete a rack
async fn delete_rack(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rack = state.inventory.delete_rack(id).await?;
    Ok(MessageResponse::new(format!(
        "Rack '{}' deleted successfully",
        rack.name
    )))
}

/// List all devices
async fn list_devices(State(state): State<Arc<AppState>>) -> Json<Vec<DeviceView>> {
    Json(state.inventory.list_devices().await)
}

/// Get a specific device
async fn get_device(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<DeviceView>, ApiError> {
    Ok(Json(state.inventory.get_device(id).await?))
}

/// Create a new device
async fn create_device(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<DeviceInput>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    info!(name = %req.name, serial_number = %req.serial_number, "Creating device");
    let device = state.inventory.create_device(req).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Update a device
async fn update_device(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<DeviceInput>,
) -> Result<Json<Device>, ApiError> {
    Ok(Json(state.inventory.update_device(id, req).await?))
}

/// Delete a device
async fn delete_device(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let device = state.inventory.delete_device(id).await?;
    Ok(MessageResponse::new(format!(
        "Device '{}' deleted successfully",
        device.name
    )))
}

/// Request to mount or unmount a device
#[derive(Debug, Serialize, Deserialize)]
pub struct RackMembershipRequest {
    pub device_id: i64,
    pub rack_id: i64,
}

/// Mount a device in a rack
async fn add_device_to_rack(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RackMembershipRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state
        .inventory
        .add_device_to_rack(req.device_id, req.rack_id)
        .await?;
    Ok(MessageResponse::new(message))
}

/// Unmount a device from a rack
async fn remove_device_from_rack(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RackMembershipRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state
        .inventory
        .remove_device_from_rack(req.device_id, req.rack_id)
        .await?;
    Ok(MessageResponse::new(message))
}

/// Identifier lists for a suggestion request
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SuggestionQuery {
    pub device_ids: Vec<i64>,
    pub rack_ids: Vec<i64>,
}

impl SuggestionQuery {
    /// Collect repeated `device_ids` / `rack_ids` keys; other keys are ignored
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, ApiError> {
        let mut query = Self::default();
        for (key, value) in pairs {
            let target = match key.trim_end_matches("[]") {
                "device_ids" => &mut query.device_ids,
                "rack_ids" => &mut query.rack_ids,
                _ => continue,
            };
            let id = value.trim().parse::<i64>().map_err(|_| {
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid value '{}' for '{}'", value, key),
                )
            })?;
            target.push(id);
        }
        Ok(query)
    }
}

/// Suggest how to pack the given devices into the given racks
async fn suggest(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<RackSuggestion>>, ApiError> {
    let query = SuggestionQuery::from_pairs(pairs)?;
    info!(
        device_ids = ?query.device_ids,
        rack_ids = ?query.rack_ids,
        "Computing suggestion"
    );

    let (racks, devices) = state
        .inventory
        .candidates(&query.rack_ids, &query.device_ids)
        .await;

    Ok(Json(state.engine.suggest(racks, devices)?))
}

/// System status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub racks: usize,
    pub devices: usize,
}

/// Get system status
async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (racks, devices) = state.inventory.counts().await;
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        racks,
        devices,
    })
}
