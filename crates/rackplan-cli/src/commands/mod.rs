//! CLI commands implementation

use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// API client for communicating with the daemon
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the body, or return the server's `detail`
    async fn call<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Response received");

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        let detail = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.detail)
            .unwrap_or(text);
        anyhow::bail!("{} ({})", detail, status)
    }
}

/// Error body from API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: String,
}

/// Message body from API
#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

/// Rack response from API
#[derive(Debug, Deserialize)]
pub struct RackResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub serial_number: String,
    pub unit_capacity: i64,
    pub max_power_consumption: i64,
    pub power_consumption: i64,
    pub unit_size_taken: i64,
}

/// Device response from API
#[derive(Debug, Deserialize)]
pub struct DeviceResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub serial_number: String,
    pub unit_size: i64,
    pub power_consumption: i64,
    pub rack_name: String,
}

/// Suggested rack contents from API
#[derive(Debug, Deserialize)]
pub struct SuggestionResponse {
    pub rack_id: i64,
    pub rack_name: String,
    pub max_power_consumption: u64,
    pub power_consumption: u64,
    pub power_percentage: f64,
    pub unit_capacity: u64,
    pub unit_size_taken: u64,
    pub size_percentage: f64,
    pub device_ids: Vec<i64>,
}

/// Status response
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub racks: usize,
    pub devices: usize,
}

/// List all racks
pub async fn racks(client: &ApiClient) -> Result<()> {
    let racks: Vec<RackResponse> = client
        .call(client.client.get(client.url("/api/v1/racks")))
        .await?;

    if racks.is_empty() {
        println!("No racks found");
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<16} {:<12} {:<14}",
        "ID", "NAME", "SERIAL", "UNITS", "POWER (W)"
    );
    println!("{}", "-".repeat(72));
    for rack in racks {
        println!(
            "{:<6} {:<20} {:<16} {:<12} {:<14}",
            rack.id,
            rack.name,
            rack.serial_number,
            format!("{}/{}", rack.unit_size_taken, rack.unit_capacity),
            format!("{}/{}", rack.power_consumption, rack.max_power_consumption),
        );
    }

    Ok(())
}

/// Show a single rack
pub async fn rack(client: &ApiClient, id: i64) -> Result<()> {
    let rack: RackResponse = client
        .call(client.client.get(client.url(&format!("/api/v1/racks/{}", id))))
        .await?;

    println!("Rack: {}", rack.name);
    println!("  ID: {}", rack.id);
    println!("  Serial: {}", rack.serial_number);
    println!("  Description: {}", rack.description);
    println!("  Units: {}/{}", rack.unit_size_taken, rack.unit_capacity);
    println!(
        "  Power: {}/{} W",
        rack.power_consumption, rack.max_power_consumption
    );

    Ok(())
}

/// List all devices
pub async fn devices(client: &ApiClient) -> Result<()> {
    let devices: Vec<DeviceResponse> = client
        .call(client.client.get(client.url("/api/v1/devices")))
        .await?;

    if devices.is_empty() {
        println!("No devices found");
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<16} {:<6} {:<10} {:<20}",
        "ID", "NAME", "SERIAL", "UNITS", "POWER (W)", "RACK"
    );
    println!("{}", "-".repeat(80));
    for device in devices {
        println!(
            "{:<6} {:<20} {:<16} {:<6} {:<10} {:<20}",
            device.id,
            device.name,
            device.serial_number,
            device.unit_size,
            device.power_consumption,
            device.rack_name
        );
    }

    Ok(())
}

/// Show a single device
pub async fn device(client: &ApiClient, id: i64) -> Result<()> {
    let device: DeviceResponse = client
        .call(client.client.get(client.url(&format!("/api/v1/devices/{}", id))))
        .await?;

    println!("Device: {}", device.name);
    println!("  ID: {}", device.id);
    println!("  Serial: {}", device.serial_number);
    println!("  Description: {}", device.description);
    println!("  Units: {}", device.unit_size);
    println!("  Power: {} W", device.power_consumption);
    println!("  Rack: {}", device.rack_name);

    Ok(())
}

/// Mount or unmount a device; `action` is `add_to_rack` or `remove_from_rack`
pub async fn membership(client: &ApiClient, action: &str, device: i64, rack: i64) -> Result<()> {
    #[derive(Serialize)]
    struct MembershipRequest {
        device_id: i64,
        rack_id: i64,
    }

    let response: MessageResponse = client
        .call(
            client
                .client
                .post(client.url(&format!("/api/v1/devices/{}", action)))
                .json(&MembershipRequest {
                    device_id: device,
                    rack_id: rack,
                }),
        )
        .await?;

    println!("{}", response.message);
    Ok(())
}

/// Build the suggestion query string with repeated keys
pub fn suggestion_query(devices: &[i64], racks: &[i64]) -> Vec<(&'static str, i64)> {
    devices
        .iter()
        .map(|id| ("device_ids", *id))
        .chain(racks.iter().map(|id| ("rack_ids", *id)))
        .collect()
}

/// Suggest a packing of devices into racks
pub async fn suggest(client: &ApiClient, devices: &[i64], racks: &[i64]) -> Result<()> {
    let suggestions: Vec<SuggestionResponse> = client
        .call(
            client
                .client
                .get(client.url("/api/v1/suggestion"))
                .query(&suggestion_query(devices, racks)),
        )
        .await?;

    if suggestions.is_empty() {
        println!("Nothing to place");
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<18} {:<18} {:<20}",
        "RACK", "NAME", "POWER", "UNITS", "DEVICES"
    );
    println!("{}", "-".repeat(84));
    for s in suggestions {
        let device_ids: Vec<String> = s.device_ids.iter().map(|id| id.to_string()).collect();
        println!(
            "{:<6} {:<20} {:<18} {:<18} {:<20}",
            s.rack_id,
            s.rack_name,
            format!(
                "{}/{} ({:.1}%)",
                s.power_consumption, s.max_power_consumption, s.power_percentage
            ),
            format!(
                "{}/{} ({:.1}%)",
                s.unit_size_taken, s.unit_capacity, s.size_percentage
            ),
            device_ids.join(",")
        );
    }

    Ok(())
}

/// Show system status
pub async fn status(client: &ApiClient) -> Result<()> {
    let status: StatusResponse = client
        .call(client.client.get(client.url("/api/v1/status")))
        .await?;

    println!("rackplan v{}", status.version);
    println!();
    println!("Racks: {}", status.racks);
    println!("Devices: {}", status.devices);

    Ok(())
}
