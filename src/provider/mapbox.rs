//! Mapbox Matrix and Directions API client.
//!
//! Both endpoints take the waypoints in the URL path as `lon,lat;lon,lat;...`
//! and a profile such as `mapbox/driving`. Any non-success answer is returned
//! as [`TourError::Provider`] with the status code and the verbatim body.

use std::time::Duration;

use geojson::{Feature, Geometry, JsonObject};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{DirectionsProvider, Profile, TravelCostProvider};
use crate::error::{Result, TourError};
use crate::matrix::CostMatrix;
use crate::waypoint::Waypoint;

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Waypoints accepted by one Directions request.
pub const DIRECTIONS_MAX_WAYPOINTS: usize = 25;

/// Client configuration
#[derive(Debug, Clone)]
pub struct MapboxConfig {
    /// Access token sent with every request
    pub access_token: Option<String>,
    /// API root, overridable for tests and proxies
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for MapboxConfig {
    fn default() -> Self {
        MapboxConfig {
            access_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    code: String,
    #[serde(default)]
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    code: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: Geometry,
    distance: f64,
    duration: f64,
}

/// HTTP client for the Matrix (travel-time) and Directions (geometry) APIs
pub struct MapboxClient {
    client: Client,
    config: MapboxConfig,
}

impl MapboxClient {
    pub fn new(config: MapboxConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("optimal-tour/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(MapboxClient { client, config })
    }

    fn access_token(&self) -> Result<&str> {
        self.config
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(TourError::MissingAccessToken)
    }

    fn url(&self, service_path: &str, profile: Profile, waypoints: &[Waypoint]) -> String {
        let coordinates = waypoints
            .iter()
            .map(|w| format!("{},{}", w.x(), w.y()))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/{}/mapbox/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            service_path,
            profile,
            coordinates
        )
    }

    /// GET `url` and return the body of a successful response
    async fn fetch(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String> {
        let token = self.access_token()?;
        log::debug!("{} request: {}", service, url);

        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("access_token", token)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TourError::Provider { service, status: status.as_u16(), body });
        }
        Ok(body)
    }
}

impl TravelCostProvider for MapboxClient {
    async fn durations(&self, waypoints: &[Waypoint], profile: Profile) -> Result<CostMatrix> {
        let url = self.url("directions-matrix/v1", profile, waypoints);
        let body = self.fetch("Matrix", &url, &[("annotations", "duration")]).await?;

        let parsed: MatrixResponse = serde_json::from_str(&body)?;
        let durations = match parsed.durations {
            Some(durations) if parsed.code == "Ok" => durations,
            _ => return Err(TourError::Provider { service: "Matrix", status: 200, body }),
        };

        let mut rows = Vec::with_capacity(durations.len());
        for (i, row) in durations.into_iter().enumerate() {
            let mut values = Vec::with_capacity(row.len());
            for (j, value) in row.into_iter().enumerate() {
                match value {
                    Some(v) => values.push(v),
                    None if i == j => values.push(0.0),
                    None => {
                        return Err(TourError::InvalidMatrix(format!(
                            "no route from waypoint {} to waypoint {}",
                            i, j
                        )))
                    }
                }
            }
            rows.push(values);
        }
        CostMatrix::from_rows(rows)
    }
}

impl DirectionsProvider for MapboxClient {
    fn max_waypoints(&self) -> usize {
        DIRECTIONS_MAX_WAYPOINTS
    }

    async fn route(&self, waypoints: &[Waypoint], profile: Profile) -> Result<Feature> {
        let url = self.url("directions/v5", profile, waypoints);
        let body = self
            .fetch("Directions", &url, &[("geometries", "geojson"), ("overview", "full")])
            .await?;

        let parsed: DirectionsResponse = serde_json::from_str(&body)?;
        let route = match parsed.routes.into_iter().next() {
            Some(route) if parsed.code == "Ok" => route,
            _ => return Err(TourError::Provider { service: "Directions", status: 200, body }),
        };

        let mut properties = JsonObject::new();
        properties.insert("distance".to_string(), json!(route.distance));
        properties.insert("duration".to_string(), json!(route.duration));

        Ok(Feature {
            bbox: None,
            geometry: Some(route.geometry),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }
}
