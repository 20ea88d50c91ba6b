//! Address geocoding

use crate::config::GeocoderConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// A resolved address
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl GeoLocation {
    /// A bare point with no address parts
    pub fn point(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            formatted_address: format!("{}, {}", latitude, longitude),
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no match for address '{0}'")]
    NoMatch(String),

    #[error("geocoding request failed: {0}")]
    Request(String),

    #[error("unexpected geocoder response: {0}")]
    Response(String),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoLocation, GeocodeError>;
}

/// MapQuest geocoding API client
pub struct MapQuestGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MapQuestGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("devcamper/0.1")
            .build()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: MapQuestLatLng,
    #[serde(default)]
    street: String,
    /// City
    #[serde(default)]
    admin_area5: String,
    /// State
    #[serde(default)]
    admin_area3: String,
    /// Country
    #[serde(default)]
    admin_area1: String,
    #[serde(default)]
    postal_code: String,
}

#[derive(Debug, Deserialize)]
struct MapQuestLatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

impl From<MapQuestLocation> for GeoLocation {
    fn from(loc: MapQuestLocation) -> Self {
        let state_zip = format!("{} {}", loc.admin_area3, loc.postal_code);
        let formatted_address = [
            loc.street.as_str(),
            loc.admin_area5.as_str(),
            state_zip.as_str(),
            loc.admin_area1.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            latitude: loc.lat_lng.lat,
            longitude: loc.lat_lng.lng,
            formatted_address,
            street: non_empty(loc.street),
            city: non_empty(loc.admin_area5),
            state: non_empty(loc.admin_area3),
            zipcode: non_empty(loc.postal_code),
            country: non_empty(loc.admin_area1),
        }
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoLocation, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("location", address)])
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let body: MapQuestResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Response(e.to_string()))?;

        let location = body
            .results
            .into_iter()
            .flat_map(|r| r.locations)
            .next()
            .ok_or_else(|| GeocodeError::NoMatch(address.to_string()))?;

        tracing::debug!(address, lat = location.lat_lng.lat, lng = location.lat_lng.lng, "geocoded");
        Ok(location.into())
    }
}

/// Answers from a fixed table, for development and tests
#[derive(Debug, Clone)]
pub struct FixedGeocoder {
    entries: HashMap<String, GeoLocation>,
    fallback: Option<GeoLocation>,
}

impl FixedGeocoder {
    /// Unknown addresses resolve to central Boston
    pub fn new() -> Self {
        let mut fallback = GeoLocation::point(42.3601, -71.0589);
        fallback.formatted_address = "Boston, MA 02108, US".to_string();
        fallback.city = Some("Boston".to_string());
        fallback.state = Some("MA".to_string());
        fallback.zipcode = Some("02108".to_string());
        fallback.country = Some("US".to_string());
        Self {
            entries: HashMap::new(),
            fallback: Some(fallback),
        }
    }

    /// Unknown addresses are a no-match error
    pub fn strict() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: None,
        }
    }

    pub fn with(mut self, address: &str, location: GeoLocation) -> Self {
        self.entries.insert(address.to_string(), location);
        self
    }
}

impl Default for FixedGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoLocation, GeocodeError> {
        self.entries
            .get(address)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| GeocodeError::NoMatch(address.to_string()))
    }
}

/// MapQuest when configured, otherwise the fixed geocoder
pub fn geocoder_from_config(
    config: Option<&GeocoderConfig>,
) -> Result<Arc<dyn Geocoder>, GeocodeError> {
    match config {
        Some(cfg) => Ok(Arc::new(MapQuestGeocoder::new(cfg)?)),
        None => {
            tracing::warn!("no geocoder configured, addresses resolve to a fixed location");
            Ok(Arc::new(FixedGeocoder::new()))
        }
    }
}
