use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::constants::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub firebase: FirebaseConfig,
    pub map_config: MapConfig,
    pub google_maps_api_key: String,
    pub storage_key: String,
    pub lookup_latency_ms: u64,
    pub remote_poll_interval_ms: u32,
    pub enable_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            firebase: FirebaseConfig::default(),
            map_config: MapConfig::default(),
            google_maps_api_key: String::new(),
            storage_key: STORAGE_KEY_TRACKED_ACCOUNTS.to_string(),
            lookup_latency_ms: DEFAULT_LOOKUP_LATENCY_MS,
            remote_poll_interval_ms: DEFAULT_REMOTE_POLL_INTERVAL_MS,
            enable_logging: true,
        }
    }
}

impl AppConfig {
    /// Config baked in at compile time (build.rs forwards `.env`)
    pub fn from_build_env() -> Self {
        let defaults = Self::default();
        Self {
            firebase: FirebaseConfig {
                api_key: FIREBASE_API_KEY.unwrap_or_default().to_string(),
                auth_domain: FIREBASE_AUTH_DOMAIN.unwrap_or_default().to_string(),
                project_id: FIREBASE_PROJECT_ID.unwrap_or_default().to_string(),
                storage_bucket: FIREBASE_STORAGE_BUCKET.unwrap_or_default().to_string(),
                messaging_sender_id: FIREBASE_MESSAGING_SENDER_ID.unwrap_or_default().to_string(),
                app_id: FIREBASE_APP_ID.unwrap_or_default().to_string(),
                measurement_id: FIREBASE_MEASUREMENT_ID.map(str::to_string),
            },
            google_maps_api_key: GOOGLE_MAPS_API_KEY.unwrap_or_default().to_string(),
            lookup_latency_ms: parse_or(LOOKUP_LATENCY_MS, defaults.lookup_latency_ms),
            remote_poll_interval_ms: parse_or(REMOTE_POLL_INTERVAL_MS, defaults.remote_poll_interval_ms),
            ..defaults
        }
    }

    pub fn lookup_latency(&self) -> Duration {
        Duration::from_millis(self.lookup_latency_ms)
    }

    /// Remote directory is usable only with a project id
    pub fn has_remote(&self) -> bool {
        !self.firebase.project_id.is_empty()
    }
}

/// Firebase web app settings. These are public values; the bridge passes them
/// to `initializeApp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub container_id: String,
    pub default_center_lat: f64,
    pub default_center_lng: f64,
    pub default_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container_id: "map".to_string(),
            // New York
            default_center_lat: 40.7128,
            default_center_lng: -74.006,
            default_zoom: 12.0,
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!("⚠️ [Config] Invalid value '{}', using default", value);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_center_on_new_york() {
        let config = AppConfig::default();
        assert_eq!(config.storage_key, "localAccounts");
        assert_eq!(config.lookup_latency(), Duration::from_millis(500));
        assert_eq!(config.map_config.default_center_lat, 40.7128);
        assert_eq!(config.map_config.default_center_lng, -74.006);
        assert_eq!(config.map_config.default_zoom, 12.0);
        assert!(!config.has_remote());
    }

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or(Some("250"), 500u64), 250);
        assert_eq!(parse_or(Some("soon"), 500u64), 500);
        assert_eq!(parse_or(None, 7u32), 7);
    }

    #[test]
    fn firebase_config_serialises_for_the_js_sdk() {
        let config = FirebaseConfig {
            api_key: "k".to_string(),
            project_id: "p".to_string(),
            ..FirebaseConfig::default()
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["apiKey"], "k");
        assert_eq!(value["projectId"], "p");
        assert!(value.get("measurementId").is_none());
    }
}
